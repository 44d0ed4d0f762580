//! CPU meshing of exposed voxel faces.
//!
//! Every voxel is rendered from a 24-vertex cube template whose corners are reshaped onto the
//! cell's geometry. Only faces whose normal matches an exposed normal of the voxel keep their
//! triangles. [`VoxelBody`] owns a grid together with its mesh and collider caches and keeps
//! them current as voxels are placed and broken.
#![forbid(unsafe_code)]

pub mod body;
pub mod collider;
pub mod mesh_build;
pub mod template;
pub mod voxel_mesh;

pub use body::{BodyStats, RenderMode, VoxelBody};
pub use collider::{Collider, build_collider};
pub use mesh_build::MeshBuild;
pub use voxel_mesh::{MeshBuilder, VoxelMesh};
