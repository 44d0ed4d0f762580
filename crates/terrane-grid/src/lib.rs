//! Adaptive voxel lattice over box, capsule and sphere volumes.
//!
//! A [`VoxelGrid`] subdivides its bounding volume into cells addressed by `(u, v, w)`. The
//! meaning of each axis depends on the [`GeometryKind`]: Cartesian grids are uniform boxes,
//! cylindrical grids are rings/height layers/azimuthal slices, and spherical grids are
//! shells/polar bands/azimuthal slices. Angular resolution adapts per radial layer so that
//! cell arc length stays within the configured voxel size, which means neighbors across
//! the radial axis (and across spherical bands) may have a different number of subdivisions.
//! The adjacency resolver bridges those differences and drives face exposure.
#![forbid(unsafe_code)]

pub mod adjacency;
pub mod config;
pub mod error;
pub mod exposure;
pub mod face;
pub mod grid;
pub mod index;
pub mod lattice;
pub mod mapper;

pub use adjacency::{Neighbor, NeighborTarget, Neighbors, resolution_ratio};
pub use config::{Bounds, GeometryKind, GridConfig, VolumeDescriptor};
pub use error::GridError;
pub use exposure::Exposure;
pub use face::{Face, FaceMask};
pub use grid::{Voxel, VoxelGrid, VoxelHandle, VoxelId, VoxelState};
pub use index::VoxelIndex;
pub use lattice::{Lattice, ResolutionBoundaries};
pub use mapper::GeometryMapper;
