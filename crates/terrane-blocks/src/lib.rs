//! Block types, face roles, and the texture-atlas configuration.
#![forbid(unsafe_code)]

pub mod atlas;
pub mod types;

pub use atlas::{AtlasError, AtlasRect, TextureAtlas};
pub use types::{BlockType, FaceRole};
