use std::fmt;

use terrane_geom::Vec3;

/// Construction-time configuration failures. A grid is never returned partially built.
#[derive(Debug, Clone, PartialEq)]
pub enum GridError {
    /// The bounding shape tag is none of box, capsule or sphere.
    UnsupportedShape(String),
    MissingDimension(&'static str),
    InvalidExtent(&'static str),
    InvalidVoxelSize(Vec3),
    InvalidScale(Vec3),
}

impl fmt::Display for GridError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GridError::UnsupportedShape(tag) => write!(
                f,
                "unsupported bounding shape '{}': expected one of box, capsule, sphere",
                tag
            ),
            GridError::MissingDimension(name) => write!(f, "bounding shape is missing '{}'", name),
            GridError::InvalidExtent(name) => {
                write!(f, "bounding dimension '{}' must be positive and finite", name)
            }
            GridError::InvalidVoxelSize(v) => write!(
                f,
                "voxel size must be positive and finite on every axis, got ({}, {}, {})",
                v.x, v.y, v.z
            ),
            GridError::InvalidScale(v) => write!(
                f,
                "transform scale must be non-zero and finite on every axis, got ({}, {}, {})",
                v.x, v.y, v.z
            ),
        }
    }
}

impl std::error::Error for GridError {}
