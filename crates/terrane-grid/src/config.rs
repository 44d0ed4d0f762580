use std::fmt;

use serde::Deserialize;
use terrane_geom::{Transform, Vec3};

use crate::error::GridError;

/// Coordinate interpretation of `(u, v, w)`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum GeometryKind {
    /// `(x, y, z)` cells of a box.
    Cartesian,
    /// `(ring, height layer, azimuthal slice)` cells of a capsule's cylinder.
    Cylindrical,
    /// `(shell, polar band, azimuthal slice)` cells of a sphere.
    Spherical,
}

impl fmt::Display for GeometryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            GeometryKind::Cartesian => "cartesian",
            GeometryKind::Cylindrical => "cylindrical",
            GeometryKind::Spherical => "spherical",
        })
    }
}

/// Bounding volume dimensions. Values stored in a [`GridConfig`] already include the
/// transform's scale.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Bounds {
    Box { size: Vec3 },
    Capsule { radius: f32, height: f32 },
    Sphere { radius: f32 },
}

impl Bounds {
    pub fn kind(&self) -> GeometryKind {
        match self {
            Bounds::Box { .. } => GeometryKind::Cartesian,
            Bounds::Capsule { .. } => GeometryKind::Cylindrical,
            Bounds::Sphere { .. } => GeometryKind::Spherical,
        }
    }

    /// Applies a (non-zero) transform scale: box per axis, capsule radius by `x` and height
    /// by `y`, sphere radius by `x`.
    pub fn scaled(&self, scale: Vec3) -> Bounds {
        let s = Vec3::new(scale.x.abs(), scale.y.abs(), scale.z.abs());
        match *self {
            Bounds::Box { size } => Bounds::Box {
                size: size.mul_elem(s),
            },
            Bounds::Capsule { radius, height } => Bounds::Capsule {
                radius: radius * s.x,
                height: height * s.y,
            },
            Bounds::Sphere { radius } => Bounds::Sphere {
                radius: radius * s.x,
            },
        }
    }

    fn validate(&self) -> Result<(), GridError> {
        let positive = |v: f32| v.is_finite() && v > 0.0;
        match *self {
            Bounds::Box { size } => {
                if !(positive(size.x) && positive(size.y) && positive(size.z)) {
                    return Err(GridError::InvalidExtent("size"));
                }
            }
            Bounds::Capsule { radius, height } => {
                if !positive(radius) {
                    return Err(GridError::InvalidExtent("radius"));
                }
                if !positive(height) {
                    return Err(GridError::InvalidExtent("height"));
                }
            }
            Bounds::Sphere { radius } => {
                if !positive(radius) {
                    return Err(GridError::InvalidExtent("radius"));
                }
            }
        }
        Ok(())
    }
}

/// Untyped bounding-shape description as it arrives from a scene file.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct VolumeDescriptor {
    pub shape: String,
    pub size: Option<Vec3>,
    pub radius: Option<f32>,
    pub height: Option<f32>,
    #[serde(flatten)]
    pub transform: Transform,
}

impl VolumeDescriptor {
    /// Resolves the shape tag and its dimensions (unscaled).
    pub fn bounds(&self) -> Result<Bounds, GridError> {
        match self.shape.trim().to_ascii_lowercase().as_str() {
            "box" => Ok(Bounds::Box {
                size: self.size.ok_or(GridError::MissingDimension("size"))?,
            }),
            "capsule" => Ok(Bounds::Capsule {
                radius: self.radius.ok_or(GridError::MissingDimension("radius"))?,
                height: self.height.ok_or(GridError::MissingDimension("height"))?,
            }),
            "sphere" => Ok(Bounds::Sphere {
                radius: self.radius.ok_or(GridError::MissingDimension("radius"))?,
            }),
            _ => Err(GridError::UnsupportedShape(self.shape.clone())),
        }
    }
}

/// Validated construction parameters of a grid.
#[derive(Clone, Debug, PartialEq)]
pub struct GridConfig {
    geometry: GeometryKind,
    voxel_size: Vec3,
    transform: Transform,
    extents: Bounds,
}

impl GridConfig {
    /// `bounds` are unscaled; the transform's scale is folded into the stored extents.
    pub fn new(bounds: Bounds, voxel_size: Vec3, transform: Transform) -> Result<Self, GridError> {
        if !voxel_size.is_finite() || voxel_size.min_elem() <= 0.0 {
            return Err(GridError::InvalidVoxelSize(voxel_size));
        }
        let scale = transform.scale;
        if !scale.is_finite() || scale.x == 0.0 || scale.y == 0.0 || scale.z == 0.0 {
            return Err(GridError::InvalidScale(scale));
        }
        let extents = bounds.scaled(scale);
        extents.validate()?;
        Ok(Self {
            geometry: extents.kind(),
            voxel_size,
            transform,
            extents,
        })
    }

    pub fn from_descriptor(desc: &VolumeDescriptor, voxel_size: Vec3) -> Result<Self, GridError> {
        Self::new(desc.bounds()?, voxel_size, desc.transform)
    }

    #[inline]
    pub fn geometry(&self) -> GeometryKind {
        self.geometry
    }

    #[inline]
    pub fn voxel_size(&self) -> Vec3 {
        self.voxel_size
    }

    #[inline]
    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    /// Scaled bounding extents.
    #[inline]
    pub fn extents(&self) -> Bounds {
        self.extents
    }
}
