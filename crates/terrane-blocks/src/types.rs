use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use terrane_geom::Vec3;

/// Cosine above which a face counts as facing the geometry's "up" (or, negated, "down").
pub const ROLE_COS_THRESHOLD: f32 = 0.97;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockType {
    #[default]
    None,
    Grass,
    Dirt,
}

impl BlockType {
    pub const ALL: [BlockType; 3] = [BlockType::None, BlockType::Grass, BlockType::Dirt];

    pub fn name(self) -> &'static str {
        match self {
            BlockType::None => "none",
            BlockType::Grass => "grass",
            BlockType::Dirt => "dirt",
        }
    }
}

impl fmt::Display for BlockType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BlockType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" => Ok(BlockType::None),
            "grass" => Ok(BlockType::Grass),
            "dirt" => Ok(BlockType::Dirt),
            other => Err(format!("unknown block type '{}'", other)),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum FaceRole {
    Top,
    Bottom,
    Side,
}

impl FaceRole {
    /// Classifies a face by comparing its normal against the local up vector.
    #[inline]
    pub fn classify(normal: Vec3, up: Vec3) -> FaceRole {
        let c = normal.dot(up);
        if c > ROLE_COS_THRESHOLD {
            FaceRole::Top
        } else if c < -ROLE_COS_THRESHOLD {
            FaceRole::Bottom
        } else {
            FaceRole::Side
        }
    }
}
