use std::collections::HashMap;
use std::error::Error;
use std::fmt;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use terrane_geom::Vec2;

use super::types::{BlockType, FaceRole};

/// Texture name looked up for blocks and roles the atlas does not configure.
pub const FALLBACK_TEXTURE: &str = "none";
/// Number of UV channels a mesh vertex can carry.
pub const MAX_UV_CHANNELS: usize = 8;

/// UV rectangle of one atlas cell.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct AtlasRect {
    pub min: Vec2,
    pub max: Vec2,
}

impl AtlasRect {
    /// Picks `max` per component where the template coordinate exceeds one half, else `min`.
    #[inline]
    pub fn remap(&self, template_uv: Vec2) -> Vec2 {
        Vec2::new(
            if template_uv.x > 0.5 { self.max.x } else { self.min.x },
            if template_uv.y > 0.5 { self.max.y } else { self.min.y },
        )
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
struct FaceTextures {
    top: u32,
    side: u32,
    bottom: u32,
}

impl FaceTextures {
    fn uniform(ix: u32) -> Self {
        Self {
            top: ix,
            side: ix,
            bottom: ix,
        }
    }
}

/// Block-to-texture table over a `columns x rows` atlas grid.
///
/// Resolved once by the rendering collaborator and handed to the mesher; there is no global
/// registry.
#[derive(Clone, Debug)]
pub struct TextureAtlas {
    columns: u32,
    rows: u32,
    uv_channels: usize,
    textures: HashMap<String, u32>,
    blocks: HashMap<BlockType, FaceTextures>,
    fallback: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AtlasError {
    ZeroGrid,
    BadChannelCount(usize),
    TextureOutOfRange { name: String, index: u32 },
    UnknownTexture(String),
    UnknownBlock(String),
}

impl fmt::Display for AtlasError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AtlasError::ZeroGrid => write!(f, "atlas grid must have at least one column and row"),
            AtlasError::BadChannelCount(n) => {
                write!(f, "uv_channels must be in 1..={}, got {}", MAX_UV_CHANNELS, n)
            }
            AtlasError::TextureOutOfRange { name, index } => {
                write!(f, "texture '{}' index {} lies outside the atlas grid", name, index)
            }
            AtlasError::UnknownTexture(name) => write!(f, "unknown texture '{}'", name),
            AtlasError::UnknownBlock(name) => write!(f, "unknown block type '{}'", name),
        }
    }
}

impl Error for AtlasError {}

impl TextureAtlas {
    /// Builds an atlas from already-resolved parts; validates the grid and texture indices.
    pub fn new(columns: u32, rows: u32, textures: HashMap<String, u32>) -> Result<Self, AtlasError> {
        if columns == 0 || rows == 0 {
            return Err(AtlasError::ZeroGrid);
        }
        let cells = columns.saturating_mul(rows);
        for (name, &index) in &textures {
            if index >= cells {
                return Err(AtlasError::TextureOutOfRange {
                    name: name.clone(),
                    index,
                });
            }
        }
        let fallback = textures.get(FALLBACK_TEXTURE).copied().unwrap_or(0);
        Ok(Self {
            columns,
            rows,
            uv_channels: 1,
            textures,
            blocks: HashMap::new(),
            fallback,
        })
    }

    /// The standard atlas: a 3x1 strip of none, grass and dirt. Grass blocks show grass only
    /// on top.
    pub fn standard() -> Self {
        let textures: HashMap<String, u32> = [("none", 0), ("grass", 1), ("dirt", 2)]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect();
        let blocks = HashMap::from([
            (BlockType::None, FaceTextures::uniform(0)),
            (
                BlockType::Grass,
                FaceTextures {
                    top: 1,
                    side: 2,
                    bottom: 2,
                },
            ),
            (BlockType::Dirt, FaceTextures::uniform(2)),
        ]);
        Self {
            columns: 3,
            rows: 1,
            uv_channels: 1,
            textures,
            blocks,
            fallback: 0,
        }
    }

    pub fn with_uv_channels(mut self, n: usize) -> Result<Self, AtlasError> {
        if n == 0 || n > MAX_UV_CHANNELS {
            return Err(AtlasError::BadChannelCount(n));
        }
        self.uv_channels = n;
        Ok(self)
    }

    /// Assigns textures by name for a block's top, side and bottom faces.
    pub fn set_block(
        &mut self,
        block: BlockType,
        top: &str,
        side: &str,
        bottom: &str,
    ) -> Result<(), AtlasError> {
        let faces = FaceTextures {
            top: self.texture_index(top)?,
            side: self.texture_index(side)?,
            bottom: self.texture_index(bottom)?,
        };
        self.blocks.insert(block, faces);
        Ok(())
    }

    pub fn texture_index(&self, name: &str) -> Result<u32, AtlasError> {
        self.textures
            .get(name)
            .copied()
            .ok_or_else(|| AtlasError::UnknownTexture(name.to_string()))
    }

    #[inline]
    pub fn columns(&self) -> u32 {
        self.columns
    }

    #[inline]
    pub fn rows(&self) -> u32 {
        self.rows
    }

    /// Number of UV channels the mesher fills.
    #[inline]
    pub fn uv_channels(&self) -> usize {
        self.uv_channels
    }

    /// Number of addressable cells, saturating at `u32::MAX`.
    #[inline]
    pub fn cell_count(&self) -> u32 {
        self.columns.saturating_mul(self.rows)
    }

    /// UV rectangle of the atlas cell at a linear index (row-major from the first row).
    pub fn cell_rect(&self, index: u32) -> AtlasRect {
        let index = index.min(self.cell_count() - 1);
        let col = index % self.columns;
        let row = index / self.columns;
        let (cw, rh) = (1.0 / self.columns as f32, 1.0 / self.rows as f32);
        AtlasRect {
            min: Vec2::new(col as f32 * cw, row as f32 * rh),
            max: Vec2::new((col + 1) as f32 * cw, (row + 1) as f32 * rh),
        }
    }

    /// Linear texture index used for a block face.
    pub fn texture_for(&self, block: BlockType, role: FaceRole) -> u32 {
        match self.blocks.get(&block) {
            Some(t) => match role {
                FaceRole::Top => t.top,
                FaceRole::Side => t.side,
                FaceRole::Bottom => t.bottom,
            },
            None => self.fallback,
        }
    }

    /// `(block_type, face_role) -> (uv_min, uv_max)`.
    #[inline]
    pub fn rect(&self, block: BlockType, role: FaceRole) -> AtlasRect {
        self.cell_rect(self.texture_for(block, role))
    }

    pub fn from_config(cfg: AtlasConfig) -> Result<Self, AtlasError> {
        let mut atlas = TextureAtlas::new(cfg.columns, cfg.rows, cfg.textures)?
            .with_uv_channels(cfg.uv_channels)?;
        // Sort keys so error reporting does not depend on HashMap iteration order.
        let mut entries: Vec<(String, BlockFacesEntry)> = cfg.blocks.into_iter().collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        for (key, entry) in entries {
            let block: BlockType = key.parse().map_err(|_| AtlasError::UnknownBlock(key.clone()))?;
            let (all, top, side, bottom) = match entry {
                BlockFacesEntry::All(name) => (Some(name), None, None, None),
                BlockFacesEntry::Detail {
                    all,
                    top,
                    side,
                    bottom,
                } => (all, top, side, bottom),
            };
            let pick = |role: Option<String>| {
                role.or_else(|| all.clone())
                    .unwrap_or_else(|| FALLBACK_TEXTURE.to_string())
            };
            let (t, s, b) = (pick(top), pick(side), pick(bottom));
            atlas.set_block(block, &t, &s, &b)?;
        }
        Ok(atlas)
    }

    pub fn from_toml_str(toml_str: &str) -> Result<Self, Box<dyn Error>> {
        let cfg: AtlasConfig = toml::from_str(toml_str)?;
        Ok(Self::from_config(cfg)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, Box<dyn Error>> {
        let s = fs::read_to_string(path)?;
        Self::from_toml_str(&s)
    }
}

impl Default for TextureAtlas {
    fn default() -> Self {
        TextureAtlas::standard()
    }
}

// --- Config ---

#[derive(Deserialize, Clone, Debug)]
pub struct AtlasConfig {
    pub columns: u32,
    pub rows: u32,
    #[serde(default = "default_uv_channels")]
    pub uv_channels: usize,
    pub textures: HashMap<String, u32>,
    #[serde(default)]
    pub blocks: HashMap<String, BlockFacesEntry>,
}

fn default_uv_channels() -> usize {
    1
}

#[derive(Deserialize, Clone, Debug)]
#[serde(untagged)]
pub enum BlockFacesEntry {
    // Simple: dirt = "dirt"
    All(String),
    // Detailed: grass = { top = "grass", side = "dirt", bottom = "dirt" }
    Detail {
        all: Option<String>,
        top: Option<String>,
        side: Option<String>,
        bottom: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_grass_uses_grass_only_on_top() {
        let atlas = TextureAtlas::standard();
        let grass = atlas.cell_rect(1);
        let dirt = atlas.cell_rect(2);
        assert_eq!(atlas.rect(BlockType::Grass, FaceRole::Top), grass);
        assert_eq!(atlas.rect(BlockType::Grass, FaceRole::Side), dirt);
        assert_eq!(atlas.rect(BlockType::Grass, FaceRole::Bottom), dirt);
        assert_eq!(atlas.rect(BlockType::Dirt, FaceRole::Top), dirt);
    }

    #[test]
    fn cell_rect_is_row_major() {
        let textures = HashMap::from([("a".to_string(), 5u32)]);
        let atlas = TextureAtlas::new(4, 2, textures).unwrap();
        let r = atlas.cell_rect(5);
        assert_eq!(r.min, Vec2::new(0.25, 0.5));
        assert_eq!(r.max, Vec2::new(0.5, 1.0));
    }

    #[test]
    fn oversized_grid_clamps_without_overflow() {
        let atlas = TextureAtlas::new(u32::MAX, 2, HashMap::new()).unwrap();
        assert_eq!(atlas.cell_count(), u32::MAX);
        let r = atlas.cell_rect(u32::MAX);
        assert_eq!((r.min.y, r.max.y), (0.0, 0.5));
        assert!((r.max.x - 1.0).abs() < 1e-6);
    }

    #[test]
    fn remap_selects_by_half_threshold() {
        let r = AtlasRect {
            min: Vec2::new(0.1, 0.2),
            max: Vec2::new(0.3, 0.4),
        };
        assert_eq!(r.remap(Vec2::new(0.0, 1.0)), Vec2::new(0.1, 0.4));
        assert_eq!(r.remap(Vec2::new(1.0, 0.0)), Vec2::new(0.3, 0.2));
    }

    #[test]
    fn rejects_texture_outside_grid() {
        let textures = HashMap::from([("far".to_string(), 9u32)]);
        let err = TextureAtlas::new(2, 2, textures).unwrap_err();
        assert_eq!(
            err,
            AtlasError::TextureOutOfRange {
                name: "far".into(),
                index: 9
            }
        );
        assert_eq!(TextureAtlas::new(0, 2, HashMap::new()).unwrap_err(), AtlasError::ZeroGrid);
    }

    #[test]
    fn unconfigured_block_falls_back_to_none_texture() {
        let textures = HashMap::from([("none".to_string(), 3u32), ("dirt".to_string(), 1u32)]);
        let atlas = TextureAtlas::new(2, 2, textures).unwrap();
        assert_eq!(atlas.texture_for(BlockType::Grass, FaceRole::Top), 3);
    }
}
