//! Scene files: bounding body, grid resolution and texture atlas.

use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use terrane_blocks::TextureAtlas;
use terrane_blocks::atlas::AtlasConfig;
use terrane_geom::Vec3;
use terrane_grid::{GridConfig, GridError, VolumeDescriptor, VoxelGrid};

#[derive(Clone, Debug, Deserialize)]
pub struct GridSection {
    #[serde(default = "default_voxel_size")]
    pub voxel_size: Vec3,
}

fn default_voxel_size() -> Vec3 {
    Vec3::ONE
}

impl Default for GridSection {
    fn default() -> Self {
        Self {
            voxel_size: default_voxel_size(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct SceneConfig {
    /// Atlas file, relative to the scene file. Ignored when `[atlas]` is inline.
    #[serde(default)]
    pub atlas_path: Option<PathBuf>,
    pub body: VolumeDescriptor,
    #[serde(default)]
    pub grid: GridSection,
    #[serde(default)]
    pub atlas: Option<AtlasConfig>,
}

impl SceneConfig {
    pub fn from_toml_str(toml_str: &str) -> Result<Self, Box<dyn Error>> {
        Ok(toml::from_str(toml_str)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, Box<dyn Error>> {
        let s = fs::read_to_string(path)?;
        Self::from_toml_str(&s)
    }

    pub fn grid_config(&self) -> Result<GridConfig, GridError> {
        GridConfig::from_descriptor(&self.body, self.grid.voxel_size)
    }

    pub fn build_grid(&self) -> Result<VoxelGrid, GridError> {
        Ok(VoxelGrid::build(self.grid_config()?))
    }

    /// Inline atlas, then `atlas_path` resolved against `base_dir`, then the standard atlas.
    pub fn atlas(&self, base_dir: &Path) -> Result<TextureAtlas, Box<dyn Error>> {
        if let Some(cfg) = &self.atlas {
            return Ok(TextureAtlas::from_config(cfg.clone())?);
        }
        match &self.atlas_path {
            Some(p) => TextureAtlas::from_path(base_dir.join(p)),
            None => Ok(TextureAtlas::standard()),
        }
    }
}
