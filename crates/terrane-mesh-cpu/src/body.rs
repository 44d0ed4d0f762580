use hashbrown::HashMap;
use log::{debug, trace};
use terrane_blocks::{BlockType, TextureAtlas};
use terrane_grid::{VoxelGrid, VoxelHandle, VoxelIndex};

use crate::collider::{Collider, build_collider};
use crate::mesh_build::MeshBuild;
use crate::voxel_mesh::{MeshBuilder, VoxelMesh};

/// How the body is drawn.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RenderMode {
    /// One mesh per voxel.
    PerVoxel,
    /// One merged mesh for the whole body.
    Combined,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct BodyStats {
    pub voxels: usize,
    pub exposed_voxels: usize,
    pub triangles: usize,
    pub colliders: usize,
}

/// A voxel grid together with its mesh and collider caches.
///
/// Mutations go through the body so the caches follow the grid's change stamps: only voxels
/// whose stamp is newer than the one they were built at are re-meshed.
pub struct VoxelBody {
    grid: VoxelGrid,
    atlas: TextureAtlas,
    meshes: HashMap<VoxelIndex, VoxelMesh>,
    colliders: HashMap<VoxelIndex, Collider>,
    built: HashMap<VoxelIndex, u64>,
    combined: Option<MeshBuild>,
    render_mode: RenderMode,
}

impl VoxelBody {
    pub fn new(grid: VoxelGrid, atlas: TextureAtlas) -> Self {
        let mut body = Self {
            grid,
            atlas,
            meshes: HashMap::new(),
            colliders: HashMap::new(),
            built: HashMap::new(),
            combined: None,
            render_mode: RenderMode::PerVoxel,
        };
        let rebuilt = body.sync();
        debug!("voxel body ready: {} meshes built", rebuilt);
        body
    }

    #[inline]
    pub fn grid(&self) -> &VoxelGrid {
        &self.grid
    }

    #[inline]
    pub fn atlas(&self) -> &TextureAtlas {
        &self.atlas
    }

    #[inline]
    pub fn render_mode(&self) -> RenderMode {
        self.render_mode
    }

    pub fn place_voxel(&mut self, ix: VoxelIndex, block: BlockType) -> bool {
        let ok = self.grid.place_voxel(ix, block);
        if ok {
            self.sync();
        }
        ok
    }

    pub fn break_voxel(&mut self, handle: VoxelHandle) -> bool {
        let ok = self.grid.break_voxel(handle);
        if ok {
            self.sync();
        }
        ok
    }

    pub fn set_block(&mut self, handle: VoxelHandle, block: BlockType) -> bool {
        let ok = self.grid.set_block(handle, block);
        if ok {
            self.sync();
        }
        ok
    }

    pub fn set_indices_and_rebuild(
        &mut self,
        handle: VoxelHandle,
        to: VoxelIndex,
    ) -> Option<VoxelHandle> {
        let moved = self.grid.set_indices_and_rebuild(handle, to);
        if moved.is_some() {
            self.sync();
        }
        moved
    }

    /// Whether the cached mesh of `ix` predates its latest change.
    pub fn needs_rebuild(&self, ix: VoxelIndex) -> bool {
        let rev = self.grid.rev(ix);
        rev > 0 && self.built.get(&ix).copied().unwrap_or(0) < rev
    }

    /// Rebuilds caches for every voxel changed since the last sync. Returns the number of
    /// meshes rebuilt.
    pub fn sync(&mut self) -> usize {
        let changed = self.grid.drain_changes();
        if changed.is_empty() {
            return 0;
        }
        let builder = MeshBuilder::new(&self.atlas);
        let mut rebuilt = 0;
        for ix in changed {
            if !self.needs_rebuild(ix) {
                continue;
            }
            let rev = self.grid.rev(ix);
            match builder.build_voxel_mesh(&self.grid, ix) {
                Some(mesh) => {
                    self.meshes.insert(ix, mesh);
                    match build_collider(&self.grid, ix) {
                        Some(c) => {
                            self.colliders.insert(ix, c);
                        }
                        None => {
                            self.colliders.remove(&ix);
                        }
                    }
                    rebuilt += 1;
                }
                None => {
                    self.meshes.remove(&ix);
                    self.colliders.remove(&ix);
                }
            }
            self.built.insert(ix, rev);
        }
        if self.combined.take().is_some() {
            trace!("combined mesh marked stale");
        }
        rebuilt
    }

    #[inline]
    pub fn mesh(&self, ix: VoxelIndex) -> Option<&VoxelMesh> {
        self.meshes.get(&ix)
    }

    pub fn meshes(&self) -> impl Iterator<Item = &VoxelMesh> {
        self.meshes.values()
    }

    #[inline]
    pub fn collider(&self, ix: VoxelIndex) -> Option<&Collider> {
        self.colliders.get(&ix)
    }

    pub fn colliders(&self) -> impl Iterator<Item = (&VoxelIndex, &Collider)> {
        self.colliders.iter()
    }

    /// Merges all voxel meshes (in index order) and switches to combined rendering.
    /// Voxels stay individually addressable afterwards.
    pub fn combine(&mut self) -> &MeshBuild {
        self.render_mode = RenderMode::Combined;
        let builder = MeshBuilder::new(&self.atlas);
        let mut order: Vec<&VoxelMesh> = self.meshes.values().collect();
        order.sort_unstable_by_key(|m| m.index);
        let mesh = builder.combine(&self.grid, order);
        self.combined.insert(mesh)
    }

    /// The combined mesh, or `None` when it was never built or a mutation made it stale.
    #[inline]
    pub fn combined(&self) -> Option<&MeshBuild> {
        self.combined.as_ref()
    }

    pub fn stats(&self) -> BodyStats {
        BodyStats {
            voxels: self.grid.len(),
            exposed_voxels: self.grid.exposed_count(),
            triangles: self.meshes.values().map(VoxelMesh::triangle_count).sum(),
            colliders: self.colliders.len(),
        }
    }
}
