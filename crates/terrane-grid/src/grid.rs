use hashbrown::{HashMap, HashSet};
use log::{debug, trace};
use smallvec::SmallVec;
use terrane_blocks::BlockType;
use terrane_geom::Vec3;

use crate::adjacency::{Neighbors, NeighborTarget, neighbors};
use crate::config::{GeometryKind, GridConfig, VolumeDescriptor};
use crate::error::GridError;
use crate::exposure::Exposure;
use crate::index::VoxelIndex;
use crate::lattice::{Lattice, ResolutionBoundaries};
use crate::mapper::GeometryMapper;

/// Identity of one placement. A new placement at the same index gets a new id.
pub type VoxelId = u64;

/// Reference to a placed voxel that goes stale once it is broken.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct VoxelHandle {
    pub index: VoxelIndex,
    pub id: VoxelId,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum VoxelState {
    /// Placed but exposure not yet evaluated.
    Unbuilt,
    Hidden,
    Exposed,
    /// Broken; terminal for the handle.
    Destroyed,
}

#[derive(Clone, Debug)]
pub struct Voxel {
    id: VoxelId,
    index: VoxelIndex,
    block: BlockType,
    exposure: Exposure,
    state: VoxelState,
}

impl Voxel {
    #[inline]
    pub fn id(&self) -> VoxelId {
        self.id
    }

    #[inline]
    pub fn index(&self) -> VoxelIndex {
        self.index
    }

    #[inline]
    pub fn block(&self) -> BlockType {
        self.block
    }

    #[inline]
    pub fn state(&self) -> VoxelState {
        self.state
    }

    #[inline]
    pub fn exposure(&self) -> &Exposure {
        &self.exposure
    }

    #[inline]
    pub fn exposed_normals(&self) -> &[Vec3] {
        self.exposure.normals()
    }

    #[inline]
    pub fn handle(&self) -> VoxelHandle {
        VoxelHandle {
            index: self.index,
            id: self.id,
        }
    }
}

/// Sparse set of voxels over an adaptive lattice, with face exposure kept current under
/// placement and removal.
pub struct VoxelGrid {
    config: GridConfig,
    mapper: GeometryMapper,
    lattice: Lattice,
    boundaries: ResolutionBoundaries,
    voxels: HashMap<VoxelIndex, Voxel>,
    next_id: VoxelId,
    // Change tracking: latest stamp per index and indices touched since the last drain.
    rev: HashMap<VoxelIndex, u64>,
    counter: u64,
    changed: HashSet<VoxelIndex>,
}

impl VoxelGrid {
    /// A grid with no voxels placed.
    pub fn empty(config: GridConfig) -> Self {
        let mapper = GeometryMapper::new(&config);
        let lattice = Lattice::new(&mapper);
        let boundaries = lattice.resolution_boundaries(&mapper);
        Self {
            config,
            mapper,
            lattice,
            boundaries,
            voxels: HashMap::new(),
            next_id: 1,
            rev: HashMap::new(),
            counter: 0,
            changed: HashSet::new(),
        }
    }

    /// Fills every lattice cell inside the bounding volume, then evaluates exposure once
    /// all cells exist. The outer surface layer is grass, everything below is dirt.
    pub fn build(config: GridConfig) -> Self {
        let mut grid = Self::empty(config);
        let indices = grid.lattice.indices(&grid.mapper);
        for &ix in &indices {
            let block = if grid.lattice.is_surface_layer(ix) {
                BlockType::Grass
            } else {
                BlockType::Dirt
            };
            grid.insert(ix, block);
        }
        for &ix in &indices {
            grid.refresh_exposure(ix);
        }
        debug!(
            "built {} grid: {} voxels, {} exposed, azimuth boundaries {:?}, polar boundaries {:?}",
            grid.geometry(),
            grid.len(),
            grid.exposed_count(),
            grid.boundaries.azimuth,
            grid.boundaries.polar
        );
        grid
    }

    pub fn from_descriptor(desc: &VolumeDescriptor, voxel_size: Vec3) -> Result<Self, GridError> {
        Ok(Self::build(GridConfig::from_descriptor(desc, voxel_size)?))
    }

    #[inline]
    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    #[inline]
    pub fn geometry(&self) -> GeometryKind {
        self.config.geometry()
    }

    #[inline]
    pub fn mapper(&self) -> &GeometryMapper {
        &self.mapper
    }

    #[inline]
    pub fn lattice(&self) -> &Lattice {
        &self.lattice
    }

    #[inline]
    pub fn resolution_boundaries(&self) -> &ResolutionBoundaries {
        &self.boundaries
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.voxels.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.voxels.is_empty()
    }

    pub fn exposed_count(&self) -> usize {
        self.voxels
            .values()
            .filter(|v| v.state == VoxelState::Exposed)
            .count()
    }

    #[inline]
    pub fn contains(&self, ix: VoxelIndex) -> bool {
        self.voxels.contains_key(&ix)
    }

    #[inline]
    pub fn get(&self, ix: VoxelIndex) -> Option<&Voxel> {
        self.voxels.get(&ix)
    }

    #[inline]
    pub fn handle(&self, ix: VoxelIndex) -> Option<VoxelHandle> {
        self.voxels.get(&ix).map(Voxel::handle)
    }

    /// Resolves a handle to its voxel; `None` once the placement was broken.
    pub fn resolve(&self, handle: VoxelHandle) -> Option<&Voxel> {
        self.voxels.get(&handle.index).filter(|v| v.id == handle.id)
    }

    pub fn state(&self, handle: VoxelHandle) -> VoxelState {
        self.resolve(handle)
            .map_or(VoxelState::Destroyed, |v| v.state)
    }

    pub fn voxels(&self) -> impl Iterator<Item = &Voxel> {
        self.voxels.values()
    }

    /// Occupied indices in ascending order.
    pub fn sorted_indices(&self) -> Vec<VoxelIndex> {
        let mut out: Vec<_> = self.voxels.keys().copied().collect();
        out.sort_unstable();
        out
    }

    pub fn exposed_normals(&self, ix: VoxelIndex) -> Option<&[Vec3]> {
        self.voxels.get(&ix).map(Voxel::exposed_normals)
    }

    /// World-space cell center.
    pub fn world_center(&self, ix: VoxelIndex) -> Vec3 {
        self.config
            .transform()
            .transform_point(self.mapper.cell_center(ix))
    }

    /// Face neighbors of `ix`. Empty when `ix` does not name a cell of this grid.
    pub fn neighbors(&self, ix: VoxelIndex) -> Neighbors {
        if !self.lattice.is_addressable(&self.mapper, ix) {
            return Neighbors::new();
        }
        neighbors(&self.mapper, ix)
    }

    /// Occupied neighbor cells of `ix`.
    pub fn neighbors_existing(&self, ix: VoxelIndex) -> SmallVec<[VoxelIndex; 16]> {
        self.neighbors(ix)
            .iter()
            .filter_map(|n| n.cell())
            .filter(|c| self.voxels.contains_key(c))
            .collect()
    }

    /// Neighbor slots of `ix` that are unoccupied or outside the lattice.
    pub fn neighbors_missing(&self, ix: VoxelIndex) -> Neighbors {
        self.neighbors(ix)
            .into_iter()
            .filter(|n| match n.target {
                NeighborTarget::Outside => true,
                NeighborTarget::Cell(c) => !self.voxels.contains_key(&c),
            })
            .collect()
    }

    /// Re-evaluates exposure of the voxel at `ix`. Returns whether anything changed.
    pub fn refresh_exposure(&mut self, ix: VoxelIndex) -> bool {
        let voxels = &self.voxels;
        if !voxels.contains_key(&ix) {
            return false;
        }
        let exposure = Exposure::evaluate(&self.mapper, ix, |o| voxels.contains_key(&o));
        let state = if exposure.is_hidden() {
            VoxelState::Hidden
        } else {
            VoxelState::Exposed
        };
        let Some(voxel) = self.voxels.get_mut(&ix) else {
            return false;
        };
        if voxel.state == state && voxel.exposure == exposure {
            return false;
        }
        voxel.exposure = exposure;
        voxel.state = state;
        self.touch(ix);
        true
    }

    /// Places `block` at `ix`. Fails when occupied or when `ix` does not name a cell.
    pub fn place_voxel(&mut self, ix: VoxelIndex, block: BlockType) -> bool {
        if self.voxels.contains_key(&ix) || !self.lattice.is_addressable(&self.mapper, ix) {
            trace!("place {} rejected", ix);
            return false;
        }
        self.insert(ix, block);
        self.refresh_exposure(ix);
        self.refresh_around(ix);
        trace!("placed {:?} at {}", block, ix);
        true
    }

    /// Removes the voxel named by `handle`. Fails on a stale handle.
    pub fn break_voxel(&mut self, handle: VoxelHandle) -> bool {
        if self.resolve(handle).is_none() {
            trace!("break {} rejected: stale handle {}", handle.index, handle.id);
            return false;
        }
        self.voxels.remove(&handle.index);
        self.touch(handle.index);
        self.refresh_around(handle.index);
        trace!("broke {}", handle.index);
        true
    }

    /// Changes the block type of a placed voxel.
    pub fn set_block(&mut self, handle: VoxelHandle, block: BlockType) -> bool {
        let Some(voxel) = self.voxels.get_mut(&handle.index).filter(|v| v.id == handle.id) else {
            return false;
        };
        if voxel.block != block {
            voxel.block = block;
            self.touch(handle.index);
        }
        true
    }

    /// Moves a placed voxel to `to`, keeping its block type. The old handle goes stale.
    pub fn set_indices_and_rebuild(
        &mut self,
        handle: VoxelHandle,
        to: VoxelIndex,
    ) -> Option<VoxelHandle> {
        let block = self.resolve(handle)?.block;
        if handle.index == to {
            return Some(handle);
        }
        if self.voxels.contains_key(&to) || !self.lattice.is_addressable(&self.mapper, to) {
            return None;
        }
        self.break_voxel(handle);
        self.place_voxel(to, block);
        self.handle(to)
    }

    /// Latest change stamp of `ix`, or zero if it never changed.
    pub fn rev(&self, ix: VoxelIndex) -> u64 {
        self.rev.get(&ix).copied().unwrap_or(0)
    }

    /// Indices whose voxel was placed, broken, re-exposed or retextured since the last
    /// call, in ascending order.
    pub fn drain_changes(&mut self) -> Vec<VoxelIndex> {
        let mut out: Vec<_> = self.changed.drain().collect();
        out.sort_unstable();
        out
    }

    fn insert(&mut self, ix: VoxelIndex, block: BlockType) {
        let id = self.next_id;
        self.next_id += 1;
        self.voxels.insert(
            ix,
            Voxel {
                id,
                index: ix,
                block,
                exposure: Exposure::default(),
                state: VoxelState::Unbuilt,
            },
        );
        self.touch(ix);
    }

    fn refresh_around(&mut self, ix: VoxelIndex) {
        for n in self.neighbors(ix) {
            if let Some(c) = n.cell() {
                self.refresh_exposure(c);
            }
        }
    }

    fn touch(&mut self, ix: VoxelIndex) -> u64 {
        self.counter = self.counter.wrapping_add(1).max(1);
        self.rev.insert(ix, self.counter);
        self.changed.insert(ix);
        self.counter
    }
}
