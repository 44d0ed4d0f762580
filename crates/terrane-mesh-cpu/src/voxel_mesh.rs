use log::debug;
use terrane_blocks::{BlockType, FaceRole, TextureAtlas};
use terrane_geom::{Vec2, Vec3};
use terrane_grid::exposure::NORMAL_MATCH_COS;
use terrane_grid::mapper::quad_normal;
use terrane_grid::{Face, FaceMask, VoxelGrid, VoxelIndex};

use crate::mesh_build::MeshBuild;
use crate::template::{FACE_UVS, VERTEX_COUNT, VERTS_PER_FACE, face_base, face_triangles, vertex_corner};

/// Render data of one voxel.
///
/// `positions` are offsets from the cell center in geometry space (scale applied). `uvs` holds
/// one 24-entry set per atlas UV channel. `triangles` index into `positions` and cover only
/// the faces in `faces`.
#[derive(Clone, Debug, PartialEq)]
pub struct VoxelMesh {
    pub index: VoxelIndex,
    pub block: BlockType,
    /// Cell center in grid-local space.
    pub center: Vec3,
    pub positions: Vec<Vec3>,
    pub uvs: Vec<Vec<Vec2>>,
    /// Deduplicated per-face normals; zero for collapsed or duplicate faces.
    pub face_normals: [Vec3; 6],
    pub roles: [FaceRole; 6],
    pub faces: FaceMask,
    pub triangles: Vec<u32>,
}

impl VoxelMesh {
    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.triangles.len() / 3
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// The four reshaped vertices of `face`.
    pub fn face_quad(&self, face: Face) -> [Vec3; 4] {
        let b = face_base(face);
        [
            self.positions[b],
            self.positions[b + 1],
            self.positions[b + 2],
            self.positions[b + 3],
        ]
    }

    /// UVs of `face` in every channel.
    pub fn face_uvs(&self, face: Face) -> Vec<[Vec2; 4]> {
        let b = face_base(face);
        self.uvs
            .iter()
            .map(|ch| [ch[b], ch[b + 1], ch[b + 2], ch[b + 3]])
            .collect()
    }
}

/// Normals of the six template faces after reshaping, with near-duplicates zeroed so a
/// face shared by two template faces is rendered once.
pub fn deduplicated_face_normals(positions: &[Vec3]) -> [Vec3; 6] {
    let mut normals = [Vec3::ZERO; 6];
    for face in Face::ALL {
        let b = face_base(face);
        let n = quad_normal([positions[b], positions[b + 1], positions[b + 2], positions[b + 3]]);
        let seen = normals[..face.index()]
            .iter()
            .any(|m| m.dot(n) > NORMAL_MATCH_COS);
        normals[face.index()] = if seen { Vec3::ZERO } else { n };
    }
    normals
}

/// Builds per-voxel meshes and merges them, texturing through an atlas.
pub struct MeshBuilder<'a> {
    atlas: &'a TextureAtlas,
}

impl<'a> MeshBuilder<'a> {
    pub fn new(atlas: &'a TextureAtlas) -> Self {
        Self { atlas }
    }

    /// Mesh of the voxel at `ix`, or `None` when the cell is empty.
    pub fn build_voxel_mesh(&self, grid: &VoxelGrid, ix: VoxelIndex) -> Option<VoxelMesh> {
        let voxel = grid.get(ix)?;
        let mapper = grid.mapper();
        let corners = mapper.cell_corners(ix);
        let positions: Vec<Vec3> = (0..VERTEX_COUNT).map(|v| corners[vertex_corner(v)]).collect();
        let face_normals = deduplicated_face_normals(&positions);

        let up = mapper.up_vector(ix);
        let roles = face_normals.map(|n| FaceRole::classify(n, up));

        let mut uv_set = vec![Vec2::ZERO; VERTEX_COUNT];
        for face in Face::ALL {
            let rect = self.atlas.rect(voxel.block(), roles[face.index()]);
            let b = face_base(face);
            for (k, uv) in FACE_UVS.iter().enumerate() {
                uv_set[b + k] = rect.remap(*uv);
            }
        }
        let uvs = vec![uv_set; self.atlas.uv_channels()];

        let exposure = voxel.exposure();
        let mut faces = FaceMask::EMPTY;
        let mut triangles = Vec::new();
        for face in Face::ALL {
            let n = face_normals[face.index()];
            if n != Vec3::ZERO && exposure.matches(n) {
                faces.insert(face);
                triangles.extend_from_slice(&face_triangles(face));
            }
        }

        Some(VoxelMesh {
            index: ix,
            block: voxel.block(),
            center: mapper.cell_center(ix),
            positions,
            uvs,
            face_normals,
            roles,
            faces,
            triangles,
        })
    }

    /// Merges voxel meshes into one buffer in the grid's local space.
    ///
    /// Each vertex becomes `center + offset / scale`; normals are carried through the inverse
    /// transpose of the scale.
    pub fn combine<'m>(
        &self,
        grid: &VoxelGrid,
        meshes: impl IntoIterator<Item = &'m VoxelMesh>,
    ) -> MeshBuild {
        let scale = grid.mapper().scale();
        let mut out = MeshBuild::with_channels(self.atlas.uv_channels());
        let mut voxels = 0usize;
        for mesh in meshes {
            voxels += 1;
            out.reserve_quads(mesh.faces.len());
            for face in mesh.faces.iter() {
                let quad = mesh
                    .face_quad(face)
                    .map(|p| mesh.center + p.div_elem(scale));
                let n = mesh.face_normals[face.index()]
                    .mul_elem(scale)
                    .normalized_or_zero(1e-12);
                out.add_quad_uv(quad, n, &mesh.face_uvs(face));
            }
        }
        debug!(
            "combined {} voxel meshes: {} vertices, {} triangles",
            voxels,
            out.vertex_count(),
            out.triangle_count()
        );
        debug_assert_eq!(out.vertex_count() % VERTS_PER_FACE, 0);
        out
    }
}
