use terrane_geom::Vec3;

/// One of the six faces of a cell, named by the template axis it points along.
///
/// `X` is the `u` axis, `Y` the `v` axis and `Z` the `w` axis. In cylindrical and spherical
/// grids `PosX`/`NegX` are the outer/inner radial faces.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub enum Face {
    PosY = 0,
    NegY = 1,
    PosX = 2,
    NegX = 3,
    PosZ = 4,
    NegZ = 5,
}

impl Face {
    pub const ALL: [Face; 6] = [
        Face::PosY,
        Face::NegY,
        Face::PosX,
        Face::NegX,
        Face::PosZ,
        Face::NegZ,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Converts a face index `[0..6)` back into a `Face`; `None` when out of range.
    #[inline]
    pub fn from_index(i: usize) -> Option<Face> {
        Face::ALL.get(i).copied()
    }

    /// Axis-aligned unit normal of the undeformed template face.
    #[inline]
    pub fn normal(self) -> Vec3 {
        match self {
            Face::PosY => Vec3::UP,
            Face::NegY => -Vec3::UP,
            Face::PosX => Vec3::RIGHT,
            Face::NegX => -Vec3::RIGHT,
            Face::PosZ => Vec3::FORWARD,
            Face::NegZ => -Vec3::FORWARD,
        }
    }

    /// Index delta `(du, dv, dw)` when stepping out through this face.
    #[inline]
    pub fn delta(self) -> (i32, i32, i32) {
        match self {
            Face::PosY => (0, 1, 0),
            Face::NegY => (0, -1, 0),
            Face::PosX => (1, 0, 0),
            Face::NegX => (-1, 0, 0),
            Face::PosZ => (0, 0, 1),
            Face::NegZ => (0, 0, -1),
        }
    }

    #[inline]
    pub fn opposite(self) -> Face {
        match self {
            Face::PosY => Face::NegY,
            Face::NegY => Face::PosY,
            Face::PosX => Face::NegX,
            Face::NegX => Face::PosX,
            Face::PosZ => Face::NegZ,
            Face::NegZ => Face::PosZ,
        }
    }

    /// Template corner indices of this face, counter-clockwise seen from outside.
    #[inline]
    pub fn corners(self) -> [usize; 4] {
        FACE_CORNERS[self.index()]
    }
}

/// Corner `i` of a cell sits on the positive side of axis `k` when bit `k` of `i` is set
/// (bit 0 = `u`, bit 1 = `v`, bit 2 = `w`). Winding `[a, b, c]`, `[a, c, d]` faces outward.
pub const FACE_CORNERS: [[usize; 4]; 6] = [
    [2, 6, 7, 3],
    [0, 1, 5, 4],
    [1, 3, 7, 5],
    [0, 4, 6, 2],
    [4, 5, 7, 6],
    [0, 2, 3, 1],
];

/// Whether template corner `corner` lies on the positive side of `axis`.
#[inline]
pub fn corner_on_positive(corner: usize, axis: usize) -> bool {
    (corner >> axis) & 1 == 1
}

/// Set of faces, one bit per [`Face`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct FaceMask(u8);

impl FaceMask {
    pub const EMPTY: FaceMask = FaceMask(0);
    pub const ALL: FaceMask = FaceMask(0b11_1111);

    #[inline]
    pub fn insert(&mut self, face: Face) {
        self.0 |= 1 << face.index();
    }

    #[inline]
    pub fn contains(self, face: Face) -> bool {
        self.0 & (1 << face.index()) != 0
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn iter(self) -> impl Iterator<Item = Face> {
        Face::ALL.into_iter().filter(move |f| self.contains(*f))
    }

    #[inline]
    pub fn bits(self) -> u8 {
        self.0
    }
}

impl FromIterator<Face> for FaceMask {
    fn from_iter<T: IntoIterator<Item = Face>>(iter: T) -> Self {
        let mut mask = FaceMask::EMPTY;
        for face in iter {
            mask.insert(face);
        }
        mask
    }
}
