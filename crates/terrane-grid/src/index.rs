use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

/// Integer cell address. Axis meaning depends on the grid's geometry kind.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(from = "[u32; 3]")]
pub struct VoxelIndex {
    pub u: u32,
    pub v: u32,
    pub w: u32,
}

impl VoxelIndex {
    #[inline]
    pub const fn new(u: u32, v: u32, w: u32) -> Self {
        Self { u, v, w }
    }

    #[inline]
    pub fn with_u(self, u: u32) -> Self {
        Self { u, ..self }
    }

    #[inline]
    pub fn with_v(self, v: u32) -> Self {
        Self { v, ..self }
    }

    #[inline]
    pub fn with_w(self, w: u32) -> Self {
        Self { w, ..self }
    }
}

impl From<(u32, u32, u32)> for VoxelIndex {
    fn from(value: (u32, u32, u32)) -> Self {
        Self::new(value.0, value.1, value.2)
    }
}

impl From<[u32; 3]> for VoxelIndex {
    fn from(value: [u32; 3]) -> Self {
        Self::new(value[0], value[1], value[2])
    }
}

impl From<VoxelIndex> for (u32, u32, u32) {
    fn from(value: VoxelIndex) -> Self {
        (value.u, value.v, value.w)
    }
}

impl fmt::Display for VoxelIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.u, self.v, self.w)
    }
}

/// Parses `u,v,w` (whitespace and surrounding parentheses tolerated).
impl FromStr for VoxelIndex {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim().trim_start_matches('(').trim_end_matches(')');
        let parts: Vec<&str> = trimmed.split(',').map(str::trim).collect();
        if parts.len() != 3 {
            return Err(format!("expected 'u,v,w', got '{}'", s));
        }
        let mut out = [0u32; 3];
        for (slot, part) in out.iter_mut().zip(&parts) {
            *slot = part
                .parse()
                .map_err(|e| format!("bad index component '{}': {}", part, e))?;
        }
        Ok(VoxelIndex::from(out))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_and_parenthesised() {
        assert_eq!("1,2,3".parse(), Ok(VoxelIndex::new(1, 2, 3)));
        assert_eq!("( 4, 0 ,9 )".parse(), Ok(VoxelIndex::new(4, 0, 9)));
        assert!("1,2".parse::<VoxelIndex>().is_err());
        assert!("1,-2,3".parse::<VoxelIndex>().is_err());
    }
}
