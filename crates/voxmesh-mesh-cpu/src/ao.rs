//! Eight-neighbour occlusion patterns shared by both meshers.
//!
//! A pattern indexes a 16×16 grid of 16-texel cells in a fixed AO lookup
//! texture; the low nibble picks the column and the high nibble the row.

use voxmesh_geom::IVec3;
use voxmesh_voxel::VoxelSource;

/// Tangent-plane offsets `(du, dv)` in bit order.
pub const NEIGHBOURS: [(i32, i32); 8] = [
    (-1, 0),
    (1, 0),
    (0, -1),
    (0, 1),
    (-1, 1),
    (-1, -1),
    (1, 1),
    (1, -1),
];

/// Texels per pattern cell in the lookup texture.
pub const AO_CELL_TEXELS: u16 = 16;

/// Alpha written for emissive model texels; shaders treat it as "no AO".
pub const EMISSIVE_SELECTOR: u8 = 255;

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct AoPattern(pub u8);

impl AoPattern {
    pub const OPEN: AoPattern = AoPattern(0);
    pub const ENCLOSED: AoPattern = AoPattern(0xFF);

    #[inline]
    pub const fn bits(self) -> u8 {
        self.0
    }

    #[inline]
    pub const fn is_set(self, bit: usize) -> bool {
        (self.0 >> bit) & 1 != 0
    }

    /// Top-left texel of this pattern's cell in the lookup texture.
    #[inline]
    pub const fn texel_origin(self) -> (u16, u16) {
        let p = self.0 as u16;
        ((p & 15) * AO_CELL_TEXELS, (p >> 4) * AO_CELL_TEXELS)
    }

    /// Selector stored in the alpha byte of a default-material model texel.
    /// Row 15 of each column is reserved for other materials, so every
    /// pattern landing there collapses to 15.
    #[inline]
    pub const fn model_selector(self) -> u8 {
        if self.0 % 16 == 15 { 15 } else { self.0 }
    }
}

/// Samples the eight tangent-plane neighbours of `cell`, which is the empty
/// cell in front of the face, not the solid cell behind it.
pub fn ao_pattern<S: VoxelSource + ?Sized>(src: &S, cell: IVec3, u: IVec3, v: IVec3) -> AoPattern {
    let mut bits = 0u8;
    for (bit, &(du, dv)) in NEIGHBOURS.iter().enumerate() {
        let p = cell + u * du + v * dv;
        if src.is_solid(p.x, p.y, p.z) {
            bits |= 1 << bit;
        }
    }
    AoPattern(bits)
}
