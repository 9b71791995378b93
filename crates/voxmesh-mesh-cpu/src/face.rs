use voxmesh_geom::IVec3;

/// Outward direction of a cell face. Terrain uses Z as the vertical axis.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Face {
    PosZ = 0,
    NegZ = 1,
    NegX = 2,
    PosX = 3,
    NegY = 4,
    PosY = 5,
}

/// Corner and tangent edges of a unit quad, relative to the cell's minimum corner.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct QuadBasis {
    pub corner: IVec3,
    pub u: IVec3,
    pub v: IVec3,
}

impl Face {
    /// Emission order used by the chunk mesher; part of the output byte layout.
    pub const ALL: [Face; 6] = [
        Face::PosZ,
        Face::NegZ,
        Face::NegX,
        Face::PosX,
        Face::NegY,
        Face::PosY,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Falls back to `PosZ` for out-of-range indices.
    #[inline]
    pub fn from_index(i: usize) -> Face {
        Face::ALL.get(i).copied().unwrap_or(Face::PosZ)
    }

    /// Integer grid step out of this face.
    #[inline]
    pub const fn delta(self) -> IVec3 {
        match self {
            Face::PosZ => IVec3::new(0, 0, 1),
            Face::NegZ => IVec3::new(0, 0, -1),
            Face::NegX => IVec3::new(-1, 0, 0),
            Face::PosX => IVec3::new(1, 0, 0),
            Face::NegY => IVec3::new(0, -1, 0),
            Face::PosY => IVec3::new(0, 1, 0),
        }
    }

    /// Quad spanned for this face of a terrain cell. The tangents double as
    /// the AO sampling axes.
    #[inline]
    pub const fn chunk_quad(self) -> QuadBasis {
        match self {
            Face::PosZ => QuadBasis {
                corner: IVec3::new(1, 0, 1),
                u: IVec3::new(-1, 0, 0),
                v: IVec3::new(0, 1, 0),
            },
            Face::NegZ => QuadBasis {
                corner: IVec3::new(0, 0, 0),
                u: IVec3::new(1, 0, 0),
                v: IVec3::new(0, 1, 0),
            },
            Face::NegX => QuadBasis {
                corner: IVec3::new(0, 1, 0),
                u: IVec3::new(0, 0, 1),
                v: IVec3::new(0, -1, 0),
            },
            Face::PosX => QuadBasis {
                corner: IVec3::new(1, 0, 0),
                u: IVec3::new(0, 0, 1),
                v: IVec3::new(0, 1, 0),
            },
            Face::NegY => QuadBasis {
                corner: IVec3::new(0, 0, 0),
                u: IVec3::new(0, 0, 1),
                v: IVec3::new(1, 0, 0),
            },
            Face::PosY => QuadBasis {
                corner: IVec3::new(1, 1, 0),
                u: IVec3::new(0, 0, 1),
                v: IVec3::new(-1, 0, 0),
            },
        }
    }

    /// Directional darkening carried in the alpha byte of chunk vertex colors.
    #[inline]
    pub const fn shading(self) -> u8 {
        match self {
            Face::PosZ | Face::PosY | Face::NegX | Face::PosX => 0,
            Face::NegZ => 220,
            Face::NegY => 255,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quad_tangents_lie_in_face_plane() {
        for face in Face::ALL {
            let q = face.chunk_quad();
            let n = face.delta();
            assert_eq!(q.u.dot(n), 0, "{face:?}");
            assert_eq!(q.v.dot(n), 0, "{face:?}");
            assert_eq!(q.u.cross(q.v).dot(n).abs(), 1, "{face:?}");
        }
    }

    #[test]
    fn quad_stays_on_outer_side_of_cell() {
        for face in Face::ALL {
            let q = face.chunk_quad();
            let d = face.delta();
            let plane = if d.dot(IVec3::new(1, 1, 1)) > 0 { 1 } else { 0 };
            for p in [q.corner, q.corner + q.u, q.corner + q.v, q.corner + q.u + q.v] {
                assert_eq!(p.dot(d).abs(), plane, "{face:?}");
                assert!(p.x >= 0 && p.x <= 1 && p.y >= 0 && p.y <= 1 && p.z >= 0 && p.z <= 1);
            }
        }
    }

    #[test]
    fn index_roundtrip() {
        for face in Face::ALL {
            assert_eq!(Face::from_index(face.index()), face);
        }
        assert_eq!(Face::from_index(17), Face::PosZ);
    }
}
