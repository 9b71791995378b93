//! Voxel data sources: terrain maps, static models, and scene loading.
#![forbid(unsafe_code)]

pub mod color;
pub mod map;
pub mod model;
pub mod scene;

mod chunk_coord;

pub use chunk_coord::ChunkCoord;
pub use color::MaterialKind;
pub use map::GameMap;
pub use model::VoxelModel;

/// Read-only view of a voxel grid as consumed by the meshers.
///
/// Implementations decide how out-of-range coordinates resolve; the meshers
/// sample one cell past every face and rely on that rule.
pub trait VoxelSource {
    fn is_solid(&self, x: i32, y: i32, z: i32) -> bool;

    /// Stored 32-bit value: low 24 bits RGB (red in the lowest byte), top byte tag.
    fn color(&self, x: i32, y: i32, z: i32) -> u32;
}

impl<T: VoxelSource + ?Sized> VoxelSource for &T {
    #[inline]
    fn is_solid(&self, x: i32, y: i32, z: i32) -> bool {
        (**self).is_solid(x, y, z)
    }

    #[inline]
    fn color(&self, x: i32, y: i32, z: i32) -> u32 {
        (**self).color(x, y, z)
    }
}
