use voxmesh_geom::Vec3;

use crate::VoxelSource;
use crate::color::{self, MaterialKind};

/// Dense static voxel model. Cells outside the grid are empty.
#[derive(Clone, Debug)]
pub struct VoxelModel {
    width: usize,
    height: usize,
    depth: usize,
    origin: Vec3,
    cells: Vec<Option<u32>>,
}

impl VoxelModel {
    pub fn new(width: usize, height: usize, depth: usize) -> Self {
        Self {
            width,
            height,
            depth,
            origin: Vec3::ZERO,
            cells: vec![None; width * height * depth],
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn depth(&self) -> usize {
        self.depth
    }

    #[inline]
    pub fn dims(&self) -> (usize, usize, usize) {
        (self.width, self.height, self.depth)
    }

    /// Model-space position of the centre of cell (0,0,0).
    #[inline]
    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    pub fn set_origin(&mut self, origin: Vec3) {
        self.origin = origin;
    }

    #[inline]
    fn idx(&self, x: i32, y: i32, z: i32) -> Option<usize> {
        if x < 0 || y < 0 || z < 0 {
            return None;
        }
        let (x, y, z) = (x as usize, y as usize, z as usize);
        if x >= self.width || y >= self.height || z >= self.depth {
            return None;
        }
        Some((z * self.height + y) * self.width + x)
    }

    /// Fills a cell; out-of-range writes are ignored.
    pub fn set_solid(&mut self, x: i32, y: i32, z: i32, rgb: [u8; 3], material: MaterialKind) {
        if let Some(i) = self.idx(x, y, z) {
            self.cells[i] = Some(color::pack(rgb, material.tag()));
        }
    }

    pub fn set_empty(&mut self, x: i32, y: i32, z: i32) {
        if let Some(i) = self.idx(x, y, z) {
            self.cells[i] = None;
        }
    }

    pub fn solid_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }

    pub fn material(&self, x: i32, y: i32, z: i32) -> Option<MaterialKind> {
        let i = self.idx(x, y, z)?;
        self.cells[i].map(|c| MaterialKind::from_tag(color::tag(c)))
    }
}

impl VoxelSource for VoxelModel {
    #[inline]
    fn is_solid(&self, x: i32, y: i32, z: i32) -> bool {
        self.idx(x, y, z).is_some_and(|i| self.cells[i].is_some())
    }

    #[inline]
    fn color(&self, x: i32, y: i32, z: i32) -> u32 {
        self.idx(x, y, z)
            .and_then(|i| self.cells[i])
            .unwrap_or(0)
    }
}
