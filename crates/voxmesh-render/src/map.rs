use std::rc::Rc;

use hashbrown::HashMap;
use voxmesh_geom::Vec3;
use voxmesh_mesh_cpu::{CHUNK_SIZE, ChunkMeshOptions};
use voxmesh_voxel::{ChunkCoord, GameMap};

use crate::chunk::{CHUNK_DEPTH_ATTRIBS, CHUNK_DLIGHT_ATTRIBS, CHUNK_SUNLIGHT_ATTRIBS, ChunkFrame, MapChunk};
use crate::cull::{CullVolume, DynamicLight, ViewState};
use crate::device::{GpuDevice, ProgramId};
use crate::program::ProgramBindings;

/// Uniforms the terrain programs are linked with.
pub const CHUNK_UNIFORMS: &[&str] = &["chunkPosition"];
pub const CHUNK_DLIGHT_UNIFORMS: &[&str] = &[
    "chunkPosition",
    "dynamicLightOrigin",
    "dynamicLightRadius",
    "dynamicLightColor",
];

/// Linked programs for the three terrain passes.
#[derive(Clone, Debug)]
pub struct ChunkPrograms {
    pub depth: ProgramBindings,
    pub sunlight: ProgramBindings,
    pub dlight: ProgramBindings,
}

impl ChunkPrograms {
    pub fn link(device: &dyn GpuDevice, depth: ProgramId, sunlight: ProgramId, dlight: ProgramId) -> Self {
        Self {
            depth: ProgramBindings::link(device, depth, CHUNK_DEPTH_ATTRIBS, CHUNK_UNIFORMS),
            sunlight: ProgramBindings::link(device, sunlight, CHUNK_SUNLIGHT_ATTRIBS, CHUNK_UNIFORMS),
            dlight: ProgramBindings::link(device, dlight, CHUNK_DLIGHT_ATTRIBS, CHUNK_DLIGHT_UNIFORMS),
        }
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct MapStats {
    pub chunks: usize,
    pub realized: usize,
    /// Realized chunks with uploaded geometry.
    pub built: usize,
    pub dirty: usize,
    pub triangles: usize,
}

/// Owns one [`MapChunk`] per chunk of the map and routes edits and passes to them.
pub struct MapRenderer {
    device: Rc<dyn GpuDevice>,
    programs: ChunkPrograms,
    chunks: HashMap<ChunkCoord, MapChunk>,
    width: i32,
    height: i32,
}

impl MapRenderer {
    pub fn new(device: Rc<dyn GpuDevice>, programs: ChunkPrograms, map: &GameMap, water: bool) -> Self {
        let opts = ChunkMeshOptions::for_map(map, water);
        let period = (map.width() as f32, map.height() as f32);
        let n = |cells: i32| (cells + CHUNK_SIZE - 1) / CHUNK_SIZE;
        let (nx, ny, nz) = (n(map.width()), n(map.height()), n(map.depth()));
        let mut chunks = HashMap::with_capacity((nx * ny * nz) as usize);
        for cz in 0..nz {
            for cy in 0..ny {
                for cx in 0..nx {
                    let coord = ChunkCoord::new(cx, cy, cz);
                    chunks.insert(coord, MapChunk::new(coord, opts, period));
                }
            }
        }
        log::debug!("map renderer: {}x{}x{} chunks", nx, ny, nz);
        Self {
            device,
            programs,
            chunks,
            width: map.width(),
            height: map.height(),
        }
    }

    pub fn chunk(&self, coord: ChunkCoord) -> Option<&MapChunk> {
        self.chunks.get(&coord)
    }

    pub fn chunks(&self) -> impl Iterator<Item = &MapChunk> {
        self.chunks.values()
    }

    /// Realizes chunks within `distance` of `eye` and frees the rest.
    pub fn realize_chunks(&mut self, eye: Vec3, distance: f32) {
        for chunk in self.chunks.values_mut() {
            let near = chunk.distance_from_eye(eye) <= distance;
            chunk.set_realized(near);
        }
    }

    /// Marks every chunk that can see cell `(x, y, z)` dirty. Faces and AO
    /// read one cell past the chunk, so the 3×3×3 neighbourhood counts.
    pub fn game_map_changed(&mut self, x: i32, y: i32, z: i32) {
        for dz in -1..=1 {
            for dy in -1..=1 {
                for dx in -1..=1 {
                    let wx = (x + dx).rem_euclid(self.width);
                    let wy = (y + dy).rem_euclid(self.height);
                    let coord = ChunkCoord::containing(wx, wy, z + dz, CHUNK_SIZE);
                    if let Some(chunk) = self.chunks.get_mut(&coord) {
                        chunk.mark_dirty();
                    }
                }
            }
        }
    }

    pub fn render_depth_pass(&mut self, map: &GameMap, view: ViewState, cull: &dyn CullVolume) -> usize {
        let frame = ChunkFrame {
            device: &self.device,
            view,
            cull,
        };
        self.programs.depth.use_program(self.device.as_ref());
        self.chunks
            .values_mut()
            .map(|c| c.render_depth_pass(&frame, map, &self.programs.depth))
            .sum()
    }

    pub fn render_sunlight_pass(&mut self, map: &GameMap, view: ViewState, cull: &dyn CullVolume) -> usize {
        let frame = ChunkFrame {
            device: &self.device,
            view,
            cull,
        };
        self.programs.sunlight.use_program(self.device.as_ref());
        self.chunks
            .values_mut()
            .map(|c| c.render_sunlight_pass(&frame, map, &self.programs.sunlight))
            .sum()
    }

    pub fn render_dlight_pass(
        &mut self,
        map: &GameMap,
        view: ViewState,
        cull: &dyn CullVolume,
        lights: &[DynamicLight],
    ) -> usize {
        if lights.is_empty() {
            return 0;
        }
        let frame = ChunkFrame {
            device: &self.device,
            view,
            cull,
        };
        self.programs.dlight.use_program(self.device.as_ref());
        self.chunks
            .values_mut()
            .map(|c| c.render_dlight_pass(&frame, map, &self.programs.dlight, lights))
            .sum()
    }

    pub fn stats(&self) -> MapStats {
        let mut s = MapStats {
            chunks: self.chunks.len(),
            ..MapStats::default()
        };
        for c in self.chunks.values() {
            if c.is_realized() {
                s.realized += 1;
            }
            if c.is_dirty() {
                s.dirty += 1;
            }
            if let Some(b) = c.buffers() {
                s.built += 1;
                s.triangles += b.triangle_count();
            }
        }
        s
    }
}
