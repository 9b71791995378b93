//! Per-chunk terrain renderer: lazily rebuilt mesh, realization, and the
//! toroidal placement the passes draw it at.

use std::rc::Rc;

use voxmesh_geom::{Aabb, Vec3};
use voxmesh_mesh_cpu::{CHUNK_SIZE, ChunkMeshOptions, ChunkMesher, ChunkVertex};
use voxmesh_voxel::{ChunkCoord, VoxelSource};

use crate::buffers::MeshBuffers;
use crate::cull::{CullVolume, DynamicLight, ViewState};
use crate::device::{BufferUsage, GpuDevice, UniformValue};
use crate::program::ProgramBindings;

/// Vertex attributes each terrain pass binds, by shader name.
pub const CHUNK_DEPTH_ATTRIBS: &[&str] = &["positionAttribute"];
pub const CHUNK_SUNLIGHT_ATTRIBS: &[&str] = &[
    "positionAttribute",
    "ambientOcclusionCoordAttribute",
    "colorAttribute",
    "normalAttribute",
    "fixedPositionAttribute",
];
pub const CHUNK_DLIGHT_ATTRIBS: &[&str] = &["positionAttribute", "colorAttribute", "normalAttribute"];

/// What every chunk pass needs besides the chunk itself.
pub struct ChunkFrame<'a> {
    pub device: &'a Rc<dyn GpuDevice>,
    pub view: ViewState,
    pub cull: &'a dyn CullVolume,
}

#[derive(Debug)]
pub struct MapChunk {
    coord: ChunkCoord,
    mesher: ChunkMesher,
    buffers: Option<MeshBuffers>,
    realized: bool,
    needs_update: bool,
    aabb: Aabb,
    center: Vec3,
    radius: f32,
    /// Horizontal wrap period of the map, in cells.
    period: (f32, f32),
}

impl MapChunk {
    pub fn new(coord: ChunkCoord, opts: ChunkMeshOptions, period: (f32, f32)) -> Self {
        let base = coord.origin(CHUNK_SIZE);
        let size = Vec3::from(opts.span(base));
        let aabb = Aabb::from_origin_size(Vec3::from(base), size);
        Self {
            coord,
            mesher: ChunkMesher::new(opts),
            buffers: None,
            realized: false,
            needs_update: false,
            aabb,
            center: aabb.center(),
            radius: size.length() * 0.5,
            period,
        }
    }

    #[inline]
    pub fn coord(&self) -> ChunkCoord {
        self.coord
    }

    #[inline]
    pub fn is_realized(&self) -> bool {
        self.realized
    }

    /// True while an edit is waiting for the next pass.
    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.needs_update
    }

    #[inline]
    pub fn aabb(&self) -> Aabb {
        self.aabb
    }

    #[inline]
    pub fn center(&self) -> Vec3 {
        self.center
    }

    #[inline]
    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn buffers(&self) -> Option<&MeshBuffers> {
        self.buffers.as_ref()
    }

    /// Unrealizing frees GPU and CPU data; realizing schedules a rebuild.
    pub fn set_realized(&mut self, realized: bool) {
        if self.realized == realized {
            return;
        }
        if realized {
            self.needs_update = true;
        } else {
            self.buffers = None;
            self.mesher.release();
        }
        self.realized = realized;
    }

    pub fn mark_dirty(&mut self) {
        self.needs_update = true;
    }

    /// Offset that moves the chunk to the copy nearest `eye` on the torus.
    pub fn wrap_shift(&self, eye: Vec3) -> (f32, f32) {
        let diff = eye - self.center;
        let (px, py) = self.period;
        let shift = |d: f32, p: f32| {
            if d > p * 0.5 {
                p
            } else if d < -p * 0.5 {
                -p
            } else {
                0.0
            }
        };
        (shift(diff.x, px), shift(diff.y, py))
    }

    /// Horizontal Chebyshev distance to the nearest copy of the chunk, minus
    /// half a chunk. There is no vertical term.
    pub fn distance_from_eye(&self, eye: Vec3) -> f32 {
        let (sx, sy) = self.wrap_shift(eye);
        let dx = eye.x - (self.center.x + sx);
        let dy = eye.y - (self.center.y + sy);
        (dx.abs().max(dy.abs()) - CHUNK_SIZE as f32 * 0.5).max(0.0)
    }

    fn update<S: VoxelSource + ?Sized>(&mut self, device: &Rc<dyn GpuDevice>, src: &S) {
        self.buffers = None;
        let mesh = self.mesher.build(src, self.coord);
        self.buffers = MeshBuffers::upload(device, mesh, ChunkVertex::LAYOUT, BufferUsage::DynamicDraw);
        log::trace!(
            "chunk {:?} rebuilt: {} triangles",
            self.coord,
            self.buffers.as_ref().map_or(0, |b| b.triangle_count())
        );
    }

    /// Rebuilds if dirty and returns the wrapped box when there is anything
    /// visible to draw.
    fn prepare<S: VoxelSource + ?Sized>(&mut self, frame: &ChunkFrame<'_>, src: &S) -> Option<Aabb> {
        if !self.realized {
            return None;
        }
        if self.needs_update {
            self.update(frame.device, src);
            self.needs_update = false;
        }
        self.buffers.as_ref()?;
        let (sx, sy) = self.wrap_shift(frame.view.eye);
        let bx = self.aabb.translated(Vec3::new(sx, sy, 0.0));
        frame.cull.box_visible(&bx).then_some(bx)
    }

    fn submit<S: VoxelSource + ?Sized>(
        &mut self,
        frame: &ChunkFrame<'_>,
        src: &S,
        prog: &ProgramBindings,
        names: &[&str],
        lights: Option<&[DynamicLight]>,
    ) -> usize {
        let Some(bx) = self.prepare(frame, src) else {
            return 0;
        };
        let Some(buffers) = self.buffers.as_ref() else {
            return 0;
        };
        let device: &dyn GpuDevice = frame.device.as_ref();
        prog.set(device, "chunkPosition", UniformValue::Vec3([bx.min.x, bx.min.y, bx.min.z]));
        let enabled = buffers.bind(device, prog, names);
        let mut draws = 0;
        match lights {
            None => {
                buffers.draw(device);
                draws += 1;
            }
            Some(lights) => {
                for light in lights {
                    if !light.touches_box(&bx) {
                        continue;
                    }
                    set_light(device, prog, light);
                    buffers.draw(device);
                    draws += 1;
                }
            }
        }
        MeshBuffers::unbind(device, &enabled);
        draws
    }

    /// Returns the number of draw calls issued.
    pub fn render_depth_pass<S: VoxelSource + ?Sized>(
        &mut self,
        frame: &ChunkFrame<'_>,
        src: &S,
        prog: &ProgramBindings,
    ) -> usize {
        self.submit(frame, src, prog, CHUNK_DEPTH_ATTRIBS, None)
    }

    pub fn render_sunlight_pass<S: VoxelSource + ?Sized>(
        &mut self,
        frame: &ChunkFrame<'_>,
        src: &S,
        prog: &ProgramBindings,
    ) -> usize {
        self.submit(frame, src, prog, CHUNK_SUNLIGHT_ATTRIBS, None)
    }

    /// One draw per light whose range reaches the chunk.
    pub fn render_dlight_pass<S: VoxelSource + ?Sized>(
        &mut self,
        frame: &ChunkFrame<'_>,
        src: &S,
        prog: &ProgramBindings,
        lights: &[DynamicLight],
    ) -> usize {
        self.submit(frame, src, prog, CHUNK_DLIGHT_ATTRIBS, Some(lights))
    }
}

pub(crate) fn set_light(device: &dyn GpuDevice, prog: &ProgramBindings, light: &DynamicLight) {
    let p = light.position;
    let c = light.color;
    prog.set(device, "dynamicLightOrigin", UniformValue::Vec3([p.x, p.y, p.z]));
    prog.set(device, "dynamicLightRadius", UniformValue::Float(light.radius));
    prog.set(device, "dynamicLightColor", UniformValue::Vec3([c.x, c.y, c.z]));
}
