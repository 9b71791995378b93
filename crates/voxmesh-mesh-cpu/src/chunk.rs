//! Terrain chunk mesher: one unshared quad per exposed cell face, no merging.

use voxmesh_geom::IVec3;
use voxmesh_voxel::color::{self, HEALTH_FULL};
use voxmesh_voxel::{ChunkCoord, GameMap, VoxelSource};

use crate::ao::ao_pattern;
use crate::face::Face;
use crate::mesh_build::MeshBuild;
use crate::vertex::ChunkVertex;

/// Cells per chunk edge. Bounded by the `u8` positions and `i8` fixed
/// positions of [`ChunkVertex`] and by 16-bit indices.
pub const CHUNK_SIZE: i32 = 16;

/// AO texel span across one quad.
const AO_QUAD_SPAN: u16 = 15;

pub type ChunkMeshCPU = MeshBuild<ChunkVertex, u16>;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ChunkMeshOptions {
    /// Layer whose solidity is read from the layer above it, so the water
    /// surface sits one cell lower than the stored map.
    pub water_layer: Option<i32>,
    /// Map size in cells. Chunks on the far edge of a map that is not a
    /// multiple of [`CHUNK_SIZE`] only mesh the cells inside it.
    pub extent: Option<IVec3>,
}

impl ChunkMeshOptions {
    pub fn for_map(map: &GameMap, water: bool) -> Self {
        Self {
            water_layer: water.then(|| map.depth() - 1),
            extent: Some(IVec3::new(map.width(), map.height(), map.depth())),
        }
    }

    /// Cells of the chunk at `base` that lie inside the map, per axis.
    pub fn span(&self, base: IVec3) -> IVec3 {
        let clip = |len: i32, b: i32| (len - b).clamp(0, CHUNK_SIZE);
        match self.extent {
            Some(e) => IVec3::new(clip(e.x, base.x), clip(e.y, base.y), clip(e.z, base.z)),
            None => IVec3::new(CHUNK_SIZE, CHUNK_SIZE, CHUNK_SIZE),
        }
    }
}

/// Solidity as the chunk mesher sees it; colors pass through unchanged.
struct ChunkView<'a, S: ?Sized> {
    src: &'a S,
    water_layer: Option<i32>,
}

impl<S: VoxelSource + ?Sized> VoxelSource for ChunkView<'_, S> {
    #[inline]
    fn is_solid(&self, x: i32, y: i32, z: i32) -> bool {
        let z = if self.water_layer == Some(z) { z - 1 } else { z };
        self.src.is_solid(x, y, z)
    }

    #[inline]
    fn color(&self, x: i32, y: i32, z: i32) -> u32 {
        self.src.color(x, y, z)
    }
}

/// Damaged blocks are drawn at half brightness.
#[inline]
pub fn shaded_color(value: u32) -> u32 {
    let rgb = color::rgb(value);
    if color::tag(value) < HEALTH_FULL {
        (rgb & 0x00FE_FEFE) >> 1
    } else {
        rgb
    }
}

/// Owns the scratch arrays for one chunk so rebuilds reuse their capacity.
#[derive(Default, Debug)]
pub struct ChunkMesher {
    opts: ChunkMeshOptions,
    mesh: ChunkMeshCPU,
}

impl ChunkMesher {
    pub fn new(opts: ChunkMeshOptions) -> Self {
        Self {
            opts,
            mesh: ChunkMeshCPU::default(),
        }
    }

    pub fn options(&self) -> ChunkMeshOptions {
        self.opts
    }

    pub fn set_options(&mut self, opts: ChunkMeshOptions) {
        self.opts = opts;
    }

    /// Last built mesh.
    pub fn mesh(&self) -> &ChunkMeshCPU {
        &self.mesh
    }

    pub fn into_mesh(self) -> ChunkMeshCPU {
        self.mesh
    }

    /// Frees the scratch arrays.
    pub fn release(&mut self) {
        self.mesh = ChunkMeshCPU::default();
    }

    /// Clears and rebuilds the mesh for `coord`.
    pub fn build<S: VoxelSource + ?Sized>(&mut self, src: &S, coord: ChunkCoord) -> &ChunkMeshCPU {
        self.mesh.clear_keep_capacity();
        let view = ChunkView {
            src,
            water_layer: self.opts.water_layer,
        };
        let base = coord.origin(CHUNK_SIZE);
        let span = self.opts.span(base);
        for lx in 0..span.x {
            for ly in 0..span.y {
                for lz in 0..span.z {
                    let local = IVec3::new(lx, ly, lz);
                    let world = base + local;
                    if !view.is_solid(world.x, world.y, world.z) {
                        continue;
                    }
                    let col = shaded_color(view.color(world.x, world.y, world.z));
                    for face in Face::ALL {
                        let out = world + face.delta();
                        if !view.is_solid(out.x, out.y, out.z) {
                            emit_quad(&mut self.mesh, &view, local, out, face, col);
                        }
                    }
                }
            }
        }
        log::trace!(
            "chunk {:?}: {} quads",
            coord,
            self.mesh.vertices.len() / 4
        );
        &self.mesh
    }
}

fn emit_quad<S: VoxelSource + ?Sized>(
    mesh: &mut ChunkMeshCPU,
    src: &S,
    local: IVec3,
    ao_cell: IVec3,
    face: Face,
    col: u32,
) {
    let q = face.chunk_quad();
    let n = face.delta();
    let p = local + q.corner;
    let (ao_x, ao_y) = ao_pattern(src, ao_cell, q.u, q.v).texel_origin();
    let fixed = p * 2 + q.u + q.v;
    let [r, g, b, _] = col.to_le_bytes();
    let template = ChunkVertex {
        r,
        g,
        b,
        shading: face.shading(),
        nx: n.x as i8,
        ny: n.y as i8,
        nz: n.z as i8,
        sx: fixed.x as i8,
        sy: fixed.y as i8,
        sz: fixed.z as i8,
        ..ChunkVertex::default()
    };
    let i = mesh.vertices.len() as u16;
    let corners = [
        (p, 0, 0),
        (p + q.u, AO_QUAD_SPAN, 0),
        (p + q.v, 0, AO_QUAD_SPAN),
        (p + q.u + q.v, AO_QUAD_SPAN, AO_QUAD_SPAN),
    ];
    for (c, du, dv) in corners {
        mesh.vertices.push(ChunkVertex {
            x: c.x as u8,
            y: c.y as u8,
            z: c.z as u8,
            ao_x: ao_x + du,
            ao_y: ao_y + dv,
            ..template
        });
    }
    mesh.indices
        .extend_from_slice(&[i, i + 1, i + 2, i + 1, i + 3, i + 2]);
}

/// One-shot convenience over [`ChunkMesher`].
pub fn build_chunk_mesh<S: VoxelSource + ?Sized>(
    src: &S,
    coord: ChunkCoord,
    opts: ChunkMeshOptions,
) -> ChunkMeshCPU {
    let mut mesher = ChunkMesher::new(opts);
    mesher.build(src, coord);
    mesher.into_mesh()
}
