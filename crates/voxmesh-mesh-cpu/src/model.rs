//! Static model mesher: per-axis boundary slices, merged by the tile
//! triangulator and textured from a packed atlas of per-slice bitmaps.
//!
//! Each slice bitmap covers the slice's occupied bounds plus a one-texel
//! border. A texel stores the RGB of the cell it samples and, in alpha, the
//! AO selector of the empty cell in front of the face (or
//! [`EMISSIVE_SELECTOR`] for emissive cells). Border texels borrow the
//! nearest occupied neighbour so bilinear taps at polygon edges stay clean.

use voxmesh_geom::{Aabb, IVec3, Vec3};
use voxmesh_voxel::color::{self, MaterialKind};
use voxmesh_voxel::{VoxelModel, VoxelSource};

use crate::ao::{EMISSIVE_SELECTOR, ao_pattern};
use crate::atlas::{AtlasBuilder, Bitmap, Placement};
use crate::error::MeshError;
use crate::grid2::Grid2;
use crate::mesh_build::MeshBuild;
use crate::triangulate::{doubled_area, triangulate};
use crate::vertex::ModelVertex;

/// Largest model edge the `u8` vertex positions can address.
pub const MAX_MODEL_EDGE: usize = 255;

/// Debug color for border texels with no occupied neighbour.
pub const MAGENTA: u32 = 0x00FF_00FF;

/// Neighbour search order for border texels.
const BORDER_FALLBACK: [(i32, i32); 8] = [
    (-1, 0),
    (1, 0),
    (0, -1),
    (0, 1),
    (-1, -1),
    (-1, 1),
    (1, -1),
    (1, 1),
];

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ModelMeshStats {
    pub slices: usize,
    pub triangles: usize,
    pub degenerate_skipped: usize,
    pub magenta_texels: usize,
}

/// Result of meshing one model, ready for upload.
#[derive(Clone, Debug)]
pub struct ModelMeshCPU {
    pub mesh: MeshBuild<ModelVertex, u32>,
    pub atlas: Bitmap,
    pub placements: Vec<Placement>,
    /// Source bitmap of every vertex, parallel to `mesh.vertices`.
    pub vertex_bitmap: Vec<u16>,
    /// Model-space position of the grid corner; cell centres sit at `origin + i + 0.5`.
    pub origin: Vec3,
    pub dims: [usize; 3],
    pub bounds: Aabb,
    pub radius: f32,
    pub stats: ModelMeshStats,
}

impl ModelMeshCPU {
    pub fn center(&self) -> Vec3 {
        self.bounds.center()
    }
}

/// One slicing axis: `axis` is sliced, `(u, v)` span each layer.
struct SliceAxis {
    axis: IVec3,
    u: IVec3,
    v: IVec3,
    layers: usize,
    usize: usize,
    vsize: usize,
}

fn slice_axes(w: usize, h: usize, d: usize) -> [SliceAxis; 3] {
    [
        SliceAxis {
            axis: IVec3::X,
            u: IVec3::Y,
            v: IVec3::Z,
            layers: w,
            usize: h,
            vsize: d,
        },
        SliceAxis {
            axis: IVec3::Y,
            u: IVec3::X,
            v: IVec3::Z,
            layers: h,
            usize: w,
            vsize: d,
        },
        SliceAxis {
            axis: IVec3::Z,
            u: IVec3::X,
            v: IVec3::Y,
            layers: d,
            usize: w,
            vsize: h,
        },
    ]
}

struct ModelBuilder<'a> {
    model: &'a VoxelModel,
    mesh: MeshBuild<ModelVertex, u32>,
    vertex_bitmap: Vec<u16>,
    atlas: AtlasBuilder,
    stats: ModelMeshStats,
}

impl<'a> ModelBuilder<'a> {
    fn new(model: &'a VoxelModel) -> Self {
        Self {
            model,
            mesh: MeshBuild::default(),
            vertex_bitmap: Vec::new(),
            atlas: AtlasBuilder::new(),
            stats: ModelMeshStats::default(),
        }
    }

    fn run(&mut self) {
        let (w, h, d) = self.model.dims();
        for sa in slice_axes(w, h, d) {
            let mut mask = Grid2::new(sa.usize, sa.vsize, false);
            for layer in 0..sa.layers as i32 {
                for dir in [-1, 1] {
                    self.fill_mask(&mut mask, &sa, layer, dir);
                    self.emit_slice(&mask, &sa, layer, dir);
                }
            }
        }
    }

    /// A cell is present when it is solid and the cell past it along
    /// `axis * dir` is not.
    fn fill_mask(&self, mask: &mut Grid2<bool>, sa: &SliceAxis, layer: i32, dir: i32) {
        let base = sa.axis * layer;
        let step = sa.axis * dir;
        for v in 0..sa.vsize as i32 {
            for u in 0..sa.usize as i32 {
                let c = base + sa.u * u + sa.v * v;
                let o = c + step;
                let present =
                    self.model.is_solid(c.x, c.y, c.z) && !self.model.is_solid(o.x, o.y, o.z);
                mask.set(u, v, present);
            }
        }
    }

    fn emit_slice(&mut self, mask: &Grid2<bool>, sa: &SliceAxis, layer: i32, dir: i32) {
        let Some(rect) = mask.bounds() else {
            return;
        };
        let n = sa.axis * dir;
        let cells = sa.axis * layer;
        let origin = sa.axis * (layer + i32::from(dir > 0));
        let tu = rect.min_u as i32 - 1;
        let tv = rect.min_v as i32 - 1;

        let bitmap = self.slice_bitmap(mask, sa, cells, n, tu, tv, rect.width() + 2, rect.height() + 2);
        let bitmap_id = self.atlas.add(bitmap) as u16;
        self.stats.slices += 1;

        let front = sa.u.cross(sa.v).dot(n) > 0;
        let nx = n.x as i8;
        let ny = n.y as i8;
        let nz = n.z as i8;
        let mut emitted = 0usize;
        for tri in triangulate(mask) {
            if doubled_area(tri[0], tri[1], tri[2]) == 0 {
                self.stats.degenerate_skipped += 1;
                continue;
            }
            let i = self.mesh.vertices.len() as u32;
            for p in tri {
                let pos = origin + sa.u * p.x + sa.v * p.y;
                self.mesh.vertices.push(ModelVertex {
                    x: pos.x as u8,
                    y: pos.y as u8,
                    z: pos.z as u8,
                    _pad0: 0,
                    u: (p.x - tu) as u16,
                    v: (p.y - tv) as u16,
                    nx,
                    ny,
                    nz,
                    _pad1: 0,
                });
                self.vertex_bitmap.push(bitmap_id);
            }
            if front {
                self.mesh.indices.extend_from_slice(&[i, i + 1, i + 2]);
            } else {
                self.mesh.indices.extend_from_slice(&[i + 2, i + 1, i]);
            }
            emitted += 1;
        }
        self.stats.triangles += emitted;
        log::trace!(
            "slice axis {:?} layer {} dir {}: {}x{} bitmap, {} triangles",
            sa.axis,
            layer,
            dir,
            rect.width() + 2,
            rect.height() + 2,
            emitted
        );
    }

    #[allow(clippy::too_many_arguments)]
    fn slice_bitmap(
        &mut self,
        mask: &Grid2<bool>,
        sa: &SliceAxis,
        cells: IVec3,
        n: IVec3,
        tu: i32,
        tv: i32,
        bw: usize,
        bh: usize,
    ) -> Bitmap {
        let mut bmp = Bitmap::new(bw, bh);
        for y in 0..bh {
            for x in 0..bw {
                let (u, v) = (x as i32 + tu, y as i32 + tv);
                let src = if mask.occupied(u, v) {
                    Some((u, v))
                } else {
                    BORDER_FALLBACK
                        .iter()
                        .map(|&(du, dv)| (u + du, v + dv))
                        .find(|&(nu, nv)| mask.occupied(nu, nv))
                };
                let texel = match src {
                    Some((su, sv)) => self.texel(cells + sa.u * su + sa.v * sv, sa, n),
                    None => {
                        self.stats.magenta_texels += 1;
                        MAGENTA
                    }
                };
                bmp.set(x, y, texel);
            }
        }
        bmp
    }

    fn texel(&self, cell: IVec3, sa: &SliceAxis, n: IVec3) -> u32 {
        debug_assert!(self.model.is_solid(cell.x, cell.y, cell.z), "texel samples empty cell {cell:?}");
        let value = self.model.color(cell.x, cell.y, cell.z);
        let rgb = color::rgb(value);
        let selector = match MaterialKind::from_tag(color::tag(value)) {
            MaterialKind::Emissive => EMISSIVE_SELECTOR,
            MaterialKind::Default => {
                let front = cell + n;
                debug_assert!(
                    !self.model.is_solid(front.x, front.y, front.z),
                    "face at {cell:?} is covered"
                );
                ao_pattern(self.model, front, sa.u, sa.v).model_selector()
            }
        };
        rgb | (u32::from(selector) << 24)
    }
}

/// Meshes `model` into merged, atlas-textured triangles.
pub fn build_model_mesh(model: &VoxelModel) -> Result<ModelMeshCPU, MeshError> {
    let (w, h, d) = model.dims();
    if w > MAX_MODEL_EDGE || h > MAX_MODEL_EDGE || d > MAX_MODEL_EDGE {
        return Err(MeshError::ModelTooLarge {
            width: w,
            height: h,
            depth: d,
        });
    }

    let mut b = ModelBuilder::new(model);
    b.run();
    let ModelBuilder {
        mut mesh,
        vertex_bitmap,
        atlas,
        stats,
        ..
    } = b;

    let packed = atlas.pack();
    let (aw, ah) = (packed.bitmap.width(), packed.bitmap.height());
    if aw > u16::MAX as usize || ah > u16::MAX as usize {
        return Err(MeshError::AtlasTooLarge {
            width: aw,
            height: ah,
        });
    }
    debug_assert_eq!(vertex_bitmap.len(), mesh.vertices.len());
    for (vtx, &id) in mesh.vertices.iter_mut().zip(&vertex_bitmap) {
        let p = packed.placements[id as usize];
        vtx.u += p.x as u16;
        vtx.v += p.y as u16;
    }

    let origin = model.origin() - 0.5;
    let size = Vec3::new(w as f32, h as f32, d as f32);
    let bounds = Aabb::from_origin_size(origin, size);
    let radius = bounds.min.abs().max(bounds.max.abs()).length();

    if stats.magenta_texels > 0 {
        log::warn!("model atlas has {} unfilled texels", stats.magenta_texels);
    }
    log::debug!(
        "model {}x{}x{}: {} slices, {} triangles, atlas {}x{}",
        w,
        h,
        d,
        stats.slices,
        stats.triangles,
        aw,
        ah
    );

    Ok(ModelMeshCPU {
        mesh,
        atlas: packed.bitmap,
        placements: packed.placements,
        vertex_bitmap,
        origin,
        dims: [w, h, d],
        bounds,
        radius,
        stats,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model_with(dims: (usize, usize, usize), cells: &[(i32, i32, i32)], material: MaterialKind) -> VoxelModel {
        let mut m = VoxelModel::new(dims.0, dims.1, dims.2);
        for &(x, y, z) in cells {
            m.set_solid(x, y, z, [10, 20, 30], material);
        }
        m
    }

    fn position(v: &ModelVertex) -> IVec3 {
        IVec3::new(v.x as i32, v.y as i32, v.z as i32)
    }

    #[test]
    fn single_voxel_is_twelve_triangles() {
        let m = model_with((1, 1, 1), &[(0, 0, 0)], MaterialKind::Default);
        let out = build_model_mesh(&m).expect("mesh");
        assert_eq!(out.mesh.triangle_count(), 12);
        assert_eq!(out.mesh.vertices.len(), 36);
        assert_eq!(out.stats.slices, 6);
        assert!(out.placements.iter().all(|p| (p.width, p.height) == (3, 3)));
        assert_eq!(out.stats.magenta_texels, 0);
    }

    #[test]
    fn two_cell_bar_merges_caps() {
        let m = model_with((2, 1, 1), &[(0, 0, 0), (1, 0, 0)], MaterialKind::Default);
        let out = build_model_mesh(&m).expect("mesh");
        assert_eq!(out.mesh.triangle_count(), 12);
        assert!(out.mesh.triangle_count() < 24);
    }

    #[test]
    fn solid_cube_only_meshes_its_shell() {
        let mut cells = Vec::new();
        for z in 0..3 {
            for y in 0..3 {
                for x in 0..3 {
                    cells.push((x, y, z));
                }
            }
        }
        let m = model_with((3, 3, 3), &cells, MaterialKind::Default);
        let out = build_model_mesh(&m).expect("mesh");
        assert_eq!(out.mesh.triangle_count(), 12);
        for v in &out.mesh.vertices {
            let p = position(v);
            let on_shell = [p.x, p.y, p.z].iter().any(|&c| c == 0 || c == 3);
            assert!(on_shell, "vertex {p:?} inside the cube");
        }
    }

    #[test]
    fn winding_matches_stored_normal() {
        let cells = [(0, 0, 0), (1, 0, 0), (1, 1, 0), (1, 1, 1), (3, 2, 1), (0, 2, 2)];
        let m = model_with((4, 3, 3), &cells, MaterialKind::Default);
        let out = build_model_mesh(&m).expect("mesh");
        assert!(out.mesh.triangle_count() > 0);
        for tri in out.mesh.indices.chunks(3) {
            let [a, b, c] = [0, 1, 2].map(|k| out.mesh.vertices[tri[k] as usize]);
            let geo = (position(&b) - position(&a)).cross(position(&c) - position(&a));
            let stored = IVec3::new(a.nx as i32, a.ny as i32, a.nz as i32);
            assert_ne!(geo, IVec3::ZERO);
            assert!(geo.dot(stored) > 0, "triangle faces away from {stored:?}");
            assert_eq!(geo.cross(stored), IVec3::ZERO);
        }
    }

    #[test]
    fn uvs_fall_inside_their_bitmap() {
        let cells = [(0, 0, 0), (1, 0, 0), (1, 1, 0), (2, 1, 1)];
        let m = model_with((3, 2, 2), &cells, MaterialKind::Default);
        let out = build_model_mesh(&m).expect("mesh");
        for (v, &id) in out.mesh.vertices.iter().zip(&out.vertex_bitmap) {
            let p = out.placements[id as usize];
            assert!(p.contains(v.u as usize, v.v as usize), "uv ({}, {}) outside {p:?}", v.u, v.v);
            // Corners of covered cells never touch the one-texel border.
            assert!(v.u as usize > p.x && (v.u as usize) < p.x + p.width);
            assert!(v.v as usize > p.y && (v.v as usize) < p.y + p.height);
        }
    }

    #[test]
    fn emissive_texels_skip_ao() {
        let m = model_with((1, 2, 1), &[(0, 0, 0), (0, 1, 0)], MaterialKind::Emissive);
        let out = build_model_mesh(&m).expect("mesh");
        for p in &out.placements {
            for y in p.y..p.y + p.height {
                for x in p.x..p.x + p.width {
                    let t = out.atlas.get(x, y).unwrap_or(0);
                    assert_eq!(t >> 24, u32::from(EMISSIVE_SELECTOR));
                    assert_eq!(t & 0xFF_FFFF, 0x1E140A);
                }
            }
        }
    }

    #[test]
    fn default_texels_carry_neighbour_ao() {
        // Step: (0,0,0) and (1,0,0) on the floor, (1,0,1) stacked on the right cell.
        let cells = [(0, 0, 0), (1, 0, 0), (1, 0, 1)];
        let m = model_with((2, 1, 2), &cells, MaterialKind::Default);
        let out = build_model_mesh(&m).expect("mesh");
        // The +Z face of (0,0,0) looks at (0,0,1), whose +X neighbour is solid.
        let cell = IVec3::new(0, 0, 1);
        let expected = ao_pattern(&m, cell, IVec3::X, IVec3::Y).model_selector();
        assert_eq!(expected, 2);
        let found = out.atlas.pixels().iter().any(|&t| t >> 24 == 2);
        assert!(found);
    }

    #[test]
    fn placement_values() {
        let mut m = model_with((4, 2, 2), &[(0, 0, 0)], MaterialKind::Default);
        m.set_origin(Vec3::new(-2.0, -1.0, 0.0));
        let out = build_model_mesh(&m).expect("mesh");
        assert_eq!(out.origin, Vec3::new(-2.5, -1.5, -0.5));
        assert_eq!(out.bounds.min, Vec3::new(-2.5, -1.5, -0.5));
        assert_eq!(out.bounds.max, Vec3::new(1.5, 0.5, 1.5));
        assert!((out.radius - 10.75f32.sqrt()).abs() < 1e-5);
        assert_eq!(out.dims, [4, 2, 2]);
    }

    #[test]
    fn oversized_model_is_rejected() {
        let m = VoxelModel::new(256, 1, 1);
        assert_eq!(
            build_model_mesh(&m).err(),
            Some(MeshError::ModelTooLarge {
                width: 256,
                height: 1,
                depth: 1
            })
        );
    }

    #[test]
    fn empty_model_has_no_geometry() {
        let out = build_model_mesh(&VoxelModel::new(3, 3, 3)).expect("mesh");
        assert!(out.mesh.is_empty());
        assert!(out.placements.is_empty());
        assert_eq!((out.atlas.width(), out.atlas.height()), (1, 1));
    }

    #[test]
    fn rebuild_is_byte_identical() {
        let cells = [(0, 0, 0), (1, 0, 0), (1, 1, 0), (2, 1, 1)];
        let m = model_with((3, 2, 2), &cells, MaterialKind::Default);
        let a = build_model_mesh(&m).expect("mesh");
        let b = build_model_mesh(&m).expect("mesh");
        assert_eq!(a.mesh.vertex_bytes(), b.mesh.vertex_bytes());
        assert_eq!(a.mesh.index_bytes(), b.mesh.index_bytes());
        assert_eq!(a.atlas, b.atlas);
    }
}
