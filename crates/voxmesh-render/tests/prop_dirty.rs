use std::rc::Rc;

use hashbrown::HashSet;
use proptest::prelude::*;
use voxmesh_mesh_cpu::CHUNK_SIZE;
use voxmesh_render::{
    CHUNK_DEPTH_ATTRIBS, CHUNK_DLIGHT_ATTRIBS, CHUNK_DLIGHT_UNIFORMS, CHUNK_SUNLIGHT_ATTRIBS, CHUNK_UNIFORMS,
    ChunkPrograms, GpuDevice, HeadlessDevice, MapRenderer,
};
use voxmesh_voxel::{ChunkCoord, GameMap};

fn renderer(map: &GameMap) -> MapRenderer {
    let dev = Rc::new(HeadlessDevice::new());
    let depth = dev.register_program(CHUNK_DEPTH_ATTRIBS, CHUNK_UNIFORMS);
    let sun = dev.register_program(CHUNK_SUNLIGHT_ATTRIBS, CHUNK_UNIFORMS);
    let dlight = dev.register_program(CHUNK_DLIGHT_ATTRIBS, CHUNK_DLIGHT_UNIFORMS);
    let gpu: Rc<dyn GpuDevice> = dev;
    let programs = ChunkPrograms::link(gpu.as_ref(), depth, sun, dlight);
    MapRenderer::new(gpu, programs, map, false)
}

fn map_and_edit() -> impl Strategy<Value = (usize, usize, usize, i32, i32, i32)> {
    (1usize..=40, 1usize..=40, 1usize..=40).prop_flat_map(|(w, h, d)| {
        (Just(w), Just(h), Just(d), -60i32..60, -60i32..60, 0..d as i32)
    })
}

proptest! {
    // Exactly the chunks holding an in-map cell within one step of the edit.
    #[test]
    fn edit_dirties_its_neighbourhood((w, h, d, x, y, z) in map_and_edit()) {
        let map = GameMap::new(w, h, d);
        let mut r = renderer(&map);
        let n = |c: usize| (c as i32 + CHUNK_SIZE - 1) / CHUNK_SIZE;
        prop_assert_eq!(r.stats().chunks, (n(w) * n(h) * n(d)) as usize);
        prop_assert_eq!(r.stats().dirty, 0);

        r.game_map_changed(x, y, z);

        let mut expected = HashSet::new();
        for dz in -1..=1 {
            let cz = z + dz;
            if cz < 0 || cz >= d as i32 {
                continue;
            }
            for dy in -1..=1 {
                for dx in -1..=1 {
                    let cx = (x + dx).rem_euclid(w as i32);
                    let cy = (y + dy).rem_euclid(h as i32);
                    expected.insert(ChunkCoord::containing(cx, cy, cz, CHUNK_SIZE));
                }
            }
        }
        let dirty: HashSet<ChunkCoord> = r.chunks().filter(|c| c.is_dirty()).map(|c| c.coord()).collect();
        prop_assert_eq!(dirty, expected);
    }
}
