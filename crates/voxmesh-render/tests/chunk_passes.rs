use std::rc::Rc;

use voxmesh_geom::Vec3;
use voxmesh_mesh_cpu::IndexWidth;
use voxmesh_render::{
    ChunkPrograms, DynamicLight, GpuDevice, HeadlessDevice, MapRenderer, NoCull, SphereCull, ViewState,
};
use voxmesh_voxel::{ChunkCoord, GameMap};

fn setup(sun_attribs: &[&str]) -> (Rc<HeadlessDevice>, Rc<dyn GpuDevice>, ChunkPrograms) {
    let dev = Rc::new(HeadlessDevice::new());
    let depth = dev.register_program(&["positionAttribute"], &["chunkPosition"]);
    let sun = dev.register_program(sun_attribs, &["chunkPosition"]);
    let dlight = dev.register_program(
        &["positionAttribute", "colorAttribute", "normalAttribute"],
        &["chunkPosition", "dynamicLightOrigin", "dynamicLightRadius", "dynamicLightColor"],
    );
    let gpu: Rc<dyn GpuDevice> = dev.clone();
    let programs = ChunkPrograms::link(gpu.as_ref(), depth, sun, dlight);
    (dev, gpu, programs)
}

const ALL_SUN: &[&str] = &[
    "positionAttribute",
    "ambientOcclusionCoordAttribute",
    "colorAttribute",
    "normalAttribute",
    "fixedPositionAttribute",
];

fn view() -> ViewState {
    ViewState {
        eye: Vec3::new(8.0, 8.0, 0.0),
        mirror: false,
    }
}

fn small_map() -> GameMap {
    let mut map = GameMap::new(32, 32, 16);
    map.set_solid(4, 4, 4, [120, 80, 40]);
    map
}

#[test]
fn chunks_rebuild_lazily_on_first_pass() {
    let (dev, gpu, programs) = setup(ALL_SUN);
    let mut map = small_map();
    let mut r = MapRenderer::new(gpu, programs, &map, false);
    assert_eq!(r.stats().chunks, 4);

    r.realize_chunks(view().eye, 1000.0);
    assert_eq!(r.stats().realized, 4);
    assert_eq!(dev.live_buffers(), 0, "nothing is built before a pass");

    let draws = r.render_sunlight_pass(&map, view(), &NoCull);
    assert_eq!(draws, 1);
    assert_eq!(dev.live_buffers(), 2);
    assert_eq!(r.stats().triangles, 12);
    assert_eq!(dev.stats().indices_drawn, 36);

    map.set_solid(5, 4, 4, [120, 80, 40]);
    r.game_map_changed(5, 4, 4);
    let s = r.stats();
    assert_eq!(s.dirty, 1);
    assert_eq!(s.triangles, 12, "edit is not meshed until the next pass");

    r.render_depth_pass(&map, view(), &NoCull);
    assert_eq!(r.stats().triangles, 20);
    assert_eq!(r.stats().dirty, 0);
    assert_eq!(dev.live_buffers(), 2, "old buffers are released on rebuild");
}

#[test]
fn edits_on_chunk_borders_dirty_neighbours() {
    let (_dev, gpu, programs) = setup(ALL_SUN);
    let map = small_map();
    let mut r = MapRenderer::new(gpu, programs, &map, false);
    // x = 15 touches chunk 1 along x; y = 0 wraps to y = 31 in chunk 1 along y.
    r.game_map_changed(15, 0, 4);
    assert_eq!(r.stats().dirty, 4);
}

#[test]
fn unrealized_chunks_release_everything() {
    let (dev, gpu, programs) = setup(ALL_SUN);
    let map = small_map();
    let mut r = MapRenderer::new(gpu, programs, &map, false);
    r.realize_chunks(view().eye, 1000.0);
    r.render_sunlight_pass(&map, view(), &NoCull);
    assert_eq!(dev.live_buffers(), 2);

    r.realize_chunks(view().eye, -1.0);
    assert_eq!(r.stats().realized, 0);
    assert_eq!(dev.live_buffers(), 0);
    assert_eq!(r.render_sunlight_pass(&map, view(), &NoCull), 0);

    r.realize_chunks(view().eye, 1000.0);
    r.render_sunlight_pass(&map, view(), &NoCull);
    drop(r);
    assert_eq!(dev.live_buffers(), 0, "dropping the renderer frees every chunk");
}

#[test]
fn empty_chunks_skip_every_pass() {
    let (dev, gpu, programs) = setup(ALL_SUN);
    let map = GameMap::new(32, 32, 16);
    let mut r = MapRenderer::new(gpu, programs, &map, false);
    r.realize_chunks(view().eye, 1000.0);
    let lights = [DynamicLight {
        position: Vec3::new(4.0, 4.0, 4.0),
        radius: 50.0,
        color: Vec3::ONE,
    }];
    assert_eq!(r.render_depth_pass(&map, view(), &NoCull), 0);
    assert_eq!(r.render_sunlight_pass(&map, view(), &NoCull), 0);
    assert_eq!(r.render_dlight_pass(&map, view(), &NoCull, &lights), 0);
    assert_eq!(dev.live_buffers(), 0);
    assert_eq!(r.stats().built, 0);
}

#[test]
fn dynamic_lights_cull_per_chunk() {
    let (dev, gpu, programs) = setup(ALL_SUN);
    let map = small_map();
    let mut r = MapRenderer::new(gpu, programs, &map, false);
    r.realize_chunks(view().eye, 1000.0);
    let near = DynamicLight {
        position: Vec3::new(6.0, 6.0, 6.0),
        radius: 4.0,
        color: Vec3::ONE,
    };
    let far = DynamicLight {
        position: Vec3::new(8.0, 8.0, 200.0),
        radius: 4.0,
        color: Vec3::ONE,
    };
    assert_eq!(r.render_dlight_pass(&map, view(), &NoCull, &[near, far, near]), 2);
    assert_eq!(r.render_dlight_pass(&map, view(), &NoCull, &[]), 0);
    assert_eq!(dev.stats().draw_calls, 2);
}

#[test]
fn frustum_rejection_skips_draw_but_still_builds() {
    let (dev, gpu, programs) = setup(ALL_SUN);
    let map = small_map();
    let mut r = MapRenderer::new(gpu, programs, &map, false);
    r.realize_chunks(view().eye, 1000.0);
    let nowhere = SphereCull {
        center: Vec3::new(0.0, 0.0, -500.0),
        radius: 1.0,
    };
    assert_eq!(r.render_sunlight_pass(&map, view(), &nowhere), 0);
    assert_eq!(dev.live_buffers(), 2);
}

#[test]
fn chunks_draw_with_16_bit_indices_and_skip_missing_attributes() {
    let (dev, gpu, programs) = setup(&["positionAttribute", "colorAttribute", "fixedPositionAttribute"]);
    assert!(programs.sunlight.attrib("normalAttribute").is_none());
    let map = small_map();
    let mut r = MapRenderer::new(gpu, programs, &map, false);
    r.realize_chunks(view().eye, 1000.0);
    assert_eq!(r.render_sunlight_pass(&map, view(), &NoCull), 1);
    assert_eq!(dev.enabled_attributes(), 0, "attributes are disabled after the pass");
    let chunk = r.chunk(ChunkCoord::new(0, 0, 0)).and_then(|c| c.buffers());
    assert_eq!(chunk.map(|b| b.index_width()), Some(IndexWidth::U16));
    assert_eq!(chunk.map(|b| b.index_buffer().len()), Some(36 * 2));
}

#[test]
fn unflagged_edit_keeps_the_old_mesh() {
    let (dev, gpu, programs) = setup(ALL_SUN);
    let mut map = small_map();
    let mut r = MapRenderer::new(gpu, programs, &map, false);
    r.realize_chunks(view().eye, 1000.0);
    r.render_sunlight_pass(&map, view(), &NoCull);
    let coord = ChunkCoord::new(0, 0, 0);
    let vertex_id = |r: &MapRenderer| r.chunk(coord).and_then(|c| c.buffers()).map(|b| b.vertex_buffer().id());
    let before = vertex_id(&r).and_then(|id| dev.buffer_contents(id));
    assert!(before.is_some());

    map.set_solid(5, 4, 4, [120, 80, 40]);
    r.render_sunlight_pass(&map, view(), &NoCull);
    assert_eq!(r.stats().triangles, 12);
    assert_eq!(vertex_id(&r).and_then(|id| dev.buffer_contents(id)), before);

    r.game_map_changed(5, 4, 4);
    r.render_sunlight_pass(&map, view(), &NoCull);
    assert_eq!(r.stats().triangles, 20);
    assert_ne!(vertex_id(&r).and_then(|id| dev.buffer_contents(id)), before);
}

#[test]
fn partial_edge_chunks_draw_each_cell_once() {
    let (_dev, gpu, programs) = setup(ALL_SUN);
    let mut map = GameMap::new(20, 16, 16);
    map.set_solid(2, 2, 2, [9, 9, 9]);
    let mut r = MapRenderer::new(Rc::clone(&gpu), programs.clone(), &map, false);
    assert_eq!(r.stats().chunks, 2);
    r.realize_chunks(view().eye, 1000.0);
    assert_eq!(r.render_sunlight_pass(&map, view(), &NoCull), 1);
    assert_eq!(r.stats().triangles, 12);
    let edge = r.chunk(ChunkCoord::new(1, 0, 0)).map(|c| c.aabb().max.x);
    assert_eq!(edge, Some(20.0));

    let shallow = GameMap::new(16, 16, 8);
    let mut r = MapRenderer::new(gpu, programs, &shallow, false);
    r.realize_chunks(view().eye, 1000.0);
    assert_eq!(r.render_sunlight_pass(&shallow, view(), &NoCull), 0);
    assert_eq!(r.stats().triangles, 0);
}

#[test]
fn edits_on_a_partial_wrapped_edge_dirty_both_sides() {
    let (_dev, gpu, programs) = setup(ALL_SUN);
    let mut map = GameMap::new(20, 16, 16);
    let mut r = MapRenderer::new(gpu, programs, &map, false);
    r.realize_chunks(view().eye, 1000.0);
    r.render_sunlight_pass(&map, view(), &NoCull);
    assert_eq!(r.stats().dirty, 0);

    map.set_solid(19, 5, 5, [9, 9, 9]);
    map.set_solid(0, 5, 5, [9, 9, 9]);
    r.game_map_changed(19, 5, 5);
    let dirty: Vec<ChunkCoord> = r.chunks().filter(|c| c.is_dirty()).map(|c| c.coord()).collect();
    assert_eq!(dirty.len(), 2);

    r.game_map_changed(0, 5, 5);
    r.render_sunlight_pass(&map, view(), &NoCull);
    // Two cells joined across the wrap: 10 faces.
    assert_eq!(r.stats().triangles, 20);
}
