//! Offline driver: loads a scene, meshes it on a headless device and reports
//! what a frame would upload and draw.

mod atlas_dump;
mod report;

use std::error::Error;
use std::path::PathBuf;
use std::rc::Rc;

use clap::Parser;
use hashbrown::HashMap;
use voxmesh_geom::Vec3;
use voxmesh_render::{
    CHUNK_DEPTH_ATTRIBS, CHUNK_DLIGHT_ATTRIBS, CHUNK_DLIGHT_UNIFORMS, CHUNK_SUNLIGHT_ATTRIBS, CHUNK_UNIFORMS,
    ChunkPrograms, DynamicLight, GpuDevice, HeadlessDevice, MODEL_ATTRIBS, MODEL_UNIFORMS, MapRenderer,
    ModelPrograms, ModelRenderParam, ModelRenderer, OptimizedVoxelModel, SHADOW_ATTRIBS, SphereCull, ViewState,
};
use voxmesh_voxel::GameMap;
use voxmesh_voxel::scene::{SceneConfig, load_scene_from_path};

use crate::report::{FrameReport, ModelReport};

#[derive(Parser, Debug)]
#[command(name = "voxmesh", about = "Voxel terrain and model mesher")]
struct Args {
    /// Scene file (TOML). Built-in defaults are used when omitted.
    #[arg(long, value_name = "PATH")]
    scene: Option<PathBuf>,

    /// Eye position as "x,y,z". Defaults to the map centre at the top layer.
    #[arg(long, value_parser = parse_vec3)]
    eye: Option<Vec3>,

    /// Overrides `render.view_distance`.
    #[arg(long)]
    view_distance: Option<f32>,

    /// Point lights placed around the eye for the dynamic-light pass.
    #[arg(long, default_value_t = 2)]
    lights: usize,

    /// Writes each model's atlas as `<DIR>/<name>.png` plus its AO/material
    /// selector channel as `<DIR>/<name>_alpha.png`.
    #[arg(long, value_name = "DIR")]
    dump_atlas: Option<PathBuf>,

    /// Writes the frame report as TOML instead of logging it.
    #[arg(long, value_name = "PATH")]
    report: Option<PathBuf>,
}

fn parse_vec3(s: &str) -> Result<Vec3, String> {
    let parts: Vec<f32> = s
        .split(',')
        .map(|p| p.trim().parse::<f32>().map_err(|e| format!("'{}': {}", p, e)))
        .collect::<Result<_, _>>()?;
    match parts.as_slice() {
        [x, y, z] => Ok(Vec3::new(*x, *y, *z)),
        _ => Err(format!("expected x,y,z, got '{}'", s)),
    }
}

fn link_programs(dev: &HeadlessDevice) -> (ChunkPrograms, ModelPrograms) {
    let depth = dev.register_program(CHUNK_DEPTH_ATTRIBS, CHUNK_UNIFORMS);
    let sun = dev.register_program(CHUNK_SUNLIGHT_ATTRIBS, CHUNK_UNIFORMS);
    let dlight = dev.register_program(CHUNK_DLIGHT_ATTRIBS, CHUNK_DLIGHT_UNIFORMS);
    let model_sun = dev.register_program(MODEL_ATTRIBS, MODEL_UNIFORMS);
    let model_dlight = dev.register_program(MODEL_ATTRIBS, MODEL_UNIFORMS);
    let shadow = dev.register_program(SHADOW_ATTRIBS, MODEL_UNIFORMS);

    (
        ChunkPrograms::link(dev, depth, sun, dlight),
        ModelPrograms::link(dev, model_sun, model_dlight, shadow),
    )
}

/// First empty cell above the ground column at `(x, y)`.
fn surface_z(map: &GameMap, x: i32, y: i32) -> i32 {
    use voxmesh_voxel::VoxelSource;
    (0..map.depth()).find(|&z| map.is_solid(x, y, z)).unwrap_or(map.depth()) - 1
}

fn run(args: Args) -> Result<(), Box<dyn Error>> {
    let scene = match &args.scene {
        Some(path) => {
            log::info!("loading scene {}", path.display());
            load_scene_from_path(path)?
        }
        None => SceneConfig::default(),
    };
    let view_distance = args.view_distance.unwrap_or(scene.render.view_distance);

    let map = GameMap::generate(&scene.map);
    let (cx, cy) = (map.width() / 2, map.height() / 2);
    let eye = args
        .eye
        .unwrap_or_else(|| Vec3::new(cx as f32 + 0.5, cy as f32 + 0.5, surface_z(&map, cx, cy) as f32 - 2.0));
    log::info!(
        "map {}x{}x{}, eye {:?}, view distance {}",
        map.width(),
        map.height(),
        map.depth(),
        eye,
        view_distance
    );

    let headless = Rc::new(HeadlessDevice::new());
    let device: Rc<dyn GpuDevice> = headless.clone();
    let (chunk_programs, model_programs) = link_programs(&headless);

    let mut terrain = MapRenderer::new(Rc::clone(&device), chunk_programs, &map, scene.render.water);
    let mut models = ModelRenderer::new(Rc::clone(&device), model_programs);

    let mut library: HashMap<String, Rc<OptimizedVoxelModel>> = HashMap::new();
    let mut model_reports = Vec::new();
    for def in &scene.models {
        if library.contains_key(&def.name) {
            log::warn!("model '{}' defined twice; keeping the first", def.name);
            continue;
        }
        let voxels = def.build();
        let cpu = voxmesh_mesh_cpu::build_model_mesh(&voxels)?;
        if let Some(dir) = &args.dump_atlas {
            atlas_dump::write_atlas(dir, &def.name, &cpu.atlas)?;
            log::info!("wrote atlas for '{}' to {}", def.name, dir.display());
        }
        model_reports.push(ModelReport::new(&def.name, &cpu));
        library.insert(def.name.clone(), Rc::new(OptimizedVoxelModel::from_mesh(&device, cpu)));
    }

    for (i, def) in scene.models.iter().enumerate() {
        let Some(model) = library.get(&def.name) else {
            continue;
        };
        let x = cx + 6 * (i as i32 + 1);
        let z = surface_z(&map, x, cy) as f32 + 1.0 - model.bounds().extents().z * 0.5;
        models.add_model(model, ModelRenderParam::at(Vec3::new(x as f32 + 0.5, cy as f32 + 0.5, z)));
    }

    let lights: Vec<DynamicLight> = (0..args.lights)
        .map(|i| {
            let a = i as f32 * std::f32::consts::TAU / args.lights.max(1) as f32;
            DynamicLight {
                position: eye + Vec3::new(a.cos() * 12.0, a.sin() * 12.0, 0.0),
                radius: 16.0,
                color: Vec3::new(1.0, 0.8, 0.6),
            }
        })
        .collect();

    let view = ViewState { eye, mirror: false };
    let cull = SphereCull {
        center: eye,
        radius: view_distance,
    };

    terrain.realize_chunks(eye, view_distance);
    let mut draws = report::PassDraws {
        terrain_depth: terrain.render_depth_pass(&map, view, &cull),
        ..Default::default()
    };
    draws.model_shadow = models.render_shadow_map_pass(&cull);
    draws.terrain_sunlight = terrain.render_sunlight_pass(&map, view, &cull);
    draws.model_sunlight = models.render_sunlight_pass(false, view, &cull);
    draws.terrain_dlight = terrain.render_dlight_pass(&map, view, &cull, &lights);
    draws.model_dlight = models.render_dynamic_light_pass(&lights, view, &cull);
    draws.model_ghost = models.render_sunlight_pass(true, view, &cull);

    let frame = FrameReport::new(terrain.stats(), draws, headless.stats(), model_reports);
    models.clear();

    match &args.report {
        Some(path) => {
            std::fs::write(path, frame.to_toml()?)?;
            log::info!("wrote {}", path.display());
        }
        None => frame.log(),
    }
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();
    if let Err(e) = run(args) {
        log::error!("{}", e);
        std::process::exit(1);
    }
}
