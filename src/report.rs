//! Frame summary: what the terrain and model passes built, uploaded and drew.

use serde::Serialize;
use voxmesh_mesh_cpu::ModelMeshCPU;
use voxmesh_render::{DrawStats, MapStats};

#[derive(Clone, Debug, Default, Serialize)]
pub struct PassDraws {
    pub terrain_depth: usize,
    pub terrain_sunlight: usize,
    pub terrain_dlight: usize,
    pub model_shadow: usize,
    pub model_sunlight: usize,
    pub model_dlight: usize,
    pub model_ghost: usize,
}

#[derive(Clone, Debug, Serialize)]
pub struct TerrainReport {
    pub chunks: usize,
    pub realized: usize,
    pub built: usize,
    pub triangles: usize,
}

#[derive(Clone, Debug, Serialize)]
pub struct DeviceReport {
    pub draw_calls: usize,
    pub indices_drawn: usize,
    pub bytes_uploaded: usize,
    pub buffers_created: usize,
    pub textures_created: usize,
}

#[derive(Clone, Debug, Serialize)]
pub struct ModelReport {
    pub name: String,
    pub dims: [usize; 3],
    pub triangles: usize,
    pub slices: usize,
    pub atlas: [usize; 2],
    pub radius: f32,
    pub magenta_texels: usize,
}

impl ModelReport {
    pub fn new(name: &str, cpu: &ModelMeshCPU) -> Self {
        Self {
            name: name.to_string(),
            dims: cpu.dims,
            triangles: cpu.stats.triangles,
            slices: cpu.stats.slices,
            atlas: [cpu.atlas.width(), cpu.atlas.height()],
            radius: cpu.radius,
            magenta_texels: cpu.stats.magenta_texels,
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct FrameReport {
    pub terrain: TerrainReport,
    pub draws: PassDraws,
    pub device: DeviceReport,
    pub models: Vec<ModelReport>,
}

impl FrameReport {
    pub fn new(map: MapStats, draws: PassDraws, device: DrawStats, models: Vec<ModelReport>) -> Self {
        Self {
            terrain: TerrainReport {
                chunks: map.chunks,
                realized: map.realized,
                built: map.built,
                triangles: map.triangles,
            },
            draws,
            device: DeviceReport {
                draw_calls: device.draw_calls,
                indices_drawn: device.indices_drawn,
                bytes_uploaded: device.bytes_uploaded,
                buffers_created: device.buffers_created,
                textures_created: device.textures_created,
            },
            models,
        }
    }

    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    pub fn log(&self) {
        let t = &self.terrain;
        log::info!(
            "terrain: {}/{} chunks realized, {} built, {} triangles",
            t.realized,
            t.chunks,
            t.built,
            t.triangles
        );
        let d = &self.draws;
        log::info!(
            "draws: depth {} sun {} dlight {} | models shadow {} sun {} dlight {} ghost {}",
            d.terrain_depth,
            d.terrain_sunlight,
            d.terrain_dlight,
            d.model_shadow,
            d.model_sunlight,
            d.model_dlight,
            d.model_ghost
        );
        let g = &self.device;
        log::info!(
            "device: {} draw calls, {} indices, {} bytes in {} buffers, {} textures",
            g.draw_calls,
            g.indices_drawn,
            g.bytes_uploaded,
            g.buffers_created,
            g.textures_created
        );
        for m in &self.models {
            log::info!(
                "model {}: {:?} -> {} triangles over {} slices, atlas {}x{}, radius {:.2}",
                m.name,
                m.dims,
                m.triangles,
                m.slices,
                m.atlas[0],
                m.atlas[1],
                m.radius
            );
            if m.magenta_texels > 0 {
                log::warn!("model {}: {} unresolved texels", m.name, m.magenta_texels);
            }
        }
    }
}
