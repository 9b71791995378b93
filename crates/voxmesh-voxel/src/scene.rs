//! TOML scene description: one terrain map plus any number of box-built models.

use serde::Deserialize;
use std::error::Error;
use std::fs;
use std::path::Path;

use voxmesh_geom::Vec3;

use crate::color::MaterialKind;
use crate::model::VoxelModel;

#[derive(Clone, Debug, Default, Deserialize)]
pub struct SceneConfig {
    #[serde(default)]
    pub map: MapConfig,
    #[serde(default)]
    pub render: RenderConfig,
    #[serde(default)]
    pub models: Vec<ModelDef>,
}

impl SceneConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, Box<dyn Error>> {
        let cfg: SceneConfig = toml::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn validate(&self) -> Result<(), Box<dyn Error>> {
        if self.map.width == 0 || self.map.height == 0 || self.map.depth < 2 {
            return Err(format!(
                "map dimensions {}x{}x{} are too small",
                self.map.width, self.map.height, self.map.depth
            )
            .into());
        }
        for m in &self.models {
            if m.size.contains(&0) {
                return Err(format!("model '{}' has an empty dimension", m.name).into());
            }
        }
        Ok(())
    }
}

pub fn load_scene_from_path(path: &Path) -> Result<SceneConfig, Box<dyn Error>> {
    let s = fs::read_to_string(path)?;
    SceneConfig::from_toml_str(&s)
}

#[derive(Clone, Debug, Deserialize)]
pub struct MapConfig {
    #[serde(default = "default_map_width")]
    pub width: usize,
    #[serde(default = "default_map_width")]
    pub height: usize,
    #[serde(default = "default_map_depth")]
    pub depth: usize,
    #[serde(default = "default_seed")]
    pub seed: i32,
    #[serde(default = "default_frequency")]
    pub frequency: f32,
    /// Ground thickness range in cells, measured up from the bottom layer.
    #[serde(default = "default_min_ground")]
    pub min_ground: i32,
    #[serde(default = "default_max_ground")]
    pub max_ground: i32,
    #[serde(default = "default_grass_rgb")]
    pub grass_rgb: [u8; 3],
    #[serde(default = "default_dirt_rgb")]
    pub dirt_rgb: [u8; 3],
    #[serde(default = "default_stone_rgb")]
    pub stone_rgb: [u8; 3],
    #[serde(default = "default_water_rgb")]
    pub water_rgb: [u8; 3],
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            width: default_map_width(),
            height: default_map_width(),
            depth: default_map_depth(),
            seed: default_seed(),
            frequency: default_frequency(),
            min_ground: default_min_ground(),
            max_ground: default_max_ground(),
            grass_rgb: default_grass_rgb(),
            dirt_rgb: default_dirt_rgb(),
            stone_rgb: default_stone_rgb(),
            water_rgb: default_water_rgb(),
        }
    }
}

fn default_map_width() -> usize {
    512
}
fn default_map_depth() -> usize {
    64
}
fn default_seed() -> i32 {
    1337
}
fn default_frequency() -> f32 {
    0.008
}
fn default_min_ground() -> i32 {
    4
}
fn default_max_ground() -> i32 {
    28
}
fn default_grass_rgb() -> [u8; 3] {
    [92, 140, 64]
}
fn default_dirt_rgb() -> [u8; 3] {
    [120, 88, 60]
}
fn default_stone_rgb() -> [u8; 3] {
    [112, 112, 118]
}
fn default_water_rgb() -> [u8; 3] {
    [40, 80, 140]
}

#[derive(Clone, Debug, Deserialize)]
pub struct RenderConfig {
    /// Sample the top of the bottom layer from the layer above it, hiding the
    /// seam where the water plane meets terrain.
    #[serde(default = "default_water")]
    pub water: bool,
    /// Horizontal distance within which chunks are realized.
    #[serde(default = "default_view_distance")]
    pub view_distance: f32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            water: default_water(),
            view_distance: default_view_distance(),
        }
    }
}

fn default_water() -> bool {
    true
}
fn default_view_distance() -> f32 {
    128.0
}

#[derive(Clone, Debug, Deserialize)]
pub struct ModelDef {
    pub name: String,
    pub size: [usize; 3],
    /// Model-space position of cell (0,0,0); defaults to the model's center.
    #[serde(default)]
    pub origin: Option<[f32; 3]>,
    #[serde(default)]
    pub boxes: Vec<BoxDef>,
}

/// Axis-aligned fill applied in declaration order. `max` is exclusive.
#[derive(Clone, Debug, Deserialize)]
pub struct BoxDef {
    pub min: [i32; 3],
    pub max: [i32; 3],
    #[serde(default = "default_box_color")]
    pub color: [u8; 3],
    #[serde(default)]
    pub material: MaterialName,
    /// Clears the box instead of filling it.
    #[serde(default)]
    pub carve: bool,
}

fn default_box_color() -> [u8; 3] {
    [200, 200, 200]
}

#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MaterialName {
    #[default]
    Default,
    Emissive,
}

impl From<MaterialName> for MaterialKind {
    fn from(m: MaterialName) -> Self {
        match m {
            MaterialName::Default => MaterialKind::Default,
            MaterialName::Emissive => MaterialKind::Emissive,
        }
    }
}

impl ModelDef {
    pub fn build(&self) -> VoxelModel {
        let [w, h, d] = self.size;
        let mut model = VoxelModel::new(w, h, d);
        let origin = match self.origin {
            Some([x, y, z]) => Vec3::new(x, y, z),
            None => Vec3::new(-(w as f32) * 0.5, -(h as f32) * 0.5, -(d as f32) * 0.5),
        };
        model.set_origin(origin);
        for b in &self.boxes {
            for z in b.min[2]..b.max[2] {
                for y in b.min[1]..b.max[1] {
                    for x in b.min[0]..b.max[0] {
                        if b.carve {
                            model.set_empty(x, y, z);
                        } else {
                            model.set_solid(x, y, z, b.color, b.material.into());
                        }
                    }
                }
            }
        }
        model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::VoxelSource;

    const SCENE: &str = r#"
[map]
width = 64
height = 32
seed = 7

[render]
water = false

[[models]]
name = "lamp"
size = [3, 3, 4]
origin = [0.0, 0.0, 0.0]

[[models.boxes]]
min = [0, 0, 0]
max = [3, 3, 4]
color = [90, 60, 30]

[[models.boxes]]
min = [1, 1, 0]
max = [2, 2, 1]
material = "emissive"
color = [255, 240, 160]

[[models.boxes]]
min = [0, 0, 3]
max = [1, 1, 4]
carve = true
"#;

    #[test]
    fn parses_scene_with_defaults() {
        let cfg = SceneConfig::from_toml_str(SCENE).unwrap();
        assert_eq!(cfg.map.width, 64);
        assert_eq!(cfg.map.height, 32);
        assert_eq!(cfg.map.depth, 64);
        assert!(!cfg.render.water);
        assert_eq!(cfg.models.len(), 1);
        assert_eq!(cfg.models[0].boxes[1].material, MaterialName::Emissive);
    }

    #[test]
    fn model_boxes_apply_in_order() {
        let cfg = SceneConfig::from_toml_str(SCENE).unwrap();
        let m = cfg.models[0].build();
        assert_eq!(m.solid_count(), 3 * 3 * 4 - 1);
        assert!(!m.is_solid(0, 0, 3));
        assert_eq!(m.material(1, 1, 0), Some(MaterialKind::Emissive));
        assert_eq!(m.material(0, 0, 0), Some(MaterialKind::Default));
    }

    #[test]
    fn empty_defaults_and_rejects_degenerate_dims() {
        let cfg = SceneConfig::from_toml_str("").unwrap();
        assert_eq!(cfg.map.width, 512);
        assert!(cfg.render.water);
        assert!(SceneConfig::from_toml_str("[map]\ndepth = 1\n").is_err());
        let bad = "[[models]]\nname = \"x\"\nsize = [0, 1, 1]\n";
        assert!(SceneConfig::from_toml_str(bad).is_err());
    }
}
