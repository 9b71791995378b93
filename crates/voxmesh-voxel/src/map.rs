//! Toroidal terrain map.
//!
//! Z grows downward: `z = 0` is the top of the sky and `z = depth - 1` the
//! bottom (water) layer. Above the map is empty, below it is solid rock, and
//! both horizontal axes wrap around.

use fastnoise_lite::{FastNoiseLite, NoiseType};

use crate::VoxelSource;
use crate::color::{self, HEALTH_FULL};
use crate::scene::MapConfig;

#[derive(Clone, Debug)]
pub struct GameMap {
    width: i32,
    height: i32,
    depth: i32,
    cells: Vec<Option<u32>>,
}

impl GameMap {
    /// # Panics
    ///
    /// Panics if `width` or `height` is zero; horizontal reads wrap modulo both.
    pub fn new(width: usize, height: usize, depth: usize) -> Self {
        assert!(
            width > 0 && height > 0,
            "map {width}x{height}x{depth} has no horizontal extent"
        );
        Self {
            width: width as i32,
            height: height as i32,
            depth: depth as i32,
            cells: vec![None; width * height * depth],
        }
    }

    #[inline]
    pub fn width(&self) -> i32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> i32 {
        self.height
    }

    #[inline]
    pub fn depth(&self) -> i32 {
        self.depth
    }

    #[inline]
    fn idx(&self, x: i32, y: i32, z: i32) -> Option<usize> {
        if z < 0 || z >= self.depth {
            return None;
        }
        let x = x.rem_euclid(self.width);
        let y = y.rem_euclid(self.height);
        Some(((z * self.height + y) * self.width + x) as usize)
    }

    /// Places an undamaged block. Writes above or below the map are ignored.
    pub fn set_solid(&mut self, x: i32, y: i32, z: i32, rgb: [u8; 3]) {
        if let Some(i) = self.idx(x, y, z) {
            self.cells[i] = Some(color::pack(rgb, HEALTH_FULL));
        }
    }

    pub fn set_empty(&mut self, x: i32, y: i32, z: i32) {
        if let Some(i) = self.idx(x, y, z) {
            self.cells[i] = None;
        }
    }

    /// Overwrites the health byte of an existing block; returns false for empty cells.
    pub fn set_health(&mut self, x: i32, y: i32, z: i32, health: u8) -> bool {
        let Some(i) = self.idx(x, y, z) else {
            return false;
        };
        match self.cells[i].as_mut() {
            Some(c) => {
                *c = color::with_tag(*c, health);
                true
            }
            None => false,
        }
    }

    /// Heightmap terrain: a noise-driven ground surface over a solid water layer.
    pub fn generate(cfg: &MapConfig) -> Self {
        let mut map = GameMap::new(cfg.width, cfg.height, cfg.depth);
        let mut noise = FastNoiseLite::with_seed(cfg.seed);
        noise.set_noise_type(Some(NoiseType::OpenSimplex2));
        noise.set_frequency(Some(cfg.frequency));
        let depth = map.depth;
        let min_h = cfg.min_ground.min(cfg.max_ground) as f32;
        let max_h = cfg.max_ground.max(cfg.min_ground) as f32;
        for y in 0..map.height {
            for x in 0..map.width {
                let n = noise.get_noise_2d(x as f32, y as f32);
                let ground = ((n + 1.0) * 0.5 * (max_h - min_h) + min_h) as i32;
                let ground = ground.clamp(1, depth - 1);
                let top = depth - ground;
                for z in top..depth {
                    let below = z - top;
                    let rgb = if below == 0 {
                        cfg.grass_rgb
                    } else if below < 4 {
                        cfg.dirt_rgb
                    } else {
                        cfg.stone_rgb
                    };
                    map.set_solid(x, y, z, rgb);
                }
                map.set_solid(x, y, depth - 1, cfg.water_rgb);
            }
        }
        log::debug!(
            "generated {}x{}x{} map (seed {})",
            map.width,
            map.height,
            map.depth,
            cfg.seed
        );
        map
    }
}

impl VoxelSource for GameMap {
    #[inline]
    fn is_solid(&self, x: i32, y: i32, z: i32) -> bool {
        if z < 0 {
            return false;
        }
        if z >= self.depth {
            return true;
        }
        self.idx(x, y, z).is_some_and(|i| self.cells[i].is_some())
    }

    #[inline]
    fn color(&self, x: i32, y: i32, z: i32) -> u32 {
        self.idx(x, y, z).and_then(|i| self.cells[i]).unwrap_or(0)
    }
}
