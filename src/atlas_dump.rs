//! PNG export of model atlases. The alpha channel holds the AO selector (or
//! 255 for emissive texels), so it is also written as a grey image of its own.

use std::error::Error;
use std::fs;
use std::path::Path;

use image::{DynamicImage, ImageBuffer, Rgba, RgbaImage};
use voxmesh_mesh_cpu::Bitmap;

pub fn to_rgba_image(bitmap: &Bitmap) -> Result<RgbaImage, Box<dyn Error>> {
    let (w, h) = (bitmap.width() as u32, bitmap.height() as u32);
    ImageBuffer::from_raw(w, h, bitmap.rgba_bytes())
        .ok_or_else(|| format!("atlas {}x{} does not match its texel data", w, h).into())
}

/// Selector channel spread to grey, opaque.
pub fn alpha_image(atlas: &RgbaImage) -> RgbaImage {
    let mut out = ImageBuffer::from_pixel(atlas.width(), atlas.height(), Rgba([0, 0, 0, 255]));
    for (src, dst) in atlas.pixels().zip(out.pixels_mut()) {
        let a = src.0[3];
        *dst = Rgba([a, a, a, 255]);
    }
    out
}

pub fn write_atlas(dir: &Path, name: &str, bitmap: &Bitmap) -> Result<(), Box<dyn Error>> {
    fs::create_dir_all(dir)?;
    let atlas = to_rgba_image(bitmap)?;
    let alpha = alpha_image(&atlas);
    DynamicImage::ImageRgba8(atlas).save(dir.join(format!("{name}.png")))?;
    DynamicImage::ImageRgba8(alpha).save(dir.join(format!("{name}_alpha.png")))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn texels_keep_rgba_order() {
        let mut b = Bitmap::new(2, 1);
        b.set(0, 0, 0xFF_30_20_10);
        b.set(1, 0, 0x02_00_00_FF);
        let img = to_rgba_image(&b).expect("image");
        assert_eq!(img.get_pixel(0, 0).0, [0x10, 0x20, 0x30, 0xFF]);
        assert_eq!(img.get_pixel(1, 0).0, [0xFF, 0, 0, 0x02]);
        let alpha = alpha_image(&img);
        assert_eq!(alpha.get_pixel(1, 0).0, [2, 2, 2, 255]);
    }

    #[test]
    fn writes_atlas_and_selector_pngs() {
        let dir = std::env::temp_dir().join(format!("voxmesh-atlas-{}", std::process::id()));
        let mut b = Bitmap::new(4, 4);
        b.set(1, 1, 0xFF_00_00_FF);
        write_atlas(&dir, "crate", &b).expect("write");
        let back = image::open(dir.join("crate.png")).expect("open").to_rgba8();
        assert_eq!(back.get_pixel(1, 1).0, [0xFF, 0, 0, 0xFF]);
        assert!(dir.join("crate_alpha.png").exists());
        let _ = fs::remove_dir_all(&dir);
    }
}
