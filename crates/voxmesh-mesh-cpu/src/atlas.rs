//! Per-slice bitmaps and the shelf packer that merges them into one atlas.

/// 32-bit texels; red in the lowest byte, alpha (AO selector) in the top byte.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Bitmap {
    width: usize,
    height: usize,
    pixels: Vec<u32>,
}

impl Bitmap {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width * height],
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> Option<u32> {
        (x < self.width && y < self.height).then(|| self.pixels[y * self.width + x])
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, value: u32) {
        debug_assert!(x < self.width && y < self.height, "texel ({x},{y}) out of bitmap");
        if x < self.width && y < self.height {
            self.pixels[y * self.width + x] = value;
        }
    }

    /// Copies `src` with its top-left corner at `(x, y)`, clipping at the edges.
    pub fn blit(&mut self, src: &Bitmap, x: usize, y: usize) {
        let w = src.width.min(self.width.saturating_sub(x));
        for row in 0..src.height {
            let dy = y + row;
            if dy >= self.height {
                break;
            }
            let s = row * src.width;
            let d = dy * self.width + x;
            self.pixels[d..d + w].copy_from_slice(&src.pixels[s..s + w]);
        }
    }

    /// Texels as bytes in upload order (R, G, B, A per texel).
    pub fn rgba_bytes(&self) -> Vec<u8> {
        self.pixels.iter().flat_map(|p| p.to_le_bytes()).collect()
    }
}

/// Where an input bitmap landed in the atlas.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Placement {
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
}

impl Placement {
    pub fn overlaps(&self, other: &Placement) -> bool {
        self.x < other.x + other.width
            && other.x < self.x + self.width
            && self.y < other.y + other.height
            && other.y < self.y + self.height
    }

    /// Inclusive on the far edges: triangle UVs sit on texel corners.
    pub fn contains(&self, u: usize, v: usize) -> bool {
        u >= self.x && u <= self.x + self.width && v >= self.y && v <= self.y + self.height
    }
}

#[derive(Clone, Debug)]
pub struct PackedAtlas {
    pub bitmap: Bitmap,
    /// Indexed like the bitmaps passed to [`AtlasBuilder::add`].
    pub placements: Vec<Placement>,
}

#[derive(Default, Debug)]
pub struct AtlasBuilder {
    items: Vec<Bitmap>,
}

impl AtlasBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Queues a bitmap and returns its index into the packed placements.
    pub fn add(&mut self, bitmap: Bitmap) -> usize {
        self.items.push(bitmap);
        self.items.len() - 1
    }

    /// Shelf-packs every queued bitmap. Both atlas sides are powers of two.
    pub fn pack(self) -> PackedAtlas {
        if self.items.is_empty() {
            return PackedAtlas {
                bitmap: Bitmap::new(1, 1),
                placements: Vec::new(),
            };
        }

        let mut order: Vec<usize> = (0..self.items.len()).collect();
        order.sort_by(|&a, &b| {
            let (ia, ib) = (&self.items[a], &self.items[b]);
            ib.height.cmp(&ia.height).then(ib.width.cmp(&ia.width))
        });

        let area: usize = self.items.iter().map(|b| b.width * b.height).sum();
        let widest = self.items.iter().map(|b| b.width).max().unwrap_or(1);
        let side = (area as f64).sqrt().ceil() as usize;
        let width = widest.max(side).max(1).next_power_of_two();

        let mut placements = vec![Placement::default(); self.items.len()];
        let (mut x, mut y, mut shelf) = (0usize, 0usize, 0usize);
        for &i in &order {
            let item = &self.items[i];
            if x + item.width > width {
                y += shelf;
                x = 0;
                shelf = 0;
            }
            placements[i] = Placement {
                x,
                y,
                width: item.width,
                height: item.height,
            };
            x += item.width;
            shelf = shelf.max(item.height);
        }
        let height = (y + shelf).max(1).next_power_of_two();

        let mut bitmap = Bitmap::new(width, height);
        for (item, p) in self.items.iter().zip(&placements) {
            bitmap.blit(item, p.x, p.y);
        }
        debug_assert!(
            placements
                .iter()
                .all(|p| p.x + p.width <= width && p.y + p.height <= height),
            "atlas packer lost an item"
        );
        log::trace!(
            "packed {} bitmaps ({} texels) into {}x{}",
            placements.len(),
            area,
            width,
            height
        );
        PackedAtlas { bitmap, placements }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(w: usize, h: usize, v: u32) -> Bitmap {
        let mut b = Bitmap::new(w, h);
        for y in 0..h {
            for x in 0..w {
                b.set(x, y, v);
            }
        }
        b
    }

    #[test]
    fn empty_builder_gives_unit_atlas() {
        let packed = AtlasBuilder::new().pack();
        assert_eq!((packed.bitmap.width(), packed.bitmap.height()), (1, 1));
        assert!(packed.placements.is_empty());
    }

    #[test]
    fn placements_disjoint_and_in_bounds() {
        let mut b = AtlasBuilder::new();
        let sizes = [(3, 3), (7, 4), (3, 9), (12, 3), (5, 5), (4, 4), (3, 3)];
        for (i, &(w, h)) in sizes.iter().enumerate() {
            assert_eq!(b.add(solid(w, h, i as u32 + 1)), i);
        }
        let packed = b.pack();
        let (aw, ah) = (packed.bitmap.width(), packed.bitmap.height());
        assert!(aw.is_power_of_two() && ah.is_power_of_two());
        for (i, p) in packed.placements.iter().enumerate() {
            assert_eq!((p.width, p.height), sizes[i]);
            assert!(p.x + p.width <= aw && p.y + p.height <= ah);
            for q in &packed.placements[i + 1..] {
                assert!(!p.overlaps(q), "{p:?} overlaps {q:?}");
            }
        }
    }

    #[test]
    fn pixels_are_copied_verbatim() {
        let mut b = AtlasBuilder::new();
        let mut a = Bitmap::new(3, 2);
        a.set(0, 0, 0xAABBCCDD);
        a.set(2, 1, 0x11223344);
        let ia = b.add(a.clone());
        let ib = b.add(solid(4, 4, 7));
        let packed = b.pack();
        let pa = packed.placements[ia];
        for y in 0..2 {
            for x in 0..3 {
                assert_eq!(packed.bitmap.get(pa.x + x, pa.y + y), a.get(x, y));
            }
        }
        let pb = packed.placements[ib];
        assert_eq!(packed.bitmap.get(pb.x + 3, pb.y + 3), Some(7));
    }

    #[test]
    fn rgba_bytes_put_red_first() {
        let mut b = Bitmap::new(1, 1);
        b.set(0, 0, 0x80_30_20_10);
        assert_eq!(b.rgba_bytes(), vec![0x10, 0x20, 0x30, 0x80]);
    }
}
