//! Tile triangulator: turns a binary occupancy image into triangles that
//! cover exactly the occupied cells.

use crate::grid2::Grid2;

/// Cell-corner coordinate in slice space.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Twice the signed area; positive for counter-clockwise triangles.
#[inline]
pub fn doubled_area(a: Point, b: Point, c: Point) -> i64 {
    let (ax, ay) = (a.x as i64, a.y as i64);
    (b.x as i64 - ax) * (c.y as i64 - ay) - (c.x as i64 - ax) * (b.y as i64 - ay)
}

/// Bounded 2D occupancy predicate.
pub trait Occupancy {
    fn width(&self) -> usize;
    fn height(&self) -> usize;
    fn occupied(&self, u: i32, v: i32) -> bool;
}

impl Occupancy for Grid2<bool> {
    fn width(&self) -> usize {
        Grid2::width(self)
    }
    fn height(&self) -> usize {
        Grid2::height(self)
    }
    fn occupied(&self, u: i32, v: i32) -> bool {
        Grid2::occupied(self, u, v)
    }
}

/// Adapts a closure over a `width × height` window.
pub struct OccupancyFn<F> {
    pub width: usize,
    pub height: usize,
    pub f: F,
}

impl<F: Fn(i32, i32) -> bool> Occupancy for OccupancyFn<F> {
    fn width(&self) -> usize {
        self.width
    }
    fn height(&self) -> usize {
        self.height
    }
    fn occupied(&self, u: i32, v: i32) -> bool {
        u >= 0 && v >= 0 && (u as usize) < self.width && (v as usize) < self.height && (self.f)(u, v)
    }
}

/// Covers the occupied cells with maximal rectangles (greedy, row-major) and
/// splits each into two counter-clockwise triangles. Rectangles never
/// overlap, so coverage is exact.
pub fn triangulate<O: Occupancy + ?Sized>(occ: &O) -> Vec<[Point; 3]> {
    let (w, h) = (occ.width(), occ.height());
    let mut claimed = Grid2::new(w, h, false);
    let mut out = Vec::new();
    let free = |claimed: &Grid2<bool>, u: usize, v: usize| {
        occ.occupied(u as i32, v as i32) && !claimed.occupied(u as i32, v as i32)
    };
    for v in 0..h {
        let mut u = 0;
        while u < w {
            if !free(&claimed, u, v) {
                u += 1;
                continue;
            }
            let mut u1 = u + 1;
            while u1 < w && free(&claimed, u1, v) {
                u1 += 1;
            }
            let mut v1 = v + 1;
            while v1 < h && (u..u1).all(|x| free(&claimed, x, v1)) {
                v1 += 1;
            }
            for cv in v..v1 {
                for cu in u..u1 {
                    claimed.set(cu as i32, cv as i32, true);
                }
            }
            let (x0, y0, x1, y1) = (u as i32, v as i32, u1 as i32, v1 as i32);
            out.push([Point::new(x0, y0), Point::new(x1, y0), Point::new(x1, y1)]);
            out.push([Point::new(x0, y0), Point::new(x1, y1), Point::new(x0, y1)]);
            u = u1;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(rows: &[&str]) -> Grid2<bool> {
        let h = rows.len();
        let w = rows.first().map_or(0, |r| r.len());
        let mut g = Grid2::new(w, h, false);
        for (v, row) in rows.iter().enumerate() {
            for (u, c) in row.chars().enumerate() {
                g.set(u as i32, v as i32, c == '#');
            }
        }
        g
    }

    #[test]
    fn full_block_is_two_triangles() {
        let g = grid(&["###", "###"]);
        let tris = triangulate(&g);
        assert_eq!(tris.len(), 2);
        let area: i64 = tris.iter().map(|t| doubled_area(t[0], t[1], t[2])).sum();
        assert_eq!(area, 12);
    }

    #[test]
    fn l_shape_uses_two_rectangles() {
        let g = grid(&["##.", "###"]);
        let tris = triangulate(&g);
        assert_eq!(tris.len(), 4);
        assert!(tris.iter().all(|t| doubled_area(t[0], t[1], t[2]) > 0));
    }

    #[test]
    fn empty_mask_yields_nothing() {
        assert!(triangulate(&grid(&["...", "..."])).is_empty());
        assert!(triangulate(&Grid2::new(0, 0, false)).is_empty());
    }

    #[test]
    fn closure_window_is_clipped() {
        let occ = OccupancyFn {
            width: 2,
            height: 2,
            f: |_, _| true,
        };
        let tris = triangulate(&occ);
        assert_eq!(tris.len(), 2);
        assert_eq!(tris[0][2], Point::new(2, 2));
    }

    #[test]
    fn doubled_area_sign_and_degenerate() {
        let (a, b, c) = (Point::new(0, 0), Point::new(2, 0), Point::new(0, 2));
        assert_eq!(doubled_area(a, b, c), 4);
        assert_eq!(doubled_area(a, c, b), -4);
        assert_eq!(doubled_area(a, b, Point::new(5, 0)), 0);
    }
}
