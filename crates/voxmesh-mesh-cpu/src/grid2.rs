/// Bounds-checked row-major 2D grid, indexed `v * width + u`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid2<T> {
    width: usize,
    height: usize,
    data: Vec<T>,
}

/// Inclusive cell rectangle.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Rect {
    pub min_u: usize,
    pub min_v: usize,
    pub max_u: usize,
    pub max_v: usize,
}

impl Rect {
    #[inline]
    pub fn width(&self) -> usize {
        self.max_u - self.min_u + 1
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.max_v - self.min_v + 1
    }
}

impl<T: Clone> Grid2<T> {
    pub fn new(width: usize, height: usize, fill: T) -> Self {
        Self {
            width,
            height,
            data: vec![fill; width * height],
        }
    }

    pub fn fill(&mut self, value: T) {
        self.data.fill(value);
    }
}

impl<T> Grid2<T> {
    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    fn idx(&self, u: i32, v: i32) -> Option<usize> {
        if u < 0 || v < 0 {
            return None;
        }
        let (u, v) = (u as usize, v as usize);
        (u < self.width && v < self.height).then_some(v * self.width + u)
    }

    #[inline]
    pub fn get(&self, u: i32, v: i32) -> Option<&T> {
        self.idx(u, v).map(|i| &self.data[i])
    }

    /// Returns false when `(u, v)` is outside the grid.
    #[inline]
    pub fn set(&mut self, u: i32, v: i32, value: T) -> bool {
        match self.idx(u, v) {
            Some(i) => {
                self.data[i] = value;
                true
            }
            None => false,
        }
    }
}

impl Grid2<bool> {
    /// Out-of-range cells read as unoccupied.
    #[inline]
    pub fn occupied(&self, u: i32, v: i32) -> bool {
        self.get(u, v).copied().unwrap_or(false)
    }

    pub fn count(&self) -> usize {
        self.data.iter().filter(|&&b| b).count()
    }

    /// Tight bounds of the set cells, or `None` when nothing is set.
    pub fn bounds(&self) -> Option<Rect> {
        let mut out: Option<Rect> = None;
        for v in 0..self.height {
            for u in 0..self.width {
                if !self.data[v * self.width + u] {
                    continue;
                }
                out = Some(match out {
                    None => Rect {
                        min_u: u,
                        min_v: v,
                        max_u: u,
                        max_v: v,
                    },
                    Some(r) => Rect {
                        min_u: r.min_u.min(u),
                        min_v: r.min_v,
                        max_u: r.max_u.max(u),
                        max_v: v,
                    },
                });
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_range_reads_are_empty_on_every_border() {
        let mut g = Grid2::new(3, 2, true);
        assert!(g.occupied(0, 0));
        for (u, v) in [(-1, 0), (3, 0), (0, -1), (0, 2), (-1, -1), (3, 2)] {
            assert!(!g.occupied(u, v));
            assert!(!g.set(u, v, true));
        }
        g.fill(false);
        assert_eq!(g.count(), 0);
    }

    #[test]
    fn bounds_are_tight_and_inclusive() {
        let mut g = Grid2::new(5, 4, false);
        assert_eq!(g.bounds(), None);
        g.set(3, 1, true);
        g.set(1, 2, true);
        let r = g.bounds();
        assert_eq!(
            r,
            Some(Rect {
                min_u: 1,
                min_v: 1,
                max_u: 3,
                max_v: 2
            })
        );
        assert_eq!(r.map(|r| (r.width(), r.height())), Some((3, 2)));
    }

    #[test]
    fn row_major_layout() {
        let mut g = Grid2::new(4, 3, 0u8);
        g.set(1, 2, 7);
        assert_eq!(g.get(1, 2), Some(&7));
        assert_eq!(g.data[2 * 4 + 1], 7);
    }
}
