use serde::Serialize;

/// Axis-aligned rectangle in canvas pixels, anchored at its top-left corner.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Region {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

impl Region {
    pub fn new(x: u32, y: u32, w: u32, h: u32) -> Self {
        Self { x, y, w, h }
    }

    pub fn right(&self) -> u64 {
        u64::from(self.x) + u64::from(self.w)
    }

    pub fn bottom(&self) -> u64 {
        u64::from(self.y) + u64::from(self.h)
    }

    pub fn overlaps(&self, other: &Region) -> bool {
        overlaps(
            self.x, self.y, self.w, self.h, other.x, other.y, other.w, other.h,
        )
    }

    /// True when the whole rectangle lies inside a `width` x `height` canvas.
    pub fn within(&self, width: u32, height: u32) -> bool {
        self.right() <= u64::from(width) && self.bottom() <= u64::from(height)
    }
}

/// Interior intersection test. Rectangles that only share an edge do not overlap.
#[allow(clippy::too_many_arguments)]
pub fn overlaps(x1: u32, y1: u32, w1: u32, h1: u32, x2: u32, y2: u32, w2: u32, h2: u32) -> bool {
    let (x1, y1, w1, h1) = (u64::from(x1), u64::from(y1), u64::from(w1), u64::from(h1));
    let (x2, y2, w2, h2) = (u64::from(x2), u64::from(y2), u64::from(w2), u64::from(h2));
    !(x1 + w1 <= x2 || x1 >= x2 + w2 || y1 + h1 <= y2 || y1 >= y2 + h2)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_rects_overlap() {
        let r = Region::new(10, 20, 30, 40);
        assert!(r.overlaps(&r));
    }

    #[test]
    fn shared_edges_do_not_overlap() {
        let a = Region::new(0, 0, 10, 10);
        assert!(!a.overlaps(&Region::new(10, 0, 10, 10)));
        assert!(!a.overlaps(&Region::new(0, 10, 10, 10)));
        assert!(!a.overlaps(&Region::new(10, 10, 5, 5)));
    }

    #[test]
    fn disjoint_rects_do_not_overlap() {
        let a = Region::new(0, 0, 5, 5);
        let b = Region::new(100, 200, 7, 3);
        assert!(!a.overlaps(&b));
        assert!(!b.overlaps(&a));
    }

    #[test]
    fn partial_and_contained_overlap() {
        let a = Region::new(0, 0, 10, 10);
        assert!(a.overlaps(&Region::new(9, 9, 10, 10)));
        assert!(a.overlaps(&Region::new(2, 2, 3, 3)));
        assert!(Region::new(2, 2, 3, 3).overlaps(&a));
    }

    #[test]
    fn overlap_is_commutative() {
        let rects = [
            Region::new(0, 0, 10, 10),
            Region::new(5, 5, 10, 10),
            Region::new(10, 0, 1, 1),
            Region::new(3, 12, 4, 4),
            Region::new(0, 0, 1700, 800),
        ];
        for a in &rects {
            for b in &rects {
                assert_eq!(a.overlaps(b), b.overlaps(a), "{a:?} vs {b:?}");
            }
        }
    }

    #[test]
    fn no_overflow_near_u32_max() {
        let a = Region::new(u32::MAX - 1, 0, u32::MAX, 1);
        let b = Region::new(0, 0, 1, 1);
        assert!(!a.overlaps(&b));
        assert!(!a.within(u32::MAX, 1));
    }

    #[test]
    fn within_canvas() {
        assert!(Region::new(1600, 750, 100, 50).within(1700, 800));
        assert!(!Region::new(1601, 750, 100, 50).within(1700, 800));
    }
}
