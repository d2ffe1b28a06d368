use rand::Rng;

use crate::geom::Region;

/// Attempts per labelled symbol.
pub const SYMBOL_TRIES: u32 = 300;
/// Attempts per context (clutter) image.
pub const CONTEXT_TRIES: u32 = 50;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Placement {
    Placed { region: Region, attempts: u32 },
    /// The item is wider or taller than the canvas.
    TooLarge,
    /// Every attempt collided with an occupied region.
    Exhausted { attempts: u32 },
}

/// Regions claimed on one canvas. Regions are only ever added.
#[derive(Debug, Clone)]
pub struct Occupancy {
    width: u32,
    height: u32,
    regions: Vec<Region>,
}

impl Occupancy {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            regions: Vec::new(),
        }
    }

    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    pub fn is_free(&self, candidate: &Region) -> bool {
        !self.regions.iter().any(|r| r.overlaps(candidate))
    }

    /// Claims a region unconditionally.
    pub fn reserve(&mut self, region: Region) {
        self.regions.push(region);
    }

    /// Draws random top-left corners until a `w` x `h` box fits without
    /// overlapping anything already claimed, or `tries` draws have failed.
    pub fn try_place<R: Rng>(&mut self, w: u32, h: u32, tries: u32, rng: &mut R) -> Placement {
        if w > self.width || h > self.height {
            return Placement::TooLarge;
        }
        let (max_x, max_y) = (self.width - w, self.height - h);

        for attempt in 1..=tries {
            let (x, y) = (rng.random_range(0..=max_x), rng.random_range(0..=max_y));
            let candidate = Region::new(x, y, w, h);
            if self.is_free(&candidate) {
                self.regions.push(candidate);
                return Placement::Placed {
                    region: candidate,
                    attempts: attempt,
                };
            }
        }

        Placement::Exhausted { attempts: tries }
    }
}

/// Orders items largest-first so big items claim space while it is plentiful.
/// The sort is stable; equal areas keep their incoming order.
pub fn sort_by_area_desc<T>(items: &mut [T], dims: impl Fn(&T) -> (u32, u32)) {
    items.sort_by_key(|item| {
        let (w, h) = dims(item);
        std::cmp::Reverse(u64::from(w) * u64::from(h))
    });
}
