use image::{Rgb, RgbImage};
use log::{debug, warn};
use rand::Rng;

use crate::{
    annotation::Annotation,
    composite::{Sprite, composite},
    error::LayoutError,
    geom::Region,
    placement::{self, CONTEXT_TRIES, Occupancy, Placement, SYMBOL_TRIES},
};

/// A named image resource, loaded once and shared by every scene.
#[derive(Debug, Clone)]
pub struct Asset {
    pub name: String,
    pub sprite: Sprite,
}

/// An asset that becomes a detection target.
#[derive(Debug, Clone)]
pub struct Symbol {
    pub asset: Asset,
    pub class_id: u32,
}

#[derive(Debug, Clone, Copy)]
pub struct SceneCfg {
    pub width: u32,
    pub height: u32,
    pub background: Rgb<u8>,
    pub symbol_tries: u32,
    pub context_tries: u32,
}

impl Default for SceneCfg {
    fn default() -> Self {
        Self {
            width: 1700,
            height: 800,
            background: Rgb([230, 178, 172]),
            symbol_tries: SYMBOL_TRIES,
            context_tries: CONTEXT_TRIES,
        }
    }
}

/// A symbol that could not be placed and why.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Skipped {
    pub name: String,
    pub outcome: Placement,
}

/// One generated canvas with its labels.
pub struct Scene {
    pub canvas: RgbImage,
    pub annotations: Vec<Annotation>,
    /// Symbol regions, parallel to `annotations`.
    pub boxes: Vec<Region>,
    /// Unlabelled context image regions.
    pub clutter: Vec<Region>,
    pub skipped: Vec<Skipped>,
}

/// Read-only symbol and context sets, in placement order.
#[derive(Debug, Clone)]
pub struct Library {
    symbols: Vec<Symbol>,
    contexts: Vec<Asset>,
}

impl Library {
    /// Symbols are reordered largest-area first; equal areas keep their order.
    pub fn new(mut symbols: Vec<Symbol>, contexts: Vec<Asset>) -> Result<Self, LayoutError> {
        if symbols.is_empty() {
            return Err(LayoutError::NoSymbols);
        }
        placement::sort_by_area_desc(&mut symbols, |s| s.asset.sprite.dimensions());
        Ok(Self { symbols, contexts })
    }

    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    /// Composes a fresh canvas: every symbol, then every context image.
    ///
    /// Items that cannot be placed are skipped. Nothing here fails.
    pub fn compose<R: Rng>(&self, cfg: &SceneCfg, rng: &mut R) -> Scene {
        let mut canvas = RgbImage::from_pixel(cfg.width, cfg.height, cfg.background);
        let mut occupancy = Occupancy::new(cfg.width, cfg.height);
        let mut annotations = Vec::with_capacity(self.symbols.len());
        let mut boxes = Vec::with_capacity(self.symbols.len());
        let mut skipped = Vec::new();
        let mut clutter = Vec::new();

        for symbol in &self.symbols {
            let (w, h) = symbol.asset.sprite.dimensions();
            match occupancy.try_place(w, h, cfg.symbol_tries, rng) {
                Placement::Placed { region, .. } => {
                    composite(&mut canvas, &symbol.asset.sprite, region.x, region.y);
                    annotations.push(Annotation::from_region(
                        symbol.class_id,
                        &region,
                        cfg.width,
                        cfg.height,
                    ));
                    boxes.push(region);
                }
                outcome => {
                    match outcome {
                        Placement::TooLarge => warn!(
                            "Could not place {}: {w}x{h} does not fit a {}x{} canvas",
                            symbol.asset.name, cfg.width, cfg.height
                        ),
                        _ => warn!(
                            "Could not place {} after {} attempts",
                            symbol.asset.name, cfg.symbol_tries
                        ),
                    }
                    skipped.push(Skipped {
                        name: symbol.asset.name.clone(),
                        outcome,
                    });
                }
            }
        }

        for ctx in &self.contexts {
            let (w, h) = ctx.sprite.dimensions();
            match occupancy.try_place(w, h, cfg.context_tries, rng) {
                Placement::Placed { region, .. } => {
                    composite(&mut canvas, &ctx.sprite, region.x, region.y);
                    clutter.push(region);
                }
                outcome => debug!("Context image {} skipped: {outcome:?}", ctx.name),
            }
        }

        debug!(
            "Scene composed: {} labelled of {} claimed regions",
            boxes.len(),
            occupancy.regions().len()
        );
        Scene {
            canvas,
            annotations,
            boxes,
            clutter,
            skipped,
        }
    }
}
