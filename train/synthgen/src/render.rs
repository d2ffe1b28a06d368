//! Drawing detector output over an image for visual inspection.
//!
//! The detector itself is external; anything that turns pixels into
//! [`Detection`]s can be plugged in through [`Detector`].

use std::path::Path;

use ab_glyph::{FontArc, PxScale};
use anyhow::Context;
use image::{Rgb, RgbImage};
use imageproc::{
    drawing::{draw_filled_rect_mut, draw_hollow_rect_mut, draw_text_mut, text_size},
    rect::Rect,
};
use log::info;
use symbol_layout::{Annotation, Region};

const BOX_COLOR: Rgb<u8> = Rgb([255, 0, 0]);
const TEXT_COLOR: Rgb<u8> = Rgb([255, 255, 255]);
const BOX_THICKNESS: u32 = 2;
const CAPTION_PX: f32 = 16.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Detection {
    pub region: Region,
    pub score: f32,
    pub class_id: u32,
}

pub trait Detector {
    fn detect(&mut self, image: &RgbImage) -> anyhow::Result<Vec<Detection>>;
}

/// Replays a label file as detections with full confidence.
pub struct LabelReplay {
    annotations: Vec<Annotation>,
}

impl LabelReplay {
    pub fn new(annotations: Vec<Annotation>) -> Self {
        Self { annotations }
    }

    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading labels {}", path.display()))?;
        let annotations = Annotation::parse_all(&text)
            .with_context(|| format!("parsing labels {}", path.display()))?;
        Ok(Self::new(annotations))
    }
}

impl Detector for LabelReplay {
    fn detect(&mut self, image: &RgbImage) -> anyhow::Result<Vec<Detection>> {
        let (w, h) = image.dimensions();
        Ok(self
            .annotations
            .iter()
            .map(|a| Detection {
                region: a.to_region(w, h),
                score: 1.0,
                class_id: a.class_id,
            })
            .collect())
    }
}

pub fn caption(det: &Detection, names: &[&str]) -> String {
    let name = names
        .get(det.class_id as usize)
        .map(|n| n.to_string())
        .unwrap_or_else(|| format!("class_{}", det.class_id));
    format!("{name} {:.2}", det.score)
}

/// Outlines every detection and, with a font, captions it above the box.
pub fn draw_detections(
    img: &mut RgbImage,
    detections: &[Detection],
    names: &[&str],
    font: Option<&FontArc>,
) {
    let scale = PxScale::from(CAPTION_PX);

    for det in detections {
        let r = det.region;
        if r.w == 0 || r.h == 0 {
            continue;
        }
        for inset in 0..BOX_THICKNESS {
            if r.w <= 2 * inset || r.h <= 2 * inset {
                break;
            }
            draw_hollow_rect_mut(
                img,
                Rect::at((r.x + inset) as i32, (r.y + inset) as i32)
                    .of_size(r.w - 2 * inset, r.h - 2 * inset),
                BOX_COLOR,
            );
        }

        let Some(font) = font else { continue };
        let label = caption(det, names);
        let (tw, th) = text_size(scale, font, &label);
        if tw == 0 || th == 0 {
            continue;
        }
        let baseline = 3;
        let top = r.y as i32 - th as i32 - baseline;
        draw_filled_rect_mut(
            img,
            Rect::at(r.x as i32, top).of_size(tw, th + baseline as u32),
            BOX_COLOR,
        );
        draw_text_mut(img, TEXT_COLOR, r.x as i32, top, scale, font, &label);
    }
}

pub fn log_detections(detections: &[Detection], names: &[&str]) {
    info!("Detected objects with confidence scores:");
    for det in detections {
        let name = names.get(det.class_id as usize).copied().unwrap_or("?");
        let r = det.region;
        info!(
            "Class: {name}, Confidence: {:.4}, Box: [{}, {}, {}, {}]",
            det.score,
            r.x,
            r.y,
            r.right(),
            r.bottom()
        );
    }
}
