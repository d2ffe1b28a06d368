use std::{fmt, io::Write};

use crate::{error::LayoutError, geom::Region};

/// One detector label: class ID plus a box normalised by canvas size.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Annotation {
    pub class_id: u32,
    pub cx: f64,
    pub cy: f64,
    pub w: f64,
    pub h: f64,
}

impl Annotation {
    pub fn from_region(class_id: u32, region: &Region, width: u32, height: u32) -> Self {
        let (cw, ch) = (f64::from(width), f64::from(height));
        let (w, h) = (f64::from(region.w), f64::from(region.h));
        Self {
            class_id,
            cx: (f64::from(region.x) + w / 2.0) / cw,
            cy: (f64::from(region.y) + h / 2.0) / ch,
            w: w / cw,
            h: h / ch,
        }
    }

    /// Back to pixel space on a `width` x `height` image, clamped to its bounds.
    pub fn to_region(&self, width: u32, height: u32) -> Region {
        let (cw, ch) = (f64::from(width), f64::from(height));
        let x0 = ((self.cx - self.w / 2.0) * cw).round().clamp(0.0, cw);
        let y0 = ((self.cy - self.h / 2.0) * ch).round().clamp(0.0, ch);
        let x1 = ((self.cx + self.w / 2.0) * cw).round().clamp(x0, cw);
        let y1 = ((self.cy + self.h / 2.0) * ch).round().clamp(y0, ch);
        Region::new(x0 as u32, y0 as u32, (x1 - x0) as u32, (y1 - y0) as u32)
    }

    pub fn parse_line(line: &str) -> Result<Self, LayoutError> {
        let bad = |reason: &str| LayoutError::MalformedAnnotation {
            line: line.to_string(),
            reason: reason.to_string(),
        };
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() != 5 {
            return Err(bad("expected 5 fields"));
        }
        let class_id = fields[0].parse().map_err(|_| bad("class id is not an integer"))?;
        let mut geom = [0.0f64; 4];
        for (slot, field) in geom.iter_mut().zip(&fields[1..]) {
            *slot = field.parse().map_err(|_| bad("coordinate is not a number"))?;
        }
        let [cx, cy, w, h] = geom;
        Ok(Self {
            class_id,
            cx,
            cy,
            w,
            h,
        })
    }

    pub fn parse_all(text: &str) -> Result<Vec<Self>, LayoutError> {
        text.lines()
            .filter(|l| !l.trim().is_empty())
            .map(Self::parse_line)
            .collect()
    }
}

impl fmt::Display for Annotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {:.6} {:.6} {:.6} {:.6}",
            self.class_id, self.cx, self.cy, self.w, self.h
        )
    }
}

/// Writes one line per annotation, in order.
pub fn write_annotations<W: Write>(out: &mut W, annotations: &[Annotation]) -> std::io::Result<()> {
    for a in annotations {
        writeln!(out, "{a}")?;
    }
    Ok(())
}
