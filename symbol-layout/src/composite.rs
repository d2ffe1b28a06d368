use image::{DynamicImage, RgbImage, RgbaImage};

/// Decoded pixels of a symbol or context image.
#[derive(Debug, Clone)]
pub enum Sprite {
    /// No transparency channel; copied over the canvas as-is.
    Opaque(RgbImage),
    /// Alpha-blended onto the canvas.
    Alpha(RgbaImage),
}

impl Sprite {
    pub fn from_dynamic(img: DynamicImage) -> Self {
        if img.color().has_alpha() {
            Sprite::Alpha(img.into_rgba8())
        } else {
            Sprite::Opaque(img.into_rgb8())
        }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        match self {
            Sprite::Opaque(img) => img.dimensions(),
            Sprite::Alpha(img) => img.dimensions(),
        }
    }
}

/// Writes `sprite` onto `canvas` with its top-left corner at (`x`, `y`).
///
/// Pixels falling outside the canvas are dropped.
pub fn composite(canvas: &mut RgbImage, sprite: &Sprite, x: u32, y: u32) {
    let (cw, ch) = canvas.dimensions();
    let (sw, sh) = sprite.dimensions();
    debug_assert!(u64::from(x) + u64::from(sw) <= u64::from(cw));
    debug_assert!(u64::from(y) + u64::from(sh) <= u64::from(ch));

    let w = sw.min(cw.saturating_sub(x));
    let h = sh.min(ch.saturating_sub(y));

    match sprite {
        Sprite::Opaque(src) => {
            for sy in 0..h {
                for sx in 0..w {
                    canvas.put_pixel(x + sx, y + sy, *src.get_pixel(sx, sy));
                }
            }
        }
        Sprite::Alpha(src) => {
            for sy in 0..h {
                for sx in 0..w {
                    let s = src.get_pixel(sx, sy).0;
                    let alpha = f32::from(s[3]) / 255.0;
                    let d = canvas.get_pixel_mut(x + sx, y + sy);
                    for c in 0..3 {
                        let blended = (1.0 - alpha) * f32::from(d.0[c]) + alpha * f32::from(s[c]);
                        d.0[c] = blended.round().clamp(0.0, 255.0) as u8;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use image::{Rgb, Rgba};

    use super::*;

    const BG: Rgb<u8> = Rgb([230, 178, 172]);

    #[test]
    fn opaque_overwrites_region_only() {
        let mut canvas = RgbImage::from_pixel(20, 10, BG);
        let sprite = Sprite::Opaque(RgbImage::from_pixel(4, 3, Rgb([1, 2, 3])));
        composite(&mut canvas, &sprite, 5, 2);

        for (px, py, p) in canvas.enumerate_pixels() {
            let inside = (5..9).contains(&px) && (2..5).contains(&py);
            assert_eq!(*p, if inside { Rgb([1, 2, 3]) } else { BG }, "({px}, {py})");
        }
    }

    #[test]
    fn alpha_blends_per_pixel() {
        let mut canvas = RgbImage::from_pixel(3, 1, Rgb([200, 100, 0]));
        let mut src = RgbaImage::new(3, 1);
        src.put_pixel(0, 0, Rgba([0, 0, 0, 0]));
        src.put_pixel(1, 0, Rgba([0, 0, 0, 255]));
        src.put_pixel(2, 0, Rgba([100, 200, 255, 51]));
        composite(&mut canvas, &Sprite::Alpha(src), 0, 0);

        assert_eq!(*canvas.get_pixel(0, 0), Rgb([200, 100, 0]));
        assert_eq!(*canvas.get_pixel(1, 0), Rgb([0, 0, 0]));
        // alpha 0.2: 0.8 * dst + 0.2 * src
        assert_eq!(*canvas.get_pixel(2, 0), Rgb([180, 120, 51]));
    }

    #[test]
    fn alpha_channel_is_detected() {
        let rgba = DynamicImage::ImageRgba8(RgbaImage::new(2, 2));
        let rgb = DynamicImage::ImageRgb8(RgbImage::new(2, 3));
        let gray = DynamicImage::ImageLuma8(image::GrayImage::new(5, 1));
        assert!(matches!(Sprite::from_dynamic(rgba), Sprite::Alpha(_)));
        assert!(matches!(Sprite::from_dynamic(rgb), Sprite::Opaque(_)));
        let widened = Sprite::from_dynamic(gray);
        assert!(matches!(widened, Sprite::Opaque(_)));
        assert_eq!(widened.dimensions(), (5, 1));
    }
}
