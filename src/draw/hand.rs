use std::path::Path;

use image::RgbaImage;

use crate::encode::sink::FrameRGB;
use crate::foundation::core::Point;
use crate::foundation::error::{ChalkError, ChalkResult};
use crate::foundation::math::blend_rgb;

/// Hand (or pen) image stamped on draw frames so its tip sits on the pen position.
#[derive(Clone, Debug)]
pub struct HandSprite {
    image: RgbaImage,
    tip: (f64, f64),
}

impl HandSprite {
    /// Build a sprite from an RGBA image, the tip offset in source pixels and a scale.
    pub fn new(image: RgbaImage, tip: (f64, f64), scale: f64) -> ChalkResult<Self> {
        if !scale.is_finite() || scale <= 0.0 {
            return Err(ChalkError::validation(format!(
                "hand scale must be > 0, got {scale}"
            )));
        }
        if image.width() == 0 || image.height() == 0 {
            return Err(ChalkError::validation("hand image is empty"));
        }
        let (image, tip) = if (scale - 1.0).abs() < f64::EPSILON {
            (image, tip)
        } else {
            let w = ((f64::from(image.width()) * scale).round() as u32).max(1);
            let h = ((f64::from(image.height()) * scale).round() as u32).max(1);
            (
                image::imageops::resize(&image, w, h, image::imageops::FilterType::Triangle),
                (tip.0 * scale, tip.1 * scale),
            )
        };
        Ok(Self { image, tip })
    }

    /// Load the sprite from an image file.
    pub fn load(path: &Path, tip: (f64, f64), scale: f64) -> ChalkResult<Self> {
        let image = image::open(path)
            .map_err(|e| {
                ChalkError::rasterize(format!(
                    "failed to decode hand image '{}': {e}",
                    path.display()
                ))
            })?
            .to_rgba8();
        Self::new(image, tip, scale)
    }

    /// Alpha-composite the sprite onto `frame` with its tip at `pen` (frame coordinates).
    pub fn stamp(&self, frame: &mut FrameRGB, pen: Point) {
        let left = (pen.x - self.tip.0).round() as i64;
        let top = (pen.y - self.tip.1).round() as i64;
        for (sx, sy, px) in self.image.enumerate_pixels() {
            let a = px.0[3];
            if a == 0 {
                continue;
            }
            let x = left + i64::from(sx);
            let y = top + i64::from(sy);
            if x < 0 || y < 0 || x >= i64::from(frame.width) || y >= i64::from(frame.height) {
                continue;
            }
            let (x, y) = (x as u32, y as u32);
            let dst = image::Rgb(frame.pixel(x, y));
            let src = image::Rgb([px.0[0], px.0[1], px.0[2]]);
            frame.put_pixel(x, y, blend_rgb(dst, src, a).0);
        }
    }
}
