use image::{RgbImage, RgbaImage};
use serde::{Deserialize, Serialize};

use crate::foundation::math::luma;

/// Cutoffs that decide which bitmap pixels count as ink.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InkThreshold {
    /// A pixel is ink when its luma is strictly below this value.
    pub threshold: u8,
    /// Optional override for bitmaps on a near-white background.
    pub adaptive: Option<AdaptiveInk>,
}

impl Default for InkThreshold {
    fn default() -> Self {
        Self {
            threshold: 128,
            adaptive: Some(AdaptiveInk::default()),
        }
    }
}

/// Near-white background detection.
///
/// When at least `min_background_ratio` of the pixels have luma `>= background_luma`, the bitmap
/// is treated as light artwork on paper and `threshold` replaces the fixed one, so pale strokes
/// still count as ink.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AdaptiveInk {
    /// Luma at or above which a pixel counts as paper.
    pub background_luma: u8,
    /// Share of paper pixels that switches to `threshold`.
    pub min_background_ratio: f64,
    /// Ink cutoff used for light artwork.
    pub threshold: u8,
}

impl Default for AdaptiveInk {
    fn default() -> Self {
        Self {
            background_luma: 245,
            min_background_ratio: 0.9,
            threshold: 230,
        }
    }
}

impl InkThreshold {
    /// Threshold that applies to `bitmap`.
    pub fn effective_threshold(&self, bitmap: &RgbImage) -> u8 {
        let Some(adaptive) = self.adaptive else {
            return self.threshold;
        };
        let total = u64::from(bitmap.width()) * u64::from(bitmap.height());
        if total == 0 {
            return self.threshold;
        }
        let light = bitmap
            .pixels()
            .filter(|px| luma(**px) >= adaptive.background_luma)
            .count() as f64;
        if light / (total as f64) >= adaptive.min_background_ratio {
            adaptive.threshold
        } else {
            self.threshold
        }
    }
}

/// Boolean grid marking which pixels of a bitmap carry drawn content.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InkMask {
    width: u32,
    height: u32,
    bits: Vec<bool>,
}

impl InkMask {
    /// All-false mask.
    pub fn empty(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            bits: vec![false; (width as usize) * (height as usize)],
        }
    }

    /// Classify by luminance: ink iff `luma < threshold`.
    pub fn from_luma(bitmap: &RgbImage, threshold: &InkThreshold) -> Self {
        let cutoff = threshold.effective_threshold(bitmap);
        let bits = bitmap.pixels().map(|px| luma(*px) < cutoff).collect();
        Self {
            width: bitmap.width(),
            height: bitmap.height(),
            bits,
        }
    }

    /// Classify by rasterizer coverage: ink iff `alpha > 0`.
    pub fn from_alpha(coverage: &RgbaImage) -> Self {
        let bits = coverage.pixels().map(|px| px.0[3] > 0).collect();
        Self {
            width: coverage.width(),
            height: coverage.height(),
            bits,
        }
    }

    /// Mask width.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Mask height.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Out-of-range coordinates read as `false`.
    pub fn get(&self, x: u32, y: u32) -> bool {
        if x >= self.width || y >= self.height {
            return false;
        }
        self.bits[(y as usize) * (self.width as usize) + (x as usize)]
    }

    /// Out-of-range writes are ignored.
    pub fn set(&mut self, x: u32, y: u32, ink: bool) {
        if x < self.width && y < self.height {
            self.bits[(y as usize) * (self.width as usize) + (x as usize)] = ink;
        }
    }

    /// Number of ink pixels.
    pub fn count(&self) -> usize {
        self.bits.iter().filter(|b| **b).count()
    }

    /// No ink at all.
    pub fn is_empty(&self) -> bool {
        !self.bits.iter().any(|b| *b)
    }

    /// Any ink inside `[x0, x1) x [y0, y1)`.
    pub fn any_in(&self, x0: u32, y0: u32, x1: u32, y1: u32) -> bool {
        let x1 = x1.min(self.width);
        let y1 = y1.min(self.height);
        (y0..y1).any(|y| (x0..x1).any(|x| self.get(x, y)))
    }

    /// Nearest-neighbour resize, used when a layer is scaled after classification.
    pub fn resize_nearest(&self, width: u32, height: u32) -> Self {
        let mut out = Self::empty(width, height);
        if self.width == 0 || self.height == 0 {
            return out;
        }
        for y in 0..height {
            let sy = ((u64::from(y) * u64::from(self.height)) / u64::from(height)) as u32;
            for x in 0..width {
                let sx = ((u64::from(x) * u64::from(self.width)) / u64::from(width)) as u32;
                out.set(x, y, self.get(sx, sy));
            }
        }
        out
    }
}

#[cfg(test)]
#[path = "../../tests/unit/raster/ink.rs"]
mod tests;
