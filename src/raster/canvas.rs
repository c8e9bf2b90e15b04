use image::{Rgb, RgbImage};

use crate::foundation::core::Dimensions;

/// Integer pixel rectangle, always inside the surface it was clipped against.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PixelRect {
    /// Left edge (inclusive).
    pub x: u32,
    /// Top edge (inclusive).
    pub y: u32,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl PixelRect {
    /// Exclusive right edge.
    pub fn right(&self) -> u32 {
        self.x + self.width
    }

    /// Exclusive bottom edge.
    pub fn bottom(&self) -> u32 {
        self.y + self.height
    }

    /// Intersect the rectangle `[x, x+w) x [y, y+h)` (signed, possibly off-surface) with a
    /// surface of `dims`. Returns `None` on an empty intersection.
    pub fn clip(x: i64, y: i64, w: u32, h: u32, dims: Dimensions) -> Option<Self> {
        let x0 = x.max(0);
        let y0 = y.max(0);
        let x1 = (x + i64::from(w)).min(i64::from(dims.width));
        let y1 = (y + i64::from(h)).min(i64::from(dims.height));
        if x1 <= x0 || y1 <= y0 {
            return None;
        }
        Some(Self {
            x: x0 as u32,
            y: y0 as u32,
            width: (x1 - x0) as u32,
            height: (y1 - y0) as u32,
        })
    }
}

/// Saved copy of a canvas rectangle, restored with [`Canvas::restore_region`].
#[derive(Clone, Debug)]
pub struct RegionSnapshot {
    rect: PixelRect,
    pixels: RgbImage,
}

impl RegionSnapshot {
    /// Rectangle this snapshot covers.
    pub fn rect(&self) -> PixelRect {
        self.rect
    }
}

/// Mutable RGB drawing surface of one scene.
///
/// Created filled with the scene background; every draw pass, reveal and motion frame mutates it
/// through these accessors.
#[derive(Clone, Debug)]
pub struct Canvas {
    image: RgbImage,
    background: Rgb<u8>,
}

impl Canvas {
    /// Create a canvas of `dims` filled with `background`.
    pub fn new(dims: Dimensions, background: Rgb<u8>) -> Self {
        Self {
            image: RgbImage::from_pixel(dims.width, dims.height, background),
            background,
        }
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Width and height.
    pub fn dimensions(&self) -> Dimensions {
        Dimensions::new(self.width(), self.height())
    }

    /// Background color the canvas was created with.
    pub fn background(&self) -> Rgb<u8> {
        self.background
    }

    /// Pixel at `(x, y)`. Panics when out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> Rgb<u8> {
        *self.image.get_pixel(x, y)
    }

    /// Overwrite the pixel at `(x, y)`. Panics when out of bounds.
    pub fn put_pixel(&mut self, x: u32, y: u32, px: Rgb<u8>) {
        self.image.put_pixel(x, y, px);
    }

    /// Read-only view of the pixels.
    pub fn image(&self) -> &RgbImage {
        &self.image
    }

    /// Full copy of the current pixels.
    pub fn snapshot(&self) -> RgbImage {
        self.image.clone()
    }

    /// Replace every pixel with `snapshot`. Sizes must match; mismatches are ignored.
    pub fn restore(&mut self, snapshot: &RgbImage) {
        if snapshot.dimensions() == self.image.dimensions() {
            self.image.clone_from(snapshot);
        }
    }

    /// Copy the pixels inside `rect`.
    pub fn copy_region(&self, rect: PixelRect) -> RegionSnapshot {
        let pixels = image::imageops::crop_imm(&self.image, rect.x, rect.y, rect.width, rect.height)
            .to_image();
        RegionSnapshot { rect, pixels }
    }

    /// Write a region copy back in place.
    pub fn restore_region(&mut self, snapshot: &RegionSnapshot) {
        let r = snapshot.rect;
        for (dx, dy, px) in snapshot.pixels.enumerate_pixels() {
            self.image.put_pixel(r.x + dx, r.y + dy, *px);
        }
    }

    /// Number of pixels that differ from the background.
    pub fn count_non_background(&self) -> usize {
        self.image
            .pixels()
            .filter(|px| **px != self.background)
            .count()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/raster/canvas.rs"]
mod tests;
