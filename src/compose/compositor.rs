use image::{Rgb, RgbImage};
use serde::{Deserialize, Serialize};

use crate::foundation::core::{Dimensions, Point};
use crate::foundation::error::{ChalkError, ChalkResult};
use crate::foundation::math::{blend_rgb, opacity_to_u8};
use crate::raster::canvas::{Canvas, PixelRect};
use crate::raster::ink::InkMask;

/// Which point of the layer `position` refers to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Anchor {
    /// `position` is the top-left corner.
    #[default]
    #[serde(alias = "top-left")]
    TopLeft,
    /// `position` is the center of the resolved size.
    Center,
}

/// Where and how big a layer lands on the scene canvas.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Placement {
    /// Canvas position of the anchor point.
    pub position: Point,
    /// Which layer point `position` pins.
    pub anchor: Anchor,
    /// Explicit target width; height follows the aspect ratio when unset.
    pub width: Option<u32>,
    /// Explicit target height; width follows the aspect ratio when unset.
    pub height: Option<u32>,
    /// Uniform scale, used only without explicit size.
    pub scale: f64,
}

impl Default for Placement {
    fn default() -> Self {
        Self {
            position: Point::ZERO,
            anchor: Anchor::TopLeft,
            width: None,
            height: None,
            scale: 1.0,
        }
    }
}

impl Placement {
    /// Resolve the on-canvas size for a bitmap of `natural` size.
    pub fn resolve_size(&self, natural: Dimensions) -> ChalkResult<Dimensions> {
        natural.ensure_non_empty("layer bitmap")?;
        let (nw, nh) = (f64::from(natural.width), f64::from(natural.height));
        let (w, h) = match (self.width, self.height) {
            (Some(w), Some(h)) => (f64::from(w), f64::from(h)),
            (Some(w), None) => (f64::from(w), f64::from(w) * nh / nw),
            (None, Some(h)) => (f64::from(h) * nw / nh, f64::from(h)),
            (None, None) => {
                if !self.scale.is_finite() || self.scale <= 0.0 {
                    return Err(ChalkError::geometry(format!(
                        "layer scale must be > 0, got {}",
                        self.scale
                    )));
                }
                (nw * self.scale, nh * self.scale)
            }
        };
        Dimensions::new(w.round().max(1.0) as u32, h.round().max(1.0) as u32)
            .ensure_non_empty("layer size")
    }

    /// Top-left corner for a layer of `size`.
    pub fn origin(&self, size: Dimensions) -> (i64, i64) {
        match self.anchor {
            Anchor::TopLeft => (
                self.position.x.round() as i64,
                self.position.y.round() as i64,
            ),
            Anchor::Center => (
                (self.position.x - f64::from(size.width) / 2.0).round() as i64,
                (self.position.y - f64::from(size.height) / 2.0).round() as i64,
            ),
        }
    }
}

/// A rasterized layer resolved to its final size and canvas position.
#[derive(Clone, Debug)]
pub struct PlacedLayer {
    /// Top-left corner in canvas coordinates; may lie outside the canvas.
    pub origin: (i64, i64),
    /// Source colors at the placed size.
    pub bitmap: RgbImage,
    /// Ink coverage, same size as `bitmap`.
    pub mask: InkMask,
    /// Final opacity in `[0, 1]`.
    pub opacity: f64,
    /// Paint order; higher paints later.
    pub z_index: i32,
    /// Clear the canvas under the layer's ink before drawing.
    pub intelligent_eraser: bool,
}

impl PlacedLayer {
    /// Resize `bitmap`/`mask` according to `placement` and compute the origin.
    pub fn place(
        bitmap: RgbImage,
        mask: InkMask,
        placement: &Placement,
        opacity: f64,
        z_index: i32,
        intelligent_eraser: bool,
    ) -> ChalkResult<Self> {
        let natural = Dimensions::new(bitmap.width(), bitmap.height());
        let size = placement.resolve_size(natural)?;
        let (bitmap, mask) = if size == natural {
            (bitmap, mask)
        } else {
            (
                image::imageops::resize(
                    &bitmap,
                    size.width,
                    size.height,
                    image::imageops::FilterType::Triangle,
                ),
                mask.resize_nearest(size.width, size.height),
            )
        };
        Ok(Self {
            origin: placement.origin(size),
            bitmap,
            mask,
            opacity: opacity.clamp(0.0, 1.0),
            z_index,
            intelligent_eraser,
        })
    }

    /// Placed bitmap size.
    pub fn size(&self) -> Dimensions {
        Dimensions::new(self.bitmap.width(), self.bitmap.height())
    }

    /// Intersection with a canvas of `dims`, or `None` when the layer is fully off-canvas.
    pub fn clip_rect(&self, dims: Dimensions) -> Option<PixelRect> {
        PixelRect::clip(
            self.origin.0,
            self.origin.1,
            self.bitmap.width(),
            self.bitmap.height(),
            dims,
        )
    }

    /// Canvas position of the layer center.
    pub fn center(&self) -> Point {
        Point::new(
            self.origin.0 as f64 + f64::from(self.bitmap.width()) / 2.0,
            self.origin.1 as f64 + f64::from(self.bitmap.height()) / 2.0,
        )
    }

    /// Same layer moved to `origin`.
    pub fn with_origin(&self, origin: (i64, i64)) -> Self {
        Self {
            origin,
            ..self.clone()
        }
    }

    /// Same layer uniformly scaled about its center. `factor <= 0` yields `None`.
    pub fn scaled_about_center(&self, factor: f64) -> Option<Self> {
        if !factor.is_finite() || factor <= 0.0 {
            return None;
        }
        let w = (f64::from(self.bitmap.width()) * factor).round() as u32;
        let h = (f64::from(self.bitmap.height()) * factor).round() as u32;
        if w == 0 || h == 0 {
            return None;
        }
        let c = self.center();
        Some(Self {
            origin: (
                (c.x - f64::from(w) / 2.0).round() as i64,
                (c.y - f64::from(h) / 2.0).round() as i64,
            ),
            bitmap: image::imageops::resize(
                &self.bitmap,
                w,
                h,
                image::imageops::FilterType::Triangle,
            ),
            mask: self.mask.resize_nearest(w, h),
            ..self.clone()
        })
    }

    /// Canvas coordinates of local pixel `(lx, ly)` if it lands on a canvas of `dims`.
    pub(crate) fn to_canvas(&self, lx: u32, ly: u32, dims: Dimensions) -> Option<(u32, u32)> {
        let x = self.origin.0 + i64::from(lx);
        let y = self.origin.1 + i64::from(ly);
        if x < 0 || y < 0 || x >= i64::from(dims.width) || y >= i64::from(dims.height) {
            return None;
        }
        Some((x as u32, y as u32))
    }
}

/// Reset canvas pixels under the layer's ink to the canvas background.
pub fn erase_under(canvas: &mut Canvas, layer: &PlacedLayer) {
    let Some(rect) = layer.clip_rect(canvas.dimensions()) else {
        return;
    };
    let bg = canvas.background();
    for_each_local(layer, rect, |lx, ly, cx, cy| {
        if layer.mask.get(lx, ly) {
            canvas.put_pixel(cx, cy, bg);
        }
    });
}

/// Paint the layer at its own opacity.
pub fn paint(canvas: &mut Canvas, layer: &PlacedLayer) {
    paint_with_opacity(canvas, layer, layer.opacity);
}

/// Paint the layer at an explicit opacity.
///
/// At full opacity only ink pixels are copied, so the layer's paper never covers what lies
/// beneath it. Below full opacity the whole clipped rectangle is blended.
pub fn paint_with_opacity(canvas: &mut Canvas, layer: &PlacedLayer, opacity: f64) {
    let Some(rect) = layer.clip_rect(canvas.dimensions()) else {
        return;
    };
    let alpha = opacity_to_u8(opacity);
    if alpha == 0 {
        return;
    }
    if alpha == 255 {
        for_each_local(layer, rect, |lx, ly, cx, cy| {
            if layer.mask.get(lx, ly) {
                canvas.put_pixel(cx, cy, *layer.bitmap.get_pixel(lx, ly));
            }
        });
    } else {
        for_each_local(layer, rect, |lx, ly, cx, cy| {
            let src = *layer.bitmap.get_pixel(lx, ly);
            canvas.put_pixel(cx, cy, blend_rgb(canvas.pixel(cx, cy), src, alpha));
        });
    }
}

/// Write one local pixel in `color`, honoring the layer opacity.
pub(crate) fn put_layer_pixel(
    canvas: &mut Canvas,
    layer: &PlacedLayer,
    lx: u32,
    ly: u32,
    color: Rgb<u8>,
) {
    let Some((cx, cy)) = layer.to_canvas(lx, ly, canvas.dimensions()) else {
        return;
    };
    let alpha = opacity_to_u8(layer.opacity);
    let out = if alpha == 255 {
        color
    } else {
        blend_rgb(canvas.pixel(cx, cy), color, alpha)
    };
    canvas.put_pixel(cx, cy, out);
}

fn for_each_local(layer: &PlacedLayer, rect: PixelRect, mut f: impl FnMut(u32, u32, u32, u32)) {
    for cy in rect.y..rect.bottom() {
        let ly = (i64::from(cy) - layer.origin.1) as u32;
        for cx in rect.x..rect.right() {
            let lx = (i64::from(cx) - layer.origin.0) as u32;
            f(lx, ly, cx, cy);
        }
    }
}

/// Layers in paint order: ascending z-index, ties keep input order.
pub fn paint_order(layers: &[PlacedLayer]) -> Vec<&PlacedLayer> {
    let mut ordered: Vec<&PlacedLayer> = layers.iter().collect();
    ordered.sort_by_key(|l| l.z_index);
    ordered
}

/// Composite every layer onto a fresh canvas without animation.
pub fn compose(layers: &[PlacedLayer], dims: Dimensions, background: Rgb<u8>) -> Canvas {
    let mut canvas = Canvas::new(dims, background);
    for layer in paint_order(layers) {
        if layer.clip_rect(dims).is_none() {
            tracing::warn!(
                origin = ?layer.origin,
                size = ?layer.size(),
                "layer lies entirely outside the canvas, skipped"
            );
            continue;
        }
        if layer.intelligent_eraser {
            erase_under(&mut canvas, layer);
        }
        paint(&mut canvas, layer);
    }
    canvas
}

#[cfg(test)]
#[path = "../../tests/unit/compose/compositor.rs"]
mod tests;
