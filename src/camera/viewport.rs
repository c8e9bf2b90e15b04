use crate::encode::sink::FrameRGB;
use crate::foundation::core::{Dimensions, Point, Vec2};
use crate::foundation::error::{ChalkError, ChalkResult};
use crate::raster::canvas::Canvas;

/// A virtual camera over the scene canvas.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
    /// Magnification, `> 0`. Values above 1 show a smaller part of the canvas.
    pub zoom: f64,
    /// Viewport center as a fraction of the canvas size.
    pub position: Vec2,
    /// Explicit viewport width at zoom 1, in canvas pixels.
    pub width: Option<f64>,
    /// Explicit viewport height at zoom 1, in canvas pixels.
    pub height: Option<f64>,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            position: Vec2::new(0.5, 0.5),
            width: None,
            height: None,
        }
    }
}

impl Camera {
    /// Camera that shows the whole canvas at the output aspect ratio, letterboxed with the
    /// background where the aspect ratios differ.
    pub fn overview(canvas: Dimensions, output: Dimensions) -> Self {
        let (cw, ch) = (f64::from(canvas.width), f64::from(canvas.height));
        let aspect = f64::from(output.width) / f64::from(output.height.max(1));
        let (w, h) = if cw / ch.max(1.0) > aspect {
            (cw, cw / aspect)
        } else {
            (ch * aspect, ch)
        };
        Self {
            width: Some(w),
            height: Some(h),
            ..Self::default()
        }
    }

    /// Reject non-finite or non-positive zoom.
    pub fn validate(&self) -> ChalkResult<()> {
        if !self.zoom.is_finite() || self.zoom <= 0.0 {
            return Err(ChalkError::geometry(format!(
                "camera zoom must be > 0, got {}",
                self.zoom
            )));
        }
        if !self.position.x.is_finite() || !self.position.y.is_finite() {
            return Err(ChalkError::geometry("camera position must be finite"));
        }
        for side in [self.width, self.height].into_iter().flatten() {
            if !side.is_finite() || side <= 0.0 {
                return Err(ChalkError::geometry(format!(
                    "camera viewport size must be > 0, got {side}"
                )));
            }
        }
        Ok(())
    }
}

/// Visible canvas rectangle, in canvas pixels. May exceed the canvas when it is larger than it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Visible width.
    pub width: f64,
    /// Visible height.
    pub height: f64,
}

impl Viewport {
    /// Whether the rectangle lies within a canvas of `dims`.
    pub fn is_contained_in(&self, dims: Dimensions) -> bool {
        const EPS: f64 = 1e-9;
        self.x >= -EPS
            && self.y >= -EPS
            && self.x + self.width <= f64::from(dims.width) + EPS
            && self.y + self.height <= f64::from(dims.height) + EPS
    }

    /// Map a canvas point to output-frame coordinates.
    pub fn to_output(&self, p: Point, output: Dimensions) -> Point {
        Point::new(
            (p.x - self.x) * f64::from(output.width) / self.width,
            (p.y - self.y) * f64::from(output.height) / self.height,
        )
    }
}

/// Zoom-1 viewport size: the explicit camera size, else the output size. A single explicit side
/// takes the other from the output aspect ratio.
fn base_size(camera: &Camera, output: Dimensions) -> (f64, f64) {
    let (ow, oh) = (f64::from(output.width), f64::from(output.height));
    let aspect = ow / oh;
    match (camera.width, camera.height) {
        (Some(w), Some(h)) => (w, h),
        (Some(w), None) => (w, w / aspect),
        (None, Some(h)) => (h * aspect, h),
        (None, None) => (ow, oh),
    }
}

fn place_axis(center: f64, size: f64, extent: f64) -> f64 {
    if size >= extent {
        (extent - size) / 2.0
    } else {
        (center - size / 2.0).clamp(0.0, extent - size)
    }
}

/// Resolve the viewport `camera` sees on a canvas of `canvas` size.
pub fn viewport(canvas: Dimensions, camera: &Camera, output: Dimensions) -> ChalkResult<Viewport> {
    camera.validate()?;
    canvas.ensure_non_empty("canvas")?;
    output.ensure_non_empty("output")?;

    let (bw, bh) = base_size(camera, output);
    let width = bw / camera.zoom;
    let height = bh / camera.zoom;
    if !(width > 0.0 && height > 0.0 && width.is_finite() && height.is_finite()) {
        return Err(ChalkError::geometry(format!(
            "viewport must be non-empty, got {width}x{height}"
        )));
    }

    let (cw, ch) = (f64::from(canvas.width), f64::from(canvas.height));
    Ok(Viewport {
        x: place_axis(camera.position.x * cw, width, cw),
        y: place_axis(camera.position.y * ch, height, ch),
        width,
        height,
    })
}

#[derive(Clone, Copy)]
struct Tap {
    i0: u32,
    i1: u32,
    frac: f64,
}

fn taps(start: f64, size: f64, out: u32, extent: u32) -> Vec<Option<Tap>> {
    let step = size / f64::from(out);
    let max = f64::from(extent) - 1.0;
    (0..out)
        .map(|o| {
            let s = start + (f64::from(o) + 0.5) * step - 0.5;
            if s < -0.5 || s > max + 0.5 {
                return None;
            }
            let s = s.clamp(0.0, max);
            let i0 = s.floor() as u32;
            let i1 = (i0 + 1).min(extent - 1);
            Some(Tap {
                i0,
                i1,
                frac: s - f64::from(i0),
            })
        })
        .collect()
}

/// Crop the camera viewport out of `canvas` and bilinearly resample it to `output`.
///
/// Parts of the viewport outside the canvas show the canvas background.
pub fn project(canvas: &Canvas, camera: &Camera, output: Dimensions) -> ChalkResult<FrameRGB> {
    let vp = viewport(canvas.dimensions(), camera, output)?;
    Ok(project_viewport(canvas, &vp, output))
}

pub(crate) fn project_viewport(canvas: &Canvas, vp: &Viewport, output: Dimensions) -> FrameRGB {
    let bg = canvas.background().0;
    let mut frame = FrameRGB::filled(output.width, output.height, bg);
    let xs = taps(vp.x, vp.width, output.width, canvas.width());
    let ys = taps(vp.y, vp.height, output.height, canvas.height());
    let img = canvas.image();

    for (oy, ty) in ys.iter().enumerate() {
        let Some(ty) = ty else { continue };
        for (ox, tx) in xs.iter().enumerate() {
            let Some(tx) = tx else { continue };
            let p00 = img.get_pixel(tx.i0, ty.i0).0;
            let p10 = img.get_pixel(tx.i1, ty.i0).0;
            let p01 = img.get_pixel(tx.i0, ty.i1).0;
            let p11 = img.get_pixel(tx.i1, ty.i1).0;
            let mut out = [0u8; 3];
            for c in 0..3 {
                let top = f64::from(p00[c]) + (f64::from(p10[c]) - f64::from(p00[c])) * tx.frac;
                let bot = f64::from(p01[c]) + (f64::from(p11[c]) - f64::from(p01[c])) * tx.frac;
                out[c] = (top + (bot - top) * ty.frac).round().clamp(0.0, 255.0) as u8;
            }
            frame.put_pixel(ox as u32, oy as u32, out);
        }
    }
    frame
}

#[cfg(test)]
#[path = "../../tests/unit/camera/viewport.rs"]
mod tests;
