use image::RgbImage;
use serde::{Deserialize, Serialize};

use crate::animation::ease::Ease;
use crate::compose::compositor::{self, Anchor, PlacedLayer};
use crate::foundation::core::{Dimensions, Point};
use crate::foundation::math::lerp;
use crate::raster::canvas::Canvas;

/// Canvas edge a slide starts from or leaves towards.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Edge {
    /// Left canvas edge.
    #[default]
    Left,
    /// Right canvas edge.
    Right,
    /// Top canvas edge.
    Top,
    /// Bottom canvas edge.
    Bottom,
}

/// How a layer appears or disappears.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transition {
    /// Opacity ramps between 0 and the layer opacity.
    Fade,
    /// The layer travels from just outside the given edge to its placement.
    Slide(Edge),
    /// The layer scales around its center between 0 and full size.
    Zoom,
}

/// Which way a [`MotionPass`] moves the layer.
#[derive(Clone, Debug, PartialEq)]
pub enum Motion {
    /// From hidden to fully placed.
    Enter(Transition),
    /// From fully placed to hidden; the canvas ends without the layer.
    Exit(Transition),
    /// The layer anchor follows a polyline of canvas positions.
    Path {
        /// Canvas positions visited in order.
        points: Vec<Point>,
        /// Layer point that is pinned to the path.
        anchor: Anchor,
    },
}

impl Motion {
    /// Where `layer` rests after this motion. Exits still return the placed layer; removing it
    /// from the canvas is up to the caller.
    pub fn settle(&self, layer: &PlacedLayer) -> PlacedLayer {
        match self {
            Motion::Path { points, anchor } => match points.last() {
                Some(p) => layer.with_origin(origin_for(*p, *anchor, layer.size())),
                None => layer.clone(),
            },
            Motion::Enter(_) | Motion::Exit(_) => layer.clone(),
        }
    }
}

/// Pose of `layer` when it is `visible` in `[0, 1]` of the way into place.
///
/// Returns the layer to paint and its opacity, or `None` when nothing is visible.
pub fn pose(
    layer: &PlacedLayer,
    transition: Transition,
    visible: f64,
    canvas: Dimensions,
) -> Option<(PlacedLayer, f64)> {
    let visible = visible.clamp(0.0, 1.0);
    match transition {
        Transition::Fade => {
            let opacity = layer.opacity * visible;
            (opacity > 0.0).then(|| (layer.clone(), opacity))
        }
        Transition::Slide(edge) => {
            let size = layer.size();
            let (fx, fy) = (layer.origin.0 as f64, layer.origin.1 as f64);
            let (sx, sy) = match edge {
                Edge::Left => (-f64::from(size.width), fy),
                Edge::Right => (f64::from(canvas.width), fy),
                Edge::Top => (fx, -f64::from(size.height)),
                Edge::Bottom => (fx, f64::from(canvas.height)),
            };
            let origin = (
                lerp(sx, fx, visible).round() as i64,
                lerp(sy, fy, visible).round() as i64,
            );
            Some((layer.with_origin(origin), layer.opacity))
        }
        Transition::Zoom => {
            if visible >= 1.0 {
                return Some((layer.clone(), layer.opacity));
            }
            layer
                .scaled_about_center(visible)
                .map(|l| (l, layer.opacity))
        }
    }
}

/// Arc-length interpolation along `points` at progress `t` in `[0, 1]`.
pub fn point_along(points: &[Point], t: f64) -> Option<Point> {
    let first = *points.first()?;
    let lengths: Vec<f64> = points.windows(2).map(|w| w[0].distance(w[1])).collect();
    let total: f64 = lengths.iter().sum();
    if total <= 0.0 {
        return Some(first);
    }
    let mut target = t.clamp(0.0, 1.0) * total;
    for (i, len) in lengths.iter().enumerate() {
        if target <= *len && *len > 0.0 {
            return Some(points[i].lerp(points[i + 1], target / len));
        }
        target -= len;
    }
    points.last().copied()
}

fn origin_for(position: Point, anchor: Anchor, size: Dimensions) -> (i64, i64) {
    let (dx, dy) = match anchor {
        Anchor::TopLeft => (0.0, 0.0),
        Anchor::Center => (f64::from(size.width) / 2.0, f64::from(size.height) / 2.0),
    };
    ((position.x - dx).round() as i64, (position.y - dy).round() as i64)
}

/// Frame-by-frame layer motion over a fixed background snapshot.
///
/// Every step restores `base` and paints the layer in its pose for that frame.
pub struct MotionPass<'a> {
    base: &'a RgbImage,
    layer: &'a PlacedLayer,
    motion: Motion,
    frames: u64,
    ease: Ease,
    step: u64,
}

impl<'a> MotionPass<'a> {
    /// Motion of `layer` over `base` lasting `frames` frames.
    pub fn new(
        base: &'a RgbImage,
        layer: &'a PlacedLayer,
        motion: Motion,
        frames: u64,
        ease: Ease,
    ) -> Self {
        Self {
            base,
            layer,
            motion,
            frames,
            ease,
            step: 0,
        }
    }

    /// Render the next frame onto `canvas`. Returns `false` once all frames were produced.
    pub fn step(&mut self, canvas: &mut Canvas) -> bool {
        if self.step >= self.frames {
            return false;
        }
        self.step += 1;
        let t = self.ease.apply(self.step as f64 / self.frames as f64);
        let dims = canvas.dimensions();
        canvas.restore(self.base);

        let posed = match &self.motion {
            Motion::Enter(tr) => pose(self.layer, *tr, t, dims),
            Motion::Exit(tr) => pose(self.layer, *tr, 1.0 - t, dims),
            Motion::Path { points, anchor } => point_along(points, t).map(|p| {
                (
                    self.layer
                        .with_origin(origin_for(p, *anchor, self.layer.size())),
                    self.layer.opacity,
                )
            }),
        };
        if let Some((layer, opacity)) = posed {
            if layer.intelligent_eraser {
                compositor::erase_under(canvas, &layer);
            }
            compositor::paint_with_opacity(canvas, &layer, opacity);
        }
        true
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/motion.rs"]
mod tests;
