//! Progressive draw passes.
//!
//! A pass walks the ink of one [`PlacedLayer`] in a fixed order and mutates the scene canvas a
//! batch of units at a time. Each call to [`DrawPass::next_batch`] corresponds to one emitted
//! frame and returns the pen position for that frame. The last batch always ends with the
//! full-color reveal of the layer.

pub(crate) mod columns;
pub(crate) mod hand;
pub(crate) mod regions;
pub(crate) mod tiles;

use crate::compose::compositor::{self, PlacedLayer};
use crate::foundation::core::Point;
use crate::raster::canvas::{Canvas, RegionSnapshot};

/// A finite, non-restartable sequence of canvas mutations.
pub trait DrawPass {
    /// Total number of draw units (tiles, columns, bands, regions).
    fn unit_count(&self) -> usize;

    /// Set how many units one batch draws. Values below 1 are treated as 1.
    fn set_batch_size(&mut self, units: usize);

    /// Draw the next batch onto `canvas` and return the pen position, or `None` when exhausted.
    fn next_batch(&mut self, canvas: &mut Canvas) -> Option<Point>;
}

/// Restores the layer rectangle to its pre-draw pixels and repaints the layer in full color.
///
/// The snapshot is taken lazily on the first batch so the pass sees the canvas exactly as the
/// orchestrator left it (after erasing, for instance).
#[derive(Debug, Default)]
pub(crate) struct Reveal {
    saved: Option<RegionSnapshot>,
    done: bool,
}

impl Reveal {
    pub(crate) fn capture(&mut self, canvas: &Canvas, layer: &PlacedLayer) {
        if self.saved.is_none() && !self.done {
            self.saved = layer
                .clip_rect(canvas.dimensions())
                .map(|rect| canvas.copy_region(rect));
        }
    }

    pub(crate) fn apply(&mut self, canvas: &mut Canvas, layer: &PlacedLayer) {
        if self.done {
            return;
        }
        if let Some(saved) = self.saved.take() {
            canvas.restore_region(&saved);
        }
        compositor::paint(canvas, layer);
        self.done = true;
    }
}

pub(crate) fn clamp_batch(units: usize) -> usize {
    units.max(1)
}
