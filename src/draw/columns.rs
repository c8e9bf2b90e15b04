use crate::compose::compositor::{PlacedLayer, put_layer_pixel};
use crate::draw::{DrawPass, Reveal, clamp_batch};
use crate::foundation::core::Point;
use crate::foundation::math::grayscale;
use crate::raster::canvas::Canvas;

/// Blank rows needed between two ink rows to start a new line band.
pub const DEFAULT_LINE_GAP: u32 = 4;

/// Vertical run of ink pixels in one bitmap column, `[y0, y1)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Segment {
    /// Bitmap column.
    pub x: u32,
    /// First ink row.
    pub y0: u32,
    /// One past the last ink row.
    pub y1: u32,
}

/// All segments of one column inside one line band.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColumnUnit {
    /// Line band index, top to bottom.
    pub band: usize,
    /// Ink runs of this column within the band, top to bottom.
    pub segments: Vec<Segment>,
}

/// Handwriting-style order for text: line bands top to bottom, columns left to right.
pub struct ColumnDrawScheduler<'a> {
    layer: &'a PlacedLayer,
    units: Vec<ColumnUnit>,
    next: usize,
    batch: usize,
    reveal: Reveal,
}

impl<'a> ColumnDrawScheduler<'a> {
    /// Split `layer` into line bands separated by at least `line_gap` blank rows.
    pub fn new(layer: &'a PlacedLayer, line_gap: u32, columns_per_batch: usize) -> Self {
        Self {
            layer,
            units: column_units(layer, line_gap),
            next: 0,
            batch: clamp_batch(columns_per_batch),
            reveal: Reveal::default(),
        }
    }

    /// Units in draw order.
    pub fn units(&self) -> &[ColumnUnit] {
        &self.units
    }
}

impl DrawPass for ColumnDrawScheduler<'_> {
    fn unit_count(&self) -> usize {
        self.units.len()
    }

    fn set_batch_size(&mut self, units: usize) {
        self.batch = clamp_batch(units);
    }

    fn next_batch(&mut self, canvas: &mut Canvas) -> Option<Point> {
        if self.next >= self.units.len() {
            return None;
        }
        self.reveal.capture(canvas, self.layer);

        let end = (self.next + self.batch).min(self.units.len());
        let mut pen = Point::ZERO;
        for unit in &self.units[self.next..end] {
            for seg in &unit.segments {
                for ly in seg.y0..seg.y1 {
                    let px = grayscale(*self.layer.bitmap.get_pixel(seg.x, ly));
                    put_layer_pixel(canvas, self.layer, seg.x, ly, px);
                }
            }
            if let Some(last) = unit.segments.last() {
                pen = Point::new(
                    self.layer.origin.0 as f64 + f64::from(last.x) + 0.5,
                    self.layer.origin.1 as f64 + f64::from(last.y0 + last.y1) / 2.0,
                );
            }
        }
        self.next = end;
        if self.next >= self.units.len() {
            self.reveal.apply(canvas, self.layer);
        }
        Some(pen)
    }
}

/// Row ranges `[y0, y1)` holding ink, merged when fewer than `line_gap` blank rows separate them.
pub(crate) fn line_bands(layer: &PlacedLayer, line_gap: u32) -> Vec<(u32, u32)> {
    let (w, h) = (layer.mask.width(), layer.mask.height());
    let mut bands: Vec<(u32, u32)> = Vec::new();
    for y in 0..h {
        if !layer.mask.any_in(0, y, w, y + 1) {
            continue;
        }
        match bands.last_mut() {
            Some((_, end)) if y - *end < line_gap => *end = y + 1,
            _ => bands.push((y, y + 1)),
        }
    }
    bands
}

fn column_units(layer: &PlacedLayer, line_gap: u32) -> Vec<ColumnUnit> {
    let mut units = Vec::new();
    for (band, (y0, y1)) in line_bands(layer, line_gap).into_iter().enumerate() {
        for x in 0..layer.mask.width() {
            let mut segments = Vec::new();
            let mut run: Option<u32> = None;
            for y in y0..y1 {
                match (layer.mask.get(x, y), run) {
                    (true, None) => run = Some(y),
                    (false, Some(start)) => {
                        segments.push(Segment {
                            x,
                            y0: start,
                            y1: y,
                        });
                        run = None;
                    }
                    _ => {}
                }
            }
            if let Some(start) = run {
                segments.push(Segment { x, y0: start, y1 });
            }
            if !segments.is_empty() {
                units.push(ColumnUnit { band, segments });
            }
        }
    }
    units
}

#[cfg(test)]
#[path = "../../tests/unit/draw/columns.rs"]
mod tests;
