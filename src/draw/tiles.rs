use crate::compose::compositor::{PlacedLayer, put_layer_pixel};
use crate::draw::{DrawPass, Reveal, clamp_batch};
use crate::foundation::core::Point;
use crate::foundation::error::{ChalkError, ChalkResult};
use crate::foundation::math::grayscale;
use crate::raster::canvas::Canvas;

/// One cell of the uniform tile grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Tile {
    /// Grid row, from the top.
    pub row: u32,
    /// Grid column, from the left.
    pub col: u32,
}

/// Greedy nearest-tile draw order over a layer's ink mask.
///
/// Active tiles are discovered row-major. Starting from the first one, each drawn tile is removed
/// and the next tile is the nearest remaining candidate by Euclidean distance on the grid; ties
/// go to the earliest discovered candidate.
pub struct TileDrawScheduler<'a> {
    layer: &'a PlacedLayer,
    tile_edge: u32,
    batch: usize,
    candidates: Vec<Tile>,
    current: Option<usize>,
    total: usize,
    reveal: Reveal,
}

impl<'a> TileDrawScheduler<'a> {
    /// Build the tile grid over `layer` with square tiles of `tile_edge` pixels.
    ///
    /// Fails when `tile_edge` is 0.
    pub fn new(
        layer: &'a PlacedLayer,
        tile_edge: u32,
        tiles_per_batch: usize,
    ) -> ChalkResult<Self> {
        if tile_edge == 0 {
            return Err(ChalkError::geometry("tile edge must be > 0"));
        }
        let candidates = active_tiles(layer, tile_edge);
        let total = candidates.len();
        Ok(Self {
            layer,
            tile_edge,
            batch: clamp_batch(tiles_per_batch),
            current: if candidates.is_empty() { None } else { Some(0) },
            candidates,
            total,
            reveal: Reveal::default(),
        })
    }

    /// Tiles not yet drawn, in discovery order.
    pub fn remaining(&self) -> &[Tile] {
        &self.candidates
    }

    fn tile_bounds(&self, tile: Tile) -> (u32, u32, u32, u32) {
        let x0 = tile.col * self.tile_edge;
        let y0 = tile.row * self.tile_edge;
        let x1 = (x0 + self.tile_edge).min(self.layer.bitmap.width());
        let y1 = (y0 + self.tile_edge).min(self.layer.bitmap.height());
        (x0, y0, x1, y1)
    }

    fn draw_tile(&self, canvas: &mut Canvas, tile: Tile) -> Point {
        let (x0, y0, x1, y1) = self.tile_bounds(tile);
        for ly in y0..y1 {
            for lx in x0..x1 {
                if self.layer.mask.get(lx, ly) {
                    let px = grayscale(*self.layer.bitmap.get_pixel(lx, ly));
                    put_layer_pixel(canvas, self.layer, lx, ly, px);
                }
            }
        }
        Point::new(
            self.layer.origin.0 as f64 + f64::from(x0) + f64::from(x1 - x0) / 2.0,
            self.layer.origin.1 as f64 + f64::from(y0) + f64::from(y1 - y0) / 2.0,
        )
    }

    fn nearest_to(&self, from: Tile) -> Option<usize> {
        let mut best: Option<(usize, u64)> = None;
        for (i, t) in self.candidates.iter().enumerate() {
            let dr = i64::from(t.row) - i64::from(from.row);
            let dc = i64::from(t.col) - i64::from(from.col);
            let d = (dr * dr + dc * dc) as u64;
            if best.is_none_or(|(_, bd)| d < bd) {
                best = Some((i, d));
            }
        }
        best.map(|(i, _)| i)
    }
}

impl DrawPass for TileDrawScheduler<'_> {
    fn unit_count(&self) -> usize {
        self.total
    }

    fn set_batch_size(&mut self, units: usize) {
        self.batch = clamp_batch(units);
    }

    fn next_batch(&mut self, canvas: &mut Canvas) -> Option<Point> {
        let mut idx = self.current?;
        self.reveal.capture(canvas, self.layer);

        let mut pen = Point::ZERO;
        for _ in 0..self.batch {
            let tile = self.candidates.remove(idx);
            pen = self.draw_tile(canvas, tile);
            match self.nearest_to(tile) {
                Some(next) => idx = next,
                None => {
                    self.current = None;
                    break;
                }
            }
        }
        if self.current.is_some() {
            self.current = Some(idx);
        } else {
            self.reveal.apply(canvas, self.layer);
        }
        Some(pen)
    }
}

fn active_tiles(layer: &PlacedLayer, edge: u32) -> Vec<Tile> {
    let (w, h) = (layer.bitmap.width(), layer.bitmap.height());
    let rows = h.div_ceil(edge);
    let cols = w.div_ceil(edge);
    let mut out = Vec::new();
    for row in 0..rows {
        for col in 0..cols {
            let (x0, y0) = (col * edge, row * edge);
            if layer.mask.any_in(x0, y0, x0 + edge, y0 + edge) {
                out.push(Tile { row, col });
            }
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/draw/tiles.rs"]
mod tests;
