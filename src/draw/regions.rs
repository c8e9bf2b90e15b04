use crate::compose::compositor::{PlacedLayer, put_layer_pixel};
use crate::draw::{DrawPass, Reveal, clamp_batch};
use crate::foundation::core::Point;
use crate::raster::canvas::Canvas;

/// How ink pixels are grouped into color units.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RegionOrder {
    /// Diagonal bands `x + y`, zig-zagging over the bands that hold ink: the first walks
    /// down, the next walks up, and so on.
    Coloriage,
    /// 8-connected components, discovered row-major.
    FloodFill,
}

#[derive(Clone, Debug)]
struct Region {
    pixels: Vec<(u32, u32)>,
    pen: Point,
}

/// Color-filling pass: each unit paints a group of ink pixels in their source color.
pub struct RegionFillScheduler<'a> {
    layer: &'a PlacedLayer,
    regions: Vec<Region>,
    next: usize,
    batch: usize,
    reveal: Reveal,
}

impl<'a> RegionFillScheduler<'a> {
    /// Group the ink of `layer` into units of `order`.
    pub fn new(layer: &'a PlacedLayer, order: RegionOrder, regions_per_batch: usize) -> Self {
        let regions = match order {
            RegionOrder::Coloriage => diagonal_bands(layer),
            RegionOrder::FloodFill => connected_regions(layer),
        };
        Self {
            layer,
            regions,
            next: 0,
            batch: clamp_batch(regions_per_batch),
            reveal: Reveal::default(),
        }
    }
}

impl DrawPass for RegionFillScheduler<'_> {
    fn unit_count(&self) -> usize {
        self.regions.len()
    }

    fn set_batch_size(&mut self, units: usize) {
        self.batch = clamp_batch(units);
    }

    fn next_batch(&mut self, canvas: &mut Canvas) -> Option<Point> {
        if self.next >= self.regions.len() {
            return None;
        }
        self.reveal.capture(canvas, self.layer);

        let end = (self.next + self.batch).min(self.regions.len());
        let mut pen = Point::ZERO;
        for region in &self.regions[self.next..end] {
            for &(lx, ly) in &region.pixels {
                let px = *self.layer.bitmap.get_pixel(lx, ly);
                put_layer_pixel(canvas, self.layer, lx, ly, px);
            }
            pen = region.pen;
        }
        self.next = end;
        if self.next >= self.regions.len() {
            self.reveal.apply(canvas, self.layer);
        }
        Some(pen)
    }
}

fn to_canvas_point(layer: &PlacedLayer, x: f64, y: f64) -> Point {
    Point::new(layer.origin.0 as f64 + x, layer.origin.1 as f64 + y)
}

fn diagonal_bands(layer: &PlacedLayer) -> Vec<Region> {
    let (w, h) = (layer.mask.width(), layer.mask.height());
    if w == 0 || h == 0 {
        return Vec::new();
    }
    let mut out = Vec::new();
    for d in 0..(w + h - 1) {
        let y_lo = d.saturating_sub(w - 1);
        let y_hi = d.min(h - 1);
        let ys: Box<dyn Iterator<Item = u32>> = if out.len() % 2 == 0 {
            Box::new(y_lo..=y_hi)
        } else {
            Box::new((y_lo..=y_hi).rev())
        };
        let pixels: Vec<(u32, u32)> = ys
            .map(|y| (d - y, y))
            .filter(|&(x, y)| layer.mask.get(x, y))
            .collect();
        if let Some(&(x, y)) = pixels.last() {
            out.push(Region {
                pen: to_canvas_point(layer, f64::from(x) + 0.5, f64::from(y) + 0.5),
                pixels,
            });
        }
    }
    out
}

fn connected_regions(layer: &PlacedLayer) -> Vec<Region> {
    let (w, h) = (layer.mask.width(), layer.mask.height());
    let mut seen = vec![false; (w as usize) * (h as usize)];
    let idx = |x: u32, y: u32| (y as usize) * (w as usize) + (x as usize);
    let mut out = Vec::new();

    for sy in 0..h {
        for sx in 0..w {
            if seen[idx(sx, sy)] || !layer.mask.get(sx, sy) {
                continue;
            }
            seen[idx(sx, sy)] = true;
            let mut stack = vec![(sx, sy)];
            let mut pixels = Vec::new();
            while let Some((x, y)) = stack.pop() {
                pixels.push((x, y));
                for dy in -1i64..=1 {
                    for dx in -1i64..=1 {
                        let nx = i64::from(x) + dx;
                        let ny = i64::from(y) + dy;
                        if nx < 0 || ny < 0 || nx >= i64::from(w) || ny >= i64::from(h) {
                            continue;
                        }
                        let (nx, ny) = (nx as u32, ny as u32);
                        if !seen[idx(nx, ny)] && layer.mask.get(nx, ny) {
                            seen[idx(nx, ny)] = true;
                            stack.push((nx, ny));
                        }
                    }
                }
            }
            let n = pixels.len() as f64;
            let (sum_x, sum_y) = pixels.iter().fold((0.0, 0.0), |(ax, ay), &(x, y)| {
                (ax + f64::from(x) + 0.5, ay + f64::from(y) + 0.5)
            });
            out.push(Region {
                pen: to_canvas_point(layer, sum_x / n, sum_y / n),
                pixels,
            });
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/draw/regions.rs"]
mod tests;
