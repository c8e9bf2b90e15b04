use super::*;
use crate::foundation::core::Dimensions;
use crate::raster::ink::InkMask;
use image::{Rgb, RgbImage};

const WHITE: Rgb<u8> = Rgb([255, 255, 255]);

fn layer_with(points: &[(u32, u32)], w: u32, h: u32) -> PlacedLayer {
    let mut bitmap = RgbImage::from_pixel(w, h, WHITE);
    let mut mask = InkMask::empty(w, h);
    for &(x, y) in points {
        bitmap.put_pixel(x, y, Rgb([0, 0, 0]));
        mask.set(x, y, true);
    }
    PlacedLayer {
        origin: (0, 0),
        bitmap,
        mask,
        opacity: 1.0,
        z_index: 0,
        intelligent_eraser: false,
    }
}

#[test]
fn bands_split_on_large_gaps_only() {
    let layer = layer_with(&[(0, 0), (0, 2), (0, 10)], 4, 12);
    assert_eq!(line_bands(&layer, 4), vec![(0, 3), (10, 11)]);
    assert_eq!(line_bands(&layer, 8), vec![(0, 11)]);
}

#[test]
fn units_go_band_then_column() {
    // Second line has ink further left than the first, yet comes after it.
    let layer = layer_with(&[(3, 0), (1, 0), (1, 1), (0, 20)], 5, 25);
    let sched = ColumnDrawScheduler::new(&layer, DEFAULT_LINE_GAP, 1);
    let order: Vec<(usize, u32)> = sched
        .units()
        .iter()
        .map(|u| (u.band, u.segments[0].x))
        .collect();
    assert_eq!(order, vec![(0, 1), (0, 3), (1, 0)]);
    assert_eq!(
        sched.units()[0].segments,
        vec![Segment { x: 1, y0: 0, y1: 2 }]
    );
}

#[test]
fn draws_every_ink_pixel_and_tracks_pen() {
    let layer = layer_with(&[(2, 2), (2, 3), (4, 2)], 6, 6);
    let mut canvas = Canvas::new(Dimensions::new(6, 6), WHITE);
    let mut sched = ColumnDrawScheduler::new(&layer, DEFAULT_LINE_GAP, 1);
    assert_eq!(sched.unit_count(), 2);
    let pens: Vec<Point> = std::iter::from_fn(|| sched.next_batch(&mut canvas)).collect();
    assert_eq!(pens, vec![Point::new(2.5, 3.0), Point::new(4.5, 2.5)]);
    assert_eq!(canvas.count_non_background(), 3);
}

#[test]
fn empty_text_has_no_units() {
    let layer = layer_with(&[], 4, 4);
    let mut canvas = Canvas::new(Dimensions::new(4, 4), WHITE);
    let mut sched = ColumnDrawScheduler::new(&layer, DEFAULT_LINE_GAP, 1);
    assert!(sched.next_batch(&mut canvas).is_none());
}
