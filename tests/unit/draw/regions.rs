use super::*;
use crate::foundation::core::Dimensions;
use crate::raster::ink::InkMask;
use image::{Rgb, RgbImage};

const WHITE: Rgb<u8> = Rgb([255, 255, 255]);

fn layer_with(points: &[(u32, u32)], w: u32, h: u32, color: Rgb<u8>) -> PlacedLayer {
    let mut bitmap = RgbImage::from_pixel(w, h, WHITE);
    let mut mask = InkMask::empty(w, h);
    for &(x, y) in points {
        bitmap.put_pixel(x, y, color);
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
fn flood_fill_finds_diagonally_connected_regions() {
    let layer = layer_with(
        &[(0, 0), (1, 1), (2, 2), (5, 0), (5, 1)],
        6,
        3,
        Rgb([0, 0, 200]),
    );
    let mut sched = RegionFillScheduler::new(&layer, RegionOrder::FloodFill, 1);
    assert_eq!(sched.unit_count(), 2);

    let mut canvas = Canvas::new(Dimensions::new(6, 3), WHITE);
    let first = sched.next_batch(&mut canvas).unwrap();
    assert_eq!(first, Point::new(1.5, 1.5));
    assert_eq!(canvas.pixel(2, 2), Rgb([0, 0, 200]));
    assert_eq!(canvas.pixel(5, 0), WHITE);

    let second = sched.next_batch(&mut canvas).unwrap();
    assert_eq!(second, Point::new(5.5, 1.0));
    assert!(sched.next_batch(&mut canvas).is_none());
}

#[test]
fn coloriage_zig_zags_across_diagonals() {
    let all: Vec<(u32, u32)> = (0..3).flat_map(|y| (0..3).map(move |x| (x, y))).collect();
    let layer = layer_with(&all, 3, 3, Rgb([10, 120, 10]));
    let mut sched = RegionFillScheduler::new(&layer, RegionOrder::Coloriage, 1);
    assert_eq!(sched.unit_count(), 5);

    let mut canvas = Canvas::new(Dimensions::new(3, 3), WHITE);
    let pens: Vec<Point> = std::iter::from_fn(|| sched.next_batch(&mut canvas)).collect();
    // Band 1 walks up (ends at y=0), band 2 walks down (ends at y=2).
    assert_eq!(pens[1], Point::new(1.5, 0.5));
    assert_eq!(pens[2], Point::new(0.5, 2.5));
    assert_eq!(canvas.count_non_background(), 9);
    assert_eq!(canvas.pixel(1, 1), Rgb([10, 120, 10]));
}

#[test]
fn coloriage_alternates_over_inked_bands_only() {
    // Band 1 is empty, so band 2 is the second inked band and walks up.
    let layer = layer_with(&[(0, 0), (2, 0), (1, 1), (0, 2)], 3, 3, Rgb([200, 0, 0]));
    let mut sched = RegionFillScheduler::new(&layer, RegionOrder::Coloriage, 1);
    assert_eq!(sched.unit_count(), 2);

    let mut canvas = Canvas::new(Dimensions::new(3, 3), WHITE);
    assert_eq!(sched.next_batch(&mut canvas), Some(Point::new(0.5, 0.5)));
    assert_eq!(sched.next_batch(&mut canvas), Some(Point::new(2.5, 0.5)));
    assert!(sched.next_batch(&mut canvas).is_none());
}
