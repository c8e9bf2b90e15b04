use super::*;
use crate::foundation::core::Dimensions;
use crate::raster::ink::{InkMask, InkThreshold};
use image::{Rgb, RgbImage};

const WHITE: Rgb<u8> = Rgb([255, 255, 255]);

fn layer_from(bitmap: RgbImage) -> PlacedLayer {
    let mask = InkMask::from_luma(
        &bitmap,
        &InkThreshold {
            threshold: 128,
            adaptive: None,
        },
    );
    PlacedLayer {
        origin: (0, 0),
        bitmap,
        mask,
        opacity: 1.0,
        z_index: 0,
        intelligent_eraser: false,
    }
}

fn square_at(x0: u32, y0: u32) -> RgbImage {
    let mut img = RgbImage::from_pixel(100, 100, WHITE);
    for y in y0..y0 + 10 {
        for x in x0..x0 + 10 {
            img.put_pixel(x, y, Rgb([0, 0, 0]));
        }
    }
    img
}

fn run(layer: &PlacedLayer, edge: u32, batch: usize) -> (Canvas, Vec<Point>) {
    let mut canvas = Canvas::new(Dimensions::new(100, 100), WHITE);
    let mut sched = TileDrawScheduler::new(layer, edge, batch).unwrap();
    let mut pens = Vec::new();
    while let Some(p) = sched.next_batch(&mut canvas) {
        pens.push(p);
    }
    (canvas, pens)
}

#[test]
fn single_square_yields_one_batch_at_tile_center() {
    let layer = layer_from(square_at(40, 40));
    let sched = TileDrawScheduler::new(&layer, 20, 1).unwrap();
    assert_eq!(sched.remaining(), &[Tile { row: 2, col: 2 }]);

    let (canvas, pens) = run(&layer, 20, 1);
    assert_eq!(pens, vec![Point::new(50.0, 50.0)]);
    for y in 40..50 {
        for x in 40..50 {
            assert_eq!(canvas.pixel(x, y), Rgb([0, 0, 0]));
        }
    }
    assert_eq!(canvas.count_non_background(), 100);
}

#[test]
fn order_is_deterministic_and_greedy() {
    let mut img = RgbImage::from_pixel(100, 100, WHITE);
    for (x, y) in [(5, 5), (85, 5), (25, 5), (5, 85)] {
        img.put_pixel(x, y, Rgb([0, 0, 0]));
    }
    let layer = layer_from(img);
    let (_, first) = run(&layer, 20, 1);
    let (_, second) = run(&layer, 20, 1);
    assert_eq!(first, second);
    assert_eq!(
        first,
        vec![
            Point::new(10.0, 10.0),
            Point::new(30.0, 10.0),
            Point::new(90.0, 10.0),
            Point::new(10.0, 90.0),
        ]
    );
}

#[test]
fn ties_go_to_first_discovered() {
    let mut img = RgbImage::from_pixel(60, 60, WHITE);
    // From (0,1), tiles (1,0) and (1,2) are equally near; (1,0) was discovered first.
    for (x, y) in [(30, 5), (5, 30), (50, 30)] {
        img.put_pixel(x, y, Rgb([0, 0, 0]));
    }
    let layer = layer_from(img);
    let mut canvas = Canvas::new(Dimensions::new(60, 60), WHITE);
    let mut sched = TileDrawScheduler::new(&layer, 20, 1).unwrap();
    let pens: Vec<Point> = std::iter::from_fn(|| sched.next_batch(&mut canvas)).collect();
    assert_eq!(pens[1], Point::new(10.0, 30.0));
}

#[test]
fn completeness_holds_with_batches_and_color_reveal() {
    let mut img = RgbImage::from_pixel(100, 100, WHITE);
    for y in 10..90 {
        for x in (10..90).step_by(7) {
            img.put_pixel(x, y, Rgb([200, 20, 20]));
        }
    }
    let layer = layer_from(img);
    let (canvas, pens) = run(&layer, 16, 3);
    assert!(pens.len() > 1);
    for y in 0..100 {
        for x in 0..100 {
            if layer.mask.get(x, y) {
                assert_eq!(canvas.pixel(x, y), *layer.bitmap.get_pixel(x, y));
            }
        }
    }
}

#[test]
fn empty_mask_yields_nothing_and_zero_edge_is_rejected() {
    let layer = layer_from(RgbImage::from_pixel(30, 30, WHITE));
    let (canvas, pens) = run(&layer, 10, 1);
    assert!(pens.is_empty());
    assert_eq!(canvas.count_non_background(), 0);

    let err = TileDrawScheduler::new(&layer, 0, 1).err().unwrap();
    assert!(matches!(err, ChalkError::InvalidGeometry(_)));
}

#[test]
fn batch_size_groups_tiles() {
    let mut img = RgbImage::from_pixel(100, 100, WHITE);
    for x in (0..100).step_by(20) {
        img.put_pixel(x, 0, Rgb([0, 0, 0]));
    }
    let layer = layer_from(img);
    let mut sched = TileDrawScheduler::new(&layer, 20, 1).unwrap();
    assert_eq!(sched.unit_count(), 5);
    sched.set_batch_size(2);
    let mut canvas = Canvas::new(Dimensions::new(100, 100), WHITE);
    let n = std::iter::from_fn(|| sched.next_batch(&mut canvas)).count();
    assert_eq!(n, 3);
}

#[test]
fn tiles_sketch_ink_in_gray_until_the_reveal() {
    let paper = Rgb([230, 240, 255]);
    let red = Rgb([200, 20, 20]);
    let mut img = RgbImage::from_pixel(100, 100, WHITE);
    img.put_pixel(5, 5, red);
    img.put_pixel(85, 85, red);
    let layer = layer_from(img);

    let mut canvas = Canvas::new(Dimensions::new(100, 100), paper);
    let mut sched = TileDrawScheduler::new(&layer, 20, 1).unwrap();
    assert_eq!(sched.next_batch(&mut canvas), Some(Point::new(10.0, 10.0)));

    let Rgb([r, g, b]) = canvas.pixel(5, 5);
    assert!(r == g && g == b, "ink should be sketched in gray, got {r},{g},{b}");
    assert_ne!(canvas.pixel(5, 5), red);
    assert_eq!(canvas.pixel(6, 5), paper);
    assert_eq!(canvas.pixel(85, 85), paper);

    assert!(sched.next_batch(&mut canvas).is_some());
    assert!(sched.next_batch(&mut canvas).is_none());
    assert_eq!(canvas.pixel(5, 5), red);
}
