use super::*;
use crate::raster::ink::InkMask;
use image::Rgb;

const WHITE: Rgb<u8> = Rgb([255, 255, 255]);

fn block(origin: (i64, i64)) -> PlacedLayer {
    let mut mask = InkMask::empty(4, 4);
    for y in 0..4 {
        for x in 0..4 {
            mask.set(x, y, true);
        }
    }
    PlacedLayer {
        origin,
        bitmap: RgbImage::from_pixel(4, 4, Rgb([0, 0, 0])),
        mask,
        opacity: 1.0,
        z_index: 0,
        intelligent_eraser: false,
    }
}

#[test]
fn slide_starts_off_canvas_and_lands_in_place() {
    let layer = block((10, 10));
    let dims = Dimensions::new(40, 40);
    let (start, _) = pose(&layer, Transition::Slide(Edge::Left), 0.0, dims).unwrap();
    assert_eq!(start.origin, (-4, 10));
    assert!(start.clip_rect(dims).is_none());
    let (end, _) = pose(&layer, Transition::Slide(Edge::Bottom), 1.0, dims).unwrap();
    assert_eq!(end.origin, (10, 10));
}

#[test]
fn fade_and_zoom_hide_at_zero() {
    let layer = block((0, 0));
    let dims = Dimensions::new(10, 10);
    assert!(pose(&layer, Transition::Fade, 0.0, dims).is_none());
    assert!(pose(&layer, Transition::Zoom, 0.0, dims).is_none());
    let (_, half) = pose(&layer, Transition::Fade, 0.5, dims).unwrap();
    assert!((half - 0.5).abs() < 1e-12);
    let (small, _) = pose(&layer, Transition::Zoom, 0.5, dims).unwrap();
    assert_eq!(small.size(), Dimensions::new(2, 2));
    assert_eq!(small.center(), layer.center());
}

#[test]
fn point_along_uses_arc_length() {
    let pts = [
        Point::new(0.0, 0.0),
        Point::new(10.0, 0.0),
        Point::new(10.0, 30.0),
    ];
    assert_eq!(point_along(&pts, 0.0), Some(Point::new(0.0, 0.0)));
    assert_eq!(point_along(&pts, 0.25), Some(Point::new(10.0, 0.0)));
    assert_eq!(point_along(&pts, 1.0), Some(Point::new(10.0, 30.0)));
    assert_eq!(point_along(&[], 0.5), None);
}

#[test]
fn exit_restores_base_and_entrance_ends_fully_painted() {
    let dims = Dimensions::new(20, 20);
    let layer = block((5, 5));
    let base = Canvas::new(dims, WHITE).snapshot();
    let mut canvas = Canvas::new(dims, WHITE);

    let mut enter = MotionPass::new(
        &base,
        &layer,
        Motion::Enter(Transition::Fade),
        4,
        Ease::Linear,
    );
    let mut n = 0;
    while enter.step(&mut canvas) {
        n += 1;
    }
    assert_eq!(n, 4);
    assert_eq!(canvas.count_non_background(), 16);

    let zoom_out = Motion::Exit(Transition::Zoom);
    let mut exit = MotionPass::new(&base, &layer, zoom_out, 3, Ease::Linear);
    while exit.step(&mut canvas) {}
    assert_eq!(canvas.count_non_background(), 0);
}

#[test]
fn path_moves_anchor_to_last_point() {
    let dims = Dimensions::new(50, 50);
    let layer = block((0, 0));
    let base = Canvas::new(dims, WHITE).snapshot();
    let mut canvas = Canvas::new(dims, WHITE);
    let motion = Motion::Path {
        points: vec![Point::new(2.0, 2.0), Point::new(30.0, 2.0)],
        anchor: Anchor::Center,
    };
    let settled = motion.settle(&layer);
    let mut pass = MotionPass::new(&base, &layer, motion, 5, Ease::InOutCubic);
    while pass.step(&mut canvas) {}
    assert_eq!(settled.origin, (28, 0));
    assert_eq!(canvas.pixel(29, 1), Rgb([0, 0, 0]));
    assert_eq!(canvas.pixel(1, 1), WHITE);
}
