use super::*;

const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
const RED: Rgb<u8> = Rgb([255, 0, 0]);

#[test]
fn clip_handles_partial_and_empty_overlap() {
    let dims = Dimensions::new(100, 50);
    let r = PixelRect::clip(-10, 40, 30, 30, dims).unwrap();
    assert_eq!(
        r,
        PixelRect {
            x: 0,
            y: 40,
            width: 20,
            height: 10
        }
    );
    assert!(PixelRect::clip(100, 0, 10, 10, dims).is_none());
    assert!(PixelRect::clip(-20, 0, 20, 10, dims).is_none());
}

#[test]
fn region_snapshot_round_trips() {
    let mut canvas = Canvas::new(Dimensions::new(8, 8), WHITE);
    let rect = PixelRect {
        x: 2,
        y: 2,
        width: 3,
        height: 3,
    };
    let saved = canvas.copy_region(rect);
    canvas.put_pixel(3, 3, RED);
    canvas.put_pixel(7, 7, RED);
    canvas.restore_region(&saved);
    assert_eq!(canvas.pixel(3, 3), WHITE);
    assert_eq!(canvas.pixel(7, 7), RED);
    assert_eq!(canvas.count_non_background(), 1);
}

#[test]
fn restore_ignores_mismatched_snapshot() {
    let mut canvas = Canvas::new(Dimensions::new(4, 4), WHITE);
    canvas.put_pixel(0, 0, RED);
    canvas.restore(&RgbImage::new(2, 2));
    assert_eq!(canvas.pixel(0, 0), RED);

    let clean = Canvas::new(Dimensions::new(4, 4), WHITE).snapshot();
    canvas.restore(&clean);
    assert_eq!(canvas.count_non_background(), 0);
}
