use super::*;
use image::Rgb;

const WHITE: Rgb<u8> = Rgb([255, 255, 255]);

fn cam(zoom: f64, x: f64, y: f64) -> Camera {
    Camera {
        zoom,
        position: Vec2::new(x, y),
        ..Camera::default()
    }
}

#[test]
fn zoom_one_is_identity_when_canvas_matches_output() {
    let mut canvas = Canvas::new(Dimensions::new(8, 6), WHITE);
    canvas.put_pixel(3, 2, Rgb([10, 20, 30]));
    let frame = project(&canvas, &Camera::default(), Dimensions::new(8, 6)).unwrap();
    assert_eq!(frame.pixel(3, 2), [10, 20, 30]);
    assert_eq!(frame.pixel(0, 0), [255, 255, 255]);
}

#[test]
fn centered_zoom_is_contained() {
    let canvas = Dimensions::new(1920, 1080);
    let output = Dimensions::new(1280, 720);
    for zoom in [1.0, 1.5, 2.0, 7.3] {
        let vp = viewport(canvas, &cam(zoom, 0.5, 0.5), output).unwrap();
        assert!(vp.is_contained_in(canvas), "zoom {zoom}: {vp:?}");
        assert!((vp.width - 1280.0 / zoom).abs() < 1e-9);
        assert!((vp.height - 720.0 / zoom).abs() < 1e-9);
    }
}

#[test]
fn viewport_is_shifted_not_shrunk_at_edges() {
    let canvas = Dimensions::new(100, 100);
    let vp = viewport(canvas, &cam(2.0, 0.0, 1.0), canvas).unwrap();
    assert_eq!(
        vp,
        Viewport {
            x: 0.0,
            y: 50.0,
            width: 50.0,
            height: 50.0
        }
    );
}

#[test]
fn oversized_viewport_is_centered_with_background_outside() {
    let mut canvas = Canvas::new(Dimensions::new(4, 4), Rgb([0, 0, 0]));
    for y in 0..4 {
        for x in 0..4 {
            canvas.put_pixel(x, y, WHITE);
        }
    }
    let camera = Camera {
        width: Some(8.0),
        height: Some(8.0),
        ..cam(1.0, 0.2, 0.9)
    };
    let vp = viewport(canvas.dimensions(), &camera, Dimensions::new(8, 8)).unwrap();
    assert_eq!((vp.x, vp.y), (-2.0, -2.0));

    let frame = project_viewport(&canvas, &vp, Dimensions::new(8, 8));
    assert_eq!(frame.pixel(0, 0), [0, 0, 0]);
    assert_eq!(frame.pixel(4, 4), [255, 255, 255]);
}

#[test]
fn invalid_zoom_and_empty_output_are_geometry_errors() {
    let canvas = Dimensions::new(10, 10);
    for zoom in [0.0, -1.0, f64::NAN, f64::INFINITY] {
        let err = viewport(canvas, &cam(zoom, 0.5, 0.5), canvas).unwrap_err();
        assert!(matches!(err, ChalkError::InvalidGeometry(_)));
    }
    let err = viewport(canvas, &Camera::default(), Dimensions::new(0, 5)).unwrap_err();
    assert!(matches!(err, ChalkError::InvalidGeometry(_)));
}

#[test]
fn zoomed_projection_magnifies() {
    let mut canvas = Canvas::new(Dimensions::new(10, 10), WHITE);
    canvas.put_pixel(5, 5, Rgb([0, 0, 0]));
    let frame = project(&canvas, &cam(5.0, 0.55, 0.55), Dimensions::new(10, 10)).unwrap();
    let dark = frame.data.chunks(3).filter(|px| px[0] < 128).count();
    assert!(dark >= 4, "expected the dot to cover several output pixels, got {dark}");
}

#[test]
fn to_output_maps_viewport_corners() {
    let vp = Viewport {
        x: 10.0,
        y: 20.0,
        width: 50.0,
        height: 25.0,
    };
    let out = Dimensions::new(100, 50);
    let top_left = vp.to_output(Point::new(10.0, 20.0), out);
    let bottom_right = vp.to_output(Point::new(60.0, 45.0), out);
    assert_eq!(top_left, Point::new(0.0, 0.0));
    assert_eq!(bottom_right, Point::new(100.0, 50.0));
}

#[test]
fn overview_shows_the_whole_canvas() {
    let canvas = Dimensions::new(200, 100);
    let output = Dimensions::new(100, 100);
    let vp = viewport(canvas, &Camera::overview(canvas, output), output).unwrap();
    assert_eq!(
        vp,
        Viewport {
            x: 0.0,
            y: -50.0,
            width: 200.0,
            height: 200.0
        }
    );

    let same = Dimensions::new(160, 90);
    let camera = Camera::overview(same, Dimensions::new(320, 180));
    let vp = viewport(same, &camera, same).unwrap();
    assert!(vp.is_contained_in(same));
    assert!((vp.width - 160.0).abs() < 1e-9);
}
