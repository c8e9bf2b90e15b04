use super::*;
use crate::layer::model::Vec2Def;

#[test]
fn text_is_escaped_and_split_into_lines() {
    let def = TextDef {
        text: "a < b\nc & d".to_owned(),
        font: "Serif".to_owned(),
        size: 20.0,
        color: ColorDef::rgb(255, 0, 0),
        style: TextStyle::Bold,
        align: TextAlign::Center,
        line_height: 1.5,
    };
    let doc = text_svg(&def);
    assert!(doc.source.contains("a &lt; b"));
    assert!(doc.source.contains("c &amp; d"));
    assert_eq!(doc.source.matches("<tspan").count(), 2);
    assert!(doc.source.contains(r#"text-anchor="middle""#));
    assert!(doc.source.contains(r##"fill="#ff0000""##));
    assert!(doc.origin.is_none());
}

#[test]
fn rect_page_includes_stroke_margin() {
    let def = ShapeDef {
        shape: ShapeKind::Rect,
        size: Some(Vec2Def { x: 40.0, y: 20.0 }),
        radius: None,
        points: Vec::new(),
        color: ColorDef::BLACK,
        fill_color: None,
        stroke_width: 4.0,
    };
    let doc = shape_svg(&def);
    assert_eq!((doc.width, doc.height), (52, 32));
    assert!(doc.source.contains(r#"fill="none""#));
}

#[test]
fn arrow_page_covers_both_ends() {
    let doc = arrow_svg(
        Point::new(100.0, 100.0),
        Point::new(200.0, 150.0),
        ColorDef::BLACK,
        4.0,
        20.0,
    );
    let origin = doc.origin.unwrap();
    assert!(origin.x < 100.0 && origin.y < 100.0);
    assert!(origin.x + f64::from(doc.width) > 200.0);
    assert!(origin.y + f64::from(doc.height) > 150.0);
    assert_eq!(doc.source.matches("<path").count(), 2);
}

#[test]
fn smooth_stroke_uses_quadratic_segments() {
    let pts = [
        Point::new(0.0, 0.0),
        Point::new(10.0, 10.0),
        Point::new(20.0, 0.0),
    ];
    let smooth = stroke_svg(&pts, ColorDef::BLACK, 2.0, true);
    assert!(smooth.source.contains('Q'));
    let plain = stroke_svg(&pts, ColorDef::BLACK, 2.0, false);
    assert!(!plain.source.contains('Q'));
}
