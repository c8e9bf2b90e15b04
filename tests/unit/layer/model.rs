use super::*;
use serde_json::json;

#[test]
fn parses_text_layer_with_common_fields() {
    let layer: LayerDef = serde_json::from_value(json!({
        "id": "title",
        "type": "text",
        "text": "Hello",
        "size": 64,
        "color": "#202020",
        "position": [960, 200],
        "anchor": "center",
        "z_index": 2,
        "mode": "draw",
        "draw_duration": 1.5
    }))
    .unwrap();
    layer.validate().unwrap();
    assert!(layer.is_text());
    assert_eq!(layer.anchor, Anchor::Center);
    assert_eq!(layer.z_index, 2);
    assert_eq!(layer.position, Some(Vec2Def { x: 960.0, y: 200.0 }));
    let LayerKind::Text(t) = &layer.kind else {
        panic!("expected text");
    };
    assert_eq!(t.color, ColorDef::rgb(0x20, 0x20, 0x20));
    assert_eq!(t.font, "sans-serif");
    assert_eq!(layer.label(0), "layer 'title'");
}

#[test]
fn parses_shapes_arrows_and_motion() {
    let layer: LayerDef = serde_json::from_value(json!({
        "type": "shape",
        "shape": "rect",
        "size": {"x": 40, "y": 20},
        "fill_color": [255, 0, 0],
        "anchor_point": "top_left",
        "mode": "flood_fill",
        "entrance": {"type": "slide_in", "from": "top", "duration": 0.5, "easing": "ease_out"},
        "exit": {"type": "fade_out"}
    }))
    .unwrap();
    layer.validate().unwrap();
    assert_eq!(layer.mode, DrawMode::FloodFill);
    let entrance = layer.entrance.unwrap();
    assert_eq!(entrance.transition(), Transition::Slide(Edge::Top));
    assert_eq!(entrance.easing, Ease::OutQuad);
    assert_eq!(layer.exit.unwrap().duration, 1.0);

    let arrow: LayerDef = serde_json::from_value(json!({
        "type": "arrow", "start": [0, 0], "end": [100, 50]
    }))
    .unwrap();
    arrow.validate().unwrap();
    assert_eq!(arrow.label(4), "layer #4");
}

#[test]
fn validation_rejects_bad_values() {
    let base = json!({"type": "image", "image_path": "a.png"});
    let mut bad_opacity = base.clone();
    bad_opacity["opacity"] = json!(1.5);
    let layer: LayerDef = serde_json::from_value(bad_opacity).unwrap();
    assert!(layer.validate().is_err());

    let mut bad_skip = base.clone();
    bad_skip["skip_rate"] = json!(0);
    let layer: LayerDef = serde_json::from_value(bad_skip).unwrap();
    assert!(layer.validate().is_err());

    let stroke: LayerDef =
        serde_json::from_value(json!({"type": "stroke", "points": [[0, 0]]})).unwrap();
    assert!(stroke.validate().is_err());

    let mut empty_path = base.clone();
    empty_path["path"] = json!({"points": []});
    let layer: LayerDef = serde_json::from_value(empty_path).unwrap();
    assert!(layer.validate().is_err());
}

#[test]
fn unknown_layer_type_is_rejected() {
    let err = serde_json::from_value::<LayerDef>(json!({"type": "video", "image_path": "x.mp4"}));
    assert!(err.is_err());
}
