use super::*;
use serde_json::json;

#[test]
fn defaults_fill_in_missing_project_fields() {
    let def: ProjectDef = serde_json::from_value(json!({
        "output": {"width": 640, "height": 360},
        "fps": 24,
        "scenes": [{"duration": 2.0}]
    }))
    .unwrap();
    assert_eq!(def.background, ColorDef::WHITE);
    assert_eq!(def.tile_edge, 20);
    assert_eq!(def.skip_rate, 8);
    assert_eq!(def.ink, InkThreshold::default());
    let scene = &def.scenes[0];
    let output = def.output.dimensions();
    assert_eq!(scene.canvas(output), Dimensions::new(640, 360));
    assert!(scene.camera_keys().is_empty());
}

#[test]
fn legacy_spellings_are_accepted() {
    let def: ProjectDef = serde_json::from_value(json!({
        "output": {"width": 640, "height": 360},
        "fps": {"num": 30, "den": 1},
        "slides": [{
            "duration": 3,
            "canvas_width": 1920,
            "canvas_height": 1080,
            "sceneCameras": [
                {"position": {"x": 0.2, "y": 0.2}, "zoom": 1.2, "duration": 2,
                 "transition_duration": 1, "easing": "ease_out"}
            ]
        }]
    }))
    .unwrap();
    let scene = &def.scenes[0];
    let output = def.output.dimensions();
    assert_eq!(scene.canvas(output), Dimensions::new(1920, 1080));
    let keys = scene.camera_keys();
    assert_eq!(keys.len(), 1);
    let key = keys[0].to_keyframe();
    assert_eq!(key.hold, 2.0);
    assert_eq!(key.transition, 1.0);
    assert_eq!(key.ease, Ease::OutQuad);
    assert_eq!(key.camera.zoom, 1.2);
    assert_eq!(key.camera.position, Vec2::new(0.2, 0.2));
}

#[test]
fn explicit_cameras_win_over_legacy_list() {
    let scene: SceneDef = serde_json::from_value(json!({
        "duration": 1,
        "cameras": [{"zoom": 2.0}],
        "sceneCameras": [{"zoom": 3.0}, {"zoom": 4.0}]
    }))
    .unwrap();
    let keys = scene.camera_keys();
    assert_eq!(keys.len(), 1);
    assert_eq!(keys[0].camera.zoom, 2.0);
    assert_eq!(keys[0].camera.position, Vec2Def { x: 0.5, y: 0.5 });
}
