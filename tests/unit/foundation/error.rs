use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        ChalkError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(
        ChalkError::geometry("x")
            .to_string()
            .contains("invalid geometry:")
    );
    assert!(
        ChalkError::rasterize("x")
            .to_string()
            .contains("rasterize error:")
    );
    assert!(ChalkError::encode("x").to_string().contains("encode error:"));
}

#[test]
fn scene_attribution_names_index_and_component() {
    let err = ChalkError::geometry("zoom must be > 0").in_scene(3, Component::Camera);
    let msg = err.to_string();
    assert!(msg.contains("scene 3"));
    assert!(msg.contains("camera"));
    assert!(msg.contains("zoom must be > 0"));
    assert_eq!(err.scene_index(), Some(3));
}

#[test]
fn scene_attribution_is_not_nested() {
    let err = ChalkError::validation("bad")
        .in_scene(1, Component::Rasterizer)
        .in_scene(7, Component::Orchestrator);
    assert_eq!(err.scene_index(), Some(1));
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = ChalkError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
