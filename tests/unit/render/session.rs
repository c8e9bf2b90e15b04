use super::*;
use crate::encode::sink::InMemorySink;
use serde_json::json;

fn project(scenes: serde_json::Value) -> Project {
    let doc = json!({
        "output": {"width": 64, "height": 48},
        "fps": 10,
        "tile_edge": 8,
        "scenes": scenes
    });
    Project::from_reader(doc.to_string().as_bytes()).unwrap()
}

fn box_scene(duration: f64) -> serde_json::Value {
    json!({
        "duration": duration,
        "layers": [
            {"type": "shape", "shape": "rect", "size": [20, 10], "position": [10, 10]},
            {"type": "stroke", "points": [[5, 40], [30, 30], [60, 44]], "stroke_width": 3}
        ]
    })
}

fn session(project: &Project, parallel: bool) -> RenderSession<'_> {
    RenderSession::new(
        project,
        ".",
        RenderSessionOpts {
            parallel,
            threads: parallel.then_some(2),
            spool_dir: None,
        },
    )
    .unwrap()
}

#[test]
fn scenes_are_concatenated_in_order() {
    let project = project(json!([box_scene(1.0), box_scene(0.5)]));
    let mut sink = InMemorySink::new();
    let report = session(&project, false).render(&mut sink).unwrap();
    assert!(report.is_complete());
    assert_eq!(report.scenes.len(), 2);
    assert_eq!(report.scenes[0].frames_written, 10);
    assert_eq!(report.scenes[1].frames_written, 5);
    assert_eq!(report.frames_written, 15);
    assert!(sink.is_ended());
    let cfg = sink.config().unwrap();
    assert_eq!((cfg.width, cfg.height), (64, 48));
    for (i, (idx, frame)) in sink.frames().iter().enumerate() {
        assert_eq!(idx.0, i as u64);
        assert_eq!((frame.width, frame.height), (64, 48));
    }
}

#[test]
fn parallel_render_matches_sequential() {
    let project = project(json!([box_scene(0.5), box_scene(0.7), box_scene(0.3)]));
    let mut a = InMemorySink::new();
    let mut b = InMemorySink::new();
    session(&project, false).render(&mut a).unwrap();
    session(&project, true).render(&mut b).unwrap();
    assert_eq!(a.frames(), b.frames());
}

#[test]
fn failed_scene_is_reported_and_its_siblings_survive() {
    let mut broken = box_scene(1.0);
    broken["camera"] = json!({"zoom": 0.0});
    let mut missing = box_scene(1.0);
    missing["layers"] = json!([{"type": "image", "image_path": "does/not/exist.png"}]);
    let project = project(json!([box_scene(0.5), broken, missing, box_scene(0.5)]));

    let mut sink = InMemorySink::new();
    let report = session(&project, false).render(&mut sink).unwrap();
    assert!(!report.is_complete());
    assert_eq!(report.frames_written, 10);
    assert_eq!(sink.frames().len(), 10);
    assert_eq!(
        report.scenes.iter().map(|s| s.index).collect::<Vec<_>>(),
        [0, 3]
    );

    let failed: Vec<(usize, Option<usize>)> = report
        .failures
        .iter()
        .map(|f| (f.index, f.error.scene_index()))
        .collect();
    assert_eq!(failed, [(1, Some(1)), (2, Some(2))]);
    assert!(matches!(
        report.failures[0].error,
        ChalkError::Scene {
            component: Component::Camera,
            ..
        }
    ));
    assert!(matches!(
        report.failures[1].error,
        ChalkError::Scene {
            component: Component::Rasterizer,
            ..
        }
    ));
}

#[test]
fn sub_range_renders_only_the_requested_scenes() {
    let project = project(json!([box_scene(0.2), box_scene(0.4), box_scene(0.6)]));
    let session = session(&project, false);
    let mut sink = InMemorySink::new();
    let report = session.render_scenes(1..2, &mut sink).unwrap();
    assert_eq!(report.scenes.len(), 1);
    assert_eq!(report.scenes[0].index, 1);
    assert_eq!(sink.frames().len(), 4);
    assert!(session.render_scenes(2..4, &mut sink).is_err());
}

#[test]
fn still_shows_the_finished_scene() {
    let project = project(json!([box_scene(1.0)]));
    let session = session(&project, false);
    let still = session.still(0).unwrap();
    assert_eq!((still.width, still.height), (64, 48));
    assert!(still.data.iter().any(|&b| b < 128));

    let mut sink = InMemorySink::new();
    session.render(&mut sink).unwrap();
    assert_eq!(&sink.frames().last().unwrap().1, &still);
    assert!(session.still(5).is_err());
}

#[test]
fn zero_threads_is_rejected() {
    let project = project(json!([box_scene(1.0)]));
    let opts = RenderSessionOpts {
        parallel: true,
        threads: Some(0),
        spool_dir: None,
    };
    assert!(RenderSession::new(&project, ".", opts).is_err());
}
