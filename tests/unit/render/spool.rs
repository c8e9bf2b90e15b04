use super::*;
use crate::encode::sink::InMemorySink;

#[test]
fn replay_renumbers_frames_and_removes_the_file() {
    let dir = std::env::temp_dir();
    let dims = Dimensions::new(2, 1);
    let mut spool = SpoolSink::create(&dir, 7, dims).unwrap();
    let path = spool.path().unwrap().to_path_buf();
    for v in [10u8, 20, 30] {
        spool
            .push_frame(FrameIndex(0), &FrameRGB::filled(2, 1, [v, v, v]))
            .unwrap();
    }
    assert!(path.exists());

    let mut sink = InMemorySink::new();
    let n = spool.replay(&mut sink, FrameIndex(5)).unwrap();
    assert_eq!(n, 3);
    let got: Vec<(u64, u8)> = sink
        .frames()
        .iter()
        .map(|(i, f)| (i.0, f.data[0]))
        .collect();
    assert_eq!(got, [(5, 10), (6, 20), (7, 30)]);
    assert!(!path.exists());
}

#[test]
fn wrong_frame_size_is_rejected() {
    let mut spool = SpoolSink::create(&std::env::temp_dir(), 0, Dimensions::new(4, 4)).unwrap();
    let err = spool
        .push_frame(FrameIndex(0), &FrameRGB::filled(2, 2, [0, 0, 0]))
        .unwrap_err();
    assert!(matches!(err, ChalkError::Encode(_)));
}

#[test]
fn dropped_spool_leaves_nothing_behind() {
    let spool = SpoolSink::create(&std::env::temp_dir(), 1, Dimensions::new(1, 1)).unwrap();
    let path = spool.path().unwrap().to_path_buf();
    drop(spool);
    assert!(!path.exists());
}
