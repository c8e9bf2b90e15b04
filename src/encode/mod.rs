//! Frame sinks.
//!
//! Sinks consume composed frames in temporal order and are fed by `RenderSession`.

/// `ffmpeg`-based MP4 sink.
pub mod ffmpeg;
/// Frame type, sink trait and built-in sinks.
pub mod sink;
