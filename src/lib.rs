//! chalkline renders whiteboard-style videos: a hand draws each layer of a scene onto a canvas,
//! the finished scene is revealed in color, and a virtual camera pans and zooms across it.
//!
//! The public API is session-oriented:
//!
//! - Load and validate a [`Project`]
//! - Create a [`RenderSession`]
//! - Stream all or some of its scenes into a [`FrameSink`], or grab a [`RenderSession::still`]
//!
//! The building blocks (draw schedulers, compositor, camera projection) are exported as well and
//! can be driven directly on a [`Canvas`].
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

pub(crate) mod animation;
pub(crate) mod camera;
pub(crate) mod compose;
pub(crate) mod draw;
/// Frame sinks.
pub mod encode;
pub(crate) mod layer;
pub(crate) mod raster;
pub(crate) mod render;
pub(crate) mod scene;

pub use crate::foundation::color::ColorDef;
pub use crate::foundation::core::{BezPath, Dimensions, Fps, FrameIndex, Point, Rect, Vec2};
pub use crate::foundation::error::{ChalkError, ChalkResult, Component};

pub use crate::raster::canvas::{Canvas, PixelRect, RegionSnapshot};
pub use crate::raster::ink::{AdaptiveInk, InkMask, InkThreshold};

pub use crate::compose::compositor::{
    Anchor, PlacedLayer, Placement, compose, erase_under, paint, paint_order, paint_with_opacity,
};

pub use crate::draw::DrawPass;
pub use crate::draw::columns::{ColumnDrawScheduler, ColumnUnit, DEFAULT_LINE_GAP, Segment};
pub use crate::draw::hand::HandSprite;
pub use crate::draw::regions::{RegionFillScheduler, RegionOrder};
pub use crate::draw::tiles::{Tile, TileDrawScheduler};

pub use crate::camera::sequence::{CameraKeyframe, CameraTimeline, interpolate};
pub use crate::camera::viewport::{Camera, Viewport, project, viewport};

pub use crate::animation::ease::Ease;
pub use crate::animation::motion::{Edge, Motion, MotionPass, Transition, point_along, pose};

pub use crate::layer::model::{
    DrawMode, EntranceDef, EntranceKind, ExitDef, ExitKind, LayerDef, LayerKind, PathDef,
    ShapeDef, ShapeKind, TextAlign, TextDef, TextStyle, Vec2Def,
};
pub use crate::layer::raster::{
    FontCache, RasterContext, RasterLayer, place as place_layer, rasterize, render_svg,
};
pub use crate::layer::svg::SvgDoc;

pub use crate::scene::model::{CameraDef, CameraKeyDef, HandDef, OutputDef, ProjectDef, SceneDef};
pub use crate::scene::project::Project;

pub use crate::render::orchestrator::{
    PreparedLayer, PreparedScene, RenderContext, SceneReport, render_scene,
};
pub use crate::render::session::{RenderReport, RenderSession, RenderSessionOpts, SceneFailure};

pub use crate::encode::ffmpeg::{FfmpegSink, FfmpegSinkOpts};
pub use crate::encode::sink::{FrameRGB, FrameSink, InMemorySink, PngSequenceSink, SinkConfig};
