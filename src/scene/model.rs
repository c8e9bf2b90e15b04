use serde::{Deserialize, Serialize};

use crate::animation::ease::Ease;
use crate::camera::sequence::CameraKeyframe;
use crate::camera::viewport::Camera;
use crate::foundation::color::ColorDef;
use crate::foundation::core::{Dimensions, Fps, Vec2};
use crate::layer::model::{LayerDef, Vec2Def};
use crate::raster::ink::InkThreshold;

/// Output video frame size.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct OutputDef {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
}

impl OutputDef {
    /// As [`Dimensions`].
    pub fn dimensions(self) -> Dimensions {
        Dimensions::new(self.width, self.height)
    }
}

/// Hand sprite stamped on draw frames.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HandDef {
    /// Image path relative to the assets root.
    pub image: String,
    /// Pen tip inside the image, in source pixels.
    #[serde(default)]
    pub tip: Vec2Def,
    /// Sprite scale factor.
    #[serde(default = "one")]
    pub scale: f64,
}

fn one() -> f64 {
    1.0
}

fn default_tile_edge() -> u32 {
    20
}

fn default_skip_rate() -> usize {
    8
}

/// Whole-project configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectDef {
    /// Frame size of the rendered video.
    pub output: OutputDef,
    /// Frame rate, an integer or `{"num": .., "den": ..}`.
    pub fps: Fps,
    /// Default scene background.
    #[serde(default = "white")]
    pub background: ColorDef,
    /// Tile size of the greedy draw order, in pixels.
    #[serde(default = "default_tile_edge")]
    pub tile_edge: u32,
    /// Default draw units per frame.
    #[serde(default = "default_skip_rate")]
    pub skip_rate: usize,
    /// Ink detection for bitmap layers.
    #[serde(default)]
    pub ink: InkThreshold,
    /// Hand sprite; no hand is drawn when unset.
    #[serde(default)]
    pub hand: Option<HandDef>,
    /// Extra font directories, relative to the assets root.
    #[serde(default)]
    pub font_dirs: Vec<String>,
    /// Scenes, played in order.
    #[serde(alias = "slides")]
    pub scenes: Vec<SceneDef>,
}

fn white() -> ColorDef {
    ColorDef::WHITE
}

/// Static camera.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CameraDef {
    /// Magnification, `> 0`.
    #[serde(default = "one")]
    pub zoom: f64,
    /// Viewport center as a fraction of the canvas size.
    #[serde(default = "centered")]
    pub position: Vec2Def,
    /// Explicit viewport width at zoom 1.
    #[serde(default)]
    pub width: Option<f64>,
    /// Explicit viewport height at zoom 1.
    #[serde(default)]
    pub height: Option<f64>,
}

fn centered() -> Vec2Def {
    Vec2Def { x: 0.5, y: 0.5 }
}

impl CameraDef {
    /// Runtime camera.
    pub fn to_camera(self) -> Camera {
        Camera {
            zoom: self.zoom,
            position: Vec2::new(self.position.x, self.position.y),
            width: self.width,
            height: self.height,
        }
    }
}

/// One stop of a camera sequence.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CameraKeyDef {
    /// Camera at this stop.
    #[serde(flatten)]
    pub camera: CameraDef,
    /// Seconds spent resting here.
    #[serde(default, alias = "duration")]
    pub hold: f64,
    /// Seconds spent moving here from the previous stop.
    #[serde(default, alias = "transition_duration")]
    pub transition: f64,
    /// Easing of the move.
    #[serde(default)]
    pub easing: Ease,
}

impl CameraKeyDef {
    /// Runtime keyframe.
    pub fn to_keyframe(self) -> CameraKeyframe {
        CameraKeyframe {
            camera: self.camera.to_camera(),
            hold: self.hold,
            transition: self.transition,
            ease: self.easing,
        }
    }
}

/// One scene: a canvas, its layers and how the camera looks at it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneDef {
    /// Optional name used in logs and errors.
    #[serde(default)]
    pub id: Option<String>,
    /// Canvas width; the output width when unset.
    #[serde(default, alias = "canvas_width")]
    pub width: Option<u32>,
    /// Canvas height; the output height when unset.
    #[serde(default, alias = "canvas_height")]
    pub height: Option<u32>,
    /// Seconds.
    pub duration: f64,
    /// Canvas fill; the project background when unset.
    #[serde(default)]
    pub background: Option<ColorDef>,
    /// Layers, drawn in order of `z_index` then position.
    #[serde(default)]
    pub layers: Vec<LayerDef>,
    /// Camera used while drawing.
    #[serde(default)]
    pub camera: Option<CameraDef>,
    /// Closing camera sequence.
    #[serde(default)]
    pub cameras: Vec<CameraKeyDef>,
    /// Legacy spelling of `cameras`, used only when `cameras` is empty.
    #[serde(default, rename = "sceneCameras", skip_serializing_if = "Vec::is_empty")]
    pub scene_cameras: Vec<CameraKeyDef>,
}

impl SceneDef {
    /// Canvas size, falling back to the output size.
    pub fn canvas(&self, output: Dimensions) -> Dimensions {
        Dimensions::new(
            self.width.unwrap_or(output.width),
            self.height.unwrap_or(output.height),
        )
    }

    /// Effective camera sequence.
    pub fn camera_keys(&self) -> &[CameraKeyDef] {
        if self.cameras.is_empty() {
            &self.scene_cameras
        } else {
            &self.cameras
        }
    }

    /// Human-readable name for logs and errors.
    pub fn label(&self, index: usize) -> String {
        match &self.id {
            Some(id) => format!("scene '{id}'"),
            None => format!("scene #{index}"),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/model.rs"]
mod tests;
