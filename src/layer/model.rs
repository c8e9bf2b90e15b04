use serde::{Deserialize, Serialize};

use crate::animation::ease::Ease;
use crate::animation::motion::{Edge, Transition};
use crate::compose::compositor::Anchor;
use crate::foundation::color::ColorDef;
use crate::foundation::core::Point;
use crate::foundation::error::{ChalkError, ChalkResult};

/// 2D vector accepted as `[x, y]` or `{"x": .., "y": ..}`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Vec2Def {
    /// Horizontal component.
    pub x: f64,
    /// Vertical component.
    pub y: f64,
}

impl Vec2Def {
    /// As a kurbo point.
    pub fn to_point(self) -> Point {
        Point::new(self.x, self.y)
    }

    fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl<'de> Deserialize<'de> for Vec2Def {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Arr([f64; 2]),
            Obj { x: f64, y: f64 },
        }

        match Repr::deserialize(deserializer)? {
            Repr::Arr([x, y]) => Ok(Self { x, y }),
            Repr::Obj { x, y } => Ok(Self { x, y }),
        }
    }
}

/// How a layer is brought onto the canvas.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DrawMode {
    /// Progressive sketch (tiles, or columns for text) then color reveal.
    #[default]
    Draw,
    /// Diagonal zig-zag color fill.
    Coloriage,
    /// Connected regions filled one at a time.
    FloodFill,
    /// Painted at once, no draw frames.
    Static,
}

fn one() -> f64 {
    1.0
}

/// One layer of a scene.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayerDef {
    /// Optional name used in logs and errors.
    #[serde(default)]
    pub id: Option<String>,
    /// Content, selected by the `type` key.
    #[serde(flatten)]
    pub kind: LayerKind,

    /// Top-left (or center, see `anchor`) in scene pixels. Arrows and strokes default to their
    /// own coordinates; other layers default to the scene origin.
    #[serde(default)]
    pub position: Option<Vec2Def>,
    /// Which layer point `position` refers to.
    #[serde(default, alias = "anchor_point")]
    pub anchor: Anchor,
    /// Target width in scene pixels.
    #[serde(default)]
    pub width: Option<u32>,
    /// Target height in scene pixels.
    #[serde(default)]
    pub height: Option<u32>,
    /// Uniform scale, used when neither `width` nor `height` is set.
    #[serde(default = "one")]
    pub scale: f64,
    /// Opacity in `[0, 1]`.
    #[serde(default = "one")]
    pub opacity: f64,
    /// Paint order within the scene.
    #[serde(default)]
    pub z_index: i32,

    /// Draw pass used for this layer.
    #[serde(default)]
    pub mode: DrawMode,
    /// Draw units per frame; overrides the project default.
    #[serde(default)]
    pub skip_rate: Option<usize>,
    /// Seconds the draw pass should take; wins over `skip_rate`.
    #[serde(default)]
    pub draw_duration: Option<f64>,
    /// Clear what lies under the layer's ink before drawing it.
    #[serde(default)]
    pub intelligent_eraser: bool,

    /// Animated entrance, played instead of the draw pass.
    #[serde(default)]
    pub entrance: Option<EntranceDef>,
    /// Animated exit after the layer was drawn.
    #[serde(default)]
    pub exit: Option<ExitDef>,
    /// Movement along scene positions after the layer was drawn.
    #[serde(default)]
    pub path: Option<PathDef>,
}

/// Kind-specific layer content, tagged by `type`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LayerKind {
    /// Bitmap file.
    Image {
        /// File relative to the assets root.
        image_path: String,
    },
    /// Rendered text.
    Text(TextDef),
    /// Geometric primitive.
    Shape(ShapeDef),
    /// Straight arrow with a filled head at `end`.
    Arrow {
        /// Tail, in scene pixels.
        start: Vec2Def,
        /// Tip, in scene pixels.
        end: Vec2Def,
        /// Line and head color.
        #[serde(default)]
        color: ColorDef,
        /// Line width.
        #[serde(default = "default_stroke_width")]
        stroke_width: f64,
        /// Head length.
        #[serde(default = "default_head_size")]
        head_size: f64,
    },
    /// Freehand polyline.
    Stroke {
        /// Vertices in scene pixels.
        points: Vec<Vec2Def>,
        /// Line color.
        #[serde(default)]
        color: ColorDef,
        /// Line width.
        #[serde(default = "default_stroke_width")]
        stroke_width: f64,
        /// Smooth the polyline with quadratic curves through segment midpoints.
        #[serde(default)]
        smooth: bool,
    },
}

fn default_stroke_width() -> f64 {
    4.0
}

fn default_head_size() -> f64 {
    20.0
}

/// Text content and style.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextDef {
    /// Content; `\n` starts a new line.
    pub text: String,
    /// Font family name.
    #[serde(default = "default_font")]
    pub font: String,
    /// Font size in pixels.
    #[serde(default = "default_font_size")]
    pub size: f64,
    /// Fill color.
    #[serde(default)]
    pub color: ColorDef,
    /// Weight and slant.
    #[serde(default)]
    pub style: TextStyle,
    /// Horizontal alignment of lines.
    #[serde(default)]
    pub align: TextAlign,
    /// Line advance as a multiple of `size`.
    #[serde(default = "default_line_height")]
    pub line_height: f64,
}

fn default_font() -> String {
    "sans-serif".to_owned()
}

fn default_font_size() -> f64 {
    48.0
}

fn default_line_height() -> f64 {
    1.2
}

/// Font weight and slant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextStyle {
    /// Regular upright.
    #[default]
    Normal,
    /// Bold upright.
    Bold,
    /// Regular italic.
    Italic,
    /// Bold italic.
    BoldItalic,
}

/// Horizontal line alignment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextAlign {
    /// Flush left.
    #[default]
    Left,
    /// Centered.
    Center,
    /// Flush right.
    Right,
}

/// Geometric primitive drawn in its own coordinate box.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShapeDef {
    /// Which primitive.
    pub shape: ShapeKind,
    /// Box size for rect, ellipse and triangle.
    #[serde(default)]
    pub size: Option<Vec2Def>,
    /// Circle radius.
    #[serde(default)]
    pub radius: Option<f64>,
    /// Vertices for polygon and line, in the shape's own coordinates.
    #[serde(default)]
    pub points: Vec<Vec2Def>,
    /// Outline color.
    #[serde(default)]
    pub color: ColorDef,
    /// Fill color; unfilled when unset.
    #[serde(default)]
    pub fill_color: Option<ColorDef>,
    /// Outline width.
    #[serde(default = "default_stroke_width")]
    pub stroke_width: f64,
}

/// Supported primitives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShapeKind {
    /// Axis-aligned rectangle of `size`.
    Rect,
    /// Circle of `radius`.
    Circle,
    /// Ellipse inscribed in `size`.
    Ellipse,
    /// Isosceles triangle inscribed in `size`, apex up.
    Triangle,
    /// Open polyline through `points`.
    Line,
    /// Closed polygon through `points`.
    Polygon,
}

/// Entrance animations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntranceKind {
    /// Opacity ramps up.
    FadeIn,
    /// Travels in from an edge.
    SlideIn,
    /// Grows from its center.
    ZoomIn,
}

/// Exit animations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExitKind {
    /// Opacity ramps down.
    FadeOut,
    /// Travels out towards an edge.
    SlideOut,
    /// Shrinks into its center.
    ZoomOut,
}

/// Layer entrance; replaces the draw pass.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct EntranceDef {
    /// Animation, from the `type` key.
    #[serde(rename = "type")]
    pub kind: EntranceKind,
    /// Slide origin edge.
    #[serde(default)]
    pub from: Edge,
    /// Seconds.
    #[serde(default = "one")]
    pub duration: f64,
    /// Progress curve.
    #[serde(default)]
    pub easing: Ease,
}

impl EntranceDef {
    /// Motion played by this entrance.
    pub fn transition(&self) -> Transition {
        match self.kind {
            EntranceKind::FadeIn => Transition::Fade,
            EntranceKind::SlideIn => Transition::Slide(self.from),
            EntranceKind::ZoomIn => Transition::Zoom,
        }
    }
}

/// Layer exit, played after drawing; the layer is gone afterwards.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ExitDef {
    /// Animation, from the `type` key.
    #[serde(rename = "type")]
    pub kind: ExitKind,
    /// Slide destination edge.
    #[serde(default)]
    pub to: Edge,
    /// Seconds.
    #[serde(default = "one")]
    pub duration: f64,
    /// Progress curve.
    #[serde(default)]
    pub easing: Ease,
}

impl ExitDef {
    /// Motion played by this exit.
    pub fn transition(&self) -> Transition {
        match self.kind {
            ExitKind::FadeOut => Transition::Fade,
            ExitKind::SlideOut => Transition::Slide(self.to),
            ExitKind::ZoomOut => Transition::Zoom,
        }
    }
}

/// Movement of the layer anchor along scene positions after drawing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathDef {
    /// Scene positions visited in order.
    pub points: Vec<Vec2Def>,
    /// Seconds for the whole path.
    #[serde(default = "one")]
    pub duration: f64,
    /// Progress curve along the path.
    #[serde(default)]
    pub easing: Ease,
}

fn check_duration(what: &str, secs: f64) -> ChalkResult<()> {
    if !secs.is_finite() || secs < 0.0 {
        return Err(ChalkError::validation(format!(
            "{what} must be a finite, non-negative number of seconds, got {secs}"
        )));
    }
    Ok(())
}

fn check_stroke_width(what: &str, w: f64) -> ChalkResult<()> {
    if !w.is_finite() || w <= 0.0 {
        return Err(ChalkError::validation(format!(
            "{what} stroke_width must be > 0, got {w}"
        )));
    }
    Ok(())
}

impl LayerDef {
    /// Human-readable name for logs and errors.
    pub fn label(&self, index: usize) -> String {
        match &self.id {
            Some(id) => format!("layer '{id}'"),
            None => format!("layer #{index}"),
        }
    }

    /// Text layers use the column draw order.
    pub fn is_text(&self) -> bool {
        matches!(self.kind, LayerKind::Text(_))
    }

    /// Check values the type system cannot.
    pub fn validate(&self) -> ChalkResult<()> {
        if !(0.0..=1.0).contains(&self.opacity) {
            return Err(ChalkError::validation(format!(
                "opacity must be in [0, 1], got {}",
                self.opacity
            )));
        }
        if !self.scale.is_finite() || self.scale <= 0.0 {
            return Err(ChalkError::validation(format!(
                "scale must be > 0, got {}",
                self.scale
            )));
        }
        if self.width == Some(0) || self.height == Some(0) {
            return Err(ChalkError::validation("explicit width/height must be > 0"));
        }
        if let Some(p) = self.position
            && !p.is_finite()
        {
            return Err(ChalkError::validation("position must be finite"));
        }
        if self.skip_rate == Some(0) {
            return Err(ChalkError::validation("skip_rate must be >= 1"));
        }
        if let Some(d) = self.draw_duration {
            check_duration("draw_duration", d)?;
        }
        if let Some(e) = &self.entrance {
            check_duration("entrance duration", e.duration)?;
        }
        if let Some(e) = &self.exit {
            check_duration("exit duration", e.duration)?;
        }
        if let Some(p) = &self.path {
            check_duration("path duration", p.duration)?;
            if p.points.is_empty() {
                return Err(ChalkError::validation("path needs at least one point"));
            }
        }

        match &self.kind {
            LayerKind::Image { image_path } => {
                if image_path.trim().is_empty() {
                    return Err(ChalkError::validation("image path must be non-empty"));
                }
            }
            LayerKind::Text(t) => {
                if !t.size.is_finite() || t.size <= 0.0 {
                    return Err(ChalkError::validation(format!(
                        "text size must be > 0, got {}",
                        t.size
                    )));
                }
                if !t.line_height.is_finite() || t.line_height <= 0.0 {
                    return Err(ChalkError::validation("text line_height must be > 0"));
                }
            }
            LayerKind::Shape(s) => {
                check_stroke_width("shape", s.stroke_width)?;
                match s.shape {
                    ShapeKind::Line if s.points.len() < 2 => {
                        return Err(ChalkError::validation("line shape needs 2 points"));
                    }
                    ShapeKind::Polygon if s.points.len() < 3 => {
                        return Err(ChalkError::validation(
                            "polygon shape needs at least 3 points",
                        ));
                    }
                    ShapeKind::Circle if s.radius.is_some_and(|r| !(r > 0.0)) => {
                        return Err(ChalkError::validation("circle radius must be > 0"));
                    }
                    _ => {}
                }
            }
            LayerKind::Arrow {
                stroke_width,
                head_size,
                ..
            } => {
                check_stroke_width("arrow", *stroke_width)?;
                if !head_size.is_finite() || *head_size < 0.0 {
                    return Err(ChalkError::validation("arrow head_size must be >= 0"));
                }
            }
            LayerKind::Stroke {
                points,
                stroke_width,
                ..
            } => {
                check_stroke_width("stroke", *stroke_width)?;
                if points.len() < 2 {
                    return Err(ChalkError::validation("stroke needs at least 2 points"));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layer/model.rs"]
mod tests;
