use image::Rgb;

use crate::animation::ease::Ease;
use crate::animation::motion::{Motion, MotionPass};
use crate::camera::sequence::{CameraKeyframe, CameraTimeline};
use crate::camera::viewport::{self, Camera, Viewport};
use crate::compose::compositor::{self, PlacedLayer};
use crate::draw::DrawPass;
use crate::draw::columns::{ColumnDrawScheduler, DEFAULT_LINE_GAP};
use crate::draw::hand::HandSprite;
use crate::draw::regions::{RegionFillScheduler, RegionOrder};
use crate::draw::tiles::TileDrawScheduler;
use crate::encode::sink::{FrameRGB, FrameSink};
use crate::foundation::core::{Dimensions, Fps, FrameIndex, Point};
use crate::foundation::error::{ChalkError, ChalkResult, Component};
use crate::layer::model::{DrawMode, LayerDef};
use crate::layer::raster::{self, RasterContext};
use crate::raster::canvas::Canvas;
use crate::scene::model::{ProjectDef, SceneDef};

/// A layer ready for rendering: rasterized, placed and carrying its timing options.
#[derive(Clone, Debug)]
pub struct PreparedLayer {
    /// Name used in logs and errors.
    pub label: String,
    /// Placed pixels.
    pub layer: PlacedLayer,
    /// Draw pass selection.
    pub mode: DrawMode,
    /// Text uses the column order in [`DrawMode::Draw`].
    pub is_text: bool,
    /// Draw units per frame; the project default when unset.
    pub skip_rate: Option<usize>,
    /// Seconds the draw pass should take.
    pub draw_duration: Option<f64>,
    /// Entrance motion with its duration in seconds and easing.
    pub entrance: Option<(Motion, f64, Ease)>,
    /// Path motion, same layout as `entrance`.
    pub path: Option<(Motion, f64, Ease)>,
    /// Exit motion, same layout as `entrance`.
    pub exit: Option<(Motion, f64, Ease)>,
}

impl PreparedLayer {
    /// Wrap an already placed layer with the options of `def`.
    pub fn from_placed(def: &LayerDef, index: usize, layer: PlacedLayer) -> Self {
        Self {
            label: def.label(index),
            layer,
            mode: def.mode,
            is_text: def.is_text(),
            skip_rate: def.skip_rate,
            draw_duration: def.draw_duration,
            entrance: def
                .entrance
                .as_ref()
                .map(|e| (Motion::Enter(e.transition()), e.duration, e.easing)),
            path: def.path.as_ref().map(|p| {
                (
                    Motion::Path {
                        points: p.points.iter().map(|v| v.to_point()).collect(),
                        anchor: def.anchor,
                    },
                    p.duration,
                    p.easing,
                )
            }),
            exit: def
                .exit
                .as_ref()
                .map(|e| (Motion::Exit(e.transition()), e.duration, e.easing)),
        }
    }

    /// The layer as it stands on the canvas once all of its frames are out, if it stays at all.
    pub fn resting_layer(&self) -> Option<PlacedLayer> {
        if self.exit.is_some() {
            return None;
        }
        Some(match &self.path {
            Some((motion, _, _)) => motion.settle(&self.layer),
            None => self.layer.clone(),
        })
    }
}

/// A scene with every layer rasterized, ready to be rendered any number of times.
#[derive(Clone, Debug)]
pub struct PreparedScene {
    /// Position in the project.
    pub index: usize,
    /// Name used in logs and errors.
    pub label: String,
    /// Scene canvas size.
    pub canvas: Dimensions,
    /// Canvas fill color.
    pub background: Rgb<u8>,
    /// Seconds.
    pub duration: f64,
    /// Layers in paint order.
    pub layers: Vec<PreparedLayer>,
    /// Camera used while layers are drawn.
    pub camera: Camera,
    /// Closing camera sequence; empty for a static hold.
    pub sequence: Vec<CameraKeyframe>,
}

impl PreparedScene {
    /// Rasterize and place every layer of `def`.
    ///
    /// Failures are attributed to scene `index` and the component that raised them.
    pub fn prepare(
        index: usize,
        def: &SceneDef,
        project: &ProjectDef,
        ctx: &RasterContext<'_>,
    ) -> ChalkResult<Self> {
        let canvas = def
            .canvas(project.output.dimensions())
            .ensure_non_empty("canvas")
            .map_err(|e| e.in_scene(index, Component::Compositor))?;

        let mut layers = Vec::with_capacity(def.layers.len());
        for (i, layer_def) in def.layers.iter().enumerate() {
            let raster = raster::rasterize(layer_def, ctx)
                .map_err(|e| e.in_scene(index, Component::Rasterizer))?;
            let placed = raster::place(layer_def, raster)
                .map_err(|e| e.in_scene(index, Component::Compositor))?;
            layers.push(PreparedLayer::from_placed(layer_def, i, placed));
        }
        layers.sort_by_key(|l| l.layer.z_index);

        let sequence: Vec<CameraKeyframe> =
            def.camera_keys().iter().map(|k| k.to_keyframe()).collect();
        let camera = match (def.camera, sequence.first()) {
            (Some(c), _) => c.to_camera(),
            (None, Some(first)) => first.camera,
            (None, None) => Camera::overview(canvas, project.output.dimensions()),
        };

        Ok(Self {
            index,
            label: def.label(index),
            canvas,
            background: def.background.unwrap_or(project.background).to_rgb8(),
            duration: def.duration,
            layers,
            camera,
            sequence,
        })
    }

    /// The fully drawn scene, without intermediate frames.
    pub fn final_canvas(&self) -> Canvas {
        let layers: Vec<PlacedLayer> = self
            .layers
            .iter()
            .filter_map(PreparedLayer::resting_layer)
            .collect();
        compositor::compose(&layers, self.canvas, self.background)
    }

    /// Camera the scene ends on.
    pub fn closing_camera(&self) -> Camera {
        self.sequence.last().map_or(self.camera, |k| k.camera)
    }
}

/// Project-wide settings the orchestrator needs.
#[derive(Clone, Copy, Debug)]
pub struct RenderContext<'a> {
    /// Output frame rate.
    pub fps: Fps,
    /// Output frame size.
    pub output: Dimensions,
    /// Tile size of the greedy draw order.
    pub tile_edge: u32,
    /// Default draw units per frame.
    pub skip_rate: usize,
    /// Sprite stamped at the pen position on draw frames.
    pub hand: Option<&'a HandSprite>,
}

/// Frame accounting for one rendered scene.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SceneReport {
    /// Scene position in the project.
    pub index: usize,
    /// `round(duration * fps)`.
    pub target_frames: u64,
    /// Frames pushed to the sink.
    pub frames_written: u64,
    /// Frames emitted by draw passes.
    pub draw_frames: u64,
    /// Frames emitted by entrance, path and exit motions.
    pub motion_frames: u64,
    /// Frames of the closing camera sequence.
    pub camera_frames: u64,
    /// Static padding frames.
    pub hold_frames: u64,
    /// Draw and motion frames alone exceeded the target.
    pub overrun: bool,
}

struct FrameEmitter<'s, 'h> {
    sink: &'s mut dyn FrameSink,
    output: Dimensions,
    viewport: Viewport,
    hand: Option<&'h HandSprite>,
    scene: usize,
    written: u64,
}

impl FrameEmitter<'_, '_> {
    fn push(&mut self, frame: &FrameRGB) -> ChalkResult<()> {
        self.sink
            .push_frame(FrameIndex(self.written), frame)
            .map_err(|e| e.in_scene(self.scene, Component::Sink))?;
        self.written += 1;
        Ok(())
    }

    fn emit(&mut self, canvas: &Canvas, pen: Option<Point>) -> ChalkResult<()> {
        let mut frame = viewport::project_viewport(canvas, &self.viewport, self.output);
        if let (Some(hand), Some(pen)) = (self.hand, pen) {
            hand.stamp(&mut frame, self.viewport.to_output(pen, self.output));
        }
        self.push(&frame)
    }

    fn emit_through(&mut self, canvas: &Canvas, camera: &Camera) -> ChalkResult<()> {
        let frame = viewport::project(canvas, camera, self.output)
            .map_err(|e| e.in_scene(self.scene, Component::Camera))?;
        self.push(&frame)
    }
}

fn batch_size(layer: &PreparedLayer, units: usize, ctx: &RenderContext<'_>) -> usize {
    match layer.draw_duration {
        Some(secs) => {
            let frames = ctx.fps.secs_to_frames_round(secs).max(1) as usize;
            units.div_ceil(frames)
        }
        None => layer.skip_rate.unwrap_or(ctx.skip_rate),
    }
}

fn draw_pass<'a>(
    layer: &'a PreparedLayer,
    ctx: &RenderContext<'_>,
) -> ChalkResult<Option<Box<dyn DrawPass + 'a>>> {
    let placed = &layer.layer;
    let pass: Box<dyn DrawPass + 'a> = match layer.mode {
        DrawMode::Static => return Ok(None),
        DrawMode::Draw if layer.is_text => {
            Box::new(ColumnDrawScheduler::new(placed, DEFAULT_LINE_GAP, 1))
        }
        DrawMode::Draw => Box::new(TileDrawScheduler::new(placed, ctx.tile_edge, 1)?),
        DrawMode::Coloriage => Box::new(RegionFillScheduler::new(
            placed,
            RegionOrder::Coloriage,
            1,
        )),
        DrawMode::FloodFill => Box::new(RegionFillScheduler::new(
            placed,
            RegionOrder::FloodFill,
            1,
        )),
    };
    Ok(Some(pass))
}

/// Play `motion` over `base`, leaving the final pose on `canvas`. Returns the frames emitted.
fn play_motion(
    emitter: &mut FrameEmitter<'_, '_>,
    canvas: &mut Canvas,
    base: &image::RgbImage,
    layer: &PlacedLayer,
    (motion, secs, ease): &(Motion, f64, Ease),
    fps: Fps,
) -> ChalkResult<u64> {
    let frames = fps.secs_to_frames_round(*secs);
    let mut pass = MotionPass::new(base, layer, motion.clone(), frames, *ease);
    let mut emitted = 0;
    while pass.step(canvas) {
        emitter.emit(canvas, None)?;
        emitted += 1;
    }
    Ok(emitted)
}

/// Render one prepared scene into `sink`.
///
/// Frames are pushed with scene-local indices starting at 0; `begin`/`end` belong to the caller.
/// Any error is attributed to the scene and the component that raised it, and frames already
/// pushed for the scene must be discarded.
#[tracing::instrument(skip_all, fields(scene = scene.index))]
pub fn render_scene(
    scene: &PreparedScene,
    ctx: &RenderContext<'_>,
    sink: &mut dyn FrameSink,
) -> ChalkResult<SceneReport> {
    let index = scene.index;
    let at = |component: Component| move |e: ChalkError| e.in_scene(index, component);

    let vp = viewport::viewport(scene.canvas, &scene.camera, ctx.output)
        .map_err(at(Component::Camera))?;
    let target = ctx.fps.secs_to_frames_round(scene.duration);
    let mut report = SceneReport {
        index,
        target_frames: target,
        ..SceneReport::default()
    };
    tracing::info!(
        scene = %scene.label,
        layers = scene.layers.len(),
        target_frames = target,
        "rendering scene"
    );

    let mut canvas = Canvas::new(scene.canvas, scene.background);
    let mut emitter = FrameEmitter {
        sink,
        output: ctx.output,
        viewport: vp,
        hand: ctx.hand,
        scene: index,
        written: 0,
    };

    for layer in &scene.layers {
        let placed = &layer.layer;
        if placed.clip_rect(scene.canvas).is_none() {
            tracing::warn!(layer = %layer.label, "layer lies entirely outside the canvas, skipped");
            continue;
        }
        let before = canvas.snapshot();
        if placed.intelligent_eraser {
            compositor::erase_under(&mut canvas, placed);
        }

        if let Some(entrance) = &layer.entrance {
            let base = canvas.snapshot();
            let n = play_motion(&mut emitter, &mut canvas, &base, placed, entrance, ctx.fps)?;
            if n == 0 {
                compositor::paint(&mut canvas, placed);
            }
            report.motion_frames += n;
        } else {
            match draw_pass(layer, ctx).map_err(at(Component::Scheduler))? {
                Some(mut pass) if pass.unit_count() > 0 => {
                    let units = pass.unit_count();
                    pass.set_batch_size(batch_size(layer, units, ctx));
                    let start = emitter.written;
                    while let Some(pen) = pass.next_batch(&mut canvas) {
                        emitter.emit(&canvas, Some(pen))?;
                    }
                    report.draw_frames += emitter.written - start;
                    tracing::debug!(
                        layer = %layer.label,
                        mode = ?layer.mode,
                        units,
                        frames = emitter.written - start,
                        "layer drawn"
                    );
                }
                _ => compositor::paint(&mut canvas, placed),
            }
        }

        let mut current = placed.clone();
        if let Some(path) = &layer.path {
            let n = play_motion(&mut emitter, &mut canvas, &before, placed, path, ctx.fps)?;
            current = path.0.settle(placed);
            if n == 0 {
                canvas.restore(&before);
                if current.intelligent_eraser {
                    compositor::erase_under(&mut canvas, &current);
                }
                compositor::paint(&mut canvas, &current);
            }
            report.motion_frames += n;
        }
        if let Some(exit) = &layer.exit {
            report.motion_frames +=
                play_motion(&mut emitter, &mut canvas, &before, &current, exit, ctx.fps)?;
            canvas.restore(&before);
        }
    }

    let animated = emitter.written;
    if animated > target {
        report.overrun = true;
        tracing::warn!(
            scene = %scene.label,
            frames = animated,
            target_frames = target,
            animated_secs = ctx.fps.frames_to_secs(animated),
            "animation overruns the scene duration, no hold frames added"
        );
    }

    if scene.sequence.is_empty() {
        let remaining = target.saturating_sub(animated);
        if remaining > 0 {
            let frame = viewport::project_viewport(&canvas, &vp, ctx.output);
            for _ in 0..remaining {
                emitter.push(&frame)?;
            }
        }
        report.hold_frames = remaining;
    } else {
        let timeline =
            CameraTimeline::new(scene.sequence.clone(), ctx.fps).map_err(at(Component::Camera))?;
        for camera in timeline {
            emitter.emit_through(&canvas, &camera)?;
            report.camera_frames += 1;
        }
    }

    report.frames_written = emitter.written;
    tracing::debug!(
        scene = %scene.label,
        frames = report.frames_written,
        draw = report.draw_frames,
        motion = report.motion_frames,
        "scene rendered"
    );
    Ok(report)
}

#[cfg(test)]
#[path = "../../tests/unit/render/orchestrator.rs"]
mod tests;
