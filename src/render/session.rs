use std::ops::Range;
use std::path::PathBuf;

use rayon::prelude::*;

use crate::camera::viewport;
use crate::draw::hand::HandSprite;
use crate::encode::sink::{FrameRGB, FrameSink, SinkConfig};
use crate::foundation::core::FrameIndex;
use crate::foundation::error::{ChalkError, ChalkResult, Component};
use crate::layer::raster::{FontCache, RasterContext};
use crate::render::orchestrator::{PreparedScene, RenderContext, SceneReport, render_scene};
use crate::render::spool::SpoolSink;
use crate::scene::project::Project;

/// Options for [`RenderSession`].
#[derive(Clone, Debug, Default)]
pub struct RenderSessionOpts {
    /// Render scenes concurrently on a dedicated rayon pool.
    pub parallel: bool,
    /// Worker count for the pool; rayon's default when unset.
    pub threads: Option<usize>,
    /// Directory for scene spool files; the system temp directory when unset.
    pub spool_dir: Option<PathBuf>,
}

/// A scene that failed to render; none of its frames reached the sink.
#[derive(Debug)]
pub struct SceneFailure {
    /// Scene position in the project.
    pub index: usize,
    /// Cause, attributed to the scene.
    pub error: ChalkError,
}

/// Outcome of a multi-scene render.
#[derive(Debug, Default)]
pub struct RenderReport {
    /// Reports of the scenes that made it into the output, in order.
    pub scenes: Vec<SceneReport>,
    /// Scenes left out of the output, in order.
    pub failures: Vec<SceneFailure>,
    /// Frames pushed to the sink.
    pub frames_written: u64,
}

impl RenderReport {
    /// Whether every requested scene rendered.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Renders the scenes of a [`Project`] into a [`FrameSink`].
///
/// The session owns the font database and the hand sprite for its whole lifetime. Each scene is
/// rendered on its own canvas into a spool file; spools are replayed into the sink in scene order
/// once every scene of the requested range has finished, so a failing scene only drops its own
/// frames.
pub struct RenderSession<'p> {
    project: &'p Project,
    assets_root: PathBuf,
    fonts: FontCache,
    hand: Option<HandSprite>,
    opts: RenderSessionOpts,
}

impl<'p> RenderSession<'p> {
    /// Validate `project` and load its fonts and hand sprite from `assets_root`.
    pub fn new(
        project: &'p Project,
        assets_root: impl Into<PathBuf>,
        opts: RenderSessionOpts,
    ) -> ChalkResult<Self> {
        project.validate()?;
        if opts.threads == Some(0) {
            return Err(ChalkError::validation(
                "render threading 'threads' must be >= 1 when set",
            ));
        }
        let assets_root = assets_root.into();
        let def = project.def();

        let font_dirs: Vec<PathBuf> = def.font_dirs.iter().map(|d| assets_root.join(d)).collect();
        let fonts = FontCache::new(&font_dirs);

        let hand = match &def.hand {
            Some(h) => Some(HandSprite::load(
                &assets_root.join(&h.image),
                (h.tip.x, h.tip.y),
                h.scale,
            )?),
            None => None,
        };

        Ok(Self {
            project,
            assets_root,
            fonts,
            hand,
            opts,
        })
    }

    /// Rasterize and place the layers of scene `index`.
    pub fn prepare_scene(&self, index: usize) -> ChalkResult<PreparedScene> {
        let def = self.project.def();
        let scene = def.scenes.get(index).ok_or_else(|| {
            ChalkError::validation(format!(
                "scene index {index} out of range (project has {} scenes)",
                def.scenes.len()
            ))
        })?;
        let raster = RasterContext {
            fonts: &self.fonts,
            assets_root: &self.assets_root,
            ink: &def.ink,
        };
        PreparedScene::prepare(index, scene, def, &raster)
    }

    fn context(&self) -> RenderContext<'_> {
        let def = self.project.def();
        RenderContext {
            fps: def.fps,
            output: def.output.dimensions(),
            tile_edge: def.tile_edge,
            skip_rate: def.skip_rate,
            hand: self.hand.as_ref(),
        }
    }

    fn spool_scene(&self, index: usize) -> ChalkResult<(SceneReport, SpoolSink)> {
        let scene = self.prepare_scene(index)?;
        let ctx = self.context();
        let dir = self
            .opts
            .spool_dir
            .clone()
            .unwrap_or_else(std::env::temp_dir);
        let mut spool = SpoolSink::create(&dir, index, ctx.output)
            .map_err(|e| e.in_scene(index, Component::Sink))?;
        let report = render_scene(&scene, &ctx, &mut spool)?;
        Ok((report, spool))
    }

    /// Render every scene.
    pub fn render(&self, sink: &mut dyn FrameSink) -> ChalkResult<RenderReport> {
        self.render_scenes(0..self.project.scene_count(), sink)
    }

    /// Render the scenes in `range`, in order, as one frame stream.
    ///
    /// Scene failures are collected in the report. Errors from `sink` itself abort the render.
    pub fn render_scenes(
        &self,
        range: Range<usize>,
        sink: &mut dyn FrameSink,
    ) -> ChalkResult<RenderReport> {
        let count = self.project.scene_count();
        if range.start > range.end || range.end > count {
            return Err(ChalkError::validation(format!(
                "scene range {}..{} out of bounds (project has {count} scenes)",
                range.start, range.end
            )));
        }
        let ctx = self.context();
        tracing::info!(
            scenes = range.len(),
            parallel = self.opts.parallel,
            width = ctx.output.width,
            height = ctx.output.height,
            "render session started"
        );

        let results: Vec<(usize, ChalkResult<(SceneReport, SpoolSink)>)> = if self.opts.parallel {
            let pool = build_thread_pool(self.opts.threads)?;
            pool.install(|| {
                range
                    .clone()
                    .into_par_iter()
                    .map(|i| (i, self.spool_scene(i)))
                    .collect()
            })
        } else {
            range.clone().map(|i| (i, self.spool_scene(i))).collect()
        };

        sink.begin(SinkConfig {
            width: ctx.output.width,
            height: ctx.output.height,
            fps: ctx.fps,
        })?;
        let mut report = RenderReport::default();
        for (index, result) in results {
            match result {
                Ok((scene_report, spool)) => {
                    report.frames_written +=
                        spool.replay(sink, FrameIndex(report.frames_written))?;
                    report.scenes.push(scene_report);
                }
                Err(error) => {
                    let error = error.in_scene(index, Component::Orchestrator);
                    tracing::warn!(scene = index, error = %error, "scene failed, frames dropped");
                    report.failures.push(SceneFailure { index, error });
                }
            }
        }
        sink.end()?;

        tracing::info!(
            frames = report.frames_written,
            failed = report.failures.len(),
            "render session finished"
        );
        Ok(report)
    }

    /// The final composed view of scene `index`, as the camera shows it at the end of the scene.
    pub fn still(&self, index: usize) -> ChalkResult<FrameRGB> {
        let scene = self.prepare_scene(index)?;
        let canvas = scene.final_canvas();
        viewport::project(&canvas, &scene.closing_camera(), self.context().output)
            .map_err(|e| e.in_scene(index, Component::Camera))
    }
}

fn build_thread_pool(threads: Option<usize>) -> ChalkResult<rayon::ThreadPool> {
    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| ChalkError::validation(format!("failed to build rayon thread pool: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/render/session.rs"]
mod tests;
