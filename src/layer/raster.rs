use std::path::{Path, PathBuf};
use std::sync::Arc;

use image::{Rgb, RgbImage, Rgba, RgbaImage};

use crate::compose::compositor::{Anchor, PlacedLayer, Placement};
use crate::foundation::core::Point;
use crate::foundation::error::{ChalkError, ChalkResult};
use crate::foundation::math::mul_div255_u16;
use crate::layer::model::{LayerDef, LayerKind};
use crate::layer::svg::{self, SvgDoc};
use crate::raster::ink::{InkMask, InkThreshold};

/// Font database shared by every text rasterization of a render session.
#[derive(Clone, Debug)]
pub struct FontCache {
    db: Arc<usvg::fontdb::Database>,
}

impl FontCache {
    /// System fonts plus every `ttf`/`otf`/`ttc` file directly inside `dirs`.
    pub fn new(dirs: &[PathBuf]) -> Self {
        let mut db = usvg::fontdb::Database::new();
        db.load_system_fonts();
        for dir in dirs {
            load_fonts_from_dir(&mut db, dir);
        }
        tracing::debug!(faces = db.len(), "font database ready");
        Self { db: Arc::new(db) }
    }

    /// No fonts at all; text renders empty. Useful for shape-only projects and tests.
    pub fn empty() -> Self {
        Self {
            db: Arc::new(usvg::fontdb::Database::new()),
        }
    }

    fn options(&self) -> usvg::Options<'static> {
        usvg::Options {
            fontdb: Arc::clone(&self.db),
            ..Default::default()
        }
    }
}

fn load_fonts_from_dir(db: &mut usvg::fontdb::Database, dir: &Path) {
    let Ok(rd) = std::fs::read_dir(dir) else {
        tracing::warn!(dir = %dir.display(), "font directory is not readable, skipped");
        return;
    };

    for entry in rd.flatten() {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(ext) = path.extension().and_then(|s| s.to_str()) else {
            continue;
        };
        let ext = ext.to_ascii_lowercase();
        if ext != "ttf" && ext != "otf" && ext != "ttc" {
            continue;
        }
        if let Err(e) = db.load_font_file(&path) {
            tracing::warn!(path = %path.display(), error = %e, "failed to load font");
        }
    }
}

/// Render an SVG document to straight-alpha RGBA.
pub fn render_svg(doc: &SvgDoc, fonts: &FontCache) -> ChalkResult<RgbaImage> {
    let opts = fonts.options();
    let tree = usvg::Tree::from_data(doc.source.as_bytes(), &opts)
        .map_err(|e| ChalkError::rasterize(format!("invalid svg document: {e}")))?;
    let mut pixmap = resvg::tiny_skia::Pixmap::new(doc.width, doc.height)
        .ok_or_else(|| ChalkError::rasterize("failed to allocate svg pixmap"))?;
    resvg::render(
        &tree,
        resvg::tiny_skia::Transform::identity(),
        &mut pixmap.as_mut(),
    );

    let mut out = RgbaImage::new(doc.width, doc.height);
    for (px, src) in out.pixels_mut().zip(pixmap.pixels()) {
        let c = src.demultiply();
        *px = Rgba([c.red(), c.green(), c.blue(), c.alpha()]);
    }
    Ok(out)
}

/// Flatten straight-alpha RGBA onto white paper.
pub fn flatten_on_white(rgba: &RgbaImage) -> RgbImage {
    let mut out = RgbImage::new(rgba.width(), rgba.height());
    for (dst, src) in out.pixels_mut().zip(rgba.pixels()) {
        let a = u16::from(src.0[3]);
        let inv = 255 - a;
        let mut c = [0u8; 3];
        for (i, v) in c.iter_mut().enumerate() {
            let s = mul_div255_u16(u16::from(src.0[i]), a) + inv;
            *v = s.min(255) as u8;
        }
        *dst = Rgb(c);
    }
    out
}

/// Crop to the covered area plus `pad` pixels. Returns the crop and its offset.
fn trim_to_coverage(rgba: &RgbaImage, pad: u32) -> Option<(RgbaImage, (u32, u32))> {
    let (mut x0, mut y0, mut x1, mut y1) = (u32::MAX, u32::MAX, 0u32, 0u32);
    for (x, y, px) in rgba.enumerate_pixels() {
        if px.0[3] > 0 {
            x0 = x0.min(x);
            y0 = y0.min(y);
            x1 = x1.max(x + 1);
            y1 = y1.max(y + 1);
        }
    }
    if x1 == 0 {
        return None;
    }
    let x0 = x0.saturating_sub(pad);
    let y0 = y0.saturating_sub(pad);
    let x1 = (x1 + pad).min(rgba.width());
    let y1 = (y1 + pad).min(rgba.height());
    let crop = image::imageops::crop_imm(rgba, x0, y0, x1 - x0, y1 - y0).to_image();
    Some((crop, (x0, y0)))
}

/// A layer's pixels before placement.
#[derive(Clone, Debug)]
pub struct RasterLayer {
    /// Colors flattened on white.
    pub bitmap: RgbImage,
    /// Ink coverage of `bitmap`.
    pub mask: InkMask,
    /// Scene position of the bitmap's top-left corner for geometry drawn in scene coordinates.
    pub natural_origin: Option<Point>,
}

impl RasterLayer {
    fn from_coverage(rgba: &RgbaImage, natural_origin: Option<Point>) -> Self {
        Self {
            bitmap: flatten_on_white(rgba),
            mask: InkMask::from_alpha(rgba),
            natural_origin,
        }
    }

    fn blank() -> Self {
        Self {
            bitmap: RgbImage::from_pixel(1, 1, Rgb([255, 255, 255])),
            mask: InkMask::empty(1, 1),
            natural_origin: None,
        }
    }
}

/// What a rasterizer needs besides the layer itself.
#[derive(Clone, Copy, Debug)]
pub struct RasterContext<'a> {
    /// Fonts for text layers.
    pub fonts: &'a FontCache,
    /// Directory image paths are resolved against.
    pub assets_root: &'a Path,
    /// Ink detection for bitmap layers.
    pub ink: &'a InkThreshold,
}

/// Turn a layer definition into a bitmap and its ink mask.
pub fn rasterize(def: &LayerDef, ctx: &RasterContext<'_>) -> ChalkResult<RasterLayer> {
    match &def.kind {
        LayerKind::Image { image_path } => {
            let path = ctx.assets_root.join(image_path);
            let decoded = image::open(&path).map_err(|e| {
                ChalkError::rasterize(format!("failed to decode image '{}': {e}", path.display()))
            })?;
            let bitmap = flatten_on_white(&decoded.to_rgba8());
            let mask = InkMask::from_luma(&bitmap, ctx.ink);
            Ok(RasterLayer {
                bitmap,
                mask,
                natural_origin: None,
            })
        }
        LayerKind::Text(text) => {
            let doc = svg::text_svg(text);
            let rgba = render_svg(&doc, ctx.fonts)?;
            match trim_to_coverage(&rgba, 2) {
                Some((crop, _)) => Ok(RasterLayer::from_coverage(&crop, None)),
                None => {
                    tracing::warn!(
                        font = %text.font,
                        "text rendered no glyphs (missing font?), layer is blank"
                    );
                    Ok(RasterLayer::blank())
                }
            }
        }
        LayerKind::Shape(shape) => {
            let coverage = render_svg(&svg::shape_svg(shape), ctx.fonts)?;
            Ok(RasterLayer::from_coverage(&coverage, None))
        }
        LayerKind::Arrow {
            start,
            end,
            color,
            stroke_width,
            head_size,
        } => {
            let doc = svg::arrow_svg(
                start.to_point(),
                end.to_point(),
                *color,
                *stroke_width,
                *head_size,
            );
            Ok(RasterLayer::from_coverage(
                &render_svg(&doc, ctx.fonts)?,
                doc.origin,
            ))
        }
        LayerKind::Stroke {
            points,
            color,
            stroke_width,
            smooth,
        } => {
            let pts: Vec<Point> = points.iter().map(|p| p.to_point()).collect();
            let doc = svg::stroke_svg(&pts, *color, *stroke_width, *smooth);
            Ok(RasterLayer::from_coverage(
                &render_svg(&doc, ctx.fonts)?,
                doc.origin,
            ))
        }
    }
}

/// Resolve placement for a rasterized layer.
///
/// An explicit `position` wins; otherwise geometry in scene coordinates keeps its natural
/// origin and everything else starts at the scene origin.
pub fn place(def: &LayerDef, raster: RasterLayer) -> ChalkResult<PlacedLayer> {
    let (position, anchor) = match (def.position, raster.natural_origin) {
        (Some(p), _) => (p.to_point(), def.anchor),
        (None, Some(o)) => (o, Anchor::TopLeft),
        (None, None) => (Point::ZERO, def.anchor),
    };
    let placement = Placement {
        position,
        anchor,
        width: def.width,
        height: def.height,
        scale: def.scale,
    };
    PlacedLayer::place(
        raster.bitmap,
        raster.mask,
        &placement,
        def.opacity,
        def.z_index,
        def.intelligent_eraser,
    )
}

#[cfg(test)]
#[path = "../../tests/unit/layer/raster.rs"]
mod tests;
