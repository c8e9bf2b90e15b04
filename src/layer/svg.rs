use kurbo::{BezPath, Point, Rect, Shape as _};

use crate::foundation::color::ColorDef;
use crate::layer::model::{ShapeDef, ShapeKind, TextAlign, TextDef, TextStyle};

/// Blank margin around generated geometry so strokes are never clipped.
const MARGIN: f64 = 4.0;

/// An SVG document plus the scene position of its top-left corner when the geometry carries
/// absolute coordinates.
#[derive(Clone, Debug, PartialEq)]
pub struct SvgDoc {
    /// Serialized SVG markup.
    pub source: String,
    /// Document width in pixels.
    pub width: u32,
    /// Document height in pixels.
    pub height: u32,
    /// Scene position of the document's top-left corner, for absolute geometry.
    pub origin: Option<Point>,
}

fn document(width: u32, height: u32, body: &str) -> String {
    format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}" viewBox="0 0 {width} {height}">{body}</svg>"#
    )
}

pub(crate) fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    out
}

/// Text block on a generous page; the rasterizer trims it to the inked area.
pub fn text_svg(def: &TextDef) -> SvgDoc {
    let lines: Vec<&str> = def.text.split('\n').collect();
    let longest = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0) as f64;
    let advance = def.size * def.line_height;
    let pad = def.size;
    let width = (longest * def.size + 2.0 * pad).ceil().max(1.0) as u32;
    let height = (advance * lines.len() as f64 + 2.0 * pad).ceil().max(1.0) as u32;

    let (anchor, x) = match def.align {
        TextAlign::Left => ("start", pad),
        TextAlign::Center => ("middle", f64::from(width) / 2.0),
        TextAlign::Right => ("end", f64::from(width) - pad),
    };
    let (weight, slant) = match def.style {
        TextStyle::Normal => ("normal", "normal"),
        TextStyle::Bold => ("bold", "normal"),
        TextStyle::Italic => ("normal", "italic"),
        TextStyle::BoldItalic => ("bold", "italic"),
    };

    let mut spans = String::new();
    for (i, line) in lines.iter().enumerate() {
        let y = pad + def.size + advance * i as f64;
        spans.push_str(&format!(
            r#"<tspan x="{x}" y="{y}">{}</tspan>"#,
            escape_xml(line)
        ));
    }
    let body = format!(
        r#"<text font-family="{}" font-size="{}" font-weight="{weight}" font-style="{slant}" text-anchor="{anchor}" fill="{}" xml:space="preserve">{spans}</text>"#,
        escape_xml(&def.font),
        def.size,
        def.color.to_hex(),
    );
    SvgDoc {
        source: document(width, height, &body),
        width,
        height,
        origin: None,
    }
}

fn paint_attrs(stroke: ColorDef, stroke_width: f64, fill: Option<ColorDef>) -> String {
    let fill = fill.map_or_else(|| "none".to_owned(), ColorDef::to_hex);
    format!(
        r#"fill="{fill}" stroke="{}" stroke-width="{stroke_width}" stroke-linecap="round" stroke-linejoin="round""#,
        stroke.to_hex()
    )
}

/// Closed or open outline from vertices.
fn polyline(points: &[Point], closed: bool) -> BezPath {
    let mut path = BezPath::new();
    if let Some((first, rest)) = points.split_first() {
        path.move_to(*first);
        for p in rest {
            path.line_to(*p);
        }
        if closed {
            path.close_path();
        }
    }
    path
}

/// Primitive drawn inside its own box, offset by the stroke margin.
pub fn shape_svg(def: &ShapeDef) -> SvgDoc {
    let inset = MARGIN + def.stroke_width / 2.0;
    let size = def.size.map(|s| (s.x.max(1.0), s.y.max(1.0))).unwrap_or((100.0, 100.0));
    let element = match def.shape {
        ShapeKind::Rect => {
            let rect = Rect::new(inset, inset, inset + size.0, inset + size.1);
            (rect.to_path(0.1), rect.max_x() + inset, rect.max_y() + inset)
        }
        ShapeKind::Circle => {
            let r = def.radius.unwrap_or(size.0.min(size.1) / 2.0);
            let c = kurbo::Circle::new((inset + r, inset + r), r);
            (c.to_path(0.1), 2.0 * (inset + r), 2.0 * (inset + r))
        }
        ShapeKind::Ellipse => {
            let rect = Rect::new(inset, inset, inset + size.0, inset + size.1);
            let e = kurbo::Ellipse::from_rect(rect);
            (e.to_path(0.1), rect.max_x() + inset, rect.max_y() + inset)
        }
        ShapeKind::Triangle => {
            let pts = [
                Point::new(inset + size.0 / 2.0, inset),
                Point::new(inset + size.0, inset + size.1),
                Point::new(inset, inset + size.1),
            ];
            (polyline(&pts, true), size.0 + 2.0 * inset, size.1 + 2.0 * inset)
        }
        ShapeKind::Line | ShapeKind::Polygon => {
            let pts: Vec<Point> = def.points.iter().map(|p| p.to_point()).collect();
            let bbox = bounds(&pts);
            let shifted: Vec<Point> = pts
                .iter()
                .map(|p| Point::new(p.x - bbox.x0 + inset, p.y - bbox.y0 + inset))
                .collect();
            let closed = def.shape == ShapeKind::Polygon;
            (
                polyline(&shifted, closed),
                bbox.width() + 2.0 * inset,
                bbox.height() + 2.0 * inset,
            )
        }
    };
    let (path, w, h) = element;
    let fill = if def.shape == ShapeKind::Line {
        None
    } else {
        def.fill_color
    };
    let width = w.ceil().max(1.0) as u32;
    let height = h.ceil().max(1.0) as u32;
    let body = format!(
        r#"<path d="{}" {}/>"#,
        path.to_svg(),
        paint_attrs(def.color, def.stroke_width, fill)
    );
    SvgDoc {
        source: document(width, height, &body),
        width,
        height,
        origin: None,
    }
}

fn bounds(points: &[Point]) -> Rect {
    let mut it = points.iter();
    let Some(first) = it.next() else {
        return Rect::ZERO;
    };
    it.fold(Rect::from_points(*first, *first), |r, p| r.union_pt(*p))
}

/// Geometry in scene coordinates, rendered on a page that starts at its padded bounding box.
fn absolute_doc(paths: &[(BezPath, String)], pad: f64) -> SvgDoc {
    let mut bbox: Option<Rect> = None;
    for (p, _) in paths {
        let b = p.bounding_box();
        bbox = Some(bbox.map_or(b, |acc| acc.union(b)));
    }
    let bbox = bbox.unwrap_or(Rect::ZERO).inflate(pad, pad);
    let origin = Point::new(bbox.x0.floor(), bbox.y0.floor());
    let width = (bbox.x1 - origin.x).ceil().max(1.0) as u32;
    let height = (bbox.y1 - origin.y).ceil().max(1.0) as u32;

    let mut body = format!(
        r#"<g transform="translate({} {})">"#,
        -origin.x, -origin.y
    );
    for (p, attrs) in paths {
        body.push_str(&format!(r#"<path d="{}" {attrs}/>"#, p.to_svg()));
    }
    body.push_str("</g>");
    SvgDoc {
        source: document(width, height, &body),
        width,
        height,
        origin: Some(origin),
    }
}

/// Straight arrow from `start` to `end` with a filled triangular head.
pub fn arrow_svg(
    start: Point,
    end: Point,
    color: ColorDef,
    stroke_width: f64,
    head_size: f64,
) -> SvgDoc {
    let mut shaft = BezPath::new();
    shaft.move_to(start);
    shaft.line_to(end);

    let dir = end - start;
    let len = dir.hypot();
    let mut paths = vec![(shaft, paint_attrs(color, stroke_width, None))];
    if len > 0.0 && head_size > 0.0 {
        let u = dir / len;
        let n = kurbo::Vec2::new(-u.y, u.x);
        let back = end - u * head_size;
        let head = polyline(
            &[
                end,
                back + n * (head_size / 2.0),
                back - n * (head_size / 2.0),
            ],
            true,
        );
        paths.push((head, paint_attrs(color, 1.0, Some(color))));
    }
    absolute_doc(&paths, MARGIN + stroke_width.max(head_size / 2.0))
}

/// Freehand stroke through `points`.
///
/// With `smooth`, the path runs through the midpoints of consecutive segments with the
/// vertices as quadratic control points.
pub fn stroke_svg(points: &[Point], color: ColorDef, stroke_width: f64, smooth: bool) -> SvgDoc {
    let path = if smooth && points.len() > 2 {
        let mut path = BezPath::new();
        path.move_to(points[0]);
        for w in points.windows(2).skip(1) {
            let mid = w[0].midpoint(w[1]);
            path.quad_to(w[0], mid);
        }
        if let Some(last) = points.last() {
            path.line_to(*last);
        }
        path
    } else {
        polyline(points, false)
    };
    absolute_doc(
        &[(path, paint_attrs(color, stroke_width, None))],
        MARGIN + stroke_width,
    )
}

#[cfg(test)]
#[path = "../../tests/unit/layer/svg.rs"]
mod tests;
