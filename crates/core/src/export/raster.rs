//! PNG export: rasterizes shapes from a command list into an RGBA buffer.
//!
//! Text is not rasterized; frame labels survive only in the SVG export.

use std::io::Cursor;

use image::{ImageFormat, Rgba, RgbaImage};
use tracelens_protocol::{Color, Point, Rect, RenderCommand, Theme};

use super::{ExportError, MAX_EXPORT_EDGE, arrow_head};

struct Canvas {
    image: RgbaImage,
    clip: Rect,
    full: Rect,
}

impl Canvas {
    fn new(width: u32, height: u32) -> Self {
        let full = Rect::new(0.0, 0.0, f64::from(width), f64::from(height));
        Self {
            image: RgbaImage::new(width, height),
            clip: full,
            full,
        }
    }

    /// Pixel range covered by `rect` after clipping, as `(x0, y0, x1, y1)`.
    fn pixel_span(&self, rect: &Rect) -> Option<(u32, u32, u32, u32)> {
        let r = rect.intersect(&self.clip)?;
        let x0 = r.x.round().max(0.0) as u32;
        let y0 = r.y.round().max(0.0) as u32;
        let x1 = (r.right().round() as u32).min(self.image.width());
        let y1 = (r.bottom().round() as u32).min(self.image.height());
        (x0 < x1 && y0 < y1).then_some((x0, y0, x1, y1))
    }

    fn blend(&mut self, x: u32, y: u32, color: Color) {
        let [r, g, b, a] = color.to_rgba8();
        if a == 0 {
            return;
        }
        let px = self.image.get_pixel_mut(x, y);
        if a == u8::MAX {
            *px = Rgba([r, g, b, a]);
            return;
        }
        let alpha = f32::from(a) / 255.0;
        let mix = |src: u8, dst: u8| (f32::from(src) * alpha + f32::from(dst) * (1.0 - alpha)).round() as u8;
        let Rgba([dr, dg, db, da]) = *px;
        let out_a = (alpha * 255.0 + f32::from(da) * (1.0 - alpha)).round() as u8;
        *px = Rgba([mix(r, dr), mix(g, dg), mix(b, db), out_a]);
    }

    fn fill_rect(&mut self, rect: &Rect, color: Color) {
        let Some((x0, y0, x1, y1)) = self.pixel_span(rect) else {
            return;
        };
        for y in y0..y1 {
            for x in x0..x1 {
                self.blend(x, y, color);
            }
        }
    }

    fn stroke_rect(&mut self, rect: &Rect, color: Color) {
        let edges = [
            Rect::new(rect.x, rect.y, rect.w, 1.0),
            Rect::new(rect.x, rect.bottom() - 1.0, rect.w, 1.0),
            Rect::new(rect.x, rect.y + 1.0, 1.0, (rect.h - 2.0).max(0.0)),
            Rect::new(rect.right() - 1.0, rect.y + 1.0, 1.0, (rect.h - 2.0).max(0.0)),
        ];
        for edge in &edges {
            self.fill_rect(edge, color);
        }
    }

    /// Stamp a `width`-sized square along the segment.
    fn line(&mut self, from: Point, to: Point, width: f64, color: Color) {
        let width = width.max(1.0);
        let (dx, dy) = (to.x - from.x, to.y - from.y);
        if dx.abs() < f64::EPSILON || dy.abs() < f64::EPSILON {
            // Axis-aligned: one rectangle, no overdraw of translucent paint.
            let x = from.x.min(to.x) - if dx.abs() < f64::EPSILON { width / 2.0 } else { 0.0 };
            let y = from.y.min(to.y) - if dy.abs() < f64::EPSILON { width / 2.0 } else { 0.0 };
            let w = if dx.abs() < f64::EPSILON { width } else { dx.abs() };
            let h = if dy.abs() < f64::EPSILON { width } else { dy.abs() };
            self.fill_rect(&Rect::new(x, y, w, h), color);
            return;
        }
        let steps = dx.abs().max(dy.abs()).ceil() as usize;
        for i in 0..=steps {
            let t = i as f64 / steps as f64;
            let c = Point::new(from.x + dx * t, from.y + dy * t);
            self.fill_rect(&Rect::new(c.x - width / 2.0, c.y - width / 2.0, width, width), color);
        }
    }

    fn triangle(&mut self, [a, b, c]: [Point; 3], color: Color) {
        let bbox = Rect::new(
            a.x.min(b.x).min(c.x),
            a.y.min(b.y).min(c.y),
            a.x.max(b.x).max(c.x) - a.x.min(b.x).min(c.x),
            a.y.max(b.y).max(c.y) - a.y.min(b.y).min(c.y),
        );
        let Some((x0, y0, x1, y1)) = self.pixel_span(&bbox) else {
            return;
        };
        let edge = |p: Point, q: Point, r: Point| (q.x - p.x) * (r.y - p.y) - (q.y - p.y) * (r.x - p.x);
        let area = edge(a, b, c);
        if area.abs() < f64::EPSILON {
            return;
        }
        for y in y0..y1 {
            for x in x0..x1 {
                let p = Point::new(f64::from(x) + 0.5, f64::from(y) + 0.5);
                let (w0, w1, w2) = (edge(b, c, p), edge(c, a, p), edge(a, b, p));
                let inside = if area > 0.0 {
                    w0 >= 0.0 && w1 >= 0.0 && w2 >= 0.0
                } else {
                    w0 <= 0.0 && w1 <= 0.0 && w2 <= 0.0
                };
                if inside {
                    self.blend(x, y, color);
                }
            }
        }
    }
}

/// Rasterize `commands` onto a `width` x `height` RGBA image.
pub fn render_raster(
    commands: &[RenderCommand],
    width: f64,
    height: f64,
    theme: Theme,
) -> Result<RgbaImage, ExportError> {
    let valid = |v: f64| v.is_finite() && v >= 1.0 && v <= f64::from(MAX_EXPORT_EDGE);
    if !valid(width) || !valid(height) {
        return Err(ExportError::Size { width, height });
    }
    let mut canvas = Canvas::new(width.round() as u32, height.round() as u32);

    for cmd in commands {
        match cmd {
            RenderCommand::Clear { paint } => {
                let full = canvas.full;
                canvas.fill_rect(&full, theme.paint(*paint));
            }
            RenderCommand::DrawRect {
                rect, paint, border, ..
            } => {
                canvas.fill_rect(rect, theme.paint(*paint));
                if let Some(border) = border {
                    canvas.stroke_rect(rect, theme.paint(*border));
                }
            }
            RenderCommand::DrawLine {
                from,
                to,
                paint,
                width,
            } => canvas.line(*from, *to, *width, theme.paint(*paint)),
            RenderCommand::DrawArrow {
                from,
                to,
                paint,
                width,
            } => {
                let color = theme.paint(*paint);
                canvas.line(*from, *to, *width, color);
                if let Some(head) = arrow_head(*from, *to, *width) {
                    canvas.triangle(head, color);
                }
            }
            RenderCommand::SetClip { rect } => {
                canvas.clip = rect.intersect(&canvas.full).unwrap_or(Rect::new(0.0, 0.0, 0.0, 0.0));
            }
            RenderCommand::ClearClip => canvas.clip = canvas.full,
            RenderCommand::DrawText { .. } | RenderCommand::BeginGroup { .. } | RenderCommand::EndGroup => {}
        }
    }
    Ok(canvas.image)
}

/// Rasterize and encode as PNG.
pub fn render_png(commands: &[RenderCommand], width: f64, height: f64, theme: Theme) -> Result<Vec<u8>, ExportError> {
    let image = render_raster(commands, width, height, theme)?;
    let mut bytes = Vec::new();
    image.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
    tracing::debug!(width, height, bytes = bytes.len(), commands = commands.len(), "encoded png");
    Ok(bytes)
}
