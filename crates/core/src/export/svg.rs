//! SVG export: converts `RenderCommand` lists into standalone SVG strings.

use std::fmt::Write;

use tracelens_protocol::{Color, RenderCommand, TextAlign, Theme};

use super::arrow_head;

enum Open {
    Group,
    Clip,
}

/// Render a list of commands as an SVG document string.
///
/// `width` and `height` define the SVG viewBox dimensions; `theme` resolves
/// semantic paints.
pub fn render_svg(commands: &[RenderCommand], width: f64, height: f64, theme: Theme) -> String {
    let mut svg = String::with_capacity(commands.len() * 160);
    let _ = write!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {width} {height}" width="{width}" height="{height}" style="font-family:system-ui,-apple-system,sans-serif">"#,
    );

    let mut open: Vec<Open> = Vec::new();
    let mut clip_ids = 0usize;

    for cmd in commands {
        match cmd {
            RenderCommand::Clear { paint } => {
                let _ = write!(
                    svg,
                    r#"<rect width="{width}" height="{height}" {}/>"#,
                    fill(theme.paint(*paint))
                );
            }
            RenderCommand::DrawRect {
                rect,
                paint,
                border,
                label,
                frame_id,
            } => {
                let _ = write!(
                    svg,
                    r#"<rect x="{}" y="{}" width="{}" height="{}" {}"#,
                    rect.x,
                    rect.y,
                    rect.w,
                    rect.h,
                    fill(theme.paint(*paint))
                );
                if let Some(border) = border {
                    let _ = write!(svg, r#" {} stroke-width="1""#, stroke(theme.paint(*border)));
                }
                if let Some(id) = frame_id {
                    let _ = write!(svg, r#" data-frame-id="{id}""#);
                }
                match label {
                    Some(label) => {
                        let _ = write!(svg, "><title>{}</title></rect>", escape_xml(label));
                    }
                    None => svg.push_str("/>"),
                }
            }
            RenderCommand::DrawText {
                position,
                text,
                paint,
                font_size,
                align,
            } => {
                let anchor = match align {
                    TextAlign::Left => "start",
                    TextAlign::Center => "middle",
                    TextAlign::Right => "end",
                };
                let _ = write!(
                    svg,
                    r#"<text x="{}" y="{}" font-size="{font_size}" text-anchor="{anchor}" dominant-baseline="central" {}>{}</text>"#,
                    position.x,
                    position.y,
                    fill(theme.paint(*paint)),
                    escape_xml(text),
                );
            }
            RenderCommand::DrawLine {
                from,
                to,
                paint,
                width: line_width,
            } => {
                let _ = write!(
                    svg,
                    r#"<line x1="{}" y1="{}" x2="{}" y2="{}" {} stroke-width="{line_width}"/>"#,
                    from.x,
                    from.y,
                    to.x,
                    to.y,
                    stroke(theme.paint(*paint)),
                );
            }
            RenderCommand::DrawArrow {
                from,
                to,
                paint,
                width: line_width,
            } => {
                let color = theme.paint(*paint);
                let _ = write!(
                    svg,
                    r#"<line x1="{}" y1="{}" x2="{}" y2="{}" {} stroke-width="{line_width}"/>"#,
                    from.x,
                    from.y,
                    to.x,
                    to.y,
                    stroke(color),
                );
                if let Some([a, b, c]) = arrow_head(*from, *to, *line_width) {
                    let _ = write!(
                        svg,
                        r#"<polygon points="{},{} {},{} {},{}" {}/>"#,
                        a.x,
                        a.y,
                        b.x,
                        b.y,
                        c.x,
                        c.y,
                        fill(color),
                    );
                }
            }
            RenderCommand::SetClip { rect } => {
                close_clip(&mut svg, &mut open);
                clip_ids += 1;
                let _ = write!(
                    svg,
                    r#"<clipPath id="clip{clip_ids}"><rect x="{}" y="{}" width="{}" height="{}"/></clipPath><g clip-path="url(#clip{clip_ids})">"#,
                    rect.x, rect.y, rect.w, rect.h,
                );
                open.push(Open::Clip);
            }
            RenderCommand::ClearClip => close_clip(&mut svg, &mut open),
            RenderCommand::BeginGroup { id, .. } => {
                let _ = write!(svg, r#"<g id="{}">"#, escape_xml(id));
                open.push(Open::Group);
            }
            RenderCommand::EndGroup => {
                // Clips opened inside the group end with it.
                while let Some(top) = open.pop() {
                    svg.push_str("</g>");
                    if matches!(top, Open::Group) {
                        break;
                    }
                }
            }
        }
    }

    for _ in open.drain(..) {
        svg.push_str("</g>");
    }
    svg.push_str("</svg>");
    svg
}

fn close_clip(svg: &mut String, open: &mut Vec<Open>) {
    if matches!(open.last(), Some(Open::Clip)) {
        open.pop();
        svg.push_str("</g>");
    }
}

fn fill(color: Color) -> String {
    paint_attr("fill", color)
}

fn stroke(color: Color) -> String {
    paint_attr("stroke", color)
}

fn paint_attr(attr: &str, color: Color) -> String {
    if color.a < 1.0 {
        format!(r#"{attr}="{}" {attr}-opacity="{:.3}""#, color.to_hex(), color.a)
    } else {
        format!(r#"{attr}="{}""#, color.to_hex())
    }
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
