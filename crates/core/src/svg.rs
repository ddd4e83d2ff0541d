//! SVG renderer: converts `RenderCommand` lists into standalone SVG strings.

use std::fmt::Write;

use bead_view_protocol::{LineStyle, Point, RenderCommand, TextAlign, ThemeToken};

/// Render a list of commands as an SVG document string.
///
/// `width` and `height` define the SVG viewBox dimensions.
/// `dark` selects the palette for chart chrome; data colors are used as-is.
pub fn render_svg(commands: &[RenderCommand], width: f64, height: f64, dark: bool) -> String {
    let mut svg = String::with_capacity(commands.len() * 120);
    let _ = write!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {width} {height}" width="{width}" height="{height}" style="font-family:system-ui,-apple-system,sans-serif">"#,
    );

    for cmd in commands {
        match cmd {
            RenderCommand::DrawRect {
                rect,
                color,
                border_color,
            } => {
                let fill = resolve_color(*color, dark);
                let _ = write!(
                    svg,
                    r#"<rect x="{}" y="{}" width="{}" height="{}" fill="{fill}""#,
                    rect.x, rect.y, rect.w, rect.h,
                );
                if let Some(border) = border_color {
                    let _ = write!(svg, r#" stroke="{}""#, resolve_color(*border, dark));
                }
                svg.push_str("/>");
            }
            RenderCommand::DrawLine {
                from,
                to,
                color,
                width: line_width,
            } => {
                let stroke = resolve_color(*color, dark);
                let _ = write!(
                    svg,
                    r#"<line x1="{}" y1="{}" x2="{}" y2="{}" stroke="{stroke}" stroke-width="{line_width}"/>"#,
                    from.x, from.y, to.x, to.y,
                );
            }
            RenderCommand::DrawPolyline {
                points,
                color,
                width: line_width,
                style,
                hover,
            } => {
                let _ = write!(
                    svg,
                    r#"<polyline points="{}" fill="none" stroke="{}" stroke-width="{line_width}" stroke-linejoin="round""#,
                    format_points(points),
                    escape_xml(color.as_str()),
                );
                if *style == LineStyle::Dashed {
                    svg.push_str(r#" stroke-dasharray="6 4""#);
                }
                match hover {
                    Some(hover) => {
                        let _ = write!(svg, "><title>{}</title></polyline>", escape_xml(hover));
                    }
                    None => svg.push_str("/>"),
                }
            }
            RenderCommand::DrawText {
                text,
                position,
                color,
                font_size,
                align,
            } => {
                let fill = resolve_color(*color, dark);
                let anchor = match align {
                    TextAlign::Left => "start",
                    TextAlign::Center => "middle",
                    TextAlign::Right => "end",
                };
                let _ = write!(
                    svg,
                    r#"<text x="{}" y="{}" fill="{fill}" font-size="{font_size}" text-anchor="{anchor}">{}</text>"#,
                    position.x,
                    position.y,
                    escape_xml(text),
                );
            }
            RenderCommand::BeginGroup { id, label } => {
                let _ = write!(svg, r#"<g id="{}""#, escape_xml(id));
                if let Some(label) = label {
                    let _ = write!(svg, r#" aria-label="{}""#, escape_xml(label));
                }
                svg.push('>');
            }
            RenderCommand::EndGroup => svg.push_str("</g>"),
        }
    }

    svg.push_str("</svg>");
    svg
}

fn format_points(points: &[Point]) -> String {
    let mut out = String::with_capacity(points.len() * 14);
    for (i, p) in points.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        let _ = write!(out, "{:.2},{:.2}", p.x, p.y);
    }
    out
}

fn resolve_color(token: ThemeToken, dark: bool) -> &'static str {
    if dark {
        match token {
            ThemeToken::Background => "#1a1a2e",
            ThemeToken::PanelBackground => "#202033",
            ThemeToken::PanelBorder | ThemeToken::Axis => "#4a4a5e",
            ThemeToken::TextPrimary | ThemeToken::LegendText => "#ececec",
            ThemeToken::TextSecondary | ThemeToken::TickText => "#9e9e9e",
        }
    } else {
        match token {
            ThemeToken::Background => "#ffffff",
            ThemeToken::PanelBackground => "#f8f9fa",
            ThemeToken::PanelBorder => "#dee2e6",
            ThemeToken::Axis => "#6c757d",
            ThemeToken::TextPrimary | ThemeToken::LegendText => "#1a1a2e",
            ThemeToken::TextSecondary | ThemeToken::TickText => "#666677",
        }
    }
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use bead_view_protocol::{Color, Rect};

    fn polyline(style: LineStyle, hover: Option<&str>) -> RenderCommand {
        RenderCommand::DrawPolyline {
            points: vec![Point::new(0.0, 1.0), Point::new(2.5, 3.0)],
            color: Color::new("red"),
            width: 1.5,
            style,
            hover: hover.map(str::to_string),
        }
    }

    #[test]
    fn basic_svg_output() {
        let commands = vec![
            RenderCommand::DrawRect {
                rect: Rect::new(10.0, 20.0, 100.0, 18.0),
                color: ThemeToken::Background,
                border_color: None,
            },
            polyline(LineStyle::Solid, None),
        ];
        let svg = render_svg(&commands, 800.0, 400.0, true);
        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>"));
        assert!(svg.contains("#1a1a2e"));
        assert!(svg.contains(r#"points="0.00,1.00 2.50,3.00""#));
        assert!(svg.contains(r#"stroke="red""#));
        assert!(!svg.contains("stroke-dasharray"));
    }

    #[test]
    fn dashed_polyline_with_hover() {
        let svg = render_svg(
            &[polyline(LineStyle::Dashed, Some("Bead Number: 3\nClass: OK"))],
            100.0,
            100.0,
            false,
        );
        assert!(svg.contains("stroke-dasharray"));
        assert!(svg.contains("<title>Bead Number: 3\nClass: OK</title></polyline>"));
    }

    #[test]
    fn escapes_xml_entities() {
        let commands = vec![RenderCommand::DrawText {
            position: Point::new(0.0, 0.0),
            text: "Class <Hot & Melt>".into(),
            color: ThemeToken::LegendText,
            font_size: 11.0,
            align: TextAlign::Left,
        }];
        let svg = render_svg(&commands, 400.0, 100.0, false);
        assert!(svg.contains("Class &lt;Hot &amp; Melt&gt;"));
    }

    #[test]
    fn groups_nest() {
        let commands = vec![
            RenderCommand::BeginGroup {
                id: "legend".into(),
                label: Some("Legend".into()),
            },
            RenderCommand::EndGroup,
        ];
        let svg = render_svg(&commands, 10.0, 10.0, false);
        assert!(svg.contains(r#"<g id="legend" aria-label="Legend"></g>"#));
    }
}
