use bead_view_protocol::{
    Channel, Point, Rect, RenderCommand, Segment, TextAlign, ThemeToken, Viewport,
};

use crate::config::ChartOptions;
use crate::model::RawSeries;
use crate::views::overlay::Overlay;

const MARGIN_LEFT: f64 = 80.0;
const MARGIN_TOP: f64 = 44.0;
const MARGIN_BOTTOM: f64 = 40.0;
const PANEL_GAP: f64 = 36.0;
const LEGEND_WIDTH: f64 = 180.0;
const LEGEND_ROW: f64 = 18.0;
const SWATCH: f64 = 22.0;
const TITLE_SIZE: f64 = 16.0;
const FONT_SIZE: f64 = 11.0;

/// Render an overlay as two vertically stacked line charts (NIR on top, VIS
/// below) sharing the sample index as x axis, with a legend column on the
/// right.
///
/// Segments are drawn in overlay order, so highlights paint over the
/// baselines and over each other in emission order.
pub fn render_chart(
    series: &RawSeries,
    overlay: &Overlay,
    viewport: &Viewport,
    options: &ChartOptions,
) -> Vec<RenderCommand> {
    let plot_width = viewport.width - MARGIN_LEFT - LEGEND_WIDTH;
    let panel_height = (viewport.height - MARGIN_TOP - MARGIN_BOTTOM - PANEL_GAP) / 2.0;
    if series.is_empty() || plot_width <= 0.0 || panel_height <= 0.0 {
        return Vec::new();
    }

    let panels = Channel::ALL.map(|channel| {
        let top = MARGIN_TOP + channel.column() as f64 * (panel_height + PANEL_GAP);
        Panel::new(
            series,
            channel,
            Rect::new(MARGIN_LEFT, top, plot_width, panel_height),
        )
    });

    let mut commands = Vec::with_capacity(overlay.segments.len() + 32);

    commands.push(RenderCommand::BeginGroup {
        id: "chart".into(),
        label: Some(overlay.source_name.clone()),
    });
    commands.push(RenderCommand::DrawRect {
        rect: Rect::new(0.0, 0.0, viewport.width, viewport.height),
        color: ThemeToken::Background,
        border_color: None,
    });
    commands.push(RenderCommand::DrawText {
        position: Point::new(viewport.width / 2.0, MARGIN_TOP / 2.0 + TITLE_SIZE / 3.0),
        text: options.title_for(&overlay.label_column),
        color: ThemeToken::TextPrimary,
        font_size: TITLE_SIZE,
        align: TextAlign::Center,
    });

    for panel in &panels {
        panel.render_axes(series, &mut commands);
    }

    commands.push(RenderCommand::BeginGroup {
        id: "traces".into(),
        label: None,
    });
    for segment in &overlay.segments {
        let panel = &panels[segment.channel.column()];
        let width = if segment.is_baseline() {
            options.line_width
        } else {
            options.highlight_width
        };
        panel.render_segment(series, segment, width, &mut commands);
    }
    commands.push(RenderCommand::EndGroup);

    render_legend(overlay, viewport, options, &mut commands);

    commands.push(RenderCommand::EndGroup);
    commands
}

struct Panel {
    channel: Channel,
    rect: Rect,
    x_scale: f64,
    lo: f64,
    hi: f64,
}

impl Panel {
    fn new(series: &RawSeries, channel: Channel, rect: Rect) -> Self {
        let (lo, hi) = match series.bounds(channel) {
            Some((lo, hi)) if lo < hi => (lo, hi),
            Some((v, _)) => (v - 1.0, v + 1.0),
            None => (0.0, 1.0),
        };
        let last = series.len().saturating_sub(1).max(1) as f64;
        Self {
            channel,
            rect,
            x_scale: rect.w / last,
            lo,
            hi,
        }
    }

    fn point(&self, index: usize, value: f64) -> Point {
        let x = self.rect.x + index as f64 * self.x_scale;
        let y = self.rect.bottom() - (value - self.lo) / (self.hi - self.lo) * self.rect.h;
        Point::new(x, y)
    }

    fn render_axes(&self, series: &RawSeries, out: &mut Vec<RenderCommand>) {
        let r = self.rect;
        out.push(RenderCommand::BeginGroup {
            id: format!("panel-{}", self.channel.to_string().to_lowercase()),
            label: Some(self.channel.to_string()),
        });
        out.push(RenderCommand::DrawRect {
            rect: r,
            color: ThemeToken::PanelBackground,
            border_color: Some(ThemeToken::PanelBorder),
        });
        out.push(RenderCommand::DrawLine {
            from: Point::new(r.x, r.y),
            to: Point::new(r.x, r.bottom()),
            color: ThemeToken::Axis,
            width: 1.0,
        });
        out.push(RenderCommand::DrawLine {
            from: Point::new(r.x, r.bottom()),
            to: Point::new(r.right(), r.bottom()),
            color: ThemeToken::Axis,
            width: 1.0,
        });

        // y title above the panel, y range at the left edge
        out.push(RenderCommand::DrawText {
            position: Point::new(r.x, r.y - 6.0),
            text: format!("{} Signal", series.channel_name(self.channel)),
            color: ThemeToken::TextSecondary,
            font_size: FONT_SIZE,
            align: TextAlign::Left,
        });
        for (value, y) in [(self.hi, r.y + FONT_SIZE), (self.lo, r.bottom())] {
            out.push(RenderCommand::DrawText {
                position: Point::new(r.x - 6.0, y),
                text: format_tick(value),
                color: ThemeToken::TickText,
                font_size: FONT_SIZE,
                align: TextAlign::Right,
            });
        }

        let last = series.len().saturating_sub(1);
        for (index, align) in [(0, TextAlign::Left), (last, TextAlign::Right)] {
            out.push(RenderCommand::DrawText {
                position: Point::new(self.point(index, self.lo).x, r.bottom() + FONT_SIZE + 4.0),
                text: index.to_string(),
                color: ThemeToken::TickText,
                font_size: FONT_SIZE,
                align,
            });
        }
        out.push(RenderCommand::DrawText {
            position: Point::new(r.x + r.w / 2.0, r.bottom() + FONT_SIZE + 4.0),
            text: "Index".into(),
            color: ThemeToken::TextSecondary,
            font_size: FONT_SIZE,
            align: TextAlign::Center,
        });
        out.push(RenderCommand::EndGroup);
    }

    /// One polyline per run of finite samples; NaN cells leave a gap.
    fn render_segment(
        &self,
        series: &RawSeries,
        segment: &Segment,
        width: f64,
        out: &mut Vec<RenderCommand>,
    ) {
        let Some(values) = series.slice(self.channel, segment.range) else {
            return;
        };
        let mut runs: Vec<Vec<Point>> = vec![Vec::new()];
        for (offset, &value) in values.iter().enumerate() {
            if value.is_finite() {
                if let Some(run) = runs.last_mut() {
                    run.push(self.point(segment.range.start + offset, value));
                }
            } else if runs.last().is_some_and(|run| !run.is_empty()) {
                runs.push(Vec::new());
            }
        }
        for points in runs.into_iter().filter(|run| !run.is_empty()) {
            out.push(RenderCommand::DrawPolyline {
                points,
                color: segment.color.clone(),
                width,
                style: segment.style,
                hover: segment.hover.clone(),
            });
        }
    }
}

fn render_legend(
    overlay: &Overlay,
    viewport: &Viewport,
    options: &ChartOptions,
    out: &mut Vec<RenderCommand>,
) {
    let x = viewport.width - LEGEND_WIDTH + 16.0;
    out.push(RenderCommand::BeginGroup {
        id: "legend".into(),
        label: Some("Legend".into()),
    });
    let entries = overlay
        .segments
        .iter()
        .filter_map(|s| s.legend.as_deref().map(|text| (s, text)));
    for (row, (segment, text)) in entries.enumerate() {
        let y = MARGIN_TOP + row as f64 * LEGEND_ROW;
        out.push(RenderCommand::DrawPolyline {
            points: vec![Point::new(x, y), Point::new(x + SWATCH, y)],
            color: segment.color.clone(),
            width: options.highlight_width.max(2.0),
            style: segment.style,
            hover: None,
        });
        out.push(RenderCommand::DrawText {
            position: Point::new(x + SWATCH + 6.0, y + FONT_SIZE / 3.0),
            text: text.to_string(),
            color: ThemeToken::LegendText,
            font_size: FONT_SIZE,
            align: TextAlign::Left,
        });
    }
    out.push(RenderCommand::EndGroup);
}

fn format_tick(value: f64) -> String {
    let magnitude = value.abs();
    if magnitude >= 10_000.0 || (magnitude > 0.0 && magnitude < 0.01) {
        format!("{value:.2e}")
    } else if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        format!("{value:.2}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ViewerConfig;
    use crate::parsers::{parse_bead_table, parse_series};
    use crate::views::overlay::build_overlay;

    fn fixture() -> (RawSeries, Overlay) {
        let series = parse_series(
            b"NIR,VIS\n0,1\n1,2\n2,\n3,4\n4,5\n5,6\n",
            Some("a.csv"),
        )
        .unwrap();
        let table = parse_bead_table(
            b"file,start_index,end_index,bead_number,refined_label\n\
              a.csv,0,1,1,OK\n\
              a.csv,1,4,2,Weak Weld\n",
        )
        .unwrap();
        let overlay =
            build_overlay(&series, &table, "a.csv", "refined_label", &ViewerConfig::default())
                .unwrap();
        (series, overlay)
    }

    fn polylines(cmds: &[RenderCommand]) -> Vec<&RenderCommand> {
        cmds.iter()
            .filter(|c| matches!(c, RenderCommand::DrawPolyline { hover: Some(_), .. }))
            .collect()
    }

    #[test]
    fn draws_traces_in_overlay_order() {
        let (series, overlay) = fixture();
        let cmds = render_chart(&series, &overlay, &Viewport::default(), &ChartOptions::default());
        assert!(matches!(cmds.first(), Some(RenderCommand::BeginGroup { .. })));
        assert!(matches!(cmds.last(), Some(RenderCommand::EndGroup)));

        // OK: NIR + VIS. Weak Weld: NIR + VIS split by the NaN at index 2.
        let traces = polylines(&cmds);
        assert_eq!(traces.len(), 5);
        let RenderCommand::DrawPolyline { color, points, .. } = traces[0] else {
            unreachable!()
        };
        assert_eq!(color.as_str(), "red");
        assert_eq!(points.len(), 2);
    }

    #[test]
    fn legend_lists_baseline_then_classes() {
        let (series, overlay) = fixture();
        let cmds = render_chart(&series, &overlay, &Viewport::default(), &ChartOptions::default());
        let legend_start = cmds
            .iter()
            .position(|c| matches!(c, RenderCommand::BeginGroup { id, .. } if id == "legend"))
            .unwrap();
        let texts: Vec<&str> = cmds[legend_start..]
            .iter()
            .filter_map(|c| match c {
                RenderCommand::DrawText { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(texts, vec!["All Data", "Class OK", "Class Weak Weld"]);
    }

    #[test]
    fn title_names_the_label_column() {
        let (series, overlay) = fixture();
        let cmds = render_chart(&series, &overlay, &Viewport::default(), &ChartOptions::default());
        assert!(cmds.iter().any(|c| matches!(
            c,
            RenderCommand::DrawText { text, .. } if text.contains("(refined_label)")
        )));
        assert!(cmds.iter().any(|c| matches!(
            c,
            RenderCommand::DrawText { text, .. } if text == "NIR Signal"
        )));
    }

    #[test]
    fn points_stay_inside_panels() {
        let (series, overlay) = fixture();
        let vp = Viewport::new(800.0, 600.0);
        let cmds = render_chart(&series, &overlay, &vp, &ChartOptions::default());
        for cmd in polylines(&cmds) {
            let RenderCommand::DrawPolyline { points, .. } = cmd else {
                continue;
            };
            for p in points {
                assert!(p.x >= MARGIN_LEFT - 1e-9 && p.x <= vp.width - LEGEND_WIDTH + 1e-9);
                assert!(p.y >= MARGIN_TOP - 1e-9 && p.y <= vp.height - MARGIN_BOTTOM + 1e-9);
            }
        }
    }

    #[test]
    fn tiny_viewport_renders_nothing() {
        let (series, overlay) = fixture();
        let cmds = render_chart(&series, &overlay, &Viewport::new(100.0, 50.0), &ChartOptions::default());
        assert!(cmds.is_empty());
    }

    #[test]
    fn tick_formatting() {
        assert_eq!(format_tick(5.0), "5");
        assert_eq!(format_tick(0.25), "0.25");
        assert_eq!(format_tick(123456.0), "1.23e5");
    }
}
