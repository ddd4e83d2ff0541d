use std::io::{Stdout, stdout};
use std::time::Duration;

use anyhow::Result;
use bead_view_core::model::{RawSeries, Rendered, Session, SessionError};
use bead_view_core::source::SeriesArchive;
use bead_view_protocol::{Channel, Color as CssColor, LineStyle, Segment};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Layout, Rect},
    style::{Color, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Paragraph},
};

/// Interactive state: which recording and label column are selected, and the
/// last render error, if any.
pub struct Dashboard {
    archive: Box<dyn SeriesArchive>,
    session: Session,
    members: Vec<String>,
    columns: Vec<String>,
    member: usize,
    column: usize,
    error: Option<String>,
}

impl Dashboard {
    pub fn new(
        archive: Box<dyn SeriesArchive>,
        session: Session,
        members: Vec<String>,
        columns: Vec<String>,
        member: usize,
        column: usize,
    ) -> Self {
        let mut dashboard = Self {
            archive,
            session,
            members,
            columns,
            member,
            column,
            error: None,
        };
        dashboard.update();
        dashboard
    }

    fn member_name(&self) -> &str {
        self.members.get(self.member).map_or("", String::as_str)
    }

    fn column_name(&self) -> &str {
        self.columns.get(self.column).map_or("", String::as_str)
    }

    /// Rebuild the chart for the current selection. The recording is only
    /// reloaded when it changed; otherwise the overlay is rebuilt in place.
    fn update(&mut self) {
        let member = self.member_name().to_string();
        let column = self.column_name().to_string();
        let stale = self
            .session
            .current()
            .is_none_or(|r| r.overlay.source_name != member);
        let result = if stale {
            self.session
                .render(&*self.archive, &member, &column)
                .map(|_| ())
        } else {
            self.session.refresh(&column).map(|_| ())
        };
        self.record(result);
    }

    fn record(&mut self, result: Result<(), SessionError>) {
        self.error = result.err().map(|e| {
            tracing::warn!(error = %e, "render failed");
            e.to_string()
        });
    }

    /// Apply one key press. Returns `false` once the user asked to quit.
    pub fn handle_key(&mut self, code: KeyCode) -> bool {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return false,
            KeyCode::Left => {
                self.member = step_back(self.member, self.members.len());
                self.update();
            }
            KeyCode::Right => {
                self.member = step_forward(self.member, self.members.len());
                self.update();
            }
            KeyCode::Up => {
                self.column = step_back(self.column, self.columns.len());
                self.update();
            }
            KeyCode::Down => {
                self.column = step_forward(self.column, self.columns.len());
                self.update();
            }
            KeyCode::Char('c') => {
                let mut options = self.session.config().options;
                options.highlight = !options.highlight;
                self.session.set_options(options);
                self.update();
            }
            KeyCode::Char('d') => {
                let mut options = self.session.config().options;
                options.dash_test_rows = Some(!self.session.config().dash_test_rows());
                self.session.set_options(options);
                self.update();
            }
            _ => {}
        }
        true
    }
}

fn step_forward(index: usize, len: usize) -> usize {
    if len == 0 { 0 } else { (index + 1) % len }
}

fn step_back(index: usize, len: usize) -> usize {
    if len == 0 { 0 } else { (index + len - 1) % len }
}

fn terminal_color(color: &CssColor) -> Color {
    if let Some((r, g, b)) = color.hex_rgb() {
        return Color::Rgb(r, g, b);
    }
    match color.as_str().to_ascii_lowercase().as_str() {
        "red" => Color::Red,
        "green" => Color::Green,
        "blue" => Color::Blue,
        "purple" | "magenta" => Color::Magenta,
        "orange" => Color::Rgb(255, 165, 0),
        "yellow" => Color::Yellow,
        "cyan" => Color::Cyan,
        "gray" | "grey" => Color::DarkGray,
        "silver" | "lightgray" | "lightgrey" => Color::Gray,
        // the terminal background is dark, so black draws as white
        _ => Color::White,
    }
}

/// One drawable run of a segment: consecutive finite samples.
struct Trace {
    name: Option<String>,
    color: Color,
    style: LineStyle,
    points: Vec<(f64, f64)>,
}

fn segment_traces(series: &RawSeries, segment: &Segment) -> Vec<Trace> {
    let Some(values) = series.slice(segment.channel, segment.range) else {
        return Vec::new();
    };
    let mut runs: Vec<Vec<(f64, f64)>> = vec![Vec::new()];
    for (offset, &value) in values.iter().enumerate() {
        if value.is_finite() {
            let x = (segment.range.start + offset) as f64;
            if let Some(run) = runs.last_mut() {
                run.push((x, value));
            }
        } else if runs.last().is_some_and(|r| !r.is_empty()) {
            runs.push(Vec::new());
        }
    }

    let color = terminal_color(&segment.color);
    runs.into_iter()
        .filter(|points| !points.is_empty())
        .enumerate()
        .map(|(i, points)| Trace {
            name: if i == 0 { segment.legend.clone() } else { None },
            color,
            style: segment.style,
            points,
        })
        .collect()
}

fn render_channel(frame: &mut Frame, area: Rect, rendered: &Rendered, channel: Channel) {
    let series = &rendered.series;
    let traces: Vec<Trace> = rendered
        .overlay
        .segments
        .iter()
        .filter(|s| s.channel == channel)
        .flat_map(|s| segment_traces(series, s))
        .collect();

    let datasets: Vec<Dataset> = traces
        .iter()
        .map(|trace| {
            let dataset = Dataset::default()
                .style(Style::default().fg(trace.color))
                .data(&trace.points);
            let dataset = match trace.style {
                LineStyle::Solid => dataset.marker(Marker::Braille).graph_type(GraphType::Line),
                LineStyle::Dashed => dataset.marker(Marker::Dot).graph_type(GraphType::Scatter),
            };
            match &trace.name {
                Some(name) => dataset.name(name.clone()),
                None => dataset,
            }
        })
        .collect();

    let x_max = series.len().saturating_sub(1).max(1) as f64;
    let (y_min, y_max) = match series.bounds(channel) {
        Some((lo, hi)) if hi > lo => (lo, hi),
        Some((lo, _)) => (lo - 1.0, lo + 1.0),
        None => (0.0, 1.0),
    };
    let header = series.channel_name(channel);

    let chart = Chart::new(datasets)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray))
                .title(format!(" {header} ")),
        )
        .x_axis(
            Axis::default()
                .title("Index")
                .style(Style::default().fg(Color::Gray))
                .bounds([0.0, x_max])
                .labels(vec![Span::raw("0"), Span::raw(format!("{x_max:.0}"))]),
        )
        .y_axis(
            Axis::default()
                .title(format!("{header} Signal"))
                .style(Style::default().fg(Color::Gray))
                .bounds([y_min, y_max])
                .labels(vec![
                    Span::raw(format!("{y_min:.2}")),
                    Span::raw(format!("{y_max:.2}")),
                ]),
        )
        .hidden_legend_constraints((Constraint::Percentage(50), Constraint::Percentage(60)));

    frame.render_widget(chart, area);
}

fn draw(frame: &mut Frame, dashboard: &Dashboard) {
    let [header, nir, vis, status] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Fill(1),
        Constraint::Fill(1),
        Constraint::Length(1),
    ])
    .areas(frame.area());

    let title = dashboard
        .session
        .config()
        .chart
        .title_for(dashboard.column_name());
    let header_text = format!(
        " {title} | {} ({}/{}) ",
        dashboard.member_name(),
        dashboard.member + 1,
        dashboard.members.len()
    );
    frame.render_widget(
        Paragraph::new(header_text).style(Style::default().fg(Color::White).bg(Color::DarkGray)),
        header,
    );

    match dashboard.session.current() {
        Some(rendered) => {
            render_channel(frame, nir, rendered, Channel::Nir);
            render_channel(frame, vis, rendered, Channel::Vis);
        }
        None => {
            let empty = Block::default()
                .borders(Borders::ALL)
                .title(" no recording loaded ");
            frame.render_widget(empty, nir);
        }
    }

    let options = dashboard.session.config().options;
    let on_off = |flag: bool| if flag { "on" } else { "off" };
    let mut spans = vec![Span::styled(
        format!(
            " ←→ recording  ↑↓ column  c highlight [{}]  d dashes [{}]  q quit ",
            on_off(options.highlight),
            on_off(dashboard.session.config().dash_test_rows())
        ),
        Style::default().fg(Color::Gray),
    )];
    if let Some(rendered) = dashboard.session.current()
        && !rendered.overlay.skipped.is_empty()
    {
        spans.push(Span::styled(
            format!("| {} rows skipped ", rendered.overlay.skipped.len()),
            Style::default().fg(Color::Yellow),
        ));
    }
    if let Some(error) = &dashboard.error {
        spans.push(Span::styled(
            format!("| {error}"),
            Style::default().fg(Color::LightRed),
        ));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), status);
}

fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    dashboard: &mut Dashboard,
) -> Result<()> {
    loop {
        terminal.draw(|frame| draw(frame, dashboard))?;

        if event::poll(Duration::from_millis(200))?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
            && !dashboard.handle_key(key.code)
        {
            return Ok(());
        }
    }
}

pub fn run(mut dashboard: Dashboard) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = event_loop(&mut terminal, &mut dashboard);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use bead_view_core::config::ViewerConfig;
    use bead_view_core::parsers::parse_bead_table;
    use bead_view_core::source::SourceError;
    use bead_view_protocol::IndexRange;

    struct OneRecording;

    impl SeriesArchive for OneRecording {
        fn list_csv_members(&self) -> Result<Vec<String>, SourceError> {
            Ok(vec!["run/part1.csv".into()])
        }

        fn open_member(&self, name: &str) -> Result<Vec<u8>, SourceError> {
            if name == "run/part1.csv" {
                Ok(b"NIR,VIS\n1,2\n2,3\n3,4\n4,5\n".to_vec())
            } else {
                Err(SourceError::NotFound(name.to_string()))
            }
        }
    }

    fn dashboard(members: &[&str]) -> Dashboard {
        let table = parse_bead_table(
            b"file,start_index,end_index,bead_number,refined_label,RF_Prediction,is_test\n\
              part1.csv,0,1,1,OK,1.0,True\n\
              part1.csv,2,3,2,Weak Weld,3.0,False\n",
        )
        .unwrap();
        let session = Session::new(table, ViewerConfig::default());
        let columns = session.label_options();
        Dashboard::new(
            Box::new(OneRecording),
            session,
            members.iter().map(|m| m.to_string()).collect(),
            columns,
            0,
            0,
        )
    }

    #[test]
    fn first_render_happens_on_open() {
        let d = dashboard(&["run/part1.csv"]);
        assert!(d.error.is_none());
        let rendered = d.session.current().unwrap();
        assert_eq!(rendered.overlay.legend(), vec!["Class OK", "Class Weak Weld"]);
    }

    #[test]
    fn missing_recording_shows_error_and_keeps_chart() {
        let mut d = dashboard(&["run/part1.csv", "run/part2.csv"]);
        assert!(d.handle_key(KeyCode::Right));
        assert!(d.error.as_deref().unwrap().contains("part2.csv"));
        assert_eq!(
            d.session.current().unwrap().overlay.source_name,
            "run/part1.csv"
        );

        d.handle_key(KeyCode::Right);
        assert!(d.error.is_none());
    }

    #[test]
    fn column_and_option_keys_rebuild() {
        let mut d = dashboard(&["run/part1.csv"]);
        d.handle_key(KeyCode::Down);
        assert_eq!(
            d.session.current().unwrap().overlay.label_column,
            "RF_Prediction"
        );

        d.handle_key(KeyCode::Char('c'));
        assert_eq!(d.session.current().unwrap().overlay.highlights().count(), 0);
        d.handle_key(KeyCode::Char('c'));

        d.handle_key(KeyCode::Char('d'));
        let dashed = d
            .session
            .current()
            .unwrap()
            .overlay
            .highlights()
            .filter(|s| s.style == LineStyle::Dashed)
            .count();
        assert_eq!(dashed, 2);

        assert!(!d.handle_key(KeyCode::Char('q')));
    }

    #[test]
    fn selection_wraps() {
        assert_eq!(step_forward(2, 3), 0);
        assert_eq!(step_back(0, 3), 2);
        assert_eq!(step_back(0, 0), 0);
    }

    #[test]
    fn css_colors_map_to_terminal() {
        assert_eq!(terminal_color(&CssColor::new("purple")), Color::Magenta);
        assert_eq!(terminal_color(&CssColor::new("#102030")), Color::Rgb(16, 32, 48));
        assert_eq!(terminal_color(&CssColor::black()), Color::White);
    }

    #[test]
    fn traces_break_at_gaps() {
        let series = RawSeries::from_samples(
            None,
            ["NIR".into(), "VIS".into()],
            vec![(1.0, 0.0), (f64::NAN, 0.0), (3.0, 0.0), (4.0, 0.0)],
        );
        let segment = Segment {
            channel: Channel::Nir,
            range: IndexRange::new(0, 3),
            color: CssColor::new("red"),
            style: LineStyle::Solid,
            legend: Some("Class OK".into()),
            hover: None,
            class: Some("OK".into()),
        };
        let runs = segment_traces(&series, &segment);
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[0].points, vec![(0.0, 1.0)]);
        assert_eq!(runs[1].points, vec![(2.0, 3.0), (3.0, 4.0)]);
        assert_eq!(runs[0].name.as_deref(), Some("Class OK"));
        assert!(runs[1].name.is_none());
    }
}
