//! Price chart screen.
//!
//! Implements [`ChartView`]: the presenter pushes models in, this
//! component only draws them and converts key presses into actions.

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::symbols;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Paragraph, Tabs};
use tokio::sync::mpsc::UnboundedSender;

use crate::action::Action;
use crate::components::Component;
use crate::domain::chart::{ChartSeries, Interpolation};
use crate::domain::presenter::{ButtonsModel, ChartView, ErrorModel, HeaderModel};
use crate::tui::Frame;

const LINE_COLOR: Color = Color::Blue;
const INSPECT_COLOR: Color = Color::Yellow;

pub struct ChartComponent {
    action_tx: UnboundedSender<Action>,
    buttons: Vec<&'static str>,
    selected_button: usize,
    series: Option<ChartSeries>,
    header: Option<HeaderModel>,
    error: Option<ErrorModel>,
    inspected: Option<usize>,
}

impl ChartComponent {
    pub fn new(action_tx: UnboundedSender<Action>) -> Self {
        Self {
            action_tx,
            buttons: Vec::new(),
            selected_button: 0,
            series: None,
            header: None,
            error: None,
            inspected: None,
        }
    }

    /// Number of source coordinates behind the drawn series. Stepped
    /// series carry one extra corner point per segment.
    fn coordinate_count(&self) -> usize {
        match &self.series {
            Some(series) => match series.interpolation {
                Interpolation::Stepped => series.points.len().div_ceil(2),
                Interpolation::Linear => series.points.len(),
            },
            None => 0,
        }
    }

    fn coordinate_at(&self, index: usize) -> Option<(f64, f64)> {
        let series = self.series.as_ref()?;
        match series.interpolation {
            Interpolation::Stepped => series.points.get(index * 2).copied(),
            Interpolation::Linear => series.points.get(index).copied(),
        }
    }

    fn select_period(&mut self, index: usize) {
        let _ = self.action_tx.send(Action::SelectPeriod(index));
    }

    fn inspect(&mut self, forward: bool) {
        let count = self.coordinate_count();
        if count == 0 {
            return;
        }
        let last = count - 1;
        let index = match (self.inspected, forward) {
            (None, _) => last,
            (Some(current), true) => (current + 1).min(last),
            (Some(current), false) => current.saturating_sub(1),
        };
        self.inspected = Some(index);
        let _ = self.action_tx.send(Action::InspectPoint(index));
    }

    fn draw_header(&self, f: &mut Frame, area: Rect) {
        let Some(header) = &self.header else {
            return;
        };
        let amount = Line::from(vec![
            header.amount.clone(),
            Span::raw("  "),
            header.date.clone(),
        ]);
        let diff = Line::from(vec![
            header.percent_diff.clone(),
            Span::raw(" "),
            header.fiat_diff.clone(),
        ]);
        f.render_widget(Paragraph::new(vec![amount, diff]), area);
    }

    fn draw_buttons(&self, f: &mut Frame, area: Rect) {
        if self.buttons.is_empty() {
            return;
        }
        let tabs = Tabs::new(self.buttons.iter().map(|title| Line::from(*title)))
            .select(self.selected_button)
            .style(Style::new().fg(Color::DarkGray))
            .highlight_style(
                Style::new()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            );
        f.render_widget(tabs, area);
    }

    fn draw_chart(&self, f: &mut Frame, area: Rect) {
        let block = Block::default()
            .title(" Price ")
            .borders(Borders::ALL)
            .border_style(Style::new().fg(Color::DarkGray));

        if let Some(error) = &self.error {
            let lines = vec![
                Line::from(""),
                Line::from(Span::styled(
                    error.title.clone(),
                    Style::new().fg(Color::Red).add_modifier(Modifier::BOLD),
                )),
                Line::from(Span::styled(
                    error.subtitle.clone(),
                    Style::new().fg(Color::DarkGray),
                )),
            ];
            f.render_widget(Paragraph::new(lines).block(block).centered(), area);
            return;
        }

        let Some(series) = &self.series else {
            let loading = Paragraph::new(Line::from(Span::styled(
                "Loading chart…",
                Style::new().fg(Color::DarkGray),
            )))
            .block(block)
            .centered();
            f.render_widget(loading, area);
            return;
        };
        if series.points.is_empty() {
            let empty = Paragraph::new(Line::from(Span::styled(
                "No chart data for this period",
                Style::new().fg(Color::DarkGray),
            )))
            .block(block)
            .centered();
            f.render_widget(empty, area);
            return;
        }

        let (y_min, y_max) = series
            .points
            .iter()
            .fold((f64::MAX, f64::MIN), |(min, max), &(_, y)| {
                (min.min(y), max.max(y))
            });
        let margin = ((y_max - y_min) * 0.05).max(f64::EPSILON);
        let y_bounds = [(y_min - margin).max(0.0), y_max + margin];
        let x_bounds = [
            series.points.first().map(|p| p.0).unwrap_or(0.0),
            series.points.last().map(|p| p.0).unwrap_or(1.0),
        ];

        let mut datasets = vec![
            Dataset::default()
                .marker(symbols::Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::new().fg(LINE_COLOR))
                .data(&series.points),
        ];
        let inspected_point = self.inspected.and_then(|index| self.coordinate_at(index));
        let inspected_data = inspected_point.map(|point| [point]);
        if let Some(data) = &inspected_data {
            datasets.push(
                Dataset::default()
                    .marker(symbols::Marker::Dot)
                    .graph_type(GraphType::Scatter)
                    .style(Style::new().fg(INSPECT_COLOR))
                    .data(data),
            );
        }

        let y_axis = Axis::default()
            .style(Style::new().fg(Color::DarkGray))
            .bounds(y_bounds)
            .labels(vec![
                Span::raw(format!("{:.2}", y_bounds[0])),
                Span::raw(format!("{:.2}", (y_bounds[0] + y_bounds[1]) / 2.0)),
                Span::raw(format!("{:.2}", y_bounds[1])),
            ]);
        let x_axis = Axis::default()
            .style(Style::new().fg(Color::DarkGray))
            .bounds(x_bounds);

        let chart = Chart::new(datasets)
            .block(block)
            .x_axis(x_axis)
            .y_axis(y_axis);
        f.render_widget(chart, area);
    }
}

impl ChartView for ChartComponent {
    fn update_buttons(&mut self, model: ButtonsModel) {
        self.buttons = model.titles;
    }

    fn select_button(&mut self, index: usize) {
        self.selected_button = index;
    }

    fn update_chart(&mut self, series: ChartSeries) {
        self.series = Some(series);
        self.error = None;
        self.inspected = None;
    }

    fn update_header(&mut self, model: HeaderModel) {
        self.header = Some(model);
    }

    fn show_error(&mut self, model: ErrorModel) {
        // Nothing stale may stay on screen alongside the error.
        self.series = None;
        self.inspected = None;
        self.error = Some(model);
    }
}

impl Component for ChartComponent {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<()> {
        match key.code {
            KeyCode::Left | KeyCode::Char('h') => {
                if !self.buttons.is_empty() {
                    let index =
                        (self.selected_button + self.buttons.len() - 1) % self.buttons.len();
                    self.select_period(index);
                }
            }
            KeyCode::Right | KeyCode::Char('l') => {
                if !self.buttons.is_empty() {
                    let index = (self.selected_button + 1) % self.buttons.len();
                    self.select_period(index);
                }
            }
            KeyCode::Char('[') => self.inspect(false),
            KeyCode::Char(']') => self.inspect(true),
            KeyCode::Esc => {
                if self.inspected.take().is_some() {
                    let _ = self.action_tx.send(Action::ClearPointInspection);
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn draw(&mut self, f: &mut Frame, area: Rect) {
        let [header_area, buttons_area, chart_area] = Layout::vertical([
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Min(0),
        ])
        .areas(area);

        self.draw_header(f, header_area);
        self.draw_buttons(f, buttons_area);
        self.draw_chart(f, chart_area);
    }
}
