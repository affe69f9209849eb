//! Chart presenter.
//!
//! Mediates between a [`ChartDataSource`] and a [`ChartView`]: period
//! selection, fetch-and-render cycles and the point-inspection header.
//! Fetches run as spawned tasks; completions come back to the UI loop as
//! [`Action::ChartLoaded`] messages carrying a request sequence number,
//! and the presenter discards completions that are no longer current.

use std::sync::Arc;

use async_trait::async_trait;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Span;
use thiserror::Error;
use tokio::sync::mpsc::UnboundedSender;
use tracing::debug;

use crate::action::Action;
use crate::domain::chart::{
    ChartSeries, Coordinate, Direction, Period, PointInformation, prepare_series,
};

const PRIMARY_TEXT: Color = Color::Reset;
const SECONDARY_TEXT: Color = Color::DarkGray;

/// Why a chart load failed, as far as the user needs to know.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChartDataError {
    #[error("network unreachable: {0}")]
    Offline(String),
    #[error("chart data load failed: {0}")]
    Load(String),
}

/// Source of chart data. Implementations cache the last loaded series so
/// point information can be read without another fetch.
#[async_trait]
pub trait ChartDataSource: Send + Sync {
    /// Fetches the coordinates for a period and retains them.
    async fn series(&self, period: Period) -> Result<Vec<Coordinate>, ChartDataError>;
    /// The most recently loaded coordinates.
    fn coordinates(&self) -> Vec<Coordinate>;
    /// Header information for a point of the retained coordinates.
    fn point_info(&self, index: usize, period: Period) -> Option<PointInformation>;
}

/// Period selector buttons, one per period.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ButtonsModel {
    pub titles: Vec<&'static str>,
}

/// Styled header content: the big amount plus the diff line.
#[derive(Debug, Clone, PartialEq)]
pub struct HeaderModel {
    pub amount: Span<'static>,
    pub date: Span<'static>,
    pub percent_diff: Span<'static>,
    pub fiat_diff: Span<'static>,
}

/// User-facing load failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorModel {
    pub title: String,
    pub subtitle: String,
}

/// Everything the presenter pushes at the chart screen.
pub trait ChartView {
    fn update_buttons(&mut self, model: ButtonsModel);
    fn select_button(&mut self, index: usize);
    fn update_chart(&mut self, series: ChartSeries);
    fn update_header(&mut self, model: HeaderModel);
    fn show_error(&mut self, model: ErrorModel);
}

pub struct ChartPresenter {
    data_source: Arc<dyn ChartDataSource>,
    action_tx: UnboundedSender<Action>,
    selected_period: Period,
    load_seq: u64,
}

impl ChartPresenter {
    pub fn new(data_source: Arc<dyn ChartDataSource>, action_tx: UnboundedSender<Action>) -> Self {
        Self {
            data_source,
            action_tx,
            selected_period: Period::Week,
            load_seq: 0,
        }
    }

    /// Populates the period selector, marks the selected period and kicks
    /// off the initial load.
    pub fn on_view_ready(&mut self, view: &mut dyn ChartView) {
        let periods = Period::all();
        view.update_buttons(ButtonsModel {
            titles: periods.iter().map(|p| p.title()).collect(),
        });
        let selected = periods
            .iter()
            .position(|p| *p == self.selected_period)
            .unwrap_or(0);
        view.select_button(selected);
        self.reload();
    }

    /// Switches the active period. The visual selection moves immediately;
    /// the data follows when the fetch completes.
    pub fn on_period_selected(&mut self, view: &mut dyn ChartView, index: usize) {
        let periods = Period::all();
        let Some(period) = periods.get(index) else {
            return;
        };
        view.select_button(index);
        self.selected_period = *period;
        self.reload();
    }

    /// A chart point was put under inspection.
    pub fn on_point_selected(&mut self, view: &mut dyn ChartView, index: usize) {
        if let Some(info) = self.data_source.point_info(index, self.selected_period) {
            let date = info.date.clone();
            view.update_header(Self::header_model(&info, &date));
        }
    }

    /// Inspection ended; the header falls back to the current price.
    pub fn on_point_deselected(&mut self, view: &mut dyn ChartView) {
        self.show_unselected_header(view);
    }

    /// A spawned fetch completed. Stale completions (an older sequence
    /// number than the latest request) are dropped on the floor.
    pub fn on_series_loaded(
        &mut self,
        view: &mut dyn ChartView,
        seq: u64,
        result: Result<Vec<Coordinate>, ChartDataError>,
    ) {
        if seq != self.load_seq {
            debug!(seq, current = self.load_seq, "discarding stale chart load");
            return;
        }
        match result {
            Ok(coordinates) => {
                view.update_chart(prepare_series(&coordinates, self.selected_period));
                self.show_unselected_header(view);
            }
            Err(error) => {
                view.show_error(Self::error_model(&error));
                view.update_header(Self::error_header());
            }
        }
    }

    fn reload(&mut self) {
        self.load_seq += 1;
        let seq = self.load_seq;
        let period = self.selected_period;
        let data_source = Arc::clone(&self.data_source);
        let action_tx = self.action_tx.clone();
        tokio::spawn(async move {
            let result = data_source.series(period).await;
            let _ = action_tx.send(Action::ChartLoaded { seq, result });
        });
    }

    fn show_unselected_header(&self, view: &mut dyn ChartView) {
        let coordinates = self.data_source.coordinates();
        if coordinates.is_empty() {
            return;
        }
        if let Some(info) = self
            .data_source
            .point_info(coordinates.len() - 1, self.selected_period)
        {
            view.update_header(Self::header_model(&info, "Price"));
        }
    }

    fn header_model(info: &PointInformation, date: &str) -> HeaderModel {
        let diff_color = match info.diff.direction {
            Direction::Up => Color::Green,
            Direction::Down => Color::Red,
            Direction::None => SECONDARY_TEXT,
        };
        HeaderModel {
            amount: Span::styled(
                info.amount.clone(),
                Style::new().fg(PRIMARY_TEXT).add_modifier(Modifier::BOLD),
            ),
            date: Span::styled(date.to_string(), Style::new().fg(SECONDARY_TEXT)),
            percent_diff: Span::styled(info.diff.percent.clone(), Style::new().fg(diff_color)),
            fiat_diff: Span::styled(
                info.diff.fiat.clone(),
                Style::new().fg(diff_color).add_modifier(Modifier::DIM),
            ),
        }
    }

    /// The safe default shown whenever a load fails: nothing stale may
    /// stay on screen.
    fn error_header() -> HeaderModel {
        HeaderModel {
            amount: Span::styled(
                "0",
                Style::new().fg(PRIMARY_TEXT).add_modifier(Modifier::BOLD),
            ),
            date: Span::styled("Price", Style::new().fg(SECONDARY_TEXT)),
            percent_diff: Span::styled("0%", Style::new().fg(SECONDARY_TEXT)),
            fiat_diff: Span::styled(
                "0,00",
                Style::new().fg(SECONDARY_TEXT).add_modifier(Modifier::DIM),
            ),
        }
    }

    fn error_model(error: &ChartDataError) -> ErrorModel {
        match error {
            ChartDataError::Offline(_) => ErrorModel {
                title: "No internet connection".to_string(),
                subtitle: "Please check your connection and try again.".to_string(),
            },
            ChartDataError::Load(_) => ErrorModel {
                title: "Failed to load chart data".to_string(),
                subtitle: "Please try again".to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use tokio::sync::mpsc;

    use super::*;
    use crate::domain::chart::point_information;

    struct ScriptedDataSource {
        script: Mutex<VecDeque<Result<Vec<Coordinate>, ChartDataError>>>,
        coords: Mutex<Vec<Coordinate>>,
    }

    impl ScriptedDataSource {
        fn new(script: Vec<Result<Vec<Coordinate>, ChartDataError>>) -> Arc<Self> {
            Arc::new(Self {
                script: Mutex::new(script.into()),
                coords: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl ChartDataSource for ScriptedDataSource {
        async fn series(&self, _period: Period) -> Result<Vec<Coordinate>, ChartDataError> {
            let result = self
                .script
                .lock()
                .expect("script lock")
                .pop_front()
                .unwrap_or_else(|| Ok(Vec::new()));
            if let Ok(coordinates) = &result {
                *self.coords.lock().expect("coords lock") = coordinates.clone();
            }
            result
        }

        fn coordinates(&self) -> Vec<Coordinate> {
            self.coords.lock().expect("coords lock").clone()
        }

        fn point_info(&self, index: usize, period: Period) -> Option<PointInformation> {
            point_information(&self.coordinates(), index, period, "USD")
        }
    }

    #[derive(Debug, PartialEq)]
    enum ViewCall {
        Buttons(Vec<&'static str>),
        Select(usize),
        Chart(ChartSeries),
        Header(HeaderModel),
        Error(ErrorModel),
    }

    #[derive(Default)]
    struct RecordingView {
        calls: Vec<ViewCall>,
    }

    impl ChartView for RecordingView {
        fn update_buttons(&mut self, model: ButtonsModel) {
            self.calls.push(ViewCall::Buttons(model.titles));
        }

        fn select_button(&mut self, index: usize) {
            self.calls.push(ViewCall::Select(index));
        }

        fn update_chart(&mut self, series: ChartSeries) {
            self.calls.push(ViewCall::Chart(series));
        }

        fn update_header(&mut self, model: HeaderModel) {
            self.calls.push(ViewCall::Header(model));
        }

        fn show_error(&mut self, model: ErrorModel) {
            self.calls.push(ViewCall::Error(model));
        }
    }

    fn coords(ys: &[f64]) -> Vec<Coordinate> {
        ys.iter()
            .enumerate()
            .map(|(i, &y)| Coordinate {
                x: 1_700_000_000.0 + i as f64 * 60.0,
                y,
            })
            .collect()
    }

    async fn next_chart_loaded(rx: &mut mpsc::UnboundedReceiver<Action>) -> (u64, Result<Vec<Coordinate>, ChartDataError>) {
        match rx.recv().await {
            Some(Action::ChartLoaded { seq, result }) => (seq, result),
            other => panic!("expected ChartLoaded, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn view_ready_populates_buttons_and_loads() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let data_source = ScriptedDataSource::new(vec![Ok(coords(&[1.0, 2.0]))]);
        let mut presenter = ChartPresenter::new(data_source, tx);
        let mut view = RecordingView::default();

        presenter.on_view_ready(&mut view);
        assert_eq!(
            view.calls[0],
            ViewCall::Buttons(vec!["1H", "1D", "1W", "1M", "1Y", "All"])
        );
        // Week is the default period.
        assert_eq!(view.calls[1], ViewCall::Select(2));

        let (seq, result) = next_chart_loaded(&mut rx).await;
        presenter.on_series_loaded(&mut view, seq, result);
        assert!(matches!(view.calls[2], ViewCall::Chart(_)));
        assert!(matches!(view.calls[3], ViewCall::Header(_)));
    }

    #[tokio::test]
    async fn stale_completion_is_discarded() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let data_source = ScriptedDataSource::new(vec![
            Ok(coords(&[1.0, 2.0])),
            Ok(coords(&[3.0, 4.0, 5.0])),
        ]);
        let mut presenter = ChartPresenter::new(data_source, tx);
        let mut view = RecordingView::default();

        presenter.on_view_ready(&mut view);
        presenter.on_period_selected(&mut view, 0);

        let (first_seq, first_result) = next_chart_loaded(&mut rx).await;
        let (second_seq, second_result) = next_chart_loaded(&mut rx).await;

        // Deliver newest first, then the stale one: only one chart lands.
        presenter.on_series_loaded(&mut view, second_seq, second_result);
        presenter.on_series_loaded(&mut view, first_seq, first_result);

        let charts: Vec<&ViewCall> = view
            .calls
            .iter()
            .filter(|c| matches!(c, ViewCall::Chart(_)))
            .collect();
        assert_eq!(charts.len(), 1);
        assert_eq!(first_seq, 1);
        assert_eq!(second_seq, 2);
    }

    #[tokio::test]
    async fn failure_shows_error_and_zeroed_header() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let data_source =
            ScriptedDataSource::new(vec![Err(ChartDataError::Load("boom".to_string()))]);
        let mut presenter = ChartPresenter::new(data_source, tx);
        let mut view = RecordingView::default();

        presenter.on_view_ready(&mut view);
        let (seq, result) = next_chart_loaded(&mut rx).await;
        presenter.on_series_loaded(&mut view, seq, result);

        match &view.calls[2] {
            ViewCall::Error(model) => {
                assert_eq!(model.title, "Failed to load chart data");
                assert_eq!(model.subtitle, "Please try again");
            }
            other => panic!("expected error, got {other:?}"),
        }
        match &view.calls[3] {
            ViewCall::Header(header) => {
                assert_eq!(header.amount.content, "0");
                assert_eq!(header.percent_diff.content, "0%");
                assert_eq!(header.fiat_diff.content, "0,00");
                assert_eq!(header.percent_diff.style.fg, Some(SECONDARY_TEXT));
                assert_eq!(header.fiat_diff.style.fg, Some(SECONDARY_TEXT));
            }
            other => panic!("expected header, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn offline_failure_is_classified() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let data_source = ScriptedDataSource::new(vec![Err(ChartDataError::Offline(
            "dns failure".to_string(),
        ))]);
        let mut presenter = ChartPresenter::new(data_source, tx);
        let mut view = RecordingView::default();

        presenter.on_view_ready(&mut view);
        let (seq, result) = next_chart_loaded(&mut rx).await;
        presenter.on_series_loaded(&mut view, seq, result);

        assert!(view.calls.iter().any(|c| matches!(
            c,
            ViewCall::Error(model) if model.title == "No internet connection"
        )));
    }

    #[tokio::test]
    async fn direction_colors_are_total() {
        let cases = [
            (&[1.0, 2.0][..], Color::Green),
            (&[2.0, 1.0][..], Color::Red),
            (&[2.0, 2.0][..], SECONDARY_TEXT),
        ];
        for (ys, expected) in cases {
            let (tx, mut rx) = mpsc::unbounded_channel();
            let data_source = ScriptedDataSource::new(vec![Ok(coords(ys))]);
            let mut presenter = ChartPresenter::new(data_source, tx);
            let mut view = RecordingView::default();

            presenter.on_view_ready(&mut view);
            let (seq, result) = next_chart_loaded(&mut rx).await;
            presenter.on_series_loaded(&mut view, seq, result);

            let header = view
                .calls
                .iter()
                .find_map(|c| match c {
                    ViewCall::Header(h) => Some(h),
                    _ => None,
                })
                .expect("header pushed");
            assert_eq!(header.percent_diff.style.fg, Some(expected));
            // The primary amount never takes the direction color.
            assert_eq!(header.amount.style.fg, Some(PRIMARY_TEXT));
        }
    }

    #[tokio::test]
    async fn point_selection_updates_header_and_deselection_restores_price() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let data_source = ScriptedDataSource::new(vec![Ok(coords(&[1.0, 2.0, 3.0]))]);
        let mut presenter = ChartPresenter::new(data_source, tx);
        let mut view = RecordingView::default();

        presenter.on_view_ready(&mut view);
        let (seq, result) = next_chart_loaded(&mut rx).await;
        presenter.on_series_loaded(&mut view, seq, result);

        presenter.on_point_selected(&mut view, 1);
        let selected = match view.calls.last().expect("call") {
            ViewCall::Header(h) => h.clone(),
            other => panic!("expected header, got {other:?}"),
        };
        assert_ne!(selected.date.content, "Price");

        presenter.on_point_deselected(&mut view);
        match view.calls.last().expect("call") {
            ViewCall::Header(h) => assert_eq!(h.date.content, "Price"),
            other => panic!("expected header, got {other:?}"),
        }
    }
}
