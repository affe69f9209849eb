//! End-to-end chart flows: the presenter driven through its action
//! channel, against both a scripted source and the gateway-backed feed.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::json;
use tokio::sync::mpsc;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use ember_wallet::action::Action;
use ember_wallet::domain::chart::{
    ChartSeries, Coordinate, Interpolation, Period, PointInformation, point_information,
};
use ember_wallet::domain::presenter::{
    ButtonsModel, ChartDataError, ChartDataSource, ChartPresenter, ChartView, ErrorModel,
    HeaderModel,
};
use ember_wallet::infra::gateway::Gateway;
use ember_wallet::infra::price_feed::PriceFeed;

#[derive(Debug)]
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

impl RecordingView {
    fn charts(&self) -> Vec<&ChartSeries> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                ViewCall::Chart(series) => Some(series),
                _ => None,
            })
            .collect()
    }

    fn last_header(&self) -> Option<&HeaderModel> {
        self.calls.iter().rev().find_map(|call| match call {
            ViewCall::Header(header) => Some(header),
            _ => None,
        })
    }
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

fn coords(ys: &[f64]) -> Vec<Coordinate> {
    ys.iter()
        .enumerate()
        .map(|(i, &y)| Coordinate {
            x: 1_700_000_000.0 + i as f64 * 60.0,
            y,
        })
        .collect()
}

async fn next_chart_loaded(
    rx: &mut mpsc::UnboundedReceiver<Action>,
) -> (u64, Result<Vec<Coordinate>, ChartDataError>) {
    match rx.recv().await {
        Some(Action::ChartLoaded { seq, result }) => (seq, result),
        other => panic!("expected ChartLoaded, got {other:?}"),
    }
}

#[tokio::test]
async fn full_reload_cycle_against_the_gateway() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/rates/chart"))
        .and(query_param("period", "1w"))
        .and(query_param("currency", "USD"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "points": [[1_700_000_000.0, 2.0], [1_700_000_060.0, 2.5]]
        })))
        .mount(&server)
        .await;

    let feed = Arc::new(PriceFeed::new(
        Gateway::new(server.uri()).expect("client"),
        "USD",
    ));
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut presenter = ChartPresenter::new(feed, tx);
    let mut view = RecordingView::default();

    presenter.on_view_ready(&mut view);
    let (seq, result) = next_chart_loaded(&mut rx).await;
    presenter.on_series_loaded(&mut view, seq, result);

    let charts = view.charts();
    assert_eq!(charts.len(), 1);
    assert_eq!(charts[0].interpolation, Interpolation::Linear);
    assert_eq!(charts[0].points.len(), 2);

    let header = view.last_header().expect("header");
    assert_eq!(header.amount.content, "2.50 USD");
    assert_eq!(header.date.content, "Price");
}

#[tokio::test]
async fn rapid_reselection_displays_the_latest_request_only() {
    let data_source = ScriptedDataSource::new(vec![
        Ok(coords(&[1.0, 2.0])),
        Ok(coords(&[3.0, 4.0, 5.0])),
    ]);
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut presenter = ChartPresenter::new(data_source, tx);
    let mut view = RecordingView::default();

    // Week load starts, then the user immediately switches to Hour.
    presenter.on_view_ready(&mut view);
    presenter.on_period_selected(&mut view, 0);

    let (first_seq, first_result) = next_chart_loaded(&mut rx).await;
    let (second_seq, second_result) = next_chart_loaded(&mut rx).await;

    // Completions race back in reverse order: the newer one lands, the
    // stale one is dropped.
    presenter.on_series_loaded(&mut view, second_seq, second_result);
    presenter.on_series_loaded(&mut view, first_seq, first_result);

    let charts = view.charts();
    assert_eq!(charts.len(), 1);
    // Hour renders stepped: 3 coordinates become 5 points.
    assert_eq!(charts[0].interpolation, Interpolation::Stepped);
    assert_eq!(charts[0].points.len(), 5);
    assert!(first_seq < second_seq);
}

#[tokio::test]
async fn error_then_recovery_never_leaves_stale_state() {
    let data_source = ScriptedDataSource::new(vec![
        Err(ChartDataError::Offline("dns".to_string())),
        Ok(coords(&[2.0, 2.5])),
    ]);
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut presenter = ChartPresenter::new(data_source, tx);
    let mut view = RecordingView::default();

    presenter.on_view_ready(&mut view);
    let (seq, result) = next_chart_loaded(&mut rx).await;
    presenter.on_series_loaded(&mut view, seq, result);

    assert!(view.calls.iter().any(|call| matches!(
        call,
        ViewCall::Error(model) if model.title == "No internet connection"
    )));
    let zeroed = view.last_header().expect("header");
    assert_eq!(zeroed.amount.content, "0");
    assert_eq!(zeroed.percent_diff.content, "0%");
    assert_eq!(zeroed.fiat_diff.content, "0,00");

    // Retry by re-selecting the period.
    presenter.on_period_selected(&mut view, 2);
    let (seq, result) = next_chart_loaded(&mut rx).await;
    presenter.on_series_loaded(&mut view, seq, result);

    assert_eq!(view.charts().len(), 1);
    let header = view.last_header().expect("header");
    assert_eq!(header.amount.content, "2.50 USD");
}
