//! App assembly and UI event loop.
//!
//! Pure composition plus dispatch: [`App::new`] wires the gateway, the
//! feed delegate, the chart data source and the components; [`App::run`]
//! owns the single UI loop every mutation goes through. Background
//! fetches land here as actions, never touching state from their own
//! tasks.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, Weak};

use chrono::Local;
use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Tabs};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, info, warn};

use crate::action::{Action, PageRequest};
use crate::cli::Args;
use crate::components::{
    Component, activity::ActivityComponent, chart::ChartComponent,
    onboarding::OnboardingComponent,
};
use crate::config::Config;
use crate::domain::event::{ActivityEvent, EventModel, group_by_day};
use crate::domain::feed::{ActivityListDelegate, FeedHeader};
use crate::domain::presenter::ChartPresenter;
use crate::domain::section::{PaginationState, Section};
use crate::infra::gateway::{ActivityPage, Gateway, GatewayError};
use crate::infra::price_feed::PriceFeed;
use crate::tui::{Event, Frame, Tui};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Onboarding,
    Main,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Activity,
    Chart,
}

impl Tab {
    pub fn all() -> [Tab; 2] {
        [Tab::Activity, Tab::Chart]
    }

    pub fn title(&self) -> Line<'static> {
        match self {
            Tab::Activity => Line::from(vec![
                Span::styled(
                    "A",
                    Style::default()
                        .fg(Color::Yellow)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::raw("ctivity"),
            ]),
            Tab::Chart => Line::from(vec![
                Span::styled(
                    "C",
                    Style::default()
                        .fg(Color::Yellow)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::raw("hart"),
            ]),
        }
    }

    pub fn index(&self) -> usize {
        match self {
            Tab::Activity => 0,
            Tab::Chart => 1,
        }
    }

    pub fn next(&self) -> Tab {
        match self {
            Tab::Activity => Tab::Chart,
            Tab::Chart => Tab::Activity,
        }
    }
}

/// Delegate side of the activity list: resolves render models from the
/// events loaded so far and turns controller callbacks into actions on
/// the UI loop. Owned by the app; the controller only holds it weakly.
pub struct ActivityFeed {
    models: Mutex<HashMap<String, EventModel>>,
    action_tx: UnboundedSender<Action>,
}

impl ActivityFeed {
    fn new(action_tx: UnboundedSender<Action>) -> Self {
        Self {
            models: Mutex::new(HashMap::new()),
            action_tx,
        }
    }

    fn replace(&self, events: &[ActivityEvent]) {
        let mut models = self.models.lock().expect("models lock");
        models.clear();
        for event in events {
            models.insert(event.id.clone(), EventModel::from_event(event));
        }
    }
}

impl ActivityListDelegate for ActivityFeed {
    fn event_model(&self, id: &str) -> Option<EventModel> {
        self.models.lock().expect("models lock").get(id).cloned()
    }

    fn did_select_event(&self, id: &str) {
        let _ = self.action_tx.send(Action::OpenEvent(id.to_string()));
    }

    fn load_next_page(&self) {
        let _ = self.action_tx.send(Action::LoadNextPage);
    }

    fn did_pull_to_refresh(&self) {
        let _ = self.action_tx.send(Action::RefreshActivity);
    }
}

pub struct App {
    should_quit: bool,
    should_suspend: bool,
    tick_rate: f64,
    frame_rate: f64,
    gateway_override: Option<String>,

    screen: Screen,
    active_tab: Tab,
    status_message: String,

    action_tx: UnboundedSender<Action>,
    action_rx: UnboundedReceiver<Action>,

    config: Option<Config>,
    gateway: Option<Gateway>,
    feed: Option<Arc<ActivityFeed>>,
    presenter: Option<ChartPresenter>,

    activity: ActivityComponent,
    chart: ChartComponent,
    onboarding: OnboardingComponent,

    events: Vec<ActivityEvent>,
    next_cursor: Option<u64>,
    page_inflight: bool,
}

impl App {
    pub fn new(args: &Args) -> Result<Self> {
        let (action_tx, action_rx) = mpsc::unbounded_channel();

        let mut config = Config::load()?;
        if let Some(config) = config.as_mut() {
            if let Some(address) = &args.address {
                config.address = address.clone();
            }
            if let Some(currency) = &args.currency {
                config.currency = currency.clone();
            }
            if let Some(url) = &args.gateway_url {
                config.gateway_url = url.clone();
            }
        } else if let Some(address) = &args.address {
            let mut fresh = Config::new(
                address.clone(),
                args.currency.clone().unwrap_or_else(|| "USD".to_string()),
            );
            if let Some(url) = &args.gateway_url {
                fresh.gateway_url = url.clone();
            }
            config = Some(fresh);
        }

        let screen = if config.is_some() {
            Screen::Main
        } else {
            Screen::Onboarding
        };

        let mut app = Self {
            should_quit: false,
            should_suspend: false,
            tick_rate: args.tick_rate,
            frame_rate: args.frame_rate,
            gateway_override: args.gateway_url.clone(),
            screen,
            active_tab: Tab::Activity,
            status_message: String::new(),
            action_tx: action_tx.clone(),
            action_rx,
            config,
            gateway: None,
            feed: None,
            presenter: None,
            activity: ActivityComponent::new(),
            chart: ChartComponent::new(action_tx.clone()),
            onboarding: OnboardingComponent::new(action_tx),
            events: Vec::new(),
            next_cursor: None,
            page_inflight: false,
        };
        if let Some(config) = app.config.clone() {
            app.connect(&config)?;
        }
        Ok(app)
    }

    /// Wires the object graph for a configured wallet: gateway, feed
    /// delegate, chart data source, presenter.
    fn connect(&mut self, config: &Config) -> Result<()> {
        let gateway = Gateway::new(&config.gateway_url)?;

        let feed = Arc::new(ActivityFeed::new(self.action_tx.clone()));
        let feed_dyn: Arc<dyn ActivityListDelegate> = feed.clone();
        let weak: Weak<dyn ActivityListDelegate> = Arc::downgrade(&feed_dyn);
        self.activity.controller.set_delegate(weak);

        let price_feed = Arc::new(PriceFeed::new(gateway.clone(), &config.currency));
        self.presenter = Some(ChartPresenter::new(price_feed, self.action_tx.clone()));

        self.gateway = Some(gateway);
        self.feed = Some(feed);
        Ok(())
    }

    pub async fn run(&mut self) -> Result<()> {
        let mut tui = Tui::new(self.tick_rate, self.frame_rate)?;
        tui.enter()?;

        if self.screen == Screen::Main {
            self.start_session();
        }

        loop {
            if let Some(event) = tui.next().await {
                self.handle_event(&mut tui, event)?;
            }

            while let Ok(action) = self.action_rx.try_recv() {
                self.handle_action(&mut tui, action)?;
            }

            if self.should_suspend {
                tui.suspend()?;
                self.should_suspend = false;
                tui.resume()?;
                self.action_tx.send(Action::Resume)?;
            }

            if self.should_quit {
                break;
            }
        }

        tui.exit()?;
        Ok(())
    }

    /// First load after entering the main screen: shimmer placeholders in
    /// the feed, then the initial page and the chart.
    fn start_session(&mut self) {
        self.activity.controller.set_sections(vec![Section::Shimmer(
            (0..6).map(|i| format!("shimmer-{i}")).collect(),
        )]);
        self.fetch_activity(PageRequest::Initial);
        if let Some(presenter) = self.presenter.as_mut() {
            presenter.on_view_ready(&mut self.chart);
        }
    }

    fn fetch_activity(&mut self, request: PageRequest) {
        let (Some(gateway), Some(config)) = (self.gateway.clone(), self.config.clone()) else {
            return;
        };
        let cursor = match request {
            PageRequest::Next => self.next_cursor,
            _ => None,
        };
        let action_tx = self.action_tx.clone();
        tokio::spawn(async move {
            let result = gateway
                .events(&config.address, config.page_size, cursor)
                .await;
            let _ = action_tx.send(Action::ActivityLoaded { request, result });
        });
    }

    fn handle_event(&mut self, tui: &mut Tui, event: Event) -> Result<()> {
        match event {
            Event::Tick => {
                self.action_tx.send(Action::Tick)?;
            }
            Event::Render => {
                self.draw_ui(tui)?;
            }
            Event::Key(key) => {
                self.handle_key_event(key)?;
            }
            Event::Mouse(mouse) => {
                if self.screen == Screen::Main {
                    match self.active_tab {
                        Tab::Activity => self.activity.handle_mouse_event(mouse)?,
                        Tab::Chart => self.chart.handle_mouse_event(mouse)?,
                    }
                }
            }
            Event::Paste(text) => {
                if self.screen == Screen::Onboarding {
                    self.onboarding.insert_str(&text);
                }
            }
            Event::Resize(w, h) => {
                self.action_tx.send(Action::Resize(w, h))?;
            }
            Event::Init => {
                info!("application initialized");
            }
            Event::Error => {
                self.action_tx
                    .send(Action::Error("terminal event stream failed".to_string()))?;
            }
        }
        Ok(())
    }

    fn handle_key_event(&mut self, key: KeyEvent) -> Result<()> {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            match key.code {
                KeyCode::Char('c') => {
                    self.action_tx.send(Action::Quit)?;
                    return Ok(());
                }
                KeyCode::Char('z') => {
                    self.action_tx.send(Action::Suspend)?;
                    return Ok(());
                }
                KeyCode::Char('l') => {
                    self.action_tx.send(Action::ClearScreen)?;
                    return Ok(());
                }
                _ => {}
            }
        }

        if self.screen == Screen::Onboarding {
            return self.onboarding.handle_key_event(key);
        }

        match key.code {
            KeyCode::Char('q') => self.action_tx.send(Action::Quit)?,
            KeyCode::Tab => {
                self.active_tab = self.active_tab.next();
            }
            KeyCode::Char('1') => self.action_tx.send(Action::TabActivity)?,
            KeyCode::Char('2') => self.action_tx.send(Action::TabChart)?,
            _ => match self.active_tab {
                Tab::Activity => self.activity.handle_key_event(key)?,
                Tab::Chart => self.chart.handle_key_event(key)?,
            },
        }
        Ok(())
    }

    fn handle_action(&mut self, tui: &mut Tui, action: Action) -> Result<()> {
        if !matches!(action, Action::Tick) {
            debug!("handling action: {action:?}");
        }
        match action {
            Action::Tick => {
                self.activity.tick();
                self.chart.tick();
            }
            Action::Resize(_, _) | Action::Resume => {
                self.draw_ui(tui)?;
            }
            Action::Suspend => self.should_suspend = true,
            Action::Quit => self.should_quit = true,
            Action::ClearScreen => {
                tui.terminal.clear()?;
            }
            Action::Error(message) => {
                self.status_message = message;
            }
            Action::TabActivity => self.active_tab = Tab::Activity,
            Action::TabChart => self.active_tab = Tab::Chart,
            Action::CompleteOnboarding { address, currency } => {
                let mut config = Config::new(address, currency);
                if let Some(url) = &self.gateway_override {
                    config.gateway_url = url.clone();
                }
                if let Err(error) = config.save() {
                    warn!("failed to persist config: {error}");
                    self.status_message = "Failed to save configuration".to_string();
                }
                self.connect(&config)?;
                self.config = Some(config);
                self.screen = Screen::Main;
                self.start_session();
            }
            Action::RefreshActivity => {
                self.fetch_activity(PageRequest::Refresh);
            }
            Action::LoadNextPage => {
                if self.page_inflight {
                    debug!("next page already in flight");
                } else if self.next_cursor.is_some() {
                    self.page_inflight = true;
                    self.activity
                        .controller
                        .show_pagination(PaginationState::Loading);
                    self.fetch_activity(PageRequest::Next);
                }
            }
            Action::OpenEvent(id) => {
                self.status_message = format!("Transaction {id}");
            }
            Action::ActivityLoaded { request, result } => {
                self.on_activity_loaded(request, result);
            }
            Action::SelectPeriod(index) => {
                if let Some(presenter) = self.presenter.as_mut() {
                    presenter.on_period_selected(&mut self.chart, index);
                }
            }
            Action::InspectPoint(index) => {
                if let Some(presenter) = self.presenter.as_mut() {
                    presenter.on_point_selected(&mut self.chart, index);
                }
            }
            Action::ClearPointInspection => {
                if let Some(presenter) = self.presenter.as_mut() {
                    presenter.on_point_deselected(&mut self.chart);
                }
            }
            Action::ChartLoaded { seq, result } => {
                if let Some(presenter) = self.presenter.as_mut() {
                    presenter.on_series_loaded(&mut self.chart, seq, result);
                }
            }
        }
        Ok(())
    }

    fn on_activity_loaded(
        &mut self,
        request: PageRequest,
        result: Result<ActivityPage, GatewayError>,
    ) {
        if request == PageRequest::Next {
            self.page_inflight = false;
        }
        self.activity.set_refreshing(false);

        match result {
            Ok(page) => {
                match request {
                    PageRequest::Initial | PageRequest::Refresh => {
                        self.events = page.events;
                    }
                    PageRequest::Next => {
                        self.events.extend(page.events);
                    }
                }
                self.next_cursor = page.next_cursor;
                if request == PageRequest::Next {
                    self.activity.controller.hide_pagination();
                }
                self.apply_events(request != PageRequest::Next);
                self.status_message = format!("{} transactions loaded", self.events.len());
            }
            Err(error) => {
                warn!("activity load failed: {error}");
                match request {
                    PageRequest::Next => {
                        self.activity
                            .controller
                            .show_pagination(PaginationState::Error(
                                error.user_title().to_string(),
                            ));
                    }
                    PageRequest::Initial | PageRequest::Refresh => {
                        if self.events.is_empty() {
                            // Drop the shimmer; there is nothing to back it.
                            self.activity.controller.set_sections(Vec::new());
                        }
                        self.status_message = error.user_title().to_string();
                    }
                }
            }
        }
    }

    /// Pushes the loaded events into the controller: render models into
    /// the delegate, day sections into the snapshot.
    fn apply_events(&mut self, update_header: bool) {
        if let Some(feed) = &self.feed {
            feed.replace(&self.events);
        }
        let sections = group_by_day(&self.events, Local::now().date_naive());
        self.activity.controller.set_sections(sections);
        if update_header && let Some(config) = &self.config {
            self.activity.controller.set_header(Some(FeedHeader {
                title: shorten_address(&config.address),
                subtitle: format!("{} transactions", self.events.len()),
            }));
        }
    }

    fn draw_ui(&mut self, tui: &mut Tui) -> Result<()> {
        tui.terminal.draw(|f| self.draw(f))?;
        Ok(())
    }

    fn draw(&mut self, f: &mut Frame) {
        let area = f.area();
        if self.screen == Screen::Onboarding {
            self.onboarding.draw(f, area);
            return;
        }

        let chunks = Layout::vertical([
            Constraint::Length(3), // Header
            Constraint::Length(3), // Tabs
            Constraint::Min(0),    // Content
            Constraint::Length(3), // Status
        ])
        .split(area);

        self.draw_header(f, chunks[0]);
        self.draw_tabs(f, chunks[1]);
        match self.active_tab {
            Tab::Activity => self.activity.draw(f, chunks[2]),
            Tab::Chart => self.chart.draw(f, chunks[2]),
        }
        self.draw_status(f, chunks[3]);
    }

    fn draw_header(&self, f: &mut Frame, area: Rect) {
        let mut spans = vec![Span::styled(
            "Ember Wallet",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )];
        if let Some(config) = &self.config {
            spans.push(Span::raw("  "));
            spans.push(Span::styled(
                shorten_address(&config.address),
                Style::default().fg(Color::DarkGray),
            ));
            spans.push(Span::raw("  "));
            spans.push(Span::styled(
                format!("[{}]", config.currency),
                Style::default().fg(Color::Yellow),
            ));
        }
        let title = Paragraph::new(vec![Line::from(spans)]).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray)),
        );
        f.render_widget(title, area);
    }

    fn draw_tabs(&self, f: &mut Frame, area: Rect) {
        let titles: Vec<Line> = Tab::all().iter().map(|t| t.title()).collect();
        let tabs = Tabs::new(titles)
            .block(Block::default().borders(Borders::ALL))
            .select(self.active_tab.index())
            .style(Style::default().fg(Color::White))
            .highlight_style(
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            );
        f.render_widget(tabs, area);
    }

    fn draw_status(&self, f: &mut Frame, area: Rect) {
        let status = Paragraph::new(vec![Line::from(vec![
            Span::styled("Status: ", Style::default().fg(Color::DarkGray)),
            Span::styled(&self.status_message, Style::default().fg(Color::Green)),
            Span::raw("  |  "),
            Span::styled(
                "[q]Quit [Tab]Switch [r]Refresh",
                Style::default().fg(Color::DarkGray),
            ),
        ])])
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray)),
        );
        f.render_widget(status, area);
    }
}

fn shorten_address(address: &str) -> String {
    let chars: Vec<char> = address.chars().collect();
    if chars.len() <= 12 {
        return address.to_string();
    }
    let head: String = chars[..6].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}…{tail}")
}
