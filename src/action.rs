use strum::Display;

use crate::domain::chart::Coordinate;
use crate::domain::presenter::ChartDataError;
use crate::infra::gateway::{ActivityPage, GatewayError};

/// Which fetch a completed activity request belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageRequest {
    Initial,
    Refresh,
    Next,
}

/// Actions triggered by user input, internal events or completed
/// background fetches. Everything funnels through the app's action
/// channel, which keeps all state mutation on the UI loop.
#[derive(Debug, Clone, PartialEq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum Action {
    Tick,
    Resize(u16, u16),
    Suspend,
    Resume,
    Quit,
    ClearScreen,
    Error(String),

    // Tab switching
    TabActivity,
    TabChart,

    // Onboarding
    CompleteOnboarding { address: String, currency: String },

    // Activity feed
    RefreshActivity,
    LoadNextPage,
    OpenEvent(String),
    ActivityLoaded {
        request: PageRequest,
        result: Result<ActivityPage, GatewayError>,
    },

    // Chart
    SelectPeriod(usize),
    InspectPoint(usize),
    ClearPointInspection,
    ChartLoaded {
        seq: u64,
        result: Result<Vec<Coordinate>, ChartDataError>,
    },
}
