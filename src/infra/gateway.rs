//! HTTP gateway for account activity and chart data.
//!
//! Thin JSON client over the wallet API. All errors collapse into
//! [`GatewayError`]; callers classify them into the two user-visible
//! kinds (offline vs. generic failure) and nothing propagates further.

use std::time::Duration;

use chrono::DateTime;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;

use crate::domain::chart::{Coordinate, Period};
use crate::domain::event::{ActivityEvent, EventKind};
use crate::domain::presenter::ChartDataError;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    #[error("network unreachable: {0}")]
    Offline(String),
    #[error("gateway returned status {0}")]
    Api(u16),
    #[error("malformed gateway response: {0}")]
    Decode(String),
    #[error("request failed: {0}")]
    Http(String),
}

impl GatewayError {
    pub fn is_offline(&self) -> bool {
        matches!(self, GatewayError::Offline(_))
    }

    /// Short title for the pagination footer and the status line.
    pub fn user_title(&self) -> &'static str {
        if self.is_offline() {
            "No internet connection"
        } else {
            "Failed to load"
        }
    }
}

impl From<reqwest::Error> for GatewayError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_connect() || error.is_timeout() {
            GatewayError::Offline(error.to_string())
        } else if error.is_decode() {
            GatewayError::Decode(error.to_string())
        } else if let Some(status) = error.status() {
            GatewayError::Api(status.as_u16())
        } else {
            GatewayError::Http(error.to_string())
        }
    }
}

impl From<GatewayError> for ChartDataError {
    fn from(error: GatewayError) -> Self {
        match error {
            GatewayError::Offline(message) => ChartDataError::Offline(message),
            other => ChartDataError::Load(other.to_string()),
        }
    }
}

/// One page of account activity, newest first.
#[derive(Debug, Clone, PartialEq)]
pub struct ActivityPage {
    pub events: Vec<ActivityEvent>,
    /// Cursor for the page after this one; `None` means the feed is done.
    pub next_cursor: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct EventsResponse {
    events: Vec<EventDto>,
    next_cursor: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct EventDto {
    id: String,
    kind: String,
    amount: f64,
    symbol: String,
    counterparty: String,
    timestamp: i64,
    #[serde(default)]
    comment: Option<String>,
}

impl EventDto {
    fn into_event(self) -> ActivityEvent {
        let kind = match self.kind.as_str() {
            "received" => EventKind::Received,
            "sent" => EventKind::Sent,
            "swap" => EventKind::Swap,
            other => EventKind::Other(other.to_string()),
        };
        ActivityEvent {
            id: self.id,
            kind,
            amount: self.amount,
            symbol: self.symbol,
            counterparty: self.counterparty,
            timestamp: DateTime::from_timestamp(self.timestamp, 0).unwrap_or_default(),
            comment: self.comment,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChartResponse {
    points: Vec<[f64; 2]>,
}

#[derive(Clone)]
pub struct Gateway {
    client: Client,
    base_url: String,
}

impl Gateway {
    pub fn new(base_url: impl Into<String>) -> Result<Self, GatewayError> {
        let client = Client::builder().timeout(Duration::from_secs(10)).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Fetches one page of account activity.
    pub async fn events(
        &self,
        address: &str,
        limit: usize,
        before_lt: Option<u64>,
    ) -> Result<ActivityPage, GatewayError> {
        let url = format!("{}/v1/accounts/{address}/events", self.base_url);
        let mut request = self
            .client
            .get(&url)
            .query(&[("limit", limit.to_string())]);
        if let Some(cursor) = before_lt {
            request = request.query(&[("before_lt", cursor.to_string())]);
        }
        let response = request.send().await?.error_for_status()?;
        let body: EventsResponse = response.json().await?;
        Ok(ActivityPage {
            events: body.events.into_iter().map(EventDto::into_event).collect(),
            next_cursor: body.next_cursor,
        })
    }

    /// Fetches the chart coordinates for a period.
    pub async fn chart(
        &self,
        period: Period,
        currency: &str,
    ) -> Result<Vec<Coordinate>, GatewayError> {
        let url = format!("{}/v1/rates/chart", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[("period", period.query_key()), ("currency", currency)])
            .send()
            .await?
            .error_for_status()?;
        let body: ChartResponse = response.json().await?;
        Ok(body
            .points
            .into_iter()
            .map(|[x, y]| Coordinate { x, y })
            .collect())
    }
}
