//! Activity events and their render models.

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::section::{EventsSection, Section};

/// What a transaction did, as far as the feed cares.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventKind {
    Received,
    Sent,
    Swap,
    Other(String),
}

/// A transaction event as delivered by the gateway.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityEvent {
    pub id: String,
    pub kind: EventKind,
    pub amount: f64,
    pub symbol: String,
    pub counterparty: String,
    pub timestamp: DateTime<Utc>,
    pub comment: Option<String>,
}

/// Visual emphasis of an event row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventDirection {
    Incoming,
    Outgoing,
    Neutral,
}

/// Everything a transaction cell needs to draw itself. Toolkit-free;
/// the cell maps [`EventDirection`] to colors.
#[derive(Debug, Clone, PartialEq)]
pub struct EventModel {
    pub kind_label: String,
    pub amount: String,
    pub direction: EventDirection,
    pub counterparty: String,
    pub time: String,
    pub comment: Option<String>,
}

impl EventModel {
    pub fn from_event(event: &ActivityEvent) -> Self {
        let (kind_label, direction) = match &event.kind {
            EventKind::Received => ("Received".to_string(), EventDirection::Incoming),
            EventKind::Sent => ("Sent".to_string(), EventDirection::Outgoing),
            EventKind::Swap => ("Swap".to_string(), EventDirection::Neutral),
            EventKind::Other(label) => (label.clone(), EventDirection::Neutral),
        };
        let amount = match direction {
            EventDirection::Incoming => format!("+{} {}", trim_amount(event.amount), event.symbol),
            EventDirection::Outgoing => format!("-{} {}", trim_amount(event.amount), event.symbol),
            EventDirection::Neutral => format!("{} {}", trim_amount(event.amount), event.symbol),
        };
        Self {
            kind_label,
            amount,
            direction,
            counterparty: event.counterparty.clone(),
            time: event.timestamp.format("%H:%M").to_string(),
            comment: event.comment.clone(),
        }
    }
}

fn trim_amount(amount: f64) -> String {
    let formatted = format!("{amount:.4}");
    formatted
        .trim_end_matches('0')
        .trim_end_matches('.')
        .to_string()
}

/// Groups events into day sections, preserving input order.
///
/// Events are expected newest-first; consecutive events sharing a calendar
/// day fold into one section titled "Today", "Yesterday" or a date.
pub fn group_by_day(events: &[ActivityEvent], today: NaiveDate) -> Vec<Section> {
    let mut sections: Vec<Section> = Vec::new();
    let mut current_day: Option<NaiveDate> = None;

    for event in events {
        let day = event.timestamp.date_naive();
        if current_day != Some(day) {
            current_day = Some(day);
            sections.push(Section::Events(EventsSection {
                title: day_title(day, today),
                items: Vec::new(),
            }));
        }
        if let Some(Section::Events(section)) = sections.last_mut() {
            section.items.push(event.id.clone());
        }
    }

    sections
}

fn day_title(day: NaiveDate, today: NaiveDate) -> String {
    if day == today {
        "Today".to_string()
    } else if day == today - Duration::days(1) {
        "Yesterday".to_string()
    } else if day.year() == today.year() {
        day.format("%-d %B").to_string()
    } else {
        day.format("%-d %B %Y").to_string()
    }
}
