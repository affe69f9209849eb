//! Shared doubles for the flow tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use ember_wallet::domain::event::{ActivityEvent, EventKind, EventModel};
use ember_wallet::domain::feed::ActivityListDelegate;

pub fn event(id: &str, kind: EventKind, timestamp: &str) -> ActivityEvent {
    ActivityEvent {
        id: id.to_string(),
        kind,
        amount: 12.5,
        symbol: "EMB".to_string(),
        counterparty: "EQcounterparty".to_string(),
        timestamp: timestamp.parse().expect("test timestamp"),
        comment: None,
    }
}

/// Delegate that resolves models from a fixed set of events and records
/// every callback in order.
pub struct RecordingDelegate {
    models: Mutex<HashMap<String, EventModel>>,
    calls: Mutex<Vec<String>>,
}

impl RecordingDelegate {
    pub fn with_events(events: &[ActivityEvent]) -> Arc<Self> {
        let models = events
            .iter()
            .map(|event| (event.id.clone(), EventModel::from_event(event)))
            .collect();
        Arc::new(Self {
            models: Mutex::new(models),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("calls lock").clone()
    }
}

impl ActivityListDelegate for RecordingDelegate {
    fn event_model(&self, id: &str) -> Option<EventModel> {
        self.models.lock().expect("models lock").get(id).cloned()
    }

    fn did_select_event(&self, id: &str) {
        self.calls
            .lock()
            .expect("calls lock")
            .push(format!("select:{id}"));
    }

    fn load_next_page(&self) {
        self.calls
            .lock()
            .expect("calls lock")
            .push("next_page".to_string());
    }

    fn did_pull_to_refresh(&self) {
        self.calls
            .lock()
            .expect("calls lock")
            .push("refresh".to_string());
    }
}
