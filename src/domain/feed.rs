//! Activity list controller.
//!
//! Single source of truth for feed rendering. The controller owns the
//! applied [`Snapshot`], tracks the pagination footer, and forwards user
//! events to a non-owning delegate. It stores no event payloads: render
//! models are resolved through the delegate at draw time, and a miss
//! degrades to an empty placeholder row.

use std::sync::Weak;

use tracing::debug;

use crate::domain::event::EventModel;
use crate::domain::section::{PaginationState, Section, SectionKey};
use crate::domain::snapshot::{DiffOp, Snapshot, diff};

/// Receiver of feed events. Held weakly: the delegate owns and outlives
/// the controller, never the other way around.
pub trait ActivityListDelegate: Send + Sync {
    /// Resolves the render model for an item identifier.
    fn event_model(&self, id: &str) -> Option<EventModel>;
    /// A row was tapped.
    fn did_select_event(&self, id: &str);
    /// The list reached its boundary or the retry control was used.
    fn load_next_page(&self);
    /// The refresh gesture was released.
    fn did_pull_to_refresh(&self);
}

/// Externally supplied list-wide header content.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedHeader {
    pub title: String,
    pub subtitle: String,
}

/// A flattened renderable row of the feed.
#[derive(Debug, Clone, PartialEq)]
pub enum Row {
    Header(FeedHeader),
    SectionTitle(String),
    Event(String),
    ShimmerTitle,
    Shimmer(String),
    PaginationFooter(PaginationState),
}

#[derive(Default)]
pub struct ActivityListController {
    delegate: Option<Weak<dyn ActivityListDelegate>>,
    sections: Vec<Section>,
    snapshot: Snapshot<SectionKey, String>,
    pending_ops: Vec<DiffOp<SectionKey, String>>,
    pagination: Option<SectionKey>,
    pagination_generation: u64,
    header: Option<FeedHeader>,
    needs_full_reload: bool,
    boundary_armed: bool,
}

impl ActivityListController {
    pub fn new() -> Self {
        Self {
            boundary_armed: true,
            ..Self::default()
        }
    }

    pub fn set_delegate(&mut self, delegate: Weak<dyn ActivityListDelegate>) {
        self.delegate = Some(delegate);
    }

    fn delegate(&self) -> Option<std::sync::Arc<dyn ActivityListDelegate>> {
        self.delegate.as_ref()?.upgrade()
    }

    /// Replaces the whole snapshot with `sections`, in their given order.
    /// Pagination sections contribute existence only, never items; any
    /// beyond the first is dropped.
    pub fn set_sections(&mut self, sections: Vec<Section>) {
        let mut next = Snapshot::new();
        let mut kept = Vec::with_capacity(sections.len());
        let mut pagination = None;

        for section in sections {
            let key = match &section {
                Section::Events(events) => SectionKey::Events(events.title.clone()),
                Section::Shimmer(_) => SectionKey::Shimmer,
                Section::Pagination(_) => {
                    if pagination.is_some() {
                        debug!("dropping extra pagination section from set_sections");
                        continue;
                    }
                    self.pagination_generation += 1;
                    let key = SectionKey::Pagination(self.pagination_generation);
                    pagination = Some(key.clone());
                    key
                }
            };
            // Section identities must be unique within a snapshot.
            if next.contains_section(&key) {
                debug!("dropping section with duplicate identity");
                continue;
            }
            next.append_section(key.clone());
            next.append_items(&key, section.items().iter().cloned());
            kept.push(section);
        }

        let ops = diff(&self.snapshot, &next);
        self.snapshot = self.snapshot.applying(&ops);
        self.pending_ops.extend(ops);
        self.sections = kept;
        self.pagination = pagination;
        self.boundary_armed = true;
    }

    /// Shows the pagination footer with `state`, replacing any footer
    /// already present. Each call registers a fresh section identity so
    /// the diff engine sees a replacement, not a mutation.
    pub fn show_pagination(&mut self, state: PaginationState) {
        let mut next = self.snapshot.clone();
        if let Some(current) = self.pagination.take() {
            next.delete_section(&current);
        }
        self.pagination_generation += 1;
        let key = SectionKey::Pagination(self.pagination_generation);
        next.append_section(key.clone());

        let ops = diff(&self.snapshot, &next);
        self.snapshot = self.snapshot.applying(&ops);
        self.pending_ops.extend(ops);

        self.sections.retain(|s| !matches!(s, Section::Pagination(_)));
        self.sections.push(Section::Pagination(state));
        self.pagination = Some(key);
    }

    /// Removes the tracked pagination footer. No-op when none is shown.
    pub fn hide_pagination(&mut self) {
        let Some(current) = self.pagination.take() else {
            return;
        };
        let mut next = self.snapshot.clone();
        next.delete_section(&current);

        let ops = diff(&self.snapshot, &next);
        self.snapshot = self.snapshot.applying(&ops);
        self.pending_ops.extend(ops);

        self.sections.retain(|s| !matches!(s, Section::Pagination(_)));
    }

    /// Installs the list-wide header. Forces a full reload of the list.
    pub fn set_header(&mut self, header: Option<FeedHeader>) {
        self.header = header;
        self.needs_full_reload = true;
    }

    /// True once after the header changed; the render layer resets its
    /// viewport in response.
    pub fn take_full_reload(&mut self) -> bool {
        std::mem::take(&mut self.needs_full_reload)
    }

    /// Structural changes applied since the last call.
    pub fn take_changes(&mut self) -> Vec<DiffOp<SectionKey, String>> {
        std::mem::take(&mut self.pending_ops)
    }

    /// The flattened rows to draw, in order.
    pub fn rows(&self) -> Vec<Row> {
        let mut rows = Vec::with_capacity(self.snapshot.item_count() + self.snapshot.len() + 1);
        if let Some(header) = &self.header {
            rows.push(Row::Header(header.clone()));
        }
        for section in &self.sections {
            match section {
                Section::Events(events) => {
                    rows.push(Row::SectionTitle(events.title.clone()));
                    rows.extend(events.items.iter().cloned().map(Row::Event));
                }
                Section::Shimmer(items) => {
                    rows.push(Row::ShimmerTitle);
                    rows.extend(items.iter().cloned().map(Row::Shimmer));
                }
                Section::Pagination(state) => {
                    rows.push(Row::PaginationFooter(state.clone()));
                }
            }
        }
        rows
    }

    /// Resolves an event's render model through the delegate, at draw time.
    pub fn resolve(&self, id: &str) -> Option<EventModel> {
        self.delegate()?.event_model(id)
    }

    /// Momentary tap on a row: the selection is visual for a single frame,
    /// then the delegate is notified. Returns the tapped event id so the
    /// render layer can flash it. A tap on the error footer retries.
    pub fn select(&self, row_index: usize) -> Option<String> {
        match self.rows().get(row_index)? {
            Row::Event(id) => {
                let id = id.clone();
                if let Some(delegate) = self.delegate() {
                    delegate.did_select_event(&id);
                }
                Some(id)
            }
            Row::PaginationFooter(PaginationState::Error(_)) => {
                self.retry();
                None
            }
            _ => None,
        }
    }

    /// Retry affordance of the error footer.
    pub fn retry(&self) {
        if matches!(self.pagination_state(), Some(PaginationState::Error(_)))
            && let Some(delegate) = self.delegate()
        {
            delegate.load_next_page();
        }
    }

    /// The refresh gesture was released while the indicator was active.
    pub fn pull_to_refresh(&self) {
        if let Some(delegate) = self.delegate() {
            delegate.did_pull_to_refresh();
        }
    }

    /// Reports the rows currently on screen. Reaching the last item of the
    /// last section asks the delegate for the next page, edge-triggered:
    /// the trigger re-arms only when the boundary row leaves the viewport
    /// or the snapshot is replaced.
    pub fn note_visible_range(&mut self, first: usize, last: usize) {
        let Some(boundary) = self.boundary_row() else {
            return;
        };
        if boundary >= first && boundary <= last {
            if self.boundary_armed {
                self.boundary_armed = false;
                if let Some(delegate) = self.delegate() {
                    delegate.load_next_page();
                }
            }
        } else {
            self.boundary_armed = true;
        }
    }

    /// Index of the last item row of the last item-bearing section.
    fn boundary_row(&self) -> Option<usize> {
        self.rows()
            .iter()
            .rposition(|row| matches!(row, Row::Event(_) | Row::Shimmer(_)))
    }

    /// State of the footer, if one is shown.
    pub fn pagination_state(&self) -> Option<&PaginationState> {
        self.sections.iter().find_map(|section| match section {
            Section::Pagination(state) => Some(state),
            _ => None,
        })
    }

}
