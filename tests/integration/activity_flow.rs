//! End-to-end feed flows: day grouping into the controller, paging
//! through the footer state machine, and boundary-triggered loads.

use std::sync::Weak;

use chrono::NaiveDate;

use ember_wallet::domain::event::{EventKind, group_by_day};
use ember_wallet::domain::feed::{ActivityListController, ActivityListDelegate, Row};
use ember_wallet::domain::section::{PaginationState, Section};

use crate::support::{RecordingDelegate, event};

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, 5).expect("valid date")
}

#[test]
fn first_page_replaces_the_shimmer_snapshot() {
    let events = vec![
        event("a", EventKind::Received, "2026-03-05T14:02:00Z"),
        event("b", EventKind::Sent, "2026-03-04T10:00:00Z"),
    ];
    let delegate = RecordingDelegate::with_events(&events);
    let mut controller = ActivityListController::new();
    let delegate_dyn: std::sync::Arc<dyn ActivityListDelegate> = delegate.clone();
    let weak: Weak<dyn ActivityListDelegate> = std::sync::Arc::downgrade(&delegate_dyn);
    controller.set_delegate(weak);

    // Cold start: shimmer placeholders while the first page is in flight.
    controller.set_sections(vec![Section::Shimmer(vec![
        "shimmer-0".to_string(),
        "shimmer-1".to_string(),
    ])]);
    assert!(
        controller
            .rows()
            .iter()
            .any(|row| matches!(row, Row::Shimmer(_)))
    );

    // Page arrives: the whole snapshot is replaced by day sections.
    controller.set_sections(group_by_day(&events, today()));
    let rows = controller.rows();
    assert_eq!(
        rows,
        vec![
            Row::SectionTitle("Today".to_string()),
            Row::Event("a".to_string()),
            Row::SectionTitle("Yesterday".to_string()),
            Row::Event("b".to_string()),
        ]
    );
    assert!(controller.resolve("a").is_some());
    assert!(controller.resolve("b").is_some());
}

#[test]
fn paging_cycles_the_footer_state_machine() {
    let events = vec![event("a", EventKind::Received, "2026-03-05T14:02:00Z")];
    let delegate = RecordingDelegate::with_events(&events);
    let mut controller = ActivityListController::new();
    let delegate_dyn: std::sync::Arc<dyn ActivityListDelegate> = delegate.clone();
    let weak: Weak<dyn ActivityListDelegate> = std::sync::Arc::downgrade(&delegate_dyn);
    controller.set_delegate(weak);
    controller.set_sections(group_by_day(&events, today()));

    // Hidden -> Loading.
    controller.show_pagination(PaginationState::Loading);
    assert_eq!(
        controller.pagination_state(),
        Some(&PaginationState::Loading)
    );

    // Loading -> Error.
    controller.show_pagination(PaginationState::Error("Failed to load".to_string()));
    let footers = controller
        .rows()
        .iter()
        .filter(|row| matches!(row, Row::PaginationFooter(_)))
        .count();
    assert_eq!(footers, 1);

    // Retry notifies the delegate, the owner shows Loading again.
    controller.retry();
    assert_eq!(delegate.calls(), vec!["next_page"]);
    controller.show_pagination(PaginationState::Loading);

    // Success: the owner hides the footer.
    controller.hide_pagination();
    assert!(controller.pagination_state().is_none());

    // A second hide stays a no-op.
    controller.hide_pagination();
    assert!(controller.pagination_state().is_none());
}

#[test]
fn boundary_reach_survives_appending_a_page() {
    let first_page = vec![
        event("a", EventKind::Received, "2026-03-05T14:02:00Z"),
        event("b", EventKind::Sent, "2026-03-05T12:00:00Z"),
    ];
    let second_page = vec![
        event("a", EventKind::Received, "2026-03-05T14:02:00Z"),
        event("b", EventKind::Sent, "2026-03-05T12:00:00Z"),
        event("c", EventKind::Sent, "2026-03-04T09:00:00Z"),
    ];
    let delegate = RecordingDelegate::with_events(&second_page);
    let mut controller = ActivityListController::new();
    let delegate_dyn: std::sync::Arc<dyn ActivityListDelegate> = delegate.clone();
    let weak: Weak<dyn ActivityListDelegate> = std::sync::Arc::downgrade(&delegate_dyn);
    controller.set_delegate(weak);

    controller.set_sections(group_by_day(&first_page, today()));
    // Rows: title, a, b — the boundary is row 2 and fires exactly once
    // while the user lingers there.
    controller.note_visible_range(0, 2);
    controller.note_visible_range(0, 2);
    assert_eq!(delegate.calls(), vec!["next_page"]);

    // The next page lands; the snapshot is replaced and the trigger
    // re-arms for the new boundary.
    controller.set_sections(group_by_day(&second_page, today()));
    controller.note_visible_range(0, 4);
    assert_eq!(delegate.calls(), vec!["next_page", "next_page"]);
}

#[test]
fn selection_and_refresh_reach_the_delegate() {
    let events = vec![event("a", EventKind::Received, "2026-03-05T14:02:00Z")];
    let delegate = RecordingDelegate::with_events(&events);
    let mut controller = ActivityListController::new();
    let delegate_dyn: std::sync::Arc<dyn ActivityListDelegate> = delegate.clone();
    let weak: Weak<dyn ActivityListDelegate> = std::sync::Arc::downgrade(&delegate_dyn);
    controller.set_delegate(weak);
    controller.set_sections(group_by_day(&events, today()));

    assert_eq!(controller.select(1), Some("a".to_string()));
    controller.pull_to_refresh();
    assert_eq!(delegate.calls(), vec!["select:a", "refresh"]);
}
