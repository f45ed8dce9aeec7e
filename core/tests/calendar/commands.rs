// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::sync::{Arc, Mutex};

use calview_core::{
    Category, EventDraft, EventPatch, Method, PipelineError, Severity, StateKey, View,
};
use jiff::civil;

use crate::common::{
    Harness, MockTransport, Reply, standup_payload, stored_events, two_events_payload,
};

fn accepting_writes() -> MockTransport {
    let transport = MockTransport::serving(&standup_payload());
    transport.route(Method::Post, "/events", Reply::Status(201, String::new()));
    transport.route(Method::Put, "/events/e1", Reply::Status(200, String::new()));
    transport.route(Method::Delete, "/events/e1", Reply::Status(204, String::new()));
    transport
}

#[tokio::test(start_paused = true)]
async fn add_event_commits_persists_and_uploads() {
    // Arrange
    let harness = Harness::new(accepting_writes());
    let calendar = harness.ready_calendar().await;

    // Act
    let event = calendar
        .add_event(EventDraft {
            title: "Client presentation".to_string(),
            start: Some(civil::date(2024, 2, 1).at(15, 0, 0, 0)),
            ..Default::default()
        })
        .await;

    // Assert
    assert_eq!(event.category, Category::Work);
    assert_eq!(event.end, civil::date(2024, 2, 1).at(16, 0, 0, 0));
    assert_eq!(calendar.events().len(), 2);
    assert!(
        stored_events(harness.storage.as_ref())
            .iter()
            .any(|e| e.id == event.id)
    );
    assert_eq!(harness.transport.requests_to(Method::Post, "/events").len(), 1);
    assert_eq!(harness.notifier.severities(), vec![Severity::Success]);
}

#[tokio::test(start_paused = true)]
async fn add_event_keeps_local_change_when_upload_fails() {
    // Arrange
    let harness = Harness::new(MockTransport::serving(&standup_payload()));
    let calendar = harness.ready_calendar().await;

    // Act
    let event = calendar.add_event(EventDraft::default()).await;

    // Assert
    assert!(calendar.events().iter().any(|e| e.id == event.id));
    assert_eq!(harness.notifier.severities(), vec![Severity::Error]);
}

#[tokio::test(start_paused = true)]
async fn update_event_applies_patch() {
    // Arrange
    let harness = Harness::new(accepting_writes());
    let calendar = harness.ready_calendar().await;

    // Act
    let updated = calendar
        .update_event(
            "e1",
            EventPatch {
                title: Some("Standup with client".to_string()),
                category: Some(Category::Work),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    // Assert
    assert_eq!(updated.title, "Standup with client");
    assert_eq!(updated.color, Category::Work.color());
    assert_eq!(calendar.events()[0], updated);
    assert_eq!(stored_events(harness.storage.as_ref())[0], updated);

    let puts = harness.transport.requests_to(Method::Put, "/events/e1");
    assert_eq!(puts.len(), 1);
    assert_eq!(puts[0].body.as_ref().unwrap()["title"], "Standup with client");
}

#[tokio::test(start_paused = true)]
async fn update_of_unknown_event_changes_nothing() {
    // Arrange
    let harness = Harness::new(accepting_writes());
    let calendar = harness.ready_calendar().await;
    let before = calendar.events();

    // Act
    let result = calendar.update_event("nope", EventPatch::default()).await;

    // Assert
    assert!(result.is_none());
    assert_eq!(calendar.events(), before);
    assert!(harness.transport.requests_to(Method::Put, "/events").is_empty());
}

#[tokio::test(start_paused = true)]
async fn delete_event_removes_and_uploads() {
    // Arrange
    let harness = Harness::new(accepting_writes());
    let calendar = harness.ready_calendar().await;

    // Act
    let removed = calendar.delete_event("e1").await;

    // Assert
    assert!(removed);
    assert!(calendar.events().is_empty());
    assert!(stored_events(harness.storage.as_ref()).is_empty());
    assert_eq!(
        harness
            .transport
            .requests_to(Method::Delete, "/events/e1")
            .len(),
        1
    );
    assert!(!calendar.delete_event("e1").await);
}

#[tokio::test(start_paused = true)]
async fn refresh_events_reports_count() {
    // Arrange
    let harness = Harness::new(MockTransport::serving(&standup_payload()));
    let calendar = harness.ready_calendar().await;
    harness
        .transport
        .route(Method::Get, "/events", Reply::json(&two_events_payload()));

    // Act
    let count = calendar.refresh_events().await.unwrap();

    // Assert
    assert_eq!(count, 2);
    assert_eq!(calendar.events().len(), 2);
    assert!(!calendar.state().loading);
    assert_eq!(harness.notifier.severities(), vec![Severity::Success]);
}

#[tokio::test(start_paused = true)]
async fn refresh_events_surfaces_failures() {
    // Arrange
    let harness = Harness::new(MockTransport::serving(&standup_payload()));
    let calendar = harness.ready_calendar().await;
    harness.transport.clear();

    // Act
    let result = calendar.refresh_events().await;

    // Assert
    assert!(matches!(result, Err(PipelineError::Transport(_))));
    assert_eq!(calendar.events().len(), 1);
    assert!(!calendar.state().loading);
    assert_eq!(harness.notifier.severities(), vec![Severity::Error]);
}

#[tokio::test(start_paused = true)]
async fn switch_view_by_name_rejects_unknown_names() {
    // Arrange
    let harness = Harness::new(MockTransport::serving(&standup_payload()));
    let calendar = harness.ready_calendar().await;

    // Act & Assert
    assert!(calendar.switch_view_by_name("Week"));
    assert_eq!(calendar.state().view, View::Week);

    assert!(!calendar.switch_view_by_name("fortnight"));
    assert_eq!(calendar.state().view, View::Week);
}

#[tokio::test(start_paused = true)]
async fn select_date_in_month_view_opens_agenda() {
    // Arrange
    let harness = Harness::new(MockTransport::serving(&standup_payload()));
    let calendar = harness.ready_calendar().await;
    let time = calendar.state().current_date.time();

    // Act
    calendar.select_date(civil::date(2024, 2, 29));

    // Assert
    let state = calendar.state();
    assert_eq!(state.view, View::Agenda);
    assert_eq!(state.selected_date, Some(civil::date(2024, 2, 29)));
    assert_eq!(state.current_date, civil::date(2024, 2, 29).to_datetime(time));
}

#[tokio::test(start_paused = true)]
async fn select_date_in_week_view_only_selects() {
    // Arrange
    let harness = Harness::new(MockTransport::serving(&standup_payload()));
    let calendar = harness.ready_calendar().await;
    calendar.switch_view(View::Week);
    let before = calendar.state().current_date;

    // Act
    calendar.select_date(civil::date(2024, 2, 29));

    // Assert
    let state = calendar.state();
    assert_eq!(state.view, View::Week);
    assert_eq!(state.current_date, before);
    assert_eq!(state.selected_date, Some(civil::date(2024, 2, 29)));
}

#[tokio::test(start_paused = true)]
async fn subscribers_see_commands() {
    // Arrange
    let harness = Harness::new(MockTransport::serving(&standup_payload()));
    let calendar = harness.ready_calendar().await;
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let id = calendar.subscribe(move |change, _| {
        sink.lock().unwrap().push(change.key());
        Ok(())
    });

    // Act
    calendar.switch_view(View::Agenda);
    calendar.unsubscribe(id);
    calendar.switch_view(View::Week);

    // Assert
    assert_eq!(*seen.lock().unwrap(), vec![StateKey::View]);
}
