// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use calview_core::{Category, EVENTS_KEY, KeyValueStore, Method};
use jiff::civil;
use serde_json::json;

use crate::common::{Harness, MockTransport, Reply, standup_payload, stored_events};

#[tokio::test]
async fn load_normalizes_network_payload_and_persists_it() {
    // Arrange
    let harness = Harness::new(MockTransport::serving(&standup_payload()));
    let pipeline = harness.pipeline();

    // Act
    let events = pipeline.load().await;

    // Assert
    assert_eq!(events.len(), 1);
    let event = &events[0];
    assert_eq!(event.id, "e1");
    assert_eq!(event.title, "Standup");
    assert!(!event.all_day);
    assert_eq!(event.category, Category::Other);
    assert_eq!(event.start, civil::date(2024, 1, 1).at(9, 0, 0, 0));
    assert_eq!(event.end, civil::date(2024, 1, 1).at(9, 30, 0, 0));

    assert_eq!(stored_events(harness.storage.as_ref()), events);
}

#[tokio::test]
async fn load_fetches_calendars_before_events() {
    // Arrange
    let harness = Harness::new(MockTransport::serving(&standup_payload()));
    let pipeline = harness.pipeline();

    // Act
    pipeline.load().await;

    // Assert
    let urls: Vec<String> = harness
        .transport
        .requests()
        .into_iter()
        .map(|r| r.url)
        .collect();
    assert_eq!(
        urls,
        vec![
            "http://calview.test/api/calendars".to_string(),
            "http://calview.test/api/events".to_string(),
        ]
    );
}

#[tokio::test]
async fn load_applies_calendar_colors() {
    // Arrange
    let transport = MockTransport::serving(&json!([
        {"id": "x", "title": "Standup", "calendarId": "team"},
        {"id": "y", "title": "Standup", "calendarId": "team", "color": "#abcdef"},
    ]));
    transport.route(
        Method::Get,
        "/calendars",
        Reply::json(&json!({"success": true, "calendars": [
            {"id": "team", "name": "Team", "color": "#112233"},
        ]})),
    );
    let harness = Harness::new(transport);
    let pipeline = harness.pipeline();

    // Act
    let events = pipeline.load().await;

    // Assert
    assert_eq!(events[0].color, "#112233");
    assert_eq!(events[1].color, "#abcdef");
    assert_eq!(pipeline.calendars().len(), 1);
}

#[tokio::test]
async fn failing_calendar_fetch_does_not_abort_load() {
    // Arrange
    let transport = MockTransport::serving(&standup_payload());
    transport.route(
        Method::Get,
        "/calendars",
        Reply::Status(500, "boom".to_string()),
    );
    let harness = Harness::new(transport);

    // Act
    let events = harness.pipeline().load().await;

    // Assert
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].color, Category::Other.color());
}

#[tokio::test]
async fn fallback_chain_is_idempotent() {
    // Arrange
    let harness = Harness::new(MockTransport::failing());
    let pipeline = harness.pipeline();

    // Act
    let first = pipeline.load().await;
    let persisted = stored_events(harness.storage.as_ref());
    let second = pipeline.load().await;

    // Assert
    assert_eq!(first.len(), Category::ALL.len());
    assert_eq!(persisted, first);

    let first_ids: Vec<&str> = first.iter().map(|e| e.id.as_str()).collect();
    let second_ids: Vec<&str> = second.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(first_ids, second_ids);
    assert!(first_ids.iter().all(|id| id.starts_with("sample-")));
}

#[tokio::test]
async fn load_falls_back_to_cache() {
    // Arrange
    let online = Harness::new(MockTransport::serving(&standup_payload()));
    online.pipeline().load().await;
    let cached = online.storage.get(EVENTS_KEY).unwrap().unwrap();

    let offline = Harness::new(MockTransport::failing());
    offline.storage.set(EVENTS_KEY, &cached).unwrap();

    // Act
    let events = offline.pipeline().load().await;

    // Assert
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].id, "e1");
}

#[tokio::test]
async fn cache_in_remote_shape_is_normalized() {
    // Arrange
    let harness = Harness::new(MockTransport::failing());
    harness
        .storage
        .set(EVENTS_KEY, &standup_payload().to_string())
        .unwrap();

    // Act
    let events = harness.pipeline().load().await;

    // Assert
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].title, "Standup");
}

#[tokio::test]
async fn malformed_cache_falls_back_to_samples() {
    // Arrange
    let harness = Harness::new(MockTransport::failing());
    harness.storage.set(EVENTS_KEY, "{oops").unwrap();

    // Act
    let events = harness.pipeline().load().await;

    // Assert
    assert_eq!(events.len(), Category::ALL.len());
    assert_eq!(events[0].id, "sample-work");
}

#[tokio::test]
async fn empty_cache_falls_back_to_samples() {
    // Arrange
    let harness = Harness::new(MockTransport::failing());
    harness.storage.set(EVENTS_KEY, "[]").unwrap();

    // Act
    let events = harness.pipeline().load().await;

    // Assert
    assert_eq!(events.len(), Category::ALL.len());
}

#[tokio::test]
async fn unsuccessful_payload_is_a_failed_tier() {
    // Arrange
    let transport = MockTransport::serving(&json!({"success": false, "events": []}));
    let harness = Harness::new(transport);

    // Act
    let events = harness.pipeline().load().await;

    // Assert
    assert!(events.iter().all(|e| e.id.starts_with("sample-")));
}

#[tokio::test]
async fn error_status_is_a_failed_tier() {
    // Arrange
    let transport = MockTransport::failing();
    transport.route(
        Method::Get,
        "/events",
        Reply::Status(503, standup_payload().to_string()),
    );
    let harness = Harness::new(transport);

    // Act
    let events = harness.pipeline().load().await;

    // Assert
    assert_eq!(events.len(), Category::ALL.len());
}

#[tokio::test(start_paused = true)]
async fn slow_network_times_out() {
    // Arrange
    let transport = MockTransport::failing();
    transport.route(Method::Get, "/events", Reply::Hang);
    transport.route(Method::Get, "/calendars", Reply::Hang);
    let harness = Harness::new(transport);

    // Act
    let started = tokio::time::Instant::now();
    let events = harness.pipeline().load().await;

    // Assert
    assert_eq!(events.len(), Category::ALL.len());
    // one deadline for the calendars, one for the events
    assert!(started.elapsed() >= std::time::Duration::from_secs(20));
}

#[tokio::test]
async fn merges_legacy_recurrence_fields() {
    // Arrange
    let transport = MockTransport::serving(&json!([{
        "id": "r1",
        "title": "Yoga",
        "start": "2024-01-01T07:00:00",
        "rrule": "FREQ=WEEKLY;BYDAY=MO",
        "repeatRule": ["", "EXDATE:20240108T070000"],
    }]));
    let harness = Harness::new(transport);

    // Act
    let events = harness.pipeline().load().await;

    // Assert
    assert_eq!(
        events[0].recurrence,
        vec!["RRULE:FREQ=WEEKLY;BYDAY=MO", "EXDATE:20240108T070000"]
    );
}

#[tokio::test]
async fn skips_non_object_entries() {
    // Arrange
    let transport = MockTransport::serving(&json!({
        "success": true,
        "events": [{"id": "ok", "start": "2024-01-01"}, "garbage", 7],
    }));
    let harness = Harness::new(transport);

    // Act
    let events = harness.pipeline().load().await;

    // Assert
    assert_eq!(events.len(), 1);
    assert!(events[0].all_day);
}

#[tokio::test]
async fn mistyped_fields_fall_back_to_defaults() {
    // Arrange
    let transport = MockTransport::serving(&json!([
        {"id": "e1", "title": "Standup", "start": "2024-01-01T09:00:00", "allDay": "false"},
        {"id": "e2", "title": 42, "start": "2024-01-02"},
        {"id": "e3", "title": "Dentist", "start": "2024-01-03T08:00:00", "color": 5},
    ]));
    let harness = Harness::new(transport);

    // Act
    let events = harness.pipeline().load().await;

    // Assert
    let ids: Vec<&str> = events.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(ids, vec!["e1", "e2", "e3"]);

    assert!(!events[0].all_day);
    assert_eq!(events[1].title, "(No title)");
    assert!(events[1].all_day);
    assert_eq!(events[2].category, Category::Health);
    assert_eq!(events[2].color, Category::Health.color());
}
