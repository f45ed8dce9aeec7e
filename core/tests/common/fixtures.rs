// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Test data factories for integration tests.
//!
//! This module provides helper functions to create configurations, payloads, and a
//! harness bundling the recording collaborators.

use std::sync::Arc;
use std::time::Duration;

use calview_core::{
    Calendar, Collaborators, Config, ConfigDuration, EVENTS_KEY, Event, EventPipeline,
    KeyValueStore, MemoryStore, STATE_KEY, StateSnapshot,
};
use jiff::tz::TimeZone;
use serde_json::{Value, json};

use super::mocks::{MockTransport, RecordingNotifier, RecordingRenderer};

/// Creates a configuration pointing at a fake service.
#[must_use]
pub fn test_config() -> Config {
    Config {
        api_base: "http://calview.test/api".to_string(),
        fetch_timeout: ConfigDuration(Duration::from_secs(10)),
        refresh_interval: ConfigDuration(Duration::from_secs(300)),
        ..Config::default()
    }
}

/// The single-event payload used throughout the pipeline tests.
#[must_use]
pub fn standup_payload() -> Value {
    json!({
        "success": true,
        "events": [{
            "id": "e1",
            "title": "Standup",
            "start": "2024-01-01T09:00:00",
            "end": "2024-01-01T09:30:00",
        }],
    })
}

/// A bare payload with two events.
#[must_use]
pub fn two_events_payload() -> Value {
    json!([
        {"id": "a", "title": "Dentist", "start": "2024-01-02T10:00:00"},
        {"id": "b", "title": "Team meeting", "start": "2024-01-03T14:00:00", "end": "2024-01-03T15:00:00"},
    ])
}

/// Decodes the event collection persisted in `storage`.
///
/// # Panics
///
/// Panics if nothing or something malformed is stored.
#[must_use]
pub fn stored_events(storage: &dyn KeyValueStore) -> Vec<Event> {
    let raw = storage
        .get(EVENTS_KEY)
        .unwrap()
        .expect("events should be persisted");
    serde_json::from_str(&raw).unwrap()
}

/// Decodes the view snapshot persisted in `storage`.
///
/// # Panics
///
/// Panics if nothing or something malformed is stored.
#[must_use]
pub fn stored_snapshot(storage: &dyn KeyValueStore) -> StateSnapshot {
    let raw = storage
        .get(STATE_KEY)
        .unwrap()
        .expect("snapshot should be persisted");
    serde_json::from_str(&raw).unwrap()
}

/// The recording collaborators of one test.
#[derive(Debug)]
pub struct Harness {
    pub transport: Arc<MockTransport>,
    pub storage: Arc<MemoryStore>,
    pub renderer: Arc<RecordingRenderer>,
    pub notifier: Arc<RecordingNotifier>,
}

impl Harness {
    /// Creates a harness around `transport` with an empty store.
    #[must_use]
    pub fn new(transport: MockTransport) -> Self {
        Self {
            transport: Arc::new(transport),
            storage: Arc::new(MemoryStore::new()),
            renderer: Arc::default(),
            notifier: Arc::default(),
        }
    }

    /// The collaborators as the core expects them.
    #[must_use]
    pub fn collaborators(&self) -> Collaborators {
        Collaborators {
            transport: self.transport.clone(),
            storage: self.storage.clone(),
            renderer: self.renderer.clone(),
            notifier: self.notifier.clone(),
        }
    }

    /// A pipeline over the harness, resolving times in UTC.
    #[must_use]
    pub fn pipeline(&self) -> EventPipeline {
        EventPipeline::new(self.transport.clone(), self.storage.clone(), &test_config())
            .with_time_zone(TimeZone::UTC)
    }

    /// A calendar over the harness, resolving times in UTC.
    #[must_use]
    pub fn calendar(&self) -> Calendar {
        Calendar::with_time_zone(test_config(), self.collaborators(), TimeZone::UTC)
    }

    /// A calendar that has completed `init`.
    pub async fn ready_calendar(&self) -> Calendar {
        let calendar = self.calendar();
        calendar.init().await;
        calendar
    }
}
