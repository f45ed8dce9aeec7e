// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use calview_core::{EVENTS_KEY, KeyValueStore, Method, PipelineError, TransportError};
use serde_json::json;

use crate::common::{
    Harness, MockTransport, Reply, standup_payload, stored_events, two_events_payload,
};

#[tokio::test]
async fn refresh_returns_and_persists_events() {
    // Arrange
    let harness = Harness::new(MockTransport::serving(&two_events_payload()));

    // Act
    let events = harness.pipeline().refresh().await.unwrap();

    // Assert
    assert_eq!(events.len(), 2);
    assert_eq!(stored_events(harness.storage.as_ref()), events);
}

#[tokio::test]
async fn refresh_propagates_transport_failures() {
    // Arrange
    let harness = Harness::new(MockTransport::failing());

    // Act
    let result = harness.pipeline().refresh().await;

    // Assert
    assert!(matches!(
        result,
        Err(PipelineError::Transport(TransportError::Network(_)))
    ));
    assert_eq!(harness.storage.get(EVENTS_KEY).unwrap(), None);
}

#[tokio::test]
async fn refresh_does_not_fall_back_to_cache() {
    // Arrange
    let online = Harness::new(MockTransport::serving(&standup_payload()));
    online.pipeline().load().await;

    online.transport.route(
        Method::Get,
        "/events",
        Reply::Status(500, "down".to_string()),
    );

    // Act
    let result = online.pipeline().refresh().await;

    // Assert
    match result {
        Err(PipelineError::Transport(TransportError::Status { status, body })) => {
            assert_eq!(status, 500);
            assert_eq!(body, "down");
        }
        other => panic!("unexpected result: {other:?}"),
    }
    // the cache is untouched
    assert_eq!(stored_events(online.storage.as_ref()).len(), 1);
}

#[tokio::test]
async fn refresh_rejects_unexpected_payloads() {
    // Arrange
    let harness = Harness::new(MockTransport::serving(&json!({"data": []})));

    // Act
    let result = harness.pipeline().refresh().await;

    // Assert
    assert!(matches!(result, Err(PipelineError::UnexpectedPayload(_))));
}

#[tokio::test]
async fn refresh_rejects_non_json_bodies() {
    // Arrange
    let transport = MockTransport::failing();
    transport.route(
        Method::Get,
        "/events",
        Reply::Status(200, "<html></html>".to_string()),
    );
    let harness = Harness::new(transport);

    // Act
    let result = harness.pipeline().refresh().await;

    // Assert
    assert!(matches!(
        result,
        Err(PipelineError::Transport(TransportError::Body(_)))
    ));
}

#[tokio::test(start_paused = true)]
async fn refresh_reports_timeouts() {
    // Arrange
    let transport = MockTransport::failing();
    transport.route(Method::Get, "/events", Reply::Hang);
    let harness = Harness::new(transport);

    // Act
    let result = harness.pipeline().refresh().await;

    // Assert
    assert!(matches!(
        result,
        Err(PipelineError::Transport(TransportError::Timeout(_)))
    ));
}
