// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use calview_core::{EventDraft, Method, PipelineError, RemoteChange, TransportError};

use crate::common::{Harness, MockTransport, Reply};

fn accepting() -> MockTransport {
    let transport = MockTransport::failing();
    transport.route(Method::Post, "/events", Reply::Status(201, String::new()));
    transport.route(Method::Put, "/events/e1", Reply::Status(200, String::new()));
    transport.route(Method::Delete, "/events/e1", Reply::Status(204, String::new()));
    transport
}

#[tokio::test]
async fn create_posts_the_event() {
    // Arrange
    let harness = Harness::new(accepting());
    let pipeline = harness.pipeline();
    let event = pipeline.create_event(EventDraft {
        title: "Dentist".to_string(),
        ..Default::default()
    });

    // Act
    pipeline
        .push(&RemoteChange::Create(event.clone()))
        .await
        .unwrap();

    // Assert
    let requests = harness.transport.requests_to(Method::Post, "/events");
    assert_eq!(requests.len(), 1);
    let body = requests[0].body.as_ref().unwrap();
    assert_eq!(body["id"], event.id.as_str());
    assert_eq!(body["title"], "Dentist");
    assert_eq!(body["category"], "health");
}

#[tokio::test]
async fn update_puts_to_the_event_url() {
    // Arrange
    let harness = Harness::new(accepting());
    let pipeline = harness.pipeline();
    let mut event = pipeline.create_event(EventDraft::default());
    event.id = "e1".to_string();

    // Act
    pipeline.push(&RemoteChange::Update(event)).await.unwrap();

    // Assert
    let requests = harness.transport.requests_to(Method::Put, "/events/e1");
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].url, "http://calview.test/api/events/e1");
}

#[tokio::test]
async fn delete_sends_no_body() {
    // Arrange
    let harness = Harness::new(accepting());

    // Act
    harness
        .pipeline()
        .push(&RemoteChange::Delete("e1".to_string()))
        .await
        .unwrap();

    // Assert
    let requests = harness.transport.requests_to(Method::Delete, "/events/e1");
    assert_eq!(requests.len(), 1);
    assert!(requests[0].body.is_none());
}

#[tokio::test]
async fn rejected_push_is_an_error() {
    // Arrange
    let transport = MockTransport::failing();
    transport.route(
        Method::Delete,
        "/events/e1",
        Reply::Status(404, "missing".to_string()),
    );
    let harness = Harness::new(transport);

    // Act
    let result = harness
        .pipeline()
        .push(&RemoteChange::Delete("e1".to_string()))
        .await;

    // Assert
    assert!(matches!(
        result,
        Err(PipelineError::Transport(TransportError::Status { status: 404, .. }))
    ));
}
