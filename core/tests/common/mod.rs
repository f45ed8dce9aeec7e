// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Common test utilities for integration tests.
//!
//! This module provides shared test infrastructure including:
//! - Test data factories (fixtures)
//! - In-memory collaborators that record what the core asks of them

mod fixtures;
mod mocks;

#[allow(unused_imports)]
pub use fixtures::{
    Harness, stored_events, stored_snapshot, standup_payload, test_config, two_events_payload,
};
#[allow(unused_imports)]
pub use mocks::{MockTransport, RecordingNotifier, RecordingRenderer, Reply};
