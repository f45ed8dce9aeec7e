// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Calendar orchestration core: a reactive state store, an event pipeline with
//! network → cache → synthetic fallback, gesture and keyboard navigation, and a
//! recurrence rule encoder.

#![warn(
    trivial_casts,
    trivial_numeric_casts,
    missing_debug_implementations,
    missing_docs,
    unsafe_code,
    unused_import_braces,
    unused_qualifications,
    clippy::dbg_macro
)]

mod calendar;
mod config;
mod datetime;
mod error;
mod event;
mod gesture;
mod pipeline;
mod presenter;
mod recurrence;
mod state;
mod storage;
mod transport;

pub use crate::calendar::{Calendar, Collaborators, Lifecycle};
pub use crate::config::{APP_NAME, Config, ConfigDuration};
pub use crate::datetime::LooseDateTime;
pub use crate::error::{PipelineError, StorageError, TransportError};
pub use crate::event::{CalendarInfo, Category, Event, EventDraft, EventPatch};
pub use crate::gesture::{
    CycleDirection, Gesture, GestureNavigator, GestureThresholds, Intent, Key, Point, PointerEvent,
    PointerPhase, SwipeDirection,
};
pub use crate::pipeline::{EventPipeline, RemoteChange};
pub use crate::presenter::{LogNotifier, Notifier, Renderer, Severity};
pub use crate::recurrence::{
    Frequency, RecurrenceConfig, RecurrenceEncoder, RecurrenceEnd, RepeatBy,
};
pub use crate::state::{
    CalendarState, Direction, Settings, StateChange, StateKey, StatePatch, StateSnapshot,
    StateStore, SubscriberError, SubscriptionId, View,
};
pub use crate::storage::{EVENTS_KEY, FileStore, KeyValueStore, MemoryStore, STATE_KEY};
pub use crate::transport::{HttpTransport, Method, Request, Response, Transport};
