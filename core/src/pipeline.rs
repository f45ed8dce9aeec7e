// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

mod decode;
mod normalize;
mod sample;

use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use jiff::Zoned;
use jiff::civil::DateTime;
use jiff::tz::TimeZone;
use serde_json::Value;

use crate::config::Config;
use crate::error::{PipelineError, TransportError};
use crate::event::{CalendarInfo, Event, EventDraft};
use crate::pipeline::decode::{Payload, decode_calendars, decode_events};
use crate::pipeline::normalize::Normalizer;
use crate::pipeline::sample::sample_events;
use crate::storage::{EVENTS_KEY, KeyValueStore, read_json, write_json};
use crate::transport::{Method, Request, Response, Transport};

/// A local modification to mirror on the remote service.
#[derive(Debug, Clone)]
pub enum RemoteChange {
    /// A newly added event.
    Create(Event),

    /// An edited event.
    Update(Event),

    /// The id of a removed event.
    Delete(String),
}

/// Loads, normalizes and caches the event collection.
///
/// [`load`](Self::load) never fails: it falls back from the network to the local cache
/// and finally to illustrative sample events. [`refresh`](Self::refresh) only talks to the
/// network and reports what went wrong.
#[derive(Debug)]
pub struct EventPipeline {
    transport: Arc<dyn Transport>,
    storage: Arc<dyn KeyValueStore>,
    events_url: String,
    calendars_url: String,
    timeout: Duration,
    tz: TimeZone,
    calendars: RwLock<Vec<CalendarInfo>>,
}

impl EventPipeline {
    /// Creates a pipeline resolving times in the system time zone.
    pub fn new(
        transport: Arc<dyn Transport>,
        storage: Arc<dyn KeyValueStore>,
        config: &Config,
    ) -> Self {
        Self {
            transport,
            storage,
            events_url: config.events_url(),
            calendars_url: config.calendars_url(),
            timeout: config.fetch_timeout.get(),
            tz: TimeZone::system(),
            calendars: RwLock::default(),
        }
    }

    /// Resolves times in `tz` instead of the system time zone.
    #[must_use]
    pub fn with_time_zone(mut self, tz: TimeZone) -> Self {
        self.tz = tz;
        self
    }

    /// The time zone events are converted into.
    pub fn time_zone(&self) -> &TimeZone {
        &self.tz
    }

    /// The calendar configuration from the last successful fetch.
    pub fn calendars(&self) -> Vec<CalendarInfo> {
        self.calendars
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Loads the event collection, trying the network, then the cache, then samples.
    #[tracing::instrument(skip(self))]
    pub async fn load(&self) -> Vec<Event> {
        match self.fetch().await {
            Ok(events) => {
                tracing::info!(count = events.len(), "events loaded from network");
                self.persist(&events);
                return events;
            }
            Err(err) => tracing::warn!(%err, "network load failed, trying cache"),
        }

        let cached = self.load_cached();
        if !cached.is_empty() {
            tracing::info!(count = cached.len(), "events loaded from cache");
            return cached;
        }

        let samples = sample_events(self.now().date());
        tracing::info!(count = samples.len(), "no cached events, using samples");
        self.persist(&samples);
        samples
    }

    /// Fetches the event collection from the network and caches it.
    #[tracing::instrument(skip(self))]
    pub async fn refresh(&self) -> Result<Vec<Event>, PipelineError> {
        let events = self.fetch().await?;
        tracing::info!(count = events.len(), "events refreshed");
        self.persist(&events);
        Ok(events)
    }

    /// Mirrors a local change on the remote service.
    #[tracing::instrument(skip(self))]
    pub async fn push(&self, change: &RemoteChange) -> Result<(), PipelineError> {
        let (method, url, body) = match change {
            RemoteChange::Create(event) => {
                (Method::Post, self.events_url.clone(), Some(serde_json::to_value(event)?))
            }
            RemoteChange::Update(event) => (
                Method::Put,
                self.event_url(&event.id),
                Some(serde_json::to_value(event)?),
            ),
            RemoteChange::Delete(id) => (Method::Delete, self.event_url(id), None),
        };

        let request = Request {
            method,
            url,
            body,
            timeout: self.timeout,
        };
        self.send(request).await?.error_for_status()?;
        Ok(())
    }

    /// Builds a canonical event from a form draft.
    pub fn create_event(&self, draft: EventDraft) -> Event {
        let calendars = self.calendars();
        Normalizer::new(&self.tz, &calendars, self.now()).from_draft(draft)
    }

    /// Writes the collection under [`EVENTS_KEY`].
    pub fn persist(&self, events: &[Event]) -> bool {
        write_json(self.storage.as_ref(), EVENTS_KEY, events)
    }

    /// Reads the cached collection, normalizing whatever shape was stored.
    pub fn load_cached(&self) -> Vec<Event> {
        let Some(value) = read_json::<Value>(self.storage.as_ref(), EVENTS_KEY) else {
            return Vec::new();
        };

        match Payload::classify(value).into_entries() {
            Ok(entries) => self.normalize(entries),
            Err(reason) => {
                tracing::warn!(%reason, "ignoring cached events");
                Vec::new()
            }
        }
    }

    async fn fetch(&self) -> Result<Vec<Event>, PipelineError> {
        self.fetch_calendars().await;

        let response = self
            .send(Request::get(&self.events_url, self.timeout))
            .await?
            .error_for_status()?;
        let value: Value = response.json()?;

        let entries = Payload::classify(value)
            .into_entries()
            .map_err(PipelineError::UnexpectedPayload)?;
        Ok(self.normalize(entries))
    }

    /// Updates the calendar configuration; failures keep the previous one.
    async fn fetch_calendars(&self) {
        let result = self
            .send(Request::get(&self.calendars_url, self.timeout))
            .await
            .and_then(Response::error_for_status)
            .and_then(|response| response.json::<Value>());

        match result {
            Ok(value) => {
                let calendars = decode_calendars(value);
                tracing::debug!(count = calendars.len(), "calendars fetched");
                *self
                    .calendars
                    .write()
                    .unwrap_or_else(PoisonError::into_inner) = calendars;
            }
            Err(err) => tracing::warn!(%err, "failed to fetch calendars"),
        }
    }

    async fn send(&self, request: Request) -> Result<Response, TransportError> {
        let limit = request.timeout;
        match tokio::time::timeout(limit, self.transport.send(request)).await {
            Ok(result) => result,
            Err(_) => Err(TransportError::Timeout(limit)),
        }
    }

    fn normalize(&self, entries: Vec<Value>) -> Vec<Event> {
        let calendars = self.calendars();
        Normalizer::new(&self.tz, &calendars, self.now()).normalize_all(decode_events(entries))
    }

    fn event_url(&self, id: &str) -> String {
        format!("{}/{}", self.events_url.trim_end_matches('/'), id)
    }

    fn now(&self) -> DateTime {
        Zoned::now().with_time_zone(self.tz.clone()).datetime()
    }
}
