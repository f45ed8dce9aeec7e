// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};
use std::time::Duration;

use jiff::Zoned;
use jiff::civil::{Date, DateTime};
use jiff::tz::TimeZone;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use crate::config::Config;
use crate::error::PipelineError;
use crate::event::{Event, EventDraft, EventPatch};
use crate::gesture::{Gesture, GestureNavigator, Intent, Key, PointerEvent};
use crate::pipeline::{EventPipeline, RemoteChange};
use crate::presenter::{Notifier, Renderer, Severity};
use crate::state::{
    CalendarState, Direction, StateChange, StateKey, StatePatch, StateSnapshot, StateStore,
    SubscriberError, SubscriptionId, View,
};
use crate::storage::{EVENTS_KEY, KeyValueStore, STATE_KEY, read_json, write_json};
use crate::transport::Transport;

/// Pause after a date navigation before the next one is accepted.
const SETTLE_DELAY: Duration = Duration::from_millis(300);

/// Where a [`Calendar`] is in its life.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    /// Constructed, [`Calendar::init`] not called yet.
    Uninitialized,

    /// The first load is running.
    Loading,

    /// Serving commands.
    Ready,

    /// Torn down by [`Calendar::destroy`].
    Destroyed,
}

/// The external systems a [`Calendar`] talks to.
#[derive(Debug, Clone)]
pub struct Collaborators {
    /// Remote calendar service.
    pub transport: Arc<dyn Transport>,

    /// Persistent key-value store for the cache and the snapshot.
    pub storage: Arc<dyn KeyValueStore>,

    /// Draws the calendar.
    pub renderer: Arc<dyn Renderer>,

    /// Shows messages to the user.
    pub notifier: Arc<dyn Notifier>,
}

type RendererSlot = Arc<OnceLock<Arc<dyn Renderer>>>;

/// Coordinates the state store, the event pipeline, input handling, persistence and the
/// periodic refresh.
///
/// All methods take `&self`; the calendar can be shared behind an [`Arc`]. Subscribers and
/// the renderer are called while the state is locked and must not call back into the
/// calendar.
pub struct Calendar {
    config: Config,
    store: Arc<Mutex<StateStore>>,
    pipeline: Arc<EventPipeline>,
    navigator: Mutex<GestureNavigator>,
    storage: Arc<dyn KeyValueStore>,
    renderer: Arc<dyn Renderer>,
    attached: RendererSlot,
    notifier: Arc<dyn Notifier>,
    lifecycle: Mutex<Lifecycle>,
    timer: Mutex<Option<JoinHandle<()>>>,
    settle: Mutex<Option<JoinHandle<()>>>,
}

impl fmt::Debug for Calendar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Calendar")
            .field("lifecycle", &self.lifecycle())
            .field("config", &self.config)
            .field("pipeline", &self.pipeline)
            .finish_non_exhaustive()
    }
}

impl Calendar {
    /// Creates a calendar resolving times in the system time zone.
    pub fn new(config: Config, collaborators: Collaborators) -> Self {
        Self::with_time_zone(config, collaborators, TimeZone::system())
    }

    /// Creates a calendar resolving times in `tz`.
    pub fn with_time_zone(config: Config, collaborators: Collaborators, tz: TimeZone) -> Self {
        let Collaborators {
            transport,
            storage,
            renderer,
            notifier,
        } = collaborators;

        let pipeline = EventPipeline::new(transport, Arc::clone(&storage), &config)
            .with_time_zone(tz.clone());
        let mut state = CalendarState::new(Zoned::now().with_time_zone(tz).datetime());
        state.settings = config.settings;

        Self {
            config,
            store: Arc::new(Mutex::new(StateStore::new(state))),
            pipeline: Arc::new(pipeline),
            navigator: Mutex::default(),
            storage,
            renderer,
            attached: RendererSlot::default(),
            notifier,
            lifecycle: Mutex::new(Lifecycle::Uninitialized),
            timer: Mutex::default(),
            settle: Mutex::default(),
        }
    }

    /// Loads the events, wires persistence and rendering, and starts the refresh timer.
    ///
    /// Calling it again after the first time does nothing.
    #[tracing::instrument(skip(self))]
    pub async fn init(&self) {
        {
            let mut lifecycle = lock(&self.lifecycle);
            if *lifecycle != Lifecycle::Uninitialized {
                tracing::warn!(lifecycle = ?*lifecycle, "calendar already initialized");
                return;
            }
            *lifecycle = Lifecycle::Loading;
        }

        {
            let mut store = self.store();
            // subscribe first, so that no transition below goes unseen
            store.subscribe(fan_out(
                Arc::clone(&self.storage),
                Arc::clone(&self.attached),
            ));

            match read_json::<StateSnapshot>(self.storage.as_ref(), STATE_KEY) {
                Some(snapshot) => {
                    tracing::debug!(?snapshot, "restoring snapshot");
                    store.restore(snapshot);
                }
                None => tracing::debug!("no snapshot to restore"),
            }
            store.set(StateChange::View(self.config.default_view));
            store.set_loading(true);
        }

        let events = self.pipeline.load().await;

        {
            let mut store = self.store();
            store.set_events(events);
            store.set_loading(false);

            // earlier transitions were notified before a renderer existed
            let renderer = Arc::clone(&self.renderer);
            if self.attached.set(Arc::clone(&renderer)).is_err() {
                tracing::warn!("renderer already attached");
            }
            renderer.render(store.state());
            write_json(
                self.storage.as_ref(),
                STATE_KEY,
                &StateSnapshot::from(store.state()),
            );
        }

        self.start_timer();
        *lock(&self.lifecycle) = Lifecycle::Ready;
        tracing::info!("calendar ready");
    }

    /// Stops the timer and writes the events and the snapshot one last time.
    pub fn destroy(&self) {
        {
            let mut lifecycle = lock(&self.lifecycle);
            if *lifecycle == Lifecycle::Destroyed {
                return;
            }
            *lifecycle = Lifecycle::Destroyed;
        }

        self.abort_tasks();

        let store = self.store();
        let state = store.state();
        write_json(self.storage.as_ref(), EVENTS_KEY, state.events.as_slice());
        write_json(
            self.storage.as_ref(),
            STATE_KEY,
            &StateSnapshot::from(state),
        );
        tracing::info!("calendar destroyed");
    }

    /// Where the calendar is in its life.
    pub fn lifecycle(&self) -> Lifecycle {
        *lock(&self.lifecycle)
    }

    /// A copy of the current state. The event collection is shared, not copied.
    pub fn state(&self) -> CalendarState {
        self.store().state().clone()
    }

    /// The current event collection.
    pub fn events(&self) -> Arc<Vec<Event>> {
        Arc::clone(&self.store().state().events)
    }

    /// The pipeline feeding this calendar.
    pub fn pipeline(&self) -> &EventPipeline {
        &self.pipeline
    }

    /// Registers a state subscriber. See [`StateStore::subscribe`].
    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: FnMut(&StateChange, &CalendarState) -> Result<(), SubscriberError> + Send + 'static,
    {
        self.store().subscribe(callback)
    }

    /// Removes a state subscriber.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.store().unsubscribe(id)
    }

    /// Adds an event locally and mirrors it on the remote service.
    #[tracing::instrument(skip(self))]
    pub async fn add_event(&self, draft: EventDraft) -> Event {
        let event = self.pipeline.create_event(draft);
        self.commit_events(|events| events.push(event.clone()));
        tracing::info!(id = %event.id, "event added");

        match self.pipeline.push(&RemoteChange::Create(event.clone())).await {
            Ok(()) => self.notify(&format!("Added \"{}\"", event.title), Severity::Success),
            Err(err) => {
                tracing::error!(id = %event.id, %err, "failed to upload new event");
                self.notify(&format!("Failed to save event: {err}"), Severity::Error);
            }
        }
        event
    }

    /// Edits an event locally and mirrors it on the remote service.
    ///
    /// Returns `None` when no event has the given id.
    #[tracing::instrument(skip(self))]
    pub async fn update_event(&self, id: &str, patch: EventPatch) -> Option<Event> {
        let mut updated = None;
        self.commit_events(|events| {
            if let Some(event) = events.iter_mut().find(|e| e.id == id) {
                updated = Some(patch.apply_to(event).clone());
            }
        });

        let Some(event) = updated else {
            tracing::warn!(id, "event to update not found");
            return None;
        };

        match self.pipeline.push(&RemoteChange::Update(event.clone())).await {
            Ok(()) => self.notify(&format!("Updated \"{}\"", event.title), Severity::Success),
            Err(err) => {
                tracing::error!(id, %err, "failed to upload event update");
                self.notify(&format!("Failed to update event: {err}"), Severity::Error);
            }
        }
        Some(event)
    }

    /// Removes an event locally and on the remote service.
    ///
    /// Returns whether an event with the given id existed.
    #[tracing::instrument(skip(self))]
    pub async fn delete_event(&self, id: &str) -> bool {
        let mut removed = false;
        self.commit_events(|events| {
            let before = events.len();
            events.retain(|e| e.id != id);
            removed = events.len() != before;
        });

        if !removed {
            tracing::warn!(id, "event to delete not found");
            return false;
        }

        match self.pipeline.push(&RemoteChange::Delete(id.to_string())).await {
            Ok(()) => self.notify("Event deleted", Severity::Success),
            Err(err) => {
                tracing::error!(id, %err, "failed to delete remote event");
                self.notify(&format!("Failed to delete event: {err}"), Severity::Error);
            }
        }
        true
    }

    /// Fetches the events from the network and commits them.
    #[tracing::instrument(skip(self))]
    pub async fn refresh_events(&self) -> Result<usize, PipelineError> {
        self.store().set_loading(true);
        let result = self.pipeline.refresh().await;

        let mut store = self.store();
        store.set_loading(false);
        match result {
            Ok(events) => {
                let count = events.len();
                store.set_events(events);
                drop(store);
                self.notify(&format!("Refreshed {count} events"), Severity::Success);
                Ok(count)
            }
            Err(err) => {
                drop(store);
                tracing::error!(%err, "refresh failed");
                self.notify(&format!("Failed to refresh events: {err}"), Severity::Error);
                Err(err)
            }
        }
    }

    /// Moves the current date. Returns `false` while a previous navigation is settling.
    pub fn navigate(&self, direction: Direction) -> bool {
        let now = self.now();
        if self.store().navigate(direction, now).is_none() {
            return false;
        }

        let store = Arc::clone(&self.store);
        let finish = move || {
            store
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .finish_navigation();
        };
        match Handle::try_current() {
            Ok(handle) => {
                let task = handle.spawn(async move {
                    tokio::time::sleep(SETTLE_DELAY).await;
                    finish();
                });
                if let Some(previous) = lock(&self.settle).replace(task) {
                    previous.abort();
                }
            }
            Err(_) => {
                tracing::debug!("no runtime, settling immediately");
                finish();
            }
        }
        true
    }

    /// Shows `view`. Returns whether the view changed.
    pub fn switch_view(&self, view: View) -> bool {
        tracing::debug!(%view, "switching view");
        self.store().set(StateChange::View(view))
    }

    /// Shows the view with the given name; unknown names are rejected.
    pub fn switch_view_by_name(&self, name: &str) -> bool {
        match name.parse::<View>() {
            Ok(view) => {
                self.switch_view(view);
                true
            }
            Err(()) => {
                tracing::warn!(name, "unknown view");
                false
            }
        }
    }

    /// Selects a day. In month view this also opens that day in the agenda.
    pub fn select_date(&self, date: Date) {
        let mut store = self.store();
        let state = store.state();
        let mut patch = StatePatch {
            selected_date: Some(Some(date)),
            ..Default::default()
        };
        if state.view == View::Month {
            patch.current_date = Some(date.to_datetime(state.current_date.time()));
            patch.view = Some(View::Agenda);
        }
        store.update(patch);
    }

    /// Feeds a pointer sample through the gesture navigator and acts on the result.
    pub fn handle_pointer(&self, event: &PointerEvent) -> Gesture {
        let gesture = {
            let mut navigator = lock(&self.navigator);
            let mut store = self.store();
            navigator.handle(event, &mut store)
        };

        if let Gesture::Swipe(direction) = gesture {
            if let Some(renderer) = self.attached.get() {
                renderer.swipe_feedback(direction);
            }
        }
        if let Some(intent) = gesture.intent() {
            self.apply(intent);
        }
        gesture
    }

    /// Acts on a key press. Returns whether the key is bound.
    pub fn handle_key(&self, key: Key) -> bool {
        match key.intent() {
            Some(intent) => {
                self.apply(intent);
                true
            }
            None => {
                tracing::trace!(?key, "unbound key");
                false
            }
        }
    }

    /// Carries out a navigation intent. Returns whether anything changed.
    pub fn apply(&self, intent: Intent) -> bool {
        match intent {
            Intent::Navigate(direction) => self.navigate(direction),
            Intent::CycleView(cycle) => {
                let view = cycle.apply(self.store().state().view);
                self.switch_view(view)
            }
            Intent::SwitchView(view) => self.switch_view(view),
        }
    }

    /// The current local time in the calendar's time zone.
    pub fn now(&self) -> DateTime {
        Zoned::now()
            .with_time_zone(self.pipeline.time_zone().clone())
            .datetime()
    }

    fn store(&self) -> MutexGuard<'_, StateStore> {
        lock(&self.store)
    }

    fn notify(&self, message: &str, severity: Severity) {
        self.notifier.notify(message, severity);
    }

    /// Applies `edit` to a copy of the collection and commits the copy.
    fn commit_events(&self, edit: impl FnOnce(&mut Vec<Event>)) {
        let mut store = self.store();
        let mut events = store.state().events.as_ref().clone();
        edit(&mut events);
        store.set_events(events);
    }

    fn start_timer(&self) {
        let period = self.config.refresh_interval.get();
        if period.is_zero() {
            tracing::info!("automatic refresh disabled");
            return;
        }

        let pipeline = Arc::clone(&self.pipeline);
        let store = Arc::clone(&self.store);
        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                match pipeline.refresh().await {
                    Ok(events) => {
                        tracing::debug!(count = events.len(), "automatic refresh");
                        store
                            .lock()
                            .unwrap_or_else(PoisonError::into_inner)
                            .set_events(events);
                    }
                    Err(err) => tracing::warn!(%err, "automatic refresh failed"),
                }
            }
        });

        if let Some(previous) = lock(&self.timer).replace(task) {
            previous.abort();
        }
    }

    fn abort_tasks(&self) {
        if let Some(timer) = lock(&self.timer).take() {
            timer.abort();
        }
        if let Some(settle) = lock(&self.settle).take() {
            settle.abort();
        }
    }
}

impl Drop for Calendar {
    fn drop(&mut self) {
        self.abort_tasks();
    }
}

/// The subscriber that persists and renders every change.
fn fan_out(
    storage: Arc<dyn KeyValueStore>,
    attached: RendererSlot,
) -> impl FnMut(&StateChange, &CalendarState) -> Result<(), SubscriberError> + Send + 'static {
    move |change, state| {
        let key = change.key();
        if key == StateKey::Events {
            write_json(storage.as_ref(), EVENTS_KEY, state.events.as_slice());
        }
        if key.is_persisted() {
            write_json(storage.as_ref(), STATE_KEY, &StateSnapshot::from(state));
        }
        if let Some(renderer) = attached.get() {
            renderer.update(key, state);
        }
        Ok(())
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
