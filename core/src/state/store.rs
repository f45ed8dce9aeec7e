// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::error::Error;
use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use jiff::ToSpan;
use jiff::civil::DateTime;

use crate::Event;
use crate::state::{
    CalendarState, Direction, StateChange, StateKey, StatePatch, StateSnapshot, View,
};

/// Error a subscriber may report; it is logged and otherwise ignored.
pub type SubscriberError = Box<dyn Error + Send + Sync>;

type Subscriber = Box<dyn FnMut(&StateChange, &CalendarState) -> Result<(), SubscriberError> + Send>;

/// Handle returned by [`StateStore::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Holds the [`CalendarState`] and tells subscribers about every field that changes.
///
/// Subscribers run synchronously, in subscription order, once per changed key, after the
/// whole patch has been applied. A failing or panicking subscriber is logged and skipped.
pub struct StateStore {
    state: CalendarState,
    subscribers: Vec<(SubscriptionId, Subscriber)>,
    next_id: u64,
}

impl fmt::Debug for StateStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateStore")
            .field("state", &self.state)
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

impl Default for StateStore {
    fn default() -> Self {
        Self::new(CalendarState::default())
    }
}

impl StateStore {
    /// Creates a store holding `state`.
    pub fn new(state: CalendarState) -> Self {
        Self {
            state,
            subscribers: Vec::new(),
            next_id: 1,
        }
    }

    /// The current state.
    pub fn state(&self) -> &CalendarState {
        &self.state
    }

    /// Registers a callback for every subsequent change.
    pub fn subscribe<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: FnMut(&StateChange, &CalendarState) -> Result<(), SubscriberError> + Send + 'static,
    {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.subscribers.push((id, Box::new(callback)));
        tracing::debug!(?id, "subscriber added");
        id
    }

    /// Removes a subscriber. Returns whether it was registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sid, _)| *sid != id);
        before != self.subscribers.len()
    }

    /// Number of registered subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Applies a patch and notifies subscribers about each field that actually changed.
    ///
    /// The event collection counts as changed only when a different `Arc` is supplied;
    /// every other field compares by value. Returns the changed keys in notification order.
    pub fn update(&mut self, patch: StatePatch) -> Vec<StateKey> {
        let state = &mut self.state;
        let mut changes = Vec::new();

        if let Some(view) = patch.view {
            if view != state.view {
                state.view = view;
                changes.push(StateChange::View(view));
            }
        }

        if let Some(date) = patch.current_date {
            if date != state.current_date {
                state.current_date = date;
                changes.push(StateChange::CurrentDate(date));
            }
        }

        if let Some(date) = patch.selected_date {
            if date != state.selected_date {
                state.selected_date = date;
                changes.push(StateChange::SelectedDate(date));
            }
        }

        if let Some(events) = patch.events {
            if !Arc::ptr_eq(&events, &state.events) {
                state.events = Arc::clone(&events);
                changes.push(StateChange::Events(events));
            }
        }

        if let Some(loading) = patch.loading {
            if loading != state.loading {
                state.loading = loading;
                changes.push(StateChange::Loading(loading));
            }
        }

        if let Some(navigating) = patch.navigating {
            if navigating != state.navigating {
                state.navigating = navigating;
                changes.push(StateChange::Navigating(navigating));
            }
        }

        if let Some(animating) = patch.animating {
            if animating != state.animating {
                state.animating = animating;
                changes.push(StateChange::Animating(animating));
            }
        }

        if let Some(last_tap) = patch.last_tap {
            if last_tap != state.last_tap {
                state.last_tap = last_tap;
                changes.push(StateChange::LastTap(last_tap));
            }
        }

        if let Some(settings) = patch.settings {
            if settings != state.settings {
                state.settings = settings;
                changes.push(StateChange::Settings(settings));
            }
        }

        for change in &changes {
            self.notify(change);
        }
        changes.iter().map(StateChange::key).collect()
    }

    /// The current value of a single field.
    pub fn get(&self, key: StateKey) -> StateChange {
        let s = &self.state;
        match key {
            StateKey::View => StateChange::View(s.view),
            StateKey::CurrentDate => StateChange::CurrentDate(s.current_date),
            StateKey::SelectedDate => StateChange::SelectedDate(s.selected_date),
            StateKey::Events => StateChange::Events(Arc::clone(&s.events)),
            StateKey::Loading => StateChange::Loading(s.loading),
            StateKey::Navigating => StateChange::Navigating(s.navigating),
            StateKey::Animating => StateChange::Animating(s.animating),
            StateKey::LastTap => StateChange::LastTap(s.last_tap),
            StateKey::Settings => StateChange::Settings(s.settings),
        }
    }

    /// Sets a single field. Returns whether it changed.
    pub fn set(&mut self, change: StateChange) -> bool {
        !self.update(change.into()).is_empty()
    }

    /// Replaces the event collection with a fresh one.
    pub fn set_events(&mut self, events: Vec<Event>) -> bool {
        self.set(StateChange::Events(Arc::new(events)))
    }

    /// Marks a load or refresh as running or finished.
    pub fn set_loading(&mut self, loading: bool) -> bool {
        self.set(StateChange::Loading(loading))
    }

    /// Moves the current date one unit in `direction`, or to `now` for [`Direction::Today`].
    ///
    /// The unit depends on the view: a calendar month in month view, seven days in week
    /// view, one day otherwise. Returns `None` without touching the state while another
    /// navigation is still settling; the caller clears it with [`Self::finish_navigation`].
    pub fn navigate(&mut self, direction: Direction, now: DateTime) -> Option<DateTime> {
        if self.state.navigating {
            tracing::debug!(?direction, "navigation already in flight, ignored");
            return None;
        }

        self.set(StateChange::Navigating(true));
        let target = match direction {
            Direction::Today => now,
            Direction::Prev => step(self.state.view, self.state.current_date, -1),
            Direction::Next => step(self.state.view, self.state.current_date, 1),
        };
        tracing::debug!(?direction, view = %self.state.view, %target, "navigating");
        self.set(StateChange::CurrentDate(target));
        Some(target)
    }

    /// Ends the settle period of a navigation and any running animation.
    pub fn finish_navigation(&mut self) {
        self.update(StatePatch {
            navigating: Some(false),
            animating: Some(false),
            ..Default::default()
        });
    }

    /// The persisted part of the state.
    pub fn snapshot(&self) -> StateSnapshot {
        StateSnapshot::from(&self.state)
    }

    /// Rehydrates from a persisted snapshot.
    pub fn restore(&mut self, snapshot: StateSnapshot) {
        self.update(StatePatch {
            view: Some(snapshot.view),
            current_date: Some(snapshot.current_date),
            selected_date: Some(snapshot.selected_date),
            settings: Some(snapshot.settings),
            ..Default::default()
        });
    }

    fn notify(&mut self, change: &StateChange) {
        let state = &self.state;
        for (id, subscriber) in &mut self.subscribers {
            match catch_unwind(AssertUnwindSafe(|| subscriber(change, state))) {
                Ok(Ok(())) => {}
                Ok(Err(err)) => {
                    tracing::error!(?id, key = %change.key(), %err, "subscriber failed");
                }
                Err(_) => {
                    tracing::error!(?id, key = %change.key(), "subscriber panicked");
                }
            }
        }
    }
}

fn step(view: View, from: DateTime, sign: i64) -> DateTime {
    let result = match view {
        View::Month => from.checked_add(sign.months()),
        View::Week => from.checked_add((7 * sign).days()),
        View::Agenda => from.checked_add(sign.days()),
    };
    result.unwrap_or_else(|err| {
        tracing::warn!(%from, %err, "date out of range, staying put");
        from
    })
}
