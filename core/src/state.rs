// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

mod store;

use std::fmt::{self, Display};
use std::str::FromStr;
use std::sync::Arc;

use jiff::Zoned;
use jiff::civil::{Date, DateTime};
use serde::{Deserialize, Serialize};

use crate::Event;

pub use store::{StateStore, SubscriberError, SubscriptionId};

/// The presentations a calendar can show.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum View {
    /// A month grid.
    #[default]
    Month,

    /// A seven day strip.
    Week,

    /// A chronological list.
    Agenda,
}

const VIEW_MONTH: &str = "month";
const VIEW_WEEK: &str = "week";
const VIEW_AGENDA: &str = "agenda";

impl View {
    /// Every view, in cycling order.
    pub const ALL: [View; 3] = [View::Month, View::Week, View::Agenda];

    /// The view after this one, wrapping around.
    pub fn next(self) -> Self {
        self.step(true)
    }

    /// The view before this one, wrapping around.
    pub fn prev(self) -> Self {
        self.step(false)
    }

    fn step(self, forward: bool) -> Self {
        let len = Self::ALL.len();
        let index = Self::ALL.iter().position(|v| *v == self).unwrap_or(0);
        let next = if forward {
            (index + 1) % len
        } else {
            (index + len - 1) % len
        };
        Self::ALL[next]
    }
}

impl AsRef<str> for View {
    fn as_ref(&self) -> &str {
        match self {
            View::Month => VIEW_MONTH,
            View::Week => VIEW_WEEK,
            View::Agenda => VIEW_AGENDA,
        }
    }
}

impl Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_ref())
    }
}

impl FromStr for View {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            VIEW_MONTH => Ok(View::Month),
            VIEW_WEEK => Ok(View::Week),
            VIEW_AGENDA => Ok(View::Agenda),
            _ => Err(()),
        }
    }
}

/// Direction of a date navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum Direction {
    /// One unit back.
    Prev,

    /// One unit forward.
    Next,

    /// Back to the current moment.
    Today,
}

/// User display settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Show times on a 24-hour clock.
    pub use_24_hour: bool,

    /// Show Saturday and Sunday columns.
    pub show_weekends: bool,

    /// Events listed per day before collapsing into "+N more".
    pub max_events_per_day: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            use_24_hour: false,
            show_weekends: true,
            max_events_per_day: 3,
        }
    }
}

/// The single source of truth for what the calendar shows.
#[derive(Debug, Clone)]
pub struct CalendarState {
    /// Current presentation.
    pub view: View,

    /// The date the current presentation is anchored on.
    pub current_date: DateTime,

    /// The day the user picked, if any.
    pub selected_date: Option<Date>,

    /// The event collection; replaced wholesale, never mutated in place.
    pub events: Arc<Vec<Event>>,

    /// A load or refresh is in flight.
    pub loading: bool,

    /// A date navigation is settling.
    pub navigating: bool,

    /// A transition animation is running.
    pub animating: bool,

    /// Milliseconds of the last single tap, 0 when none is pending.
    pub last_tap: u64,

    /// Display settings.
    pub settings: Settings,
}

impl CalendarState {
    /// Creates the default state anchored on `now`.
    pub fn new(now: DateTime) -> Self {
        Self {
            view: View::default(),
            current_date: now,
            selected_date: None,
            events: Arc::default(),
            loading: false,
            navigating: false,
            animating: false,
            last_tap: 0,
            settings: Settings::default(),
        }
    }
}

impl Default for CalendarState {
    fn default() -> Self {
        Self::new(Zoned::now().datetime())
    }
}

/// Keys of the observable state fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[expect(missing_docs)]
pub enum StateKey {
    View,
    CurrentDate,
    SelectedDate,
    Events,
    Loading,
    Navigating,
    Animating,
    LastTap,
    Settings,
}

impl StateKey {
    /// Whether the key belongs to the persisted snapshot.
    pub fn is_persisted(self) -> bool {
        matches!(
            self,
            StateKey::View | StateKey::CurrentDate | StateKey::SelectedDate | StateKey::Settings
        )
    }
}

impl Display for StateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StateKey::View => "view",
            StateKey::CurrentDate => "currentDate",
            StateKey::SelectedDate => "selectedDate",
            StateKey::Events => "events",
            StateKey::Loading => "loading",
            StateKey::Navigating => "navigating",
            StateKey::Animating => "animating",
            StateKey::LastTap => "lastTap",
            StateKey::Settings => "settings",
        };
        f.write_str(name)
    }
}

/// A single field together with its value, as delivered to subscribers.
#[derive(Debug, Clone)]
#[expect(missing_docs)]
pub enum StateChange {
    View(View),
    CurrentDate(DateTime),
    SelectedDate(Option<Date>),
    Events(Arc<Vec<Event>>),
    Loading(bool),
    Navigating(bool),
    Animating(bool),
    LastTap(u64),
    Settings(Settings),
}

impl StateChange {
    /// The key this change belongs to.
    pub fn key(&self) -> StateKey {
        match self {
            StateChange::View(_) => StateKey::View,
            StateChange::CurrentDate(_) => StateKey::CurrentDate,
            StateChange::SelectedDate(_) => StateKey::SelectedDate,
            StateChange::Events(_) => StateKey::Events,
            StateChange::Loading(_) => StateKey::Loading,
            StateChange::Navigating(_) => StateKey::Navigating,
            StateChange::Animating(_) => StateKey::Animating,
            StateChange::LastTap(_) => StateKey::LastTap,
            StateChange::Settings(_) => StateKey::Settings,
        }
    }
}

/// A partial update; `None` fields are left untouched.
#[derive(Debug, Default, Clone)]
#[expect(missing_docs)]
pub struct StatePatch {
    pub view: Option<View>,
    pub current_date: Option<DateTime>,
    pub selected_date: Option<Option<Date>>,
    pub events: Option<Arc<Vec<Event>>>,
    pub loading: Option<bool>,
    pub navigating: Option<bool>,
    pub animating: Option<bool>,
    pub last_tap: Option<u64>,
    pub settings: Option<Settings>,
}

impl From<StateChange> for StatePatch {
    fn from(change: StateChange) -> Self {
        let mut patch = StatePatch::default();
        match change {
            StateChange::View(v) => patch.view = Some(v),
            StateChange::CurrentDate(v) => patch.current_date = Some(v),
            StateChange::SelectedDate(v) => patch.selected_date = Some(v),
            StateChange::Events(v) => patch.events = Some(v),
            StateChange::Loading(v) => patch.loading = Some(v),
            StateChange::Navigating(v) => patch.navigating = Some(v),
            StateChange::Animating(v) => patch.animating = Some(v),
            StateChange::LastTap(v) => patch.last_tap = Some(v),
            StateChange::Settings(v) => patch.settings = Some(v),
        }
        patch
    }
}

/// The persisted part of the state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateSnapshot {
    /// Current presentation.
    pub view: View,

    /// Anchor date.
    pub current_date: DateTime,

    /// Picked day.
    #[serde(default)]
    pub selected_date: Option<Date>,

    /// Display settings.
    #[serde(default)]
    pub settings: Settings,
}

impl From<&CalendarState> for StateSnapshot {
    fn from(state: &CalendarState) -> Self {
        Self {
            view: state.view,
            current_date: state.current_date,
            selected_date: state.selected_date,
            settings: state.settings,
        }
    }
}
