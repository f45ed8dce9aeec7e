// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Pointer and keyboard input turned into navigation intents.

use crate::state::{CalendarState, Direction, StateChange, StateStore, View};

/// Distances in pixels and durations in milliseconds used to classify gestures.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureThresholds {
    /// Horizontal movement below this is ignored while tracking.
    pub jitter: f64,

    /// Minimum dominant-axis displacement of a swipe.
    pub min_swipe_distance: f64,

    /// Gestures faster than this are classified even when short of `2 * min_swipe_distance`.
    pub max_swipe_duration_ms: u64,

    /// Two taps closer than this form a double tap.
    pub double_tap_ms: u64,
}

impl Default for GestureThresholds {
    fn default() -> Self {
        Self {
            jitter: 10.0,
            min_swipe_distance: 50.0,
            max_swipe_duration_ms: 300,
            double_tap_ms: 300,
        }
    }
}

/// A position on screen.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
#[expect(missing_docs)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    /// Creates a point.
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Stage of a pointer sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[expect(missing_docs)]
pub enum PointerPhase {
    Down,
    Move,
    Up,
    Cancel,
}

/// One pointer sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    /// Stage in the sequence.
    pub phase: PointerPhase,

    /// Where the pointer is.
    pub point: Point,

    /// When it happened, in milliseconds on any monotonic clock.
    pub time_ms: u64,
}

impl PointerEvent {
    /// Creates a sample.
    pub const fn new(phase: PointerPhase, x: f64, y: f64, time_ms: u64) -> Self {
        Self {
            phase,
            point: Point::new(x, y),
            time_ms,
        }
    }
}

/// The direction the pointer travelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[expect(missing_docs)]
pub enum SwipeDirection {
    Left,
    Right,
    Up,
    Down,
}

impl SwipeDirection {
    /// Leftward swipes reveal the next period, upward ones the next view.
    pub fn intent(self) -> Intent {
        match self {
            SwipeDirection::Left => Intent::Navigate(Direction::Next),
            SwipeDirection::Right => Intent::Navigate(Direction::Prev),
            SwipeDirection::Up => Intent::CycleView(CycleDirection::Forward),
            SwipeDirection::Down => Intent::CycleView(CycleDirection::Backward),
        }
    }
}

/// Which way to step through the views.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[expect(missing_docs)]
pub enum CycleDirection {
    Forward,
    Backward,
}

impl CycleDirection {
    /// The view reached from `view`, wrapping around.
    pub fn apply(self, view: View) -> View {
        match self {
            CycleDirection::Forward => view.next(),
            CycleDirection::Backward => view.prev(),
        }
    }
}

/// What a completed pointer sequence was.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gesture {
    /// Nothing to act on, e.g. an unfinished sequence or a slow drag.
    None,

    /// A single tap.
    Tap,

    /// The second of two quick taps.
    DoubleTap,

    /// A classified swipe.
    Swipe(SwipeDirection),
}

impl Gesture {
    /// The navigation this gesture asks for, if any.
    pub fn intent(self) -> Option<Intent> {
        match self {
            Gesture::None | Gesture::Tap => None,
            Gesture::DoubleTap => Some(Intent::Navigate(Direction::Today)),
            Gesture::Swipe(direction) => Some(direction.intent()),
        }
    }
}

/// A navigation request from any input source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    /// Move the current date.
    Navigate(Direction),

    /// Step to the neighbouring view.
    CycleView(CycleDirection),

    /// Jump to a specific view.
    SwitchView(View),
}

/// Keys the calendar reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[expect(missing_docs)]
pub enum Key {
    ArrowLeft,
    ArrowRight,
    ArrowUp,
    ArrowDown,
    Char(char),
}

impl Key {
    /// The navigation bound to this key, if any.
    pub fn intent(self) -> Option<Intent> {
        match self {
            Key::ArrowLeft => Some(Intent::Navigate(Direction::Prev)),
            Key::ArrowRight => Some(Intent::Navigate(Direction::Next)),
            Key::ArrowUp => Some(SwipeDirection::Up.intent()),
            Key::ArrowDown => Some(SwipeDirection::Down.intent()),
            Key::Char(c) => match c.to_ascii_lowercase() {
                't' => Some(Intent::Navigate(Direction::Today)),
                'm' => Some(Intent::SwitchView(View::Month)),
                'w' => Some(Intent::SwitchView(View::Week)),
                'a' => Some(Intent::SwitchView(View::Agenda)),
                _ => None,
            },
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Tracking {
    Idle,
    Active {
        start: Point,
        start_ms: u64,
        swiping: bool,
    },
}

/// Classifies pointer sequences into taps, double taps and swipes.
///
/// Only one sequence is tracked at a time, and none starts while a navigation is
/// settling. Tap timing is kept in [`CalendarState::last_tap`] so that a classified swipe
/// can cancel a pending double tap.
#[derive(Debug, Clone)]
pub struct GestureNavigator {
    thresholds: GestureThresholds,
    tracking: Tracking,
}

impl Default for GestureNavigator {
    fn default() -> Self {
        Self::new(GestureThresholds::default())
    }
}

impl GestureNavigator {
    /// Creates an idle navigator.
    pub fn new(thresholds: GestureThresholds) -> Self {
        Self {
            thresholds,
            tracking: Tracking::Idle,
        }
    }

    /// The thresholds in use.
    pub fn thresholds(&self) -> &GestureThresholds {
        &self.thresholds
    }

    /// Whether a pointer sequence is in progress.
    pub fn is_tracking(&self) -> bool {
        matches!(self.tracking, Tracking::Active { .. })
    }

    /// Feeds one pointer sample. Only `Up` can complete a gesture.
    pub fn handle(&mut self, event: &PointerEvent, store: &mut StateStore) -> Gesture {
        match event.phase {
            PointerPhase::Down => {
                self.pointer_down(event, store.state());
                Gesture::None
            }
            PointerPhase::Move => {
                self.pointer_move(event);
                Gesture::None
            }
            PointerPhase::Up => self.pointer_up(event, store),
            PointerPhase::Cancel => {
                self.tracking = Tracking::Idle;
                Gesture::None
            }
        }
    }

    /// Starts tracking unless a sequence or a navigation is already in flight.
    pub fn pointer_down(&mut self, event: &PointerEvent, state: &CalendarState) -> bool {
        if state.navigating || self.is_tracking() {
            tracing::trace!("pointer down ignored");
            return false;
        }

        self.tracking = Tracking::Active {
            start: event.point,
            start_ms: event.time_ms,
            swiping: false,
        };
        true
    }

    /// Marks the sequence as a swipe once it moves clearly sideways.
    pub fn pointer_move(&mut self, event: &PointerEvent) {
        if let Tracking::Active {
            start,
            ref mut swiping,
            ..
        } = self.tracking
        {
            let dx = (event.point.x - start.x).abs();
            let dy = (event.point.y - start.y).abs();
            if dx > dy && dx > self.thresholds.jitter {
                *swiping = true;
            }
        }
    }

    /// Completes the sequence and classifies it.
    pub fn pointer_up(&mut self, event: &PointerEvent, store: &mut StateStore) -> Gesture {
        let Tracking::Active {
            start,
            start_ms,
            swiping,
        } = std::mem::replace(&mut self.tracking, Tracking::Idle)
        else {
            return Gesture::None;
        };

        let t = &self.thresholds;
        let dx = event.point.x - start.x;
        let dy = event.point.y - start.y;
        let elapsed = event.time_ms.saturating_sub(start_ms);
        let distance = dx.abs().max(dy.abs());

        if elapsed < t.max_swipe_duration_ms || distance > 2.0 * t.min_swipe_distance {
            let direction = if dx.abs() > dy.abs() && dx.abs() > t.min_swipe_distance {
                Some(if dx < 0.0 {
                    SwipeDirection::Left
                } else {
                    SwipeDirection::Right
                })
            } else if dy.abs() > dx.abs() && dy.abs() > t.min_swipe_distance {
                Some(if dy < 0.0 {
                    SwipeDirection::Up
                } else {
                    SwipeDirection::Down
                })
            } else {
                None
            };

            if let Some(direction) = direction {
                tracing::debug!(?direction, dx, dy, elapsed, "swipe");
                store.set(StateChange::LastTap(0));
                return Gesture::Swipe(direction);
            }
        }

        if swiping {
            return Gesture::None;
        }

        let last_tap = store.state().last_tap;
        if last_tap != 0 && event.time_ms.saturating_sub(last_tap) < t.double_tap_ms {
            tracing::debug!("double tap");
            store.set(StateChange::LastTap(0));
            Gesture::DoubleTap
        } else {
            // a zero timestamp would read as "no tap pending"
            store.set(StateChange::LastTap(event.time_ms.max(1)));
            Gesture::Tap
        }
    }
}
