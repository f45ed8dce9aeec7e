// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Plain-text presentation of the calendar state.

use std::fmt::Write as _;

use calview_core::{
    CalendarState, Event, Notifier, Renderer, Settings, Severity, StateKey, SwipeDirection, View,
};
use colored::{ColoredString, Colorize};
use jiff::ToSpan;
use jiff::civil::{Date, Weekday};

/// Days listed by the agenda, starting with the current one.
const AGENDA_DAYS: i32 = 14;

/// A [`Renderer`] that prints the visible range to stdout.
///
/// A silent renderer prints nothing, for commands that report their own result.
#[derive(Debug)]
pub struct TerminalRenderer {
    live: bool,
}

impl TerminalRenderer {
    /// Prints the first render and every visible change.
    pub fn live() -> Self {
        Self { live: true }
    }

    /// Prints nothing.
    pub fn silent() -> Self {
        Self { live: false }
    }
}

impl Renderer for TerminalRenderer {
    fn render(&self, state: &CalendarState) {
        if self.live {
            print!("{}", format_state(state, jiff::Zoned::now().date()));
        }
    }

    fn update(&self, key: StateKey, state: &CalendarState) {
        if !self.live {
            return;
        }

        match key {
            StateKey::View
            | StateKey::CurrentDate
            | StateKey::SelectedDate
            | StateKey::Events
            | StateKey::Settings => self.render(state),
            StateKey::Loading if state.loading => println!("{}", "Loading...".dimmed()),
            _ => {}
        }
    }

    fn swipe_feedback(&self, direction: SwipeDirection) {
        tracing::trace!(?direction, "swipe");
    }
}

/// A [`Notifier`] that prints colored one-liners to stderr.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, message: &str, severity: Severity) {
        let tag = match severity {
            Severity::Info => "Info:".blue(),
            Severity::Success => "Done:".green(),
            Severity::Warning => "Warning:".yellow(),
            Severity::Error => "Error:".red(),
        };
        eprintln!("{tag} {message}");
    }
}

/// The first and last day shown by the state's view.
pub fn visible_range(state: &CalendarState) -> (Date, Date) {
    let current = state.current_date.date();
    match state.view {
        View::Month => (current.first_of_month(), current.last_of_month()),
        View::Week => {
            let offset = i32::from(current.weekday().to_sunday_zero_offset());
            let first = current.saturating_sub(offset.days());
            (first, first.saturating_add(6.days()))
        }
        View::Agenda => (current, current.saturating_add((AGENDA_DAYS - 1).days())),
    }
}

/// Renders the header and the day-by-day listing of the visible range.
pub fn format_state(state: &CalendarState, today: Date) -> String {
    let (first, last) = visible_range(state);
    let mut out = String::new();

    let title = match state.view {
        View::Month => state.current_date.strftime("%B %Y").to_string(),
        View::Week | View::Agenda => format!(
            "{} - {}",
            first.strftime("%b %-d"),
            last.strftime("%b %-d, %Y")
        ),
    };
    let _ = writeln!(out, "🗓️ {} {}", title.bold(), format!("[{}]", state.view).dimmed());

    let mut empty = true;
    for day in first.series(1.day()).take_while(|d| *d <= last) {
        if !state.settings.show_weekends && state.view != View::Agenda && is_weekend(day) {
            continue;
        }

        let mut events: Vec<&Event> = state.events.iter().filter(|e| occurs_on(e, day)).collect();
        if events.is_empty() {
            continue;
        }
        events.sort_by_key(|e| (!e.all_day, e.start));
        empty = false;

        let _ = writeln!(out, " {} {}", "►".green(), day_label(day, today, state.selected_date));
        let limit = usize::try_from(state.settings.max_events_per_day).unwrap_or(usize::MAX);
        let shown = match state.view {
            View::Month => limit.max(1),
            View::Week | View::Agenda => usize::MAX,
        };
        for event in events.iter().take(shown) {
            let _ = writeln!(out, "   {}", format_event(event, &state.settings));
        }
        if events.len() > shown {
            let more = format!("+{} more", events.len() - shown);
            let _ = writeln!(out, "   {}", more.dimmed());
        }
    }

    if empty {
        let _ = writeln!(out, " {}", "No events".dimmed());
    }
    out
}

/// One event line: colored bullet, time span, title and markers.
pub fn format_event(event: &Event, settings: &Settings) -> String {
    let time = if event.all_day {
        "all day".to_string()
    } else {
        let pattern = if settings.use_24_hour { "%H:%M" } else { "%-I:%M %p" };
        format!("{}-{}", event.start.strftime(pattern), event.end.strftime(pattern))
    };

    let mut line = format!("{} {:<17} {}", bullet(&event.color), time, event.title.bold());
    if let Some(location) = &event.location {
        let _ = write!(line, " @ {location}");
    }
    if event.is_recurring() {
        let _ = write!(line, " {}", "↻".cyan());
    }
    let _ = write!(line, " {}", format!("({})", event.id).dimmed());
    line
}

fn occurs_on(event: &Event, day: Date) -> bool {
    let start = event.start.date();
    let end = event.end.date().max(start);
    start <= day && day <= end
}

fn day_label(day: Date, today: Date, selected: Option<Date>) -> ColoredString {
    let label = day.strftime("%a %b %-d").to_string();
    if Some(day) == selected {
        label.reversed()
    } else if day == today {
        label.yellow().italic()
    } else {
        label.italic()
    }
}

fn is_weekend(day: Date) -> bool {
    matches!(day.weekday(), Weekday::Saturday | Weekday::Sunday)
}

fn bullet(color: &str) -> ColoredString {
    match hex_rgb(color) {
        Some((r, g, b)) => "●".truecolor(r, g, b),
        None => "●".normal(),
    }
}

fn hex_rgb(color: &str) -> Option<(u8, u8, u8)> {
    let hex = color.strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
    Some((channel(0)?, channel(2)?, channel(4)?))
}
