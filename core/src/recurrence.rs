// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Encoding of a structured repetition choice into an iCalendar `RRULE` line.

use std::fmt::{self, Display};

use jiff::civil::{Date, Time, Weekday};
use jiff::tz::TimeZone;

/// Marker that prefixes every repetition rule.
pub(crate) const RRULE_MARKER: &str = "RRULE:";

const KW_FREQ: &str = "FREQ";
const KW_INTERVAL: &str = "INTERVAL";
const KW_BYDAY: &str = "BYDAY";
const KW_BYMONTH: &str = "BYMONTH";
const KW_BYMONTHDAY: &str = "BYMONTHDAY";
const KW_COUNT: &str = "COUNT";
const KW_UNTIL: &str = "UNTIL";

const UNTIL_FORMAT: &str = "%Y%m%dT%H%M%SZ";

/// Recurrence frequency
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
#[expect(missing_docs)]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Frequency::Daily => write!(f, "DAILY"),
            Frequency::Weekly => write!(f, "WEEKLY"),
            Frequency::Monthly => write!(f, "MONTHLY"),
            Frequency::Yearly => write!(f, "YEARLY"),
        }
    }
}

/// How monthly and yearly rules pin the day.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum RepeatBy {
    /// Same day of the month, e.g. every 15th.
    #[default]
    DayOfMonth,

    /// Same weekday occurrence, e.g. every second Tuesday.
    DayOfWeek,
}

/// When a repetition stops.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum RecurrenceEnd {
    /// Repeats forever.
    #[default]
    Never,

    /// Stops after the given number of occurrences.
    After(u32),

    /// Stops at the end of the given day.
    On(Date),
}

/// A repetition as chosen in an event form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecurrenceConfig {
    /// Base frequency; no rule is produced without one.
    pub frequency: Option<Frequency>,

    /// Repeat every N periods.
    pub interval: u32,

    /// Weekdays for weekly rules, kept in the given order.
    pub selected_days: Vec<Weekday>,

    /// Day pinning for monthly and yearly rules.
    pub repeat_by: RepeatBy,

    /// End condition.
    pub end: RecurrenceEnd,
}

impl Default for RecurrenceConfig {
    fn default() -> Self {
        Self {
            frequency: None,
            interval: 1,
            selected_days: Vec::new(),
            repeat_by: RepeatBy::default(),
            end: RecurrenceEnd::default(),
        }
    }
}

/// Turns a [`RecurrenceConfig`] into an `RRULE:` line.
///
/// `UNTIL` dates are taken as the end of that day in the encoder's zone and written in UTC.
#[derive(Debug, Clone)]
pub struct RecurrenceEncoder {
    tz: TimeZone,
}

impl Default for RecurrenceEncoder {
    fn default() -> Self {
        Self::new(TimeZone::system())
    }
}

impl RecurrenceEncoder {
    /// Creates an encoder resolving end dates in `tz`.
    pub fn new(tz: TimeZone) -> Self {
        Self { tz }
    }

    /// Encodes the rule for an event starting on `start`.
    ///
    /// Returns an empty string when the frequency or the start date is missing, so callers
    /// must check before storing the result.
    pub fn encode(&self, config: &RecurrenceConfig, start: Option<Date>) -> String {
        let (Some(freq), Some(start)) = (config.frequency, start) else {
            return String::new();
        };

        let mut parts = vec![format!("{KW_FREQ}={freq}")];

        if config.interval > 1 {
            parts.push(format!("{KW_INTERVAL}={}", config.interval));
        }

        match freq {
            Frequency::Daily => {}
            Frequency::Weekly => {
                let mut days: Vec<Weekday> = Vec::with_capacity(config.selected_days.len());
                for day in &config.selected_days {
                    if !days.contains(day) {
                        days.push(*day);
                    }
                }
                if days.is_empty() {
                    days.push(start.weekday());
                }
                let codes: Vec<&str> = days.into_iter().map(weekday_code).collect();
                parts.push(format!("{KW_BYDAY}={}", codes.join(",")));
            }
            Frequency::Monthly => {
                if config.repeat_by == RepeatBy::DayOfWeek {
                    parts.push(format!("{KW_BYDAY}={}", nth_weekday(start)));
                }
            }
            Frequency::Yearly => {
                parts.push(format!("{KW_BYMONTH}={}", start.month()));
                match config.repeat_by {
                    RepeatBy::DayOfMonth => {
                        parts.push(format!("{KW_BYMONTHDAY}={}", start.day()));
                    }
                    RepeatBy::DayOfWeek => {
                        parts.push(format!("{KW_BYDAY}={}", nth_weekday(start)));
                    }
                }
            }
        }

        match config.end {
            RecurrenceEnd::Never => {}
            RecurrenceEnd::After(count) => parts.push(format!("{KW_COUNT}={count}")),
            RecurrenceEnd::On(until) => match self.format_until(until) {
                Some(until) => parts.push(format!("{KW_UNTIL}={until}")),
                None => tracing::warn!(%until, "cannot resolve end date, rule left open"),
            },
        }

        let mut rule = String::from(RRULE_MARKER);
        rule.push_str(&parts.join(";"));
        rule
    }

    fn format_until(&self, until: Date) -> Option<String> {
        let end_of_day = until.to_datetime(Time::new(23, 59, 59, 0).ok()?);
        let zoned = end_of_day.to_zoned(self.tz.clone()).ok()?;
        Some(
            zoned
                .with_time_zone(TimeZone::UTC)
                .strftime(UNTIL_FORMAT)
                .to_string(),
        )
    }
}

/// Two-letter iCalendar weekday code.
fn weekday_code(day: Weekday) -> &'static str {
    match day {
        Weekday::Monday => "MO",
        Weekday::Tuesday => "TU",
        Weekday::Wednesday => "WE",
        Weekday::Thursday => "TH",
        Weekday::Friday => "FR",
        Weekday::Saturday => "SA",
        Weekday::Sunday => "SU",
    }
}

/// The "Nth weekday of the month" token for a date, e.g. `2TU`.
fn nth_weekday(date: Date) -> String {
    let n = (date.day() + 6) / 7;
    format!("{n}{}", weekday_code(date.weekday()))
}
