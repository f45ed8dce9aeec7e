// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use jiff::civil::{Date, DateTime, Time};
use jiff::tz::TimeZone;
use jiff::{Timestamp, Zoned};

/// A point in time as it arrived from a source, which may be a bare date, a floating
/// date-time, or an absolute instant with a known offset.
#[derive(Debug, Clone, PartialEq)]
pub enum LooseDateTime {
    /// Date only without time.
    DateOnly(Date),

    /// Floating date and time without timezone.
    Floating(DateTime),

    /// Absolute date and time with timezone or offset.
    Zoned(Zoned),
}

impl LooseDateTime {
    /// Parses the textual forms accepted from remote and cached payloads.
    ///
    /// Returns `None` for anything that is not a recognizable date or timestamp.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        if s.is_empty() {
            return None;
        }

        if s.len() == 10 {
            if let Ok(d) = s.parse::<Date>() {
                return Some(Self::DateOnly(d));
            }
        }

        // Instants carry an offset or `Z`, and must be tried before civil parsing which
        // would otherwise drop the offset.
        if let Ok(ts) = s.parse::<Timestamp>() {
            return Some(Self::Zoned(ts.to_zoned(TimeZone::UTC)));
        }

        if let Ok(zdt) = s.parse::<Zoned>() {
            return Some(Self::Zoned(zdt));
        }

        s.parse::<DateTime>().ok().map(Self::Floating)
    }

    /// Interprets a number as milliseconds since the Unix epoch.
    pub fn from_millis(millis: i64) -> Option<Self> {
        Timestamp::from_millisecond(millis)
            .ok()
            .map(|ts| Self::Zoned(ts.to_zoned(TimeZone::UTC)))
    }

    /// Whether the source carried no time of day.
    pub fn is_date_only(&self) -> bool {
        matches!(self, Self::DateOnly(_))
    }

    /// Returns the date part.
    pub fn date(&self) -> Date {
        match self {
            Self::DateOnly(d) => *d,
            Self::Floating(dt) => dt.date(),
            Self::Zoned(zdt) => zdt.date(),
        }
    }

    /// Resolves to a civil date-time in the given zone. Bare dates become local midnight.
    pub fn to_local(&self, tz: &TimeZone) -> DateTime {
        match self {
            Self::DateOnly(d) => d.to_datetime(Time::midnight()),
            Self::Floating(dt) => *dt,
            Self::Zoned(zdt) => zdt.with_time_zone(tz.clone()).datetime(),
        }
    }
}

/// Whether the date-time falls exactly on midnight.
pub(crate) fn is_midnight(dt: &DateTime) -> bool {
    dt.time() == Time::midnight()
}

/// Milliseconds since the Unix epoch, the unit used for tap timing.
pub(crate) fn now_millis() -> u64 {
    u64::try_from(Timestamp::now().as_millisecond()).unwrap_or_default()
}
