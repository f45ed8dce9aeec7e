// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use jiff::ToSpan;
use jiff::civil::DateTime;
use jiff::tz::TimeZone;
use uuid::Uuid;

use crate::datetime::{LooseDateTime, is_midnight, now_millis};
use crate::event::{CalendarInfo, Category, Event, EventDraft, UNTITLED};
use crate::pipeline::decode::{RawEvent, RawScalar, RawTime};
use crate::recurrence::{RRULE_MARKER, RecurrenceEncoder};

/// Markers a repetition entry may already carry.
const RULE_MARKERS: [&str; 4] = [RRULE_MARKER, "EXRULE:", "RDATE:", "EXDATE:"];

/// Turns raw entries and drafts into canonical [`Event`]s.
#[derive(Debug)]
pub(crate) struct Normalizer<'a> {
    tz: &'a TimeZone,
    calendars: &'a [CalendarInfo],
    now: DateTime,
}

impl<'a> Normalizer<'a> {
    pub fn new(tz: &'a TimeZone, calendars: &'a [CalendarInfo], now: DateTime) -> Self {
        Self { tz, calendars, now }
    }

    pub fn normalize_all(&self, raws: Vec<RawEvent>) -> Vec<Event> {
        raws.into_iter().map(|raw| self.normalize(raw)).collect()
    }

    pub fn normalize(&self, raw: RawEvent) -> Event {
        let start = self.resolve_time(raw.start.as_ref(), "start");
        let end = match raw.end.as_ref() {
            None => start.clone(),
            Some(_) => self.resolve_time(raw.end.as_ref(), "end"),
        };

        let start_local = self.to_local(start.as_ref());
        let end_local = self.to_local(end.as_ref());

        let all_day = raw.all_day.unwrap_or_else(|| {
            start.as_ref().is_some_and(LooseDateTime::is_date_only)
                || (end_local > start_local && is_midnight(&start_local) && is_midnight(&end_local))
        });

        let recurrence = clean_recurrence(raw.recurrence_entries());

        let title = non_blank(raw.title).unwrap_or_else(|| UNTITLED.to_string());
        let description = non_blank(raw.description);
        let category = match raw.category.as_deref().map(str::parse::<Category>) {
            Some(Ok(category)) => category,
            Some(Err(())) | None => Category::infer(&title, description.as_deref()),
        };
        let calendar_id = raw.calendar_id.and_then(RawScalar::into_text);
        let color = non_blank(raw.color)
            .or_else(|| self.calendar_color(calendar_id.as_deref()))
            .unwrap_or_else(|| category.color().to_string());
        let icon = non_blank(raw.icon).unwrap_or_else(|| category.icon().to_string());
        let id = raw
            .id
            .and_then(RawScalar::into_text)
            .unwrap_or_else(generate_id);

        Event {
            id,
            title,
            description,
            location: non_blank(raw.location),
            start: start_local,
            end: end_local,
            all_day,
            category,
            calendar_id,
            recurrence,
            recurring_event_id: raw.recurring_event_id.and_then(RawScalar::into_text),
            color,
            icon,
        }
    }

    /// Builds a new event from a form draft. Missing times default to now and one hour
    /// later, or the next day for all-day events, and a repetition choice is encoded
    /// into a rule.
    pub fn from_draft(&self, draft: EventDraft) -> Event {
        let start = draft.start.unwrap_or(self.now);
        let end = draft.end.unwrap_or_else(|| {
            let length = if draft.all_day { 1.day() } else { 1.hour() };
            start.checked_add(length).unwrap_or(start)
        });

        let title = non_blank(Some(draft.title)).unwrap_or_else(|| UNTITLED.to_string());
        let description = non_blank(draft.description);
        let category = draft
            .category
            .unwrap_or_else(|| Category::infer(&title, description.as_deref()));

        let recurrence = draft
            .recurrence
            .map(|config| {
                RecurrenceEncoder::new(self.tz.clone()).encode(&config, Some(start.date()))
            })
            .filter(|rule| !rule.is_empty())
            .into_iter()
            .collect();

        let color = self
            .calendar_color(draft.calendar_id.as_deref())
            .unwrap_or_else(|| category.color().to_string());

        Event {
            id: generate_id(),
            title,
            description,
            location: non_blank(draft.location),
            start,
            end,
            all_day: draft.all_day,
            category,
            calendar_id: draft.calendar_id,
            recurrence,
            recurring_event_id: None,
            color,
            icon: category.icon().to_string(),
        }
    }

    fn resolve_time(&self, raw: Option<&RawTime>, field: &'static str) -> Option<LooseDateTime> {
        let parsed = raw.and_then(RawTime::parse);
        if parsed.is_none() {
            tracing::warn!(field, ?raw, "unparsable event time, using now");
        }
        parsed
    }

    fn to_local(&self, time: Option<&LooseDateTime>) -> DateTime {
        time.map_or(self.now, |t| t.to_local(self.tz))
    }

    fn calendar_color(&self, calendar_id: Option<&str>) -> Option<String> {
        let id = calendar_id?;
        self.calendars
            .iter()
            .find(|c| c.id == id)
            .and_then(|c| c.color.clone())
            .filter(|c| !c.trim().is_empty())
    }
}

/// Drops blank entries and adds the `RRULE:` marker to bare rule bodies.
fn clean_recurrence<'a>(entries: impl Iterator<Item = &'a str>) -> Vec<String> {
    entries
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            let upper = entry.to_ascii_uppercase();
            if RULE_MARKERS.iter().any(|marker| upper.starts_with(marker)) {
                entry.to_string()
            } else {
                format!("{RRULE_MARKER}{entry}")
            }
        })
        .collect()
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// A fresh identifier of the form `evt-<unix millis>-<8 hex chars>`.
pub(crate) fn generate_id() -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("evt-{}-{}", now_millis(), &suffix[..8])
}
