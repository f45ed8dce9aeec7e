// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Wire shapes accepted from the remote service and from the local cache.

use jiff::tz::TimeZone;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::datetime::LooseDateTime;
use crate::event::CalendarInfo;

const KEY_SUCCESS: &str = "success";
const KEY_EVENTS: &str = "events";
const KEY_CALENDARS: &str = "calendars";

/// The top level shape of an event list payload.
#[derive(Debug)]
pub(crate) enum Payload {
    /// `{"success": true, "events": [...]}`
    Wrapped(Vec<Value>),

    /// `[...]`
    Bare(Vec<Value>),

    /// Anything else, with a short description of what was seen.
    Unrecognized(String),
}

impl Payload {
    pub fn classify(value: Value) -> Self {
        match value {
            Value::Array(items) => Payload::Bare(items),
            Value::Object(mut map) => {
                let success = map.get(KEY_SUCCESS).and_then(Value::as_bool) == Some(true);
                match (success, map.remove(KEY_EVENTS)) {
                    (true, Some(Value::Array(items))) => Payload::Wrapped(items),
                    (true, _) => Payload::Unrecognized("success without an events list".into()),
                    (false, _) => {
                        let reason = map
                            .get("error")
                            .or_else(|| map.get("message"))
                            .and_then(Value::as_str)
                            .unwrap_or("success flag not set");
                        Payload::Unrecognized(reason.to_string())
                    }
                }
            }
            other => Payload::Unrecognized(format!("{} payload", kind_of(&other))),
        }
    }

    /// The event entries, or the reason the payload was not understood.
    pub fn into_entries(self) -> Result<Vec<Value>, String> {
        match self {
            Payload::Wrapped(items) | Payload::Bare(items) => Ok(items),
            Payload::Unrecognized(reason) => Err(reason),
        }
    }
}

/// Decodes a calendar configuration payload, either bare or under `calendars`.
///
/// Malformed entries are skipped; an unknown shape yields an empty list.
pub(crate) fn decode_calendars(value: Value) -> Vec<CalendarInfo> {
    let items = match value {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove(KEY_CALENDARS) {
            Some(Value::Array(items)) => items,
            _ => {
                tracing::warn!("calendar payload without a calendars list");
                return Vec::new();
            }
        },
        other => {
            tracing::warn!(kind = kind_of(&other), "unexpected calendar payload");
            return Vec::new();
        }
    };

    items
        .into_iter()
        .filter_map(|item| match serde_json::from_value(item) {
            Ok(calendar) => Some(calendar),
            Err(err) => {
                tracing::warn!(%err, "skipping malformed calendar entry");
                None
            }
        })
        .collect()
}

/// Decodes the entries of an event list, skipping anything that is not an event object.
pub(crate) fn decode_events(entries: Vec<Value>) -> Vec<RawEvent> {
    entries
        .into_iter()
        .enumerate()
        .filter_map(|(index, entry)| {
            if !entry.is_object() {
                tracing::warn!(index, kind = kind_of(&entry), "skipping non-object event entry");
                return None;
            }
            match serde_json::from_value::<RawEvent>(entry) {
                Ok(raw) => Some(raw),
                Err(err) => {
                    tracing::warn!(index, %err, "skipping malformed event entry");
                    None
                }
            }
        })
        .collect()
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// An event entry as it arrives, before normalization.
///
/// A field of the wrong JSON type is dropped with a warning so the entry survives and
/// normalization fills in its default.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct RawEvent {
    #[serde(alias = "uid", deserialize_with = "lenient")]
    pub id: Option<RawScalar>,

    #[serde(alias = "summary", deserialize_with = "lenient")]
    pub title: Option<String>,

    #[serde(deserialize_with = "lenient")]
    pub description: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub location: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub start: Option<RawTime>,
    #[serde(deserialize_with = "lenient")]
    pub end: Option<RawTime>,

    #[serde(alias = "all_day", deserialize_with = "lenient")]
    pub all_day: Option<bool>,

    #[serde(deserialize_with = "lenient")]
    pub category: Option<String>,

    #[serde(alias = "calendar_id", deserialize_with = "lenient")]
    pub calendar_id: Option<RawScalar>,

    #[serde(deserialize_with = "lenient")]
    pub recurrence: Option<RawRecurrence>,

    // legacy spellings of the repetition rule
    #[serde(deserialize_with = "lenient")]
    pub rrule: Option<RawRecurrence>,
    #[serde(deserialize_with = "lenient")]
    pub recurrence_rule: Option<RawRecurrence>,
    #[serde(deserialize_with = "lenient")]
    pub repeat_rule: Option<RawRecurrence>,

    #[serde(alias = "recurring_event_id", deserialize_with = "lenient")]
    pub recurring_event_id: Option<RawScalar>,

    #[serde(deserialize_with = "lenient")]
    pub color: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub icon: Option<String>,
}

/// Reads an optional field, treating a value of the wrong type like an absent one.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    if value.is_null() {
        return Ok(None);
    }

    let kind = kind_of(&value);
    match serde_json::from_value(value) {
        Ok(parsed) => Ok(Some(parsed)),
        Err(err) => {
            tracing::warn!(kind, %err, "ignoring event field of unexpected type");
            Ok(None)
        }
    }
}

impl RawEvent {
    /// Every repetition entry, in field order, before cleanup.
    pub fn recurrence_entries(&self) -> impl Iterator<Item = &str> {
        [
            &self.recurrence,
            &self.rrule,
            &self.recurrence_rule,
            &self.repeat_rule,
        ]
        .into_iter()
        .flatten()
        .flat_map(RawRecurrence::entries)
    }
}

/// An identifier that may arrive as text or as a number.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum RawScalar {
    Text(String),
    Number(serde_json::Number),
}

impl RawScalar {
    /// The identifier as text, `None` when blank.
    pub fn into_text(self) -> Option<String> {
        let text = match self {
            RawScalar::Text(s) => s.trim().to_string(),
            RawScalar::Number(n) => n.to_string(),
        };
        (!text.is_empty()).then_some(text)
    }
}

/// A time field: text, epoch milliseconds, or a `{dateTime}` / `{date}` object.
///
/// Any other shape is kept as [`RawTime::Other`] so the rest of the entry still decodes.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum RawTime {
    Text(String),
    Millis(i64),
    Object {
        #[serde(default, rename = "dateTime", alias = "date_time")]
        date_time: Option<String>,

        #[serde(default)]
        date: Option<String>,

        #[serde(default, rename = "timeZone", alias = "time_zone")]
        time_zone: Option<String>,
    },
    Other(Value),
}

impl RawTime {
    /// Parses the value, or `None` when it is not a recognizable time.
    pub fn parse(&self) -> Option<LooseDateTime> {
        match self {
            RawTime::Text(s) => LooseDateTime::parse(s),
            RawTime::Millis(ms) => LooseDateTime::from_millis(*ms),
            RawTime::Object {
                date_time: Some(s),
                time_zone,
                ..
            } => {
                let parsed = LooseDateTime::parse(s)?;
                match (parsed, time_zone) {
                    (LooseDateTime::Floating(dt), Some(name)) => match TimeZone::get(name) {
                        Ok(tz) => dt.to_zoned(tz).ok().map(LooseDateTime::Zoned),
                        Err(err) => {
                            tracing::warn!(time_zone = %name, %err, "unknown time zone, keeping floating time");
                            Some(LooseDateTime::Floating(dt))
                        }
                    },
                    (parsed, _) => Some(parsed),
                }
            }
            RawTime::Object { date: Some(s), .. } => LooseDateTime::parse(s),
            RawTime::Object { .. } => None,
            RawTime::Other(value) => {
                tracing::warn!(kind = kind_of(value), "unsupported time value");
                None
            }
        }
    }
}

/// Repetition rules given as one string or as a list.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum RawRecurrence {
    One(String),
    Many(Vec<Option<String>>),
}

impl RawRecurrence {
    fn entries(&self) -> Vec<&str> {
        match self {
            RawRecurrence::One(s) => vec![s.as_str()],
            RawRecurrence::Many(items) => items.iter().flatten().map(String::as_str).collect(),
        }
    }
}
