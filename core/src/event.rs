// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::fmt::{self, Display};
use std::str::FromStr;
use std::sync::LazyLock;

use jiff::civil::DateTime;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Title used when the source omits one.
pub(crate) const UNTITLED: &str = "(No title)";

/// A calendar event after normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    /// Unique identifier.
    pub id: String,

    /// Title shown in every view.
    pub title: String,

    /// Free text description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Where the event takes place.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    /// Start in local civil time.
    pub start: DateTime,

    /// End in local civil time. May equal `start`. Not guaranteed to be after `start`.
    pub end: DateTime,

    /// Whether the event spans whole days.
    pub all_day: bool,

    /// Category, supplied or inferred from the text.
    pub category: Category,

    /// The calendar this event belongs to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calendar_id: Option<String>,

    /// Repetition rules, each carrying its marker such as `RRULE:`.
    #[serde(default)]
    pub recurrence: Vec<String>,

    /// The parent series of an expanded recurring instance.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurring_event_id: Option<String>,

    /// Display color.
    pub color: String,

    /// Display icon name.
    pub icon: String,
}

impl Event {
    /// Whether the event repeats.
    pub fn is_recurring(&self) -> bool {
        !self.recurrence.is_empty()
    }
}

/// A calendar as configured on the remote service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarInfo {
    /// Identifier referenced by events.
    pub id: String,

    /// Display name.
    #[serde(default)]
    pub name: String,

    /// Color applied to the calendar's events.
    #[serde(default)]
    pub color: Option<String>,
}

/// The fixed set of event categories.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum Category {
    /// Work related.
    Work,

    /// Family related.
    Family,

    /// Health and fitness.
    Health,

    /// Social gatherings.
    Social,

    /// Personal errands and hobbies.
    Personal,

    /// Anything else.
    #[default]
    Other,
}

const CATEGORY_WORK: &str = "work";
const CATEGORY_FAMILY: &str = "family";
const CATEGORY_HEALTH: &str = "health";
const CATEGORY_SOCIAL: &str = "social";
const CATEGORY_PERSONAL: &str = "personal";
const CATEGORY_OTHER: &str = "other";

/// Keywords checked in order; the first category with a whole-word hit wins.
const CATEGORY_KEYWORDS: &[(Category, &[&str])] = &[
    (
        Category::Work,
        &[
            "meeting",
            "work",
            "office",
            "project",
            "deadline",
            "client",
            "presentation",
            "interview",
            "review",
        ],
    ),
    (
        Category::Family,
        &[
            "family",
            "kids",
            "mom",
            "dad",
            "birthday",
            "anniversary",
            "school",
        ],
    ),
    (
        Category::Health,
        &[
            "doctor",
            "dentist",
            "gym",
            "workout",
            "health",
            "yoga",
            "therapy",
            "checkup",
        ],
    ),
    (
        Category::Social,
        &["party", "dinner", "lunch", "drinks", "friends", "concert", "wedding"],
    ),
    (
        Category::Personal,
        &["personal", "reading", "hobby", "shopping", "haircut", "errand"],
    ),
];

static CATEGORY_PATTERNS: LazyLock<Vec<(Category, Regex)>> = LazyLock::new(|| {
    CATEGORY_KEYWORDS
        .iter()
        .filter_map(|(category, words)| {
            let pattern = format!(r"(?i)\b(?:{})\b", words.join("|"));
            match Regex::new(&pattern) {
                Ok(re) => Some((*category, re)),
                Err(err) => {
                    tracing::error!(?category, %err, "invalid category pattern");
                    None
                }
            }
        })
        .collect()
});

impl Category {
    /// Every category, in display order.
    pub const ALL: [Category; 6] = [
        Category::Work,
        Category::Family,
        Category::Health,
        Category::Social,
        Category::Personal,
        Category::Other,
    ];

    /// Infers a category from free text; `Other` when nothing matches.
    pub fn infer(title: &str, description: Option<&str>) -> Self {
        let text = match description {
            Some(d) => format!("{title} {d}"),
            None => title.to_string(),
        };

        CATEGORY_PATTERNS
            .iter()
            .find(|(_, re)| re.is_match(&text))
            .map_or(Category::Other, |(category, _)| *category)
    }

    /// Default display color.
    pub fn color(self) -> &'static str {
        match self {
            Category::Work => "#4285f4",
            Category::Family => "#ea4335",
            Category::Health => "#34a853",
            Category::Social => "#fbbc04",
            Category::Personal => "#9c27b0",
            Category::Other => "#607d8b",
        }
    }

    /// Default display icon name.
    pub fn icon(self) -> &'static str {
        match self {
            Category::Work => "briefcase",
            Category::Family => "home",
            Category::Health => "heart",
            Category::Social => "users",
            Category::Personal => "user",
            Category::Other => "calendar",
        }
    }
}

impl AsRef<str> for Category {
    fn as_ref(&self) -> &str {
        match self {
            Category::Work => CATEGORY_WORK,
            Category::Family => CATEGORY_FAMILY,
            Category::Health => CATEGORY_HEALTH,
            Category::Social => CATEGORY_SOCIAL,
            Category::Personal => CATEGORY_PERSONAL,
            Category::Other => CATEGORY_OTHER,
        }
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_ref())
    }
}

impl FromStr for Category {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            CATEGORY_WORK => Ok(Category::Work),
            CATEGORY_FAMILY => Ok(Category::Family),
            CATEGORY_HEALTH => Ok(Category::Health),
            CATEGORY_SOCIAL => Ok(Category::Social),
            CATEGORY_PERSONAL => Ok(Category::Personal),
            CATEGORY_OTHER => Ok(Category::Other),
            _ => Err(()),
        }
    }
}

/// Draft for an event, used for creating new events.
#[derive(Debug, Clone, Default)]
pub struct EventDraft {
    /// The title of the event.
    pub title: String,

    /// The description of the event, if available.
    pub description: Option<String>,

    /// The location of the event, if available.
    pub location: Option<String>,

    /// The start date and time. Defaults to now.
    pub start: Option<DateTime>,

    /// The end date and time. Defaults to one hour after the start.
    pub end: Option<DateTime>,

    /// Whether the event spans whole days.
    pub all_day: bool,

    /// Explicit category; inferred from the text when `None`.
    pub category: Option<Category>,

    /// Owning calendar.
    pub calendar_id: Option<String>,

    /// Repetition, encoded into a rule when the event is created.
    pub recurrence: Option<crate::RecurrenceConfig>,
}

/// Patch for an event, allowing partial updates.
#[derive(Debug, Default, Clone)]
pub struct EventPatch {
    /// The title of the event, if changed.
    pub title: Option<String>,

    /// The description of the event, if changed.
    pub description: Option<Option<String>>,

    /// The location of the event, if changed.
    pub location: Option<Option<String>>,

    /// The start of the event, if changed.
    pub start: Option<DateTime>,

    /// The end of the event, if changed.
    pub end: Option<DateTime>,

    /// Whether the event spans whole days, if changed.
    pub all_day: Option<bool>,

    /// The category of the event, if changed.
    pub category: Option<Category>,

    /// The repetition rules, if changed.
    pub recurrence: Option<Vec<String>>,
}

impl EventPatch {
    /// Is this patch empty, meaning no fields are set
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.location.is_none()
            && self.start.is_none()
            && self.end.is_none()
            && self.all_day.is_none()
            && self.category.is_none()
            && self.recurrence.is_none()
    }

    /// Applies the patch to an event, modifying it in place.
    pub(crate) fn apply_to<'a>(&self, e: &'a mut Event) -> &'a mut Event {
        if let Some(title) = &self.title {
            e.title.clone_from(title);
        }

        if let Some(description) = &self.description {
            e.description.clone_from(description);
        }

        if let Some(location) = &self.location {
            e.location.clone_from(location);
        }

        if let Some(start) = self.start {
            e.start = start;
        }

        if let Some(end) = self.end {
            e.end = end;
        }

        if let Some(all_day) = self.all_day {
            e.all_day = all_day;
        }

        if let Some(category) = self.category {
            // Keep calendar-provided colors, only swap the category defaults
            if e.color == e.category.color() {
                e.color = category.color().to_string();
            }
            if e.icon == e.category.icon() {
                e.icon = category.icon().to_string();
            }
            e.category = category;
        }

        if let Some(recurrence) = &self.recurrence {
            e.recurrence.clone_from(recurrence);
        }

        e
    }
}
