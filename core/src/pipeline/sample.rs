// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use jiff::ToSpan;
use jiff::civil::{Date, DateTime, Time};

use crate::event::{Category, Event};

/// Illustrative events shown when neither the network nor the cache has anything.
///
/// One event per category, spread over the days following `today`, each with the stable
/// id `sample-<category>`.
pub(crate) fn sample_events(today: Date) -> Vec<Event> {
    Category::ALL
        .iter()
        .zip(0_i64..)
        .map(|(category, offset)| {
            let day = today.checked_add(offset.days()).unwrap_or(today);
            sample_for(*category, day)
        })
        .collect()
}

fn sample_for(category: Category, day: Date) -> Event {
    let (title, description, hours) = match category {
        Category::Work => ("Project review", "Go through the quarterly plan", Some((9, 10))),
        Category::Family => ("Family dinner", "At grandma's place", Some((18, 20))),
        Category::Health => ("Morning gym", "Cardio and stretching", Some((7, 8))),
        Category::Social => ("Drinks with friends", "The usual spot downtown", Some((19, 22))),
        Category::Personal => ("Haircut", "Booked online", Some((11, 12))),
        Category::Other => ("Public holiday", "Most offices are closed", None),
    };

    let (start, end, all_day) = match hours {
        Some((from, to)) => (at_hour(day, from), at_hour(day, to), false),
        None => {
            let start = day.to_datetime(Time::midnight());
            (start, start.checked_add(1.day()).unwrap_or(start), true)
        }
    };

    Event {
        id: format!("sample-{category}"),
        title: title.to_string(),
        description: Some(description.to_string()),
        location: None,
        start,
        end,
        all_day,
        category,
        calendar_id: None,
        recurrence: Vec::new(),
        recurring_event_id: None,
        color: category.color().to_string(),
        icon: category.icon().to_string(),
    }
}

fn at_hour(day: Date, hour: i8) -> DateTime {
    day.to_datetime(Time::constant(hour, 0, 0, 0))
}
