// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::error::Error;

use calview_core::{
    Calendar, Category, EventDraft, Frequency, LooseDateTime, RecurrenceConfig, RecurrenceEnd,
    View,
};
use clap::{ArgMatches, Command};
use jiff::tz::TimeZone;

use crate::arg::{EventArgs, get_view, view_arg};
use crate::render::{format_event, format_state};

#[derive(Debug, Clone)]
pub struct CmdEventList {
    pub view: Option<View>,
}

impl CmdEventList {
    pub const NAME: &str = "list";

    pub fn command() -> Command {
        Command::new(Self::NAME)
            .alias("ls")
            .about("Print the events of the current month, week or agenda")
            .arg(view_arg())
    }

    pub fn from(matches: &ArgMatches) -> Self {
        Self {
            view: get_view(matches),
        }
    }

    pub async fn run(self, calendar: &Calendar) -> Result<(), Box<dyn Error>> {
        tracing::debug!(?self, "listing events...");
        print!("{}", format_state(&calendar.state(), calendar.now().date()));
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct CmdEventNew {
    pub title: String,
    pub start: Option<String>,
    pub end: Option<String>,
    pub all_day: bool,
    pub description: Option<String>,
    pub location: Option<String>,
    pub category: Option<Category>,
    pub repeat: Option<Frequency>,
    pub count: Option<u32>,
}

impl CmdEventNew {
    pub const NAME: &str = "new";

    pub fn command() -> Command {
        Command::new(Self::NAME)
            .alias("add")
            .about("Add a new event")
            .arg(EventArgs::title())
            .arg(EventArgs::start())
            .arg(EventArgs::end())
            .arg(EventArgs::all_day())
            .arg(EventArgs::description())
            .arg(EventArgs::location())
            .arg(EventArgs::category())
            .arg(EventArgs::repeat())
            .arg(EventArgs::count())
    }

    pub fn from(matches: &ArgMatches) -> Self {
        Self {
            title: EventArgs::get_title(matches),
            start: EventArgs::get_start(matches),
            end: EventArgs::get_end(matches),
            all_day: EventArgs::get_all_day(matches),
            description: EventArgs::get_description(matches),
            location: EventArgs::get_location(matches),
            category: EventArgs::get_category(matches),
            repeat: EventArgs::get_repeat(matches),
            count: EventArgs::get_count(matches),
        }
    }

    pub async fn run(self, calendar: &Calendar) -> Result<(), Box<dyn Error>> {
        tracing::debug!(?self, "adding new event...");
        let tz = calendar.pipeline().time_zone();
        let draft = self.into_draft(tz)?;

        let event = calendar.add_event(draft).await;
        println!("{}", format_event(&event, &calendar.state().settings));
        Ok(())
    }

    fn into_draft(self, tz: &TimeZone) -> Result<EventDraft, Box<dyn Error>> {
        let start = self.start.as_deref().map(parse_time).transpose()?;
        let end = self.end.as_deref().map(parse_time).transpose()?;
        let all_day = self.all_day || start.as_ref().is_some_and(LooseDateTime::is_date_only);

        let recurrence = self.repeat.map(|frequency| RecurrenceConfig {
            frequency: Some(frequency),
            end: self.count.map_or(RecurrenceEnd::Never, RecurrenceEnd::After),
            ..RecurrenceConfig::default()
        });

        Ok(EventDraft {
            title: self.title,
            description: self.description,
            location: self.location,
            start: start.map(|t| t.to_local(tz)),
            end: end.map(|t| t.to_local(tz)),
            all_day,
            category: self.category,
            calendar_id: None,
            recurrence,
        })
    }
}

#[derive(Debug, Clone)]
pub struct CmdEventDelete {
    pub id: String,
}

impl CmdEventDelete {
    pub const NAME: &str = "delete";

    pub fn command() -> Command {
        Command::new(Self::NAME)
            .alias("rm")
            .about("Delete an event")
            .arg(EventArgs::id())
    }

    pub fn from(matches: &ArgMatches) -> Self {
        Self {
            id: EventArgs::get_id(matches),
        }
    }

    pub async fn run(self, calendar: &Calendar) -> Result<(), Box<dyn Error>> {
        tracing::debug!(?self, "deleting event...");
        if calendar.delete_event(&self.id).await {
            Ok(())
        } else {
            Err(format!("No event with id {}", self.id).into())
        }
    }
}

fn parse_time(s: &str) -> Result<LooseDateTime, Box<dyn Error>> {
    LooseDateTime::parse(s).ok_or_else(|| format!("Invalid date or time: {s}").into())
}
