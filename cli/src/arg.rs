// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use calview_core::{Category, Frequency, View};
use clap::{Arg, ArgMatches, arg, value_parser};

pub fn view_arg() -> Arg {
    arg!(--view <VIEW> "View to start in").value_parser(value_parser!(View))
}

pub fn get_view(matches: &ArgMatches) -> Option<View> {
    matches.get_one("view").copied()
}

#[derive(Debug, Clone, Copy)]
pub struct EventArgs;

impl EventArgs {
    pub fn id() -> Arg {
        arg!(id: <ID> "The id of the event")
    }

    pub fn get_id(matches: &ArgMatches) -> String {
        matches.get_one::<String>("id").cloned().unwrap_or_default()
    }

    pub fn title() -> Arg {
        arg!(title: <TITLE> "Title of the event")
    }

    pub fn get_title(matches: &ArgMatches) -> String {
        matches
            .get_one::<String>("title")
            .cloned()
            .unwrap_or_default()
    }

    pub fn start() -> Arg {
        arg!(-s --start <START> "Start, as a date or a date and time; defaults to now")
    }

    pub fn get_start(matches: &ArgMatches) -> Option<String> {
        matches.get_one("start").cloned()
    }

    pub fn end() -> Arg {
        arg!(-e --end <END> "End; defaults to one hour after the start")
    }

    pub fn get_end(matches: &ArgMatches) -> Option<String> {
        matches.get_one("end").cloned()
    }

    pub fn all_day() -> Arg {
        arg!(--"all-day" "The event spans whole days")
    }

    pub fn get_all_day(matches: &ArgMatches) -> bool {
        matches.get_flag("all-day")
    }

    pub fn description() -> Arg {
        arg!(-d --description <DESCRIPTION> "Description of the event")
    }

    pub fn get_description(matches: &ArgMatches) -> Option<String> {
        matches.get_one("description").cloned()
    }

    pub fn location() -> Arg {
        arg!(-l --location <LOCATION> "Location of the event")
    }

    pub fn get_location(matches: &ArgMatches) -> Option<String> {
        matches.get_one("location").cloned()
    }

    pub fn category() -> Arg {
        arg!(--category <CATEGORY> "Category; inferred from the title when omitted")
            .value_parser(value_parser!(Category))
    }

    pub fn get_category(matches: &ArgMatches) -> Option<Category> {
        matches.get_one("category").copied()
    }

    pub fn repeat() -> Arg {
        arg!(--repeat <FREQUENCY> "Repeat the event").value_parser(value_parser!(Frequency))
    }

    pub fn get_repeat(matches: &ArgMatches) -> Option<Frequency> {
        matches.get_one("repeat").copied()
    }

    pub fn count() -> Arg {
        arg!(--count <COUNT> "Stop repeating after this many occurrences")
            .value_parser(value_parser!(u32).range(1..))
            .requires("repeat")
    }

    pub fn get_count(matches: &ArgMatches) -> Option<u32> {
        matches.get_one("count").copied()
    }
}
