// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::error::Error;
use std::time::Duration;

use calview_core::{Calendar, Key, View};
use clap::{ArgMatches, Command};
use colored::Colorize;
use jiff::civil::Date;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::arg::{get_view, view_arg};

const HELP: &str = "\
keys: h/l prev/next  k/j next/prev view  t today  m/w/a month/week/agenda  r refresh  q quit
      v <view> switch view  g <yyyy-mm-dd> select day  ? help";

/// Poll interval while waiting for a navigation to settle.
const SETTLE_POLL: Duration = Duration::from_millis(50);

#[derive(Debug, Clone)]
pub struct CmdBrowse {
    pub view: Option<View>,
}

impl CmdBrowse {
    pub const NAME: &str = "browse";

    pub fn command() -> Command {
        Command::new(Self::NAME)
            .about("Browse the calendar interactively, one command line at a time")
            .arg(view_arg())
    }

    pub fn from(matches: &ArgMatches) -> Self {
        Self {
            view: get_view(matches),
        }
    }

    pub async fn run(self, calendar: &Calendar) -> Result<(), Box<dyn Error>> {
        tracing::debug!(?self, "browsing calendar...");
        println!("{}", HELP.dimmed());

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Some(line) = lines.next_line().await? {
            let actions = match parse_line(&line) {
                Ok(actions) => actions,
                Err(err) => {
                    println!("{} {}", "Error:".red(), err);
                    continue;
                }
            };

            for action in actions {
                if !Self::apply(calendar, action).await {
                    return Ok(());
                }
            }
        }
        Ok(())
    }

    /// Carries out one action. Returns `false` to quit.
    async fn apply(calendar: &Calendar, action: Action) -> bool {
        match action {
            Action::Key(key) => {
                // queued keys wait for the previous navigation instead of being dropped
                while calendar.state().navigating {
                    tokio::time::sleep(SETTLE_POLL).await;
                }
                calendar.handle_key(key);
            }
            Action::Refresh => {
                if let Err(err) = calendar.refresh_events().await {
                    tracing::debug!(%err, "manual refresh failed");
                }
            }
            Action::View(name) => {
                if !calendar.switch_view_by_name(&name) {
                    println!("{} unknown view '{}'", "Error:".red(), name);
                }
            }
            Action::Select(date) => calendar.select_date(date),
            Action::Help => println!("{}", HELP.dimmed()),
            Action::Quit => return false,
        }
        true
    }
}

/// Something typed at the browse prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Action {
    Key(Key),
    Refresh,
    View(String),
    Select(Date),
    Help,
    Quit,
}

/// Parses one input line: either a worded command or a run of single-key commands.
fn parse_line(line: &str) -> Result<Vec<Action>, String> {
    let line = line.trim();
    if let Some((cmd, arg)) = line.split_once(char::is_whitespace) {
        let arg = arg.trim();
        match cmd {
            "v" | "view" => return Ok(vec![Action::View(arg.to_string())]),
            "g" | "goto" => {
                let date = arg
                    .parse::<Date>()
                    .map_err(|e| format!("invalid date '{arg}': {e}"))?;
                return Ok(vec![Action::Select(date)]);
            }
            _ => {}
        }
    }

    match line {
        "?" | "help" => return Ok(vec![Action::Help]),
        "quit" | "exit" => return Ok(vec![Action::Quit]),
        _ => {}
    }

    line.chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| match c {
            'h' => Ok(Action::Key(Key::ArrowLeft)),
            'l' => Ok(Action::Key(Key::ArrowRight)),
            'k' => Ok(Action::Key(Key::ArrowUp)),
            'j' => Ok(Action::Key(Key::ArrowDown)),
            't' | 'm' | 'w' | 'a' | 'T' | 'M' | 'W' | 'A' => Ok(Action::Key(Key::Char(c))),
            'r' => Ok(Action::Refresh),
            'q' => Ok(Action::Quit),
            _ => Err(format!("unknown key '{c}', type ? for help")),
        })
        .collect()
}
