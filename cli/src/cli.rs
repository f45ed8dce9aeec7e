// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::{error::Error, ffi::OsString, path::PathBuf, sync::Arc};

use calview_core::{
    APP_NAME, Calendar, Collaborators, Config as CoreConfig, FileStore, HttpTransport,
    KeyValueStore, MemoryStore, View,
};
use clap::{ArgMatches, Command, ValueHint, arg, builder::styling, crate_version, value_parser};
use colored::Colorize;
use tracing_subscriber::{EnvFilter, filter::LevelFilter};

use crate::cmd_browse::CmdBrowse;
use crate::cmd_event::{CmdEventDelete, CmdEventList, CmdEventNew};
use crate::config::parse_config;
use crate::render::{ConsoleNotifier, TerminalRenderer};

/// Run the calview command-line interface.
pub async fn run() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::WARN.into())
                .from_env_lossy(),
        )
        .with_writer(std::io::stderr)
        .init();

    match Cli::parse() {
        Ok(cli) => {
            if let Err(e) = cli.run().await {
                println!("{} {}", "Error:".red(), e);
            }
        }
        Err(e) => println!("{} {}", "Error:".red(), e),
    };
    Ok(())
}

/// Command-line interface
#[derive(Debug)]
pub struct Cli {
    /// Path to the configuration file
    pub config: Option<PathBuf>,

    /// The command to execute
    pub command: Commands,
}

impl Cli {
    /// Create the command-line interface
    pub fn command() -> Command {
        const STYLES: styling::Styles = styling::Styles::styled()
            .header(styling::AnsiColor::Green.on_default().bold())
            .usage(styling::AnsiColor::Green.on_default().bold())
            .literal(styling::AnsiColor::Blue.on_default().bold())
            .placeholder(styling::AnsiColor::Cyan.on_default());

        Command::new(APP_NAME)
            .about("An interactive calendar with offline fallback.")
            .author("Zexin Yuan <aim@yzx9.xyz>")
            .version(crate_version!())
            .styles(STYLES)
            .subcommand_required(false) // allow default to browse
            .arg_required_else_help(false)
            .arg(
                arg!(-c --config [CONFIG] "Path to the configuration file")
                    .long_help(
                        "\
Path to the configuration file. Defaults to $CALVIEW_CONFIG, then \
$XDG_CONFIG_HOME/calview/config.toml on Linux and MacOS, %LOCALAPPDATA%/calview/config.toml \
on Windows. Built-in defaults are used when no file is found.",
                    )
                    .value_parser(value_parser!(PathBuf))
                    .value_hint(ValueHint::FilePath),
            )
            .subcommand(CmdBrowse::command())
            .subcommand(CmdEventList::command())
            .subcommand(CmdEventNew::command())
            .subcommand(CmdEventDelete::command())
            .subcommand(Command::new(CMD_REFRESH).about("Fetch the events from the server"))
    }

    /// Parse the command-line arguments
    pub fn parse() -> Result<Self, Box<dyn Error>> {
        let commands = Self::command();
        let matches = commands.get_matches();
        Ok(Self::from(&matches))
    }

    /// Parse the specified arguments
    pub fn try_parse_from<I, T>(args: I) -> Result<Self, Box<dyn Error>>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let commands = Self::command();
        let matches = commands.try_get_matches_from(args)?;
        Ok(Self::from(&matches))
    }

    /// Create a CLI instance from the `ArgMatches`
    pub fn from(matches: &ArgMatches) -> Self {
        use Commands::*;
        let command = match matches.subcommand() {
            Some((CmdBrowse::NAME, matches)) => Browse(CmdBrowse::from(matches)),
            Some((CmdEventList::NAME, matches)) => List(CmdEventList::from(matches)),
            Some((CmdEventNew::NAME, matches)) => New(CmdEventNew::from(matches)),
            Some((CmdEventDelete::NAME, matches)) => Delete(CmdEventDelete::from(matches)),
            Some((CMD_REFRESH, _)) => Refresh,
            _ => Browse(CmdBrowse { view: None }),
        };

        let config = matches.get_one("config").cloned();
        Cli { config, command }
    }

    /// Run the command
    pub async fn run(self) -> Result<(), Box<dyn Error>> {
        self.command.run(self.config).await
    }
}

const CMD_REFRESH: &str = "refresh";

/// The commands available in the CLI
#[derive(Debug, Clone)]
pub enum Commands {
    /// Browse the calendar interactively
    Browse(CmdBrowse),

    /// Print the visible events
    List(CmdEventList),

    /// Add an event
    New(CmdEventNew),

    /// Delete an event
    Delete(CmdEventDelete),

    /// Fetch the events from the server
    Refresh,
}

impl Commands {
    /// Run the command with the given configuration
    pub async fn run(self, config: Option<PathBuf>) -> Result<(), Box<dyn Error>> {
        use Commands::*;
        tracing::debug!("parsing configuration...");
        let mut config = parse_config(config).await?;
        if let Some(view) = self.view() {
            config.default_view = view;
        }

        let calendar = open_calendar(config, matches!(self, Browse(_)))?;
        calendar.init().await;

        let result = match self {
            Browse(a) => a.run(&calendar).await,
            List(a) => a.run(&calendar).await,
            New(a) => a.run(&calendar).await,
            Delete(a) => a.run(&calendar).await,
            Refresh => {
                if let Err(err) = calendar.refresh_events().await {
                    tracing::debug!(%err, "refresh failed");
                }
                Ok(())
            }
        };

        calendar.destroy();
        result
    }

    fn view(&self) -> Option<View> {
        match self {
            Commands::Browse(a) => a.view,
            Commands::List(a) => a.view,
            _ => None,
        }
    }
}

/// Wires the core to the HTTP transport, the state directory and the terminal.
fn open_calendar(config: CoreConfig, live: bool) -> Result<Calendar, Box<dyn Error>> {
    let storage: Arc<dyn KeyValueStore> = match &config.state_dir {
        Some(dir) => Arc::new(FileStore::open(dir)?),
        None => {
            tracing::warn!("no state directory, events and view will not be persisted");
            Arc::new(MemoryStore::new())
        }
    };

    let renderer = if live {
        TerminalRenderer::live()
    } else {
        TerminalRenderer::silent()
    };

    let collaborators = Collaborators {
        transport: Arc::new(HttpTransport::new()),
        storage,
        renderer: Arc::new(renderer),
        notifier: Arc::new(ConsoleNotifier),
    };
    Ok(Calendar::new(config, collaborators))
}
