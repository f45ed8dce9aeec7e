// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::error::Error;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::de;

use crate::state::{Settings, View};

/// The name of the calview application.
pub const APP_NAME: &str = "calview";

/// Configuration for the calendar core.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct Config {
    /// Base URL of the remote calendar service, e.g. `https://example.com/api`.
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Path of the event list endpoint, relative to `api_base`.
    #[serde(default = "default_events_path")]
    pub events_path: String,

    /// Path of the calendar configuration endpoint, relative to `api_base`.
    #[serde(default = "default_calendars_path")]
    pub calendars_path: String,

    /// Deadline for a single network request.
    #[serde(default = "default_fetch_timeout")]
    pub fetch_timeout: ConfigDuration,

    /// Period of the automatic background refresh.
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval: ConfigDuration,

    /// Directory for the persisted event cache and view snapshot.
    #[serde(default)]
    pub state_dir: Option<PathBuf>,

    /// View shown after startup.
    #[serde(default)]
    pub default_view: View,

    /// Initial display settings, used when no snapshot was persisted.
    #[serde(default)]
    pub settings: Settings,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            events_path: default_events_path(),
            calendars_path: default_calendars_path(),
            fetch_timeout: default_fetch_timeout(),
            refresh_interval: default_refresh_interval(),
            state_dir: None,
            default_view: View::default(),
            settings: Settings::default(),
        }
    }
}

impl Config {
    /// Normalize the configuration.
    pub fn normalize(&mut self) -> Result<(), Box<dyn Error>> {
        self.state_dir = match self.state_dir.take() {
            Some(dir) => Some(
                expand_path(&dir).map_err(|e| format!("Cannot resolve state_dir {dir:?}: {e}"))?,
            ),
            None => state_dir()
                .inspect_err(|e| tracing::warn!(err = %e, "no default state directory"))
                .ok()
                .map(|dir| dir.join(APP_NAME)),
        };

        self.api_base = self.api_base.trim_end_matches('/').to_string();
        Ok(())
    }

    /// Full URL of the event list endpoint.
    pub fn events_url(&self) -> String {
        join_url(&self.api_base, &self.events_path)
    }

    /// Full URL of the calendar configuration endpoint.
    pub fn calendars_url(&self) -> String {
        join_url(&self.api_base, &self.calendars_path)
    }
}

fn default_api_base() -> String {
    "http://localhost:3000/api".to_string()
}

fn default_events_path() -> String {
    "/events".to_string()
}

fn default_calendars_path() -> String {
    "/calendars".to_string()
}

const fn default_fetch_timeout() -> ConfigDuration {
    ConfigDuration(Duration::from_secs(10))
}

const fn default_refresh_interval() -> ConfigDuration {
    ConfigDuration(Duration::from_secs(5 * 60))
}

fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// A duration read from configuration, written as "HH:MM", "1d", "24h", "60m" or "1800s".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfigDuration(pub Duration);

impl ConfigDuration {
    /// The wrapped duration.
    pub fn get(self) -> Duration {
        self.0
    }
}

impl<'de> serde::Deserialize<'de> for ConfigDuration {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct DurationVisitor;

        impl de::Visitor<'_> for DurationVisitor {
            type Value = ConfigDuration;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter
                    .write_str(r#"a duration string like "HH:MM", "1d", "24h", "60m", or "1800s""#)
            }

            fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                parse_duration(value)
                    .map(ConfigDuration)
                    .map_err(|e| de::Error::custom(e.to_string()))
            }
        }

        deserializer.deserialize_str(DurationVisitor)
    }
}

type DirResolver = fn() -> Result<PathBuf, Box<dyn Error>>;

#[cfg(unix)]
const PATH_PREFIXES: &[(&str, DirResolver)] = &[
    ("~/", home_dir),
    ("$HOME/", home_dir),
    ("${HOME}/", home_dir),
    ("$XDG_CONFIG_HOME/", config_dir),
    ("${XDG_CONFIG_HOME}/", config_dir),
];

#[cfg(windows)]
const PATH_PREFIXES: &[(&str, DirResolver)] = &[
    (r"~\", home_dir),
    ("~/", home_dir),
    (r"%UserProfile%\", home_dir),
    ("%UserProfile%/", home_dir),
    (r"%LOCALAPPDATA%\", config_dir),
    ("%LOCALAPPDATA%/", config_dir),
];

/// Resolves a leading `~` or a home/config directory variable. Other paths are kept as is.
fn expand_path(path: &Path) -> Result<PathBuf, Box<dyn Error>> {
    if path.is_absolute() {
        return Ok(path.to_owned());
    }

    let text = path.to_str().ok_or("State directory is not valid UTF-8")?;
    match PATH_PREFIXES
        .iter()
        .find_map(|(prefix, base)| text.strip_prefix(prefix).map(|rest| (base, rest)))
    {
        Some((base, rest)) => Ok(base()?.join(rest)),
        None => Ok(path.to_owned()),
    }
}

fn home_dir() -> Result<PathBuf, Box<dyn Error>> {
    dirs::home_dir().ok_or_else(|| "No home directory for the current user".into())
}

fn config_dir() -> Result<PathBuf, Box<dyn Error>> {
    #[cfg(unix)]
    let dir = xdg::BaseDirectories::new().get_config_home();
    #[cfg(windows)]
    let dir = dirs::config_dir();
    dir.ok_or_else(|| "No config directory for the current user".into())
}

fn state_dir() -> Result<PathBuf, Box<dyn Error>> {
    #[cfg(unix)]
    let dir = xdg::BaseDirectories::new().get_state_home();
    #[cfg(windows)]
    let dir = dirs::data_dir();
    dir.ok_or_else(|| "No state directory for the current user".into())
}

/// Parse a duration string in the format "HH:MM" / "1d" / "24h" / "60m" / "1800s".
fn parse_duration(s: &str) -> Result<Duration, Box<dyn Error>> {
    const MINUTE: u64 = 60;
    const HOUR: u64 = 60 * MINUTE;
    const DAY: u64 = 24 * HOUR;

    let secs = if let Some((h, m)) = s.split_once(':') {
        let hours: u64 = h.trim().parse()?;
        let minutes: u64 = m.trim().parse()?;
        hours * HOUR + minutes * MINUTE
    } else if let Some(rest) = s.strip_suffix('d') {
        rest.trim().parse::<u64>()? * DAY
    } else if let Some(rest) = s.strip_suffix('h') {
        rest.trim().parse::<u64>()? * HOUR
    } else if let Some(rest) = s.strip_suffix('m') {
        rest.trim().parse::<u64>()? * MINUTE
    } else if let Some(rest) = s.strip_suffix('s') {
        rest.trim().parse::<u64>()?
    } else {
        return Err(format!("Invalid duration format: {s}").into());
    };
    Ok(Duration::from_secs(secs))
}
