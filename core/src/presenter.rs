// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::fmt::{self, Debug, Display};

use crate::gesture::SwipeDirection;
use crate::state::{CalendarState, StateKey};

/// Draws the calendar. Layout and styling live entirely behind this trait.
pub trait Renderer: Debug + Send + Sync {
    /// Draws everything from scratch.
    fn render(&self, state: &CalendarState);

    /// Reacts to a single changed field.
    fn update(&self, key: StateKey, state: &CalendarState);

    /// Plays the visual feedback of a recognized swipe.
    fn swipe_feedback(&self, _direction: SwipeDirection) {}
}

/// How prominent a user-facing message is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[expect(missing_docs)]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

impl Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::Info => "info",
            Severity::Success => "success",
            Severity::Warning => "warning",
            Severity::Error => "error",
        })
    }
}

/// Shows short messages to the user.
pub trait Notifier: Debug + Send + Sync {
    /// Shows `message`.
    fn notify(&self, message: &str, severity: Severity);
}

/// A [`Notifier`] that writes to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, message: &str, severity: Severity) {
        match severity {
            Severity::Info | Severity::Success => tracing::info!(%severity, "{message}"),
            Severity::Warning => tracing::warn!("{message}"),
            Severity::Error => tracing::error!("{message}"),
        }
    }
}
