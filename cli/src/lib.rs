// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Terminal front-end of the calview calendar core.

mod arg;
mod cli;
mod cmd_browse;
mod cmd_event;
mod config;
mod render;

pub use crate::cli::{Cli, Commands, run};
