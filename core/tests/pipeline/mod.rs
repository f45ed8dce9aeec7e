// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Event pipeline tests: the fallback chain, refresh, and remote write-back.

mod load;
mod push;
mod refresh;
