// SPDX-FileCopyrightText: 2024 Softbear, Inc.
// SPDX-License-Identifier: LGPL-3.0-or-later

#[cfg(feature = "toml")]
mod config;
/// An enum that encapsulates a variety of error types.
mod error;

#[cfg(feature = "toml")]
pub use self::config::{ChargeInfoConfig, ChargeInfoConfigBuilder};
pub use self::error::Error;
