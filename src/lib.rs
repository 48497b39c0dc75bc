// SPDX-FileCopyrightText: 2024 Softbear, Inc.
// SPDX-License-Identifier: LGPL-3.0-or-later

#![warn(missing_docs)]
//! This crate resolves the card details, verification checks and risk outcome
//! of a Stripe charge, whichever API generation produced it, into a fixed set
//! of display fields.

/// Types common to multiple modules.
pub mod common;
pub use common::*;

#[cfg(feature = "log")]
/// Thread-safe logging.
pub mod log;
#[cfg(feature = "log")]
pub use log::*;

/// Macros and visitors used with `serde` serialization and deserialization.
pub mod serde_utils;
pub use serde_utils::*;

#[cfg(feature = "stripe")]
/// Stripe charge resolution and payment info fields.
pub mod stripe;
#[cfg(feature = "stripe")]
pub use stripe::*;
