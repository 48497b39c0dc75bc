// SPDX-FileCopyrightText: 2024 Softbear, Inc.
// SPDX-License-Identifier: LGPL-3.0-or-later

/// Whether a value equals its default, e.g. `false`, `None`, or a card with no fields.
/// # Example
/// `#[serde(default, skip_serializing_if = "is_default")]`
pub fn is_default<T: Default + PartialEq>(x: &T) -> bool {
    x == &T::default()
}

/// Returns the string unless it is empty.
pub fn non_empty<S: AsRef<str>>(s: Option<S>) -> Option<S> {
    s.filter(|s| !s.as_ref().is_empty())
}
