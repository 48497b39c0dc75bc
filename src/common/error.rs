// SPDX-FileCopyrightText: 2024 Softbear, Inc.
// SPDX-License-Identifier: AGPL-3.0-or-later

use std::fmt::{Display, Formatter};

#[derive(Debug)]
/// An enum that encapsulates a variety of error types.
///
/// # Example
///
/// Error::Http(StatusCode::NOT_FOUND, format!("{path}: not found"))
pub enum Error {
    /// HTTP (or miscellaneous) error
    #[cfg(feature = "hyper")]
    Http(hyper::StatusCode, String),
    /// String error.
    String(String),
}

impl Error {
    /// HTTP status of the failure, if it came from an HTTP exchange.
    #[cfg(feature = "hyper")]
    pub fn status(&self) -> Option<hyper::StatusCode> {
        match self {
            Error::Http(status_code, _) => Some(*status_code),
            Error::String(_) => None,
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), std::fmt::Error> {
        match self {
            #[cfg(feature = "hyper")]
            Error::Http(status_code, mesg) => Display::fmt(&format!("{status_code}: {mesg}"), f),
            Error::String(s) => Display::fmt(&s, f),
        }
    }
}

impl std::error::Error for Error {}
