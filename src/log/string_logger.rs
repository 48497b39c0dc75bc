// SPDX-FileCopyrightText: 2024 Softbear, Inc.
// SPDX-License-Identifier: AGPL-3.0-or-later

use crate::common::Error;
use std::fmt::{Display, Formatter};
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct LoggerInner {
    lines: Vec<String>,
    warn: bool,
}

/// Thread-safe string logger.  Clones share the same lines.
#[derive(Clone, Default)]
pub struct StringLogger {
    debug: bool,
    inner: Arc<Mutex<LoggerInner>>,
}

impl StringLogger {
    /// Create a new string logger which echoes lines to stdout if `debug` is set.
    pub fn new(debug: bool) -> Self {
        Self {
            debug,
            inner: Arc::new(Mutex::new(Default::default())),
        }
    }

    /// Trace the outcome of an operation and pass its result through.
    pub fn call<T>(&self, line: String, result: Result<T, Error>) -> Result<T, Error> {
        match &result {
            Ok(_) => self.trace(format!("{line} succeeded")),
            Err(e) => {
                self.warn(format!("{line} failed"));
                self.indent(e.to_string(), "  ");
            }
        }
        result
    }

    /// Whether the log contains any warnings.
    pub fn contains_warnings(&self) -> bool {
        self.inner
            .lock()
            .ok()
            .map(|inner| inner.warn)
            .unwrap_or(false)
    }

    /// Add all lines and the warning flag of `string_logger` to this logger,
    /// as one multi-line entry.
    pub fn extend(&self, string_logger: &StringLogger) {
        if Arc::ptr_eq(&self.inner, &string_logger.inner) {
            return;
        }
        let (lines, warn) = match string_logger.inner.lock() {
            Ok(from_inner) => (from_inner.lines.join("\n"), from_inner.warn),
            Err(_) => return,
        };
        self.push(lines, warn);
    }

    /// Add a trace line with every line of it prefixed by `indentation`.
    pub fn indent(&self, line: String, indentation: &str) {
        if line.is_empty() {
            return;
        }
        self.push(
            format!(
                "{indentation}{}",
                line.replace('\n', &format!("\n{indentation}"))
            ),
            false,
        );
    }

    /// Whether nothing has been logged.
    pub fn is_empty(&self) -> bool {
        self.inner
            .lock()
            .ok()
            .map(|inner| inner.lines.is_empty())
            .unwrap_or(true)
    }

    /// Add a trace line to this logger.
    pub fn trace(&self, line: String) {
        self.push(line, false);
    }

    /// Add a warning or error line to this logger.
    pub fn warn(&self, line: String) {
        self.push(line, true);
    }

    fn push(&self, line: String, warn: bool) {
        if line.is_empty() {
            return;
        }
        if self.debug {
            println!("{line}");
        }
        if let Ok(mut inner) = self.inner.lock() {
            inner.lines.push(line);
            inner.warn |= warn;
        }
    }
}

impl Display for StringLogger {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.inner.lock() {
            Ok(inner) => f.write_str(&inner.lines.join("\n")),
            Err(_) => Ok(()),
        }
    }
}
