// SPDX-FileCopyrightText: 2024 Softbear, Inc.
// SPDX-License-Identifier: LGPL-3.0-or-later

use super::Error;
use serde::de::DeserializeOwned;
#[allow(deprecated)]
use std::env::home_dir;
use std::fs::read_to_string;

/// Configuration parameters: Stripe credentials, the payment gateway method
/// and country names.
///
/// # Example
///
/// ```toml
/// [stripe]
/// secret_key = "sk_test_..."
///
/// [payment]
/// gateway_method = "stripe_payments"
///
/// [countries]
/// US = "United States"
/// ```
#[derive(Debug)]
pub struct ChargeInfoConfig {
    debug_enabled: bool,
    toml: String,
}

impl ChargeInfoConfig {
    /// Creates a configuration builder.
    pub fn builder() -> ChargeInfoConfigBuilder {
        ChargeInfoConfigBuilder {
            config: None,
            debug_enabled: false,
            error: None,
        }
    }

    /// Returns `true` if debug is enabled.
    pub fn debug(&self) -> bool {
        self.debug_enabled
    }

    /// Returns configuration parameters.
    pub fn get<T: DeserializeOwned>(&self) -> Result<T, Error> {
        toml::from_str(&self.toml).map_err(|e: toml::de::Error| Error::String(format!("toml: {e}")))
    }

    /// Returns the named top level table, or `None` if it is absent.
    pub fn section<T: DeserializeOwned>(&self, name: &str) -> Result<Option<T>, Error> {
        let table: toml::value::Table = self.get()?;
        table
            .get(name)
            .cloned()
            .map(|value| {
                value
                    .try_into()
                    .map_err(|e: toml::de::Error| Error::String(format!("toml [{name}]: {e}")))
            })
            .transpose()
    }
}

/// Builds a [`ChargeInfoConfig`] from a file or a string.
pub struct ChargeInfoConfigBuilder {
    config: Option<ChargeInfoConfig>,
    debug_enabled: bool,
    error: Option<Error>,
}

impl ChargeInfoConfigBuilder {
    /// Finish building, reporting the first error encountered.
    pub fn build(self) -> Result<ChargeInfoConfig, Error> {
        if let Some(error) = self.error {
            Err(error)
        } else if let Some(config) = self.config {
            Ok(config)
        } else {
            Err(Error::String("config not set".to_string()))
        }
    }

    /// Enable or disable debug output.  Call before `toml_*`.
    pub fn debug(self, debug_enabled: bool) -> Self {
        Self {
            config: self.config.map(|config| ChargeInfoConfig {
                debug_enabled,
                ..config
            }),
            debug_enabled,
            error: self.error,
        }
    }

    /// Read `file_name` from the home directory, falling back to the current directory.
    pub fn toml_file(self, file_name: &str) -> Self {
        #[allow(deprecated)]
        let home_path = home_dir()
            .and_then(|pathbuf| pathbuf.to_str().map(|path| format!("{path}/{file_name}")));
        let local_path = format!("./{file_name}");
        match home_path
            .and_then(|path| read_to_string(path).ok())
            .map_or_else(|| read_to_string(&local_path), Ok)
        {
            Ok(toml) => self.toml_string(toml),
            Err(_) => Self {
                config: None,
                debug_enabled: self.debug_enabled,
                error: Some(Error::String(format!("{local_path}: cannot read"))),
            },
        }
    }

    /// Use `toml` as the configuration text.
    pub fn toml_str(self, toml: &str) -> Self {
        self.toml_string(toml.to_string())
    }

    /// Use `toml` as the configuration text.
    pub fn toml_string(self, toml: String) -> Self {
        Self {
            config: Some(ChargeInfoConfig {
                debug_enabled: self.debug_enabled,
                toml,
            }),
            debug_enabled: self.debug_enabled,
            error: None,
        }
    }
}
