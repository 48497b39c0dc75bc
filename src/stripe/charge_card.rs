// SPDX-FileCopyrightText: 2024 Softbear, Inc.
// SPDX-License-Identifier: LGPL-3.0-or-later

use crate::serde_str;
use core::fmt::Debug;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

#[derive(Clone, Debug, Eq, PartialEq)]
/// Credit or debit card brand, e.g. `Visa`, `American Express`, etc.
///
/// Parses both Stripe brand codes (`visa`, `amex`) and display names
/// (`Visa`, `American Express`), and displays the normalized name.
pub enum Brand {
    /// AMEX card
    AmericanExpress,
    /// Diners card
    DinersClub,
    /// Discover card
    Discover,
    /// JCB
    JCB,
    /// Visa card
    Visa,
    /// Mastercard
    MasterCard,
    /// Union Pay
    UnionPay,
    /// Stripe could not determine the brand.
    Unknown,
    /// Other not yet supported brand, with its first letter capitalized.
    Other(String),
}
serde_str!(Brand);

impl FromStr for Brand {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_ascii_lowercase().as_str() {
            "amex" | "american express" | "american_express" => Self::AmericanExpress,
            "diners" | "diners club" | "diners_club" => Self::DinersClub,
            "discover" => Self::Discover,
            "jcb" => Self::JCB,
            "visa" => Self::Visa,
            "mastercard" => Self::MasterCard,
            "unionpay" => Self::UnionPay,
            "unknown" => Self::Unknown,
            _ => Self::Other(capitalize(s)),
        })
    }
}

impl Display for Brand {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::AmericanExpress => "American Express",
            Self::DinersClub => "Diners Club",
            Self::Discover => "Discover",
            Self::JCB => "JCB",
            Self::Visa => "Visa",
            Self::MasterCard => "Mastercard",
            Self::UnionPay => "UnionPay",
            Self::Unknown => "Unknown",
            Self::Other(name) => name,
        })
    }
}

/// Upper-case the first letter, leaving the rest as is.
pub(crate) fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[derive(Clone, Default, Debug, Deserialize, Serialize, Eq, PartialEq)]
/// Credit or debit card, as found in any of the charge's card-shaped objects.
///
/// Payment Methods report verification results under `checks`, whereas
/// legacy Sources and 3-D Secure wrappers carry them as flat fields.
pub struct ChargeCard {
    /// Charge card brand, e.g. `Visa`, `American Express`, etc.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<Brand>,

    /// The result of checks to validate address line1, postal code, or CVC.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checks: Option<Checks>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Two-letter ISO 3166-1 country code of the issuing bank, e.g. "US".
    pub country: Option<String>,

    /// Credit or debit card expiration month, e.g. 4.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp_month: Option<u8>,

    /// Four-digit credit or debit card expiration year, e.g. 2023.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp_year: Option<u16>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Fingerprint to check whether two CC numbers are identical without knowing the numbers.
    pub fingerprint: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Funding type may be `credit`, `debit`, `prepaid`, or `unknown`.
    pub funding: Option<Funding>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// The last four digits of the credit or debit card number, e.g. "1234".
    pub last4: Option<String>,

    /// Legacy address line 1 check.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address_line1_check: Option<CheckResult>,

    /// Legacy address ZIP check.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address_zip_check: Option<CheckResult>,

    /// Legacy CVC check.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cvc_check: Option<CheckResult>,

    /// Card fields not modeled above, e.g. `network` or `wallet`.
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

#[derive(Clone, Debug, Eq, PartialEq)]
/// If a credit or debit card check is performed, the result may be: `pass`, `fail`, `unavailable`, or `unchecked`.
pub enum CheckResult {
    /// Check passed.
    Pass,
    /// Check failed.
    Failed,
    /// Check result unavailable.
    Unavailable,
    /// Check was not performed.
    Unchecked,
    /// Result not yet supported, kept verbatim.
    Other(String),
}
serde_str!(CheckResult);

impl CheckResult {
    /// The result as reported by Stripe, e.g. `pass`.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Pass => "pass",
            Self::Failed => "fail",
            Self::Unavailable => "unavailable",
            Self::Unchecked => "unchecked",
            Self::Other(s) => s,
        }
    }
}

impl FromStr for CheckResult {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "pass" => Self::Pass,
            "fail" => Self::Failed,
            "unavailable" => Self::Unavailable,
            "unchecked" => Self::Unchecked,
            _ => Self::Other(s.to_string()),
        })
    }
}

impl AsRef<str> for CheckResult {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl Display for CheckResult {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, Eq, PartialEq)]
/// Credit or debit card validation checks.
pub struct Checks {
    /// If `address_line1` was provided, the check result may be: `pass`, `fail`, `unavailable`, or `unchecked`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address_line1_check: Option<CheckResult>,

    /// If `address_zip` was provided, the check result may be: `pass`, `fail`, `unavailable`, or `unchecked`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address_postal_code_check: Option<CheckResult>,

    /// If `CVC` was provided, the check result may be: `pass`, `fail`, `unavailable`, or `unchecked`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cvc_check: Option<CheckResult>,
}

#[derive(Clone, Debug, Deserialize, Serialize, Eq, PartialEq)]
/// Funding type, e.g. `credit`, `debit`, `prepaid`, or `unknown`.
pub enum Funding {
    #[serde(rename = "credit")]
    /// Credit card.
    Credit,
    #[serde(rename = "debit")]
    /// Debit card.
    Debit,
    #[serde(rename = "prepaid")]
    /// Prepaid card.
    Prepaid,
    #[serde(other)]
    #[serde(rename = "unknown")]
    /// Other not yet supported card type.
    Unknown,
}
