// SPDX-FileCopyrightText: 2024 Softbear, Inc.
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Display fields derived from a charge and its selected card.  Each field is
//! independent and falls back to its own default when data is absent.

use super::charge_card::capitalize;
use super::{
    CardView, Charge, ChargeCard, ChargeId, CheckResult, Checks, CountryNamer, CustomerId,
};
use crate::serde_utils::non_empty;
use std::fmt::{Display, Formatter};

/// Shown when a verification check was not performed or not reported.
pub const UNCHECKED: &str = "unchecked";

/// Amount refunded, or `No` if nothing was (or absent).
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Refunded {
    /// Nothing refunded.
    No,
    /// Amount refunded in the smallest currency unit.  Fractional amounts are
    /// kept, e.g. `12.5`.
    Amount(f64),
}

impl Display for Refunded {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::No => f.write_str("No"),
            Self::Amount(amount) => Display::fmt(amount, f),
        }
    }
}

/// Normalized brand name, e.g. `Visa`.  An empty brand is absent.
pub fn brand(card: Option<&CardView<'_>>) -> Option<String> {
    non_empty(card?.brand.as_ref().map(ToString::to_string))
}

/// Last four digits of the card number.
pub fn last4(card: Option<&CardView<'_>>) -> Option<String> {
    card?.last4.clone()
}

/// Address line 1 check result.
pub fn street_check(card: Option<&CardView<'_>>) -> String {
    check(card, |checks| &checks.address_line1_check, |card| &card.address_line1_check)
}

/// Postal code check result.
pub fn zip_check(card: Option<&CardView<'_>>) -> String {
    check(card, |checks| &checks.address_postal_code_check, |card| &card.address_zip_check)
}

/// CVC check result.
pub fn cvc_check(card: Option<&CardView<'_>>) -> String {
    check(card, |checks| &checks.cvc_check, |card| &card.cvc_check)
}

/// Prefer the Payment Methods `checks` result over the legacy flat one.
fn check(
    card: Option<&CardView<'_>>,
    nested: impl Fn(&Checks) -> &Option<CheckResult>,
    flat: impl Fn(&ChargeCard) -> &Option<CheckResult>,
) -> String {
    let Some(card) = card else {
        return UNCHECKED.to_string();
    };
    let card: &ChargeCard = card;
    card.checks
        .as_ref()
        .and_then(|checks| non_empty(nested(checks).as_ref()))
        .or_else(|| non_empty(flat(card).as_ref()))
        .map_or_else(|| UNCHECKED.to_string(), ToString::to_string)
}

/// Radar risk level, e.g. `normal`.
pub fn risk_level(charge: &Charge) -> String {
    charge
        .outcome
        .as_ref()
        .and_then(|outcome| outcome.risk_level.clone())
        .unwrap_or_else(|| "Unchecked".to_string())
}

/// Outcome type, e.g. `authorized`.
pub fn outcome_type(charge: &Charge) -> String {
    charge
        .outcome
        .as_ref()
        .and_then(|outcome| outcome.outcome_type.clone())
        .unwrap_or_else(|| "None".to_string())
}

/// `Yes` if the charge was captured, otherwise `No`.
pub fn captured(charge: &Charge) -> &'static str {
    if charge.captured {
        "Yes"
    } else {
        "No"
    }
}

/// Refunded amount.  Zero and absent are both `No`.
pub fn refunded(charge: &Charge) -> Refunded {
    match charge.amount_refunded {
        Some(amount) if amount > 0.0 => Refunded::Amount(amount),
        _ => Refunded::No,
    }
}

/// Customer charged, if any.
pub fn customer_id(charge: &Charge) -> Option<CustomerId> {
    non_empty(charge.customer.as_ref()).cloned()
}

/// Charge ID.
pub fn payment_id(charge: &Charge) -> Option<ChargeId> {
    charge.id.clone()
}

/// Name of the country of the source (or its embedded card), or `Unknown`.
pub fn card_country(charge: &Charge, countries: &dyn CountryNamer) -> String {
    let Some(source) = &charge.source else {
        return "Unknown".to_string();
    };
    match source
        .details
        .country
        .as_deref()
        .or_else(|| source.card.as_ref()?.country.as_deref())
    {
        Some(code) => countries.name(code),
        None => "Unknown".to_string(),
    }
}

/// Source type with underscores replaced by spaces and each word capitalized,
/// e.g. `three_d_secure` becomes `Three D Secure`.
pub fn source_type(charge: &Charge) -> Option<String> {
    let source_type = charge.source.as_ref()?.source_type.as_deref()?;
    Some(humanize(source_type))
}

fn humanize(s: &str) -> String {
    s.replace('_', " ")
        .split(' ')
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ")
}
