// SPDX-FileCopyrightText: 2024 Softbear, Inc.
// SPDX-License-Identifier: LGPL-3.0-or-later

use super::ChargeCard;
use crate::impl_wrapper_str;
use crate::serde_utils::{deserialize_amount, deserialize_boolish, is_default};
use core::fmt::Debug;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Deserialize, Serialize, Eq, PartialEq, Hash)]
/// Charge ID, e.g. "ch_3MmlLrLkdIwHu7ix0snN0B15".
pub struct ChargeId(pub String);
impl_wrapper_str!(ChargeId);

impl ChargeId {
    /// Strip the suffix (e.g. `-capture`, `-refund`) that order payments append
    /// to the transaction ID.  Returns `None` if nothing is left.
    pub fn from_transaction_id(transaction_id: &str) -> Option<Self> {
        transaction_id
            .split('-')
            .next()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(Self::from)
    }
}

#[derive(Clone, Debug, Deserialize, Serialize, Eq, PartialEq)]
/// Customer ID.
pub struct CustomerId(pub String);
impl_wrapper_str!(CustomerId);

/// A payment attempt, as returned by `GET /v1/charges/{id}`.
///
/// Every field is optional; older charges lack `payment_method_details` and
/// newer ones lack `source`.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct Charge {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Unique identifier for the charge.
    pub id: Option<ChargeId>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Amount in the smallest currency unit, e.g. cents.
    pub amount: Option<u64>,

    #[serde(
        default,
        deserialize_with = "deserialize_amount",
        skip_serializing_if = "Option::is_none"
    )]
    /// Amount refunded in the smallest currency unit, as reported.
    pub amount_refunded: Option<f64>,

    #[serde(
        default,
        deserialize_with = "deserialize_boolish",
        skip_serializing_if = "is_default"
    )]
    /// Whether the charge was captured (`true` or `1`).
    pub captured: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Three-letter ISO currency code, lowercase.
    pub currency: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Customer that was charged, if any.
    pub customer: Option<CustomerId>,

    #[serde(default, skip_serializing_if = "is_default")]
    /// Live mode vs test mode.
    pub livemode: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Fraud and authorization outcome.
    pub outcome: Option<Outcome>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Payment Methods API details.
    pub payment_method_details: Option<PaymentMethodDetails>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Sources API (or legacy card) object.
    pub source: Option<Source>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// `succeeded`, `pending`, or `failed`.
    pub status: Option<String>,
}

/// Radar risk evaluation and authorization result.
#[derive(Clone, Debug, Default, Deserialize, Serialize, Eq, PartialEq)]
pub struct Outcome {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Network status, e.g. `approved_by_network`.
    pub network_status: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Reason for a decline or block, if any.
    pub reason: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// `normal`, `elevated`, `highest`, `not_assessed` or `unknown`.
    pub risk_level: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Radar risk score from 0 to 100.
    pub risk_score: Option<u8>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Human readable description of the outcome.
    pub seller_message: Option<String>,

    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    /// `authorized`, `manual_review`, `issuer_declined`, `blocked`, or `invalid`.
    pub outcome_type: Option<String>,
}

/// Payment instrument details captured when the charge was made.
#[derive(Clone, Debug, Default, Deserialize, Serialize, Eq, PartialEq)]
pub struct PaymentMethodDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Card details, if the payment method was a card.
    pub card: Option<ChargeCard>,

    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    /// Payment method type, e.g. `card`.
    pub payment_method_type: Option<String>,
}

/// A charge's `source`: a card itself, a 3-D Secure wrapper, or a generic
/// Sources API object with an embedded `card`.
#[derive(Clone, Debug, Default, Deserialize, Serialize, Eq, PartialEq)]
pub struct Source {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Unique identifier for the source, e.g. `card_...` or `src_...`.
    pub id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Object discriminator, e.g. `card` or `source`.
    pub object: Option<String>,

    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    /// Source type, e.g. `card` or `three_d_secure`.
    pub source_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// 3-D Secure authentication wrapper.
    pub three_d_secure: Option<ThreeDSecure>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Card embedded in a Sources API object.
    pub card: Option<ChargeCard>,

    #[serde(flatten)]
    /// Card fields carried directly on the source.
    pub details: ChargeCard,
}

impl Source {
    /// Whether this source is itself a card.
    pub fn is_card(&self) -> bool {
        match self.object.as_deref() {
            Some(object) => object == "card",
            None => self.source_type.as_deref() == Some("card"),
        }
    }

    /// Whether this source wraps a card in a 3-D Secure challenge.
    pub fn is_three_d_secure(&self) -> bool {
        self.source_type.as_deref() == Some("three_d_secure")
    }
}

/// Card details nested under a 3-D Secure source.
#[derive(Clone, Debug, Default, Deserialize, Serialize, Eq, PartialEq)]
pub struct ThreeDSecure {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Identifier of the underlying card, e.g. `card_...`.
    pub card: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Whether the cardholder was authenticated.
    pub authenticated: Option<bool>,

    #[serde(flatten)]
    /// Card fields copied onto the wrapper.
    pub details: ChargeCard,
}
