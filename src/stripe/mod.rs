// SPDX-FileCopyrightText: 2024 Softbear, Inc.
// SPDX-License-Identifier: LGPL-3.0-or-later

/// Picks the card a charge was paid with.
mod card_selector;
/// Charge and its source objects.
mod charge;
/// Credit or debit card.
mod charge_card;
/// Fetch-once charge resolution.
mod charge_resolver;
/// Display fields derived from a charge.
pub mod field_projector;
/// Payment info facade for an order.
mod payment_info;
/// Collaborators: charge fetching, country names, order payments.
mod providers;
/// Stripe HTTP client.
mod stripe_client;
/// Tests.
mod tests;

pub use self::card_selector::{select_card, CardCache, CardView};
pub use self::charge::{
    Charge, ChargeId, CustomerId, Outcome, PaymentMethodDetails, Source, ThreeDSecure,
};
pub use self::charge_card::{Brand, ChargeCard, CheckResult, Checks, Funding};
pub use self::charge_resolver::{ChargeResolver, PaymentLookupError};
pub use self::field_projector::Refunded;
pub use self::payment_info::{PaymentInfo, DEFAULT_GATEWAY_METHOD};
pub use self::providers::{
    ChargeFetcher, CountryNamer, CountryNames, OrderPayment, OrderPaymentSource,
};
pub use self::stripe_client::StripeClient;
