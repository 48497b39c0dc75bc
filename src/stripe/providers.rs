// SPDX-FileCopyrightText: 2024 Softbear, Inc.
// SPDX-License-Identifier: AGPL-3.0-or-later

use super::{Charge, ChargeId};
use crate::common::{ChargeInfoConfig, Error};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Obtains a charge record, e.g. from the Stripe API.
#[async_trait]
pub trait ChargeFetcher: Send + Sync {
    /// Fetch the charge with the specified ID.
    async fn fetch(&self, charge_id: &ChargeId) -> Result<Charge, Error>;
}

/// Resolves an ISO 3166-1 country code to a display name.
pub trait CountryNamer: Send + Sync {
    /// Fails open: unknown codes yield the code itself or an empty string.
    fn name(&self, iso_code: &str) -> String;
}

/// Supplies the payment of the order being displayed.
pub trait OrderPaymentSource: Send + Sync {
    /// The current order's payment, or an error if there is no current order.
    fn current_order_payment(&self) -> Result<OrderPayment, Error>;
}

/// The stored payment of an order.
#[derive(Clone, Debug, Default, Deserialize, Serialize, Eq, PartialEq)]
pub struct OrderPayment {
    /// Payment method code, e.g. `stripe_payments`.
    pub method: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Last transaction ID, e.g. `ch_123-capture`.
    pub last_trans_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// JSON object describing the source, stored at checkout.
    pub source_info: Option<String>,
}

impl OrderPaymentSource for OrderPayment {
    fn current_order_payment(&self) -> Result<OrderPayment, Error> {
        Ok(self.clone())
    }
}

/// Country names from the `[countries]` table of the configuration, keyed by
/// upper case ISO code.
#[derive(Clone, Debug, Default)]
pub struct CountryNames {
    names: HashMap<String, String>,
}

impl CountryNames {
    /// Create from code to name pairs.
    pub fn new<I: IntoIterator<Item = (String, String)>>(names: I) -> Self {
        Self {
            names: names
                .into_iter()
                .map(|(code, name)| (code.to_ascii_uppercase(), name))
                .collect(),
        }
    }

    /// Load the `[countries]` table, if any.
    pub fn from_config(config: &ChargeInfoConfig) -> Result<Self, Error> {
        let names: Option<HashMap<String, String>> = config.section("countries")?;
        Ok(Self::new(names.unwrap_or_default()))
    }
}

impl CountryNamer for CountryNames {
    fn name(&self, iso_code: &str) -> String {
        self.names
            .get(&iso_code.to_ascii_uppercase())
            .cloned()
            .unwrap_or_else(|| iso_code.to_string())
    }
}
