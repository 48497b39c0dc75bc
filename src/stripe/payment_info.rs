// SPDX-FileCopyrightText: 2024 Softbear, Inc.
// SPDX-License-Identifier: AGPL-3.0-or-later

use super::field_projector::{self, Refunded};
use super::{
    CardView, Charge, ChargeFetcher, ChargeId, ChargeResolver, CountryNamer, CountryNames,
    CustomerId, OrderPaymentSource, PaymentLookupError,
};
use crate::common::{ChargeInfoConfig, Error};
use crate::log::StringLogger;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::sync::Arc;

/// Payment method code of orders paid through Stripe.
pub const DEFAULT_GATEWAY_METHOD: &str = "stripe_payments";

/// Card and risk details of the current order's Stripe charge.
///
/// Nothing is fetched until a field that needs the charge is first requested;
/// the charge is then kept for the lifetime of this value.
pub struct PaymentInfo {
    countries: Arc<dyn CountryNamer>,
    gateway_method: String,
    order: Arc<dyn OrderPaymentSource>,
    resolver: ChargeResolver,
}

impl PaymentInfo {
    /// Create payment info for the order supplied by `order`.
    pub fn new(
        fetcher: Arc<dyn ChargeFetcher>,
        order: Arc<dyn OrderPaymentSource>,
        countries: Arc<dyn CountryNamer>,
    ) -> Self {
        Self {
            countries,
            gateway_method: DEFAULT_GATEWAY_METHOD.to_string(),
            order,
            resolver: ChargeResolver::new(fetcher, StringLogger::default()),
        }
    }

    /// Create payment info using the `[payment]` and `[countries]` sections
    /// and the debug flag of the configuration.
    pub fn from_config(
        config: &ChargeInfoConfig,
        fetcher: Arc<dyn ChargeFetcher>,
        order: Arc<dyn OrderPaymentSource>,
    ) -> Result<Self, Error> {
        #[derive(Deserialize)]
        struct PaymentConfig {
            gateway_method: Option<String>,
        }
        let gateway_method = config
            .section::<PaymentConfig>("payment")?
            .and_then(|payment| payment.gateway_method)
            .unwrap_or_else(|| DEFAULT_GATEWAY_METHOD.to_string());
        Ok(Self {
            countries: Arc::new(CountryNames::from_config(config)?),
            gateway_method,
            order,
            resolver: ChargeResolver::new(fetcher, StringLogger::new(config.debug())),
        })
    }

    /// Use a payment method code other than `stripe_payments`.
    pub fn with_gateway_method(self, gateway_method: impl Into<String>) -> Self {
        Self {
            gateway_method: gateway_method.into(),
            ..self
        }
    }

    /// Whether the current order was paid through this gateway, i.e. whether
    /// its charge should be displayed at all.
    pub fn should_display(&self) -> bool {
        match self.order.current_order_payment() {
            Ok(payment) => payment.method == self.gateway_method,
            Err(e) => {
                self.resolver.logger().warn(format!("current order payment failed\n  {e}"));
                false
            }
        }
    }

    /// The source details stored with the order at checkout, if any.
    pub fn source_info(&self) -> Option<Map<String, Value>> {
        let source_info = self.order.current_order_payment().ok()?.source_info?;
        match serde_json::from_str::<Value>(&source_info) {
            Ok(Value::Object(map)) => Some(map),
            Ok(_) => None,
            Err(e) => {
                self.resolver.logger().warn(format!("source_info: {e}"));
                None
            }
        }
    }

    /// The charge ID recorded on the order, without any `-capture` style suffix.
    pub fn token(&self) -> Result<ChargeId, PaymentLookupError> {
        let payment = self
            .order
            .current_order_payment()
            .map_err(|e| PaymentLookupError::new(None, e))?;
        payment
            .last_trans_id
            .as_deref()
            .and_then(ChargeId::from_transaction_id)
            .ok_or_else(|| {
                PaymentLookupError::new(
                    None,
                    Error::String("order payment has no transaction ID".to_string()),
                )
            })
    }

    /// The order's charge, fetched on first use.
    pub async fn charge(&self) -> Result<&Charge, PaymentLookupError> {
        if let Some(charge) = self.resolver.resolved() {
            return Ok(charge);
        }
        let token = self.token()?;
        self.resolver.resolve(&token).await
    }

    /// The card the charge was paid with, if it has one.
    pub async fn card(&self) -> Result<Option<CardView<'_>>, PaymentLookupError> {
        let charge = self.charge().await?;
        Ok(self.resolver.card(charge))
    }

    /// Normalized card brand, e.g. `Visa`.
    pub async fn brand(&self) -> Result<Option<String>, PaymentLookupError> {
        Ok(field_projector::brand(self.card().await?.as_ref()))
    }

    /// Last four digits of the card number.
    pub async fn last4(&self) -> Result<Option<String>, PaymentLookupError> {
        Ok(field_projector::last4(self.card().await?.as_ref()))
    }

    /// Address line 1 check, or `unchecked`.
    pub async fn street_check(&self) -> Result<String, PaymentLookupError> {
        Ok(field_projector::street_check(self.card().await?.as_ref()))
    }

    /// Postal code check, or `unchecked`.
    pub async fn zip_check(&self) -> Result<String, PaymentLookupError> {
        Ok(field_projector::zip_check(self.card().await?.as_ref()))
    }

    /// CVC check, or `unchecked`.
    pub async fn cvc_check(&self) -> Result<String, PaymentLookupError> {
        Ok(field_projector::cvc_check(self.card().await?.as_ref()))
    }

    /// Radar risk level, or `Unchecked`.
    pub async fn risk_level(&self) -> Result<String, PaymentLookupError> {
        Ok(field_projector::risk_level(self.charge().await?))
    }

    /// Outcome type, or `None`.
    pub async fn outcome_type(&self) -> Result<String, PaymentLookupError> {
        Ok(field_projector::outcome_type(self.charge().await?))
    }

    /// `Yes` or `No`.
    pub async fn captured(&self) -> Result<&'static str, PaymentLookupError> {
        Ok(field_projector::captured(self.charge().await?))
    }

    /// Amount refunded, or `No`.
    pub async fn refunded(&self) -> Result<Refunded, PaymentLookupError> {
        Ok(field_projector::refunded(self.charge().await?))
    }

    /// Customer charged, if any.
    pub async fn customer_id(&self) -> Result<Option<CustomerId>, PaymentLookupError> {
        Ok(field_projector::customer_id(self.charge().await?))
    }

    /// Charge ID.
    pub async fn payment_id(&self) -> Result<Option<ChargeId>, PaymentLookupError> {
        Ok(field_projector::payment_id(self.charge().await?))
    }

    /// Card country name, or `Unknown`.
    pub async fn card_country(&self) -> Result<String, PaymentLookupError> {
        Ok(field_projector::card_country(
            self.charge().await?,
            self.countries.as_ref(),
        ))
    }

    /// Human readable source type, e.g. `Three D Secure`.
    pub async fn source_type(&self) -> Result<Option<String>, PaymentLookupError> {
        Ok(field_projector::source_type(self.charge().await?))
    }

    /// The resolver holding the charge and its 3-D Secure card cache.
    pub fn resolver(&self) -> &ChargeResolver {
        &self.resolver
    }

    /// Everything logged so far.
    pub fn log(&self) -> String {
        self.resolver.logger().to_string()
    }
}
