// SPDX-FileCopyrightText: 2024 Softbear, Inc.
// SPDX-License-Identifier: AGPL-3.0-or-later

use super::{Charge, ChargeFetcher, ChargeId};
use crate::common::{ChargeInfoConfig, Error};
use async_trait::async_trait;
use core::fmt::Debug;
use hyper::header::{HeaderMap, HeaderValue};
use hyper::{Method, StatusCode};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;

const STRIPE_API: &str = "https://api.stripe.com/v1";

/// Stripe HTTP Client.
pub struct StripeClient {
    client: reqwest::Client,
    debug: bool,
}

impl StripeClient {
    /// Create Stripe HTTP Client from the `[stripe]` section of the configuration.
    pub fn new(config: &ChargeInfoConfig) -> Result<Self, Error> {
        #[derive(Deserialize)]
        struct StripeConfig {
            secret_key: String,
        }
        let StripeConfig { secret_key } = config
            .section::<StripeConfig>("stripe")?
            .ok_or_else(|| Error::String("config: [stripe] missing".to_string()))?;

        let mut default_headers = HeaderMap::new();
        let mut auth_header = HeaderValue::from_str(&format!("Bearer {secret_key}"))
            .map_err(|e| Error::String(format!("stripe secret_key: {e}")))?;
        auth_header.set_sensitive(true);
        default_headers.insert(reqwest::header::AUTHORIZATION, auth_header);

        let client = Client::builder()
            .timeout(Duration::from_secs(20))
            .default_headers(default_headers)
            .build()
            .map_err(|e| Error::String(format!("stripe client: {e}")))?;
        Ok(Self {
            client,
            debug: config.debug(),
        })
    }

    /// Get the object with the specified path from Stripe.
    pub(crate) async fn get<T: Debug + DeserializeOwned>(&self, path: &str) -> Result<T, Error> {
        let request_path = format!("{STRIPE_API}/{path}");
        if self.debug {
            println!(">> GET {request_path}");
        }
        let request = self.client.request(Method::GET, request_path);
        match request.send().await {
            Ok(r) => {
                let status = r.status();
                if status.is_success() {
                    match r.json().await {
                        Ok(response) => {
                            if self.debug {
                                println!("{response:?} (code {status})");
                            }
                            Ok(response)
                        }
                        Err(e) => Err(Error::Http(status, format!("stripe JSON: {e}"))),
                    }
                } else {
                    match r.text().await {
                        Ok(body) => Err(Error::Http(status, format!("stripe GET: {body}"))),
                        Err(e) => Err(Error::Http(status, format!("stripe GET: {e}"))),
                    }
                }
            }
            Err(e) => Err(Error::Http(
                StatusCode::SERVICE_UNAVAILABLE,
                format!("stripe GET: {e}"),
            )),
        }
    }

    /// Load an existing charge.
    pub async fn retrieve_charge(&self, charge_id: &ChargeId) -> Result<Charge, Error> {
        if charge_id.is_empty() || charge_id.contains('/') {
            return Err(Error::Http(
                StatusCode::BAD_REQUEST,
                format!("invalid charge ID {charge_id:?}"),
            ));
        }
        self.get(&format!("charges/{charge_id}")).await
    }
}

#[async_trait]
impl ChargeFetcher for StripeClient {
    async fn fetch(&self, charge_id: &ChargeId) -> Result<Charge, Error> {
        self.retrieve_charge(charge_id).await
    }
}
