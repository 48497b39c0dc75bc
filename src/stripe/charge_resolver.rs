// SPDX-FileCopyrightText: 2024 Softbear, Inc.
// SPDX-License-Identifier: AGPL-3.0-or-later

use super::{select_card, CardCache, CardView, Charge, ChargeFetcher, ChargeId};
use crate::common::Error;
use crate::log::StringLogger;
use std::fmt::{Display, Formatter};
use std::sync::{Arc, Once};
use tokio::sync::OnceCell;

/// The charge could not be obtained, so none of its fields can be shown.
#[derive(Debug)]
pub struct PaymentLookupError {
    /// The transaction token that was looked up, if one was known.
    pub token: Option<ChargeId>,
    /// The underlying failure.
    pub error: Error,
}

impl PaymentLookupError {
    /// Wrap a failure to look up `token`.
    pub fn new(token: Option<ChargeId>, error: Error) -> Self {
        Self { token, error }
    }
}

impl Display for PaymentLookupError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.token {
            Some(token) => write!(f, "payment lookup of {token} failed: {}", self.error),
            None => write!(f, "payment lookup failed: {}", self.error),
        }
    }
}

impl std::error::Error for PaymentLookupError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

/// Fetches a charge once and keeps it, along with the cards derived from it,
/// for the lifetime of the resolver.
pub struct ChargeResolver {
    cards: CardCache,
    charge: OnceCell<Charge>,
    fetcher: Arc<dyn ChargeFetcher>,
    logger: StringLogger,
    selection_logged: Once,
}

impl ChargeResolver {
    /// Create a resolver which fetches through `fetcher` and logs to `logger`.
    pub fn new(fetcher: Arc<dyn ChargeFetcher>, logger: StringLogger) -> Self {
        Self {
            cards: CardCache::default(),
            charge: OnceCell::new(),
            fetcher,
            logger,
            selection_logged: Once::new(),
        }
    }

    /// Return the charge, fetching it on first use.  Once a fetch succeeds,
    /// later calls return that charge whatever `token` they pass.  A failed
    /// fetch is not remembered, so the next call tries again.  Concurrent
    /// first calls share a single fetch.
    pub async fn resolve(&self, token: &ChargeId) -> Result<&Charge, PaymentLookupError> {
        self.charge
            .get_or_try_init(|| async {
                let result = self.fetcher.fetch(token).await;
                self.logger
                    .call(format!("retrieve charge {token}"), result)
                    .map_err(|e| PaymentLookupError::new(Some(token.clone()), e))
            })
            .await
    }

    /// The charge, if it has been fetched.
    pub fn resolved(&self) -> Option<&Charge> {
        self.charge.get()
    }

    /// Select the card of an already resolved charge.  The selection is
    /// logged the first time only.
    pub fn card<'a>(&self, charge: &'a Charge) -> Option<CardView<'a>> {
        let card = select_card(charge, &self.cards);
        self.selection_logged.call_once(|| match &card {
            Some(card) => self.logger.trace(format!("selected {}", card.kind())),
            None => self.logger.trace("no card found".to_string()),
        });
        card
    }

    /// Cards derived from 3-D Secure wrappers so far.
    pub fn cards(&self) -> &CardCache {
        &self.cards
    }

    /// The resolver's log.
    pub fn logger(&self) -> &StringLogger {
        &self.logger
    }
}
