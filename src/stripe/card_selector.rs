// SPDX-FileCopyrightText: 2024 Softbear, Inc.
// SPDX-License-Identifier: AGPL-3.0-or-later

use super::{Charge, ChargeCard, ThreeDSecure};
use crate::serde_utils::is_default;
use std::collections::HashMap;
use std::ops::Deref;
use std::sync::{Arc, Mutex};

/// The card a charge was paid with, tagged by where it was found.
#[derive(Clone, Debug)]
pub enum CardView<'a> {
    /// The charge's `source` is itself a card.
    Direct(&'a ChargeCard),
    /// Card details derived from a 3-D Secure wrapper, shared through the [`CardCache`].
    ThreeDSecure(Arc<ChargeCard>),
    /// `payment_method_details.card` (Payment Methods API).
    PaymentMethod(&'a ChargeCard),
    /// `source.card` (Sources API).
    SourceEmbedded(&'a ChargeCard),
}

impl CardView<'_> {
    /// Short name of the variant, for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Direct(_) => "direct card",
            Self::ThreeDSecure(_) => "3-D Secure card",
            Self::PaymentMethod(_) => "payment method card",
            Self::SourceEmbedded(_) => "source card",
        }
    }
}

impl Deref for CardView<'_> {
    type Target = ChargeCard;

    fn deref(&self) -> &Self::Target {
        match self {
            Self::Direct(card) | Self::PaymentMethod(card) | Self::SourceEmbedded(card) => *card,
            Self::ThreeDSecure(card) => card.as_ref(),
        }
    }
}

/// Cards derived from 3-D Secure wrappers, keyed by the underlying card ID.
/// Entries live as long as the cache.
#[derive(Debug, Default)]
pub struct CardCache {
    cards: Mutex<HashMap<String, Arc<ChargeCard>>>,
}

impl CardCache {
    /// Return the cached card for `card_id`, deriving and storing it on first use.
    pub fn get_or_derive(&self, card_id: &str, three_d_secure: &ThreeDSecure) -> Arc<ChargeCard> {
        match self.cards.lock() {
            Ok(mut cards) => Arc::clone(
                cards
                    .entry(card_id.to_string())
                    .or_insert_with(|| derive_card(three_d_secure)),
            ),
            Err(_) => derive_card(three_d_secure),
        }
    }

    /// Number of cached cards.
    pub fn len(&self) -> usize {
        self.cards.lock().map(|cards| cards.len()).unwrap_or(0)
    }

    /// Whether no card has been cached.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn derive_card(three_d_secure: &ThreeDSecure) -> Arc<ChargeCard> {
    Arc::new(three_d_secure.details.clone())
}

/// Pick the charge's card.  The first match wins:
///
/// 1. `source` is a card.
/// 2. `source` is a 3-D Secure wrapper.
/// 3. `payment_method_details.card` is non-empty, i.e. has any field at all.
/// 4. `source.card` is non-empty.
pub fn select_card<'a>(charge: &'a Charge, cache: &CardCache) -> Option<CardView<'a>> {
    if let Some(source) = &charge.source {
        if source.is_card() {
            return Some(CardView::Direct(&source.details));
        }
        if source.is_three_d_secure() {
            if let Some(three_d_secure) = &source.three_d_secure {
                let card = match three_d_secure.card.as_deref() {
                    Some(card_id) => cache.get_or_derive(card_id, three_d_secure),
                    // Nothing stable to key on.
                    None => derive_card(three_d_secure),
                };
                return Some(CardView::ThreeDSecure(card));
            }
        }
    }

    if let Some(card) = charge
        .payment_method_details
        .as_ref()
        .and_then(|details| details.card.as_ref())
        .filter(|card| !is_default(*card))
    {
        return Some(CardView::PaymentMethod(card));
    }

    charge
        .source
        .as_ref()
        .and_then(|source| source.card.as_ref())
        .filter(|card| !is_default(*card))
        .map(CardView::SourceEmbedded)
}
