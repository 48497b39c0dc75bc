// SPDX-FileCopyrightText: 2024 Softbear, Inc.
// SPDX-License-Identifier: AGPL-3.0-or-later

#[cfg(test)]
mod stripe_tests {
    use crate::common::{ChargeInfoConfig, Error};
    use crate::stripe::field_projector;
    use crate::stripe::{
        select_card, Brand, CardCache, CardView, Charge, ChargeFetcher, ChargeId, CheckResult,
        CountryNames, OrderPayment, PaymentInfo, Refunded, StripeClient,
    };
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    /// Serves one charge, optionally failing some of the first fetches.
    struct MockFetcher {
        calls: AtomicUsize,
        json: &'static str,
        outcomes: Mutex<VecDeque<bool>>,
    }

    impl MockFetcher {
        fn new(json: &'static str) -> Arc<Self> {
            Self::with_outcomes(json, &[])
        }

        /// `false` entries fail the corresponding fetch; later fetches succeed.
        fn with_outcomes(json: &'static str, outcomes: &[bool]) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                json,
                outcomes: Mutex::new(outcomes.iter().copied().collect()),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ChargeFetcher for MockFetcher {
        async fn fetch(&self, charge_id: &ChargeId) -> Result<Charge, Error> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::task::yield_now().await;
            let succeed = self
                .outcomes
                .lock()
                .ok()
                .and_then(|mut outcomes| outcomes.pop_front())
                .unwrap_or(true);
            if !succeed {
                return Err(Error::String(format!("no such charge: {charge_id}")));
            }
            serde_json::from_str(self.json).map_err(|e| Error::String(format!("json: {e}")))
        }
    }

    fn order(last_trans_id: Option<&str>) -> Arc<OrderPayment> {
        Arc::new(OrderPayment {
            method: "stripe_payments".to_string(),
            last_trans_id: last_trans_id.map(str::to_string),
            source_info: None,
        })
    }

    fn countries() -> Arc<CountryNames> {
        Arc::new(CountryNames::new([
            ("US".to_string(), "United States".to_string()),
            ("fr".to_string(), "France".to_string()),
        ]))
    }

    fn payment_info(fetcher: &Arc<MockFetcher>) -> PaymentInfo {
        PaymentInfo::new(
            fetcher.clone(),
            order(Some("ch_1-capture")),
            countries(),
        )
    }

    fn charge(json: &str) -> Charge {
        serde_json::from_str(json).expect("charge json")
    }

    #[tokio::test]
    async fn direct_card_scenario() {
        let fetcher = MockFetcher::new(
            r#"{"source": {"type": "card", "brand": "visa", "last4": "4242", "address_line1_check": "pass"}}"#,
        );
        let info = payment_info(&fetcher);
        assert_eq!(info.brand().await.unwrap().as_deref(), Some("Visa"));
        assert_eq!(info.last4().await.unwrap().as_deref(), Some("4242"));
        assert_eq!(info.street_check().await.unwrap(), "pass");
        assert_eq!(info.zip_check().await.unwrap(), "unchecked");
        assert_eq!(info.cvc_check().await.unwrap(), "unchecked");
        assert_eq!(info.captured().await.unwrap(), "No");
        assert_eq!(info.source_type().await.unwrap().as_deref(), Some("Card"));
        assert!(matches!(info.card().await.unwrap(), Some(CardView::Direct(_))));
        assert_eq!(fetcher.calls(), 1);
    }

    #[tokio::test]
    async fn payment_method_scenario() {
        let fetcher = MockFetcher::new(
            r#"{
                "payment_method_details": {"card": {"checks": {"cvc_check": "fail"}}},
                "captured": 1,
                "amount_refunded": 500,
                "outcome": {"type": "authorized", "risk_level": "elevated"}
            }"#,
        );
        let info = payment_info(&fetcher);
        assert_eq!(info.cvc_check().await.unwrap(), "fail");
        assert_eq!(info.captured().await.unwrap(), "Yes");
        assert_eq!(info.refunded().await.unwrap(), Refunded::Amount(500.0));
        assert_eq!(info.refunded().await.unwrap().to_string(), "500");
        assert_eq!(info.outcome_type().await.unwrap(), "authorized");
        assert_eq!(info.risk_level().await.unwrap(), "elevated");
        assert!(matches!(info.card().await.unwrap(), Some(CardView::PaymentMethod(_))));
        assert_eq!(info.brand().await.unwrap(), None);
        assert_eq!(fetcher.calls(), 1);
    }

    #[tokio::test]
    async fn three_d_secure_scenario() {
        let fetcher = MockFetcher::new(
            r#"{"source": {"type": "three_d_secure", "three_d_secure": {"card": "card_1", "brand": "mastercard", "last4": "1111"}}}"#,
        );
        let info = payment_info(&fetcher);
        assert_eq!(
            info.source_type().await.unwrap().as_deref(),
            Some("Three D Secure")
        );
        assert_eq!(info.brand().await.unwrap().as_deref(), Some("Mastercard"));
        assert_eq!(info.last4().await.unwrap().as_deref(), Some("1111"));
        assert_eq!(info.resolver().cards().len(), 1);
    }

    #[tokio::test]
    async fn card_selection_is_logged_once() {
        let fetcher = MockFetcher::new(r#"{"source": {"object": "card", "brand": "visa"}}"#);
        let info = payment_info(&fetcher);
        assert_eq!(info.brand().await.unwrap().as_deref(), Some("Visa"));
        assert_eq!(info.last4().await.unwrap(), None);
        assert_eq!(info.cvc_check().await.unwrap(), "unchecked");
        assert!(info.card().await.unwrap().is_some());
        assert_eq!(info.log().matches("selected direct card").count(), 1, "{}", info.log());

        let fetcher = MockFetcher::new(r#"{}"#);
        let info = payment_info(&fetcher);
        assert_eq!(info.brand().await.unwrap(), None);
        assert_eq!(info.street_check().await.unwrap(), "unchecked");
        assert_eq!(info.log().matches("no card found").count(), 1, "{}", info.log());
    }

    #[tokio::test]
    async fn absent_card_defaults() {
        let fetcher = MockFetcher::new(
            r#"{"id": "ch_1", "payment_method_details": {"card": {}}, "source": {"object": "source", "type": "ach_debit"}}"#,
        );
        let info = payment_info(&fetcher);
        assert!(info.card().await.unwrap().is_none());
        assert_eq!(info.brand().await.unwrap(), None);
        assert_eq!(info.last4().await.unwrap(), None);
        assert_eq!(info.street_check().await.unwrap(), "unchecked");
        assert_eq!(info.zip_check().await.unwrap(), "unchecked");
        assert_eq!(info.cvc_check().await.unwrap(), "unchecked");
        assert_eq!(info.risk_level().await.unwrap(), "Unchecked");
        assert_eq!(info.outcome_type().await.unwrap(), "None");
        assert_eq!(info.captured().await.unwrap(), "No");
        assert_eq!(info.refunded().await.unwrap().to_string(), "No");
        assert_eq!(info.customer_id().await.unwrap(), None);
        assert_eq!(
            info.payment_id().await.unwrap().as_ref().map(|id| id.as_str()),
            Some("ch_1")
        );
        assert_eq!(info.card_country().await.unwrap(), "Unknown");
        assert_eq!(
            info.source_type().await.unwrap().as_deref(),
            Some("Ach Debit")
        );
    }

    #[test]
    fn no_card_shapes_select_nothing() {
        let cache = CardCache::default();
        for json in [
            r#"{}"#,
            r#"{"payment_method_details": {"type": "card"}}"#,
            r#"{"payment_method_details": {"card": null}, "source": null}"#,
            r#"{"source": {"object": "source", "type": "sofort", "card": {}}}"#,
            r#"{"source": {"type": "three_d_secure"}}"#,
        ] {
            let charge = charge(json);
            let card = select_card(&charge, &cache);
            assert!(card.is_none(), "{json}");
            assert_eq!(field_projector::brand(card.as_ref()), None);
            assert_eq!(field_projector::street_check(card.as_ref()), "unchecked");
        }
        assert!(cache.is_empty());
    }

    #[test]
    fn direct_card_is_passed_through() {
        let charge = charge(
            r#"{"source": {"id": "card_9", "object": "card", "brand": "Visa", "last4": "4242", "card": {"last4": "0000"}},
                "payment_method_details": {"card": {"last4": "9999"}}}"#,
        );
        let source = charge.source.as_ref().unwrap();
        match select_card(&charge, &CardCache::default()) {
            Some(CardView::Direct(card)) => assert!(std::ptr::eq(card, &source.details)),
            other => panic!("expected direct card, got {other:?}"),
        }
    }

    #[test]
    fn three_d_secure_wins_over_payment_method() {
        let charge = charge(
            r#"{"source": {"type": "three_d_secure", "three_d_secure": {"card": "card_1", "last4": "1111"}},
                "payment_method_details": {"card": {"last4": "2222"}}}"#,
        );
        let card = select_card(&charge, &CardCache::default());
        assert!(matches!(card, Some(CardView::ThreeDSecure(_))));
        assert_eq!(field_projector::last4(card.as_ref()).as_deref(), Some("1111"));
    }

    #[test]
    fn payment_method_wins_over_source_card() {
        let charge = charge(
            r#"{"source": {"object": "source", "type": "card", "card": {"last4": "3333", "country": "FR"}},
                "payment_method_details": {"card": {"last4": "2222"}}}"#,
        );
        let card = select_card(&charge, &CardCache::default());
        assert!(matches!(card, Some(CardView::PaymentMethod(_))));
        assert_eq!(field_projector::last4(card.as_ref()).as_deref(), Some("2222"));
        assert_eq!(
            field_projector::card_country(&charge, &*countries()),
            "France"
        );

        let charge = self::charge(
            r#"{"source": {"object": "source", "type": "card", "card": {"last4": "3333"}}}"#,
        );
        let card = select_card(&charge, &CardCache::default());
        assert!(matches!(card, Some(CardView::SourceEmbedded(_))));
        assert_eq!(field_projector::last4(card.as_ref()).as_deref(), Some("3333"));
    }

    #[test]
    fn card_with_only_unmodeled_fields_is_selected() {
        let charge = charge(
            r#"{"payment_method_details": {"card": {"network": "visa", "wallet": {"type": "apple_pay"}}},
                "source": {"object": "source", "type": "card", "card": {"last4": "3333"}}}"#,
        );
        let card = select_card(&charge, &CardCache::default());
        match &card {
            Some(CardView::PaymentMethod(card)) => {
                assert_eq!(card.other.get("network"), Some(&serde_json::json!("visa")));
                assert_eq!(card.other.len(), 2);
            }
            other => panic!("expected payment method card, got {other:?}"),
        }
        assert_eq!(field_projector::last4(card.as_ref()), None);
        assert_eq!(field_projector::cvc_check(card.as_ref()), "unchecked");

        // Source fields that are not card fields do not leak into its card.
        let charge = self::charge(
            r#"{"source": {"id": "card_9", "object": "card", "last4": "4242", "metadata": {}}}"#,
        );
        let source = charge.source.as_ref().unwrap();
        assert_eq!(source.details.last4.as_deref(), Some("4242"));
        assert!(source.details.other.contains_key("metadata"));
        assert!(!source.details.other.contains_key("object"));
    }

    #[test]
    fn three_d_secure_cards_are_cached() {
        let cache = CardCache::default();
        let first = charge(
            r#"{"source": {"type": "three_d_secure", "three_d_secure": {"card": "card_1", "brand": "amex"}}}"#,
        );
        let second = charge(
            r#"{"source": {"type": "three_d_secure", "three_d_secure": {"card": "card_2", "brand": "jcb"}}}"#,
        );
        let (Some(CardView::ThreeDSecure(a)), Some(CardView::ThreeDSecure(b))) =
            (select_card(&first, &cache), select_card(&first, &cache))
        else {
            panic!("expected 3-D Secure cards");
        };
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(a.brand, Some(Brand::AmericanExpress));
        assert_eq!(cache.len(), 1);

        let Some(CardView::ThreeDSecure(c)) = select_card(&second, &cache) else {
            panic!("expected 3-D Secure card");
        };
        assert!(!Arc::ptr_eq(&a, &c));
        assert_eq!(c.brand, Some(Brand::JCB));
        assert_eq!(cache.len(), 2);

        let anonymous = charge(
            r#"{"source": {"type": "three_d_secure", "three_d_secure": {"last4": "5555"}}}"#,
        );
        assert!(select_card(&anonymous, &cache).is_some());
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn checks_prefer_nested_results() {
        let charge = charge(
            r#"{"payment_method_details": {"card": {
                "checks": {"address_line1_check": "fail", "address_postal_code_check": "", "cvc_check": null},
                "address_line1_check": "pass", "address_zip_check": "unavailable", "cvc_check": "pass"}}}"#,
        );
        let card = select_card(&charge, &CardCache::default());
        assert_eq!(field_projector::street_check(card.as_ref()), "fail");
        assert_eq!(field_projector::zip_check(card.as_ref()), "unavailable");
        assert_eq!(field_projector::cvc_check(card.as_ref()), "pass");
    }

    #[test]
    fn lenient_fields() {
        for (captured, expected) in [
            ("true", "Yes"),
            ("1", "Yes"),
            ("\"1\"", "Yes"),
            ("1.0", "Yes"),
            ("false", "No"),
            ("0", "No"),
            ("2", "No"),
            ("\"true\"", "No"),
            ("null", "No"),
        ] {
            let charge = charge(&format!(r#"{{"captured": {captured}}}"#));
            assert_eq!(field_projector::captured(&charge), expected, "{captured}");
        }
        for (amount, expected) in [
            ("500", Refunded::Amount(500.0)),
            ("\"250\"", Refunded::Amount(250.0)),
            ("12.0", Refunded::Amount(12.0)),
            ("12.5", Refunded::Amount(12.5)),
            ("\" 0.75 \"", Refunded::Amount(0.75)),
            ("0", Refunded::No),
            ("-3", Refunded::No),
            ("true", Refunded::No),
            ("false", Refunded::No),
            ("\"\"", Refunded::No),
            ("null", Refunded::No),
        ] {
            let charge = charge(&format!(r#"{{"amount_refunded": {amount}}}"#));
            assert_eq!(field_projector::refunded(&charge), expected, "{amount}");
        }
        let charge = charge(r#"{"amount_refunded": 12.5, "captured": true}"#);
        assert_eq!(field_projector::refunded(&charge).to_string(), "12.5");
        assert_eq!(field_projector::captured(&charge), "Yes");
        assert!(serde_json::from_str::<Charge>(r#"{"amount_refunded": "lots"}"#).is_err());
    }

    #[test]
    fn brand_names() {
        for (code, name) in [
            ("visa", "Visa"),
            ("amex", "American Express"),
            ("American Express", "American Express"),
            ("MasterCard", "Mastercard"),
            ("diners", "Diners Club"),
            ("unionpay", "UnionPay"),
            ("unknown", "Unknown"),
            ("cartes_bancaires", "Cartes_bancaires"),
        ] {
            let brand: Brand = code.parse().unwrap();
            assert_eq!(brand.to_string(), name);
        }
        for (json, expected) in [
            (r#"{"source": {"object": "card", "brand": ""}}"#, None),
            (r#"{"source": {"object": "card", "brand": "unknown"}}"#, Some("Unknown")),
            (r#"{"source": {"object": "card", "brand": "Visa"}}"#, Some("Visa")),
        ] {
            let charge = charge(json);
            let card = select_card(&charge, &CardCache::default());
            assert!(card.is_some(), "{json}");
            assert_eq!(field_projector::brand(card.as_ref()).as_deref(), expected, "{json}");
        }

        let result: CheckResult = serde_json::from_str("\"unavailable\"").unwrap();
        assert_eq!(result, CheckResult::Unavailable);
        assert_eq!(serde_json::to_string(&Brand::MasterCard).unwrap(), "\"Mastercard\"");
    }

    #[test]
    fn card_country_fallbacks() {
        let countries = countries();
        let charge = self::charge(r#"{"source": {"object": "card", "country": "us"}}"#);
        assert_eq!(
            field_projector::card_country(&charge, &*countries),
            "United States"
        );
        let charge = self::charge(r#"{"source": {"object": "card", "country": "DE"}}"#);
        assert_eq!(field_projector::card_country(&charge, &*countries), "DE");
        let charge =
            self::charge(r#"{"payment_method_details": {"card": {"country": "US"}}}"#);
        assert_eq!(
            field_projector::card_country(&charge, &*countries),
            "Unknown"
        );
    }

    #[test]
    fn customer_id_must_be_non_empty() {
        let charge = self::charge(r#"{"customer": ""}"#);
        assert_eq!(field_projector::customer_id(&charge), None);
        let charge = self::charge(r#"{"customer": "cus_1"}"#);
        assert_eq!(
            field_projector::customer_id(&charge).as_ref().map(|id| id.as_str()),
            Some("cus_1")
        );
    }

    #[tokio::test]
    async fn resolves_once() {
        let fetcher = MockFetcher::new(r#"{"id": "ch_1", "outcome": {"risk_level": "normal"}}"#);
        let info = payment_info(&fetcher);
        for _ in 0..5 {
            assert_eq!(info.risk_level().await.unwrap(), "normal");
            assert_eq!(info.street_check().await.unwrap(), "unchecked");
        }
        assert_eq!(fetcher.calls(), 1);

        let other = ChargeId::from("ch_other");
        let charge = info.resolver().resolve(&other).await.unwrap();
        assert_eq!(charge.id.as_ref().map(|id| id.as_str()), Some("ch_1"));
        assert_eq!(fetcher.calls(), 1);
    }

    #[tokio::test]
    async fn concurrent_first_calls_share_one_fetch() {
        let fetcher = MockFetcher::new(r#"{"id": "ch_1", "captured": true}"#);
        let info = payment_info(&fetcher);
        let (a, b, c) = tokio::join!(info.captured(), info.payment_id(), info.brand());
        assert_eq!(a.unwrap(), "Yes");
        assert!(b.unwrap().is_some());
        assert_eq!(c.unwrap(), None);
        assert_eq!(fetcher.calls(), 1);
    }

    #[tokio::test]
    async fn fetch_failure_propagates() {
        let fetcher = MockFetcher::with_outcomes(r#"{"outcome": {"type": "blocked"}}"#, &[false]);
        let info = payment_info(&fetcher);
        let error = info.outcome_type().await.unwrap_err();
        assert_eq!(error.token.as_ref().map(|t| t.as_str()), Some("ch_1"));
        assert!(error.to_string().contains("no such charge: ch_1"));
        assert!(info.log().contains("retrieve charge ch_1 failed"));
        assert!(info.resolver().resolved().is_none());

        // Failures are not remembered.
        assert_eq!(info.outcome_type().await.unwrap(), "blocked");
        assert_eq!(fetcher.calls(), 2);
        assert!(info.log().contains("retrieve charge ch_1 succeeded"));
    }

    #[tokio::test]
    async fn no_refetch_after_success() {
        let fetcher =
            MockFetcher::with_outcomes(r#"{"outcome": {"type": "authorized"}}"#, &[true, false]);
        let info = payment_info(&fetcher);
        assert_eq!(info.outcome_type().await.unwrap(), "authorized");
        assert_eq!(info.captured().await.unwrap(), "No");
        assert!(info.card().await.unwrap().is_none());
        assert_eq!(fetcher.calls(), 1);
    }

    #[tokio::test]
    async fn missing_transaction_id() {
        let fetcher = MockFetcher::new(r#"{}"#);
        for last_trans_id in [None, Some(""), Some("-capture")] {
            let info = PaymentInfo::new(fetcher.clone(), order(last_trans_id), countries());
            let error = info.brand().await.unwrap_err();
            assert!(error.token.is_none());
        }
        assert_eq!(fetcher.calls(), 0);
    }

    #[test]
    fn transaction_ids_are_cleaned() {
        for (transaction_id, expected) in [
            ("ch_123", Some("ch_123")),
            ("ch_123-capture", Some("ch_123")),
            ("ch_123-refund-2", Some("ch_123")),
            (" ch_123 ", Some("ch_123")),
            ("", None),
        ] {
            assert_eq!(
                ChargeId::from_transaction_id(transaction_id)
                    .as_ref()
                    .map(|id| id.as_str()),
                expected
            );
        }
    }

    #[test]
    fn display_gate_and_source_info() {
        let fetcher = MockFetcher::new(r#"{}"#);
        let order = Arc::new(OrderPayment {
            method: "stripe_payments".to_string(),
            last_trans_id: Some("ch_1".to_string()),
            source_info: Some(r#"{"Card": "Visa", "Last 4": "4242"}"#.to_string()),
        });
        let info = PaymentInfo::new(fetcher.clone(), order.clone(), countries());
        assert!(info.should_display());
        let source_info = info.source_info().unwrap();
        assert_eq!(source_info.get("Card").and_then(|v| v.as_str()), Some("Visa"));

        let info = info.with_gateway_method("checkmo");
        assert!(!info.should_display());

        let order = Arc::new(OrderPayment {
            source_info: Some("{not json".to_string()),
            ..(*order).clone()
        });
        let info = PaymentInfo::new(fetcher.clone(), order, countries());
        assert!(info.source_info().is_none());
        assert!(info.log().contains("source_info"));
        assert_eq!(fetcher.calls(), 0);
    }

    fn test_config() -> ChargeInfoConfig {
        ChargeInfoConfig::builder()
            .debug(true)
            .toml_str(
                r#"
                    [stripe]
                    secret_key = "sk_test_placeholder"

                    [payment]
                    gateway_method = "stripe_cards"

                    [countries]
                    GB = "United Kingdom"
                "#,
            )
            .build()
            .expect("charge_info_tests.toml")
    }

    #[tokio::test]
    async fn from_config() {
        let config = test_config();
        assert!(config.debug());
        assert!(StripeClient::new(&config).is_ok());

        let fetcher = MockFetcher::new(r#"{"source": {"object": "card", "country": "GB"}}"#);
        let order = Arc::new(OrderPayment {
            method: "stripe_cards".to_string(),
            last_trans_id: Some("ch_1".to_string()),
            source_info: None,
        });
        let info = PaymentInfo::from_config(&config, fetcher, order).unwrap();
        assert!(info.should_display());
        assert_eq!(info.card_country().await.unwrap(), "United Kingdom");

        let config = ChargeInfoConfig::builder()
            .toml_str("[payment]\n")
            .build()
            .unwrap();
        assert!(StripeClient::new(&config).is_err());
        assert!(ChargeInfoConfig::builder().build().is_err());
    }

    /// Reads `stripe.toml` and a `charge` ID from `[test]`.
    #[tokio::test]
    #[ignore]
    async fn retrieve_charge_live() {
        #[derive(serde::Deserialize)]
        struct TestConfig {
            charge: String,
        }
        let config = ChargeInfoConfig::builder()
            .debug(true)
            .toml_file("stripe.toml")
            .build()
            .expect("stripe.toml");
        let TestConfig { charge } = config
            .section::<TestConfig>("test")
            .expect("toml")
            .expect("[test] charge");
        let stripe = StripeClient::new(&config).expect("[stripe] secret_key");
        match stripe.retrieve_charge(&ChargeId(charge)).await {
            Ok(charge) => {
                let cache = CardCache::default();
                let card = select_card(&charge, &cache);
                println!(
                    "{:?} {:?} {} {}",
                    field_projector::brand(card.as_ref()),
                    field_projector::last4(card.as_ref()),
                    field_projector::cvc_check(card.as_ref()),
                    field_projector::risk_level(&charge),
                );
            }
            Err(e) => panic!("Error: {e:?}"),
        }
    }
}
