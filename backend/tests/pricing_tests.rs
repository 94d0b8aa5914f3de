//! Tests for the discount calculator
//! Verifies final prices never exceed list prices and the early-payment layer

use proptest::prelude::*;
use rust_decimal::Decimal;
use shared::{compute_final_price, compute_final_price_with, PricingPolicy, SupplierTerms};

/// Helper to create Decimal from string
fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

fn terms(commercial: Decimal, early: Decimal) -> SupplierTerms {
    SupplierTerms {
        commercial_discount_pct: commercial,
        early_payment_discount_pct: early,
        credit_days: 30,
    }
}

// =============================================================================
// Worked examples
// =============================================================================

mod examples {
    use super::*;

    #[test]
    fn twenty_percent_off_one_hundred() {
        let price = compute_final_price(dec("100"), &terms(dec("20"), Decimal::ZERO));
        assert_eq!(price.final_price, dec("80"));
        assert_eq!(price.savings_total, dec("20"));
        assert_eq!(price.commercial_discount_amount, dec("20"));
    }

    #[test]
    fn early_payment_is_advisory_by_default() {
        let price = compute_final_price(dec("100"), &terms(dec("20"), dec("5")));
        assert_eq!(price.final_price, dec("80"));
        assert_eq!(price.early_payment_discount_amount, dec("4"));
        assert_eq!(price.price_with_early_payment, dec("76"));
    }

    #[test]
    fn early_payment_compounds_when_configured() {
        let policy = PricingPolicy {
            compound_early_payment: true,
        };
        let price = compute_final_price_with(dec("100"), &terms(dec("20"), dec("5")), policy);
        assert_eq!(price.final_price, dec("76"));
        assert_eq!(price.savings_total, dec("24"));
    }

    #[test]
    fn no_discount_keeps_list_price() {
        let price = compute_final_price(dec("12.35"), &SupplierTerms::default());
        assert_eq!(price.final_price, dec("12.35"));
        assert_eq!(price.savings_total, Decimal::ZERO);
    }

    #[test]
    fn full_discount_is_free() {
        let price = compute_final_price(dec("40"), &terms(dec("100"), Decimal::ZERO));
        assert_eq!(price.final_price, Decimal::ZERO);
    }

    #[test]
    fn negative_list_price_clamps_to_zero() {
        let price = compute_final_price(dec("-3"), &terms(dec("10"), Decimal::ZERO));
        assert_eq!(price.list_price, Decimal::ZERO);
        assert_eq!(price.final_price, Decimal::ZERO);
    }
}

// =============================================================================
// Property tests
// =============================================================================

mod properties {
    use super::*;

    /// Prices from 0.00 to 100000.00
    fn price_strategy() -> impl Strategy<Value = Decimal> {
        (0i64..=10_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
    }

    /// Percentages from 0.00 to 100.00
    fn pct_strategy() -> impl Strategy<Value = Decimal> {
        (0i64..=10_000i64).prop_map(|hundredths| Decimal::new(hundredths, 2))
    }

    proptest! {
        #[test]
        fn prop_final_price_never_exceeds_list(
            list in price_strategy(),
            commercial in pct_strategy(),
            early in pct_strategy(),
            compound in any::<bool>(),
        ) {
            let policy = PricingPolicy { compound_early_payment: compound };
            let price = compute_final_price_with(list, &terms(commercial, early), policy);
            prop_assert!(price.final_price <= list);
            prop_assert!(price.final_price >= Decimal::ZERO);
        }

        #[test]
        fn prop_savings_match_final_price(
            list in price_strategy(),
            commercial in pct_strategy(),
        ) {
            let price = compute_final_price(list, &terms(commercial, Decimal::ZERO));
            prop_assert_eq!(price.savings_total, list - price.final_price);
            prop_assert_eq!(price.final_price, list - price.commercial_discount_amount);
        }

        #[test]
        fn prop_early_payment_never_raises_price(
            list in price_strategy(),
            commercial in pct_strategy(),
            early in pct_strategy(),
        ) {
            let price = compute_final_price(list, &terms(commercial, early));
            prop_assert!(price.price_with_early_payment <= price.final_price);
        }
    }
}
