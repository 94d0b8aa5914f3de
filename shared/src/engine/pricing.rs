//! Discount calculator.
//!
//! Pure functions turning a list price and supplier terms into a comparable
//! final price. Percentages are validated when supplier terms are edited, so
//! the calculation trusts them; it only guards against negative prices coming
//! from spreadsheet uploads, which are clamped to zero and logged.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{PriceBreakdown, SupplierOffer, SupplierTerms};
use crate::types::percent_of;

/// How discount layers combine into the final price
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingPolicy {
    /// Fold the early-payment discount into the final price instead of
    /// reporting it as an additional potential discount
    pub compound_early_payment: bool,
}

/// Final price of `list_price` under `terms`, early payment advisory only
pub fn compute_final_price(list_price: Decimal, terms: &SupplierTerms) -> PriceBreakdown {
    compute_final_price_with(list_price, terms, PricingPolicy::default())
}

/// Final price of `list_price` under `terms` and `policy`
pub fn compute_final_price_with(
    list_price: Decimal,
    terms: &SupplierTerms,
    policy: PricingPolicy,
) -> PriceBreakdown {
    let list_price = clamp_price(list_price, "list price");
    breakdown(list_price, list_price, terms, policy)
}

/// Price a stored offer, honouring a discounted price printed on the list
pub fn price_offer(offer: &SupplierOffer, terms: &SupplierTerms, policy: PricingPolicy) -> PriceBreakdown {
    let list_price = clamp_price(offer.list_price, &offer.code);
    let base_price = match offer.discounted_price {
        Some(discounted) => clamp_price(discounted, &offer.code).min(list_price),
        None => list_price,
    };
    breakdown(list_price, base_price, terms, policy)
}

fn breakdown(
    list_price: Decimal,
    base_price: Decimal,
    terms: &SupplierTerms,
    policy: PricingPolicy,
) -> PriceBreakdown {
    let commercial_discount_amount = percent_of(base_price, terms.commercial_discount_pct);
    let after_commercial = base_price - commercial_discount_amount;

    let early_payment_discount_amount =
        percent_of(after_commercial, terms.early_payment_discount_pct);
    let price_with_early_payment = after_commercial - early_payment_discount_amount;

    let final_price = if policy.compound_early_payment {
        price_with_early_payment
    } else {
        after_commercial
    };

    PriceBreakdown {
        list_price,
        base_price,
        commercial_discount_amount,
        final_price,
        savings_total: list_price - final_price,
        early_payment_discount_amount,
        price_with_early_payment,
    }
}

fn clamp_price(price: Decimal, context: &str) -> Decimal {
    if price < Decimal::ZERO {
        tracing::warn!(%price, context, "negative price clamped to zero");
        Decimal::ZERO
    } else {
        price
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn terms(commercial: &str, early: &str) -> SupplierTerms {
        SupplierTerms {
            commercial_discount_pct: dec(commercial),
            early_payment_discount_pct: dec(early),
            credit_days: 30,
        }
    }

    fn offer(list: &str, discounted: Option<&str>) -> SupplierOffer {
        SupplierOffer {
            supplier_id: Uuid::nil(),
            code: "P1".into(),
            description: "Paracetamol".into(),
            laboratory: "Genven".into(),
            list_price: dec(list),
            discounted_price: discounted.map(dec),
            available: true,
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_twenty_percent_commercial_discount() {
        let price = compute_final_price(dec("100"), &terms("20", "0"));
        assert_eq!(price.final_price, dec("80"));
        assert_eq!(price.savings_total, dec("20"));
        assert_eq!(price.commercial_discount_amount, dec("20"));
    }

    #[test]
    fn test_early_payment_is_advisory_by_default() {
        let price = compute_final_price(dec("100"), &terms("20", "5"));
        assert_eq!(price.final_price, dec("80"));
        assert_eq!(price.early_payment_discount_amount, dec("4"));
        assert_eq!(price.price_with_early_payment, dec("76"));
        assert_eq!(price.savings_total, dec("20"));
    }

    #[test]
    fn test_early_payment_compounds_when_configured() {
        let policy = PricingPolicy { compound_early_payment: true };
        let price = compute_final_price_with(dec("100"), &terms("20", "5"), policy);
        assert_eq!(price.final_price, dec("76"));
        assert_eq!(price.savings_total, dec("24"));
    }

    #[test]
    fn test_negative_list_price_is_clamped() {
        let price = compute_final_price(dec("-15"), &terms("10", "0"));
        assert_eq!(price.list_price, Decimal::ZERO);
        assert_eq!(price.final_price, Decimal::ZERO);
        assert_eq!(price.savings_total, Decimal::ZERO);
    }

    #[test]
    fn test_full_discount() {
        let price = compute_final_price(dec("42.10"), &terms("100", "0"));
        assert_eq!(price.final_price, Decimal::ZERO);
        assert_eq!(price.savings_total, dec("42.10"));
    }

    #[test]
    fn test_offer_discounted_price_is_the_base() {
        let price = price_offer(&offer("100", Some("90")), &terms("10", "0"), PricingPolicy::default());
        assert_eq!(price.base_price, dec("90"));
        assert_eq!(price.final_price, dec("81"));
        assert_eq!(price.savings_total, dec("19"));
    }

    #[test]
    fn test_offer_discounted_price_above_list_is_ignored() {
        let price = price_offer(&offer("100", Some("120")), &terms("0", "0"), PricingPolicy::default());
        assert_eq!(price.base_price, dec("100"));
        assert_eq!(price.final_price, dec("100"));
    }
}
