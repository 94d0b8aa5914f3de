//! Price comparison engine.
//!
//! Ranks every offer for a product by final price. Ties are broken by
//! supplier id so the result never depends on spreadsheet row order.

use rust_decimal::Decimal;

use crate::engine::pricing::{price_offer, PricingPolicy};
use crate::models::{ComparisonResult, Product, RankedOffer, Supplier, SupplierOffer};

/// An offer together with the supplier that publishes it
#[derive(Debug, Clone, Copy)]
pub struct Quote<'a> {
    pub offer: &'a SupplierOffer,
    pub supplier: &'a Supplier,
}

impl Quote<'_> {
    /// Only available offers from active suppliers are ranked
    pub fn is_eligible(&self) -> bool {
        self.offer.available && self.supplier.active
    }
}

/// Compare all quotes for a single product code.
///
/// `product` supplies description and laboratory when known; otherwise they
/// are taken from the cheapest offer. Ineligible quotes are skipped, and no
/// quotes yields an empty comparison.
pub fn compare_quotes<'a>(
    code: &str,
    product: Option<&Product>,
    quotes: impl IntoIterator<Item = Quote<'a>>,
    policy: PricingPolicy,
) -> ComparisonResult {
    let mut offers: Vec<(RankedOffer, &SupplierOffer)> = quotes
        .into_iter()
        .filter(|quote| quote.is_eligible())
        .map(|quote| (rank_entry(quote, policy), quote.offer))
        .collect();

    offers.sort_by(|(a, _), (b, _)| {
        a.final_price
            .cmp(&b.final_price)
            .then_with(|| a.supplier_id.cmp(&b.supplier_id))
    });

    let (description, laboratory) = match (product, offers.first()) {
        (Some(p), _) => (p.description.clone(), p.laboratory.clone()),
        (None, Some((_, offer))) => (offer.description.clone(), offer.laboratory.clone()),
        (None, None) => (String::new(), String::new()),
    };

    let mut offers: Vec<RankedOffer> = offers.into_iter().map(|(ranked, _)| ranked).collect();
    mark_best(&mut offers);

    ComparisonResult {
        code: code.to_string(),
        description,
        laboratory,
        offers,
    }
}

fn rank_entry(quote: Quote<'_>, policy: PricingPolicy) -> RankedOffer {
    let terms = &quote.supplier.terms;
    let price = price_offer(quote.offer, terms, policy);

    RankedOffer {
        supplier_id: quote.supplier.id,
        supplier_name: quote.supplier.name.clone(),
        list_price: price.list_price,
        base_price: price.base_price,
        final_price: price.final_price,
        is_best: false,
        savings: price.savings_total,
        commercial_discount_pct: terms.commercial_discount_pct,
        commercial_discount_amount: price.commercial_discount_amount,
        early_payment_discount_pct: terms.early_payment_discount_pct,
        early_payment_discount_amount: price.early_payment_discount_amount,
        price_with_early_payment: price.price_with_early_payment,
        credit_days: terms.credit_days,
        diff_from_best: Decimal::ZERO,
        pct_diff_from_best: Decimal::ZERO,
    }
}

/// Flag index 0 as best and compute every other entry's gap to it.
/// Expects `offers` already sorted.
fn mark_best(offers: &mut [RankedOffer]) {
    let Some((best, rest)) = offers.split_first_mut() else {
        return;
    };
    best.is_best = true;
    let best_price = best.final_price;

    for entry in rest {
        let diff = entry.final_price - best_price;
        entry.diff_from_best = diff;
        entry.pct_diff_from_best = pct_gap(diff, best_price);
    }
}

/// `diff` as a percentage of `best_price`; zero for a free best offer and
/// `Decimal::MAX` when the ratio does not fit
fn pct_gap(diff: Decimal, best_price: Decimal) -> Decimal {
    if best_price <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    diff.checked_div(best_price)
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
        .unwrap_or(Decimal::MAX)
}
