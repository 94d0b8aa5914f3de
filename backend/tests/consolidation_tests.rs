//! Tests for purchase consolidation
//! Verifies summary totals, priority ordering and order line extraction

use std::collections::HashMap;

use chrono::Utc;
use proptest::prelude::*;
use rust_decimal::Decimal;
use shared::{
    aggregate_shortfall, compare_quotes, consolidate, order_lines, ComparisonResult, PharmacyStock,
    PricingPolicy, PriorityPolicy, PriorityTier, Quote, Supplier, SupplierOffer, SupplierTerms,
};
use uuid::Uuid;

fn stock(pharmacy: u128, code: &str, quantity: i64) -> PharmacyStock {
    PharmacyStock {
        pharmacy_id: Uuid::from_u128(pharmacy),
        code: code.to_string(),
        description: None,
        laboratory: None,
        quantity_on_hand: quantity,
        unit_price: None,
        expiry_date: None,
        daily_discount: None,
        updated_at: Utc::now(),
    }
}

fn supplier() -> Supplier {
    Supplier {
        id: Uuid::from_u128(77),
        name: "Drolanca".into(),
        contact: None,
        phone: None,
        email: None,
        address: None,
        active: true,
        terms: SupplierTerms::default(),
        created_at: Utc::now(),
    }
}

/// Comparisons for every code in `prices`, all from one supplier
fn comparisons(prices: &[(&str, Decimal)]) -> HashMap<String, ComparisonResult> {
    let supplier = supplier();
    prices
        .iter()
        .map(|&(code, price)| {
            let offer = SupplierOffer {
                supplier_id: supplier.id,
                code: code.to_string(),
                description: format!("Producto {}", code),
                laboratory: "Genven".into(),
                list_price: price,
                discounted_price: None,
                available: true,
                updated_at: Utc::now(),
            };
            let quote = Quote {
                offer: &offer,
                supplier: &supplier,
            };
            (
                code.to_string(),
                compare_quotes(code, None, [quote], PricingPolicy::default()),
            )
        })
        .collect()
}

mod examples {
    use super::*;

    #[test]
    fn priority_then_units_then_code() {
        let rows = vec![
            stock(1, "C", 4),
            stock(1, "B", 1),
            stock(2, "B", 2),
            stock(1, "A", 0),
        ];
        let shortfalls = aggregate_shortfall(&rows, 5, None);
        let report = consolidate(shortfalls, &HashMap::new(), &PriorityPolicy::default());

        let order: Vec<(&str, PriorityTier)> = report
            .products
            .iter()
            .map(|p| (p.code.as_str(), p.priority))
            .collect();
        assert_eq!(
            order,
            vec![
                ("A", PriorityTier::Alta),
                ("B", PriorityTier::Media),
                ("C", PriorityTier::Baja),
            ]
        );
        assert_eq!(report.summary.by_priority.alta, 1);
        assert_eq!(report.summary.unpriced_products, 3);
    }

    #[test]
    fn unpriced_products_stay_out_of_value() {
        let rows = vec![stock(1, "A", 0), stock(1, "B", 0)];
        let shortfalls = aggregate_shortfall(&rows, 5, None);
        let prices = comparisons(&[("A", Decimal::new(250, 2))]);
        let report = consolidate(shortfalls, &prices, &PriorityPolicy::default());

        assert_eq!(report.summary.total_units_needed, 10);
        assert_eq!(report.summary.total_estimated_value, Decimal::new(1250, 2));
        assert_eq!(report.summary.unpriced_products, 1);

        let b = report.products.iter().find(|p| p.code == "B").unwrap();
        assert_eq!(b.unit_price, None);
        assert_eq!(b.total_value, None);

        let lines = order_lines(&report);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].code, "A");
        assert_eq!(lines[0].quantity, 5);
        assert_eq!(lines[0].supplier_id, Uuid::from_u128(77));
    }

    #[test]
    fn description_comes_from_catalog_when_stock_has_none() {
        let shortfalls = aggregate_shortfall(&[stock(1, "A", 0)], 5, None);
        let prices = comparisons(&[("A", Decimal::ONE)]);
        let report = consolidate(shortfalls, &prices, &PriorityPolicy::default());
        assert_eq!(report.products[0].description, "Producto A");
        assert_eq!(report.products[0].laboratory, "Genven");
    }
}

mod properties {
    use super::*;

    fn rows_strategy() -> impl Strategy<Value = Vec<PharmacyStock>> {
        prop::collection::btree_map((1u128..=5u128, 0usize..6usize), 0i64..=30i64, 0..25).prop_map(
            |entries| {
                entries
                    .into_iter()
                    .map(|((pharmacy, product), quantity)| stock(pharmacy, &format!("P{}", product), quantity))
                    .collect()
            },
        )
    }

    fn prices_strategy() -> impl Strategy<Value = Vec<Option<i64>>> {
        prop::collection::vec(prop::option::of(1i64..=10_000i64), 6)
    }

    fn report_for(
        rows: &[PharmacyStock],
        threshold: i64,
        prices: &[Option<i64>],
    ) -> shared::ConsolidationReport {
        let codes: Vec<String> = (0..prices.len()).map(|i| format!("P{}", i)).collect();
        let priced: Vec<(&str, Decimal)> = codes
            .iter()
            .zip(prices)
            .filter_map(|(code, price)| price.map(|cents| (code.as_str(), Decimal::new(cents, 2))))
            .collect();
        let shortfalls = aggregate_shortfall(rows, threshold, None);
        consolidate(shortfalls, &comparisons(&priced), &PriorityPolicy::default())
    }

    proptest! {
        #[test]
        fn prop_summary_units_equal_sum(
            rows in rows_strategy(),
            threshold in 0i64..=20i64,
            prices in prices_strategy(),
        ) {
            let report = report_for(&rows, threshold, &prices);
            let units: i64 = report.products.iter().map(|p| p.total_needed).sum();
            prop_assert_eq!(report.summary.total_units_needed, units);
            prop_assert_eq!(report.summary.total_distinct_products, report.products.len());
        }

        #[test]
        fn prop_value_is_sum_of_priced_products(
            rows in rows_strategy(),
            threshold in 0i64..=20i64,
            prices in prices_strategy(),
        ) {
            let report = report_for(&rows, threshold, &prices);
            let value: Decimal = report.products.iter().filter_map(|p| p.total_value).sum();
            prop_assert_eq!(report.summary.total_estimated_value, value);

            let unpriced = report.products.iter().filter(|p| p.unit_price.is_none()).count();
            prop_assert_eq!(report.summary.unpriced_products, unpriced);
        }

        #[test]
        fn prop_priorities_are_grouped(
            rows in rows_strategy(),
            threshold in 0i64..=20i64,
            prices in prices_strategy(),
        ) {
            let report = report_for(&rows, threshold, &prices);
            for pair in report.products.windows(2) {
                prop_assert!(pair[0].priority.rank() <= pair[1].priority.rank());
            }
            let counts = report.summary.by_priority;
            prop_assert_eq!(counts.alta + counts.media + counts.baja, report.products.len());
        }

        #[test]
        fn prop_order_lines_cover_priced_demand(
            rows in rows_strategy(),
            threshold in 0i64..=20i64,
            prices in prices_strategy(),
        ) {
            let report = report_for(&rows, threshold, &prices);
            let lines = order_lines(&report);
            let expected = report
                .products
                .iter()
                .filter(|p| p.unit_price.is_some() && p.total_needed > 0)
                .count();
            prop_assert_eq!(lines.len(), expected);
            for line in &lines {
                prop_assert!(line.quantity > 0);
            }
        }
    }
}
