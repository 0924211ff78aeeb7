use cart_analytics_core::analysis::derive::{derive_sales, Sale};
use cart_analytics_core::analysis::{aggregate, summarize};
use cart_analytics_core::config::AnalysisConfig;
use cart_analytics_core::storage::models::{CartStatus, OfferType, SaleRecord};
use chrono::{Duration, NaiveDate};
use proptest::collection::vec as prop_vec;
use proptest::prelude::*;

const PRODUCTS: [&str; 4] = ["lime", "melon", "apple", "banana"];

fn record(
    cart_id: i32,
    name: &str,
    price: f64,
    charged: f64,
    quantity: i32,
    day: i64,
) -> SaleRecord {
    let created_at = NaiveDate::from_ymd_opt(2025, 1, 1)
        .unwrap()
        .and_hms_opt(12, 0, 0)
        .unwrap()
        + Duration::days(day);
    SaleRecord {
        cart_id,
        name: name.to_string(),
        price,
        charged,
        quantity,
        offer_type: OfferType::ALL[(cart_id as usize) % OfferType::ALL.len()],
        created_at,
        status: CartStatus::Closed,
    }
}

fn arb_record() -> impl Strategy<Value = SaleRecord> {
    (1..20i32, 0..PRODUCTS.len(), 0u32..10_000, 0u32..50_000, 0..20i32, 0..120i64).prop_map(
        |(cart, product, price_cents, charged_cents, quantity, day)| {
            record(
                cart,
                PRODUCTS[product],
                f64::from(price_cents) / 100.0,
                f64::from(charged_cents) / 100.0,
                quantity,
                day,
            )
        },
    )
}

fn sales(records: &[SaleRecord]) -> Vec<Sale> {
    derive_sales(records)
}

#[test]
fn test_apple_scenario_through_summary() {
    let records = vec![
        record(1, "apple", 6.0, 10.0, 2, 0),
        record(2, "apple", 12.0, 20.0, 2, 3),
    ];
    let sales = sales(&records);
    assert_eq!(sales[0].price_per_unit, Some(5.0));
    assert_eq!(sales[1].price_per_unit, Some(10.0));

    let summary = summarize(&sales, &AnalysisConfig::default());
    let apple = &summary.product_performance[0];
    assert_eq!(apple.charged_sum, 30.0);
    assert_eq!(apple.quantity_mean, 2.0);
    assert_eq!(summary.sales_by_product[0].value, 30.0);
    assert_eq!(summary.undefined_price_per_unit, 0);
}

#[test]
fn test_zero_quantity_row_is_kept() {
    let records = vec![
        record(1, "melon", 5.0, 0.0, 0, 0),
        record(1, "lime", 2.0, 4.0, 2, 0),
    ];
    let summary = summarize(&sales(&records), &AnalysisConfig::default());

    assert_eq!(summary.undefined_price_per_unit, 1);
    assert_eq!(summary.sales_by_product.len(), 2);
    let melon = summary
        .product_performance
        .iter()
        .find(|p| p.product == "melon")
        .unwrap();
    assert_eq!(melon.price_per_unit_mean, None);
    assert_eq!(melon.sales_per_unit, None);
    assert_eq!(melon.price_mean, 5.0);
}

#[test]
fn test_offer_group_with_zero_denominator_is_undefined() {
    let mut zero_price = record(1, "lime", 0.0, 0.0, 4, 0);
    zero_price.offer_type = OfferType::Bogo;
    let summary = summarize(&sales(&[zero_price]), &AnalysisConfig::default());
    assert_eq!(summary.offer_performance.len(), 1);
    assert_eq!(summary.offer_performance[0].discount_pct, None);
}

#[test]
fn test_monthly_and_moving_average_window() {
    let records = vec![
        record(1, "lime", 1.0, 7.0, 1, 0),
        record(2, "lime", 1.0, 14.0, 1, 2),
        record(3, "lime", 1.0, 21.0, 1, 70),
    ];
    let config = AnalysisConfig {
        moving_average_days: 3,
        ..AnalysisConfig::default()
    };
    let summary = summarize(&sales(&records), &config);

    // January through March, February empty
    assert_eq!(summary.monthly_sales.len(), 3);
    assert_eq!(summary.monthly_sales[1].total, 0.0);
    assert_eq!(summary.moving_average_days, 3);
    assert_eq!(summary.moving_average[1].value, 10.5);
    // the third sale is far outside the window
    assert_eq!(summary.moving_average[2].value, 21.0);
}

#[test]
fn test_empty_input() {
    let summary = summarize(&[], &AnalysisConfig::default());
    assert!(summary.sales_by_product.is_empty());
    assert!(summary.monthly_sales.is_empty());
    assert!(summary.moving_average.is_empty());
    assert!(summary.product_performance.is_empty());
    assert!(summary.offer_performance.is_empty());
}

proptest! {
    #[test]
    fn prop_sales_by_product_conserves_total(records in prop_vec(arb_record(), 1..60)) {
        let sales = sales(&records);
        let by_product: f64 = aggregate::sales_by_product(&sales).iter().map(|t| t.value).sum();
        let total: f64 = records.iter().map(|r| r.charged).sum();
        prop_assert!((by_product - total).abs() < 1e-6);
    }

    #[test]
    fn prop_sort_orders(records in prop_vec(arb_record(), 0..60)) {
        let sales = sales(&records);
        let totals = aggregate::sales_by_product(&sales);
        prop_assert!(totals.windows(2).all(|w| w[0].value >= w[1].value));
        let averages = aggregate::average_price_by_product(&sales);
        prop_assert!(averages.windows(2).all(|w| w[0].value <= w[1].value));
        let quantities = aggregate::quantity_by_product(&sales);
        prop_assert!(quantities.windows(2).all(|w| w[0].quantity >= w[1].quantity));
    }

    #[test]
    fn prop_summary_is_idempotent(records in prop_vec(arb_record(), 0..40)) {
        let sales = sales(&records);
        let config = AnalysisConfig::default();
        prop_assert_eq!(summarize(&sales, &config), summarize(&sales, &config));
    }

    #[test]
    fn prop_summary_ignores_row_order(records in prop_vec(arb_record(), 0..40)) {
        let forward = summarize(&sales(&records), &AnalysisConfig::default());
        let mut reversed_records = records.clone();
        reversed_records.reverse();
        let reversed = summarize(&sales(&reversed_records), &AnalysisConfig::default());
        prop_assert_eq!(forward.sales_by_product.len(), reversed.sales_by_product.len());
        prop_assert_eq!(
            forward.quantity_by_product,
            reversed.quantity_by_product
        );
        for (a, b) in forward.sales_by_product.iter().zip(reversed.sales_by_product.iter()) {
            prop_assert!((a.value - b.value).abs() < 1e-6);
        }
    }
}
