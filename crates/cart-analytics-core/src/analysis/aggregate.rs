use super::derive::Sale;
use super::stats::{self, BoxStats};
use crate::storage::models::OfferType;
use std::collections::BTreeMap;

/// A single numeric value keyed by product.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductTotal {
    pub product: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProductQuantity {
    pub product: String,
    pub quantity: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PriceDistribution {
    pub product: String,
    pub stats: BoxStats,
}

/// (price, quantity) pairs of one product.
#[derive(Debug, Clone, PartialEq)]
pub struct QuantityPricePoints {
    pub product: String,
    pub points: Vec<(f64, i32)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OfferPerformance {
    pub offer_type: OfferType,
    pub charged_sum: f64,
    pub quantity_sum: i64,
    pub price_mean: f64,
    /// `1 - charged_sum / (price_mean * quantity_sum)`; `None` when the
    /// denominator is zero.
    pub discount_pct: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProductPerformance {
    pub product: String,
    pub charged_sum: f64,
    pub charged_mean: f64,
    pub charged_std: Option<f64>,
    pub quantity_sum: i64,
    pub quantity_mean: f64,
    pub price_mean: f64,
    pub price_min: f64,
    pub price_max: f64,
    pub price_per_unit_mean: Option<f64>,
    pub sales_per_unit: Option<f64>,
}

fn group_by_product(sales: &[Sale]) -> BTreeMap<&str, Vec<&Sale>> {
    let mut groups: BTreeMap<&str, Vec<&Sale>> = BTreeMap::new();
    for sale in sales {
        groups.entry(sale.product.as_str()).or_default().push(sale);
    }
    groups
}

fn column(group: &[&Sale], f: impl Fn(&Sale) -> f64) -> Vec<f64> {
    group.iter().map(|s| f(s)).collect()
}

fn quantity_sum(group: &[&Sale]) -> i64 {
    group.iter().map(|s| s.quantity as i64).sum()
}

fn sort_descending(totals: &mut [ProductTotal]) {
    totals.sort_by(|a, b| {
        b.value
            .total_cmp(&a.value)
            .then_with(|| a.product.cmp(&b.product))
    });
}

/// Total charged per product, highest first.
pub fn sales_by_product(sales: &[Sale]) -> Vec<ProductTotal> {
    let mut totals: Vec<ProductTotal> = group_by_product(sales)
        .into_iter()
        .map(|(product, group)| ProductTotal {
            product: product.to_string(),
            value: stats::sum(&column(&group, |s| s.charged)),
        })
        .collect();
    sort_descending(&mut totals);
    totals
}

/// Mean original price per product, cheapest first.
pub fn average_price_by_product(sales: &[Sale]) -> Vec<ProductTotal> {
    let mut averages: Vec<ProductTotal> = group_by_product(sales)
        .into_iter()
        .filter_map(|(product, group)| {
            stats::mean(&column(&group, |s| s.price)).map(|value| ProductTotal {
                product: product.to_string(),
                value,
            })
        })
        .collect();
    averages.sort_by(|a, b| {
        a.value
            .total_cmp(&b.value)
            .then_with(|| a.product.cmp(&b.product))
    });
    averages
}

/// Units sold per product, highest first.
pub fn quantity_by_product(sales: &[Sale]) -> Vec<ProductQuantity> {
    let mut quantities: Vec<ProductQuantity> = group_by_product(sales)
        .into_iter()
        .map(|(product, group)| ProductQuantity {
            product: product.to_string(),
            quantity: quantity_sum(&group),
        })
        .collect();
    quantities.sort_by(|a, b| {
        b.quantity
            .cmp(&a.quantity)
            .then_with(|| a.product.cmp(&b.product))
    });
    quantities
}

pub fn price_distribution(sales: &[Sale]) -> Vec<PriceDistribution> {
    group_by_product(sales)
        .into_iter()
        .filter_map(|(product, group)| {
            stats::box_stats(&column(&group, |s| s.price)).map(|stats| PriceDistribution {
                product: product.to_string(),
                stats,
            })
        })
        .collect()
}

pub fn quantity_vs_price(sales: &[Sale]) -> Vec<QuantityPricePoints> {
    group_by_product(sales)
        .into_iter()
        .map(|(product, group)| QuantityPricePoints {
            product: product.to_string(),
            points: group.iter().map(|s| (s.price, s.quantity)).collect(),
        })
        .collect()
}

pub fn offer_performance(sales: &[Sale]) -> Vec<OfferPerformance> {
    let mut groups: BTreeMap<OfferType, Vec<&Sale>> = BTreeMap::new();
    for sale in sales {
        groups.entry(sale.offer_type).or_default().push(sale);
    }

    groups
        .into_iter()
        .filter_map(|(offer_type, group)| {
            let charged_sum = stats::sum(&column(&group, |s| s.charged));
            let quantity_sum = quantity_sum(&group);
            let price_mean = stats::mean(&column(&group, |s| s.price))?;
            let discount_pct = stats::ratio(charged_sum, price_mean * quantity_sum as f64)
                .map(|paid_share| 1.0 - paid_share);
            Some(OfferPerformance {
                offer_type,
                charged_sum,
                quantity_sum,
                price_mean,
                discount_pct,
            })
        })
        .collect()
}

/// Composite per-product table, ordered by product name.
pub fn product_performance(sales: &[Sale]) -> Vec<ProductPerformance> {
    group_by_product(sales)
        .into_iter()
        .filter_map(|(product, group)| {
            let charged = column(&group, |s| s.charged);
            let quantities = column(&group, |s| s.quantity as f64);
            let prices = column(&group, |s| s.price);
            let per_unit: Vec<f64> = group.iter().filter_map(|s| s.price_per_unit).collect();

            let charged_sum = stats::sum(&charged);
            let quantity_sum = quantity_sum(&group);

            Some(ProductPerformance {
                product: product.to_string(),
                charged_sum,
                charged_mean: stats::mean(&charged)?,
                charged_std: stats::sample_std(&charged),
                quantity_sum,
                quantity_mean: stats::mean(&quantities)?,
                price_mean: stats::mean(&prices)?,
                price_min: stats::min(&prices)?,
                price_max: stats::max(&prices)?,
                price_per_unit_mean: stats::mean(&per_unit),
                sales_per_unit: stats::ratio(charged_sum, quantity_sum as f64),
            })
        })
        .collect()
}
