pub mod aggregate;
pub mod association;
pub mod derive;
pub mod stats;
pub mod timeseries;

use crate::config::AnalysisConfig;
use aggregate::{
    OfferPerformance, PriceDistribution, ProductPerformance, ProductQuantity, ProductTotal,
    QuantityPricePoints,
};
use derive::Sale;
use timeseries::{DailyPoint, MonthlyTotal};

/// Every aggregation of one run, computed once and then rendered.
#[derive(Debug, Clone, PartialEq)]
pub struct SalesSummary {
    pub sales_by_product: Vec<ProductTotal>,
    pub monthly_sales: Vec<MonthlyTotal>,
    pub daily_sales: Vec<DailyPoint>,
    pub moving_average: Vec<DailyPoint>,
    pub moving_average_days: u32,
    pub average_price: Vec<ProductTotal>,
    pub price_distribution: Vec<PriceDistribution>,
    pub quantity_by_product: Vec<ProductQuantity>,
    pub quantity_vs_price: Vec<QuantityPricePoints>,
    pub offer_performance: Vec<OfferPerformance>,
    pub product_performance: Vec<ProductPerformance>,
    /// Rows whose price per unit is undefined (quantity 0).
    pub undefined_price_per_unit: usize,
}

/// Run all aggregations over the derived sales. Pure: the same input always
/// yields the same summary.
pub fn summarize(sales: &[Sale], config: &AnalysisConfig) -> SalesSummary {
    let daily_sales = timeseries::daily_totals(sales);
    let moving_average = timeseries::moving_average(&daily_sales, config.moving_average_days);

    SalesSummary {
        sales_by_product: aggregate::sales_by_product(sales),
        monthly_sales: timeseries::monthly_totals(sales),
        daily_sales,
        moving_average,
        moving_average_days: config.moving_average_days,
        average_price: aggregate::average_price_by_product(sales),
        price_distribution: aggregate::price_distribution(sales),
        quantity_by_product: aggregate::quantity_by_product(sales),
        quantity_vs_price: aggregate::quantity_vs_price(sales),
        offer_performance: aggregate::offer_performance(sales),
        product_performance: aggregate::product_performance(sales),
        undefined_price_per_unit: sales.iter().filter(|s| s.price_per_unit.is_none()).count(),
    }
}
