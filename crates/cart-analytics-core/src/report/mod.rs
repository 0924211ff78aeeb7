pub mod charts;
pub mod console;
pub mod rules_csv;
pub mod spreadsheet;

use crate::analysis::SalesSummary;
use crate::error::Error;
use crate::progress::ProgressReporter;
use charts::ChartRenderer;
use std::path::{Path, PathBuf};

pub const SALES_BY_PRODUCT_PNG: &str = "sales_by_product.png";
pub const MONTHLY_SALES_TREND_PNG: &str = "monthly_sales_trend.png";
pub const WEEKLY_MOVING_AVG_PNG: &str = "weekly_moving_avg.png";
pub const AVG_PRICE_BY_PRODUCT_PNG: &str = "avg_price_by_product.png";
pub const PRICE_DISTRIBUTION_PNG: &str = "price_distribution.png";
pub const QUANTITY_BY_PRODUCT_PNG: &str = "quantity_by_product.png";
pub const QUANTITY_VS_PRICE_PNG: &str = "quantity_vs_price.png";
pub const PRODUCT_PERFORMANCE_XLSX: &str = "product_performance.xlsx";
pub const ASSOCIATION_RULES_CSV: &str = "product_association_rules.csv";

/// Chart file name and SVG document pairs, in manifest order.
pub fn chart_documents(summary: &SalesSummary) -> Vec<(&'static str, String)> {
    let sales: Vec<(String, f64)> = summary
        .sales_by_product
        .iter()
        .map(|r| (r.product.clone(), r.value))
        .collect();
    let monthly: Vec<(String, f64)> = summary
        .monthly_sales
        .iter()
        .map(|m| (m.month.format("%Y-%m").to_string(), m.total))
        .collect();
    let avg_price: Vec<(String, f64)> = summary
        .average_price
        .iter()
        .map(|r| (r.product.clone(), r.value))
        .collect();
    let quantities: Vec<(String, f64)> = summary
        .quantity_by_product
        .iter()
        .map(|r| (r.product.clone(), r.quantity as f64))
        .collect();

    vec![
        (
            SALES_BY_PRODUCT_PNG,
            charts::bar_chart("Total Sales by Product", "Product", "Total Sales", &sales),
        ),
        (
            MONTHLY_SALES_TREND_PNG,
            charts::line_chart("Monthly Sales Trend", "Month", "Total Sales", &monthly),
        ),
        (
            WEEKLY_MOVING_AVG_PNG,
            charts::moving_average_chart(
                &format!("{}-Day Moving Average of Sales", summary.moving_average_days),
                "Sales",
                &summary.daily_sales,
                &summary.moving_average,
                summary.moving_average_days,
            ),
        ),
        (
            AVG_PRICE_BY_PRODUCT_PNG,
            charts::horizontal_bar_chart(
                "Average Original Price by Product",
                "Average Price",
                "Product",
                &avg_price,
            ),
        ),
        (
            PRICE_DISTRIBUTION_PNG,
            charts::box_plot(
                "Price Distribution by Product",
                "Product",
                "Price",
                &summary.price_distribution,
            ),
        ),
        (
            QUANTITY_BY_PRODUCT_PNG,
            charts::pie_chart("Quantity Sold by Product", &quantities),
        ),
        (
            QUANTITY_VS_PRICE_PNG,
            charts::scatter_chart(
                "Quantity Sold vs. Original Price",
                "Price",
                "Quantity",
                &summary.quantity_vs_price,
            ),
        ),
    ]
}

/// Render every chart and the performance spreadsheet into `dir`, which is
/// created when missing. Returns the written paths in manifest order.
pub fn write_artifacts(
    summary: &SalesSummary,
    dir: &Path,
    reporter: &dyn ProgressReporter,
) -> Result<Vec<PathBuf>, Error> {
    std::fs::create_dir_all(dir)?;

    let renderer = ChartRenderer::new();
    let mut written = Vec::new();

    for (file_name, svg) in chart_documents(summary) {
        let path = dir.join(file_name);
        renderer.render_png(&svg, &path)?;
        reporter.on_artifact_written(file_name);
        written.push(path);
    }

    let path = dir.join(PRODUCT_PERFORMANCE_XLSX);
    spreadsheet::write_product_performance(&summary.product_performance, &path)?;
    reporter.on_artifact_written(PRODUCT_PERFORMANCE_XLSX);
    written.push(path);

    Ok(written)
}
