//! Text summaries of every aggregation, in a fixed order, followed by the
//! artifact manifest.

use crate::analysis::association::AssociationRule;
use crate::analysis::SalesSummary;
use crate::engine::AssociationOutcome;
use crate::report::rules_csv::format_items;
use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Cell, CellAlignment, Table};
use std::path::PathBuf;

/// Rows of the moving-average tail shown on the console.
const MOVING_AVERAGE_TAIL: usize = 10;

pub const MANIFEST_HEADER: &str = "Analysis complete. Results saved to:";

/// Undefined values print as `NaN`.
pub fn format_value(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.2}", v),
        None => "NaN".to_string(),
    }
}

fn table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(headers.to_vec());
    for index in 1..headers.len() {
        if let Some(column) = table.column_mut(index) {
            column.set_cell_alignment(CellAlignment::Right);
        }
    }
    table
}

fn section(out: &mut String, title: &str, table: &Table) {
    out.push('\n');
    out.push_str(title);
    out.push('\n');
    out.push_str(&table.to_string());
    out.push('\n');
}

fn rules_table(rules: &[AssociationRule], limit: usize) -> Table {
    let mut t = table(&[
        "antecedents",
        "consequents",
        "support",
        "confidence",
        "lift",
        "leverage",
        "conviction",
    ]);
    for rule in rules.iter().take(limit) {
        t.add_row(vec![
            Cell::new(format_items(&rule.antecedents)),
            Cell::new(format_items(&rule.consequents)),
            Cell::new(format!("{:.4}", rule.support)),
            Cell::new(format!("{:.4}", rule.confidence)),
            Cell::new(format!("{:.4}", rule.lift)),
            Cell::new(format!("{:.4}", rule.leverage)),
            Cell::new(format!("{:.4}", rule.conviction)),
        ]);
    }
    t
}

/// Everything printed at the end of an analysis run.
pub fn render_console(
    summary: &SalesSummary,
    association: &AssociationOutcome,
    top_rules: usize,
    artifacts: &[PathBuf],
) -> String {
    let mut out = String::new();

    let mut t = table(&["product", "charged"]);
    for row in &summary.sales_by_product {
        t.add_row(vec![row.product.clone(), format!("{:.2}", row.value)]);
    }
    section(&mut out, "Total Sales by Product:", &t);

    let mut t = table(&["month", "charged"]);
    for row in &summary.monthly_sales {
        t.add_row(vec![
            row.month.format("%Y-%m").to_string(),
            format!("{:.2}", row.total),
        ]);
    }
    section(&mut out, "Monthly Sales:", &t);

    let mut t = table(&["date", "daily", "moving average"]);
    let skip = summary.moving_average.len().saturating_sub(MOVING_AVERAGE_TAIL);
    for (daily, average) in summary
        .daily_sales
        .iter()
        .zip(summary.moving_average.iter())
        .skip(skip)
    {
        t.add_row(vec![
            average.date.format("%Y-%m-%d").to_string(),
            format!("{:.2}", daily.value),
            format!("{:.2}", average.value),
        ]);
    }
    section(
        &mut out,
        &format!("{}-Day Moving Average:", summary.moving_average_days),
        &t,
    );

    let mut t = table(&["product", "price"]);
    for row in &summary.average_price {
        t.add_row(vec![row.product.clone(), format!("{:.2}", row.value)]);
    }
    section(&mut out, "Average Original Price by Product:", &t);

    let mut t = table(&["product", "quantity"]);
    for row in &summary.quantity_by_product {
        t.add_row(vec![row.product.clone(), row.quantity.to_string()]);
    }
    section(&mut out, "Total Quantity Sold by Product:", &t);

    let mut t = table(&["offer_type", "charged", "quantity", "price", "discount_pct"]);
    for row in &summary.offer_performance {
        t.add_row(vec![
            row.offer_type.to_string(),
            format!("{:.2}", row.charged_sum),
            row.quantity_sum.to_string(),
            format!("{:.2}", row.price_mean),
            format_value(row.discount_pct),
        ]);
    }
    section(&mut out, "Performance by Offer Type:", &t);

    let mut t = table(&crate::report::spreadsheet::PERFORMANCE_COLUMNS);
    for row in &summary.product_performance {
        t.add_row(vec![
            row.product.clone(),
            format!("{:.2}", row.charged_sum),
            format!("{:.2}", row.charged_mean),
            format_value(row.charged_std),
            row.quantity_sum.to_string(),
            format!("{:.2}", row.quantity_mean),
            format!("{:.2}", row.price_mean),
            format!("{:.2}", row.price_min),
            format!("{:.2}", row.price_max),
            format_value(row.price_per_unit_mean),
            format_value(row.sales_per_unit),
        ]);
    }
    section(&mut out, "Product Performance Summary:", &t);

    match association {
        AssociationOutcome::Mined { rules, .. } if rules.is_empty() => {
            out.push_str("\nTop Product Associations:\n");
            out.push_str("No rules met the support and lift thresholds.\n");
        }
        AssociationOutcome::Mined { rules, .. } => {
            section(
                &mut out,
                "Top Product Associations:",
                &rules_table(rules, top_rules),
            );
        }
        AssociationOutcome::Skipped { reason } => {
            out.push_str(&format!(
                "\nAssociation mining not available - skipping association rules analysis ({})\n",
                reason
            ));
        }
        AssociationOutcome::Failed { error } => {
            out.push_str(&format!("\nCould not generate association rules: {}\n", error));
        }
    }

    out.push('\n');
    out.push_str(MANIFEST_HEADER);
    out.push('\n');
    for path in artifacts {
        out.push_str(&format!("- {}\n", path.display()));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::aggregate::{ProductPerformance, ProductTotal};

    fn summary() -> SalesSummary {
        SalesSummary {
            sales_by_product: vec![ProductTotal {
                product: "melon".to_string(),
                value: 12.0,
            }],
            monthly_sales: Vec::new(),
            daily_sales: Vec::new(),
            moving_average: Vec::new(),
            moving_average_days: 7,
            average_price: Vec::new(),
            price_distribution: Vec::new(),
            quantity_by_product: Vec::new(),
            quantity_vs_price: Vec::new(),
            offer_performance: Vec::new(),
            product_performance: vec![ProductPerformance {
                product: "melon".to_string(),
                charged_sum: 0.0,
                charged_mean: 0.0,
                charged_std: None,
                quantity_sum: 0,
                quantity_mean: 0.0,
                price_mean: 4.0,
                price_min: 4.0,
                price_max: 4.0,
                price_per_unit_mean: None,
                sales_per_unit: None,
            }],
            undefined_price_per_unit: 1,
        }
    }

    #[test]
    fn test_sections_in_fixed_order() {
        let text = render_console(
            &summary(),
            &AssociationOutcome::Skipped {
                reason: "disabled".to_string(),
            },
            10,
            &[PathBuf::from("sales_by_product.png")],
        );
        let order = [
            "Total Sales by Product:",
            "Monthly Sales:",
            "7-Day Moving Average:",
            "Average Original Price by Product:",
            "Total Quantity Sold by Product:",
            "Performance by Offer Type:",
            "Product Performance Summary:",
            "skipping association rules analysis",
            MANIFEST_HEADER,
            "- sales_by_product.png",
        ];
        let positions: Vec<usize> = order
            .iter()
            .map(|needle| text.find(needle).unwrap_or_else(|| panic!("missing {needle}")))
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_undefined_prints_nan() {
        let text = render_console(
            &summary(),
            &AssociationOutcome::Failed {
                error: "boom".to_string(),
            },
            10,
            &[],
        );
        assert!(text.contains("NaN"));
        assert!(text.contains("Could not generate association rules: boom"));
    }

    #[test]
    fn test_top_rules_are_limited() {
        let rule = |a: &str| AssociationRule {
            antecedents: vec![a.to_string()],
            consequents: vec!["zucchini".to_string()],
            antecedent_support: 0.5,
            consequent_support: 0.5,
            support: 0.25,
            confidence: 0.5,
            lift: 1.0,
            leverage: 0.0,
            conviction: 1.0,
        };
        let outcome = AssociationOutcome::Mined {
            rules: vec![rule("apple"), rule("banana"), rule("cherry")],
            csv_path: PathBuf::from("product_association_rules.csv"),
        };
        let text = render_console(&summary(), &outcome, 2, &[]);
        assert!(text.contains("Top Product Associations:"));
        assert!(text.contains("banana"));
        assert!(!text.contains("cherry"));
    }
}
