use crate::analysis::aggregate::ProductPerformance;
use crate::error::Error;
use std::path::Path;
use tracing::debug;

const SHEET: &str = "Sheet1";

pub const PERFORMANCE_COLUMNS: [&str; 11] = [
    "name",
    "charged_sum",
    "charged_mean",
    "charged_std",
    "quantity_sum",
    "quantity_mean",
    "price_mean",
    "price_min",
    "price_max",
    "price_per_unit_mean",
    "sales_per_unit",
];

fn row_values(perf: &ProductPerformance) -> [Option<f64>; 10] {
    [
        Some(perf.charged_sum),
        Some(perf.charged_mean),
        perf.charged_std,
        Some(perf.quantity_sum as f64),
        Some(perf.quantity_mean),
        Some(perf.price_mean),
        Some(perf.price_min),
        Some(perf.price_max),
        perf.price_per_unit_mean,
        perf.sales_per_unit,
    ]
}

/// Write the product performance table: a header row, then one row per
/// product. Undefined values are left as blank cells.
pub fn write_product_performance(rows: &[ProductPerformance], path: &Path) -> Result<(), Error> {
    let mut book = umya_spreadsheet::new_file();
    let sheet = book
        .get_sheet_by_name_mut(SHEET)
        .ok_or_else(|| {
            Error::Spreadsheet(format!("worksheet {} missing from new workbook", SHEET))
        })?;

    for (col, header) in PERFORMANCE_COLUMNS.iter().enumerate() {
        sheet
            .get_cell_mut((col as u32 + 1, 1))
            .set_value(header.to_string());
    }

    for (i, perf) in rows.iter().enumerate() {
        let row = i as u32 + 2;
        sheet
            .get_cell_mut((1, row))
            .set_value(perf.product.clone());
        for (offset, value) in row_values(perf).into_iter().enumerate() {
            if let Some(value) = value {
                sheet
                    .get_cell_mut((offset as u32 + 2, row))
                    .set_value_number(value);
            }
        }
    }

    umya_spreadsheet::writer::xlsx::write(&book, path)
        .map_err(|e| Error::Spreadsheet(format!("failed to write {}: {}", path.display(), e)))?;
    debug!("Wrote {} product rows to {}", rows.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn performance(product: &str, std: Option<f64>) -> ProductPerformance {
        ProductPerformance {
            product: product.to_string(),
            charged_sum: 30.0,
            charged_mean: 15.0,
            charged_std: std,
            quantity_sum: 4,
            quantity_mean: 2.0,
            price_mean: 9.0,
            price_min: 6.0,
            price_max: 12.0,
            price_per_unit_mean: Some(7.5),
            sales_per_unit: Some(7.5),
        }
    }

    #[test]
    fn test_header_and_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("product_performance.xlsx");
        let rows = [performance("apple", None), performance("lime", Some(1.5))];
        write_product_performance(&rows, &path).unwrap();

        let book = umya_spreadsheet::reader::xlsx::read(&path).unwrap();
        let sheet = book.get_sheet_by_name(SHEET).unwrap();
        assert_eq!(sheet.get_value((1, 1)), "name");
        assert_eq!(sheet.get_value((11, 1)), "sales_per_unit");
        assert_eq!(sheet.get_value((1, 2)), "apple");
        assert_eq!(sheet.get_value((2, 2)).parse::<f64>().unwrap(), 30.0);
        // undefined std is a blank cell
        assert_eq!(sheet.get_value((4, 2)), "");
        assert_eq!(sheet.get_value((4, 3)).parse::<f64>().unwrap(), 1.5);
    }

    #[test]
    fn test_empty_table_is_header_only() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("product_performance.xlsx");
        write_product_performance(&[], &path).unwrap();

        let book = umya_spreadsheet::reader::xlsx::read(&path).unwrap();
        let sheet = book.get_sheet_by_name(SHEET).unwrap();
        assert_eq!(sheet.get_value((1, 1)), "name");
        assert_eq!(sheet.get_value((1, 2)), "");
    }
}
