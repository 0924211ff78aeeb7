use super::stats::ratio;
use crate::storage::models::{OfferType, SaleRecord};
use chrono::{NaiveDate, NaiveDateTime};
use tracing::warn;

/// A sale record with its per-row derived fields.
#[derive(Debug, Clone, PartialEq)]
pub struct Sale {
    pub cart_id: i32,
    pub product: String,
    pub price: f64,
    pub charged: f64,
    pub quantity: i32,
    pub offer_type: OfferType,
    pub created_at: NaiveDateTime,
    pub date: NaiveDate,
    /// `charged / quantity`; `None` when quantity is zero.
    pub price_per_unit: Option<f64>,
}

impl Sale {
    pub fn from_record(record: &SaleRecord) -> Self {
        Sale {
            cart_id: record.cart_id,
            product: record.name.clone(),
            price: record.price,
            charged: record.charged,
            quantity: record.quantity,
            offer_type: record.offer_type,
            created_at: record.created_at,
            date: record.created_at.date(),
            price_per_unit: ratio(record.charged, record.quantity as f64),
        }
    }
}

pub fn derive_sales(records: &[SaleRecord]) -> Vec<Sale> {
    let sales: Vec<Sale> = records.iter().map(Sale::from_record).collect();

    let undefined = sales.iter().filter(|s| s.price_per_unit.is_none()).count();
    if undefined > 0 {
        warn!(
            "{} sale records have quantity 0; their price per unit is undefined",
            undefined
        );
    }

    sales
}
