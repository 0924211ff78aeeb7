use super::derive::Sale;
use chrono::{Datelike, Duration, Months, NaiveDate};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DailyPoint {
    pub date: NaiveDate,
    pub value: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonthlyTotal {
    /// First day of the month.
    pub month: NaiveDate,
    pub total: f64,
}

fn month_start(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// Charged totals for every date that has at least one sale, in date order.
pub fn daily_totals(sales: &[Sale]) -> Vec<DailyPoint> {
    let mut totals: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for sale in sales {
        *totals.entry(sale.date).or_insert(0.0) += sale.charged;
    }
    totals
        .into_iter()
        .map(|(date, value)| DailyPoint { date, value })
        .collect()
}

/// Charged totals per calendar month from the first to the last sale.
/// Months without sales are present with a zero total.
pub fn monthly_totals(sales: &[Sale]) -> Vec<MonthlyTotal> {
    let mut totals: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for sale in sales {
        *totals.entry(month_start(sale.date)).or_insert(0.0) += sale.charged;
    }

    let (first, last) = match (totals.keys().next(), totals.keys().next_back()) {
        (Some(first), Some(last)) => (*first, *last),
        _ => return Vec::new(),
    };

    let mut result = Vec::new();
    let mut month = first;
    while month <= last {
        result.push(MonthlyTotal {
            month,
            total: totals.get(&month).copied().unwrap_or(0.0),
        });
        month = match month.checked_add_months(Months::new(1)) {
            Some(next) => next,
            None => break,
        };
    }
    result
}

/// Trailing mean over daily totals: for each day `d`, the mean of the daily
/// totals dated within `[d - (window_days - 1), d]`.
pub fn moving_average(daily: &[DailyPoint], window_days: u32) -> Vec<DailyPoint> {
    let span = Duration::days(i64::from(window_days.max(1)) - 1);
    let mut left = 0;

    daily
        .iter()
        .enumerate()
        .map(|(right, point)| {
            let window_start = point
                .date
                .checked_sub_signed(span)
                .unwrap_or(NaiveDate::MIN);
            while daily[left].date < window_start {
                left += 1;
            }
            let window = &daily[left..=right];
            let total: f64 = window.iter().map(|p| p.value).sum();
            DailyPoint {
                date: point.date,
                value: total / window.len() as f64,
            }
        })
        .collect()
}
