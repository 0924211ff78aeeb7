use super::derive::Sale;
use crate::config::MiningConfig;
use crate::error::Error;
use ahash::{AHashMap, AHashSet};
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

/// Binary cart × product presence matrix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncidenceMatrix {
    carts: Vec<i32>,
    products: Vec<String>,
    cells: Vec<Vec<bool>>,
}

impl IncidenceMatrix {
    pub fn from_sales(sales: &[Sale]) -> Self {
        let products: Vec<String> = sales
            .iter()
            .map(|s| s.product.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let column_of: AHashMap<&str, usize> = products
            .iter()
            .enumerate()
            .map(|(i, p)| (p.as_str(), i))
            .collect();

        let mut rows: BTreeMap<i32, Vec<bool>> = BTreeMap::new();
        for sale in sales {
            let row = rows
                .entry(sale.cart_id)
                .or_insert_with(|| vec![false; products.len()]);
            if let Some(&col) = column_of.get(sale.product.as_str()) {
                row[col] = true;
            }
        }

        let (carts, cells) = rows.into_iter().unzip();
        IncidenceMatrix {
            carts,
            products,
            cells,
        }
    }

    pub fn carts(&self) -> &[i32] {
        &self.carts
    }

    pub fn products(&self) -> &[String] {
        &self.products
    }

    pub fn cart_count(&self) -> usize {
        self.carts.len()
    }

    pub fn product_count(&self) -> usize {
        self.products.len()
    }

    /// 1 when the product is in the cart, 0 when not, `None` for unknown labels.
    pub fn cell(&self, cart_id: i32, product: &str) -> Option<u8> {
        let row = self.carts.iter().position(|c| *c == cart_id)?;
        let col = self.products.iter().position(|p| p == product)?;
        Some(u8::from(self.cells[row][col]))
    }

    fn contains_all(&self, row: usize, items: &[usize]) -> bool {
        items.iter().all(|&col| self.cells[row][col])
    }

    fn support(&self, items: &[usize]) -> f64 {
        let hits = (0..self.cart_count())
            .filter(|&row| self.contains_all(row, items))
            .count();
        hits as f64 / self.cart_count() as f64
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MiningParams {
    pub min_support: f64,
    pub min_lift: f64,
    pub max_itemset_len: Option<usize>,
}

impl From<&MiningConfig> for MiningParams {
    fn from(config: &MiningConfig) -> Self {
        MiningParams {
            min_support: config.min_support,
            min_lift: config.min_lift,
            max_itemset_len: config.max_itemset_len,
        }
    }
}

impl MiningParams {
    /// Support must lie in `(0, 1]` and the lift threshold must be finite.
    pub fn validate(&self) -> Result<(), Error> {
        if !(self.min_support > 0.0 && self.min_support <= 1.0) {
            return Err(Error::Mining(format!(
                "min_support must be in (0, 1], got {}",
                self.min_support
            )));
        }
        if !self.min_lift.is_finite() {
            return Err(Error::Mining(format!(
                "min_lift must be finite, got {}",
                self.min_lift
            )));
        }
        if self.max_itemset_len == Some(0) {
            return Err(Error::Mining(
                "max_itemset_len must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for MiningParams {
    fn default() -> Self {
        MiningParams::from(&MiningConfig::default())
    }
}

/// Product indices (ascending) into `IncidenceMatrix::products`.
#[derive(Debug, Clone, PartialEq)]
pub struct FrequentItemset {
    pub items: Vec<usize>,
    pub support: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AssociationRule {
    pub antecedents: Vec<String>,
    pub consequents: Vec<String>,
    pub antecedent_support: f64,
    pub consequent_support: f64,
    pub support: f64,
    pub confidence: f64,
    pub lift: f64,
    pub leverage: f64,
    /// Infinite when confidence is 1.
    pub conviction: f64,
}

/// A frequent-pattern miner that can be swapped out or stubbed.
pub trait AssociationMiner {
    fn name(&self) -> &'static str;

    fn mine(
        &self,
        matrix: &IncidenceMatrix,
        params: &MiningParams,
    ) -> Result<Vec<AssociationRule>, Error>;
}

/// Result of the startup capability check for the association step.
pub enum MinerCapability {
    Available(Box<dyn AssociationMiner>),
    Unavailable { reason: String },
}

impl MinerCapability {
    pub fn unavailable(reason: impl Into<String>) -> Self {
        MinerCapability::Unavailable {
            reason: reason.into(),
        }
    }
}

/// Decide once, at startup, whether association mining can run.
pub fn resolve_miner(config: &MiningConfig) -> MinerCapability {
    if !config.enabled {
        return MinerCapability::unavailable("association mining disabled by configuration");
    }
    builtin_miner()
}

#[cfg(feature = "association-rules")]
fn builtin_miner() -> MinerCapability {
    MinerCapability::Available(Box::new(AprioriMiner))
}

#[cfg(not(feature = "association-rules"))]
fn builtin_miner() -> MinerCapability {
    MinerCapability::unavailable("built without the `association-rules` feature")
}

/// Level-wise Apriori over the incidence matrix.
#[cfg(feature = "association-rules")]
pub struct AprioriMiner;

#[cfg(feature = "association-rules")]
impl AssociationMiner for AprioriMiner {
    fn name(&self) -> &'static str {
        "apriori"
    }

    fn mine(
        &self,
        matrix: &IncidenceMatrix,
        params: &MiningParams,
    ) -> Result<Vec<AssociationRule>, Error> {
        params.validate()?;
        let itemsets = frequent_itemsets(matrix, params.min_support, params.max_itemset_len);
        tracing::debug!(
            "{} frequent itemsets at min_support={:.3}",
            itemsets.len(),
            params.min_support
        );
        association_rules(&itemsets, matrix.products(), params.min_lift)
    }
}

/// All itemsets whose support is at least `min_support`.
///
/// 1. Frequent single products seed level 1
/// 2. Level k candidates join two level k-1 itemsets sharing their first k-2 items
/// 3. Candidates with an infrequent (k-1)-subset are pruned before counting
pub fn frequent_itemsets(
    matrix: &IncidenceMatrix,
    min_support: f64,
    max_len: Option<usize>,
) -> Vec<FrequentItemset> {
    if matrix.cart_count() == 0 {
        return Vec::new();
    }

    let mut result: Vec<FrequentItemset> = Vec::new();
    let mut level: Vec<FrequentItemset> = (0..matrix.product_count())
        .map(|p| FrequentItemset {
            items: vec![p],
            support: matrix.support(&[p]),
        })
        .filter(|set| set.support >= min_support)
        .collect();
    let mut size = 1;

    while !level.is_empty() {
        result.extend(level.iter().cloned());
        if max_len.is_some_and(|max| size >= max) {
            break;
        }

        let mut next = Vec::new();
        let known: AHashSet<&[usize]> = level.iter().map(|s| s.items.as_slice()).collect();

        for (i, a) in level.iter().enumerate() {
            for b in &level[i + 1..] {
                if a.items[..size - 1] != b.items[..size - 1] {
                    continue;
                }
                let mut candidate = a.items.clone();
                candidate.push(b.items[size - 1]);
                candidate.sort_unstable();

                let all_subsets_frequent = (0..candidate.len()).all(|skip| {
                    let subset: Vec<usize> = candidate
                        .iter()
                        .enumerate()
                        .filter(|(j, _)| *j != skip)
                        .map(|(_, item)| *item)
                        .collect();
                    known.contains(subset.as_slice())
                });
                if !all_subsets_frequent {
                    continue;
                }

                let support = matrix.support(&candidate);
                if support >= min_support {
                    next.push(FrequentItemset {
                        items: candidate,
                        support,
                    });
                }
            }
        }

        drop(known);
        next.sort_by(|a, b| a.items.cmp(&b.items));
        level = next;
        size += 1;
    }

    result
}

fn names(items: &[usize], products: &[String]) -> Vec<String> {
    items.iter().map(|&i| products[i].clone()).collect()
}

/// Every rule `A -> C` from itemsets of two or more products, where `A` is a
/// non-empty proper subset and `C` its complement. Rules below `min_lift`
/// are dropped; the rest come back by lift, then support, descending.
pub fn association_rules(
    itemsets: &[FrequentItemset],
    products: &[String],
    min_lift: f64,
) -> Result<Vec<AssociationRule>, Error> {
    const LIFT_TOLERANCE: f64 = 1e-9;
    const MAX_RULE_ITEMS: usize = 20;

    let support_of: AHashMap<&[usize], f64> = itemsets
        .iter()
        .map(|s| (s.items.as_slice(), s.support))
        .collect();

    let lookup = |items: &[usize]| -> Result<f64, Error> {
        support_of.get(items).copied().ok_or_else(|| {
            Error::Mining(format!(
                "itemset {:?} missing from frequent itemsets",
                names(items, products)
            ))
        })
    };

    let mut rules = Vec::new();
    for itemset in itemsets.iter().filter(|s| s.items.len() >= 2) {
        let k = itemset.items.len();
        if k > MAX_RULE_ITEMS {
            return Err(Error::Mining(format!(
                "itemset of {} products exceeds the {} product limit for rule generation",
                k, MAX_RULE_ITEMS
            )));
        }

        for mask in 1..(1u32 << k) - 1 {
            let (antecedent, consequent): (Vec<usize>, Vec<usize>) = itemset
                .items
                .iter()
                .enumerate()
                .fold((Vec::new(), Vec::new()), |(mut a, mut c), (bit, &item)| {
                    if mask & (1 << bit) != 0 {
                        a.push(item);
                    } else {
                        c.push(item);
                    }
                    (a, c)
                });

            let antecedent_support = lookup(&antecedent)?;
            let consequent_support = lookup(&consequent)?;
            let support = itemset.support;
            let confidence = support / antecedent_support;
            let lift = confidence / consequent_support;
            if lift + LIFT_TOLERANCE < min_lift {
                continue;
            }
            let conviction = if confidence >= 1.0 {
                f64::INFINITY
            } else {
                (1.0 - consequent_support) / (1.0 - confidence)
            };

            rules.push(AssociationRule {
                antecedents: names(&antecedent, products),
                consequents: names(&consequent, products),
                antecedent_support,
                consequent_support,
                support,
                confidence,
                lift,
                leverage: support - antecedent_support * consequent_support,
                conviction,
            });
        }
    }

    rules.sort_by(compare_rules);
    Ok(rules)
}

fn compare_rules(a: &AssociationRule, b: &AssociationRule) -> Ordering {
    b.lift
        .total_cmp(&a.lift)
        .then_with(|| b.support.total_cmp(&a.support))
        .then_with(|| a.antecedents.cmp(&b.antecedents))
        .then_with(|| a.consequents.cmp(&b.consequents))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::models::OfferType;
    use chrono::NaiveDate;

    fn sale(cart_id: i32, product: &str) -> Sale {
        let created_at = NaiveDate::from_ymd_opt(2025, 5, 1)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap();
        Sale {
            cart_id,
            product: product.to_string(),
            price: 1.0,
            charged: 1.0,
            quantity: 1,
            offer_type: OfferType::None,
            created_at,
            date: created_at.date(),
            price_per_unit: Some(1.0),
        }
    }

    #[test]
    fn test_incidence_matrix_is_binary() {
        let sales = vec![
            sale(2, "lime"),
            sale(1, "apple"),
            sale(1, "lime"),
            sale(1, "lime"),
        ];
        let matrix = IncidenceMatrix::from_sales(&sales);
        assert_eq!(matrix.carts(), &[1, 2]);
        assert_eq!(matrix.products(), &["apple".to_string(), "lime".to_string()]);
        assert_eq!(matrix.cell(1, "lime"), Some(1));
        assert_eq!(matrix.cell(2, "apple"), Some(0));
        assert_eq!(matrix.cell(3, "apple"), None);
    }

    #[test]
    fn test_empty_matrix_has_no_itemsets() {
        let matrix = IncidenceMatrix::from_sales(&[]);
        assert!(frequent_itemsets(&matrix, 0.05, None).is_empty());
    }

    #[test]
    fn test_max_len_bounds_itemsets() {
        let sales = vec![
            sale(1, "a"),
            sale(1, "b"),
            sale(1, "c"),
            sale(2, "a"),
            sale(2, "b"),
            sale(2, "c"),
        ];
        let matrix = IncidenceMatrix::from_sales(&sales);
        let all = frequent_itemsets(&matrix, 0.5, None);
        assert_eq!(all.len(), 7);
        let pairs = frequent_itemsets(&matrix, 0.5, Some(2));
        assert_eq!(pairs.len(), 6);
        assert!(pairs.iter().all(|s| s.items.len() <= 2));
    }

    #[test]
    fn test_resolve_miner_respects_disabled_config() {
        let config = MiningConfig {
            enabled: false,
            ..MiningConfig::default()
        };
        match resolve_miner(&config) {
            MinerCapability::Unavailable { reason } => assert!(reason.contains("disabled")),
            MinerCapability::Available(_) => panic!("mining should be unavailable"),
        }
    }
}
