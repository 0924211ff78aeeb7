use cart_analytics_core::analysis::association::{
    association_rules, frequent_itemsets, resolve_miner, AssociationRule, IncidenceMatrix,
    MinerCapability, MiningParams,
};
use cart_analytics_core::analysis::derive::Sale;
use cart_analytics_core::config::MiningConfig;
use cart_analytics_core::Error;
use cart_analytics_core::storage::models::OfferType;
use chrono::NaiveDate;

fn sale(cart_id: i32, product: &str) -> Sale {
    let created_at = NaiveDate::from_ymd_opt(2025, 6, 1)
        .unwrap()
        .and_hms_opt(8, 0, 0)
        .unwrap();
    Sale {
        cart_id,
        product: product.to_string(),
        price: 2.0,
        charged: 2.0,
        quantity: 1,
        offer_type: OfferType::None,
        created_at,
        date: created_at.date(),
        price_per_unit: Some(2.0),
    }
}

fn baskets(carts: &[&[&str]]) -> IncidenceMatrix {
    let sales: Vec<Sale> = carts
        .iter()
        .enumerate()
        .flat_map(|(i, items)| items.iter().map(move |p| sale(i as i32 + 1, p)))
        .collect();
    IncidenceMatrix::from_sales(&sales)
}

/// apple 0.75, lime 0.5, melon 0.25, banana 0.25
fn known_baskets() -> IncidenceMatrix {
    baskets(&[
        &["apple", "lime"],
        &["apple", "lime"],
        &["apple", "melon"],
        &["banana"],
    ])
}

fn mine(matrix: &IncidenceMatrix, params: MiningParams) -> Vec<AssociationRule> {
    let itemsets = frequent_itemsets(matrix, params.min_support, params.max_itemset_len);
    association_rules(&itemsets, matrix.products(), params.min_lift).unwrap()
}

fn find<'a>(rules: &'a [AssociationRule], from: &str, to: &str) -> &'a AssociationRule {
    rules
        .iter()
        .find(|r| r.antecedents == [from] && r.consequents == [to])
        .unwrap_or_else(|| panic!("no rule {} -> {}", from, to))
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn test_frequent_itemset_supports() {
    let matrix = known_baskets();
    let itemsets = frequent_itemsets(&matrix, 0.05, None);
    let products = matrix.products();
    let support_of = |names: &[&str]| {
        itemsets
            .iter()
            .find(|s| {
                s.items.len() == names.len()
                    && s.items.iter().all(|&i| names.contains(&products[i].as_str()))
            })
            .map(|s| s.support)
    };

    assert_eq!(support_of(&["apple"]), Some(0.75));
    assert_eq!(support_of(&["lime"]), Some(0.5));
    assert_eq!(support_of(&["banana"]), Some(0.25));
    assert_eq!(support_of(&["apple", "lime"]), Some(0.5));
    assert_eq!(support_of(&["apple", "melon"]), Some(0.25));
    assert_eq!(support_of(&["banana", "apple"]), None);
}

#[test]
fn test_known_basket_rule_metrics() {
    let rules = mine(&known_baskets(), MiningParams::default());
    assert_eq!(rules.len(), 4);

    let lime_apple = find(&rules, "lime", "apple");
    assert!(close(lime_apple.support, 0.5));
    assert!(close(lime_apple.confidence, 1.0));
    assert!(close(lime_apple.lift, 4.0 / 3.0));
    assert!(close(lime_apple.leverage, 0.125));
    assert!(lime_apple.conviction.is_infinite());

    let apple_lime = find(&rules, "apple", "lime");
    assert!(close(apple_lime.confidence, 2.0 / 3.0));
    assert!(close(apple_lime.lift, 4.0 / 3.0));
    assert!(close(apple_lime.conviction, 1.5));

    let apple_melon = find(&rules, "apple", "melon");
    assert!(close(apple_melon.antecedent_support, 0.75));
    assert!(close(apple_melon.consequent_support, 0.25));
    assert!(close(apple_melon.confidence, 1.0 / 3.0));
}

#[test]
fn test_min_support_drops_rare_items() {
    let params = MiningParams {
        min_support: 0.3,
        ..MiningParams::default()
    };
    let rules = mine(&known_baskets(), params);
    assert_eq!(rules.len(), 2);
    assert!(rules
        .iter()
        .all(|r| !r.antecedents.contains(&"melon".to_string())));
}

#[test]
fn test_min_lift_drops_negative_association() {
    // apple 0.75, lime 0.75, together 0.5: lift 0.89
    let matrix = baskets(&[
        &["apple", "lime"],
        &["apple"],
        &["lime"],
        &["apple", "lime"],
    ]);
    assert!(mine(&matrix, MiningParams::default()).is_empty());

    let permissive = MiningParams {
        min_lift: 0.0,
        ..MiningParams::default()
    };
    let rules = mine(&matrix, permissive);
    assert_eq!(rules.len(), 2);
    assert!(rules.iter().all(|r| close(r.lift, 0.5 / 0.5625)));
}

#[test]
fn test_rules_sorted_and_meet_thresholds() {
    let matrix = baskets(&[
        &["apple", "lime", "melon"],
        &["apple", "lime"],
        &["apple", "melon"],
        &["banana", "melon"],
        &["banana"],
        &["lime", "melon", "banana"],
        &["apple", "lime", "banana"],
    ]);
    let params = MiningParams {
        min_support: 0.1,
        min_lift: 1.0,
        max_itemset_len: None,
    };
    let rules = mine(&matrix, params);
    assert!(!rules.is_empty());

    for rule in &rules {
        assert!(rule.support >= params.min_support);
        assert!(rule.lift >= params.min_lift - 1e-9);
        assert!(!rule.antecedents.is_empty() && !rule.consequents.is_empty());
        assert!(rule.antecedents.iter().all(|a| !rule.consequents.contains(a)));
    }
    assert!(rules.windows(2).all(|w| w[0].lift + 1e-9 >= w[1].lift));
}

#[test]
fn test_three_item_rules_are_generated() {
    let matrix = baskets(&[&["apple", "lime", "melon"], &["apple", "lime", "melon"], &["banana"]]);
    let rules = mine(&matrix, MiningParams::default());
    assert!(rules
        .iter()
        .any(|r| r.antecedents.len() == 2 && r.consequents == ["melon"]));

    let bounded = mine(
        &matrix,
        MiningParams {
            max_itemset_len: Some(2),
            ..MiningParams::default()
        },
    );
    assert!(bounded
        .iter()
        .all(|r| r.antecedents.len() + r.consequents.len() == 2));
}

#[test]
fn test_builtin_miner_through_trait() {
    let config = MiningConfig::default();
    let miner = match resolve_miner(&config) {
        MinerCapability::Available(miner) => miner,
        MinerCapability::Unavailable { reason } => panic!("miner unavailable: {}", reason),
    };
    assert_eq!(miner.name(), "apriori");

    let rules = miner
        .mine(&known_baskets(), &MiningParams::from(&config))
        .unwrap();
    assert_eq!(rules.len(), 4);
}

#[test]
fn test_empty_matrix_yields_no_rules() {
    let matrix = IncidenceMatrix::from_sales(&[]);
    assert_eq!(matrix.cart_count(), 0);
    assert!(mine(&matrix, MiningParams::default()).is_empty());
}

#[test]
fn test_builtin_miner_rejects_invalid_thresholds() {
    let miner = match resolve_miner(&MiningConfig::default()) {
        MinerCapability::Available(miner) => miner,
        MinerCapability::Unavailable { reason } => panic!("miner unavailable: {}", reason),
    };
    let matrix = baskets(&[&["apple", "banana"], &["lime"]]);

    for params in [
        MiningParams {
            min_support: 0.0,
            ..MiningParams::default()
        },
        MiningParams {
            min_support: 1.5,
            ..MiningParams::default()
        },
        MiningParams {
            min_lift: f64::NAN,
            ..MiningParams::default()
        },
    ] {
        let result = miner.mine(&matrix, &params);
        assert!(
            matches!(result, Err(Error::Mining(_))),
            "accepted {:?}",
            params
        );
    }

    let rules = miner.mine(&matrix, &MiningParams::default()).unwrap();
    assert!(rules.iter().all(|r| r.lift.is_finite()));
}
