pub mod builders;

use crate::config::SeedConfig;
use crate::error::Error;
use crate::storage::models::CartStatus;
use crate::storage::Database;
use builders::{CartBuilder, CartItemBuilder, UserBuilder, CATALOGUE};
use chrono::{Duration, NaiveDateTime, Utc};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub struct SeedPlan {
    pub users: usize,
    pub carts: usize,
    /// Upper bound; each cart gets between one and this many distinct products.
    pub items_per_cart: usize,
    /// Cart timestamps fall within this many days before `until`.
    pub days: u32,
    pub until: NaiveDateTime,
    pub rng_seed: Option<u64>,
}

impl From<&SeedConfig> for SeedPlan {
    fn from(config: &SeedConfig) -> Self {
        SeedPlan {
            users: config.users,
            carts: config.carts,
            items_per_cart: config.items_per_cart,
            days: config.days,
            until: Utc::now().naive_utc(),
            rng_seed: config.rng_seed,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SeedSummary {
    pub users: usize,
    pub carts: usize,
    pub closed_carts: usize,
    pub cart_items: usize,
}

fn random_timestamp<R: Rng + ?Sized>(
    rng: &mut R,
    until: NaiveDateTime,
    days: u32,
) -> NaiveDateTime {
    let span = i64::from(days) * 86_400;
    if span == 0 {
        return until;
    }
    until
        .checked_sub_signed(Duration::seconds(rng.gen_range(0..span)))
        .unwrap_or(NaiveDateTime::MIN)
}

/// Populate the database with users, carts assigned round-robin to them, and
/// items with distinct product names per cart. A fixed `rng_seed` makes the
/// generated rows reproducible.
pub fn seed_database(db: &mut Database, plan: &SeedPlan) -> Result<SeedSummary, Error> {
    if plan.carts > 0 && plan.users == 0 {
        return Err(Error::Validation(
            "cannot create carts without at least one user".to_string(),
        ));
    }

    let mut rng = match plan.rng_seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let mut summary = SeedSummary::default();

    info!("Seeding {} users...", plan.users);
    let mut user_ids = Vec::with_capacity(plan.users);
    for seq in 0..plan.users {
        let user = UserBuilder::new(seq)
            .created_at(random_timestamp(&mut rng, plan.until, plan.days))
            .build(&mut rng)?;
        user_ids.push(db.insert_user(&user)?);
    }
    summary.users = user_ids.len();

    info!("Seeding {} carts...", plan.carts);
    let max_items = plan.items_per_cart.min(CATALOGUE.len());
    for seq in 0..plan.carts {
        let user_id = user_ids[seq % user_ids.len()];
        let created_at = random_timestamp(&mut rng, plan.until, plan.days);
        let cart = CartBuilder::new(user_id, seq).created_at(created_at).build();

        let count = if max_items == 0 {
            0
        } else {
            rng.gen_range(1..=max_items)
        };
        let names: Vec<&str> = CATALOGUE.choose_multiple(&mut rng, count).copied().collect();
        let mut items = names
            .into_iter()
            .enumerate()
            .map(|(i, name)| {
                CartItemBuilder::new(0, seq * CATALOGUE.len() + i)
                    .name(name)
                    .created_at(created_at)
                    .build(&mut rng)
            })
            .collect::<Result<Vec<_>, Error>>()?;

        let cart_id = db.insert_cart_with_items(&cart, &mut items)?;
        debug!("Cart {} seeded with {} items", cart_id, items.len());

        summary.carts += 1;
        summary.cart_items += items.len();
        if cart.status == CartStatus::Closed {
            summary.closed_carts += 1;
        }
    }

    info!(
        "Seeded {} users, {} carts ({} closed), {} cart items",
        summary.users, summary.carts, summary.closed_carts, summary.cart_items
    );
    Ok(summary)
}
