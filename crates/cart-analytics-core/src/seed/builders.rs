//! Builders for test and demo rows. Each produces a plain `New*` value; the
//! caller decides when and where to insert it.

use crate::error::Error;
use crate::storage::models::{CartStatus, NewCart, NewCartItem, NewUser, OfferType, UserRole};
use chrono::{NaiveDateTime, Utc};
use rand::seq::SliceRandom;
use rand::Rng;

pub const CATALOGUE: [&str; 4] = ["lime", "melon", "apple", "banana"];

const FIRST_NAMES: [&str; 12] = [
    "Ada", "Boris", "Chloe", "Dmitri", "Elena", "Farid", "Grace", "Hiro", "Imani", "Jonas",
    "Keiko", "Luis",
];
const LAST_NAMES: [&str; 10] = [
    "Adams", "Brown", "Costa", "Dubois", "Evans", "Fischer", "Garcia", "Hughes", "Ito", "Jensen",
];

const PASSWORD_LENGTH: usize = 12;
const LOWER: &[u8] = b"abcdefghijklmnopqrstuvwxyz";
const UPPER: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const DIGITS: &[u8] = b"0123456789";
const SPECIAL: &[u8] = b"!@#$%^&*()_+";

fn now() -> NaiveDateTime {
    Utc::now().naive_utc()
}

fn cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn pick<R: Rng + ?Sized>(rng: &mut R, chars: &[u8]) -> u8 {
    chars[rng.gen_range(0..chars.len())]
}

/// A password with at least one upper case letter, digit and special character.
pub fn random_password<R: Rng + ?Sized>(rng: &mut R) -> String {
    let all: Vec<u8> = [LOWER, UPPER, DIGITS, SPECIAL].concat();
    let mut chars = vec![pick(rng, UPPER), pick(rng, DIGITS), pick(rng, SPECIAL)];
    while chars.len() < PASSWORD_LENGTH {
        chars.push(pick(rng, &all));
    }
    chars.shuffle(rng);
    chars.into_iter().map(char::from).collect()
}

/// Amount charged for `quantity` units under an offer.
///
/// `discount` is the fractional reduction used by `Discount` and ignored
/// otherwise. Buy-one-get-one charges for every second unit plus any odd one.
pub fn charge_for(offer: OfferType, price: f64, quantity: i32, discount: f64) -> f64 {
    let quantity = f64::from(quantity);
    let charged = match offer {
        OfferType::None => price * quantity,
        OfferType::Discount => price * quantity * (1.0 - discount),
        OfferType::Bogo => (quantity / 2.0).ceil() * price,
    };
    cents(charged)
}

#[derive(Debug, Clone, Default)]
pub struct UserBuilder {
    seq: usize,
    name: Option<String>,
    email: Option<String>,
    password: Option<String>,
    role: Option<UserRole>,
    created_at: Option<NaiveDateTime>,
}

impl UserBuilder {
    /// `seq` numbers the user within a batch and drives the defaults.
    pub fn new(seq: usize) -> Self {
        UserBuilder {
            seq,
            ..Default::default()
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    pub fn role(mut self, role: UserRole) -> Self {
        self.role = Some(role);
        self
    }

    pub fn created_at(mut self, at: NaiveDateTime) -> Self {
        self.created_at = Some(at);
        self
    }

    pub fn build<R: Rng + ?Sized>(self, rng: &mut R) -> Result<NewUser, Error> {
        let name = match self.name {
            Some(name) => name,
            None => format!(
                "{} {}",
                FIRST_NAMES[rng.gen_range(0..FIRST_NAMES.len())],
                LAST_NAMES[rng.gen_range(0..LAST_NAMES.len())]
            ),
        };
        let email = match self.email {
            Some(email) => email,
            None => {
                let mut parts = name.split_whitespace();
                let first = parts.next().unwrap_or("user");
                let last = parts.last().unwrap_or("customer");
                format!(
                    "{}.{}.{}@example.com",
                    first.to_lowercase(),
                    last.to_lowercase(),
                    self.seq
                )
            }
        };
        if !email.contains('@') {
            return Err(Error::Validation(format!("invalid email address '{}'", email)));
        }

        let password = match self.password {
            Some(password) => password,
            None => random_password(rng),
        };
        let role = self.role.unwrap_or(if self.seq.is_multiple_of(2) {
            UserRole::Admin
        } else {
            UserRole::Customer
        });
        let created_at = self.created_at.unwrap_or_else(now);

        Ok(NewUser {
            name,
            email,
            password,
            role,
            created_at,
            updated_at: created_at,
        })
    }
}

#[derive(Debug, Clone)]
pub struct CartBuilder {
    user_id: i32,
    seq: usize,
    status: Option<CartStatus>,
    total: f64,
    quantity: i32,
    created_at: Option<NaiveDateTime>,
}

impl CartBuilder {
    pub fn new(user_id: i32, seq: usize) -> Self {
        CartBuilder {
            user_id,
            seq,
            status: None,
            total: 0.0,
            quantity: 0,
            created_at: None,
        }
    }

    pub fn status(mut self, status: CartStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn total(mut self, total: f64) -> Self {
        self.total = total;
        self
    }

    pub fn quantity(mut self, quantity: i32) -> Self {
        self.quantity = quantity;
        self
    }

    pub fn created_at(mut self, at: NaiveDateTime) -> Self {
        self.created_at = Some(at);
        self
    }

    pub fn build(self) -> NewCart {
        let status = self
            .status
            .unwrap_or(CartStatus::ALL[self.seq % CartStatus::ALL.len()]);
        let created_at = self.created_at.unwrap_or_else(now);
        NewCart {
            user_id: self.user_id,
            status,
            total: self.total,
            quantity: self.quantity,
            created_at,
            updated_at: created_at,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum PriceRange {
    Any,
    UpTo50,
}

#[derive(Debug, Clone)]
pub struct CartItemBuilder {
    cart_id: i32,
    seq: usize,
    name: Option<String>,
    price: Option<f64>,
    price_range: PriceRange,
    quantity: Option<i32>,
    bulk: bool,
    offer_type: Option<OfferType>,
    charged: Option<f64>,
    avg_price: Option<f64>,
    created_at: Option<NaiveDateTime>,
}

impl CartItemBuilder {
    pub fn new(cart_id: i32, seq: usize) -> Self {
        CartItemBuilder {
            cart_id,
            seq,
            name: None,
            price: None,
            price_range: PriceRange::Any,
            quantity: None,
            bulk: false,
            offer_type: None,
            charged: None,
            avg_price: None,
            created_at: None,
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn price(mut self, price: f64) -> Self {
        self.price = Some(price);
        self
    }

    pub fn quantity(mut self, quantity: i32) -> Self {
        self.quantity = Some(quantity);
        self
    }

    pub fn offer_type(mut self, offer_type: OfferType) -> Self {
        self.offer_type = Some(offer_type);
        self
    }

    /// Skip deriving the charged amount from the offer.
    pub fn charged(mut self, charged: f64) -> Self {
        self.charged = Some(charged);
        self
    }

    pub fn avg_price(mut self, avg_price: f64) -> Self {
        self.avg_price = Some(avg_price);
        self
    }

    pub fn created_at(mut self, at: NaiveDateTime) -> Self {
        self.created_at = Some(at);
        self
    }

    /// A DISCOUNT item priced at 50 or less.
    pub fn discounted(mut self) -> Self {
        self.offer_type = Some(OfferType::Discount);
        self.price_range = PriceRange::UpTo50;
        self
    }

    /// Quantity drawn from 10 to 100.
    pub fn bulk(mut self) -> Self {
        self.bulk = true;
        self
    }

    pub fn build<R: Rng + ?Sized>(self, rng: &mut R) -> Result<NewCartItem, Error> {
        let name = self
            .name
            .unwrap_or_else(|| CATALOGUE[self.seq % CATALOGUE.len()].to_string());
        if name.trim().is_empty() {
            return Err(Error::Validation("cart item name is empty".to_string()));
        }

        let price = match (self.price, self.price_range) {
            (Some(price), _) => price,
            (None, PriceRange::Any) => cents(rng.gen_range(1.0..=99.99)),
            (None, PriceRange::UpTo50) => cents(rng.gen_range(1.0..=50.0)),
        };
        let quantity = match self.quantity {
            Some(quantity) => quantity,
            None if self.bulk => rng.gen_range(10..=100),
            None => rng.gen_range(1..=10),
        };
        if price < 0.0 || quantity < 0 {
            return Err(Error::Validation(format!(
                "cart item '{}' has negative price or quantity ({}, {})",
                name, price, quantity
            )));
        }

        let offer_type = self
            .offer_type
            .unwrap_or(OfferType::ALL[self.seq % OfferType::ALL.len()]);
        let charged = match self.charged {
            Some(charged) => charged,
            None => {
                let discount = if offer_type == OfferType::Discount {
                    rng.gen_range(0.05..=0.30)
                } else {
                    0.0
                };
                charge_for(offer_type, price, quantity, discount)
            }
        };
        let created_at = self.created_at.unwrap_or_else(now);

        Ok(NewCartItem {
            cart_id: self.cart_id,
            name,
            price,
            charged,
            avg_price: self.avg_price,
            quantity,
            offer_type,
            created_at,
            updated_at: created_at,
        })
    }
}
