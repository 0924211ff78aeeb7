use super::schema::{cart_items, carts, users};
use chrono::NaiveDateTime;
use diesel::backend::Backend;
use diesel::deserialize::{self, FromSql, FromSqlRow};
use diesel::expression::AsExpression;
use diesel::prelude::*;
use diesel::serialize::{self, IsNull, Output, ToSql};
use diesel::sql_types::Text;
use diesel::sqlite::Sqlite;
use std::fmt;
use std::str::FromStr;

/// Maps a fieldless enum onto a TEXT column using fixed labels.
macro_rules! text_enum {
    ($ty:ident { $($variant:ident => $label:literal),+ $(,)? }) => {
        impl $ty {
            pub const ALL: &'static [$ty] = &[$($ty::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($ty::$variant => $label,)+
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($label => Ok($ty::$variant),)+
                    other => Err(format!("unknown {} value '{}'", stringify!($ty), other)),
                }
            }
        }

        impl ToSql<Text, Sqlite> for $ty {
            fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Sqlite>) -> serialize::Result {
                out.set_value(self.as_str());
                Ok(IsNull::No)
            }
        }

        impl FromSql<Text, Sqlite> for $ty {
            fn from_sql(bytes: <Sqlite as Backend>::RawValue<'_>) -> deserialize::Result<Self> {
                let label = <String as FromSql<Text, Sqlite>>::from_sql(bytes)?;
                label.parse::<$ty>().map_err(Into::into)
            }
        }
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, AsExpression, FromSqlRow)]
#[diesel(sql_type = Text)]
pub enum CartStatus {
    Open,
    Closed,
}

text_enum!(CartStatus {
    Open => "OPEN",
    Closed => "CLOSED",
});

/// Promotion applied to a cart item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, AsExpression, FromSqlRow)]
#[diesel(sql_type = Text)]
pub enum OfferType {
    None,
    Discount,
    /// Buy one, get one free.
    Bogo,
}

text_enum!(OfferType {
    None => "NONE",
    Discount => "DISCOUNT",
    Bogo => "BOGO",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, AsExpression, FromSqlRow)]
#[diesel(sql_type = Text)]
pub enum UserRole {
    Admin,
    Customer,
}

text_enum!(UserRole {
    Admin => "admin",
    Customer => "customer",
});

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
pub struct User {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: UserRole,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: UserRole,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// A customer's purchase session.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = carts)]
pub struct Cart {
    pub id: i32,
    pub user_id: i32,
    pub status: CartStatus,
    pub total: f64,
    pub quantity: i32,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = carts)]
pub struct NewCart {
    pub user_id: i32,
    pub status: CartStatus,
    pub total: f64,
    pub quantity: i32,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// One product line within a cart.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = cart_items)]
pub struct CartItem {
    pub id: i32,
    pub cart_id: i32,
    pub name: String,
    pub price: f64,
    pub charged: f64,
    pub avg_price: Option<f64>,
    pub quantity: i32,
    pub offer_type: OfferType,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = cart_items)]
pub struct NewCartItem {
    pub cart_id: i32,
    pub name: String,
    pub price: f64,
    pub charged: f64,
    pub avg_price: Option<f64>,
    pub quantity: i32,
    pub offer_type: OfferType,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// One sold cart item, as projected by the closed-cart join.
#[derive(Debug, Clone, PartialEq, Queryable)]
pub struct SaleRecord {
    pub cart_id: i32,
    pub name: String,
    pub price: f64,
    pub charged: f64,
    pub quantity: i32,
    pub offer_type: OfferType,
    pub created_at: NaiveDateTime,
    pub status: CartStatus,
}

/// Row counts per table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TableCounts {
    pub users: i64,
    pub carts: i64,
    pub cart_items: i64,
}
