use super::models::*;
use super::schema::{cart_items, carts, users};
use super::sqlite::Database;
use crate::error::Error;
use diesel::prelude::*;
use tracing::debug;

impl Database {
    // ── Users ────────────────────────────────────────────────────

    pub fn insert_user(&mut self, user: &NewUser) -> Result<i32, Error> {
        let id = diesel::insert_into(users::table)
            .values(user)
            .returning(users::id)
            .get_result(self.connection())?;
        Ok(id)
    }

    pub fn get_users(&mut self) -> Result<Vec<User>, Error> {
        let rows = users::table
            .select(User::as_select())
            .order(users::id.asc())
            .load(self.connection())?;
        Ok(rows)
    }

    // ── Carts ────────────────────────────────────────────────────

    pub fn insert_cart(&mut self, cart: &NewCart) -> Result<i32, Error> {
        let id = diesel::insert_into(carts::table)
            .values(cart)
            .returning(carts::id)
            .get_result(self.connection())?;
        Ok(id)
    }

    pub fn get_cart(&mut self, cart_id: i32) -> Result<Option<Cart>, Error> {
        let cart = carts::table
            .find(cart_id)
            .select(Cart::as_select())
            .first(self.connection())
            .optional()?;
        Ok(cart)
    }

    // ── Cart Items ───────────────────────────────────────────────

    /// Insert all items in one transaction; a unique-index violation on
    /// `(cart_id, name)` rolls back the whole batch.
    pub fn insert_cart_items(&mut self, items: &[NewCartItem]) -> Result<usize, Error> {
        let count = self.connection().transaction::<_, Error, _>(|conn| {
            let mut count = 0;
            for item in items {
                count += diesel::insert_into(cart_items::table)
                    .values(item)
                    .execute(conn)?;
            }
            Ok(count)
        })?;
        Ok(count)
    }

    /// Insert a cart and its items in one transaction. Each item's `cart_id`
    /// is set to the new cart, and the cart's total and quantity are the sums
    /// over its items. Returns the new cart id.
    pub fn insert_cart_with_items(
        &mut self,
        cart: &NewCart,
        items: &mut [NewCartItem],
    ) -> Result<i32, Error> {
        let now = chrono::Utc::now().naive_utc();
        self.connection().transaction::<_, Error, _>(|conn| {
            let cart_id: i32 = diesel::insert_into(carts::table)
                .values(cart)
                .returning(carts::id)
                .get_result(conn)?;

            for item in items.iter_mut() {
                item.cart_id = cart_id;
                diesel::insert_into(cart_items::table)
                    .values(&*item)
                    .execute(conn)?;
            }

            let total: f64 = items.iter().map(|i| i.charged).sum();
            let quantity: i32 = items.iter().map(|i| i.quantity).sum();
            diesel::update(carts::table.find(cart_id))
                .set((
                    carts::total.eq(total),
                    carts::quantity.eq(quantity),
                    carts::updated_at.eq(now),
                ))
                .execute(conn)?;
            Ok(cart_id)
        })
    }

    pub fn get_cart_items(&mut self, cart_id: i32) -> Result<Vec<CartItem>, Error> {
        let items = cart_items::table
            .filter(cart_items::cart_id.eq(cart_id))
            .select(CartItem::as_select())
            .order(cart_items::id.asc())
            .load(self.connection())?;
        Ok(items)
    }

    // ── Analysis ─────────────────────────────────────────────────

    /// Every item of every CLOSED cart, in insertion order.
    ///
    /// Equivalent to:
    /// `SELECT ci.cart_id, ci.name, ci.price, ci.charged, ci.quantity, ci.offer_type,
    ///         ci.created_at, c.status
    ///  FROM cart_items ci JOIN carts c ON ci.cart_id = c.id
    ///  WHERE c.status = 'CLOSED'`
    pub fn load_closed_sales(&mut self) -> Result<Vec<SaleRecord>, Error> {
        let records = cart_items::table
            .inner_join(carts::table)
            .filter(carts::status.eq(CartStatus::Closed))
            .select((
                cart_items::cart_id,
                cart_items::name,
                cart_items::price,
                cart_items::charged,
                cart_items::quantity,
                cart_items::offer_type,
                cart_items::created_at,
                carts::status,
            ))
            .order(cart_items::id.asc())
            .load::<SaleRecord>(self.connection())?;
        debug!("Loaded {} sale records from closed carts", records.len());
        Ok(records)
    }

    pub fn count_rows(&mut self) -> Result<TableCounts, Error> {
        let conn = self.connection();
        Ok(TableCounts {
            users: users::table.count().get_result(conn)?,
            carts: carts::table.count().get_result(conn)?,
            cart_items: cart_items::table.count().get_result(conn)?,
        })
    }
}
