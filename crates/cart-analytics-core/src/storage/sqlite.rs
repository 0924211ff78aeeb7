use super::schema::{cart_items, carts, users};
use crate::error::Error;
use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use tracing::debug;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// The single connection used for a run. Opened explicitly by the caller and
/// passed down by reference; dropping it closes the connection.
pub struct Database {
    conn: SqliteConnection,
}

impl Database {
    pub fn open(url: &str) -> Result<Self, Error> {
        let conn = SqliteConnection::establish(url)?;
        let mut db = Database { conn };
        db.configure_pragmas()?;
        db.run_migrations()?;
        debug!("Opened database '{}'", url);
        Ok(db)
    }

    pub fn open_in_memory() -> Result<Self, Error> {
        Self::open(":memory:")
    }

    fn configure_pragmas(&mut self) -> Result<(), Error> {
        self.conn.batch_execute(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;
             PRAGMA foreign_keys = ON;
             PRAGMA busy_timeout = 5000;",
        )?;
        debug!("SQLite pragmas configured (WAL mode, foreign keys on)");
        Ok(())
    }

    fn run_migrations(&mut self) -> Result<(), Error> {
        let applied = self
            .conn
            .run_pending_migrations(MIGRATIONS)
            .map_err(|e| Error::Migration(e.to_string()))?;
        debug!("{} pending migrations applied", applied.len());
        Ok(())
    }

    pub fn connection(&mut self) -> &mut SqliteConnection {
        &mut self.conn
    }

    /// Delete every row, children first. Returns the number of rows removed.
    pub fn truncate_all(&mut self) -> Result<usize, Error> {
        let removed = self.conn.transaction::<_, Error, _>(|conn| {
            let item_rows = diesel::delete(cart_items::table).execute(conn)?;
            let cart_rows = diesel::delete(carts::table).execute(conn)?;
            let user_rows = diesel::delete(users::table).execute(conn)?;
            Ok(item_rows + cart_rows + user_rows)
        })?;
        debug!("All tables truncated ({} rows)", removed);
        Ok(removed)
    }

    pub fn close(self) {
        debug!("Closing database connection");
        drop(self.conn);
    }
}
