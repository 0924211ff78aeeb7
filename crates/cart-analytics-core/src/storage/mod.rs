pub mod models;
mod queries;
pub mod schema;
mod sqlite;

pub use sqlite::{Database, MIGRATIONS};
