//! SQLite backend for the Thoughts Radar store.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. Uniqueness of `(date, freq)` and of
//! `(user_id, item_id)` is enforced by the schema, and every write that can
//! race goes through a single `INSERT ... ON CONFLICT` statement.

mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;
