//! SQLite backend for the compliance tracker's table store.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. Every operation runs in its own
//! transaction, so row shifts never leave a table half-renumbered.

mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;
