//! Core types and pipelines for the audit tracker.
//!
//! Submissions are flattened into dynamic-schema active tables, projected
//! into a fixed-schema summary table, and later archived once resolved. The
//! tabular backend is abstracted behind [`store::TableStore`]; this crate
//! carries no HTTP or database dependencies of its own.

// Native `async fn` in traits; see the note on `TableStore`.
#![allow(async_fn_in_trait)]

pub mod archive;
pub mod config;
pub mod error;
pub mod flatten;
pub mod ingest;
pub mod lock;
pub mod memory;
pub mod notify;
pub mod path;
pub mod schema;
pub mod service;
pub mod store;
pub mod submission;
pub mod summary;
pub mod value;

pub use error::{Error, Result};
