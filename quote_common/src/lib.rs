//!
//! Common types and utilities shared by the sync engine and the command line client.
//!
//! This crate aggregates:
//! - `error`: unified error type `SyncError` used across the workspace.
//! - `result`: handy `Result<T, SyncError>` alias.
//! - `record`: the `QuoteRecord` model, input validation and default quotes.
//! - `state`: the scheduler's `SyncState`.
//! - `net`: remote endpoint and timing defaults.
#![warn(missing_docs)]
pub mod error;
pub mod net;
pub mod record;
pub mod result;
pub mod state;

pub use error::SyncError;
pub use record::QuoteRecord;
pub use result::Result;
pub use state::SyncState;
