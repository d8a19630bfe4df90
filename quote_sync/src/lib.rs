//! Quote synchronization engine.
//!
//! Keeps a locally-owned quote collection, periodically reconciles it with a remote
//! quote source and reports when the remote side contributed new quotes. The pieces:
//!
//! - `store`: `RecordStore`, the authoritative collection, persisted wholesale to a slot.
//! - `gateway`: `RemoteGateway` capability and its HTTP implementation.
//! - `merge`: local-preserving, remote-additive merge.
//! - `scheduler`: `SyncScheduler`, periodic and on-demand merge cycles, one at a time.
//! - `notifier`: `ChangeNotifier` observers for cycles that added quotes.
//! - `service`: `QuoteService`, the add path and read-side helpers.
#![warn(missing_docs)]
pub mod gateway;
pub mod merge;
pub mod notifier;
pub mod scheduler;
pub mod service;
pub mod store;

pub use gateway::{HttpGateway, RemoteGateway};
pub use merge::{MergeOutcome, merge};
pub use notifier::{ChangeNotifier, LogNotifier, TransientNotifier};
pub use scheduler::{SchedulerHandle, SyncOutcome, SyncScheduler};
pub use service::QuoteService;
pub use store::{FileSlot, MemorySlot, RecordStore, SharedStore};
