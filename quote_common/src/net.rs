//! Remote endpoint and timing defaults shared by the engine and the CLI.

/// Remote quote source. GET returns a JSON array of posts, POST mirrors a local quote.
pub const SERVER_URL: &str = "https://jsonplaceholder.typicode.com/posts";
/// Maximum number of remote items taken from one fetch.
pub const REMOTE_BATCH_LIMIT: usize = 10;
/// Seconds between two scheduled sync cycles.
pub const SYNC_INTERVAL_SECS: u64 = 20;
/// Seconds after which a remote request is abandoned.
pub const REQUEST_TIMEOUT_SECS: u64 = 8;
/// Seconds a "new quotes arrived" notice stays visible.
pub const NOTICE_SECS: u64 = 3;
/// Key of the persistence slot holding the collection.
pub const QUOTES_SLOT: &str = "quotes";
