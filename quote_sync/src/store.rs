//! Record store: the authoritative in-process quote collection.
//!
//! The store keeps the collection in memory, in insertion order, and mirrors every
//! mutation to a persistence [`Slot`] by writing the whole collection as a JSON array.
//! Reading the slot fails soft: a missing or unparsable slot yields an empty collection.
//!
//! Design notes:
//! - Mutations persist first and commit in memory second, so a failed write leaves both
//!   the slot and the in-memory collection as they were.
//! - The store is not synchronized; it is shared as [`SharedStore`].
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use log::{debug, warn};
use quote_common::record::timestamp_id;
use quote_common::{QuoteRecord, Result, SyncError};

/// Store shared between the scheduler thread, the add path and mirror threads.
pub type SharedStore = Arc<Mutex<RecordStore>>;

/// A persistent key-value slot holding one serialized collection.
pub trait Slot: Send {
    /// Returns the slot contents, or `None` when nothing was ever written.
    fn read(&self) -> Result<Option<String>>;
    /// Overwrites the slot contents.
    fn write(&mut self, contents: &str) -> Result<()>;
}

/// Slot stored as `<dir>/<key>.json`.
pub struct FileSlot {
    path: PathBuf,
}

impl FileSlot {
    /// Creates a slot for `key` inside `dir`. The directory is created on first write.
    pub fn new(dir: impl AsRef<Path>, key: &str) -> Self {
        Self {
            path: dir.as_ref().join(format!("{}.json", key)),
        }
    }

    /// Location of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Slot for FileSlot {
    fn read(&self) -> Result<Option<String>> {
        if !self.path.is_file() {
            return Ok(None);
        }
        Ok(Some(fs::read_to_string(&self.path)?))
    }

    fn write(&mut self, contents: &str) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)?;
        }
        // Rename over the target so readers never see a half-written collection.
        let tmp = self.path.with_extension("json.tmp");
        {
            let mut file = fs::File::create(&tmp)?;
            file.write_all(contents.as_bytes())?;
            file.sync_all()?;
        }
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

/// In-process slot. Clones share the same contents.
#[derive(Clone, Default)]
pub struct MemorySlot {
    contents: Arc<Mutex<Option<String>>>,
}

impl MemorySlot {
    /// Creates an empty slot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a slot that already holds `contents`.
    pub fn with_contents(contents: &str) -> Self {
        Self {
            contents: Arc::new(Mutex::new(Some(contents.to_string()))),
        }
    }

    /// Current raw contents.
    pub fn contents(&self) -> Option<String> {
        self.contents.lock().ok().and_then(|c| c.clone())
    }
}

impl Slot for MemorySlot {
    fn read(&self) -> Result<Option<String>> {
        Ok(self.contents.lock()?.clone())
    }

    fn write(&mut self, contents: &str) -> Result<()> {
        *self.contents.lock()? = Some(contents.to_string());
        Ok(())
    }
}

/// The quote collection and its persistence slot.
pub struct RecordStore {
    records: Vec<QuoteRecord>,
    slot: Box<dyn Slot>,
}

impl RecordStore {
    /// Opens a store over `slot` and loads whatever it holds.
    pub fn open(slot: impl Slot + 'static) -> Self {
        let mut store = Self {
            records: Vec::new(),
            slot: Box::new(slot),
        };
        store.load();
        store
    }

    /// Opens a store and wraps it for sharing.
    pub fn shared(slot: impl Slot + 'static) -> SharedStore {
        Arc::new(Mutex::new(Self::open(slot)))
    }

    /// Reloads the collection from the slot.
    ///
    /// An absent or corrupt slot yields an empty collection; the problem is logged, never
    /// returned.
    pub fn load(&mut self) -> &[QuoteRecord] {
        self.records = match self.slot.read() {
            Ok(Some(raw)) => match serde_json::from_str::<Vec<QuoteRecord>>(&raw) {
                Ok(records) => records,
                Err(e) => {
                    warn!("Stored quotes are corrupt, starting empty: {}", e);
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!("Failed to read stored quotes, starting empty: {}", e);
                Vec::new()
            }
        };
        debug!("Loaded {} quotes", self.records.len());
        &self.records
    }

    /// Swaps in `records` and persists them, overwriting any prior state.
    pub fn replace(&mut self, records: Vec<QuoteRecord>) -> Result<()> {
        self.persist(&records)?;
        self.records = records;
        Ok(())
    }

    /// Appends one record and persists the full collection.
    ///
    /// A record whose id is already stored is rejected and nothing is written.
    pub fn append(&mut self, record: QuoteRecord) -> Result<()> {
        if self.contains(record.id) {
            return Err(SyncError::DuplicateId(record.id));
        }
        let mut records = self.records.clone();
        records.push(record);
        self.replace(records)
    }

    /// The current collection in insertion order.
    pub fn all(&self) -> &[QuoteRecord] {
        &self.records
    }

    /// Whether a record with `id` is known.
    pub fn contains(&self, id: u64) -> bool {
        self.records.iter().any(|r| r.id == id)
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the collection is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Allocates an id for a new local record.
    ///
    /// Derived from the current time and bumped past every known id, so successive calls
    /// on a store that keeps the results are strictly increasing. Fails once the largest
    /// stored id is `u64::MAX`.
    pub fn next_id(&self) -> Result<u64> {
        let max_known = self.records.iter().map(|r| r.id).max().unwrap_or(0);
        let above = max_known
            .checked_add(1)
            .ok_or(SyncError::IdsExhausted(max_known))?;
        Ok(timestamp_id().max(above))
    }

    fn persist(&mut self, records: &[QuoteRecord]) -> Result<()> {
        let json = serde_json::to_string(records)?;
        self.slot.write(&json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FailingSlot;

    impl Slot for FailingSlot {
        fn read(&self) -> Result<Option<String>> {
            Ok(None)
        }

        fn write(&mut self, _contents: &str) -> Result<()> {
            Err(std::io::Error::other("disk full").into())
        }
    }

    #[test]
    fn absent_slot_loads_empty() {
        let store = RecordStore::open(MemorySlot::new());
        assert!(store.is_empty());
    }

    #[test]
    fn corrupt_slot_loads_empty() {
        let store = RecordStore::open(MemorySlot::with_contents("not json"));
        assert!(store.all().is_empty());
    }

    #[test]
    fn append_persists_whole_collection() {
        let slot = MemorySlot::new();
        let mut store = RecordStore::open(slot.clone());
        store.append(QuoteRecord::new(1, "A", "Life")).unwrap();
        store.append(QuoteRecord::new(2, "B", "Work")).unwrap();

        let reopened = RecordStore::open(slot.clone());
        assert_eq!(reopened.all(), store.all());
        assert_eq!(reopened.len(), 2);
    }

    #[test]
    fn replace_overwrites_prior_state() {
        let slot = MemorySlot::new();
        let mut store = RecordStore::open(slot.clone());
        store.append(QuoteRecord::new(1, "A", "Life")).unwrap();
        store.replace(vec![QuoteRecord::new(9, "Z", "Server")]).unwrap();

        assert!(!store.contains(1));
        assert!(RecordStore::open(slot).contains(9));
    }

    #[test]
    fn failed_write_leaves_memory_unchanged() {
        let mut store = RecordStore::open(FailingSlot);
        assert!(store.append(QuoteRecord::new(1, "A", "Life")).is_err());
        assert!(store.is_empty());
    }

    #[test]
    fn next_id_is_past_every_known_id() {
        let mut store = RecordStore::open(MemorySlot::new());
        store.append(QuoteRecord::new(u64::MAX / 2, "A", "Life")).unwrap();
        let id = store.next_id().unwrap();
        assert!(id > u64::MAX / 2);
        store.append(QuoteRecord::new(id, "B", "Life")).unwrap();
        assert!(store.next_id().unwrap() > id);
    }

    #[test]
    fn next_id_fails_instead_of_repeating_the_largest_id() {
        let mut store = RecordStore::open(MemorySlot::new());
        store.append(QuoteRecord::new(u64::MAX, "A", "Life")).unwrap();
        assert!(matches!(store.next_id(), Err(SyncError::IdsExhausted(u64::MAX))));
    }

    #[test]
    fn append_rejects_a_known_id() {
        let slot = MemorySlot::new();
        let mut store = RecordStore::open(slot.clone());
        store.append(QuoteRecord::new(7, "A", "Life")).unwrap();
        let before = slot.contents();

        let err = store.append(QuoteRecord::new(7, "B", "Work")).unwrap_err();
        assert!(matches!(err, SyncError::DuplicateId(7)));
        assert_eq!(store.len(), 1);
        assert_eq!(slot.contents(), before);
    }

    #[test]
    fn file_slot_round_trips_and_reports_absence() {
        let dir = tempfile::tempdir().unwrap();
        let mut slot = FileSlot::new(dir.path().join("data"), "quotes");
        assert!(slot.read().unwrap().is_none());
        slot.write("[]").unwrap();
        assert_eq!(slot.read().unwrap().as_deref(), Some("[]"));
        assert!(slot.path().ends_with("data/quotes.json"));
    }
}
