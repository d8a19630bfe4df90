//! Caller-facing operations over the record store.
//!
//! The add path validates input, stores and persists the new quote, then mirrors it to
//! the remote source on a detached thread and asks the scheduler for a sync. The remaining
//! operations are read-side helpers (categories, random pick, export) and a JSON import
//! that goes through the merge engine like a remote batch does.
use std::io::{Read, Write};
use std::sync::Arc;
use std::thread::JoinHandle;

use crossbeam_channel::Sender;
use log::{debug, info};
use quote_common::record::{DEFAULT_QUOTES, RecordParser, validate_input};
use quote_common::{QuoteRecord, Result, SyncError};
use rand::Rng;

use crate::gateway::{RemoteGateway, spawn_post};
use crate::merge::merge;
use crate::store::SharedStore;

/// Category filter value meaning "every category".
pub const ALL_CATEGORIES: &str = "all";

/// A quote accepted by [`QuoteService::add_quote`].
pub struct AddedQuote {
    /// The stored record.
    pub record: QuoteRecord,
    /// The detached remote mirror. Dropping it leaves the mirror running.
    pub mirror: JoinHandle<()>,
}

/// Add path and read-side helpers over a shared store.
pub struct QuoteService {
    store: SharedStore,
    gateway: Arc<dyn RemoteGateway>,
    sync_trigger: Option<Sender<()>>,
}

impl QuoteService {
    /// Creates a service over `store` that mirrors new quotes through `gateway`.
    pub fn new(store: SharedStore, gateway: Arc<dyn RemoteGateway>) -> Self {
        Self {
            store,
            gateway,
            sync_trigger: None,
        }
    }

    /// Requests a sync through `trigger` after every successful add.
    pub fn with_sync_trigger(mut self, trigger: Sender<()>) -> Self {
        self.sync_trigger = Some(trigger);
        self
    }

    /// The underlying store.
    pub fn store(&self) -> &SharedStore {
        &self.store
    }

    /// Validates, stores and mirrors a new quote.
    ///
    /// Rejected input leaves the store untouched. The remote mirror is best-effort and
    /// cannot fail or revert the add.
    pub fn add_quote(&self, text: &str, category: &str) -> Result<AddedQuote> {
        let (text, category) = validate_input(text, category)?;
        let record = {
            let mut store = self.store.lock()?;
            let record = QuoteRecord::new(store.next_id()?, text, category);
            store.append(record.clone())?;
            record
        };
        info!("Quote {} added in category {}", record.id, record.category);

        let mirror = spawn_post(Arc::clone(&self.gateway), record.clone());
        if let Some(trigger) = &self.sync_trigger {
            // A stopped scheduler just means no follow-up sync.
            let _ = trigger.try_send(());
        }
        Ok(AddedQuote { record, mirror })
    }

    /// Appends the default quotes when the store is empty. Returns how many were added.
    pub fn seed_defaults(&self) -> Result<usize> {
        let mut store = self.store.lock()?;
        if !store.is_empty() {
            return Ok(0);
        }
        for (text, category) in DEFAULT_QUOTES {
            let record = QuoteRecord::new(store.next_id()?, text, category);
            store.append(record)?;
        }
        debug!("Seeded {} default quotes", DEFAULT_QUOTES.len());
        Ok(DEFAULT_QUOTES.len())
    }

    /// A copy of the whole collection in insertion order.
    pub fn all(&self) -> Result<Vec<QuoteRecord>> {
        Ok(self.store.lock()?.all().to_vec())
    }

    /// `"all"` followed by every distinct category in first-seen order.
    pub fn categories(&self) -> Result<Vec<String>> {
        let store = self.store.lock()?;
        let mut categories = vec![ALL_CATEGORIES.to_string()];
        for record in store.all() {
            if !categories.iter().skip(1).any(|c| c == &record.category) {
                categories.push(record.category.clone());
            }
        }
        Ok(categories)
    }

    /// A random quote, restricted to `category` unless it is `None` or `"all"`.
    ///
    /// Returns `None` when no quote matches.
    pub fn random_quote(&self, category: Option<&str>) -> Result<Option<QuoteRecord>> {
        let store = self.store.lock()?;
        let matching: Vec<&QuoteRecord> = match category {
            None | Some(ALL_CATEGORIES) => store.all().iter().collect(),
            Some(category) => store
                .all()
                .iter()
                .filter(|r| r.category == category)
                .collect(),
        };
        if matching.is_empty() {
            return Ok(None);
        }
        let mut rng = rand::rng();
        let index = rng.random_range(0..matching.len());
        Ok(Some(matching[index].clone()))
    }

    /// Writes the collection as a pretty-printed JSON array.
    pub fn export_json<W: Write>(&self, writer: W) -> Result<()> {
        let store = self.store.lock()?;
        serde_json::to_writer_pretty(writer, store.all())?;
        Ok(())
    }

    /// Folds a JSON array of records into the store. Known ids are skipped.
    ///
    /// Text and category are trimmed like on the add path. Returns how many records were
    /// added. Malformed input, or any record with a blank text or category, changes
    /// nothing.
    pub fn import_json<R: Read>(&self, reader: R) -> Result<usize> {
        let imported = QuoteRecord::parse_from_reader(reader)?
            .into_iter()
            .map(|record| -> Result<QuoteRecord> {
                let (text, category) = validate_input(&record.text, &record.category)
                    .map_err(|e| SyncError::Validation(format!("Quote {}: {}", record.id, e)))?;
                Ok(QuoteRecord::new(record.id, text, category))
            })
            .collect::<Result<Vec<_>>>()?;
        let mut store = self.store.lock()?;
        let outcome = merge(store.all(), &imported);
        if outcome.has_additions() {
            store.replace(outcome.records)?;
        }
        info!("Imported {} of {} quotes", outcome.added, imported.len());
        Ok(outcome.added)
    }
}
