//! Merge engine: local-preserving, remote-additive reconciliation.
//!
//! Local records are never discarded or overwritten. A remote record is appended only when
//! no record with the same id is already present in the merged set, which is checked
//! against the set as it grows, so an id repeated inside one batch is inserted once.
//! On an id collision the local record wins regardless of content.
use std::collections::HashSet;

use log::debug;
use quote_common::QuoteRecord;

/// Result of one merge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeOutcome {
    /// Local records followed by the newly-introduced remote records.
    pub records: Vec<QuoteRecord>,
    /// How many remote records were new.
    pub added: usize,
}

impl MergeOutcome {
    /// Whether the merge introduced anything.
    pub fn has_additions(&self) -> bool {
        self.added > 0
    }
}

/// Folds `remote` into `local`.
pub fn merge(local: &[QuoteRecord], remote: &[QuoteRecord]) -> MergeOutcome {
    let mut known: HashSet<u64> = local.iter().map(|r| r.id).collect();
    let mut records = local.to_vec();
    let mut added = 0;

    for record in remote {
        if known.insert(record.id) {
            records.push(record.clone());
            added += 1;
        } else {
            debug!("Skipping remote quote {}: id already known", record.id);
        }
    }

    MergeOutcome { records, added }
}
