use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;
use thiserror::Error;

use crate::catalog::store::SampleCatalog;
use crate::core::document::Document;
use crate::core::types::{MatchedDocument, RecordId, SampleId};
use crate::store::index::MatchIndex;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Match refers to unknown sample: {0}")]
    UnknownSample(SampleId),
}

/// A matched document as held by the store
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchRecord {
    pub id: RecordId,

    #[serde(flatten)]
    pub matched: MatchedDocument,
}

/// A document that matched nothing at its last evaluation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnmatchedRecord {
    pub id: RecordId,
    pub document: Document,
}

/// Result of a mutation that targets an existing record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOutcome {
    /// The mutation happened; carries the id of the newly written record
    Applied(RecordId),
    /// The targeted record was already gone; nothing changed
    Stale,
}

impl StoreOutcome {
    #[must_use]
    pub fn is_applied(self) -> bool {
        matches!(self, Self::Applied(_))
    }
}

/// Record counts at one instant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StoreStats {
    pub samples: usize,
    pub matched: usize,
    pub unmatched: usize,
}

/// The whole store at one instant
#[derive(Debug, Clone)]
pub struct StoreSnapshot {
    pub matched: Vec<MatchRecord>,
    pub unmatched: Vec<UnmatchedRecord>,
    pub index: MatchIndex,
}

#[derive(Debug, Default)]
struct StoreState {
    next_id: u64,
    matched: Vec<MatchRecord>,
    unmatched: Vec<UnmatchedRecord>,
    index: MatchIndex,
}

impl StoreState {
    fn allocate_id(&mut self) -> RecordId {
        let id = RecordId(self.next_id);
        self.next_id += 1;
        id
    }

    fn push_match(&mut self, matched: MatchedDocument) -> RecordId {
        let id = self.allocate_id();
        self.index
            .insert(matched.sample_id.clone(), id, matched.document.clone());
        self.matched.push(MatchRecord { id, matched });
        id
    }

    fn take_match(&mut self, id: RecordId) -> Option<MatchRecord> {
        let pos = self.matched.iter().position(|r| r.id == id)?;
        let record = self.matched.remove(pos);
        self.index.remove(&record.matched.sample_id, id);
        Some(record)
    }

    fn take_unmatched(&mut self, id: RecordId) -> Option<UnmatchedRecord> {
        let pos = self.unmatched.iter().position(|r| r.id == id)?;
        Some(self.unmatched.remove(pos))
    }

    fn index_matches_records(&self) -> bool {
        self.index == MatchIndex::from_records(&self.matched)
    }
}

/// The shared store of samples, matched documents, and unmatched documents.
///
/// Every operation takes a single lock for its whole duration, so each call
/// is atomic and never observes a half-applied mutation. A sequence of calls
/// is not atomic: a record read by one call may be gone by the next, which is
/// why mutations that target a record report [`StoreOutcome::Stale`] instead
/// of failing.
///
/// Samples live outside the lock; they never change after construction.
#[derive(Debug)]
pub struct MatchStore {
    catalog: Arc<SampleCatalog>,
    state: Mutex<StoreState>,
}

impl MatchStore {
    pub fn new(catalog: Arc<SampleCatalog>) -> Self {
        Self {
            catalog,
            state: Mutex::new(StoreState::default()),
        }
    }

    /// The fixed sample set
    pub fn samples(&self) -> &SampleCatalog {
        &self.catalog
    }

    fn check_sample(&self, sample_id: &SampleId) -> Result<(), StoreError> {
        if self.catalog.contains(sample_id) {
            Ok(())
        } else {
            Err(StoreError::UnknownSample(sample_id.clone()))
        }
    }

    /// File a document as unmatched
    pub fn add_unmatched(&self, document: Document) -> RecordId {
        let mut state = self.state.lock();
        let id = state.allocate_id();
        state.unmatched.push(UnmatchedRecord { id, document });
        id
    }

    /// Remove an unmatched document. Removing one that is already gone is a no-op.
    pub fn remove_unmatched(&self, id: RecordId) -> StoreOutcome {
        let mut state = self.state.lock();
        match state.take_unmatched(id) {
            Some(_) => StoreOutcome::Applied(id),
            None => StoreOutcome::Stale,
        }
    }

    /// Append a matched document and index it
    ///
    /// # Errors
    ///
    /// Returns `StoreError::UnknownSample` if the match names a sample that is
    /// not in the catalog.
    pub fn save_match(&self, matched: MatchedDocument) -> Result<RecordId, StoreError> {
        self.check_sample(&matched.sample_id)?;

        let mut state = self.state.lock();
        let id = state.push_match(matched);
        debug_assert!(state.index_matches_records());
        Ok(id)
    }

    /// Move an unmatched document into the matched collection in one step.
    ///
    /// If the unmatched entry is already gone (claimed by a concurrent sweep)
    /// nothing is written and [`StoreOutcome::Stale`] is returned.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::UnknownSample` if the match names a sample that is
    /// not in the catalog.
    pub fn promote_unmatched(
        &self,
        id: RecordId,
        matched: MatchedDocument,
    ) -> Result<StoreOutcome, StoreError> {
        self.check_sample(&matched.sample_id)?;

        let mut state = self.state.lock();
        if state.take_unmatched(id).is_none() {
            return Ok(StoreOutcome::Stale);
        }
        let new_id = state.push_match(matched);
        debug_assert!(state.index_matches_records());
        Ok(StoreOutcome::Applied(new_id))
    }

    /// Replace a matched record with a new one: the old record is removed and
    /// the new one appended, both under the same lock.
    ///
    /// If the old record is already gone (replaced by a concurrent sweep)
    /// nothing is written and [`StoreOutcome::Stale`] is returned.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::UnknownSample` if the replacement names a sample
    /// that is not in the catalog.
    pub fn replace_match(
        &self,
        id: RecordId,
        replacement: MatchedDocument,
    ) -> Result<StoreOutcome, StoreError> {
        self.check_sample(&replacement.sample_id)?;

        let mut state = self.state.lock();
        if state.take_match(id).is_none() {
            return Ok(StoreOutcome::Stale);
        }
        let new_id = state.push_match(replacement);
        debug_assert!(state.index_matches_records());
        Ok(StoreOutcome::Applied(new_id))
    }

    /// Snapshot of the matched collection, in stored order
    pub fn matched(&self) -> Vec<MatchRecord> {
        self.state.lock().matched.clone()
    }

    /// Snapshot of the unmatched set, in stored order
    pub fn unmatched(&self) -> Vec<UnmatchedRecord> {
        self.state.lock().unmatched.clone()
    }

    /// Snapshot of the match index
    pub fn index(&self) -> MatchIndex {
        self.state.lock().index.clone()
    }

    /// Matched records, unmatched records, and index taken under the same lock
    pub fn snapshot(&self) -> StoreSnapshot {
        let state = self.state.lock();
        StoreSnapshot {
            matched: state.matched.clone(),
            unmatched: state.unmatched.clone(),
            index: state.index.clone(),
        }
    }

    pub fn stats(&self) -> StoreStats {
        let state = self.state.lock();
        StoreStats {
            samples: self.catalog.len(),
            matched: state.matched.len(),
            unmatched: state.unmatched.len(),
        }
    }

    /// Check that the index equals the grouping of the matched collection
    pub fn index_is_consistent(&self) -> bool {
        self.state.lock().index_matches_records()
    }
}
