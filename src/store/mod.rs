//! The shared matching store.
//!
//! [`MatchStore`] holds the sample catalog, the growing collection of matched
//! documents, the unmatched set, and the [`MatchIndex`] derived from the
//! matched collection. It is the only shared mutable state in the crate and
//! behaves as a monitor: one operation at a time, each atomic.
//!
//! ## Record identity
//!
//! Documents have no identity of their own, so the store tags every entry
//! with a [`RecordId`]. Reconciliation reads a snapshot, scores outside the
//! lock, and then targets the records it read by id. If a concurrent sweep got
//! there first the mutation reports [`StoreOutcome::Stale`] and changes
//! nothing.
//!
//! [`MatchStore`]: match_store::MatchStore
//! [`MatchIndex`]: index::MatchIndex
//! [`StoreOutcome::Stale`]: match_store::StoreOutcome::Stale
//! [`RecordId`]: crate::core::types::RecordId

pub mod index;
pub mod match_store;
