//! Reconciliation sweeps run after a new match is saved.
//!
//! - The **unmatched sweep** asks whether the new match also explains a
//!   document that matched nothing before. Each unmatched document is scored
//!   against the new match only.
//! - The **rematch sweep** asks whether the new match is a better home for a
//!   document that is already matched. A strictly higher score replaces the
//!   old record.
//!
//! Both sweeps read a snapshot, score outside the store lock, and take the
//! lock only for each discrete mutation. A record that vanished in between is
//! counted as stale and skipped.

use std::sync::Arc;

use serde::Serialize;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::core::types::MatchedDocument;
use crate::matching::scoring::LeafBag;
use crate::store::match_store::{MatchStore, StoreOutcome};

/// What one sweep did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SweepReport {
    /// Records scored
    pub examined: usize,
    /// Records moved or replaced
    pub changed: usize,
    /// Mutations skipped because the record was already gone
    pub stale: usize,
}

impl SweepReport {
    fn record(&mut self, outcome: StoreOutcome) {
        match outcome {
            StoreOutcome::Applied(_) => self.changed += 1,
            StoreOutcome::Stale => self.stale += 1,
        }
    }
}

/// Handles to the two background sweeps of one match
pub struct ReconcileHandles {
    pub unmatched: JoinHandle<SweepReport>,
    pub rematch: JoinHandle<SweepReport>,
}

impl ReconcileHandles {
    /// Wait for both sweeps. A panicked sweep reports as empty.
    pub async fn join(self) -> (SweepReport, SweepReport) {
        let unmatched = self.unmatched.await.unwrap_or_else(|e| {
            warn!("Unmatched sweep did not complete: {e}");
            SweepReport::default()
        });
        let rematch = self.rematch.await.unwrap_or_else(|e| {
            warn!("Rematch sweep did not complete: {e}");
            SweepReport::default()
        });
        (unmatched, rematch)
    }
}

/// Runs reconciliation sweeps against a shared store
#[derive(Debug, Clone)]
pub struct Reconciler {
    store: Arc<MatchStore>,
}

impl Reconciler {
    pub fn new(store: Arc<MatchStore>) -> Self {
        Self { store }
    }

    /// Move every unmatched document that scores above zero against
    /// `new_match` into the matched collection under `new_match`'s sample.
    pub fn sweep_unmatched(&self, new_match: &MatchedDocument) -> SweepReport {
        let target = LeafBag::new(new_match.document.as_value());
        let mut report = SweepReport::default();

        for entry in self.store.unmatched() {
            report.examined += 1;

            let score = LeafBag::new(entry.document.as_value()).score_against(&target);
            if score == 0 {
                continue;
            }

            let digest = entry.document.digest();
            let promoted = MatchedDocument::new(new_match.sample_id.clone(), score, entry.document);
            match self.store.promote_unmatched(entry.id, promoted) {
                Ok(outcome) => {
                    if outcome.is_applied() {
                        debug!(
                            "Rescued unmatched document {} ({digest}) into sample {} with score {score}",
                            entry.id, new_match.sample_id
                        );
                    } else {
                        debug!("Unmatched document {} already claimed", entry.id);
                    }
                    report.record(outcome);
                }
                Err(e) => warn!("Could not promote unmatched document {}: {e}", entry.id),
            }
        }

        report
    }

    /// Replace every matched record whose score against `new_match` is
    /// strictly higher than its recorded score. The record that was just
    /// saved is included.
    pub fn sweep_matched(&self, new_match: &MatchedDocument) -> SweepReport {
        let target = LeafBag::new(new_match.document.as_value());
        let mut report = SweepReport::default();

        for record in self.store.matched() {
            report.examined += 1;

            let score = LeafBag::new(record.matched.document.as_value()).score_against(&target);
            if score <= record.matched.match_score {
                continue;
            }

            let previous_sample = record.matched.sample_id;
            let previous_score = record.matched.match_score;
            let replacement =
                MatchedDocument::new(new_match.sample_id.clone(), score, record.matched.document);
            match self.store.replace_match(record.id, replacement) {
                Ok(outcome) => {
                    if outcome.is_applied() {
                        debug!(
                            "Rematched document {} from sample {previous_sample} ({previous_score}) to sample {} ({score})",
                            record.id, new_match.sample_id
                        );
                    } else {
                        debug!("Matched document {} already replaced", record.id);
                    }
                    report.record(outcome);
                }
                Err(e) => warn!("Could not replace matched document {}: {e}", record.id),
            }
        }

        report
    }

    /// Run both sweeps on the calling thread
    pub fn reconcile(&self, new_match: &MatchedDocument) -> (SweepReport, SweepReport) {
        let unmatched = self.sweep_unmatched(new_match);
        let rematch = self.sweep_matched(new_match);
        log_reports(&unmatched, &rematch);
        (unmatched, rematch)
    }

    /// Hand both sweeps to the runtime's blocking pool.
    ///
    /// The sweeps are independent units with no ordering between them or
    /// against sweeps spawned for other matches. Must be called from within a
    /// tokio runtime.
    pub fn spawn(&self, new_match: MatchedDocument) -> ReconcileHandles {
        let new_match = Arc::new(new_match);

        let unmatched = {
            let reconciler = self.clone();
            let new_match = Arc::clone(&new_match);
            tokio::task::spawn_blocking(move || {
                let report = reconciler.sweep_unmatched(&new_match);
                debug!(?report, "Unmatched sweep finished");
                report
            })
        };

        let rematch = {
            let reconciler = self.clone();
            tokio::task::spawn_blocking(move || {
                let report = reconciler.sweep_matched(&new_match);
                debug!(?report, "Rematch sweep finished");
                report
            })
        };

        ReconcileHandles { unmatched, rematch }
    }
}

fn log_reports(unmatched: &SweepReport, rematch: &SweepReport) {
    debug!(
        "Reconciled: {} of {} unmatched rescued, {} of {} matched improved, {} stale",
        unmatched.changed,
        unmatched.examined,
        rematch.changed,
        rematch.examined,
        unmatched.stale + rematch.stale
    );
}
