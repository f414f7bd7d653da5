use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::core::document::Document;
use crate::core::types::{MatchedDocument, RecordId};
use crate::matching::engine::{MatchCandidate, MatchingConfig, MatchingEngine, ReconcileMode};
use crate::matching::reconcile::Reconciler;
use crate::store::index::MatchIndex;
use crate::store::match_store::{MatchStore, StoreError};
use crate::utils::validation::{validate_document, ValidationError};

#[derive(Error, Debug)]
pub enum MatchError {
    /// Nothing scored above zero; the document was filed as unmatched
    #[error("No matching sample found")]
    NoMatchFound { record_id: RecordId },

    #[error("Invalid document: {0}")]
    Invalid(#[from] ValidationError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// A successfully matched submission
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    /// Store id of the saved match
    pub record_id: RecordId,

    #[serde(flatten)]
    pub matched: MatchedDocument,
}

/// Accepts documents, matches them, and keeps the store reconciled.
///
/// This is the boundary the HTTP handlers and the CLI drive; it owns no state
/// beyond a handle to the shared store.
#[derive(Debug, Clone)]
pub struct MatchService {
    store: Arc<MatchStore>,
    reconciler: Reconciler,
    config: MatchingConfig,
}

impl MatchService {
    pub fn new(store: Arc<MatchStore>, config: MatchingConfig) -> Self {
        Self {
            reconciler: Reconciler::new(Arc::clone(&store)),
            store,
            config,
        }
    }

    pub fn store(&self) -> &Arc<MatchStore> {
        &self.store
    }

    /// Match a document and record the outcome.
    ///
    /// On success the match is saved and both reconciliation sweeps are
    /// started (or run, in [`ReconcileMode::Inline`]). Otherwise the document
    /// is filed as unmatched and `MatchError::NoMatchFound` is returned.
    ///
    /// # Errors
    ///
    /// Returns `MatchError::NoMatchFound` when nothing scores above zero,
    /// `MatchError::Invalid` if the document exceeds the input limits, or
    /// `MatchError::Store` if the store rejects the match.
    pub fn submit(&self, document: Document) -> Result<Submission, MatchError> {
        validate_document(&document)?;

        let engine = MatchingEngine::new(&self.store);
        let Some(matched) = engine.find_match(&document) else {
            let digest = document.digest();
            let record_id = self.store.add_unmatched(document);
            info!("No match for document {digest}; filed as unmatched {record_id}");
            return Err(MatchError::NoMatchFound { record_id });
        };

        let record_id = self.store.save_match(matched.clone())?;
        info!(
            "Matched document {} to sample {} with score {} ({record_id})",
            matched.document.digest(),
            matched.sample_id,
            matched.match_score
        );

        self.schedule_reconcile(matched.clone());

        Ok(Submission { record_id, matched })
    }

    fn schedule_reconcile(&self, new_match: MatchedDocument) {
        match self.config.reconcile {
            ReconcileMode::Inline => {
                self.reconciler.reconcile(&new_match);
            }
            ReconcileMode::Background => {
                if tokio::runtime::Handle::try_current().is_ok() {
                    // Fire and forget; the outcome never reaches the caller
                    drop(self.reconciler.spawn(new_match));
                } else {
                    debug!("No async runtime available; reconciling inline");
                    self.reconciler.reconcile(&new_match);
                }
            }
        }
    }

    /// Ranked targets for a document, without storing anything
    pub fn explain(&self, document: &Document, limit: usize) -> Vec<MatchCandidate> {
        MatchingEngine::new(&self.store).rank(document, limit)
    }

    /// Snapshot of the match index
    pub fn index(&self) -> MatchIndex {
        self.store.index()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::store::SampleCatalog;
    use serde_json::json;

    fn inline_service() -> MatchService {
        let store = Arc::new(MatchStore::new(Arc::new(
            SampleCatalog::load_embedded().unwrap(),
        )));
        MatchService::new(
            store,
            MatchingConfig {
                reconcile: ReconcileMode::Inline,
            },
        )
    }

    #[test]
    fn test_submit_bread_co() {
        let service = inline_service();
        let doc = Document::new(json!({"Customer Name": "Bread Co", "Invoice Amount": "0"}));

        let submission = service.submit(doc.clone()).unwrap();
        assert!(["005", "006"].contains(&submission.matched.sample_id.as_str()));
        assert!(submission.matched.match_score >= 2);

        let index = service.index();
        assert_eq!(index.documents(&submission.matched.sample_id), vec![&doc]);
    }

    #[test]
    fn test_submit_without_overlap_files_unmatched() {
        let service = inline_service();
        let doc = Document::new(json!({"animal": "okapi"}));

        match service.submit(doc.clone()) {
            Err(MatchError::NoMatchFound { record_id }) => {
                let unmatched = service.store().unmatched();
                assert_eq!(unmatched.len(), 1);
                assert_eq!(unmatched[0].id, record_id);
                assert_eq!(unmatched[0].document, doc);
            }
            other => panic!("expected NoMatchFound, got {other:?}"),
        }
        assert!(service.store().matched().is_empty());
    }

    #[test]
    fn test_later_match_rescues_unmatched() {
        let service = inline_service();

        // Shares nothing with any sample
        let orphan = Document::new(json!({"ref": "PO-7731"}));
        assert!(service.submit(orphan.clone()).is_err());

        // Matches 004 and carries the orphan's purchase order
        let bridge = Document::new(json!({"Customer Name": "Bella's Bakery", "ref": "PO-7731"}));
        let submission = service.submit(bridge).unwrap();
        assert_eq!(submission.matched.sample_id.as_str(), "004");

        assert!(service.store().unmatched().is_empty());
        let docs = service.index().documents(&submission.matched.sample_id).len();
        assert_eq!(docs, 2);
        assert!(service.store().index_is_consistent());
    }

    #[test]
    fn test_submit_without_runtime_falls_back_to_inline() {
        let store = Arc::new(MatchStore::new(Arc::new(
            SampleCatalog::load_embedded().unwrap(),
        )));
        let service = MatchService::new(store, MatchingConfig::default());

        assert!(service.submit(Document::new(json!({"ref": "Q-1"}))).is_err());
        service
            .submit(Document::new(json!({"Customer Name": "Bread Co", "ref": "Q-1"})))
            .unwrap();
        assert!(service.store().unmatched().is_empty());
    }

    #[test]
    fn test_explain_does_not_store() {
        let service = inline_service();
        let ranked = service.explain(&Document::new(json!(["Bread Co"])), 5);
        assert_eq!(ranked.len(), 2);
        assert_eq!(service.store().stats().matched, 0);
        assert_eq!(service.store().stats().unmatched, 0);
    }
}
