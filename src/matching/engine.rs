use serde::Serialize;

use crate::core::document::Document;
use crate::core::types::{MatchedDocument, RecordId, SampleId};
use crate::matching::scoring::LeafBag;
use crate::store::match_store::MatchStore;

/// How reconciliation sweeps are run after a successful match
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum ReconcileMode {
    /// Hand both sweeps to the blocking pool and return immediately
    #[default]
    Background,
    /// Run both sweeps before returning
    Inline,
}

/// Configuration for the matching service
#[derive(Debug, Clone, Default)]
pub struct MatchingConfig {
    /// When reconciliation sweeps run
    pub reconcile: ReconcileMode,
}

/// Something a document can be matched against
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MatchTarget {
    /// A catalog sample
    Sample { sample_id: SampleId },
    /// A previously matched document; a win resolves to its sample
    Document {
        record_id: RecordId,
        sample_id: SampleId,
    },
}

impl MatchTarget {
    /// The sample a match against this target resolves to
    #[must_use]
    pub fn sample_id(&self) -> &SampleId {
        match self {
            Self::Sample { sample_id } | Self::Document { sample_id, .. } => sample_id,
        }
    }
}

/// A scored target
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchCandidate {
    pub target: MatchTarget,
    pub score: u64,
}

/// Picks the best target for a document from the samples and the documents
/// matched so far.
pub struct MatchingEngine<'a> {
    store: &'a MatchStore,
}

impl<'a> MatchingEngine<'a> {
    pub fn new(store: &'a MatchStore) -> Self {
        Self { store }
    }

    /// Score a document against every target, in evaluation order: samples
    /// in catalog order, then matched documents in stored order.
    pub fn evaluate(&self, document: &Document) -> Vec<MatchCandidate> {
        let candidate = LeafBag::new(document.as_value());

        let samples = self.store.samples().iter().map(|sample| MatchCandidate {
            score: candidate.score_against(&LeafBag::new(sample.document.as_value())),
            target: MatchTarget::Sample {
                sample_id: sample.id.clone(),
            },
        });

        // Snapshot taken under the store lock; scoring happens after release
        let matched = self.store.matched();
        let documents = matched.into_iter().map(|record| MatchCandidate {
            score: candidate.score_against(&LeafBag::new(record.matched.document.as_value())),
            target: MatchTarget::Document {
                record_id: record.id,
                sample_id: record.matched.sample_id,
            },
        });

        samples.chain(documents).collect()
    }

    /// Find the single best match for a document.
    ///
    /// A target only wins with a score strictly greater than every target
    /// evaluated before it, so ties go to the earliest target and a score of
    /// zero never matches.
    pub fn find_match(&self, document: &Document) -> Option<MatchedDocument> {
        let mut best_score = 0;
        let mut best_target: Option<MatchTarget> = None;

        for candidate in self.evaluate(document) {
            if candidate.score > best_score {
                best_score = candidate.score;
                best_target = Some(candidate.target);
            }
        }

        best_target.map(|target| {
            MatchedDocument::new(target.sample_id().clone(), best_score, document.clone())
        })
    }

    /// Targets with a positive score, best first.
    ///
    /// Equal scores keep evaluation order, so the first entry always agrees
    /// with [`find_match`](Self::find_match).
    pub fn rank(&self, document: &Document, limit: usize) -> Vec<MatchCandidate> {
        let mut candidates: Vec<MatchCandidate> = self
            .evaluate(document)
            .into_iter()
            .filter(|c| c.score > 0)
            .collect();

        // Stable sort keeps evaluation order among equal scores
        candidates.sort_by(|a, b| b.score.cmp(&a.score));
        candidates.truncate(limit);
        candidates
    }
}
