use serde::{Deserialize, Serialize};

use crate::core::document::Document;

/// Unique identifier for a sample in the catalog
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SampleId(pub String);

impl SampleId {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SampleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Store-assigned identity of a matched record or unmatched entry.
///
/// Identifiers are never reused, so a stale identifier can only ever refer
/// to a record that has since been removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(pub u64);

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A fixed reference record with a stable identifier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Unique identifier
    pub id: SampleId,

    /// The sample's content; this is what documents are scored against
    pub document: Document,
}

impl Sample {
    pub fn new(id: impl Into<String>, document: impl Into<Document>) -> Self {
        Self {
            id: SampleId::new(id),
            document: document.into(),
        }
    }
}

/// A document attributed to a sample, directly or through a chain of
/// document-to-document matches
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchedDocument {
    /// The sample this document resolves to
    pub sample_id: SampleId,

    /// Best score found by the pass that wrote this record
    pub match_score: u64,

    /// The matched document itself
    pub document: Document,
}

impl MatchedDocument {
    pub fn new(sample_id: SampleId, match_score: u64, document: Document) -> Self {
        Self {
            sample_id,
            match_score,
            document,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_matched_document_wire_names() {
        let matched = MatchedDocument::new(
            SampleId::new("005"),
            2,
            Document::new(json!({"Customer Name": "Bread Co"})),
        );

        let value = serde_json::to_value(&matched).unwrap();
        assert_eq!(value["sampleId"], "005");
        assert_eq!(value["matchScore"], 2);
        assert_eq!(value["document"]["Customer Name"], "Bread Co");
    }

    #[test]
    fn test_record_id_display() {
        assert_eq!(RecordId(7).to_string(), "#7");
        assert_eq!(SampleId::new("001").to_string(), "001");
    }
}
