use std::collections::BTreeMap;

use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};

use crate::core::document::Document;
use crate::core::types::{RecordId, SampleId};
use crate::store::match_store::MatchRecord;

/// Read-optimized view from sample id to the documents attributed to it.
///
/// Within a group, documents keep the order of the matched collection. Groups
/// with no documents are never stored, so two indexes are equal exactly when
/// they describe the same grouping.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MatchIndex {
    groups: BTreeMap<SampleId, Vec<(RecordId, Document)>>,
}

impl MatchIndex {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Group matched records by sample id
    #[must_use]
    pub fn from_records(records: &[MatchRecord]) -> Self {
        let mut index = Self::new();
        for record in records {
            index.insert(
                record.matched.sample_id.clone(),
                record.id,
                record.matched.document.clone(),
            );
        }
        index
    }

    pub(crate) fn insert(&mut self, sample_id: SampleId, record_id: RecordId, document: Document) {
        self.groups
            .entry(sample_id)
            .or_default()
            .push((record_id, document));
    }

    /// Remove one record from its group; returns whether it was present
    pub(crate) fn remove(&mut self, sample_id: &SampleId, record_id: RecordId) -> bool {
        let Some(group) = self.groups.get_mut(sample_id) else {
            return false;
        };
        let Some(pos) = group.iter().position(|(id, _)| *id == record_id) else {
            return false;
        };
        group.remove(pos);
        if group.is_empty() {
            self.groups.remove(sample_id);
        }
        true
    }

    /// Documents attributed to a sample, in matched-collection order
    #[must_use]
    pub fn documents(&self, sample_id: &SampleId) -> Vec<&Document> {
        self.groups
            .get(sample_id)
            .map(|group| group.iter().map(|(_, doc)| doc).collect())
            .unwrap_or_default()
    }

    /// Record ids attributed to a sample, in matched-collection order
    #[must_use]
    pub fn record_ids(&self, sample_id: &SampleId) -> Vec<RecordId> {
        self.groups
            .get(sample_id)
            .map(|group| group.iter().map(|(id, _)| *id).collect())
            .unwrap_or_default()
    }

    /// Iterate `(sample id, documents)` groups, sorted by sample id
    pub fn iter(&self) -> impl Iterator<Item = (&SampleId, Vec<&Document>)> {
        self.groups
            .iter()
            .map(|(id, group)| (id, group.iter().map(|(_, doc)| doc).collect()))
    }

    /// Total number of attributed documents
    #[must_use]
    pub fn len(&self) -> usize {
        self.groups.values().map(Vec::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

/// Serialized as `{ "<sample id>": [document, ...] }`
impl Serialize for MatchIndex {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        struct Group<'a>(&'a [(RecordId, Document)]);

        impl Serialize for Group<'_> {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                let mut seq = serializer.serialize_seq(Some(self.0.len()))?;
                for (_, doc) in self.0 {
                    seq.serialize_element(doc)?;
                }
                seq.end()
            }
        }

        let mut map = serializer.serialize_map(Some(self.groups.len()))?;
        for (id, group) in &self.groups {
            map.serialize_entry(id.as_str(), &Group(group))?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_insert_and_remove_keeps_groups_tight() {
        let mut index = MatchIndex::new();
        let a = SampleId::new("a");
        index.insert(a.clone(), RecordId(1), Document::new(json!({"n": 1})));
        index.insert(a.clone(), RecordId(2), Document::new(json!({"n": 2})));
        assert_eq!(index.len(), 2);
        assert_eq!(index.record_ids(&a), vec![RecordId(1), RecordId(2)]);

        assert!(index.remove(&a, RecordId(1)));
        assert!(!index.remove(&a, RecordId(1)));
        assert!(index.remove(&a, RecordId(2)));
        assert!(index.is_empty());
        assert_eq!(index, MatchIndex::new());
    }

    #[test]
    fn test_remove_unknown_sample() {
        let mut index = MatchIndex::new();
        assert!(!index.remove(&SampleId::new("missing"), RecordId(0)));
    }

    #[test]
    fn test_serializes_as_sample_to_documents() {
        let mut index = MatchIndex::new();
        index.insert(SampleId::new("005"), RecordId(0), Document::new(json!({"x": 1})));
        index.insert(SampleId::new("001"), RecordId(1), Document::new(json!("y")));

        let value = serde_json::to_value(&index).unwrap();
        assert_eq!(value, json!({"001": ["y"], "005": [{"x": 1}]}));
    }
}
