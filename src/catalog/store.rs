use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

use crate::core::types::{Sample, SampleId};

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Failed to read catalog: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse catalog: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("Duplicate sample id in catalog: {0}")]
    DuplicateId(SampleId),
}

/// Catalog version for compatibility checking
pub const CATALOG_VERSION: &str = "1.0.0";

/// Serializable catalog format
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogData {
    pub version: String,
    pub created_at: String,
    pub samples: Vec<Sample>,
}

/// The fixed set of samples documents are matched against.
///
/// Built once at startup and never modified afterwards, so it can be shared
/// freely between threads without locking.
#[derive(Debug, Default)]
pub struct SampleCatalog {
    /// All samples, in catalog order
    samples: Vec<Sample>,

    /// Index: sample ID -> index in samples vec
    id_to_index: HashMap<SampleId, usize>,
}

impl SampleCatalog {
    /// Build a catalog from samples, keeping their order.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::DuplicateId` if two samples share an id.
    pub fn from_samples(samples: Vec<Sample>) -> Result<Self, CatalogError> {
        let mut id_to_index = HashMap::with_capacity(samples.len());
        for (index, sample) in samples.iter().enumerate() {
            if id_to_index.insert(sample.id.clone(), index).is_some() {
                return Err(CatalogError::DuplicateId(sample.id.clone()));
            }
        }

        Ok(Self {
            samples,
            id_to_index,
        })
    }

    /// Load the embedded invoice sample catalog
    ///
    /// # Errors
    ///
    /// Returns an error if the embedded catalog cannot be parsed.
    pub fn load_embedded() -> Result<Self, CatalogError> {
        // Validated at compile time via build.rs
        const EMBEDDED_CATALOG: &str = include_str!("../../catalogs/invoice_samples.json");
        Self::from_json(EMBEDDED_CATALOG)
    }

    /// Load catalog from a JSON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_from_file(path: &Path) -> Result<Self, CatalogError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Parse catalog from JSON string
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or sample ids are not unique.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let data: CatalogData = serde_json::from_str(json)?;

        // Version check (warn but don't fail)
        if data.version != CATALOG_VERSION {
            tracing::warn!(
                "Catalog version mismatch (expected {}, found {})",
                CATALOG_VERSION,
                data.version
            );
        }

        Self::from_samples(data.samples)
    }

    /// Get a sample by ID
    pub fn get(&self, id: &SampleId) -> Option<&Sample> {
        self.id_to_index.get(id).map(|&idx| &self.samples[idx])
    }

    /// Whether a sample with this ID exists
    pub fn contains(&self, id: &SampleId) -> bool {
        self.id_to_index.contains_key(id)
    }

    /// Iterate samples in catalog order
    pub fn iter(&self) -> impl Iterator<Item = &Sample> {
        self.samples.iter()
    }

    /// All samples in catalog order
    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    /// Export catalog to JSON
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, CatalogError> {
        let data = CatalogData {
            version: CATALOG_VERSION.to_string(),
            created_at: chrono::Utc::now().to_rfc3339(),
            samples: self.samples.clone(),
        };
        Ok(serde_json::to_string_pretty(&data)?)
    }

    /// Number of samples in catalog
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Check if catalog is empty
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_load_embedded_catalog() {
        let catalog = SampleCatalog::load_embedded().unwrap();
        assert_eq!(catalog.len(), 6);

        let ids: Vec<&str> = catalog.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["001", "002", "003", "004", "005", "006"]);
    }

    #[test]
    fn test_catalog_get_by_id() {
        let catalog = SampleCatalog::load_embedded().unwrap();

        let bread = catalog.get(&SampleId::new("005")).unwrap();
        assert_eq!(bread.document.as_value()["Customer Name"], "Bread Co");
        assert!(catalog.contains(&SampleId::new("006")));
    }

    #[test]
    fn test_catalog_get_nonexistent() {
        let catalog = SampleCatalog::load_embedded().unwrap();
        assert!(catalog.get(&SampleId::new("999")).is_none());
    }

    #[test]
    fn test_catalog_to_json_round_trips() {
        let catalog = SampleCatalog::load_embedded().unwrap();
        let json = catalog.to_json().unwrap();

        assert!(json.contains("\"version\""));
        assert!(json.contains("\"samples\""));

        let reloaded = SampleCatalog::from_json(&json).unwrap();
        assert_eq!(reloaded.samples(), catalog.samples());
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let samples = vec![
            Sample::new("a", json!({"x": 1})),
            Sample::new("a", json!({"x": 2})),
        ];
        match SampleCatalog::from_samples(samples) {
            Err(CatalogError::DuplicateId(id)) => assert_eq!(id.as_str(), "a"),
            other => panic!("expected DuplicateId, got {other:?}"),
        }
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("samples.json");
        std::fs::write(
            &path,
            r#"{"version": "1.0.0", "created_at": "", "samples": [{"id": "s1", "document": {"k": "v"}}]}"#,
        )
        .unwrap();

        let catalog = SampleCatalog::load_from_file(&path).unwrap();
        assert_eq!(catalog.len(), 1);
        assert!(catalog.contains(&SampleId::new("s1")));
    }
}
