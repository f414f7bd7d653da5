use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::utils::validation::compute_digest;

/// An arbitrary nested record: mappings, sequences, and scalar leaves.
///
/// Documents carry no identity beyond their content. Once received they are
/// treated as opaque values and never modified.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Document(Value);

impl Document {
    #[must_use]
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    #[must_use]
    pub fn as_value(&self) -> &Value {
        &self.0
    }

    /// Short content digest used to refer to a document in log lines
    #[must_use]
    pub fn digest(&self) -> String {
        compute_digest(&self.0)
    }
}

impl From<Value> for Document {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_document_is_transparent() {
        let doc = Document::new(json!({"a": [1, 2]}));
        assert_eq!(serde_json::to_string(&doc).unwrap(), r#"{"a":[1,2]}"#);

        let parsed: Document = serde_json::from_str(r#"{"a":[1,2]}"#).unwrap();
        assert_eq!(parsed, doc);
    }

    #[test]
    fn test_digest_ignores_key_order() {
        let a: Document = serde_json::from_str(r#"{"x": 1, "y": 2}"#).unwrap();
        let b: Document = serde_json::from_str(r#"{"y": 2, "x": 1}"#).unwrap();
        assert_eq!(a.digest(), b.digest());

        let c = Document::new(json!({"x": 1, "y": 3}));
        assert_ne!(a.digest(), c.digest());
    }
}
