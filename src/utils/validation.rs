//! Centralized validation and helper functions.
//!
//! Nothing here inspects the shape of a document. The checks only bound the
//! resources a single document may consume.

use serde_json::Value;

use crate::core::document::Document;
use crate::matching::scoring::leaf_count;

/// Maximum number of leaf values allowed in a single document (DOS protection)
pub const MAX_LEAF_VALUES: usize = 100_000;

/// Maximum size of a serialized document accepted over HTTP
pub const MAX_DOCUMENT_BYTES: usize = 1024 * 1024; // 1MB

/// Compute a digest of a JSON value.
///
/// The digest is the MD5 of the compact JSON rendering. Mapping keys render in
/// sorted order, so two documents that differ only in key order share a digest.
///
/// # Examples
///
/// ```
/// use sample_matcher::utils::validation::compute_digest;
/// use serde_json::json;
///
/// let digest = compute_digest(&json!({"Customer Name": "Bread Co"}));
/// assert_eq!(digest.len(), 32);
/// ```
#[must_use]
pub fn compute_digest(value: &Value) -> String {
    let digest = md5::compute(value.to_string().as_bytes());
    format!("{digest:x}")
}

/// Check whether a document with `count` leaves exceeds the maximum allowed.
///
/// Returns an error message if the limit is exceeded, None if the document is
/// within bounds.
#[must_use]
pub fn check_leaf_limit(count: usize) -> Option<String> {
    if count > MAX_LEAF_VALUES {
        Some(format!(
            "Too many leaf values: {count} exceeds maximum of {MAX_LEAF_VALUES}"
        ))
    } else {
        None
    }
}

/// Input validation error types
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Document has too many leaf values: {0} exceeds maximum of {MAX_LEAF_VALUES}")]
    TooManyLeaves(usize),
    #[error("Document too large: exceeds {MAX_DOCUMENT_BYTES} bytes")]
    DocumentTooLarge,
}

/// Validate that a document stays within the resource limits.
///
/// # Errors
///
/// Returns `ValidationError::TooManyLeaves` if flattening the document would
/// produce more than [`MAX_LEAF_VALUES`] leaves.
pub fn validate_document(document: &Document) -> Result<(), ValidationError> {
    let count = leaf_count(document.as_value());
    if check_leaf_limit(count).is_some() {
        return Err(ValidationError::TooManyLeaves(count));
    }
    Ok(())
}

/// Validate the size of a raw document body before it is parsed.
///
/// # Errors
///
/// Returns `ValidationError::DocumentTooLarge` if the body exceeds
/// [`MAX_DOCUMENT_BYTES`].
pub fn validate_document_size(body: &[u8]) -> Result<(), ValidationError> {
    if body.len() > MAX_DOCUMENT_BYTES {
        return Err(ValidationError::DocumentTooLarge);
    }
    Ok(())
}
