//! Readers for batches of JSON documents.
//!
//! Two layouts are accepted:
//!
//! - **JSON array**: the top-level array holds one document per element
//! - **JSON Lines**: one document per non-blank line
//!
//! ## Example
//!
//! ```rust
//! use sample_matcher::parsing::documents::parse_documents_text;
//!
//! let docs = parse_documents_text("{\"a\": 1}\n{\"b\": 2}\n").unwrap();
//! assert_eq!(docs.len(), 2);
//! ```

pub mod documents;
