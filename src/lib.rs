//! # sample-matcher
//!
//! A library for matching nested JSON documents against a fixed set of
//! reference samples.
//!
//! Incoming documents rarely look exactly like any known sample: fields are
//! missing, renamed, or nested differently. `sample-matcher` compares the
//! scalar values a document carries, whatever their nesting, and files the
//! document under the sample it overlaps most. Documents matched earlier act
//! as extra evidence for later ones, and every new match triggers a
//! reconciliation pass that rescues previously unmatched documents and moves
//! matched documents to a better home.
//!
//! ## Features
//!
//! - **Structure-blind scoring**: Documents are flattened to their scalar leaves
//! - **Transitive matching**: A document can match a sample through an earlier match
//! - **Reconciliation**: New matches revisit unmatched and matched documents
//! - **Concurrent access**: One shared store serves the CLI and the HTTP server
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use sample_matcher::{Document, MatchStore, MatchingEngine, SampleCatalog};
//! use serde_json::json;
//!
//! // Load the embedded reference samples
//! let catalog = Arc::new(SampleCatalog::load_embedded().unwrap());
//! let store = MatchStore::new(catalog);
//!
//! // Rank the targets for a document without storing it
//! let doc = Document::new(json!({"Customer Name": "Bread Co"}));
//! let engine = MatchingEngine::new(&store);
//! for candidate in engine.rank(&doc, 3) {
//!     println!("{}: {}", candidate.target.sample_id(), candidate.score);
//! }
//! ```
//!
//! ## Modules
//!
//! - [`catalog`]: Reference sample storage
//! - [`core`]: Core data types for documents, samples, and matches
//! - [`matching`]: Matching engine, scoring, and reconciliation
//! - [`store`]: Shared match store and match index
//! - [`parsing`]: Readers for batches of documents
//! - [`cli`]: Command-line interface implementation
//! - [`web`]: HTTP server for document submission

pub mod catalog;
pub mod cli;
pub mod core;
pub mod matching;
pub mod parsing;
pub mod store;
pub mod utils;
pub mod web;

// Re-export commonly used types for convenience
pub use catalog::store::SampleCatalog;
pub use core::document::Document;
pub use core::types::*;
pub use matching::engine::{MatchCandidate, MatchingConfig, MatchingEngine, ReconcileMode};
pub use matching::reconcile::Reconciler;
pub use matching::service::{MatchService, Submission};
pub use matching::MatchError;
pub use store::index::MatchIndex;
pub use store::match_store::MatchStore;
