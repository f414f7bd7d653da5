//! Document matching engine, scoring, and reconciliation.
//!
//! This module provides the core matching functionality:
//!
//! - [`MatchingEngine`]: Picks the best target for a document
//! - [`Reconciler`]: Re-examines stored documents after each new match
//! - [`MatchService`]: Submits documents and keeps the store reconciled
//!
//! ## Matching Algorithm
//!
//! A document is scored against every sample in catalog order, then against
//! every previously matched document in stored order. The first target with
//! the strictly highest positive score wins; a win against a matched document
//! resolves to that document's sample.
//!
//! ## Scoring
//!
//! Both records are flattened into their scalar leaves. The score is the
//! number of candidate leaves that occur at least once among the target's
//! leaves. Target leaves are not consumed, so the score is asymmetric.
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use sample_matcher::{Document, MatchService, MatchStore, MatchingConfig, SampleCatalog};
//! use serde_json::json;
//!
//! let catalog = Arc::new(SampleCatalog::load_embedded().unwrap());
//! let store = Arc::new(MatchStore::new(catalog));
//! let service = MatchService::new(store, MatchingConfig::default());
//!
//! let doc = Document::new(json!({"Customer Name": "Bread Co", "Invoice Amount": "0"}));
//! match service.submit(doc) {
//!     Ok(submission) => println!(
//!         "{}: {}",
//!         submission.matched.sample_id, submission.matched.match_score
//!     ),
//!     Err(e) => println!("{e}"),
//! }
//! ```
//!
//! [`MatchingEngine`]: engine::MatchingEngine
//! [`Reconciler`]: reconcile::Reconciler
//! [`MatchService`]: service::MatchService

pub mod engine;
pub mod reconcile;
pub mod scoring;
pub mod service;

pub use service::MatchError;
