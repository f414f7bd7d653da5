//! Core data types for document matching.
//!
//! This module provides the fundamental types used throughout the library:
//!
//! - [`Document`]: An arbitrary nested record submitted for matching
//! - [`Sample`], [`SampleId`]: The fixed reference set documents resolve to
//! - [`MatchedDocument`]: A document attributed to a sample, with its score
//! - [`RecordId`]: Store-assigned identity of a stored entry
//!
//! ## Documents
//!
//! Documents are trees of JSON mappings and sequences with scalar leaves. Key
//! order in a mapping carries no meaning; element order in a sequence does.
//!
//! [`Document`]: document::Document
//! [`Sample`]: types::Sample
//! [`SampleId`]: types::SampleId
//! [`MatchedDocument`]: types::MatchedDocument
//! [`RecordId`]: types::RecordId

pub mod document;
pub mod types;
