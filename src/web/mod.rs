//! HTTP server for document submission.
//!
//! This module provides a JSON API using Axum. Clients submit documents one
//! at a time and read back the match index.
//!
//! ## Starting the Server
//!
//! ```text
//! # Start on default port 8080
//! sample-matcher serve
//!
//! # Custom port and custom samples
//! sample-matcher serve --port 3000 --samples my_samples.json
//!
//! # Bind to all interfaces
//! sample-matcher serve --address 0.0.0.0
//! ```
//!
//! ## API Endpoints
//!
//! - `POST /document` - Match a JSON document (404 when nothing matches)
//! - `GET /api/matches` - Match index: sample id to matched documents
//! - `GET /api/unmatched` - Documents that matched nothing
//! - `GET /api/samples` - List all samples
//! - `POST /api/score` - Ranked targets for a document, without storing it
//! - `GET /api/stats` - Record counts

pub mod server;
