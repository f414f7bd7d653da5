//! Command-line interface for sample-matcher.
//!
//! This module implements the CLI using clap. Available commands:
//!
//! - **match**: Match a batch of documents and print the resulting index
//! - **score**: Score one document against another
//! - **samples**: List, show, or export the reference samples
//! - **serve**: Start the HTTP server
//!
//! ## Usage
//!
//! ```text
//! # Match documents from a JSON Lines file
//! sample-matcher match invoices.jsonl
//!
//! # Pipe from another tool
//! cat invoices.json | sample-matcher match -
//!
//! # JSON output for scripting
//! sample-matcher match invoices.jsonl --format json
//!
//! # Score two documents directly
//! sample-matcher score a.json b.json --symmetric
//!
//! # Start the server
//! sample-matcher serve --port 8080
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::matching::engine::ReconcileMode;

pub mod samples;
pub mod score;
pub mod submit;

#[derive(Parser)]
#[command(name = "sample-matcher")]
#[command(author = "Fulcrum Genomics")]
#[command(version)]
#[command(about = "Match nested documents against reference samples")]
#[command(
    long_about = "sample-matcher files each incoming document under the reference sample it overlaps most.\n\nDocuments are compared by the scalar values they contain, regardless of nesting. It provides:\n- Matching against samples and against earlier matches\n- Rescue of unmatched documents when a related document arrives\n- Re-homing of matched documents when a better match appears"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format
    #[arg(short, long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Match a batch of documents against the samples
    #[command(visible_alias = "submit")]
    Match(submit::MatchArgs),

    /// Score one document against another
    Score(score::ScoreArgs),

    /// Inspect the reference samples
    Samples(samples::SamplesArgs),

    /// Start the web server
    Serve(ServeArgs),
}

#[derive(clap::Args)]
pub struct ServeArgs {
    /// Port to listen on
    #[arg(short, long, default_value = "8080")]
    pub port: u16,

    /// Address to bind to
    #[arg(short, long, default_value = "127.0.0.1")]
    pub address: String,

    /// Path to a custom samples file (defaults to the embedded samples)
    #[arg(long)]
    pub samples: Option<PathBuf>,

    /// Disable per-client rate limiting
    #[arg(long)]
    pub no_rate_limit: bool,

    /// When reconciliation sweeps run after a match
    #[arg(long, value_enum, default_value = "background")]
    pub reconcile: ReconcileMode,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Tsv,
}

/// Load the samples from a file, or the embedded set when no path is given
pub(crate) fn load_samples(
    path: Option<&std::path::Path>,
) -> anyhow::Result<crate::catalog::store::SampleCatalog> {
    use crate::catalog::store::SampleCatalog;

    Ok(match path {
        Some(p) => SampleCatalog::load_from_file(p)?,
        None => SampleCatalog::load_embedded()?,
    })
}
