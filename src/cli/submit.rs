//! Match command - submit a batch of documents and print the match index.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;

use crate::cli::{load_samples, OutputFormat};
use crate::matching::engine::{MatchingConfig, ReconcileMode};
use crate::matching::service::MatchService;
use crate::matching::MatchError;
use crate::parsing::documents::parse_documents_file;
use crate::store::index::MatchIndex;
use crate::store::match_store::{MatchRecord, MatchStore, UnmatchedRecord};

#[derive(Args)]
pub struct MatchArgs {
    /// Input file: a JSON array of documents or JSON Lines (use - for stdin)
    #[arg(required = true)]
    pub input: PathBuf,

    /// Path to a custom samples file (defaults to the embedded samples)
    #[arg(long)]
    pub samples: Option<PathBuf>,
}

/// Execute the match command
///
/// # Errors
///
/// Returns an error if the samples or the input cannot be loaded, or if a
/// document is rejected by the input limits.
#[allow(clippy::needless_pass_by_value)]
pub fn run(args: MatchArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let catalog = load_samples(args.samples.as_deref())?;
    let documents = parse_documents_file(&args.input)?;

    if verbose {
        eprintln!(
            "Matching {} documents against {} samples",
            documents.len(),
            catalog.len()
        );
    }

    let store = Arc::new(MatchStore::new(Arc::new(catalog)));
    // Sweeps run before the next document so the output is reproducible
    let service = MatchService::new(
        Arc::clone(&store),
        MatchingConfig {
            reconcile: ReconcileMode::Inline,
        },
    );

    for (i, document) in documents.into_iter().enumerate() {
        match service.submit(document) {
            Ok(submission) => {
                if verbose {
                    eprintln!(
                        "Document {}: sample {} (score {})",
                        i + 1,
                        submission.matched.sample_id,
                        submission.matched.match_score
                    );
                }
            }
            Err(MatchError::NoMatchFound { .. }) => {
                if verbose {
                    eprintln!("Document {}: no match", i + 1);
                }
            }
            Err(e) => return Err(anyhow::anyhow!("Document {}: {e}", i + 1)),
        }
    }

    let snapshot = store.snapshot();

    match format {
        OutputFormat::Text => print_text(&snapshot.index, &snapshot.unmatched),
        OutputFormat::Json => {
            print_json(&snapshot.index, &snapshot.matched, &snapshot.unmatched)?;
        }
        OutputFormat::Tsv => print_tsv(&snapshot.matched, &snapshot.unmatched),
    }

    Ok(())
}

fn print_text(index: &MatchIndex, unmatched: &[UnmatchedRecord]) {
    if index.is_empty() {
        println!("No documents matched.");
    }

    for (sample_id, documents) in index.iter() {
        println!("\nSample {sample_id} ({} documents)", documents.len());
        for document in documents {
            println!("   {}", document.as_value());
        }
    }

    if !unmatched.is_empty() {
        println!("\nUnmatched ({} documents)", unmatched.len());
        for record in unmatched {
            println!("   {}", record.document.as_value());
        }
    }
}

fn print_json(
    index: &MatchIndex,
    records: &[MatchRecord],
    unmatched: &[UnmatchedRecord],
) -> anyhow::Result<()> {
    let output = serde_json::json!({
        "index": index,
        "matched": records,
        "unmatched": unmatched,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn print_tsv(records: &[MatchRecord], unmatched: &[UnmatchedRecord]) {
    println!("record_id\tsample_id\tmatch_score\tdocument");
    for record in records {
        println!(
            "{}\t{}\t{}\t{}",
            record.id.0,
            record.matched.sample_id,
            record.matched.match_score,
            record.matched.document.as_value()
        );
    }
    for record in unmatched {
        println!("{}\t\t\t{}", record.id.0, record.document.as_value());
    }
}
