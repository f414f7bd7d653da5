//! Score command - compare two documents directly using the scoring algorithm.
//!
//! This command scores a query document against a target document without
//! using the samples or the match store. Useful for checking why two
//! documents do or do not match.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Args;

use crate::cli::OutputFormat;
use crate::core::document::Document;
use crate::matching::scoring::ScoreDetail;

/// Arguments for the score command
#[derive(Args)]
pub struct ScoreArgs {
    /// Query file holding one JSON document (the document you want to score)
    #[arg(required = true)]
    pub query: PathBuf,

    /// Target file holding one JSON document (the document to compare against)
    #[arg(required = true)]
    pub target: PathBuf,

    /// Also compute the reverse comparison (target as query, query as target).
    /// By default, scoring is asymmetric: it counts query values found in the
    /// target. With --symmetric, both directions are computed.
    #[arg(long)]
    pub symmetric: bool,
}

/// Result of scoring in one direction
struct ScoreResult {
    query_path: PathBuf,
    target_path: PathBuf,
    detail: ScoreDetail,
}

/// Execute the score command
///
/// # Errors
///
/// Returns an error if either input cannot be read or is not valid JSON.
#[allow(clippy::needless_pass_by_value)]
pub fn run(args: ScoreArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let query = read_document(&args.query)?;
    let target = read_document(&args.target)?;

    if verbose {
        eprintln!("Query digest: {}", query.digest());
        eprintln!("Target digest: {}", target.digest());
    }

    let forward = ScoreResult {
        query_path: args.query.clone(),
        target_path: args.target.clone(),
        detail: ScoreDetail::calculate(query.as_value(), target.as_value()),
    };

    let reverse = args.symmetric.then(|| ScoreResult {
        query_path: args.target.clone(),
        target_path: args.query.clone(),
        detail: ScoreDetail::calculate(target.as_value(), query.as_value()),
    });

    match format {
        OutputFormat::Text => {
            print_text_result(&forward, "");
            if let Some(ref reverse) = reverse {
                println!("\n{}", "─".repeat(60));
                print_text_result(reverse, " (reverse)");
            }
        }
        OutputFormat::Json => print_json_results(&forward, reverse.as_ref())?,
        OutputFormat::Tsv => print_tsv_results(&forward, reverse.as_ref()),
    }

    Ok(())
}

fn read_document(path: &Path) -> anyhow::Result<Document> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let document: Document = serde_json::from_str(&content)
        .with_context(|| format!("Invalid JSON in {}", path.display()))?;
    Ok(document)
}

fn print_text_result(result: &ScoreResult, suffix: &str) {
    let detail = &result.detail;

    println!(
        "\nScoring{}: {} vs {}",
        suffix,
        result.query_path.display(),
        result.target_path.display()
    );
    println!("\n   Score: {}", detail.score);
    println!(
        "   Query values: {} total, {} found in target ({:.1}%)",
        detail.candidate_leaves,
        detail.score,
        detail.candidate_coverage() * 100.0
    );
    println!(
        "   Target values: {} total, {} distinct hit by query",
        detail.target_leaves, detail.target_leaves_hit
    );
}

fn print_json_results(forward: &ScoreResult, reverse: Option<&ScoreResult>) -> anyhow::Result<()> {
    let make_result_json = |result: &ScoreResult| {
        serde_json::json!({
            "query": result.query_path.display().to_string(),
            "target": result.target_path.display().to_string(),
            "score": result.detail.score,
            "query_leaves": result.detail.candidate_leaves,
            "target_leaves": result.detail.target_leaves,
            "target_leaves_hit": result.detail.target_leaves_hit,
            "query_coverage": result.detail.candidate_coverage(),
        })
    };

    let output = match reverse {
        Some(reverse) => serde_json::json!({
            "forward": make_result_json(forward),
            "reverse": make_result_json(reverse),
        }),
        None => make_result_json(forward),
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn print_tsv_results(forward: &ScoreResult, reverse: Option<&ScoreResult>) {
    println!("direction\tquery\ttarget\tscore\tquery_leaves\ttarget_leaves\ttarget_leaves_hit");

    let print_row = |direction: &str, result: &ScoreResult| {
        println!(
            "{}\t{}\t{}\t{}\t{}\t{}\t{}",
            direction,
            result.query_path.display(),
            result.target_path.display(),
            result.detail.score,
            result.detail.candidate_leaves,
            result.detail.target_leaves,
            result.detail.target_leaves_hit
        );
    };

    print_row("forward", forward);
    if let Some(reverse) = reverse {
        print_row("reverse", reverse);
    }
}
