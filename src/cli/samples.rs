use std::path::PathBuf;

use clap::{Args, Subcommand};

use crate::catalog::store::SampleCatalog;
use crate::cli::{load_samples, OutputFormat};
use crate::core::types::SampleId;
use crate::matching::scoring::leaf_count;

#[derive(Args)]
pub struct SamplesArgs {
    #[command(subcommand)]
    pub command: SamplesCommands,
}

#[derive(Subcommand)]
pub enum SamplesCommands {
    /// List all samples
    List {
        /// Path to custom samples file
        #[arg(long)]
        samples: Option<PathBuf>,
    },

    /// Show one sample in full
    Show {
        /// Sample ID
        #[arg(required = true)]
        id: String,

        /// Path to custom samples file
        #[arg(long)]
        samples: Option<PathBuf>,
    },

    /// Export the samples to a file
    Export {
        /// Output file path
        #[arg(required = true)]
        output: PathBuf,

        /// Path to custom samples file to export (defaults to embedded)
        #[arg(long)]
        samples: Option<PathBuf>,
    },
}

/// Execute the samples command
///
/// # Errors
///
/// Returns an error if the samples cannot be loaded, the sample is not found,
/// or the export file cannot be written.
#[allow(clippy::needless_pass_by_value)]
pub fn run(args: SamplesArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    match args.command {
        SamplesCommands::List { samples } => {
            let catalog = load_samples(samples.as_deref())?;
            if verbose {
                eprintln!("Loaded {} samples", catalog.len());
            }
            run_list(&catalog, format)
        }
        SamplesCommands::Show { id, samples } => {
            let catalog = load_samples(samples.as_deref())?;
            run_show(&catalog, &id, format)
        }
        SamplesCommands::Export { output, samples } => {
            let catalog = load_samples(samples.as_deref())?;
            let json = catalog.to_json()?;
            std::fs::write(&output, json)?;
            eprintln!("Exported {} samples to {}", catalog.len(), output.display());
            Ok(())
        }
    }
}

fn run_list(catalog: &SampleCatalog, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Text => {
            let id_width = catalog
                .iter()
                .map(|s| s.id.0.len())
                .max()
                .unwrap_or(2)
                .max(2);

            println!("Samples ({})\n", catalog.len());
            println!("{:<id_w$} {:>6}  Content", "ID", "Values", id_w = id_width);
            println!("{}", "-".repeat(id_width + 60));

            for sample in catalog.iter() {
                println!(
                    "{:<id_w$} {:>6}  {}",
                    sample.id.0,
                    leaf_count(sample.document.as_value()),
                    truncate(&sample.document.as_value().to_string(), 50),
                    id_w = id_width
                );
            }
        }
        OutputFormat::Json => {
            let output: Vec<serde_json::Value> = catalog
                .iter()
                .map(|s| {
                    serde_json::json!({
                        "id": s.id,
                        "leaf_count": leaf_count(s.document.as_value()),
                        "document": s.document,
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Tsv => {
            println!("id\tleaf_count\tdocument");
            for s in catalog.iter() {
                println!(
                    "{}\t{}\t{}",
                    s.id.0,
                    leaf_count(s.document.as_value()),
                    s.document.as_value()
                );
            }
        }
    }

    Ok(())
}

fn run_show(catalog: &SampleCatalog, id: &str, format: OutputFormat) -> anyhow::Result<()> {
    let sample = catalog
        .get(&SampleId::new(id))
        .ok_or_else(|| anyhow::anyhow!("Sample not found: {id}"))?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(sample)?);
        }
        OutputFormat::Text | OutputFormat::Tsv => {
            println!("Sample {}", sample.id);
            println!("Values: {}", leaf_count(sample.document.as_value()));
            println!("Digest: {}\n", sample.document.digest());
            println!("{}", serde_json::to_string_pretty(&sample.document)?);
        }
    }

    Ok(())
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{kept}...")
    }
}
