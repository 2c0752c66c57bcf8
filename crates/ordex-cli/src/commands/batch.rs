//! Batch command - process multiple invoice text files.

use std::fs;
use std::path::PathBuf;

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::warn;

use ordex_core::{FileDocumentSource, ParseOptions, Pipeline};

use super::process::{format_invoice, load_config, OutputFormat};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Glob pattern for input files (e.g. "invoices/*.txt")
    #[arg(required = true)]
    pattern: String,

    /// Output directory for per-invoice JSON files
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Stop at the first failed file
    #[arg(long)]
    fail_fast: bool,
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let pipeline = Pipeline::with_config(config);

    let inputs: Vec<PathBuf> = glob::glob(&args.pattern)?
        .filter_map(|entry| entry.ok())
        .collect();
    if inputs.is_empty() {
        anyhow::bail!("No files match pattern: {}", args.pattern);
    }

    if let Some(dir) = &args.output_dir {
        fs::create_dir_all(dir)?;
    }

    let pb = ProgressBar::new(inputs.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")?
            .progress_chars("##-"),
    );

    let mut succeeded = 0usize;
    let mut failed = 0usize;

    for input in &inputs {
        pb.set_message(input.display().to_string());

        let source = FileDocumentSource::new(input);
        match pipeline.process_document(&source, &ParseOptions::default()) {
            Some(invoice) => {
                succeeded += 1;
                if let Some(dir) = &args.output_dir {
                    let name = input
                        .file_stem()
                        .map(|s| s.to_string_lossy().into_owned())
                        .unwrap_or_else(|| format!("invoice-{}", succeeded));
                    let path = dir.join(format!("{}.json", name));
                    fs::write(&path, format_invoice(&invoice, OutputFormat::Json)?)?;
                }
            }
            None => {
                failed += 1;
                warn!("extraction failed for {}", input.display());
                if args.fail_fast {
                    pb.abandon_with_message("aborted");
                    anyhow::bail!("Extraction failed for {}", input.display());
                }
            }
        }
        pb.inc(1);
    }

    pb.finish_with_message("Done");

    println!(
        "{} {} succeeded, {} failed",
        style("Batch finished:").green(),
        succeeded,
        failed
    );

    Ok(())
}
