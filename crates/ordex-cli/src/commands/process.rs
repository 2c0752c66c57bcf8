//! Process command - extract data from a single invoice text file.

use std::fs;
use std::path::PathBuf;

use clap::Args;
use console::style;
use tracing::info;

use ordex_core::{
    ExtractedInvoice, FileDocumentSource, OrdexConfig, ParseOptions, Pipeline,
};

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Input invoice text file
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Record the debug flag in processing metadata
    #[arg(long)]
    debug: bool,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// Plain text summary
    Text,
}

pub async fn run(args: ProcessArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    info!("Processing file: {}", args.input.display());

    let pipeline = Pipeline::with_config(config);
    let source = FileDocumentSource::new(&args.input);
    let options = ParseOptions { debug: args.debug };

    let Some(invoice) = pipeline.process_document(&source, &options) else {
        anyhow::bail!(
            "Extraction failed for {}: no usable data recovered",
            args.input.display()
        );
    };

    let output = format_invoice(&invoice, args.format)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} {}",
            style("Written to").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    Ok(())
}

pub fn load_config(config_path: Option<&str>) -> anyhow::Result<OrdexConfig> {
    match config_path {
        Some(path) => Ok(OrdexConfig::from_file(std::path::Path::new(path))?),
        None => Ok(OrdexConfig::default()),
    }
}

pub fn format_invoice(invoice: &ExtractedInvoice, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(invoice)?),
        OutputFormat::Text => Ok(text_summary(invoice)),
    }
}

fn text_summary(invoice: &ExtractedInvoice) -> String {
    let mut lines = Vec::new();
    lines.push(format!(
        "Order number: {}",
        invoice.order_number.as_deref().unwrap_or("-")
    ));
    lines.push(format!(
        "Order date:   {}",
        invoice.order_date.as_deref().unwrap_or("-")
    ));
    lines.push(format!("Items:        {}", invoice.items.len()));
    for item in &invoice.items {
        lines.push(format!(
            "  {} x {}{}",
            item.quantity,
            item.description,
            item.unit_price
                .map(|p| format!(" @ {}", p))
                .unwrap_or_default()
        ));
    }
    lines.push(format!(
        "Subtotal:     {}",
        invoice.subtotal.as_deref().unwrap_or("-")
    ));
    lines.push(format!(
        "Total:        {}",
        invoice.total.as_deref().unwrap_or("-")
    ));
    if let Some(validation) = &invoice.validation {
        lines.push(format!("Validation:   {}", validation.summary));
        for finding in validation.errors.iter().chain(validation.warnings.iter()) {
            lines.push(format!("  [{:?}] {}: {}", finding.severity, finding.kind, finding.message));
        }
    }
    lines.join("\n")
}
