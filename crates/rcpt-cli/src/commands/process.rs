//! Process command - extract an expense record from a single receipt.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use console::style;
use tracing::{debug, info};

use rcpt_core::{ReceiptAnalysis, ReceiptEngine, load_or_empty};

use super::{load_config, write_csv};

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Input file (PDF, image with OCR sidecar, or OCR text)
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Also flag corrected values for review
    #[arg(long)]
    strict: bool,

    /// Show classification scores and field confidence
    #[arg(long)]
    show_confidence: bool,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output
    Csv,
    /// Plain text summary
    Text,
}

pub async fn run(args: ProcessArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let config = load_config(config_path)?;

    // Check input file exists
    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    let extension = args
        .input
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();
    if !config.input.accepts_extension(&extension) {
        anyhow::bail!("Unsupported file format: {}", extension);
    }

    info!("Processing file: {}", args.input.display());

    // Unreadable documents still produce a record, flagged for review
    let document = load_or_empty(&args.input, &config.input);

    let engine = ReceiptEngine::from_config(&config)
        .with_strict_review(args.strict || config.extraction.strict_review);
    let analysis = engine.analyze(&document);

    let output = format_analysis(&analysis, args.format)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        print!("{}", output);
    }

    if args.show_confidence {
        let classification = &analysis.classification;
        println!();
        println!(
            "{} Classification: {} (score {}, runner-up {}{})",
            style("ℹ").blue(),
            classification.receipt_type,
            classification.score,
            classification.runner_up_score,
            if classification.fallback_applied { ", tie fallback" } else { "" }
        );
        println!(
            "{} Date: {:?}, cost: {:?}",
            style("ℹ").blue(),
            analysis.fields.date.confidence,
            analysis.fields.cost.confidence
        );
        println!(
            "{} Processing time: {}ms",
            style("ℹ").blue(),
            analysis.processing_time_ms
        );
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

fn format_analysis(analysis: &ReceiptAnalysis, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(format!("{}\n", serde_json::to_string(&analysis.record)?)),
        OutputFormat::Csv => {
            let mut buf = Vec::new();
            write_csv(&mut buf, std::slice::from_ref(&analysis.record))?;
            Ok(String::from_utf8(buf)?)
        }
        OutputFormat::Text => Ok(format_text(analysis)),
    }
}

fn format_text(analysis: &ReceiptAnalysis) -> String {
    let record = &analysis.record;
    let or_dash = |s: String| if s.is_empty() { "-".to_string() } else { s };

    let mut output = String::new();
    output.push_str(&format!("File: {}\n", record.filename));
    output.push_str(&format!("Type: {}\n", record.receipt_type));
    output.push_str(&format!("Date: {}\n", or_dash(record.date_field())));
    output.push_str(&format!("Cost: {}\n", or_dash(record.cost_field())));
    output.push_str(&format!("Description: {}\n", record.description));
    if record.needs_review() {
        output.push_str(&format!("{}\n", record.review_field()));
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rcpt_core::RawDocument;

    fn analyze(raw: &str) -> ReceiptAnalysis {
        ReceiptEngine::new().analyze(&RawDocument::new("ticket.pdf").with_native_text(raw))
    }

    #[test]
    fn test_format_text() {
        let analysis = analyze("Trainline Cardiff to London 14/10/2025 £124.29");
        assert_eq!(
            format_text(&analysis),
            "File: ticket.pdf\n\
             Type: train\n\
             Date: 14/10/2025\n\
             Cost: £124.29\n\
             Description: Train from Cardiff to London\n"
        );
    }

    #[test]
    fn test_format_text_shows_review() {
        let analysis = analyze("");
        let text = format_text(&analysis);
        assert!(text.contains("Date: -\n"));
        assert!(text.ends_with("REVIEW: missing date, missing cost\n"));
    }

    #[test]
    fn test_format_json_uses_expense_fields() {
        let analysis = analyze("Trainline Cardiff to London 14/10/2025 £124.29");
        let json: serde_json::Value =
            serde_json::from_str(&format_analysis(&analysis, OutputFormat::Json).unwrap()).unwrap();
        assert_eq!(json["filename"], "ticket.pdf");
        assert_eq!(json["receipt_type"], "train");
        assert_eq!(json["date"], "14/10/2025");
    }
}
