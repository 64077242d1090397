//! Batch command - turn a directory of receipts into an expenses CSV.

use std::collections::BTreeMap;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use clap::Args;
use console::style;
use glob::{Pattern, glob};
use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use rcpt_core::{
    ExpenseRecord, InputConfig, RawDocument, ReceiptEngine, ReceiptProcessor, ReceiptType,
    is_sidecar, load_or_empty,
};

use super::{load_config, write_csv};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Directory containing receipts
    #[arg(required = true)]
    dir: PathBuf,

    /// Output CSV (default: <dir>/expenses.csv)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Number of parallel workers
    #[arg(short = 'j', long, default_value = "4")]
    jobs: usize,

    /// Also flag corrected values for review
    #[arg(long)]
    strict: bool,

    /// Print a per-type summary after processing
    #[arg(long)]
    summary: bool,
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let config = load_config(config_path)?;

    if !args.dir.is_dir() {
        anyhow::bail!("Not a directory: {}", args.dir.display());
    }

    let files = discover(&args.dir, &config.input)?;
    if files.is_empty() {
        anyhow::bail!("No receipts found in {}", args.dir.display());
    }

    println!(
        "{} Found {} receipts to process",
        style("ℹ").blue(),
        files.len()
    );

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")
            .unwrap()
            .progress_chars("=>-"),
    );

    let engine = Arc::new(
        ReceiptEngine::from_config(&config)
            .with_strict_review(args.strict || config.extraction.strict_review),
    );
    let input = Arc::new(config.input.clone());
    let semaphore = Arc::new(Semaphore::new(args.jobs.max(1)));

    // Documents are independent; handles are awaited in discovery order
    let mut handles = Vec::with_capacity(files.len());
    for path in files {
        let name = file_name(&path);
        let permit = Arc::clone(&semaphore).acquire_owned().await?;
        let engine = Arc::clone(&engine);
        let input = Arc::clone(&input);
        let pb = pb.clone();

        let task = tokio::task::spawn_blocking(move || {
            let _permit = permit;
            let document = load_or_empty(&path, &input);
            let record = engine.process(&document);
            pb.inc(1);
            record
        });
        handles.push((name, task));
    }

    let records = collect_records(handles, &engine, &pb).await;

    pb.finish_and_clear();

    let output_path = args
        .output
        .unwrap_or_else(|| args.dir.join(&config.output.csv_name));
    write_csv(File::create(&output_path)?, &records)?;

    let flagged = records.iter().filter(|r| r.needs_review()).count();

    println!(
        "{} Wrote {} records to {}",
        style("✓").green(),
        records.len(),
        output_path.display()
    );
    if flagged > 0 {
        println!(
            "   {} need review",
            style(flagged).yellow()
        );
    }

    if args.summary {
        print_summary(&records);
    }

    debug!("Processed {} files in {:?}", records.len(), start.elapsed());

    Ok(())
}

/// Await every task in order. A task that panicked (a PDF library choking
/// on a font, say) yields an all-missing record for its file.
async fn collect_records(
    handles: Vec<(String, JoinHandle<ExpenseRecord>)>,
    engine: &ReceiptEngine,
    pb: &ProgressBar,
) -> Vec<ExpenseRecord> {
    let mut records = Vec::with_capacity(handles.len());

    for (name, handle) in handles {
        match handle.await {
            Ok(record) => records.push(record),
            Err(e) => {
                warn!("{}: processing failed: {}", name, e);
                pb.inc(1);
                records.push(engine.process(&RawDocument::new(name)));
            }
        }
    }

    records
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Receipt files directly inside `dir`, sorted by name.
///
/// Skip-listed names and OCR sidecars of other receipts are left out.
fn discover(dir: &Path, config: &InputConfig) -> anyhow::Result<Vec<PathBuf>> {
    let pattern = format!("{}/*", Pattern::escape(&dir.to_string_lossy()));

    let mut files: Vec<PathBuf> = glob(&pattern)?
        .filter_map(|r| r.ok())
        .filter(|p| p.is_file())
        .filter(|p| {
            let ext = p.extension().and_then(|e| e.to_str()).unwrap_or("");
            config.accepts_extension(ext)
        })
        .filter(|p| {
            let name = p.file_name().map(|n| n.to_string_lossy()).unwrap_or_default();
            if config.is_skipped(&name) {
                info!("Skipping {}", name);
                return false;
            }
            true
        })
        .filter(|p| {
            let sidecar = is_sidecar(p, config);
            if sidecar {
                debug!("{} is an OCR sidecar", p.display());
            }
            !sidecar
        })
        .collect();

    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

fn print_summary(records: &[ExpenseRecord]) {
    let mut by_type: BTreeMap<ReceiptType, (usize, usize)> = BTreeMap::new();
    for record in records {
        let entry = by_type.entry(record.receipt_type).or_default();
        entry.0 += 1;
        if record.needs_review() {
            entry.1 += 1;
        }
    }

    println!();
    println!("{}", style("Summary:").bold());
    for (receipt_type, (count, flagged)) in by_type {
        println!("  {:<12} {:>4}  ({} to review)", receipt_type.as_str(), count, flagged);
    }

    let flagged: Vec<_> = records.iter().filter(|r| r.needs_review()).collect();
    if !flagged.is_empty() {
        println!();
        println!("{}", style("Needs review:").yellow());
        for record in flagged {
            println!("  - {}: {}", record.filename, record.review_reasons.join(", "));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;

    fn names(files: &[PathBuf]) -> Vec<String> {
        files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn test_discover_filters_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        for name in [
            "b_hotel.txt",
            "a_train.pdf",
            "a_train.txt",
            "Pre-Approval Form.pdf",
            "notes.docx",
            "photo.jpg",
            "photo.jpg.txt",
        ] {
            fs::write(dir.path().join(name), "x").unwrap();
        }
        fs::create_dir(dir.path().join("nested.pdf")).unwrap();

        let files = discover(dir.path(), &InputConfig::default()).unwrap();
        assert_eq!(names(&files), vec!["a_train.pdf", "b_hotel.txt", "photo.jpg"]);
    }

    #[tokio::test]
    async fn test_panicked_task_yields_missing_record() {
        let engine = ReceiptEngine::new();
        let ok = tokio::task::spawn_blocking(|| {
            ReceiptEngine::new()
                .process(&RawDocument::new("a.txt").with_ocr_text("Costa 03/11/2025 £3.40"))
        });
        let broken = tokio::task::spawn_blocking(|| -> ExpenseRecord { panic!("bad font table") });

        let records = collect_records(
            vec![("a.txt".to_string(), ok), ("b.pdf".to_string(), broken)],
            &engine,
            &ProgressBar::hidden(),
        )
        .await;

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].filename, "a.txt");
        assert!(records[0].cost.is_some());
        assert_eq!(records[1].filename, "b.pdf");
        assert_eq!(records[1].description, "Unknown expense");
        assert_eq!(records[1].review_reasons, vec!["missing date", "missing cost"]);
    }

    #[test]
    fn test_discover_empty_dir() {
        let dir = tempfile::tempdir().unwrap();
        assert!(discover(dir.path(), &InputConfig::default()).unwrap().is_empty());
    }
}
