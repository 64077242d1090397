//! Turn receipt files on disk into [`RawDocument`]s.
//!
//! PDFs contribute their embedded text layer. OCR text comes from an
//! external engine as a sidecar `.txt` next to the document, either
//! `<stem>.txt` or `<file name>.txt`. A plain `.txt` input is OCR text.
//! Saved `.eml` confirmations contribute their subject, sender and plain
//! text body.

use std::path::{Path, PathBuf};

use mail_parser::MessageParser;
use tracing::{debug, warn};

use crate::error::{RcptError, Result, SourceError};
use crate::models::{InputConfig, RawDocument};
use crate::pdf::PdfExtractor;

/// Read a receipt file into a document.
pub fn load_document(path: &Path, config: &InputConfig) -> Result<RawDocument> {
    let filename = file_name(path);
    let ext = extension(path);

    if !config.accepts_extension(&ext) {
        return Err(SourceError::UnsupportedFormat(filename).into());
    }

    let mut document = RawDocument::new(&filename);

    if ext == "txt" {
        let text = std::fs::read_to_string(path)?;
        return Ok(document.with_ocr_text(text));
    }

    if ext == "eml" {
        let raw = std::fs::read(path)?;
        let text = email_text(&raw)
            .ok_or_else(|| SourceError::Unreadable(format!("{filename} is not an email")))?;
        return Ok(document.with_ocr_text(text));
    }

    let sidecar = read_sidecar(path);

    if ext == "pdf" {
        match PdfExtractor::open(path) {
            Ok(pdf) => {
                let layer = pdf.read_text(config.garbled_threshold_percent);
                debug!(
                    "{}: {} pages, {} chars of native text",
                    filename,
                    layer.page_count,
                    layer.text.len()
                );
                if layer.text.trim().chars().count() >= config.min_native_text_length {
                    document = document
                        .with_native_text(layer.text)
                        .with_native_text_garbled(layer.garbled);
                }
            }
            Err(e) if sidecar.is_none() => return Err(e.into()),
            Err(e) => warn!("{}: {}, using OCR text", filename, e),
        }
    }

    match sidecar {
        Some(text) => document = document.with_ocr_text(text),
        None if document.native_text.is_none() => {
            return Err(if ext == "pdf" {
                SourceError::Unreadable(format!("{filename} has no text layer and no OCR text"))
            } else {
                SourceError::OcrUnavailable(filename)
            }
            .into());
        }
        None => {}
    }

    Ok(document)
}

/// Read a document, degrading any failure to an empty document.
///
/// The failure is logged; the engine then reports every field missing.
pub fn load_or_empty(path: &Path, config: &InputConfig) -> RawDocument {
    load_document(path, config).unwrap_or_else(|e: RcptError| {
        warn!("{}: {}", path.display(), e);
        RawDocument::new(file_name(path))
    })
}

/// Candidate OCR sidecar paths for a document.
pub fn sidecar_paths(path: &Path) -> [PathBuf; 2] {
    let mut full = path.as_os_str().to_owned();
    full.push(".txt");
    [path.with_extension("txt"), PathBuf::from(full)]
}

/// Whether a `.txt` file is the OCR sidecar of another receipt in the
/// same directory.
pub fn is_sidecar(path: &Path, config: &InputConfig) -> bool {
    if extension(path) != "txt" {
        return false;
    }

    // "<file name>.txt"
    let stripped = path.with_extension("");
    if stripped.extension().is_some() && stripped.exists() {
        return true;
    }

    // "<stem>.txt"
    config
        .extensions
        .iter()
        .filter(|ext| !ext.eq_ignore_ascii_case("txt"))
        .any(|ext| path.with_extension(ext).exists())
}

/// Subject, sender and text body of a MIME message, one per line.
///
/// HTML-only messages are flattened to text by the parser.
fn email_text(raw: &[u8]) -> Option<String> {
    let message = MessageParser::default().parse(raw)?;
    let mut lines = Vec::new();

    if let Some(subject) = message.subject() {
        lines.push(subject.to_string());
    }
    if let Some(sender) = message.from().and_then(|from| from.first()) {
        lines.extend(sender.name().map(str::to_string));
        lines.extend(sender.address().map(str::to_string));
    }

    let mut part = 0;
    while let Some(body) = message.body_text(part) {
        lines.push(body.replace("\r\n", "\n").trim().to_string());
        part += 1;
    }

    if lines.iter().all(|line| line.trim().is_empty()) {
        return None;
    }
    Some(lines.join("\n"))
}

fn read_sidecar(path: &Path) -> Option<String> {
    sidecar_paths(path).iter().find(|p| p.is_file()).and_then(|p| {
        debug!("Reading OCR text from {}", p.display());
        std::fs::read_to_string(p)
            .inspect_err(|e| warn!("{}: {}", p.display(), e))
            .ok()
    })
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn extension(path: &Path) -> String {
    path.extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_text_file_is_ocr_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("coffee.txt");
        std::fs::write(&path, "Costa £3.40").unwrap();

        let doc = load_document(&path, &InputConfig::default()).unwrap();
        assert_eq!(doc.filename, "coffee.txt");
        assert_eq!(doc.ocr_text.as_deref(), Some("Costa £3.40"));
        assert_eq!(doc.native_text, None);
    }

    #[test]
    fn test_image_uses_sidecar() {
        let dir = tempfile::tempdir().unwrap();
        let image = dir.path().join("receipt.jpg");
        std::fs::write(&image, [0xff, 0xd8, 0xff]).unwrap();
        std::fs::write(dir.path().join("receipt.jpg.txt"), "Greggs £2.10").unwrap();

        let doc = load_document(&image, &InputConfig::default()).unwrap();
        assert_eq!(doc.ocr_text.as_deref(), Some("Greggs £2.10"));
        assert!(is_sidecar(&dir.path().join("receipt.jpg.txt"), &InputConfig::default()));
    }

    #[test]
    fn test_stem_sidecar() {
        let dir = tempfile::tempdir().unwrap();
        let image = dir.path().join("parking.png");
        std::fs::write(&image, [0x89, 0x50]).unwrap();
        std::fs::write(dir.path().join("parking.txt"), "RingGo £4.00").unwrap();

        let doc = load_document(&image, &InputConfig::default()).unwrap();
        assert_eq!(doc.ocr_text.as_deref(), Some("RingGo £4.00"));
        assert!(is_sidecar(&dir.path().join("parking.txt"), &InputConfig::default()));
    }

    #[test]
    fn test_image_without_ocr_text() {
        let dir = tempfile::tempdir().unwrap();
        let image = dir.path().join("lonely.jpg");
        std::fs::write(&image, [0xff, 0xd8]).unwrap();

        let err = load_document(&image, &InputConfig::default()).unwrap_err();
        assert!(matches!(err, RcptError::Source(SourceError::OcrUnavailable(_))));

        let doc = load_or_empty(&image, &InputConfig::default());
        assert_eq!(doc.filename, "lonely.jpg");
        assert!(!doc.has_text());
    }

    #[test]
    fn test_broken_pdf_falls_back_to_sidecar() {
        let dir = tempfile::tempdir().unwrap();
        let pdf = dir.path().join("ticket.pdf");
        std::fs::write(&pdf, "not really a pdf").unwrap();

        assert!(matches!(
            load_document(&pdf, &InputConfig::default()),
            Err(RcptError::Pdf(_))
        ));

        std::fs::write(dir.path().join("ticket.txt"), "Trainline £10.00").unwrap();
        let doc = load_document(&pdf, &InputConfig::default()).unwrap();
        assert_eq!(doc.ocr_text.as_deref(), Some("Trainline £10.00"));
    }

    const BOOKING_EMAIL: &str = "From: Trainline <auto-confirm@info.thetrainline.com>\r\n\
        To: someone@example.com\r\n\
        Subject: Your booking confirmation\r\n\
        Content-Type: text/plain; charset=utf-8\r\n\
        \r\n\
        Your return trip Cardiff Central to London Paddington\r\n\
        14 Oct 2025, 09:15\r\n\
        Total amount: \u{a3}124.29\r\n";

    #[test]
    fn test_email_body_is_ocr_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("booking.eml");
        std::fs::write(&path, BOOKING_EMAIL).unwrap();

        let doc = load_document(&path, &InputConfig::default()).unwrap();
        let text = doc.ocr_text.unwrap();
        assert!(text.starts_with("Your booking confirmation\nTrainline\nauto-confirm@info.thetrainline.com\n"));
        assert!(text.contains("Your return trip Cardiff Central to London Paddington"));
        assert!(text.contains("Total amount: £124.29"));
        assert_eq!(doc.native_text, None);
    }

    #[test]
    fn test_email_booking_extracts() {
        use crate::receipt::{ReceiptEngine, ReceiptProcessor};
        use crate::models::ReceiptType;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("booking.eml");
        std::fs::write(&path, BOOKING_EMAIL).unwrap();

        let doc = load_document(&path, &InputConfig::default()).unwrap();
        let record = ReceiptEngine::new().process(&doc);
        assert_eq!(record.receipt_type, ReceiptType::Train);
        assert_eq!(record.date, chrono::NaiveDate::from_ymd_opt(2025, 10, 14));
        assert_eq!(record.cost.map(|c| c.to_string()), Some("£124.29".to_string()));
        assert_eq!(
            record.description,
            "Return train from Cardiff Central to London Paddington"
        );
    }

    #[test]
    fn test_empty_email_is_unreadable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.eml");
        std::fs::write(&path, "").unwrap();

        let err = load_document(&path, &InputConfig::default()).unwrap_err();
        assert!(matches!(err, RcptError::Source(SourceError::Unreadable(_))));
    }

    #[test]
    fn test_unsupported_extension() {
        let err = load_document(Path::new("notes.docx"), &InputConfig::default()).unwrap_err();
        assert!(matches!(err, RcptError::Source(SourceError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_plain_text_is_not_sidecar() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("taxi.txt");
        std::fs::write(&path, "Taxi £9.00").unwrap();
        assert!(!is_sidecar(&path, &InputConfig::default()));
    }
}
