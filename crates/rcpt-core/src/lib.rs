//! Core library for receipt OCR text processing.
//!
//! This crate provides:
//! - Receipt text normalization with scoped OCR confusable repair
//! - Receipt type classification by weighted signatures
//! - Date, cost and description extraction with per-field confidence
//! - PDF text-layer acquisition and OCR sidecar loading
//! - Expense records ready for CSV export

pub mod error;
pub mod models;
pub mod pdf;
pub mod receipt;
pub mod source;

pub use error::{PdfError, RcptError, Result, SourceError};
pub use models::config::{CostSelection, ExtractionConfig, InputConfig, OutputConfig, RcptConfig};
pub use models::receipt::{
    ClassificationResult, Confidence, ExpenseRecord, FieldOutcome, Money, RawDocument, ReceiptType,
};
pub use pdf::{PdfExtractor, PdfProcessor};
pub use receipt::{CanonicalText, ReceiptAnalysis, ReceiptEngine, ReceiptProcessor};
pub use source::{is_sidecar, load_document, load_or_empty};
