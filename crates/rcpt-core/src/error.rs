//! Error types for the rcpt-core library.
//!
//! The extraction engine itself never fails: every stage degrades to a
//! missing field or a generic description. Errors only exist at the
//! boundary, where documents are read from disk and configuration is
//! loaded.

use thiserror::Error;

/// Main error type for the rcpt library.
#[derive(Error, Debug)]
pub enum RcptError {
    /// PDF processing error.
    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    /// Document could not be acquired as text.
    #[error("source error: {0}")]
    Source(#[from] SourceError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors related to PDF text-layer extraction.
#[derive(Error, Debug)]
pub enum PdfError {
    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// Failed to extract text from PDF.
    #[error("failed to extract text: {0}")]
    TextExtraction(String),

    /// The PDF is encrypted and cannot be processed.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF is empty or has no pages.
    #[error("PDF has no pages")]
    NoPages,
}

/// Errors raised while turning a file on disk into a [`RawDocument`].
///
/// [`RawDocument`]: crate::models::receipt::RawDocument
#[derive(Error, Debug)]
pub enum SourceError {
    /// The document exists but nothing readable came out of it.
    #[error("document unreadable: {0}")]
    Unreadable(String),

    /// An image was supplied without OCR text from the external engine.
    #[error("no OCR text available for {0}")]
    OcrUnavailable(String),

    /// The file type is not a receipt format.
    #[error("unsupported file format: {0}")]
    UnsupportedFormat(String),
}

/// Result type for the rcpt library.
pub type Result<T> = std::result::Result<T, RcptError>;
