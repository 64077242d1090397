//! PDF text-layer acquisition.

mod extractor;

pub use extractor::{PdfExtractor, PdfText};

use lazy_static::lazy_static;
use regex::Regex;

use crate::error::PdfError;

/// Result type for PDF operations.
pub type Result<T> = std::result::Result<T, PdfError>;

/// Trait for PDF text extraction implementations.
pub trait PdfProcessor {
    /// Load a PDF from bytes.
    fn load(&mut self, data: &[u8]) -> Result<()>;

    /// Get the number of pages in the PDF.
    fn page_count(&self) -> u32;

    /// Extract the text layer of the entire PDF.
    fn extract_text(&self) -> Result<String>;
}

lazy_static! {
    /// Runs of glyphs that never occur in a clean receipt text layer.
    static ref GARBLED_RUN: Regex = Regex::new(r"[^\w\s£.,:\-/()]{2,}").unwrap();
}

/// Garbled glyph runs per hundred characters.
pub fn garbled_runs_per_hundred(text: &str) -> f32 {
    let chars = text.chars().count();
    if chars == 0 {
        return 0.0;
    }
    let runs = GARBLED_RUN.find_iter(text).count();
    runs as f32 * 100.0 / chars as f32
}

/// Whether a text layer looks structurally damaged.
pub fn is_garbled(text: &str, threshold_percent: f32) -> bool {
    garbled_runs_per_hundred(text) > threshold_percent
}
