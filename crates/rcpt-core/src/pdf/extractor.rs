//! PDF text extraction using lopdf and pdf-extract.

use std::path::Path;

use lopdf::Document;
use tracing::{debug, warn};

use super::{PdfProcessor, Result, is_garbled};
use crate::error::PdfError;

/// Text layer of a PDF and its quality verdict.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PdfText {
    /// Extracted text (may be empty for scanned documents).
    pub text: String,
    /// Number of pages.
    pub page_count: u32,
    /// The text layer looked damaged.
    pub garbled: bool,
}

/// PDF text extractor using lopdf.
#[derive(Default)]
pub struct PdfExtractor {
    document: Option<Document>,
    raw_data: Vec<u8>,
}

impl PdfExtractor {
    /// Create a new PDF extractor.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a PDF file from disk.
    pub fn open(path: &Path) -> Result<Self> {
        let data = std::fs::read(path).map_err(|e| PdfError::Parse(e.to_string()))?;
        let mut extractor = Self::new();
        extractor.load(&data)?;
        Ok(extractor)
    }

    /// Extract the text layer and judge whether it is usable.
    pub fn read_text(&self, garbled_threshold_percent: f32) -> PdfText {
        let text = match self.extract_text() {
            Ok(text) => text,
            Err(e) => {
                warn!("No text layer extracted: {}", e);
                String::new()
            }
        };
        let garbled = is_garbled(&text, garbled_threshold_percent);
        if garbled {
            debug!("PDF text layer looks garbled");
        }

        PdfText {
            page_count: self.page_count(),
            garbled,
            text,
        }
    }
}

impl PdfProcessor for PdfExtractor {
    fn load(&mut self, data: &[u8]) -> Result<()> {
        let mut doc = Document::load_mem(data).map_err(|e| PdfError::Parse(e.to_string()))?;

        // Owner-password-only PDFs open with an empty user password
        if doc.is_encrypted() {
            if doc.decrypt("").is_err() {
                return Err(PdfError::Encrypted);
            }
            debug!("Decrypted PDF with empty password");

            // pdf_extract reads the decrypted copy
            let mut decrypted_data = Vec::new();
            doc.save_to(&mut decrypted_data)
                .map_err(|e| PdfError::Parse(format!("Failed to save decrypted PDF: {}", e)))?;
            self.raw_data = decrypted_data;
        } else {
            self.raw_data = data.to_vec();
        }

        let page_count = doc.get_pages().len();
        if page_count == 0 {
            return Err(PdfError::NoPages);
        }

        debug!("Loaded PDF with {} pages", page_count);
        self.document = Some(doc);
        Ok(())
    }

    fn page_count(&self) -> u32 {
        self.document
            .as_ref()
            .map(|doc| doc.get_pages().len() as u32)
            .unwrap_or(0)
    }

    fn extract_text(&self) -> Result<String> {
        if self.document.is_none() {
            return Err(PdfError::Parse("No document loaded".to_string()));
        }
        pdf_extract::extract_text_from_mem(&self.raw_data)
            .map_err(|e| PdfError::TextExtraction(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pdf_extractor_new() {
        let extractor = PdfExtractor::new();
        assert!(extractor.document.is_none());
        assert_eq!(extractor.page_count(), 0);
        assert!(extractor.extract_text().is_err());
    }

    #[test]
    fn test_load_rejects_non_pdf() {
        let mut extractor = PdfExtractor::new();
        let err = extractor.load(b"not a pdf at all").unwrap_err();
        assert!(matches!(err, PdfError::Parse(_)));
    }

    #[test]
    fn test_read_text_without_document_is_empty() {
        let text = PdfExtractor::new().read_text(5.0);
        assert_eq!(text, PdfText::default());
    }
}
