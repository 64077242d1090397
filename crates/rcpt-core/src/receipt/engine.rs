//! The receipt pipeline: normalize, classify, extract, assemble.

use std::time::Instant;

use serde::Serialize;
use tracing::{debug, info};

use super::assembler::Assembler;
use super::classifier::Classifier;
use super::extractor::{ExtractedFields, FieldExtractor};
use super::normalizer::{CanonicalText, normalize};
use crate::models::{ClassificationResult, ExpenseRecord, RawDocument, RcptConfig};

/// Full trace of one pipeline run.
#[derive(Debug, Clone, Serialize)]
pub struct ReceiptAnalysis {
    /// Final record.
    pub record: ExpenseRecord,
    /// Classification scores.
    pub classification: ClassificationResult,
    /// Per-field outcomes with their confidence.
    pub fields: ExtractedFields,
    /// Canonical text the fields were read from.
    pub text: String,
    /// Processing time in milliseconds.
    pub processing_time_ms: u64,
}

/// Anything that turns a document into an expense record.
pub trait ReceiptProcessor {
    /// Process one document. Never fails.
    fn process(&self, document: &RawDocument) -> ExpenseRecord;
}

/// Stateless pipeline; safe to share between threads.
#[derive(Debug, Clone, Default)]
pub struct ReceiptEngine {
    classifier: Classifier,
    extractor: FieldExtractor,
    assembler: Assembler,
}

impl ReceiptEngine {
    /// Create an engine with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an engine from the extraction section of a configuration.
    pub fn from_config(config: &RcptConfig) -> Self {
        let extraction = &config.extraction;
        Self {
            classifier: Classifier::new().with_food_fallback(extraction.food_fallback_on_tie),
            extractor: FieldExtractor::from_config(extraction),
            assembler: Assembler::new().strict(extraction.strict_review),
        }
    }

    /// Flag corrected values for review as well.
    pub fn with_strict_review(mut self, strict: bool) -> Self {
        self.assembler = self.assembler.strict(strict);
        self
    }

    /// Run the pipeline and keep every intermediate result.
    pub fn analyze(&self, document: &RawDocument) -> ReceiptAnalysis {
        let start = Instant::now();

        let text = normalize(document);
        let (classification, fields) = self.run(&text);
        let record = self
            .assembler
            .assemble(&document.filename, classification.receipt_type, fields.clone());

        let processing_time_ms = start.elapsed().as_millis() as u64;
        info!(
            "{}: {} ({}), review: {}",
            record.filename,
            record.receipt_type,
            record.description,
            if record.needs_review() { record.review_reasons.join(", ") } else { "none".to_string() }
        );

        ReceiptAnalysis {
            record,
            classification,
            fields,
            text: text.body,
            processing_time_ms,
        }
    }

    fn run(&self, text: &CanonicalText) -> (ClassificationResult, ExtractedFields) {
        if text.is_empty() {
            debug!("Empty text, every field will be missing");
        }
        let classification = self.classifier.classify(text);
        let fields = self.extractor.extract(classification.receipt_type, text);
        (classification, fields)
    }
}

impl ReceiptProcessor for ReceiptEngine {
    fn process(&self, document: &RawDocument) -> ExpenseRecord {
        self.analyze(document).record
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Confidence, ReceiptType};
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn process_ocr(raw: &str) -> ExpenseRecord {
        ReceiptEngine::new().process(&RawDocument::new("receipt.jpg").with_ocr_text(raw))
    }

    #[test]
    fn test_clean_train_round_trip() {
        let record = process_ocr("Trainline Cardiff to London 14/10/2025 £124.29");

        assert_eq!(record.receipt_type, ReceiptType::Train);
        assert_eq!(record.date, NaiveDate::from_ymd_opt(2025, 10, 14));
        assert_eq!(record.date_field(), "14/10/2025");
        assert_eq!(record.cost.map(|c| c.plain()), Some("124.29".to_string()));
        assert!(record.description.contains("Cardiff"));
        assert!(record.description.contains("London"));
        assert!(record.review_reasons.is_empty());
    }

    #[test]
    fn test_corrupted_cost_is_corrected() {
        let analysis = ReceiptEngine::new()
            .analyze(&RawDocument::new("cafe.jpg").with_ocr_text("Cafe\nTotal £4.?0\n03/11/2025"));

        assert_eq!(analysis.fields.cost.confidence, Confidence::Corrected);
        assert_eq!(analysis.record.cost_field(), "£4.70");
        assert!(analysis.record.review_reasons.is_empty());
    }

    #[test]
    fn test_corrupted_total_beats_item_price() {
        let analysis = ReceiptEngine::new().analyze(
            &RawDocument::new("lunch.jpg").with_ocr_text("Wasabi\nKatsu curry\n3.20\nTotal £8.?0\n03/11/2025"),
        );

        assert_eq!(analysis.record.receipt_type, ReceiptType::FoodDrink);
        assert_eq!(analysis.fields.cost.confidence, Confidence::Corrected);
        assert_eq!(analysis.record.cost_field(), "£8.70");
    }

    #[test]
    fn test_corrupted_month_name_date() {
        let analysis = ReceiptEngine::new()
            .analyze(&RawDocument::new("coffee.jpg").with_ocr_text("Starbucks 14 Oct 2O25 £3.40"));

        assert_eq!(analysis.record.date, NaiveDate::from_ymd_opt(2025, 10, 14));
        assert_eq!(analysis.fields.date.confidence, Confidence::Corrected);
    }

    #[test]
    fn test_strict_review_flags_corrections() {
        let engine = ReceiptEngine::new().with_strict_review(true);
        let record = engine.process(&RawDocument::new("cafe.jpg").with_ocr_text("Cafe\nTotal £4.?0\n03/11/2025"));
        assert_eq!(record.review_reasons, vec!["corrected cost"]);
    }

    #[test]
    fn test_empty_document() {
        let record = ReceiptEngine::new().process(&RawDocument::new("blank.jpg"));

        assert_eq!(record.receipt_type, ReceiptType::Unknown);
        assert_eq!(record.date, None);
        assert_eq!(record.cost, None);
        assert_eq!(record.description, "Unknown expense");
        assert_eq!(record.review_reasons, vec!["missing date", "missing cost"]);
    }

    #[test]
    fn test_deterministic() {
        let engine = ReceiptEngine::new();
        let doc = RawDocument::new("hotel.pdf")
            .with_native_text("Premier Inn\n2 nights\nArrival 03/11/2025\nTotal £140.00");
        let first = engine.process(&doc);
        for _ in 0..5 {
            assert_eq!(engine.process(&doc), first);
        }
        assert_eq!(first.description, "2 night(s) at Premier Inn");
    }

    #[test]
    fn test_total_on_hostile_input() {
        let engine = ReceiptEngine::new();
        let inputs = [
            "\u{0}\u{1}\u{7f}£££...///---".to_string(),
            "£".repeat(10_000),
            "l0/O1/2O2S ££4.?? GBP GBPGBP".to_string(),
            "ü".repeat(5_000) + " £12.50 " + &"x".repeat(50_000),
            String::from_utf8_lossy(&(0u8..=255).cycle().take(20_000).collect::<Vec<u8>>()).into_owned(),
        ];

        for raw in inputs {
            let record = engine.process(&RawDocument::new("noise.txt").with_ocr_text(raw));
            assert!(!record.description.is_empty());
        }
    }

    #[test]
    fn test_config_is_applied() {
        let mut config = RcptConfig::default();
        config.extraction.food_fallback_on_tie = false;
        let record = ReceiptEngine::from_config(&config)
            .process(&RawDocument::new("shop.jpg").with_ocr_text("The Corner Shop 03/11/2025 £6.20"));
        assert_eq!(record.receipt_type, ReceiptType::Unknown);
        assert!(record.review_reasons.is_empty());
    }
}
