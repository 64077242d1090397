//! Per-field extraction dispatched on receipt type.

use chrono::NaiveDate;
use serde::Serialize;

use super::normalizer::CanonicalText;
use super::rules::{COST_STRATEGIES, DATE_STRATEGIES, StrategyContext, describe, run_in_order};
use crate::models::{ExtractionConfig, FieldOutcome, Money, ReceiptType};

/// Outcomes of the three extracted fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractedFields {
    pub date: FieldOutcome<NaiveDate>,
    pub cost: FieldOutcome<Money>,
    /// Always confirmed and non-empty.
    pub description: FieldOutcome<String>,
}

/// Runs the date, cost and description strategies for one document.
#[derive(Debug, Clone, Default)]
pub struct FieldExtractor {
    config: ExtractionConfig,
}

impl FieldExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &ExtractionConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    /// Extract every field. Each field's strategies run independently.
    pub fn extract(&self, receipt_type: ReceiptType, text: &CanonicalText) -> ExtractedFields {
        let ctx = StrategyContext {
            receipt_type,
            config: &self.config,
        };

        ExtractedFields {
            date: run_in_order("date", &ctx, text, DATE_STRATEGIES),
            cost: run_in_order("cost", &ctx, text, COST_STRATEGIES),
            description: FieldOutcome::confirmed(describe(receipt_type, text)),
        }
    }
}

/// Extract with the default configuration.
pub fn extract(receipt_type: ReceiptType, text: &CanonicalText) -> ExtractedFields {
    FieldExtractor::new().extract(receipt_type, text)
}
