//! Merge field outcomes into the final expense record.

use super::extractor::ExtractedFields;
use super::rules::descriptions::UNKNOWN_EXPENSE;
use crate::models::{ExpenseRecord, ReceiptType};

pub const MISSING_DATE: &str = "missing date";
pub const MISSING_COST: &str = "missing cost";
pub const CORRECTED_DATE: &str = "corrected date";
pub const CORRECTED_COST: &str = "corrected cost";

/// Builds records and their review reasons.
///
/// Corrected values are accepted without review unless strict mode is on.
#[derive(Debug, Clone, Copy, Default)]
pub struct Assembler {
    strict: bool,
}

impl Assembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Also flag repaired date and cost values for review.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn assemble(
        &self,
        filename: &str,
        receipt_type: ReceiptType,
        fields: ExtractedFields,
    ) -> ExpenseRecord {
        let mut review_reasons = Vec::new();

        if fields.date.is_missing() {
            review_reasons.push(MISSING_DATE.to_string());
        }
        if fields.cost.is_missing() {
            review_reasons.push(MISSING_COST.to_string());
        }
        if self.strict {
            if fields.date.is_corrected() {
                review_reasons.push(CORRECTED_DATE.to_string());
            }
            if fields.cost.is_corrected() {
                review_reasons.push(CORRECTED_COST.to_string());
            }
        }

        let description = fields
            .description
            .value
            .filter(|d| !d.trim().is_empty())
            .unwrap_or_else(|| UNKNOWN_EXPENSE.to_string());

        ExpenseRecord {
            filename: filename.to_string(),
            receipt_type,
            date: fields.date.value,
            cost: fields.cost.value,
            description,
            review_reasons,
        }
    }
}
