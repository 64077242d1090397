//! Data models for receipts and configuration.

pub mod config;
pub mod receipt;

pub use config::{CostSelection, ExtractionConfig, InputConfig, OutputConfig, RcptConfig};
pub use receipt::{
    ClassificationResult, Confidence, ExpenseRecord, FieldOutcome, Money, RawDocument,
    ReceiptType,
};
