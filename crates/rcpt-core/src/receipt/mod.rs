//! Receipt classification and field extraction.
//!
//! Data flows strictly forward: [`normalizer`] → [`classifier`] →
//! [`extractor`] → [`assembler`]. [`ReceiptEngine`] runs the whole chain.

pub mod assembler;
pub mod classifier;
mod engine;
pub mod extractor;
pub mod normalizer;
pub mod rules;

pub use assembler::Assembler;
pub use classifier::{Classifier, classify};
pub use engine::{ReceiptAnalysis, ReceiptEngine, ReceiptProcessor};
pub use extractor::{ExtractedFields, FieldExtractor, extract};
pub use normalizer::{CanonicalText, Repair, normalize};
