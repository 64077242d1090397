//! Configuration structures for the receipt pipeline.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::RcptError;

/// Main configuration for the rcpt pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RcptConfig {
    /// Field extraction configuration.
    pub extraction: ExtractionConfig,

    /// Input discovery and text acquisition configuration.
    pub input: InputConfig,

    /// Output configuration.
    pub output: OutputConfig,
}

/// How to choose between several currency-anchored amounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CostSelection {
    /// Last amount in document order (totals follow subtotals).
    #[default]
    Last,
    /// Largest amount on the page.
    Largest,
}

/// Field extraction configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Also flag repaired (corrected) date and cost values for review.
    pub strict_review: bool,

    /// Classify ties as food/drink when the text has an amount and a date.
    pub food_fallback_on_tie: bool,

    /// Policy for picking among several currency-anchored amounts.
    pub cost_selection: CostSelection,

    /// Amounts above this are treated as implausible and ignored.
    pub max_plausible_cost: Decimal,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            strict_review: false,
            food_fallback_on_tie: true,
            cost_selection: CostSelection::Last,
            max_plausible_cost: Decimal::new(999_999, 2),
        }
    }
}

/// Input discovery and text acquisition configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Case-insensitive filename fragments that are never processed.
    pub skip_patterns: Vec<String>,

    /// File extensions treated as receipts.
    pub extensions: Vec<String>,

    /// Garbled glyph runs per hundred characters above which a PDF text
    /// layer is considered damaged.
    pub garbled_threshold_percent: f32,

    /// Native text shorter than this is ignored in favour of OCR text.
    pub min_native_text_length: usize,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            skip_patterns: vec!["pre-approval".to_string()],
            extensions: ["pdf", "jpg", "jpeg", "png", "txt", "eml"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            garbled_threshold_percent: 5.0,
            min_native_text_length: 20,
        }
    }
}

impl InputConfig {
    /// Whether a file name matches one of the skip patterns.
    pub fn is_skipped(&self, filename: &str) -> bool {
        let lower = filename.to_lowercase();
        self.skip_patterns
            .iter()
            .any(|p| !p.is_empty() && lower.contains(&p.to_lowercase()))
    }

    /// Whether a file extension is a receipt format.
    pub fn accepts_extension(&self, ext: &str) -> bool {
        self.extensions.iter().any(|e| e.eq_ignore_ascii_case(ext))
    }
}

/// Output configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Name of the CSV written into the batch directory.
    pub csv_name: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            csv_name: "expenses.csv".to_string(),
        }
    }
}

impl RcptConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, RcptError> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| RcptError::Config(e.to_string()))
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &Path) -> Result<(), RcptError> {
        let content =
            serde_json::to_string_pretty(self).map_err(|e| RcptError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
