//! Receipt data models: the engine's input document, its intermediate
//! outcomes and the final expense record.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Text of one receipt document as handed over by the acquisition layer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawDocument {
    /// File name (no directory component).
    pub filename: String,

    /// Text layer embedded in the source (PDF), if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub native_text: Option<String>,

    /// Text produced by an external OCR engine, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ocr_text: Option<String>,

    /// The native text looked structurally damaged (garbled glyph runs).
    #[serde(default)]
    pub native_text_garbled: bool,
}

impl RawDocument {
    /// Create a document with no text at all.
    pub fn new(filename: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            ..Self::default()
        }
    }

    /// Set the native text layer.
    pub fn with_native_text(mut self, text: impl Into<String>) -> Self {
        self.native_text = Some(text.into());
        self
    }

    /// Set the OCR text.
    pub fn with_ocr_text(mut self, text: impl Into<String>) -> Self {
        self.ocr_text = Some(text.into());
        self
    }

    /// Flag the native text as garbled.
    pub fn with_native_text_garbled(mut self, garbled: bool) -> Self {
        self.native_text_garbled = garbled;
        self
    }

    /// Whether the document carries any non-blank text.
    pub fn has_text(&self) -> bool {
        [&self.native_text, &self.ocr_text]
            .iter()
            .any(|t| t.as_deref().is_some_and(|s| !s.trim().is_empty()))
    }
}

/// Receipt category used to dispatch extraction strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReceiptType {
    Train,
    Hotel,
    Parking,
    FoodDrink,
    Metro,
    Flight,
    Unknown,
}

impl ReceiptType {
    /// Every type, in the fixed order used for scoring and tie detection.
    pub const ALL: [ReceiptType; 7] = [
        ReceiptType::Train,
        ReceiptType::Hotel,
        ReceiptType::Parking,
        ReceiptType::FoodDrink,
        ReceiptType::Metro,
        ReceiptType::Flight,
        ReceiptType::Unknown,
    ];

    /// Short lowercase name, also accepted by [`FromStr`].
    pub fn as_str(&self) -> &'static str {
        match self {
            ReceiptType::Train => "train",
            ReceiptType::Hotel => "hotel",
            ReceiptType::Parking => "parking",
            ReceiptType::FoodDrink => "food_drink",
            ReceiptType::Metro => "metro",
            ReceiptType::Flight => "flight",
            ReceiptType::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ReceiptType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReceiptType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "train" => Ok(ReceiptType::Train),
            "hotel" => Ok(ReceiptType::Hotel),
            "parking" => Ok(ReceiptType::Parking),
            "food_drink" | "food" => Ok(ReceiptType::FoodDrink),
            "metro" | "tube" => Ok(ReceiptType::Metro),
            "flight" => Ok(ReceiptType::Flight),
            "unknown" | "other" => Ok(ReceiptType::Unknown),
            other => Err(format!("Unknown receipt type: '{other}'")),
        }
    }
}

/// Outcome of classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationResult {
    /// Selected type.
    pub receipt_type: ReceiptType,
    /// Cumulative signature weight of the best-scoring type.
    pub score: u32,
    /// Cumulative signature weight of the second-best type.
    pub runner_up_score: u32,
    /// The generic amount-plus-date heuristic decided a tie.
    pub fallback_applied: bool,
}

/// How a field value was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    /// Matched directly in clean text.
    Confirmed,
    /// Recovered by repairing damaged input.
    Corrected,
    /// No usable value found.
    Missing,
}

/// A single field value together with its confidence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldOutcome<T> {
    pub value: Option<T>,
    pub confidence: Confidence,
}

impl<T> FieldOutcome<T> {
    pub fn confirmed(value: T) -> Self {
        Self { value: Some(value), confidence: Confidence::Confirmed }
    }

    pub fn corrected(value: T) -> Self {
        Self { value: Some(value), confidence: Confidence::Corrected }
    }

    pub fn missing() -> Self {
        Self { value: None, confidence: Confidence::Missing }
    }

    /// `Confirmed` or `Corrected` depending on `repaired`.
    pub fn found(value: T, repaired: bool) -> Self {
        if repaired {
            Self::corrected(value)
        } else {
            Self::confirmed(value)
        }
    }

    pub fn is_missing(&self) -> bool {
        self.value.is_none()
    }

    pub fn is_corrected(&self) -> bool {
        self.confidence == Confidence::Corrected
    }
}

impl<T> From<Option<T>> for FieldOutcome<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or_else(Self::missing, Self::confirmed)
    }
}

/// A GBP amount held with exactly two decimal places.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Money(Decimal);

impl Money {
    /// Round to pence and pin the scale so rendering always shows two digits.
    pub fn from_decimal(amount: Decimal) -> Self {
        let mut amount = amount.round_dp(2);
        amount.rescale(2);
        Money(amount)
    }

    pub fn from_pence(pence: i64) -> Self {
        Self::from_decimal(Decimal::new(pence, 2))
    }

    /// Build from pound and pence digit strings (`"1,234"`, `"5"` or `"50"`).
    pub fn from_parts(pounds: &str, pence: &str) -> Option<Self> {
        let pounds: String = pounds.chars().filter(|c| c.is_ascii_digit()).collect();
        if pounds.is_empty() || pence.is_empty() || pence.len() > 2 {
            return None;
        }
        if !pence.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
        let pence = if pence.len() == 1 { format!("{pence}0") } else { pence.to_string() };
        Decimal::from_str(&format!("{pounds}.{pence}"))
            .ok()
            .map(Self::from_decimal)
    }

    pub fn amount(&self) -> Decimal {
        self.0
    }

    /// Digits only, e.g. `124.29`.
    pub fn plain(&self) -> String {
        format!("{:.2}", self.0)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "£{:.2}", self.0)
    }
}

/// Final per-document output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseRecord {
    /// Source file name.
    pub filename: String,

    /// Category the receipt was classified as.
    pub receipt_type: ReceiptType,

    /// Transaction date, rendered `DD/MM/YYYY`.
    #[serde(with = "dmy_date")]
    pub date: Option<NaiveDate>,

    /// Total cost in GBP.
    pub cost: Option<Money>,

    /// Human-readable description, never empty.
    pub description: String,

    /// Reasons this record needs manual review, in fixed order.
    pub review_reasons: Vec<String>,
}

impl ExpenseRecord {
    pub fn needs_review(&self) -> bool {
        !self.review_reasons.is_empty()
    }

    /// `DD/MM/YYYY`, or empty when no date was found.
    pub fn date_field(&self) -> String {
        self.date.map(format_date).unwrap_or_default()
    }

    /// `£NNN.NN`, or empty when no cost was found.
    pub fn cost_field(&self) -> String {
        self.cost.map(|c| c.to_string()).unwrap_or_default()
    }

    /// `REVIEW: reason, reason`, or empty.
    pub fn review_field(&self) -> String {
        if self.review_reasons.is_empty() {
            String::new()
        } else {
            format!("REVIEW: {}", self.review_reasons.join(", "))
        }
    }
}

/// Render a date the way expense sheets expect it.
pub fn format_date(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

mod dmy_date {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(date: &Option<NaiveDate>, s: S) -> Result<S::Ok, S::Error> {
        match date {
            Some(d) => s.serialize_str(&super::format_date(*d)),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<NaiveDate>, D::Error> {
        let raw: Option<String> = Option::deserialize(d)?;
        raw.filter(|s| !s.is_empty())
            .map(|s| NaiveDate::parse_from_str(&s, "%d/%m/%Y").map_err(serde::de::Error::custom))
            .transpose()
    }
}
