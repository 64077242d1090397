//! Receipt type classification by weighted signatures.

use tracing::{debug, trace};

use super::normalizer::CanonicalText;
use super::rules::{has_currency_amount, has_date_shape, signatures_for};
use crate::models::{ClassificationResult, ReceiptType};

/// Scores text against every type's signature table.
#[derive(Debug, Clone)]
pub struct Classifier {
    food_fallback: bool,
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Classifier {
    pub fn new() -> Self {
        Self { food_fallback: true }
    }

    /// Enable or disable the food/drink tie-break heuristic.
    ///
    /// When two or more types share the top score (nothing matched counts
    /// as a tie at zero), a text with both a currency amount and a
    /// date-shaped token is taken to be a food/drink receipt, the most
    /// common kind without distinctive wording. Otherwise a tie is
    /// `Unknown`.
    pub fn with_food_fallback(mut self, enabled: bool) -> Self {
        self.food_fallback = enabled;
        self
    }

    /// Cumulative score per type, in [`ReceiptType::ALL`] order.
    pub fn scores(&self, text: &CanonicalText) -> Vec<(ReceiptType, u32)> {
        ReceiptType::ALL
            .iter()
            .map(|&receipt_type| {
                let score = signatures_for(receipt_type)
                    .iter()
                    .filter(|signature| signature.matches(text))
                    .inspect(|signature| {
                        trace!("{receipt_type}: matched {:?} (+{})", signature.label(), signature.weight)
                    })
                    .map(|signature| signature.weight)
                    .sum::<u32>();
                (receipt_type, score)
            })
            .collect()
    }

    /// Pick the best-scoring type, resolving ties deterministically.
    pub fn classify(&self, text: &CanonicalText) -> ClassificationResult {
        let mut ranked = self.scores(text);
        // Stable sort keeps the fixed type order among equal scores.
        ranked.sort_by(|a, b| b.1.cmp(&a.1));

        let (best_type, best) = ranked[0];
        let runner_up = ranked.get(1).map_or(0, |(_, score)| *score);

        let result = if best > runner_up {
            ClassificationResult {
                receipt_type: best_type,
                score: best,
                runner_up_score: runner_up,
                fallback_applied: false,
            }
        } else {
            let fallback = self.food_fallback && has_currency_amount(text) && has_date_shape(text);
            ClassificationResult {
                receipt_type: if fallback { ReceiptType::FoodDrink } else { ReceiptType::Unknown },
                score: best,
                runner_up_score: runner_up,
                fallback_applied: fallback,
            }
        };

        debug!(
            "Classified as {} (score {}, runner-up {}{})",
            result.receipt_type,
            result.score,
            result.runner_up_score,
            if result.fallback_applied { ", tie fallback" } else { "" }
        );

        result
    }
}

/// Classify with the default tie-break policy.
pub fn classify(text: &CanonicalText) -> ClassificationResult {
    Classifier::new().classify(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn classify_text(raw: &str) -> ClassificationResult {
        classify(&CanonicalText::from_text(raw))
    }

    #[test]
    fn test_train() {
        let result = classify_text("Trainline Cardiff to London 14/10/2025 £124.29");
        assert_eq!(result.receipt_type, ReceiptType::Train);
        assert_eq!(result.score, 5);
        assert_eq!(result.runner_up_score, 0);
        assert!(!result.fallback_applied);
    }

    #[test]
    fn test_each_type() {
        let cases = [
            ("Premier Inn Cardiff 2 nights", ReceiptType::Hotel),
            ("PayByPhone parking session", ReceiptType::Parking),
            ("Starbucks latte £3.40", ReceiptType::FoodDrink),
            ("TfL Oyster journey history", ReceiptType::Metro),
            ("easyJet boarding pass Gate 12", ReceiptType::Flight),
            ("Disclosure and Barring Service DBS check", ReceiptType::Unknown),
        ];
        for (raw, expected) in cases {
            assert_eq!(classify_text(raw).receipt_type, expected, "{raw}");
        }
    }

    #[test]
    fn test_empty_text_is_unknown() {
        let result = classify_text("");
        assert_eq!(result.receipt_type, ReceiptType::Unknown);
        assert_eq!(result.score, 0);
        assert_eq!(result.runner_up_score, 0);
        assert!(!result.fallback_applied);
    }

    #[test]
    fn test_zero_score_with_amount_and_date_falls_back_to_food() {
        let result = classify_text("The Corner Shop 03/11/2025 £6.20");
        assert_eq!(result.receipt_type, ReceiptType::FoodDrink);
        assert!(result.fallback_applied);
    }

    #[test]
    fn test_fallback_can_be_disabled() {
        let text = CanonicalText::from_text("The Corner Shop 03/11/2025 £6.20");
        let result = Classifier::new().with_food_fallback(false).classify(&text);
        assert_eq!(result.receipt_type, ReceiptType::Unknown);
        assert!(!result.fallback_applied);
    }

    #[test]
    fn test_nonzero_tie_is_stable() {
        // Train "platform" (1) against Hotel "room" (1), no amount.
        let text = CanonicalText::from_text("platform room");
        let first = classify(&text);
        assert_eq!(first.receipt_type, ReceiptType::Unknown);
        assert_eq!(first.score, 1);
        assert_eq!(first.runner_up_score, 1);
        for _ in 0..10 {
            assert_eq!(classify(&text), first);
        }
    }

    #[test]
    fn test_scores_cover_every_type_in_order() {
        let scores = Classifier::new().scores(&CanonicalText::from_text("tube"));
        let types: Vec<ReceiptType> = scores.iter().map(|(t, _)| *t).collect();
        assert_eq!(types, ReceiptType::ALL.to_vec());
        assert_eq!(scores[4], (ReceiptType::Metro, 3));
    }
}
