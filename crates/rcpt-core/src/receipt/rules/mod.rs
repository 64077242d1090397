//! Rule-based field strategies for receipts.

pub mod amounts;
pub mod confusables;
pub mod dates;
pub mod descriptions;
pub mod patterns;
pub mod signatures;

pub use amounts::{COST_STRATEGIES, has_currency_amount};
pub use confusables::{DIGIT_CONFUSABLES, digit_for, repair_digits};
pub use dates::{DATE_STRATEGIES, has_date_shape, parse_year};
pub use descriptions::describe;
pub use signatures::{Signature, SignatureKind, signatures_for};

use tracing::debug;

use crate::models::{ExtractionConfig, FieldOutcome, ReceiptType};
use crate::receipt::normalizer::CanonicalText;

/// Inputs shared by every strategy for one document.
#[derive(Debug, Clone, Copy)]
pub struct StrategyContext<'a> {
    pub receipt_type: ReceiptType,
    pub config: &'a ExtractionConfig,
}

/// A pure extraction function with a name for logging.
pub struct Strategy<T> {
    pub name: &'static str,
    pub run: fn(&StrategyContext<'_>, &CanonicalText) -> FieldOutcome<T>,
}

/// Run strategies in priority order; the first non-missing outcome wins.
pub fn run_in_order<T>(
    field: &str,
    ctx: &StrategyContext<'_>,
    text: &CanonicalText,
    strategies: &[Strategy<T>],
) -> FieldOutcome<T> {
    for strategy in strategies {
        let outcome = (strategy.run)(ctx, text);
        if !outcome.is_missing() {
            debug!(
                "{field}: {} matched ({:?})",
                strategy.name, outcome.confidence
            );
            return outcome;
        }
    }

    debug!("{field}: no strategy matched");
    FieldOutcome::missing()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Confidence;

    fn never(_: &StrategyContext<'_>, _: &CanonicalText) -> FieldOutcome<u32> {
        FieldOutcome::missing()
    }

    fn corrected(_: &StrategyContext<'_>, _: &CanonicalText) -> FieldOutcome<u32> {
        FieldOutcome::corrected(2)
    }

    fn confirmed(_: &StrategyContext<'_>, _: &CanonicalText) -> FieldOutcome<u32> {
        FieldOutcome::confirmed(3)
    }

    #[test]
    fn test_first_non_missing_wins() {
        let config = ExtractionConfig::default();
        let ctx = StrategyContext { receipt_type: ReceiptType::Unknown, config: &config };
        let text = CanonicalText::default();
        let strategies = [
            Strategy { name: "never", run: never },
            Strategy { name: "corrected", run: corrected },
            Strategy { name: "confirmed", run: confirmed },
        ];

        let outcome = run_in_order("test", &ctx, &text, &strategies);
        assert_eq!(outcome.value, Some(2));
        assert_eq!(outcome.confidence, Confidence::Corrected);
    }

    #[test]
    fn test_all_missing() {
        let config = ExtractionConfig::default();
        let ctx = StrategyContext { receipt_type: ReceiptType::Unknown, config: &config };
        let outcome = run_in_order("test", &ctx, &CanonicalText::default(), &[Strategy { name: "never", run: never }]);
        assert!(outcome.is_missing());
        assert_eq!(outcome.confidence, Confidence::Missing);
    }
}
