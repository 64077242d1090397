//! Cost strategies for receipts.

use std::ops::Range;

use regex::Regex;
use rust_decimal::Decimal;

use super::confusables::repair_digits;
use super::patterns::{
    BARE_AMOUNT, CORRUPT_AMOUNT, COST_KEYWORD, CURRENCY_AMOUNT, LABELED_TOTAL, STANDALONE_AMOUNT,
};
use super::{Strategy, StrategyContext};
use crate::models::{CostSelection, ExtractionConfig, FieldOutcome, Money};
use crate::receipt::normalizer::CanonicalText;

/// Cost strategies in priority order.
pub const COST_STRATEGIES: &[Strategy<Money>] = &[
    Strategy { name: "currency_anchored", run: currency_anchored },
    Strategy { name: "keyword_adjacent", run: keyword_adjacent },
    Strategy { name: "corrupted_digit", run: corrupted_digit },
    Strategy { name: "standalone_line", run: standalone_line },
];

/// An amount and where it sits in the body.
#[derive(Debug, Clone)]
struct AmountMatch {
    money: Money,
    span: Range<usize>,
}

/// Whether the text holds a clean currency-anchored amount.
pub fn has_currency_amount(text: &CanonicalText) -> bool {
    CURRENCY_AMOUNT.is_match(&text.body)
}

/// Amounts between one penny and the configured ceiling.
pub fn is_plausible(money: Money, config: &ExtractionConfig) -> bool {
    money.amount() >= Decimal::new(1, 2) && money.amount() <= config.max_plausible_cost
}

fn select<T>(mut candidates: Vec<T>, policy: CostSelection, key: impl Fn(&T) -> Money) -> Option<T> {
    match policy {
        CostSelection::Last => candidates.pop(),
        CostSelection::Largest => {
            let mut best: Option<T> = None;
            for candidate in candidates {
                if best.as_ref().is_none_or(|b| key(&candidate) > key(b)) {
                    best = Some(candidate);
                }
            }
            best
        }
    }
}

/// Pound-sign (or GBP) amounts, labeled totals first.
fn currency_anchored(ctx: &StrategyContext<'_>, text: &CanonicalText) -> FieldOutcome<Money> {
    let labeled = anchored_matches(&LABELED_TOTAL, ctx.config, text);
    let candidates = if labeled.is_empty() {
        anchored_matches(&CURRENCY_AMOUNT, ctx.config, text)
    } else {
        labeled
    };

    match select(candidates, ctx.config.cost_selection, |m| m.money) {
        Some(m) => FieldOutcome::found(m.money, text.touches_repair(&m.span)),
        None => FieldOutcome::missing(),
    }
}

fn anchored_matches(re: &Regex, config: &ExtractionConfig, text: &CanonicalText) -> Vec<AmountMatch> {
    re.captures_iter(&text.body)
        .filter_map(|caps| {
            let pounds = caps.get(1)?;
            let pence = caps.get(2)?;
            let money = Money::from_parts(pounds.as_str(), pence.as_str())?;
            is_plausible(money, config).then(|| AmountMatch {
                money,
                span: pounds.start()..pence.end(),
            })
        })
        .collect()
}

/// Bare `NN.NN` amounts on a line with a cost keyword, or alone on the
/// following line.
fn keyword_adjacent(ctx: &StrategyContext<'_>, text: &CanonicalText) -> FieldOutcome<Money> {
    let mut candidates = Vec::new();

    for (i, line) in text.lines.iter().enumerate() {
        if !COST_KEYWORD.is_match(line) {
            continue;
        }

        let on_line: Vec<Money> = bare_amounts(line)
            .into_iter()
            .filter(|m| is_plausible(*m, ctx.config))
            .collect();

        if !on_line.is_empty() {
            candidates.extend(on_line);
        } else if let Some(money) = text.lines.get(i + 1).and_then(|next| standalone_amount(next)) {
            if is_plausible(money, ctx.config) {
                candidates.push(money);
            }
        }
    }

    select(candidates, ctx.config.cost_selection, |m| *m).into()
}

/// Lines holding nothing but an amount. Last resort, after repairs of
/// currency-anchored tokens.
fn standalone_line(ctx: &StrategyContext<'_>, text: &CanonicalText) -> FieldOutcome<Money> {
    let candidates: Vec<Money> = text
        .lines
        .iter()
        .filter_map(|line| standalone_amount(line))
        .filter(|m| is_plausible(*m, ctx.config))
        .collect();

    select(candidates, ctx.config.cost_selection, |m| *m).into()
}

fn standalone_amount(line: &str) -> Option<Money> {
    let caps = STANDALONE_AMOUNT.captures(line)?;
    Money::from_parts(&caps[1], &caps[2])
}

/// Bare amounts in a line, skipping pieces of dates and times.
fn bare_amounts(line: &str) -> Vec<Money> {
    BARE_AMOUNT
        .captures_iter(line)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let before = line[..whole.start()].chars().next_back();
            let mut after = line[whole.end()..].chars();
            let (next, next_next) = (after.next(), after.next());

            if before.is_some_and(|c| matches!(c, '/' | '-' | '.' | ':')) {
                return None;
            }
            if next.is_some_and(|c| matches!(c, '/' | '-' | '.' | ':'))
                && next_next.is_some_and(|c| c.is_ascii_digit())
            {
                return None;
            }
            Money::from_parts(&caps[1], &caps[2])
        })
        .collect()
}

/// Currency-anchored tokens with one confusable, a single pence digit or a
/// colon for a decimal point.
fn corrupted_digit(ctx: &StrategyContext<'_>, text: &CanonicalText) -> FieldOutcome<Money> {
    let body = &text.body;
    let mut candidates = Vec::new();

    for caps in CORRUPT_AMOUNT.captures_iter(body) {
        let Some(whole) = caps.get(0) else { continue };
        if body[whole.end()..].chars().next().is_some_and(char::is_alphanumeric) {
            continue;
        }

        let (Some(pounds), Some(pence)) = (repair_digits(&caps[1]), repair_digits(&caps[2])) else {
            continue;
        };
        let substitutions = pounds.substitutions + pence.substitutions;
        let padded = pence.digits.len() == 1;
        let colon = whole.as_str().contains(':');

        if substitutions > 1 || (substitutions == 0 && !padded && !colon) {
            continue;
        }

        if let Some(money) = Money::from_parts(&pounds.digits, &pence.digits) {
            if is_plausible(money, ctx.config) {
                candidates.push(money);
            }
        }
    }

    match select(candidates, ctx.config.cost_selection, |m| *m) {
        Some(money) => FieldOutcome::corrected(money),
        None => FieldOutcome::missing(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Confidence, ReceiptType};
    use crate::receipt::rules::run_in_order;
    use pretty_assertions::assert_eq;

    fn extract_with(config: &ExtractionConfig, raw: &str) -> FieldOutcome<Money> {
        let ctx = StrategyContext { receipt_type: ReceiptType::Unknown, config };
        run_in_order("cost", &ctx, &CanonicalText::from_text(raw), COST_STRATEGIES)
    }

    fn extract(raw: &str) -> FieldOutcome<Money> {
        extract_with(&ExtractionConfig::default(), raw)
    }

    fn plain(outcome: &FieldOutcome<Money>) -> Option<String> {
        outcome.value.map(|m| m.plain())
    }

    #[test]
    fn test_labeled_total_beats_later_amounts() {
        let outcome = extract("Subtotal £10.00\nVAT £2.00\nTotal £12.00\nCash £20.00\nChange £8.00");
        assert_eq!(plain(&outcome), Some("12.00".to_string()));
        assert_eq!(outcome.confidence, Confidence::Confirmed);
    }

    #[test]
    fn test_last_amount_by_default() {
        assert_eq!(plain(&extract("Latte £5.00 Muffin £3.20")), Some("3.20".to_string()));
    }

    #[test]
    fn test_largest_amount_when_configured() {
        let config = ExtractionConfig {
            cost_selection: CostSelection::Largest,
            ..ExtractionConfig::default()
        };
        let outcome = extract_with(&config, "Latte £5.00 Muffin £3.20");
        assert_eq!(plain(&outcome), Some("5.00".to_string()));
    }

    #[test]
    fn test_separators_and_iso_code() {
        assert_eq!(plain(&extract("Paid £1,234.56")), Some("1234.56".to_string()));
        assert_eq!(plain(&extract("Paid £12,98")), Some("12.98".to_string()));
        assert_eq!(plain(&extract("Amount GBP 45.00")), Some("45.00".to_string()));
    }

    #[test]
    fn test_implausible_amounts_ignored() {
        assert_eq!(plain(&extract("Ref £99999.00 Fare £12.00 Ref £0.00")), Some("12.00".to_string()));
    }

    #[test]
    fn test_normalizer_repair_is_corrected() {
        let outcome = extract("Total £1O.5O");
        assert_eq!(plain(&outcome), Some("10.50".to_string()));
        assert_eq!(outcome.confidence, Confidence::Corrected);
    }

    #[test]
    fn test_bare_amount_near_keyword() {
        let outcome = extract("Ticket\nFare 23.40\nThank you");
        assert_eq!(plain(&outcome), Some("23.40".to_string()));
        assert_eq!(outcome.confidence, Confidence::Confirmed);

        let outcome = extract("Amount paid\n23.40\nVisa");
        assert_eq!(plain(&outcome), Some("23.40".to_string()));
    }

    #[test]
    fn test_bare_amount_skips_dates() {
        assert!(extract("Paid on 14.10.2025").is_missing());
    }

    #[test]
    fn test_standalone_amount_line() {
        assert_eq!(plain(&extract("Coffee shop\n3.60")), Some("3.60".to_string()));
    }

    #[test]
    fn test_corrupted_digit_repair() {
        let outcome = extract("Total £4.?0");
        assert_eq!(plain(&outcome), Some("4.70".to_string()));
        assert_eq!(outcome.confidence, Confidence::Corrected);
    }

    #[test]
    fn test_single_digit_pence_and_colon() {
        let outcome = extract("Total £4.7");
        assert_eq!(plain(&outcome), Some("4.70".to_string()));
        assert_eq!(outcome.confidence, Confidence::Corrected);

        assert_eq!(plain(&extract("Total £12:50")), Some("12.50".to_string()));
    }

    #[test]
    fn test_corrupted_total_beats_bare_item_line() {
        let outcome = extract("Wasabi\nKatsu curry\n3.20\nTotal £8.?0\n03/11/2025");
        assert_eq!(plain(&outcome), Some("8.70".to_string()));
        assert_eq!(outcome.confidence, Confidence::Corrected);
    }

    #[test]
    fn test_corrupted_digit_rejects_two_repairs() {
        assert!(extract("Total £4.??").is_missing());
    }

    #[test]
    fn test_no_amount() {
        let outcome = extract("No money here");
        assert!(outcome.is_missing());
        assert_eq!(outcome.confidence, Confidence::Missing);
    }
}
