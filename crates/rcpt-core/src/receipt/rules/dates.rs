//! Date strategies for receipts.
//!
//! Day-first (UK) ordering is assumed for every numeric date.

use chrono::{Datelike, NaiveDate};
use regex::Regex;

use super::confusables::repair_digits;
use super::patterns::{
    DATE_DAY_MONTH, DATE_DMY, DATE_FUZZY, DATE_FUZZY_DAY_MONTH, DATE_FUZZY_MONTH_DAY,
    DATE_MONTH_DAY, DATE_YMD, METRO_TRAVEL_DATE,
};
use super::{Strategy, StrategyContext};
use crate::models::{FieldOutcome, ReceiptType};
use crate::receipt::normalizer::CanonicalText;

/// Date strategies in priority order.
pub const DATE_STRATEGIES: &[Strategy<NaiveDate>] = &[
    Strategy { name: "metro_travel_date", run: metro_travel_date },
    Strategy { name: "exact_format", run: exact_format },
    Strategy { name: "fuzzy_repair", run: fuzzy_repair },
];

const MIN_YEAR: i32 = 1990;
const MAX_YEAR: i32 = 2100;

/// Expand two-digit years: 00-50 are 2000s, 51-99 are 1900s.
pub fn parse_year(s: &str) -> i32 {
    let year: i32 = s.parse().unwrap_or(0);
    if s.len() <= 2 {
        if year <= 50 {
            2000 + year
        } else {
            1900 + year
        }
    } else {
        year
    }
}

/// Build a calendar date from day, month and year strings.
///
/// Rejects impossible dates and years outside the plausible range.
pub fn date_from_parts(day: &str, month: &str, year: &str) -> Option<NaiveDate> {
    let day: u32 = day.parse().ok()?;
    let month: u32 = month.parse().ok()?;
    date_from_numbers(day, month, parse_year(year))
}

fn date_from_numbers(day: u32, month: u32, year: i32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day).filter(|d| (MIN_YEAR..=MAX_YEAR).contains(&d.year()))
}

/// Month number from an English month name or abbreviation.
fn month_number(name: &str) -> Option<u32> {
    let key: String = name.to_lowercase().chars().take(3).collect();
    let month = match key.as_str() {
        "jan" => 1,
        "feb" => 2,
        "mar" => 3,
        "apr" => 4,
        "may" => 5,
        "jun" => 6,
        "jul" => 7,
        "aug" => 8,
        "sep" => 9,
        "oct" => 10,
        "nov" => 11,
        "dec" => 12,
        _ => return None,
    };
    Some(month)
}

/// Whether anything in the text looks like a date.
pub fn has_date_shape(text: &CanonicalText) -> bool {
    [&*DATE_DMY, &*DATE_YMD, &*DATE_DAY_MONTH, &*DATE_MONTH_DAY]
        .iter()
        .any(|re| re.is_match(&text.body))
}

/// TfL statements: the date directly before a fare is the travel date.
fn metro_travel_date(ctx: &StrategyContext<'_>, text: &CanonicalText) -> FieldOutcome<NaiveDate> {
    if ctx.receipt_type != ReceiptType::Metro {
        return FieldOutcome::missing();
    }

    METRO_TRAVEL_DATE
        .captures_iter(&text.body)
        .find_map(|caps| date_from_parts(&caps[1], &caps[2], &caps[3]))
        .into()
}

/// Known formats in fixed order; the leftmost valid match of the first
/// format that yields one wins.
fn exact_format(_: &StrategyContext<'_>, text: &CanonicalText) -> FieldOutcome<NaiveDate> {
    let body = &text.body;

    first_valid(&DATE_DMY, body, |c| date_from_parts(&c[1], &c[2], &c[3]))
        .or_else(|| first_valid(&DATE_YMD, body, |c| date_from_parts(&c[3], &c[2], &c[1])))
        .or_else(|| {
            first_valid(&DATE_DAY_MONTH, body, |c| {
                date_from_numbers(c[1].parse().ok()?, month_number(&c[2])?, parse_year(&c[3]))
            })
        })
        .or_else(|| {
            first_valid(&DATE_MONTH_DAY, body, |c| {
                date_from_numbers(c[2].parse().ok()?, month_number(&c[1])?, parse_year(&c[3]))
            })
        })
        .into()
}

fn first_valid(
    re: &Regex,
    body: &str,
    build: impl Fn(&regex::Captures<'_>) -> Option<NaiveDate>,
) -> Option<NaiveDate> {
    re.captures_iter(body).find_map(|caps| build(&caps))
}

/// A date-shaped token with exactly one confusable in a digit position.
///
/// Numeric shapes are tried first, then the month-name shapes.
fn fuzzy_repair(_: &StrategyContext<'_>, text: &CanonicalText) -> FieldOutcome<NaiveDate> {
    let body = &text.body;

    repair_shape(&DATE_FUZZY, body, &[1, 2, 3], |d, _| date_from_parts(&d[0], &d[1], &d[2]))
        .or_else(|| {
            repair_shape(&DATE_FUZZY_DAY_MONTH, body, &[1, 3], |d, c| {
                date_from_numbers(d[0].parse().ok()?, month_number(&c[2])?, parse_year(&d[1]))
            })
        })
        .or_else(|| {
            repair_shape(&DATE_FUZZY_MONTH_DAY, body, &[2, 3], |d, c| {
                date_from_numbers(d[0].parse().ok()?, month_number(&c[1])?, parse_year(&d[1]))
            })
        })
        .map_or_else(FieldOutcome::missing, FieldOutcome::corrected)
}

/// First match of `re` whose `digit_groups` repair with exactly one
/// substitution into a valid date.
fn repair_shape(
    re: &Regex,
    body: &str,
    digit_groups: &[usize],
    build: impl Fn(&[String], &regex::Captures<'_>) -> Option<NaiveDate>,
) -> Option<NaiveDate> {
    for caps in re.captures_iter(body) {
        let Some(whole) = caps.get(0) else { continue };
        let before = body[..whole.start()].chars().next_back();
        let after = body[whole.end()..].chars().next();
        if before.is_some_and(char::is_alphanumeric) || after.is_some_and(char::is_alphanumeric) {
            continue;
        }

        let parts: Option<Vec<_>> = digit_groups.iter().map(|&i| repair_digits(&caps[i])).collect();
        let Some(parts) = parts else { continue };
        if parts.iter().map(|p| p.substitutions).sum::<usize>() != 1 {
            continue;
        }

        let digits: Vec<String> = parts.into_iter().map(|p| p.digits).collect();
        if let Some(date) = build(&digits, &caps) {
            return Some(date);
        }
    }

    None
}
