//! OCR confusable-character table.
//!
//! Maps characters that OCR engines commonly emit in place of a digit to
//! the digit they most likely stand for. Only ever applied to candidate
//! numeric substrings (amounts and date-shaped tokens).

/// `(look-alike, digit)` pairs.
pub const DIGIT_CONFUSABLES: &[(char, char)] = &[
    ('O', '0'),
    ('o', '0'),
    ('D', '0'),
    ('Q', '0'),
    ('l', '1'),
    ('I', '1'),
    ('i', '1'),
    ('|', '1'),
    ('!', '1'),
    ('Z', '2'),
    ('z', '2'),
    ('S', '5'),
    ('s', '5'),
    ('G', '6'),
    ('b', '6'),
    ('?', '7'),
    ('B', '8'),
    ('g', '9'),
    ('q', '9'),
];

/// Digit a confusable character stands for.
pub fn digit_for(c: char) -> Option<char> {
    DIGIT_CONFUSABLES
        .iter()
        .find(|(from, _)| *from == c)
        .map(|(_, to)| *to)
}

/// Regex character-class body (no brackets) of every confusable that
/// satisfies `filter`.
pub fn class_body(filter: impl Fn(char) -> bool) -> String {
    DIGIT_CONFUSABLES
        .iter()
        .map(|(c, _)| *c)
        .filter(|c| filter(*c))
        .map(|c| regex::escape(&c.to_string()))
        .collect()
}

/// A numeric token after confusable repair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepairedDigits {
    pub digits: String,
    /// Number of characters that were substituted.
    pub substitutions: usize,
}

/// Replace every confusable in `token` with its digit.
///
/// Returns `None` if the token contains anything that is neither an ASCII
/// digit nor a known confusable.
pub fn repair_digits(token: &str) -> Option<RepairedDigits> {
    let mut digits = String::with_capacity(token.len());
    let mut substitutions = 0;

    for c in token.chars() {
        if c.is_ascii_digit() {
            digits.push(c);
        } else {
            digits.push(digit_for(c)?);
            substitutions += 1;
        }
    }

    Some(RepairedDigits { digits, substitutions })
}
