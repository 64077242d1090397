//! Text normalization: canonical body, line view and scoped OCR repairs.

use std::ops::Range;

use tracing::{debug, trace};

use super::rules::confusables::repair_digits;
use super::rules::patterns::CURRENCY_TOKEN;
use crate::models::RawDocument;

/// A confusable repair applied inside a currency token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repair {
    /// Byte range of the token in [`CanonicalText::body`].
    pub span: Range<usize>,
    pub original: String,
    pub repaired: String,
}

/// Cleaned receipt text shared by every later stage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CanonicalText {
    /// Lines joined by single spaces.
    pub body: String,
    /// Non-empty lines, whitespace collapsed, original casing.
    pub lines: Vec<String>,
    /// Lowercased copy of `body` for keyword search.
    pub matching: String,
    /// Repairs applied while building `body`, in order.
    pub repairs: Vec<Repair>,
}

impl CanonicalText {
    /// Normalize a block of raw text.
    pub fn from_text(raw: &str) -> Self {
        let raw = raw
            .replace("Â£", "£")
            .replace("\r\n", "\n")
            .replace(['\r', '\x0c'], "\n");

        let mut lines = Vec::new();
        let mut repairs = Vec::new();
        let mut offset = 0;

        for line in raw.split('\n') {
            let line = collapse_whitespace(line);
            if line.is_empty() {
                continue;
            }
            let (line, line_repairs) = repair_currency_tokens(&line, offset);
            offset += line.len() + 1;
            repairs.extend(line_repairs);
            lines.push(line);
        }

        let body = lines.join(" ");
        let matching = body.to_lowercase();

        if !repairs.is_empty() {
            debug!("Repaired {} currency token(s)", repairs.len());
        }

        Self {
            body,
            lines,
            matching,
            repairs,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    /// Whether a body byte range overlaps any repaired token.
    pub fn touches_repair(&self, range: &Range<usize>) -> bool {
        self.repairs
            .iter()
            .any(|r| r.span.start < range.end && range.start < r.span.end)
    }
}

/// Pick the authoritative text of a document.
///
/// Native text wins when it is non-blank and not flagged garbled, then OCR
/// text, then whatever is left.
pub fn select_source(raw: &RawDocument) -> &str {
    let native = raw.native_text.as_deref().filter(|t| !t.trim().is_empty());
    let ocr = raw.ocr_text.as_deref().filter(|t| !t.trim().is_empty());

    match (native, ocr) {
        (Some(n), _) if !raw.native_text_garbled => n,
        (_, Some(o)) => o,
        (Some(n), None) => n,
        (None, None) => "",
    }
}

/// Normalize a document's authoritative text. Never fails.
pub fn normalize(raw: &RawDocument) -> CanonicalText {
    let text = CanonicalText::from_text(select_source(raw));
    trace!(
        "Normalized {}: {} lines, {} bytes",
        raw.filename,
        text.lines.len(),
        text.body.len()
    );
    text
}

fn collapse_whitespace(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut pending_space = false;

    for c in line.chars() {
        if c.is_whitespace() || c.is_control() {
            pending_space = !out.is_empty();
        } else {
            if pending_space {
                out.push(' ');
                pending_space = false;
            }
            out.push(c);
        }
    }

    out
}

/// Replace letter look-alikes in currency-prefixed tokens that already hold a
/// digit and would form a money amount once repaired.
///
/// Every confusable letter is ASCII and maps to an ASCII digit, so byte
/// offsets are unchanged by the substitution.
fn repair_currency_tokens(line: &str, offset: usize) -> (String, Vec<Repair>) {
    let mut repaired_line = line.to_string();
    let mut repairs = Vec::new();

    for caps in CURRENCY_TOKEN.captures_iter(line) {
        let Some(group) = caps.get(1) else { continue };
        let token = group.as_str().trim_end_matches(['.', ',']);
        let end = group.start() + token.len();

        if !token.chars().any(|c| c.is_ascii_digit())
            || !token.chars().any(|c| c.is_ascii_alphabetic())
        {
            continue;
        }
        if line[end..].chars().next().is_some_and(char::is_alphanumeric) {
            continue;
        }

        let Some(candidate) = repair_token(token) else { continue };
        if !is_money_shape(&candidate) {
            continue;
        }

        trace!("Repaired currency token {token:?} -> {candidate:?}");
        repaired_line.replace_range(group.start()..end, &candidate);
        repairs.push(Repair {
            span: offset + group.start()..offset + end,
            original: token.to_string(),
            repaired: candidate,
        });
    }

    (repaired_line, repairs)
}

/// Repair the digit runs of a token, keeping separators.
fn repair_token(token: &str) -> Option<String> {
    let mut out = String::with_capacity(token.len());
    for part in token.split_inclusive(['.', ',']) {
        let (digits, sep) = match part.char_indices().last() {
            Some((i, c)) if c == '.' || c == ',' => (&part[..i], Some(c)),
            _ => (part, None),
        };
        out.push_str(&repair_digits(digits)?.digits);
        if let Some(sep) = sep {
            out.push(sep);
        }
    }
    Some(out)
}

fn is_money_shape(token: &str) -> bool {
    let Some((pounds, pence)) = token.rsplit_once(['.', ',']) else {
        return false;
    };
    if pence.len() != 2 || pounds.is_empty() {
        return false;
    }
    let groups: Vec<&str> = pounds.split(',').collect();
    match groups.as_slice() {
        [single] => single.len() <= 6,
        [head, rest @ ..] => head.len() <= 3 && rest.iter().all(|g| g.len() == 3),
        [] => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_collapses_whitespace_and_drops_blank_lines() {
        let text = CanonicalText::from_text("  Hello \t  world \r\n\r\n\x0c Total\u{0007}  £1.00  ");
        assert_eq!(text.lines, vec!["Hello world", "Total £1.00"]);
        assert_eq!(text.body, "Hello world Total £1.00");
        assert_eq!(text.matching, "hello world total £1.00");
    }

    #[test]
    fn test_fixes_mojibake_pound_sign() {
        let text = CanonicalText::from_text("Total Â£12.50");
        assert_eq!(text.body, "Total £12.50");
    }

    #[test]
    fn test_repairs_letters_in_currency_tokens() {
        let text = CanonicalText::from_text("Coffee\nTotal £1O.5O");
        assert_eq!(text.body, "Coffee Total £10.50");
        assert_eq!(text.repairs.len(), 1);

        let repair = &text.repairs[0];
        assert_eq!(repair.original, "1O.5O");
        assert_eq!(repair.repaired, "10.50");
        assert_eq!(&text.body[repair.span.clone()], "10.50");
        assert!(text.touches_repair(&(repair.span.start..repair.span.start + 1)));
    }

    #[test]
    fn test_leaves_words_alone() {
        let text = CanonicalText::from_text("Save £5 Off Peak, GBP Oslo, Total £12.50");
        assert_eq!(text.body, "Save £5 Off Peak, GBP Oslo, Total £12.50");
        assert!(text.repairs.is_empty());
    }

    #[test]
    fn test_skips_tokens_followed_by_letters() {
        let text = CanonicalText::from_text("£1O.5Ox");
        assert!(text.repairs.is_empty());
    }

    #[test]
    fn test_does_not_touch_question_marks() {
        let text = CanonicalText::from_text("Total £4.?0");
        assert_eq!(text.body, "Total £4.?0");
        assert!(text.repairs.is_empty());
    }

    #[test]
    fn test_select_source_precedence() {
        let doc = RawDocument::new("a.pdf")
            .with_native_text("native")
            .with_ocr_text("ocr");
        assert_eq!(select_source(&doc), "native");

        let garbled = doc.clone().with_native_text_garbled(true);
        assert_eq!(select_source(&garbled), "ocr");

        let blank = RawDocument::new("a.pdf")
            .with_native_text("   ")
            .with_ocr_text("ocr");
        assert_eq!(select_source(&blank), "ocr");

        let only_garbled = RawDocument::new("a.pdf")
            .with_native_text("n@@@")
            .with_native_text_garbled(true);
        assert_eq!(select_source(&only_garbled), "n@@@");

        assert_eq!(select_source(&RawDocument::new("a.pdf")), "");
    }

    #[test]
    fn test_normalize_empty_document() {
        let text = normalize(&RawDocument::new("empty.jpg"));
        assert!(text.is_empty());
        assert!(text.lines.is_empty());
    }
}
