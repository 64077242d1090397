//! Common regex patterns for receipt field extraction.

use lazy_static::lazy_static;
use regex::Regex;

use super::confusables::class_body;

/// Month name or abbreviation, as one capture group.
const MONTH: &str = r"(jan(?:uary)?|feb(?:ruary)?|mar(?:ch)?|apr(?:il)?|may|june?|july?|aug(?:ust)?|sep(?:t(?:ember)?)?|oct(?:ober)?|nov(?:ember)?|dec(?:ember)?)\b\.?";

/// Capitalised place name, allowing joiners such as "upon" between words.
pub const PLACE: &str =
    r"[A-Z][a-z']+(?:(?:[ -](?:upon|on|in|under|le))?[ -][A-Z][a-z']+)*";

/// Currency anchor: pound sign or an ISO code.
const CURRENCY: &str = r"(?:£|\bGBP)";

/// Pounds with optional thousands separators, then pence.
const POUNDS_PENCE: &str = r"(\d{1,3}(?:,\d{3})+|\d{1,6})[.,](\d{2})\b";

lazy_static! {
    // Amounts
    pub static ref CURRENCY_AMOUNT: Regex = Regex::new(
        &format!(r"{CURRENCY}\s*{POUNDS_PENCE}")
    ).unwrap();

    pub static ref LABELED_TOTAL: Regex = Regex::new(
        &format!(r"(?i:\b(?:grand\s+total|total\s+amount|total\s+due|total\s+paid|total|amount\s+due|balance\s+due|balance)\b)[^£\d]{{0,20}}?{CURRENCY}\s*{POUNDS_PENCE}")
    ).unwrap();

    pub static ref BARE_AMOUNT: Regex = Regex::new(
        r"\b(\d{1,4})[.,](\d{2})\b"
    ).unwrap();

    pub static ref STANDALONE_AMOUNT: Regex = Regex::new(
        r"^(?:£\s*)?(\d{1,4})[.,](\d{2})$"
    ).unwrap();

    pub static ref COST_KEYWORD: Regex = Regex::new(
        r"(?i)\b(?:total|amount|fare|paid|price|balance|due)\b"
    ).unwrap();

    pub static ref CORRUPT_AMOUNT: Regex = {
        let class = format!("0-9{}", class_body(|_| true));
        Regex::new(&format!(r"{CURRENCY}\s*([{class}]{{1,4}})[.,:]([{class}]{{1,2}})")).unwrap()
    };

    // Letter look-alikes inside a currency token, repaired by the normalizer
    pub static ref CURRENCY_TOKEN: Regex = {
        let class = format!("0-9{}", class_body(char::is_alphabetic));
        Regex::new(&format!(r"{CURRENCY}\s*([{class}][{class},.]*)")).unwrap()
    };

    // Dates, in priority order
    pub static ref DATE_DMY: Regex = Regex::new(
        r"\b(\d{1,2})[/.\-](\d{1,2})[/.\-](\d{4}|\d{2})\b"
    ).unwrap();

    pub static ref DATE_YMD: Regex = Regex::new(
        r"\b(\d{4})[/.\-](\d{1,2})[/.\-](\d{1,2})\b"
    ).unwrap();

    pub static ref DATE_DAY_MONTH: Regex = Regex::new(
        &format!(r"(?i)\b(\d{{1,2}})(?:st|nd|rd|th)?\s+{MONTH},?\s+(\d{{4}}|\d{{2}})\b")
    ).unwrap();

    pub static ref DATE_MONTH_DAY: Regex = Regex::new(
        &format!(r"(?i)\b{MONTH}\s+(\d{{1,2}})(?:st|nd|rd|th)?,?\s+(\d{{4}})\b")
    ).unwrap();

    pub static ref DATE_FUZZY: Regex = {
        let class = format!("0-9{}", class_body(|_| true));
        Regex::new(&format!(r"([{class}]{{1,2}})[/.\-]([{class}]{{1,2}})[/.\-]([{class}]{{4}}|[{class}]{{2}})")).unwrap()
    };

    pub static ref DATE_FUZZY_DAY_MONTH: Regex = {
        let class = format!("0-9{}", class_body(|_| true));
        Regex::new(&format!(r"([{class}]{{1,2}})(?:st|nd|rd|th)?\s+(?i:{MONTH}),?\s+([{class}]{{4}}|[{class}]{{2}})")).unwrap()
    };

    pub static ref DATE_FUZZY_MONTH_DAY: Regex = {
        let class = format!("0-9{}", class_body(|_| true));
        Regex::new(&format!(r"(?i:{MONTH})\s+([{class}]{{1,2}})(?:st|nd|rd|th)?,?\s+([{class}]{{4}})")).unwrap()
    };

    pub static ref METRO_TRAVEL_DATE: Regex = Regex::new(
        r"\b(\d{2})/(\d{2})/(\d{4})\s+£\s*\d+\.\d{2}\b"
    ).unwrap();

    // Train journeys
    pub static ref RETURN_TRIP: Regex = Regex::new(
        &format!(r"(?i:return\s+trip)\s+(?:(?i:from)\s+)?({PLACE})(?:\s*\([^)]*\))?\s+(?i:to)\s+({PLACE})")
    ).unwrap();

    pub static ref FROM_TO: Regex = Regex::new(
        &format!(r"(?i:\bfrom):?\s+({PLACE})(?:\s*\([^)]*\))?\s+(?i:to):?\s+({PLACE})")
    ).unwrap();

    pub static ref BOOKING_ROUTE: Regex = Regex::new(
        &format!(r"(?i:your\s+(?:booking|trip)\s+(?:confirmation\s+)?(?:for|to))\s+({PLACE})\s+(?i:to)\s+({PLACE})")
    ).unwrap();

    pub static ref TIMETABLE_ROUTE: Regex = Regex::new(
        &format!(r"\b\d{{2}}:\d{{2}}\s+({PLACE})\b.*?\b\d{{2}}:\d{{2}}\s+({PLACE})")
    ).unwrap();

    pub static ref PLAIN_ROUTE: Regex = Regex::new(
        &format!(r"({PLACE})\s+to\s+({PLACE})")
    ).unwrap();

    pub static ref SUFFIXED_STATION: Regex = Regex::new(
        r"\b([A-Z][a-z]+(?: [A-Z][a-z]+)*?) (?:Station|Central|Parkway)\b"
    ).unwrap();

    pub static ref PARENTHETICAL: Regex = Regex::new(
        r"\s*\([^)]*\)"
    ).unwrap();

    // Metro
    pub static ref TUBE_JOURNEY: Regex = Regex::new(
        &format!(r"({PLACE})\s+to\s+({PLACE})\s+£\s*\d+\.\d{{2}}")
    ).unwrap();

    // Hotels
    pub static ref NIGHTS: Regex = Regex::new(
        r"(?i)\b(\d{1,2})\s*nights?\b"
    ).unwrap();

    pub static ref ARRIVAL_DATE: Regex = Regex::new(
        r"(?i)\b(?:arrival|check[\s-]?in)\b[^0-9]{0,20}?(\d{1,2})[/.\-\s]+(\d{1,2})[/.\-\s]+(\d{4})"
    ).unwrap();

    pub static ref DEPARTURE_DATE: Regex = Regex::new(
        r"(?i)\b(?:departure|check[\s-]?out)\b[^0-9]{0,20}?(\d{1,2})[/.\-\s]+(\d{1,2})[/.\-\s]+(\d{4})"
    ).unwrap();

    pub static ref NAMED_HOTEL: Regex = Regex::new(
        r"\b((?:[A-Z][A-Za-z&']*\s){1,3}Hotel(?:\s[A-Z][a-z]+)*)"
    ).unwrap();

    pub static ref HOTEL_NAMED: Regex = Regex::new(
        r"\b(Hotel(?:\s[A-Z][a-z]+)+)"
    ).unwrap();

    // Parking
    pub static ref LABELED_LOCATION: Regex = Regex::new(
        r"(?i)^(?:description|location|car\s*park)\s*[:\-]\s*(.+)$"
    ).unwrap();

    pub static ref UPPERCASE_STATION: Regex = Regex::new(
        r"\b([A-Z][A-Z ]+ STATION)\b"
    ).unwrap();

    pub static ref NAMED_TERMINUS: Regex = Regex::new(
        r"\b([A-Z][a-z]+(?: [A-Z][a-z]+)* (?:Airport|Station))\b"
    ).unwrap();

    // Flights
    pub static ref AIRPORT_PAIR: Regex = Regex::new(
        r"\b([A-Z]{3})\s*(?:-|–|→|>|to)\s*([A-Z]{3})\b"
    ).unwrap();

    // Other expenses
    pub static ref LABELED_PURPOSE: Regex = Regex::new(
        r"(?i)^(?:payment\s+for|purpose)\s*[:\-]?\s+(.+)$"
    ).unwrap();

    // Generic shapes
    pub static ref HAS_LETTERS: Regex = Regex::new(
        r"[A-Za-z]{3,}"
    ).unwrap();

    pub static ref CLOCK_TIME: Regex = Regex::new(
        r"\b\d{1,2}:\d{2}\b"
    ).unwrap();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_currency_amount_shapes() {
        let caps = CURRENCY_AMOUNT.captures("Paid £1,234.56 today").unwrap();
        assert_eq!(&caps[1], "1,234");
        assert_eq!(&caps[2], "56");

        let caps = CURRENCY_AMOUNT.captures("£12,98").unwrap();
        assert_eq!(&caps[1], "12");
        assert_eq!(&caps[2], "98");

        assert!(CURRENCY_AMOUNT.is_match("GBP 12.50"));
        assert!(!CURRENCY_AMOUNT.is_match("£1,234"));
    }

    #[test]
    fn test_labeled_total_ignores_subtotal() {
        let text = "Subtotal £10.00 VAT £2.00 Total: £12.00 Change £8.00";
        let caps = LABELED_TOTAL.captures(text).unwrap();
        assert_eq!(&caps[1], "12");
    }

    #[test]
    fn test_date_patterns() {
        assert!(DATE_DMY.is_match("14/10/2025"));
        assert!(DATE_YMD.is_match("2025-10-14"));
        assert!(!DATE_DMY.is_match("2025-10-14"));
        assert!(DATE_DAY_MONTH.is_match("5th November 2025"));
        assert!(DATE_MONTH_DAY.is_match("Nov 5, 2025"));
        assert!(!DATE_MONTH_DAY.is_match("Market 12, 2025"));
    }

    #[test]
    fn test_corrupt_amount_accepts_question_mark() {
        let caps = CORRUPT_AMOUNT.captures("Total £4.?0").unwrap();
        assert_eq!(&caps[1], "4");
        assert_eq!(&caps[2], "?0");
    }

    #[test]
    fn test_place_joiners() {
        let caps = PLAIN_ROUTE.captures("Newcastle upon Tyne to London").unwrap();
        assert_eq!(&caps[1], "Newcastle upon Tyne");
        assert_eq!(&caps[2], "London");
    }
}
