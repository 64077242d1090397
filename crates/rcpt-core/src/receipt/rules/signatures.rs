//! Weighted receipt-type signature tables.
//!
//! Each receipt type owns an ordered list of patterns. A signature that
//! matches anywhere in the text adds its weight once to that type's score.
//! Keywords and phrases are matched against the lowercased copy of the
//! text; regexes run against the original casing.

use lazy_static::lazy_static;
use regex::Regex;

use crate::models::ReceiptType;
use crate::receipt::normalizer::CanonicalText;

/// How a signature is matched.
#[derive(Debug, Clone)]
pub enum SignatureKind {
    /// Whole-word match against the lowercased text.
    Keyword(Regex),
    /// Plain substring of the lowercased text.
    Phrase(&'static str),
    /// Regex over the original-casing body.
    Pattern(Regex),
}

#[derive(Debug, Clone)]
pub struct Signature {
    pub kind: SignatureKind,
    pub weight: u32,
}

impl Signature {
    fn keyword(word: &str, weight: u32) -> Self {
        let re = Regex::new(&format!(r"\b{}\b", regex::escape(word))).unwrap();
        Self { kind: SignatureKind::Keyword(re), weight }
    }

    fn phrase(text: &'static str, weight: u32) -> Self {
        Self { kind: SignatureKind::Phrase(text), weight }
    }

    fn pattern(re: &str, weight: u32) -> Self {
        Self { kind: SignatureKind::Pattern(Regex::new(re).unwrap()), weight }
    }

    /// Whether this signature occurs in the text.
    pub fn matches(&self, text: &CanonicalText) -> bool {
        match &self.kind {
            SignatureKind::Keyword(re) => re.is_match(&text.matching),
            SignatureKind::Phrase(phrase) => text.matching.contains(phrase),
            SignatureKind::Pattern(re) => re.is_match(&text.body),
        }
    }

    /// Short label for logging.
    pub fn label(&self) -> &str {
        match &self.kind {
            SignatureKind::Keyword(re) | SignatureKind::Pattern(re) => re.as_str(),
            SignatureKind::Phrase(s) => *s,
        }
    }
}

/// A brand name that both scores a receipt type and names the venue.
#[derive(Debug, Clone, Copy)]
pub struct KnownName {
    /// Lowercase search key.
    pub key: &'static str,
    /// Display name used in descriptions.
    pub name: &'static str,
    pub weight: u32,
}

impl KnownName {
    const fn new(key: &'static str, name: &'static str, weight: u32) -> Self {
        Self { key, name, weight }
    }

    fn signature(&self) -> Signature {
        Signature::keyword(self.key, self.weight)
    }
}

/// Hotel chains, longer names first.
pub const HOTEL_CHAINS: &[KnownName] = &[
    KnownName::new("premier inn", "Premier Inn", 5),
    KnownName::new("travelodge", "Travelodge", 5),
    KnownName::new("holiday inn express", "Holiday Inn Express", 1),
    KnownName::new("holiday inn", "Holiday Inn", 5),
    KnownName::new("point a hotel", "Point A Hotel", 5),
    KnownName::new("hilton", "Hilton", 4),
    KnownName::new("marriott", "Marriott", 4),
    KnownName::new("novotel", "Novotel", 4),
    KnownName::new("ibis", "Ibis", 4),
    KnownName::new("radisson", "Radisson", 4),
];

/// Food and drink venues, longer names first.
pub const FOOD_VENUES: &[KnownName] = &[
    KnownName::new("wasabi", "Wasabi", 4),
    KnownName::new("nonna bakery", "Nonna Bakery", 4),
    KnownName::new("starbucks", "Starbucks", 4),
    KnownName::new("costa", "Costa", 4),
    KnownName::new("pret a manger", "Pret A Manger", 1),
    KnownName::new("pret", "Pret", 4),
    KnownName::new("greggs", "Greggs", 4),
    KnownName::new("caffe nero", "Caffe Nero", 4),
];

lazy_static! {
    static ref TRAIN: Vec<Signature> = vec![
        Signature::keyword("trainline", 5),
        Signature::phrase("advance single", 4),
        Signature::phrase("anytime day single", 4),
        Signature::phrase("national rail", 3),
        Signature::keyword("railcard", 3),
        Signature::phrase("single fare", 3),
        Signature::keyword("gwr", 3),
        Signature::keyword("lner", 3),
        Signature::phrase("avanti west coast", 3),
        Signature::keyword("railway", 2),
        Signature::pattern(r"\b[A-Z][a-z]+ (?:Station|Central|Parkway)\b", 2),
        Signature::keyword("rail", 1),
        Signature::keyword("platform", 1),
        Signature::keyword("coach", 1),
        Signature::keyword("anytime", 1),
    ];

    static ref HOTEL: Vec<Signature> = HOTEL_CHAINS
        .iter()
        .map(KnownName::signature)
        .chain([
            Signature::keyword("hotel", 2),
            Signature::keyword("accommodation", 2),
            Signature::pattern(r"(?i)\b\d{1,2}\s*nights?\b", 2),
            Signature::pattern(r"(?i)\bcheck[\s-]?in\b", 1),
            Signature::pattern(r"(?i)\bcheck[\s-]?out\b", 1),
            Signature::keyword("room", 1),
            Signature::keyword("guest", 1),
            Signature::keyword("arrival", 1),
        ])
        .collect();

    static ref PARKING: Vec<Signature> = vec![
        Signature::keyword("paybyphone", 5),
        Signature::keyword("ringgo", 4),
        Signature::phrase("parking receipt", 4),
        Signature::phrase("airport parking", 4),
        Signature::keyword("parking", 3),
        Signature::phrase("car park", 3),
        Signature::phrase("pay and display", 3),
        Signature::keyword("vehicle", 1),
        Signature::keyword("registration", 1),
    ];

    static ref FOOD_DRINK: Vec<Signature> = FOOD_VENUES
        .iter()
        .map(KnownName::signature)
        .chain([
            Signature::keyword("restaurant", 2),
            Signature::keyword("cafe", 2),
            Signature::phrase("café", 2),
            Signature::keyword("coffee", 2),
            Signature::keyword("breakfast", 1),
            Signature::keyword("lunch", 1),
            Signature::keyword("dinner", 1),
            Signature::keyword("meal", 1),
            Signature::keyword("food", 1),
            Signature::keyword("bar", 1),
            Signature::keyword("pub", 1),
            Signature::keyword("sandwich", 1),
            Signature::keyword("latte", 1),
            Signature::keyword("cappuccino", 1),
            Signature::phrase("service charge", 1),
            Signature::pattern(r"(?i)\b(?:tip|gratuity)\b", 1),
        ])
        .collect();

    static ref METRO: Vec<Signature> = vec![
        Signature::keyword("tfl", 5),
        Signature::phrase("transport for london", 5),
        Signature::keyword("oyster", 4),
        Signature::keyword("tube", 3),
        Signature::keyword("underground", 2),
        Signature::keyword("metro", 2),
        Signature::phrase("journey history", 2),
    ];

    static ref FLIGHT: Vec<Signature> = vec![
        Signature::phrase("boarding pass", 4),
        Signature::phrase("british airways", 4),
        Signature::keyword("easyjet", 4),
        Signature::keyword("ryanair", 4),
        Signature::keyword("loganair", 4),
        Signature::keyword("jet2", 4),
        Signature::keyword("klm", 3),
        Signature::pattern(r"\b(?:BA|EZY|U2|FR|LM|LS|KL)\s?\d{2,4}\b", 3),
        Signature::keyword("flight", 2),
        Signature::keyword("airline", 2),
        Signature::keyword("boarding", 1),
        Signature::keyword("gate", 1),
        Signature::keyword("terminal", 1),
        Signature::keyword("passenger", 1),
    ];

    static ref UNKNOWN: Vec<Signature> = vec![
        Signature::phrase("disclosure and barring", 5),
        Signature::phrase("criminal record check", 5),
        Signature::keyword("dbs", 4),
    ];
}

/// Signature table of a receipt type.
pub fn signatures_for(receipt_type: ReceiptType) -> &'static [Signature] {
    match receipt_type {
        ReceiptType::Train => TRAIN.as_slice(),
        ReceiptType::Hotel => HOTEL.as_slice(),
        ReceiptType::Parking => PARKING.as_slice(),
        ReceiptType::FoodDrink => FOOD_DRINK.as_slice(),
        ReceiptType::Metro => METRO.as_slice(),
        ReceiptType::Flight => FLIGHT.as_slice(),
        ReceiptType::Unknown => UNKNOWN.as_slice(),
    }
}

/// First known name whose key appears in the lowercased text.
pub fn find_known(text: &CanonicalText, table: &[KnownName]) -> Option<&'static str> {
    table
        .iter()
        .find(|known| text.matching.contains(known.key))
        .map(|known| known.name)
}
