//! Description templates per receipt type.
//!
//! Every template degrades to a generic phrase when its entities cannot be
//! recovered, so a description is always produced.

use regex::Regex;

use super::dates::date_from_parts;
use super::patterns::{
    AIRPORT_PAIR, ARRIVAL_DATE, BOOKING_ROUTE, CLOCK_TIME, DATE_DMY, DEPARTURE_DATE, FROM_TO,
    HAS_LETTERS, HOTEL_NAMED, LABELED_LOCATION, LABELED_PURPOSE, NAMED_HOTEL, NAMED_TERMINUS,
    NIGHTS, PARENTHETICAL, PLAIN_ROUTE, RETURN_TRIP, SUFFIXED_STATION, TIMETABLE_ROUTE,
    TUBE_JOURNEY, UPPERCASE_STATION,
};
use super::signatures::{FOOD_VENUES, HOTEL_CHAINS, find_known};
use crate::models::ReceiptType;
use crate::receipt::normalizer::CanonicalText;

pub const UNKNOWN_EXPENSE: &str = "Unknown expense";

/// Brand and ticket words that OCR runs into station names.
const STATION_NOISE: &[&str] = &[
    "trainline", "your", "ticket", "tickets", "advance", "anytime", "off", "peak", "day",
    "single", "return", "journey", "booking", "confirmation", "trip", "from", "to", "standard",
    "first", "class", "railcard", "subject", "outward", "inward", "e-ticket", "national", "rail",
    "station",
];

/// Payment and ticketing words OCR glues onto Tube station names.
const METRO_NOISE: &[&str] = &[
    "contactless", "oyster", "tfl", "journey", "card", "pay", "as", "you", "go", "touch", "bus",
    "tram", "capped", "daily", "cap", "charge",
];

/// Leading words of parking headers that are not part of the location.
const PARKING_NOISE: &[&str] = &[
    "paybyphone", "ringgo", "parking", "car", "park", "pay", "and", "display", "receipt",
];

/// Three-letter capitals that are not airports.
const NOT_AIRPORTS: &[&str] = &[
    "GBP", "VAT", "TFL", "USD", "EUR", "THE", "AND", "FOR", "REF", "PNR", "ETA", "ETD", "SEQ",
];

/// Header lines that never name a venue.
const HEADER_NOISE: &[&str] = &[
    "receipt", "invoice", "till", "tax", "vat", "order", "table", "welcome", "thank", "date",
    "time", "tel", "phone", "www", "http", "@", "card", "server", "cashier", "copy",
];

const MAX_NIGHTS: i64 = 60;

/// Build the description for a classified receipt. Never empty.
pub fn describe(receipt_type: ReceiptType, text: &CanonicalText) -> String {
    let description = match receipt_type {
        ReceiptType::Train => describe_train(text),
        ReceiptType::Hotel => describe_hotel(text),
        ReceiptType::Parking => describe_parking(text),
        ReceiptType::FoodDrink => describe_food(text),
        ReceiptType::Metro => describe_metro(text),
        ReceiptType::Flight => describe_flight(text),
        ReceiptType::Unknown => describe_unknown(text),
    };

    if description.trim().is_empty() {
        UNKNOWN_EXPENSE.to_string()
    } else {
        description
    }
}

fn describe_train(text: &CanonicalText) -> String {
    if let Some((from, to)) = find_route(&RETURN_TRIP, &text.body) {
        return format!("Return train from {from} to {to}");
    }

    for re in [&*FROM_TO, &*BOOKING_ROUTE, &*TIMETABLE_ROUTE, &*PLAIN_ROUTE] {
        if let Some((from, to)) = find_route(re, &text.body) {
            return format!("Train from {from} to {to}");
        }
    }

    let mut stations: Vec<String> = Vec::new();
    for caps in SUFFIXED_STATION.captures_iter(&text.body) {
        if let Some(name) = clean_station(&caps[1]) {
            if !stations.contains(&name) {
                stations.push(name);
            }
        }
    }
    if let [from, to, ..] = stations.as_slice() {
        return format!("Train from {from} to {to}");
    }

    "Train journey".to_string()
}

/// First pair of distinct, cleaned place names captured by `re`.
fn find_route(re: &Regex, body: &str) -> Option<(String, String)> {
    re.captures_iter(body).find_map(|caps| {
        let from = clean_station(caps.get(1)?.as_str())?;
        let to = clean_station(caps.get(2)?.as_str())?;
        (from != to).then_some((from, to))
    })
}

fn clean_station(raw: &str) -> Option<String> {
    let without_notes = PARENTHETICAL.replace_all(raw, "");
    let name = trim_words(&without_notes, STATION_NOISE);
    (name.len() >= 3).then_some(name)
}

/// Drop noise words from both ends of a phrase.
fn trim_words(phrase: &str, noise: &[&str]) -> String {
    let is_noise = |w: &&str| noise.iter().any(|n| n.eq_ignore_ascii_case(w));
    let words: Vec<&str> = phrase.split_whitespace().collect();

    let start = words.iter().position(|w| !is_noise(w)).unwrap_or(words.len());
    let end = words.iter().rposition(|w| !is_noise(w)).map_or(start, |i| i + 1);

    words[start..end.max(start)].join(" ")
}

fn describe_hotel(text: &CanonicalText) -> String {
    let name = find_known(text, HOTEL_CHAINS)
        .map(str::to_string)
        .or_else(|| named_hotel(text));

    match (count_nights(text), name) {
        (Some(nights), Some(name)) => format!("{nights} night(s) at {name}"),
        _ => "Hotel stay".to_string(),
    }
}

fn named_hotel(text: &CanonicalText) -> Option<String> {
    text.lines.iter().find_map(|line| {
        NAMED_HOTEL
            .captures(line)
            .or_else(|| HOTEL_NAMED.captures(line))
            .map(|caps| caps[1].trim().to_string())
    })
}

/// Explicit "N nights", else departure minus arrival.
fn count_nights(text: &CanonicalText) -> Option<i64> {
    let explicit = NIGHTS
        .captures_iter(&text.body)
        .filter_map(|caps| caps[1].parse::<i64>().ok())
        .find(|n| (1..=MAX_NIGHTS).contains(n));
    if explicit.is_some() {
        return explicit;
    }

    let arrival = ARRIVAL_DATE
        .captures(&text.body)
        .and_then(|c| date_from_parts(&c[1], &c[2], &c[3]))?;
    let departure = DEPARTURE_DATE
        .captures(&text.body)
        .and_then(|c| date_from_parts(&c[1], &c[2], &c[3]))?;

    let nights = (departure - arrival).num_days();
    (1..=MAX_NIGHTS).contains(&nights).then_some(nights)
}

fn describe_parking(text: &CanonicalText) -> String {
    let labeled = text.lines.iter().find_map(|line| {
        let caps = LABELED_LOCATION.captures(line)?;
        let value = caps[1].split('£').next().unwrap_or_default().trim().to_string();
        (!value.is_empty()).then_some(value)
    });

    let location = labeled
        .or_else(|| {
            UPPERCASE_STATION
                .captures(&text.body)
                .map(|caps| title_case(&trim_words(&caps[1], PARKING_NOISE)))
        })
        .or_else(|| {
            NAMED_TERMINUS
                .captures(&text.body)
                .map(|caps| trim_words(&caps[1], PARKING_NOISE))
        })
        .filter(|loc| HAS_LETTERS.is_match(loc));

    match location {
        Some(loc) => format!("Parking at {loc}"),
        None => "Parking".to_string(),
    }
}

fn title_case(phrase: &str) -> String {
    phrase
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

fn describe_food(text: &CanonicalText) -> String {
    let venue = find_known(text, FOOD_VENUES)
        .map(str::to_string)
        .or_else(|| header_venue(text));

    match venue {
        Some(venue) => format!("Food/drink at {venue}"),
        None => "Food/drink".to_string(),
    }
}

/// First plausible shop name among the opening lines.
fn header_venue(text: &CanonicalText) -> Option<String> {
    text.lines.iter().take(10).find_map(|line| {
        let lower = line.to_lowercase();
        let plausible = (3..=40).contains(&line.chars().count())
            && HAS_LETTERS.is_match(line)
            && !line.contains('£')
            && !CLOCK_TIME.is_match(line)
            && !DATE_DMY.is_match(line)
            && !HEADER_NOISE.iter().any(|n| lower.contains(n));
        plausible.then(|| line.trim().to_string())
    })
}

fn describe_metro(text: &CanonicalText) -> String {
    let journeys: Vec<(String, String)> = TUBE_JOURNEY
        .captures_iter(&text.body)
        .filter_map(|caps| {
            let from = trim_words(&caps[1], METRO_NOISE);
            let to = trim_words(&caps[2], METRO_NOISE);
            (!from.is_empty() && !to.is_empty()).then_some((from, to))
        })
        .collect();

    match journeys.as_slice() {
        [] => "Tube/Metro travel".to_string(),
        [(from, to)] => format!("Tube from {from} to {to}"),
        [(a, b), (c, d)] => format!("Tube: {a} to {b}, {c} to {d}"),
        many => format!("Tube: {} journeys", many.len()),
    }
}

fn describe_flight(text: &CanonicalText) -> String {
    let airports = AIRPORT_PAIR.captures_iter(&text.body).find_map(|caps| {
        let (from, to) = (&caps[1], &caps[2]);
        let valid = from != to && !NOT_AIRPORTS.contains(&from) && !NOT_AIRPORTS.contains(&to);
        valid.then(|| (from.to_string(), to.to_string()))
    });

    match airports.or_else(|| find_route(&FROM_TO, &text.body)) {
        Some((from, to)) => format!("Flight from {from} to {to}"),
        None => "Flight".to_string(),
    }
}

fn describe_unknown(text: &CanonicalText) -> String {
    text.lines
        .iter()
        .find_map(|line| {
            let caps = LABELED_PURPOSE.captures(line)?;
            let purpose = caps[1].trim();
            HAS_LETTERS.is_match(purpose).then(|| purpose.to_string())
        })
        .unwrap_or_else(|| UNKNOWN_EXPENSE.to_string())
}
