//! "By X" segment axis extraction.
use regex::Regex;
use std::sync::LazyLock;

static BY_PHRASE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bBy\s+([^,\d(]+?)(?:[,(]|\s+\d{4}|$)").expect("Hardcode regex pattern")
});

const TRAILING_NOISE: [&str; 12] = [
    "market", "markets", "estimates", "estimate", "forecast", "forecasts", "type", "types", "category",
    "categories", "size", "share",
];

const LEADING_ARTICLES: [&str; 3] = ["the", "a", "an"];

/// Axis named by a "By X" phrase, without trailing qualifiers and leading articles.
///
/// `"Market, By Product Type, 2021-2034"` yields `Some("Product")`.
pub fn by_axis(text: &str) -> Option<String> {
    let captured = BY_PHRASE.captures(text)?.get(1)?.as_str();
    let mut words: Vec<&str> = captured.split_whitespace().collect();
    while words.last().is_some_and(|word| TRAILING_NOISE.contains(&word.to_lowercase().as_str())) {
        words.pop();
    }
    while words.first().is_some_and(|word| LEADING_ARTICLES.contains(&word.to_lowercase().as_str())) {
        words.remove(0);
    }
    if words.is_empty() {
        None
    } else {
        Some(words.join(" "))
    }
}

/// First axis found among `candidates`, in order.
pub fn first_axis<'a>(candidates: impl IntoIterator<Item = &'a str>) -> Option<String> {
    candidates.into_iter().find_map(by_axis)
}
