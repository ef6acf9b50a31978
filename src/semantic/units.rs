//! Unit phrases: detection for the `Units` field and removal from product names.
use crate::spreadsheet::{Cell, RawSheet};
use regex::{Captures, Regex};
use std::sync::LazyLock;

/// Rows at the top of a sheet searched for a unit annotation
pub const UNIT_SCAN_ROWS: usize = 10;

static PAREN_UNIT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\(\s*(?:(usd|us\$|eur|gbp)\s*)?(billion|million|thousand|bn|mn|units)(\s+units)?\s*\)")
        .expect("Hardcode regex pattern")
});

static BARE_UNIT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(usd|us\$|eur|gbp)\s+(billion|million|thousand|bn|mn)\b").expect("Hardcode regex pattern")
});

static STRIP_RULES: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    [
        (r"(?i)\(\s*(?:(?:usd|us\$|eur|gbp)\s*)?(?:billion|million|thousand|bn|mn|units)(?:\s+units)?\s*\)", ""),
        (r"(?i)(?:\b|\$)(?:usd|us\$|eur|gbp)\s+(?:billion|million|thousand|bn|mn)\b", ""),
        (r"(?i)\b(?:billion|million|units)\b", ""),
        (r"\(?\s*\b(?:19|20)\d{2}\s*[-–]\s*(?:19|20)\d{2}\b\s*\)?", ""),
        (r"\(\s*\)", ""),
        (r"\s*,(?:\s*,)+", ","),
        (r"\s+,", ","),
        (r"\s{2,}", " "),
    ]
    .into_iter()
    .map(|(pattern, replacement)| (Regex::new(pattern).expect("Hardcode regex pattern"), replacement))
    .collect()
});

fn canonical_currency(currency: &str) -> &'static str {
    match currency.to_ascii_lowercase().as_str() {
        "eur" => "EUR",
        "gbp" => "GBP",
        _ => "USD",
    }
}

fn canonical_scale(scale: &str) -> &'static str {
    match scale.to_ascii_lowercase().as_str() {
        "billion" | "bn" => "Billion",
        "million" | "mn" => "Million",
        "thousand" => "Thousand",
        _ => "Units",
    }
}

fn render(captures: &Captures) -> String {
    let mut parts = Vec::with_capacity(3);
    if let Some(currency) = captures.get(1) {
        parts.push(canonical_currency(currency.as_str()));
    }
    if let Some(scale) = captures.get(2) {
        parts.push(canonical_scale(scale.as_str()));
    }
    if captures.get(3).is_some() {
        parts.push("Units");
    }
    format!("({})", parts.join(" "))
}

/// Parenthesized unit annotation of a text, normalized to `(USD Billion)` form.
pub fn parenthesized_unit(text: &str) -> Option<String> {
    PAREN_UNIT.captures(text).map(|captures| render(&captures))
}

/// Bare `USD Billion` style annotation, normalized to `(USD Billion)` form.
pub fn bare_unit(text: &str) -> Option<String> {
    BARE_UNIT.captures(text).map(|captures| render(&captures))
}

/// Units of a sheet.
///
/// Cells of the first rows come first, parenthesized forms before bare ones.
/// Then the sheet name and table titles, then `default_units`.
pub fn sheet_units(sheet: &RawSheet, titles: &[String], default_units: &str) -> String {
    let top_texts: Vec<&str> = sheet.grid.iter().take(UNIT_SCAN_ROWS).flatten().filter_map(Cell::as_text).collect();
    let context: Vec<&str> = std::iter::once(sheet.name.as_str()).chain(titles.iter().map(String::as_str)).collect();

    for texts in [&top_texts, &context] {
        if let Some(unit) = texts.iter().find_map(|text| parenthesized_unit(text)) {
            return unit;
        }
        if let Some(unit) = texts.iter().find_map(|text| bare_unit(text)) {
            return unit;
        }
    }
    default_units.to_string()
}

fn strip_once(text: &str) -> String {
    let stripped = STRIP_RULES
        .iter()
        .fold(text.to_string(), |current, (pattern, replacement)| pattern.replace_all(&current, *replacement).into_owned());
    stripped.trim_matches(|c: char| c.is_whitespace() || c == ',' || c == '-' || c == ':').to_string()
}

/// Removes unit phrases and year ranges from a product name.
///
/// Applied until the text stops changing, so stripping an already stripped
/// name is a no-op.
pub fn strip_units(text: &str) -> String {
    let mut current = strip_once(text);
    for _ in 0..8 {
        let next = strip_once(&current);
        if next == current {
            break;
        }
        current = next;
    }
    current
}
