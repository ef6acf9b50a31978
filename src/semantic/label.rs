//! Row label extraction and artifact filtering.
use crate::spreadsheet::Cell;
use regex::Regex;
use std::sync::LazyLock;

/// Leading cells searched for a label
pub const LABEL_SCAN_CELLS: usize = 3;

static BY_WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\bby\b").expect("Hardcode regex pattern"));

const ARTIFACT_WORDS: [&str; 4] = ["total", "segment", "forecast", "estimates"];

const HEADER_WORDS: [&str; 3] = ["region", "country", "product"];

/// First text cell among the leading cells that is not a number, with its offset.
///
/// Numeric text is never a label; bare years in [1990, 2100] included.
pub fn extract_label(cells: &[Cell]) -> Option<(usize, &str)> {
    cells.iter().take(LABEL_SCAN_CELLS).enumerate().find_map(|(index, cell)| match cell {
        Cell::Text(text) if cell.to_number().is_none() => Some((index, text.trim())),
        _ => None,
    })
}

/// Reason a label marks a header/footer artifact rather than data.
pub fn rejection(label: &str) -> Option<&'static str> {
    let lower = label.trim().to_lowercase();
    if let Some(word) = ARTIFACT_WORDS.iter().copied().find(|word| lower.contains(word)) {
        return Some(word);
    }
    if BY_WORD.is_match(&lower) {
        return Some("by");
    }
    HEADER_WORDS.iter().find(|word| lower == **word).copied()
}
