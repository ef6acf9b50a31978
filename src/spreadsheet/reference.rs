//! Conversion between A1-style references and 0-based (row, col) indexes.

/// Parses an A1-style reference ("B7", "$AA$10") into a 0-based (row, col) pair.
pub(crate) fn reference_to_index(reference: &str) -> Option<(usize, usize)> {
    let mut col = 0usize;
    let mut row = 0usize;
    let mut letters = 0usize;
    let mut digits = 0usize;
    for character in reference.chars() {
        match character {
            '$' => (),
            'A'..='Z' | 'a'..='z' if digits == 0 => {
                let letter = character.to_ascii_uppercase() as usize - 'A' as usize + 1;
                col = col.checked_mul(26)?.checked_add(letter)?;
                letters += 1;
            }
            '0'..='9' if letters > 0 => {
                row = row.checked_mul(10)?.checked_add(character.to_digit(10)? as usize)?;
                digits += 1;
            }
            _ => return None,
        }
    }
    if letters == 0 || digits == 0 || row == 0 {
        None
    } else {
        Some((row - 1, col - 1))
    }
}

/// Formats a 0-based (row, col) pair as an A1-style reference.
pub(crate) fn index_to_reference(row: usize, col: usize) -> String {
    let mut column = col + 1;
    let mut letters = Vec::new();
    while column > 0 {
        column -= 1;
        letters.push((b'A' + (column % 26) as u8) as char);
        column /= 26;
    }
    letters.iter().rev().collect::<String>() + &(row + 1).to_string()
}
