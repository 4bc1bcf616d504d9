//! Excel-style cell reference conversions ("B3" <-> zero-based (2, 1)).

/// Parses a cell reference into zero-based (row, column) indexes.
/// Returns None when the reference is malformed.
pub(crate) fn reference_to_index(reference: &str) -> Option<(usize, usize)> {
    let split = reference.find(|c: char| c.is_ascii_digit())?;
    let (letters, digits) = reference.split_at(split);
    if letters.is_empty() {
        return None;
    }
    let mut column = 0usize;
    for character in letters.chars() {
        let digit = character.to_ascii_uppercase();
        if !digit.is_ascii_uppercase() {
            return None;
        }
        column = column * 26 + (digit as usize - 'A' as usize + 1);
    }
    let row = digits.parse::<usize>().ok()?.checked_sub(1)?;
    Some((row, column - 1))
}

/// Converts zero-based (row, column) indexes to an Excel-style reference.
pub(crate) fn index_to_reference(row: usize, column: usize) -> String {
    let row = (row + 1).to_string();
    let mut column: u32 = column as u32 + 1;
    let mut reference = String::from("");
    while column > 0 {
        column -= 1;
        let digit = char::from_u32(65 + column % 26).expect("Hardcode letters");
        column /= 26;
        reference.insert(0, digit);
    }
    reference.push_str(row.as_str());
    reference
}
