use std::collections::BTreeSet;

/// Lengths a cleaned product key may have (ISBN-10 and ISBN-13).
pub const VALID_KEY_LENGTHS: [usize; 2] = [10, 13];

/// Clean a candidate product identifier.
///
/// Keeps only ASCII digits and `X`/`x`, uppercasing the result.
/// "978-3-16-148410-0" -> "9783161484100", "0-306-40615-x" -> "030640615X".
pub fn clean(raw: &str) -> String {
    raw.chars()
        .filter_map(|c| match c {
            '0'..='9' | 'X' => Some(c),
            'x' => Some('X'),
            _ => None,
        })
        .collect()
}

/// A cleaned key is valid when it has exactly 10 or 13 characters.
///
/// No check digit is computed.
pub fn is_valid(key: &str) -> bool {
    VALID_KEY_LENGTHS.contains(&key.len())
}

/// Clean a raw cell and return the key only if it is valid.
pub fn normalize(raw: &str) -> Option<String> {
    let key = clean(raw);
    is_valid(&key).then_some(key)
}

/// Valid keys extracted from a column, in cell order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedKeys {
    /// Every valid key in the order it appeared, duplicates included.
    pub keys: Vec<String>,
    /// Number of cells dropped because they did not clean to a valid key.
    pub rejected: usize,
}

impl ExtractedKeys {
    /// Unique view of the extracted keys for membership tests.
    pub fn unique(&self) -> BTreeSet<&str> {
        self.keys.iter().map(String::as_str).collect()
    }
}

/// Apply `clean` and `is_valid` to every cell, dropping invalid entries.
pub fn extract_valid_keys<S: AsRef<str>>(column: &[S]) -> ExtractedKeys {
    let mut extracted = ExtractedKeys::default();
    for cell in column {
        match normalize(cell.as_ref()) {
            Some(key) => extracted.keys.push(key),
            None => extracted.rejected += 1,
        }
    }
    extracted
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_isbn13_with_hyphens() {
        assert_eq!(clean("978-3-16-148410-0"), "9783161484100");
        assert!(is_valid(&clean("978-3-16-148410-0")));
    }

    #[test]
    fn test_clean_uppercases_check_character() {
        assert_eq!(clean("0-306-40615-x"), "030640615X");
    }

    #[test]
    fn test_clean_strips_letters_and_whitespace() {
        assert_eq!(clean(" ISBN: 978 0 13 468599 1 "), "9780134685991");
        assert_eq!(clean("abc"), "");
    }

    #[test]
    fn test_is_valid_lengths_only() {
        assert!(is_valid("0306406152"));
        assert!(is_valid("9780306406157"));
        assert!(!is_valid("111"));
        assert!(!is_valid("97803064061"));
        // no check digit validation
        assert!(is_valid("0000000000"));
    }

    #[test]
    fn test_extract_keeps_duplicates_and_counts_rejects() {
        let column = ["978-0-13-468599-1", "n/a", "9780134685991", "12345"];
        let extracted = extract_valid_keys(&column);
        assert_eq!(extracted.keys, vec!["9780134685991", "9780134685991"]);
        assert_eq!(extracted.rejected, 2);
        assert_eq!(extracted.unique().len(), 1);
    }
}
