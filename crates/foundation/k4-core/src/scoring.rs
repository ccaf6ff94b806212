//! Plaintext acceptance tests

use crate::alphabet::single;

#[inline]
fn fold(c: char) -> char {
    single(c.to_uppercase()).unwrap_or(c)
}

/// True when the letters of `word` appear in `text` in order, not
/// necessarily adjacent. Case-insensitive, one pass over `text`.
pub fn is_formable(word: &str, text: &str) -> bool {
    let mut wanted = word.chars().map(fold).peekable();
    for c in text.chars().map(fold) {
        match wanted.peek() {
            Some(&w) if w == c => {
                wanted.next();
            }
            Some(_) => {}
            None => return true,
        }
    }
    wanted.peek().is_none()
}

/// Case-insensitive exact substring test. Whitespace is significant.
pub fn contains_phrase(phrase: &str, text: &str) -> bool {
    if phrase.is_empty() {
        return true;
    }
    if phrase.is_ascii() && text.is_ascii() {
        let needle = phrase.as_bytes();
        return text
            .as_bytes()
            .windows(needle.len())
            .any(|w| w.eq_ignore_ascii_case(needle));
    }
    let needle: String = phrase.chars().map(fold).collect();
    let haystack: String = text.chars().map(fold).collect();
    haystack.contains(&needle)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_formable() {
        assert!(is_formable("CAT", "CONCATENATE"));
        assert!(is_formable("cat", "xxCxxAxxTxx"));
        assert!(!is_formable("DOG", "CONCATENATE"));
        assert!(!is_formable("TAC", "CAT"));
        assert!(is_formable("", "anything"));
        assert!(!is_formable("A", ""));
    }

    #[test]
    fn test_formable_repeated_letters() {
        assert!(is_formable("ALL", "ALPHABETICAL"));
        assert!(!is_formable("ALLL", "ALPHABETICAL"));
    }

    #[test]
    fn test_contains_phrase() {
        assert!(contains_phrase("berlinclock", "xxBERLINCLOCKxx"));
        assert!(contains_phrase("Berlin Clock", "the berlin clock"));
        assert!(!contains_phrase("BERLINCLOCK", "berlin clock"));
        assert!(!contains_phrase("EAST", "EAS"));
        assert!(contains_phrase("", "abc"));
    }

    #[test]
    fn test_contains_phrase_non_ascii() {
        assert!(contains_phrase("ΓΔ", "αβγδ"));
        assert!(!contains_phrase("ΔΓ", "αβγδ"));
    }
}
