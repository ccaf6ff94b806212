//! Columnar-keyed mixed alphabets
//!
//! The keyword (deduplicated) followed by the unused alphabet symbols is laid
//! out row-major under the keyword, then read off column by column in the
//! alphabetical order of the keyword letters.
//!
//! ```text
//! keyword GRONSFELD, ranks 4 8 7 6 9 3 2 5 1
//!
//!   G R O N S F E L D
//!   A B C H I J K M P
//!   Q T U V W X Y Z
//!
//! read D, E, F, G, L, N, O, R, S  ->  DPEKYFJXGAQLMZNHVOCURBTSIW
//! ```

use crate::{Alphabet, Error, Result};
use std::fmt;

/// A permutation of a base alphabet derived from a keyword.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyedAlphabet {
    keyword: String,
    mixed: Alphabet,
}

impl KeyedAlphabet {
    /// Build the mixed alphabet for `keyword` over `base`.
    ///
    /// Keyword symbols are folded to the base's case convention; symbols the
    /// base does not contain are dropped so the result stays a permutation.
    pub fn build(keyword: &str, base: &Alphabet) -> Result<Self> {
        if keyword.trim().is_empty() {
            return Err(Error::InvalidKeyword("keyword is empty".into()));
        }

        let mut used = vec![false; base.len()];
        let mut key: Vec<char> = Vec::with_capacity(keyword.len());
        for c in keyword.chars() {
            if let Some(i) = base.index_of(c) {
                if !used[i] {
                    used[i] = true;
                    key.push(base.symbol_at(i));
                }
            }
        }

        if key.is_empty() {
            return Err(Error::InvalidKeyword(format!(
                "'{keyword}' has no symbols from alphabet {base}"
            )));
        }

        let working: Vec<char> = key
            .iter()
            .copied()
            .chain(
                base.symbols()
                    .iter()
                    .zip(&used)
                    .filter(|(_, &taken)| !taken)
                    .map(|(&c, _)| c),
            )
            .collect();

        let cols = key.len();
        let mut mixed = Vec::with_capacity(working.len());
        for col in column_order(&key) {
            // step_by walks one grid column; the ragged last row just ends early
            mixed.extend(working.iter().skip(col).step_by(cols).copied());
        }

        Ok(Self {
            keyword: key.into_iter().collect(),
            mixed: Alphabet::from_distinct(mixed),
        })
    }

    /// The deduplicated, case-folded keyword actually used for the grid.
    pub fn keyword(&self) -> &str {
        &self.keyword
    }

    pub fn alphabet(&self) -> &Alphabet {
        &self.mixed
    }

    pub fn into_alphabet(self) -> Alphabet {
        self.mixed
    }

    #[inline]
    pub fn index_of(&self, symbol: char) -> Option<usize> {
        self.mixed.index_of(symbol)
    }

    #[inline]
    pub fn symbol_at(&self, index: usize) -> char {
        self.mixed.symbol_at(index)
    }

    pub fn len(&self) -> usize {
        self.mixed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mixed.is_empty()
    }
}

impl AsRef<Alphabet> for KeyedAlphabet {
    fn as_ref(&self) -> &Alphabet {
        &self.mixed
    }
}

impl fmt::Display for KeyedAlphabet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.mixed.fmt(f)
    }
}

/// Column indices in read order.
///
/// Each keyword letter is ranked by its slot in the sorted letter multiset;
/// the stable sort hands equal letters increasing ranks in order of first
/// occurrence.
pub fn column_order(key: &[char]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..key.len()).collect();
    order.sort_by_key(|&i| key[i]);
    order
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keyed(word: &str) -> String {
        KeyedAlphabet::build(word, &Alphabet::standard())
            .unwrap()
            .to_string()
    }

    #[test]
    fn test_known_mixed_alphabets() {
        assert_eq!(keyed("GRONSFELD"), "DPEKYFJXGAQLMZNHVOCURBTSIW");
        assert_eq!(keyed("KRYPTOS"), "KAHUOFNPDLXRBIVSGQTEMZYCJW");
        assert_eq!(keyed("ZEBRA"), "AHMSXBFKPVEDJOURGLQWZCINTY");
    }

    #[test]
    fn test_repeated_letters_deduplicate() {
        assert_eq!(keyed("BALLOON"), "ADIQVBCHPUZLEJRWNGMTYOFKSX");
        let k = KeyedAlphabet::build("balloon", &Alphabet::standard()).unwrap();
        assert_eq!(k.keyword(), "BALON");
    }

    #[test]
    fn test_single_letter_is_identity() {
        assert_eq!(keyed("A"), "ABCDEFGHIJKLMNOPQRSTUVWXYZ");
        assert_eq!(keyed("AAAA"), "ABCDEFGHIJKLMNOPQRSTUVWXYZ");
    }

    #[test]
    fn test_is_permutation_for_many_keywords() {
        let base = Alphabet::standard();
        for word in ["QUIZ", "PALIMPSEST", "ABSCISSA", "XYZZY", "THEQUICKBROWNFOXJUMPSOVERLAZYDOG", "k4"] {
            let k = KeyedAlphabet::build(word, &base).unwrap();
            let mut got: Vec<char> = k.alphabet().symbols().to_vec();
            got.sort_unstable();
            let mut want: Vec<char> = base.symbols().to_vec();
            want.sort_unstable();
            assert_eq!(got, want, "keyword {word}");
        }
    }

    #[test]
    fn test_custom_alphabet_permutation() {
        let base = Alphabet::kryptos();
        let k = KeyedAlphabet::build("BERLIN", &base).unwrap();
        assert_eq!(k.len(), base.len());
        assert!(base.symbols().iter().all(|&c| k.index_of(c).is_some()));
    }

    #[test]
    fn test_foreign_symbols_are_dropped() {
        let base = Alphabet::new("ABCDEF".chars()).unwrap();
        let k = KeyedAlphabet::build("FZ-A", &base).unwrap();
        assert_eq!(k.keyword(), "FA");
        assert_eq!(k.len(), 6);
    }

    #[test]
    fn test_empty_keyword_rejected() {
        let base = Alphabet::standard();
        assert!(matches!(KeyedAlphabet::build("", &base), Err(Error::InvalidKeyword(_))));
        assert!(matches!(KeyedAlphabet::build("123", &base), Err(Error::InvalidKeyword(_))));
    }

    #[test]
    fn test_column_order_stable_ties() {
        assert_eq!(column_order(&['B', 'A', 'B', 'A']), vec![1, 3, 0, 2]);
    }
}
