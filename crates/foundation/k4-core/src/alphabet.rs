//! Alphabet Model
//!
//! An ordered set of distinct symbols with constant-time lookup in both
//! directions. Every other component takes an `Alphabet` explicitly; there is
//! no process-wide default.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Straight 26-letter Latin alphabet.
pub const STANDARD: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// The Kryptos sculpture tableau alphabet.
pub const KRYPTOS: &str = "KRYPTOSABCDEFGHIJLMNQUVWXZ";

const ABSENT: u8 = u8::MAX;

/// How lookups fold the case of incoming symbols.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CaseConvention {
    /// Every cased symbol is upper case; lookups upper-case their input
    Upper,
    /// Every cased symbol is lower case; lookups lower-case their input
    Lower,
    /// No symbol has case (digits, punctuation)
    Uncased,
    /// Both cases present; lookups are exact
    Mixed,
}

impl CaseConvention {
    fn detect(symbols: &[char]) -> Self {
        let upper = symbols.iter().any(|c| c.is_uppercase());
        let lower = symbols.iter().any(|c| c.is_lowercase());
        match (upper, lower) {
            (true, false) => CaseConvention::Upper,
            (false, true) => CaseConvention::Lower,
            (false, false) => CaseConvention::Uncased,
            (true, true) => CaseConvention::Mixed,
        }
    }

    /// Fold one symbol to this convention.
    ///
    /// Characters whose case mapping expands to more than one char are
    /// returned unchanged.
    pub fn fold(&self, c: char) -> char {
        match self {
            CaseConvention::Upper => single(c.to_uppercase()).unwrap_or(c),
            CaseConvention::Lower => single(c.to_lowercase()).unwrap_or(c),
            CaseConvention::Uncased | CaseConvention::Mixed => c,
        }
    }
}

pub(crate) fn single(mut mapped: impl Iterator<Item = char>) -> Option<char> {
    match (mapped.next(), mapped.next()) {
        (Some(c), None) => Some(c),
        _ => None,
    }
}

/// Ordered sequence of distinct symbols.
#[derive(Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Alphabet {
    symbols: Vec<char>,
    ascii: [u8; 128],
    extended: HashMap<char, usize>,
    case: CaseConvention,
}

impl Alphabet {
    /// Build from symbols taken verbatim.
    pub fn new<I: IntoIterator<Item = char>>(symbols: I) -> Result<Self> {
        let symbols: Vec<char> = symbols.into_iter().collect();
        if symbols.is_empty() {
            return Err(Error::InvalidAlphabet("alphabet is empty".into()));
        }

        let mut seen: HashMap<char, usize> = HashMap::with_capacity(symbols.len());
        for (i, &c) in symbols.iter().enumerate() {
            if let Some(first) = seen.insert(c, i) {
                return Err(Error::InvalidAlphabet(format!(
                    "duplicate symbol '{c}' at positions {first} and {i}"
                )));
            }
        }

        Ok(Self::from_distinct(symbols))
    }

    /// Upper-case `text` and build an alphabet from its characters.
    pub fn parse(text: &str) -> Result<Self> {
        Self::new(text.trim().to_uppercase().chars())
    }

    /// A–Z.
    pub fn standard() -> Self {
        Self::from_distinct(STANDARD.chars().collect())
    }

    /// `KRYPTOSABCDEFGHIJLMNQUVWXZ`.
    pub fn kryptos() -> Self {
        Self::from_distinct(KRYPTOS.chars().collect())
    }

    /// Callers guarantee `symbols` is non-empty and duplicate-free.
    pub(crate) fn from_distinct(symbols: Vec<char>) -> Self {
        let mut ascii = [ABSENT; 128];
        let mut extended = HashMap::new();
        for (i, &c) in symbols.iter().enumerate() {
            if c.is_ascii() && i < ABSENT as usize {
                ascii[c as usize] = i as u8;
            } else {
                extended.insert(c, i);
            }
        }
        let case = CaseConvention::detect(&symbols);
        Self { symbols, ascii, extended, case }
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// Always false; construction rejects empty alphabets.
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn symbols(&self) -> &[char] {
        &self.symbols
    }

    pub fn case(&self) -> CaseConvention {
        self.case
    }

    /// Fold `c` to this alphabet's case convention.
    pub fn fold(&self, c: char) -> char {
        self.case.fold(c)
    }

    /// Position of `symbol` after case folding.
    #[inline]
    pub fn index_of(&self, symbol: char) -> Option<usize> {
        let c = self.fold(symbol);
        if c.is_ascii() {
            match self.ascii[c as usize] {
                ABSENT => self.extended.get(&c).copied(),
                i => Some(i as usize),
            }
        } else {
            self.extended.get(&c).copied()
        }
    }

    /// Symbol at `index`.
    ///
    /// # Panics
    /// When `index >= len()`, like slice indexing.
    #[inline]
    pub fn symbol_at(&self, index: usize) -> char {
        self.symbols[index]
    }

    pub fn get(&self, index: usize) -> Option<char> {
        self.symbols.get(index).copied()
    }

    pub fn contains(&self, symbol: char) -> bool {
        self.index_of(symbol).is_some()
    }

    /// `(index - shift) mod len`, for any shift.
    #[inline]
    pub fn shift_back(&self, index: usize, shift: usize) -> usize {
        let n = self.len();
        (index + n - shift % n) % n
    }

    /// `(index + shift) mod len`.
    #[inline]
    pub fn shift_forward(&self, index: usize, shift: usize) -> usize {
        (index + shift) % self.len()
    }

    /// True when every symbol of `word` (after folding) is in the alphabet.
    pub fn covers(&self, word: &str) -> bool {
        word.chars().all(|c| self.contains(c))
    }
}

impl PartialEq for Alphabet {
    fn eq(&self, other: &Self) -> bool {
        self.symbols == other.symbols
    }
}

impl Eq for Alphabet {}

impl fmt::Display for Alphabet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for c in &self.symbols {
            write!(f, "{c}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for Alphabet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Alphabet")
            .field("symbols", &self.to_string())
            .field("case", &self.case)
            .finish()
    }
}

impl Default for Alphabet {
    fn default() -> Self {
        Self::standard()
    }
}

impl TryFrom<String> for Alphabet {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value.chars())
    }
}

impl From<Alphabet> for String {
    fn from(alphabet: Alphabet) -> Self {
        alphabet.to_string()
    }
}

impl std::str::FromStr for Alphabet {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
