//! Known-plaintext anchors
//!
//! An anchor pins a plaintext segment to a ciphertext offset. Checking a
//! keyword against its anchors is far cheaper than a full decryption sweep,
//! so anchors are used to throw keywords away before any primer is tried.

use crate::{Alphabet, Cipher, Error, KeyedAlphabet, Result};
use serde::{Deserialize, Serialize};

/// Largest shift a single running-key digit can produce.
pub const GROMARK_MAX_SHIFT: usize = 9;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Anchor {
    /// Offset of the segment in the ciphertext, in characters
    pub position: usize,
    pub ciphertext: String,
    pub plaintext: String,
}

impl Anchor {
    pub fn new(
        position: usize,
        ciphertext: impl Into<String>,
        plaintext: impl Into<String>,
    ) -> Result<Self> {
        let ciphertext = ciphertext.into();
        let plaintext = plaintext.into();
        if plaintext.is_empty() {
            return Err(Error::InvalidAnchor("plaintext segment is empty".into()));
        }
        let (c, p) = (ciphertext.chars().count(), plaintext.chars().count());
        if c != p {
            return Err(Error::InvalidAnchor(format!(
                "segment lengths differ: ciphertext {c}, plaintext {p}"
            )));
        }
        Ok(Self { position, ciphertext, plaintext })
    }

    /// Anchor `plaintext` at `position` of the full `ciphertext`.
    pub fn at(ciphertext: &str, position: usize, plaintext: &str) -> Result<Self> {
        let len = plaintext.chars().count();
        let total = ciphertext.chars().count();
        if position.checked_add(len).map_or(true, |end| end > total) {
            return Err(Error::InvalidAnchor(format!(
                "'{plaintext}' at {position} runs past the ciphertext end ({total})"
            )));
        }
        let segment: String = ciphertext.chars().skip(position).take(len).collect();
        Self::new(position, segment, plaintext)
    }

    /// `(absolute position, cipher char, plain char)` for every aligned pair.
    pub fn pairs(&self) -> impl Iterator<Item = (usize, char, char)> + '_ {
        self.ciphertext
            .chars()
            .zip(self.plaintext.chars())
            .enumerate()
            .map(move |(j, (c, p))| (self.position.saturating_add(j), c, p))
    }

    /// One past the last covered offset; `None` if it does not fit a `usize`.
    pub fn end(&self) -> Option<usize> {
        self.position.checked_add(self.len())
    }

    pub fn len(&self) -> usize {
        self.plaintext.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.plaintext.is_empty()
    }
}

/// Gromark check against an already-built keyed alphabet.
///
/// Each aligned pair implies the running-key digit
/// `(straightPos - plainPos) mod N`; a digit above 9 is impossible.
pub fn gromark_anchor_consistent(
    keyed: &KeyedAlphabet,
    anchors: &[Anchor],
    straight: &Alphabet,
) -> bool {
    let n = straight.len();
    anchors.iter().flat_map(Anchor::pairs).all(|(_, c, p)| {
        match (keyed.index_of(c), straight.index_of(p)) {
            (Some(mixed), Some(plain)) if mixed < n => {
                (mixed + n - plain) % n <= GROMARK_MAX_SHIFT
            }
            _ => false,
        }
    })
}

/// Build the keyed alphabet for `keyword` and run the Gromark anchor check.
pub fn anchor_consistent(keyword: &str, anchors: &[Anchor], alphabet: &Alphabet) -> Result<bool> {
    let keyed = KeyedAlphabet::build(keyword, alphabet)?;
    Ok(gromark_anchor_consistent(&keyed, anchors, alphabet))
}

/// Vigenère check: every aligned pair must imply exactly the key shift at
/// its absolute position.
///
/// Cipher characters outside the alphabet are not enciphered and are
/// skipped; a plain character outside the alphabet rejects.
pub fn vigenere_anchor_consistent(
    keyword: &str,
    anchors: &[Anchor],
    alphabet: &Alphabet,
) -> Result<bool> {
    let shifts = Cipher::vigenere_shifts(keyword, alphabet);
    if shifts.is_empty() {
        return Err(Error::InvalidKeyword(format!(
            "'{keyword}' has no symbols from alphabet {alphabet}"
        )));
    }

    let n = alphabet.len();
    for (pos, c, p) in anchors.iter().flat_map(Anchor::pairs) {
        let Some(ci) = alphabet.index_of(c) else { continue };
        let Some(pi) = alphabet.index_of(p) else { return Ok(false) };
        if (ci + n - pi) % n != shifts[pos % shifts.len()] {
            return Ok(false);
        }
    }
    Ok(true)
}
