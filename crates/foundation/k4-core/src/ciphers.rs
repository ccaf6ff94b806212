//! Classic Ciphers
//!
//! Vigenère and Gromark over arbitrary alphabets.
//!
//! Characters outside the alphabet pass through untouched and still consume a
//! key position: shift `i` always belongs to ciphertext character `i`.

use crate::alphabet::single;
use crate::{Alphabet, KeyedAlphabet, RunningKey};
use serde::{Deserialize, Serialize};

/// Case applied to decrypted symbols.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputCase {
    /// Lower-case plaintext
    #[default]
    Lower,
    /// Upper-case plaintext
    Upper,
    /// Symbols exactly as the alphabet stores them
    Alphabet,
}

impl OutputCase {
    #[inline]
    pub fn apply(&self, c: char) -> char {
        match self {
            OutputCase::Lower => single(c.to_lowercase()).unwrap_or(c),
            OutputCase::Upper => single(c.to_uppercase()).unwrap_or(c),
            OutputCase::Alphabet => c,
        }
    }
}

pub struct Cipher;

impl Cipher {
    // ═══════════════════════════════════════════════════════════
    // VIGENÈRE CIPHER
    // ═══════════════════════════════════════════════════════════

    /// Key symbols as alphabet indices. Symbols outside the alphabet are
    /// ignored.
    pub fn vigenere_shifts(key: &str, alphabet: &Alphabet) -> Vec<usize> {
        key.chars().filter_map(|c| alphabet.index_of(c)).collect()
    }

    /// Decrypt with a repeating key.
    ///
    /// A key with no usable symbols returns the ciphertext unchanged.
    pub fn vigenere_decrypt(
        ciphertext: &str,
        key: &str,
        alphabet: &Alphabet,
        case: OutputCase,
    ) -> String {
        let shifts = Self::vigenere_shifts(key, alphabet);
        Self::vigenere_decrypt_shifts(ciphertext, &shifts, alphabet, case)
    }

    /// Decrypt with precomputed shifts.
    pub fn vigenere_decrypt_shifts(
        ciphertext: &str,
        shifts: &[usize],
        alphabet: &Alphabet,
        case: OutputCase,
    ) -> String {
        if shifts.is_empty() {
            return ciphertext.to_string();
        }

        ciphertext
            .chars()
            .enumerate()
            .map(|(i, c)| match alphabet.index_of(c) {
                Some(idx) => {
                    let plain = alphabet.shift_back(idx, shifts[i % shifts.len()]);
                    case.apply(alphabet.symbol_at(plain))
                }
                None => c,
            })
            .collect()
    }

    /// Encrypt with a repeating key; output symbols are as the alphabet
    /// stores them.
    pub fn vigenere_encrypt(plaintext: &str, key: &str, alphabet: &Alphabet) -> String {
        let shifts = Self::vigenere_shifts(key, alphabet);
        if shifts.is_empty() {
            return plaintext.to_string();
        }

        plaintext
            .chars()
            .enumerate()
            .map(|(i, c)| match alphabet.index_of(c) {
                Some(idx) => {
                    alphabet.symbol_at(alphabet.shift_forward(idx, shifts[i % shifts.len()]))
                }
                None => c,
            })
            .collect()
    }

    // ═══════════════════════════════════════════════════════════
    // GROMARK CIPHER
    // ═══════════════════════════════════════════════════════════

    /// Decrypt with a keyed alphabet and running key.
    ///
    /// Positions past the end of the running key pass through.
    pub fn gromark_decrypt(
        ciphertext: &str,
        keyed: &KeyedAlphabet,
        key: &RunningKey,
        straight: &Alphabet,
        case: OutputCase,
    ) -> String {
        PreparedGromark::new(ciphertext, keyed, straight, case).decrypt(key.digits())
    }

    /// Encrypt with a keyed alphabet and running key.
    pub fn gromark_encrypt(
        plaintext: &str,
        keyed: &KeyedAlphabet,
        key: &RunningKey,
        straight: &Alphabet,
    ) -> String {
        let digits = key.digits();
        plaintext
            .chars()
            .enumerate()
            .map(|(i, c)| match (straight.index_of(c), digits.get(i)) {
                (Some(plain), Some(&d)) => {
                    let mixed = straight.shift_forward(plain, d as usize);
                    keyed.alphabet().get(mixed).unwrap_or(c)
                }
                _ => c,
            })
            .collect()
    }
}

#[derive(Debug, Clone, Copy)]
struct Cell {
    original: char,
    mixed: Option<usize>,
}

/// Ciphertext already mapped through one keyed alphabet.
///
/// The primer sweep holds the keyword fixed and varies only the digits, so
/// the mixed-alphabet lookups are done once here and each primer costs one
/// modular subtraction per symbol.
#[derive(Debug, Clone)]
pub struct PreparedGromark {
    cells: Vec<Cell>,
    plain: Vec<char>,
}

impl PreparedGromark {
    pub fn new(
        ciphertext: &str,
        keyed: &KeyedAlphabet,
        straight: &Alphabet,
        case: OutputCase,
    ) -> Self {
        let n = straight.len();
        let cells = ciphertext
            .chars()
            .map(|c| Cell {
                original: c,
                // straight.index_of(straight[mixedPos]) is mixedPos itself
                mixed: keyed.index_of(c).filter(|&m| m < n),
            })
            .collect();
        let plain = straight.symbols().iter().map(|&c| case.apply(c)).collect();
        Self { cells, plain }
    }

    /// Ciphertext length in characters; the running key length to generate.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn decrypt(&self, digits: &[u8]) -> String {
        let mut out = String::with_capacity(self.cells.len());
        self.decrypt_into(digits, &mut out);
        out
    }

    /// Decrypt into `out`, clearing it first.
    pub fn decrypt_into(&self, digits: &[u8], out: &mut String) {
        out.clear();
        let n = self.plain.len();
        for (i, cell) in self.cells.iter().enumerate() {
            match (cell.mixed, digits.get(i)) {
                (Some(m), Some(&d)) => {
                    let plain = (m + n - d as usize % n) % n;
                    out.push(self.plain[plain]);
                }
                _ => out.push(cell.original),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Primer;

    const GROMARK_CT: &str =
        "OHRERPHTMNUQDPUYQTGQHABASQXPTHPYSIXJUFVKNGNDRRIOMAEJGZKHCBNDBIWLDGVWDDVLXCSCZS";
    const GROMARK_PT: &str =
        "onlytwothingsareinfinitetheuniverseandhumanstupidityandimnotsureabouttheformer";

    const K1_CT: &str = "EMUFPHZLRFAXYUSDJKZLDKRNSHGNFIVJYQTQUXQBQVYUVLLTREVJYQTMKYRDMFD";
    const K1_PT: &str = "BETWEENSUBTLESHADINGANDTHEABSENCEOFLIGHTLIESTHENUANCEOFIQLUSION";

    fn running_key(primer: &str, len: usize) -> RunningKey {
        RunningKey::generate(primer.parse::<Primer>().unwrap(), len)
    }

    #[test]
    fn test_vigenere_known_vectors() {
        let a = Alphabet::standard();
        assert_eq!(
            Cipher::vigenere_decrypt("HELLO, WORLD", "KEY", &a, OutputCase::Upper),
            "XANBK, SQHHF"
        );
        assert_eq!(Cipher::vigenere_encrypt("HELLO, WORLD", "KEY", &a), "RIJVS, AMBPB");
        assert_eq!(Cipher::vigenere_encrypt("HELLO", "KEY", &a), "RIJVS");
    }

    #[test]
    fn test_vigenere_default_case_is_lower() {
        let a = Alphabet::standard();
        assert_eq!(
            Cipher::vigenere_decrypt("HELLO, WORLD", "KEY", &a, OutputCase::default()),
            "xanbk, sqhhf"
        );
    }

    #[test]
    fn test_vigenere_kryptos_k1() {
        let a = Alphabet::kryptos();
        let pt = Cipher::vigenere_decrypt(K1_CT, "PALIMPSEST", &a, OutputCase::Alphabet);
        assert_eq!(pt, K1_PT);
        assert_eq!(Cipher::vigenere_encrypt(K1_PT, "palimpsest", &a), K1_CT);
    }

    #[test]
    fn test_vigenere_unusable_key() {
        let a = Alphabet::standard();
        assert_eq!(Cipher::vigenere_decrypt("ABC def", "123", &a, OutputCase::Lower), "ABC def");
        assert_eq!(Cipher::vigenere_decrypt("ABC", "", &a, OutputCase::Lower), "ABC");
    }

    #[test]
    fn test_vigenere_ignores_foreign_key_symbols() {
        let a = Alphabet::standard();
        assert_eq!(
            Cipher::vigenere_decrypt("RIJVS", "K-E-Y", &a, OutputCase::Upper),
            "HELLO"
        );
    }

    #[test]
    fn test_gromark_end_to_end() {
        let straight = Alphabet::standard();
        let keyed = KeyedAlphabet::build("GRONSFELD", &straight).unwrap();
        let key = running_key("32941", GROMARK_CT.len());
        let pt = Cipher::gromark_decrypt(GROMARK_CT, &keyed, &key, &straight, OutputCase::Lower);
        assert_eq!(pt, GROMARK_PT);

        let upper = GROMARK_PT.to_uppercase();
        assert_eq!(Cipher::gromark_encrypt(&upper, &keyed, &key, &straight), GROMARK_CT);
    }

    #[test]
    fn test_gromark_passthrough_keeps_key_position() {
        let straight = Alphabet::standard();
        let keyed = KeyedAlphabet::build("GRONSFELD", &straight).unwrap();
        let key = running_key("12345", 14);
        let ct = Cipher::gromark_encrypt("ATTACK AT DAWN", &keyed, &key, &straight);
        assert_eq!(ct, "PBTYXZ XE LEER");
        assert_eq!(
            Cipher::gromark_decrypt(&ct, &keyed, &key, &straight, OutputCase::Lower),
            "attack at dawn"
        );
    }

    #[test]
    fn test_gromark_short_key_passes_tail_through() {
        let straight = Alphabet::standard();
        let keyed = KeyedAlphabet::build("GRONSFELD", &straight).unwrap();
        let key = running_key("32941", 4);
        let pt = Cipher::gromark_decrypt(&GROMARK_CT[..10], &keyed, &key, &straight, OutputCase::Lower);
        assert_eq!(pt, "onlyRPHTMN");
    }

    #[test]
    fn test_prepared_matches_direct() {
        let straight = Alphabet::standard();
        let keyed = KeyedAlphabet::build("GRONSFELD", &straight).unwrap();
        let prepared = PreparedGromark::new(GROMARK_CT, &keyed, &straight, OutputCase::Upper);
        assert_eq!(prepared.len(), GROMARK_CT.len());

        let mut buf = String::new();
        for primer in ["10000", "32941", "55555", "99999"] {
            let key = running_key(primer, prepared.len());
            prepared.decrypt_into(key.digits(), &mut buf);
            assert_eq!(
                buf,
                Cipher::gromark_decrypt(GROMARK_CT, &keyed, &key, &straight, OutputCase::Upper)
            );
        }
    }

    #[test]
    fn test_output_case_alphabet() {
        let a = Alphabet::new("abc".chars()).unwrap();
        assert_eq!(Cipher::vigenere_decrypt("CAB", "b", &a, OutputCase::Alphabet), "bca");
        assert_eq!(Cipher::vigenere_decrypt("CAB", "B", &a, OutputCase::Upper), "BCA");
    }
}
