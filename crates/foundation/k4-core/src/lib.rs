//! K4 Core: classical cipher primitives for keyword/primer search
//!
//! Everything here is pure and shareable across worker threads; the search
//! orchestration lives in `k4-search`.
//!
//! # Modules
//! - `alphabet` - Ordered symbol sets with O(1) lookup
//! - `keyed` - Columnar-keyed mixed alphabets
//! - `running_key` - Gromark primers and digit running keys
//! - `ciphers` - Vigenère and Gromark encrypt/decrypt
//! - `analysis` - Index of Coincidence, English frequency deviation, n-grams
//! - `scoring` - Phrase and subsequence acceptance tests
//! - `anchor` - Known-plaintext anchors and cheap keyword rejection
//! - `source` - Candidate keyword sources

pub mod alphabet;
pub mod keyed;
pub mod running_key;
pub mod ciphers;
pub mod analysis;
pub mod scoring;
pub mod anchor;
pub mod source;

pub use alphabet::{Alphabet, CaseConvention};
pub use keyed::KeyedAlphabet;
pub use running_key::{Primer, PrimerRange, RunningKey};
pub use ciphers::{Cipher, OutputCase, PreparedGromark};
pub use analysis::{FrequencyAnalysis, index_of_coincidence, frequency_deviation, is_close_match};
pub use scoring::{is_formable, contains_phrase};
pub use anchor::{Anchor, anchor_consistent, gromark_anchor_consistent, vigenere_anchor_consistent};
pub use source::{KeywordSource, StaticKeywords, ChainedSource};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Invalid alphabet: {0}")]
    InvalidAlphabet(String),

    #[error("Invalid keyword: {0}")]
    InvalidKeyword(String),

    #[error("Invalid primer: {0}")]
    InvalidPrimer(String),

    #[error("Invalid anchor: {0}")]
    InvalidAnchor(String),

    #[error("Candidate source unavailable: {0}")]
    CandidateSourceUnavailable(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// The two cipher constructions the search engine attacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CipherFamily {
    /// Repeating-key polyalphabetic substitution
    Vigenere,
    /// Digit running key over a columnar-keyed mixed alphabet
    Gromark,
}

impl CipherFamily {
    pub fn name(&self) -> &'static str {
        match self {
            CipherFamily::Vigenere => "Vigenère Cipher",
            CipherFamily::Gromark => "Gromark Cipher",
        }
    }

    /// Whether candidates for this family also carry a numeric primer.
    pub fn uses_primer(&self) -> bool {
        matches!(self, CipherFamily::Gromark)
    }
}

impl std::fmt::Display for CipherFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CipherFamily::Vigenere => write!(f, "vigenere"),
            CipherFamily::Gromark => write!(f, "gromark"),
        }
    }
}
