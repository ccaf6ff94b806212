//! Per-candidate decrypt and score.
//!
//! Each function returns `Ok(Some(_))` for a match, `Ok(None)` for a clean
//! miss and `Err(_)` for a candidate that could not be evaluated. The batch
//! loop decides what an error means; nothing here aborts a run.

use crate::plan::{ConstraintSet, PhraseMatch};
use crate::result::{Candidate, MatchResult, MatchedConstraint};
use crate::CandidateError;
use k4_core::analysis::{frequency_deviation, index_of_coincidence};
use k4_core::scoring::{contains_phrase, is_formable};
use k4_core::{Alphabet, Cipher, KeyedAlphabet, OutputCase, PreparedGromark, Primer, RunningKey};
use std::sync::Arc;

/// Immutable inputs shared by every batch of a run.
#[derive(Debug, Clone)]
pub struct SearchContext {
    pub ciphertext: Arc<str>,
    pub alphabet: Arc<Alphabet>,
    pub constraints: Arc<ConstraintSet>,
    pub keywords: Arc<[String]>,
    pub case: OutputCase,
}

/// Run every acceptance test against `plaintext`.
///
/// All phrases must match and every configured statistical bound must hold.
/// Returns what matched, or `None` on the first failure.
pub fn accept(plaintext: &str, constraints: &ConstraintSet) -> Option<Vec<MatchedConstraint>> {
    let mut matched = Vec::with_capacity(constraints.phrases.len() + 2);

    for phrase in &constraints.phrases {
        match constraints.phrase_match {
            PhraseMatch::Substring => {
                if !contains_phrase(phrase, plaintext) {
                    return None;
                }
                matched.push(MatchedConstraint::Phrase(phrase.clone()));
            }
            PhraseMatch::Subsequence => {
                if !is_formable(phrase, plaintext) {
                    return None;
                }
                matched.push(MatchedConstraint::Subsequence(phrase.clone()));
            }
        }
    }

    if let Some(band) = &constraints.band {
        if band.checks_ic() {
            let ic = index_of_coincidence(plaintext);
            if !band.ic_in_band(ic) {
                return None;
            }
            matched.push(MatchedConstraint::IndexOfCoincidence(ic));
        }
        if let Some(max) = band.max_deviation {
            match frequency_deviation(plaintext) {
                Some(d) if d < max => matched.push(MatchedConstraint::FrequencyDeviation(d)),
                _ => return None,
            }
        }
    }

    Some(matched)
}

pub fn evaluate_vigenere(
    keyword: &str,
    ctx: &SearchContext,
) -> Result<Option<MatchResult>, CandidateError> {
    let shifts = Cipher::vigenere_shifts(keyword, &ctx.alphabet);
    if shifts.is_empty() {
        return Err(CandidateError::InvalidKeyword(format!(
            "'{keyword}' has no symbols from the alphabet"
        )));
    }

    let plaintext = Cipher::vigenere_decrypt_shifts(&ctx.ciphertext, &shifts, &ctx.alphabet, ctx.case);
    Ok(accept(&plaintext, &ctx.constraints).map(|matched| MatchResult {
        candidate: Candidate::Vigenere { keyword: keyword.to_string() },
        alphabet: ctx.alphabet.to_string(),
        plaintext,
        matched,
    }))
}

/// One keyword's Gromark state, reused across its primers.
pub struct GromarkKeyword<'a> {
    keyword: &'a str,
    prepared: PreparedGromark,
    digits: Vec<u8>,
    plaintext: String,
}

impl<'a> GromarkKeyword<'a> {
    pub fn prepare(keyword: &'a str, ctx: &SearchContext) -> Result<Self, CandidateError> {
        let keyed = KeyedAlphabet::build(keyword, &ctx.alphabet)?;
        let prepared = PreparedGromark::new(&ctx.ciphertext, &keyed, &ctx.alphabet, ctx.case);
        Ok(Self {
            keyword,
            digits: Vec::with_capacity(prepared.len()),
            plaintext: String::with_capacity(prepared.len()),
            prepared,
        })
    }

    pub fn evaluate(
        &mut self,
        primer: Primer,
        ctx: &SearchContext,
    ) -> Result<Option<MatchResult>, CandidateError> {
        RunningKey::fill(primer, self.prepared.len(), &mut self.digits);
        self.prepared.decrypt_into(&self.digits, &mut self.plaintext);

        Ok(accept(&self.plaintext, &ctx.constraints).map(|matched| MatchResult {
            candidate: Candidate::Gromark {
                keyword: self.keyword.to_string(),
                primer,
            },
            alphabet: ctx.alphabet.to_string(),
            plaintext: self.plaintext.clone(),
            matched,
        }))
    }
}
