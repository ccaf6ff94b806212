//! What to search for: the attack and its acceptance constraints.

use crate::{Result, SearchError};
use k4_core::{Anchor, CipherFamily, PrimerRange};
use serde::{Deserialize, Serialize};

/// Cipher family plus the family-specific key space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "family", rename_all = "lowercase")]
pub enum Attack {
    /// Every keyword is one candidate
    Vigenere,
    /// Every keyword is paired with every primer in the range
    Gromark { primers: PrimerRange },
}

impl Attack {
    pub fn family(&self) -> CipherFamily {
        match self {
            Attack::Vigenere => CipherFamily::Vigenere,
            Attack::Gromark { .. } => CipherFamily::Gromark,
        }
    }

    /// Candidates per keyword.
    pub fn fan_out(&self) -> u64 {
        match self {
            Attack::Vigenere => 1,
            Attack::Gromark { primers } => primers.len() as u64,
        }
    }
}

/// How required phrases are matched against plaintext.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PhraseMatch {
    /// Contiguous, case-insensitive
    #[default]
    Substring,
    /// Letters in order, gaps allowed
    Subsequence,
}

/// Bounds on plaintext statistics. Unset bounds are not checked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct StatisticalBand {
    pub ic_min: Option<f64>,
    pub ic_max: Option<f64>,
    pub max_deviation: Option<f64>,
}

impl StatisticalBand {
    pub fn is_empty(&self) -> bool {
        self.ic_min.is_none() && self.ic_max.is_none() && self.max_deviation.is_none()
    }

    pub fn checks_ic(&self) -> bool {
        self.ic_min.is_some() || self.ic_max.is_some()
    }

    pub fn ic_in_band(&self, ic: f64) -> bool {
        self.ic_min.map_or(true, |lo| ic >= lo) && self.ic_max.map_or(true, |hi| ic <= hi)
    }
}

/// Read-only acceptance criteria for one run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConstraintSet {
    /// Every phrase must match
    pub phrases: Vec<String>,
    pub phrase_match: PhraseMatch,
    pub anchors: Vec<Anchor>,
    pub band: Option<StatisticalBand>,
}

impl ConstraintSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phrase(mut self, phrase: impl Into<String>) -> Self {
        self.phrases.push(phrase.into());
        self
    }

    pub fn matching(mut self, mode: PhraseMatch) -> Self {
        self.phrase_match = mode;
        self
    }

    pub fn anchor(mut self, anchor: Anchor) -> Self {
        self.anchors.push(anchor);
        self
    }

    pub fn band(mut self, band: StatisticalBand) -> Self {
        self.band = Some(band).filter(|b| !b.is_empty());
        self
    }

    /// At least one phrase or statistical bound decides acceptance.
    /// Anchors only prefilter.
    pub fn has_acceptance_test(&self) -> bool {
        !self.phrases.is_empty() || self.band.is_some_and(|b| !b.is_empty())
    }

    /// Setup checks against the ciphertext the run will use.
    pub fn validate(&self, ciphertext: &str) -> Result<()> {
        if !self.has_acceptance_test() {
            return Err(SearchError::InvalidConstraints(
                "no required phrase or statistical band; every candidate would match".into(),
            ));
        }
        if self.phrases.iter().any(|p| p.trim().is_empty()) {
            return Err(SearchError::InvalidConstraints("empty required phrase".into()));
        }
        if let Some(band) = &self.band {
            if let (Some(lo), Some(hi)) = (band.ic_min, band.ic_max) {
                if lo > hi {
                    return Err(SearchError::InvalidConstraints(format!(
                        "IC band {lo}..{hi} is empty"
                    )));
                }
            }
        }
        let len = ciphertext.chars().count();
        for anchor in &self.anchors {
            if anchor.end().map_or(true, |end| end > len) {
                return Err(SearchError::InvalidConstraints(format!(
                    "anchor '{}' at {} runs past the ciphertext end ({len})",
                    anchor.plaintext, anchor.position
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requires_acceptance_test() {
        let anchors_only = ConstraintSet::new().anchor(Anchor::at("ABCDEF", 0, "XY").unwrap());
        assert!(matches!(
            anchors_only.validate("ABCDEF"),
            Err(SearchError::InvalidConstraints(_))
        ));
        assert!(ConstraintSet::new().phrase("EAST").validate("ABCDEF").is_ok());

        let band = StatisticalBand { max_deviation: Some(2.0), ..Default::default() };
        assert!(ConstraintSet::new().band(band).validate("ABCDEF").is_ok());
        assert!(!ConstraintSet::new().band(StatisticalBand::default()).has_acceptance_test());
    }

    #[test]
    fn test_rejects_bad_settings() {
        let band = StatisticalBand { ic_min: Some(0.07), ic_max: Some(0.06), max_deviation: None };
        assert!(ConstraintSet::new().band(band).validate("ABC").is_err());
        assert!(ConstraintSet::new().phrase("  ").validate("ABC").is_err());

        let far = Anchor::new(4, "AB", "XY").unwrap();
        assert!(ConstraintSet::new().phrase("X").anchor(far).validate("ABCDE").is_err());
    }

    #[test]
    fn test_rejects_anchor_offset_overflow() {
        let overflowing = Anchor::new(usize::MAX, "A", "B").unwrap();
        assert!(matches!(
            ConstraintSet::new().phrase("X").anchor(overflowing).validate("ABC"),
            Err(SearchError::InvalidConstraints(_))
        ));

        let wide = Anchor::new(usize::MAX - 1, "AB", "XY").unwrap();
        assert!(ConstraintSet::new().phrase("X").anchor(wide).validate("ABC").is_err());

        let last = Anchor::new(2, "C", "X").unwrap();
        assert!(ConstraintSet::new().phrase("X").anchor(last).validate("ABC").is_ok());
    }

    #[test]
    fn test_ic_band() {
        let band = StatisticalBand { ic_min: Some(0.06), ic_max: None, max_deviation: None };
        assert!(band.checks_ic());
        assert!(band.ic_in_band(0.07));
        assert!(!band.ic_in_band(0.05));
    }

    #[test]
    fn test_attack_fan_out() {
        assert_eq!(Attack::Vigenere.fan_out(), 1);
        let gromark = Attack::Gromark { primers: PrimerRange::full() };
        assert_eq!(gromark.fan_out(), 90_000);
        assert_eq!(gromark.family(), CipherFamily::Gromark);
    }
}
