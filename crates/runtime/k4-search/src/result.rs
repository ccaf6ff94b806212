//! Match records and run summaries.

use crate::phase::SearchPhase;
use chrono::{DateTime, Utc};
use k4_core::{CipherFamily, Primer, RunningKey};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One point in the key space.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "family", rename_all = "lowercase")]
pub enum Candidate {
    Vigenere { keyword: String },
    Gromark { keyword: String, primer: Primer },
}

impl Candidate {
    pub fn keyword(&self) -> &str {
        match self {
            Candidate::Vigenere { keyword } | Candidate::Gromark { keyword, .. } => keyword,
        }
    }

    pub fn primer(&self) -> Option<Primer> {
        match self {
            Candidate::Vigenere { .. } => None,
            Candidate::Gromark { primer, .. } => Some(*primer),
        }
    }

    pub fn family(&self) -> CipherFamily {
        match self {
            Candidate::Vigenere { .. } => CipherFamily::Vigenere,
            Candidate::Gromark { .. } => CipherFamily::Gromark,
        }
    }

    /// Running key of `len` digits for Gromark candidates.
    pub fn running_key(&self, len: usize) -> Option<RunningKey> {
        self.primer().map(|p| RunningKey::generate(p, len))
    }
}

impl std::fmt::Display for Candidate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Candidate::Vigenere { keyword } => write!(f, "{keyword}"),
            Candidate::Gromark { keyword, primer } => write!(f, "{keyword}/{primer}"),
        }
    }
}

/// Which acceptance test a plaintext passed, with the measured value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum MatchedConstraint {
    Phrase(String),
    Subsequence(String),
    IndexOfCoincidence(f64),
    FrequencyDeviation(f64),
}

impl std::fmt::Display for MatchedConstraint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatchedConstraint::Phrase(p) => write!(f, "phrase '{p}'"),
            MatchedConstraint::Subsequence(w) => write!(f, "subsequence '{w}'"),
            MatchedConstraint::IndexOfCoincidence(ic) => write!(f, "IC {ic:.4}"),
            MatchedConstraint::FrequencyDeviation(d) => write!(f, "deviation {d:.3}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub candidate: Candidate,
    /// Straight alphabet the candidate was evaluated over
    pub alphabet: String,
    pub plaintext: String,
    pub matched: Vec<MatchedConstraint>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrefilterCounts {
    pub before: usize,
    pub after: usize,
}

impl PrefilterCounts {
    pub fn discarded(&self) -> usize {
        self.before - self.after
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchSummary {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub family: CipherFamily,
    pub alphabet: String,
    pub source: String,
    /// Candidates decrypted and scored
    pub attempts: u64,
    /// Candidates dropped on a per-candidate error
    pub skipped: u64,
    pub matches: usize,
    pub elapsed_ms: u64,
    pub prefilter: Option<PrefilterCounts>,
    pub batches_planned: usize,
    pub batches_executed: usize,
    pub cancelled: bool,
    pub phases: Vec<SearchPhase>,
}

impl SearchSummary {
    pub fn attempts_per_sec(&self) -> f64 {
        if self.elapsed_ms == 0 {
            return self.attempts as f64;
        }
        self.attempts as f64 * 1000.0 / self.elapsed_ms as f64
    }
}

/// Everything a finished run hands back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchReport {
    pub summary: SearchSummary,
    pub matches: Vec<MatchResult>,
}

impl SearchReport {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candidate_accessors() {
        let primer: Primer = "32941".parse().unwrap();
        let c = Candidate::Gromark { keyword: "GRONSFELD".into(), primer };
        assert_eq!(c.keyword(), "GRONSFELD");
        assert_eq!(c.primer(), Some(primer));
        assert_eq!(c.to_string(), "GRONSFELD/32941");
        assert_eq!(c.running_key(10).unwrap().to_string(), "3294151356");

        let v = Candidate::Vigenere { keyword: "PALIMPSEST".into() };
        assert_eq!(v.family(), CipherFamily::Vigenere);
        assert!(v.running_key(10).is_none());
    }

    #[test]
    fn test_candidate_serializes_tagged() {
        let primer: Primer = "01234".parse().unwrap();
        let c = Candidate::Gromark { keyword: "KEY".into(), primer };
        let json = serde_json::to_value(&c).unwrap();
        assert_eq!(json["family"], "gromark");
        assert_eq!(json["primer"], "01234");
        let back: Candidate = serde_json::from_value(json).unwrap();
        assert_eq!(back, c);
    }

    #[test]
    fn test_matched_constraint_display() {
        assert_eq!(MatchedConstraint::Phrase("EAST".into()).to_string(), "phrase 'EAST'");
        assert_eq!(MatchedConstraint::IndexOfCoincidence(0.0667).to_string(), "IC 0.0667");
    }
}
