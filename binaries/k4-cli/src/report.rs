//! Terminal rendering for search runs and text analysis.

use k4_core::analysis::{DEFAULT_FREQUENCY_THRESHOLD, ENGLISH_IC, RANDOM_IC};
use k4_core::FrequencyAnalysis;
use k4_search::{MatchResult, SearchSummary};
use std::fmt;

/// Run summary banner.
pub struct Summary<'a>(pub &'a SearchSummary);

impl fmt::Display for Summary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let summary = self.0;
        let title = format!("{} SEARCH", summary.family.name().to_uppercase());

        writeln!(f, "\n  {title}")?;
        writeln!(f, "  {}\n", "=".repeat(title.len()))?;
        writeln!(f, "  Run:       {}", summary.run_id)?;
        writeln!(f, "  Alphabet:  {}", summary.alphabet)?;
        writeln!(f, "  Source:    {}", summary.source)?;
        if let Some(prefilter) = &summary.prefilter {
            writeln!(
                f,
                "  Prefilter: {} -> {} keywords ({} discarded)",
                prefilter.before,
                prefilter.after,
                prefilter.discarded()
            )?;
        }
        writeln!(
            f,
            "  Batches:   {}/{}{}",
            summary.batches_executed,
            summary.batches_planned,
            if summary.cancelled { " (cancelled)" } else { "" }
        )?;
        writeln!(f, "  Attempts:  {}", summary.attempts)?;
        if summary.skipped > 0 {
            writeln!(f, "  Skipped:   {}", summary.skipped)?;
        }
        writeln!(
            f,
            "  Elapsed:   {:.2}s ({:.0} candidates/s)",
            summary.elapsed_ms as f64 / 1000.0,
            summary.attempts_per_sec()
        )?;
        writeln!(f, "  Matches:   {}", summary.matches)
    }
}

/// At most `limit` matches, in result order.
pub struct Matches<'a> {
    pub matches: &'a [MatchResult],
    pub limit: usize,
}

impl fmt::Display for Matches<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.matches.is_empty() {
            return writeln!(f, "\n  No matches.");
        }

        writeln!(f, "\n  MATCHES:")?;
        for m in self.matches.iter().take(self.limit) {
            let tests: Vec<String> = m.matched.iter().map(|c| c.to_string()).collect();
            writeln!(f, "  [{}] {}", m.candidate, tests.join(", "))?;
            writeln!(f, "      {}", m.plaintext)?;
        }
        if self.matches.len() > self.limit {
            writeln!(f, "  ... {} more", self.matches.len() - self.limit)?;
        }
        Ok(())
    }
}

/// Frequency report plus IC and deviation verdicts.
pub struct Analysis(pub FrequencyAnalysis);

impl Analysis {
    pub fn of(text: &str) -> Self {
        Self(FrequencyAnalysis::analyze(text))
    }
}

impl fmt::Display for Analysis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "\n  TEXT ANALYSIS")?;
        writeln!(f, "  =============\n")?;
        f.write_str(&self.0.render_ascii())?;

        let ic = self.0.index_of_coincidence();
        let verdict = if (ic - ENGLISH_IC).abs() < (ic - RANDOM_IC).abs() {
            "english-like"
        } else {
            "random-like"
        };
        writeln!(
            f,
            "\n  IC {:.4} is {} (English {:.4}, random {:.4})",
            ic, verdict, ENGLISH_IC, RANDOM_IC
        )?;

        match self.0.english_deviation() {
            Some(d) if d < DEFAULT_FREQUENCY_THRESHOLD => {
                writeln!(f, "  Deviation {:.3} is within the English threshold", d)
            }
            Some(d) => writeln!(f, "  Deviation {:.3} exceeds the English threshold", d),
            None => writeln!(f, "  No A-Z letters to compare against English"),
        }
    }
}
