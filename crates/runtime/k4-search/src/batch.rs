//! Work partitioning and the per-batch loop.

use crate::evaluate::{evaluate_vigenere, GromarkKeyword, SearchContext};
use crate::plan::Attack;
use crate::result::MatchResult;
use k4_core::PrimerRange;
use std::ops::Range;
use tracing::{debug, trace};

/// One schedulable slice of the candidate space.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkUnit {
    /// Indices into the keyword list, one candidate each
    Keywords(Range<usize>),
    /// One keyword against a contiguous primer slice
    Primers { keyword: usize, primers: PrimerRange },
}

impl WorkUnit {
    pub fn candidates(&self) -> u64 {
        match self {
            WorkUnit::Keywords(range) => range.len() as u64,
            WorkUnit::Primers { primers, .. } => primers.len() as u64,
        }
    }
}

/// The sweep's batches, addressed by index so they can be produced on
/// demand instead of materialized up front.
///
/// Units are ordered keyword-major; together they cover the search space
/// exactly once.
#[derive(Debug, Clone)]
pub struct BatchPlan {
    layout: Layout,
}

#[derive(Debug, Clone)]
enum Layout {
    Keywords { count: usize, size: usize },
    Primers { keywords: usize, slices: Vec<PrimerRange> },
}

impl BatchPlan {
    pub fn new(attack: &Attack, keyword_count: usize, keyword_batch: usize, primer_batch: usize) -> Self {
        let layout = match attack {
            Attack::Vigenere => Layout::Keywords {
                count: keyword_count,
                size: keyword_batch.max(1),
            },
            Attack::Gromark { primers } => Layout::Primers {
                keywords: keyword_count,
                slices: primers.chunks(primer_batch),
            },
        };
        Self { layout }
    }

    pub fn len(&self) -> usize {
        match &self.layout {
            Layout::Keywords { count, size } => count.div_ceil(*size),
            Layout::Primers { keywords, slices } => keywords * slices.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Unit `index`; `index` must be below [`len`](Self::len).
    pub fn unit(&self, index: usize) -> WorkUnit {
        match &self.layout {
            Layout::Keywords { count, size } => {
                let start = index * size;
                WorkUnit::Keywords(start..(start + size).min(*count))
            }
            Layout::Primers { slices, .. } => WorkUnit::Primers {
                keyword: index / slices.len(),
                primers: slices[index % slices.len()],
            },
        }
    }

    pub fn units(&self) -> impl Iterator<Item = WorkUnit> + '_ {
        (0..self.len()).map(move |i| self.unit(i))
    }

    /// Total candidates across all units.
    pub fn candidates(&self) -> u64 {
        match &self.layout {
            Layout::Keywords { count, .. } => *count as u64,
            Layout::Primers { keywords, slices } => {
                *keywords as u64 * slices.iter().map(|s| s.len() as u64).sum::<u64>()
            }
        }
    }
}

#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub matches: Vec<MatchResult>,
    pub attempts: u64,
    pub skipped: u64,
}

/// Evaluate every candidate in `unit`. Matches keep candidate order;
/// per-candidate errors are counted as skipped.
pub fn run_batch(unit: &WorkUnit, ctx: &SearchContext) -> BatchOutcome {
    let mut outcome = BatchOutcome::default();

    match unit {
        WorkUnit::Keywords(range) => {
            for keyword in &ctx.keywords[range.clone()] {
                match evaluate_vigenere(keyword, ctx) {
                    Ok(Some(hit)) => {
                        outcome.attempts += 1;
                        outcome.matches.push(hit);
                    }
                    Ok(None) => outcome.attempts += 1,
                    Err(e) => {
                        outcome.skipped += 1;
                        debug!(keyword = %keyword, error = %e, "Skipped candidate");
                    }
                }
            }
        }
        WorkUnit::Primers { keyword, primers } => {
            let keyword = ctx.keywords[*keyword].as_str();
            let mut state = match GromarkKeyword::prepare(keyword, ctx) {
                Ok(state) => state,
                Err(e) => {
                    outcome.skipped += primers.len() as u64;
                    debug!(keyword, error = %e, "Skipped keyword");
                    return outcome;
                }
            };
            for primer in primers.iter() {
                match state.evaluate(primer, ctx) {
                    Ok(Some(hit)) => {
                        outcome.attempts += 1;
                        outcome.matches.push(hit);
                    }
                    Ok(None) => outcome.attempts += 1,
                    Err(e) => {
                        outcome.skipped += 1;
                        debug!(keyword, %primer, error = %e, "Skipped candidate");
                    }
                }
            }
        }
    }

    trace!(
        ?unit,
        attempts = outcome.attempts,
        skipped = outcome.skipped,
        matches = outcome.matches.len(),
        "Batch done"
    );
    outcome
}
