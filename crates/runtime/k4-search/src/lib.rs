//! K4 Search: parallel keyword/primer sweep
//!
//! A run loads candidate keywords, optionally discards those that contradict
//! known-plaintext anchors, splits what is left into batches, and sweeps the
//! batches on a rayon pool. Matches come back as [`MatchResult`]s with a
//! [`SearchSummary`] describing the run.

pub mod phase;
pub mod plan;
pub mod evaluate;
pub mod batch;
pub mod result;
pub mod progress;

pub use phase::{PhaseTracker, SearchPhase};
pub use plan::{Attack, ConstraintSet, PhraseMatch, StatisticalBand};
pub use evaluate::{accept, SearchContext};
pub use batch::{run_batch, BatchOutcome, BatchPlan, WorkUnit};
pub use result::{Candidate, MatchResult, MatchedConstraint, PrefilterCounts, SearchReport, SearchSummary};
pub use progress::{CancelToken, NullProgress, ProgressSink};

use k4_core::anchor::{anchor_consistent, vigenere_anchor_consistent};
use k4_core::{Alphabet, KeywordSource, OutputCase};
use rayon::prelude::*;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, error, info};
use uuid::Uuid;

/// Fatal setup errors. A run that returns one of these never started
/// sweeping.
#[derive(Error, Debug)]
pub enum SearchError {
    #[error("Candidate source failed: {0}")]
    CandidateSource(#[source] k4_core::Error),

    #[error("Invalid constraints: {0}")]
    InvalidConstraints(String),

    #[error("Invalid alphabet: {0}")]
    InvalidAlphabet(String),

    #[error("Worker pool: {0}")]
    WorkerPool(String),
}

pub type Result<T> = std::result::Result<T, SearchError>;

/// A single candidate that could not be evaluated. Counted as skipped.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CandidateError {
    #[error("Invalid keyword: {0}")]
    InvalidKeyword(String),

    #[error("Invalid primer: {0}")]
    InvalidPrimer(String),

    #[error("Computation failed: {0}")]
    Computation(String),
}

impl From<k4_core::Error> for CandidateError {
    fn from(err: k4_core::Error) -> Self {
        match err {
            k4_core::Error::InvalidKeyword(msg) => CandidateError::InvalidKeyword(msg),
            k4_core::Error::InvalidPrimer(msg) => CandidateError::InvalidPrimer(msg),
            other => CandidateError::Computation(other.to_string()),
        }
    }
}

/// Tuning for one engine.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchConfig {
    pub keyword_batch_size: usize,
    pub primer_batch_size: usize,
    /// Fixed pool size; `None` uses the CPU count minus `reserved_cores`
    pub workers: Option<usize>,
    pub reserved_cores: usize,
    pub output_case: OutputCase,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            keyword_batch_size: 500,
            primer_batch_size: 1000,
            workers: None,
            reserved_cores: 1,
            output_case: OutputCase::default(),
        }
    }
}

impl SearchConfig {
    pub fn worker_count(&self) -> usize {
        self.workers
            .unwrap_or_else(|| num_cpus::get().saturating_sub(self.reserved_cores))
            .max(1)
    }
}

/// One search: attack, ciphertext, alphabet and constraints.
#[derive(Debug, Clone)]
pub struct SearchRequest {
    pub attack: Attack,
    pub ciphertext: String,
    pub alphabet: Alphabet,
    pub constraints: ConstraintSet,
}

pub struct SearchEngine {
    config: SearchConfig,
    progress: Arc<dyn ProgressSink>,
    cancel: CancelToken,
}

impl SearchEngine {
    pub fn new(config: SearchConfig) -> Self {
        Self {
            config,
            progress: Arc::new(NullProgress),
            cancel: CancelToken::new(),
        }
    }

    pub fn with_progress(mut self, progress: Arc<dyn ProgressSink>) -> Self {
        self.progress = progress;
        self
    }

    pub fn with_cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Run the search to completion or cancellation.
    ///
    /// Pipeline: load + validate -> prefilter (anchors only) -> sweep ->
    /// aggregate.
    pub fn run(&self, request: SearchRequest, source: &dyn KeywordSource) -> Result<SearchReport> {
        let mut phases = PhaseTracker::new();
        let started_at = chrono::Utc::now();
        let clock = Instant::now();
        let run_id = Uuid::new_v4();
        let family = request.attack.family();

        info!(
            %run_id,
            %family,
            alphabet = %request.alphabet,
            source = %source.label(),
            workers = self.config.worker_count(),
            "Starting search"
        );

        // Idle: everything that can fail fatally happens here
        let setup = self.setup(&request, source).and_then(|keywords| {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(self.config.worker_count())
                .thread_name(|i| format!("k4-worker-{i}"))
                .build()
                .map_err(|e| SearchError::WorkerPool(e.to_string()))?;
            Ok((keywords, pool))
        });
        let (keywords, pool) = match setup {
            Ok(ok) => ok,
            Err(e) => {
                phases.enter(SearchPhase::Failed);
                error!(%run_id, error = %e, "Search setup failed");
                return Err(e);
            }
        };

        let SearchRequest { attack, ciphertext, alphabet, constraints } = request;
        let alphabet = Arc::new(alphabet);
        let constraints = Arc::new(constraints);
        let skipped = AtomicU64::new(0);

        // Prefiltering
        let mut prefilter = None;
        let keywords: Vec<String> = if constraints.anchors.is_empty() {
            keywords
        } else {
            phases.enter(SearchPhase::Prefiltering);
            self.progress.phase_started(SearchPhase::Prefiltering, keywords.len() as u64);
            let before = keywords.len();
            let kept = pool.install(|| {
                prefilter_keywords(keywords, &attack, &constraints, &alphabet, &skipped, &*self.progress)
            });
            let counts = PrefilterCounts { before, after: kept.len() };
            debug!(
                before = counts.before,
                after = counts.after,
                discarded = counts.discarded(),
                "Anchor prefilter"
            );
            prefilter = Some(counts);
            kept
        };

        // Sweeping
        phases.enter(SearchPhase::Sweeping);
        let ctx = SearchContext {
            ciphertext: Arc::from(ciphertext),
            alphabet: Arc::clone(&alphabet),
            constraints: Arc::clone(&constraints),
            keywords: Arc::from(keywords),
            case: self.config.output_case,
        };
        let plan = BatchPlan::new(
            &attack,
            ctx.keywords.len(),
            self.config.keyword_batch_size,
            self.config.primer_batch_size,
        );
        let batches_planned = plan.len();
        debug!(batches = batches_planned, candidates = plan.candidates(), "Planned sweep");
        self.progress.phase_started(SearchPhase::Sweeping, batches_planned as u64);

        // Units are built per index and only batches with matches are kept
        let attempts = AtomicU64::new(0);
        let executed = AtomicUsize::new(0);
        let hits: Vec<Vec<MatchResult>> = pool.install(|| {
            (0..batches_planned)
                .into_par_iter()
                .filter_map(|index| {
                    if self.cancel.is_cancelled() {
                        return None;
                    }
                    let outcome = run_batch(&plan.unit(index), &ctx);
                    attempts.fetch_add(outcome.attempts, Ordering::Relaxed);
                    skipped.fetch_add(outcome.skipped, Ordering::Relaxed);
                    executed.fetch_add(1, Ordering::Relaxed);
                    self.progress.advanced(outcome.attempts, outcome.matches.len());
                    (!outcome.matches.is_empty()).then_some(outcome.matches)
                })
                .collect()
        });

        // Aggregating
        phases.enter(SearchPhase::Aggregating);
        let matches: Vec<MatchResult> = hits.into_iter().flatten().collect();

        // A cancel that lands after the last batch leaves nothing unswept
        let batches_executed = executed.into_inner();
        let cancelled = self.cancel.is_cancelled() && batches_executed < batches_planned;
        phases.enter(SearchPhase::Done);
        self.progress.finished();

        let summary = SearchSummary {
            run_id,
            started_at,
            family,
            alphabet: alphabet.to_string(),
            source: source.label(),
            attempts: attempts.into_inner(),
            skipped: skipped.into_inner(),
            matches: matches.len(),
            elapsed_ms: clock.elapsed().as_millis() as u64,
            prefilter,
            batches_planned,
            batches_executed,
            cancelled,
            phases: phases.into_history(),
        };

        info!(
            %run_id,
            attempts = summary.attempts,
            skipped = summary.skipped,
            matches = summary.matches,
            elapsed_ms = summary.elapsed_ms,
            cancelled,
            "Search finished"
        );

        Ok(SearchReport { summary, matches })
    }

    fn setup(&self, request: &SearchRequest, source: &dyn KeywordSource) -> Result<Vec<String>> {
        if !request.ciphertext.chars().any(|c| request.alphabet.contains(c)) {
            return Err(SearchError::InvalidAlphabet(format!(
                "ciphertext has no symbols from alphabet {}",
                request.alphabet
            )));
        }
        request.constraints.validate(&request.ciphertext)?;

        let keywords = source.keywords().map_err(SearchError::CandidateSource)?;
        debug!(count = keywords.len(), source = %source.label(), "Loaded candidates");
        Ok(keywords)
    }
}

/// Keep keywords consistent with every anchor. Keywords the check cannot
/// evaluate are dropped and counted as skipped.
fn prefilter_keywords(
    keywords: Vec<String>,
    attack: &Attack,
    constraints: &ConstraintSet,
    alphabet: &Alphabet,
    skipped: &AtomicU64,
    progress: &dyn ProgressSink,
) -> Vec<String> {
    keywords
        .into_par_iter()
        .filter(|keyword| {
            let verdict = match attack {
                Attack::Vigenere => vigenere_anchor_consistent(keyword, &constraints.anchors, alphabet),
                Attack::Gromark { .. } => anchor_consistent(keyword, &constraints.anchors, alphabet),
            };
            progress.advanced(0, 0);
            match verdict {
                Ok(keep) => keep,
                Err(e) => {
                    skipped.fetch_add(attack.fan_out(), Ordering::Relaxed);
                    debug!(keyword = %keyword, error = %e, "Skipped keyword in prefilter");
                    false
                }
            }
        })
        .collect()
}
