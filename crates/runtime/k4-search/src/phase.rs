//! Search run phases.
//!
//! Every run progresses through:
//! Idle -> Prefiltering -> Sweeping -> Aggregating -> Done
//!
//! Prefiltering is skipped when there are no anchors. Failed can be entered
//! from any phase that is not already terminal.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SearchPhase {
    /// Load candidates, validate constraints
    Idle,
    /// Discard keywords that contradict the anchors
    Prefiltering,
    /// Decrypt and score every surviving candidate
    Sweeping,
    /// Concatenate batch results
    Aggregating,
    /// Results available
    Done,
    /// Setup failed
    Failed,
}

impl SearchPhase {
    /// Advance to the next phase on the happy path.
    pub fn next(&self) -> Option<SearchPhase> {
        match self {
            SearchPhase::Idle => Some(SearchPhase::Prefiltering),
            SearchPhase::Prefiltering => Some(SearchPhase::Sweeping),
            SearchPhase::Sweeping => Some(SearchPhase::Aggregating),
            SearchPhase::Aggregating => Some(SearchPhase::Done),
            SearchPhase::Done | SearchPhase::Failed => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, SearchPhase::Done | SearchPhase::Failed)
    }

    /// Return the phase index (0-5).
    pub fn index(&self) -> usize {
        match self {
            SearchPhase::Idle => 0,
            SearchPhase::Prefiltering => 1,
            SearchPhase::Sweeping => 2,
            SearchPhase::Aggregating => 3,
            SearchPhase::Done => 4,
            SearchPhase::Failed => 5,
        }
    }

    /// Whether moving from `self` to `to` is allowed.
    pub fn can_enter(&self, to: SearchPhase) -> bool {
        if self.is_terminal() {
            return false;
        }
        to == SearchPhase::Failed || to.index() > self.index()
    }
}

impl std::fmt::Display for SearchPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SearchPhase::Idle => write!(f, "Idle"),
            SearchPhase::Prefiltering => write!(f, "Prefiltering"),
            SearchPhase::Sweeping => write!(f, "Sweeping"),
            SearchPhase::Aggregating => write!(f, "Aggregating"),
            SearchPhase::Done => write!(f, "Done"),
            SearchPhase::Failed => write!(f, "Failed"),
        }
    }
}

/// Current phase plus every phase entered so far.
#[derive(Debug, Clone)]
pub struct PhaseTracker {
    history: Vec<SearchPhase>,
}

impl Default for PhaseTracker {
    fn default() -> Self {
        Self {
            history: vec![SearchPhase::Idle],
        }
    }
}

impl PhaseTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> SearchPhase {
        self.history.last().copied().unwrap_or(SearchPhase::Idle)
    }

    pub fn history(&self) -> &[SearchPhase] {
        &self.history
    }

    /// Move to `to`. Backward moves and moves out of a terminal phase are
    /// refused and leave the tracker unchanged.
    pub fn enter(&mut self, to: SearchPhase) -> bool {
        let from = self.current();
        if !from.can_enter(to) {
            warn!(%from, %to, "Refused phase transition");
            return false;
        }
        info!(%from, %to, "Search phase");
        self.history.push(to);
        true
    }

    pub fn into_history(self) -> Vec<SearchPhase> {
        self.history
    }
}
