//! Branch policy - pure predicates over branch names
//!
//! No I/O happens here. The policy owns the compiled tracked-branch pattern
//! and answers the questions the reconciler asks about an event's branches.

use crate::error::Result;
use crate::types::PrState;
use regex::Regex;

/// Compiled branch-matching rules
#[derive(Debug, Clone)]
pub struct BranchPolicy {
    pattern: Regex,
}

impl BranchPolicy {
    /// Compile the configured tracked-branch pattern
    pub fn new(pattern: &str) -> Result<Self> {
        Ok(Self {
            pattern: Regex::new(pattern)?,
        })
    }

    /// True iff `branch` matches the tracked (QA/integration) pattern
    #[must_use]
    pub fn matches_tracked_pattern(&self, branch: &str) -> bool {
        self.pattern.is_match(branch)
    }

    /// True iff a non-tracked branch is headed into a tracked branch
    ///
    /// Signals that a feature branch is being merged into an integration
    /// branch, in which case the destination's content is what gets deployed.
    #[must_use]
    pub fn targets_tracked_branch(&self, source: &str, destination: &str) -> bool {
        !self.matches_tracked_pattern(source) && self.matches_tracked_pattern(destination)
    }

    /// The single gate deciding create-or-update versus delete/no-op
    ///
    /// Actionable means: a pull request is present and is either open, or
    /// merged into a tracked branch.
    #[must_use]
    pub fn is_actionable(&self, state: Option<PrState>, source: &str, destination: &str) -> bool {
        match state {
            Some(PrState::Open) => true,
            Some(PrState::Merged) => self.targets_tracked_branch(source, destination),
            _ => false,
        }
    }
}
