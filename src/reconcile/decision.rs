//! Event classification - pure functions deciding what an event means
//!
//! No I/O happens here - all data is passed in, making the decision
//! procedure easy to unit test.

use crate::policy::BranchPolicy;
use crate::types::{PrState, PullRequestEvent};

/// What a single webhook event asks the reconciler to do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Disposition {
    /// Create or refresh the staging app for the event's own pull request
    ///
    /// The event's source branch is deployed and the event's own id names
    /// the app.
    DeploySource {
        /// Branch whose content gets deployed
        branch: String,
    },
    /// A feature branch is headed into a tracked branch: deploy the tracked
    /// branch instead
    ///
    /// The effective pull request id must be re-resolved by looking up the
    /// open pull request that carries the tracked branch forward.
    DeployMergeForward {
        /// Tracked branch whose content gets deployed (the event's destination)
        branch: String,
    },
    /// Deliberate no-op: an ordinary open pull request outside the tracked
    /// pattern
    Ignore,
    /// Terminal state: remove the staging app named after the event's own id,
    /// if one exists
    Teardown,
    /// The event matches neither the actionable nor the terminal shape
    Reject,
}

/// Classify an event (PURE - no I/O)
///
/// Encodes the decision procedure: actionable events deploy (picking the
/// deployable branch per the merge-target rule), terminal non-open events
/// tear down, and anything left over is rejected.
#[must_use]
pub fn classify(policy: &BranchPolicy, event: &PullRequestEvent) -> Disposition {
    let source = event.source_branch.as_str();
    let destination = event.destination_branch.as_str();

    if policy.is_actionable(Some(event.state), source, destination) {
        if policy.targets_tracked_branch(source, destination) {
            Disposition::DeployMergeForward {
                branch: event.destination_branch.clone(),
            }
        } else if policy.matches_tracked_pattern(source) {
            Disposition::DeploySource {
                branch: event.source_branch.clone(),
            }
        } else {
            Disposition::Ignore
        }
    } else if event.state == PrState::Open {
        Disposition::Reject
    } else {
        Disposition::Teardown
    }
}
