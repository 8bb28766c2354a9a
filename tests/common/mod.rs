//! Shared fixtures for stagehand tests

#![allow(dead_code)]

mod mock_providers;

pub use mock_providers::{
    BuildCall, CommentCall, ConfigVarsCall, MockHosting, MockSourceControl,
};

use stagehand::policy::BranchPolicy;
use stagehand::reconcile::Reconciler;
use stagehand::types::{PrState, PullRequestEvent};
use std::collections::HashMap;
use std::sync::Arc;

/// App name prefix used across tests
pub const PREFIX: &str = "staging-pr-";

/// Tracked-branch pattern used across tests: anything starting with "qa"
pub const PATTERN: &str = "^qa";

/// Repository used across tests
pub const REPO: &str = "acme/website";

/// Policy compiled from [`PATTERN`]
pub fn qa_policy() -> BranchPolicy {
    BranchPolicy::new(PATTERN).expect("test pattern compiles")
}

/// Config vars applied to new apps in tests
pub fn test_env_vars() -> HashMap<String, String> {
    HashMap::from([("RAILS_ENV".to_string(), "staging".to_string())])
}

/// Build an event for [`REPO`] with the given shape
pub fn make_event(state: PrState, source: &str, destination: &str, id: u64) -> PullRequestEvent {
    PullRequestEvent {
        repository_full_name: REPO.to_string(),
        source_branch: source.to_string(),
        destination_branch: destination.to_string(),
        state,
        id,
        title: format!("PR #{id}"),
    }
}

/// Wire a reconciler over the given mocks with the standard test config
pub fn make_reconciler(scm: &Arc<MockSourceControl>, hosting: &Arc<MockHosting>) -> Reconciler {
    Reconciler::new(
        scm.clone(),
        hosting.clone(),
        qa_policy(),
        PREFIX.to_string(),
        test_env_vars(),
    )
}
