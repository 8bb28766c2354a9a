//! Reconciliation execution - effectful operations
//!
//! Takes the pure classification of an event and performs the provider calls
//! it implies. Every failure is caught here, logged, and folded into a
//! terminal [`Outcome`]; no error propagates past this boundary and no
//! partial state is rolled back.

use crate::error::Result;
use crate::policy::BranchPolicy;
use crate::provider::{Hosting, SourceControl};
use crate::reconcile::decision::{Disposition, classify};
use crate::types::{PullRequestEvent, app_name};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Terminal result of processing one webhook delivery
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// A build was triggered (creating the app first when absent)
    Deployed {
        /// Name of the staging app
        app_name: String,
        /// Whether the app was created by this event
        created: bool,
    },
    /// Nothing to do; deliberate no-op
    Ignored {
        /// Why the event was ignored
        reason: &'static str,
    },
    /// The delete path ran (deleting is a no-op when the app is absent)
    Deleted {
        /// Name of the staging app looked up
        app_name: String,
        /// Whether an app existed and was deleted
        found: bool,
    },
    /// The payload didn't describe an actionable or terminal pull request
    Rejected,
    /// A provider call failed; remaining steps were abandoned
    Failed {
        /// Rendered error
        message: String,
    },
}

/// Drives provider calls for one event at a time
///
/// Holds its collaborators behind trait objects so tests can substitute
/// mocks; configuration is injected at construction, never read ambiently.
pub struct Reconciler {
    scm: Arc<dyn SourceControl>,
    hosting: Arc<dyn Hosting>,
    policy: BranchPolicy,
    domain_prefix: String,
    env_vars: HashMap<String, String>,
}

impl Reconciler {
    /// Create a reconciler over the given provider clients
    pub fn new(
        scm: Arc<dyn SourceControl>,
        hosting: Arc<dyn Hosting>,
        policy: BranchPolicy,
        domain_prefix: String,
        env_vars: HashMap<String, String>,
    ) -> Self {
        Self {
            scm,
            hosting,
            policy,
            domain_prefix,
            env_vars,
        }
    }

    /// Process one delivery end to end
    ///
    /// Never returns an error: provider failures become
    /// [`Outcome::Failed`] after being logged.
    pub async fn process(&self, event: Option<&PullRequestEvent>) -> Outcome {
        let Some(event) = event else {
            warn!("delivery without a pull request block");
            return Outcome::Rejected;
        };

        info!(
            repository = %event.repository_full_name,
            pull_request_id = event.id,
            state = %event.state,
            source = %event.source_branch,
            destination = %event.destination_branch,
            "processing pull request event"
        );

        let result = match classify(&self.policy, event) {
            Disposition::DeploySource { branch } => self.deploy(event, &branch, false).await,
            Disposition::DeployMergeForward { branch } => self.deploy(event, &branch, true).await,
            Disposition::Ignore => {
                info!(
                    source = %event.source_branch,
                    "open pull request outside the tracked pattern; nothing to stage"
                );
                return Outcome::Ignored {
                    reason: "untracked open pull request",
                };
            }
            Disposition::Teardown => self.teardown(event).await,
            Disposition::Reject => return Outcome::Rejected,
        };

        result.unwrap_or_else(|e| {
            error!(
                pull_request_id = event.id,
                error = %e,
                "reconciliation aborted"
            );
            Outcome::Failed {
                message: e.to_string(),
            }
        })
    }

    /// Create-or-update path: ensure the app exists, trigger a build, and
    /// comment once on first creation
    async fn deploy(
        &self,
        event: &PullRequestEvent,
        branch: &str,
        merge_forward: bool,
    ) -> Result<Outcome> {
        let repo = event.repository_full_name.as_str();

        // A merge into a tracked branch deploys under the id of the open
        // pull request that carries that branch forward.
        let effective_id = if merge_forward {
            match self.scm.find_open_pull_request(repo, branch).await? {
                Some(id) => id,
                None => {
                    warn!(
                        branch,
                        "no open pull request carries the tracked branch forward; abandoning"
                    );
                    return Ok(Outcome::Ignored {
                        reason: "tracked branch has no open pull request",
                    });
                }
            }
        } else {
            event.id
        };

        let name = app_name(&self.domain_prefix, effective_id);

        let (app, created) = match self.hosting.find_app(&name).await? {
            Some(app) => (app, false),
            None => {
                let app = self.hosting.create_app(&name).await?;
                self.hosting.set_config_vars(&name, &self.env_vars).await?;
                (app, true)
            }
        };

        let archive_url = self.scm.source_archive_url(repo, branch);
        self.hosting.start_build(&name, &archive_url).await?;

        // Only a freshly created app owes the reviewers a comment.
        if created {
            let message = format!(
                "Staging app for this pull request: {}\n\nDeployment of `{branch}` is in progress.",
                app.web_url
            );
            self.scm.post_comment(repo, effective_id, &message).await?;
        }

        info!(app = %name, created, branch, "deploy reconciled");
        Ok(Outcome::Deployed { app_name: name, created })
    }

    /// Delete path: remove the app named after the event's own id, if any
    async fn teardown(&self, event: &PullRequestEvent) -> Result<Outcome> {
        let name = app_name(&self.domain_prefix, event.id);

        let found = self.hosting.find_app(&name).await?.is_some();
        if found {
            self.hosting.delete_app(&name).await?;
            info!(app = %name, state = %event.state, "staging app deleted");
        } else {
            info!(app = %name, state = %event.state, "no staging app to delete");
        }

        Ok(Outcome::Deleted { app_name: name, found })
    }
}
