//! Provider clients for Bitbucket and Heroku
//!
//! Thin, stateless wrappers exposing exactly the operations the reconciler
//! needs. Each call acquires a fresh credential; nothing is cached.

mod bitbucket;
mod heroku;

pub use bitbucket::BitbucketClient;
pub use heroku::HerokuClient;

use crate::error::Result;
use crate::types::{AppInfo, Credential};
use async_trait::async_trait;
use std::collections::HashMap;

/// Source-control provider operations
#[async_trait]
pub trait SourceControl: Send + Sync {
    /// Exchange the configured credentials for a bearer credential
    async fn authenticate(&self) -> Result<Credential>;

    /// Find the currently open pull request whose source branch is `branch`
    ///
    /// Returns the first match's id, or `None` when no open pull request has
    /// that source branch.
    async fn find_open_pull_request(&self, repo: &str, branch: &str) -> Result<Option<u64>>;

    /// Post a comment on a pull request
    async fn post_comment(&self, repo: &str, pull_request_id: u64, body: &str) -> Result<()>;

    /// Build an authenticated source archive URL for a branch
    ///
    /// The credentials stay inside the client; call sites receive an opaque
    /// URL to hand to the hosting build trigger.
    fn source_archive_url(&self, repo: &str, branch: &str) -> String;
}

/// Hosting provider operations
#[async_trait]
pub trait Hosting: Send + Sync {
    /// Exchange the configured credentials for a bearer credential
    async fn authenticate(&self) -> Result<Credential>;

    /// List all apps visible to the account
    async fn list_apps(&self) -> Result<Vec<AppInfo>>;

    /// Find an app by exact name
    ///
    /// Implemented over [`list_apps`]; the provider is the source of truth,
    /// nothing is cached. The check-then-act window between this call and a
    /// subsequent create is the documented concurrency gap; serializing or
    /// idempotent-create would slot in here without touching call sites.
    ///
    /// [`list_apps`]: Self::list_apps
    async fn find_app(&self, name: &str) -> Result<Option<AppInfo>> {
        Ok(self.list_apps().await?.into_iter().find(|a| a.name == name))
    }

    /// Create a new app with the given name
    async fn create_app(&self, name: &str) -> Result<AppInfo>;

    /// Replace or add config vars on an app
    async fn set_config_vars(&self, name: &str, vars: &HashMap<String, String>) -> Result<()>;

    /// Trigger a build of the app from a source archive URL
    async fn start_build(&self, name: &str, source_url: &str) -> Result<()>;

    /// Delete an app
    async fn delete_app(&self, name: &str) -> Result<()>;
}
