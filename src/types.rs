//! Core types for stagehand

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Pull request state as reported by the webhook
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PrState {
    /// Pull request is open
    Open,
    /// Pull request was merged into its destination branch
    Merged,
    /// Pull request was declined without merging
    Declined,
    /// Any other terminal state (e.g. superseded)
    #[serde(other)]
    Unknown,
}

impl std::fmt::Display for PrState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open => write!(f, "OPEN"),
            Self::Merged => write!(f, "MERGED"),
            Self::Declined => write!(f, "DECLINED"),
            Self::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

/// A pull request event, extracted from one webhook delivery
///
/// Constructed from the inbound payload, consumed once by the reconciler,
/// then discarded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequestEvent {
    /// Repository in `workspace/slug` form
    pub repository_full_name: String,
    /// Branch the pull request is coming from
    pub source_branch: String,
    /// Branch the pull request targets
    pub destination_branch: String,
    /// Current pull request state
    pub state: PrState,
    /// Pull request id, used to derive the staging app name
    pub id: u64,
    /// Pull request title
    pub title: String,
}

/// A hosting-provider application
///
/// Existence is derived per invocation by listing all apps and searching by
/// name. The name is the sole key correlating an app back to a pull request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppInfo {
    /// App name (`domain_prefix` + pull request id)
    pub name: String,
    /// Public URL of the running app
    pub web_url: String,
}

/// Deterministic staging app name for a pull request id
#[must_use]
pub fn app_name(domain_prefix: &str, id: u64) -> String {
    format!("{domain_prefix}{id}")
}

/// An opaque bearer credential obtained from a provider
///
/// Acquired fresh per call; the expiry is carried for logging only, nothing
/// in the core reasons about it.
#[derive(Debug, Clone)]
pub struct Credential {
    /// Bearer token value
    pub token: String,
    /// When the token expires, if the provider reported it
    pub expires_at: Option<DateTime<Utc>>,
}

impl Credential {
    /// Build a credential from a token and an optional lifetime in seconds
    #[must_use]
    pub fn new(token: String, expires_in_secs: Option<i64>) -> Self {
        Self {
            token,
            expires_at: expires_in_secs.map(|s| Utc::now() + chrono::Duration::seconds(s)),
        }
    }
}

// =============================================================================
// Inbound webhook payload shapes
// =============================================================================

/// Top-level webhook body
///
/// The pull request block is optional: deliveries without one are rejected
/// by the reconciler rather than failing to parse.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookBody {
    /// The pull request the event concerns, if any
    pub pullrequest: Option<PullRequestPayload>,
}

/// The `pullrequest` block of a webhook delivery
#[derive(Debug, Clone, Deserialize)]
pub struct PullRequestPayload {
    /// Pull request id (arrives as a JSON number or string)
    #[serde(deserialize_with = "id_from_number_or_string")]
    pub id: u64,
    /// Pull request title
    #[serde(default)]
    pub title: String,
    /// Pull request state
    pub state: PrState,
    /// Source side: repository and branch
    pub source: SourcePayload,
    /// Destination side: branch only
    pub destination: DestinationPayload,
}

/// Source half of a pull request payload
#[derive(Debug, Clone, Deserialize)]
pub struct SourcePayload {
    /// Repository the branch lives in
    pub repository: RepositoryPayload,
    /// Source branch
    pub branch: BranchPayload,
}

/// Destination half of a pull request payload
#[derive(Debug, Clone, Deserialize)]
pub struct DestinationPayload {
    /// Destination branch
    pub branch: BranchPayload,
}

/// Repository reference inside a payload
#[derive(Debug, Clone, Deserialize)]
pub struct RepositoryPayload {
    /// Full name in `workspace/slug` form
    pub full_name: String,
}

/// Branch reference inside a payload
#[derive(Debug, Clone, Deserialize)]
pub struct BranchPayload {
    /// Branch name
    pub name: String,
}

impl From<PullRequestPayload> for PullRequestEvent {
    fn from(payload: PullRequestPayload) -> Self {
        Self {
            repository_full_name: payload.source.repository.full_name,
            source_branch: payload.source.branch.name,
            destination_branch: payload.destination.branch.name,
            state: payload.state,
            id: payload.id,
            title: payload.title,
        }
    }
}

/// Accept a pull request id sent either as a JSON number or a string
fn id_from_number_or_string<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(u64),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Number(n) => Ok(n),
        Raw::Text(s) => s.parse().map_err(serde::de::Error::custom),
    }
}
