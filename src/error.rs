//! Error types for stagehand

use thiserror::Error;

/// Crate-wide result alias
pub type Result<T> = std::result::Result<T, Error>;

/// All errors that can occur while processing a webhook delivery
#[derive(Debug, Error)]
pub enum Error {
    /// Credential exchange with a provider failed
    #[error("{provider} authentication failed: {reason}")]
    Auth {
        /// Provider name ("bitbucket" or "heroku")
        provider: &'static str,
        /// What went wrong
        reason: String,
    },

    /// Bitbucket API returned an error
    #[error("bitbucket api error: {0}")]
    BitbucketApi(String),

    /// Heroku API returned an error
    #[error("heroku api error: {0}")]
    HerokuApi(String),

    /// Underlying HTTP transport error
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The configured branch pattern is not a valid regex
    #[error("invalid branch pattern: {0}")]
    Pattern(#[from] regex::Error),

    /// Configuration is missing or malformed
    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Construct an auth error for the given provider
    pub fn auth(provider: &'static str, reason: impl Into<String>) -> Self {
        Self::Auth {
            provider,
            reason: reason.into(),
        }
    }
}
