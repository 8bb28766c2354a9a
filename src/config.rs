//! Process configuration, loaded once at startup
//!
//! Everything is read from the environment in one pass and kept immutable
//! afterwards. The resulting value is injected into the provider clients and
//! the reconciler; nothing reads ambient state after startup.

use crate::error::{Error, Result};
use std::collections::HashMap;
use std::env;

/// Bitbucket credentials and identity
#[derive(Debug, Clone)]
pub struct BitbucketConfig {
    /// Account username, embedded in source archive URLs
    pub user: String,
    /// Account email, used as the resource-owner grant username
    pub email: String,
    /// Account password
    pub password: String,
    /// OAuth consumer key
    pub key: String,
    /// OAuth consumer secret
    pub secret: String,
}

/// Heroku credentials
#[derive(Debug, Clone)]
pub struct HerokuConfig {
    /// Account email
    pub user: String,
    /// Account password or API key
    pub password: String,
}

/// Immutable service configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub port: u16,
    /// Path the webhook is registered on (GET and POST)
    pub webhook_endpoint: String,
    /// Bitbucket credentials
    pub bitbucket: BitbucketConfig,
    /// Heroku credentials
    pub heroku: HerokuConfig,
    /// Prefix for generated staging app names
    pub domain_prefix: String,
    /// Pattern identifying tracked (QA/integration) branches
    pub branch_regex: String,
    /// Config vars applied to every newly created app
    pub env_vars: HashMap<String, String>,
}

impl Config {
    /// Load configuration from the environment
    ///
    /// Credentials, the domain prefix, and the branch pattern are required;
    /// the port, endpoint path, and extra config vars have defaults.
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            port: env::var("PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(3000),
            webhook_endpoint: env::var("WEBHOOK_ENDPOINT")
                .unwrap_or_else(|_| "/webhook".to_string()),
            bitbucket: BitbucketConfig {
                user: required("BITBUCKET_USER")?,
                email: required("BITBUCKET_EMAIL")?,
                password: required("BITBUCKET_PASSWORD")?,
                key: required("BITBUCKET_KEY")?,
                secret: required("BITBUCKET_SECRET")?,
            },
            heroku: HerokuConfig {
                user: required("HEROKU_USER")?,
                password: required("HEROKU_PASSWORD")?,
            },
            domain_prefix: required("DOMAIN_PREFIX")?,
            branch_regex: required("BRANCH_REGEX")?,
            env_vars: parse_env_vars(env::var("ENV_VARS").ok().as_deref())?,
        })
    }
}

/// Read a required environment variable, naming it in the error
fn required(name: &'static str) -> Result<String> {
    env::var(name)
        .ok()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| Error::Config(format!("missing required environment variable {name}")))
}

/// Parse the `ENV_VARS` JSON object, defaulting to empty when unset
fn parse_env_vars(raw: Option<&str>) -> Result<HashMap<String, String>> {
    match raw {
        None | Some("") => Ok(HashMap::new()),
        Some(json) => serde_json::from_str(json)
            .map_err(|e| Error::Config(format!("ENV_VARS is not a JSON object of strings: {e}"))),
    }
}
