//! Bitbucket source-control client

use crate::config::BitbucketConfig;
use crate::error::{Error, Result};
use crate::provider::SourceControl;
use crate::types::Credential;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

/// Default request timeout in seconds
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// REST API base for pull request lookup and comments
const API_BASE: &str = "https://api.bitbucket.org/2.0";

/// Site base for OAuth token exchange and source archives
const SITE_BASE: &str = "https://bitbucket.org";

/// Bitbucket client using reqwest
pub struct BitbucketClient {
    client: Client,
    config: BitbucketConfig,
    api_base: String,
    site_base: String,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: Option<i64>,
}

#[derive(Deserialize)]
struct PullRequestPage {
    values: Vec<PullRequestSummary>,
}

#[derive(Deserialize)]
struct PullRequestSummary {
    id: u64,
}

impl BitbucketClient {
    /// Create a new client against the public Bitbucket endpoints
    pub fn new(config: BitbucketConfig) -> Result<Self> {
        Self::with_bases(config, API_BASE, SITE_BASE)
    }

    /// Create a client against custom base URLs (used by tests)
    pub fn with_bases(config: BitbucketConfig, api_base: &str, site_base: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .map_err(|e| Error::BitbucketApi(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            config,
            api_base: api_base.trim_end_matches('/').to_string(),
            site_base: site_base.trim_end_matches('/').to_string(),
        })
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}{path}", self.api_base)
    }
}

#[async_trait]
impl SourceControl for BitbucketClient {
    async fn authenticate(&self) -> Result<Credential> {
        debug!("exchanging bitbucket credentials");
        let url = format!("{}/site/oauth2/access_token", self.site_base);

        let response = self
            .client
            .post(&url)
            .basic_auth(&self.config.key, Some(&self.config.secret))
            .form(&[
                ("grant_type", "password"),
                ("username", self.config.email.as_str()),
                ("password", self.config.password.as_str()),
            ])
            .send()
            .await?
            .error_for_status()
            .map_err(|e| Error::auth("bitbucket", e.to_string()))?;

        let token: TokenResponse = response.json().await?;
        debug!("bitbucket credential acquired");
        Ok(Credential::new(token.access_token, token.expires_in))
    }

    async fn find_open_pull_request(&self, repo: &str, branch: &str) -> Result<Option<u64>> {
        debug!(repo, branch, "finding open pull request");
        let credential = self.authenticate().await?;
        let url = self.api_url(&format!("/repositories/{repo}/pullrequests"));
        let filter = format!(r#"source.branch.name = "{branch}" AND state = "OPEN""#);

        let page: PullRequestPage = self
            .client
            .get(&url)
            .bearer_auth(&credential.token)
            .query(&[("q", filter.as_str())])
            .send()
            .await?
            .error_for_status()
            .map_err(|e| Error::BitbucketApi(e.to_string()))?
            .json()
            .await?;

        let result = page.values.first().map(|pr| pr.id);
        if let Some(id) = result {
            debug!(pull_request_id = id, "found open pull request");
        } else {
            debug!("no open pull request found");
        }
        Ok(result)
    }

    async fn post_comment(&self, repo: &str, pull_request_id: u64, body: &str) -> Result<()> {
        debug!(repo, pull_request_id, "posting comment");
        let credential = self.authenticate().await?;
        let url = self.api_url(&format!(
            "/repositories/{repo}/pullrequests/{pull_request_id}/comments"
        ));

        self.client
            .post(&url)
            .bearer_auth(&credential.token)
            .json(&serde_json::json!({ "content": { "raw": body } }))
            .send()
            .await?
            .error_for_status()
            .map_err(|e| Error::BitbucketApi(e.to_string()))?;

        debug!(repo, pull_request_id, "posted comment");
        Ok(())
    }

    fn source_archive_url(&self, repo: &str, branch: &str) -> String {
        let user = urlencoding::encode(&self.config.user);
        let password = urlencoding::encode(&self.config.password);
        let (scheme, host) = self
            .site_base
            .split_once("://")
            .unwrap_or(("https", "bitbucket.org"));
        format!("{scheme}://{user}:{password}@{host}/{repo}/get/{branch}.tar.gz")
    }
}
