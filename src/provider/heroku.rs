//! Heroku hosting client

use crate::config::HerokuConfig;
use crate::error::{Error, Result};
use crate::provider::Hosting;
use crate::types::{AppInfo, Credential};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use tracing::debug;

/// Default request timeout in seconds
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Platform API base
const API_BASE: &str = "https://api.heroku.com";

/// Platform API version header, required on every call
const ACCEPT_HEADER: &str = "application/vnd.heroku+json; version=3";

/// Heroku client using reqwest
pub struct HerokuClient {
    client: Client,
    config: HerokuConfig,
    api_base: String,
}

#[derive(Deserialize)]
struct AuthorizationResponse {
    access_token: TokenBlock,
}

#[derive(Deserialize)]
struct TokenBlock {
    token: String,
    expires_in: Option<i64>,
}

#[derive(Deserialize)]
struct HerokuApp {
    name: String,
    web_url: Option<String>,
}

impl From<HerokuApp> for AppInfo {
    fn from(app: HerokuApp) -> Self {
        Self {
            name: app.name,
            web_url: app.web_url.unwrap_or_default(),
        }
    }
}

impl HerokuClient {
    /// Create a new client against the public Platform API
    pub fn new(config: HerokuConfig) -> Result<Self> {
        Self::with_base(config, API_BASE)
    }

    /// Create a client against a custom base URL (used by tests)
    pub fn with_base(config: HerokuConfig, api_base: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .map_err(|e| Error::HerokuApi(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            config,
            api_base: api_base.trim_end_matches('/').to_string(),
        })
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}{path}", self.api_base)
    }
}

#[async_trait]
impl Hosting for HerokuClient {
    async fn authenticate(&self) -> Result<Credential> {
        debug!("exchanging heroku credentials");
        let url = self.api_url("/oauth/authorizations");

        let response = self
            .client
            .post(&url)
            .basic_auth(&self.config.user, Some(&self.config.password))
            .header("Accept", ACCEPT_HEADER)
            .json(&serde_json::json!({ "description": "stagehand" }))
            .send()
            .await?
            .error_for_status()
            .map_err(|e| Error::auth("heroku", e.to_string()))?;

        let authorization: AuthorizationResponse = response.json().await?;
        debug!("heroku credential acquired");
        Ok(Credential::new(
            authorization.access_token.token,
            authorization.access_token.expires_in,
        ))
    }

    async fn list_apps(&self) -> Result<Vec<AppInfo>> {
        debug!("listing apps");
        let credential = self.authenticate().await?;

        let apps: Vec<HerokuApp> = self
            .client
            .get(self.api_url("/apps"))
            .bearer_auth(&credential.token)
            .header("Accept", ACCEPT_HEADER)
            .send()
            .await?
            .error_for_status()
            .map_err(|e| Error::HerokuApi(e.to_string()))?
            .json()
            .await?;

        debug!(count = apps.len(), "listed apps");
        Ok(apps.into_iter().map(Into::into).collect())
    }

    async fn create_app(&self, name: &str) -> Result<AppInfo> {
        debug!(name, "creating app");
        let credential = self.authenticate().await?;

        let app: HerokuApp = self
            .client
            .post(self.api_url("/apps"))
            .bearer_auth(&credential.token)
            .header("Accept", ACCEPT_HEADER)
            .json(&serde_json::json!({ "name": name }))
            .send()
            .await?
            .error_for_status()
            .map_err(|e| Error::HerokuApi(e.to_string()))?
            .json()
            .await?;

        debug!(name, "created app");
        Ok(app.into())
    }

    async fn set_config_vars(&self, name: &str, vars: &HashMap<String, String>) -> Result<()> {
        debug!(name, count = vars.len(), "setting config vars");
        let credential = self.authenticate().await?;

        self.client
            .patch(self.api_url(&format!("/apps/{name}/config-vars")))
            .bearer_auth(&credential.token)
            .header("Accept", ACCEPT_HEADER)
            .json(vars)
            .send()
            .await?
            .error_for_status()
            .map_err(|e| Error::HerokuApi(e.to_string()))?;

        debug!(name, "set config vars");
        Ok(())
    }

    async fn start_build(&self, name: &str, source_url: &str) -> Result<()> {
        debug!(name, "starting build");
        let credential = self.authenticate().await?;

        self.client
            .post(self.api_url(&format!("/apps/{name}/builds")))
            .bearer_auth(&credential.token)
            .header("Accept", ACCEPT_HEADER)
            .json(&serde_json::json!({ "source_blob": { "url": source_url } }))
            .send()
            .await?
            .error_for_status()
            .map_err(|e| Error::HerokuApi(e.to_string()))?;

        debug!(name, "started build");
        Ok(())
    }

    async fn delete_app(&self, name: &str) -> Result<()> {
        debug!(name, "deleting app");
        let credential = self.authenticate().await?;

        self.client
            .delete(self.api_url(&format!("/apps/{name}")))
            .bearer_auth(&credential.token)
            .header("Accept", ACCEPT_HEADER)
            .send()
            .await?
            .error_for_status()
            .map_err(|e| Error::HerokuApi(e.to_string()))?;

        debug!(name, "deleted app");
        Ok(())
    }
}
