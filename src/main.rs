//! stagehand server binary

use anyhow::Context;
use clap::Parser;
use stagehand::config::Config;
use stagehand::policy::BranchPolicy;
use stagehand::provider::{BitbucketClient, HerokuClient};
use stagehand::reconcile::Reconciler;
use stagehand::server::{AppState, build_router};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Ephemeral staging apps per pull request
#[derive(Debug, Parser)]
#[command(name = "stagehand", version)]
struct Args {
    /// Port to listen on (overrides the PORT environment variable)
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env().context("loading configuration")?;
    let port = args.port.unwrap_or(config.port);

    let policy = BranchPolicy::new(&config.branch_regex).context("compiling BRANCH_REGEX")?;
    let scm = BitbucketClient::new(config.bitbucket.clone())?;
    let hosting = HerokuClient::new(config.heroku.clone())?;
    let reconciler = Reconciler::new(
        Arc::new(scm),
        Arc::new(hosting),
        policy,
        config.domain_prefix.clone(),
        config.env_vars.clone(),
    );

    let state = AppState {
        reconciler: Arc::new(reconciler),
    };
    let router = build_router(&config.webhook_endpoint, state);

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!(%addr, endpoint = %config.webhook_endpoint, "stagehand listening");
    axum::serve(listener, router).await.context("server error")?;

    Ok(())
}
