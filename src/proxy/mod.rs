//! HTTP front end: go-import pages plus a git smart-HTTP proxy that pins
//! `refs/heads/master` to the commit-ish named in the request path.

mod error;
mod forward;
mod path;
mod vanity;

use super::{Config, Result};
use axum::{routing::any, Router};
use std::sync::Arc;

pub use path::split_path_and_commitish;

/// Per-process state shared by every request handler. Holds no per-request data.
#[derive(Debug, Clone)]
pub struct ProxyState {
    config: Arc<Config>,
    client: reqwest::Client,
}

impl ProxyState {
    pub fn new(config: Config) -> Self {
        Self {
            config: Arc::new(config),
            client: reqwest::Client::new(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}

pub fn router(state: ProxyState) -> Router {
    Router::new()
        .route("/_git/{*path}", any(forward::git))
        .fallback(vanity::page)
        .with_state(state)
}

pub async fn serve(config: Config) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(config.listen).await?;
    tracing::info!(
        addr = %config.listen,
        public_host = %config.public_host,
        allowed_hosts = ?config.allowed_hosts,
        "gitpin proxy listening"
    );
    axum::serve(listener, router(ProxyState::new(config))).await?;
    Ok(())
}
