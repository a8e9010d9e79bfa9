//! HTTP prediction service over the saved random forest and SVC artifacts.
pub mod api;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod state;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::ArgMatches;

use crate::util::env_non_empty;
use state::AppState;

pub const HOST_ENV: &str = "TITANIC_HOST";
pub const PORT_ENV: &str = "TITANIC_PORT";
pub const MODEL_PREFIX_ENV: &str = "TITANIC_MODEL_PREFIX";
pub const API_KEY_ENV: &str = "TITANIC_API_KEY";

#[derive(Debug, Clone, PartialEq)]
pub struct ServeConfig {
    pub host: String,
    pub port: u16,
    pub model_prefix: PathBuf,
    /// `None` disables the `X-API-Key` check.
    pub api_key: Option<String>,
}

impl Default for ServeConfig {
    fn default() -> Self {
        ServeConfig {
            host: String::from("0.0.0.0"),
            port: 8000,
            model_prefix: PathBuf::from("models/titanic"),
            api_key: None,
        }
    }
}

impl ServeConfig {
    /// Defaults overridden by `TITANIC_*` environment variables.
    pub fn from_env() -> Result<Self> {
        let mut config = ServeConfig::default();
        if let Some(host) = env_non_empty(HOST_ENV) {
            config.host = host;
        }
        if let Some(port) = env_non_empty(PORT_ENV) {
            config.port = port
                .parse()
                .with_context(|| format!("{} is not a valid port: {}", PORT_ENV, port))?;
        }
        if let Some(prefix) = env_non_empty(MODEL_PREFIX_ENV) {
            config.model_prefix = PathBuf::from(prefix);
        }
        config.api_key = env_non_empty(API_KEY_ENV);
        Ok(config)
    }

    /// Environment first, then command-line overrides.
    ///
    /// Fails when authentication is enabled but no key is configured.
    pub fn from_arguments(matches: &ArgMatches) -> Result<Self> {
        let mut config = Self::from_env()?;
        if let Some(host) = matches.get_one::<String>("host") {
            config.host = host.clone();
        }
        if let Some(port) = matches.get_one::<u16>("port") {
            config.port = *port;
        }
        if let Some(prefix) = matches.get_one::<PathBuf>("model_prefix") {
            config.model_prefix = prefix.clone();
        }

        if matches.get_flag("no_auth") {
            log::warn!("API key authentication is disabled");
            config.api_key = None;
        } else if config.api_key.is_none() {
            anyhow::bail!(
                "{} must be set to serve predictions (or pass --no-auth)",
                API_KEY_ENV
            );
        }
        Ok(config)
    }

    pub fn socket_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("Invalid listen address {}:{}", self.host, self.port))
    }
}

/// Load both models, bind and serve until Ctrl-C.
pub async fn run_server(config: ServeConfig) -> Result<()> {
    let addr = config.socket_addr()?;
    let state = Arc::new(AppState::load(&config.model_prefix, config.api_key.clone())?);
    let app = api::create_router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    log::info!("Serving Titanic predictions on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;
    log::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for shutdown signal: {}", e);
    }
    log::info!("Shutdown signal received");
}
