pub mod advisory; // LLM client, prompts, consent vetting
pub mod api;
pub mod authorization; // Consent-gated doctor access
pub mod config;
pub mod core_state;
pub mod db;
pub mod insights; // Report text → charts + organ scores
pub mod models;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use crate::core_state::{CoreError, CoreState};

/// Start the service and block until Ctrl-C.
pub fn run() -> Result<(), CoreError> {
    // A missing .env is fine; real environment variables still apply.
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let config = config::ServerConfig::from_env()?;
    // Built before the runtime: the blocking HTTP client cannot be created inside it.
    let core = Arc::new(CoreState::from_config(&config)?);

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async move {
        let mut server = api::start_api_server(core, config.bind_addr).await?;
        tracing::info!(addr = %server.local_addr, "listening");

        tokio::signal::ctrl_c().await?;
        tracing::info!("Ctrl-C received, shutting down");
        server.shutdown();
        server.wait().await?;
        Ok::<(), CoreError>(())
    })
}
