//! Main entry point for the helpdesk backend.
//!
//! This file loads configuration, initializes logging, connects the store and
//! search index, and serves the Axum router until Ctrl-C.

use anyhow::Context;
use backend::app::{build_router, build_state};
use backend::config::AppConfig;
use backend::utils;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    utils::init_tracing();

    let config = AppConfig::from_env()?;
    let state = build_state(&config).await?;
    let app = build_router(state);

    let addr = config.bind_addr;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("bind {addr}"))?;
    tracing::info!(%addr, "helpdesk listening");

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("shutdown requested");
        })
        .await?;
    Ok(())
}
