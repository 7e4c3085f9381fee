mod app;
mod auth;
mod config;
mod db;
mod error;
mod extract;
mod habits;
#[cfg(test)]
mod memory;
mod state;

use crate::{config::AppConfig, state::AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "habitoria=debug,axum=info,tower_http=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    let config = match AppConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            tracing::error!(error = %e, "fatal configuration error");
            return Err(e.into());
        }
    };
    tracing::info!(
        issuer = %config.jwt.issuer,
        audience = %config.jwt.audience,
        ttl_minutes = config.jwt.ttl_minutes,
        "configuration loaded"
    );

    let state = AppState::init(&config).await?;
    app::serve(app::build_app(state)).await
}
