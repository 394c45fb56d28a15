//! Duel Arena: a runnable Riposte server.
//!
//! Players connect over WebSocket, join the matchmaking queue, and play
//! either rock-paper-scissors (`elimination`, the default) or the
//! attack/mana variant (`resource-duel`). One process runs one variant;
//! run two processes on different ports to offer both.
//!
//! Environment:
//! - `PORT` — listen port (default 8080)
//! - `RULESET` — `elimination` or `resource-duel`
//! - `RUST_LOG` — tracing filter (default `info`)

use riposte::prelude::*;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), RiposteError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let port = std::env::var("PORT").unwrap_or_else(|_| "8080".to_string());
    let ruleset = match std::env::var("RULESET").as_deref() {
        Ok("resource-duel") => Ruleset::ResourceDuel,
        _ => Ruleset::Elimination,
    };

    let server = RiposteServer::builder()
        .bind(&format!("0.0.0.0:{port}"))
        .engine_config(EngineConfig {
            ruleset,
            ..EngineConfig::default()
        })
        .build()
        .await?;

    tracing::info!(
        addr = %server.local_addr().map(|a| a.to_string()).unwrap_or_default(),
        %ruleset,
        "duel arena listening"
    );

    server.run().await
}
