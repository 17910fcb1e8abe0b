mod error;
mod handlers;
mod router;
mod sources;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use game_engine::{Engine, GiftTierPolicy, SessionConfig, SourceManager, TeamResolver};
use router::create_router;
use sources::IdleSource;
use state::AppState;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    tracing::info!("Starting live arena gateway");

    // Spawn the aggregation engine and wire the source manager to it.
    let engine = Engine::spawn(
        SessionConfig::default(),
        TeamResolver::with_default_catalog(),
        GiftTierPolicy::default(),
    );
    let sources = SourceManager::new(Arc::new(IdleSource), engine.clone());

    let state = AppState::new(engine, sources);
    let app = create_router(state);

    // Bind and serve
    let addr: SocketAddr = std::env::var("GATEWAY_ADDR")
        .unwrap_or_else(|_| "0.0.0.0:8080".to_string())
        .parse()?;
    let listener = TcpListener::bind(addr).await?;

    tracing::info!("Listening on {}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
