use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use auth_gate::{
    app,
    config::Config,
    cors_layer, db,
    repositories::user::PgUserStore,
    state::AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    tracing::info!("✅ Configuration loaded successfully");

    let pool = db::create_pool(&config.database_url).context("Failed to create database pool")?;
    if let Err(e) = db::run_migrations(&pool).await {
        tracing::error!("❌ Failed to prepare database schema: {}", e);
        return Err(e.into());
    }
    tracing::info!("✅ PostgreSQL pool initialized");

    let state = AppState::new(&config, Arc::new(PgUserStore::new(pool)))?;

    let cors = cors_layer(&config.allowed_origins())?;
    tracing::info!("✅ CORS allows: {:?}", config.allowed_origins());

    let router = app(state).layer(cors);

    let addr = SocketAddr::from(([127, 0, 0, 1], config.port));
    tracing::info!("🚀 Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}
