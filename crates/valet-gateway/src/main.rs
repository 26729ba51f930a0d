//! Valet Gateway - HTTP API for the valet booking service
//!
//! This is the main entry point for the gateway service.
//!
//! # Configuration
//!
//! Read from the environment:
//!
//! - `LISTEN_ADDR` (default `0.0.0.0:8080`)
//! - `DATABASE_URL` (default `sqlite://valet.db`)
//! - `DB_MAX_CONNECTIONS`, `DB_ACQUIRE_TIMEOUT_SECS`, `DB_IDLE_TIMEOUT_SECS`
//! - `CORS_ORIGINS`, comma-separated (default `*`)
//! - `REQUEST_TIMEOUT_SECS` (default 30)
//! - `RUST_LOG` (default `info,valet=debug`)

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use valet_gateway::{create_router, GatewayConfig, GatewayState};
use valet_scheduling::SchedulingService;
use valet_store::{SqliteStore, StoreConfig};

/// Read an environment variable, falling back to `default` when unset.
fn env_or<T>(key: &str, default: T) -> Result<T, Box<dyn std::error::Error>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(value) => value
            .parse()
            .map_err(|e| format!("invalid {key}={value}: {e}").into()),
        Err(_) => Ok(default),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,valet=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Valet Gateway");

    // Load configuration from environment
    let defaults = StoreConfig::default();
    let store_config = StoreConfig {
        database_url: env_or("DATABASE_URL", defaults.database_url)?,
        max_connections: env_or("DB_MAX_CONNECTIONS", defaults.max_connections)?,
        acquire_timeout: Duration::from_secs(env_or(
            "DB_ACQUIRE_TIMEOUT_SECS",
            defaults.acquire_timeout.as_secs(),
        )?),
        idle_timeout: Duration::from_secs(env_or(
            "DB_IDLE_TIMEOUT_SECS",
            defaults.idle_timeout.as_secs(),
        )?),
    };

    let mut gateway_config = GatewayConfig {
        listen_addr: env_or("LISTEN_ADDR", GatewayConfig::default().listen_addr)?,
        request_timeout_seconds: env_or(
            "REQUEST_TIMEOUT_SECS",
            GatewayConfig::default().request_timeout_seconds,
        )?,
        ..GatewayConfig::default()
    };
    if let Ok(origins) = std::env::var("CORS_ORIGINS") {
        gateway_config.cors_origins = GatewayConfig::parse_origins(&origins);
    }

    tracing::info!(
        listen_addr = %gateway_config.listen_addr,
        database_url = %store_config.database_url,
        max_connections = store_config.max_connections,
        cors_origins = ?gateway_config.cors_origins,
        "Gateway configuration loaded"
    );

    // Open the database and apply the schema
    let store = Arc::new(SqliteStore::connect(&store_config).await?);
    tracing::info!("Database ready");

    let scheduling = Arc::new(SchedulingService::with_defaults(store));

    let listen_addr = gateway_config.listen_addr.clone();
    let state = GatewayState::new(scheduling, gateway_config);
    let app = create_router(state);
    tracing::info!("Router configured with all API endpoints");

    // Start HTTP server
    tracing::info!(listen_addr = %listen_addr, "Starting HTTP server");
    let listener = tokio::net::TcpListener::bind(&listen_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
