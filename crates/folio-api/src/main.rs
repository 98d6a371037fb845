mod cache;
mod config;
mod constants;
mod error;
mod routes;
mod state;

use std::sync::Arc;
use std::time::Duration;

use axum::extract::DefaultBodyLimit;
use axum::http::{header, Method};
use folio_blob_store::BlobStore;
use folio_db::{DocumentStore, PgDocumentStore};
use sqlx::postgres::PgPoolOptions;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};
use tracing_subscriber::{prelude::*, EnvFilter};

use cache::ResponseCache;
use config::Config;
use constants::{DOCUMENTS_CONTAINER, IMAGES_CONTAINER};
use state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing()?;

    let config = Config::from_env();
    info!(port = config.port, "Starting folio-api");

    // Connect to database
    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(config.db_acquire_timeout_secs))
        .connect(&config.database_url)
        .await?;
    folio_db::migrate::run(&pool).await?;

    let blobs = BlobStore::new(
        config.blob_dir.clone(),
        &config.public_url,
        &[IMAGES_CONTAINER, DOCUMENTS_CONTAINER],
    );
    blobs.init().await?;

    // One response cache for the whole process, dropped on shutdown
    let cache = ResponseCache::new();
    let store: Arc<dyn DocumentStore> = Arc::new(PgDocumentStore::new(pool));
    let state = AppState::new(store, cache.clone(), blobs);

    let app = routes::create_router(state)
        .layer(DefaultBodyLimit::max(config.max_upload_bytes))
        .layer(cors_layer(&config.cors_origins));

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port)).await?;
    info!(port = config.port, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    cache.clear();
    info!("Shut down");
    Ok(())
}

fn init_tracing() -> Result<(), tracing_subscriber::filter::ParseError> {
    let env_filter = EnvFilter::from_default_env().add_directive("folio_api=info".parse()?);

    // Use JSON format for Cloud Logging when LOG_FORMAT=json
    if std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false)
    {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_stackdriver::layer())
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }
    Ok(())
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|o| o == "*") {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }

    let origins: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();
    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
