//! Apply pending schema migrations and exit.
//!
//! Meant to run as a release step before `folio-api` starts, so several API
//! instances never race on the migration table.

use sqlx::postgres::PgPoolOptions;
use tracing::{error, info};
use tracing_subscriber::{prelude::*, EnvFilter};

#[tokio::main]
async fn main() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("folio_migrate=info,folio_db=info"));

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

    let database_url = std::env::var("DATABASE_URL")
        .unwrap_or_else(|_| "postgres://localhost/folio".to_string());

    let pool = match PgPoolOptions::new()
        .max_connections(1)
        .connect(&database_url)
        .await
    {
        Ok(pool) => pool,
        Err(e) => {
            error!(error = %e, "Failed to connect to database");
            std::process::exit(1);
        }
    };

    if let Err(e) = folio_db::migrate::run(&pool).await {
        error!(error = %e, "Migration failed");
        std::process::exit(1);
    }

    pool.close().await;
    info!("Migrations complete");
}
