use crate::store::StoreError;
use sqlx::migrate::Migrator;
use sqlx::PgPool;
use tracing::info;

static MIGRATOR: Migrator = sqlx::migrate!();

/// Apply pending schema migrations for `timeline_items` and `messages`
pub async fn run(pool: &PgPool) -> Result<(), StoreError> {
    info!(
        available = MIGRATOR.iter().count(),
        "Applying document store migrations"
    );
    MIGRATOR
        .run(pool)
        .await
        .map_err(|e| StoreError::Migration(e.to_string()))?;
    info!("Document store schema is up to date");
    Ok(())
}
