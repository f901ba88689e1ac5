use sqlx::{PgPool, migrate::Migrator, postgres::PgPoolOptions};
use tracing::info;

use super::InfraError;

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

pub async fn init_db(database_url: &str, max_connections: u32) -> Result<PgPool, InfraError> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await
        .map_err(InfraError::DatabaseConnection)?;

    info!("Connected to database!");

    MIGRATOR.run(&pool).await?;
    info!("Database migrations applied");

    Ok(pool)
}
