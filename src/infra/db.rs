use secrecy::ExposeSecret;
use sqlx::{PgPool, postgres::PgPoolOptions};
use tracing::info;

use crate::infra::{config::AppConfig, error::InfraError};

pub async fn init_db(config: &AppConfig) -> Result<PgPool, InfraError> {
    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .connect(config.database_url.expose_secret())
        .await?;

    info!("Connected to database!");

    if config.run_migrations {
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(InfraError::Migration)?;
        info!("Database migrations applied");
    }

    Ok(pool)
}
