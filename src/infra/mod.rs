use crate::{
    adapters::persistence::PostgresPersistence,
    infra::{config::AppConfig, db::init_db, error::InfraError},
};

pub mod app;
pub mod config;
pub mod db;
pub mod error;
pub mod http_client;
pub mod setup;

pub async fn postgres_persistence(config: &AppConfig) -> Result<PostgresPersistence, InfraError> {
    let pool = init_db(config).await?;
    let persistence = PostgresPersistence::new(pool);
    Ok(persistence)
}
