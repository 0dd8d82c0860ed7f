use std::net::SocketAddr;

use axum::http::HeaderValue;
use env_helpers::{get_env, get_env_default};
use secrecy::SecretString;

pub struct AppConfig {
    pub database_url: SecretString,
    pub database_max_connections: u32,
    /// Apply the embedded migrations before serving.
    pub run_migrations: bool,
    pub bind_addr: SocketAddr,
    pub cors_origin: HeaderValue,
    /// Cognito user pool id, e.g. "us-east-1_AbCdEf123".
    pub user_pool_id: String,
    /// Cognito app client id; ID tokens must carry it as `aud`.
    pub user_pool_client_id: String,
    /// When set, JSON logs are also appended to this file.
    pub log_file: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let database_url = SecretString::new(get_env::<String>("DATABASE_URL").into());
        let database_max_connections: u32 = get_env_default("DATABASE_MAX_CONNECTIONS", 5);
        let run_migrations: bool = get_env_default("RUN_MIGRATIONS", true);

        let bind_addr: SocketAddr = get_env_default(
            "BIND_ADDR",
            SocketAddr::from(([127, 0, 0, 1], 4000)),
        );
        let cors_origin: HeaderValue =
            get_env_default("CORS_ORIGIN", String::from("http://localhost:5173"))
                .parse()
                .expect("CORS_ORIGIN must be a valid header value");

        let user_pool_id: String = get_env("AWS_USER_POOL_ID");
        let user_pool_client_id: String = get_env("AWS_USER_POOL_CLIENT_ID");
        let log_file = std::env::var("LOG_FILE")
            .ok()
            .filter(|path| !path.trim().is_empty());

        Self {
            database_url,
            database_max_connections,
            run_migrations,
            bind_addr,
            cors_origin,
            user_pool_id,
            user_pool_client_id,
            log_file,
        }
    }
}
