use crate::{
    adapters::{http::app_state::AppState, identity::CognitoVerifier},
    identity::IdentityVerifier,
    infra::{config::AppConfig, error::InfraError, http_client, postgres_persistence},
    use_cases::waitlist::{WaitlistRepo, WaitlistUseCases},
};
use std::fs::OpenOptions;
use std::sync::Arc;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

pub async fn init_app_state(config: AppConfig) -> Result<AppState, InfraError> {
    let postgres_arc = Arc::new(postgres_persistence(&config).await?);

    let http = http_client::try_build_client().map_err(InfraError::HttpClient)?;
    let verifier = CognitoVerifier::new(&config.user_pool_id, &config.user_pool_client_id, http)
        .map_err(InfraError::IdentityProvider)?;
    tracing::info!(issuer = verifier.issuer(), "Verifying Cognito ID tokens");

    let waitlist_use_cases = WaitlistUseCases::new(postgres_arc.clone() as Arc<dyn WaitlistRepo>);

    Ok(AppState {
        config: Arc::new(config),
        waitlist_use_cases: Arc::new(waitlist_use_cases),
        identity: Arc::new(verifier) as Arc<dyn IdentityVerifier>,
    })
}

pub fn init_tracing(log_file: Option<&str>) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "legalpocket=debug,tower_http=debug".into());

    // Console (pretty logs)
    let console_layer = fmt::layer()
        .with_target(false) // don’t show target (module path)
        .with_level(true) // show log level
        .pretty(); // human-friendly, with colors

    // File (structured JSON logs), only when configured
    let mut file_error = None;
    let json_layer = log_file.and_then(|path| {
        match OpenOptions::new().create(true).append(true).open(path) {
            Ok(file) => Some(
                fmt::layer()
                    .json()
                    .with_writer(file)
                    .with_current_span(true)
                    .with_span_list(true),
            ),
            Err(err) => {
                file_error = Some((path.to_string(), err));
                None
            }
        }
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(json_layer)
        .try_init()
        .ok();

    if let Some((path, err)) = file_error {
        tracing::warn!(path = %path, error = %err, "Cannot open log file, logging to console only");
    }
}
