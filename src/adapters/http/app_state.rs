use std::sync::Arc;

use crate::{
    identity::IdentityVerifier, infra::config::AppConfig, use_cases::waitlist::WaitlistUseCases,
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub waitlist_use_cases: Arc<WaitlistUseCases>,
    pub identity: Arc<dyn IdentityVerifier>,
}
