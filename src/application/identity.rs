use async_trait::async_trait;
use serde::Serialize;

use crate::app_error::{AppError, AppResult};

/// Role value in `publicMetadata.role` that opens the admin routes.
pub const ADMIN_ROLE: &str = "admin";

/// The caller, as vouched for by the identity provider.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthUser {
    pub id: String,
    pub email: Option<String>,
    /// Whether the provider has confirmed the caller owns `email`.
    #[serde(skip_serializing)]
    pub email_verified: bool,
    pub public_metadata: serde_json::Value,
    pub unsafe_metadata: serde_json::Value,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.public_metadata
            .get("role")
            .and_then(serde_json::Value::as_str)
            == Some(ADMIN_ROLE)
    }

    /// The token email, only when the provider has verified it.
    pub fn verified_email(&self) -> AppResult<&str> {
        let email = self
            .email
            .as_deref()
            .ok_or_else(|| AppError::InvalidInput("Token carries no email".into()))?;
        if !self.email_verified {
            return Err(AppError::EmailNotVerified);
        }
        Ok(email)
    }
}

/// Verifies bearer tokens issued by the external identity provider.
#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    /// Returns the normalized user on success, `AppError::InvalidToken` otherwise.
    async fn verify(&self, token: &str) -> AppResult<AuthUser>;
}
