//! Cognito ID token verification.
//!
//! Tokens are RS256 JWTs signed with one of the user pool's keys. The key set
//! is fetched lazily from the pool's JWKS endpoint and cached; an unknown `kid`
//! triggers a refetch, at most once per `JWKS_REFRESH_COOLDOWN`.

use std::{
    collections::HashMap,
    time::{Duration, Instant},
};

use async_trait::async_trait;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode, decode_header};
use reqwest::Client;
use serde::Deserialize;
use tokio::sync::RwLock;
use url::Url;

use crate::{
    app_error::{AppError, AppResult},
    identity::{AuthUser, IdentityVerifier},
};

/// Minimum time between two JWKS fetches.
pub const JWKS_REFRESH_COOLDOWN: Duration = Duration::from_secs(10);

const EXPECTED_TOKEN_USE: &str = "id";

/// JSON Web Key Set as served by `/.well-known/jwks.json`.
#[derive(Debug, Clone, Deserialize)]
pub struct Jwks {
    pub keys: Vec<Jwk>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Jwk {
    pub kid: String,
    pub kty: String,
    pub n: Option<String>,
    pub e: Option<String>,
    pub alg: Option<String>,
}

#[derive(Debug, Deserialize)]
struct IdTokenClaims {
    sub: String,
    email: Option<String>,
    /// Boolean in current pools, the string "true" in some older ones.
    email_verified: Option<serde_json::Value>,
    token_use: Option<String>,
    #[serde(rename = "custom:publicMetadata")]
    public_metadata: Option<serde_json::Value>,
    #[serde(rename = "custom:unsafeMetadata")]
    unsafe_metadata: Option<serde_json::Value>,
}

#[derive(Default)]
struct JwksCache {
    keys: HashMap<String, DecodingKey>,
    /// Last fetch attempt, successful or not.
    last_attempt: Option<Instant>,
}

impl JwksCache {
    fn replace(&mut self, jwks: Jwks) {
        self.keys = jwks
            .keys
            .into_iter()
            .filter(|jwk| jwk.kty == "RSA")
            .filter_map(|jwk| {
                let (Some(n), Some(e)) = (jwk.n.as_deref(), jwk.e.as_deref()) else {
                    return None;
                };
                match DecodingKey::from_rsa_components(n, e) {
                    Ok(key) => Some((jwk.kid, key)),
                    Err(err) => {
                        tracing::warn!(kid = %jwk.kid, error = %err, "Skipping unusable JWK");
                        None
                    }
                }
            })
            .collect();
        self.last_attempt = Some(Instant::now());
    }

    fn in_cooldown(&self) -> bool {
        self.last_attempt
            .is_some_and(|at| at.elapsed() < JWKS_REFRESH_COOLDOWN)
    }
}

/// Issuer URL of a user pool. Pool ids have the form `<region>_<suffix>`.
pub fn issuer_for_pool(user_pool_id: &str) -> AppResult<String> {
    let region = user_pool_id
        .split_once('_')
        .filter(|(region, suffix)| !region.is_empty() && !suffix.is_empty())
        .map(|(region, _)| region)
        .ok_or_else(|| {
            AppError::Internal(format!("Malformed Cognito user pool id: {user_pool_id}"))
        })?;
    Ok(format!(
        "https://cognito-idp.{region}.amazonaws.com/{user_pool_id}"
    ))
}

pub struct CognitoVerifier {
    http: Client,
    issuer: String,
    jwks_url: Url,
    client_id: String,
    cache: RwLock<JwksCache>,
}

impl CognitoVerifier {
    pub fn new(user_pool_id: &str, client_id: &str, http: Client) -> AppResult<Self> {
        if client_id.trim().is_empty() {
            return Err(AppError::Internal("Cognito client id is empty".into()));
        }
        let issuer = issuer_for_pool(user_pool_id)?;
        let jwks_url = Url::parse(&format!("{issuer}/.well-known/jwks.json"))
            .map_err(|e| AppError::Internal(format!("Invalid JWKS url: {e}")))?;

        Ok(Self {
            http,
            issuer,
            jwks_url,
            client_id: client_id.to_string(),
            cache: RwLock::new(JwksCache::default()),
        })
    }

    /// Fetch keys from `jwks_url` instead of the pool's well-known endpoint.
    pub fn with_jwks_url(mut self, jwks_url: Url) -> Self {
        self.jwks_url = jwks_url;
        self
    }

    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    pub fn jwks_url(&self) -> &Url {
        &self.jwks_url
    }

    /// Replace the cached key set without going to the network.
    pub async fn load_jwks(&self, jwks: Jwks) {
        self.cache.write().await.replace(jwks);
    }

    async fn fetch_jwks(&self) -> AppResult<Jwks> {
        let response = self
            .http
            .get(self.jwks_url.clone())
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, url = %self.jwks_url, "Failed to fetch Cognito JWKS");
                AppError::InvalidToken("Unable to fetch signing keys".into())
            })?;

        if !response.status().is_success() {
            tracing::error!(status = %response.status(), url = %self.jwks_url, "Cognito JWKS request failed");
            return Err(AppError::InvalidToken("Unable to fetch signing keys".into()));
        }

        response.json::<Jwks>().await.map_err(|e| {
            tracing::error!(error = %e, "Failed to parse Cognito JWKS");
            AppError::InvalidToken("Unable to fetch signing keys".into())
        })
    }

    async fn decoding_key(&self, kid: &str) -> AppResult<DecodingKey> {
        if let Some(key) = self.cache.read().await.keys.get(kid) {
            return Ok(key.clone());
        }

        let mut cache = self.cache.write().await;
        // Another request may have refreshed while we waited for the lock.
        if let Some(key) = cache.keys.get(kid) {
            return Ok(key.clone());
        }
        if cache.in_cooldown() {
            return Err(AppError::InvalidToken("No matching key found in JWKS".into()));
        }

        cache.last_attempt = Some(Instant::now());
        let jwks = self.fetch_jwks().await?;
        cache.replace(jwks);
        tracing::debug!(keys = cache.keys.len(), "Refreshed Cognito JWKS");

        cache
            .keys
            .get(kid)
            .cloned()
            .ok_or_else(|| AppError::InvalidToken("No matching key found in JWKS".into()))
    }
}

#[async_trait]
impl IdentityVerifier for CognitoVerifier {
    async fn verify(&self, token: &str) -> AppResult<AuthUser> {
        let header = decode_header(token)
            .map_err(|e| AppError::InvalidToken(format!("Invalid token header: {e}")))?;
        if header.alg != Algorithm::RS256 {
            return Err(AppError::InvalidToken(format!(
                "Unexpected signing algorithm {:?}",
                header.alg
            )));
        }
        let kid = header
            .kid
            .ok_or_else(|| AppError::InvalidToken("Missing kid in token header".into()))?;

        let key = self.decoding_key(&kid).await?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_audience(&[self.client_id.as_str()]);
        validation.set_issuer(&[self.issuer.as_str()]);
        validation.set_required_spec_claims(&["exp", "iss", "aud", "sub"]);

        let claims = decode::<IdTokenClaims>(token, &key, &validation)
            .map_err(|e| AppError::InvalidToken(e.to_string()))?
            .claims;

        if claims.token_use.as_deref() != Some(EXPECTED_TOKEN_USE) {
            return Err(AppError::InvalidToken(format!(
                "Expected an {EXPECTED_TOKEN_USE} token, got {:?}",
                claims.token_use
            )));
        }

        Ok(AuthUser {
            public_metadata: metadata_claim(claims.public_metadata, "custom:publicMetadata")?,
            unsafe_metadata: metadata_claim(claims.unsafe_metadata, "custom:unsafeMetadata")?,
            email_verified: claim_is_true(claims.email_verified.as_ref()),
            id: claims.sub,
            email: claims.email,
        })
    }
}

fn claim_is_true(raw: Option<&serde_json::Value>) -> bool {
    match raw {
        Some(serde_json::Value::Bool(flag)) => *flag,
        Some(serde_json::Value::String(text)) => text.eq_ignore_ascii_case("true"),
        _ => false,
    }
}

/// Custom attributes arrive as JSON text. Absent or empty means `{}`.
fn metadata_claim(raw: Option<serde_json::Value>, claim: &str) -> AppResult<serde_json::Value> {
    match raw {
        None | Some(serde_json::Value::Null) => Ok(serde_json::json!({})),
        Some(serde_json::Value::String(text)) if text.trim().is_empty() => {
            Ok(serde_json::json!({}))
        }
        Some(serde_json::Value::String(text)) => serde_json::from_str(&text)
            .map_err(|e| AppError::InvalidToken(format!("Malformed {claim} claim: {e}"))),
        Some(value @ serde_json::Value::Object(_)) => Ok(value),
        Some(_) => Err(AppError::InvalidToken(format!(
            "Malformed {claim} claim"
        ))),
    }
}
