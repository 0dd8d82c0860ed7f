//! Identity provider mocks and a signer for Cognito-shaped test tokens.

use async_trait::async_trait;
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use std::collections::HashMap;
use std::sync::Mutex;

use crate::{
    adapters::identity::cognito::{Jwk, Jwks, issuer_for_pool},
    app_error::{AppError, AppResult},
    identity::{AuthUser, IdentityVerifier},
};

pub const TEST_USER_POOL_ID: &str = "us-east-1_TestPool";
pub const TEST_CLIENT_ID: &str = "test-client-id";
pub const TEST_KEY_ID: &str = "test-key-1";

/// Private half of the fixture key pair (PKCS#1 PEM).
const TEST_RSA_PRIVATE_PEM: &[u8] = include_bytes!("fixtures/identity_test_key.pem");

/// Public modulus of the fixture key, base64url without padding.
const TEST_RSA_N: &str = "tfnpDooccPDpGwteIlxzzcKIJyTtPJFmPlytuvZQZKsXVMHnKclbOv_qaYzdSLZq3f9DLONsBzy6EQVcTQZ2pvPP-WFi4J5HaSGSfWWGIgbuP6UETEOsMEBAucKAzXC-g3yijUlwlOYhdx30BZL9n98gtHk0gCbhJMNXoVugtupguAmYo-r7lBB4jrqvoY_hND7SnBjaaOOlnVcddpGpDaU5jFNvDwvg2gh-AXa7eDHEmNcXWlctm8Fzf2LpERWQJteMMEJIydTPBG6WAN9f7KUBnZaOxhdeuD2mV_45VlXboe-2Thw6xRC3SCJDSWp-FJC1H9-ip5jB6vt-DTPayQ";
const TEST_RSA_E: &str = "AQAB";

/// JWKS containing the fixture public key under `TEST_KEY_ID`.
pub fn test_jwks() -> Jwks {
    Jwks {
        keys: vec![Jwk {
            kid: TEST_KEY_ID.to_string(),
            kty: "RSA".to_string(),
            n: Some(TEST_RSA_N.to_string()),
            e: Some(TEST_RSA_E.to_string()),
            alg: Some("RS256".to_string()),
        }],
    }
}

/// `test_jwks()` as served by the pool's well-known endpoint.
pub fn test_jwks_json() -> serde_json::Value {
    serde_json::json!({
        "keys": [{
            "kid": TEST_KEY_ID,
            "kty": "RSA",
            "alg": "RS256",
            "use": "sig",
            "n": TEST_RSA_N,
            "e": TEST_RSA_E,
        }]
    })
}

/// Claims of a valid ID token for the test pool, expiring in an hour.
pub fn id_token_claims(sub: &str, email: &str) -> serde_json::Value {
    let now = chrono::Utc::now().timestamp();
    serde_json::json!({
        "sub": sub,
        "email": email,
        "email_verified": true,
        "aud": TEST_CLIENT_ID,
        "iss": issuer_for_pool(TEST_USER_POOL_ID).unwrap(),
        "token_use": "id",
        "iat": now,
        "exp": now + 3600,
    })
}

/// Sign claims with the fixture private key.
pub fn sign_test_token(claims: &serde_json::Value, kid: &str) -> String {
    let mut header = Header::new(Algorithm::RS256);
    header.kid = Some(kid.to_string());
    let key = EncodingKey::from_rsa_pem(TEST_RSA_PRIVATE_PEM).expect("fixture key should parse");
    encode(&header, claims, &key).expect("Failed to sign test token")
}

/// Verifier that accepts a fixed set of opaque tokens.
#[derive(Default)]
pub struct StaticIdentityVerifier {
    users: Mutex<HashMap<String, AuthUser>>,
}

impl StaticIdentityVerifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(self, token: &str, user: AuthUser) -> Self {
        self.users.lock().unwrap().insert(token.to_string(), user);
        self
    }
}

#[async_trait]
impl IdentityVerifier for StaticIdentityVerifier {
    async fn verify(&self, token: &str) -> AppResult<AuthUser> {
        self.users
            .lock()
            .unwrap()
            .get(token)
            .cloned()
            .ok_or_else(|| AppError::InvalidToken("unknown test token".into()))
    }
}
