//! ID token verification
//!
//! Firebase ID tokens are RS256 JWTs signed by Google's securetoken service
//! account. `GoogleTokenVerifier` fetches the JWK set, caches it, and
//! validates signature, audience (project id), and issuer.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::{AuthError, AuthResult};
use crate::models::Claims;

const JWKS_URL: &str =
    "https://www.googleapis.com/service_accounts/v1/jwk/securetoken@system.gserviceaccount.com";

/// Key refresh interval. Google rotates these roughly daily; an hour keeps
/// us comfortably fresh without hammering the endpoint.
const KEY_CACHE_TTL: Duration = Duration::from_secs(3600);

/// Verifies a bearer token and returns the decoded claims.
#[async_trait]
pub trait TokenVerifier: Send + Sync {
    async fn verify_id_token(&self, token: &str) -> AuthResult<Claims>;
}

#[derive(Debug, Deserialize)]
struct Jwk {
    kid: String,
    n: String,
    e: String,
}

#[derive(Debug, Deserialize)]
struct JwkSet {
    keys: Vec<Jwk>,
}

#[derive(Default)]
struct CachedKeys {
    keys: HashMap<String, (String, String)>,
    fetched_at: Option<DateTime<Utc>>,
}

/// Production verifier backed by Google's securetoken JWKs.
pub struct GoogleTokenVerifier {
    project_id: String,
    http: reqwest::Client,
    cache: RwLock<CachedKeys>,
}

impl GoogleTokenVerifier {
    pub fn new(project_id: impl Into<String>, http: reqwest::Client) -> Self {
        Self {
            project_id: project_id.into(),
            http,
            cache: RwLock::new(CachedKeys::default()),
        }
    }

    async fn rsa_components(&self, kid: &str) -> AuthResult<(String, String)> {
        {
            let cache = self.cache.read().await;
            let fresh = cache
                .fetched_at
                .map(|at| Utc::now() - at < chrono::Duration::from_std(KEY_CACHE_TTL).unwrap_or_default())
                .unwrap_or(false);
            if fresh {
                if let Some(components) = cache.keys.get(kid) {
                    return Ok(components.clone());
                }
            }
        }

        debug!(kid = %kid, "Refreshing securetoken JWK set");
        let jwks: JwkSet = self
            .http
            .get(JWKS_URL)
            .send()
            .await
            .map_err(|e| AuthError::Provider(e.to_string()))?
            .json()
            .await
            .map_err(|e| AuthError::Provider(e.to_string()))?;

        let mut cache = self.cache.write().await;
        cache.keys = jwks
            .keys
            .into_iter()
            .map(|k| (k.kid, (k.n, k.e)))
            .collect();
        cache.fetched_at = Some(Utc::now());

        cache
            .keys
            .get(kid)
            .cloned()
            .ok_or_else(|| AuthError::InvalidToken(format!("unknown signing key: {kid}")))
    }
}

#[async_trait]
impl TokenVerifier for GoogleTokenVerifier {
    async fn verify_id_token(&self, token: &str) -> AuthResult<Claims> {
        let header =
            decode_header(token).map_err(|e| AuthError::InvalidToken(e.to_string()))?;
        let kid = header
            .kid
            .ok_or_else(|| AuthError::InvalidToken("token header has no kid".to_string()))?;

        let (n, e) = self.rsa_components(&kid).await?;
        let key = DecodingKey::from_rsa_components(&n, &e)
            .map_err(|e| AuthError::Provider(e.to_string()))?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_audience(&[&self.project_id]);
        validation.set_issuer(&[format!(
            "https://securetoken.google.com/{}",
            self.project_id
        )]);

        let data = decode::<Claims>(token, &key, &validation)
            .map_err(|e| AuthError::InvalidToken(e.to_string()))?;

        Ok(data.claims)
    }
}

/// Test verifier: a fixed token-to-claims table. Anything not in the table
/// fails verification.
#[derive(Default)]
pub struct StaticTokenVerifier {
    tokens: HashMap<String, Claims>,
}

impl StaticTokenVerifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(mut self, token: impl Into<String>, uid: impl Into<String>) -> Self {
        let uid = uid.into();
        let now = Utc::now().timestamp();
        self.tokens.insert(
            token.into(),
            Claims {
                sub: uid,
                aud: "test-project".to_string(),
                iss: "https://securetoken.google.com/test-project".to_string(),
                exp: now + 3600,
                iat: now,
                email: None,
                email_verified: None,
                custom: serde_json::Map::new(),
            },
        );
        self
    }
}

#[async_trait]
impl TokenVerifier for StaticTokenVerifier {
    async fn verify_id_token(&self, token: &str) -> AuthResult<Claims> {
        self.tokens
            .get(token)
            .cloned()
            .ok_or_else(|| AuthError::InvalidToken("unrecognized token".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn static_verifier_accepts_known_token() {
        let verifier = StaticTokenVerifier::new().with_token("tok-1", "uid-1");
        let claims = verifier.verify_id_token("tok-1").await.unwrap();
        assert_eq!(claims.uid(), "uid-1");
    }

    #[tokio::test]
    async fn static_verifier_rejects_unknown_token() {
        let verifier = StaticTokenVerifier::new().with_token("tok-1", "uid-1");
        let err = verifier.verify_id_token("forged").await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidToken(_)));
    }

    #[tokio::test]
    async fn malformed_jwt_is_rejected_without_key_fetch() {
        let verifier = GoogleTokenVerifier::new("test-project", reqwest::Client::new());
        let err = verifier.verify_id_token("not-a-jwt").await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidToken(_)));
    }
}
