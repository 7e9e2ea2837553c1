//! Account flows against the identitytoolkit REST API
//!
//! Backs the auth controller: lookup by email or uid, sign-up, and custom
//! token minting. Custom tokens are RS256 JWTs signed with the service
//! account key; the client exchanges them for an ID token on its side.

use chrono::Utc;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::FirebaseConfig;
use crate::error::{AuthError, AuthResult};
use crate::models::UserRecord;

const IDENTITY_TOOLKIT_URL: &str = "https://identitytoolkit.googleapis.com/v1";

/// Audience required by Firebase for custom tokens.
const CUSTOM_TOKEN_AUD: &str =
    "https://identitytoolkit.googleapis.com/google.identity.identitytoolkit.v1.IdentityToolkit";

/// Custom token validity: one hour, the maximum Firebase accepts.
const CUSTOM_TOKEN_TTL_SECS: i64 = 3600;

pub struct FirebaseAuthClient {
    config: FirebaseConfig,
    http: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct LookupUser {
    #[serde(rename = "localId")]
    local_id: String,
    email: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LookupResponse {
    #[serde(default)]
    users: Vec<LookupUser>,
}

#[derive(Debug, Deserialize)]
struct SignUpResponse {
    #[serde(rename = "localId")]
    local_id: String,
    email: Option<String>,
}

#[derive(Debug, Serialize)]
struct CustomTokenClaims<'a> {
    iss: &'a str,
    sub: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
    uid: &'a str,
}

impl FirebaseAuthClient {
    pub fn new(config: FirebaseConfig, http: reqwest::Client) -> Self {
        Self { config, http }
    }

    async fn lookup(&self, body: serde_json::Value, subject: &str) -> AuthResult<UserRecord> {
        let url = format!(
            "{IDENTITY_TOOLKIT_URL}/accounts:lookup?key={}",
            self.config.web_api_key
        );

        let response: LookupResponse = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| AuthError::Provider(e.to_string()))?
            .error_for_status()
            .map_err(|e| AuthError::Provider(e.to_string()))?
            .json()
            .await
            .map_err(|e| AuthError::Provider(e.to_string()))?;

        let user = response
            .users
            .into_iter()
            .next()
            .ok_or_else(|| AuthError::UserNotFound(subject.to_string()))?;

        Ok(UserRecord {
            uid: user.local_id,
            email: user.email,
        })
    }

    pub async fn get_user_by_email(&self, email: &str) -> AuthResult<UserRecord> {
        self.lookup(serde_json::json!({ "email": [email] }), email)
            .await
    }

    pub async fn get_user(&self, uid: &str) -> AuthResult<UserRecord> {
        self.lookup(serde_json::json!({ "localId": [uid] }), uid)
            .await
    }

    /// Create an account with email and password.
    pub async fn create_user(&self, email: &str, password: &str) -> AuthResult<UserRecord> {
        let url = format!(
            "{IDENTITY_TOOLKIT_URL}/accounts:signUp?key={}",
            self.config.web_api_key
        );

        let response: SignUpResponse = self
            .http
            .post(&url)
            .json(&serde_json::json!({
                "email": email,
                "password": password,
                "returnSecureToken": false,
            }))
            .send()
            .await
            .map_err(|e| AuthError::Provider(e.to_string()))?
            .error_for_status()
            .map_err(|e| AuthError::Provider(e.to_string()))?
            .json()
            .await
            .map_err(|e| AuthError::Provider(e.to_string()))?;

        debug!(uid = %response.local_id, "Created Firebase account");
        Ok(UserRecord {
            uid: response.local_id,
            email: response.email,
        })
    }

    /// Mint a custom token for `uid`, signed with the service account key.
    pub fn create_custom_token(&self, uid: &str) -> AuthResult<String> {
        let email = self
            .config
            .service_account_email
            .as_deref()
            .ok_or_else(|| AuthError::Config("FIREBASE_CLIENT_EMAIL is not set".to_string()))?;
        let pem = self
            .config
            .private_key_pem
            .as_deref()
            .ok_or_else(|| AuthError::Config("FIREBASE_PRIVATE_KEY is not set".to_string()))?;

        let now = Utc::now().timestamp();
        let claims = CustomTokenClaims {
            iss: email,
            sub: email,
            aud: CUSTOM_TOKEN_AUD,
            iat: now,
            exp: now + CUSTOM_TOKEN_TTL_SECS,
            uid,
        };

        let key = EncodingKey::from_rsa_pem(pem.as_bytes())
            .map_err(|e| AuthError::Config(format!("invalid service account key: {e}")))?;

        encode(&Header::new(Algorithm::RS256), &claims, &key)
            .map_err(|e| AuthError::Provider(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client_without_service_account() -> FirebaseAuthClient {
        FirebaseAuthClient::new(
            FirebaseConfig {
                project_id: "test-project".to_string(),
                web_api_key: "key".to_string(),
                service_account_email: None,
                private_key_pem: None,
            },
            reqwest::Client::new(),
        )
    }

    #[test]
    fn custom_token_requires_service_account() {
        let client = client_without_service_account();
        let err = client.create_custom_token("uid-1").unwrap_err();
        assert!(matches!(err, AuthError::Config(_)));
    }
}
