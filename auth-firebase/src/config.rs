use serde::Deserialize;

use crate::error::{AuthError, AuthResult};

/// Firebase project configuration
///
/// The service account fields are only needed for custom token minting
/// (login/signup); token verification works with the project id alone.
#[derive(Debug, Clone, Deserialize)]
pub struct FirebaseConfig {
    pub project_id: String,
    /// Web API key for identitytoolkit REST calls.
    pub web_api_key: String,
    pub service_account_email: Option<String>,
    /// PEM-encoded RSA private key of the service account.
    pub private_key_pem: Option<String>,
}

impl FirebaseConfig {
    /// Load Firebase configuration from environment variables
    pub fn from_env() -> AuthResult<Self> {
        let project_id = std::env::var("FIREBASE_PROJECT_ID")
            .map_err(|_| AuthError::Config("FIREBASE_PROJECT_ID is not set".to_string()))?;
        let web_api_key = std::env::var("FIREBASE_WEB_API_KEY")
            .map_err(|_| AuthError::Config("FIREBASE_WEB_API_KEY is not set".to_string()))?;

        Ok(Self {
            project_id,
            web_api_key,
            service_account_email: std::env::var("FIREBASE_CLIENT_EMAIL").ok(),
            // Keys exported from the Firebase console carry literal \n escapes.
            private_key_pem: std::env::var("FIREBASE_PRIVATE_KEY")
                .ok()
                .map(|k| k.replace("\\n", "\n")),
        })
    }
}
