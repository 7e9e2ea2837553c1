use serde::{Deserialize, Serialize};

/// Decoded ID token claims attached to a verified request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Firebase subject id (`uid`).
    pub sub: String,
    pub aud: String,
    pub iss: String,
    pub exp: i64,
    pub iat: i64,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub email_verified: Option<bool>,
    /// Custom claims the project may have set on the account.
    #[serde(flatten)]
    pub custom: serde_json::Map<String, serde_json::Value>,
}

impl Claims {
    pub fn uid(&self) -> &str {
        &self.sub
    }
}

/// Provider-side account record, as much of it as the API exposes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    pub uid: String,
    pub email: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn claims_capture_custom_entries() {
        let claims: Claims = serde_json::from_str(
            r#"{
                "sub": "abc123",
                "aud": "mediclaim-a6331",
                "iss": "https://securetoken.google.com/mediclaim-a6331",
                "exp": 1900000000,
                "iat": 1899996400,
                "email": "doc@example.com",
                "role": "admin"
            }"#,
        )
        .unwrap();

        assert_eq!(claims.uid(), "abc123");
        assert_eq!(claims.email.as_deref(), Some("doc@example.com"));
        assert_eq!(
            claims.custom.get("role").and_then(|v| v.as_str()),
            Some("admin")
        );
    }
}
