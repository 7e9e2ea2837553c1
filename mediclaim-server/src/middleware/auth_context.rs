//! Authentication and authorization middleware
//!
//! Two stages, both fail closed with 403:
//! 1. `require_auth` — validates the `Bearer <token>` header shape before
//!    any network call, verifies the token with the identity provider, and
//!    attaches the decoded claims to the request.
//! 2. `role_gate` — loads the caller's web user (joined with role) by
//!    subject id and denies unless the role is in the permitted set.

use std::collections::HashSet;

use async_trait::async_trait;
use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};

use auth_firebase::{role_allowed, Claims};

use crate::error::ApiError;
use crate::server::MediClaimServer;

/// Identity attached to the request after token verification.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub uid: String,
    pub email: Option<String>,
    pub claims: Claims,
}

impl AuthContext {
    fn from_claims(claims: Claims) -> Self {
        Self {
            uid: claims.uid().to_string(),
            email: claims.email.clone(),
            claims,
        }
    }
}

/// Extract the token from an `Authorization: Bearer <token>` header.
///
/// A missing header, a different scheme, or an empty token all fail here,
/// before any call to the identity provider.
fn bearer_token(headers: &HeaderMap) -> Result<&str, ApiError> {
    let header = headers
        .get(AUTHORIZATION)
        .ok_or_else(|| ApiError::authentication("Authorization header is missing"))?;

    let value = header
        .to_str()
        .map_err(|_| ApiError::authentication("Malformed Authorization header"))?;

    let token = value
        .strip_prefix("Bearer ")
        .ok_or_else(|| ApiError::authentication("Expected: Bearer <token>"))?;

    if token.is_empty() {
        return Err(ApiError::authentication("Token is missing"));
    }

    Ok(token)
}

/// Token verification middleware for protected route groups.
pub async fn require_auth(
    State(server): State<MediClaimServer>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer_token(request.headers())?.to_string();

    let claims = server
        .verifier
        .verify_id_token(&token)
        .await
        .map_err(|e| ApiError::authentication(e.to_string()))?;

    request
        .extensions_mut()
        .insert(AuthContext::from_claims(claims));

    Ok(next.run(request).await)
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthContext
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthContext>()
            .cloned()
            .ok_or_else(|| ApiError::authentication("Request is not authenticated"))
    }
}

/// Deny unless the caller's application role is in `permitted`.
///
/// The decision itself is `auth_firebase::role_allowed`; this wrapper only
/// resolves the caller's web user record. No record means deny.
pub async fn role_gate(
    server: &MediClaimServer,
    auth: &AuthContext,
    permitted: &HashSet<i32>,
) -> Result<(), ApiError> {
    let role_id: Option<i32> = sqlx::query_scalar(
        "SELECT role_id FROM web_users WHERE uid = $1",
    )
    .bind(&auth.uid)
    .fetch_optional(&server.db_pool)
    .await?
    .flatten();

    if role_allowed(role_id, permitted) {
        Ok(())
    } else {
        Err(ApiError::authorization("Role not permitted for this route"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers_with(value: Option<&str>) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if let Some(v) = value {
            headers.insert(AUTHORIZATION, v.parse().unwrap());
        }
        headers
    }

    #[test]
    fn missing_header_fails_closed() {
        assert!(bearer_token(&headers_with(None)).is_err());
    }

    #[test]
    fn empty_token_fails_closed() {
        assert!(bearer_token(&headers_with(Some("Bearer "))).is_err());
    }

    #[test]
    fn wrong_scheme_fails_closed() {
        assert!(bearer_token(&headers_with(Some("Basic abc"))).is_err());
    }

    #[test]
    fn well_formed_header_yields_token() {
        let headers = headers_with(Some("Bearer tok-123"));
        assert_eq!(bearer_token(&headers).unwrap(), "tok-123");
    }
}
