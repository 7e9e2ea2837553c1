//! Account endpoints: login, sign-up, and user lookup
//!
//! Login does not check the password itself; it resolves the account and
//! mints a custom token the client exchanges with the identity provider.
//! Failed logins answer 401 — the only 401 in the API; everything behind
//! the token middleware fails with 403 instead.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{ApiError, ApiResult};
use crate::server::MediClaimServer;

#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub uid: String,
    pub email: Option<String>,
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub uid: String,
    pub email: Option<String>,
}

pub async fn login(
    State(server): State<MediClaimServer>,
    Json(body): Json<CredentialsRequest>,
) -> ApiResult<Json<SessionResponse>> {
    let user = server
        .firebase
        .get_user_by_email(&body.email)
        .await
        .map_err(|e| ApiError::credentials(e.to_string()))?;

    let token = server
        .firebase
        .create_custom_token(&user.uid)
        .map_err(|e| ApiError::credentials(e.to_string()))?;

    info!(uid = %user.uid, "Login succeeded");
    Ok(Json(SessionResponse {
        uid: user.uid,
        email: user.email,
        token,
    }))
}

pub async fn signup(
    State(server): State<MediClaimServer>,
    Json(body): Json<CredentialsRequest>,
) -> ApiResult<(StatusCode, Json<SessionResponse>)> {
    let user = server.firebase.create_user(&body.email, &body.password).await?;
    let token = server.firebase.create_custom_token(&user.uid)?;

    info!(uid = %user.uid, "Account created");
    Ok((
        StatusCode::CREATED,
        Json(SessionResponse {
            uid: user.uid,
            email: user.email,
            token,
        }),
    ))
}

pub async fn get_user(
    State(server): State<MediClaimServer>,
    Path(uid): Path<String>,
) -> ApiResult<Json<UserResponse>> {
    // Any lookup failure reads as "no such user" here; a provider outage
    // is indistinguishable from a bad uid to this endpoint's consumers.
    let user = server
        .firebase
        .get_user(&uid)
        .await
        .map_err(|_| ApiError::not_found(format!("User {uid}")))?;
    Ok(Json(UserResponse {
        uid: user.uid,
        email: user.email,
    }))
}
