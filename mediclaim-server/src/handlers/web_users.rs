//! Web user endpoints
//!
//! Web users are the back-office accounts. Each carries at most one
//! document (urlFile) and an optional role; responses always ship the role
//! record resolved, since the frontend gates its menus on it.

use std::collections::HashMap;

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use tracing::info;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::models::{Role, WebUser, WebUserWithRole};
use crate::server::MediClaimServer;
use crate::utils::forms::FormData;
use crate::utils::sql::UpdateSet;

async fn resolve_role(server: &MediClaimServer, role_id: Option<i32>) -> ApiResult<Option<Role>> {
    let Some(role_id) = role_id else {
        return Ok(None);
    };
    let role = sqlx::query_as("SELECT * FROM roles WHERE role_id = $1")
        .bind(role_id)
        .fetch_optional(&server.db_pool)
        .await?;
    Ok(role)
}

async fn with_role(server: &MediClaimServer, mut user: WebUser) -> ApiResult<WebUserWithRole> {
    user.url_file = server.attachments.presign_opt(user.url_file.take()).await?;
    let role = resolve_role(server, user.role_id).await?;
    Ok(WebUserWithRole { user, role })
}

pub async fn list_web_users(
    State(server): State<MediClaimServer>,
) -> ApiResult<Json<Vec<WebUserWithRole>>> {
    let users: Vec<WebUser> = sqlx::query_as("SELECT * FROM web_users ORDER BY web_user_id")
        .fetch_all(&server.db_pool)
        .await?;

    let roles: Vec<Role> = sqlx::query_as("SELECT * FROM roles")
        .fetch_all(&server.db_pool)
        .await?;
    let roles: HashMap<i32, Role> = roles.into_iter().map(|r| (r.role_id, r)).collect();

    let mut out = Vec::with_capacity(users.len());
    for mut user in users {
        user.url_file = server.attachments.presign_opt(user.url_file.take()).await?;
        let role = user.role_id.and_then(|id| roles.get(&id).cloned());
        out.push(WebUserWithRole { user, role });
    }

    Ok(Json(out))
}

/// Lookup by auth uid, used right after login to load the caller's profile.
pub async fn get_web_user_by_uid(
    State(server): State<MediClaimServer>,
    Path(uid): Path<String>,
) -> ApiResult<Json<WebUserWithRole>> {
    let user: WebUser = sqlx::query_as("SELECT * FROM web_users WHERE uid = $1 LIMIT 1")
        .bind(&uid)
        .fetch_optional(&server.db_pool)
        .await?
        .ok_or_else(|| ApiError::not_found("Web user"))?;

    Ok(Json(with_role(&server, user).await?))
}

pub async fn get_web_user(
    State(server): State<MediClaimServer>,
    Path(id): Path<i32>,
) -> ApiResult<Json<WebUserWithRole>> {
    let user: WebUser = sqlx::query_as("SELECT * FROM web_users WHERE web_user_id = $1")
        .bind(id)
        .fetch_optional(&server.db_pool)
        .await?
        .ok_or_else(|| ApiError::not_found("Web user"))?;

    Ok(Json(with_role(&server, user).await?))
}

/// Create from a multipart form with an optional urlFile document.
///
/// The upload happens before the account row exists, so the file is
/// namespaced under a fresh random owner id rather than the record id.
pub async fn create_web_user(
    State(server): State<MediClaimServer>,
    multipart: Multipart,
) -> ApiResult<Json<WebUserWithRole>> {
    let form = FormData::collect(multipart).await?;

    let file_key = match form.file("urlFile") {
        Some(file) => Some(
            server
                .attachments
                .store(file, &Uuid::new_v4().to_string())
                .await?,
        ),
        None => None,
    };

    let user: WebUser = sqlx::query_as(
        "INSERT INTO web_users (first_name, last_name, contact_number, email, uid, is_active, \
         url_file, role_id) VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING *",
    )
    .bind(form.text("first_name"))
    .bind(form.text("last_name"))
    .bind(form.text("contact_number"))
    .bind(form.text("email"))
    .bind(form.text("uid"))
    .bind(form.bool_field("isActive"))
    .bind(file_key)
    .bind(form.i32_field("roleId")?)
    .fetch_one(&server.db_pool)
    .await?;

    info!(web_user_id = user.web_user_id, "Web user created");
    Ok(Json(with_role(&server, user).await?))
}

/// Partial update; the edit form sends the role as `role_id`, unlike the
/// create form's `roleId`. A replacement document is namespaced by the
/// path id.
pub async fn update_web_user(
    State(server): State<MediClaimServer>,
    Path(id): Path<i32>,
    multipart: Multipart,
) -> ApiResult<Json<WebUserWithRole>> {
    let form = FormData::collect(multipart).await?;

    let mut update = UpdateSet::new("web_users");
    update.set_opt("first_name", form.text("first_name").map(str::to_string));
    update.set_opt("last_name", form.text("last_name").map(str::to_string));
    update.set_opt(
        "contact_number",
        form.text("contact_number").map(str::to_string),
    );
    update.set_opt("email", form.text("email").map(str::to_string));
    update.set_opt("uid", form.text("uid").map(str::to_string));
    update.set_opt("is_active", form.bool_field("isActive"));
    update.set_opt("role_id", form.i32_field("role_id")?);

    if let Some(file) = form.file("urlFile") {
        let key = server.attachments.store(file, &id.to_string()).await?;
        update.set("url_file", key);
    }

    let user: WebUser = if update.is_empty() {
        sqlx::query_as("SELECT * FROM web_users WHERE web_user_id = $1")
            .bind(id)
            .fetch_one(&server.db_pool)
            .await?
    } else {
        update
            .finish("web_user_id", id)
            .build_query_as()
            .fetch_one(&server.db_pool)
            .await?
    };

    info!(web_user_id = id, "Web user updated");
    Ok(Json(with_role(&server, user).await?))
}

pub async fn delete_web_user(
    State(server): State<MediClaimServer>,
    Path(id): Path<i32>,
) -> ApiResult<StatusCode> {
    let result = sqlx::query("DELETE FROM web_users WHERE web_user_id = $1")
        .bind(id)
        .execute(&server.db_pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::not_found("Web user"));
    }

    info!(web_user_id = id, "Web user deleted");
    Ok(StatusCode::NO_CONTENT)
}
