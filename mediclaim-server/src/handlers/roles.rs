//! Role catalog endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use tracing::info;

use crate::error::{ApiError, ApiResult};
use crate::models::Role;
use crate::server::MediClaimServer;

pub async fn list_roles(State(server): State<MediClaimServer>) -> ApiResult<Json<Vec<Role>>> {
    let roles = sqlx::query_as("SELECT * FROM roles ORDER BY role_id")
        .fetch_all(&server.db_pool)
        .await?;
    Ok(Json(roles))
}

#[derive(Debug, Deserialize)]
pub struct RoleRequest {
    pub role_name: Option<String>,
    pub description: Option<String>,
}

pub async fn create_role(
    State(server): State<MediClaimServer>,
    Json(body): Json<RoleRequest>,
) -> ApiResult<Json<Role>> {
    let role: Role = sqlx::query_as(
        "INSERT INTO roles (role_name, description) VALUES ($1, $2) RETURNING *",
    )
    .bind(&body.role_name)
    .bind(&body.description)
    .fetch_one(&server.db_pool)
    .await?;

    info!(role_id = role.role_id, "Role created");
    Ok(Json(role))
}

pub async fn get_role(
    State(server): State<MediClaimServer>,
    Path(id): Path<i32>,
) -> ApiResult<Json<Role>> {
    let role = sqlx::query_as("SELECT * FROM roles WHERE role_id = $1")
        .bind(id)
        .fetch_optional(&server.db_pool)
        .await?
        .ok_or_else(|| ApiError::not_found("Role"))?;
    Ok(Json(role))
}

/// Both fields are written unconditionally; the role form always submits
/// the complete record.
pub async fn update_role(
    State(server): State<MediClaimServer>,
    Path(id): Path<i32>,
    Json(body): Json<RoleRequest>,
) -> ApiResult<Json<Role>> {
    let role: Role = sqlx::query_as(
        "UPDATE roles SET role_name = $1, description = $2 WHERE role_id = $3 RETURNING *",
    )
    .bind(&body.role_name)
    .bind(&body.description)
    .bind(id)
    .fetch_one(&server.db_pool)
    .await?;

    info!(role_id = id, "Role updated");
    Ok(Json(role))
}

pub async fn delete_role(
    State(server): State<MediClaimServer>,
    Path(id): Path<i32>,
) -> ApiResult<StatusCode> {
    let result = sqlx::query("DELETE FROM roles WHERE role_id = $1")
        .bind(id)
        .execute(&server.db_pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::not_found("Role"));
    }

    info!(role_id = id, "Role deleted");
    Ok(StatusCode::NO_CONTENT)
}
