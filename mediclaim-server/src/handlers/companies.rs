//! Insurance company endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use tracing::info;

use crate::error::{ApiError, ApiResult};
use crate::models::InsuranceCompany;
use crate::server::MediClaimServer;
use crate::utils::sql::UpdateSet;

pub async fn list_companies(
    State(server): State<MediClaimServer>,
) -> ApiResult<Json<Vec<InsuranceCompany>>> {
    let companies = sqlx::query_as("SELECT * FROM insurance_companies ORDER BY insurance_id")
        .fetch_all(&server.db_pool)
        .await?;
    Ok(Json(companies))
}

#[derive(Debug, Deserialize)]
pub struct CompanyRequest {
    pub company_name: Option<String>,
    pub contact_number: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
}

pub async fn create_company(
    State(server): State<MediClaimServer>,
    Json(body): Json<CompanyRequest>,
) -> ApiResult<Json<InsuranceCompany>> {
    let company: InsuranceCompany = sqlx::query_as(
        "INSERT INTO insurance_companies (company_name, contact_number, email, address) \
         VALUES ($1, $2, $3, $4) RETURNING *",
    )
    .bind(&body.company_name)
    .bind(&body.contact_number)
    .bind(&body.email)
    .bind(&body.address)
    .fetch_one(&server.db_pool)
    .await?;

    info!(insurance_id = company.insurance_id, "Insurance company created");
    Ok(Json(company))
}

pub async fn get_company(
    State(server): State<MediClaimServer>,
    Path(id): Path<i32>,
) -> ApiResult<Json<InsuranceCompany>> {
    let company = sqlx::query_as("SELECT * FROM insurance_companies WHERE insurance_id = $1")
        .bind(id)
        .fetch_optional(&server.db_pool)
        .await?
        .ok_or_else(|| ApiError::not_found("Insurance company"))?;
    Ok(Json(company))
}

pub async fn update_company(
    State(server): State<MediClaimServer>,
    Path(id): Path<i32>,
    Json(body): Json<CompanyRequest>,
) -> ApiResult<Json<InsuranceCompany>> {
    let mut update = UpdateSet::new("insurance_companies");
    update.set_opt("company_name", body.company_name);
    update.set_opt("contact_number", body.contact_number);
    update.set_opt("email", body.email);
    update.set_opt("address", body.address);

    let company: InsuranceCompany = if update.is_empty() {
        sqlx::query_as("SELECT * FROM insurance_companies WHERE insurance_id = $1")
            .bind(id)
            .fetch_one(&server.db_pool)
            .await?
    } else {
        update
            .finish("insurance_id", id)
            .build_query_as()
            .fetch_one(&server.db_pool)
            .await?
    };

    info!(insurance_id = id, "Insurance company updated");
    Ok(Json(company))
}

pub async fn delete_company(
    State(server): State<MediClaimServer>,
    Path(id): Path<i32>,
) -> ApiResult<StatusCode> {
    let result = sqlx::query("DELETE FROM insurance_companies WHERE insurance_id = $1")
        .bind(id)
        .execute(&server.db_pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::not_found("Insurance company"));
    }

    info!(insurance_id = id, "Insurance company deleted");
    Ok(StatusCode::NO_CONTENT)
}
