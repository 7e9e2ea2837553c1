//! Patient endpoints
//!
//! Patients carry no attachments and, deliberately, no delete route:
//! records referenced by payment letters stay on file.

use axum::{
    extract::{Multipart, Path, State},
    Json,
};
use serde::Deserialize;
use tracing::info;

use crate::error::{ApiError, ApiResult};
use crate::models::Patient;
use crate::server::MediClaimServer;
use crate::utils::forms::{parse_date, FormData};
use crate::utils::sql::UpdateSet;

pub async fn list_patients(
    State(server): State<MediClaimServer>,
) -> ApiResult<Json<Vec<Patient>>> {
    let patients = sqlx::query_as("SELECT * FROM patients ORDER BY patient_id")
        .fetch_all(&server.db_pool)
        .await?;
    Ok(Json(patients))
}

#[derive(Debug, Deserialize)]
pub struct CreatePatientRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub date_of_birth: String,
    pub contact_number: Option<String>,
    pub email: Option<String>,
}

pub async fn create_patient(
    State(server): State<MediClaimServer>,
    Json(body): Json<CreatePatientRequest>,
) -> ApiResult<Json<Patient>> {
    let date_of_birth = parse_date("date_of_birth", &body.date_of_birth)?;

    let patient: Patient = sqlx::query_as(
        "INSERT INTO patients (first_name, last_name, date_of_birth, contact_number, email) \
         VALUES ($1, $2, $3, $4, $5) RETURNING *",
    )
    .bind(&body.first_name)
    .bind(&body.last_name)
    .bind(date_of_birth)
    .bind(&body.contact_number)
    .bind(&body.email)
    .fetch_one(&server.db_pool)
    .await?;

    info!(patient_id = patient.patient_id, "Patient created");
    Ok(Json(patient))
}

pub async fn get_patient(
    State(server): State<MediClaimServer>,
    Path(id): Path<i32>,
) -> ApiResult<Json<Patient>> {
    let patient = sqlx::query_as("SELECT * FROM patients WHERE patient_id = $1")
        .bind(id)
        .fetch_optional(&server.db_pool)
        .await?
        .ok_or_else(|| ApiError::not_found("Patient"))?;
    Ok(Json(patient))
}

/// Partial update from a form-data body (the frontend sends its edit form
/// as multipart even without files).
pub async fn update_patient(
    State(server): State<MediClaimServer>,
    Path(id): Path<i32>,
    multipart: Multipart,
) -> ApiResult<Json<Patient>> {
    let form = FormData::collect(multipart).await?;

    let mut update = UpdateSet::new("patients");
    update.set_opt("first_name", form.text("first_name").map(str::to_string));
    update.set_opt("last_name", form.text("last_name").map(str::to_string));
    update.set_opt("date_of_birth", form.date_field("date_of_birth")?);
    update.set_opt(
        "contact_number",
        form.text("contact_number").map(str::to_string),
    );
    update.set_opt("email", form.text("email").map(str::to_string));

    let patient: Patient = if update.is_empty() {
        sqlx::query_as("SELECT * FROM patients WHERE patient_id = $1")
            .bind(id)
            .fetch_one(&server.db_pool)
            .await?
    } else {
        update
            .finish("patient_id", id)
            .build_query_as()
            .fetch_one(&server.db_pool)
            .await?
    };

    info!(patient_id = id, "Patient updated");
    Ok(Json(patient))
}
