//! Doctor endpoints
//!
//! Doctors carry five document slots (INE, cédula, constancia, bank
//! statement, proof of address). Uploads land in object storage under the
//! doctor's namespace and only the storage key is persisted; every read
//! path swaps keys for fresh presigned URLs before responding.

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use tracing::info;

use storage_service::AttachmentStore;

use crate::error::{ApiError, ApiResult};
use crate::models::{Doctor, DOCTOR_FILE_SLOTS};
use crate::server::MediClaimServer;
use crate::utils::forms::FormData;
use crate::utils::sql::UpdateSet;

/// Upload field name -> column for the five document slots.
const SLOT_COLUMNS: [(&str, &str); 5] = [
    ("urlIne", "url_ine"),
    ("urlCedula", "url_cedula"),
    ("urlConstancia", "url_constancia"),
    ("urlBanco", "url_banco"),
    ("urlDomicilio", "url_domicilio"),
];

async fn sign_slots(attachments: &AttachmentStore, doctor: &mut Doctor) -> ApiResult<()> {
    doctor.url_ine = attachments.presign_opt(doctor.url_ine.take()).await?;
    doctor.url_cedula = attachments.presign_opt(doctor.url_cedula.take()).await?;
    doctor.url_constancia = attachments.presign_opt(doctor.url_constancia.take()).await?;
    doctor.url_banco = attachments.presign_opt(doctor.url_banco.take()).await?;
    doctor.url_domicilio = attachments.presign_opt(doctor.url_domicilio.take()).await?;
    Ok(())
}

pub async fn list_doctors(
    State(server): State<MediClaimServer>,
) -> ApiResult<Json<Vec<Doctor>>> {
    let mut doctors: Vec<Doctor> =
        sqlx::query_as("SELECT * FROM doctors ORDER BY doctor_id")
            .fetch_all(&server.db_pool)
            .await?;

    for doctor in &mut doctors {
        sign_slots(&server.attachments, doctor).await?;
    }

    Ok(Json(doctors))
}

#[derive(Debug, Deserialize)]
pub struct CreateDoctorRequest {
    pub email: Option<String>,
    #[serde(rename = "isActive")]
    pub is_active: Option<bool>,
    pub uid: Option<String>,
}

/// Minimal create used right after sign-up, before the profile form.
pub async fn create_doctor(
    State(server): State<MediClaimServer>,
    Json(body): Json<CreateDoctorRequest>,
) -> ApiResult<Json<Doctor>> {
    let doctor: Doctor = sqlx::query_as(
        "INSERT INTO doctors (email, is_active, uid) VALUES ($1, $2, $3) RETURNING *",
    )
    .bind(&body.email)
    .bind(body.is_active)
    .bind(&body.uid)
    .fetch_one(&server.db_pool)
    .await?;

    info!(doctor_id = doctor.doctor_id, "Doctor created");
    Ok(Json(doctor))
}

/// Full profile create: text fields plus up to five documents in one
/// multipart form. Files are namespaced by the doctor's auth uid, so the
/// uid field must be present before anything is uploaded.
pub async fn create_doctor_form(
    State(server): State<MediClaimServer>,
    multipart: Multipart,
) -> ApiResult<Json<Doctor>> {
    let form = FormData::collect(multipart).await?;
    let uid = form.require_text("uid")?.to_string();

    let mut slot_keys: [Option<String>; 5] = Default::default();
    for (i, slot) in DOCTOR_FILE_SLOTS.iter().enumerate() {
        if let Some(file) = form.file(slot) {
            slot_keys[i] = Some(server.attachments.store(file, &uid).await?);
        }
    }
    let [ine, cedula, constancia, banco, domicilio] = slot_keys;

    let doctor: Doctor = sqlx::query_as(
        "INSERT INTO doctors (first_name, last_name, specialty, contact_number, email, \
         clinic_address, is_active, uid, url_ine, url_cedula, url_constancia, url_banco, \
         url_domicilio) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13) RETURNING *",
    )
    .bind(form.text("first_name"))
    .bind(form.text("last_name"))
    .bind(form.text("specialty"))
    .bind(form.text("contact_number"))
    .bind(form.text("email"))
    .bind(form.text("clinic_address"))
    .bind(form.bool_field("isActive"))
    .bind(&uid)
    .bind(ine)
    .bind(cedula)
    .bind(constancia)
    .bind(banco)
    .bind(domicilio)
    .fetch_one(&server.db_pool)
    .await?;

    info!(doctor_id = doctor.doctor_id, uid = %uid, "Doctor profile created");
    Ok(Json(doctor))
}

pub async fn get_doctor(
    State(server): State<MediClaimServer>,
    Path(id): Path<i32>,
) -> ApiResult<Json<Doctor>> {
    let mut doctor: Doctor = sqlx::query_as("SELECT * FROM doctors WHERE doctor_id = $1")
        .bind(id)
        .fetch_optional(&server.db_pool)
        .await?
        .ok_or_else(|| ApiError::not_found("Doctor"))?;

    sign_slots(&server.attachments, &mut doctor).await?;
    Ok(Json(doctor))
}

pub async fn get_doctor_by_uid(
    State(server): State<MediClaimServer>,
    Path(uid): Path<String>,
) -> ApiResult<Json<Doctor>> {
    let mut doctor: Doctor =
        sqlx::query_as("SELECT * FROM doctors WHERE uid = $1 LIMIT 1")
            .bind(&uid)
            .fetch_optional(&server.db_pool)
            .await?
            .ok_or_else(|| ApiError::not_found("Doctor"))?;

    sign_slots(&server.attachments, &mut doctor).await?;
    Ok(Json(doctor))
}

/// Partial update. Only fields present in the form touch their columns;
/// replacement uploads are namespaced by the path id.
pub async fn update_doctor(
    State(server): State<MediClaimServer>,
    Path(id): Path<i32>,
    multipart: Multipart,
) -> ApiResult<Json<Doctor>> {
    let form = FormData::collect(multipart).await?;

    let mut update = UpdateSet::new("doctors");
    update.set_opt("first_name", form.text("first_name").map(str::to_string));
    update.set_opt("last_name", form.text("last_name").map(str::to_string));
    update.set_opt("specialty", form.text("specialty").map(str::to_string));
    update.set_opt(
        "contact_number",
        form.text("contact_number").map(str::to_string),
    );
    update.set_opt("email", form.text("email").map(str::to_string));
    update.set_opt(
        "clinic_address",
        form.text("clinic_address").map(str::to_string),
    );
    update.set_opt("is_active", form.bool_field("isActive"));

    let namespace = id.to_string();
    for (slot, column) in SLOT_COLUMNS {
        if let Some(file) = form.file(slot) {
            let key = server.attachments.store(file, &namespace).await?;
            update.set(column, key);
        }
    }

    let doctor: Doctor = if update.is_empty() {
        sqlx::query_as("SELECT * FROM doctors WHERE doctor_id = $1")
            .bind(id)
            .fetch_one(&server.db_pool)
            .await?
    } else {
        update
            .finish("doctor_id", id)
            .build_query_as()
            .fetch_one(&server.db_pool)
            .await?
    };

    info!(doctor_id = id, "Doctor updated");
    Ok(Json(doctor))
}

pub async fn delete_doctor(
    State(server): State<MediClaimServer>,
    Path(id): Path<i32>,
) -> ApiResult<StatusCode> {
    let result = sqlx::query("DELETE FROM doctors WHERE doctor_id = $1")
        .bind(id)
        .execute(&server.db_pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::not_found("Doctor"));
    }

    info!(doctor_id = id, "Doctor deleted");
    Ok(StatusCode::NO_CONTENT)
}
