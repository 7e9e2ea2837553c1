//! Payment letter endpoints
//!
//! A payment letter is the insurer-facing claim document: it references a
//! doctor, an insurance company, and a patient, and always carries the
//! scanned letter itself. Creation therefore rejects requests without a
//! file. List and detail reads resolve the three referenced records and
//! sign the document URL; the by-doctor listing returns raw keys, matching
//! what its consumer binds to.

use std::collections::HashMap;

use axum::{
    extract::{Multipart, Path, State},
    Json,
};
use tracing::info;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::models::{Doctor, InsuranceCompany, Patient, PaymentLetter, PaymentLetterWithRelations};
use crate::server::MediClaimServer;
use crate::utils::forms::FormData;
use crate::utils::sql::UpdateSet;

/// Resolve the doctor, insurance company, and patient for each letter with
/// one query per related table.
async fn attach_relations(
    server: &MediClaimServer,
    letters: Vec<PaymentLetter>,
) -> ApiResult<Vec<PaymentLetterWithRelations>> {
    let doctor_ids: Vec<i32> = letters.iter().map(|l| l.doctor_id).collect();
    let insurance_ids: Vec<i32> = letters.iter().map(|l| l.insurance_id).collect();
    let patient_ids: Vec<i32> = letters.iter().map(|l| l.patient_id).collect();

    let doctors: Vec<Doctor> = sqlx::query_as("SELECT * FROM doctors WHERE doctor_id = ANY($1)")
        .bind(&doctor_ids)
        .fetch_all(&server.db_pool)
        .await?;
    let companies: Vec<InsuranceCompany> =
        sqlx::query_as("SELECT * FROM insurance_companies WHERE insurance_id = ANY($1)")
            .bind(&insurance_ids)
            .fetch_all(&server.db_pool)
            .await?;
    let patients: Vec<Patient> =
        sqlx::query_as("SELECT * FROM patients WHERE patient_id = ANY($1)")
            .bind(&patient_ids)
            .fetch_all(&server.db_pool)
            .await?;

    let doctors: HashMap<i32, Doctor> =
        doctors.into_iter().map(|d| (d.doctor_id, d)).collect();
    let companies: HashMap<i32, InsuranceCompany> =
        companies.into_iter().map(|c| (c.insurance_id, c)).collect();
    let patients: HashMap<i32, Patient> =
        patients.into_iter().map(|p| (p.patient_id, p)).collect();

    Ok(letters
        .into_iter()
        .map(|letter| PaymentLetterWithRelations {
            doctor: doctors.get(&letter.doctor_id).cloned(),
            insurance_company: companies.get(&letter.insurance_id).cloned(),
            patient: patients.get(&letter.patient_id).cloned(),
            letter,
        })
        .collect())
}

pub async fn list_payment_letters(
    State(server): State<MediClaimServer>,
) -> ApiResult<Json<Vec<PaymentLetterWithRelations>>> {
    let mut letters: Vec<PaymentLetter> =
        sqlx::query_as("SELECT * FROM payment_letters ORDER BY payment_letter_id")
            .fetch_all(&server.db_pool)
            .await?;

    for letter in &mut letters {
        letter.url_file = server.attachments.presign_opt(letter.url_file.take()).await?;
    }

    Ok(Json(attach_relations(&server, letters).await?))
}

/// Letters for one doctor's dashboard. Keys are returned unsigned here.
pub async fn get_payment_letters_by_doctor(
    State(server): State<MediClaimServer>,
    Path(doctor_id): Path<i32>,
) -> ApiResult<Json<Vec<PaymentLetterWithRelations>>> {
    let letters: Vec<PaymentLetter> =
        sqlx::query_as("SELECT * FROM payment_letters WHERE doctor_id = $1")
            .bind(doctor_id)
            .fetch_all(&server.db_pool)
            .await?;

    Ok(Json(attach_relations(&server, letters).await?))
}

pub async fn get_payment_letter(
    State(server): State<MediClaimServer>,
    Path(id): Path<i32>,
) -> ApiResult<Json<PaymentLetterWithRelations>> {
    let mut letter: PaymentLetter =
        sqlx::query_as("SELECT * FROM payment_letters WHERE payment_letter_id = $1")
            .bind(id)
            .fetch_optional(&server.db_pool)
            .await?
            .ok_or_else(|| ApiError::not_found("Payment letter"))?;

    letter.url_file = server.attachments.presign_opt(letter.url_file.take()).await?;

    let mut joined = attach_relations(&server, vec![letter]).await?;
    // attach_relations preserves its single input.
    let letter = joined
        .pop()
        .ok_or_else(|| ApiError::internal("relation join dropped the letter"))?;

    Ok(Json(letter))
}

/// Create a letter from a multipart form. The scanned document is
/// mandatory; without it there is nothing to claim against.
pub async fn create_payment_letter(
    State(server): State<MediClaimServer>,
    multipart: Multipart,
) -> ApiResult<Json<PaymentLetter>> {
    let form = FormData::collect(multipart).await?;

    let file = form
        .file("urlFile")
        .ok_or_else(|| ApiError::bad_request("No file was uploaded"))?;
    let file_key = server
        .attachments
        .store(file, &Uuid::new_v4().to_string())
        .await?;

    let doctor_id = form
        .i32_field("doctor_id")?
        .ok_or_else(|| ApiError::validation("doctor_id is required"))?;
    let insurance_id = form
        .i32_field("insurance_id")?
        .ok_or_else(|| ApiError::validation("insurance_id is required"))?;
    let patient_id = form
        .i32_field("patient_id")?
        .ok_or_else(|| ApiError::validation("patient_id is required"))?;
    let service_date = form
        .date_field("service_date")?
        .ok_or_else(|| ApiError::validation("service_date is required"))?;

    let letter: PaymentLetter = sqlx::query_as(
        "INSERT INTO payment_letters (letter_number, doctor_id, insurance_id, patient_id, \
         service_date, status, total_commission, url_file) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING *",
    )
    .bind(form.text("letter_number"))
    .bind(doctor_id)
    .bind(insurance_id)
    .bind(patient_id)
    .bind(service_date)
    .bind(form.text("status"))
    .bind(form.decimal_field("total_commission")?)
    .bind(file_key)
    .fetch_one(&server.db_pool)
    .await?;

    info!(
        payment_letter_id = letter.payment_letter_id,
        doctor_id, "Payment letter created"
    );
    Ok(Json(letter))
}

/// Partial update; a replacement scan is namespaced by the path id.
pub async fn update_payment_letter(
    State(server): State<MediClaimServer>,
    Path(id): Path<i32>,
    multipart: Multipart,
) -> ApiResult<Json<PaymentLetter>> {
    let form = FormData::collect(multipart).await?;

    let mut update = UpdateSet::new("payment_letters");
    update.set_opt(
        "letter_number",
        form.text("letter_number").map(str::to_string),
    );
    update.set_opt("doctor_id", form.i32_field("doctor_id")?);
    update.set_opt("insurance_id", form.i32_field("insurance_id")?);
    update.set_opt("patient_id", form.i32_field("patient_id")?);
    update.set_opt("service_date", form.date_field("service_date")?);
    update.set_opt("status", form.text("status").map(str::to_string));
    update.set_opt("total_commission", form.decimal_field("total_commission")?);

    if let Some(file) = form.file("urlFile") {
        let key = server.attachments.store(file, &id.to_string()).await?;
        update.set("url_file", key);
    }

    let letter: PaymentLetter = if update.is_empty() {
        sqlx::query_as("SELECT * FROM payment_letters WHERE payment_letter_id = $1")
            .bind(id)
            .fetch_one(&server.db_pool)
            .await?
    } else {
        update
            .finish("payment_letter_id", id)
            .build_query_as()
            .fetch_one(&server.db_pool)
            .await?
    };

    info!(payment_letter_id = id, "Payment letter updated");
    Ok(Json(letter))
}
