//! Database entities and response shapes
//!
//! Columns are snake_case in Postgres; the serde renames preserve the JSON
//! field names the web frontend already binds to. Attachment columns hold
//! storage keys at rest — handlers swap them for presigned URLs on the way
//! out, so a key never leaves the API.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Doctor {
    pub doctor_id: i32,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub specialty: Option<String>,
    pub contact_number: Option<String>,
    pub email: Option<String>,
    pub clinic_address: Option<String>,
    #[serde(rename = "isActive")]
    pub is_active: Option<bool>,
    pub uid: Option<String>,
    #[serde(rename = "urlIne")]
    pub url_ine: Option<String>,
    #[serde(rename = "urlCedula")]
    pub url_cedula: Option<String>,
    #[serde(rename = "urlConstancia")]
    pub url_constancia: Option<String>,
    #[serde(rename = "urlBanco")]
    pub url_banco: Option<String>,
    #[serde(rename = "urlDomicilio")]
    pub url_domicilio: Option<String>,
}

/// The five document slots a doctor record carries, in upload field order.
pub const DOCTOR_FILE_SLOTS: [&str; 5] = [
    "urlIne",
    "urlCedula",
    "urlConstancia",
    "urlBanco",
    "urlDomicilio",
];

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Patient {
    pub patient_id: i32,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub date_of_birth: Option<DateTime<Utc>>,
    pub contact_number: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct InsuranceCompany {
    pub insurance_id: i32,
    pub company_name: Option<String>,
    pub contact_number: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Role {
    pub role_id: i32,
    pub role_name: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct WebUser {
    #[serde(rename = "webUser_id")]
    pub web_user_id: i32,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub contact_number: Option<String>,
    pub email: Option<String>,
    pub uid: Option<String>,
    #[serde(rename = "isActive")]
    pub is_active: Option<bool>,
    #[serde(rename = "urlFile")]
    pub url_file: Option<String>,
    #[serde(rename = "roleId")]
    pub role_id: Option<i32>,
}

/// Web user with its role resolved, as the frontend consumes it.
#[derive(Debug, Clone, Serialize)]
pub struct WebUserWithRole {
    #[serde(flatten)]
    pub user: WebUser,
    pub role: Option<Role>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PaymentLetter {
    pub payment_letter_id: i32,
    pub letter_number: Option<String>,
    pub doctor_id: i32,
    pub insurance_id: i32,
    pub patient_id: i32,
    pub service_date: DateTime<Utc>,
    pub status: Option<String>,
    pub total_commission: Option<Decimal>,
    #[serde(rename = "urlFile")]
    pub url_file: Option<String>,
}

/// Payment letter joined with the three records it references.
#[derive(Debug, Clone, Serialize)]
pub struct PaymentLetterWithRelations {
    #[serde(flatten)]
    pub letter: PaymentLetter,
    pub doctor: Option<Doctor>,
    #[serde(rename = "insuranceCompany")]
    pub insurance_company: Option<InsuranceCompany>,
    pub patient: Option<Patient>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn web_user_serializes_with_frontend_field_names() {
        let user = WebUser {
            web_user_id: 3,
            first_name: Some("Ana".into()),
            last_name: None,
            contact_number: None,
            email: Some("ana@clinic.mx".into()),
            uid: Some("uid-1".into()),
            is_active: Some(true),
            url_file: Some("https://signed.example/doc".into()),
            role_id: Some(2),
        };
        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["webUser_id"], 3);
        assert_eq!(json["isActive"], true);
        assert_eq!(json["roleId"], 2);
        assert_eq!(json["urlFile"], "https://signed.example/doc");
    }

    #[test]
    fn joined_web_user_flattens_role_alongside_columns() {
        let resp = WebUserWithRole {
            user: WebUser {
                web_user_id: 1,
                first_name: None,
                last_name: None,
                contact_number: None,
                email: None,
                uid: None,
                is_active: None,
                url_file: None,
                role_id: Some(1),
            },
            role: Some(Role {
                role_id: 1,
                role_name: Some("admin".into()),
                description: None,
            }),
        };
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["webUser_id"], 1);
        assert_eq!(json["role"]["role_name"], "admin");
    }

    #[test]
    fn payment_letter_embeds_relations_under_prisma_names() {
        let resp = PaymentLetterWithRelations {
            letter: PaymentLetter {
                payment_letter_id: 9,
                letter_number: Some("PL-009".into()),
                doctor_id: 1,
                insurance_id: 2,
                patient_id: 3,
                service_date: "2024-03-05T00:00:00Z".parse().unwrap(),
                status: Some("pending".into()),
                total_commission: Some("150.50".parse().unwrap()),
                url_file: None,
            },
            doctor: None,
            insurance_company: Some(InsuranceCompany {
                insurance_id: 2,
                company_name: Some("GNP".into()),
                contact_number: None,
                email: None,
                address: None,
            }),
            patient: None,
        };
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["payment_letter_id"], 9);
        assert_eq!(json["insuranceCompany"]["company_name"], "GNP");
        assert!(json["doctor"].is_null());
    }
}
