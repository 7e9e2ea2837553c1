//! Upload validation at the HTTP boundary
//!
//! These exercise the multipart endpoints up to (but not including) the
//! database write: required-field and file-size failures must answer 400
//! before any row would be touched.

mod common;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use tower::ServiceExt;

use common::{test_app, GOOD_TOKEN};

const BOUNDARY: &str = "test-boundary";

fn text_part(name: &str, value: &str) -> Vec<u8> {
    format!(
        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
    )
    .into_bytes()
}

fn file_part(name: &str, filename: &str, bytes: &[u8]) -> Vec<u8> {
    let mut part = format!(
        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; \
         filename=\"{filename}\"\r\nContent-Type: application/pdf\r\n\r\n"
    )
    .into_bytes();
    part.extend_from_slice(bytes);
    part.extend_from_slice(b"\r\n");
    part
}

fn multipart_post(path: &str, parts: Vec<Vec<u8>>) -> Request<Body> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(&part);
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri(path)
        .header(header::AUTHORIZATION, format!("Bearer {GOOD_TOKEN}"))
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

async fn error_body(response: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), 4096).await.unwrap();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn payment_letter_without_file_is_400() {
    let request = multipart_post(
        "/api/paymentLetters/invoice",
        vec![
            text_part("letter_number", "PL-001"),
            text_part("doctor_id", "1"),
            text_part("insurance_id", "1"),
            text_part("patient_id", "1"),
            text_part("service_date", "2024-03-05"),
        ],
    );

    let response = test_app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = error_body(response).await;
    assert!(json["error"].as_str().unwrap().contains("No file"));
}

#[tokio::test]
async fn doctor_form_without_uid_is_400() {
    let request = multipart_post(
        "/api/users/doctors/doctorForm",
        vec![
            text_part("first_name", "Laura"),
            file_part("urlIne", "ine.pdf", b"%PDF-1.4 tiny"),
        ],
    );

    let response = test_app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = error_body(response).await;
    assert!(json["error"].as_str().unwrap().contains("uid"));
}

#[tokio::test]
async fn oversized_document_is_400() {
    let big = vec![0u8; 11 * 1024 * 1024];
    let request = multipart_post(
        "/api/users/doctors/doctorForm",
        vec![
            text_part("uid", "uid-1"),
            file_part("urlIne", "ine.pdf", &big),
        ],
    );

    let response = test_app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn bad_integer_field_is_400() {
    let request = multipart_post(
        "/api/paymentLetters/invoice",
        vec![
            text_part("doctor_id", "not-a-number"),
            file_part("urlFile", "letter.pdf", b"%PDF-1.4 tiny"),
        ],
    );

    let response = test_app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
