//! Multipart form handling
//!
//! The attachment endpoints take `multipart/form-data` with a mix of text
//! fields and named file fields. Which entity slot an upload lands in is
//! decided purely by the field name, never by content inspection.

use std::collections::HashMap;

use axum::extract::Multipart;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;

use storage_service::UploadedFile;

use crate::error::{ApiError, ApiResult};

/// A fully buffered multipart form: text fields and uploaded files by name.
#[derive(Debug, Default)]
pub struct FormData {
    fields: HashMap<String, String>,
    files: HashMap<String, UploadedFile>,
}

impl FormData {
    /// Drain an axum `Multipart` into memory.
    pub async fn collect(mut multipart: Multipart) -> ApiResult<Self> {
        let mut form = FormData::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| ApiError::bad_request(format!("Invalid multipart body: {e}")))?
        {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };

            match field.file_name().map(str::to_string) {
                Some(file_name) => {
                    let content_type = field
                        .content_type()
                        .unwrap_or("application/octet-stream")
                        .to_string();
                    let bytes = field
                        .bytes()
                        .await
                        .map_err(|e| ApiError::bad_request(format!("Failed to read file: {e}")))?;
                    form.files.insert(
                        name,
                        UploadedFile {
                            name: file_name,
                            content_type,
                            bytes: bytes.to_vec(),
                        },
                    );
                }
                None => {
                    let value = field
                        .text()
                        .await
                        .map_err(|e| ApiError::bad_request(format!("Failed to read field: {e}")))?;
                    form.fields.insert(name, value);
                }
            }
        }

        Ok(form)
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    pub fn file(&self, name: &str) -> Option<&UploadedFile> {
        self.files.get(name)
    }

    /// Text field that must be present.
    pub fn require_text(&self, name: &str) -> ApiResult<&str> {
        self.text(name)
            .ok_or_else(|| ApiError::validation(format!("{name} is required")))
    }

    /// Boolean fields arrive as the strings "true"/"false".
    pub fn bool_field(&self, name: &str) -> Option<bool> {
        self.text(name).map(|v| v == "true")
    }

    pub fn i32_field(&self, name: &str) -> ApiResult<Option<i32>> {
        self.text(name)
            .map(|v| {
                v.parse::<i32>()
                    .map_err(|_| ApiError::validation(format!("{name} must be an integer")))
            })
            .transpose()
    }

    pub fn decimal_field(&self, name: &str) -> ApiResult<Option<Decimal>> {
        self.text(name)
            .map(|v| {
                v.parse::<Decimal>()
                    .map_err(|_| ApiError::validation(format!("{name} must be a number")))
            })
            .transpose()
    }

    pub fn date_field(&self, name: &str) -> ApiResult<Option<DateTime<Utc>>> {
        self.text(name).map(|v| parse_date(name, v)).transpose()
    }
}

/// Parse an RFC 3339 timestamp, or a bare `YYYY-MM-DD` date at UTC midnight.
pub fn parse_date(name: &str, value: &str) -> ApiResult<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        if let Some(dt) = date.and_hms_opt(0, 0, 0) {
            return Ok(dt.and_utc());
        }
    }
    Err(ApiError::validation(format!("{name} must be a date")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_dates_and_timestamps() {
        let d = parse_date("service_date", "2024-03-05").unwrap();
        assert_eq!(d.to_rfc3339(), "2024-03-05T00:00:00+00:00");

        let t = parse_date("service_date", "2024-03-05T10:30:00Z").unwrap();
        assert_eq!(t.to_rfc3339(), "2024-03-05T10:30:00+00:00");
    }

    #[test]
    fn rejects_garbage_dates() {
        assert!(parse_date("service_date", "yesterday").is_err());
    }
}
