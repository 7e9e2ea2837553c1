//! Object storage for MediClaim Engine
//!
//! Provides the document storage used by doctors, web users, and payment
//! letters:
//! - S3-compatible object store (AWS or MinIO) behind the `ObjectStore` trait
//! - Attachment workflow: per-owner key derivation, upload size limits,
//!   time-limited presigned read URLs
//!
//! Records persist the storage *key*, never a URL. A URL only exists
//! transiently in an API response, regenerated on every read.

pub mod attachments;
pub mod config;
pub mod error;
pub mod store;

pub use attachments::*;
pub use config::*;
pub use error::*;
pub use store::*;
