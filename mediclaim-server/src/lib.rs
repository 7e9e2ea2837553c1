//! MediClaim API server
//!
//! REST backend for the medical billing frontend: doctors, patients,
//! insurance companies, web users and roles, and payment letters, with
//! document uploads held in S3-compatible object storage and identity
//! handled by Firebase.

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod server;
pub mod utils;

pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use server::{Environment, MediClaimServer, ServerConfig};
