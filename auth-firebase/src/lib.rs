//! Firebase identity provider integration for MediClaim Engine
//!
//! Provides:
//! - ID token verification against Google's securetoken JWKs
//!   (the `TokenVerifier` trait, with a static double for tests)
//! - Account flows used by the auth controller: lookup by email/uid,
//!   sign-up, and custom token minting with the service account key
//! - The pure role gate applied by the authorization middleware
//!
//! Every request is verified independently; no sessions, no refresh.

pub mod config;
pub mod error;
pub mod models;
pub mod roles;
pub mod service;
pub mod verifier;

pub use config::*;
pub use error::*;
pub use models::*;
pub use roles::*;
pub use service::*;
pub use verifier::*;
