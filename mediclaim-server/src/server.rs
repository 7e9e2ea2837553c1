use std::sync::Arc;

use anyhow::{Context, Result};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

use auth_firebase::{FirebaseAuthClient, FirebaseConfig, GoogleTokenVerifier, TokenVerifier};
use storage_service::{AttachmentStore, S3ObjectStore, StorageConfig};

/// Deployment environment, mirrored from `MEDICLAIM_ENV`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    pub fn from_env() -> Self {
        match std::env::var("MEDICLAIM_ENV").as_deref() {
            Ok("production") => Environment::Production,
            _ => Environment::Development,
        }
    }
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub environment: Environment,
    pub host: String,
    pub port: u16,
    /// Exact origin allowed by CORS in production; development allows any.
    pub cors_origin: Option<String>,
    /// TLS material for the production listener. Termination is delegated
    /// to the fronting proxy; the paths are carried for its provisioning.
    pub tls_cert_path: Option<String>,
    pub tls_key_path: Option<String>,
}

impl ServerConfig {
    pub fn from_env(host: String, port: u16) -> Self {
        Self {
            environment: Environment::from_env(),
            host,
            port,
            cors_origin: std::env::var("CORS_ORIGIN").ok(),
            tls_cert_path: std::env::var("TLS_CERT_PATH").ok(),
            tls_key_path: std::env::var("TLS_KEY_PATH").ok(),
        }
    }
}

/// Shared application state
///
/// Every client here is constructed once at startup and injected; request
/// handlers never build their own connections.
#[derive(Clone)]
pub struct MediClaimServer {
    pub config: ServerConfig,
    pub db_pool: PgPool,
    pub attachments: AttachmentStore,
    pub verifier: Arc<dyn TokenVerifier>,
    pub firebase: Arc<FirebaseAuthClient>,
}

impl MediClaimServer {
    /// Build the full production state from the environment.
    pub async fn new(config: ServerConfig) -> Result<Self> {
        let database_url =
            std::env::var("DATABASE_URL").context("DATABASE_URL is not set")?;
        let db_pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(&database_url)
            .await
            .context("Failed to connect to the database")?;
        info!("Database pool ready");

        let storage_config = StorageConfig::from_env()?;
        let object_store = Arc::new(S3ObjectStore::connect(&storage_config).await?);
        let attachments = AttachmentStore::new(
            object_store,
            storage_config.max_upload_bytes,
            storage_config.presign_ttl_secs,
        );

        let firebase_config = FirebaseConfig::from_env()?;
        let http = reqwest::Client::new();
        let verifier: Arc<dyn TokenVerifier> = Arc::new(GoogleTokenVerifier::new(
            firebase_config.project_id.clone(),
            http.clone(),
        ));
        let firebase = Arc::new(FirebaseAuthClient::new(firebase_config, http));

        Ok(Self {
            config,
            db_pool,
            attachments,
            verifier,
            firebase,
        })
    }

    /// Assemble state from pre-built parts (tests inject doubles here).
    pub fn with_parts(
        config: ServerConfig,
        db_pool: PgPool,
        attachments: AttachmentStore,
        verifier: Arc<dyn TokenVerifier>,
        firebase: Arc<FirebaseAuthClient>,
    ) -> Self {
        Self {
            config,
            db_pool,
            attachments,
            verifier,
            firebase,
        }
    }

    /// Close long-lived resources on shutdown.
    pub async fn close(&self) {
        self.db_pool.close().await;
        info!("Database pool closed");
    }
}
