use axum::Json;
use serde_json::{json, Value};

/// Greeting the frontend pings to check the API is up.
pub async fn root() -> &'static str {
    "Hola, mundo!"
}

pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": "mediclaim-server",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
