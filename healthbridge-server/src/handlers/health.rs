use axum::Json;
use chrono::Utc;
use serde_json::{Value, json};

pub async fn root() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "message": "HealthBridge AI API is running"
    }))
}

fn healthy(service: &str) -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": service,
        "timestamp": Utc::now().to_rfc3339()
    }))
}

pub async fn consolidated() -> Json<Value> {
    healthy("consolidated-api")
}

pub async fn patient() -> Json<Value> {
    healthy("patient")
}

pub async fn ai() -> Json<Value> {
    healthy("ai")
}

pub async fn clinical() -> Json<Value> {
    healthy("clinical")
}
