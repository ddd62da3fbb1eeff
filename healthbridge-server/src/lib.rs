//! In-memory HealthBridge backend: the patient service (accounts,
//! organizations, appointments, medications, documents) and the AI service
//! (note analysis, prescription scans, interaction checks, coaching) behind
//! one axum router.

pub mod auth;
pub mod config;
pub mod demo;
pub mod error;
pub mod handlers;
pub mod models;
pub mod service;
pub mod store;
pub mod telemetry;

pub use config::{LogFormat, ServerConfig};
pub use error::{ApiError, ApiResult};
pub use service::{AppState, build_router, create_app};
