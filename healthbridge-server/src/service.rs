use axum::{
    Router,
    body::Body,
    extract::DefaultBodyLimit,
    http::{HeaderValue, Request},
    middleware::{Next, from_fn},
    response::Response,
    routing::{delete, get, post, put},
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::Instrument;
use uuid::Uuid;

use crate::auth::{GrantRegistry, PasswordHasher};
use crate::config::ServerConfig;
use crate::error::{ApiError, ApiResult};
use crate::handlers::{accounts, ai, care, doctor, documents, health, org, patient};
use crate::store::Store;

const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;
pub const CORRELATION_ID_HEADER: &str = "x-correlation-id";

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<Store>,
    pub grants: Arc<GrantRegistry>,
    pub hasher: PasswordHasher,
    /// Hash of a random secret, checked when no account matches so a miss
    /// costs the same PBKDF2 work as a wrong password.
    decoy_hash: Arc<str>,
}

impl AppState {
    pub fn new(config: &ServerConfig) -> Self {
        Self {
            store: Arc::new(Store::new()),
            grants: Arc::new(GrantRegistry::new(config.grant_ttl)),
            hasher: PasswordHasher::new(config.password_iterations),
            decoy_hash: Arc::from(random_decoy_hash(config.password_iterations)),
        }
    }

    /// PBKDF2 runs on the blocking pool.
    pub async fn hash_password(&self, password: &str) -> ApiResult<String> {
        let hasher = self.hasher;
        let password = password.to_string();
        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| ApiError::Internal(format!("password hashing failed: {}", e)))
    }

    pub async fn verify_password(&self, password: &str, stored: &str) -> ApiResult<bool> {
        let hasher = self.hasher;
        let (password, stored) = (password.to_string(), stored.to_string());
        tokio::task::spawn_blocking(move || hasher.verify(&password, &stored))
            .await
            .map_err(|e| ApiError::Internal(format!("password check failed: {}", e)))
    }

    /// Verifies against `stored`, or against the decoy hash when there is no
    /// account; the latter is always `false`.
    pub async fn verify_account_password(
        &self,
        password: &str,
        stored: Option<&str>,
    ) -> ApiResult<bool> {
        match stored {
            Some(stored) => self.verify_password(password, stored).await,
            None => {
                self.verify_password(password, &self.decoy_hash).await?;
                Ok(false)
            }
        }
    }
}

fn random_decoy_hash(iterations: u32) -> String {
    PasswordHasher::new(iterations).hash(&Uuid::new_v4().to_string())
}

pub fn create_app(config: &ServerConfig) -> Router {
    build_router(AppState::new(config))
}

pub fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route("/", get(health::root))
        .nest("/api", api_routes())
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .layer(from_fn(correlation_id))
        .with_state(app_state)
}

/// Runs each request inside a span tagged with its correlation id. A caller
/// supplied id is kept, otherwise one is generated; either way it is echoed
/// on the response.
async fn correlation_id(mut request: Request<Body>, next: Next) -> Response {
    let incoming = request
        .headers()
        .get(CORRELATION_ID_HEADER)
        .filter(|value| !value.is_empty())
        .cloned();
    let header = match incoming {
        Some(value) => value,
        None => match HeaderValue::from_str(&Uuid::new_v4().to_string()) {
            Ok(value) => value,
            Err(_) => return next.run(request).await,
        },
    };
    request
        .headers_mut()
        .insert(CORRELATION_ID_HEADER, header.clone());

    let span = tracing::info_span!(
        "http_request",
        correlation_id = %header.to_str().unwrap_or_default()
    );
    let mut response = next.run(request).instrument(span).await;
    response.headers_mut().insert(CORRELATION_ID_HEADER, header);
    response
}

fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(health::root))
        .route("/health", get(health::consolidated))
        .route("/patient/health", get(health::patient))
        .route("/ai/health", get(health::ai))
        .route("/clinical/health", get(health::clinical))
        // accounts
        .route("/register", post(accounts::register))
        .route("/login", post(accounts::login))
        .route("/org/register", post(accounts::register_org))
        // organization console
        .route("/org/doctors", post(org::add_doctor).get(org::list_doctors))
        .route(
            "/org/doctors/{id}",
            put(org::update_doctor).delete(org::delete_doctor),
        )
        .route(
            "/org/appointments",
            get(org::list_appointments).post(org::create_appointment),
        )
        .route("/org/appointments/{id}", put(org::update_appointment))
        // doctor portal
        .route("/doctor/appointments", get(doctor::appointments))
        .route("/doctor/appointments/{id}/complete", put(doctor::complete))
        .route("/doctor/patients/{name}/history", get(doctor::history))
        // patient portal
        .route("/doctors", get(patient::directory))
        .route(
            "/patient/appointments",
            get(patient::appointments).post(patient::book),
        )
        .route("/patient/appointments/{id}/cancel", put(patient::cancel))
        .route("/patient/profile", put(patient::update_profile))
        // medications, adherence, audit
        .route(
            "/medications",
            get(care::list_medications).post(care::add_medication),
        )
        .route("/medications/{id}", delete(care::delete_medication))
        .route("/adherence", post(care::log_adherence))
        .route("/audit-log", get(care::audit_log))
        // clinical AI
        .route("/analyze-note", post(ai::analyze_note))
        .route("/scan-prescription", post(ai::scan_prescription))
        .route("/check-interactions", post(ai::check_interactions))
        .route("/de-identify", post(ai::de_identify))
        .route("/generate-coaching", post(ai::generate_coaching))
        // documents
        .route("/documents", get(documents::list).post(documents::upload))
        .route("/documents/{id}", get(documents::fetch))
        .route("/documents/{id}/unlock", post(documents::unlock))
}
