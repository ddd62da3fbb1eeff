use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::models::{
    Ack, LoginRequest, LoginResponse, NewUser, OrgRegisterRequest, RegisterRequest, Role,
};
use crate::service::AppState;

/// Self-registration always creates a patient.
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> ApiResult<Json<Ack>> {
    let Json(request) = payload?;
    require_credentials(&request.email, &request.password)?;
    if state.store.user_by_email(&request.email).is_some() {
        return Err(ApiError::bad_request("Email already registered"));
    }

    let password_hash = state.hash_password(&request.password).await?;
    let user = state.store.create_user(NewUser {
        email: request.email.trim().to_string(),
        password_hash,
        full_name: request.full_name.filter(|n| !n.trim().is_empty()),
        role: Role::Patient,
        organization_id: None,
        specialization: None,
        availability: None,
    })?;

    info!(user_id = user.id, "Patient registered");
    Ok(Json(Ack::with("User registered successfully")))
}

pub async fn register_org(
    State(state): State<AppState>,
    payload: Result<Json<OrgRegisterRequest>, JsonRejection>,
) -> ApiResult<Json<Ack>> {
    let Json(request) = payload?;
    let org_name = request.org_name.trim();
    if org_name.is_empty() {
        return Err(ApiError::bad_request("Organization name is required"));
    }
    require_credentials(&request.admin_email, &request.admin_password)?;

    let password_hash = state.hash_password(&request.admin_password).await?;
    let admin = NewUser {
        email: request.admin_email.trim().to_string(),
        password_hash,
        full_name: Some(request.admin_name.trim().to_string()).filter(|n| !n.is_empty()),
        role: Role::OrgAdmin,
        organization_id: None,
        specialization: None,
        availability: None,
    };
    state.store.create_organization(org_name, admin)?;

    Ok(Json(Ack::with("Organization and Admin registered")))
}

pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<Json<LoginResponse>> {
    let Json(request) = payload?;
    let invalid = || ApiError::bad_request("Invalid email or password");

    let user = state.store.user_by_email(&request.email);
    let verified = state
        .verify_account_password(
            &request.password,
            user.as_ref().map(|user| user.password_hash.as_str()),
        )
        .await?;
    let Some(user) = user.filter(|_| verified) else {
        warn!("Rejected login");
        return Err(invalid());
    };

    let organization_name = user
        .organization_id
        .and_then(|id| state.store.organization(id))
        .map(|org| org.name);

    info!(user_id = user.id, role = ?user.role, "Login");
    Ok(Json(LoginResponse {
        access_token: Uuid::new_v4().to_string(),
        token_type: "bearer",
        user_name: user.display_name(),
        user_id: user.id,
        role: user.role,
        organization_name,
        organization_id: user.organization_id,
    }))
}

fn require_credentials(email: &str, password: &str) -> ApiResult<()> {
    if email.trim().is_empty() || password.is_empty() {
        return Err(ApiError::bad_request("Email and password are required"));
    }
    Ok(())
}
