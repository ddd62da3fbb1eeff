//! Personal document vault. Content is only served against a grant issued
//! by `unlock`, checked on every fetch.

use axum::{
    Json,
    extract::{
        Multipart, Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::{HeaderMap, HeaderValue, header},
    response::{IntoResponse, Response},
};
use chrono::Utc;
use serde::Deserialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::DocumentGrant;
use crate::error::{ApiError, ApiResult};
use crate::models::{Ack, DocumentRecord, DocumentSummary, UnlockRequest};
use crate::service::AppState;

pub const DOCUMENT_TOKEN_HEADER: &str = "x-document-token";

#[derive(Debug, Deserialize)]
pub struct OwnerQuery {
    pub user_id: i64,
}

pub async fn list(
    State(state): State<AppState>,
    query: Result<Query<OwnerQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<DocumentSummary>>> {
    let Query(query) = query?;
    let documents = state
        .store
        .documents_of(query.user_id)
        .iter()
        .map(DocumentSummary::from)
        .collect();
    Ok(Json(documents))
}

/// Multipart with fields `file` and `user_id`.
pub async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<Json<Ack>> {
    let mut file = None;
    let mut user_id = None;
    while let Some(field) = multipart.next_field().await? {
        match field.name() {
            Some("file") => {
                let filename = field.file_name().unwrap_or("document").to_string();
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let bytes = field.bytes().await?;
                file = Some((filename, content_type, bytes.to_vec()));
            }
            Some("user_id") => {
                let text = field.text().await?;
                user_id = Some(
                    text.trim()
                        .parse::<i64>()
                        .map_err(|_| ApiError::unprocessable("user_id must be an integer"))?,
                );
            }
            _ => {}
        }
    }

    let (Some((filename, content_type, bytes)), Some(user_id)) = (file, user_id) else {
        return Err(ApiError::unprocessable("Fields 'file' and 'user_id' are required"));
    };
    if state.store.user(user_id).is_none() {
        return Err(ApiError::not_found("User not found"));
    }

    let document = DocumentRecord {
        id: Uuid::new_v4().to_string(),
        user_id,
        filename,
        content_type,
        bytes,
        uploaded_at: Utc::now(),
    };
    info!(document_id = %document.id, user_id, size = document.bytes.len(), "Document stored");
    state.store.add_document(document);
    Ok(Json(Ack::with("Document uploaded")))
}

/// Checks the owner's password and issues a short-lived grant for this document.
pub async fn unlock(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<UnlockRequest>, JsonRejection>,
) -> ApiResult<Json<DocumentGrant>> {
    let Json(request) = payload?;
    let document = state
        .store
        .document(&id)
        .ok_or_else(|| ApiError::not_found("Document not found"))?;

    let owner = state
        .store
        .user(document.user_id)
        .filter(|owner| owner.id == request.user_id);
    let verified = state
        .verify_account_password(
            &request.password,
            owner.as_ref().map(|owner| owner.password_hash.as_str()),
        )
        .await?;
    if !verified {
        warn!(document_id = %id, user_id = request.user_id, "Document unlock refused");
        return Err(ApiError::unauthorized("Incorrect password"));
    }

    Ok(Json(state.grants.issue(&id)))
}

pub async fn fetch(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> ApiResult<Response> {
    let token = headers
        .get(DOCUMENT_TOKEN_HEADER)
        .and_then(|value| value.to_str().ok());
    state.grants.check(token, &id)?;

    let document = state
        .store
        .document(&id)
        .ok_or_else(|| ApiError::not_found("Document not found"))?;

    let content_type = HeaderValue::from_str(&document.content_type)
        .unwrap_or_else(|_| HeaderValue::from_static("application/octet-stream"));
    let disposition = HeaderValue::from_str(&format!(
        "inline; filename=\"{}\"",
        document.filename.replace('"', "")
    ))
    .unwrap_or_else(|_| HeaderValue::from_static("inline"));

    Ok((
        [
            (header::CONTENT_TYPE, content_type),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        document.bytes,
    )
        .into_response())
}
