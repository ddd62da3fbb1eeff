use reqwest::Method;
use tracing::info;

use crate::client::ApiClient;
use crate::config::Service;
use crate::error::Result;
use crate::models::{Ack, Document, DocumentGrant, UnlockRequest};
use crate::transport::{MultipartForm, RequestBody, UploadFile};

use super::encode;

/// Header carrying a [`DocumentGrant`] token on document fetches.
pub const DOCUMENT_TOKEN_HEADER: &str = "X-Document-Token";

impl ApiClient {
    pub async fn get_documents(&self, user_id: i64) -> Result<Vec<Document>> {
        self.get(Service::Ai, &format!("/documents?user_id={}", user_id))
            .await
    }

    pub async fn upload_document(&self, user_id: i64, file: UploadFile) -> Result<Ack> {
        info!("Uploading document {} for user {}", file.filename, user_id);
        let form = MultipartForm::new()
            .file("file", file)
            .text("user_id", user_id.to_string());
        self.post_multipart(Service::Ai, "/documents", form).await
    }

    /// Verifies the owner's password server-side and obtains a grant for one document.
    pub async fn unlock_document(
        &self,
        document_id: &str,
        request: &UnlockRequest,
    ) -> Result<DocumentGrant> {
        let path = format!("/documents/{}/unlock", encode(document_id));
        self.post(Service::Ai, &path, request).await
    }

    /// Raw document content. The service re-checks the grant on every call.
    pub async fn fetch_document(&self, grant: &DocumentGrant) -> Result<Vec<u8>> {
        let path = format!("/documents/{}", encode(&grant.document_id));
        let request = self
            .prepare(Service::Ai, Method::GET, &path, RequestBody::Empty)
            .with_header(DOCUMENT_TOKEN_HEADER, grant.access_token.clone());
        let response = self.dispatch(request).await?;
        Ok(response.body)
    }
}
