use chrono::Utc;
use std::collections::HashMap;
use tracing::{info, warn};

use crate::client::ApiClient;
use crate::error::{ClientError, Result};
use crate::models::{Document, DocumentGrant, UnlockRequest};
use crate::transport::UploadFile;

use super::record;

/// Personal document vault. Each document must be unlocked with the owner's
/// password before it can be opened; the service checks the resulting grant
/// on every fetch, so the grants held here only spare repeated prompts.
pub struct DocumentVault {
    client: ApiClient,
    user_id: i64,
    pub documents: Vec<Document>,
    grants: HashMap<String, DocumentGrant>,
    pub error: Option<String>,
}

impl DocumentVault {
    pub fn new(client: ApiClient, user_id: i64) -> Self {
        Self {
            client,
            user_id,
            documents: Vec::new(),
            grants: HashMap::new(),
            error: None,
        }
    }

    pub async fn load(&mut self) -> Result<()> {
        self.error = None;
        let fetched = self.client.get_documents(self.user_id).await;
        self.documents = record(&mut self.error, fetched)?;
        Ok(())
    }

    pub async fn upload(&mut self, file: UploadFile) -> Result<()> {
        self.error = None;
        let uploaded = self.client.upload_document(self.user_id, file).await;
        record(&mut self.error, uploaded)?;
        self.load().await
    }

    /// True while a live grant is held for `document_id`.
    pub fn is_unlocked(&self, document_id: &str) -> bool {
        self.grants
            .get(document_id)
            .is_some_and(|grant| !grant.is_expired_at(Utc::now()))
    }

    pub async fn unlock(&mut self, document_id: &str, password: &str) -> Result<()> {
        self.error = None;
        if password.is_empty() {
            let err = ClientError::validation("Password is required to unlock this document.");
            return record(&mut self.error, Err(err));
        }

        let request = UnlockRequest {
            user_id: self.user_id,
            password: password.to_string(),
        };
        let unlocked = self
            .client
            .unlock_document(document_id, &request)
            .await
            .map_err(|e| match e.status() {
                Some(status @ (401 | 403)) => ClientError::Api {
                    status,
                    message: "Incorrect password".to_string(),
                },
                _ => e,
            });
        let grant = record(&mut self.error, unlocked)?;
        info!(document_id, "Document unlocked");
        self.grants.insert(document_id.to_string(), grant);
        Ok(())
    }

    /// Fetches the document content with the held grant. A rejected grant is
    /// dropped so the next attempt prompts for the password again.
    pub async fn open(&mut self, document_id: &str) -> Result<Vec<u8>> {
        self.error = None;
        let grant = match self.grants.get(document_id) {
            Some(grant) if !grant.is_expired_at(Utc::now()) => grant.clone(),
            _ => {
                self.grants.remove(document_id);
                let err = ClientError::validation("Document is locked. Unlock it with your password first.");
                return record(&mut self.error, Err(err));
            }
        };

        let fetched = self.client.fetch_document(&grant).await;
        if let Err(e) = &fetched {
            if matches!(e.status(), Some(401 | 403)) {
                warn!(document_id, "Document grant rejected, locking again");
                self.grants.remove(document_id);
            }
        }
        record(&mut self.error, fetched)
    }
}
