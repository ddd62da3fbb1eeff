//! Password hashing and per-document access grants.

use base64::Engine;
use base64::engine::general_purpose::STANDARD_NO_PAD as B64;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use pbkdf2::pbkdf2_hmac;
use rand::RngCore;
use serde::Serialize;
use sha2::Sha256;
use std::time::Duration;
use subtle::ConstantTimeEq;
use tracing::debug;

use crate::error::{ApiError, ApiResult};

const SALT_LENGTH: usize = 16;
const HASH_LENGTH: usize = 32;
const SCHEME: &str = "pbkdf2-sha256";

/// Salted PBKDF2-HMAC-SHA256. Stored form: `pbkdf2-sha256$<iterations>$<salt>$<hash>`.
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    iterations: u32,
}

impl PasswordHasher {
    pub fn new(iterations: u32) -> Self {
        Self { iterations }
    }

    pub fn hash(&self, password: &str) -> String {
        let mut salt = [0u8; SALT_LENGTH];
        rand::rng().fill_bytes(&mut salt);
        let digest = derive(password, &salt, self.iterations);
        format!(
            "{}${}${}${}",
            SCHEME,
            self.iterations,
            B64.encode(salt),
            B64.encode(digest)
        )
    }

    /// Iterations come from the stored hash, so hashes survive a config change.
    pub fn verify(&self, password: &str, stored: &str) -> bool {
        let mut fields = stored.split('$');
        let (Some(SCHEME), Some(iterations), Some(salt), Some(expected), None) = (
            fields.next(),
            fields.next(),
            fields.next(),
            fields.next(),
            fields.next(),
        ) else {
            return false;
        };
        let Ok(iterations) = iterations.parse::<u32>() else {
            return false;
        };
        let (Ok(salt), Ok(expected)) = (B64.decode(salt), B64.decode(expected)) else {
            return false;
        };
        let digest = derive(password, &salt, iterations);
        digest.as_slice().ct_eq(expected.as_slice()).into()
    }
}

fn derive(password: &str, salt: &[u8], iterations: u32) -> [u8; HASH_LENGTH] {
    let mut out = [0u8; HASH_LENGTH];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, iterations, &mut out);
    out
}

/// Wire form of an issued grant.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentGrant {
    pub document_id: String,
    pub access_token: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
struct GrantRecord {
    document_id: String,
    expires_at: DateTime<Utc>,
}

/// Live document grants keyed by token.
pub struct GrantRegistry {
    ttl: Duration,
    grants: DashMap<String, GrantRecord>,
}

impl GrantRegistry {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            grants: DashMap::new(),
        }
    }

    pub fn issue(&self, document_id: &str) -> DocumentGrant {
        self.purge_expired();

        let mut token = [0u8; 32];
        rand::rng().fill_bytes(&mut token);
        let access_token = base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(token);
        let ttl = chrono::Duration::from_std(self.ttl).unwrap_or(chrono::Duration::zero());
        let expires_at = Utc::now() + ttl;

        self.grants.insert(
            access_token.clone(),
            GrantRecord {
                document_id: document_id.to_string(),
                expires_at,
            },
        );
        DocumentGrant {
            document_id: document_id.to_string(),
            access_token,
            expires_at,
        }
    }

    /// Accepts only a live token issued for this exact document.
    pub fn check(&self, token: Option<&str>, document_id: &str) -> ApiResult<()> {
        let rejected = || ApiError::unauthorized("Document grant is invalid or expired");
        let token = token.filter(|t| !t.is_empty()).ok_or_else(rejected)?;

        let record = self.grants.get(token).map(|r| r.clone()).ok_or_else(rejected)?;
        if Utc::now() >= record.expires_at {
            self.grants.remove(token);
            debug!(document_id, "Expired document grant presented");
            return Err(rejected());
        }
        if record.document_id != document_id {
            return Err(rejected());
        }
        Ok(())
    }

    fn purge_expired(&self) {
        let now = Utc::now();
        self.grants.retain(|_, record| record.expires_at > now);
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.grants.len()
    }
}
