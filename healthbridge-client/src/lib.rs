//! Typed client for the HealthBridge patient and AI services, plus the
//! view-state controllers a front-end drives.
//!
//! ```no_run
//! use healthbridge_client::{ApiClient, Service};
//!
//! # async fn demo() -> healthbridge_client::Result<()> {
//! let client = ApiClient::from_env()?;
//! let health = client.check_health(Service::Patient).await;
//! println!("patient service: {}", health.status);
//! let meds = client.get_medications().await?;
//! println!("{} medications", meds.len());
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod endpoints;
pub mod error;
pub mod models;
pub mod session;
pub mod shell;
pub mod transport;
pub mod views;

#[cfg(test)]
mod testing;

// Re-export commonly used types
pub use client::{ApiClient, normalize_error};
pub use config::{ClientConfig, Service};
pub use endpoints::DOCUMENT_TOKEN_HEADER;
pub use error::{ClientError, Result};
pub use session::{InMemorySessionStore, Session, SessionStore};
pub use shell::{Dashboard, ServiceStatus, Shell, Tab};
pub use transport::{
    ApiRequest, HttpTransport, MultipartForm, RawResponse, ReqwestTransport, RequestBody,
    UploadFile,
};
