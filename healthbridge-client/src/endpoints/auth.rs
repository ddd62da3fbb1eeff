use tracing::info;

use crate::client::ApiClient;
use crate::config::Service;
use crate::error::Result;
use crate::models::{Ack, Credentials, LoginResponse, OrgRegistration, Registration};

impl ApiClient {
    /// Registers a patient account.
    pub async fn register(&self, registration: &Registration) -> Result<Ack> {
        info!("Registering account for {}", registration.email);
        self.post(Service::Patient, "/register", registration).await
    }

    pub async fn login(&self, credentials: &Credentials) -> Result<LoginResponse> {
        info!("Logging in {}", credentials.email);
        self.post(Service::Patient, "/login", credentials).await
    }

    /// Creates an organization together with its admin account.
    pub async fn register_org(&self, registration: &OrgRegistration) -> Result<Ack> {
        info!("Registering organization {}", registration.org_name);
        self.post(Service::Patient, "/org/register", registration)
            .await
    }
}
