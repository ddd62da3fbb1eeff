use tracing::info;

use crate::client::ApiClient;
use crate::error::{ClientError, Result};
use crate::models::{Credentials, OrgRegistration, Registration, User};

use super::record;

/// Landing page: sign in, or register and then sign in.
pub struct AuthFlow {
    client: ApiClient,
    pub error: Option<String>,
}

impl AuthFlow {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            error: None,
        }
    }

    pub async fn login(&mut self, email: &str, password: &str) -> Result<User> {
        self.error = None;
        let result = self.sign_in(email, password).await;
        record(&mut self.error, result)
    }

    /// Creates a patient account and signs it in.
    pub async fn register_patient(
        &mut self,
        full_name: &str,
        email: &str,
        password: &str,
    ) -> Result<User> {
        self.error = None;
        let registration = Registration {
            email: email.to_string(),
            password: password.to_string(),
            full_name: (!full_name.trim().is_empty()).then(|| full_name.trim().to_string()),
        };
        let result = async {
            require_credentials(email, password)?;
            self.client.register(&registration).await?;
            self.sign_in(email, password).await
        }
        .await;
        record(&mut self.error, result)
    }

    /// Creates an organization with its admin and signs the admin in.
    pub async fn register_organization(
        &mut self,
        org_name: &str,
        admin_name: &str,
        email: &str,
        password: &str,
    ) -> Result<User> {
        self.error = None;
        let registration = OrgRegistration {
            org_name: org_name.trim().to_string(),
            admin_email: email.to_string(),
            admin_password: password.to_string(),
            admin_name: admin_name.trim().to_string(),
        };
        let result = async {
            require_credentials(email, password)?;
            if registration.org_name.is_empty() {
                return Err(ClientError::validation("Organization name is required."));
            }
            self.client.register_org(&registration).await?;
            self.sign_in(email, password).await
        }
        .await;
        record(&mut self.error, result)
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<User> {
        require_credentials(email, password)?;
        let credentials = Credentials {
            email: email.to_string(),
            password: password.to_string(),
        };
        let login = self.client.login(&credentials).await?;
        info!("Signed in {} as {}", login.user_name, login.role);
        Ok(User::from_login(email, login))
    }
}

fn require_credentials(email: &str, password: &str) -> Result<()> {
    if email.trim().is_empty() || password.is_empty() {
        return Err(ClientError::validation("Email and password are required."));
    }
    Ok(())
}
