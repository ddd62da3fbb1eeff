//! Role-based shell: picks the dashboard for the signed-in user and probes
//! both services for the status bar.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::info;

use crate::client::ApiClient;
use crate::config::Service;
use crate::error::{ClientError, Result};
use crate::models::{HealthStatus, Role, User};
use crate::session::{Session, SessionStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Dashboard {
    OrgAdmin,
    Doctor,
    Patient,
    /// Tabbed clinical workstation for any other role.
    ClinicalWorkspace,
}

impl Dashboard {
    pub fn for_role(role: Role) -> Self {
        match role {
            Role::OrgAdmin => Dashboard::OrgAdmin,
            Role::Doctor => Dashboard::Doctor,
            Role::Patient => Dashboard::Patient,
            Role::Unknown => Dashboard::ClinicalWorkspace,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Dashboard::OrgAdmin => "Organization Console",
            Dashboard::Doctor => "Doctor Portal",
            Dashboard::Patient => "Patient Portal",
            Dashboard::ClinicalWorkspace => "Clinical Workspace",
        }
    }
}

/// Tabs of the clinical workspace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tab {
    #[default]
    Overview,
    Clinical,
    Prescription,
    Interactions,
    Medications,
}

impl Tab {
    pub const ALL: [Tab; 5] = [
        Tab::Overview,
        Tab::Clinical,
        Tab::Prescription,
        Tab::Interactions,
        Tab::Medications,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            Tab::Overview => "dashboard",
            Tab::Clinical => "clinical",
            Tab::Prescription => "prescription",
            Tab::Interactions => "interactions",
            Tab::Medications => "medications",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Tab::Overview => "Executive Overview",
            Tab::Clinical => "Clinical Intelligence",
            Tab::Prescription => "Smart Scanner",
            Tab::Interactions => "Safety Guard",
            Tab::Medications => "Patient Care",
        }
    }

    /// Unknown ids fall back to the overview.
    pub fn from_id(id: &str) -> Self {
        Tab::ALL
            .into_iter()
            .find(|tab| tab.id() == id)
            .unwrap_or_default()
    }
}

impl fmt::Display for Tab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ServiceStatus {
    pub patient: HealthStatus,
    pub ai: HealthStatus,
}

/// Owns the client and the session store for one front-end instance.
#[derive(Clone)]
pub struct Shell {
    client: ApiClient,
    sessions: Arc<dyn SessionStore>,
}

impl Shell {
    pub fn new(client: ApiClient, sessions: Arc<dyn SessionStore>) -> Self {
        Self { client, sessions }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub async fn probe_services(&self) -> ServiceStatus {
        let patient = self.client.check_health(Service::Patient).await;
        let ai = self.client.check_health(Service::Ai).await;
        ServiceStatus { patient, ai }
    }

    /// Starts a session for `user` and returns the dashboard to mount.
    pub async fn enter(&self, user: User) -> (Session, Dashboard) {
        let session = self.sessions.begin(user).await;
        let dashboard = session.dashboard();
        info!("Mounting {} for {}", dashboard.title(), session.user.user_name);
        (session, dashboard)
    }

    pub async fn current(&self) -> Option<Session> {
        self.sessions.current().await
    }

    pub async fn require_session(&self) -> Result<Session> {
        self.current()
            .await
            .ok_or_else(|| ClientError::validation("Not signed in"))
    }

    pub async fn switch_tab(&self, tab: Tab) -> Result<()> {
        self.sessions.set_active_tab(tab).await
    }

    pub async fn logout(&self) -> Option<Session> {
        self.sessions.end().await
    }
}
