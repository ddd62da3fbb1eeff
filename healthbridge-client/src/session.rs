use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;
use uuid::Uuid;

use crate::error::{ClientError, Result};
use crate::models::User;
use crate::shell::{Dashboard, Tab};

/// The signed-in user plus the navigation state of the shell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub user: User,
    pub active_tab: Tab,
    pub started_at: DateTime<Utc>,
}

impl Session {
    pub fn new(user: User) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user,
            active_tab: Tab::default(),
            started_at: Utc::now(),
        }
    }

    pub fn dashboard(&self) -> Dashboard {
        Dashboard::for_role(self.user.role)
    }
}

/// Holds at most one live session. `begin` replaces any previous session and
/// `end` tears it down.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn begin(&self, user: User) -> Session;
    async fn current(&self) -> Option<Session>;
    async fn set_active_tab(&self, tab: Tab) -> Result<()>;
    async fn end(&self) -> Option<Session>;
}

/// Session store living for the lifetime of the process.
#[derive(Clone, Default)]
pub struct InMemorySessionStore {
    current: Arc<RwLock<Option<Session>>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn begin(&self, user: User) -> Session {
        let session = Session::new(user);
        info!(
            session_id = %session.id,
            user_id = session.user.user_id,
            role = %session.user.role,
            "Session started"
        );
        *self.current.write().await = Some(session.clone());
        session
    }

    async fn current(&self) -> Option<Session> {
        self.current.read().await.clone()
    }

    async fn set_active_tab(&self, tab: Tab) -> Result<()> {
        let mut guard = self.current.write().await;
        let session = guard
            .as_mut()
            .ok_or_else(|| ClientError::validation("Not signed in"))?;
        session.active_tab = tab;
        Ok(())
    }

    async fn end(&self) -> Option<Session> {
        let ended = self.current.write().await.take();
        if let Some(session) = &ended {
            info!(session_id = %session.id, "Session ended");
        }
        ended
    }
}
