use rand::Rng;
use serde::Serialize;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, interval_at};
use tracing::{debug, error};

use crate::client::ApiClient;
use crate::models::AuditEntry;

pub const TICK_PERIOD: Duration = Duration::from_secs(5);

/// Display-only activity counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Stats {
    pub total_patients: u64,
    pub notes_analyzed: u64,
    pub prescriptions_scanned: u64,
    pub interactions_checked: u64,
}

impl Default for Stats {
    fn default() -> Self {
        Self {
            total_patients: 156,
            notes_analyzed: 1247,
            prescriptions_scanned: 892,
            interactions_checked: 534,
        }
    }
}

impl Stats {
    fn bump(&mut self, notes: u64, interactions: u64) {
        self.notes_analyzed += notes;
        self.interactions_checked += interactions;
    }
}

/// Background task nudging the counters every [`TICK_PERIOD`]. The task is
/// aborted on [`StatsTicker::stop`] or when the ticker is dropped.
pub struct StatsTicker {
    stats: watch::Receiver<Stats>,
    handle: Option<JoinHandle<()>>,
}

impl StatsTicker {
    pub fn start(initial: Stats) -> Self {
        Self::with_period(initial, TICK_PERIOD)
    }

    pub fn with_period(initial: Stats, period: Duration) -> Self {
        let (tx, rx) = watch::channel(initial);
        let handle = tokio::spawn(async move {
            let mut ticks = interval_at(Instant::now() + period, period);
            loop {
                ticks.tick().await;
                let (notes, interactions) = {
                    let mut rng = rand::rng();
                    (rng.random_range(0..=1), rng.random_range(0..=1))
                };
                tx.send_modify(|stats| stats.bump(notes, interactions));
                if tx.is_closed() {
                    break;
                }
            }
        });
        Self {
            stats: rx,
            handle: Some(handle),
        }
    }

    pub fn current(&self) -> Stats {
        *self.stats.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<Stats> {
        self.stats.clone()
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            debug!("Stats ticker stopped");
        }
    }
}

impl Drop for StatsTicker {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Executive overview: live counters plus the audit log.
pub struct Overview {
    client: ApiClient,
    ticker: StatsTicker,
    pub audit_logs: Vec<AuditEntry>,
}

impl Overview {
    /// Must be called inside a tokio runtime; starts the ticker.
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            ticker: StatsTicker::start(Stats::default()),
            audit_logs: Vec::new(),
        }
    }

    pub fn stats(&self) -> Stats {
        self.ticker.current()
    }

    /// Failures are logged and leave the previous entries in place.
    pub async fn fetch_audit_logs(&mut self) {
        match self.client.get_audit_logs().await {
            Ok(entries) => self.audit_logs = entries,
            Err(e) => error!("Failed to fetch audit logs: {}", e),
        }
    }

    pub fn stop(&mut self) {
        self.ticker.stop();
    }
}
