use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/api";
pub const DEFAULT_BEARER_TOKEN: &str = "valid_token";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// The two backends the front-end talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Service {
    Patient,
    Ai,
}

impl Service {
    pub const ALL: [Service; 2] = [Service::Patient, Service::Ai];

    pub fn name(&self) -> &'static str {
        match self {
            Service::Patient => "patient",
            Service::Ai => "ai",
        }
    }
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Base URLs and credentials for both services.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub patient_service_url: String,
    pub ai_service_url: String,
    /// Static token sent on every request; there is no session renewal.
    pub bearer_token: String,
    pub timeout: Duration,
}

impl ClientConfig {
    pub fn new(patient_service_url: impl Into<String>, ai_service_url: impl Into<String>) -> Self {
        Self {
            patient_service_url: normalize_base(patient_service_url.into()),
            ai_service_url: normalize_base(ai_service_url.into()),
            bearer_token: DEFAULT_BEARER_TOKEN.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Reads `PATIENT_SERVICE_URL`, `AI_SERVICE_URL`, `HEALTHBRIDGE_API_TOKEN`
    /// and `HEALTHBRIDGE_HTTP_TIMEOUT_SECS`, falling back to local defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let patient = lookup("PATIENT_SERVICE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let ai = lookup("AI_SERVICE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let mut config = Self::new(patient, ai);
        if let Some(token) = lookup("HEALTHBRIDGE_API_TOKEN").filter(|t| !t.trim().is_empty()) {
            config.bearer_token = token;
        }
        if let Some(secs) = lookup("HEALTHBRIDGE_HTTP_TIMEOUT_SECS").and_then(|v| v.parse().ok()) {
            config.timeout = Duration::from_secs(secs);
        }
        config
    }

    pub fn with_bearer_token(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = token.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn base_url(&self, service: Service) -> &str {
        match service {
            Service::Patient => &self.patient_service_url,
            Service::Ai => &self.ai_service_url,
        }
    }

    pub fn url(&self, service: Service, path: &str) -> String {
        format!("{}{}", self.base_url(service), path)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL, DEFAULT_BASE_URL)
    }
}

fn normalize_base(url: String) -> String {
    url.trim().trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults_when_environment_is_empty() {
        let config = ClientConfig::from_lookup(|_| None);
        assert_eq!(config.base_url(Service::Patient), DEFAULT_BASE_URL);
        assert_eq!(config.base_url(Service::Ai), DEFAULT_BASE_URL);
        assert_eq!(config.bearer_token, "valid_token");
        assert_eq!(config.timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_environment_overrides() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("PATIENT_SERVICE_URL", "http://patients.local/api/"),
            ("AI_SERVICE_URL", "http://ai.local/api"),
            ("HEALTHBRIDGE_API_TOKEN", "secret"),
            ("HEALTHBRIDGE_HTTP_TIMEOUT_SECS", "5"),
        ]);
        let config = ClientConfig::from_lookup(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(
            config.url(Service::Patient, "/medications"),
            "http://patients.local/api/medications"
        );
        assert_eq!(config.url(Service::Ai, "/health"), "http://ai.local/api/health");
        assert_eq!(config.bearer_token, "secret");
        assert_eq!(config.timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_blank_token_keeps_default() {
        let config = ClientConfig::from_lookup(|key| {
            (key == "HEALTHBRIDGE_API_TOKEN").then(|| "  ".to_string())
        });
        assert_eq!(config.bearer_token, DEFAULT_BEARER_TOKEN);
    }
}
