use std::time::Duration;

pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_GRANT_TTL_SECS: u64 = 300;
pub const DEFAULT_PASSWORD_ITERATIONS: u32 = 100_000;

/// Output format of the tracing subscriber, from `LOG_FORMAT`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Json,
    Pretty,
}

impl LogFormat {
    /// `pretty` (any case) selects human-readable output; anything else is JSON.
    pub fn parse(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("pretty") {
            Self::Pretty
        } else {
            Self::Json
        }
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    /// Lifetime of a document grant issued by `/documents/{id}/unlock`.
    pub grant_ttl: Duration,
    pub password_iterations: u32,
    pub log_format: LogFormat,
}

impl ServerConfig {
    /// Reads `PORT`, `DOCUMENT_GRANT_TTL_SECS`, `PASSWORD_HASH_ITERATIONS`
    /// and `LOG_FORMAT`.
    /// Unparseable values fall back to the defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Self {
            port: lookup("PORT")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.port),
            grant_ttl: lookup("DOCUMENT_GRANT_TTL_SECS")
                .and_then(|v| v.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.grant_ttl),
            password_iterations: lookup("PASSWORD_HASH_ITERATIONS")
                .and_then(|v| v.parse().ok())
                .filter(|n| *n > 0)
                .unwrap_or(defaults.password_iterations),
            log_format: lookup("LOG_FORMAT")
                .map(|v| LogFormat::parse(&v))
                .unwrap_or(defaults.log_format),
        }
    }

    /// Cheap hashing and a short grant lifetime, for tests.
    pub fn for_tests() -> Self {
        Self {
            port: 0,
            grant_ttl: Duration::from_secs(60),
            password_iterations: 1_000,
            log_format: LogFormat::Pretty,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            grant_ttl: Duration::from_secs(DEFAULT_GRANT_TTL_SECS),
            password_iterations: DEFAULT_PASSWORD_ITERATIONS,
            log_format: LogFormat::Json,
        }
    }
}
