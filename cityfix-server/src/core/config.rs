use std::path::PathBuf;

use crate::auth::{JwtConfig, JwtError};

/// Database file name inside `WORK_DIR`
pub const DATABASE_FILE: &str = "cityfix.redb";

/// Server configuration
///
/// # Environment variables
///
/// | Variable | Default | Meaning |
/// |----------|---------|---------|
/// | WORK_DIR | ./data | Directory holding the redb file |
/// | HTTP_PORT | 3000 | HTTP port |
/// | ENVIRONMENT | development | development / staging / production |
/// | LOG_LEVEL | info | Default log filter (`RUST_LOG` wins when set) |
/// | LOG_JSON | false | JSON log lines |
/// | LOG_DIR | (unset) | Daily rolling log files when the directory exists |
/// | FREE_ISSUE_LIMIT | 3 | Issues a non-premium citizen may hold |
/// | PAYMENT_WEBHOOK_SECRET | (unset) | Shared secret of the payment webhook |
/// | ADMIN_SUBJECTS | (unset) | Comma-separated subjects made admin at startup |
/// | REQUEST_TIMEOUT_MS | 30000 | Per-request timeout |
/// | SHUTDOWN_TIMEOUT_MS | 10000 | Graceful shutdown grace period |
/// | JWT_SECRET / JWT_ISSUER / JWT_AUDIENCE | | Identity-provider token settings |
///
/// # Example
///
/// ```ignore
/// WORK_DIR=/var/lib/cityfix HTTP_PORT=8080 cargo run -p cityfix-server
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    pub work_dir: String,
    pub http_port: u16,
    pub jwt: JwtConfig,
    /// development | staging | production
    pub environment: String,
    pub log_level: String,
    pub log_json: bool,
    pub log_dir: Option<String>,
    pub free_issue_limit: usize,
    /// Payment webhooks are refused while unset
    pub payment_webhook_secret: Option<String>,
    /// Seeded as admins on every start
    pub admin_subjects: Vec<String>,
    pub request_timeout_ms: u64,
    pub shutdown_timeout_ms: u64,
}

impl Config {
    /// Load from environment variables, with defaults for unset ones
    pub fn from_env() -> Result<Self, JwtError> {
        let jwt = JwtConfig::from_env()?;
        Ok(Self::from_env_with_jwt(jwt))
    }

    fn from_env_with_jwt(jwt: JwtConfig) -> Self {
        Self {
            work_dir: std::env::var("WORK_DIR").unwrap_or_else(|_| "./data".into()),
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            jwt,
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_json: std::env::var("LOG_JSON")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            log_dir: std::env::var("LOG_DIR").ok().filter(|d| !d.is_empty()),
            free_issue_limit: std::env::var("FREE_ISSUE_LIMIT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3),
            payment_webhook_secret: std::env::var("PAYMENT_WEBHOOK_SECRET")
                .ok()
                .filter(|s| !s.is_empty()),
            admin_subjects: std::env::var("ADMIN_SUBJECTS")
                .map(|v| parse_subject_list(&v))
                .unwrap_or_default(),
            request_timeout_ms: std::env::var("REQUEST_TIMEOUT_MS")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(30000),
            shutdown_timeout_ms: std::env::var("SHUTDOWN_TIMEOUT_MS")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(10000),
        }
    }

    /// Override the parts tests care about
    ///
    /// The JWT secret is given explicitly so tests never depend on
    /// `JWT_SECRET`.
    pub fn with_overrides(
        work_dir: impl Into<String>,
        http_port: u16,
        jwt_secret: impl Into<String>,
    ) -> Self {
        let mut config = Self::from_env_with_jwt(JwtConfig::with_secret(jwt_secret));
        config.work_dir = work_dir.into();
        config.http_port = http_port;
        config
    }

    pub fn database_path(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join(DATABASE_FILE)
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

/// `"a@x, b@x,,a@x"` -> `["a@x", "b@x"]`
fn parse_subject_list(value: &str) -> Vec<String> {
    let mut subjects: Vec<String> = Vec::new();
    for subject in value.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        if !subjects.iter().any(|s| s == subject) {
            subjects.push(subject.to_string());
        }
    }
    subjects
}
