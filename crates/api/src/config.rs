use crate::auth::jwt::JwtConfig;

/// How many service records a detail response embeds. `None` = all of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryLimits {
    pub member: Option<u32>,
    pub employee: Option<u32>,
}

impl Default for HistoryLimits {
    fn default() -> Self {
        Self {
            member: None,
            employee: Some(DEFAULT_EMPLOYEE_HISTORY_LIMIT),
        }
    }
}

/// Default number of service records embedded in an employee detail.
pub const DEFAULT_EMPLOYEE_HISTORY_LIMIT: u32 = 10;

/// Default number of attempts to create an entity when its code collides.
pub const DEFAULT_CODE_RETRY_ATTEMPTS: u32 = 3;

/// Server configuration loaded from environment variables.
///
/// All fields except the JWT secret have defaults suitable for local
/// development. In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3001`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// JWT token configuration (secret, expiry).
    pub jwt: JwtConfig,
    /// Service-record history embedded in detail responses.
    pub history: HistoryLimits,
    /// Attempts per create before a code collision surfaces as `409`.
    pub code_retry_attempts: u32,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                  | Default                    |
    /// |--------------------------|----------------------------|
    /// | `HOST`                   | `0.0.0.0`                  |
    /// | `PORT`                   | `3001`                     |
    /// | `CORS_ORIGINS`           | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS`   | `30`                       |
    /// | `MEMBER_HISTORY_LIMIT`   | unbounded                  |
    /// | `EMPLOYEE_HISTORY_LIMIT` | `10`                       |
    /// | `CODE_RETRY_ATTEMPTS`    | `3`                        |
    ///
    /// History limits accept `unbounded` to embed every record.
    ///
    /// # Panics
    ///
    /// Panics on malformed values and when `JWT_SECRET` is missing.
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3001".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let history = HistoryLimits {
            member: history_limit("MEMBER_HISTORY_LIMIT", None),
            employee: history_limit(
                "EMPLOYEE_HISTORY_LIMIT",
                Some(DEFAULT_EMPLOYEE_HISTORY_LIMIT),
            ),
        };

        let code_retry_attempts: u32 = std::env::var("CODE_RETRY_ATTEMPTS")
            .unwrap_or_else(|_| DEFAULT_CODE_RETRY_ATTEMPTS.to_string())
            .parse()
            .expect("CODE_RETRY_ATTEMPTS must be a valid u32");
        assert!(code_retry_attempts > 0, "CODE_RETRY_ATTEMPTS must be at least 1");

        let jwt = JwtConfig::from_env();

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            jwt,
            history,
            code_retry_attempts,
        }
    }
}

fn history_limit(var: &str, default: Option<u32>) -> Option<u32> {
    match std::env::var(var) {
        Err(_) => default,
        Ok(raw) => parse_history_limit(&raw)
            .unwrap_or_else(|| panic!("{var} must be a positive integer or `unbounded`")),
    }
}

/// `unbounded` → `Some(None)`, positive integer → `Some(Some(n))`, else `None`.
fn parse_history_limit(raw: &str) -> Option<Option<u32>> {
    let raw = raw.trim();
    if raw.eq_ignore_ascii_case("unbounded") {
        return Some(None);
    }
    raw.parse::<u32>().ok().filter(|n| *n > 0).map(Some)
}
