use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use chrono::TimeDelta;
use url::Url;

use onerecord_core::AppError;
use onerecord_core::credentials::DEFAULT_TOKEN_TTL_HOURS;

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_BCRYPT_COST: u32 = 12;
const DEFAULT_PUBLIC_DIR: &str = "public";

/// Deployment environment. Only `development` exposes error detail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
    Test,
}

impl Environment {
    pub fn is_development(&self) -> bool {
        matches!(self, Environment::Development)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Production => "production",
            Environment::Test => "test",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "production" | "prod" => Ok(Environment::Production),
            "test" => Ok(Environment::Test),
            _ => Err(format!("Unknown environment: {s}")),
        }
    }
}

/// Server settings read from `ONE_RECORD_*` environment variables.
#[derive(Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub environment: Environment,
    /// Base URL this server is reachable at; always ends with `/`
    pub public_url: Url,
    pub jwt_secret: String,
    pub token_ttl: TimeDelta,
    /// Grants access to server-wide listings (None = those endpoints disabled)
    pub server_secret: Option<String>,
    /// Expected from publishers on the callback URL (None = callbacks disabled)
    pub subscription_secret: Option<String>,
    pub bcrypt_cost: u32,
    /// Static files served for paths no route claims
    pub public_dir: PathBuf,
}

impl ServerConfig {
    /// Read configuration from the process environment.
    ///
    /// - `ONE_RECORD_JWT_SECRET` (required)
    /// - `ONE_RECORD_PORT` (default 3000)
    /// - `ONE_RECORD_ENV` (default `development`; unknown names act as `production`)
    /// - `ONE_RECORD_PUBLIC_DIR` (default `public`)
    /// - `ONE_RECORD_PUBLIC_URL` (default `http://localhost:{port}/`)
    /// - `ONE_RECORD_TOKEN_TTL_HOURS` (default 72)
    /// - `ONE_RECORD_SERVER_SECRET`, `ONE_RECORD_SUBSCRIPTION_SECRET` (optional)
    /// - `ONE_RECORD_BCRYPT_COST` (default 12)
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let port = match get("ONE_RECORD_PORT") {
            None => DEFAULT_PORT,
            Some(raw) => raw.parse::<u16>().map_err(|_| {
                AppError::ConfigError(format!("Invalid ONE_RECORD_PORT '{raw}'"))
            })?,
        };

        // Unrecognised names (staging, qa, ...) hide error detail like production.
        let environment = match get("ONE_RECORD_ENV") {
            None => Environment::Development,
            Some(raw) => raw.parse::<Environment>().unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Treating ONE_RECORD_ENV as production");
                Environment::Production
            }),
        };

        let raw_url = get("ONE_RECORD_PUBLIC_URL")
            .unwrap_or_else(|| format!("http://localhost:{port}/"));
        let public_url = parse_public_url(&raw_url)?;

        let jwt_secret = non_empty(get("ONE_RECORD_JWT_SECRET")).ok_or_else(|| {
            AppError::ConfigError("ONE_RECORD_JWT_SECRET must be set".into())
        })?;

        let token_ttl = match get("ONE_RECORD_TOKEN_TTL_HOURS") {
            None => TimeDelta::hours(DEFAULT_TOKEN_TTL_HOURS),
            Some(raw) => match raw.parse::<i64>() {
                Ok(hours) if hours > 0 => TimeDelta::hours(hours),
                _ => {
                    return Err(AppError::ConfigError(format!(
                        "Invalid ONE_RECORD_TOKEN_TTL_HOURS '{raw}': must be a positive integer"
                    )));
                }
            },
        };

        let bcrypt_cost = match get("ONE_RECORD_BCRYPT_COST") {
            None => DEFAULT_BCRYPT_COST,
            Some(raw) => match raw.parse::<u32>() {
                Ok(cost) if (4..=31).contains(&cost) => cost,
                _ => {
                    return Err(AppError::ConfigError(format!(
                        "Invalid ONE_RECORD_BCRYPT_COST '{raw}': must be between 4 and 31"
                    )));
                }
            },
        };

        Ok(Self {
            port,
            environment,
            public_url,
            jwt_secret,
            token_ttl,
            server_secret: non_empty(get("ONE_RECORD_SERVER_SECRET")),
            subscription_secret: non_empty(get("ONE_RECORD_SUBSCRIPTION_SECRET")),
            bcrypt_cost,
            public_dir: non_empty(get("ONE_RECORD_PUBLIC_DIR"))
                .map_or_else(|| PathBuf::from(DEFAULT_PUBLIC_DIR), PathBuf::from),
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Parse the public URL, forcing a trailing slash so relative joins keep the path.
fn parse_public_url(raw: &str) -> Result<Url, AppError> {
    let mut url = Url::parse(raw).map_err(|e| {
        AppError::ConfigError(format!("Invalid ONE_RECORD_PUBLIC_URL '{raw}': {e}"))
    })?;

    match url.scheme() {
        "http" | "https" => {}
        scheme => {
            return Err(AppError::ConfigError(format!(
                "ONE_RECORD_PUBLIC_URL scheme '{scheme}' is not allowed (only http/https)"
            )));
        }
    }

    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }

    Ok(url)
}
