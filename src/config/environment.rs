// ABOUTME: Environment configuration management for deployment-specific settings
// ABOUTME: Reads auth provider endpoints, backend selection, ports, cookies, and typing timeouts at startup
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Environment-based configuration management

use std::env;
use std::fmt::Write as _;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::constants::{defaults, env_config};
use crate::errors::{AppError, AppResult};

/// Environment type for security and other configurations
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Local development
    #[default]
    Development,
    /// Production deployment
    Production,
    /// Test runs
    Testing,
}

impl Environment {
    /// Parse from string with fallback
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            "testing" | "test" => Self::Testing,
            _ => Self::Development,
        }
    }

    /// Check if this is a production environment
    #[must_use]
    pub const fn is_production(self) -> bool {
        matches!(self, Self::Production)
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Development => write!(f, "development"),
            Self::Production => write!(f, "production"),
            Self::Testing => write!(f, "testing"),
        }
    }
}

/// Which identity and profile implementations to wire up
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Hosted auth provider and hosted profile table
    #[default]
    Hosted,
    /// Hosted auth provider, profiles in a local SQLite database
    Sqlite,
    /// In-process identities and profiles, for local development
    Memory,
}

impl FromStr for BackendKind {
    type Err = AppError;

    fn from_str(s: &str) -> AppResult<Self> {
        match s.to_lowercase().as_str() {
            "hosted" => Ok(Self::Hosted),
            "sqlite" => Ok(Self::Sqlite),
            "memory" => Ok(Self::Memory),
            other => Err(AppError::config(format!(
                "{} must be one of hosted, sqlite, memory (got '{other}')",
                env_config::BACKEND
            ))),
        }
    }
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Hosted => write!(f, "hosted"),
            Self::Sqlite => write!(f, "sqlite"),
            Self::Memory => write!(f, "memory"),
        }
    }
}

/// Auth provider endpoint and keys
#[derive(Clone)]
pub struct AuthProviderConfig {
    /// Provider base URL
    pub url: Url,
    /// Public key sent with every request
    pub anon_key: String,
    /// Service key for admin endpoints
    pub service_key: Option<String>,
}

impl std::fmt::Debug for AuthProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthProviderConfig")
            .field("url", &self.url.as_str())
            .field("anon_key", &"<redacted>")
            .field("service_key", &self.service_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// CORS configuration
#[derive(Debug, Clone)]
pub struct CorsConfig {
    /// Comma-separated origins, or `*`
    pub allowed_origins: String,
}

/// Session cookie attributes
#[derive(Debug, Clone, Copy)]
pub struct CookieConfig {
    /// Mark cookies `Secure`
    pub secure: bool,
}

/// Typing indicator settings
#[derive(Debug, Clone, Copy)]
pub struct TypingConfig {
    /// Idle time after the last keystroke before "stopped typing" is sent
    pub idle_timeout: Duration,
}

/// Server configuration
#[derive(Clone)]
pub struct ServerConfig {
    /// HTTP port
    pub http_port: u16,
    /// Deployment environment
    pub environment: Environment,
    /// Backend wiring
    pub backend: BackendKind,
    /// Auth provider, absent only for the memory backend
    pub auth_provider: Option<AuthProviderConfig>,
    /// SQLite URL for the sqlite backend
    pub database_url: String,
    /// Directory of prebuilt pages
    pub static_dir: PathBuf,
    /// CORS settings
    pub cors: CorsConfig,
    /// Cookie settings
    pub cookies: CookieConfig,
    /// Typing indicator settings
    pub typing: TypingConfig,
    /// Password for seeded demo accounts, memory backend only
    pub dev_seed_password: Option<String>,
}

impl std::fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerConfig")
            .field("http_port", &self.http_port)
            .field("environment", &self.environment)
            .field("backend", &self.backend)
            .field("auth_provider", &self.auth_provider)
            .field("database_url", &self.database_url)
            .field("static_dir", &self.static_dir)
            .field("cors", &self.cors)
            .field("cookies", &self.cookies)
            .field("typing", &self.typing)
            .field(
                "dev_seed_password",
                &self.dev_seed_password.as_ref().map(|_| "<redacted>"),
            )
            .finish()
    }
}

impl ServerConfig {
    /// Load configuration from process environment variables
    ///
    /// # Errors
    ///
    /// Returns `CONFIG_MISSING` when a required auth provider variable is absent
    /// and `CONFIG_INVALID` when a value cannot be parsed.
    pub fn from_env() -> AppResult<Self> {
        Self::from_env_with_backend(None)
    }

    /// Load from the process environment with an optional backend override,
    /// applied before backend-specific variables are validated
    ///
    /// # Errors
    ///
    /// Same as [`ServerConfig::from_env`].
    pub fn from_env_with_backend(backend: Option<BackendKind>) -> AppResult<Self> {
        let backend = backend.map(|kind| kind.to_string());
        Self::from_lookup(|key| match (&backend, key) {
            (Some(kind), env_config::BACKEND) => Some(kind.clone()),
            _ => env::var(key).ok(),
        })
    }

    /// Load configuration through an arbitrary variable lookup
    ///
    /// # Errors
    ///
    /// Same as [`ServerConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = lookup(env_config::ENVIRONMENT)
            .map(|value| Environment::from_str_or_default(&value))
            .unwrap_or_default();

        let backend = lookup(env_config::BACKEND)
            .map(|value| value.parse::<BackendKind>())
            .transpose()?
            .unwrap_or_default();

        let auth_provider = match backend {
            BackendKind::Memory => None,
            BackendKind::Hosted | BackendKind::Sqlite => Some(load_auth_provider(&lookup)?),
        };

        let dev_seed_password = lookup(env_config::DEV_SEED_PASSWORD)
            .filter(|value| !value.is_empty());
        if let Some(password) = &dev_seed_password {
            if backend != BackendKind::Memory || environment.is_production() {
                return Err(AppError::config(format!(
                    "{} is only accepted by the memory backend outside production",
                    env_config::DEV_SEED_PASSWORD
                )));
            }
            if password.chars().count() < defaults::MIN_PASSWORD_LENGTH {
                return Err(AppError::config(format!(
                    "{} must be at least {} characters",
                    env_config::DEV_SEED_PASSWORD,
                    defaults::MIN_PASSWORD_LENGTH
                )));
            }
        }

        let http_port = parse_or(&lookup, env_config::HTTP_PORT, defaults::HTTP_PORT)?;
        let idle_ms = parse_or(&lookup, env_config::TYPING_IDLE_MS, defaults::TYPING_IDLE_MS)?;
        let secure = parse_or(
            &lookup,
            env_config::COOKIE_SECURE,
            environment.is_production(),
        )?;

        Ok(Self {
            http_port,
            environment,
            backend,
            auth_provider,
            database_url: lookup(env_config::DATABASE_URL)
                .unwrap_or_else(|| defaults::DATABASE_URL.to_owned()),
            static_dir: PathBuf::from(
                lookup(env_config::STATIC_DIR).unwrap_or_else(|| defaults::STATIC_DIR.to_owned()),
            ),
            cors: CorsConfig {
                allowed_origins: lookup(env_config::CORS_ALLOWED_ORIGINS)
                    .unwrap_or_else(|| "*".to_owned()),
            },
            cookies: CookieConfig { secure },
            typing: TypingConfig {
                idle_timeout: Duration::from_millis(idle_ms),
            },
            dev_seed_password,
        })
    }

    /// One-line-per-setting summary for startup logs. Keys are never included.
    #[must_use]
    pub fn summary(&self) -> String {
        let mut out = String::from("Coachdesk configuration:");
        let _ = write!(out, "\n  environment: {}", self.environment);
        let _ = write!(out, "\n  backend: {}", self.backend);
        let _ = write!(out, "\n  http_port: {}", self.http_port);
        if let Some(provider) = &self.auth_provider {
            let _ = write!(out, "\n  auth_provider: {}", provider.url);
            let _ = write!(
                out,
                "\n  admin actions: {}",
                if provider.service_key.is_some() {
                    "enabled"
                } else {
                    "disabled (no service key)"
                }
            );
        }
        if self.dev_seed_password.is_some() {
            out.push_str("\n  demo accounts: seeded");
        }
        if self.backend == BackendKind::Sqlite {
            let _ = write!(out, "\n  database: {}", self.database_url);
        }
        let _ = write!(out, "\n  static_dir: {}", self.static_dir.display());
        let _ = write!(out, "\n  cors: {}", self.cors.allowed_origins);
        let _ = write!(out, "\n  secure cookies: {}", self.cookies.secure);
        let _ = write!(
            out,
            "\n  typing idle: {}ms",
            self.typing.idle_timeout.as_millis()
        );
        out
    }
}

fn load_auth_provider<F>(lookup: &F) -> AppResult<AuthProviderConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let raw_url = required(lookup, env_config::AUTH_PROVIDER_URL)?;
    let url = Url::parse(&raw_url).map_err(|e| {
        AppError::config(format!(
            "{} is not a valid URL: {e}",
            env_config::AUTH_PROVIDER_URL
        ))
    })?;

    Ok(AuthProviderConfig {
        url,
        anon_key: required(lookup, env_config::AUTH_PROVIDER_ANON_KEY)?,
        service_key: lookup(env_config::AUTH_PROVIDER_SERVICE_KEY)
            .filter(|value| !value.trim().is_empty()),
    })
}

fn required<F>(lookup: &F, key: &str) -> AppResult<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .filter(|value| !value.trim().is_empty())
        .ok_or_else(|| AppError::config_missing(key))
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> AppResult<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    lookup(key).map_or(Ok(default), |raw| {
        raw.trim()
            .parse::<T>()
            .map_err(|e| AppError::config(format!("{key} has invalid value '{raw}': {e}")))
    })
}
