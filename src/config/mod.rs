use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub query: QueryConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// When unset the in-memory repositories are used
    pub url: Option<String>,
    pub max_connections: u32,
    pub connection_timeout: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryConfig {
    /// Staleness window of the cached overview, in seconds
    pub overview_stale_secs: u64,
    pub overview_refetch_on_focus: bool,
    pub retry: u32,
    pub retry_delay_ms: u64,
    /// Remote overview endpoint base; the local repositories are used when unset
    pub overview_source_url: Option<String>,
    /// Token forwarded as the auth cookie when reading the remote overview
    pub overview_source_token: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub enable_cors: bool,
    pub cors_origins: Vec<String>,
    pub auth_cookie_name: String,
    pub jwt_secret: String,
    pub jwt_expiry_hours: u64,
}

impl QueryConfig {
    pub fn overview_stale_time(&self) -> Duration {
        Duration::from_secs(self.overview_stale_secs)
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Server overrides
        if let Some(port) = env::var("DASHBOARD_PORT")
            .ok()
            .or_else(|| env::var("PORT").ok())
            .and_then(|s| s.parse().ok())
        {
            self.server.port = port;
        }

        // Database overrides
        if let Ok(v) = env::var("DATABASE_URL") {
            if !v.trim().is_empty() {
                self.database.url = Some(v);
            }
        }
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = v.parse().unwrap_or(self.database.connection_timeout);
        }

        // Query overrides
        if let Ok(v) = env::var("OVERVIEW_STALE_SECS") {
            self.query.overview_stale_secs = v.parse().unwrap_or(self.query.overview_stale_secs);
        }
        if let Ok(v) = env::var("OVERVIEW_REFETCH_ON_FOCUS") {
            self.query.overview_refetch_on_focus = v.parse().unwrap_or(self.query.overview_refetch_on_focus);
        }
        if let Ok(v) = env::var("QUERY_RETRY") {
            self.query.retry = v.parse().unwrap_or(self.query.retry);
        }
        if let Ok(v) = env::var("QUERY_RETRY_DELAY_MS") {
            self.query.retry_delay_ms = v.parse().unwrap_or(self.query.retry_delay_ms);
        }
        if let Ok(v) = env::var("OVERVIEW_SOURCE_URL") {
            if url::Url::parse(&v).is_ok() {
                self.query.overview_source_url = Some(v);
            } else {
                tracing::warn!("ignoring malformed OVERVIEW_SOURCE_URL: {}", v);
            }
        }

        if let Ok(v) = env::var("OVERVIEW_SOURCE_TOKEN") {
            if !v.trim().is_empty() {
                self.query.overview_source_token = Some(v);
            }
        }

        // Security overrides
        if let Ok(v) = env::var("SECURITY_ENABLE_CORS") {
            self.security.enable_cors = v.parse().unwrap_or(self.security.enable_cors);
        }
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v.split(',').map(|s| s.trim().to_string()).collect();
        }
        if let Ok(v) = env::var("AUTH_COOKIE_NAME") {
            if !v.trim().is_empty() {
                self.security.auth_cookie_name = v;
            }
        }
        if let Ok(v) = env::var("JWT_SECRET") {
            self.security.jwt_secret = v;
        }
        if let Ok(v) = env::var("SECURITY_JWT_EXPIRY_HOURS") {
            self.security.jwt_expiry_hours = v.parse().unwrap_or(self.security.jwt_expiry_hours);
        }

        self
    }

    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig {
                port: 3000,
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 10,
                connection_timeout: 30,
            },
            query: QueryConfig {
                overview_stale_secs: 5 * 60,
                overview_refetch_on_focus: false,
                retry: 0,
                retry_delay_ms: 250,
                overview_source_url: None,
                overview_source_token: None,
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec!["http://localhost:3000".to_string(), "http://localhost:5173".to_string()],
                auth_cookie_name: "token".to_string(),
                jwt_secret: "development-secret".to_string(),
                jwt_expiry_hours: 24 * 7, // 1 week
            },
        }
    }

    pub fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            server: ServerConfig {
                port: 8080,
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 20,
                connection_timeout: 10,
            },
            query: QueryConfig {
                overview_stale_secs: 5 * 60,
                overview_refetch_on_focus: false,
                retry: 1,
                retry_delay_ms: 500,
                overview_source_url: None,
                overview_source_token: None,
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec!["https://staging.example.com".to_string()],
                auth_cookie_name: "token".to_string(),
                jwt_secret: String::new(),
                jwt_expiry_hours: 24,
            },
        }
    }

    pub fn production() -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig {
                port: 8080,
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 50,
                connection_timeout: 5,
            },
            query: QueryConfig {
                overview_stale_secs: 5 * 60,
                overview_refetch_on_focus: false,
                retry: 2,
                retry_delay_ms: 1000,
                overview_source_url: None,
                overview_source_token: None,
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec!["https://app.example.com".to_string()],
                auth_cookie_name: "token".to_string(),
                jwt_secret: String::new(),
                jwt_expiry_hours: 4,
            },
        }
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

pub fn config() -> &'static AppConfig {
    &CONFIG
}
