use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;
use url::Url;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub oauth: OAuthConfig,
    pub api: ApiConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StorageBackend {
    Mongo,
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub backend: StorageBackend,
    /// Full connection string; wins over the host/port/credential pieces.
    pub uri: Option<String>,
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    #[serde(skip_serializing)]
    pub password: Option<String>,
    pub database: String,
    pub collection: String,
    pub connect_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OAuthConfig {
    pub protocol: String,
    pub host: String,
    pub port: String,
    /// Path prefixes served without a token (case-insensitive).
    pub excluded_prefixes: Vec<String>,
    /// Unset means the HTTP client default.
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub enable_cors: bool,
    pub enable_request_logging: bool,
    pub log_filter: String,
}

impl Default for OAuthConfig {
    fn default() -> Self {
        Self {
            protocol: "http".to_string(),
            host: "oauth".to_string(),
            port: "8080".to_string(),
            excluded_prefixes: ["/swagger", "/health", "/api/v1/health", "/favicon", "/openapi"]
                .iter()
                .map(|p| p.to_string())
                .collect(),
            timeout_secs: None,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Mongo,
            uri: None,
            host: "mongodb".to_string(),
            port: 27017,
            username: None,
            password: None,
            database: "classes".to_string(),
            collection: "Classes".to_string(),
            connect_timeout_secs: 10,
        }
    }
}

impl OAuthConfig {
    /// `protocol://host:port/validate` on the internal OAuth service.
    pub fn validate_url(&self) -> Result<Url, ConfigError> {
        let raw = format!("{}://{}:{}/validate", self.protocol, self.host, self.port);
        Url::parse(&raw).map_err(|e| ConfigError::InvalidUrl {
            url: raw.clone(),
            reason: e.to_string(),
        })
    }
}

impl DatabaseConfig {
    /// Connection string for the document store. Credentials are
    /// percent-encoded by the URL builder.
    pub fn connection_uri(&self) -> Result<String, ConfigError> {
        if let Some(uri) = self.uri.as_deref().filter(|u| !u.trim().is_empty()) {
            return Ok(uri.to_string());
        }

        let raw = format!("mongodb://{}:{}/{}", self.host, self.port, self.database);
        let invalid = |reason: String| ConfigError::InvalidUrl {
            url: raw.clone(),
            reason,
        };
        let mut url = Url::parse(&raw).map_err(|e| invalid(e.to_string()))?;

        if let (Some(user), Some(pass)) = (self.username.as_deref(), self.password.as_deref()) {
            if !user.is_empty() && !pass.is_empty() {
                url.set_username(user)
                    .map_err(|_| invalid("cannot set username".to_string()))?;
                url.set_password(Some(pass))
                    .map_err(|_| invalid("cannot set password".to_string()))?;
            }
        }

        Ok(url.into())
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary key lookup; `from_env` passes the process
    /// environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let environment = match lookup("APP_ENV").as_deref() {
            Some("production") | Some("prod") => Environment::Production,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Development => Self::development(),
        }
        .with_overrides(lookup)
    }

    fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        // First key present wins
        let first = |keys: &[&str]| keys.iter().find_map(|k| lookup(k).filter(|v| !v.trim().is_empty()));

        // Server overrides
        if let Some(v) = first(&["CLASSES_API_PORT", "PORT"]) {
            self.server.port = v.parse().unwrap_or(self.server.port);
        }

        // Database overrides
        if let Some(v) = first(&["CLASSES_STORAGE"]) {
            self.database.backend = match v.to_ascii_lowercase().as_str() {
                "memory" | "in-memory" => StorageBackend::Memory,
                _ => StorageBackend::Mongo,
            };
        }
        if let Some(v) = first(&["MONGODB_URI", "ConnectionStrings__MongoDb"]) {
            self.database.uri = Some(v);
        }
        if let Some(v) = first(&["MONGODB_HOST", "MONGODB_INTERNAL_HOST"]) {
            self.database.host = v;
        }
        if let Some(v) = first(&["MONGODB_PORT", "MONGODB_INTERNAL_PORT"]) {
            self.database.port = v.parse().unwrap_or(self.database.port);
        }
        if let Some(v) = first(&["MONGODB_USERNAME"]) {
            self.database.username = Some(v);
        }
        if let Some(v) = first(&["MONGODB_PASSWORD"]) {
            self.database.password = Some(v);
        }
        if let Some(v) = first(&["MONGODB_DATABASE", "MONGODB_DB", "CLASSES_MONGODB_DB"]) {
            self.database.database = v;
        }
        if let Some(v) = first(&["MONGODB_COLLECTION"]) {
            self.database.collection = v;
        }
        if let Some(v) = first(&["MONGODB_CONNECT_TIMEOUT_SECS"]) {
            self.database.connect_timeout_secs = v.parse().unwrap_or(self.database.connect_timeout_secs);
        }

        // OAuth overrides
        if let Some(v) = first(&["OAUTH_INTERNAL_PROTOCOL"]) {
            self.oauth.protocol = v;
        }
        if let Some(v) = first(&["OAUTH_INTERNAL_HOST"]) {
            self.oauth.host = v;
        }
        if let Some(v) = first(&["OAUTH_INTERNAL_API_PORT"]) {
            self.oauth.port = v;
        }
        if let Some(v) = first(&["OAUTH_EXCLUDED_PREFIXES"]) {
            self.oauth.excluded_prefixes = v
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }
        if let Some(v) = first(&["OAUTH_VALIDATE_TIMEOUT_SECS"]) {
            self.oauth.timeout_secs = v.parse().ok();
        }

        // API overrides
        if let Some(v) = first(&["API_ENABLE_CORS"]) {
            self.api.enable_cors = v.parse().unwrap_or(self.api.enable_cors);
        }
        if let Some(v) = first(&["API_ENABLE_REQUEST_LOGGING"]) {
            self.api.enable_request_logging = v.parse().unwrap_or(self.api.enable_request_logging);
        }
        if let Some(v) = first(&["RUST_LOG"]) {
            self.api.log_filter = v;
        }

        self
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig { port: 8080 },
            database: DatabaseConfig::default(),
            oauth: OAuthConfig::default(),
            api: ApiConfig {
                enable_cors: true,
                enable_request_logging: true,
                log_filter: "debug,hyper=info,mongodb=info".to_string(),
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig { port: 8080 },
            database: DatabaseConfig {
                connect_timeout_secs: 5,
                ..DatabaseConfig::default()
            },
            oauth: OAuthConfig::default(),
            api: ApiConfig {
                enable_cors: false,
                enable_request_logging: true,
                log_filter: "info".to_string(),
            },
        }
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

pub fn config() -> &'static AppConfig {
    &CONFIG
}
