use std::env;
use std::fmt;
use std::str::FromStr;

use jsonwebtoken::Algorithm;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} is not set")]
    Missing(&'static str),

    #[error("invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub api: ApiConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub connection_timeout: u64,
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub enable_request_logging: bool,
    pub max_request_size_bytes: usize,
}

#[derive(Debug, Clone)]
pub struct SecurityConfig {
    pub jwt: JwtKeyConfig,
    pub enable_cors: bool,
    pub cors_origins: Vec<String>,
}

/// Key material used to verify bearer tokens.
#[derive(Clone)]
pub enum JwtKeyConfig {
    /// PEM-encoded public key of the token issuer.
    PublicKey { pem: String, algorithm: Algorithm },
    /// Shared HMAC secret (HS256).
    Secret(String),
}

// Keys stay out of logs
impl fmt::Debug for JwtKeyConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JwtKeyConfig::PublicKey { algorithm, .. } => f
                .debug_struct("PublicKey")
                .field("algorithm", algorithm)
                .finish_non_exhaustive(),
            JwtKeyConfig::Secret(_) => f.write_str("Secret(..)"),
        }
    }
}

pub const DEFAULT_PORT: u16 = 3000;

impl Environment {
    fn from_name(name: Option<&str>) -> Self {
        match name {
            Some("production") | Some("prod") => Environment::Production,
            Some("staging") | Some("stage") => Environment::Staging,
            _ => Environment::Development,
        }
    }
}

impl ApiConfig {
    pub fn for_environment(environment: Environment) -> Self {
        match environment {
            Environment::Development => Self {
                enable_request_logging: true,
                max_request_size_bytes: 1024 * 1024, // 1MB
            },
            Environment::Staging => Self {
                enable_request_logging: true,
                max_request_size_bytes: 512 * 1024,
            },
            Environment::Production => Self {
                enable_request_logging: false,
                max_request_size_bytes: 256 * 1024,
            },
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable source. Empty
    /// values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let environment = Environment::from_name(lookup("APP_ENV").as_deref());

        let url = lookup("DATABASE_URL")
            .or_else(|| lookup("POSTGRES_URI"))
            .ok_or(ConfigError::Missing("DATABASE_URL"))?;

        let jwt = match (lookup("JWT_PUBLIC_KEY"), lookup("JWT_SECRET")) {
            (Some(pem), _) => {
                let algorithm = parse_var(&lookup, "JWT_ALGORITHM")?.unwrap_or(Algorithm::RS256);
                JwtKeyConfig::PublicKey { pem, algorithm }
            }
            (None, Some(secret)) => JwtKeyConfig::Secret(secret),
            (None, None) => return Err(ConfigError::Missing("JWT_PUBLIC_KEY")),
        };

        let mut config = Self::preset(environment, url, jwt);

        // Specific overrides
        let port = match parse_var(&lookup, "TODO_API_PORT")? {
            Some(port) => Some(port),
            None => parse_var(&lookup, "PORT")?,
        };
        if let Some(port) = port {
            config.server.port = port;
        }
        if let Some(v) = parse_var(&lookup, "DATABASE_MAX_CONNECTIONS")? {
            config.database.max_connections = v;
        }
        if let Some(v) = parse_var(&lookup, "DATABASE_CONNECTION_TIMEOUT")? {
            config.database.connection_timeout = v;
        }
        if let Some(v) = parse_var(&lookup, "API_ENABLE_REQUEST_LOGGING")? {
            config.api.enable_request_logging = v;
        }
        if let Some(v) = parse_var(&lookup, "API_MAX_REQUEST_SIZE_BYTES")? {
            config.api.max_request_size_bytes = v;
        }
        if let Some(v) = parse_var(&lookup, "SECURITY_ENABLE_CORS")? {
            config.security.enable_cors = v;
        }
        if let Some(v) = lookup("SECURITY_CORS_ORIGINS") {
            config.security.cors_origins = v
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }

        Ok(config)
    }

    fn preset(environment: Environment, url: String, jwt: JwtKeyConfig) -> Self {
        let (max_connections, connection_timeout, enable_cors, cors_origins) = match environment {
            Environment::Development => (
                10,
                30,
                true,
                vec!["http://localhost:3000".to_string(), "http://localhost:5173".to_string()],
            ),
            Environment::Staging => (20, 10, true, vec!["https://staging.example.com".to_string()]),
            Environment::Production => (50, 5, true, vec!["https://app.example.com".to_string()]),
        };

        Self {
            environment,
            server: ServerConfig { port: DEFAULT_PORT },
            database: DatabaseConfig {
                url,
                max_connections,
                connection_timeout,
            },
            api: ApiConfig::for_environment(environment),
            security: SecurityConfig {
                jwt,
                enable_cors,
                cors_origins,
            },
        }
    }
}

fn parse_var<T, F>(lookup: &F, key: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Invalid { key, value }),
    }
}
