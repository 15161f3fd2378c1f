/// Configuration management for the biblioref server
use crate::error::{ApiError, ApiResult};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

/// Main server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub service: ServiceConfig,
    pub storage: StorageConfig,
    pub authentication: AuthConfig,
    pub logging: LoggingConfig,
}

/// Service-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub hostname: String,
    pub port: u16,
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub data_directory: PathBuf,
    pub database: PathBuf,
}

/// Authentication configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Symmetric signing key for HS256 tokens
    pub jwt_secret: String,
    /// Expected `iss` claim
    pub jwt_issuer: String,
    /// Expected `aud` claim
    pub jwt_audience: String,
    /// Access token lifetime in minutes
    pub token_ttl_minutes: i64,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

impl ServerConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> ApiResult<Self> {
        dotenv::dotenv().ok();

        let hostname = env::var("BIBLIOREF_HOSTNAME").unwrap_or_else(|_| "localhost".to_string());
        let port = env::var("BIBLIOREF_PORT")
            .unwrap_or_else(|_| "4000".to_string())
            .parse()
            .map_err(|_| ApiError::Validation("Invalid port number".to_string()))?;

        let data_directory: PathBuf = env::var("BIBLIOREF_DATA_DIRECTORY")
            .unwrap_or_else(|_| "./data".to_string())
            .into();
        let database = env::var("BIBLIOREF_DB_LOCATION")
            .map(PathBuf::from)
            .unwrap_or_else(|_| data_directory.join("biblioref.sqlite"));

        let jwt_secret = env::var("BIBLIOREF_JWT_SECRET")
            .map_err(|_| ApiError::Validation("JWT secret required".to_string()))?;
        let jwt_issuer = env::var("BIBLIOREF_JWT_ISSUER")
            .map_err(|_| ApiError::Validation("JWT issuer required".to_string()))?;
        let jwt_audience = env::var("BIBLIOREF_JWT_AUDIENCE")
            .map_err(|_| ApiError::Validation("JWT audience required".to_string()))?;
        let token_ttl_minutes = env::var("BIBLIOREF_TOKEN_TTL_MINUTES")
            .unwrap_or_else(|_| "60".to_string())
            .parse()
            .unwrap_or(60);

        let log_level = env::var("BIBLIOREF_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            service: ServiceConfig { hostname, port },
            storage: StorageConfig {
                data_directory,
                database,
            },
            authentication: AuthConfig {
                jwt_secret,
                jwt_issuer,
                jwt_audience,
                token_ttl_minutes,
            },
            logging: LoggingConfig { level: log_level },
        })
    }

    /// Validate configuration before the server starts
    pub fn validate(&self) -> ApiResult<()> {
        if self.authentication.jwt_secret.len() < 16 {
            return Err(ApiError::Validation(
                "JWT secret must be at least 16 bytes".to_string(),
            ));
        }

        if self.authentication.token_ttl_minutes <= 0 {
            return Err(ApiError::Validation(
                "Token TTL must be positive".to_string(),
            ));
        }

        Ok(())
    }
}
