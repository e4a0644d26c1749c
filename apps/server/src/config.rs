//! Server configuration module.
//!
//! Configuration is loaded from environment variables with fallback to
//! defaults. Gateways (payment, messaging) are feature-flagged by their
//! variable simply being present.

use std::env;

/// HTTP server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// HTTP listen port
    pub port: u16,

    /// Path to the SQLite database file
    pub database_path: String,

    /// Public base URL, used for payment gateway callback URLs
    pub site_url: String,

    /// Payment gateway access token; unset disables the gateway
    pub payment_access_token: Option<String>,

    /// WhatsApp number for order deep links; unset disables them
    pub whatsapp_number: Option<String>,

    /// Bootstrap admin username
    pub admin_username: String,

    /// Bootstrap admin password
    pub admin_password: String,
}

impl ServerConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        let config = ServerConfig {
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("PORT".to_string()))?,

            database_path: env::var("DATABASE_PATH")
                .unwrap_or_else(|_| "./data/quincho.db".to_string()),

            site_url: env::var("SITE_URL")
                .unwrap_or_else(|_| "http://localhost:8080".to_string()),

            payment_access_token: env::var("PAYMENT_ACCESS_TOKEN").ok(),

            whatsapp_number: env::var("ORDER_WHATSAPP_NUMBER").ok(),

            admin_username: env::var("ADMIN_USERNAME").unwrap_or_else(|_| "admin".to_string()),

            admin_password: env::var("ADMIN_PASSWORD")
                // Development default; set this in production
                .unwrap_or_else(|_| "quincho-dev-password".to_string()),
        };

        Ok(config)
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_load_without_env() {
        let config = ServerConfig::load().unwrap();
        assert!(config.port > 0);
        assert!(!config.database_path.is_empty());
        assert_eq!(config.admin_username, "admin");
    }
}
