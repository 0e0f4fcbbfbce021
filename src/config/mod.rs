use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub database: DatabaseConfig,
    pub identity: IdentityConfig,
    pub api: ApiConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub name: String,
    pub connect_timeout_secs: u64,
    pub enable_query_logging: bool,
}

/// Identity-provider verification settings. The audience is fixed at startup
/// and injected into the verifier; tokens minted for any other audience are
/// rejected.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityConfig {
    pub audience: String,
    pub tokeninfo_endpoint: String,
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub enable_request_logging: bool,
    pub max_request_size_bytes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub enable_cors: bool,
    pub cors_origins: Vec<String>,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Database overrides
        if let Ok(v) = env::var("DATABASE_NAME") {
            self.database.name = v;
        }
        if let Ok(v) = env::var("DATABASE_CONNECT_TIMEOUT_SECS") {
            self.database.connect_timeout_secs = v.parse().unwrap_or(self.database.connect_timeout_secs);
        }
        if let Ok(v) = env::var("DATABASE_ENABLE_QUERY_LOGGING") {
            self.database.enable_query_logging = v.parse().unwrap_or(self.database.enable_query_logging);
        }

        // Identity overrides
        if let Ok(v) = env::var("IDENTITY_AUDIENCE") {
            self.identity.audience = v;
        }
        if let Ok(v) = env::var("IDENTITY_TOKENINFO_ENDPOINT") {
            self.identity.tokeninfo_endpoint = v;
        }
        if let Ok(v) = env::var("IDENTITY_REQUEST_TIMEOUT_SECS") {
            self.identity.request_timeout_secs = v.parse().unwrap_or(self.identity.request_timeout_secs);
        }

        // API overrides
        if let Ok(v) = env::var("API_ENABLE_REQUEST_LOGGING") {
            self.api.enable_request_logging = v.parse().unwrap_or(self.api.enable_request_logging);
        }
        if let Ok(v) = env::var("API_MAX_REQUEST_SIZE_BYTES") {
            self.api.max_request_size_bytes = v.parse().unwrap_or(self.api.max_request_size_bytes);
        }

        // Security overrides
        if let Ok(v) = env::var("SECURITY_ENABLE_CORS") {
            self.security.enable_cors = v.parse().unwrap_or(self.security.enable_cors);
        }
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v.split(',').map(|s| s.trim().to_string()).collect();
        }

        self
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            database: DatabaseConfig {
                name: "AgilityDB".to_string(),
                connect_timeout_secs: 30,
                enable_query_logging: true,
            },
            identity: IdentityConfig {
                audience: String::new(),
                tokeninfo_endpoint: "https://oauth2.googleapis.com/tokeninfo".to_string(),
                request_timeout_secs: 10,
            },
            api: ApiConfig {
                enable_request_logging: true,
                max_request_size_bytes: 10 * 1024 * 1024, // 10MB
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec!["http://localhost:4200".to_string()],
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            database: DatabaseConfig {
                name: "AgilityDB".to_string(),
                connect_timeout_secs: 10,
                enable_query_logging: true,
            },
            identity: IdentityConfig {
                audience: String::new(),
                tokeninfo_endpoint: "https://oauth2.googleapis.com/tokeninfo".to_string(),
                request_timeout_secs: 5,
            },
            api: ApiConfig {
                enable_request_logging: true,
                max_request_size_bytes: 5 * 1024 * 1024, // 5MB
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec!["https://staging.example.com".to_string()],
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            database: DatabaseConfig {
                name: "AgilityDB".to_string(),
                connect_timeout_secs: 5,
                enable_query_logging: false,
            },
            identity: IdentityConfig {
                audience: String::new(),
                tokeninfo_endpoint: "https://oauth2.googleapis.com/tokeninfo".to_string(),
                request_timeout_secs: 5,
            },
            api: ApiConfig {
                enable_request_logging: false,
                max_request_size_bytes: 2 * 1024 * 1024, // 2MB
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec!["https://app.example.com".to_string()],
            },
        }
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_development_config() {
        let config = AppConfig::development();
        assert_eq!(config.database.name, "AgilityDB");
        assert!(config.api.enable_request_logging);
        assert!(config.security.cors_origins.contains(&"http://localhost:4200".to_string()));
    }

    #[test]
    fn test_default_production_config() {
        let config = AppConfig::production();
        assert!(!config.api.enable_request_logging);
        assert!(!config.database.enable_query_logging);
    }
}
