use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub database: DatabaseConfig,
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
    pub max_connections: u32,
    pub connection_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Hard cap on list responses (interviews, notifications).
    pub list_cap: i64,
    /// Ceiling for the inline image upload path.
    pub max_upload_bytes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub jwt_secret: String,
    pub jwt_expiry_hours: u64,
    /// Name of the session cookie the resolver reads.
    pub session_cookie: String,
    pub min_password_len: usize,
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
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout_secs =
                v.parse().unwrap_or(self.database.connection_timeout_secs);
        }

        // API overrides
        if let Ok(v) = env::var("API_LIST_CAP") {
            self.api.list_cap = v.parse().unwrap_or(self.api.list_cap);
        }
        if let Ok(v) = env::var("API_MAX_UPLOAD_BYTES") {
            self.api.max_upload_bytes = v.parse().unwrap_or(self.api.max_upload_bytes);
        }

        // Security overrides
        if let Ok(v) = env::var("HIRELINK_JWT_SECRET") {
            self.security.jwt_secret = v;
        }
        if let Ok(v) = env::var("SECURITY_JWT_EXPIRY_HOURS") {
            self.security.jwt_expiry_hours = v.parse().unwrap_or(self.security.jwt_expiry_hours);
        }
        if let Ok(v) = env::var("SECURITY_SESSION_COOKIE") {
            self.security.session_cookie = v;
        }
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
                max_connections: 10,
                connection_timeout_secs: 30,
            },
            api: ApiConfig {
                list_cap: 100,
                max_upload_bytes: 5 * 1024 * 1024, // 5MB
            },
            security: SecurityConfig {
                // Local-only fallback; HIRELINK_JWT_SECRET overrides in every environment
                jwt_secret: "hirelink-dev-secret".to_string(),
                jwt_expiry_hours: 24 * 7, // 1 week
                session_cookie: "hl_session".to_string(),
                min_password_len: 6,
                enable_cors: true,
                cors_origins: vec![
                    "http://localhost:3000".to_string(),
                    "http://localhost:5173".to_string(),
                ],
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            database: DatabaseConfig {
                max_connections: 20,
                connection_timeout_secs: 10,
            },
            api: ApiConfig {
                list_cap: 100,
                max_upload_bytes: 5 * 1024 * 1024,
            },
            security: SecurityConfig {
                jwt_secret: String::new(), // must come from HIRELINK_JWT_SECRET
                jwt_expiry_hours: 24,
                session_cookie: "hl_session".to_string(),
                min_password_len: 6,
                enable_cors: true,
                cors_origins: vec!["https://staging.hirelink.example.com".to_string()],
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            database: DatabaseConfig {
                max_connections: 50,
                connection_timeout_secs: 5,
            },
            api: ApiConfig {
                list_cap: 100,
                max_upload_bytes: 5 * 1024 * 1024,
            },
            security: SecurityConfig {
                jwt_secret: String::new(), // must come from HIRELINK_JWT_SECRET
                jwt_expiry_hours: 24,
                session_cookie: "hl_session".to_string(),
                min_password_len: 6,
                enable_cors: true,
                cors_origins: vec!["https://app.hirelink.example.com".to_string()],
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
    fn development_defaults() {
        let config = AppConfig::development();
        assert_eq!(config.api.list_cap, 100);
        assert_eq!(config.api.max_upload_bytes, 5 * 1024 * 1024);
        assert_eq!(config.security.session_cookie, "hl_session");
        assert!(!config.security.jwt_secret.is_empty());
    }

    #[test]
    fn production_requires_secret_from_env() {
        let config = AppConfig::production();
        assert!(config.security.jwt_secret.is_empty());
        assert_eq!(config.security.min_password_len, 6);
    }
}
