//! Server configuration.

use std::env;
use std::path::PathBuf;

/// Server configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server host address.
    pub host: String,
    /// Server port.
    pub port: u16,
    /// Database URL. `None` selects the in-memory store.
    pub database_url: Option<String>,
    /// JWT secret shared with the identity provider.
    pub jwt_secret: String,
    /// Expected JWT issuer.
    pub jwt_issuer: String,
    /// JWT expiration in hours.
    pub jwt_expiration_hours: u64,
    /// Directory for uploaded files.
    pub storage_dir: PathBuf,
    /// Base URL under which uploaded files are served.
    pub public_url: String,
    /// Whether to seed the default skill catalogue at startup.
    pub seed_skills: bool,
    /// Log level.
    pub log_level: String,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        let jwt_secret = env::var("KONNECT_JWT_SECRET")
            .map_err(|_| anyhow::anyhow!("KONNECT_JWT_SECRET is required"))?;
        if jwt_secret.trim().is_empty() {
            anyhow::bail!("KONNECT_JWT_SECRET must not be empty");
        }

        Ok(Self {
            host: env::var("KONNECT_SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("KONNECT_SERVER_PORT")
                .unwrap_or_else(|_| "5000".to_string())
                .parse()
                .unwrap_or(5000),
            database_url: env::var("DATABASE_URL").ok().filter(|url| !url.is_empty()),
            jwt_secret,
            jwt_issuer: env::var("KONNECT_JWT_ISSUER")
                .unwrap_or_else(|_| auth::DEFAULT_JWT_ISSUER.to_string()),
            jwt_expiration_hours: env::var("KONNECT_JWT_EXPIRATION_HOURS")
                .unwrap_or_else(|_| "24".to_string())
                .parse()
                .unwrap_or(auth::DEFAULT_JWT_EXPIRATION_HOURS),
            storage_dir: env::var("KONNECT_STORAGE_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("./uploads")),
            public_url: env::var("KONNECT_PUBLIC_URL")
                .unwrap_or_else(|_| "http://localhost:5000".to_string()),
            seed_skills: env::var("KONNECT_SEED_SKILLS")
                .map(|v| v.to_lowercase() == "true" || v == "1")
                .unwrap_or(false),
            log_level: env::var("KONNECT_LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
        })
    }

    /// Creates a configuration with defaults and the given secret.
    pub fn with_secret(jwt_secret: impl Into<String>) -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
            database_url: None,
            jwt_secret: jwt_secret.into(),
            jwt_issuer: auth::DEFAULT_JWT_ISSUER.to_string(),
            jwt_expiration_hours: auth::DEFAULT_JWT_EXPIRATION_HOURS,
            storage_dir: PathBuf::from("./uploads"),
            public_url: "http://localhost:5000".to_string(),
            seed_skills: false,
            log_level: "info".to_string(),
        }
    }

    /// Returns the server address.
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Returns true if a SQLite database is configured.
    pub fn uses_sqlite(&self) -> bool {
        self.database_url
            .as_deref()
            .is_some_and(|url| url.starts_with("sqlite:"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_env() {
        // SAFETY: the only test in this crate that touches the environment
        unsafe {
            env::remove_var("KONNECT_JWT_SECRET");
            env::remove_var("DATABASE_URL");
            env::remove_var("KONNECT_SERVER_PORT");
        }
        assert!(Config::from_env().is_err());

        unsafe {
            env::set_var("KONNECT_JWT_SECRET", "test-secret");
        }
        let config = Config::from_env().unwrap();
        assert_eq!(config.port, 5000);
        assert_eq!(config.jwt_issuer, "skill-konnect");
        assert!(config.database_url.is_none());
        assert!(!config.uses_sqlite());

        unsafe {
            env::set_var("DATABASE_URL", "sqlite:konnect.db?mode=rwc");
        }
        let config = Config::from_env().unwrap();
        assert!(config.uses_sqlite());

        unsafe {
            env::remove_var("KONNECT_JWT_SECRET");
            env::remove_var("DATABASE_URL");
        }
    }

    #[test]
    fn test_server_addr() {
        let mut config = Config::with_secret("secret");
        config.host = "0.0.0.0".to_string();
        config.port = 8080;
        assert_eq!(config.server_addr(), "0.0.0.0:8080");
    }
}
