use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::backend::database::DatabaseBackendConfig;
use crate::backend::DatabaseType;
use crate::error::{AppError, AppResult};
use crate::password::{PasswordAlgorithm, PasswordManager};

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub backend: BackendConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct BackendConfig {
    #[serde(rename = "type")]
    pub backend_type: String,
    pub database: Option<DatabaseConfig>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DatabaseConfig {
    #[serde(rename = "type")]
    pub db_type: String,
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

/// Token signing and password hashing settings
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SecurityConfig {
    /// HS256 signing key for issued tokens
    pub secret_key: String,
    #[serde(default = "default_token_ttl_secs")]
    pub token_ttl_secs: u64,
    #[serde(default)]
    pub password_algorithm: PasswordAlgorithm,
    #[serde(default = "default_bcrypt_work_factor")]
    pub bcrypt_work_factor: u32,
}

fn default_token_ttl_secs() -> u64 {
    24 * 60 * 60
}

fn default_bcrypt_work_factor() -> u32 {
    12
}

impl AppConfig {
    /// Load configuration from YAML file
    pub fn load_from_file<P: AsRef<Path>>(config_path: P) -> Result<Self, String> {
        let path = config_path.as_ref();

        if !path.exists() {
            return Err(format!("Configuration file not found: {}", path.display()));
        }

        let content = fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file {}: {}", path.display(), e))?;

        // Expand environment variables in YAML content
        let expanded_content = Self::expand_env_vars(&content)?;

        let app_config: AppConfig = serde_yaml::from_str(&expanded_content)
            .map_err(|e| format!("Failed to parse config file {}: {}", path.display(), e))?;

        if app_config.security.secret_key.is_empty() {
            return Err("security.secret_key must not be empty".to_string());
        }

        Ok(app_config)
    }

    /// Create default configuration for in-memory SQLite
    ///
    /// The signing key is a fixed development value; never use it in production.
    pub fn default_config() -> Self {
        AppConfig {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 3000,
            },
            backend: BackendConfig {
                backend_type: "database".to_string(),
                database: Some(DatabaseConfig {
                    db_type: "sqlite".to_string(),
                    url: ":memory:".to_string(),
                    max_connections: 1,
                }),
            },
            security: SecurityConfig {
                secret_key: "development-secret-key".to_string(),
                token_ttl_secs: default_token_ttl_secs(),
                password_algorithm: PasswordAlgorithm::Bcrypt,
                bcrypt_work_factor: default_bcrypt_work_factor(),
            },
        }
    }

    /// Expand environment variables in format ${VAR_NAME} or ${VAR_NAME:-default}
    fn expand_env_vars(content: &str) -> Result<String, String> {
        let chars: Vec<char> = content.chars().collect();
        let mut expanded = String::new();
        let mut i = 0;

        while i < chars.len() {
            if i + 1 < chars.len() && chars[i] == '$' && chars[i + 1] == '{' {
                let mut j = i + 2;
                while j < chars.len() && chars[j] != '}' {
                    j += 1;
                }

                if j < chars.len() {
                    let var_expr: String = chars[i + 2..j].iter().collect();

                    let (var_name, default_value) = match var_expr.find(":-") {
                        Some(pos) => (
                            var_expr[..pos].to_string(),
                            Some(var_expr[pos + 2..].to_string()),
                        ),
                        None => (var_expr, None),
                    };

                    let value = match (std::env::var(&var_name), default_value) {
                        (Ok(val), _) => val,
                        (Err(_), Some(default)) => default,
                        (Err(_), None) => {
                            return Err(format!(
                                "Environment variable {} not found and no default provided",
                                var_name
                            ));
                        }
                    };

                    expanded.push_str(&value);
                    i = j + 1;
                } else {
                    expanded.push(chars[i]);
                    i += 1;
                }
            } else {
                expanded.push(chars[i]);
                i += 1;
            }
        }

        Ok(expanded)
    }

    /// Translate the `backend` section into a connection configuration
    pub fn to_backend_config(&self) -> AppResult<DatabaseBackendConfig> {
        if self.backend.backend_type != "database" {
            return Err(AppError::Configuration(format!(
                "Unsupported backend type: {}",
                self.backend.backend_type
            )));
        }

        let database = self.backend.database.as_ref().ok_or_else(|| {
            AppError::Configuration("Database configuration is required".to_string())
        })?;

        let database_type = DatabaseType::parse(&database.db_type).ok_or_else(|| {
            AppError::Configuration(format!("Unsupported database type: {}", database.db_type))
        })?;

        Ok(DatabaseBackendConfig::new(database_type, database.url.clone())
            .with_max_connections(database.max_connections))
    }

    /// Password manager for the configured algorithm and work factor
    pub fn password_manager(&self) -> AppResult<PasswordManager> {
        PasswordManager::new(
            self.security.password_algorithm,
            self.security.bcrypt_work_factor,
        )
    }
}
