use crate::{ConfigError, FromEnv, env_or_default, env_required};

/// Postgres connection configuration
#[derive(Clone, Debug)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

impl FromEnv for DatabaseConfig {
    /// Requires DATABASE_URL; DATABASE_MAX_CONNECTIONS defaults to 30.
    fn from_env() -> Result<Self, ConfigError> {
        let max_connections = env_or_default("DATABASE_MAX_CONNECTIONS", "30")
            .parse()
            .map_err(|e: std::num::ParseIntError| ConfigError::ParseError {
                key: "DATABASE_MAX_CONNECTIONS".to_string(),
                details: e.to_string(),
            })?;
        Ok(Self {
            url: env_required("DATABASE_URL")?,
            max_connections,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_database_config_from_env_success() {
        temp_env::with_vars(
            [
                ("DATABASE_URL", Some("postgres://localhost/testdb")),
                ("DATABASE_MAX_CONNECTIONS", None),
            ],
            || {
                let config = DatabaseConfig::from_env().unwrap();
                assert_eq!(config.url, "postgres://localhost/testdb");
                assert_eq!(config.max_connections, 30);
            },
        );
    }

    #[test]
    fn test_database_config_from_env_missing_url() {
        temp_env::with_var_unset("DATABASE_URL", || {
            let err = DatabaseConfig::from_env().unwrap_err();
            assert!(err.to_string().contains("DATABASE_URL"));
        });
    }

    #[test]
    fn test_database_config_bad_pool_size() {
        temp_env::with_vars(
            [
                ("DATABASE_URL", Some("postgres://localhost/testdb")),
                ("DATABASE_MAX_CONNECTIONS", Some("lots")),
            ],
            || {
                let err = DatabaseConfig::from_env().unwrap_err();
                assert!(err.to_string().contains("DATABASE_MAX_CONNECTIONS"));
            },
        );
    }
}
