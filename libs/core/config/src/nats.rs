use crate::{ConfigError, FromEnv, env_or_default};

/// NATS connection configuration
#[derive(Clone, Debug)]
pub struct NatsConfig {
    pub url: String,
}

impl FromEnv for NatsConfig {
    /// NATS_URL defaults to the local broker.
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            url: env_or_default("NATS_URL", "nats://localhost:4222"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nats_config_default() {
        temp_env::with_var_unset("NATS_URL", || {
            let config = NatsConfig::from_env().unwrap();
            assert_eq!(config.url, "nats://localhost:4222");
        });
    }

    #[test]
    fn test_nats_config_from_env() {
        temp_env::with_var("NATS_URL", Some("nats://broker:4222"), || {
            let config = NatsConfig::from_env().unwrap();
            assert_eq!(config.url, "nats://broker:4222");
        });
    }
}
