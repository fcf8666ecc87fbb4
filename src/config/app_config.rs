use serde::Deserialize;

use crate::domain::DomainError;
use crate::infrastructure::key::{DEFAULT_PGP_RSA_BITS, DEFAULT_SSH_RSA_BITS};
use crate::infrastructure::storage::PostgresConfig;

/// Smallest RSA modulus accepted for generated keys
pub const MIN_RSA_BITS: usize = 1024;
/// Largest RSA modulus accepted for generated keys
pub const MAX_RSA_BITS: usize = 16384;

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub keys: KeyGenerationConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout_secs: u64,
    pub idle_timeout_secs: u64,
}

/// RSA modulus sizes per key type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct KeyGenerationConfig {
    pub ssh_rsa_bits: usize,
    pub pgp_rsa_bits: usize,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        let postgres = PostgresConfig::default();
        Self {
            url: postgres.url,
            max_connections: postgres.max_connections,
            min_connections: postgres.min_connections,
            connect_timeout_secs: postgres.connect_timeout_secs,
            idle_timeout_secs: postgres.idle_timeout_secs,
        }
    }
}

impl DatabaseConfig {
    pub fn to_postgres_config(&self) -> PostgresConfig {
        PostgresConfig::new(&self.url)
            .with_max_connections(self.max_connections)
            .with_min_connections(self.min_connections)
            .with_connect_timeout(self.connect_timeout_secs)
            .with_idle_timeout(self.idle_timeout_secs)
    }
}

impl Default for KeyGenerationConfig {
    fn default() -> Self {
        Self {
            ssh_rsa_bits: DEFAULT_SSH_RSA_BITS,
            pgp_rsa_bits: DEFAULT_PGP_RSA_BITS,
        }
    }
}

impl KeyGenerationConfig {
    pub fn validate(&self) -> Result<(), DomainError> {
        for (field, bits) in [
            ("ssh_rsa_bits", self.ssh_rsa_bits),
            ("pgp_rsa_bits", self.pgp_rsa_bits),
        ] {
            if !(MIN_RSA_BITS..=MAX_RSA_BITS).contains(&bits) {
                return Err(DomainError::configuration(format!(
                    "keys.{} must be between {} and {}, got {}",
                    field, MIN_RSA_BITS, MAX_RSA_BITS, bits
                )));
            }
        }
        Ok(())
    }
}

impl AppConfig {
    /// Load `.env`, the config files and `APPKEYS_*` environment variables
    pub fn load() -> Result<Self, DomainError> {
        dotenvy::dotenv().ok();

        let builder = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APPKEYS")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("database.url", std::env::var("DATABASE_URL").ok())
            .map_err(|e| DomainError::configuration(e.to_string()))?;

        Self::from_config(builder.build())
    }

    fn from_config(
        config: Result<config::Config, config::ConfigError>,
    ) -> Result<Self, DomainError> {
        let app_config: Self = config
            .and_then(|c| c.try_deserialize())
            .map_err(|e| DomainError::configuration(e.to_string()))?;

        app_config.keys.validate()?;
        Ok(app_config)
    }
}
