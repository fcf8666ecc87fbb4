//! Configuration loading

mod app_config;

pub use app_config::{
    AppConfig, DatabaseConfig, KeyGenerationConfig, LogFormat, LoggingConfig, MAX_RSA_BITS,
    MIN_RSA_BITS,
};
