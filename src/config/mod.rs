use serde::Deserialize;
use std::env;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{var} has an invalid value: {value:?}")]
    Invalid { var: &'static str, value: String },
}

// Главная структура конфигурации - контейнер для всех настроек
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub app: AppConfig,
    pub storage: StorageConfig,
    pub redis: RedisConfig,
}

// Настройки приложения
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub environment: String,
    pub rust_log: String,
    pub log_format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            _ => Err(()),
        }
    }
}

// Где живут данные: Postgres в проде, память для тестов и локального запуска
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "backend", rename_all = "lowercase")]
pub enum StorageConfig {
    Postgres(DatabaseConfig),
    Memory,
}

// Настройки базы данных
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub pool_size: u32,
}

// Настройки Redis; без URL кеш отключен
#[derive(Debug, Clone, Deserialize)]
pub struct RedisConfig {
    pub url: Option<String>,
    pub ttl_seconds: u64,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let storage = match var_or("STORAGE_BACKEND", "postgres").to_ascii_lowercase().as_str() {
            "postgres" => StorageConfig::Postgres(DatabaseConfig {
                url: env::var("DATABASE_URL").map_err(|_| ConfigError::Missing("DATABASE_URL"))?,
                pool_size: parse_var("DB_POOL_SIZE", "20")?,
            }),
            "memory" => StorageConfig::Memory,
            other => {
                return Err(ConfigError::Invalid {
                    var: "STORAGE_BACKEND",
                    value: other.to_string(),
                })
            }
        };

        Ok(Config {
            app: AppConfig {
                host: var_or("HOST", "0.0.0.0"),
                port: parse_var("PORT", "8000")?,
                environment: var_or("ENVIRONMENT", "development"),
                rust_log: var_or("RUST_LOG", "cinema_booking=debug,tower_http=debug"),
                log_format: parse_var("LOG_FORMAT", "pretty")?,
            },
            storage,
            redis: RedisConfig {
                url: env::var("REDIS_URL").ok().filter(|url| !url.is_empty()),
                ttl_seconds: parse_var("CACHE_TTL_SECONDS", "300")?,
            },
        })
    }

    /// Конфигурация для тестов: хранилище в памяти, без Redis.
    pub fn in_memory() -> Self {
        Config {
            app: AppConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                environment: "test".to_string(),
                rust_log: "cinema_booking=debug".to_string(),
                log_format: LogFormat::Pretty,
            },
            storage: StorageConfig::Memory,
            redis: RedisConfig {
                url: None,
                ttl_seconds: 300,
            },
        }
    }
}

fn var_or(var: &'static str, default: &str) -> String {
    env::var(var).unwrap_or_else(|_| default.to_string())
}

fn parse_var<T: FromStr>(var: &'static str, default: &str) -> Result<T, ConfigError> {
    let value = var_or(var, default);
    value
        .parse()
        .map_err(|_| ConfigError::Invalid { var, value })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_format_accepts_known_values() {
        assert_eq!("json".parse::<LogFormat>(), Ok(LogFormat::Json));
        assert_eq!("Pretty".parse::<LogFormat>(), Ok(LogFormat::Pretty));
        assert!("xml".parse::<LogFormat>().is_err());
    }

    #[test]
    fn in_memory_config_has_no_cache() {
        let config = Config::in_memory();
        assert!(matches!(config.storage, StorageConfig::Memory));
        assert!(config.redis.url.is_none());
    }
}
