use serde::Deserialize;
use std::env;
use std::str::FromStr;

// Главная структура конфигурации - по секции на каждую область
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub app: AppConfig,
    pub database: DatabaseConfig,
    pub gateway: GatewayConfig,
    pub circuit_breaker: CircuitBreakerConfig,
    pub features: FeatureFlags,
}

// Настройки приложения
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub environment: String,
    pub rust_log: String,
}

// Настройки базы данных; без URL сервер работает на хранилище в памяти
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: Option<String>,
    pub pool_size: u32,
}

// Куда клиент плана зала отправляет изменения столов
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayConfig {
    pub base_url: String,
    pub timeout_seconds: u64,
}

// Настройки Circuit Breaker
#[derive(Debug, Clone, Deserialize)]
pub struct CircuitBreakerConfig {
    pub failure_threshold: u32,
    pub timeout_seconds: u64,
}

// Feature flags для включения/выключения функциональности
#[derive(Debug, Clone, Deserialize)]
pub struct FeatureFlags {
    pub seed_demo_data: bool,
}

#[derive(Debug, thiserror::Error)]
#[error("{key} has invalid value '{value}'")]
pub struct ConfigError {
    pub key: &'static str,
    pub value: String,
}

fn parse_or<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(key) {
        Some(value) => value.trim().parse().map_err(|_| ConfigError { key, value }),
        None => Ok(default),
    }
}

fn string_or(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: &str) -> String {
    lookup(key).unwrap_or_else(|| default.to_string())
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        Ok(Config {
            app: AppConfig {
                host: string_or(&lookup, "HOST", "0.0.0.0"),
                port: parse_or(&lookup, "PORT", 8000)?,
                environment: string_or(&lookup, "ENVIRONMENT", "development"),
                rust_log: string_or(&lookup, "RUST_LOG", "floorplan_admin=debug,tower_http=debug"),
            },
            database: DatabaseConfig {
                url: lookup("DATABASE_URL").filter(|url| !url.is_empty()),
                pool_size: parse_or(&lookup, "DB_POOL_SIZE", 20)?,
            },
            gateway: GatewayConfig {
                base_url: string_or(&lookup, "API_BASE_URL", "http://localhost:8000"),
                timeout_seconds: parse_or(&lookup, "GATEWAY_TIMEOUT_SECONDS", 10)?,
            },
            circuit_breaker: CircuitBreakerConfig {
                failure_threshold: parse_or(&lookup, "CIRCUIT_BREAKER_FAILURE_THRESHOLD", 5)?,
                timeout_seconds: parse_or(&lookup, "CIRCUIT_BREAKER_TIMEOUT_SECONDS", 30)?,
            },
            features: FeatureFlags {
                seed_demo_data: parse_or(&lookup, "SEED_DEMO_DATA", true)?,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_without_environment() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.app.port, 8000);
        assert!(config.database.url.is_none());
        assert_eq!(config.circuit_breaker.failure_threshold, 5);
        assert!(config.features.seed_demo_data);
    }

    #[test]
    fn reads_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("PORT", "9090"),
            ("DATABASE_URL", "postgres://localhost/floor"),
            ("SEED_DEMO_DATA", "false"),
            ("API_BASE_URL", "http://api:8000"),
        ]))
        .unwrap();
        assert_eq!(config.app.port, 9090);
        assert_eq!(config.database.url.as_deref(), Some("postgres://localhost/floor"));
        assert!(!config.features.seed_demo_data);
        assert_eq!(config.gateway.base_url, "http://api:8000");
    }

    #[test]
    fn invalid_number_is_an_error() {
        let err = Config::from_lookup(lookup(&[("PORT", "eighty")])).unwrap_err();
        assert_eq!(err.key, "PORT");
    }
}
