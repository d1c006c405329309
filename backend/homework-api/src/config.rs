use serde::Deserialize;
use std::env;
use std::str::FromStr;

use config::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Memory,
    Mongo,
}

impl FromStr for StoreBackend {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "memory" => Ok(StoreBackend::Memory),
            "mongo" | "mongodb" => Ok(StoreBackend::Mongo),
            other => Err(ConfigError::Message(format!(
                "Invalid store backend: {}",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub bind_addr: String,
    pub store_backend: StoreBackend,
    pub mongo_uri: String,
    pub mongo_database: String,
    pub min_answers_to_submit: usize,
    pub retry_max_attempts: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8082".to_string(),
            store_backend: StoreBackend::Memory,
            mongo_uri: "mongodb://localhost:27017".to_string(),
            mongo_database: "homework".to_string(),
            min_answers_to_submit: 0,
            retry_max_attempts: 5,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        // Root .env first, then the local one
        if env::var("SKIP_ROOT_ENV").is_ok() || dotenvy::from_path("../../.env").is_err() {
            dotenvy::dotenv().ok();
        }

        // Determine environment (defaults to dev)
        let app_env = env::var("APP_ENV").unwrap_or_else(|_| "dev".to_string());

        // Build configuration from config/*.toml + ENV overrides
        let settings = config::Config::builder()
            .add_source(config::File::with_name(&format!("config/{}", app_env)).required(false))
            .add_source(config::Environment::with_prefix("APP").separator("__"))
            .build()?;

        let defaults = Config::default();

        let bind_addr = settings
            .get_string("server.bind_addr")
            .or_else(|_| env::var("BIND_ADDR"))
            .unwrap_or(defaults.bind_addr);

        let store_backend = match settings.get_string("store.backend") {
            Ok(value) => value.parse()?,
            Err(ConfigError::NotFound(_)) => defaults.store_backend,
            Err(e) => return Err(e),
        };

        let mongo_uri = settings
            .get_string("database.mongo_uri")
            .or_else(|_| env::var("MONGO_URI"))
            .unwrap_or(defaults.mongo_uri);

        let mongo_database = settings
            .get_string("database.mongo_database")
            .or_else(|_| env::var("MONGO_DATABASE"))
            .unwrap_or(defaults.mongo_database);

        let min_answers_to_submit = read_count(
            &settings,
            "engine.min_answers_to_submit",
            defaults.min_answers_to_submit,
        )?;
        let retry_max_attempts =
            read_count(&settings, "retry.max_attempts", defaults.retry_max_attempts)?.max(1);

        Ok(Config {
            bind_addr,
            store_backend,
            mongo_uri,
            mongo_database,
            min_answers_to_submit,
            retry_max_attempts,
        })
    }
}

fn read_count(settings: &config::Config, key: &str, default: usize) -> Result<usize, ConfigError> {
    match settings.get_int(key) {
        Ok(value) => usize::try_from(value)
            .map_err(|_| ConfigError::Message(format!("{} must not be negative", key))),
        Err(ConfigError::NotFound(_)) => Ok(default),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear_overrides() {
        for key in [
            "APP__ENGINE__MIN_ANSWERS_TO_SUBMIT",
            "APP__STORE__BACKEND",
            "APP__RETRY__MAX_ATTEMPTS",
        ] {
            env::remove_var(key);
        }
    }

    #[test]
    #[serial]
    fn defaults_apply_without_overrides() {
        clear_overrides();
        env::set_var("SKIP_ROOT_ENV", "1");

        let config = Config::load().unwrap();
        assert_eq!(config.min_answers_to_submit, 0);
        assert_eq!(config.store_backend, StoreBackend::Memory);
        assert!(config.retry_max_attempts >= 1);
    }

    #[test]
    #[serial]
    fn environment_overrides_engine_policy() {
        clear_overrides();
        env::set_var("SKIP_ROOT_ENV", "1");
        env::set_var("APP__ENGINE__MIN_ANSWERS_TO_SUBMIT", "2");
        env::set_var("APP__STORE__BACKEND", "mongo");

        let config = Config::load().unwrap();
        assert_eq!(config.min_answers_to_submit, 2);
        assert_eq!(config.store_backend, StoreBackend::Mongo);

        clear_overrides();
    }

    #[test]
    #[serial]
    fn unknown_backend_is_a_load_error() {
        clear_overrides();
        env::set_var("SKIP_ROOT_ENV", "1");
        env::set_var("APP__STORE__BACKEND", "sqlite");

        assert!(Config::load().is_err());

        clear_overrides();
    }

    #[test]
    fn backend_names_parse() {
        assert_eq!("MongoDB".parse::<StoreBackend>().unwrap(), StoreBackend::Mongo);
        assert!("redis".parse::<StoreBackend>().is_err());
    }
}
