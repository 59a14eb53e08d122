use std::path::PathBuf;

use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files — useful for testing
/// or when the caller manages env setup.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// The parsing/validation logic is decoupled from the actual environment so it
/// can be tested with a pure `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var).map_err(|_| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default =
        |var: &str, default: &str| -> String { lookup(var).unwrap_or_else(|_| default.to_string()) };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_bool_flag = |var: &str, default: &str| -> Result<bool, ConfigError> {
        let raw = or_default(var, default);
        crate::normalize::parse_bool(&raw).map_err(|reason| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason,
        })
    };

    let database_url = require("DATABASE_URL")?;
    let retail_api_base = require("BEERDB_RETAIL_API_BASE")?;
    let retail_api_v3_base = require("BEERDB_RETAIL_API_V3_BASE")?;
    let community_base_url = require("BEERDB_COMMUNITY_BASE_URL")?;

    let env = parse_environment(&or_default("BEERDB_ENV", "development"));
    let log_level = or_default("BEERDB_LOG_LEVEL", "info");
    let categories_path = PathBuf::from(or_default(
        "BEERDB_CATEGORIES_PATH",
        "./config/categories.yaml",
    ));
    let auto_accept_wrong_match = parse_bool_flag("BEERDB_AUTO_ACCEPT_WRONG_MATCH", "false")?;

    let db_max_connections = parse_u32("BEERDB_DB_MAX_CONNECTIONS", "10")?;
    let db_min_connections = parse_u32("BEERDB_DB_MIN_CONNECTIONS", "1")?;
    let db_acquire_timeout_secs = parse_u64("BEERDB_DB_ACQUIRE_TIMEOUT_SECS", "10")?;

    let http_request_timeout_secs = parse_u64("BEERDB_HTTP_REQUEST_TIMEOUT_SECS", "30")?;
    let http_user_agent = or_default("BEERDB_HTTP_USER_AGENT", "beerdb/0.1 (catalog-sync)");
    let http_inter_request_delay_ms = parse_u64("BEERDB_HTTP_INTER_REQUEST_DELAY_MS", "1000")?;

    Ok(AppConfig {
        database_url,
        env,
        log_level,
        retail_api_base,
        retail_api_v3_base,
        community_base_url,
        categories_path,
        auto_accept_wrong_match,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
        http_request_timeout_secs,
        http_user_agent,
        http_inter_request_delay_ms,
    })
}

fn parse_environment(raw: &str) -> Environment {
    match raw.to_ascii_lowercase().as_str() {
        "test" => Environment::Test,
        "production" | "prod" => Environment::Production,
        _ => Environment::Development,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn base_env() -> HashMap<&'static str, &'static str> {
        HashMap::from([
            ("DATABASE_URL", "postgres://localhost/beerdb"),
            ("BEERDB_RETAIL_API_BASE", "https://retail.example/api/v2/"),
            ("BEERDB_RETAIL_API_V3_BASE", "https://retail.example/api/v3/"),
            ("BEERDB_COMMUNITY_BASE_URL", "https://community.example"),
        ])
    }

    fn build(env: &HashMap<&str, &str>) -> Result<AppConfig, ConfigError> {
        build_app_config(|key| {
            env.get(key)
                .map(|v| (*v).to_string())
                .ok_or(std::env::VarError::NotPresent)
        })
    }

    #[test]
    fn loads_with_defaults() {
        let config = build(&base_env()).unwrap();

        assert_eq!(config.env, Environment::Development);
        assert_eq!(config.log_level, "info");
        assert_eq!(config.db_max_connections, 10);
        assert_eq!(config.http_inter_request_delay_ms, 1000);
        assert!(!config.auto_accept_wrong_match);
    }

    #[test]
    fn missing_database_url_is_an_error() {
        let mut env = base_env();
        env.remove("DATABASE_URL");

        let err = build(&env).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(var) if var == "DATABASE_URL"));
    }

    #[test]
    fn missing_retail_base_is_an_error() {
        let mut env = base_env();
        env.remove("BEERDB_RETAIL_API_BASE");

        assert!(build(&env).is_err());
    }

    #[test]
    fn invalid_numeric_value_is_an_error() {
        let mut env = base_env();
        env.insert("BEERDB_DB_MAX_CONNECTIONS", "lots");

        let err = build(&env).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidEnvVar { var, .. } if var == "BEERDB_DB_MAX_CONNECTIONS"
        ));
    }

    #[test]
    fn auto_accept_flag_parses_truthy_values() {
        let mut env = base_env();
        env.insert("BEERDB_AUTO_ACCEPT_WRONG_MATCH", "yes");

        let config = build(&env).unwrap();
        assert!(config.auto_accept_wrong_match);
    }

    #[test]
    fn environment_names_parse() {
        let mut env = base_env();
        env.insert("BEERDB_ENV", "production");
        assert_eq!(build(&env).unwrap().env, Environment::Production);

        env.insert("BEERDB_ENV", "test");
        assert_eq!(build(&env).unwrap().env, Environment::Test);

        env.insert("BEERDB_ENV", "anything-else");
        assert_eq!(build(&env).unwrap().env, Environment::Development);
    }
}
