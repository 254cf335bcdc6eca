use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value fails to parse.
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
/// Returns `ConfigError` if a value fails to parse.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// This is the core parsing/validation logic, decoupled from the actual environment
/// so it can be tested with a pure `HashMap` lookup — no `set_var`/`remove_var` needed.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

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

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<usize>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let env = parse_environment(&or_default("LOTMARK_ENV", "development"));
    let log_level = or_default("LOTMARK_LOG_LEVEL", "info");
    let maps_api_key = lookup("LOTMARK_MAPS_API_KEY").ok();
    let key_store_path = PathBuf::from(or_default(
        "LOTMARK_KEY_STORE_PATH",
        "./config/maps-key.json",
    ));

    let request_timeout_secs = parse_u64("LOTMARK_REQUEST_TIMEOUT_SECS", "10")?;
    let user_agent = or_default("LOTMARK_USER_AGENT", "lotmark/0.1 (address-resolution)");
    let suggest_debounce_ms = parse_u64("LOTMARK_SUGGEST_DEBOUNCE_MS", "300")?;

    let country_restriction = match lookup("LOTMARK_COUNTRY_RESTRICTION") {
        Ok(raw) => Some(parse_country_code(&raw)?),
        Err(_) => None,
    };

    let readiness_max_attempts = parse_u32("LOTMARK_READINESS_MAX_ATTEMPTS", "3")?;
    let key_change_max = parse_usize("LOTMARK_KEY_CHANGE_MAX", "5")?;
    let key_change_window_secs = parse_u64("LOTMARK_KEY_CHANGE_WINDOW_SECS", "300")?;

    Ok(AppConfig {
        env,
        log_level,
        maps_api_key,
        key_store_path,
        request_timeout_secs,
        user_agent,
        suggest_debounce_ms,
        country_restriction,
        readiness_max_attempts,
        key_change_max,
        key_change_window_secs,
    })
}

/// Parse a string into an `Environment` variant.
///
/// Unrecognized values default to `Environment::Development`.
fn parse_environment(s: &str) -> Environment {
    match s {
        "production" => Environment::Production,
        "test" => Environment::Test,
        _ => Environment::Development,
    }
}

/// Validate and lowercase an ISO 3166-1 alpha-2 country code.
fn parse_country_code(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim();
    if trimmed.len() == 2 && trimmed.chars().all(|c| c.is_ascii_alphabetic()) {
        Ok(trimmed.to_ascii_lowercase())
    } else {
        Err(ConfigError::InvalidEnvVar {
            var: "LOTMARK_COUNTRY_RESTRICTION".to_string(),
            reason: format!("expected a two-letter country code, got \"{raw}\""),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::env::VarError;

    use super::*;

    fn lookup_from_map<'a>(
        map: &'a HashMap<&'a str, &'a str>,
    ) -> impl Fn(&str) -> Result<String, VarError> + 'a {
        move |key| {
            map.get(key)
                .map(|v| (*v).to_string())
                .ok_or(VarError::NotPresent)
        }
    }

    #[test]
    fn parse_environment_production() {
        assert_eq!(parse_environment("production"), Environment::Production);
    }

    #[test]
    fn parse_environment_unknown_defaults_to_development() {
        assert_eq!(parse_environment("staging"), Environment::Development);
    }

    #[test]
    fn build_app_config_succeeds_with_empty_env() {
        let map: HashMap<&str, &str> = HashMap::new();
        let cfg = build_app_config(lookup_from_map(&map)).expect("defaults should suffice");
        assert_eq!(cfg.env, Environment::Development);
        assert_eq!(cfg.log_level, "info");
        assert!(cfg.maps_api_key.is_none());
        assert_eq!(cfg.request_timeout_secs, 10);
        assert_eq!(cfg.suggest_debounce_ms, 300);
        assert!(cfg.country_restriction.is_none());
        assert_eq!(cfg.readiness_max_attempts, 3);
        assert_eq!(cfg.key_change_max, 5);
        assert_eq!(cfg.key_change_window_secs, 300);
    }

    #[test]
    fn build_app_config_reads_api_key() {
        let mut map = HashMap::new();
        map.insert("LOTMARK_MAPS_API_KEY", "AIzaTestKey_0000000000000000000000");
        let cfg = build_app_config(lookup_from_map(&map)).unwrap();
        assert!(cfg.maps_api_key.is_some());
    }

    #[test]
    fn build_app_config_timeout_override() {
        let mut map = HashMap::new();
        map.insert("LOTMARK_REQUEST_TIMEOUT_SECS", "30");
        let cfg = build_app_config(lookup_from_map(&map)).unwrap();
        assert_eq!(cfg.request_timeout_secs, 30);
    }

    #[test]
    fn build_app_config_timeout_invalid() {
        let mut map = HashMap::new();
        map.insert("LOTMARK_REQUEST_TIMEOUT_SECS", "not-a-number");
        let result = build_app_config(lookup_from_map(&map));
        assert!(
            matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "LOTMARK_REQUEST_TIMEOUT_SECS"),
            "expected InvalidEnvVar(LOTMARK_REQUEST_TIMEOUT_SECS), got: {result:?}"
        );
    }

    #[test]
    fn build_app_config_country_restriction_lowercased() {
        let mut map = HashMap::new();
        map.insert("LOTMARK_COUNTRY_RESTRICTION", "US");
        let cfg = build_app_config(lookup_from_map(&map)).unwrap();
        assert_eq!(cfg.country_restriction.as_deref(), Some("us"));
    }

    #[test]
    fn build_app_config_country_restriction_invalid() {
        let mut map = HashMap::new();
        map.insert("LOTMARK_COUNTRY_RESTRICTION", "USA");
        let result = build_app_config(lookup_from_map(&map));
        assert!(
            matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "LOTMARK_COUNTRY_RESTRICTION"),
            "expected InvalidEnvVar(LOTMARK_COUNTRY_RESTRICTION), got: {result:?}"
        );
    }

    #[test]
    fn build_app_config_debounce_override() {
        let mut map = HashMap::new();
        map.insert("LOTMARK_SUGGEST_DEBOUNCE_MS", "150");
        let cfg = build_app_config(lookup_from_map(&map)).unwrap();
        assert_eq!(cfg.suggest_debounce_ms, 150);
    }

    #[test]
    fn build_app_config_key_change_window_invalid() {
        let mut map = HashMap::new();
        map.insert("LOTMARK_KEY_CHANGE_WINDOW_SECS", "five minutes");
        let result = build_app_config(lookup_from_map(&map));
        assert!(
            matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "LOTMARK_KEY_CHANGE_WINDOW_SECS"),
            "expected InvalidEnvVar(LOTMARK_KEY_CHANGE_WINDOW_SECS), got: {result:?}"
        );
    }
}
