use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so tests can drive it with a plain
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_addr = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        or_default(var, default)
            .parse::<SocketAddr>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        or_default(var, default)
            .parse::<usize>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_positive_f64 = |var: &str, default: &str| -> Result<f64, ConfigError> {
        let value = or_default(var, default)
            .parse::<f64>()
            .map_err(|e| invalid(var, e.to_string()))?;
        if !value.is_finite() || value <= 0.0 {
            return Err(invalid(var, "must be a positive number".to_string()));
        }
        Ok(value)
    };

    let database_url = or_default("DATABASE_URL", "sqlite://bikeshare.db");
    let env = parse_environment(&or_default("BIKESHARE_ENV", "development"))?;
    let bind_addr = parse_addr("BIKESHARE_BIND_ADDR", "0.0.0.0:5000")?;
    let log_level = or_default("BIKESHARE_LOG_LEVEL", "info");

    let feed_url = or_default("BIKESHARE_FEED_URL", "https://bmorebikeshare.com/stations/");
    let feed_timeout_secs = parse_u64("BIKESHARE_FEED_TIMEOUT_SECS", "30")?;
    if feed_timeout_secs == 0 {
        return Err(invalid(
            "BIKESHARE_FEED_TIMEOUT_SECS",
            "timeout must be at least one second".to_string(),
        ));
    }
    let feed_user_agent = or_default(
        "BIKESHARE_FEED_USER_AGENT",
        "bikeshare/0.1 (station-availability)",
    );

    let counts_refresh_cron = or_default("BIKESHARE_COUNTS_CRON", "0 */15 * * * *");
    let stations_refresh_cron = or_default("BIKESHARE_STATIONS_CRON", "0 0 4 * * *");

    let nearest_radius_miles = parse_positive_f64("BIKESHARE_NEAREST_RADIUS_MILES", "10")?;
    let nearest_limit = parse_usize("BIKESHARE_NEAREST_LIMIT", "10")?;

    let db_max_connections = parse_u32("BIKESHARE_DB_MAX_CONNECTIONS", "5")?;
    let db_min_connections = parse_u32("BIKESHARE_DB_MIN_CONNECTIONS", "1")?;
    let db_acquire_timeout_secs = parse_u64("BIKESHARE_DB_ACQUIRE_TIMEOUT_SECS", "10")?;

    Ok(AppConfig {
        database_url,
        env,
        bind_addr,
        log_level,
        feed_url,
        feed_timeout_secs,
        feed_user_agent,
        counts_refresh_cron,
        stations_refresh_cron,
        nearest_radius_miles,
        nearest_limit,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "BIKESHARE_ENV".to_string(),
            reason: format!("unknown environment \"{other}\""),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
