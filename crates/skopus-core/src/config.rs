use crate::app_config::{AppConfig, Environment};
use crate::geo::Coordinate;
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
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so it can be tested with a `HashMap`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;
    use std::path::PathBuf;
    use std::str::FromStr;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    fn parse_as<T>(var: &str, raw: &str) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        raw.trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    }

    let parse = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        parse_as(var, &or_default(var, default))
    };
    let parse_u32 =
        |var: &str, default: &str| -> Result<u32, ConfigError> { parse_as(var, &or_default(var, default)) };
    let parse_u64 =
        |var: &str, default: &str| -> Result<u64, ConfigError> { parse_as(var, &or_default(var, default)) };
    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        parse_as(var, &or_default(var, default))
    };

    let genai_api_key = require("GEMINI_API_KEY")?;

    let env = parse_environment(&or_default("SKOPUS_ENV", "development"))?;
    let bind_addr = parse("SKOPUS_BIND_ADDR", "0.0.0.0:3000")?;
    let log_level = or_default("SKOPUS_LOG_LEVEL", "info");

    let genai_base_url = or_default(
        "SKOPUS_GENAI_BASE_URL",
        "https://generativelanguage.googleapis.com",
    );
    let search_model = or_default("SKOPUS_SEARCH_MODEL", "gemini-3-flash-preview");
    let draft_model = or_default("SKOPUS_DRAFT_MODEL", "gemini-3-pro-preview");
    let thinking_budget = parse_u32("SKOPUS_THINKING_BUDGET", "2048")?;
    let genai_timeout_secs = parse_u64("SKOPUS_GENAI_TIMEOUT_SECS", "120")?;
    let genai_max_retries = parse_u32("SKOPUS_GENAI_MAX_RETRIES", "2")?;
    let genai_retry_backoff_base_ms = parse_u64("SKOPUS_GENAI_RETRY_BACKOFF_BASE_MS", "1000")?;

    let geocoder_url = or_default("SKOPUS_GEOCODER_URL", "https://nominatim.openstreetmap.org");
    let geocoder_timeout_secs = parse_u64("SKOPUS_GEOCODER_TIMEOUT_SECS", "8")?;
    let geocoder_concurrency = parse_usize("SKOPUS_GEOCODER_CONCURRENCY", "2")?;
    if geocoder_concurrency == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "SKOPUS_GEOCODER_CONCURRENCY".to_string(),
            reason: "must be greater than zero".to_string(),
        });
    }
    let user_agent = or_default("SKOPUS_USER_AGENT", "skopus/0.1 (lead-intelligence)");

    let lead_cap = parse_usize("SKOPUS_LEAD_CAP", "100")?;
    if lead_cap == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "SKOPUS_LEAD_CAP".to_string(),
            reason: "must be greater than zero".to_string(),
        });
    }
    let map_center: Coordinate =
        parse_as("SKOPUS_MAP_CENTER", &or_default("SKOPUS_MAP_CENTER", "-23.5505,-46.6333"))?;
    let map_radius_km = parse_u32("SKOPUS_MAP_RADIUS_KM", "10")?;
    let export_dir = PathBuf::from(or_default("SKOPUS_EXPORT_DIR", "./exports"));

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        genai_api_key,
        genai_base_url,
        search_model,
        draft_model,
        thinking_budget,
        genai_timeout_secs,
        genai_max_retries,
        genai_retry_backoff_base_ms,
        geocoder_url,
        geocoder_timeout_secs,
        geocoder_concurrency,
        user_agent,
        lead_cap,
        map_center,
        map_radius_km,
        export_dir,
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "production" => Ok(Environment::Production),
        "test" => Ok(Environment::Test),
        other => Err(ConfigError::InvalidEnvVar {
            var: "SKOPUS_ENV".to_string(),
            reason: format!("unknown environment \"{other}\""),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
