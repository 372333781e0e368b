use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

const DEFAULT_POLAR_API_BASE_URL: &str = "https://api.polar.sh";

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
/// Decoupled from the process environment so it can be tested with a plain
/// `HashMap` lookup. Credentials are optional here; [`AppConfig::polar`] and
/// [`AppConfig::supabase`] enforce them per command.
///
/// # Errors
///
/// Returns `ConfigError::InvalidEnvVar` for the first present but invalid value.
pub fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;
    use std::path::PathBuf;

    // Blank values are treated as unset.
    let optional = |var: &str| -> Option<String> {
        lookup(var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let or_default =
        |var: &str, default: &str| -> String { optional(var).unwrap_or_else(|| default.to_string()) };

    let parse_addr = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar {
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

    let env = parse_environment(&or_default("STOREKEEP_ENV", "development"))?;
    let bind_addr = parse_addr("STOREKEEP_BIND_ADDR", "0.0.0.0:3000")?;
    let log_level = or_default("STOREKEEP_LOG_LEVEL", "info");
    let http_timeout_secs = parse_u64("STOREKEEP_HTTP_TIMEOUT_SECS", "30")?;
    if http_timeout_secs == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "STOREKEEP_HTTP_TIMEOUT_SECS".to_string(),
            reason: "must be greater than zero".to_string(),
        });
    }
    let index_html_path = PathBuf::from(or_default("STOREKEEP_INDEX_HTML", "./index.html"));

    let polar_api_token = optional("POLAR_API_TOKEN");
    let polar_org_id = optional("POLAR_ORG_ID");
    let polar_api_base_url = or_default("POLAR_API_BASE_URL", DEFAULT_POLAR_API_BASE_URL);

    let supabase_url = optional("SUPABASE_URL");
    let supabase_anon_key = optional("SUPABASE_ANON_KEY");
    let supabase_key = optional("SUPABASE_SERVICE_ROLE_KEY").or_else(|| supabase_anon_key.clone());

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        http_timeout_secs,
        index_html_path,
        polar_api_token,
        polar_org_id,
        polar_api_base_url,
        supabase_url,
        supabase_key,
        supabase_anon_key,
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "STOREKEEP_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}
