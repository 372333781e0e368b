//! `env-check`: which configuration variables are present, and whether the
//! rest of the configuration parses. Secret values are never printed.

use std::env::VarError;

use storekeep_core::{build_app_config, AppConfig, ConfigError};

const CREDENTIAL_VARS: [&str; 5] = [
    "SUPABASE_URL",
    "SUPABASE_SERVICE_ROLE_KEY",
    "SUPABASE_ANON_KEY",
    "POLAR_API_TOKEN",
    "POLAR_ORG_ID",
];

pub(crate) struct EnvReport {
    pub presence: Vec<(&'static str, &'static str)>,
    pub config: Result<AppConfig, ConfigError>,
}

/// Presence is computed independently of parsing so an invalid value
/// elsewhere does not hide which credentials are set.
pub(crate) fn env_report<F>(lookup: F) -> EnvReport
where
    F: Fn(&str) -> Result<String, VarError>,
{
    let presence = CREDENTIAL_VARS
        .iter()
        .map(|&var| {
            let set = lookup(var).is_ok_and(|v| !v.trim().is_empty());
            (var, if set { "set" } else { "MISSING" })
        })
        .collect();

    EnvReport {
        presence,
        config: build_app_config(&lookup),
    }
}

/// # Errors
///
/// Returns an error after printing the report if the configuration does not
/// parse.
pub(crate) fn run_env_check() -> anyhow::Result<()> {
    let report = env_report(|key| std::env::var(key));

    for (var, state) in &report.presence {
        println!("   {var:<26} {state}");
    }

    match report.config {
        Ok(config) => {
            println!("   {:<26} {}", "STOREKEEP_ENV", config.env);
            println!("   {:<26} {}", "POLAR_API_BASE_URL", config.polar_api_base_url);
            println!("   {:<26} {}", "STOREKEEP_INDEX_HTML", config.index_html_path.display());
            Ok(())
        }
        Err(e) => {
            println!("   configuration invalid: {e}");
            Err(e.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(map: HashMap<&'static str, &'static str>) -> impl Fn(&str) -> Result<String, VarError> {
        move |key| {
            map.get(key)
                .map(|v| (*v).to_string())
                .ok_or(VarError::NotPresent)
        }
    }

    #[test]
    fn marks_missing_and_blank_credentials() {
        let report = env_report(lookup(HashMap::from([
            ("POLAR_API_TOKEN", "secret"),
            ("SUPABASE_URL", "  "),
        ])));
        assert!(report.presence.contains(&("POLAR_API_TOKEN", "set")));
        assert!(report.presence.contains(&("POLAR_ORG_ID", "MISSING")));
        assert!(report.presence.contains(&("SUPABASE_URL", "MISSING")));
        assert!(report.config.is_ok());
    }

    #[test]
    fn invalid_settings_still_report_presence() {
        let report = env_report(lookup(HashMap::from([
            ("STOREKEEP_ENV", "staging"),
            ("POLAR_API_TOKEN", "secret"),
        ])));
        assert!(report.presence.contains(&("POLAR_API_TOKEN", "set")));
        let err = report.config.err().expect("invalid environment");
        assert!(err.to_string().contains("STOREKEEP_ENV"));
    }

    #[test]
    fn zero_timeout_is_reported_not_fatal_to_the_check() {
        let report = env_report(lookup(HashMap::from([("STOREKEEP_HTTP_TIMEOUT_SECS", "0")])));
        assert_eq!(report.presence.len(), CREDENTIAL_VARS.len());
        assert!(matches!(
            report.config,
            Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "STOREKEEP_HTTP_TIMEOUT_SECS"
        ));
    }
}
