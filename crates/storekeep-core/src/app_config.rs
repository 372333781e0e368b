use std::net::SocketAddr;
use std::path::PathBuf;

use crate::ConfigError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Credentials and endpoint for the Polar payments API.
#[derive(Clone)]
pub struct PolarConfig {
    pub access_token: String,
    pub organization_id: String,
    pub base_url: String,
}

impl std::fmt::Debug for PolarConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PolarConfig")
            .field("access_token", &"[redacted]")
            .field("organization_id", &self.organization_id)
            .field("base_url", &self.base_url)
            .finish()
    }
}

/// Project URL and key for the Supabase REST gateway.
#[derive(Clone)]
pub struct SupabaseConfig {
    pub url: String,
    pub key: String,
}

impl std::fmt::Debug for SupabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SupabaseConfig")
            .field("url", &self.url)
            .field("key", &"[redacted]")
            .finish()
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub http_timeout_secs: u64,
    pub index_html_path: PathBuf,
    pub polar_api_token: Option<String>,
    pub polar_org_id: Option<String>,
    pub polar_api_base_url: String,
    pub supabase_url: Option<String>,
    /// Service-role key, or the anon key when no service key is configured.
    pub supabase_key: Option<String>,
    /// Public anon key; the only Supabase credential ever served to browsers.
    pub supabase_anon_key: Option<String>,
}

impl AppConfig {
    /// Polar credentials, required by every command that talks to Polar.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingEnvVar`] naming the first unset variable.
    pub fn polar(&self) -> Result<PolarConfig, ConfigError> {
        let access_token = self
            .polar_api_token
            .clone()
            .ok_or_else(|| ConfigError::MissingEnvVar("POLAR_API_TOKEN".to_string()))?;
        let organization_id = self
            .polar_org_id
            .clone()
            .ok_or_else(|| ConfigError::MissingEnvVar("POLAR_ORG_ID".to_string()))?;
        Ok(PolarConfig {
            access_token,
            organization_id,
            base_url: self.polar_api_base_url.clone(),
        })
    }

    /// Supabase URL and key, required by every command that reads the local catalog.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingEnvVar`] naming the first unset variable.
    pub fn supabase(&self) -> Result<SupabaseConfig, ConfigError> {
        let url = self
            .supabase_url
            .clone()
            .ok_or_else(|| ConfigError::MissingEnvVar("SUPABASE_URL".to_string()))?;
        let key = self.supabase_key.clone().ok_or_else(|| {
            ConfigError::MissingEnvVar("SUPABASE_SERVICE_ROLE_KEY".to_string())
        })?;
        Ok(SupabaseConfig { url, key })
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("http_timeout_secs", &self.http_timeout_secs)
            .field("index_html_path", &self.index_html_path)
            .field(
                "polar_api_token",
                &self.polar_api_token.as_ref().map(|_| "[redacted]"),
            )
            .field("polar_org_id", &self.polar_org_id)
            .field("polar_api_base_url", &self.polar_api_base_url)
            .field("supabase_url", &self.supabase_url)
            .field(
                "supabase_key",
                &self.supabase_key.as_ref().map(|_| "[redacted]"),
            )
            .field(
                "supabase_anon_key",
                &self.supabase_anon_key.as_ref().map(|_| "[redacted]"),
            )
            .finish()
    }
}
