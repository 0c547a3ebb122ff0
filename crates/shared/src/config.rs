use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config_env::{optional_trimmed_env, parse_u64_env, validate_http_url};

pub const GEMINI_API_KEY_VAR: &str = "GEMINI_API_KEY";

/// Values shipped in the `.env.example` template. A key equal to one of these was never
/// filled in and must be treated as absent.
pub const PLACEHOLDER_API_KEYS: [&str; 2] =
    ["your_gemini_api_key_here", "your_actual_gemini_api_key_here"];

const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";
const DEFAULT_ASSISTANT_OVERALL_DEADLINE_MS: u64 = 120_000;
const DEFAULT_STORE_TIMEOUT_MS: u64 = 10_000;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required env var {0}")]
    MissingVar(String),
    #[error("invalid integer in env var {0}")]
    ParseInt(String),
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error("failed to load .env file: {0}")]
    Dotenv(String),
    #[error("failed to build http client: {0}")]
    HttpClient(String),
}

/// Loads `.env` into the process environment when present. A missing file is fine.
pub fn load_dotenv() -> Result<(), ConfigError> {
    match dotenvy::dotenv() {
        Ok(_) => Ok(()),
        Err(err) if err.not_found() => Ok(()),
        Err(err) => Err(ConfigError::Dotenv(err.to_string())),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiKeyStatus {
    pub configured: bool,
    pub empty: bool,
    pub placeholder: bool,
}

impl ApiKeyStatus {
    pub fn from_value(raw: Option<&str>) -> Self {
        let value = raw.map(str::trim).unwrap_or_default();
        let empty = value.is_empty();
        let placeholder = PLACEHOLDER_API_KEYS.contains(&value);

        Self {
            configured: !empty && !placeholder,
            empty,
            placeholder,
        }
    }

    pub fn from_env() -> Self {
        Self::from_value(optional_trimmed_env(GEMINI_API_KEY_VAR).as_deref())
    }
}

/// Whether the assistant backend can be used at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ConfigurationStatus {
    pub configured: bool,
}

impl ConfigurationStatus {
    pub const fn configured() -> Self {
        Self { configured: true }
    }

    pub const fn unconfigured() -> Self {
        Self { configured: false }
    }

    pub fn from_env() -> Self {
        ApiKeyStatus::from_env().into()
    }
}

impl From<ApiKeyStatus> for ConfigurationStatus {
    fn from(status: ApiKeyStatus) -> Self {
        Self {
            configured: status.configured,
        }
    }
}

/// The configuration gate: true only for a present, non-placeholder API key.
pub fn is_ai_available() -> bool {
    ConfigurationStatus::from_env().configured
}

#[derive(Debug, Clone)]
pub struct SupabaseSettings {
    pub url: String,
    pub anon_key: String,
    pub timeout_ms: u64,
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub bind_addr: String,
    pub assistant_overall_deadline_ms: u64,
    pub supabase: Option<SupabaseSettings>,
}

impl ApiConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let assistant_overall_deadline_ms = parse_u64_env(
            "ASSISTANT_OVERALL_DEADLINE_MS",
            DEFAULT_ASSISTANT_OVERALL_DEADLINE_MS,
        )?;
        if assistant_overall_deadline_ms == 0 {
            return Err(ConfigError::InvalidConfiguration(
                "ASSISTANT_OVERALL_DEADLINE_MS must be greater than 0".to_string(),
            ));
        }

        Ok(Self {
            bind_addr: optional_trimmed_env("API_BIND_ADDR")
                .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            assistant_overall_deadline_ms,
            supabase: supabase_settings_from_env()?,
        })
    }
}

fn supabase_settings_from_env() -> Result<Option<SupabaseSettings>, ConfigError> {
    let url = optional_trimmed_env("SUPABASE_URL");
    let anon_key = optional_trimmed_env("SUPABASE_ANON_KEY");

    match (url, anon_key) {
        (Some(url), Some(anon_key)) => {
            validate_http_url("SUPABASE_URL", &url)?;
            Ok(Some(SupabaseSettings {
                url: url.trim_end_matches('/').to_string(),
                anon_key,
                timeout_ms: parse_u64_env("STORE_TIMEOUT_MS", DEFAULT_STORE_TIMEOUT_MS)?,
            }))
        }
        (None, None) => Ok(None),
        (Some(_), None) => Err(ConfigError::MissingVar("SUPABASE_ANON_KEY".to_string())),
        (None, Some(_)) => Err(ConfigError::MissingVar("SUPABASE_URL".to_string())),
    }
}
