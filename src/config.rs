use crate::upstream::DEFAULT_API_BASE;
use std::path::{Path, PathBuf};

pub const API_KEY_ENV: &str = "OPENAI_API_KEY";
pub const API_BASE_ENV: &str = "OPENAI_API_BASE";
pub const ENV_FILE_NAME: &str = ".env";

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_MAX_PAYLOAD_SIZE: usize = 256 * 1024 * 1024;
pub const DEFAULT_ALLOWED_ORIGINS: [&str; 4] = [
    "http://localhost:3000",
    "http://localhost:3001",
    "http://127.0.0.1:3000",
    "http://127.0.0.1:3001",
];

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error(
        "OPENAI_API_KEY is not set. Add `OPENAI_API_KEY=your_openai_api_key_here` to the .env \
         file or export it before starting the server"
    )]
    MissingApiKey,

    #[error("Invalid value for field '{field}': {value} - {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Failed to load env file {path}: {source}")]
    EnvFile {
        path: String,
        #[source]
        source: dotenvy::Error,
    },
}

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Clone)]
pub struct RelayConfig {
    pub host: String,
    pub port: u16,
    pub api_key: String,
    pub api_base: String,
    pub request_timeout_secs: u64,
    pub allowed_origins: Vec<String>,
    pub max_payload_size: usize,
}

// The key never shows up in Debug output.
impl std::fmt::Debug for RelayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelayConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("api_key", &mask_secret(&self.api_key))
            .field("api_base", &self.api_base)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("allowed_origins", &self.allowed_origins)
            .field("max_payload_size", &self.max_payload_size)
            .finish()
    }
}

impl RelayConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        RelayConfig {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            api_key: api_key.into(),
            api_base: DEFAULT_API_BASE.to_string(),
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
            allowed_origins: DEFAULT_ALLOWED_ORIGINS
                .iter()
                .map(|o| o.to_string())
                .collect(),
            max_payload_size: DEFAULT_MAX_PAYLOAD_SIZE,
        }
    }

    pub fn from_env() -> ConfigResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from an arbitrary variable source. A blank API key
    /// counts as missing.
    pub fn from_lookup<F>(lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup(API_KEY_ENV)
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .ok_or(ConfigError::MissingApiKey)?;

        let mut config = Self::new(api_key);
        if let Some(base) = lookup(API_BASE_ENV).filter(|b| !b.trim().is_empty()) {
            config.api_base = base.trim().to_string();
        }
        Ok(config)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.port == 0 {
            return Err(ConfigError::InvalidValue {
                field: "port".to_string(),
                value: self.port.to_string(),
                reason: "must be non-zero".to_string(),
            });
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "request_timeout_secs".to_string(),
                value: self.request_timeout_secs.to_string(),
                reason: "must be non-zero".to_string(),
            });
        }
        if self.allowed_origins.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "allowed_origins".to_string(),
                value: "[]".to_string(),
                reason: "at least one origin is required".to_string(),
            });
        }
        if !self.api_base.starts_with("http://") && !self.api_base.starts_with("https://") {
            return Err(ConfigError::InvalidValue {
                field: "api_base".to_string(),
                value: self.api_base.clone(),
                reason: "must be an http(s) URL".to_string(),
            });
        }
        Ok(())
    }
}

/// Load `path` into the process environment if it exists. Returns whether
/// the file was found; a missing file is not an error.
pub fn load_env_file(path: &Path) -> ConfigResult<bool> {
    if !path.exists() {
        return Ok(false);
    }
    dotenvy::from_path(path).map_err(|source| ConfigError::EnvFile {
        path: path.display().to_string(),
        source,
    })?;
    Ok(true)
}

/// `.env` next to the executable when present, otherwise `.env` in the
/// working directory. An explicit path always wins.
pub fn resolve_env_path(explicit: Option<&Path>, exe_dir: Option<&Path>) -> PathBuf {
    if let Some(path) = explicit {
        return path.to_path_buf();
    }
    if let Some(candidate) = exe_dir.map(|dir| dir.join(ENV_FILE_NAME)) {
        if candidate.exists() {
            return candidate;
        }
    }
    PathBuf::from(ENV_FILE_NAME)
}

/// Shows at most 8 characters and never more than half of the secret.
pub fn mask_secret(secret: &str) -> String {
    let len = secret.chars().count();
    let visible: String = secret.chars().take(std::cmp::min(8, len / 2)).collect();
    format!("{}...", visible)
}
