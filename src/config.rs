use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "MedXact";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

pub const DEFAULT_PORT: u16 = 4000;
pub const DEFAULT_LLM_API_URL: &str = "https://api.together.xyz/v1/chat/completions";
pub const DEFAULT_LLM_MODEL: &str = "mistralai/Mixtral-8x7B-Instruct-v0.1";
pub const DEFAULT_LLM_TIMEOUT_SECS: u64 = 15;

/// Log filter used when `RUST_LOG` is unset.
pub fn default_log_filter() -> &'static str {
    "medxact=info,medxact_lib=info,tower_http=info"
}

/// Get the application data directory.
/// Platform data dir (e.g. ~/.local/share/MedXact), or ./MedXact when unknown.
pub fn app_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

pub fn default_database_path() -> PathBuf {
    app_data_dir().join("medxact.db")
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },
}

/// Runtime settings, read from the environment.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    pub database_path: PathBuf,
    /// Empty when unset; advisory calls then fail upstream with 401.
    pub llm_api_key: String,
    pub llm_api_url: String,
    pub llm_model: String,
    pub llm_timeout_secs: u64,
    /// Custom specialization access table; the bundled one is used when `None`.
    pub access_rules_path: Option<PathBuf>,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Unset or blank keys take defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let port = match get("PORT") {
            Some(v) => v
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidValue { key: "PORT", value: v })?,
            None => DEFAULT_PORT,
        };
        let ip = match get("BIND_ADDR") {
            Some(v) => v
                .parse::<IpAddr>()
                .map_err(|_| ConfigError::InvalidValue { key: "BIND_ADDR", value: v })?,
            None => IpAddr::V4(Ipv4Addr::UNSPECIFIED),
        };
        let llm_timeout_secs = match get("LLM_TIMEOUT_SECS") {
            Some(v) => v.parse::<u64>().map_err(|_| ConfigError::InvalidValue {
                key: "LLM_TIMEOUT_SECS",
                value: v,
            })?,
            None => DEFAULT_LLM_TIMEOUT_SECS,
        };

        Ok(Self {
            bind_addr: SocketAddr::new(ip, port),
            database_path: get("DATABASE_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(default_database_path),
            llm_api_key: get("TOGETHER_API_KEY").unwrap_or_default(),
            llm_api_url: get("LLM_API_URL").unwrap_or_else(|| DEFAULT_LLM_API_URL.to_string()),
            llm_model: get("LLM_MODEL").unwrap_or_else(|| DEFAULT_LLM_MODEL.to_string()),
            llm_timeout_secs,
            access_rules_path: get("ACCESS_RULES_PATH").map(PathBuf::from),
        })
    }
}
