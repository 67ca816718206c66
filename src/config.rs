use serde::Deserialize;
use std::env;
use std::sync::OnceLock;
use thiserror::Error;

const DEFAULT_SERVER_PORT: u16 = 8080;
const DEFAULT_SUMMARY_ENDPOINT: &str = "http://127.0.0.1:11434";
const DEFAULT_SUMMARY_MODEL: &str = "llama3";
const DEFAULT_STUDENT_ID_MAX: i64 = 999;

/// Errors encountered while loading configuration from environment variables.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Environment variable contained a value that could not be parsed.
    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(String),
}

/// Runtime configuration for the student registry server.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Port the HTTP listener binds on all interfaces.
    pub server_port: u16,
    /// Base URL of the text-generation service used for summaries.
    pub summary_endpoint: String,
    /// Model identifier passed to the text-generation service.
    pub summary_model: String,
    /// Optional request timeout for summary calls, in seconds.
    pub summary_timeout_secs: Option<u64>,
    /// Policy used to assign IDs to newly created students.
    pub id_allocation: IdAllocation,
    /// Inclusive upper bound for randomly drawn IDs.
    pub student_id_max: i64,
    /// Optional log file path; `None` selects the default under `logs/`.
    pub log_file: Option<String>,
}

/// Strategy for assigning IDs on create.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdAllocation {
    /// Uniform draw from `0..=student_id_max`; a collision replaces the existing record.
    #[default]
    Random,
    /// Monotonic counter starting at 1.
    Sequential,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: DEFAULT_SERVER_PORT,
            summary_endpoint: DEFAULT_SUMMARY_ENDPOINT.to_string(),
            summary_model: DEFAULT_SUMMARY_MODEL.to_string(),
            summary_timeout_secs: None,
            id_allocation: IdAllocation::Random,
            student_id_max: DEFAULT_STUDENT_ID_MAX,
            log_file: None,
        }
    }
}

impl Config {
    /// Load configuration from environment variables, performing validation along the way.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let student_id_max = parse_optional("STUDENT_ID_MAX")?.unwrap_or(defaults.student_id_max);
        if student_id_max < 0 {
            return Err(ConfigError::InvalidValue("STUDENT_ID_MAX".into()));
        }

        Ok(Self {
            server_port: parse_optional("SERVER_PORT")?.unwrap_or(defaults.server_port),
            summary_endpoint: load_env_optional("SUMMARY_ENDPOINT")
                .unwrap_or(defaults.summary_endpoint),
            summary_model: load_env_optional("SUMMARY_MODEL").unwrap_or(defaults.summary_model),
            summary_timeout_secs: parse_optional("SUMMARY_TIMEOUT_SECS")?,
            id_allocation: load_env_optional("STUDENT_ID_ALLOCATION")
                .map(|value| {
                    value.parse().map_err(|()| {
                        ConfigError::InvalidValue("STUDENT_ID_ALLOCATION".to_string())
                    })
                })
                .transpose()?
                .unwrap_or_default(),
            student_id_max,
            log_file: load_env_optional("STUDENTS_LOG_FILE"),
        })
    }
}

fn load_env_optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_optional<T: std::str::FromStr>(key: &str) -> Result<Option<T>, ConfigError> {
    load_env_optional(key)
        .map(|value| {
            value
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue(key.to_string()))
        })
        .transpose()
}

impl std::str::FromStr for IdAllocation {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "random" => Ok(Self::Random),
            "sequential" => Ok(Self::Sequential),
            _ => Err(()),
        }
    }
}

/// Global configuration cache populated during process start.
pub static CONFIG: OnceLock<Config> = OnceLock::new();

/// Retrieve the loaded configuration, panicking if initialization has not occurred.
pub fn get_config() -> &'static Config {
    CONFIG.get().expect("Config not initialized")
}

/// Load `.env` and the process environment, then install the result in the global cache.
///
/// Runs before tracing is set up so that `RUST_LOG` and `STUDENTS_LOG_FILE` from `.env` reach the
/// subscriber.
pub fn init_config() -> &'static Config {
    dotenvy::dotenv().ok();
    let config = Config::from_env().expect("Failed to load config from environment");
    CONFIG.get_or_init(|| config)
}
