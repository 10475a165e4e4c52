use serde::Deserialize;
use std::fmt;
use std::fs;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use crate::db::retry::RetryPolicy;
use crate::server::logging::LogFormat;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse TOML from config file at {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    #[error("Failed to load config from environment: {0}")]
    Env(#[from] envy::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,

    pub redshift_host: Option<String>,
    pub redshift_user: Option<String>,
    pub redshift_password: Option<String>,
    pub redshift_db: String,
    pub redshift_port: u16,

    pub connect_timeout_secs: u64,
    pub ready_timeout_secs: u64,
    pub retry_max_attempts: u32,
    pub retry_base_delay_ms: u64,
    pub retry_max_delay_ms: u64,
    pub max_connections: u32,

    pub default_list_limit: i64,
    pub max_list_limit: i64,

    pub log_dir: String,
    pub log_format: LogFormat,
    pub is_in_container: bool,
}

// Partial config for layering
#[derive(Deserialize, Default, Debug)]
struct PartialServerConfig {
    host: Option<String>,
    port: Option<u16>,
    redshift_host: Option<String>,
    redshift_user: Option<String>,
    redshift_password: Option<String>,
    redshift_db: Option<String>,
    redshift_port: Option<u16>,
    connect_timeout_secs: Option<u64>,
    ready_timeout_secs: Option<u64>,
    retry_max_attempts: Option<u32>,
    retry_base_delay_ms: Option<u64>,
    retry_max_delay_ms: Option<u64>,
    max_connections: Option<u32>,
    default_list_limit: Option<i64>,
    max_list_limit: Option<i64>,
    log_dir: Option<String>,
    log_format: Option<LogFormat>,
    is_in_container: Option<bool>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_redshift_db() -> String {
    "dev".to_string()
}

fn default_log_dir() -> String {
    "logs".to_string()
}

const DEFAULT_PORT: u16 = 80;
const DEFAULT_REDSHIFT_PORT: u16 = 5439;
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 3;
const DEFAULT_READY_TIMEOUT_SECS: u64 = 2;
const DEFAULT_RETRY_MAX_ATTEMPTS: u32 = 8;
const DEFAULT_RETRY_BASE_DELAY_MS: u64 = 500;
const DEFAULT_RETRY_MAX_DELAY_MS: u64 = 8_000;
const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_LIST_LIMIT: i64 = 50;
const DEFAULT_MAX_LIST_LIMIT: i64 = 1_000;

impl ServerConfig {
    /// Loads the configuration from an optional TOML file, then lets
    /// environment variables override whatever the file set.
    pub fn load(config_path: Option<&str>) -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();

        // 1. Load from file (optional)
        let file_config = match config_path {
            Some(path) => read_file(Path::new(path))?,
            None => PartialServerConfig::default(),
        };

        // 2. Load from environment variables
        let env_config = envy::from_env::<PartialServerConfig>()?;

        // 3. Merge: environment overrides file
        merge(file_config, env_config)
    }

    /// Applies `--host`/`--port` from the command line on top of the loaded layers.
    pub fn override_bind(&mut self, host: Option<String>, port: Option<u16>) {
        if let Some(host) = host {
            self.host = host;
        }
        if let Some(port) = port {
            self.port = port;
        }
    }

    pub fn bind_address(&self) -> String {
        if self.host.contains(':') {
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn ready_timeout(&self) -> Duration {
        Duration::from_secs(self.ready_timeout_secs)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.retry_max_attempts,
            base_delay: Duration::from_millis(self.retry_base_delay_ms),
            max_delay: Duration::from_millis(self.retry_max_delay_ms),
        }
    }

    fn validate(self) -> Result<Self, ConfigError> {
        if self.retry_max_attempts == 0 {
            return Err(ConfigError::Invalid("retry_max_attempts must be at least 1".into()));
        }
        if self.max_connections == 0 {
            return Err(ConfigError::Invalid("max_connections must be at least 1".into()));
        }
        if self.max_list_limit < 1 {
            return Err(ConfigError::Invalid("max_list_limit must be at least 1".into()));
        }
        if !(1..=self.max_list_limit).contains(&self.default_list_limit) {
            return Err(ConfigError::Invalid(format!(
                "default_list_limit must be between 1 and {}",
                self.max_list_limit
            )));
        }
        Ok(self)
    }
}

impl fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("redshift_host", &self.redshift_host)
            .field("redshift_user", &self.redshift_user)
            .field("redshift_password", &self.redshift_password.as_ref().map(|_| "<redacted>"))
            .field("redshift_db", &self.redshift_db)
            .field("redshift_port", &self.redshift_port)
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .field("ready_timeout_secs", &self.ready_timeout_secs)
            .field("retry_max_attempts", &self.retry_max_attempts)
            .field("retry_base_delay_ms", &self.retry_base_delay_ms)
            .field("retry_max_delay_ms", &self.retry_max_delay_ms)
            .field("max_connections", &self.max_connections)
            .field("default_list_limit", &self.default_list_limit)
            .field("max_list_limit", &self.max_list_limit)
            .field("log_dir", &self.log_dir)
            .field("log_format", &self.log_format)
            .field("is_in_container", &self.is_in_container)
            .finish()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        layer(PartialServerConfig::default(), PartialServerConfig::default())
    }
}

fn read_file(path: &Path) -> Result<PartialServerConfig, ConfigError> {
    if !path.exists() {
        return Ok(PartialServerConfig::default());
    }
    let display = path.display().to_string();
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: display.clone(),
        source,
    })?;
    toml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: display,
        source,
    })
}

fn merge(file: PartialServerConfig, env: PartialServerConfig) -> Result<ServerConfig, ConfigError> {
    layer(file, env).validate()
}

fn layer(file: PartialServerConfig, env: PartialServerConfig) -> ServerConfig {
    ServerConfig {
        host: env.host.or(file.host).unwrap_or_else(default_host),
        port: env.port.or(file.port).unwrap_or(DEFAULT_PORT),
        redshift_host: env.redshift_host.or(file.redshift_host).filter(|h| !h.is_empty()),
        redshift_user: env.redshift_user.or(file.redshift_user),
        redshift_password: env.redshift_password.or(file.redshift_password),
        redshift_db: env.redshift_db.or(file.redshift_db)
            .unwrap_or_else(default_redshift_db),
        redshift_port: env.redshift_port.or(file.redshift_port)
            .unwrap_or(DEFAULT_REDSHIFT_PORT),
        connect_timeout_secs: env.connect_timeout_secs.or(file.connect_timeout_secs)
            .unwrap_or(DEFAULT_CONNECT_TIMEOUT_SECS),
        ready_timeout_secs: env.ready_timeout_secs.or(file.ready_timeout_secs)
            .unwrap_or(DEFAULT_READY_TIMEOUT_SECS),
        retry_max_attempts: env.retry_max_attempts.or(file.retry_max_attempts)
            .unwrap_or(DEFAULT_RETRY_MAX_ATTEMPTS),
        retry_base_delay_ms: env.retry_base_delay_ms.or(file.retry_base_delay_ms)
            .unwrap_or(DEFAULT_RETRY_BASE_DELAY_MS),
        retry_max_delay_ms: env.retry_max_delay_ms.or(file.retry_max_delay_ms)
            .unwrap_or(DEFAULT_RETRY_MAX_DELAY_MS),
        max_connections: env.max_connections.or(file.max_connections)
            .unwrap_or(DEFAULT_MAX_CONNECTIONS),
        default_list_limit: env.default_list_limit.or(file.default_list_limit)
            .unwrap_or(DEFAULT_LIST_LIMIT),
        max_list_limit: env.max_list_limit.or(file.max_list_limit)
            .unwrap_or(DEFAULT_MAX_LIST_LIMIT),
        log_dir: env.log_dir.or(file.log_dir).unwrap_or_else(default_log_dir),
        log_format: env.log_format.or(file.log_format).unwrap_or_default(),
        is_in_container: env.is_in_container.or(file.is_in_container).unwrap_or(false),
    }
}
