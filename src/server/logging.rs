use serde::Deserialize;
use tracing_appender::rolling;
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::server::config::ServerConfig;

const DEFAULT_FILTER: &str = "info,sqlx=warn";
const LOG_FILE_PREFIX: &str = "claims-api.log";

/// Stdout rendering. `Json` writes one object per line for log collectors.
#[derive(Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

pub fn init_logging(config: &ServerConfig) -> Result<(), TryInitError> {
    // Log to a file: JSON format, daily rotation. Containers keep their
    // filesystem untouched and rely on stdout only.
    let file_layer = (!config.is_in_container).then(|| {
        let file_appender = rolling::daily(&config.log_dir, LOG_FILE_PREFIX);
        fmt::layer()
            .with_writer(file_appender)
            .with_ansi(false)
            .json()
    });

    let stdout_text = (config.log_format == LogFormat::Text)
        .then(|| fmt::layer().with_writer(std::io::stdout));
    let stdout_json = (config.log_format == LogFormat::Json).then(|| {
        fmt::layer()
            .with_writer(std::io::stdout)
            .with_ansi(false)
            .json()
    });

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(stdout_text)
        .with(stdout_json)
        .try_init()
}
