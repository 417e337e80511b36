pub mod config;
pub mod error;

pub use config::{
    Config, GeminiConfig, LoggingConfig, ModelConfig, OpenWeatherConfig, UiConfig,
    ValidationResult,
};
pub use error::{AppError, ConfigError, NetworkError, ReqwestErrorExt};

use anyhow::Result;
use tracing_subscriber::EnvFilter;

/// Initialize logging.
///
/// `RUST_LOG` wins over `default_level`. Output goes to stderr so it never
/// interleaves with the report printed on stdout.
pub fn init(default_level: &str) -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    tracing::debug!("ClimaHealth core initialized");
    Ok(())
}
