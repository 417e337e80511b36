use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing_subscriber::filter::LevelFilter;
use url::Url;

use crate::ConfigError;

const PLACEHOLDER_PREFIX: &str = "YOUR_";

/// Environment variable overriding `[openweather] api_key`.
pub const OPENWEATHER_KEY_ENV: &str = "OPENWEATHER_API_KEY";
/// Environment variable overriding `[gemini] api_key`.
pub const GEMINI_KEY_ENV: &str = "GEMINI_API_KEY";

/// Configuration validation errors
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Result of config validation
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationResult {
    /// Returns true if there are no errors (warnings are OK)
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    pub fn add_warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Get a user-friendly message summarizing all errors
    pub fn error_summary(&self) -> String {
        self.errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// Process-wide settings, resolved once at startup and read-only afterwards.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub openweather: OpenWeatherConfig,

    #[serde(default)]
    pub gemini: GeminiConfig,

    #[serde(default)]
    pub model: ModelConfig,

    #[serde(default)]
    pub ui: UiConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// OpenWeatherMap credentials and endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenWeatherConfig {
    pub api_key: String,

    #[serde(default = "default_openweather_base_url")]
    pub base_url: String,
}

fn default_openweather_base_url() -> String {
    "https://api.openweathermap.org".to_string()
}

impl Default for OpenWeatherConfig {
    fn default() -> Self {
        Self {
            api_key: "YOUR_OPENWEATHER_API_KEY".to_string(),
            base_url: default_openweather_base_url(),
        }
    }
}

/// Generative Language (Gemini) credentials, model and endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    pub api_key: String,

    /// Model identifier, with or without the `models/` prefix
    #[serde(default = "default_gemini_model")]
    pub model: String,

    #[serde(default = "default_gemini_base_url")]
    pub base_url: String,
}

fn default_gemini_model() -> String {
    "gemini-1.5-flash".to_string()
}

fn default_gemini_base_url() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: "YOUR_GEMINI_API_KEY".to_string(),
            model: default_gemini_model(),
            base_url: default_gemini_base_url(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Path of the exported classifier artifact
    #[serde(default = "default_model_path")]
    pub path: PathBuf,
}

fn default_model_path() -> PathBuf {
    PathBuf::from("models/disease_predictor_model.json")
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            path: default_model_path(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// City pre-filled in the prompt
    #[serde(default = "default_city")]
    pub default_city: String,
}

fn default_city() -> String {
    "Chennai".to_string()
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            default_city: default_city(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Fallback filter when RUST_LOG is unset (error, warn, info, debug, trace, off)
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn is_configured_key(key: &str) -> bool {
    !key.trim().is_empty() && !key.starts_with(PLACEHOLDER_PREFIX)
}

impl Config {
    /// Load configuration from `path`, or from the default location when `None`.
    ///
    /// A missing file at the default location is created with placeholder
    /// keys; a missing explicit path is an error. Environment overrides are
    /// applied afterwards. The result is not validated, see [`Config::ensure_valid`].
    pub fn load_from(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => {
                if !path.exists() {
                    return Err(ConfigError::NotFound(path.display().to_string()));
                }
                Self::read(path)?
            }
            None => {
                let path = Self::default_path()?;
                if path.exists() {
                    Self::read(&path)?
                } else {
                    let config = Self::default();
                    config.save(&path)?;
                    config
                }
            }
        };

        config.apply_env_overrides();
        Ok(config)
    }

    fn read(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::ReadFailed(format!("{}: {}", path.display(), e)))?;

        Self::from_toml(&contents)
    }

    /// Parse configuration from TOML text
    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Override API keys from `OPENWEATHER_API_KEY` / `GEMINI_API_KEY`
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|name| std::env::var(name).ok());
    }

    fn apply_overrides_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(key) = lookup(OPENWEATHER_KEY_ENV).filter(|k| !k.trim().is_empty()) {
            self.openweather.api_key = key;
        }
        if let Some(key) = lookup(GEMINI_KEY_ENV).filter(|k| !k.trim().is_empty()) {
            self.gemini.api_key = key;
        }
    }

    /// Validate, log warnings, and fail on errors.
    pub fn ensure_valid(&self) -> Result<ValidationResult, ConfigError> {
        let validation = self.validate();

        if !validation.is_valid() {
            return Err(ConfigError::Invalid(validation.error_summary()));
        }

        for warning in &validation.warnings {
            tracing::warn!("Config warning: {}", warning);
        }

        Ok(validation)
    }

    /// Validate the configuration
    ///
    /// Returns a ValidationResult containing any errors or warnings.
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        if !is_configured_key(&self.openweather.api_key) {
            result.add_error(
                "openweather.api_key",
                format!("OpenWeatherMap API key is not set (config file or {})", OPENWEATHER_KEY_ENV),
            );
        }
        self.validate_url(&self.openweather.base_url, "openweather.base_url", &mut result);

        if !is_configured_key(&self.gemini.api_key) {
            result.add_error(
                "gemini.api_key",
                format!("Gemini API key is not set (config file or {})", GEMINI_KEY_ENV),
            );
        }
        if self.gemini.model.trim().is_empty() {
            result.add_error("gemini.model", "Model name cannot be empty");
        }
        self.validate_url(&self.gemini.base_url, "gemini.base_url", &mut result);

        if self.model.path.as_os_str().is_empty() {
            result.add_error("model.path", "Model path cannot be empty");
        } else if self.model.path.extension().and_then(|e| e.to_str()) != Some("json") {
            result.add_warning(
                "model.path",
                format!("Expected a .json model export, got: {}", self.model.path.display()),
            );
        }

        if self.ui.default_city.trim().is_empty() {
            result.add_error("ui.default_city", "Default city cannot be empty");
        }

        if LevelFilter::from_str(&self.logging.level).is_err() {
            result.add_error(
                "logging.level",
                format!(
                    "Invalid log level '{}'. Must be one of: error, warn, info, debug, trace, off",
                    self.logging.level
                ),
            );
        }

        result
    }

    /// Validate a URL field
    fn validate_url(&self, url_str: &str, field_name: &str, result: &mut ValidationResult) {
        match Url::parse(url_str) {
            Ok(url) => {
                if url.scheme() != "http" && url.scheme() != "https" {
                    result.add_error(
                        field_name,
                        format!("URL must use http or https scheme, got: {}", url.scheme()),
                    );
                } else if url.scheme() == "http" {
                    result.add_warning(field_name, "API keys will be sent over plain http");
                }

                if url.host().is_none() {
                    result.add_error(field_name, "URL must have a host");
                }
            }
            Err(e) => {
                result.add_error(field_name, format!("Invalid URL: {}", e));
            }
        }
    }

    /// Save configuration to `path`, creating parent directories
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| ConfigError::WriteFailed(format!("{}: {}", parent.display(), e)))?;
        }

        let contents =
            toml::to_string_pretty(self).map_err(|e| ConfigError::WriteFailed(e.to_string()))?;

        std::fs::write(path, contents)
            .map_err(|e| ConfigError::WriteFailed(format!("{}: {}", path.display(), e)))?;

        tracing::info!("Wrote default configuration to {}", path.display());
        Ok(())
    }

    /// Get the path to the default configuration file
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| ConfigError::NotFound("platform config directory".to_string()))?
            .join("climahealth");

        Ok(config_dir.join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;

    fn configured() -> Config {
        let mut config = Config::default();
        config.openweather.api_key = "ow-test-key".to_string();
        config.gemini.api_key = "gm-test-key".to_string();
        config
    }

    #[test]
    fn test_default_config_requires_api_keys() {
        let result = Config::default().validate();
        assert!(!result.is_valid());
        assert!(result.errors.iter().any(|e| e.field == "openweather.api_key"));
        assert!(result.errors.iter().any(|e| e.field == "gemini.api_key"));
        assert_eq!(result.errors.len(), 2, "unexpected errors: {:?}", result.errors);
    }

    #[test]
    fn test_configured_defaults_are_valid() {
        let result = configured().validate();
        assert!(result.is_valid(), "errors: {:?}", result.errors);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_invalid_url_scheme() {
        let mut config = configured();
        config.openweather.base_url = "ftp://localhost:8080".to_string();
        let result = config.validate();
        assert!(!result.is_valid());
        assert!(result.errors.iter().any(|e| e.message.contains("http or https")));
    }

    #[test]
    fn test_plain_http_is_a_warning() {
        let mut config = configured();
        config.gemini.base_url = "http://127.0.0.1:9000".to_string();
        let result = config.validate();
        assert!(result.is_valid());
        assert!(result.warnings.iter().any(|w| w.field == "gemini.base_url"));
    }

    #[test]
    fn test_invalid_log_level() {
        let mut config = configured();
        config.logging.level = "loud".to_string();
        let err = config.ensure_valid().unwrap_err();
        assert!(err.to_string().contains("Invalid log level"));
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = Config::from_toml(
            r#"
            [openweather]
            api_key = "abc"

            [gemini]
            api_key = "def"
            "#,
        )
        .unwrap();

        assert_eq!(config.openweather.base_url, "https://api.openweathermap.org");
        assert_eq!(config.gemini.model, "gemini-1.5-flash");
        assert_eq!(config.ui.default_city, "Chennai");
        assert_eq!(config.model.path, PathBuf::from("models/disease_predictor_model.json"));
        assert!(config.validate().is_valid());
    }

    #[test]
    fn test_malformed_toml_is_parse_error() {
        let err = Config::from_toml("[openweather\napi_key = 1").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn test_env_overrides_replace_keys() {
        let mut config = Config::default();
        config.apply_overrides_from(|name| match name {
            OPENWEATHER_KEY_ENV => Some("from-env-ow".to_string()),
            GEMINI_KEY_ENV => Some("  ".to_string()),
            _ => None,
        });
        assert_eq!(config.openweather.api_key, "from-env-ow");
        // Blank values do not clobber the file setting
        assert_eq!(config.gemini.api_key, "YOUR_GEMINI_API_KEY");
    }

    #[test]
    fn test_unreadable_path_is_read_failure() {
        let dir = tempfile::tempdir().unwrap();

        // A directory exists but cannot be read as a file
        let err = Config::load_from(Some(dir.path())).unwrap_err();
        assert!(matches!(err, ConfigError::ReadFailed(_)));
    }

    #[test]
    fn test_explicit_missing_path_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        let err = Config::load_from(Some(&missing)).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn test_save_then_load_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let mut config = configured();
        config.ui.default_city = "Lagos".to_string();
        config.save(&path).unwrap();

        let loaded = Config::load_from(Some(&path)).unwrap();
        assert_eq!(loaded.ui.default_city, "Lagos");
    }

    #[test]
    fn test_validation_result_error_summary() {
        let mut result = ValidationResult::default();
        result.add_error("field1", "error1");
        result.add_error("field2", "error2");
        let summary = result.error_summary();
        assert!(summary.contains("field1"));
        assert!(summary.contains("field2"));
    }
}
