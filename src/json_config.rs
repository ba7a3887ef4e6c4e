//! JSON file configuration.
//!
//! The file layer is loaded once per process and shared through
//! [`JsonConfig::instance`]. Every field is optional; anything the file
//! leaves out keeps its default during resolution.
//!
//! The source is discovered from the environment:
//! - `APPLICATIONINSIGHTS_CONFIGURATION_CONTENT` holds inline JSON and wins
//!   when set
//! - `APPLICATIONINSIGHTS_CONFIGURATION_FILE` names a file to read
//! - otherwise `applicationinsights.json` in the working directory
//!
//! A missing file is not an error.

use crate::error::ConfigError;
use figment::Figment;
use figment::providers::{Format, Json};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

/// Environment variable holding inline JSON configuration.
pub const CONTENT_ENV_VAR: &str = "APPLICATIONINSIGHTS_CONFIGURATION_CONTENT";

/// Environment variable naming the JSON configuration file.
pub const FILE_ENV_VAR: &str = "APPLICATIONINSIGHTS_CONFIGURATION_FILE";

/// File read when no environment variable names a source.
pub const DEFAULT_FILE_NAME: &str = "applicationinsights.json";

/// `enabled` toggle as it appears in the file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InstrumentationToggle {
    /// `None` when the file does not mention `enabled`.
    pub enabled: Option<bool>,
}

/// `logInstrumentations` as it appears in the file.
///
/// Libraries outside the known set are dropped during deserialisation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLogInstrumentations {
    /// Console toggle.
    pub console: Option<InstrumentationToggle>,
    /// Bunyan toggle.
    pub bunyan: Option<InstrumentationToggle>,
    /// Winston toggle.
    pub winston: Option<InstrumentationToggle>,
}

/// `extendedMetrics` as it appears in the file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileExtendedMetrics {
    /// Garbage collection metrics.
    pub gc: Option<bool>,
    /// Heap metrics.
    pub heap: Option<bool>,
    /// Event loop metrics.
    #[serde(rename = "loop")]
    pub event_loop: Option<bool>,
}

/// Configuration values read from the JSON file.
///
/// Exporter configs are kept as raw JSON and checked for object shape when
/// the resolver applies them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct JsonConfig {
    /// OTLP metric exporter options.
    pub otlp_metric_exporter_config: Option<Value>,

    /// OTLP trace exporter options.
    pub otlp_trace_exporter_config: Option<Value>,

    /// Automatic exception collection.
    pub enable_auto_collect_exceptions: Option<bool>,

    /// Log instrumentation toggles.
    pub log_instrumentations: Option<FileLogInstrumentations>,

    /// Extended metric toggles.
    pub extended_metrics: Option<FileExtendedMetrics>,
}

static INSTANCE: OnceLock<Result<Arc<JsonConfig>, ConfigError>> = OnceLock::new();

impl JsonConfig {
    /// Parses configuration from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not valid JSON or a field has the
    /// wrong type.
    pub fn from_json_str(content: &str) -> Result<Self, ConfigError> {
        Self::from_figment(&Figment::from(Json::string(content)))
    }

    /// Reads configuration from a JSON file.
    ///
    /// If the file doesn't exist, an empty configuration is returned.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be parsed.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let mut figment = Figment::new();
        if path.exists() {
            figment = figment.merge(Json::file(path));
        }
        Self::from_figment(&figment)
    }

    /// Extracts configuration from an existing figment.
    ///
    /// This lets callers assemble their own provider chain, for example
    /// layering several JSON files.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use telemetry_configuration::JsonConfig;
    /// use telemetry_configuration::figment::Figment;
    /// use telemetry_configuration::figment::providers::{Format, Json};
    ///
    /// let figment = Figment::new()
    ///     .merge(Json::file("/etc/telemetry/defaults.json"))
    ///     .merge(Json::file("applicationinsights.json"));
    /// let config = JsonConfig::from_figment(&figment)?;
    /// # Ok::<(), telemetry_configuration::ConfigError>(())
    /// ```
    ///
    /// # Errors
    ///
    /// Returns an error if extraction fails.
    pub fn from_figment(figment: &Figment) -> Result<Self, ConfigError> {
        Ok(figment.extract()?)
    }

    /// Loads configuration from the source named by the environment.
    ///
    /// # Errors
    ///
    /// Returns an error if the selected source cannot be parsed.
    pub fn load() -> Result<Self, ConfigError> {
        if let Ok(content) = std::env::var(CONTENT_ENV_VAR)
            && !content.trim().is_empty()
        {
            tracing::debug!(target: "telemetry_config", "Loading JSON config from {CONTENT_ENV_VAR}");
            return Self::from_json_str(&content);
        }

        let path = std::env::var_os(FILE_ENV_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_FILE_NAME));
        tracing::debug!(target: "telemetry_config", path = %path.display(), "Loading JSON config file");
        Self::from_file(path)
    }

    /// Returns the process-wide configuration, loading it on first use.
    ///
    /// Every call returns the same instance. A load failure is cached too,
    /// so later calls see the same error.
    ///
    /// # Errors
    ///
    /// Returns the error from the first load attempt.
    pub fn instance() -> Result<Arc<JsonConfig>, ConfigError> {
        INSTANCE
            .get_or_init(|| Self::load().map(Arc::new))
            .clone()
    }
}

/// Supplies the file configuration layer to the resolver.
pub trait FileConfigSource {
    /// Returns the file configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be obtained.
    fn file_config(&self) -> Result<Arc<JsonConfig>, ConfigError>;
}

/// The process-wide configuration from [`JsonConfig::instance`].
#[derive(Debug, Clone, Copy, Default)]
pub struct GlobalJsonConfig;

impl FileConfigSource for GlobalJsonConfig {
    fn file_config(&self) -> Result<Arc<JsonConfig>, ConfigError> {
        JsonConfig::instance()
    }
}

impl FileConfigSource for JsonConfig {
    fn file_config(&self) -> Result<Arc<JsonConfig>, ConfigError> {
        Ok(Arc::new(self.clone()))
    }
}

impl<F> FileConfigSource for F
where
    F: Fn() -> Result<Arc<JsonConfig>, ConfigError>,
{
    fn file_config(&self) -> Result<Arc<JsonConfig>, ConfigError> {
        self()
    }
}
