//! Resolution of the effective configuration.
//!
//! Three layers are merged in order, with later layers taking precedence:
//! 1. Compiled defaults
//! 2. The JSON file configuration
//! 3. Explicit caller options
//!
//! Object-valued settings accumulate across layers with a shallow merge;
//! scalar settings are replaced. A failure while reading or applying the
//! file layer is logged and resolution carries on with what was already
//! merged.

use crate::config::{
    ExtendedMetricType, InstrumentationConfig, LogInstrumentationOptions, LogLibrary,
    OtlpExporterConfig, TelemetryOptions,
};
use crate::error::ConfigError;
use crate::json_config::{
    FileConfigSource, FileExtendedMetrics, FileLogInstrumentations, GlobalJsonConfig,
};
use crate::merge::merge_shallow;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// The fully-resolved configuration.
///
/// # Example
///
/// ```
/// use telemetry_configuration::{ConfigResolver, JsonConfig, LogLibrary};
///
/// let config = ConfigResolver::new()
///     .with_file_config(JsonConfig::default())
///     .resolve();
///
/// assert!(config.enable_auto_collect_exceptions);
/// assert!(!config.log_instrumentations()[&LogLibrary::Console].enabled);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EffectiveConfig {
    /// Whether uncaught exceptions are collected automatically.
    pub enable_auto_collect_exceptions: bool,

    /// Extended runtime metrics, one entry per known category.
    pub extended_metrics: BTreeMap<ExtendedMetricType, bool>,

    otlp_trace_exporter_config: OtlpExporterConfig,
    otlp_metric_exporter_config: OtlpExporterConfig,
    log_instrumentations: BTreeMap<LogLibrary, InstrumentationConfig>,
}

impl Default for EffectiveConfig {
    fn default() -> Self {
        Self {
            enable_auto_collect_exceptions: true,
            extended_metrics: ExtendedMetricType::ALL.map(|m| (m, false)).into(),
            otlp_trace_exporter_config: OtlpExporterConfig::new(),
            otlp_metric_exporter_config: OtlpExporterConfig::new(),
            log_instrumentations: LogLibrary::ALL
                .map(|l| (l, InstrumentationConfig::disabled()))
                .into(),
        }
    }
}

impl EffectiveConfig {
    /// Resolves configuration against the process-wide JSON file config.
    #[must_use]
    pub fn new(options: Option<TelemetryOptions>) -> Self {
        let mut resolver = ConfigResolver::new();
        if let Some(options) = options {
            resolver = resolver.with_options(options);
        }
        resolver.resolve()
    }

    /// OTLP trace exporter options.
    pub fn otlp_trace_exporter_config(&self) -> &OtlpExporterConfig {
        &self.otlp_trace_exporter_config
    }

    /// OTLP metric exporter options.
    pub fn otlp_metric_exporter_config(&self) -> &OtlpExporterConfig {
        &self.otlp_metric_exporter_config
    }

    /// Log instrumentation settings, one entry per known library.
    pub fn log_instrumentations(&self) -> &BTreeMap<LogLibrary, InstrumentationConfig> {
        &self.log_instrumentations
    }

    /// Merges keys into the OTLP trace exporter options.
    pub fn merge_otlp_trace_exporter_config(&mut self, value: OtlpExporterConfig) {
        self.otlp_trace_exporter_config =
            merge_shallow(std::mem::take(&mut self.otlp_trace_exporter_config), value);
    }

    /// Merges keys into the OTLP metric exporter options.
    pub fn merge_otlp_metric_exporter_config(&mut self, value: OtlpExporterConfig) {
        self.otlp_metric_exporter_config =
            merge_shallow(std::mem::take(&mut self.otlp_metric_exporter_config), value);
    }

    /// Merges per-library overrides into the log instrumentation settings.
    pub fn merge_log_instrumentations(&mut self, value: &LogInstrumentationOptions) {
        self.log_instrumentations =
            merge_shallow(std::mem::take(&mut self.log_instrumentations), value.entries());
    }

    /// Always `false`.
    #[deprecated(note = "statsbeat is no longer configurable; this always returns false")]
    pub fn disable_statsbeat(&self) -> bool {
        false
    }

    fn apply_file_config(&mut self, source: &dyn FileConfigSource) -> Result<(), ConfigError> {
        let json = source.file_config()?;

        if let Some(value) = &json.otlp_metric_exporter_config {
            self.merge_otlp_metric_exporter_config(exporter_object(
                value,
                "otlpMetricExporterConfig",
            ));
        }
        if let Some(value) = &json.otlp_trace_exporter_config {
            self.merge_otlp_trace_exporter_config(exporter_object(
                value,
                "otlpTraceExporterConfig",
            ));
        }
        if let Some(enabled) = json.enable_auto_collect_exceptions {
            self.enable_auto_collect_exceptions = enabled;
        }
        if let Some(instrumentations) = &json.log_instrumentations {
            self.log_instrumentations = merge_shallow(
                std::mem::take(&mut self.log_instrumentations),
                defined_instrumentations(instrumentations),
            );
        }
        if let Some(metrics) = &json.extended_metrics {
            self.extended_metrics = merge_shallow(
                std::mem::take(&mut self.extended_metrics),
                defined_metrics(metrics),
            );
        }

        Ok(())
    }

    fn apply_options(&mut self, options: TelemetryOptions) {
        // Only a truthy value overrides; an explicit `false` is indistinguishable
        // from leaving the option out.
        if options.enable_auto_collect_exceptions == Some(true) {
            self.enable_auto_collect_exceptions = true;
        }
        if let Some(config) = options.otlp_metric_exporter_config {
            self.merge_otlp_metric_exporter_config(config);
        }
        if let Some(config) = options.otlp_trace_exporter_config {
            self.merge_otlp_trace_exporter_config(config);
        }
        if let Some(instrumentations) = &options.log_instrumentations {
            self.merge_log_instrumentations(instrumentations);
        }
    }
}

/// Non-object values contribute no keys; the rest of the file still applies.
fn exporter_object(value: &Value, key: &str) -> OtlpExporterConfig {
    match value {
        Value::Object(map) => map.clone(),
        other => {
            tracing::warn!(target: "telemetry_config", key, value = %other, "Ignoring non-object exporter config");
            OtlpExporterConfig::new()
        }
    }
}

fn defined_instrumentations(
    file: &FileLogInstrumentations,
) -> impl Iterator<Item = (LogLibrary, InstrumentationConfig)> {
    [
        (LogLibrary::Console, file.console),
        (LogLibrary::Bunyan, file.bunyan),
        (LogLibrary::Winston, file.winston),
    ]
    .into_iter()
    .filter_map(|(library, toggle)| {
        toggle
            .and_then(|t| t.enabled)
            .map(|enabled| (library, InstrumentationConfig { enabled }))
    })
}

fn defined_metrics(file: &FileExtendedMetrics) -> impl Iterator<Item = (ExtendedMetricType, bool)> {
    [
        (ExtendedMetricType::Gc, file.gc),
        (ExtendedMetricType::Heap, file.heap),
        (ExtendedMetricType::Loop, file.event_loop),
    ]
    .into_iter()
    .filter_map(|(metric, enabled)| enabled.map(|enabled| (metric, enabled)))
}

/// Builder that resolves an [`EffectiveConfig`] from its layers.
///
/// # Example
///
/// ```
/// use serde_json::json;
/// use telemetry_configuration::{ConfigResolver, JsonConfig, TelemetryOptions};
///
/// let file = JsonConfig::from_json_str(
///     r#"{ "otlpTraceExporterConfig": { "url": "http://collector:4318" } }"#,
/// )?;
/// let headers = json!({ "headers": { "x-api-key": "secret" } });
///
/// let config = ConfigResolver::new()
///     .with_file_config(file)
///     .with_options(
///         TelemetryOptions::new()
///             .otlp_trace_exporter_config(headers.as_object().cloned().unwrap()),
///     )
///     .resolve();
///
/// let trace = config.otlp_trace_exporter_config();
/// assert_eq!(trace["url"], "http://collector:4318");
/// assert_eq!(trace["headers"]["x-api-key"], "secret");
/// # Ok::<(), telemetry_configuration::ConfigError>(())
/// ```
#[must_use = "builders do nothing unless .resolve() is called"]
pub struct ConfigResolver {
    file_config: Box<dyn FileConfigSource>,
    options: Option<TelemetryOptions>,
}

impl ConfigResolver {
    /// Creates a resolver reading the process-wide JSON file config.
    pub fn new() -> Self {
        Self {
            file_config: Box::new(GlobalJsonConfig),
            options: None,
        }
    }

    /// Replaces the source of the file configuration layer.
    pub fn with_file_config<S>(mut self, source: S) -> Self
    where
        S: FileConfigSource + 'static,
    {
        self.file_config = Box::new(source);
        self
    }

    /// Sets the explicit options layer.
    pub fn with_options(mut self, options: TelemetryOptions) -> Self {
        self.options = Some(options);
        self
    }

    /// Resolves the effective configuration.
    ///
    /// Never fails. Errors from the file layer are logged and the layers
    /// merged before the error are kept.
    pub fn resolve(self) -> EffectiveConfig {
        let mut config = EffectiveConfig::default();

        if let Err(e) = config.apply_file_config(self.file_config.as_ref()) {
            tracing::error!(target: "telemetry_config", error = %e, "Failed to load JSON config file values.");
        }

        if let Some(options) = self.options {
            config.apply_options(options);
        }

        config
    }
}

impl Default for ConfigResolver {
    fn default() -> Self {
        Self::new()
    }
}
