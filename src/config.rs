//! Configuration types for the telemetry SDK.
//!
//! These types describe the caller-facing options and the shared
//! vocabulary (log libraries, extended metric categories) used by both the
//! resolver and the publisher activator.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque options forwarded to an OTLP exporter.
///
/// The resolver never interprets the contents; it only merges keys.
pub type OtlpExporterConfig = serde_json::Map<String, serde_json::Value>;

/// A log library that can be instrumented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLibrary {
    /// The built-in console.
    Console,
    /// The bunyan structured logger.
    Bunyan,
    /// The winston logger.
    Winston,
}

impl LogLibrary {
    /// Every known library, in publisher activation order.
    pub const ALL: [LogLibrary; 3] = [LogLibrary::Bunyan, LogLibrary::Console, LogLibrary::Winston];

    /// Returns the library's configuration key.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLibrary::Console => "console",
            LogLibrary::Bunyan => "bunyan",
            LogLibrary::Winston => "winston",
        }
    }
}

impl fmt::Display for LogLibrary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An optional runtime metric category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtendedMetricType {
    /// Garbage collection.
    Gc,
    /// Heap usage.
    Heap,
    /// Event loop utilisation.
    Loop,
}

impl ExtendedMetricType {
    /// Every known metric category.
    pub const ALL: [ExtendedMetricType; 3] = [
        ExtendedMetricType::Gc,
        ExtendedMetricType::Heap,
        ExtendedMetricType::Loop,
    ];

    /// Returns the category's configuration key.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            ExtendedMetricType::Gc => "gc",
            ExtendedMetricType::Heap => "heap",
            ExtendedMetricType::Loop => "loop",
        }
    }
}

impl fmt::Display for ExtendedMetricType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-library instrumentation settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstrumentationConfig {
    /// Whether events from this library are forwarded.
    pub enabled: bool,
}

impl InstrumentationConfig {
    /// An enabled instrumentation.
    #[must_use]
    pub const fn enabled() -> Self {
        Self { enabled: true }
    }

    /// A disabled instrumentation.
    #[must_use]
    pub const fn disabled() -> Self {
        Self { enabled: false }
    }
}

/// Caller-supplied log instrumentation overrides.
///
/// Each library left as `None` keeps whatever earlier layers resolved.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogInstrumentationOptions {
    /// Console override.
    pub console: Option<InstrumentationConfig>,
    /// Bunyan override.
    pub bunyan: Option<InstrumentationConfig>,
    /// Winston override.
    pub winston: Option<InstrumentationConfig>,
}

impl LogInstrumentationOptions {
    /// Sets the override for one library.
    #[must_use]
    pub fn with(mut self, library: LogLibrary, config: InstrumentationConfig) -> Self {
        *self.slot_mut(library) = Some(config);
        self
    }

    /// Returns the override for one library, if supplied.
    #[must_use]
    pub fn get(&self, library: LogLibrary) -> Option<InstrumentationConfig> {
        match library {
            LogLibrary::Console => self.console,
            LogLibrary::Bunyan => self.bunyan,
            LogLibrary::Winston => self.winston,
        }
    }

    /// Iterates over the supplied overrides.
    pub fn entries(&self) -> impl Iterator<Item = (LogLibrary, InstrumentationConfig)> + '_ {
        LogLibrary::ALL
            .into_iter()
            .filter_map(|library| self.get(library).map(|config| (library, config)))
    }

    fn slot_mut(&mut self, library: LogLibrary) -> &mut Option<InstrumentationConfig> {
        match library {
            LogLibrary::Console => &mut self.console,
            LogLibrary::Bunyan => &mut self.bunyan,
            LogLibrary::Winston => &mut self.winston,
        }
    }
}

/// Explicit options supplied by the caller.
///
/// These take precedence over the JSON file configuration, with one quirk:
/// `enable_auto_collect_exceptions` only overrides when set to `true`. An
/// explicit `false` is treated as "not supplied".
///
/// # Example
///
/// ```
/// use telemetry_configuration::{InstrumentationConfig, LogLibrary, TelemetryOptions};
///
/// let options = TelemetryOptions::new()
///     .enable_auto_collect_exceptions(true)
///     .log_instrumentation(LogLibrary::Winston, InstrumentationConfig::enabled());
/// assert_eq!(options.enable_auto_collect_exceptions, Some(true));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TelemetryOptions {
    /// Whether uncaught exceptions are collected automatically.
    pub enable_auto_collect_exceptions: Option<bool>,

    /// Options for the OTLP metric exporter.
    pub otlp_metric_exporter_config: Option<OtlpExporterConfig>,

    /// Options for the OTLP trace exporter.
    pub otlp_trace_exporter_config: Option<OtlpExporterConfig>,

    /// Log instrumentation overrides.
    pub log_instrumentations: Option<LogInstrumentationOptions>,
}

impl TelemetryOptions {
    /// Creates empty options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets automatic exception collection.
    #[must_use]
    pub fn enable_auto_collect_exceptions(mut self, enabled: bool) -> Self {
        self.enable_auto_collect_exceptions = Some(enabled);
        self
    }

    /// Sets the OTLP metric exporter options.
    #[must_use]
    pub fn otlp_metric_exporter_config(mut self, config: OtlpExporterConfig) -> Self {
        self.otlp_metric_exporter_config = Some(config);
        self
    }

    /// Sets the OTLP trace exporter options.
    #[must_use]
    pub fn otlp_trace_exporter_config(mut self, config: OtlpExporterConfig) -> Self {
        self.otlp_trace_exporter_config = Some(config);
        self
    }

    /// Overrides the instrumentation setting for one log library.
    #[must_use]
    pub fn log_instrumentation(mut self, library: LogLibrary, config: InstrumentationConfig) -> Self {
        let current = self.log_instrumentations.take().unwrap_or_default();
        self.log_instrumentations = Some(current.with(library, config));
        self
    }
}
