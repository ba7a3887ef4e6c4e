//! Configuration resolution and log publisher activation for a telemetry SDK.
//!
//! Two independent pieces live here:
//! - [`ConfigResolver`] layers compiled defaults, the JSON file
//!   configuration, and explicit [`TelemetryOptions`] into an
//!   [`EffectiveConfig`]
//! - [`enable_publishers`] switches on the console, bunyan and winston
//!   publishers exactly once per process
//!
//! # Example
//!
//! ```no_run
//! use telemetry_configuration::{EffectiveConfig, InstrumentationConfig, LogLibrary, TelemetryOptions};
//!
//! let config = EffectiveConfig::new(Some(
//!     TelemetryOptions::new()
//!         .log_instrumentation(LogLibrary::Console, InstrumentationConfig::enabled()),
//! ));
//!
//! tracing::info!(exceptions = config.enable_auto_collect_exceptions, "Configuration resolved");
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod diagnostic_channel;
mod error;
mod json_config;
mod merge;
mod resolver;

pub use config::{
    ExtendedMetricType, InstrumentationConfig, LogInstrumentationOptions, LogLibrary,
    OtlpExporterConfig, TelemetryOptions,
};
pub use diagnostic_channel::{Publisher, PublisherActivator, PublisherSet, enable_publishers};
pub use error::{BoxError, ConfigError, PublisherError};
pub use json_config::{
    CONTENT_ENV_VAR, DEFAULT_FILE_NAME, FILE_ENV_VAR, FileConfigSource, FileExtendedMetrics,
    FileLogInstrumentations, GlobalJsonConfig, InstrumentationToggle, JsonConfig,
};
pub use merge::merge_shallow;
pub use resolver::{ConfigResolver, EffectiveConfig};

/// Re-exported for users who want to construct custom configuration providers.
pub use figment;
/// Re-exported for version compatibility with this crate's dependencies.
pub use tracing;
