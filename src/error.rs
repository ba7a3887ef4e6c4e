//! Error types for configuration loading and publisher activation.

use crate::config::LogLibrary;
use figment::Error as FigmentError;
use std::sync::Arc;

/// Boxed error returned by external publisher hooks.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors from reading the JSON file configuration.
#[derive(Debug, Clone, thiserror::Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// Failed to extract configuration from the JSON source.
    #[error("configuration error: {0}")]
    Load(#[source] Arc<FigmentError>),
}

impl From<FigmentError> for ConfigError {
    fn from(e: FigmentError) -> Self {
        ConfigError::Load(Arc::new(e))
    }
}

/// Errors from enabling log-library publishers.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum PublisherError {
    /// A publisher's enable hook failed.
    #[error("failed to enable {publisher} publisher")]
    Enable {
        /// The publisher that failed.
        publisher: LogLibrary,
        /// The error raised by the hook.
        #[source]
        source: BoxError,
    },
}
