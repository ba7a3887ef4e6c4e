//! One-time activation of log-library publishers.
//!
//! Publishers forward events from a log library into the telemetry
//! pipeline. Enabling them is done at most once: the activator marks itself
//! initialised before enabling anything, so a failing publisher is never
//! retried.

use crate::config::LogLibrary;
use crate::error::{BoxError, PublisherError};
use std::sync::{Mutex, PoisonError};

const TARGET: &str = "diagnostic_channel";

/// A log-library publisher that can be switched on.
pub trait Publisher {
    /// Starts forwarding events from the library.
    ///
    /// # Errors
    ///
    /// Returns an error if the publisher cannot be enabled.
    fn enable(&self) -> Result<(), BoxError>;
}

impl<F> Publisher for F
where
    F: Fn() -> Result<(), BoxError>,
{
    fn enable(&self) -> Result<(), BoxError> {
        self()
    }
}

/// The publishers for every known log library.
pub trait PublisherSet {
    /// Returns the publisher for `library`.
    fn publisher(&self, library: LogLibrary) -> &dyn Publisher;
}

/// Tracks whether publishers have been enabled.
///
/// # Example
///
/// ```
/// use telemetry_configuration::{BoxError, LogLibrary, Publisher, PublisherActivator, PublisherSet};
///
/// struct Noop;
///
/// impl Publisher for Noop {
///     fn enable(&self) -> Result<(), BoxError> {
///         Ok(())
///     }
/// }
///
/// impl PublisherSet for Noop {
///     fn publisher(&self, _library: LogLibrary) -> &dyn Publisher {
///         self
///     }
/// }
///
/// let mut activator = PublisherActivator::new();
/// activator.activate(&Noop)?;
/// activator.activate(&Noop)?; // no-op
/// # Ok::<(), telemetry_configuration::PublisherError>(())
/// ```
#[derive(Debug, Default)]
pub struct PublisherActivator {
    initialized: bool,
}

impl PublisherActivator {
    /// Creates an activator that has not enabled anything yet.
    #[must_use]
    pub const fn new() -> Self {
        Self { initialized: false }
    }

    /// Enables every publisher in `publishers`, once.
    ///
    /// Publishers are enabled in [`LogLibrary::ALL`] order. Later calls do
    /// nothing.
    ///
    /// # Errors
    ///
    /// Returns the first publisher failure. The activator stays
    /// initialised, so the remaining publishers are never enabled.
    pub fn activate(&mut self, publishers: &dyn PublisherSet) -> Result<(), PublisherError> {
        if self.try_claim() {
            enable_all(publishers)?;
        }
        Ok(())
    }

    /// Marks the activator initialised, returning whether this call did so.
    fn try_claim(&mut self) -> bool {
        !std::mem::replace(&mut self.initialized, true)
    }
}

fn enable_all(publishers: &dyn PublisherSet) -> Result<(), PublisherError> {
    for library in LogLibrary::ALL {
        publishers
            .publisher(library)
            .enable()
            .map_err(|source| PublisherError::Enable {
                publisher: library,
                source,
            })?;
        tracing::info!(target: TARGET, publisher = %library, "Subscribed to {library} events");
    }

    Ok(())
}

static ACTIVATOR: Mutex<PublisherActivator> = Mutex::new(PublisherActivator::new());

/// Enables the publishers once per process.
///
/// Only the first call does any work. The lock is released before any
/// publisher hook runs, so a hook that calls back in sees a no-op.
///
/// # Errors
///
/// Returns the first publisher failure from the first call. Later calls
/// return `Ok(())` without retrying.
pub fn enable_publishers(publishers: &dyn PublisherSet) -> Result<(), PublisherError> {
    let claimed = ACTIVATOR
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .try_claim();
    if claimed {
        enable_all(publishers)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};

    #[derive(Default)]
    struct Counting {
        calls: Cell<usize>,
        fail: bool,
    }

    impl Publisher for Counting {
        fn enable(&self) -> Result<(), BoxError> {
            self.calls.set(self.calls.get() + 1);
            if self.fail {
                Err("hook failed".into())
            } else {
                Ok(())
            }
        }
    }

    #[derive(Default)]
    struct Publishers {
        bunyan: Counting,
        console: Counting,
        winston: Counting,
        order: RefCell<Vec<LogLibrary>>,
    }

    impl PublisherSet for Publishers {
        fn publisher(&self, library: LogLibrary) -> &dyn Publisher {
            self.order.borrow_mut().push(library);
            match library {
                LogLibrary::Bunyan => &self.bunyan,
                LogLibrary::Console => &self.console,
                LogLibrary::Winston => &self.winston,
            }
        }
    }

    #[test]
    fn enables_each_publisher_once() {
        let publishers = Publishers::default();
        let mut activator = PublisherActivator::new();

        activator.activate(&publishers).unwrap();
        activator.activate(&publishers).unwrap();

        assert_eq!(publishers.bunyan.calls.get(), 1);
        assert_eq!(publishers.console.calls.get(), 1);
        assert_eq!(publishers.winston.calls.get(), 1);
    }

    #[test]
    fn enables_in_bunyan_console_winston_order() {
        let publishers = Publishers::default();
        PublisherActivator::new().activate(&publishers).unwrap();

        assert_eq!(
            *publishers.order.borrow(),
            vec![LogLibrary::Bunyan, LogLibrary::Console, LogLibrary::Winston]
        );
    }

    #[test]
    fn failure_propagates_and_is_not_retried() {
        let publishers = Publishers {
            console: Counting {
                fail: true,
                ..Default::default()
            },
            ..Default::default()
        };
        let mut activator = PublisherActivator::new();

        let err = activator.activate(&publishers).unwrap_err();
        assert!(matches!(
            err,
            PublisherError::Enable {
                publisher: LogLibrary::Console,
                ..
            }
        ));
        assert_eq!(err.to_string(), "failed to enable console publisher");

        activator.activate(&publishers).unwrap();

        assert_eq!(publishers.bunyan.calls.get(), 1);
        assert_eq!(publishers.console.calls.get(), 1);
        assert_eq!(publishers.winston.calls.get(), 0);
    }

    #[test]
    fn claim_succeeds_once() {
        let mut activator = PublisherActivator::new();
        assert!(activator.try_claim());
        assert!(!activator.try_claim());
    }

    #[test]
    fn closures_are_publishers() {
        let hook = || -> Result<(), BoxError> { Ok(()) };
        assert!(hook.enable().is_ok());
    }
}
