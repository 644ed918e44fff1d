//! Error types for the acquisition loop and the orchestrator.
//!
//! Driver errors stay generic (`E`) all the way up so callers can match on
//! their own bus error without boxing.

use core::fmt;

use crate::config::ConfigError;
use crate::engine::EngineError;

/// A window fill gave up before every sample was read.
///
/// Only produced under a bounded [`RetryPolicy`](crate::config::RetryPolicy).
#[derive(Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
pub enum AcquisitionError<E> {
    /// Sample `sample_index` failed `attempts` consecutive reads.
    RetriesExhausted {
        /// Slot that could not be filled.
        sample_index: usize,
        /// Reads issued for that slot.
        attempts: u32,
        /// Error from the final attempt.
        last_error: E,
    },
}

impl<E: fmt::Debug> fmt::Display for AcquisitionError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AcquisitionError::RetriesExhausted { sample_index, attempts, last_error } => write!(
                f,
                "sample {} unreadable after {} attempts: {:?}",
                sample_index, attempts, last_error
            ),
        }
    }
}

/// Orchestrator error, generic over the sensor's error type.
#[derive(Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
pub enum Error<E> {
    /// [`PipelineConfig::validate`] rejected the settings; nothing was touched.
    ///
    /// [`PipelineConfig::validate`]: crate::config::PipelineConfig::validate
    Config(ConfigError),
    /// The sensor did not identify as the expected part.
    SensorVerify(E),
    /// Sensor configuration write failed; the device may be unconfigured.
    SensorConfig(E),
    /// Decision engine failed to initialise under [`EngineInitPolicy::Halt`].
    ///
    /// [`EngineInitPolicy::Halt`]: crate::config::EngineInitPolicy::Halt
    EngineInit(EngineError),
    /// A window could not be filled.
    Acquisition(AcquisitionError<E>),
    /// A fill reported success without sealing the window.
    IncompleteWindow,
    /// `step()` called before `start()`.
    NotStarted,
    /// `start()` called twice.
    AlreadyStarted,
}

impl<E> From<AcquisitionError<E>> for Error<E> {
    fn from(e: AcquisitionError<E>) -> Self {
        Error::Acquisition(e)
    }
}

impl<E> From<EngineError> for Error<E> {
    fn from(e: EngineError) -> Self {
        Error::EngineInit(e)
    }
}

impl<E> From<ConfigError> for Error<E> {
    fn from(e: ConfigError) -> Self {
        Error::Config(e)
    }
}

impl<E: fmt::Debug> fmt::Display for Error<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Config(e) => write!(f, "invalid configuration: {}", e),
            Error::SensorVerify(e) => write!(f, "sensor identification failed: {:?}", e),
            Error::SensorConfig(e) => write!(f, "sensor configuration failed: {:?}", e),
            Error::EngineInit(e) => write!(f, "decision engine init failed: {}", e),
            Error::Acquisition(e) => write!(f, "acquisition failed: {}", e),
            Error::IncompleteWindow => f.write_str("window not sealed after fill"),
            Error::NotStarted => f.write_str("pipeline not started"),
            Error::AlreadyStarted => f.write_str("pipeline already started"),
        }
    }
}

#[cfg(feature = "std")]
impl<E: fmt::Debug> std::error::Error for Error<E> {}
