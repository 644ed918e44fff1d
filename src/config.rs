//! Pipeline configuration: reference constants and the runtime config structs.
//!
//! The constants describe the reference deployment (ADXL345 at ±2g full
//! resolution, 100-sample windows at ~1 kHz, 20 learning windows). The structs
//! default to exactly those values; deviate with struct-update syntax:
//!
//! ```rust
//! use accel_sentinel::config::{PipelineConfig, RetryPolicy};
//!
//! let cfg = PipelineConfig {
//!     learning_iterations: 5,
//!     acquisition: accel_sentinel::config::AcquisitionConfig {
//!         retry: RetryPolicy::bounded(3),
//!         ..Default::default()
//!     },
//!     ..PipelineConfig::default()
//! };
//! assert!(cfg.validate().is_ok());
//! ```

use core::fmt;

/// Axes per sample (x, y, z).
pub const AXES: usize = 3;

/// Samples assembled into one window.
pub const SAMPLES_PER_WINDOW: usize = 100;

/// Floats per window: `AXES × SAMPLES_PER_WINDOW`.
pub const WINDOW_LENGTH: usize = AXES * SAMPLES_PER_WINDOW;

/// g per LSB for the ADXL345 in full-resolution mode (3.9 mg/LSB).
pub const SENSITIVITY: f32 = 0.0039;

/// Windows fed to `learn` before inference starts.
pub const LEARNING_ITERATIONS: u16 = 20;

/// Similarity at or above which a window is nominal.
pub const NOMINAL_THRESHOLD: u8 = 90;

/// Pause between sample reads. Nominally 1 kHz; driver latency makes the
/// achieved rate somewhat lower.
pub const INTER_SAMPLE_DELAY_MS: u32 = 1;

/// Pause after each inference window.
pub const INTER_WINDOW_DELAY_MS: u32 = 500;

/// Pause before the first report after power-up.
pub const STARTUP_DELAY_MS: u32 = 500;

/// Pause after writing the sensor configuration registers.
pub const SENSOR_SETTLE_MS: u32 = 100;

/// Pause after every report line so a slow host UART can drain.
pub const REPORT_SETTLE_MS: u32 = 5;

/// Maximum length of one formatted report line, terminator included.
pub const REPORT_LINE_CAPACITY: usize = 128;

// ─── RetryPolicy ─────────────────────────────────────────────────────────────

/// How the acquisition loop treats a failed sensor read.
///
/// The default retries forever with no backoff: transport glitches on a
/// point-to-point bus are expected to clear, and a partial window is never
/// acceptable. A bound turns a stuck bus into an [`AcquisitionError`] instead.
///
/// [`AcquisitionError`]: crate::error::AcquisitionError
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
pub struct RetryPolicy {
    /// Read attempts allowed per sample, first attempt included. `None` = unbounded.
    pub max_attempts: Option<u32>,
    /// Delay between a failed attempt and the next one. 0 = immediate retry.
    pub backoff_ms: u32,
}

impl RetryPolicy {
    /// Retry forever, immediately.
    pub const fn unbounded() -> Self {
        Self { max_attempts: None, backoff_ms: 0 }
    }

    /// At most `max_attempts` reads per sample, no backoff.
    pub const fn bounded(max_attempts: u32) -> Self {
        Self { max_attempts: Some(max_attempts), backoff_ms: 0 }
    }

    /// Same policy with a backoff delay between attempts.
    pub const fn with_backoff(self, backoff_ms: u32) -> Self {
        Self { backoff_ms, ..self }
    }

    /// Whether another attempt is allowed after `attempts` have been made for
    /// the current sample.
    pub fn allows(&self, attempts: u32) -> bool {
        match self.max_attempts {
            None => true,
            Some(max) => attempts < max,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::unbounded()
    }
}

// ─── AcquisitionConfig ───────────────────────────────────────────────────────

/// Timing and retry settings for filling one window.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
pub struct AcquisitionConfig {
    /// Delay after each successful read.
    pub inter_sample_delay_ms: u32,
    /// Policy for failed reads.
    pub retry: RetryPolicy,
}

impl Default for AcquisitionConfig {
    fn default() -> Self {
        Self {
            inter_sample_delay_ms: INTER_SAMPLE_DELAY_MS,
            retry: RetryPolicy::default(),
        }
    }
}

// ─── EngineInitPolicy ────────────────────────────────────────────────────────

/// What the orchestrator does when the decision engine fails to initialise.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
pub enum EngineInitPolicy {
    /// Report the failure and stop: `start()` returns the error.
    #[default]
    Halt,
    /// Report the failure, log it, and proceed to learning anyway.
    Continue,
}

// ─── PipelineConfig ──────────────────────────────────────────────────────────

/// Everything the orchestrator needs besides its collaborators.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
pub struct PipelineConfig {
    /// Window acquisition timing and retry.
    pub acquisition: AcquisitionConfig,
    /// Windows to learn before inference.
    pub learning_iterations: u16,
    /// Nominal/anomaly boundary, inclusive on the nominal side.
    pub nominal_threshold: u8,
    /// Delay after each inference window.
    pub inter_window_delay_ms: u32,
    /// Delay before the ready report.
    pub startup_delay_ms: u32,
    /// Delay after sensor configuration.
    pub sensor_settle_ms: u32,
    /// Delay after each report line.
    pub report_settle_ms: u32,
    /// Handling of engine initialisation failure.
    pub engine_init: EngineInitPolicy,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            acquisition: AcquisitionConfig::default(),
            learning_iterations: LEARNING_ITERATIONS,
            nominal_threshold: NOMINAL_THRESHOLD,
            inter_window_delay_ms: INTER_WINDOW_DELAY_MS,
            startup_delay_ms: STARTUP_DELAY_MS,
            sensor_settle_ms: SENSOR_SETTLE_MS,
            report_settle_ms: REPORT_SETTLE_MS,
            engine_init: EngineInitPolicy::default(),
        }
    }
}

impl PipelineConfig {
    /// Reference configuration with every delay set to zero, for simulation.
    pub fn without_delays() -> Self {
        Self {
            acquisition: AcquisitionConfig {
                inter_sample_delay_ms: 0,
                ..AcquisitionConfig::default()
            },
            inter_window_delay_ms: 0,
            startup_delay_ms: 0,
            sensor_settle_ms: 0,
            report_settle_ms: 0,
            ..Self::default()
        }
    }

    /// Reject settings the pipeline cannot honour.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.nominal_threshold > 100 {
            return Err(ConfigError::ThresholdOutOfRange(self.nominal_threshold));
        }
        if self.acquisition.retry.max_attempts == Some(0) {
            return Err(ConfigError::ZeroRetryBudget);
        }
        Ok(())
    }
}

/// A [`PipelineConfig`] that failed [`PipelineConfig::validate`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
pub enum ConfigError {
    /// Similarity scores live in [0, 100].
    ThresholdOutOfRange(u8),
    /// A bounded retry policy must allow at least one read.
    ZeroRetryBudget,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ThresholdOutOfRange(t) => {
                write!(f, "nominal threshold {} outside 0..=100", t)
            }
            ConfigError::ZeroRetryBudget => f.write_str("retry policy allows zero attempts"),
        }
    }
}
