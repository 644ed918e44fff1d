//! # accel-sentinel
//!
//! Accelerometer acquisition and a learn-then-infer anomaly pipeline for
//! microcontrollers.
//!
//! ---
//!
//! ## What it does
//!
//! A 3-axis accelerometer is polled at a fixed cadence. Every 100 samples
//! (300 floats, x/y/z interleaved) form one **window**. The first 20 windows
//! teach a decision engine what "normal" vibration looks like; every window
//! after that is scored for similarity (0–100) against what was learned and
//! reported over a serial link as `NOMINAL,<score>` or `ANOMALY,<score>`.
//!
//! The crate owns the timing, buffering and sequencing. The sensor bus, the
//! delay source, the serial port and the decision engine are all injected.
//!
//! ## The pipeline
//!
//! ```text
//! Accelerometer ──read()──▶ fill_window ──Window──▶ Orchestrator ──▶ DecisionEngine
//!   (I2C bus)        ▲        (paced, retried)        (Phase)            │
//!                    │                                                    ▼
//!                 DelayNs                                  Verdict ──▶ Reporter (UART)
//! ```
//!
//! ## Module overview
//!
//! | Module | Key types | What it does |
//! |--------|-----------|--------------|
//! | [`config`] | [`PipelineConfig`], [`RetryPolicy`] | Reference constants and runtime settings |
//! | [`sensor`] | [`AxisSample`], [`PhysicalSample`], [`Accelerometer`] | Raw decode, g conversion, driver trait |
//! | [`adxl345`] | [`adxl345::Adxl345`] | Reference I2C driver |
//! | [`window`] | [`Window`] | Fixed-capacity feature window with completeness seal |
//! | [`acquisition`] | [`fill_window`], [`FillStats`] | Paced window fill with retry policy |
//! | [`engine`] | [`DecisionEngine`], [`SimilarityScore`] | Decision engine capability |
//! | [`profile`] | [`profile::NominalProfile`] | Self-contained statistical engine |
//! | [`phase`] | [`Phase`] | Learn-then-infer state machine |
//! | [`verdict`] | [`Verdict`] | Threshold classification and its wire form |
//! | [`report`] | [`Report`], [`Reporter`], [`report::SerialReporter`] | Serial status lines |
//! | [`orchestrator`] | [`Orchestrator`], [`Step`] | Owns all state and drives the pipeline |
//! | [`error`] | [`Error`], [`AcquisitionError`] | Error types |
//!
//! ## Minimal firmware loop
//!
//! ```rust,ignore
//! use accel_sentinel::{adxl345::Adxl345, profile::NominalProfile, report::SerialReporter};
//! use accel_sentinel::{Orchestrator, PipelineConfig};
//!
//! let sensor = Adxl345::new(i2c);
//! let mut pipeline = Orchestrator::new(
//!     sensor,
//!     delay,
//!     NominalProfile::new(),
//!     SerialReporter::new(uart),
//!     PipelineConfig::default(),
//! );
//! if let Err(e) = pipeline.run() {
//!     // bring-up failed; halt
//! }
//! ```
//!
//! ## `no_std`
//!
//! `#![no_std]` by default with no heap. Enable `std` for `std::error::Error`
//! on [`Error`], `serde` for config and verdict serialisation, and `defmt-03`
//! for `defmt::Format` on data and error types.

#![cfg_attr(not(any(feature = "std", test)), no_std)]
#![deny(unsafe_code)]
#![deny(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod config;
pub mod error;
pub mod sensor;
pub mod adxl345;
pub mod window;
pub mod acquisition;
pub mod engine;
pub mod profile;
pub mod phase;
pub mod verdict;
pub mod report;
pub mod orchestrator;

pub use acquisition::{fill_window, FillStats};
pub use config::{AcquisitionConfig, EngineInitPolicy, PipelineConfig, RetryPolicy};
pub use engine::{DecisionEngine, EngineError, SimilarityScore};
pub use error::{AcquisitionError, Error};
pub use orchestrator::{Orchestrator, Step};
pub use phase::Phase;
pub use report::{Report, Reporter};
pub use sensor::{Accelerometer, AxisSample, PhysicalSample};
pub use verdict::Verdict;
pub use window::Window;
