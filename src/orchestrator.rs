/*
 * This source code is licensed under the Business Source License 1.1.
 * See LICENSE in the root directory for full details.
 */

//! The pipeline driver.
//!
//! [`Orchestrator`] owns every piece of run-time state: the sensor, the delay
//! source, the decision engine, the reporter, the single window buffer and the
//! [`Phase`]. Nothing is global; the firmware entry point builds one and calls
//! [`run`](Orchestrator::run).
//!
//! # Lifecycle
//!
//! 1. [`start`](Orchestrator::start): config validation, startup delay,
//!    `Ready`, sensor identification and configuration (fatal on failure),
//!    settle delay, engine init (fatal under [`EngineInitPolicy::Halt`]),
//!    phase → `Learning(K)`.
//! 2. [`step`](Orchestrator::step) while learning: progress report (once per
//!    iteration, even if the fill is retried), fill, `learn`. The K-th window
//!    reports `Learning finished` and moves to `Inferring`.
//! 3. [`step`](Orchestrator::step) while inferring: fill, `detect`, classify,
//!    report, inter-window delay. Forever.
//!
//! # Invariants
//!
//! - The engine only ever sees sealed windows.
//! - Exactly one `learn` per learning step and one `detect` per inference
//!   step, in acquisition order, before the next fill begins.
//! - Only the orchestrator advances the phase.

use core::convert::Infallible;

use embedded_hal::delay::DelayNs;

use crate::acquisition::{fill_window, FillStats};
use crate::config::{EngineInitPolicy, PipelineConfig, WINDOW_LENGTH};
use crate::engine::DecisionEngine;
use crate::error::Error;
use crate::phase::Phase;
use crate::report::{Report, Reporter};
use crate::sensor::Accelerometer;
use crate::verdict::Verdict;
use crate::window::Window;

/// Result of one [`Orchestrator::step`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
pub enum Step {
    /// A learning window was consumed.
    Learned {
        /// 1-based index of the window just learned.
        iteration: u16,
        /// Learning windows still to go; 0 means inference starts next.
        remaining: u16,
        /// Read accounting for the window.
        stats: FillStats,
    },
    /// An inference window was scored.
    Classified {
        /// Classification of the window.
        verdict: Verdict,
        /// Read accounting for the window.
        stats: FillStats,
    },
}

/// Learn-then-infer pipeline over one sensor and one engine.
pub struct Orchestrator<S, D, E, R, const N: usize = WINDOW_LENGTH> {
    sensor: S,
    delay: D,
    engine: E,
    reporter: R,
    window: Window<N>,
    phase: Phase,
    config: PipelineConfig,
    announced: Option<u16>,
}

impl<S, D, E, R, const N: usize> Orchestrator<S, D, E, R, N>
where
    S: Accelerometer,
    D: DelayNs,
    E: DecisionEngine<N>,
    R: Reporter,
{
    /// Assemble a pipeline in [`Phase::Uninitialized`]. No I/O happens here.
    pub fn new(sensor: S, delay: D, engine: E, reporter: R, config: PipelineConfig) -> Self {
        Self {
            sensor,
            delay,
            engine,
            reporter,
            window: Window::new(),
            phase: Phase::Uninitialized,
            config,
            announced: None,
        }
    }

    /// Current phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Active configuration.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// The window buffer as last filled.
    pub fn window(&self) -> &Window<N> {
        &self.window
    }

    /// The decision engine.
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// The reporter.
    pub fn reporter(&self) -> &R {
        &self.reporter
    }

    /// Tear down and hand back the collaborators.
    pub fn release(self) -> (S, D, E, R) {
        (self.sensor, self.delay, self.engine, self.reporter)
    }

    /// Bring up sensor and engine; `Uninitialized` → `Learning(K)`.
    pub fn start(&mut self) -> Result<(), Error<S::Error>> {
        if self.phase != Phase::Uninitialized {
            return Err(Error::AlreadyStarted);
        }
        if let Err(e) = self.config.validate() {
            log::error!("rejecting pipeline config: {}", e);
            return Err(e.into());
        }

        self.pause(self.config.startup_delay_ms);
        self.emit(Report::Ready);

        if let Err(e) = self.sensor.verify() {
            log::error!("sensor identification failed: {:?}", e);
            return Err(Error::SensorVerify(e));
        }
        if let Err(e) = self.sensor.configure() {
            log::error!("sensor configuration failed: {:?}", e);
            return Err(Error::SensorConfig(e));
        }
        self.pause(self.config.sensor_settle_ms);

        let init = self.engine.init();
        self.emit(Report::EngineInit { ok: init.is_ok() });
        if let Err(e) = init {
            match self.config.engine_init {
                EngineInitPolicy::Halt => {
                    log::error!("decision engine init failed: {}", e);
                    return Err(e.into());
                }
                EngineInitPolicy::Continue => {
                    log::warn!("decision engine init failed: {}; continuing", e);
                }
            }
        }

        self.phase = self.phase.begin_learning(self.config.learning_iterations);
        log::info!(
            "pipeline started: {} learning windows of {} samples",
            self.config.learning_iterations,
            Window::<N>::SAMPLES
        );
        if self.phase.is_inferring() {
            self.emit(Report::LearningFinished);
        }
        Ok(())
    }

    /// Perform one transition of the phase machine.
    ///
    /// Under a bounded retry policy an acquisition failure is returned and
    /// the phase is left unchanged, so the same step can simply be retried.
    pub fn step(&mut self) -> Result<Step, Error<S::Error>> {
        match self.phase {
            Phase::Uninitialized => Err(Error::NotStarted),
            Phase::Learning { .. } => self.learn_step(),
            Phase::Inferring => self.infer_step(),
        }
    }

    /// Start, then step forever.
    ///
    /// Returns only if bring-up fails. Acquisition failures under a bounded
    /// retry policy are logged and the window is attempted again.
    pub fn run(&mut self) -> Result<Infallible, Error<S::Error>> {
        if self.phase == Phase::Uninitialized {
            self.start()?;
        }
        loop {
            match self.step() {
                Ok(_) => {}
                Err(Error::Acquisition(e)) => {
                    log::warn!("window abandoned: {}", e);
                }
                Err(e) => return Err(e),
            }
        }
    }

    fn learn_step(&mut self) -> Result<Step, Error<S::Error>> {
        let total = self.config.learning_iterations;
        let iteration = self.phase.learning_iteration(total).unwrap_or(total);
        if self.announced != Some(iteration) {
            self.emit(Report::LearningProgress { iteration, total });
            self.announced = Some(iteration);
        }

        let stats = self.acquire()?;
        let Some(values) = self.window.as_complete() else {
            return Err(Error::IncompleteWindow);
        };
        self.engine.learn(values);

        self.phase = self.phase.complete_window();
        let remaining = match self.phase {
            Phase::Learning { remaining } => remaining,
            _ => 0,
        };
        log::debug!("learned window {}/{}", iteration, total);
        if self.phase.is_inferring() {
            log::info!("learning finished after {} windows", total);
            self.emit(Report::LearningFinished);
        }
        Ok(Step::Learned { iteration, remaining, stats })
    }

    fn infer_step(&mut self) -> Result<Step, Error<S::Error>> {
        let stats = self.acquire()?;
        let Some(values) = self.window.as_complete() else {
            return Err(Error::IncompleteWindow);
        };
        let score = self.engine.detect(values);
        let verdict = Verdict::classify(score, self.config.nominal_threshold);
        if verdict.is_anomaly() {
            log::info!("anomaly: similarity {}", score);
        } else {
            log::debug!("nominal: similarity {}", score);
        }
        self.emit(Report::Verdict(verdict));
        self.pause(self.config.inter_window_delay_ms);
        Ok(Step::Classified { verdict, stats })
    }

    fn acquire(&mut self) -> Result<FillStats, Error<S::Error>> {
        let stats = fill_window(
            &mut self.sensor,
            &mut self.delay,
            &mut self.window,
            &self.config.acquisition,
        )?;
        Ok(stats)
    }

    fn emit(&mut self, report: Report) {
        self.reporter.report(&report);
        self.pause(self.config.report_settle_ms);
    }

    fn pause(&mut self, ms: u32) {
        if ms > 0 {
            self.delay.delay_ms(ms);
        }
    }
}
