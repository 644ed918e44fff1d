/*
 * This source code is licensed under the Business Source License 1.1.
 * See LICENSE in the root directory for full details.
 */

//! Paced window acquisition.
//!
//! [`fill_window`] polls the sensor once per slot, converts each reading to g,
//! writes it into the window and then waits the inter-sample delay. The
//! achieved rate is the delay plus driver latency, so 1 ms pacing means
//! "about 1 kHz", not a hard real-time guarantee.
//!
//! # Invariants
//!
//! - Slot `i` is fully written before the read for slot `i + 1` is issued.
//! - `Ok` is only returned with every slot written and the window sealed.
//! - Under the default unbounded policy the function never returns `Err`;
//!   it blocks until the bus recovers.
//! - Attempts are counted exactly: `attempts == failures + SAMPLES` on success.

use embedded_hal::delay::DelayNs;

use crate::config::AcquisitionConfig;
use crate::error::AcquisitionError;
use crate::sensor::Accelerometer;
use crate::window::Window;

/// Read accounting for one window fill.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
pub struct FillStats {
    /// Reads issued, successful or not.
    pub attempts: u32,
    /// Reads that returned an error.
    pub failures: u32,
}

/// Fill `window` with one full set of samples from `sensor`.
///
/// Failed reads are retried per `config.retry`; each retry optionally waits
/// `backoff_ms`. On success the window is sealed and the read accounting is
/// returned. On exhaustion the window is left unsealed.
pub fn fill_window<S, D, const N: usize>(
    sensor: &mut S,
    delay: &mut D,
    window: &mut Window<N>,
    config: &AcquisitionConfig,
) -> Result<FillStats, AcquisitionError<S::Error>>
where
    S: Accelerometer,
    D: DelayNs,
{
    let sensitivity = sensor.sensitivity();
    let mut stats = FillStats::default();
    window.begin_fill();

    for index in 0..Window::<N>::SAMPLES {
        let mut attempts: u32 = 0;
        let raw = loop {
            attempts = attempts.saturating_add(1);
            stats.attempts = stats.attempts.saturating_add(1);
            match sensor.read() {
                Ok(raw) => break raw,
                Err(e) => {
                    stats.failures = stats.failures.saturating_add(1);
                    if attempts == 1 {
                        log::warn!("acquisition: read for sample {} failed: {:?}", index, e);
                    }
                    if !config.retry.allows(attempts) {
                        return Err(AcquisitionError::RetriesExhausted {
                            sample_index: index,
                            attempts,
                            last_error: e,
                        });
                    }
                    if config.retry.backoff_ms > 0 {
                        delay.delay_ms(config.retry.backoff_ms);
                    }
                }
            }
        };

        window.write_sample(index, raw.to_physical(sensitivity));
        if config.inter_sample_delay_ms > 0 {
            delay.delay_ms(config.inter_sample_delay_ms);
        }
    }

    window.seal();
    if stats.failures > 0 {
        log::debug!(
            "acquisition: window complete after {} reads ({} retried)",
            stats.attempts,
            stats.failures
        );
    }
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RetryPolicy;
    use crate::sensor::AxisSample;

    /// Returns an incrementing x count; fails whenever `fail_on` says so.
    struct Scripted<F: FnMut(u32) -> bool> {
        calls: u32,
        next: i16,
        fail_on: F,
    }

    impl<F: FnMut(u32) -> bool> Accelerometer for Scripted<F> {
        type Error = &'static str;

        fn read(&mut self) -> Result<AxisSample, Self::Error> {
            let call = self.calls;
            self.calls += 1;
            if (self.fail_on)(call) {
                return Err("nack");
            }
            let s = AxisSample::new(self.next, -self.next, 256);
            self.next += 1;
            Ok(s)
        }
    }

    #[derive(Default)]
    struct CountingDelay {
        calls: u32,
        total_ms: u32,
    }

    impl DelayNs for CountingDelay {
        fn delay_ns(&mut self, ns: u32) {
            self.total_ms += ns / 1_000_000;
        }

        fn delay_ms(&mut self, ms: u32) {
            self.calls += 1;
            self.total_ms += ms;
        }
    }

    #[test]
    fn test_fill_is_complete_and_ordered() {
        let mut sensor = Scripted { calls: 0, next: 0, fail_on: |_: u32| false };
        let mut delay = CountingDelay::default();
        let mut w: Window<30> = Window::new();

        let stats = fill_window(&mut sensor, &mut delay, &mut w, &AcquisitionConfig::default())
            .unwrap();

        assert_eq!(stats, FillStats { attempts: 10, failures: 0 });
        let values = w.as_complete().expect("sealed");
        assert_eq!(values.len(), 30);
        for i in 0..10 {
            let s = w.sample(i).unwrap();
            assert!((s.x - i as f32 * 0.0039).abs() < 1e-6, "slot {} x={}", i, s.x);
            assert!((s.y + i as f32 * 0.0039).abs() < 1e-6);
            assert!((s.z - 0.9984).abs() < 1e-5);
        }
        // one 1 ms pause per sample
        assert_eq!(delay.calls, 10);
        assert_eq!(delay.total_ms, 10);
    }

    #[test]
    fn test_unbounded_retry_absorbs_failures() {
        // fail the first 7 reads, then every 3rd read
        let mut sensor = Scripted { calls: 0, next: 0, fail_on: |c: u32| c < 7 || c % 3 == 0 };
        let mut delay = CountingDelay::default();
        let mut w: Window = Window::new();

        let stats = fill_window(&mut sensor, &mut delay, &mut w, &AcquisitionConfig::default())
            .unwrap();

        assert!(w.is_complete());
        assert!(stats.failures > 7);
        assert_eq!(stats.attempts, stats.failures + 100);
        assert_eq!(sensor.calls, stats.attempts);
        // retries are immediate: only inter-sample pauses
        assert_eq!(delay.calls, 100);
    }

    #[test]
    fn test_backoff_between_retries() {
        let mut sensor = Scripted { calls: 0, next: 0, fail_on: |c: u32| c < 2 };
        let mut delay = CountingDelay::default();
        let mut w: Window<3> = Window::new();
        let cfg = AcquisitionConfig {
            inter_sample_delay_ms: 1,
            retry: RetryPolicy::unbounded().with_backoff(20),
        };

        fill_window(&mut sensor, &mut delay, &mut w, &cfg).unwrap();
        assert_eq!(delay.total_ms, 2 * 20 + 1);
    }

    #[test]
    fn test_bounded_retry_exhaustion_leaves_window_unsealed() {
        // sample 0 reads fine, sample 1 never does
        let mut sensor = Scripted { calls: 0, next: 0, fail_on: |c: u32| c >= 1 };
        let mut delay = CountingDelay::default();
        let mut w: Window<9> = Window::new();
        let cfg = AcquisitionConfig { retry: RetryPolicy::bounded(4), ..Default::default() };

        let err = fill_window(&mut sensor, &mut delay, &mut w, &cfg).unwrap_err();
        assert_eq!(
            err,
            AcquisitionError::RetriesExhausted { sample_index: 1, attempts: 4, last_error: "nack" }
        );
        assert!(w.as_complete().is_none());
        assert_eq!(sensor.calls, 5);
    }

    #[test]
    fn test_refill_unseals_previous_window() {
        let mut sensor = Scripted { calls: 0, next: 0, fail_on: |c: u32| c >= 3 };
        let mut delay = CountingDelay::default();
        let mut w: Window<9> = Window::new();
        let cfg = AcquisitionConfig { retry: RetryPolicy::bounded(1), ..Default::default() };

        assert!(fill_window(&mut sensor, &mut delay, &mut w, &cfg).is_ok());
        assert!(w.is_complete());
        assert!(fill_window(&mut sensor, &mut delay, &mut w, &cfg).is_err());
        assert!(!w.is_complete());
    }
}
