//! Fixed-capacity feature window.
//!
//! A [`Window`] is one feature vector: `N` floats laid out as consecutive
//! (x, y, z) triples, one per sample. The buffer is a plain array that lives
//! inside its owner for the whole run and is overwritten every cycle.
//!
//! Completeness is tracked explicitly. [`begin_fill`](Window::begin_fill)
//! unseals the window, [`seal`](Window::seal) marks it complete, and the
//! contents are only exposed to consumers through
//! [`as_complete`](Window::as_complete), so a half-filled buffer can never
//! reach the decision engine.

use crate::config::{AXES, WINDOW_LENGTH};
use crate::sensor::PhysicalSample;

/// One feature window of `N` floats (`N / 3` samples).
#[derive(Clone, Debug, PartialEq)]
pub struct Window<const N: usize = WINDOW_LENGTH> {
    values: [f32; N],
    complete: bool,
}

impl<const N: usize> Window<N> {
    /// Samples per window.
    pub const SAMPLES: usize = {
        assert!(N > 0 && N % AXES == 0, "window length must be a non-zero multiple of 3");
        N / AXES
    };

    /// Zeroed, unsealed window.
    pub const fn new() -> Self {
        // Force the geometry check at monomorphisation.
        let _ = Self::SAMPLES;
        Self { values: [0.0; N], complete: false }
    }

    /// Window capacity in floats.
    pub const fn len(&self) -> usize {
        N
    }

    /// Always false; present for API symmetry with slices.
    pub const fn is_empty(&self) -> bool {
        false
    }

    /// Mark the window as being refilled. Contents are left in place and
    /// overwritten slot by slot.
    pub fn begin_fill(&mut self) {
        self.complete = false;
    }

    /// Write sample `index` into slots `[3i, 3i+1, 3i+2]`.
    ///
    /// Caller guarantees `index < SAMPLES`; an out-of-range index is ignored.
    pub fn write_sample(&mut self, index: usize, sample: PhysicalSample) {
        debug_assert!(index < Self::SAMPLES, "sample index {} out of range", index);
        if index >= Self::SAMPLES {
            log::warn!("window: dropping sample {} (capacity {})", index, Self::SAMPLES);
            return;
        }
        let base = index * AXES;
        self.values[base..base + AXES].copy_from_slice(&sample.to_array());
    }

    /// Read sample `index` back, or `None` if out of range.
    pub fn sample(&self, index: usize) -> Option<PhysicalSample> {
        if index >= Self::SAMPLES {
            return None;
        }
        let base = index * AXES;
        Some(PhysicalSample {
            x: self.values[base],
            y: self.values[base + 1],
            z: self.values[base + 2],
        })
    }

    /// Mark every slot as written for this cycle.
    pub fn seal(&mut self) {
        self.complete = true;
    }

    /// Whether the last fill ran to completion.
    pub fn is_complete(&self) -> bool {
        self.complete
    }

    /// The full feature vector, if the window is sealed.
    pub fn as_complete(&self) -> Option<&[f32; N]> {
        if self.complete {
            Some(&self.values)
        } else {
            None
        }
    }

    /// Raw contents regardless of completeness, for inspection.
    pub fn values(&self) -> &[f32; N] {
        &self.values
    }
}

impl<const N: usize> Default for Window<N> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(i: usize) -> PhysicalSample {
        let v = i as f32;
        PhysicalSample { x: v, y: v + 0.1, z: v + 0.2 }
    }

    #[test]
    fn test_reference_geometry() {
        let w: Window = Window::new();
        assert_eq!(w.len(), 300);
        assert_eq!(Window::<WINDOW_LENGTH>::SAMPLES, 100);
    }

    #[test]
    fn test_write_sample_slot_layout() {
        let mut w: Window<9> = Window::new();
        w.write_sample(1, PhysicalSample { x: 1.0, y: 2.0, z: 3.0 });
        assert_eq!(w.values(), &[0.0, 0.0, 0.0, 1.0, 2.0, 3.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_samples_in_index_order() {
        let mut w: Window<12> = Window::new();
        for i in 0..Window::<12>::SAMPLES {
            w.write_sample(i, sample(i));
        }
        for i in 0..4 {
            assert_eq!(w.sample(i), Some(sample(i)));
        }
        assert_eq!(w.sample(4), None);
    }

    #[test]
    fn test_unsealed_window_is_not_exposed() {
        let mut w: Window<6> = Window::new();
        assert!(w.as_complete().is_none());
        w.write_sample(0, sample(0));
        w.write_sample(1, sample(1));
        w.seal();
        assert_eq!(w.as_complete().map(|v| v.len()), Some(6));

        w.begin_fill();
        assert!(!w.is_complete());
        assert!(w.as_complete().is_none());
    }

    #[test]
    fn test_refill_overwrites_in_place() {
        let mut w: Window<3> = Window::new();
        w.write_sample(0, sample(7));
        w.seal();
        w.begin_fill();
        w.write_sample(0, sample(2));
        w.seal();
        assert_eq!(w.sample(0), Some(sample(2)));
    }
}
