/*
 * This source code is licensed under the Business Source License 1.1.
 * See LICENSE in the root directory for full details.
 */

//! Reference decision engine: a statistical profile of nominal windows.
//!
//! Each window is reduced to nine features, three per axis:
//!
//! | Feature | Meaning |
//! |---------|---------|
//! | mean | static orientation / gravity component |
//! | variance | vibration energy |
//! | peak-to-peak | shock amplitude |
//!
//! Learning keeps a running mean and variance of every feature across windows
//! (Welford). Detection computes the mean squared normalised deviation
//!
//! ```text
//! d = (1/9) × Σ (f_k − μ_k)² / max(σ_k², min_std²)
//! ```
//!
//! and maps it to a similarity: `100` while `d ≤ nominal_spread`, then
//! `100 × nominal_spread / d`, truncated.
//!
//! Feature extraction is phase-independent, so windows need not be aligned to
//! the vibration period. Memory is fixed: two `[f32; 9]` arrays and a counter.

use crate::config::AXES;
use crate::engine::{DecisionEngine, EngineError, SimilarityScore};

/// Features per window: mean, variance, peak-to-peak for each axis.
pub const FEATURES: usize = 3 * AXES;

/// Tuning for [`NominalProfile`].
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
pub struct ProfileConfig {
    /// Lower bound on each feature's standard deviation, in feature units.
    /// Keeps a perfectly repeatable learning set from turning every small
    /// deviation into an anomaly.
    pub min_std: f32,
    /// Mean squared deviation (in σ²) still scored as fully similar.
    pub nominal_spread: f32,
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self { min_std: 0.02, nominal_spread: 4.0 }
    }
}

/// Running per-feature statistics over learned windows.
#[derive(Clone, Debug)]
pub struct NominalProfile<const N: usize> {
    config: ProfileConfig,
    learned: u32,
    mean: [f32; FEATURES],
    m2: [f32; FEATURES],
}

impl<const N: usize> NominalProfile<N> {
    /// Empty profile with default tuning.
    pub fn new() -> Self {
        Self::with_config(ProfileConfig::default())
    }

    /// Empty profile with explicit tuning.
    pub fn with_config(config: ProfileConfig) -> Self {
        Self { config, learned: 0, mean: [0.0; FEATURES], m2: [0.0; FEATURES] }
    }

    /// Windows folded in since the last `init`.
    pub fn learned(&self) -> u32 {
        self.learned
    }

    /// Learned feature means.
    pub fn feature_means(&self) -> &[f32; FEATURES] {
        &self.mean
    }

    /// Mean squared normalised deviation of `window` from the profile.
    pub fn deviation(&self, window: &[f32; N]) -> f32 {
        let f = features(window);
        let floor = self.config.min_std * self.config.min_std;
        let mut sum = 0.0;
        for k in 0..FEATURES {
            let var = if self.learned > 0 { self.m2[k] / self.learned as f32 } else { 0.0 };
            let diff = f[k] - self.mean[k];
            sum += diff * diff / var.max(floor);
        }
        sum / FEATURES as f32
    }
}

impl<const N: usize> Default for NominalProfile<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> DecisionEngine<N> for NominalProfile<N> {
    fn init(&mut self) -> Result<(), EngineError> {
        if N == 0 || N % AXES != 0 {
            return Err(EngineError::Dimension { expected: N - N % AXES, actual: N });
        }
        if !(self.config.min_std > 0.0) || !(self.config.nominal_spread > 0.0) {
            return Err(EngineError::Backend(1));
        }
        self.learned = 0;
        self.mean = [0.0; FEATURES];
        self.m2 = [0.0; FEATURES];
        Ok(())
    }

    fn learn(&mut self, window: &[f32; N]) {
        let f = features(window);
        self.learned = self.learned.saturating_add(1);
        let n = self.learned as f32;
        for k in 0..FEATURES {
            let delta = f[k] - self.mean[k];
            self.mean[k] += delta / n;
            self.m2[k] += delta * (f[k] - self.mean[k]);
        }
    }

    fn detect(&mut self, window: &[f32; N]) -> SimilarityScore {
        if self.learned == 0 {
            log::warn!("profile: detect before any learning window");
            return SimilarityScore::MIN;
        }
        let d = self.deviation(window);
        let spread = self.config.nominal_spread;
        if d <= spread {
            SimilarityScore::MAX
        } else {
            // d > spread > 0, so the ratio is in (0, 100)
            SimilarityScore::new((100.0 * spread / d) as u8)
        }
    }
}

/// Per-axis mean, variance and peak-to-peak of one window.
///
/// Output order: `[mean_x, mean_y, mean_z, var_x, var_y, var_z, p2p_x, p2p_y, p2p_z]`.
pub fn features<const N: usize>(window: &[f32; N]) -> [f32; FEATURES] {
    let mut sum = [0.0f32; AXES];
    let mut min = [f32::MAX; AXES];
    let mut max = [f32::MIN; AXES];
    let mut count = 0usize;

    for triple in window.chunks_exact(AXES) {
        for a in 0..AXES {
            sum[a] += triple[a];
            min[a] = min[a].min(triple[a]);
            max[a] = max[a].max(triple[a]);
        }
        count += 1;
    }

    let mut out = [0.0f32; FEATURES];
    if count == 0 {
        return out;
    }
    let n = count as f32;
    for a in 0..AXES {
        out[a] = sum[a] / n;
        out[2 * AXES + a] = max[a] - min[a];
    }
    for triple in window.chunks_exact(AXES) {
        for a in 0..AXES {
            let d = triple[a] - out[a];
            out[AXES + a] += d * d;
        }
    }
    for a in 0..AXES {
        out[AXES + a] /= n;
    }
    out
}
