//! Decision engine capability.
//!
//! The pipeline treats the anomaly model as opaque: it initialises it once,
//! feeds it complete learning windows, then asks it for a similarity score per
//! inference window. Vendor libraries (generated C models, TinyML runtimes)
//! sit behind this trait through a thin FFI wrapper; [`crate::profile`]
//! provides a self-contained implementation.

use core::fmt;

/// Similarity between a window and the learned nominal pattern, 0–100.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
pub struct SimilarityScore(u8);

impl SimilarityScore {
    /// Highest possible similarity.
    pub const MAX: Self = Self(100);
    /// Lowest possible similarity.
    pub const MIN: Self = Self(0);

    /// Wrap a raw score, clamping anything above 100.
    pub const fn new(value: u8) -> Self {
        if value > 100 {
            Self(100)
        } else {
            Self(value)
        }
    }

    /// Raw value in [0, 100].
    pub const fn get(self) -> u8 {
        self.0
    }
}

impl From<SimilarityScore> for u8 {
    fn from(s: SimilarityScore) -> u8 {
        s.0
    }
}

impl fmt::Display for SimilarityScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Decision engine failure.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
pub enum EngineError {
    /// The engine was built for a different window length.
    Dimension {
        /// Length the engine expects.
        expected: usize,
        /// Length it was given.
        actual: usize,
    },
    /// Backend-specific status code (e.g. a vendor library's init result).
    Backend(u8),
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::Dimension { expected, actual } => {
                write!(f, "window length {} (engine expects {})", actual, expected)
            }
            EngineError::Backend(code) => write!(f, "backend status {}", code),
        }
    }
}

/// Anomaly-detection capability over windows of `N` floats.
///
/// Call order is `init`, then `learn` in acquisition order, then `detect`
/// once per inference window. Only complete windows are ever passed in.
pub trait DecisionEngine<const N: usize> {
    /// Prepare the model. Called once before any `learn`.
    fn init(&mut self) -> Result<(), EngineError>;

    /// Fold one nominal window into the model.
    fn learn(&mut self, window: &[f32; N]);

    /// Score one window against the model.
    fn detect(&mut self, window: &[f32; N]) -> SimilarityScore;
}

impl<T: DecisionEngine<N> + ?Sized, const N: usize> DecisionEngine<N> for &mut T {
    fn init(&mut self) -> Result<(), EngineError> {
        (**self).init()
    }

    fn learn(&mut self, window: &[f32; N]) {
        (**self).learn(window)
    }

    fn detect(&mut self, window: &[f32; N]) -> SimilarityScore {
        (**self).detect(window)
    }
}
