/*
 * This source code is licensed under the Business Source License 1.1.
 * See LICENSE in the root directory for full details.
 */

//! Pipeline phase: the learn-then-infer state machine.
//!
//! ```text
//!  Uninitialized ──begin_learning(K)──▶ Learning { remaining: K }
//!                                          │ complete_window()
//!                                          ▼
//!                                       Learning { remaining: K−1 } … Learning { remaining: 1 }
//!                                          │ complete_window()
//!                                          ▼
//!                                       Inferring ◀─┐ complete_window()
//!                                          └────────┘
//! ```
//!
//! # Invariants
//!
//! - `Learning { remaining: 0 }` is never constructed; the last learning
//!   window moves straight to `Inferring`.
//! - Transitions only move forward. `Inferring` is terminal.
//! - `begin_learning(0)` skips learning entirely.

/// Current stage of the pipeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
pub enum Phase {
    /// Sensor and engine not yet brought up.
    #[default]
    Uninitialized,
    /// Feeding windows to `learn`; `remaining` ≥ 1.
    Learning {
        /// Learning windows still to acquire.
        remaining: u16,
    },
    /// Scoring every window. Never left.
    Inferring,
}

impl Phase {
    /// Leave `Uninitialized` after a successful bring-up.
    ///
    /// Any other phase is returned unchanged; bring-up happens once.
    pub fn begin_learning(self, iterations: u16) -> Phase {
        match self {
            Phase::Uninitialized if iterations == 0 => Phase::Inferring,
            Phase::Uninitialized => Phase::Learning { remaining: iterations },
            other => other,
        }
    }

    /// Advance after one window has been consumed.
    pub fn complete_window(self) -> Phase {
        match self {
            Phase::Learning { remaining } if remaining > 1 => {
                Phase::Learning { remaining: remaining - 1 }
            }
            Phase::Learning { .. } => Phase::Inferring,
            other => other,
        }
    }

    /// True while learning windows remain.
    pub fn is_learning(&self) -> bool {
        matches!(self, Phase::Learning { .. })
    }

    /// True once inference has started.
    pub fn is_inferring(&self) -> bool {
        matches!(self, Phase::Inferring)
    }

    /// 1-based index of the learning window about to be acquired, out of `total`.
    pub fn learning_iteration(&self, total: u16) -> Option<u16> {
        match self {
            Phase::Learning { remaining } => Some(total.saturating_sub(*remaining) + 1),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_phase() {
        assert_eq!(Phase::default(), Phase::Uninitialized);
    }

    #[test]
    fn test_begin_learning() {
        assert_eq!(Phase::Uninitialized.begin_learning(20), Phase::Learning { remaining: 20 });
    }

    #[test]
    fn test_zero_iterations_skips_to_inferring() {
        assert_eq!(Phase::Uninitialized.begin_learning(0), Phase::Inferring);
    }

    #[test]
    fn test_begin_learning_only_once() {
        let p = Phase::Learning { remaining: 3 };
        assert_eq!(p.begin_learning(20), p);
        assert_eq!(Phase::Inferring.begin_learning(20), Phase::Inferring);
    }

    #[test]
    fn test_exactly_k_windows_reach_inferring() {
        let mut p = Phase::Uninitialized.begin_learning(20);
        for i in 0..20 {
            assert!(p.is_learning(), "window {} should still be learning", i);
            p = p.complete_window();
        }
        assert_eq!(p, Phase::Inferring);
    }

    #[test]
    fn test_inferring_is_terminal() {
        let mut p = Phase::Inferring;
        for _ in 0..1000 {
            p = p.complete_window();
            assert!(p.is_inferring());
        }
    }

    #[test]
    fn test_uninitialized_ignores_window_completion() {
        assert_eq!(Phase::Uninitialized.complete_window(), Phase::Uninitialized);
    }

    #[test]
    fn test_learning_iteration_counts_up() {
        let total = 20;
        let mut p = Phase::Uninitialized.begin_learning(total);
        assert_eq!(p.learning_iteration(total), Some(1));
        p = p.complete_window();
        assert_eq!(p.learning_iteration(total), Some(2));
        for _ in 0..18 {
            p = p.complete_window();
        }
        assert_eq!(p.learning_iteration(total), Some(20));
        p = p.complete_window();
        assert_eq!(p.learning_iteration(total), None);
    }
}
