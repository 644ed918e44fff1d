//! Serial status reporting.
//!
//! Everything the pipeline tells the host is a [`Report`], rendered as one
//! `\r\n`-terminated text line:
//!
//! | Report | Line |
//! |--------|------|
//! | `Ready` | `UART Ready` |
//! | `EngineInit { ok: true }` | `Engine init: OK` |
//! | `EngineInit { ok: false }` | `Engine init: ERROR` |
//! | `LearningProgress { iteration: 3, total: 20 }` | `Learning iteration 3/20` |
//! | `LearningFinished` | `Learning finished` |
//! | `Verdict(..)` | `NOMINAL,95` / `ANOMALY,42` |
//!
//! Verdict and learning lines match the legacy STM32 firmware byte for byte.
//! The two bring-up lines do not: that firmware printed `STM32 UART Ready`
//! and `NanoEdgeAI init: OK|ERROR`, naming its board and vendor engine.
//! Host scripts that matched those literals must match `UART Ready` and
//! `Engine init: ` here.
//!
//! Reporting is fire-and-forget: a sink that fails to accept a line costs
//! that line, never the pipeline.

use core::fmt::{self, Write};

use heapless::String;

use crate::config::REPORT_LINE_CAPACITY;
use crate::verdict::Verdict;

/// One status message for the host.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
pub enum Report {
    /// Serial link is up.
    Ready,
    /// Outcome of decision engine initialisation.
    EngineInit {
        /// `true` when `init` succeeded.
        ok: bool,
    },
    /// About to acquire learning window `iteration` of `total` (1-based).
    LearningProgress {
        /// Current window, starting at 1.
        iteration: u16,
        /// Learning windows in total.
        total: u16,
    },
    /// Last learning window consumed; inference follows.
    LearningFinished,
    /// Classification of an inference window.
    Verdict(Verdict),
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Report::Ready => f.write_str("UART Ready"),
            Report::EngineInit { ok } => {
                write!(f, "Engine init: {}", if *ok { "OK" } else { "ERROR" })
            }
            Report::LearningProgress { iteration, total } => {
                write!(f, "Learning iteration {}/{}", iteration, total)
            }
            Report::LearningFinished => f.write_str("Learning finished"),
            Report::Verdict(v) => write!(f, "{}", v),
        }
    }
}

/// Destination for [`Report`]s.
pub trait Reporter {
    /// Emit one report. Must not block indefinitely or fail the caller.
    fn report(&mut self, report: &Report);
}

impl<T: Reporter + ?Sized> Reporter for &mut T {
    fn report(&mut self, report: &Report) {
        (**self).report(report)
    }
}

/// Drops every report. For headless runs.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullReporter;

impl Reporter for NullReporter {
    fn report(&mut self, _report: &Report) {}
}

/// Formats reports as text lines onto a byte-oriented serial port.
///
/// Each line is rendered into a fixed [`REPORT_LINE_CAPACITY`]-byte buffer and
/// then written in one call, so the port never sees a partial line. Lines
/// that would not fit are dropped with a warning.
pub struct SerialReporter<W> {
    port: W,
    dropped: u32,
}

impl<W: Write> SerialReporter<W> {
    /// Wrap a serial writer (a HAL UART implementing `core::fmt::Write`).
    pub fn new(port: W) -> Self {
        Self { port, dropped: 0 }
    }

    /// Lines lost to formatting overflow or port errors.
    pub fn dropped(&self) -> u32 {
        self.dropped
    }

    /// Borrow the port.
    pub fn port(&self) -> &W {
        &self.port
    }

    /// Give the port back.
    pub fn into_inner(self) -> W {
        self.port
    }
}

impl<W: Write> Reporter for SerialReporter<W> {
    fn report(&mut self, report: &Report) {
        let mut line: String<REPORT_LINE_CAPACITY> = String::new();
        if write!(line, "{}\r\n", report).is_err() {
            self.dropped = self.dropped.saturating_add(1);
            log::warn!("report: line exceeds {} bytes, dropped", REPORT_LINE_CAPACITY);
            return;
        }
        if self.port.write_str(&line).is_err() {
            self.dropped = self.dropped.saturating_add(1);
            log::warn!("report: serial write failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::SimilarityScore;

    fn render(report: Report) -> String<256> {
        let mut r = SerialReporter::new(String::<256>::new());
        r.report(&report);
        assert_eq!(r.dropped(), 0);
        r.into_inner()
    }

    #[test]
    fn test_line_formats() {
        assert_eq!(render(Report::Ready).as_str(), "UART Ready\r\n");
        assert_eq!(render(Report::EngineInit { ok: true }).as_str(), "Engine init: OK\r\n");
        assert_eq!(render(Report::EngineInit { ok: false }).as_str(), "Engine init: ERROR\r\n");
        assert_eq!(
            render(Report::LearningProgress { iteration: 3, total: 20 }).as_str(),
            "Learning iteration 3/20\r\n"
        );
        assert_eq!(render(Report::LearningFinished).as_str(), "Learning finished\r\n");
        assert_eq!(
            render(Report::Verdict(Verdict::Nominal(SimilarityScore::new(95)))).as_str(),
            "NOMINAL,95\r\n"
        );
        assert_eq!(
            render(Report::Verdict(Verdict::Anomaly(SimilarityScore::new(7)))).as_str(),
            "ANOMALY,7\r\n"
        );
    }

    #[test]
    fn test_lines_accumulate_in_order() {
        let mut r = SerialReporter::new(String::<256>::new());
        r.report(&Report::Ready);
        r.report(&Report::LearningFinished);
        assert_eq!(r.port().as_str(), "UART Ready\r\nLearning finished\r\n");
    }

    #[test]
    fn test_port_overflow_is_counted_not_fatal() {
        let mut r = SerialReporter::new(String::<12>::new());
        r.report(&Report::Ready); // 12 bytes, fits exactly
        r.report(&Report::Ready);
        assert_eq!(r.dropped(), 1);
        assert_eq!(r.port().as_str(), "UART Ready\r\n");
    }
}
