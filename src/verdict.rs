//! Per-window classification and its wire form.
//!
//! A [`Verdict`] is the similarity score plus which side of the nominal
//! threshold it fell on. On the wire it is one CSV-style line,
//! `NOMINAL,<score>` or `ANOMALY,<score>`; [`Verdict::parse_line`] is the
//! host-side inverse used by receivers that log or chart the stream.
//!
//! With the `serde` feature, [`VerdictRecord`] gives the JSON shape receivers
//! publish (`{"anomalyStatus":"NOMINAL","anomalyValue":95}`).

use core::fmt;
use core::str::FromStr;

use crate::engine::SimilarityScore;

/// Classification of one inference window.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
pub enum Verdict {
    /// Similarity at or above the threshold.
    Nominal(SimilarityScore),
    /// Similarity below the threshold.
    Anomaly(SimilarityScore),
}

impl Verdict {
    /// Classify `score` against `threshold` (inclusive on the nominal side).
    pub fn classify(score: SimilarityScore, threshold: u8) -> Verdict {
        if score.get() >= threshold {
            Verdict::Nominal(score)
        } else {
            Verdict::Anomaly(score)
        }
    }

    /// The underlying similarity.
    pub fn score(&self) -> SimilarityScore {
        match self {
            Verdict::Nominal(s) | Verdict::Anomaly(s) => *s,
        }
    }

    /// True for [`Verdict::Anomaly`].
    pub fn is_anomaly(&self) -> bool {
        matches!(self, Verdict::Anomaly(_))
    }

    /// Wire label: `"NOMINAL"` or `"ANOMALY"`.
    pub fn label(&self) -> &'static str {
        match self {
            Verdict::Nominal(_) => "NOMINAL",
            Verdict::Anomaly(_) => "ANOMALY",
        }
    }

    /// Parse one report line. Trailing `\r\n` and surrounding whitespace are
    /// ignored; anything other than a verdict line is an error.
    pub fn parse_line(line: &str) -> Result<Verdict, ParseError> {
        let line = line.trim();
        let (label, value) = line.split_once(',').ok_or(ParseError::MissingSeparator)?;
        let raw: u8 = value.trim().parse().map_err(|_| ParseError::BadScore)?;
        if raw > 100 {
            return Err(ParseError::BadScore);
        }
        let score = SimilarityScore::new(raw);
        match label.trim() {
            "NOMINAL" => Ok(Verdict::Nominal(score)),
            "ANOMALY" => Ok(Verdict::Anomaly(score)),
            _ => Err(ParseError::UnknownLabel),
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.label(), self.score())
    }
}

impl FromStr for Verdict {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Verdict::parse_line(s)
    }
}

/// Why a line is not a verdict.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
pub enum ParseError {
    /// No `,` between label and score.
    MissingSeparator,
    /// Label is neither `NOMINAL` nor `ANOMALY`.
    UnknownLabel,
    /// Score is not an integer in 0..=100.
    BadScore,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            ParseError::MissingSeparator => "missing ',' separator",
            ParseError::UnknownLabel => "unknown verdict label",
            ParseError::BadScore => "score not in 0..=100",
        };
        f.write_str(msg)
    }
}

/// JSON-facing view of a [`Verdict`].
#[cfg(feature = "serde")]
#[derive(serde::Serialize, serde::Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VerdictRecord {
    /// `"NOMINAL"` or `"ANOMALY"`.
    pub anomaly_status: Status,
    /// Similarity score 0–100.
    pub anomaly_value: u8,
}

/// Serialized verdict label.
#[cfg(feature = "serde")]
#[derive(serde::Serialize, serde::Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum Status {
    /// Window matched the learned pattern.
    Nominal,
    /// Window deviated from the learned pattern.
    Anomaly,
}

#[cfg(feature = "serde")]
impl From<&Verdict> for VerdictRecord {
    fn from(v: &Verdict) -> Self {
        let anomaly_status = if v.is_anomaly() { Status::Anomaly } else { Status::Nominal };
        Self { anomaly_status, anomaly_value: v.score().get() }
    }
}

#[cfg(feature = "serde")]
impl From<&VerdictRecord> for Verdict {
    fn from(r: &VerdictRecord) -> Self {
        let score = SimilarityScore::new(r.anomaly_value);
        match r.anomaly_status {
            Status::Nominal => Verdict::Nominal(score),
            Status::Anomaly => Verdict::Anomaly(score),
        }
    }
}
