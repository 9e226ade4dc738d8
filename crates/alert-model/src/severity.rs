//! Severity Ranking Table
//!
//! Severity names arrive as free-form strings from many monitoring sources.
//! Trend computation needs a total order over them, so every known name maps
//! to an explicit rank here instead of relying on string comparison.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity assigned to drafts that do not carry one
pub const DEFAULT_SEVERITY: &str = "normal";

/// Known severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Unknown,
    Trace,
    Debug,
    Informational,
    Normal,
    Ok,
    Cleared,
    Indeterminate,
    Warning,
    Minor,
    Major,
    Critical,
    Security,
}

impl Severity {
    /// Every level, least severe first
    pub const ALL: [Severity; 13] = [
        Severity::Unknown,
        Severity::Trace,
        Severity::Debug,
        Severity::Informational,
        Severity::Normal,
        Severity::Ok,
        Severity::Cleared,
        Severity::Indeterminate,
        Severity::Warning,
        Severity::Minor,
        Severity::Major,
        Severity::Critical,
        Severity::Security,
    ];

    /// Rank used for trend computation (higher = more severe).
    ///
    /// `normal`, `ok` and `cleared` all describe a recovered condition and
    /// share a rank.
    pub fn rank(self) -> u8 {
        match self {
            Severity::Unknown => 0,
            Severity::Trace => 1,
            Severity::Debug => 2,
            Severity::Informational => 3,
            Severity::Normal | Severity::Ok | Severity::Cleared => 4,
            Severity::Indeterminate => 5,
            Severity::Warning => 6,
            Severity::Minor => 7,
            Severity::Major => 8,
            Severity::Critical => 9,
            Severity::Security => 10,
        }
    }

    /// Look up a severity name, ignoring case. Unrecognised names rank as
    /// [`Severity::Unknown`].
    pub fn from_name(name: &str) -> Self {
        let name = name.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|s| s.as_str().eq_ignore_ascii_case(name))
            .unwrap_or(Severity::Unknown)
    }

    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Unknown => "unknown",
            Severity::Trace => "trace",
            Severity::Debug => "debug",
            Severity::Informational => "informational",
            Severity::Normal => "normal",
            Severity::Ok => "ok",
            Severity::Cleared => "cleared",
            Severity::Indeterminate => "indeterminate",
            Severity::Warning => "warning",
            Severity::Minor => "minor",
            Severity::Major => "major",
            Severity::Critical => "critical",
            Severity::Security => "security",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Direction of a severity change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TrendIndication {
    MoreSevere,
    LessSevere,
    NoChange,
}

impl TrendIndication {
    /// Classify the move from `previous` to `current` by rank
    pub fn between(previous: Severity, current: Severity) -> Self {
        match current.rank().cmp(&previous.rank()) {
            std::cmp::Ordering::Greater => TrendIndication::MoreSevere,
            std::cmp::Ordering::Less => TrendIndication::LessSevere,
            std::cmp::Ordering::Equal => TrendIndication::NoChange,
        }
    }

    /// Classify the move between two raw severity names
    pub fn between_names(previous: &str, current: &str) -> Self {
        Self::between(Severity::from_name(previous), Severity::from_name(current))
    }
}
