//! Non-fatal problems found in the input data
//!
//! Input files are produced by a long chain of scrapers and extraction
//! scripts, so a few of them are bound to be missing or damaged. None of this
//! should abort a run: the affected record or period is left out, the problem
//! is logged, and it is kept around so that callers can report on it.

use crate::{period::Period, Category, Count};
use log::Level;
use std::{fmt, path::Path};

/// Data problem that was worked around by leaving something out
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Anomaly {
    /// Denominator file could not be read, the period is skipped
    MissingDenominator { period: Period, reason: Box<str> },

    /// Denominator file does not start with an integer, the period is skipped
    MalformedDenominator { path: Box<Path>, reason: Box<str> },

    /// Denominator is too small to normalize against, the period is skipped
    UnreliableDenominator { period: Period, denominator: Count },

    /// Another denominator was already recorded for this period
    DuplicateDenominator { period: Period },

    /// Category count file could not be read
    MissingCounts { period: Period, reason: Box<str> },

    /// Line of a category count file could not be parsed
    MalformedLine {
        path: Box<Path>,
        line: usize,
        reason: Box<str>,
    },

    /// Category was seen more than once within a single period, only the
    /// first count is kept
    DuplicateCategory { period: Period, category: Category },

    /// Observation for a period that has no usable denominator
    Unnormalizable { period: Period, category: Category },
}
//
impl Anomaly {
    /// Log level that this anomaly should be reported at
    ///
    /// Absent inputs are expected in a sparse archive, whereas damaged or
    /// inconsistent records point at a bug in an upstream extractor.
    pub fn level(&self) -> Level {
        match self {
            Self::MissingDenominator { .. }
            | Self::UnreliableDenominator { .. }
            | Self::MissingCounts { .. }
            | Self::Unnormalizable { .. } => Level::Info,
            Self::MalformedDenominator { .. }
            | Self::DuplicateDenominator { .. }
            | Self::MalformedLine { .. }
            | Self::DuplicateCategory { .. } => Level::Warn,
        }
    }

    /// Truth that this anomaly is a data-quality warning
    pub fn is_warning(&self) -> bool {
        self.level() <= Level::Warn
    }

    /// Report this anomaly in the logs
    pub fn log(&self) {
        log::log!(self.level(), "{self}");
    }
}
//
impl fmt::Display for Anomaly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingDenominator { period, reason } => write!(
                f,
                "Skipping {period}: no monthly active user count ({reason})"
            ),
            Self::MalformedDenominator { path, reason } => {
                write!(f, "Skipping {}: {reason}", path.display())
            }
            Self::UnreliableDenominator {
                period,
                denominator,
            } => write!(
                f,
                "Skipping {period}: insufficient monthly active user count of {denominator}"
            ),
            Self::DuplicateDenominator { period } => {
                write!(f, "Duplicate monthly active user count for {period}")
            }
            Self::MissingCounts { period, reason } => {
                write!(f, "No language counts for {period} ({reason})")
            }
            Self::MalformedLine { path, line, reason } => {
                write!(f, "Ignoring line {line} of {}: {reason}", path.display())
            }
            Self::DuplicateCategory { period, category } => {
                write!(f, "Duplicate language {category:?} in {period}")
            }
            Self::Unnormalizable { period, category } => write!(
                f,
                "Ignoring {category:?} count for {period}, which has no usable denominator"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severities() {
        let period = Period::new(2015, 1).unwrap();
        let missing = Anomaly::MissingCounts {
            period,
            reason: "not found".into(),
        };
        let duplicate = Anomaly::DuplicateCategory {
            period,
            category: "Python".into(),
        };
        assert!(!missing.is_warning());
        assert!(duplicate.is_warning());
        assert_eq!(
            duplicate.to_string(),
            "Duplicate language \"Python\" in 2015-01"
        );
    }
}
