//! Error types for the yearly dispersal driver.

use std::fmt;
use sylva_dispersal::DispersalError;

/// Errors from driving a year of multi-species dispersal.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineError {
    /// One species' propagation task failed; the year is aborted.
    ///
    /// A partially propagated landscape would silently bias establishment,
    /// so no species' field from this year may be consumed.
    SpeciesFailed {
        /// The failing species.
        species: String,
        /// The underlying dispersal error.
        reason: DispersalError,
    },
    /// The per-species seed-year flags do not match the registered species.
    SeedYearMismatch {
        /// Number of registered species.
        expected: usize,
        /// Number of flags supplied.
        got: usize,
    },
    /// Propagation was requested before the year was started.
    YearNotStarted,
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SpeciesFailed { species, reason } => {
                write!(f, "dispersal of species '{species}' failed: {reason}")
            }
            Self::SeedYearMismatch { expected, got } => {
                write!(
                    f,
                    "seed-year flags for {got} species, but {expected} are registered"
                )
            }
            Self::YearNotStarted => {
                write!(f, "propagate_year called before begin_year")
            }
        }
    }
}

impl std::error::Error for EngineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::SpeciesFailed { reason, .. } => Some(reason),
            _ => None,
        }
    }
}
