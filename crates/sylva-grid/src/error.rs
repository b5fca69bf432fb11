//! Error types for grid construction and geometry checks.

use std::fmt;

/// Errors arising from grid construction or cross-grid operations.
#[derive(Debug, Clone, PartialEq)]
pub enum GridError {
    /// The cell size is zero, negative, or not finite.
    InvalidCellSize {
        /// The offending cell size in metres.
        cell_size: f32,
    },
    /// Attempted to construct a grid with zero cells on an axis.
    EmptyGrid,
    /// A world-space extent is not a positive integer multiple of the cell size.
    ExtentNotAligned {
        /// The offending extent in metres.
        extent: f32,
        /// The cell size the extent must align to.
        cell_size: f32,
    },
    /// Two grids that must share geometry (extent, origin, cell size) do not.
    GeometryMismatch {
        /// What differed.
        reason: String,
    },
}

impl fmt::Display for GridError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidCellSize { cell_size } => {
                write!(f, "invalid cell size: {cell_size} m")
            }
            Self::EmptyGrid => write!(f, "grid must have at least one cell per axis"),
            Self::ExtentNotAligned { extent, cell_size } => {
                write!(
                    f,
                    "extent of {extent} m is not a positive multiple of the {cell_size} m cell size"
                )
            }
            Self::GeometryMismatch { reason } => {
                write!(f, "grid geometry mismatch: {reason}")
            }
        }
    }
}

impl std::error::Error for GridError {}
