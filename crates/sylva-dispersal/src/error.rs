//! Error types for dispersal setup and propagation.

use std::fmt;
use sylva_grid::GridError;

/// Fatal configuration errors raised at setup time.
///
/// None of these are recoverable: they indicate unusable species parameters
/// or a landscape definition the dispersal grids cannot be built on.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// A species dispersal parameter is outside its valid range.
    InvalidTrait {
        /// Name of the offending parameter.
        name: &'static str,
        /// The rejected value.
        value: f64,
        /// Human-readable description of the valid range.
        expected: &'static str,
    },
    /// The discretised kernel summed to zero before normalisation.
    DegenerateKernel,
    /// The external seed buffer is not usable for this species.
    InvalidSeedBuffer {
        /// Effective buffer width in cells after the species reduction.
        effective_cells: i32,
    },
    /// The seed belt sector partition is invalid.
    InvalidSectorGrid {
        /// Configured sector count along x.
        sectors_x: i32,
        /// Configured sector count along y.
        sectors_y: i32,
    },
    /// A seed belt fraction table does not match the sector partition.
    SectorTableMismatch {
        /// Species the table belongs to.
        species: String,
        /// Number of fractions supplied.
        got: usize,
        /// Number of sectors expected.
        expected: usize,
    },
    /// The landscape coverage mask does not share the seed map geometry.
    MaskGeometryMismatch {
        /// What differed.
        reason: String,
    },
    /// A landscape grid could not be constructed.
    Grid(GridError),
}

impl From<GridError> for ConfigError {
    fn from(err: GridError) -> Self {
        Self::Grid(err)
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidTrait {
                name,
                value,
                expected,
            } => {
                write!(f, "dispersal trait '{name}' = {value} invalid: {expected}")
            }
            Self::DegenerateKernel => {
                write!(f, "seed kernel sums to zero; species parameters are unusable")
            }
            Self::InvalidSeedBuffer { effective_cells } => {
                write!(
                    f,
                    "external seed buffer of {effective_cells} cells after species reduction; must be positive"
                )
            }
            Self::InvalidSectorGrid {
                sectors_x,
                sectors_y,
            } => {
                write!(f, "invalid seed belt sector grid: {sectors_x} x {sectors_y}")
            }
            Self::SectorTableMismatch {
                species,
                got,
                expected,
            } => {
                write!(
                    f,
                    "seed belt table for '{species}' has {got} fractions, expected {expected}"
                )
            }
            Self::MaskGeometryMismatch { reason } => {
                write!(f, "coverage mask geometry mismatch: {reason}")
            }
            Self::Grid(err) => write!(f, "landscape grid error: {err}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Grid(err) => Some(err),
            _ => None,
        }
    }
}

/// Runtime errors from per-year dispersal operations.
#[derive(Debug, Clone, PartialEq)]
pub enum DispersalError {
    /// A serotiny source was registered for a species without serotiny.
    NotSerotinous {
        /// The offending species.
        species: String,
    },
    /// A registered tree position lies outside the landscape grids.
    PositionOutOfBounds {
        /// Light-grid cell index that was registered.
        light_index: (i32, i32),
    },
}

impl fmt::Display for DispersalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotSerotinous { species } => {
                write!(
                    f,
                    "serotiny event registered for non-serotinous species '{species}'"
                )
            }
            Self::PositionOutOfBounds { light_index } => {
                write!(
                    f,
                    "registered tree at light cell {light_index:?} outside the landscape"
                )
            }
        }
    }
}

impl std::error::Error for DispersalError {}
