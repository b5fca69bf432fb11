//! Landscape grid storage for Sylva simulations.
//!
//! This crate defines the [`Grid`] container (a rectangular array of
//! per-cell values with a fixed physical cell size and a world-space
//! origin) together with the geometry helpers every other Sylva crate
//! builds on.
//!
//! # Resolutions
//!
//! The model works with a small set of fixed grid resolutions, defined in
//! [`constants`]: the 20 m seed/regeneration grid, the 2 m light grid and
//! the 100 m resource-unit tiling. All grids that are combined cell-by-cell
//! (seed maps, source maps, external overlays) must agree on extent, origin
//! and cell size; [`Grid::copy_from`] enforces this.
//!
//! # Torus addressing
//!
//! [`torus`] holds the pure index-remapping used when the simulated area is
//! configured with glued edges. It is independent of grid storage so it can
//! be tested in isolation.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod constants;
pub mod error;
pub mod grid;
pub mod torus;

pub use error::GridError;
pub use grid::{Grid, Rect};
