//! Yearly multi-species driver for Sylva seed dispersal.
//!
//! The simulation's year/step loop interacts with dispersal through the
//! [`DispersalEngine`]: it starts the year (clearing and reseeding all
//! per-species fields), lets the growth driver register mature trees, then
//! propagates every active species concurrently, one task per species on
//! a scoped worker pool, and hands back per-species statistics once all
//! seed fields are stable.
//!
//! Per-species tasks are embarrassingly parallel: no species reads or
//! writes another species' grids, and each task owns an independent
//! deterministic RNG stream derived from the engine's master seed.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod driver;
pub mod error;

pub use driver::{DispersalEngine, SpeciesStats, YearStats};
pub use error::EngineError;
