//! Seed dispersal core of the Sylva forest landscape model.
//!
//! Models the landscape-scale dispersal of tree seeds from mature source
//! trees to potential regeneration sites, one species at a time, on the
//! 20 m seed grid. The pipeline per species and year:
//!
//! 1. an analytic dispersal kernel is built once from species parameters
//!    ([`kernel::DispersalKernel`]) together with the long-distance
//!    dispersal ring table ([`ldd::LddRings`]);
//! 2. the growth driver registers mature trees
//!    ([`SeedDispersal::set_mature_tree`]);
//! 3. [`SeedDispersal::propagate`] fills the seed density field, either by
//!    direct source-weighted convolution (default) or by the legacy
//!    two-pass probability propagation;
//! 4. establishment reads the field via [`SeedDispersal::seed_value`].
//!
//! External seed influx from outside the simulated area is layered in at
//! year start, either as a directional perimeter band or as a sector-based
//! seed belt ([`external`]).
//!
//! # Determinism
//!
//! All stochastic draws (LDD landings, belt sampling) go through a caller
//! supplied RNG, so per-species streams can be derived from a master seed
//! and results are reproducible regardless of task scheduling.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod dispersal;
pub mod dump;
pub mod error;
pub mod external;
pub mod kernel;
pub mod ldd;
pub mod params;
mod probability;
mod source;

pub use dispersal::{ExternalSeeds, LandscapeGeometry, SeedDispersal};
pub use error::{ConfigError, DispersalError};
pub use external::{
    CardinalMask, CellCoverage, DirectionalSeedConfig, SeedBelt, SeedBeltConfig,
};
pub use kernel::DispersalKernel;
pub use ldd::{LddRing, LddRings};
pub use params::{DispersalSettings, DispersalTraits, PropagationMode};
