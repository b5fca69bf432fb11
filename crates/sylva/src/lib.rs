//! Sylva: landscape-scale forest seed dispersal simulation.
//!
//! This is the top-level facade crate re-exporting the public API of the
//! Sylva sub-crates. For most users, adding `sylva` as a single dependency
//! is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use sylva::prelude::*;
//!
//! // A 800 m x 800 m landscape with a 4-cell buffer.
//! let geometry = LandscapeGeometry {
//!     extent: Rect::new(0.0, 0.0, 800.0, 800.0),
//!     buffer_cells: 4,
//! };
//! let traits = DispersalTraits {
//!     alpha1: 30.0,
//!     alpha2: 200.0,
//!     kappa: 0.2,
//!     fecundity_m2: 20.0,
//!     non_seed_year_fraction: 0.25,
//!     fecundity_serotiny: 0.0,
//! };
//! let dispersal = SeedDispersal::new(
//!     "piab",
//!     traits,
//!     DispersalSettings::default(),
//!     &geometry,
//!     ExternalSeeds::None,
//! )
//! .unwrap();
//!
//! let mut engine = DispersalEngine::new(42);
//! engine.add_species(dispersal);
//!
//! // One simulated year: reset, register a mature tree, propagate.
//! engine.begin_year(1, &[true]).unwrap();
//! engine
//!     .species_mut("piab")
//!     .unwrap()
//!     .set_mature_tree((200, 200), 150.0)
//!     .unwrap();
//! let stats = engine.propagate_year().unwrap();
//! assert!(stats.species[0].occupied_cells > 0);
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`grid`] | `sylva-grid` | Grid storage, world geometry, torus remapping |
//! | [`dispersal`] | `sylva-dispersal` | Kernels, LDD rings, propagation, external seeds |
//! | [`engine`] | `sylva-engine` | The yearly multi-species driver |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Grid storage and landscape geometry (`sylva-grid`).
pub use sylva_grid as grid;

/// Seed dispersal kernels and propagation (`sylva-dispersal`).
pub use sylva_dispersal as dispersal;

/// The yearly multi-species driver (`sylva-engine`).
pub use sylva_engine as engine;

/// Common imports for typical Sylva usage.
///
/// ```rust
/// use sylva::prelude::*;
/// ```
pub mod prelude {
    pub use sylva_dispersal::{
        CardinalMask, CellCoverage, ConfigError, DirectionalSeedConfig, DispersalError,
        DispersalKernel, DispersalSettings, DispersalTraits, ExternalSeeds, LandscapeGeometry,
        LddRings, PropagationMode, SeedBelt, SeedBeltConfig, SeedDispersal,
    };
    pub use sylva_engine::{DispersalEngine, EngineError, SpeciesStats, YearStats};
    pub use sylva_grid::{Grid, GridError, Rect};
}
