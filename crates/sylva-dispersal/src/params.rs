//! Species dispersal parameters and shared dispersal settings.

use crate::error::ConfigError;

/// Which propagation strategy a landscape runs with.
///
/// Selected once at setup; the per-cell semantics of the seed map differ
/// between the two and are never mixed within a year.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PropagationMode {
    /// Direct leaf-area-weighted convolution from a source field (default).
    Source,
    /// Legacy two-pass probability accumulation from saturated edges.
    Probability,
}

/// Immutable per-species dispersal parameters.
///
/// The kernel shape follows the two-part exponential of Lischke & Löffler
/// (2006): `alpha1`/`alpha2` are the decay lengths of the short- and
/// long-range component and `kappa` mixes them.
#[derive(Clone, Debug, PartialEq)]
pub struct DispersalTraits {
    /// Decay length of the short-range kernel component, metres. Positive.
    pub alpha1: f64,
    /// Decay length of the long-range component, metres. Zero disables it.
    pub alpha2: f64,
    /// Mixture weight of the long-range component, in [0, 1].
    pub kappa: f64,
    /// Expected viable seeds per m² of leaf area per seed year. Positive.
    pub fecundity_m2: f64,
    /// Fraction of seed production realised in non-seed years, in [0, 1].
    pub non_seed_year_fraction: f64,
    /// Fecundity multiplier for fire-triggered seed release; 0 when the
    /// species is not serotinous.
    pub fecundity_serotiny: f64,
}

impl DispersalTraits {
    /// Whether seed release requires an external (fire) trigger.
    pub fn is_serotinous(&self) -> bool {
        self.fecundity_serotiny > 0.0
    }

    /// Validate all parameter ranges.
    ///
    /// Invalid species parameters are a fatal configuration error; there is
    /// no meaningful fallback for a kernel built from them.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.alpha1.is_finite() || self.alpha1 <= 0.0 {
            return Err(ConfigError::InvalidTrait {
                name: "alpha1",
                value: self.alpha1,
                expected: "finite and positive",
            });
        }
        if !self.alpha2.is_finite() || self.alpha2 < 0.0 {
            return Err(ConfigError::InvalidTrait {
                name: "alpha2",
                value: self.alpha2,
                expected: "finite and non-negative",
            });
        }
        if !(0.0..=1.0).contains(&self.kappa) {
            return Err(ConfigError::InvalidTrait {
                name: "kappa",
                value: self.kappa,
                expected: "in [0, 1]",
            });
        }
        if !self.fecundity_m2.is_finite() || self.fecundity_m2 <= 0.0 {
            return Err(ConfigError::InvalidTrait {
                name: "fecundity_m2",
                value: self.fecundity_m2,
                expected: "finite and positive",
            });
        }
        if !(0.0..=1.0).contains(&self.non_seed_year_fraction) {
            return Err(ConfigError::InvalidTrait {
                name: "non_seed_year_fraction",
                value: self.non_seed_year_fraction,
                expected: "in [0, 1]",
            });
        }
        if !self.fecundity_serotiny.is_finite() || self.fecundity_serotiny < 0.0 {
            return Err(ConfigError::InvalidTrait {
                name: "fecundity_serotiny",
                value: self.fecundity_serotiny,
                expected: "finite and non-negative",
            });
        }
        Ok(())
    }
}

/// Landscape-wide dispersal settings shared by all species.
///
/// The defaults reproduce the tuned values the model was calibrated with;
/// the gap-fill quorum and the ring blend weights in particular are
/// empirical and deliberately exposed as configuration rather than
/// re-derived.
#[derive(Clone, Debug, PartialEq)]
pub struct DispersalSettings {
    /// Kernel density below which a cell no longer counts as covered area.
    pub threshold_area: f64,
    /// Kernel density down to which long-distance dispersal is modelled.
    /// LDD is active only when this lies below `threshold_area`.
    pub threshold_ldd: f64,
    /// Seedling probability assigned to each LDD landing cell.
    pub ldd_seedlings: f32,
    /// Number of equal-width LDD rings.
    pub ldd_rings: usize,
    /// Seeds required per destination cell for saturation (probability mode).
    pub occupancy: f64,
    /// Propagation strategy.
    pub mode: PropagationMode,
    /// Glue the landscape edges into a torus of resource-unit tiles.
    pub torus: bool,
    /// A non-saturated cell with more than this many of its 8 neighbours
    /// saturated is promoted during gap filling (probability mode).
    pub gap_fill_quorum: u32,
    /// Weight of the inner-radius kernel value in the per-ring LDD blend.
    pub ring_blend_inner: f64,
    /// Weight of the outer-radius kernel value in the per-ring LDD blend.
    pub ring_blend_outer: f64,
}

impl Default for DispersalSettings {
    fn default() -> Self {
        Self {
            threshold_area: 1e-4,
            threshold_ldd: 1e-4,
            ldd_seedlings: 1e-4,
            ldd_rings: 4,
            occupancy: 1.0,
            mode: PropagationMode::Source,
            torus: false,
            gap_fill_quorum: 3,
            ring_blend_inner: 0.4,
            ring_blend_outer: 0.6,
        }
    }
}

impl DispersalSettings {
    /// Validate the settings.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.threshold_area.is_finite() || self.threshold_area <= 0.0 {
            return Err(ConfigError::InvalidTrait {
                name: "threshold_area",
                value: self.threshold_area,
                expected: "finite and positive",
            });
        }
        if !self.threshold_ldd.is_finite() || self.threshold_ldd <= 0.0 {
            return Err(ConfigError::InvalidTrait {
                name: "threshold_ldd",
                value: self.threshold_ldd,
                expected: "finite and positive",
            });
        }
        if !self.ldd_seedlings.is_finite() || self.ldd_seedlings <= 0.0 {
            return Err(ConfigError::InvalidTrait {
                name: "ldd_seedlings",
                value: self.ldd_seedlings as f64,
                expected: "finite and positive",
            });
        }
        if self.ldd_rings == 0 && self.threshold_ldd < self.threshold_area {
            return Err(ConfigError::InvalidTrait {
                name: "ldd_rings",
                value: 0.0,
                expected: "at least one ring when LDD is enabled",
            });
        }
        if self.occupancy <= 0.0 {
            return Err(ConfigError::InvalidTrait {
                name: "occupancy",
                value: self.occupancy,
                expected: "positive",
            });
        }
        Ok(())
    }

    /// The per-landing probability, floored at the area threshold.
    ///
    /// A landing probability below the coverage threshold would assign LDD
    /// cells less seed than the kernel fringe they sit beyond.
    pub fn effective_ldd_seedlings(&self) -> f32 {
        self.ldd_seedlings.max(self.threshold_area as f32)
    }
}
