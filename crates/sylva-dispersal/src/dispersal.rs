//! Per-species seed dispersal state and the year cycle.
//!
//! A [`SeedDispersal`] owns every grid and kernel belonging to one species:
//! the landscape-wide seed density field, the source field, the optional
//! serotiny field, and the immutable kernels and LDD table built at setup.
//! The yearly cycle is: [`start_year`](SeedDispersal::start_year) →
//! tree registration → [`propagate`](SeedDispersal::propagate) → read-only
//! queries via [`seed_value`](SeedDispersal::seed_value).

use crate::error::{ConfigError, DispersalError};
use crate::external::DirectionalSeedConfig;
use crate::kernel::{fecundity_per_cell, DispersalKernel};
use crate::ldd::LddRings;
use crate::params::{DispersalSettings, DispersalTraits, PropagationMode};
use crate::source::TorusGeometry;
use crate::{probability, source};
use rand::Rng;
use sylva_grid::constants::{LIGHT_CELLS_PER_SEED_CELL, SEED_CELLS_PER_RESOURCE_UNIT, SEED_CELL_SIZE};
use sylva_grid::{Grid, Rect};

/// Full leaf-area equivalent of a seed cell stocked at LAI 3.
fn full_stocking_leaf_area(cell_area: f32) -> f32 {
    3.0 * cell_area
}

/// Geometry of the simulated landscape at seed resolution.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LandscapeGeometry {
    /// World extent of the seed maps, buffer included. Both sides must be
    /// positive multiples of the seed cell size.
    pub extent: Rect,
    /// Width of the buffer around the project area in seed cells.
    pub buffer_cells: i32,
}

/// Resolved external seed input for one species.
#[derive(Clone, Debug)]
pub enum ExternalSeeds {
    /// No external seed.
    None,
    /// Uniform background seed probability over the whole map.
    Background(f32),
    /// Directional band along selected cardinal edges, with an optional
    /// background on top.
    Directional(DirectionalSeedConfig),
    /// Pre-sampled seed belt overlay (see
    /// [`SeedBelt::overlay_for`](crate::external::SeedBelt::overlay_for)).
    BeltOverlay(Grid<f32>),
}

/// Seed dispersal state of one species over one landscape.
///
/// Kernels and the LDD table depend only on static species parameters and
/// are immutable after construction; the grids are cleared and rebuilt
/// every simulated year. The struct is self-contained: concurrent
/// propagation of different species needs no shared state beyond the
/// read-only landscape geometry.
#[derive(Clone, Debug)]
pub struct SeedDispersal {
    species: String,
    traits: DispersalTraits,
    settings: DispersalSettings,
    seed_map: Grid<f32>,
    source_map: Grid<f32>,
    serotiny_map: Option<Grid<f32>>,
    kernel_seed_year: DispersalKernel,
    kernel_non_seed_year: DispersalKernel,
    kernel_serotiny: Option<DispersalKernel>,
    ldd: LddRings,
    external: ExternalSeeds,
    buffer_cells: i32,
    seed_year: bool,
    pending_serotiny: bool,
}

impl SeedDispersal {
    /// Set up dispersal for one species.
    ///
    /// Builds the seed-year, non-seed-year and (for serotinous species)
    /// serotiny kernels plus the LDD ring table, and allocates the
    /// landscape grids. All configuration errors surface here; the yearly
    /// operations cannot fail on configuration afterwards.
    pub fn new(
        species: impl Into<String>,
        traits: DispersalTraits,
        settings: DispersalSettings,
        geometry: &LandscapeGeometry,
        external: ExternalSeeds,
    ) -> Result<Self, ConfigError> {
        traits.validate()?;
        settings.validate()?;

        let seed_map: Grid<f32> = Grid::with_rect(geometry.extent, SEED_CELL_SIZE)?;
        let source_map = seed_map.clone();

        match &external {
            ExternalSeeds::Directional(cfg) => cfg.validate(geometry.buffer_cells)?,
            ExternalSeeds::BeltOverlay(overlay) => {
                if !overlay.same_geometry(&seed_map) {
                    return Err(ConfigError::MaskGeometryMismatch {
                        reason: format!(
                            "belt overlay is {}x{} @ {} m, seed map is {}x{} @ {} m",
                            overlay.cells_x(),
                            overlay.cells_y(),
                            overlay.cell_size(),
                            seed_map.cells_x(),
                            seed_map.cells_y(),
                            seed_map.cell_size()
                        ),
                    });
                }
            }
            ExternalSeeds::None | ExternalSeeds::Background(_) => {}
        }

        let ldd = LddRings::build(&traits, &settings);
        let coverage = 1.0 - ldd.covered_fraction();
        let max_seed = fecundity_per_cell(&traits, SEED_CELL_SIZE, settings.occupancy);

        let kernel_seed_year = DispersalKernel::build(
            &traits,
            &settings,
            SEED_CELL_SIZE,
            max_seed,
            coverage,
            settings.mode,
        )?;
        // The non-seed-year kernel has the same shape; only the seed yield
        // entering the probability scaling is reduced.
        let kernel_non_seed_year = DispersalKernel::build(
            &traits,
            &settings,
            SEED_CELL_SIZE,
            max_seed * traits.non_seed_year_fraction,
            coverage,
            settings.mode,
        )?;

        let (kernel_serotiny, serotiny_map) = if traits.is_serotinous() {
            // Post-fire seed rain ignores the LDD tail: full coverage.
            let kernel = DispersalKernel::build(
                &traits,
                &settings,
                SEED_CELL_SIZE,
                max_seed * traits.fecundity_serotiny,
                1.0,
                settings.mode,
            )?;
            (Some(kernel), Some(seed_map.clone()))
        } else {
            (None, None)
        };

        Ok(Self {
            species: species.into(),
            traits,
            settings,
            seed_map,
            source_map,
            serotiny_map,
            kernel_seed_year,
            kernel_non_seed_year,
            kernel_serotiny,
            ldd,
            external,
            buffer_cells: geometry.buffer_cells,
            seed_year: true,
            pending_serotiny: false,
        })
    }

    /// The species this state belongs to.
    pub fn species(&self) -> &str {
        &self.species
    }

    /// The seed density field (read-only between propagation and year end).
    pub fn seed_map(&self) -> &Grid<f32> {
        &self.seed_map
    }

    /// The seed-year kernel.
    pub fn kernel(&self) -> &DispersalKernel {
        &self.kernel_seed_year
    }

    /// The non-seed-year kernel.
    pub fn kernel_non_seed_year(&self) -> &DispersalKernel {
        &self.kernel_non_seed_year
    }

    /// The LDD ring table.
    pub fn ldd_rings(&self) -> &LddRings {
        &self.ldd
    }

    /// Register one mature tree at a light-grid cell.
    ///
    /// Called once per qualifying tree per year by the growth driver. In
    /// source mode the tree's leaf area accumulates on the source field; in
    /// probability mode the cell is marked as a saturated source.
    pub fn set_mature_tree(
        &mut self,
        light_index: (i32, i32),
        leaf_area: f64,
    ) -> Result<(), DispersalError> {
        let x = light_index.0 / LIGHT_CELLS_PER_SEED_CELL;
        let y = light_index.1 / LIGHT_CELLS_PER_SEED_CELL;
        if !self.seed_map.contains(x, y) {
            return Err(DispersalError::PositionOutOfBounds { light_index });
        }
        match self.settings.mode {
            PropagationMode::Probability => self.seed_map[(x, y)] = 1.0,
            PropagationMode::Source => self.source_map[(x, y)] += leaf_area as f32,
        }
        Ok(())
    }

    /// Register a fire-triggered seed release at a light-grid cell.
    ///
    /// Only valid for serotinous species. The cell joins the serotiny
    /// field, which is propagated with the serotiny kernel on the next
    /// [`propagate`](Self::propagate) call.
    pub fn add_serotiny_source(&mut self, light_index: (i32, i32)) -> Result<(), DispersalError> {
        let Some(serotiny) = self.serotiny_map.as_mut() else {
            return Err(DispersalError::NotSerotinous {
                species: self.species.clone(),
            });
        };
        let x = light_index.0 / LIGHT_CELLS_PER_SEED_CELL;
        let y = light_index.1 / LIGHT_CELLS_PER_SEED_CELL;
        if !serotiny.contains(x, y) {
            return Err(DispersalError::PositionOutOfBounds { light_index });
        }
        let cell_area = serotiny.cell_area();
        serotiny[(x, y)] = match self.settings.mode {
            PropagationMode::Probability => 1.0,
            PropagationMode::Source => full_stocking_leaf_area(cell_area),
        };
        self.pending_serotiny = true;
        Ok(())
    }

    /// Reset the fields for a new simulated year.
    ///
    /// Applies the external seed input: the belt overlay or the background
    /// value initialises the working field, and the directional band marks
    /// the configured perimeter as seed-available. Must be called before
    /// trees are registered for the year.
    pub fn start_year(&mut self, seed_year: bool) {
        self.seed_year = seed_year;
        self.seed_map.fill(0.0);
        self.source_map.fill(0.0);
        let mode = self.settings.mode;

        // The field external seed acts on: the source field in source mode,
        // the seed map itself in probability mode.
        match &self.external {
            ExternalSeeds::None => {}
            ExternalSeeds::Background(p) => {
                self.seed_map.fill(*p);
            }
            ExternalSeeds::BeltOverlay(overlay) => {
                let working = match mode {
                    PropagationMode::Probability => &mut self.seed_map,
                    PropagationMode::Source => &mut self.source_map,
                };
                working
                    .copy_from(overlay)
                    .expect("overlay geometry verified at setup");
            }
            ExternalSeeds::Directional(cfg) => {
                let band = self.buffer_cells - cfg.buffer_reduction;
                let working = match mode {
                    PropagationMode::Probability => &mut self.seed_map,
                    PropagationMode::Source => &mut self.source_map,
                };
                let nx = working.cells_x();
                let ny = working.cells_y();
                let band_value = match mode {
                    PropagationMode::Probability => 1.0,
                    PropagationMode::Source => full_stocking_leaf_area(working.cell_area()),
                };
                for y in 0..ny {
                    for x in 0..nx {
                        if cfg.band_contains(x, y, nx, ny, band) {
                            working[(x, y)] = band_value;
                        }
                    }
                }
                if cfg.background_probability > 0.0 {
                    for v in self.seed_map.iter_mut() {
                        if *v == 0.0 {
                            *v = cfg.background_probability;
                        }
                    }
                }
            }
        }
    }

    /// Run this year's propagation.
    ///
    /// Executes the configured strategy exactly once; a failure aborts the
    /// species' contribution for the year and must be treated as a hard
    /// stop by the driver. The caller supplies the RNG so per-species
    /// streams stay independent under concurrent scheduling.
    pub fn propagate<R: Rng>(&mut self, rng: &mut R) -> Result<(), DispersalError> {
        match self.settings.mode {
            PropagationMode::Probability => self.propagate_probability(rng),
            PropagationMode::Source => self.propagate_source(rng),
        }
        Ok(())
    }

    fn propagate_probability<R: Rng>(&mut self, rng: &mut R) {
        let year_scale = if self.seed_year {
            1.0
        } else {
            self.traits.non_seed_year_fraction
        };
        let kernel = if self.seed_year {
            &self.kernel_seed_year
        } else {
            &self.kernel_non_seed_year
        };
        let ldd_p = self.settings.effective_ldd_seedlings();

        if probability::edge_detection(&mut self.seed_map, self.settings.gap_fill_quorum) {
            probability::distribute(&mut self.seed_map, kernel, &self.ldd, ldd_p, year_scale, rng);
        }

        if self.pending_serotiny {
            if let (Some(serotiny), Some(kernel)) =
                (self.serotiny_map.as_mut(), self.kernel_serotiny.as_ref())
            {
                if probability::edge_detection(serotiny, self.settings.gap_fill_quorum) {
                    probability::distribute(serotiny, kernel, &self.ldd, ldd_p, year_scale, rng);
                }
                self.seed_map.max_merge(serotiny);
                serotiny.fill(0.0);
            }
            self.pending_serotiny = false;
        }
    }

    fn propagate_source<R: Rng>(&mut self, rng: &mut R) {
        let fecundity = if self.seed_year {
            self.traits.fecundity_m2
        } else {
            self.traits.fecundity_m2 * self.traits.non_seed_year_fraction
        };
        let torus = self.settings.torus.then_some(TorusGeometry {
            tile_cells: SEED_CELLS_PER_RESOURCE_UNIT,
            buffer_cells: self.buffer_cells,
        });
        let ldd_p = self.settings.effective_ldd_seedlings();

        source::distribute_seeds(
            &mut self.source_map,
            &mut self.seed_map,
            &self.kernel_seed_year,
            &self.ldd,
            ldd_p,
            fecundity,
            torus,
            rng,
        );

        if self.pending_serotiny {
            if let (Some(serotiny), Some(kernel)) =
                (self.serotiny_map.as_mut(), self.kernel_serotiny.as_ref())
            {
                // Post-fire seed rain: distribute the serotiny sources into
                // a scratch field at serotiny fecundity, then keep the
                // per-cell maximum of the two fields.
                let mut scratch = self.seed_map.clone();
                scratch.fill(0.0);
                source::distribute_seeds(
                    serotiny,
                    &mut scratch,
                    kernel,
                    &self.ldd,
                    ldd_p,
                    self.traits.fecundity_m2 * self.traits.fecundity_serotiny,
                    torus,
                    rng,
                );
                self.seed_map.max_merge(&scratch);
                serotiny.fill(0.0);
            }
            self.pending_serotiny = false;
        }
    }

    /// Seed availability of a seed-grid cell, in `[0, 1]`.
    ///
    /// Cells outside the landscape have no seed.
    pub fn seed_value(&self, seed_index: (i32, i32)) -> f32 {
        if self.seed_map.contains(seed_index.0, seed_index.1) {
            self.seed_map[seed_index]
        } else {
            0.0
        }
    }

    /// Seed availability at a light-grid cell (establishment queries run on
    /// the finer grid).
    pub fn seed_value_at_light(&self, light_index: (i32, i32)) -> f32 {
        self.seed_value((
            light_index.0 / LIGHT_CELLS_PER_SEED_CELL,
            light_index.1 / LIGHT_CELLS_PER_SEED_CELL,
        ))
    }

    /// Number of seed map cells currently carrying any seed.
    pub fn occupied_cells(&self) -> usize {
        self.seed_map.iter().filter(|&&v| v > 0.0).count()
    }
}
