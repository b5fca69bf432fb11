//! Construction of the discretised seed dispersal kernel.
//!
//! The analytic kernel is the two-part exponential mixture of Lischke &
//! Löffler (2006), evaluated as a 2-D point density and sampled onto a
//! small square grid at the seed map resolution. The kernel is truncated
//! where the density drops below the configured coverage threshold; the
//! probability mass beyond the truncation radius is handled separately by
//! the LDD ring table.

use crate::error::ConfigError;
use crate::params::{DispersalSettings, DispersalTraits, PropagationMode};
use std::f64::consts::PI;
use sylva_grid::constants::LIGHT_CELL_SIZE;
use sylva_grid::Grid;

/// Outward search step when inverting the density function, metres.
const SEARCH_STEP: f64 = 10.0;

/// Hard cap on the truncation search, metres.
const SEARCH_LIMIT: f64 = 10_000.0;

/// Number of sub-rings used to integrate the singular centre cell.
const CENTER_RINGS: usize = 100;

/// Seed density at a point at `distance` metres from a point source.
///
/// The radial two-part exponential integrates to 1 over distance; dividing
/// by the circumference at `distance` converts it to a per-point density in
/// the plane. The distance is floored at 1 cm to keep the centre finite.
pub(crate) fn point_density(traits: &DispersalTraits, distance: f64) -> f64 {
    let p1 = (1.0 - traits.kappa) * (-distance / traits.alpha1).exp() / traits.alpha1;
    let p2 = if traits.alpha2 > 0.0 {
        traits.kappa * (-distance / traits.alpha2).exp() / traits.alpha2
    } else {
        0.0
    };
    (p1 + p2) / (2.0 * PI * distance.max(0.01))
}

/// Distance at which the point density falls below `threshold`.
///
/// Searched outwards in fixed steps; the cap bounds kernel size for
/// parameter sets with very heavy tails.
pub(crate) fn distance_for_density(traits: &DispersalTraits, threshold: f64) -> f64 {
    let mut distance = 0.0;
    while point_density(traits, distance) > threshold && distance < SEARCH_LIMIT {
        distance += SEARCH_STEP;
    }
    distance
}

/// Integrated density over a disc of `radius` metres around the source.
///
/// The density is singular at distance zero, so the centre cell is
/// integrated over concentric sub-rings instead of being point-sampled.
fn center_cell_value(traits: &DispersalTraits, radius: f64) -> f64 {
    let mut sum = 0.0;
    for i in 0..CENTER_RINGS {
        let r_in = i as f64 * radius / CENTER_RINGS as f64;
        let r_out = (i + 1) as f64 * radius / CENTER_RINGS as f64;
        let ring_area = (r_out * r_out - r_in * r_in) * PI;
        sum += point_density(traits, (r_in + r_out) / 2.0) * ring_area;
    }
    sum
}

/// Expected seed yield of a fully stocked source cell, seeds per year.
pub fn fecundity_per_cell(traits: &DispersalTraits, cell_size: f32, occupancy: f64) -> f64 {
    traits.fecundity_m2 * (cell_size as f64) * (cell_size as f64) * occupancy
}

/// A species-specific discretised dispersal kernel.
///
/// Square grid of side `2R + 1` seed cells whose centre corresponds to the
/// source cell. Built once per species at setup and immutable afterwards;
/// the propagation strategies hold references, never copies.
#[derive(Clone, Debug)]
pub struct DispersalKernel {
    grid: Grid<f32>,
    offset: i32,
}

impl DispersalKernel {
    /// Build a kernel for one species.
    ///
    /// `max_seed_per_cell` is the seed yield of a fully stocked source cell
    /// (already scaled for non-seed years or serotiny where applicable);
    /// it only enters in probability mode, where kernel cells directly
    /// encode the probability of adequate seed supply. `coverage` is the
    /// probability mass the truncated kernel must integrate to: 1 minus
    /// the share reserved for the LDD rings.
    pub fn build(
        traits: &DispersalTraits,
        settings: &DispersalSettings,
        cell_size: f32,
        max_seed_per_cell: f64,
        coverage: f64,
        mode: PropagationMode,
    ) -> Result<Self, ConfigError> {
        let max_dist = distance_for_density(traits, settings.threshold_area / traits.fecundity_m2);
        let max_radius = (max_dist / cell_size as f64) as i32;
        let side = 2 * max_radius + 1;
        let mut grid: Grid<f32> = Grid::with_dimensions(cell_size, side, side)?;

        let cell_area = grid.cell_area() as f64;
        // Radius of the circle with the same area as one cell.
        let r_cell = (cell_area / PI).sqrt();
        let offset = max_radius;

        for index in 0..grid.cell_count() {
            let (x, y) = grid.coords_of(index);
            let d = grid.center_distance((x, y), (offset, offset)) as f64;
            grid[index] = if d == 0.0 {
                center_cell_value(traits, r_cell) as f32
            } else if d <= max_dist {
                // Trapezoid across the cell: average of the density at the
                // near and far edge, times the cell area.
                ((point_density(traits, d + r_cell) + point_density(traits, d - r_cell)) / 2.0
                    * cell_area) as f32
            } else {
                0.0
            };
        }

        let sum = grid.sum();
        if sum == 0.0 {
            return Err(ConfigError::DegenerateKernel);
        }
        grid.scale((coverage / sum) as f32);

        if mode == PropagationMode::Probability {
            // Probabilities: multiply by the cell's seed yield, divide by the
            // number of light-resolution regeneration pixels that must be
            // occupied, and saturate. Cells receiving more seed than the
            // occupancy criterion are not seed-limited.
            let occupation =
                cell_area / ((LIGHT_CELL_SIZE as f64) * (LIGHT_CELL_SIZE as f64) * settings.occupancy);
            grid.scale((max_seed_per_cell / occupation) as f32);
            for v in grid.iter_mut() {
                *v = v.min(1.0);
            }
        }

        Ok(Self { grid, offset })
    }

    /// Index of the centre cell along either axis.
    pub fn offset(&self) -> i32 {
        self.offset
    }

    /// Kernel side length in cells (`2R + 1`).
    pub fn side(&self) -> i32 {
        self.grid.cells_x()
    }

    /// Kernel value at kernel-grid cell `(kx, ky)`.
    pub fn value(&self, kx: i32, ky: i32) -> f32 {
        self.grid[(kx, ky)]
    }

    /// Sum over all kernel cells.
    pub fn sum(&self) -> f64 {
        self.grid.sum()
    }

    /// The underlying kernel grid (diagnostic dumps).
    pub fn grid(&self) -> &Grid<f32> {
        &self.grid
    }
}
