//! Default source-mode propagation: direct kernel convolution from a
//! leaf-area-weighted source field into the seed density field.

use crate::kernel::DispersalKernel;
use crate::ldd::LddRings;
use rand::{Rng, RngExt};
use std::f64::consts::TAU;
use sylva_grid::torus::wrap_tile_axis;
use sylva_grid::Grid;

/// Leaf area index at which a source cell is considered fully stocked.
const FULL_STOCKING_LAI: f32 = 3.0;

/// Seedling count per cell above which establishment is not seed-limited.
const UNLIMITED_SEEDLING_DENSITY: f32 = 100.0;

/// Tiling parameters for torus-mode destination remapping.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TorusGeometry {
    /// Width of one resource-unit tile in seed cells.
    pub tile_cells: i32,
    /// Width of the landscape buffer in seed cells.
    pub buffer_cells: i32,
}

/// Convolve the source field with the kernel into the seed density field.
///
/// `fecundity` must already carry the non-seed-year scaling. The source
/// field is consumed in place: its leaf-area sums are first converted to a
/// stocking fraction (`LAI / 3`, saturating), then spread by the kernel and
/// the LDD rings, and the accumulated density is finally converted to an
/// establishment-probability-like value in `[0, 1]`.
///
/// With `torus` set, destination coordinates wrap within the source cell's
/// resource-unit tile instead of being dropped at the landscape boundary.
pub(crate) fn distribute_seeds<R: Rng>(
    source: &mut Grid<f32>,
    seed_map: &mut Grid<f32>,
    kernel: &DispersalKernel,
    rings: &LddRings,
    ldd_probability: f32,
    fecundity: f64,
    torus: Option<TorusGeometry>,
    rng: &mut R,
) {
    debug_assert!(source.same_geometry(seed_map));

    // Leaf area -> stocking fraction. Above an LAI of 3 the cell is treated
    // as fully stocked; below it a linear ramp applies.
    let cell_area = source.cell_area();
    for v in source.iter_mut() {
        if *v != 0.0 {
            *v = (*v / cell_area / FULL_STOCKING_LAI).min(FULL_STOCKING_LAI);
        }
    }

    let offset = kernel.offset();
    let cell_size = seed_map.cell_size() as f64;
    let ldd_value = (ldd_probability as f64 / fecundity) as f32;

    for src in 0..source.cell_count() {
        let strength = source[src];
        if strength <= 0.0 {
            continue;
        }
        let (x0, y0) = source.coords_of(src);

        for ky in 0..kernel.side() {
            for kx in 0..kernel.side() {
                let kv = kernel.value(kx, ky);
                if kv <= 0.0 {
                    continue;
                }
                let (tx, ty) = match torus {
                    None => (x0 + kx - offset, y0 + ky - offset),
                    Some(t) => (
                        wrap_tile_axis(x0, kx - offset, t.tile_cells, t.buffer_cells),
                        wrap_tile_axis(y0, ky - offset, t.tile_cells, t.buffer_cells),
                    ),
                };
                if seed_map.contains(tx, ty) {
                    seed_map[(tx, ty)] += strength * kv;
                }
            }
        }

        for ring in rings.rings() {
            let landings = if ring.expected_cells < 1.0 {
                usize::from(rng.random::<f64>() < ring.expected_cells)
            } else {
                ring.expected_cells.round() as usize
            };
            for _ in 0..landings {
                let radius = rng.random_range(ring.inner..ring.outer) / cell_size;
                let phi = rng.random::<f64>() * TAU;
                let dx = (radius * phi.cos()) as i32;
                let dy = (radius * phi.sin()) as i32;
                let (tx, ty) = match torus {
                    None => (x0 + dx, y0 + dy),
                    Some(t) => (
                        wrap_tile_axis(x0, dx, t.tile_cells, t.buffer_cells),
                        wrap_tile_axis(y0, dy, t.tile_cells, t.buffer_cells),
                    ),
                };
                if seed_map.contains(tx, ty) {
                    seed_map[(tx, ty)] += ldd_value;
                }
            }
        }
    }

    // Accumulated stocking-weighted density -> establishment probability.
    let fec = fecundity as f32;
    for v in seed_map.iter_mut() {
        if *v > 0.0 {
            *v = (*v * fec / UNLIMITED_SEEDLING_DENSITY).min(1.0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::fecundity_per_cell;
    use crate::params::{DispersalSettings, DispersalTraits, PropagationMode};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use sylva_grid::constants::{SEED_CELLS_PER_RESOURCE_UNIT, SEED_CELL_SIZE};

    fn traits() -> DispersalTraits {
        DispersalTraits {
            alpha1: 30.0,
            alpha2: 200.0,
            kappa: 0.2,
            fecundity_m2: 20.0,
            non_seed_year_fraction: 0.25,
            fecundity_serotiny: 0.0,
        }
    }

    fn kernel(coverage: f64) -> DispersalKernel {
        let t = traits();
        let s = DispersalSettings::default();
        let max_seed = fecundity_per_cell(&t, SEED_CELL_SIZE, s.occupancy);
        DispersalKernel::build(
            &t,
            &s,
            SEED_CELL_SIZE,
            max_seed,
            coverage,
            PropagationMode::Source,
        )
        .unwrap()
    }

    fn grids(side: i32) -> (Grid<f32>, Grid<f32>) {
        (
            Grid::with_dimensions(SEED_CELL_SIZE, side, side).unwrap(),
            Grid::with_dimensions(SEED_CELL_SIZE, side, side).unwrap(),
        )
    }

    // ── Source normalisation ────────────────────────────────────

    #[test]
    fn leaf_area_converts_to_saturating_stocking_fraction() {
        let (mut source, mut seed) = grids(31);
        // LAI 0.3: 120 m2 over a 400 m2 cell / 3.
        source[(15, 15)] = 120.0;
        // Far beyond full stocking.
        source[(3, 3)] = 100_000.0;
        let k = kernel(1.0);
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        distribute_seeds(
            &mut source,
            &mut seed,
            &k,
            &LddRings::default(),
            1e-4,
            traits().fecundity_m2,
            None,
            &mut rng,
        );
        assert!((source[(15, 15)] - 0.1).abs() < 1e-6);
        assert_eq!(source[(3, 3)], FULL_STOCKING_LAI);
    }

    // ── Mass conservation ───────────────────────────────────────

    #[test]
    fn single_interior_source_deposits_kernel_mass() {
        let (mut source, mut seed) = grids(41);
        source[(20, 20)] = 120.0; // stocking fraction 0.1
        let k = kernel(1.0);
        let fec = traits().fecundity_m2;
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        distribute_seeds(
            &mut source,
            &mut seed,
            &k,
            &LddRings::default(),
            1e-4,
            fec,
            None,
            &mut rng,
        );
        // All deposited mass stays below the conversion clamp, so the final
        // map is exactly (density * fec / 100) cell by cell.
        let expected = 0.1 * k.sum() * fec / 100.0;
        assert!(
            (seed.sum() - expected).abs() / expected < 1e-4,
            "sum {} vs expected {expected}",
            seed.sum()
        );
    }

    #[test]
    fn boundary_source_mass_is_dropped_outside() {
        let (mut source_c, mut seed_c) = grids(41);
        let (mut source_e, mut seed_e) = grids(41);
        source_c[(20, 20)] = 120.0;
        source_e[(0, 0)] = 120.0;
        let k = kernel(1.0);
        let fec = traits().fecundity_m2;
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        distribute_seeds(
            &mut source_c,
            &mut seed_c,
            &k,
            &LddRings::default(),
            1e-4,
            fec,
            None,
            &mut rng,
        );
        distribute_seeds(
            &mut source_e,
            &mut seed_e,
            &k,
            &LddRings::default(),
            1e-4,
            fec,
            None,
            &mut rng,
        );
        assert!(
            seed_e.sum() < seed_c.sum(),
            "a corner source loses roughly three quarters of its kernel"
        );
    }

    // ── Torus mode ──────────────────────────────────────────────

    #[test]
    fn torus_wraps_within_the_resource_unit_tile() {
        let (mut source, mut seed) = grids(SEED_CELLS_PER_RESOURCE_UNIT);
        source[(0, 0)] = 120.0;
        let k = kernel(1.0);
        let fec = traits().fecundity_m2;
        let torus = TorusGeometry {
            tile_cells: SEED_CELLS_PER_RESOURCE_UNIT,
            buffer_cells: 0,
        };
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        distribute_seeds(
            &mut source,
            &mut seed,
            &k,
            &LddRings::default(),
            1e-4,
            fec,
            Some(torus),
            &mut rng,
        );
        // Nothing leaves the tile: the full kernel mass lands on the map.
        let expected = 0.1 * k.sum() * fec / 100.0;
        assert!(
            (seed.sum() - expected).abs() / expected < 1e-3,
            "sum {} vs expected {expected}",
            seed.sum()
        );
    }

    #[test]
    fn torus_pattern_is_invariant_under_tile_translation() {
        let tile = SEED_CELLS_PER_RESOURCE_UNIT;
        let side = 3 * tile;
        let torus = TorusGeometry {
            tile_cells: tile,
            buffer_cells: 0,
        };
        let k = kernel(1.0);
        let fec = traits().fecundity_m2;

        let run = |sx: i32, sy: i32| {
            let (mut source, mut seed) = grids(side);
            source[(sx, sy)] = 120.0;
            let mut rng = ChaCha8Rng::seed_from_u64(0);
            distribute_seeds(
                &mut source,
                &mut seed,
                &k,
                &LddRings::default(),
                1e-4,
                fec,
                Some(torus),
                &mut rng,
            );
            seed
        };

        let origin = run(0, 0);
        let shifted = run(tile, tile);
        for y in 0..tile {
            for x in 0..tile {
                assert_eq!(
                    origin[(x, y)],
                    shifted[(x + tile, y + tile)],
                    "tile pattern must repeat at ({x}, {y})"
                );
            }
        }
    }

    // ── Seed-year scaling ───────────────────────────────────────

    #[test]
    fn non_seed_year_output_is_exactly_scaled() {
        let t = traits();
        let k = kernel(1.0);
        let q = t.non_seed_year_fraction;

        let run = |fec: f64| {
            let (mut source, mut seed) = grids(41);
            source[(20, 20)] = 120.0;
            let mut rng = ChaCha8Rng::seed_from_u64(0);
            distribute_seeds(
                &mut source,
                &mut seed,
                &k,
                &LddRings::default(),
                1e-4,
                fec,
                None,
                &mut rng,
            );
            seed
        };

        let seed_year = run(t.fecundity_m2);
        let off_year = run(t.fecundity_m2 * q);
        for i in 0..seed_year.cell_count() {
            let expected = seed_year[i] * q as f32;
            assert!(
                (off_year[i] - expected).abs() <= 1e-6,
                "cell {i}: {} vs {expected}",
                off_year[i]
            );
        }
    }

    // ── LDD ─────────────────────────────────────────────────────

    #[test]
    fn disabled_ldd_never_samples() {
        let (mut source, mut seed) = grids(41);
        source[(20, 20)] = 120.0;
        let k = kernel(1.0);
        let fec = traits().fecundity_m2;
        let mut rng_a = ChaCha8Rng::seed_from_u64(5);
        let mut rng_b = ChaCha8Rng::seed_from_u64(5);
        distribute_seeds(
            &mut source,
            &mut seed,
            &k,
            &LddRings::default(),
            1e-4,
            fec,
            None,
            &mut rng_a,
        );
        // The generator was never advanced.
        assert_eq!(rng_a.random::<u64>(), rng_b.random::<u64>());
    }

    #[test]
    fn ldd_adds_fixed_density_per_landing() {
        let t = traits();
        let s = DispersalSettings {
            threshold_ldd: 1e-6,
            ..DispersalSettings::default()
        };
        let rings = LddRings::build(&t, &s);
        assert!(rings.is_enabled());

        let (mut source, mut seed) = grids(61);
        source[(30, 30)] = 120.0;
        let k = kernel(1.0 - rings.covered_fraction());
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        distribute_seeds(
            &mut source,
            &mut seed,
            &k,
            &rings,
            s.effective_ldd_seedlings(),
            t.fecundity_m2,
            None,
            &mut rng,
        );
        // Cells beyond the kernel footprint received landings.
        let beyond = (0..seed.cell_count())
            .filter(|&i| {
                let (x, y) = seed.coords_of(i);
                (x - 30).abs().max((y - 30).abs()) > k.offset()
            })
            .filter(|&i| seed[i] > 0.0)
            .count();
        assert!(beyond > 0, "expected LDD landings outside the kernel");
    }
}
