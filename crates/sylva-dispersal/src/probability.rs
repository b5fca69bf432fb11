//! Legacy probability-mode propagation.
//!
//! The seed map holds, per cell, one of three states: `1.0` (saturated seed
//! source), a value in `[0, 1)` (partial probability of adequate seed
//! supply), or `-1.0` (transient edge marker, never persisted between
//! years). Propagation runs in two passes: edge detection over the whole
//! map, then kernel application from every edge cell.

use crate::kernel::DispersalKernel;
use crate::ldd::LddRings;
use rand::{Rng, RngExt};
use std::f64::consts::TAU;
use sylva_grid::Grid;

/// Offsets of the 8-neighbourhood, row below, same row, row above.
const NEIGHBOURS_8: [(i32, i32); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// Pass 1: close single-cell gaps, then mark saturated cells bordering
/// non-saturated area as edges (`-1.0`).
///
/// Returns whether any saturated interior cell exists at all; when it does
/// not, the year has no seed source and pass 2 is skipped entirely.
///
/// Only interior cells are inspected; a saturated cell on the outermost
/// row or column has no complete neighbourhood and never becomes an edge.
pub(crate) fn edge_detection(map: &mut Grid<f32>, gap_fill_quorum: u32) -> bool {
    let dx = map.cells_x();
    let dy = map.cells_y();
    let mut found = false;

    // Gap fill: a lone hole inside closed canopy would otherwise produce a
    // ring of false edges around it.
    for y in 1..dy - 1 {
        for x in 1..dx - 1 {
            if map[(x, y)] < 0.999 {
                let saturated = NEIGHBOURS_8
                    .iter()
                    .filter(|&&(ox, oy)| map[(x + ox, y + oy)] == 1.0)
                    .count() as u32;
                if saturated > gap_fill_quorum {
                    map[(x, y)] = 0.999;
                }
            }
        }
    }

    for y in 1..dy - 1 {
        for x in 1..dx - 1 {
            if map[(x, y)] == 1.0 {
                found = true;
                let at_edge = NEIGHBOURS_8.iter().any(|&(ox, oy)| {
                    let v = map[(x + ox, y + oy)];
                    (0.0..0.999).contains(&v)
                });
                if at_edge {
                    map[(x, y)] = -1.0;
                }
            }
        }
    }
    found
}

/// Pass 2: apply the kernel and the LDD rings from every edge cell.
///
/// Probabilities from independent sources combine as
/// `v ← 1 − (1−v)(1−k)`; cells currently marked as edges are skipped and
/// each processed edge cell is reset to `1.0`. `year_scale` scales the
/// expected LDD landing counts (1 in seed years, the species'
/// non-seed-year fraction otherwise).
///
/// Returns the number of edge cells processed.
pub(crate) fn distribute<R: Rng>(
    map: &mut Grid<f32>,
    kernel: &DispersalKernel,
    rings: &LddRings,
    ldd_probability: f32,
    year_scale: f64,
    rng: &mut R,
) -> usize {
    let offset = kernel.offset();
    let cell_size = map.cell_size() as f64;
    let mut processed = 0;

    for index in 0..map.cell_count() {
        if map[index] != -1.0 {
            continue;
        }
        processed += 1;
        let (x0, y0) = map.coords_of(index);

        for ky in 0..kernel.side() {
            for kx in 0..kernel.side() {
                let kv = kernel.value(kx, ky);
                if kv <= 0.0 {
                    continue;
                }
                let tx = x0 + kx - offset;
                let ty = y0 + ky - offset;
                if !map.contains(tx, ty) {
                    continue;
                }
                let v = map[(tx, ty)];
                if v != -1.0 {
                    map[(tx, ty)] = (1.0 - (1.0 - v) * (1.0 - kv)).min(1.0);
                }
            }
        }

        for ring in rings.rings() {
            let landings = (ring.expected_cells * year_scale).round() as i64;
            for _ in 0..landings {
                let radius = rng.random_range(ring.inner..ring.outer) / cell_size;
                let phi = rng.random::<f64>() * TAU;
                let tx = x0 + (radius * phi.cos()) as i32;
                let ty = y0 + (radius * phi.sin()) as i32;
                if !map.contains(tx, ty) {
                    continue;
                }
                let v = map[(tx, ty)];
                if v != -1.0 {
                    map[(tx, ty)] = (1.0 - (1.0 - v) * (1.0 - ldd_probability)).min(1.0);
                }
            }
        }

        map[index] = 1.0; // processed
    }
    processed
}
