//! Diagnostic text dumps of kernels and seed maps.
//!
//! Not part of the functional contract; the tables exist for offline
//! inspection of kernel shapes and propagation results.

use crate::dispersal::SeedDispersal;
use std::io::{self, Write};
use sylva_grid::Grid;

/// Write a grid as a tab-separated table, northernmost row first, so the
/// text reads like a map.
pub fn write_grid_table<W: Write>(out: &mut W, grid: &Grid<f32>) -> io::Result<()> {
    for y in (0..grid.cells_y()).rev() {
        for x in 0..grid.cells_x() {
            if x > 0 {
                write!(out, "\t")?;
            }
            write!(out, "{}", grid[(x, y)])?;
        }
        writeln!(out)?;
    }
    Ok(())
}

impl SeedDispersal {
    /// Dump the species' kernels as labelled tables.
    pub fn dump_kernels<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "# kernel seed year {}", self.species())?;
        write_grid_table(out, self.kernel().grid())?;
        writeln!(out, "# kernel non-seed year {}", self.species())?;
        write_grid_table(out, self.kernel_non_seed_year().grid())?;
        Ok(())
    }

    /// Dump the current seed density field as a table.
    pub fn dump_seed_map<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "# seed map {}", self.species())?;
        write_grid_table(out, self.seed_map())
    }
}
