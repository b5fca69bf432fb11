//! External seed input: background influx from outside the simulated area.
//!
//! Two mutually exclusive strategies. The *directional* model marks a
//! fixed-width band along selected cardinal edges of the map as
//! seed-available at the start of every year. The *seed belt* model is
//! computed once per landscape: cells outside the project area but within a
//! configured width of it form the belt, and a coarse sector partition
//! assigns each species a per-sector seeding fraction used to flag belt
//! cells stochastically.

use crate::error::ConfigError;
use crate::params::PropagationMode;
use indexmap::IndexMap;
use rand::{Rng, RngExt};
use sylva_grid::Grid;

/// Classification of one seed-resolution cell of the landscape mask.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CellCoverage {
    /// Inside the simulated project area.
    Inside,
    /// Outside the project area but forested, a potential seed source.
    OutsideForested,
    /// Outside the project area and unstocked.
    #[default]
    OutsideUnstocked,
}

/// Bitmask of cardinal edges contributing directional external seed.
///
/// An empty mask means all four edges contribute.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CardinalMask(u8);

impl CardinalMask {
    /// The northern (top) edge.
    pub const NORTH: CardinalMask = CardinalMask(1);
    /// The eastern (right) edge.
    pub const EAST: CardinalMask = CardinalMask(2);
    /// The southern (bottom) edge.
    pub const SOUTH: CardinalMask = CardinalMask(4);
    /// The western (left) edge.
    pub const WEST: CardinalMask = CardinalMask(8);

    /// No edges selected (interpreted as: all edges contribute).
    pub const fn empty() -> Self {
        CardinalMask(0)
    }

    /// Whether no edge is selected.
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Whether all edges in `other` are selected.
    pub fn contains(self, other: CardinalMask) -> bool {
        self.0 & other.0 == other.0
    }
}

impl std::ops::BitOr for CardinalMask {
    type Output = CardinalMask;

    fn bitor(self, rhs: CardinalMask) -> CardinalMask {
        CardinalMask(self.0 | rhs.0)
    }
}

/// Configuration of the directional external seed model for one species.
#[derive(Clone, Debug, PartialEq)]
pub struct DirectionalSeedConfig {
    /// Edges contributing seed; empty means all edges.
    pub directions: CardinalMask,
    /// Cells subtracted from the landscape buffer width for this species.
    pub buffer_reduction: i32,
    /// Uniform background seed probability for the whole area; 0 disables.
    pub background_probability: f32,
}

impl DirectionalSeedConfig {
    /// Validate against the landscape buffer width (in seed cells).
    ///
    /// A band that vanishes after the species reduction would silently
    /// disable external seed, so it is rejected at setup.
    pub fn validate(&self, landscape_buffer_cells: i32) -> Result<(), ConfigError> {
        let effective = landscape_buffer_cells - self.buffer_reduction;
        if effective <= 0 {
            return Err(ConfigError::InvalidSeedBuffer {
                effective_cells: effective,
            });
        }
        Ok(())
    }

    /// Whether `(x, y)` lies in the contributing band of a `nx` x `ny` map
    /// with the given effective band width.
    pub(crate) fn band_contains(&self, x: i32, y: i32, nx: i32, ny: i32, band: i32) -> bool {
        let in_band = x < band || x >= nx - band || y < band || y >= ny - band;
        if !in_band {
            return false;
        }
        if self.directions.is_empty() {
            return true;
        }
        (self.directions.contains(CardinalMask::NORTH) && y >= ny - band)
            || (self.directions.contains(CardinalMask::SOUTH) && y < band)
            || (self.directions.contains(CardinalMask::EAST) && x >= nx - band)
            || (self.directions.contains(CardinalMask::WEST) && x < band)
    }
}

/// Configuration of the sector-based seed belt.
#[derive(Clone, Debug)]
pub struct SeedBeltConfig {
    /// Belt width in seed cells.
    pub width: i32,
    /// Number of sectors along x.
    pub sectors_x: i32,
    /// Number of sectors along y.
    pub sectors_y: i32,
    /// Per-species, per-sector seeding fractions in row-major sector order.
    pub fractions: IndexMap<String, Vec<f64>>,
}

/// Internal belt cell state after the directional sweeps.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
enum BeltCell {
    /// Inside the project area.
    Inside,
    /// Outside, forested, but too far from the project area.
    Outside,
    /// Outside, forested, and within the belt width of the project area.
    Belt,
    /// Nothing there.
    #[default]
    Empty,
}

/// The once-per-landscape seed belt overlay builder.
///
/// Holds the swept base map and the sector table; per-species overlays are
/// sampled from it with [`SeedBelt::overlay_for`].
#[derive(Clone, Debug)]
pub struct SeedBelt {
    base: Grid<BeltCell>,
    sectors_x: i32,
    sectors_y: i32,
    fractions: IndexMap<String, Vec<f64>>,
}

impl SeedBelt {
    /// Build the belt from the landscape coverage mask.
    ///
    /// The mask must be sampled at the seed map resolution and share its
    /// geometry; each `OutsideForested` cell within `width` cells of an
    /// `Inside` cell along a cardinal direction becomes part of the belt.
    pub fn new(mask: &Grid<CellCoverage>, config: SeedBeltConfig) -> Result<Self, ConfigError> {
        if config.sectors_x < 1 || config.sectors_y < 1 {
            return Err(ConfigError::InvalidSectorGrid {
                sectors_x: config.sectors_x,
                sectors_y: config.sectors_y,
            });
        }
        if config.width < 1 {
            return Err(ConfigError::InvalidSeedBuffer {
                effective_cells: config.width,
            });
        }
        let sector_count = (config.sectors_x * config.sectors_y) as usize;
        for (species, table) in &config.fractions {
            if table.len() != sector_count {
                return Err(ConfigError::SectorTableMismatch {
                    species: species.clone(),
                    got: table.len(),
                    expected: sector_count,
                });
            }
        }

        let mut base: Grid<BeltCell> =
            Grid::with_dimensions(mask.cell_size(), mask.cells_x(), mask.cells_y())?;
        for i in 0..mask.cell_count() {
            base[i] = match mask[i] {
                CellCoverage::Inside => BeltCell::Inside,
                CellCoverage::OutsideForested => BeltCell::Outside,
                CellCoverage::OutsideUnstocked => BeltCell::Empty,
            };
        }
        Self::sweep(&mut base, config.width);

        Ok(Self {
            base,
            sectors_x: config.sectors_x,
            sectors_y: config.sectors_y,
            fractions: config.fractions,
        })
    }

    /// Four directional passes (west→east, east→west, north→south,
    /// south→north) promoting `Outside` cells within `width` cells of an
    /// `Inside` cell to `Belt`.
    fn sweep(base: &mut Grid<BeltCell>, width: i32) {
        let nx = base.cells_x();
        let ny = base.cells_y();
        for y in 0..ny {
            Self::sweep_line(base, width, (0..nx).map(|x| (x, y)));
            Self::sweep_line(base, width, (0..nx).rev().map(|x| (x, y)));
        }
        for x in 0..nx {
            Self::sweep_line(base, width, (0..ny).map(|y| (x, y)));
            Self::sweep_line(base, width, (0..ny).rev().map(|y| (x, y)));
        }
    }

    /// One directional scan along a row or column, tracking the distance to
    /// the last `Inside` cell seen.
    fn sweep_line(
        base: &mut Grid<BeltCell>,
        width: i32,
        line: impl Iterator<Item = (i32, i32)>,
    ) {
        let mut distance = i32::MAX;
        for (x, y) in line {
            match base[(x, y)] {
                BeltCell::Inside => distance = 0,
                BeltCell::Outside | BeltCell::Belt if distance < width => {
                    base[(x, y)] = BeltCell::Belt;
                    distance = distance.saturating_add(1);
                }
                _ => distance = distance.saturating_add(1),
            }
        }
    }

    /// Whether any sector table mentions `species`.
    pub fn has_species(&self, species: &str) -> bool {
        self.fractions.contains_key(species)
    }

    /// Sample the per-species overlay.
    ///
    /// Belt cells are flagged with the sector's seeding fraction as the
    /// per-cell probability. In source mode the flags are scaled to the
    /// leaf-area equivalent of a fully stocked cell (LAI 3), matching the
    /// units of the source field they initialise.
    ///
    /// Returns `None` when the species has no entry in the sector tables.
    pub fn overlay_for<R: Rng>(
        &self,
        species: &str,
        mode: PropagationMode,
        rng: &mut R,
    ) -> Option<Grid<f32>> {
        let table = self.fractions.get(species)?;
        let mut overlay: Grid<f32> =
            Grid::with_dimensions(self.base.cell_size(), self.base.cells_x(), self.base.cells_y())
                .expect("belt base grid geometry is valid");

        let cells_per_sector_x = (self.base.cells_x() / self.sectors_x).max(1);
        let cells_per_sector_y = (self.base.cells_y() / self.sectors_y).max(1);
        for i in 0..self.base.cell_count() {
            if self.base[i] != BeltCell::Belt {
                continue;
            }
            let (x, y) = self.base.coords_of(i);
            let sector_x = (x / cells_per_sector_x).min(self.sectors_x - 1);
            let sector_y = (y / cells_per_sector_y).min(self.sectors_y - 1);
            let p = table[(sector_y * self.sectors_x + sector_x) as usize];
            if rng.random::<f64>() < p {
                overlay[i] = 1.0;
            }
        }

        if mode == PropagationMode::Source {
            overlay.scale(3.0 * overlay.cell_area());
        }
        Some(overlay)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use sylva_grid::constants::SEED_CELL_SIZE;

    /// 20x20 mask: project area in the east half, forested buffer west of it.
    fn mask() -> Grid<CellCoverage> {
        let mut m: Grid<CellCoverage> = Grid::with_dimensions(SEED_CELL_SIZE, 20, 20).unwrap();
        for y in 0..20 {
            for x in 0..20 {
                m[(x, y)] = if x >= 10 {
                    CellCoverage::Inside
                } else {
                    CellCoverage::OutsideForested
                };
            }
        }
        m
    }

    fn config(width: i32) -> SeedBeltConfig {
        let mut fractions = IndexMap::new();
        fractions.insert("piab".to_string(), vec![1.0; 4]);
        fractions.insert("fasy".to_string(), vec![0.0; 4]);
        SeedBeltConfig {
            width,
            sectors_x: 2,
            sectors_y: 2,
            fractions,
        }
    }

    // ── CardinalMask ────────────────────────────────────────────

    #[test]
    fn empty_mask_means_all_edges() {
        let cfg = DirectionalSeedConfig {
            directions: CardinalMask::empty(),
            buffer_reduction: 0,
            background_probability: 0.0,
        };
        assert!(cfg.band_contains(0, 10, 20, 20, 2));
        assert!(cfg.band_contains(19, 10, 20, 20, 2));
        assert!(cfg.band_contains(10, 0, 20, 20, 2));
        assert!(!cfg.band_contains(10, 10, 20, 20, 2));
    }

    #[test]
    fn directional_mask_selects_matching_edges_only() {
        let cfg = DirectionalSeedConfig {
            directions: CardinalMask::NORTH | CardinalMask::WEST,
            buffer_reduction: 0,
            background_probability: 0.0,
        };
        assert!(cfg.band_contains(10, 19, 20, 20, 2), "north band");
        assert!(cfg.band_contains(0, 10, 20, 20, 2), "west band");
        assert!(!cfg.band_contains(10, 0, 20, 20, 2), "south not selected");
        assert!(!cfg.band_contains(19, 10, 20, 20, 2), "east not selected");
    }

    #[test]
    fn buffer_reduction_must_leave_a_band() {
        let cfg = DirectionalSeedConfig {
            directions: CardinalMask::empty(),
            buffer_reduction: 5,
            background_probability: 0.0,
        };
        assert!(cfg.validate(6).is_ok());
        assert!(matches!(
            cfg.validate(5),
            Err(ConfigError::InvalidSeedBuffer { effective_cells: 0 })
        ));
    }

    // ── Seed belt construction ──────────────────────────────────

    #[test]
    fn belt_marks_cells_within_width_of_project_area() {
        let belt = SeedBelt::new(&mask(), config(3)).unwrap();
        for y in 0..20 {
            for x in 7..10 {
                assert_eq!(belt.base[(x, y)], BeltCell::Belt, "({x}, {y})");
            }
            assert_eq!(belt.base[(6, y)], BeltCell::Outside);
            assert_eq!(belt.base[(12, y)], BeltCell::Inside);
        }
    }

    #[test]
    fn unstocked_cells_never_join_the_belt() {
        let mut m = mask();
        m[(9, 5)] = CellCoverage::OutsideUnstocked;
        let belt = SeedBelt::new(&m, config(3)).unwrap();
        assert_eq!(belt.base[(9, 5)], BeltCell::Empty);
    }

    #[test]
    fn rejects_invalid_sector_grid_and_tables() {
        let mut cfg = config(3);
        cfg.sectors_x = 0;
        assert!(matches!(
            SeedBelt::new(&mask(), cfg),
            Err(ConfigError::InvalidSectorGrid { .. })
        ));

        let mut cfg = config(3);
        cfg.fractions.insert("abal".to_string(), vec![0.5; 3]);
        assert!(matches!(
            SeedBelt::new(&mask(), cfg),
            Err(ConfigError::SectorTableMismatch { .. })
        ));
    }

    // ── Overlay sampling ────────────────────────────────────────

    #[test]
    fn full_fraction_flags_every_belt_cell() {
        let belt = SeedBelt::new(&mask(), config(3)).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let overlay = belt
            .overlay_for("piab", PropagationMode::Probability, &mut rng)
            .unwrap();
        for y in 0..20 {
            for x in 7..10 {
                assert_eq!(overlay[(x, y)], 1.0);
            }
            assert_eq!(overlay[(6, y)], 0.0);
            assert_eq!(overlay[(12, y)], 0.0);
        }
    }

    #[test]
    fn zero_fraction_flags_nothing() {
        let belt = SeedBelt::new(&mask(), config(3)).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let overlay = belt
            .overlay_for("fasy", PropagationMode::Probability, &mut rng)
            .unwrap();
        assert!(overlay.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn source_mode_overlay_is_scaled_to_full_stocking() {
        let belt = SeedBelt::new(&mask(), config(3)).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let overlay = belt
            .overlay_for("piab", PropagationMode::Source, &mut rng)
            .unwrap();
        let expected = 3.0 * SEED_CELL_SIZE * SEED_CELL_SIZE;
        assert_eq!(overlay[(8, 8)], expected);
    }

    #[test]
    fn unknown_species_has_no_overlay() {
        let belt = SeedBelt::new(&mask(), config(3)).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        assert!(belt
            .overlay_for("lade", PropagationMode::Source, &mut rng)
            .is_none());
    }
}
