//! The yearly multi-species dispersal driver.

use crate::error::EngineError;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use sylva_dispersal::SeedDispersal;

/// Per-species summary of one propagated year.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SpeciesStats {
    /// Species the numbers belong to.
    pub species: String,
    /// Seed map cells carrying any seed after propagation.
    pub occupied_cells: usize,
}

/// Summary of one propagated year across all species.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct YearStats {
    /// The simulated year.
    pub year: u32,
    /// Per-species numbers, in registration order.
    pub species: Vec<SpeciesStats>,
}

/// Drives one year of seed dispersal for all active species.
///
/// Owns every species' [`SeedDispersal`] state. The yearly protocol:
///
/// 1. [`begin_year`](Self::begin_year) resets and reseeds all fields;
/// 2. the growth driver registers mature trees and serotiny events through
///    [`species_mut`](Self::species_mut);
/// 3. [`propagate_year`](Self::propagate_year) runs one propagation task
///    per species on a scoped worker pool and waits for all of them; this
///    is the barrier after which all seed fields are stable and downstream
///    establishment may read them.
///
/// Species never share mutable state, so the per-species tasks need no
/// locking. Each task draws from its own ChaCha8 stream derived from the
/// master seed, the species index and the year; results are therefore
/// reproducible under a fixed master seed regardless of how the tasks are
/// scheduled.
#[derive(Debug)]
pub struct DispersalEngine {
    species: Vec<SeedDispersal>,
    master_seed: u64,
    year: u32,
    year_started: bool,
}

impl DispersalEngine {
    /// Create an empty engine with the given master seed.
    pub fn new(master_seed: u64) -> Self {
        Self {
            species: Vec::new(),
            master_seed,
            year: 0,
            year_started: false,
        }
    }

    /// Register one species' dispersal state.
    pub fn add_species(&mut self, dispersal: SeedDispersal) {
        self.species.push(dispersal);
    }

    /// All registered species, in registration order.
    pub fn species(&self) -> &[SeedDispersal] {
        &self.species
    }

    /// Mutable access to one species' state, for tree registration.
    pub fn species_mut(&mut self, name: &str) -> Option<&mut SeedDispersal> {
        self.species.iter_mut().find(|s| s.species() == name)
    }

    /// Start simulated year `year`.
    ///
    /// `seed_years` holds one flag per registered species, in registration
    /// order; masting is a species-level event decided by the climate
    /// driver, not by this crate.
    pub fn begin_year(&mut self, year: u32, seed_years: &[bool]) -> Result<(), EngineError> {
        if seed_years.len() != self.species.len() {
            return Err(EngineError::SeedYearMismatch {
                expected: self.species.len(),
                got: seed_years.len(),
            });
        }
        for (dispersal, &seed_year) in self.species.iter_mut().zip(seed_years) {
            dispersal.start_year(seed_year);
        }
        self.year = year;
        self.year_started = true;
        Ok(())
    }

    /// Propagate all species for the started year.
    ///
    /// One task per species; the scope join is the completion barrier. Any
    /// failing species aborts the whole year; partial results are never
    /// exposed. Cancellation mid-year is not supported.
    pub fn propagate_year(&mut self) -> Result<YearStats, EngineError> {
        if !self.year_started {
            return Err(EngineError::YearNotStarted);
        }
        self.year_started = false;

        let year = self.year;
        let master_seed = self.master_seed;
        let count = self.species.len();
        let (sender, receiver) = crossbeam_channel::bounded(count);

        std::thread::scope(|scope| {
            for (index, dispersal) in self.species.iter_mut().enumerate() {
                let sender = sender.clone();
                let seed = stream_seed(master_seed, index, year);
                scope.spawn(move || {
                    let mut rng = ChaCha8Rng::seed_from_u64(seed);
                    let result = dispersal
                        .propagate(&mut rng)
                        .map(|()| dispersal.occupied_cells());
                    let species = dispersal.species().to_string();
                    // The receiver outlives the scope; send cannot fail.
                    let _ = sender.send((index, species, result));
                });
            }
        });
        drop(sender);

        let mut outcomes: Vec<_> = receiver.iter().collect();
        outcomes.sort_by_key(|(index, _, _)| *index);

        let mut stats = Vec::with_capacity(count);
        for (_, species, result) in outcomes {
            match result {
                Ok(occupied_cells) => stats.push(SpeciesStats {
                    species,
                    occupied_cells,
                }),
                Err(reason) => return Err(EngineError::SpeciesFailed { species, reason }),
            }
        }

        Ok(YearStats {
            year,
            species: stats,
        })
    }
}

/// Deterministic per-task RNG seed.
///
/// Mixes the species index through a splitmix-style multiplier so adjacent
/// indices land on unrelated streams, and keeps the year in the high bits.
fn stream_seed(master_seed: u64, species_index: usize, year: u32) -> u64 {
    master_seed
        ^ (species_index as u64 + 1).wrapping_mul(0x9E37_79B9_7F4A_7C15)
        ^ ((year as u64) << 32)
}
