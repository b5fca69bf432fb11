//! Fixed landscape resolutions shared across the model.

/// Side length of a seed/regeneration grid cell in metres.
pub const SEED_CELL_SIZE: f32 = 20.0;

/// Side length of a light-influence grid cell in metres.
///
/// The light grid is owned by the growth subsystem; dispersal only needs
/// the ratio between the two resolutions (see [`LIGHT_CELLS_PER_SEED_CELL`]).
pub const LIGHT_CELL_SIZE: f32 = 2.0;

/// Side length of a resource unit (the 1 ha management tile) in metres.
pub const RESOURCE_UNIT_SIZE: f32 = 100.0;

/// Number of light cells along one side of a seed cell.
pub const LIGHT_CELLS_PER_SEED_CELL: i32 = (SEED_CELL_SIZE / LIGHT_CELL_SIZE) as i32;

/// Number of seed cells along one side of a resource unit.
pub const SEED_CELLS_PER_RESOURCE_UNIT: i32 = (RESOURCE_UNIT_SIZE / SEED_CELL_SIZE) as i32;
