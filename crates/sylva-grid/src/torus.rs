//! Toroidal index remapping for simulations with glued edges.
//!
//! In torus mode the landscape is a tiling of resource units; seed that
//! would leave a tile re-enters it from the opposite side instead of being
//! dropped at the landscape boundary. The remapping is a pure function of
//! the axis index, the displacement, the tile width and the buffer offset,
//! so it lives here rather than in any grid method.

/// Remap `index + delta` along one axis so it stays inside the tile
/// containing `index`.
///
/// `index` is a cell index on the full map (buffer included); the world
/// area starts at `buffer_cells` and is tiled into stripes of `tile_cells`.
/// The returned index lies in the same stripe as `index`, with `delta`
/// wrapped around the stripe.
pub fn wrap_tile_axis(index: i32, delta: i32, tile_cells: i32, buffer_cells: i32) -> i32 {
    debug_assert!(tile_cells > 0);
    let rel = index - buffer_cells;
    let tile_origin = rel.div_euclid(tile_cells) * tile_cells + buffer_cells;
    tile_origin + (rel.rem_euclid(tile_cells) + delta).rem_euclid(tile_cells)
}
