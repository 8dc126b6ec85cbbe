use bevy::prelude::*;

/// Coordinates of the cell containing `point`, clamped to the grid.
///
/// Clamping runs before every transfer or hash lookup so that particles
/// sitting on (or, after rounding, slightly past) the boundary can never
/// produce an out-of-range index.
pub fn cell_coords(point: Vec2, cols: usize, rows: usize, spacing: f32) -> (usize, usize) {
    // Casting a negative float straight to usize would wrap, so clamp in i64.
    let i = ((point.x / spacing).floor() as i64).clamp(0, cols as i64 - 1);
    let j = ((point.y / spacing).floor() as i64).clamp(0, rows as i64 - 1);
    (i as usize, j as usize)
}

/// Flat index of cell `(i, j)` in a column-major grid with `rows` rows.
///
/// Columns are contiguous: the neighbour in +j is at `index + 1`, the
/// neighbour in +i at `index + rows`. Face offsets in the projection and
/// transfer code depend on this stride.
pub fn cell_index(i: usize, j: usize, rows: usize) -> usize {
    i * rows + j
}
