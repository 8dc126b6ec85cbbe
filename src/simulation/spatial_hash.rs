use bevy::prelude::*;

use crate::simulation::grid::{cell_coords, cell_index};

/// Dense cell-bucket index over particle positions.
///
/// Two flat arrays: `starts` holds prefix-sum offsets per cell (with one
/// trailing sentinel slot equal to the particle count) and `entries` holds
/// particle indices grouped by containing cell. The whole index is rebuilt
/// by counting sort on every call to [`populate`](Self::populate).
pub struct SpatialHash {
    cols: usize,
    rows: usize,
    spacing: f32,
    starts: Vec<usize>,
    entries: Vec<usize>,
}

impl SpatialHash {
    pub fn new(cols: usize, rows: usize, spacing: f32, capacity: usize) -> Self {
        Self {
            cols,
            rows,
            spacing,
            starts: vec![0; cols * rows + 1],
            entries: vec![0; capacity],
        }
    }

    pub fn cell_coords(&self, point: Vec2) -> (usize, usize) {
        cell_coords(point, self.cols, self.rows, self.spacing)
    }

    fn index_from_point(&self, point: Vec2) -> usize {
        let (i, j) = self.cell_coords(point);
        cell_index(i, j, self.rows)
    }

    /// Rebuilds the index from scratch: count per cell, prefix-sum in place,
    /// then fill buckets back-to-front so `starts[c]` ends up at the start
    /// offset of cell c's bucket.
    pub fn populate(&mut self, points: &[Vec2]) {
        debug_assert_eq!(points.len(), self.entries.len());

        self.starts.fill(0);

        for &point in points {
            let index = self.index_from_point(point);
            self.starts[index] += 1;
        }

        let mut start = 0;
        for slot in self.starts.iter_mut() {
            start += *slot;
            *slot = start;
        }

        for (entry, &point) in points.iter().enumerate() {
            let i = self.index_from_point(point);
            self.starts[i] -= 1;
            self.entries[self.starts[i]] = entry;
        }
    }

    /// Particle indices currently bucketed in cell `(i, j)`.
    pub fn bucket(&self, i: usize, j: usize) -> &[usize] {
        let c = cell_index(i, j, self.rows);
        &self.entries[self.starts[c]..self.starts[c + 1]]
    }
}
