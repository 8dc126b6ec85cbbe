use bevy::prelude::*;

use crate::simulation::grid::{cell_coords, cell_index};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CellType {
    Solid,
    #[default]
    Air,
    Water,
}

/// One MAC cell.
///
/// `velocity.x` lives on the left face, `velocity.y` on the bottom face.
/// `weight` accumulates transfer weights per face while particles are
/// splatted; `prev_velocity` is the snapshot taken right before the
/// pressure solve, which the FLIP blend reads back.
#[derive(Clone, Copy, Debug, Default)]
pub struct FluidCell {
    pub velocity: Vec2,
    pub prev_velocity: Vec2,
    pub weight: Vec2,
    pub density: f32,
    pub cell_type: CellType,
}

/// Staggered MAC grid over the simulation domain, stored column-major.
pub struct StaggeredGrid {
    pub cols: usize,
    pub rows: usize,
    pub spacing: f32,
    pub cells: Vec<FluidCell>,
}

impl StaggeredGrid {
    pub fn new(cols: usize, rows: usize, spacing: f32) -> Self {
        Self {
            cols,
            rows,
            spacing,
            cells: vec![FluidCell::default(); cols * rows],
        }
    }

    /// Marks every cell on the domain boundary as solid. Solid cells stay
    /// solid for the lifetime of the grid.
    pub fn with_solid_border(mut self) -> Self {
        for i in 0..self.cols {
            for j in 0..self.rows {
                if i == 0 || i == self.cols - 1 || j == 0 || j == self.rows - 1 {
                    self.cells[cell_index(i, j, self.rows)].cell_type = CellType::Solid;
                }
            }
        }

        self
    }

    pub fn cell_coords(&self, point: Vec2) -> (usize, usize) {
        cell_coords(point, self.cols, self.rows, self.spacing)
    }

    fn cell_index(&self, i: usize, j: usize) -> usize {
        cell_index(i, j, self.rows)
    }

    pub fn cell_at(&self, i: i32, j: i32) -> Option<&FluidCell> {
        if i < 0 || j < 0 || i >= self.cols as i32 || j >= self.rows as i32 {
            return None;
        }

        self.cells.get(cell_index(i as usize, j as usize, self.rows))
    }

    /// Resets face velocities and weights and downgrades every non-solid
    /// cell to air, ready for a fresh particle transfer.
    pub fn clear_cells(&mut self) {
        for cell in &mut self.cells {
            cell.velocity = Vec2::ZERO;
            cell.weight = Vec2::ZERO;
            if cell.cell_type != CellType::Solid {
                cell.cell_type = CellType::Air;
            }
        }
    }

    /// Promotes each particle's containing cell from air to water.
    pub fn mark_water_cells(&mut self, positions: &[Vec2]) {
        for &position in positions {
            let (i, j) = self.cell_coords(position);
            let cell = &mut self.cells[cell_index(i, j, self.rows)];
            if cell.cell_type == CellType::Air {
                cell.cell_type = CellType::Water;
            }
        }
    }

    /// The four cells whose `component` faces surround `point`, with their
    /// bilinear weights. `shift` moves the sample onto the dual grid of the
    /// face being transferred; the shifted point is clamped one cell in
    /// from the border so all four corners stay addressable.
    fn corner_cells(&self, point: Vec2, shift: Vec2) -> ([usize; 4], [f32; 4]) {
        let h = self.spacing;
        let max = Vec2::new((self.cols - 1) as f32 * h, (self.rows - 1) as f32 * h);
        let point = (point - shift).clamp(Vec2::splat(h), max);

        let (i0, j0) = self.cell_coords(point);
        let i1 = (i0 + 1).min(self.cols - 2);
        let j1 = (j0 + 1).min(self.rows - 2);

        let t = (point - Vec2::new(i0 as f32, j0 as f32) * h) / h;
        let s = Vec2::ONE - t;

        (
            [
                self.cell_index(i0, j0),
                self.cell_index(i1, j0),
                self.cell_index(i1, j1),
                self.cell_index(i0, j1),
            ],
            [s.x * s.y, t.x * s.y, t.x * t.y, s.x * t.y],
        )
    }

    fn face_shift(&self, component: usize) -> Vec2 {
        if component == 0 {
            Vec2::new(0., self.spacing / 2.)
        } else {
            Vec2::new(self.spacing / 2., 0.)
        }
    }

    /// Accumulates both components of a particle velocity onto the
    /// surrounding faces, weights included.
    pub fn splat_velocity(&mut self, point: Vec2, velocity: Vec2) {
        for component in 0..2 {
            let (corners, weights) = self.corner_cells(point, self.face_shift(component));

            for (&corner, &weight) in corners.iter().zip(weights.iter()) {
                let cell = &mut self.cells[corner];
                cell.velocity[component] += velocity[component] * weight;
                cell.weight[component] += weight;
            }
        }
    }

    /// Divides accumulated face velocities by their accumulated weights.
    /// Faces no particle touched keep their zero value.
    pub fn even_out_velocities(&mut self) {
        for cell in &mut self.cells {
            for component in 0..2 {
                if cell.weight[component] > 0. {
                    cell.velocity[component] /= cell.weight[component];
                }
            }
        }
    }

    /// Samples the grid back onto one particle, blending the FLIP delta
    /// against the PIC average by `flip_ratio`. Faces bordered by air on
    /// both sides carry no information and are excluded; if every face is
    /// excluded the particle keeps its current component.
    pub fn blended_velocity(&self, point: Vec2, velocity: Vec2, flip_ratio: f32) -> Vec2 {
        let mut blended = velocity;

        for component in 0..2 {
            let (corners, weights) = self.corner_cells(point, self.face_shift(component));
            let face_offset = if component == 0 { self.rows } else { 1 };

            let mut total_weight = 0.;
            let mut pic = 0.;
            let mut delta = 0.;

            for (&corner, &weight) in corners.iter().zip(weights.iter()) {
                debug_assert!(corner >= face_offset);
                let cell = &self.cells[corner];
                let neighbour = &self.cells[corner - face_offset];
                if cell.cell_type == CellType::Air && neighbour.cell_type == CellType::Air {
                    continue;
                }

                total_weight += weight;
                pic += weight * cell.velocity[component];
                delta += weight * (cell.velocity[component] - cell.prev_velocity[component]);
            }

            if total_weight > 0. {
                pic /= total_weight;
                delta /= total_weight;
                blended[component] =
                    flip_ratio * (velocity[component] + delta) + (1. - flip_ratio) * pic;
            }
        }

        blended
    }

    pub fn clear_densities(&mut self) {
        for cell in &mut self.cells {
            cell.density = 0.;
        }
    }

    /// Accumulates one particle into the cell-centred density field.
    pub fn splat_density(&mut self, point: Vec2) {
        let half = self.spacing / 2.;
        let (corners, weights) = self.corner_cells(point, Vec2::splat(half));

        for (&corner, &weight) in corners.iter().zip(weights.iter()) {
            self.cells[corner].density += weight;
        }
    }

    /// Mean density over water cells, if any exist.
    pub fn average_water_density(&self) -> Option<f32> {
        let mut sum = 0.;
        let mut count = 0usize;

        for cell in &self.cells {
            if cell.cell_type == CellType::Water {
                sum += cell.density;
                count += 1;
            }
        }

        (count > 0).then(|| sum / count as f32)
    }

    /// Gauss-Seidel divergence clearing over the interior water cells.
    ///
    /// Snapshots the incoming velocities first so the FLIP blend can read
    /// the pre-solve state. Each sweep pushes a cell's scaled divergence
    /// out through whichever of its four faces borders a non-solid cell;
    /// when the density field exceeds `rest_density`, the excess is bled
    /// off as extra outflow (`stiffness` scales how aggressively).
    pub fn project(
        &mut self,
        iterations: usize,
        over_relaxation: f32,
        stiffness: f32,
        rest_density: Option<f32>,
    ) {
        for cell in &mut self.cells {
            cell.prev_velocity = cell.velocity;
        }

        let n = self.rows;

        for _ in 0..iterations {
            for i in 1..self.cols - 1 {
                for j in 1..self.rows - 1 {
                    let center = i * n + j;
                    if self.cells[center].cell_type != CellType::Water {
                        continue;
                    }

                    let left = center - n;
                    let right = center + n;
                    let below = center - 1;
                    let above = center + 1;

                    let open_left = openness(&self.cells[left]);
                    let open_right = openness(&self.cells[right]);
                    let open_below = openness(&self.cells[below]);
                    let open_above = openness(&self.cells[above]);
                    let total = open_left + open_right + open_below + open_above;
                    if total == 0. {
                        continue;
                    }

                    let mut divergence = self.cells[right].velocity.x
                        - self.cells[center].velocity.x
                        + self.cells[above].velocity.y
                        - self.cells[center].velocity.y;

                    divergence *= over_relaxation;

                    if let Some(rest) = rest_density {
                        let compression = self.cells[center].density - rest;
                        if compression > 0. {
                            divergence -= stiffness * compression;
                        }
                    }

                    let correction = divergence / total;
                    self.cells[center].velocity.x += correction * open_left;
                    self.cells[right].velocity.x -= correction * open_right;
                    self.cells[center].velocity.y += correction * open_below;
                    self.cells[above].velocity.y -= correction * open_above;
                }
            }
        }
    }

    /// Net outflow through the faces of cell `(i, j)`.
    pub fn divergence(&self, i: usize, j: usize) -> f32 {
        let center = self.cell_index(i, j);
        self.cells[center + self.rows].velocity.x - self.cells[center].velocity.x
            + self.cells[center + 1].velocity.y
            - self.cells[center].velocity.y
    }
}

fn openness(cell: &FluidCell) -> f32 {
    if cell.cell_type == CellType::Solid {
        0.
    } else {
        1.
    }
}
