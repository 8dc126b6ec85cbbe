use bevy::prelude::*;

use crate::simulation::config::SimulationConfig;
use crate::simulation::obstacle::Obstacle;
use crate::simulation::spatial_hash::SpatialHash;
use crate::simulation::staggered_grid::StaggeredGrid;

/// Fraction of the obstacle's velocity imparted to particles it overlaps.
const OBSTACLE_PUSH: f32 = 0.3;

/// The whole simulation state: particle arrays, the staggered grid, the
/// cell-bucket index and the drag obstacle.
///
/// Everything is owned here for the simulator's lifetime; renderers borrow
/// particle and cell state read-only between steps.
#[derive(Component)]
pub struct LiquidSimulator {
    config: SimulationConfig,
    particle_positions: Vec<Vec2>,
    particle_velocities: Vec<Vec2>,
    grid: StaggeredGrid,
    spatial_hash: SpatialHash,
    obstacle: Obstacle,
    rest_density: Option<f32>,
}

impl LiquidSimulator {
    /// Builds a simulator with the default particle block: rows of
    /// particles filling the left half of the tank, launched up-right.
    pub fn new(config: SimulationConfig) -> Self {
        config.validate();

        let margin = config.cell_spacing + config.particle_radius;
        let half_cols = config.cols / 2;
        let positions = (0..config.particle_count)
            .map(|i| {
                Vec2::new(
                    (i % half_cols) as f32 + margin,
                    (2 * i / config.cols) as f32 + margin,
                )
            })
            .collect();
        let velocities = vec![Vec2::new(10., 10.); config.particle_count];

        info!(
            "liquid simulator: {}x{} cells, {} particles",
            config.cols, config.rows, config.particle_count
        );

        let grid = StaggeredGrid::new(config.cols, config.rows, config.cell_spacing)
            .with_solid_border();
        let spatial_hash = SpatialHash::new(
            config.cols,
            config.rows,
            config.cell_spacing,
            config.particle_count,
        );
        let obstacle = Obstacle::new(
            Vec2::new(config.width(), config.height()) / 2.,
            config.obstacle_radius,
        );

        Self {
            config,
            particle_positions: positions,
            particle_velocities: velocities,
            grid,
            spatial_hash,
            obstacle,
            rest_density: None,
        }
    }

    /// Replaces the default particle block with explicit positions, all
    /// sharing one starting velocity.
    pub fn with_particles(mut self, positions: Vec<Vec2>, velocity: Vec2) -> Self {
        self.config.particle_count = positions.len();
        self.particle_velocities = vec![velocity; positions.len()];
        self.spatial_hash = SpatialHash::new(
            self.config.cols,
            self.config.rows,
            self.config.cell_spacing,
            positions.len(),
        );
        self.particle_positions = positions;
        self
    }

    /// Advances the fluid by `dt` seconds (scaled by the configured time
    /// scale). One call runs the whole pipeline: integrate, separate,
    /// resolve obstacles, transfer to the grid, estimate densities, clear
    /// divergence, transfer back. Non-positive `dt` is a no-op.
    pub fn step(&mut self, dt: f32) {
        let dt = dt * self.config.time_scale;
        if dt <= 0. {
            return;
        }

        self.integrate_particles(dt);
        self.push_particles_apart(self.config.separation_iterations);
        self.handle_obstacles(dt);
        self.transfer_to_grid();
        self.update_densities();
        self.grid.project(
            self.config.pressure_iterations,
            self.config.over_relaxation,
            self.config.stiffness,
            self.rest_density,
        );
        self.transfer_from_grid();
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn particle_positions(&self) -> &[Vec2] {
        &self.particle_positions
    }

    pub fn particle_velocities(&self) -> &[Vec2] {
        &self.particle_velocities
    }

    pub fn grid(&self) -> &StaggeredGrid {
        &self.grid
    }

    pub fn obstacle(&self) -> &Obstacle {
        &self.obstacle
    }

    /// The one writable seam for input code: reposition the drag obstacle.
    /// Its velocity is derived from the move on the next step.
    pub fn set_obstacle_position(&mut self, position: Vec2) {
        self.obstacle.position = position;
    }

    pub fn rest_density(&self) -> Option<f32> {
        self.rest_density
    }

    fn integrate_particles(&mut self, dt: f32) {
        let gravity = Vec2::new(0., self.config.gravity);

        for (velocity, position) in self
            .particle_velocities
            .iter_mut()
            .zip(self.particle_positions.iter_mut())
        {
            *velocity += gravity * dt;
            *position += *velocity * dt;
        }
    }

    /// Resolves particle overlap against the cell buckets built at the
    /// start of the call. The buckets are not rebuilt between iterations;
    /// particles that cross a cell boundary mid-pass are still resolved
    /// against their original bucket.
    fn push_particles_apart(&mut self, iterations: usize) {
        self.spatial_hash.populate(&self.particle_positions);

        let cols = self.config.cols;
        let rows = self.config.rows;
        let radius = self.config.particle_radius;
        let min_distance = 2. * radius;
        let min_distance_squared = min_distance * min_distance;

        for _ in 0..iterations {
            for a in 0..self.particle_positions.len() {
                let (cell_x, cell_y) = self.spatial_hash.cell_coords(self.particle_positions[a]);

                for i in cell_x.saturating_sub(1).max(1)..=(cell_x + 1).min(cols - 2) {
                    for j in cell_y.saturating_sub(1).max(1)..=(cell_y + 1).min(rows - 2) {
                        for &b in self.spatial_hash.bucket(i, j) {
                            if b == a {
                                continue;
                            }

                            let first = self.particle_positions[a];
                            let second = self.particle_positions[b];
                            let distance_squared = first.distance_squared(second);
                            // Coincident pairs have no separation axis;
                            // later iterations resolve them via neighbours.
                            if distance_squared >= min_distance_squared || distance_squared == 0. {
                                continue;
                            }

                            let distance = distance_squared.sqrt();
                            let push = (radius - distance / 2.) * ((second - first) / distance);
                            self.particle_positions[a] -= push;
                            self.particle_positions[b] += push;
                        }
                    }
                }
            }
        }
    }

    /// Imparts the obstacle's motion to overlapping particles and clamps
    /// everything back inside the tank walls. Runs right before the grid
    /// transfer so every particle indexes a valid cell afterwards.
    fn handle_obstacles(&mut self, dt: f32) {
        self.obstacle.track_velocity(dt);

        let h = self.config.cell_spacing;
        let r = self.config.particle_radius;
        let left = h + r;
        let right = (self.config.cols - 1) as f32 * h - r;
        let bottom = h + r;
        let top = (self.config.rows - 1) as f32 * h - r;

        let reach = self.obstacle.radius + r;
        let reach_squared = reach * reach;

        for (position, velocity) in self
            .particle_positions
            .iter_mut()
            .zip(self.particle_velocities.iter_mut())
        {
            if position.distance_squared(self.obstacle.position) < reach_squared {
                *velocity += OBSTACLE_PUSH * self.obstacle.velocity;
            }

            if position.x < left {
                position.x = left;
                velocity.x = 0.;
            }
            if position.x > right {
                position.x = right;
                velocity.x = 0.;
            }
            if position.y < bottom {
                position.y = bottom;
                velocity.y = 0.;
            }
            if position.y > top {
                position.y = top;
                velocity.y = 0.;
            }
        }
    }

    fn transfer_to_grid(&mut self) {
        self.grid.clear_cells();
        self.grid.mark_water_cells(&self.particle_positions);

        for i in 0..self.particle_positions.len() {
            self.grid
                .splat_velocity(self.particle_positions[i], self.particle_velocities[i]);
        }

        self.grid.even_out_velocities();
    }

    fn update_densities(&mut self) {
        self.grid.clear_densities();

        for i in 0..self.particle_positions.len() {
            self.grid.splat_density(self.particle_positions[i]);
        }

        // Rest density is measured once, the first time any water exists,
        // and stays fixed for the lifetime of the simulator.
        if self.rest_density.is_none() {
            if let Some(density) = self.grid.average_water_density() {
                debug!("rest density settled at {density}");
                self.rest_density = Some(density);
            }
        }
    }

    fn transfer_from_grid(&mut self) {
        for i in 0..self.particle_positions.len() {
            self.particle_velocities[i] = self.grid.blended_velocity(
                self.particle_positions[i],
                self.particle_velocities[i],
                self.config.flip_ratio,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::math::vec2;

    fn small_config() -> SimulationConfig {
        SimulationConfig::default()
            .with_grid(10, 10, 1.)
            .with_particle_count(4)
    }

    #[test]
    fn default_block_starts_inside_the_walls() {
        let simulator = LiquidSimulator::new(SimulationConfig::default());
        let config = simulator.config();

        let left = config.cell_spacing;
        let right = (config.cols - 1) as f32 * config.cell_spacing;

        for position in simulator.particle_positions() {
            assert!(position.x >= left && position.x <= right);
            assert!(position.y >= config.cell_spacing);
        }
        for velocity in simulator.particle_velocities() {
            assert_eq!(*velocity, vec2(10., 10.));
        }
    }

    #[test]
    fn walls_clamp_position_and_kill_normal_velocity() {
        let mut simulator = LiquidSimulator::new(small_config().with_obstacle_radius(1.))
            .with_particles(vec![vec2(0.2, 5.), vec2(5., 9.7)], vec2(-3., 1.));

        simulator.handle_obstacles(0.1);

        assert_eq!(simulator.particle_positions()[0], vec2(1.5, 5.));
        assert_eq!(simulator.particle_velocities()[0], vec2(0., 1.));

        assert_eq!(simulator.particle_positions()[1], vec2(5., 8.5));
        assert_eq!(simulator.particle_velocities()[1], vec2(-3., 0.));
    }

    #[test]
    fn moving_obstacle_shoves_nearby_particles() {
        let config = SimulationConfig::default()
            .with_grid(20, 10, 1.)
            .with_obstacle_radius(2.);
        let mut simulator =
            LiquidSimulator::new(config).with_particles(vec![vec2(5., 5.)], vec2(2., 0.));

        // The obstacle starts resting at the tank centre (10, 5).
        assert_eq!(simulator.obstacle().position, vec2(10., 5.));

        simulator.set_obstacle_position(vec2(5.5, 5.));
        simulator.handle_obstacles(0.1);

        let expected = 2. + OBSTACLE_PUSH * ((5.5 - 10.) / 0.1);
        assert!((simulator.particle_velocities()[0].x - expected).abs() < 1e-3);
        assert_eq!(simulator.particle_velocities()[0].y, 0.);
        // Velocity impulse only; the disk never moves particles directly.
        assert_eq!(simulator.particle_positions()[0], vec2(5., 5.));
    }

    #[test]
    fn overlapping_pair_separates_to_contact_distance() {
        let mut simulator = LiquidSimulator::new(small_config())
            .with_particles(vec![vec2(5., 5.), vec2(5.6, 5.)], Vec2::ZERO);

        simulator.push_particles_apart(1);

        let first = simulator.particle_positions()[0];
        let second = simulator.particle_positions()[1];
        assert!((first - vec2(4.8, 5.)).length() < 1e-5);
        assert!((second - vec2(5.8, 5.)).length() < 1e-5);
        assert!(first.distance(second) >= 1. - 1e-4);
    }

    #[test]
    fn coincident_pair_is_left_alone() {
        let mut simulator = LiquidSimulator::new(small_config())
            .with_particles(vec![vec2(5., 5.), vec2(5., 5.)], Vec2::ZERO);

        simulator.push_particles_apart(3);

        for position in simulator.particle_positions() {
            assert!(position.is_finite());
        }
    }

    #[test]
    fn rest_density_is_measured_exactly_once() {
        let positions: Vec<Vec2> = (0..16)
            .map(|i| vec2(2.5 + (i % 4) as f32, 2.5 + (i / 4) as f32))
            .collect();
        let mut simulator =
            LiquidSimulator::new(small_config()).with_particles(positions, Vec2::ZERO);

        assert_eq!(simulator.rest_density(), None);

        simulator.step(1. / 60.);
        let measured = simulator.rest_density().expect("water cells exist");

        for _ in 0..10 {
            simulator.step(1. / 60.);
        }
        assert_eq!(simulator.rest_density(), Some(measured));
    }

    #[test]
    fn non_positive_dt_is_a_no_op() {
        let mut simulator = LiquidSimulator::new(small_config())
            .with_particles(vec![vec2(5., 5.)], vec2(1., 2.));

        simulator.step(0.);
        simulator.step(-1.);

        assert_eq!(simulator.particle_positions()[0], vec2(5., 5.));
        assert_eq!(simulator.particle_velocities()[0], vec2(1., 2.));
    }

    #[test]
    fn stepping_keeps_particles_inside_the_domain() {
        let positions: Vec<Vec2> = (0..16)
            .map(|i| vec2(2.5 + (i % 4) as f32, 2.5 + (i / 4) as f32))
            .collect();
        let mut simulator =
            LiquidSimulator::new(small_config()).with_particles(positions, vec2(30., 30.));

        for _ in 0..60 {
            simulator.step(1. / 60.);
        }

        let config = simulator.config();
        let h = config.cell_spacing;
        let r = config.particle_radius;
        for position in simulator.particle_positions() {
            assert!(position.is_finite());
            assert!(position.x >= h - r && position.x <= (config.cols - 1) as f32 * h + r);
            assert!(position.y >= h - r && position.y <= (config.rows - 1) as f32 * h + r);
        }
    }
}
