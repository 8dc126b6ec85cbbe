/// Construction-time parameters for a [`LiquidSimulator`].
///
/// A configuration is fixed once the simulator is built; there is no
/// mid-run reconfiguration.
///
/// [`LiquidSimulator`]: crate::simulation::components::LiquidSimulator
#[derive(Clone, Debug)]
pub struct SimulationConfig {
    /// Grid cells along x, including the solid border columns.
    pub cols: usize,
    /// Grid cells along y, including the solid border rows.
    pub rows: usize,
    /// Side length of one grid cell, in world units.
    pub cell_spacing: f32,
    pub particle_count: usize,
    pub particle_radius: f32,
    /// Vertical acceleration; negative is down.
    pub gravity: f32,
    /// Blend between FLIP (1.0, energetic) and PIC (0.0, damped).
    pub flip_ratio: f32,
    /// Gauss-Seidel accelerator, typically just under 2.
    pub over_relaxation: f32,
    /// How aggressively excess density is bled off during projection.
    pub stiffness: f32,
    pub separation_iterations: usize,
    pub pressure_iterations: usize,
    /// Multiplier applied to every `dt` handed to the simulator.
    pub time_scale: f32,
    pub obstacle_radius: f32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            cols: 200,
            rows: 80,
            cell_spacing: 1.1,
            particle_count: 5000,
            particle_radius: 0.5,
            gravity: -9.81,
            flip_ratio: 0.9,
            over_relaxation: 1.9,
            stiffness: 2.0,
            separation_iterations: 3,
            pressure_iterations: 3,
            time_scale: 1.0,
            obstacle_radius: 15.0,
        }
    }
}

impl SimulationConfig {
    pub fn with_grid(mut self, cols: usize, rows: usize, cell_spacing: f32) -> Self {
        self.cols = cols;
        self.rows = rows;
        self.cell_spacing = cell_spacing;
        self
    }

    pub fn with_particle_count(mut self, count: usize) -> Self {
        self.particle_count = count;
        self
    }

    pub fn with_particle_radius(mut self, radius: f32) -> Self {
        self.particle_radius = radius;
        self
    }

    pub fn with_gravity(mut self, gravity: f32) -> Self {
        self.gravity = gravity;
        self
    }

    pub fn with_flip_ratio(mut self, flip_ratio: f32) -> Self {
        self.flip_ratio = flip_ratio;
        self
    }

    pub fn with_pressure_iterations(mut self, iterations: usize) -> Self {
        self.pressure_iterations = iterations;
        self
    }

    pub fn with_separation_iterations(mut self, iterations: usize) -> Self {
        self.separation_iterations = iterations;
        self
    }

    pub fn with_stiffness(mut self, stiffness: f32) -> Self {
        self.stiffness = stiffness;
        self
    }

    pub fn with_time_scale(mut self, time_scale: f32) -> Self {
        self.time_scale = time_scale;
        self
    }

    pub fn with_obstacle_radius(mut self, radius: f32) -> Self {
        self.obstacle_radius = radius;
        self
    }

    /// Panics on configurations the solver cannot run on. Called once at
    /// simulator construction; violations are programming errors, not
    /// recoverable conditions.
    pub fn validate(&self) {
        assert!(self.cols >= 3, "grid needs at least one interior column");
        assert!(self.rows >= 3, "grid needs at least one interior row");
        assert!(self.cell_spacing > 0., "cell spacing must be positive");
        assert!(self.particle_radius > 0., "particle radius must be positive");
        assert!(
            (0. ..=1.).contains(&self.flip_ratio),
            "flip ratio must lie in [0, 1]"
        );
    }

    /// Domain extent along x, in world units.
    pub fn width(&self) -> f32 {
        self.cols as f32 * self.cell_spacing
    }

    /// Domain extent along y, in world units.
    pub fn height(&self) -> f32 {
        self.rows as f32 * self.cell_spacing
    }
}
