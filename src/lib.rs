//! 2D hybrid particle-grid liquid simulation.
//!
//! Particles carry the fluid; a staggered MAC grid enforces
//! incompressibility. Each step advects particles under gravity, pushes
//! overlapping particles apart over a cell-bucket index, resolves walls and
//! the drag obstacle, splats velocities onto the grid, clears divergence
//! with drift compensation, and blends the corrected grid back onto the
//! particles (FLIP/PIC).
//!
//! The simulator itself is plain data behind
//! [`LiquidSimulator`](simulation::components::LiquidSimulator): build it
//! from a [`SimulationConfig`](simulation::config::SimulationConfig), call
//! `step(dt)`, read particle and cell state back out. Rendering and input
//! stay outside; a front-end either drives `step` itself or adds
//! [`LiquidSimulationPlugin`](simulation::LiquidSimulationPlugin) and
//! writes [`ObstacleTarget`](simulation::resources::ObstacleTarget).

pub mod simulation;

pub mod prelude {
    pub use crate::simulation::components::LiquidSimulator;
    pub use crate::simulation::config::SimulationConfig;
    pub use crate::simulation::obstacle::Obstacle;
    pub use crate::simulation::resources::ObstacleTarget;
    pub use crate::simulation::staggered_grid::{CellType, FluidCell, StaggeredGrid};
    pub use crate::simulation::LiquidSimulationPlugin;
}
