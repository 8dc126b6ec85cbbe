pub mod components;
pub mod config;
pub mod grid;
pub mod obstacle;
pub mod resources;
pub mod spatial_hash;
pub mod staggered_grid;
pub mod systems;

use bevy::prelude::*;

use crate::simulation::resources::ObstacleTarget;
use crate::simulation::systems::{apply_obstacle_target, simulate_liquid};

/// Steps every [`LiquidSimulator`](components::LiquidSimulator) entity once
/// per frame, after applying any pending obstacle target.
pub struct LiquidSimulationPlugin;

impl Plugin for LiquidSimulationPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ObstacleTarget>();
        app.add_systems(PreUpdate, (apply_obstacle_target, simulate_liquid).chain());
    }
}
