use bevy::prelude::*;

use crate::simulation::components::LiquidSimulator;
use crate::simulation::resources::ObstacleTarget;

pub fn apply_obstacle_target(
    mut simulator_query: Query<&mut LiquidSimulator>,
    target: Res<ObstacleTarget>,
) {
    let Some(position) = target.0 else {
        return;
    };

    for mut simulator in &mut simulator_query {
        simulator.set_obstacle_position(position);
    }
}

pub fn simulate_liquid(mut simulator_query: Query<&mut LiquidSimulator>, time: Res<Time>) {
    for mut simulator in &mut simulator_query {
        simulator.step(time.delta_secs());
    }
}
