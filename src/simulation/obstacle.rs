use bevy::prelude::*;

/// The circular drag obstacle.
///
/// Its position is the one writable seam exposed to input code between
/// steps; its velocity is recovered from the displacement since the
/// previous step rather than supplied directly.
#[derive(Clone, Debug)]
pub struct Obstacle {
    pub position: Vec2,
    pub velocity: Vec2,
    pub prev_position: Vec2,
    pub radius: f32,
}

impl Obstacle {
    pub fn new(position: Vec2, radius: f32) -> Self {
        Self {
            position,
            velocity: Vec2::ZERO,
            prev_position: position,
            radius,
        }
    }

    /// Derives the obstacle velocity from last-frame displacement and
    /// re-anchors the previous position for the next step.
    pub fn track_velocity(&mut self, dt: f32) {
        self.velocity = (self.position - self.prev_position) / dt;
        self.prev_position = self.position;
    }
}
