use bevy::prelude::*;

/// Where the front-end wants the drag obstacle next.
///
/// Input code writes this between frames; the plugin copies it onto every
/// simulator right before stepping, so obstacle velocity is always derived
/// from whole-step displacement.
#[derive(Resource, Default)]
pub struct ObstacleTarget(pub Option<Vec2>);
