use bevy::prelude::*;

/// Pure per-tick movement calculation that can be tested without the navigator
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MovementCalculation {
    pub movement_vector: Vec2,
    pub should_move: bool,
    pub distance_to_target: f32,
    /// Unit steering direction; zero when not moving
    pub direction: Vec2,
}

/// Configuration for one tick of movement
#[derive(Debug, Clone, Copy)]
pub struct MovementConfig {
    /// Units per second
    pub speed: f32,
    /// Seconds
    pub delta_time: f32,
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            speed: 120.0,
            delta_time: 1.0 / 60.0, // 60 FPS
        }
    }
}

impl MovementConfig {
    pub fn step_length(&self) -> f32 {
        self.speed * self.delta_time
    }
}

/// Steering step from `current` toward `target`.
///
/// The step is a full `speed * delta_time` long even when that passes the target; the
/// arrival test catches the overshoot and snaps.
pub fn calculate_movement(
    current_position: Vec2,
    target_position: Option<Vec2>,
    config: MovementConfig,
) -> MovementCalculation {
    let stationary = |distance| MovementCalculation {
        movement_vector: Vec2::ZERO,
        should_move: false,
        distance_to_target: distance,
        direction: Vec2::ZERO,
    };

    let Some(target) = target_position else {
        return stationary(0.0);
    };
    let distance = current_position.distance(target);
    let direction = (target - current_position).normalize_or_zero();
    if direction == Vec2::ZERO || config.step_length() <= 0.0 {
        return stationary(distance);
    }

    MovementCalculation {
        movement_vector: direction * config.step_length(),
        should_move: true,
        distance_to_target: distance,
        direction,
    }
}

/// Whether travelling from `previous` to `current` reached or passed `target`.
///
/// True when the remaining direction is at 90 degrees or more from the direction just
/// travelled. A tick with no travel never counts as arrival.
pub fn has_arrived(previous: Vec2, current: Vec2, target: Vec2) -> bool {
    let travelled = current - previous;
    if travelled.length_squared() <= f32::EPSILON {
        return current.distance_squared(target) <= f32::EPSILON;
    }
    (target - current).dot(travelled) <= 0.0
}

/// Whether an actor that meant to move `intended` units but only moved
/// `previous -> current` should give up.
///
/// The threshold shrinks to half the intended step so slow actors on short ticks are not
/// mistaken for blocked ones.
pub fn is_stuck(previous: Vec2, current: Vec2, intended: f32, stuck_distance: f32) -> bool {
    let threshold = stuck_distance.min(intended * 0.5);
    previous.distance(current) < threshold
}

/// Validate a requested destination
pub fn validate_target(target_position: Vec2) -> bool {
    target_position.is_finite()
}
