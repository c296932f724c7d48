//! Companion follow distance and catch-up rules

use crate::components::MoveState;
use bevy::prelude::*;

/// Distances that govern how far the companion may trail the player
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LeashConfig {
    pub player_half_width: f32,
    pub companion_half_width: f32,
    pub margin: f32,
    pub warp_distance: f32,
}

impl LeashConfig {
    /// Separation at which the companion starts following
    pub fn radius(&self) -> f32 {
        self.player_half_width + self.companion_half_width + self.margin
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeashDecision {
    /// Close enough; stand and face the player
    Hold,
    /// Drop any queued path and steer straight at the player
    Follow,
    /// Too far behind to chase; teleport behind the player
    Warp,
}

pub fn evaluate_leash(player_anchor: Vec2, companion_anchor: Vec2, config: &LeashConfig) -> LeashDecision {
    let separation = player_anchor.distance(companion_anchor);
    if separation > config.warp_distance.max(config.radius()) {
        LeashDecision::Warp
    } else if separation > config.radius() {
        LeashDecision::Follow
    } else {
        LeashDecision::Hold
    }
}

/// Movement state for a following companion: match the player, but never stand still
pub fn follow_state(player_state: MoveState) -> MoveState {
    match player_state {
        MoveState::Standing => MoveState::Walking,
        moving => moving,
    }
}

/// Spot one leash radius behind the player, opposite the way they face
pub fn warp_point_behind(player_anchor: Vec2, player_facing: Vec2, radius: f32) -> Vec2 {
    let facing = player_facing.normalize_or(Vec2::Y);
    player_anchor - facing * radius
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> LeashConfig {
        LeashConfig {
            player_half_width: 8.0,
            companion_half_width: 6.0,
            margin: 24.0,
            warp_distance: 320.0,
        }
    }

    #[test]
    fn test_leash_radius() {
        assert_eq!(config().radius(), 38.0);
    }

    #[test]
    fn test_leash_decisions() {
        let player = Vec2::new(100.0, 100.0);
        assert_eq!(
            evaluate_leash(player, Vec2::new(120.0, 100.0), &config()),
            LeashDecision::Hold
        );
        assert_eq!(
            evaluate_leash(player, Vec2::new(100.0, 200.0), &config()),
            LeashDecision::Follow
        );
        assert_eq!(
            evaluate_leash(player, Vec2::new(-300.0, 100.0), &config()),
            LeashDecision::Warp
        );
    }

    #[test]
    fn test_warp_never_inside_leash() {
        // A warp distance shorter than the leash still follows first
        let tight = LeashConfig {
            warp_distance: 10.0,
            ..config()
        };
        assert_eq!(
            evaluate_leash(Vec2::ZERO, Vec2::new(30.0, 0.0), &tight),
            LeashDecision::Hold
        );
    }

    #[test]
    fn test_follow_state() {
        assert_eq!(follow_state(MoveState::Standing), MoveState::Walking);
        assert_eq!(follow_state(MoveState::Running), MoveState::Running);
    }

    #[test]
    fn test_warp_point_behind() {
        let player = Vec2::new(50.0, 50.0);
        assert_eq!(warp_point_behind(player, Vec2::X, 38.0), Vec2::new(12.0, 50.0));
        // No facing yet: treat as facing down the screen
        assert_eq!(warp_point_behind(player, Vec2::ZERO, 10.0), Vec2::new(50.0, 40.0));
    }
}
