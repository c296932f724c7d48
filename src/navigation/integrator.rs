//! Per-tick movement: steering, collision response, arrival, and the companion leash

use crate::components::{ActorId, ActorRole, MoveState};
use crate::game_logic::companion::{
    LeashConfig, LeashDecision, evaluate_leash, follow_state, warp_point_behind,
};
use crate::game_logic::movement::{MovementConfig, calculate_movement, has_arrived, is_stuck};
use crate::navigation::Navigator;
use crate::pathfinding::{PathQuery, nearest_free_position};
use bevy::prelude::*;

impl Navigator {
    /// Move every actor one tick of `delta_ms` milliseconds.
    ///
    /// Finished plans are applied first. Actors then move in a fixed order (player,
    /// companion, other characters) and the companion's leash is enforced last.
    pub fn advance(&mut self, delta_ms: f32) {
        self.collect_plans();
        let delta_time = delta_ms.max(0.0) / 1000.0;
        if delta_time <= 0.0 {
            return;
        }

        for id in self.tick_order() {
            self.step_actor(id, delta_time);
        }
        self.apply_leash(delta_time);
    }

    fn tick_order(&self) -> Vec<ActorId> {
        let others = self
            .actors
            .values()
            .filter(|record| record.actor.role == ActorRole::Npc)
            .map(|record| record.actor.id);
        self.player.into_iter().chain(self.companion).chain(others).collect()
    }

    fn step_actor(&mut self, id: ActorId, delta_time: f32) {
        let drag = if Some(id) == self.player { self.drag } else { None };
        let Some(entry) = self.movement.entry(id) else {
            return;
        };
        let Some(target) = drag.map(|d| d.point).or(entry.target) else {
            return;
        };
        if !entry.state.is_moving() {
            return;
        }
        let Some(record) = self.actors.get(&id) else {
            return;
        };

        let before = record.actor.anchor();
        let config = MovementConfig {
            speed: record.actor.speeds.speed(entry.state),
            delta_time,
        };
        let calc = calculate_movement(before, Some(target), config);
        if !calc.should_move {
            if calc.distance_to_target <= f32::EPSILON {
                self.arrive(id, target, drag.is_some());
            }
            return;
        }

        let subject = self.subject_for(record);
        let after = self.world.resolve(&subject, before + calc.movement_vector);
        self.move_anchor(id, after, calc.direction);

        if has_arrived(before, after, target) {
            self.arrive(id, target, drag.is_some());
        } else if drag.is_none()
            && is_stuck(
                before,
                after,
                calc.movement_vector.length(),
                self.settings.stuck_distance.get(),
            )
        {
            info!(
                "Actor {id} is stuck at ({:.1}, {:.1}); giving up on ({:.1}, {:.1})",
                after.x, after.y, target.x, target.y
            );
            self.movement.halt(id);
        }
    }

    /// Snap onto a reached target and take the next waypoint
    fn arrive(&mut self, id: ActorId, target: Vec2, dragging: bool) {
        self.move_anchor(id, target, Vec2::ZERO);
        if dragging {
            // Stay in drag mode; the next pointer move starts walking again
            self.movement.set_state(id, MoveState::Standing);
        } else if self.movement.advance_queue(id).is_none() {
            debug!("Actor {id} arrived at ({:.1}, {:.1})", target.x, target.y);
        }
    }

    fn move_anchor(&mut self, id: ActorId, anchor: Vec2, steering: Vec2) {
        if let Some(record) = self.actors.get_mut(&id) {
            record.actor.position = anchor - record.actor.anchor_offset;
            if steering != Vec2::ZERO {
                record.facing = steering;
            }
        }
        self.world.set_actor_anchor(id, anchor);
    }

    fn face(&mut self, id: ActorId, direction: Vec2) {
        let direction = direction.normalize_or_zero();
        if let Some(record) = self.actors.get_mut(&id) {
            if direction != Vec2::ZERO {
                record.facing = direction;
            }
        }
    }

    fn apply_leash(&mut self, delta_time: f32) {
        let (Some(player_id), Some(companion_id)) = (self.player, self.companion) else {
            return;
        };
        if self.companion_engaged || !self.input_enabled {
            return;
        }
        let (Some(player), Some(companion)) =
            (self.actors.get(&player_id), self.actors.get(&companion_id))
        else {
            return;
        };

        let config = LeashConfig {
            player_half_width: player.actor.shape.half_width(),
            companion_half_width: companion.actor.shape.half_width(),
            margin: self.settings.leash_margin.get(),
            warp_distance: self.settings.warp_distance.get(),
        };
        let player_anchor = player.actor.anchor();
        let player_facing = player.facing;
        let player_speeds = player.actor.speeds;
        let subject = self.subject_for(companion);
        let mut companion_anchor = companion.actor.anchor();

        if evaluate_leash(player_anchor, companion_anchor, &config) == LeashDecision::Hold {
            self.movement.halt(companion_id);
            self.face(companion_id, player_anchor - companion_anchor);
            return;
        }

        let state = follow_state(self.movement.state(player_id).unwrap_or_default());
        self.movement.abandon_path(companion_id, state);
        let calc = calculate_movement(
            companion_anchor,
            Some(player_anchor),
            MovementConfig {
                speed: player_speeds.speed(state),
                delta_time,
            },
        );
        if calc.should_move {
            let slack = (calc.distance_to_target - config.radius()).max(0.0);
            let step = calc.movement_vector.clamp_length_max(slack);
            let after = self.world.resolve(&subject, companion_anchor + step);
            self.move_anchor(companion_id, after, calc.direction);
            companion_anchor = after;
        }

        if evaluate_leash(player_anchor, companion_anchor, &config) == LeashDecision::Warp {
            let behind = warp_point_behind(player_anchor, player_facing, config.radius());
            let query = PathQuery::new(&self.world, &subject, &self.settings);
            // With no free spot the companion still lands behind, inside the leash
            let landing = nearest_free_position(&query, behind, behind);
            info!(
                "Companion {companion_id} fell {:.0} behind; warping to ({:.1}, {:.1})",
                player_anchor.distance(companion_anchor),
                landing.x,
                landing.y
            );
            self.move_anchor(companion_id, landing, Vec2::ZERO);
            self.movement.set_state(companion_id, MoveState::Standing);
            self.face(companion_id, player_anchor - landing);
        }
    }
}
