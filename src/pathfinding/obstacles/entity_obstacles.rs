//! Actors seen as obstacles by other actors

use crate::components::{Actor, ActorId, ActorRole};
use crate::pathfinding::obstacles::{
    CollisionShape, CollisionSubject, Obstacle, ObstacleCategory, ObstacleId,
};
use bevy::prelude::*;

/// Hit shape of an actor, centered on its anchor
#[derive(Debug, Clone)]
pub struct EntityObstacle {
    pub actor_id: ActorId,
    pub role: ActorRole,
    pub anchor: Vec2,
    pub shape: CollisionShape,
}

impl EntityObstacle {
    pub fn new(actor_id: ActorId, role: ActorRole, anchor: Vec2, shape: CollisionShape) -> Self {
        Self {
            actor_id,
            role,
            anchor,
            shape,
        }
    }
}

impl From<&Actor> for EntityObstacle {
    fn from(actor: &Actor) -> Self {
        Self::new(actor.id, actor.role, actor.anchor(), actor.shape.clone())
    }
}

impl Obstacle for EntityObstacle {
    fn obstacle_id(&self) -> ObstacleId {
        ObstacleId::Actor(self.actor_id)
    }

    fn category(&self) -> ObstacleCategory {
        match self.role {
            ActorRole::Player => ObstacleCategory::Player,
            ActorRole::Companion | ActorRole::Npc => ObstacleCategory::MovingActor,
            ActorRole::Background => ObstacleCategory::Background,
        }
    }

    fn collision_shape(&self) -> &CollisionShape {
        &self.shape
    }

    fn world_position(&self) -> Vec2 {
        self.anchor
    }

    /// Nobody collides with themselves; the companion is walk-through for everyone
    fn excluded_for(&self, subject: &CollisionSubject) -> bool {
        self.actor_id == subject.id || self.role == ActorRole::Companion
    }
}
