//! Static scene geometry and scenery from scene data

use crate::map::SceneryObject;
use crate::pathfinding::obstacles::{
    CollisionShape, CollisionSubject, Obstacle, ObstacleCategory, ObstacleId,
};
use bevy::prelude::*;

/// Static scenery obstacle
#[derive(Debug, Clone)]
pub struct EnvironmentObstacle {
    pub id: u32,
    pub object_type: EnvironmentObjectType,
    pub position: Vec2,
    pub shape: CollisionShape,
}

/// Strongly-typed scenery kinds
#[derive(Debug, Clone, PartialEq)]
pub enum EnvironmentObjectType {
    /// Walls, cliffs, and other level geometry
    Wall,
    /// Furniture, rocks, signposts
    Prop,
    /// Drawn but walk-through (rugs, puddles, grass)
    Decoration,
    Custom { name: String, blocking: bool },
}

impl EnvironmentObjectType {
    pub fn from_name(name: &str, blocking: bool) -> Self {
        match name {
            "wall" => EnvironmentObjectType::Wall,
            "prop" => EnvironmentObjectType::Prop,
            "decoration" => EnvironmentObjectType::Decoration,
            other => EnvironmentObjectType::Custom {
                name: other.to_string(),
                blocking,
            },
        }
    }
}

impl EnvironmentObstacle {
    pub fn new(
        id: u32,
        object_type: EnvironmentObjectType,
        position: Vec2,
        shape: CollisionShape,
    ) -> Self {
        Self {
            id,
            object_type,
            position,
            shape,
        }
    }

    pub fn wall(id: u32, position: Vec2, shape: CollisionShape) -> Self {
        Self::new(id, EnvironmentObjectType::Wall, position, shape)
    }

    pub fn prop(id: u32, position: Vec2, shape: CollisionShape) -> Self {
        Self::new(id, EnvironmentObjectType::Prop, position, shape)
    }

    pub fn from_object(id: u32, object: &SceneryObject) -> Self {
        Self::new(
            id,
            EnvironmentObjectType::from_name(&object.kind, object.blocking),
            Vec2::from(object.position),
            object.shape.to_collision_shape(),
        )
    }

    pub fn blocks_movement(&self) -> bool {
        match &self.object_type {
            EnvironmentObjectType::Decoration => false,
            EnvironmentObjectType::Custom { blocking, .. } => {
                *blocking && !matches!(self.shape, CollisionShape::None)
            }
            _ => !matches!(self.shape, CollisionShape::None),
        }
    }
}

impl Obstacle for EnvironmentObstacle {
    fn obstacle_id(&self) -> ObstacleId {
        ObstacleId::Scenery(self.id)
    }

    fn category(&self) -> ObstacleCategory {
        ObstacleCategory::Scenery
    }

    fn collision_shape(&self) -> &CollisionShape {
        &self.shape
    }

    fn world_position(&self) -> Vec2 {
        self.position
    }

    fn excluded_for(&self, _subject: &CollisionSubject) -> bool {
        !self.blocks_movement()
    }
}
