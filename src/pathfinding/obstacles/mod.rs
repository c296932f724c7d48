//! Trait-based obstacle system shared by planning and runtime collision response

use crate::components::{ActorId, ActorRole};
use bevy::prelude::*;

pub mod collision_shapes;
pub mod entity_obstacles;
pub mod environment_obstacles;
pub mod obstacle_manager;

pub use collision_shapes::*;
pub use entity_obstacles::*;
pub use environment_obstacles::*;
pub use obstacle_manager::*;

/// Which obstacle an overlap came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObstacleId {
    Bounds,
    Scenery(u32),
    Actor(ActorId),
}

/// An obstacle plus the edge or side that produced an overlap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContactId {
    pub obstacle: ObstacleId,
    pub feature: u16,
}

/// Overlap against a specific obstacle; moving by `axis * distance` clears it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlapInfo {
    pub axis: Vec2,
    pub distance: f32,
    pub contact: ContactId,
}

impl OverlapInfo {
    pub fn push(&self) -> Vec2 {
        self.axis * self.distance
    }
}

/// Collision resolution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ObstacleCategory {
    Bounds,
    Player,
    MovingActor,
    Scenery,
    Background,
}

/// The actor a collision query is made for
#[derive(Debug, Clone)]
pub struct CollisionSubject {
    pub id: ActorId,
    pub role: ActorRole,
    pub shape: CollisionShape,
    /// Obstacle to ignore, such as the thing the player is walking up to interact with
    pub ignore: Option<ObstacleId>,
}

impl CollisionSubject {
    pub fn new(id: ActorId, role: ActorRole, shape: CollisionShape) -> Self {
        Self {
            id,
            role,
            shape,
            ignore: None,
        }
    }

    pub fn ignoring(mut self, ignore: Option<ObstacleId>) -> Self {
        self.ignore = ignore;
        self
    }
}

/// Core trait for anything an actor can bump into
pub trait Obstacle: Send + Sync {
    fn obstacle_id(&self) -> ObstacleId;

    fn category(&self) -> ObstacleCategory;

    /// Get the obstacle's hit shape
    fn collision_shape(&self) -> &CollisionShape;

    /// Get the world position the hit shape is centered on
    fn world_position(&self) -> Vec2;

    /// Whether this obstacle is invisible to `subject`
    fn excluded_for(&self, _subject: &CollisionSubject) -> bool {
        false
    }

    /// Overlap of `shape` placed at `at` against this obstacle
    fn overlap(&self, shape: &CollisionShape, at: Vec2) -> Option<OverlapInfo> {
        let obstacle = self.obstacle_id();
        shape
            .overlap(at, self.collision_shape(), self.world_position())
            .map(|o| OverlapInfo {
                axis: o.axis,
                distance: o.distance,
                contact: ContactId {
                    obstacle,
                    feature: o.feature,
                },
            })
    }
}

/// Type-erased obstacle for collections
pub type BoxedObstacle = Box<dyn Obstacle>;

/// Scene rectangle; shapes must stay fully inside it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneBounds {
    pub min: Vec2,
    pub max: Vec2,
}

static NO_SHAPE: CollisionShape = CollisionShape::None;

impl SceneBounds {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self {
            min: min.min(max),
            max: min.max(max),
        }
    }

    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
    }
}

impl Obstacle for SceneBounds {
    fn obstacle_id(&self) -> ObstacleId {
        ObstacleId::Bounds
    }

    fn category(&self) -> ObstacleCategory {
        ObstacleCategory::Bounds
    }

    fn collision_shape(&self) -> &CollisionShape {
        &NO_SHAPE
    }

    fn world_position(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    /// Deepest side the shape pokes through, pushing back inward
    fn overlap(&self, shape: &CollisionShape, at: Vec2) -> Option<OverlapInfo> {
        let (lo, hi) = shape.approximate_bounds(at);
        let sides = [
            (self.min.x - lo.x, Vec2::X),
            (hi.x - self.max.x, Vec2::NEG_X),
            (self.min.y - lo.y, Vec2::Y),
            (hi.y - self.max.y, Vec2::NEG_Y),
        ];
        sides
            .iter()
            .enumerate()
            .filter(|(_, (depth, _))| *depth > SEPARATION_EPSILON)
            .max_by(|(_, (a, _)), (_, (b, _))| a.total_cmp(b))
            .map(|(feature, (depth, axis))| OverlapInfo {
                axis: *axis,
                distance: *depth,
                contact: ContactId {
                    obstacle: ObstacleId::Bounds,
                    feature: feature as u16,
                },
            })
    }
}
