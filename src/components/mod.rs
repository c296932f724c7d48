use crate::config::range_types::MovementSpeed;
use crate::pathfinding::obstacles::CollisionShape;
use crate::resources::NavigationSettings;
use bevy::prelude::*;
use derive_more::{Display, From};
use serde::{Deserialize, Serialize};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, From, Serialize, Deserialize,
)]
#[display("#{_0}")]
pub struct ActorId(pub u32);

/// What part an actor plays in the scene
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActorRole {
    Player,
    Companion,
    /// Script-driven character that moves and collides
    Npc,
    /// Never moves; only blocks
    Background,
}

impl ActorRole {
    pub fn is_mobile(self) -> bool {
        !matches!(self, ActorRole::Background)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveState {
    #[default]
    Standing,
    Walking,
    Running,
}

impl MoveState {
    pub fn is_moving(self) -> bool {
        self != MoveState::Standing
    }
}

/// Four-way facing used by sprite animation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display)]
pub enum Facing {
    Up,
    #[default]
    Down,
    Left,
    Right,
}

impl Facing {
    /// Dominant axis of a steering vector; `None` for a zero vector.
    /// Screen convention: +y points down.
    pub fn from_vector(direction: Vec2) -> Option<Self> {
        if direction.length_squared() <= f32::EPSILON {
            return None;
        }
        if direction.x.abs() > direction.y.abs() {
            Some(if direction.x > 0.0 {
                Facing::Right
            } else {
                Facing::Left
            })
        } else if direction.y > 0.0 {
            Some(Facing::Down)
        } else {
            Some(Facing::Up)
        }
    }

    pub fn unit_vector(self) -> Vec2 {
        match self {
            Facing::Up => Vec2::NEG_Y,
            Facing::Down => Vec2::Y,
            Facing::Left => Vec2::NEG_X,
            Facing::Right => Vec2::X,
        }
    }
}

/// Movement speed by state
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpeedTable {
    pub walking: MovementSpeed,
    pub running: MovementSpeed,
}

impl SpeedTable {
    pub fn new(walking: f32, running: f32) -> Self {
        Self {
            walking: MovementSpeed::new(walking),
            running: MovementSpeed::new(running),
        }
    }

    pub fn from_settings(settings: &NavigationSettings) -> Self {
        Self {
            walking: settings.walk_speed,
            running: settings.run_speed,
        }
    }

    /// Units per second for a movement state
    pub fn speed(&self, state: MoveState) -> f32 {
        match state {
            MoveState::Standing => 0.0,
            MoveState::Walking => self.walking.get(),
            MoveState::Running => self.running.get(),
        }
    }
}

impl Default for SpeedTable {
    fn default() -> Self {
        Self::from_settings(&NavigationSettings::default())
    }
}

/// A character registered with the navigator
#[derive(Debug, Clone)]
pub struct Actor {
    pub id: ActorId,
    pub role: ActorRole,
    /// Drawn position, as seen by rendering and save files
    pub position: Vec2,
    /// Offset from `position` to the anchor used for distance and arrival math
    pub anchor_offset: Vec2,
    /// Hit shape, centered on the anchor
    pub shape: CollisionShape,
    pub speeds: SpeedTable,
}

impl Actor {
    pub fn new(id: ActorId, role: ActorRole, position: Vec2, shape: CollisionShape) -> Self {
        Self {
            id,
            role,
            position,
            anchor_offset: Vec2::ZERO,
            shape,
            speeds: SpeedTable::default(),
        }
    }

    pub fn player(id: ActorId, position: Vec2, shape: CollisionShape) -> Self {
        Self::new(id, ActorRole::Player, position, shape)
    }

    pub fn companion(id: ActorId, position: Vec2, shape: CollisionShape) -> Self {
        Self::new(id, ActorRole::Companion, position, shape)
    }

    pub fn npc(id: ActorId, position: Vec2, shape: CollisionShape) -> Self {
        Self::new(id, ActorRole::Npc, position, shape)
    }

    pub fn background(id: ActorId, position: Vec2, shape: CollisionShape) -> Self {
        Self::new(id, ActorRole::Background, position, shape)
    }

    pub fn with_anchor_offset(mut self, offset: Vec2) -> Self {
        self.anchor_offset = offset;
        self
    }

    pub fn with_speeds(mut self, speeds: SpeedTable) -> Self {
        self.speeds = speeds;
        self
    }

    pub fn anchor(&self) -> Vec2 {
        self.position + self.anchor_offset
    }
}
