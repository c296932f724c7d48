use crate::components::{Actor, ActorId, ActorRole, SpeedTable};
use crate::config::range_types::MovementSpeed;
use crate::game_logic::errors::{NavError, NavResult};
use crate::pathfinding::obstacles::{CollisionShape, EnvironmentObstacle, ObstacleManager, SceneBounds};
use crate::resources::NavigationSettings;
use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use validator::Validate;

/// Scene geometry and the characters placed in it
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SceneDefinition {
    #[validate(length(min = 1, max = 128))]
    pub name: String,
    pub bounds: BoundsDefinition,
    #[validate(nested)]
    #[serde(default)]
    pub actors: Vec<ActorDefinition>,
    #[validate(nested)]
    #[serde(default)]
    pub scenery: Vec<SceneryObject>,
}

/// Walkable rectangle, in world units
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundsDefinition {
    pub min: [f32; 2],
    pub max: [f32; 2],
}

/// Hit shape as written in scene files
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ShapeDefinition {
    Circle { radius: f32 },
    Rectangle { half_extents: [f32; 2] },
    Polygon { points: Vec<[f32; 2]> },
    None,
}

/// Static scene geometry (walls, furniture, rugs, etc.)
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SceneryObject {
    #[validate(length(min = 1))]
    pub kind: String,
    pub position: [f32; 2],
    pub shape: ShapeDefinition,
    #[serde(default = "default_blocking")]
    pub blocking: bool,
}

fn default_blocking() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ActorDefinition {
    pub id: u32,
    pub role: ActorRole,
    pub position: [f32; 2],
    #[serde(default)]
    pub anchor_offset: [f32; 2],
    pub shape: ShapeDefinition,
    #[validate(range(min = 1.0, max = 2000.0))]
    pub walk_speed: Option<f32>,
    #[validate(range(min = 1.0, max = 2000.0))]
    pub run_speed: Option<f32>,
}

impl ShapeDefinition {
    pub fn to_collision_shape(&self) -> CollisionShape {
        match self {
            ShapeDefinition::Circle { radius } => CollisionShape::circle(*radius),
            ShapeDefinition::Rectangle { half_extents } => {
                CollisionShape::rectangle(half_extents[0], half_extents[1])
            }
            ShapeDefinition::Polygon { points } => CollisionShape::Polygon {
                points: points.iter().copied().map(Vec2::from).collect(),
            },
            ShapeDefinition::None => CollisionShape::None,
        }
    }

    fn problem(&self) -> Option<String> {
        match self {
            ShapeDefinition::Circle { radius } if *radius <= 0.0 => {
                Some(format!("circle radius {radius} must be positive"))
            }
            ShapeDefinition::Rectangle { half_extents } if half_extents.iter().any(|h| *h <= 0.0) => {
                Some(format!("rectangle half extents {half_extents:?} must be positive"))
            }
            ShapeDefinition::Polygon { points } if points.len() < 3 => {
                Some(format!("polygon needs at least 3 points, got {}", points.len()))
            }
            _ => None,
        }
    }
}

impl ActorDefinition {
    /// Build a runtime actor, falling back to the configured speeds
    pub fn to_actor(&self, settings: &NavigationSettings) -> Actor {
        let defaults = SpeedTable::from_settings(settings);
        let speeds = SpeedTable {
            walking: self.walk_speed.map(MovementSpeed::new).unwrap_or(defaults.walking),
            running: self.run_speed.map(MovementSpeed::new).unwrap_or(defaults.running),
        };
        Actor::new(
            ActorId(self.id),
            self.role,
            Vec2::from(self.position),
            self.shape.to_collision_shape(),
        )
        .with_anchor_offset(Vec2::from(self.anchor_offset))
        .with_speeds(speeds)
    }
}

impl SceneDefinition {
    /// Create a new scene definition with validation
    pub fn new(
        name: String,
        bounds: BoundsDefinition,
        actors: Vec<ActorDefinition>,
        scenery: Vec<SceneryObject>,
    ) -> NavResult<Self> {
        let scene = Self {
            name,
            bounds,
            actors,
            scenery,
        };
        scene.check()?;
        Ok(scene)
    }

    /// Get the scenes directory path
    pub fn get_scenes_dir() -> NavResult<PathBuf> {
        Ok(std::env::current_dir()?.join("scenes"))
    }

    /// Load a scene by file name from the scenes directory
    pub fn load_named<P: AsRef<Path>>(filename: P) -> NavResult<Self> {
        Self::load_from_file(Self::get_scenes_dir()?.join(filename))
    }

    /// Load and validate a scene from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> NavResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(NavError::SceneFileNotFound {
                path: path.to_path_buf(),
            });
        }

        let contents = std::fs::read_to_string(path)?;
        let scene: SceneDefinition =
            toml::from_str(&contents).map_err(|e| NavError::InvalidSceneData {
                reason: format!("Failed to parse scene {}: {e}", path.display()),
            })?;
        scene.check()?;

        info!(
            "Loaded scene '{}' ({} actors, {} scenery objects)",
            scene.name,
            scene.actors.len(),
            scene.scenery.len()
        );
        Ok(scene)
    }

    /// Validate and write the scene as TOML
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> NavResult<()> {
        self.check()?;

        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, toml::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Field ranges plus the cross-field rules `validator` cannot express
    pub fn check(&self) -> NavResult<()> {
        self.validate()
            .map_err(|validation_errors| NavError::SceneValidationFailed {
                reason: validation_errors.to_string(),
            })?;

        let invalid = |reason: String| Err(NavError::InvalidSceneData { reason });

        let [min_x, min_y] = self.bounds.min;
        let [max_x, max_y] = self.bounds.max;
        if min_x >= max_x || min_y >= max_y {
            return invalid(format!(
                "Scene bounds {:?}..{:?} are empty",
                self.bounds.min, self.bounds.max
            ));
        }

        let players = self.actors_with(ActorRole::Player).count();
        if players != 1 {
            return invalid(format!("Scene needs exactly one player, found {players}"));
        }
        let companions = self.actors_with(ActorRole::Companion).count();
        if companions > 1 {
            return invalid(format!("Scene allows at most one companion, found {companions}"));
        }

        let mut seen = HashSet::new();
        for actor in &self.actors {
            if !seen.insert(actor.id) {
                return invalid(format!("Duplicate actor id {}", ActorId(actor.id)));
            }
            if let Some(problem) = actor.shape.problem() {
                return invalid(format!("Actor {}: {problem}", ActorId(actor.id)));
            }
        }
        for object in &self.scenery {
            if let Some(problem) = object.shape.problem() {
                return invalid(format!("Scenery '{}': {problem}", object.kind));
            }
        }
        Ok(())
    }

    fn actors_with(&self, role: ActorRole) -> impl Iterator<Item = &ActorDefinition> {
        self.actors.iter().filter(move |a| a.role == role)
    }

    pub fn scene_bounds(&self) -> SceneBounds {
        SceneBounds::new(Vec2::from(self.bounds.min), Vec2::from(self.bounds.max))
    }

    /// Static obstacle set for this scene; actors are registered separately
    pub fn build_obstacles(&self) -> ObstacleManager {
        let mut world = ObstacleManager::new(self.scene_bounds());
        world.add_scenery_obstacles(
            self.scenery
                .iter()
                .enumerate()
                .map(|(id, object)| EnvironmentObstacle::from_object(id as u32, object)),
        );
        world
    }
}
