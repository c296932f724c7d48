pub mod components;
pub mod config;
pub mod game_logic;
pub mod map;
pub mod navigation;
pub mod pathfinding;
pub mod plugins;
pub mod resources;

// Selective re-exports for external consumers

// The navigator is the entry point for game code
pub use navigation::Navigator;
pub use plugins::{DragCommand, MoveCommand, NavigationPlugin};

pub use components::{Actor, ActorId, ActorRole, Facing, MoveState};
pub use game_logic::errors::{NavError, NavResult};
pub use map::SceneDefinition;
pub use resources::NavigationSettings;
