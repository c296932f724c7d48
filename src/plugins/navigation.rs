use crate::components::{ActorId, MoveState};
use crate::navigation::Navigator;
use bevy::prelude::*;

/// Drives a `Navigator` resource from the app schedule.
///
/// Input code sends `MoveCommand` / `DragCommand` events; the navigator is advanced once
/// per frame by the frame's `Time` delta.
pub struct NavigationPlugin;

impl Plugin for NavigationPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<MoveCommand>()
            .add_event::<DragCommand>()
            .add_systems(
                Update,
                (handle_move_commands, handle_drag_commands, advance_navigation)
                    .chain()
                    .run_if(resource_exists::<Navigator>),
            );
    }
}

/// Click-to-move (or script) request for one actor
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct MoveCommand {
    pub actor: ActorId,
    pub goal: Vec2,
    pub state: MoveState,
    pub run_async: bool,
}

/// Held-pointer steering for the player
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub enum DragCommand {
    Begin { point: Vec2, state: MoveState },
    MoveTo(Vec2),
    End,
}

fn handle_move_commands(mut navigator: ResMut<Navigator>, mut commands: EventReader<MoveCommand>) {
    for command in commands.read() {
        if let Err(err) =
            navigator.request_move(command.actor, command.goal, command.state, command.run_async)
        {
            warn!("Dropping move command: {err}");
        }
    }
}

fn handle_drag_commands(mut navigator: ResMut<Navigator>, mut commands: EventReader<DragCommand>) {
    for command in commands.read() {
        match *command {
            DragCommand::Begin { point, state } => {
                if let Err(err) = navigator.begin_drag(point, state) {
                    warn!("Cannot start drag: {err}");
                }
            }
            DragCommand::MoveTo(point) => navigator.drag_to(point),
            DragCommand::End => navigator.end_drag(),
        }
    }
}

fn advance_navigation(mut navigator: ResMut<Navigator>, time: Res<Time>) {
    navigator.advance(time.delta_secs() * 1000.0);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::Actor;
    use crate::pathfinding::obstacles::{CollisionShape, SceneBounds};
    use crate::resources::NavigationSettings;
    use std::time::Duration;

    const PLAYER: ActorId = ActorId(1);

    fn test_app() -> App {
        let mut navigator = Navigator::new(
            SceneBounds::new(Vec2::splat(-400.0), Vec2::splat(400.0)),
            NavigationSettings::default(),
        );
        navigator
            .add_actor(Actor::player(PLAYER, Vec2::ZERO, CollisionShape::circle(8.0)))
            .unwrap();

        let mut app = App::new();
        app.init_resource::<Time>()
            .insert_resource(navigator)
            .add_plugins(NavigationPlugin);
        app
    }

    fn tick(app: &mut App, frames: usize) {
        for _ in 0..frames {
            app.world_mut()
                .resource_mut::<Time>()
                .advance_by(Duration::from_millis(20));
            app.update();
        }
    }

    fn player_position(app: &App) -> Vec2 {
        app.world().resource::<Navigator>().position(PLAYER).unwrap()
    }

    #[test]
    fn test_move_command_drives_player() {
        let mut app = test_app();
        app.world_mut().send_event(MoveCommand {
            actor: PLAYER,
            goal: Vec2::new(100.0, 0.0),
            state: MoveState::Running,
            run_async: false,
        });

        tick(&mut app, 60);

        assert_eq!(player_position(&app), Vec2::new(100.0, 0.0));
        let navigator = app.world().resource::<Navigator>();
        assert_eq!(navigator.state(PLAYER).unwrap(), MoveState::Standing);
    }

    #[test]
    fn test_unknown_actor_command_is_dropped() {
        let mut app = test_app();
        app.world_mut().send_event(MoveCommand {
            actor: ActorId(99),
            goal: Vec2::new(100.0, 0.0),
            state: MoveState::Walking,
            run_async: false,
        });

        tick(&mut app, 5);
        assert_eq!(player_position(&app), Vec2::ZERO);
    }

    #[test]
    fn test_drag_commands() {
        let mut app = test_app();
        app.world_mut().send_event(DragCommand::Begin {
            point: Vec2::new(0.0, 50.0),
            state: MoveState::Walking,
        });
        tick(&mut app, 40);
        assert_eq!(player_position(&app), Vec2::new(0.0, 50.0));

        app.world_mut().send_event(DragCommand::End);
        tick(&mut app, 1);
        assert!(!app.world().resource::<Navigator>().is_dragging());
    }

    #[test]
    fn test_systems_wait_for_navigator() {
        let mut app = App::new();
        app.init_resource::<Time>().add_plugins(NavigationPlugin);
        app.world_mut().send_event(DragCommand::End);
        tick(&mut app, 2);
        assert!(app.world().get_resource::<Navigator>().is_none());
    }
}
