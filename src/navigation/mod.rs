//! The navigator: one entry point for move requests, the per-tick update, and queries

use crate::components::{Actor, ActorId, ActorRole, Facing, MoveState};
use crate::game_logic::errors::{NavError, NavResult};
use crate::game_logic::movement::validate_target;
use crate::map::SceneDefinition;
use crate::pathfinding::obstacles::{
    CollisionSubject, EntityObstacle, EnvironmentObstacle, ObstacleId, ObstacleManager, SceneBounds,
};
use crate::resources::NavigationSettings;
use bevy::prelude::*;
use std::collections::{BTreeMap, VecDeque};
use std::time::Duration;

pub mod coordinator;
pub mod integrator;
pub mod state;

pub use coordinator::{PathCoordinator, PlanRequest};
pub use state::{CommitResult, MovementEntry, PlanOutcome, SharedMovementState};

/// An actor plus what the navigator tracks about it between ticks
#[derive(Debug, Clone)]
struct ActorRecord {
    actor: Actor,
    /// Most recent non-zero steering vector
    facing: Vec2,
}

/// Pointer-held movement for the player
#[derive(Debug, Clone, Copy, PartialEq)]
struct DragState {
    point: Vec2,
    state: MoveState,
}

/// Owns the scene's collision world and every actor's movement.
///
/// Requests dispatch planning (inline or on a worker), `advance` applies finished plans
/// and moves everyone one tick.
#[derive(Resource)]
pub struct Navigator {
    settings: NavigationSettings,
    world: ObstacleManager,
    actors: BTreeMap<ActorId, ActorRecord>,
    player: Option<ActorId>,
    companion: Option<ActorId>,
    movement: SharedMovementState,
    coordinator: PathCoordinator,
    drag: Option<DragState>,
    interaction_target: Option<ObstacleId>,
    companion_engaged: bool,
    input_enabled: bool,
}

impl Navigator {
    pub fn new(bounds: SceneBounds, settings: NavigationSettings) -> Self {
        Self {
            settings,
            world: ObstacleManager::new(bounds),
            actors: BTreeMap::new(),
            player: None,
            companion: None,
            movement: SharedMovementState::new(),
            coordinator: PathCoordinator::new(),
            drag: None,
            interaction_target: None,
            companion_engaged: false,
            input_enabled: true,
        }
    }

    /// Build a navigator with the scene's scenery and actors
    pub fn from_scene(scene: &SceneDefinition, settings: NavigationSettings) -> NavResult<Self> {
        scene.check()?;
        let mut navigator = Self::new(scene.scene_bounds(), settings);
        navigator.world = scene.build_obstacles();
        for definition in &scene.actors {
            let actor = definition.to_actor(&navigator.settings);
            navigator.add_actor(actor)?;
        }
        info!(
            "Navigator ready for '{}' with {} actors",
            scene.name,
            navigator.actors.len()
        );
        Ok(navigator)
    }

    pub fn settings(&self) -> &NavigationSettings {
        &self.settings
    }

    pub fn world(&self) -> &ObstacleManager {
        &self.world
    }

    pub fn player(&self) -> Option<ActorId> {
        self.player
    }

    pub fn companion(&self) -> Option<ActorId> {
        self.companion
    }

    pub fn actor_ids(&self) -> impl Iterator<Item = ActorId> + '_ {
        self.actors.keys().copied()
    }

    pub fn add_scenery(&mut self, obstacle: EnvironmentObstacle) {
        self.world.add_scenery(obstacle);
    }

    pub fn add_actor(&mut self, actor: Actor) -> NavResult<()> {
        if self.actors.contains_key(&actor.id) {
            return Err(NavError::DuplicateActor { id: actor.id });
        }
        match actor.role {
            ActorRole::Player if self.player.is_some() => {
                return Err(NavError::InvalidSceneData {
                    reason: format!("Cannot add {}: a player is already registered", actor.id),
                });
            }
            ActorRole::Companion if self.companion.is_some() => {
                return Err(NavError::InvalidSceneData {
                    reason: format!("Cannot add {}: a companion is already registered", actor.id),
                });
            }
            ActorRole::Player => self.player = Some(actor.id),
            ActorRole::Companion => self.companion = Some(actor.id),
            ActorRole::Npc | ActorRole::Background => {}
        }

        self.world.add_actor(EntityObstacle::from(&actor));
        if actor.role.is_mobile() {
            self.movement.register(actor.id);
        }
        debug!("Added actor {} as {:?}", actor.id, actor.role);
        self.actors.insert(
            actor.id,
            ActorRecord {
                actor,
                facing: Facing::default().unit_vector(),
            },
        );
        Ok(())
    }

    pub fn remove_actor(&mut self, id: ActorId) -> NavResult<Actor> {
        let record = self
            .actors
            .remove(&id)
            .ok_or(NavError::UnknownActor { id })?;
        self.world.remove_actor(id);
        self.movement.unregister(id);
        if self.player == Some(id) {
            self.player = None;
            self.drag = None;
        }
        if self.companion == Some(id) {
            self.companion = None;
        }
        Ok(record.actor)
    }

    /// Replace the companion, or dismiss it with `None`
    pub fn set_companion(&mut self, companion: Option<Actor>) -> NavResult<()> {
        if let Some(previous) = self.companion {
            self.remove_actor(previous)?;
        }
        if let Some(mut actor) = companion {
            actor.role = ActorRole::Companion;
            self.add_actor(actor)?;
        }
        Ok(())
    }

    fn record(&self, id: ActorId) -> NavResult<&ActorRecord> {
        self.actors.get(&id).ok_or(NavError::UnknownActor { id })
    }

    fn record_mut(&mut self, id: ActorId) -> NavResult<&mut ActorRecord> {
        self.actors.get_mut(&id).ok_or(NavError::UnknownActor { id })
    }

    /// Collision subject for `id`; the player also ignores its interaction target
    fn subject_for(&self, record: &ActorRecord) -> CollisionSubject {
        let ignore = if Some(record.actor.id) == self.player {
            self.interaction_target
        } else {
            None
        };
        CollisionSubject::new(record.actor.id, record.actor.role, record.actor.shape.clone())
            .ignoring(ignore)
    }

    /// Ask an actor to move to `goal` (anchor space).
    ///
    /// With `run_async` the plan is computed on a worker and applied on a later
    /// `advance`; otherwise it is applied before returning. Unreachable or blocked goals
    /// are not errors; the actor goes as close as it can, or stays put.
    pub fn request_move(
        &mut self,
        id: ActorId,
        goal: Vec2,
        state_if_moving: MoveState,
        run_async: bool,
    ) -> NavResult<()> {
        let record = self.record(id)?;
        if !record.actor.role.is_mobile() {
            warn!("Ignoring move request for stationary actor {id}");
            return Ok(());
        }
        if !validate_target(goal) {
            warn!("Ignoring move request for {id} to invalid point {goal:?}");
            return Ok(());
        }

        let is_player = Some(id) == self.player;
        let sequence = self.movement.begin_request(is_player);
        let request = PlanRequest {
            actor: id,
            subject: self.subject_for(record),
            start: record.actor.anchor(),
            goal,
            state_if_moving,
            sequence,
        };
        if is_player {
            self.drag = None;
        }

        let inline = if run_async {
            self.coordinator
                .dispatch(request, &self.world, &self.settings)
        } else {
            Some(request.run(&self.world, &self.settings))
        };
        if let Some(outcome) = inline {
            self.commit(&outcome);
        }
        Ok(())
    }

    /// Keyboard-style nudge: a short inline move in `direction`
    pub fn request_direction(&mut self, id: ActorId, direction: Vec2, state: MoveState) -> NavResult<()> {
        let anchor = self.record(id)?.actor.anchor();
        let direction = direction.normalize_or_zero();
        if direction == Vec2::ZERO {
            return Ok(());
        }
        let goal = anchor + direction * self.settings.keyboard_step;
        self.request_move(id, goal, state, false)
    }

    /// Start steering the player straight at a held pointer, bypassing planning
    pub fn begin_drag(&mut self, point: Vec2, state: MoveState) -> NavResult<()> {
        let player = self.player.ok_or(NavError::InvalidSceneData {
            reason: "No player to drag".to_string(),
        })?;
        self.movement.enter_direct_mode(player, state);
        self.drag = Some(DragState { point, state });
        debug!("Direct drag started toward ({:.1}, {:.1})", point.x, point.y);
        Ok(())
    }

    /// Move the held pointer; ignored when no drag is active
    pub fn drag_to(&mut self, point: Vec2) {
        let (Some(drag), Some(player)) = (self.drag.as_mut(), self.player) else {
            return;
        };
        drag.point = point;
        self.movement.set_state(player, drag.state);
    }

    pub fn end_drag(&mut self) {
        if self.drag.take().is_none() {
            return;
        }
        if let Some(player) = self.player {
            self.movement.leave_direct_mode(player);
        }
        debug!("Direct drag ended");
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// Apply every plan that has finished so far
    pub fn collect_plans(&mut self) -> usize {
        let outcomes = self.coordinator.drain();
        outcomes.iter().filter(|o| self.commit(o)).count()
    }

    /// Wait for all in-flight plans and apply them.
    ///
    /// Returns false if some workers had not reported by `timeout`.
    pub fn settle(&mut self, timeout: Duration) -> bool {
        let outcomes = self.coordinator.wait_all(timeout);
        for outcome in &outcomes {
            self.commit(outcome);
        }
        self.coordinator.in_flight() == 0
    }

    pub fn plans_in_flight(&self) -> usize {
        self.coordinator.in_flight()
    }

    fn commit(&self, outcome: &PlanOutcome) -> bool {
        let is_player = Some(outcome.actor) == self.player;
        let result = self
            .movement
            .commit(outcome, is_player, self.settings.arrival_epsilon);
        match result {
            CommitResult::Applied => debug!(
                "Committed plan #{} for {} ({} waypoints)",
                outcome.sequence,
                outcome.actor,
                outcome.path.len()
            ),
            CommitResult::Empty => info!(
                "No route for {} from ({:.1}, {:.1}); staying put",
                outcome.actor, outcome.start.x, outcome.start.y
            ),
            other => debug!(
                "Discarded plan #{} for {}: {:?}",
                outcome.sequence, outcome.actor, other
            ),
        }
        result == CommitResult::Applied
    }

    pub fn position(&self, id: ActorId) -> NavResult<Vec2> {
        Ok(self.record(id)?.actor.position)
    }

    pub fn anchor(&self, id: ActorId) -> NavResult<Vec2> {
        Ok(self.record(id)?.actor.anchor())
    }

    pub fn state(&self, id: ActorId) -> NavResult<MoveState> {
        self.record(id)?;
        Ok(self.movement.state(id).unwrap_or_default())
    }

    pub fn facing_vector(&self, id: ActorId) -> NavResult<Vec2> {
        Ok(self.record(id)?.facing)
    }

    pub fn facing(&self, id: ActorId) -> NavResult<Facing> {
        Ok(Facing::from_vector(self.facing_vector(id)?).unwrap_or_default())
    }

    pub fn target(&self, id: ActorId) -> NavResult<Option<Vec2>> {
        self.record(id)?;
        Ok(self.movement.entry(id).and_then(|e| e.target))
    }

    pub fn queue(&self, id: ActorId) -> NavResult<VecDeque<Vec2>> {
        self.record(id)?;
        Ok(self.movement.entry(id).map(|e| e.queue).unwrap_or_default())
    }

    /// Place an actor directly (scene changes, save files); any movement stops
    pub fn set_position(&mut self, id: ActorId, position: Vec2) -> NavResult<()> {
        let record = self.record_mut(id)?;
        record.actor.position = position;
        let anchor = record.actor.anchor();
        self.world.set_actor_anchor(id, anchor);
        self.movement.halt(id);
        Ok(())
    }

    /// Obstacle the player is walking up to; planning will not route around it
    pub fn set_interaction_target(&mut self, target: Option<ObstacleId>) {
        self.interaction_target = target;
    }

    pub fn set_companion_engaged(&mut self, engaged: bool) {
        self.companion_engaged = engaged;
    }

    pub fn set_input_enabled(&mut self, enabled: bool) {
        self.input_enabled = enabled;
    }
}
