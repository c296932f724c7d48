//! Background planning workers and the channel their results come back on

use crate::components::{ActorId, MoveState};
use crate::navigation::state::PlanOutcome;
use crate::pathfinding::obstacles::{CollisionSubject, ObstacleManager};
use crate::pathfinding::{PathQuery, plan_route};
use crate::resources::NavigationSettings;
use bevy::prelude::*;
use crossbeam_channel::{Receiver, Sender, unbounded};
use std::thread;
use std::time::{Duration, Instant};

/// Everything a worker needs to plan one move
#[derive(Debug, Clone)]
pub struct PlanRequest {
    pub actor: ActorId,
    pub subject: CollisionSubject,
    pub start: Vec2,
    pub goal: Vec2,
    pub state_if_moving: MoveState,
    pub sequence: u64,
}

impl PlanRequest {
    /// Relocate the goal, plan, and simplify against `world`
    pub fn run(&self, world: &ObstacleManager, settings: &NavigationSettings) -> PlanOutcome {
        let query = PathQuery::new(world, &self.subject, settings);
        let path = plan_route(&query, self.start, self.goal);
        PlanOutcome {
            actor: self.actor,
            sequence: self.sequence,
            start: self.start,
            path,
            state_if_moving: self.state_if_moving,
        }
    }
}

/// Fire-and-forget planning threads.
///
/// Workers never touch movement state; they send a `PlanOutcome` back and the simulation
/// thread decides whether it still applies.
pub struct PathCoordinator {
    sender: Sender<PlanOutcome>,
    receiver: Receiver<PlanOutcome>,
    in_flight: usize,
}

impl Default for PathCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl PathCoordinator {
    pub fn new() -> Self {
        let (sender, receiver) = unbounded();
        Self {
            sender,
            receiver,
            in_flight: 0,
        }
    }

    /// Workers dispatched whose results have not been collected yet
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Plan on a detached worker with its own snapshot of the world.
    ///
    /// When no thread can be spawned the plan runs inline and its outcome is returned
    /// for immediate commit.
    pub fn dispatch(
        &mut self,
        request: PlanRequest,
        world: &ObstacleManager,
        settings: &NavigationSettings,
    ) -> Option<PlanOutcome> {
        let snapshot = world.clone();
        let worker_settings = settings.clone();
        let sender = self.sender.clone();
        let job = request.clone();

        let spawned = thread::Builder::new()
            .name(format!("fieldnav-plan-{}", request.actor.0))
            .spawn(move || {
                let outcome = job.run(&snapshot, &worker_settings);
                // Receiver gone means the navigator was dropped; nobody is waiting
                let _ = sender.send(outcome);
            });

        match spawned {
            Ok(_) => {
                self.in_flight += 1;
                debug!(
                    "Dispatched plan #{} for actor {} ({} in flight)",
                    request.sequence, request.actor, self.in_flight
                );
                None
            }
            Err(err) => {
                warn!("Could not spawn planning worker ({err}); planning inline");
                Some(request.run(world, settings))
            }
        }
    }

    /// Results that have arrived so far, without blocking
    pub fn drain(&mut self) -> Vec<PlanOutcome> {
        let outcomes: Vec<PlanOutcome> = self.receiver.try_iter().collect();
        self.in_flight = self.in_flight.saturating_sub(outcomes.len());
        outcomes
    }

    /// Block until every dispatched worker has reported or `timeout` passes
    pub fn wait_all(&mut self, timeout: Duration) -> Vec<PlanOutcome> {
        let deadline = Instant::now() + timeout;
        let mut outcomes = Vec::new();
        while self.in_flight > 0 {
            match self.receiver.recv_deadline(deadline) {
                Ok(outcome) => {
                    self.in_flight -= 1;
                    outcomes.push(outcome);
                }
                Err(_) => {
                    warn!("{} planning workers still running after {timeout:?}", self.in_flight);
                    break;
                }
            }
        }
        outcomes
    }
}
