//! Per-actor movement bookkeeping shared between request dispatch, commit, and the tick

use crate::components::{ActorId, MoveState};
use bevy::prelude::*;
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

/// Where an actor is headed and how
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MovementEntry {
    pub state: MoveState,
    pub target: Option<Vec2>,
    pub queue: VecDeque<Vec2>,
}

impl MovementEntry {
    fn halt(&mut self) {
        self.state = MoveState::Standing;
        self.target = None;
        self.queue.clear();
    }
}

/// A finished plan waiting to be applied
#[derive(Debug, Clone, PartialEq)]
pub struct PlanOutcome {
    pub actor: ActorId,
    pub sequence: u64,
    pub start: Vec2,
    pub path: Vec<Vec2>,
    pub state_if_moving: MoveState,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitResult {
    Applied,
    /// Nothing to do; the plan was empty
    Empty,
    /// A newer request was dispatched after this one
    Stale,
    /// The player is being dragged directly
    Vetoed,
    /// The actor left the scene while planning
    Unknown,
}

#[derive(Debug, Default)]
struct MovementTable {
    entries: HashMap<ActorId, MovementEntry>,
    direct_mode: bool,
    /// Player plans dispatched at or before this sequence lost to a drag
    drag_veto: u64,
    last_request: u64,
}

/// Movement table behind a single lock.
///
/// Every read-modify-write goes through one method call so dispatch, commit, and the tick
/// never interleave.
#[derive(Debug, Clone, Default)]
pub struct SharedMovementState {
    inner: Arc<Mutex<MovementTable>>,
}

impl SharedMovementState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, actor: ActorId) {
        self.inner.lock().entries.entry(actor).or_default();
    }

    pub fn unregister(&self, actor: ActorId) {
        self.inner.lock().entries.remove(&actor);
    }

    pub fn entry(&self, actor: ActorId) -> Option<MovementEntry> {
        self.inner.lock().entries.get(&actor).cloned()
    }

    pub fn state(&self, actor: ActorId) -> Option<MoveState> {
        self.inner.lock().entries.get(&actor).map(|e| e.state)
    }

    pub fn set_state(&self, actor: ActorId, state: MoveState) {
        if let Some(entry) = self.inner.lock().entries.get_mut(&actor) {
            entry.state = state;
        }
    }

    pub fn direct_mode(&self) -> bool {
        self.inner.lock().direct_mode
    }

    /// Start a new move request and return its sequence number.
    ///
    /// A player request also ends direct-drag mode.
    pub fn begin_request(&self, is_player: bool) -> u64 {
        let mut table = self.inner.lock();
        if is_player {
            table.direct_mode = false;
        }
        table.last_request += 1;
        table.last_request
    }

    /// Apply a finished plan if it is still the latest request and not vetoed.
    ///
    /// The actor starts moving in `state_if_moving` only when the first waypoint is more
    /// than `arrival_epsilon` from where planning started.
    pub fn commit(&self, outcome: &PlanOutcome, is_player: bool, arrival_epsilon: f32) -> CommitResult {
        let Some((&head, tail)) = outcome.path.split_first() else {
            return CommitResult::Empty;
        };

        let mut table = self.inner.lock();
        if is_player && (table.direct_mode || outcome.sequence <= table.drag_veto) {
            return CommitResult::Vetoed;
        }
        if outcome.sequence != table.last_request {
            return CommitResult::Stale;
        }
        let Some(entry) = table.entries.get_mut(&outcome.actor) else {
            return CommitResult::Unknown;
        };

        entry.target = Some(head);
        entry.queue = tail.iter().copied().collect();
        entry.state = if head.distance(outcome.start) > arrival_epsilon {
            outcome.state_if_moving
        } else {
            MoveState::Standing
        };
        CommitResult::Applied
    }

    /// Enter direct-drag mode: the player's plan is dropped and in-flight ones are vetoed
    pub fn enter_direct_mode(&self, player: ActorId, state: MoveState) {
        let mut table = self.inner.lock();
        table.direct_mode = true;
        table.drag_veto = table.last_request;
        if let Some(entry) = table.entries.get_mut(&player) {
            entry.halt();
            entry.state = state;
        }
    }

    pub fn leave_direct_mode(&self, player: ActorId) {
        let mut table = self.inner.lock();
        table.direct_mode = false;
        if let Some(entry) = table.entries.get_mut(&player) {
            entry.halt();
        }
    }

    /// Reached the current target: move on to the next waypoint, or stop.
    ///
    /// Returns the new target, if any.
    pub fn advance_queue(&self, actor: ActorId) -> Option<Vec2> {
        let mut table = self.inner.lock();
        let entry = table.entries.get_mut(&actor)?;
        entry.target = entry.queue.pop_front();
        if entry.target.is_none() {
            entry.state = MoveState::Standing;
        }
        entry.target
    }

    /// Stop and forget any plan
    pub fn halt(&self, actor: ActorId) {
        if let Some(entry) = self.inner.lock().entries.get_mut(&actor) {
            entry.halt();
        }
    }

    /// Forget the planned route but keep moving in `state`
    pub fn abandon_path(&self, actor: ActorId, state: MoveState) {
        if let Some(entry) = self.inner.lock().entries.get_mut(&actor) {
            entry.target = None;
            entry.queue.clear();
            entry.state = state;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PLAYER: ActorId = ActorId(1);
    const NPC: ActorId = ActorId(2);

    fn outcome(actor: ActorId, sequence: u64, path: Vec<Vec2>) -> PlanOutcome {
        PlanOutcome {
            actor,
            sequence,
            start: Vec2::ZERO,
            path,
            state_if_moving: MoveState::Walking,
        }
    }

    fn shared() -> SharedMovementState {
        let state = SharedMovementState::new();
        state.register(PLAYER);
        state.register(NPC);
        state
    }

    #[test]
    fn test_commit_sets_target_and_queue() {
        let state = shared();
        let seq = state.begin_request(false);
        let plan = outcome(NPC, seq, vec![Vec2::new(10.0, 0.0), Vec2::new(20.0, 5.0)]);

        assert_eq!(state.commit(&plan, false, 1.0), CommitResult::Applied);
        let entry = state.entry(NPC).unwrap();
        assert_eq!(entry.state, MoveState::Walking);
        assert_eq!(entry.target, Some(Vec2::new(10.0, 0.0)));
        assert_eq!(entry.queue, VecDeque::from([Vec2::new(20.0, 5.0)]));
    }

    #[test]
    fn test_commit_near_start_stands() {
        let state = shared();
        let seq = state.begin_request(false);
        let plan = outcome(NPC, seq, vec![Vec2::new(0.5, 0.0)]);

        assert_eq!(state.commit(&plan, false, 1.0), CommitResult::Applied);
        assert_eq!(state.state(NPC), Some(MoveState::Standing));
    }

    #[test]
    fn test_empty_plan_is_noop() {
        let state = shared();
        let seq = state.begin_request(false);
        assert_eq!(state.commit(&outcome(NPC, seq, vec![]), false, 1.0), CommitResult::Empty);
        assert_eq!(state.entry(NPC), Some(MovementEntry::default()));
    }

    #[test]
    fn test_only_latest_request_lands_in_any_order() {
        let first = Vec2::new(100.0, 0.0);
        let second = Vec2::new(-100.0, 0.0);

        for older_finishes_last in [false, true] {
            let state = shared();
            let a = outcome(NPC, state.begin_request(false), vec![first]);
            let b = outcome(NPC, state.begin_request(false), vec![second]);

            let order = if older_finishes_last { [&b, &a] } else { [&a, &b] };
            for plan in order {
                state.commit(plan, false, 1.0);
            }
            assert_eq!(state.entry(NPC).unwrap().target, Some(second));
        }
    }

    #[test]
    fn test_third_request_supersedes_both() {
        let state = shared();
        let a = outcome(NPC, state.begin_request(false), vec![Vec2::X * 50.0]);
        let b = outcome(NPC, state.begin_request(false), vec![Vec2::Y * 50.0]);
        let _third = state.begin_request(false);

        assert_eq!(state.commit(&b, false, 1.0), CommitResult::Stale);
        assert_eq!(state.commit(&a, false, 1.0), CommitResult::Stale);
        assert_eq!(state.entry(NPC).unwrap().target, None);
    }

    #[test]
    fn test_drag_vetoes_player_plans() {
        let state = shared();
        let pending = outcome(PLAYER, state.begin_request(true), vec![Vec2::X * 50.0]);
        state.enter_direct_mode(PLAYER, MoveState::Walking);

        assert_eq!(state.commit(&pending, true, 1.0), CommitResult::Vetoed);
        // Still vetoed after the drag ends without a new request
        state.leave_direct_mode(PLAYER);
        assert_eq!(state.commit(&pending, true, 1.0), CommitResult::Vetoed);
        assert_eq!(state.entry(PLAYER).unwrap().target, None);

        // A fresh player request is allowed through
        let fresh = outcome(PLAYER, state.begin_request(true), vec![Vec2::Y * 50.0]);
        assert_eq!(state.commit(&fresh, true, 1.0), CommitResult::Applied);
    }

    #[test]
    fn test_player_request_clears_direct_mode() {
        let state = shared();
        state.enter_direct_mode(PLAYER, MoveState::Walking);
        assert!(state.direct_mode());

        state.begin_request(false);
        assert!(state.direct_mode(), "other actors leave the drag alone");
        state.begin_request(true);
        assert!(!state.direct_mode());
    }

    #[test]
    fn test_advance_queue_until_empty() {
        let state = shared();
        let seq = state.begin_request(false);
        let plan = outcome(NPC, seq, vec![Vec2::new(10.0, 0.0), Vec2::new(20.0, 0.0)]);
        state.commit(&plan, false, 1.0);

        assert_eq!(state.advance_queue(NPC), Some(Vec2::new(20.0, 0.0)));
        assert_eq!(state.state(NPC), Some(MoveState::Walking));
        assert_eq!(state.advance_queue(NPC), None);
        assert_eq!(state.state(NPC), Some(MoveState::Standing));
    }

    #[test]
    fn test_commit_for_departed_actor() {
        let state = shared();
        let seq = state.begin_request(false);
        state.unregister(NPC);
        assert_eq!(
            state.commit(&outcome(NPC, seq, vec![Vec2::X]), false, 0.1),
            CommitResult::Unknown
        );
    }
}
