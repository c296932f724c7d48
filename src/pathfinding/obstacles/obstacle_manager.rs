//! Centralized obstacle set used by the planner, the escape search, and the integrator

use crate::components::{ActorId, ActorRole};
use crate::pathfinding::obstacles::*;
use bevy::prelude::*;
use std::sync::Arc;

/// Scene obstacles in collision-resolution order.
///
/// Cloning is cheap: scenery is shared, only the actor list is copied. Planning workers
/// take a clone as their snapshot of the world.
#[derive(Clone)]
pub struct ObstacleManager {
    bounds: SceneBounds,
    scenery: Arc<Vec<EnvironmentObstacle>>,
    actors: Vec<EntityObstacle>,
}

impl ObstacleManager {
    pub fn new(bounds: SceneBounds) -> Self {
        Self {
            bounds,
            scenery: Arc::new(Vec::new()),
            actors: Vec::new(),
        }
    }

    pub fn bounds(&self) -> &SceneBounds {
        &self.bounds
    }

    /// Add static scenery
    pub fn add_scenery(&mut self, obstacle: EnvironmentObstacle) {
        Arc::make_mut(&mut self.scenery).push(obstacle);
    }

    /// Add multiple scenery obstacles efficiently
    pub fn add_scenery_obstacles(&mut self, obstacles: impl IntoIterator<Item = EnvironmentObstacle>) {
        Arc::make_mut(&mut self.scenery).extend(obstacles);
    }

    pub fn next_scenery_id(&self) -> u32 {
        self.scenery.iter().map(|s| s.id + 1).max().unwrap_or(0)
    }

    pub fn add_actor(&mut self, obstacle: EntityObstacle) {
        self.actors.retain(|a| a.actor_id != obstacle.actor_id);
        self.actors.push(obstacle);
    }

    pub fn remove_actor(&mut self, id: ActorId) -> Option<EntityObstacle> {
        let index = self.actors.iter().position(|a| a.actor_id == id)?;
        Some(self.actors.remove(index))
    }

    pub fn actor(&self, id: ActorId) -> Option<&EntityObstacle> {
        self.actors.iter().find(|a| a.actor_id == id)
    }

    pub fn set_actor_anchor(&mut self, id: ActorId, anchor: Vec2) {
        if let Some(actor) = self.actors.iter_mut().find(|a| a.actor_id == id) {
            actor.anchor = anchor;
        }
    }

    /// Get count of obstacles by kind: (scenery, actors)
    pub fn obstacle_counts(&self) -> (usize, usize) {
        (self.scenery.len(), self.actors.len())
    }

    fn actors_with(&self, role: ActorRole) -> impl Iterator<Item = &dyn Obstacle> {
        self.actors
            .iter()
            .filter(move |a| a.role == role)
            .map(|a| a as &dyn Obstacle)
    }

    /// Every obstacle in fixed resolution order: bounds, player, other moving actors,
    /// scenery, background characters
    pub fn ordered(&self) -> impl Iterator<Item = &dyn Obstacle> {
        std::iter::once(&self.bounds as &dyn Obstacle)
            .chain(self.actors_with(ActorRole::Player))
            .chain(self.actors_with(ActorRole::Npc))
            .chain(self.actors_with(ActorRole::Companion))
            .chain(self.scenery.iter().map(|s| s as &dyn Obstacle))
            .chain(self.actors_with(ActorRole::Background))
    }

    /// Obstacles `subject` can actually hit, in resolution order
    pub fn blockers_for<'a>(
        &'a self,
        subject: &'a CollisionSubject,
    ) -> impl Iterator<Item = &'a dyn Obstacle> + 'a {
        self.ordered().filter(move |obstacle| {
            !obstacle.excluded_for(subject) && subject.ignore != Some(obstacle.obstacle_id())
        })
    }

    /// Check whether `subject` placed at `at` hits anything
    pub fn collides(&self, subject: &CollisionSubject, at: Vec2) -> bool {
        self.blockers_for(subject)
            .any(|obstacle| obstacle.overlap(&subject.shape, at).is_some())
    }

    /// All overlaps for `subject` placed at `at`, one per obstacle
    pub fn overlaps(&self, subject: &CollisionSubject, at: Vec2) -> Vec<OverlapInfo> {
        self.blockers_for(subject)
            .filter_map(|obstacle| obstacle.overlap(&subject.shape, at))
            .collect()
    }

    /// Push `subject` out of each obstacle in turn, one pass in resolution order.
    ///
    /// A later push can re-introduce an earlier overlap; that is left for the next tick.
    pub fn resolve(&self, subject: &CollisionSubject, at: Vec2) -> Vec2 {
        self.blockers_for(subject).fold(at, |position, obstacle| {
            match obstacle.overlap(&subject.shape, position) {
                Some(hit) => position + hit.push(),
                None => position,
            }
        })
    }

    pub fn in_bounds(&self, point: Vec2) -> bool {
        self.bounds.contains(point)
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    fn arena() -> ObstacleManager {
        ObstacleManager::new(SceneBounds::new(Vec2::ZERO, Vec2::new(200.0, 200.0)))
    }

    fn walker(id: u32, role: ActorRole) -> CollisionSubject {
        CollisionSubject::new(ActorId(id), role, CollisionShape::circle(5.0))
    }

    #[test]
    fn test_obstacle_manager_basic_operations() {
        let mut manager = arena();
        manager.add_scenery(EnvironmentObstacle::wall(
            0,
            Vec2::new(100.0, 100.0),
            CollisionShape::rectangle(10.0, 50.0),
        ));
        manager.add_actor(EntityObstacle::new(
            ActorId(1),
            ActorRole::Player,
            Vec2::new(20.0, 20.0),
            CollisionShape::circle(5.0),
        ));

        assert_eq!(manager.obstacle_counts(), (1, 1));
        assert_eq!(manager.next_scenery_id(), 1);

        // Re-adding replaces
        manager.add_actor(EntityObstacle::new(
            ActorId(1),
            ActorRole::Player,
            Vec2::new(30.0, 20.0),
            CollisionShape::circle(5.0),
        ));
        assert_eq!(manager.obstacle_counts(), (1, 1));
        assert_eq!(
            manager.actor(ActorId(1)).map(|a| a.anchor),
            Some(Vec2::new(30.0, 20.0))
        );

        assert!(manager.remove_actor(ActorId(1)).is_some());
        assert!(manager.remove_actor(ActorId(1)).is_none());
        assert_eq!(manager.obstacle_counts(), (1, 0));
    }

    #[test]
    fn test_resolution_order() {
        let mut manager = arena();
        manager.add_actor(EntityObstacle::new(
            ActorId(9),
            ActorRole::Background,
            Vec2::ZERO,
            CollisionShape::circle(1.0),
        ));
        manager.add_scenery(EnvironmentObstacle::prop(0, Vec2::ZERO, CollisionShape::circle(1.0)));
        manager.add_actor(EntityObstacle::new(
            ActorId(2),
            ActorRole::Npc,
            Vec2::ZERO,
            CollisionShape::circle(1.0),
        ));
        manager.add_actor(EntityObstacle::new(
            ActorId(1),
            ActorRole::Player,
            Vec2::ZERO,
            CollisionShape::circle(1.0),
        ));

        let categories: Vec<_> = manager.ordered().map(|o| o.category()).collect();
        let mut sorted = categories.clone();
        sorted.sort();
        assert_eq!(categories, sorted);
        assert_eq!(categories.first(), Some(&ObstacleCategory::Bounds));
        assert_eq!(categories.last(), Some(&ObstacleCategory::Background));
    }

    #[test]
    fn test_collides_respects_ignore_and_self() {
        let mut manager = arena();
        manager.add_scenery(EnvironmentObstacle::prop(
            7,
            Vec2::new(100.0, 100.0),
            CollisionShape::circle(10.0),
        ));
        manager.add_actor(EntityObstacle::new(
            ActorId(1),
            ActorRole::Player,
            Vec2::new(100.0, 100.0),
            CollisionShape::circle(5.0),
        ));

        let player = walker(1, ActorRole::Player);
        assert!(manager.collides(&player, Vec2::new(100.0, 112.0)));

        let approaching = walker(1, ActorRole::Player).ignoring(Some(ObstacleId::Scenery(7)));
        assert!(!manager.collides(&approaching, Vec2::new(100.0, 112.0)));

        // Companion hits the player standing there
        let companion = walker(2, ActorRole::Companion).ignoring(Some(ObstacleId::Scenery(7)));
        assert!(manager.collides(&companion, Vec2::new(100.0, 108.0)));
    }

    #[test]
    fn test_resolve_pushes_out_in_one_pass() {
        let mut manager = arena();
        manager.add_scenery(EnvironmentObstacle::wall(
            0,
            Vec2::new(100.0, 100.0),
            CollisionShape::rectangle(20.0, 20.0),
        ));

        let player = walker(1, ActorRole::Player);
        let resolved = manager.resolve(&player, Vec2::new(100.0, 77.0));
        assert!((resolved.y - 75.0).abs() < 1e-3);
        assert!(!manager.collides(&player, resolved));

        // Pushed back inside the scene bounds
        let resolved = manager.resolve(&player, Vec2::new(2.0, 50.0));
        assert!((resolved.x - 5.0).abs() < 1e-3);
    }

    #[test]
    fn test_overlaps_one_per_obstacle() {
        let mut manager = arena();
        manager.add_scenery_obstacles([
            EnvironmentObstacle::prop(0, Vec2::new(50.0, 50.0), CollisionShape::circle(6.0)),
            EnvironmentObstacle::prop(1, Vec2::new(60.0, 50.0), CollisionShape::circle(6.0)),
        ]);
        let player = walker(1, ActorRole::Player);
        let hits = manager.overlaps(&player, Vec2::new(55.0, 50.0));

        assert_eq!(hits.len(), 2);
        assert_ne!(hits[0].contact.obstacle, hits[1].contact.obstacle);
    }
}
