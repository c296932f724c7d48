use bevy::prelude::*;
use fieldnav::navigation::Navigator;
use fieldnav::pathfinding::obstacles::{CollisionShape, EnvironmentObstacle};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;

/// Rocks never land closer than this to an actor's anchor
const ACTOR_CLEARANCE: f32 = 40.0;

/// Drop `count` random rocks into the scene, reproducibly for a given seed.
///
/// Returns how many were placed; spots too close to an actor are skipped.
pub fn scatter_rocks(navigator: &mut Navigator, count: usize, seed: u64) -> usize {
    let mut rng = Pcg64::seed_from_u64(seed);
    let bounds = *navigator.world().bounds();
    let anchors: Vec<Vec2> = navigator
        .actor_ids()
        .filter_map(|id| navigator.anchor(id).ok())
        .collect();
    let mut next_id = navigator.world().next_scenery_id();
    let mut placed = 0;

    for _ in 0..count {
        let center = Vec2::new(
            rng.gen_range(bounds.min.x..bounds.max.x),
            rng.gen_range(bounds.min.y..bounds.max.y),
        );
        let radius = rng.gen_range(6.0..20.0);
        if anchors
            .iter()
            .any(|anchor| anchor.distance(center) < ACTOR_CLEARANCE + radius)
        {
            continue;
        }
        navigator.add_scenery(EnvironmentObstacle::prop(
            next_id,
            center,
            CollisionShape::circle(radius),
        ));
        next_id += 1;
        placed += 1;
    }
    placed
}

#[cfg(test)]
mod tests {
    use super::*;
    use fieldnav::components::{Actor, ActorId, ActorRole};
    use fieldnav::pathfinding::obstacles::{CollisionSubject, SceneBounds};
    use fieldnav::resources::NavigationSettings;

    fn navigator() -> Navigator {
        let mut navigator = Navigator::new(
            SceneBounds::new(Vec2::splat(-300.0), Vec2::splat(300.0)),
            NavigationSettings::default(),
        );
        navigator
            .add_actor(Actor::player(ActorId(1), Vec2::ZERO, CollisionShape::circle(8.0)))
            .unwrap();
        navigator
    }

    #[test]
    fn test_scatter_is_reproducible() {
        let mut a = navigator();
        let mut b = navigator();
        assert_eq!(scatter_rocks(&mut a, 30, 11), scatter_rocks(&mut b, 30, 11));
        assert_eq!(a.world().obstacle_counts(), b.world().obstacle_counts());
    }

    #[test]
    fn test_scatter_keeps_actors_clear() {
        let mut navigator = navigator();
        let placed = scatter_rocks(&mut navigator, 50, 3);
        assert!(placed > 0);

        let player = CollisionSubject::new(ActorId(1), ActorRole::Player, CollisionShape::circle(8.0));
        assert!(!navigator.world().collides(&player, Vec2::ZERO));
    }
}
