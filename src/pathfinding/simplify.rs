//! Line-of-sight waypoint removal

use crate::pathfinding::PathQuery;
use bevy::prelude::*;

/// Check that the straight segment `from -> to` stays clear, sampling every `sample_step`.
///
/// `from` itself is not sampled; it is always a point the actor already occupies or
/// passes through.
pub fn segment_is_clear(query: &PathQuery, from: Vec2, to: Vec2) -> bool {
    let step = query.settings.sample_step.get();
    let samples = (from.distance(to) / step).ceil().max(1.0) as usize;
    (1..=samples).all(|i| !query.collides(from.lerp(to, i as f32 / samples as f32)))
}

/// Remove waypoints that a straight walk can skip.
///
/// Each pass walks the path and drops any middle point whose neighbors can see each
/// other; passes repeat until one removes nothing. The final waypoint is never removed.
pub fn simplify_path(query: &PathQuery, start: Vec2, waypoints: Vec<Vec2>) -> Vec<Vec2> {
    let Some(&goal) = waypoints.last() else {
        return waypoints;
    };
    let original = waypoints.len();

    let mut points = Vec::with_capacity(waypoints.len() + 1);
    points.push(start);
    points.extend(waypoints);

    let mut passes = 0;
    loop {
        passes += 1;
        let mut removed = false;
        let mut i = 1;
        while i + 1 < points.len() {
            if segment_is_clear(query, points[i - 1], points[i + 1]) {
                points.remove(i);
                removed = true;
            } else {
                i += 1;
            }
        }
        if !removed {
            break;
        }
    }

    points.remove(0);
    debug_assert_eq!(points.last(), Some(&goal));
    debug!(
        "Simplified {} waypoints to {} in {} passes",
        original,
        points.len(),
        passes
    );
    points
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{ActorId, ActorRole};
    use crate::pathfinding::{find_path, obstacles::*};
    use crate::resources::NavigationSettings;
    use rand::{Rng, SeedableRng};
    use rand_pcg::Pcg64;

    fn subject() -> CollisionSubject {
        CollisionSubject::new(ActorId(1), ActorRole::Player, CollisionShape::circle(6.0))
    }

    fn field(half: f32) -> ObstacleManager {
        ObstacleManager::new(SceneBounds::new(Vec2::splat(-half), Vec2::splat(half)))
    }

    #[test]
    fn test_empty_and_single_waypoint_untouched() {
        let world = field(500.0);
        let subject = subject();
        let settings = NavigationSettings::default();
        let query = PathQuery::new(&world, &subject, &settings);

        assert!(simplify_path(&query, Vec2::ZERO, Vec::new()).is_empty());
        let single = vec![Vec2::new(40.0, 0.0)];
        assert_eq!(simplify_path(&query, Vec2::ZERO, single.clone()), single);
    }

    #[test]
    fn test_straight_line_collapses_to_goal() {
        let world = field(500.0);
        let subject = subject();
        let settings = NavigationSettings::default();
        let query = PathQuery::new(&world, &subject, &settings);

        let waypoints: Vec<Vec2> = (1..=10).map(|i| Vec2::new(i as f32 * 16.0, 0.0)).collect();
        assert_eq!(
            simplify_path(&query, Vec2::ZERO, waypoints),
            vec![Vec2::new(160.0, 0.0)]
        );
    }

    #[test]
    fn test_corner_is_kept() {
        let mut world = field(500.0);
        world.add_scenery(EnvironmentObstacle::wall(
            0,
            Vec2::new(50.0, 50.0),
            CollisionShape::rectangle(40.0, 40.0),
        ));
        let subject = subject();
        let settings = NavigationSettings::default();
        let query = PathQuery::new(&world, &subject, &settings);

        // L-shaped route around the block's lower-right corner
        let corner = Vec2::new(100.0, 0.0);
        let waypoints = vec![Vec2::new(50.0, 0.0), corner, Vec2::new(100.0, 50.0), Vec2::new(100.0, 100.0)];
        let simplified = simplify_path(&query, Vec2::ZERO, waypoints);

        assert!(simplified.contains(&corner));
        assert_eq!(simplified.last(), Some(&Vec2::new(100.0, 100.0)));
        assert_eq!(simplified.len(), 2);
    }

    #[test]
    fn test_segment_clear_detects_thin_wall() {
        let mut world = field(500.0);
        world.add_scenery(EnvironmentObstacle::wall(
            0,
            Vec2::new(50.0, 0.0),
            CollisionShape::rectangle(1.0, 50.0),
        ));
        let subject = subject();
        let settings = NavigationSettings::default();
        let query = PathQuery::new(&world, &subject, &settings);

        assert!(!segment_is_clear(&query, Vec2::ZERO, Vec2::new(100.0, 0.0)));
        assert!(segment_is_clear(&query, Vec2::new(0.0, 80.0), Vec2::new(100.0, 80.0)));
    }

    #[test]
    fn test_simplified_paths_stay_collision_free() {
        let mut rng = Pcg64::seed_from_u64(7);
        let settings = NavigationSettings::default();
        let subject = subject();

        for _ in 0..8 {
            let mut world = field(300.0);
            for id in 0..12 {
                let center = Vec2::new(rng.gen_range(-200.0..200.0), rng.gen_range(-200.0..200.0));
                if center.length() < 40.0 {
                    continue;
                }
                world.add_scenery(EnvironmentObstacle::prop(
                    id,
                    center,
                    CollisionShape::rectangle(rng.gen_range(5.0..25.0), rng.gen_range(5.0..25.0)),
                ));
            }
            let query = PathQuery::new(&world, &subject, &settings);
            let goal = Vec2::new(rng.gen_range(-250.0..250.0), rng.gen_range(-250.0..250.0));
            if query.collides(goal) {
                continue;
            }

            let raw = find_path(&query, Vec2::ZERO, goal);
            let simplified = simplify_path(&query, Vec2::ZERO, raw.clone());

            assert_eq!(simplified.last(), raw.last());
            assert!(simplified.len() <= raw.len());

            // Every segment is either a lattice step from the raw path or a checked shortcut
            let mut raw_edges = Vec::new();
            let mut from = Vec2::ZERO;
            for waypoint in &raw {
                raw_edges.push((from, *waypoint));
                from = *waypoint;
            }
            let mut from = Vec2::ZERO;
            for waypoint in &simplified {
                assert!(
                    raw_edges.contains(&(from, *waypoint))
                        || segment_is_clear(&query, from, *waypoint),
                    "segment {from:?} -> {waypoint:?} collides"
                );
                from = *waypoint;
            }
        }
    }
}
