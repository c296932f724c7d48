//! Relocation of blocked goal points to the nearest free spot

use crate::pathfinding::PathQuery;
use crate::pathfinding::obstacles::ContactId;
use bevy::prelude::*;

/// Upper bound on overlap queries per search, independent of depth
const MAX_ESCAPE_VISITS: usize = 4096;

struct EscapeSearch<'q, 'a> {
    query: &'q PathQuery<'a>,
    max_depth: u32,
    visits: usize,
    used: Vec<ContactId>,
    candidates: Vec<Vec2>,
}

impl EscapeSearch<'_, '_> {
    fn visit(&mut self, point: Vec2, depth: u32) {
        self.visits += 1;
        let overlaps = self.query.world.overlaps(self.query.subject, point);
        if overlaps.is_empty() {
            self.candidates.push(point);
            return;
        }
        if depth >= self.max_depth {
            return;
        }

        for hit in overlaps {
            if self.visits >= MAX_ESCAPE_VISITS {
                return;
            }
            // A contact already pushed out of on this branch would only cycle
            if self.used.contains(&hit.contact) {
                continue;
            }
            let next = point + hit.push();
            if !self.query.world.in_bounds(next) {
                continue;
            }
            self.used.push(hit.contact);
            self.visit(next, depth + 1);
            self.used.pop();
        }
    }
}

/// Nearest collision-free point to `desired`, found by following push-out vectors.
///
/// A free `desired` is returned unchanged. Each branch of the search pushes out of one
/// overlapping contact at a time and never reuses a contact it already escaped. When no
/// branch reaches a free point, `current` (the actor's own anchor) is returned.
pub fn nearest_free_position(query: &PathQuery, desired: Vec2, current: Vec2) -> Vec2 {
    if !query.collides(desired) {
        return desired;
    }

    let mut search = EscapeSearch {
        query,
        max_depth: query.settings.max_escape_depth,
        visits: 0,
        used: Vec::new(),
        candidates: Vec::new(),
    };
    search.visit(desired, 0);

    let best = search.candidates.iter().copied().min_by(|a, b| {
        a.distance_squared(desired)
            .total_cmp(&b.distance_squared(desired))
    });
    match best {
        Some(point) => {
            debug!(
                "Relocated blocked point ({:.1}, {:.1}) to ({:.1}, {:.1}) from {} candidates",
                desired.x,
                desired.y,
                point.x,
                point.y,
                search.candidates.len()
            );
            point
        }
        None => {
            info!(
                "No free point near ({:.1}, {:.1}); staying at ({:.1}, {:.1})",
                desired.x, desired.y, current.x, current.y
            );
            current
        }
    }
}
