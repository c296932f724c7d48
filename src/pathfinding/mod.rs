use crate::pathfinding::obstacles::{CollisionSubject, ObstacleManager};
use crate::resources::NavigationSettings;
use bevy::prelude::*;
use pathfinding::prelude::astar;
use std::cell::Cell;

pub mod escape;
pub mod obstacles;
pub mod simplify;

pub use escape::nearest_free_position;
pub use obstacles::*;
pub use simplify::{segment_is_clear, simplify_path};

/// Fixed-point scale for A* costs (1/100 of a world unit)
const COST_SCALE: f32 = 100.0;

/// The eight lattice directions
const NEIGHBOR_OFFSETS: [(i32, i32); 8] = [
    (1, 0),
    (-1, 0),
    (0, 1),
    (0, -1),
    (1, 1),
    (1, -1),
    (-1, 1),
    (-1, -1),
];

/// Everything a planning call needs to know about the world and the mover
#[derive(Clone, Copy)]
pub struct PathQuery<'a> {
    pub world: &'a ObstacleManager,
    pub subject: &'a CollisionSubject,
    pub settings: &'a NavigationSettings,
}

impl<'a> PathQuery<'a> {
    pub fn new(
        world: &'a ObstacleManager,
        subject: &'a CollisionSubject,
        settings: &'a NavigationSettings,
    ) -> Self {
        Self {
            world,
            subject,
            settings,
        }
    }

    pub fn collides(&self, at: Vec2) -> bool {
        self.world.collides(self.subject, at)
    }
}

/// A search node: whole tile offsets from the start point, or the exact goal.
///
/// Integer identity keeps the open and closed sets exact no matter which predecessor a
/// position was reached from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LatticeNode {
    Cell { x: i32, y: i32 },
    Goal,
}

impl LatticeNode {
    pub const ORIGIN: LatticeNode = LatticeNode::Cell { x: 0, y: 0 };
}

/// Lattice anchored at the start point
struct Lattice {
    start: Vec2,
    goal: Vec2,
    tile: f32,
}

impl Lattice {
    fn point(&self, node: LatticeNode) -> Vec2 {
        match node {
            LatticeNode::Cell { x, y } => self.start + Vec2::new(x as f32, y as f32) * self.tile,
            LatticeNode::Goal => self.goal,
        }
    }

    fn in_goal_tile(&self, point: Vec2) -> bool {
        (point - self.goal).abs().max_element() <= self.tile * 0.5
    }

    fn step_cost(from: Vec2, to: Vec2) -> u32 {
        (from.distance(to) * COST_SCALE).ceil() as u32
    }

    fn heuristic(from: Vec2, to: Vec2) -> u32 {
        (from.distance(to) * COST_SCALE).floor() as u32
    }

    /// Collision-free successors, with near-goal neighbors snapped onto the goal
    fn neighbors(&self, node: LatticeNode, query: &PathQuery) -> Vec<(LatticeNode, u32)> {
        let LatticeNode::Cell { x, y } = node else {
            return Vec::new();
        };
        let here = self.point(node);
        let mut successors = Vec::with_capacity(NEIGHBOR_OFFSETS.len() + 1);

        if self.in_goal_tile(here) && !query.collides(self.goal) {
            successors.push((LatticeNode::Goal, Self::step_cost(here, self.goal)));
        }

        for (dx, dy) in NEIGHBOR_OFFSETS {
            let candidate = LatticeNode::Cell {
                x: x + dx,
                y: y + dy,
            };
            let mut point = self.point(candidate);
            let mut next = candidate;
            if point.distance(self.goal) < self.tile * 0.5 {
                next = LatticeNode::Goal;
                point = self.goal;
            }
            if query.collides(point) {
                continue;
            }
            successors.push((next, Self::step_cost(here, point)));
        }
        successors
    }
}

/// Result of one budgeted lattice search
struct SearchOutcome {
    nodes: Option<Vec<LatticeNode>>,
    expanded: usize,
    /// Expanded node nearest the target, with its distance
    closest: (LatticeNode, f32),
}

/// Budgeted A* from the lattice origin to `target`.
///
/// Once more than `budget` nodes have been expanded, further expansions yield no successors,
/// which drains the open set and ends the search without a path.
fn search(lattice: &Lattice, query: &PathQuery, target: LatticeNode, budget: usize) -> SearchOutcome {
    let target_point = lattice.point(target);
    let expanded = Cell::new(0usize);
    let closest = Cell::new((
        LatticeNode::ORIGIN,
        lattice.point(LatticeNode::ORIGIN).distance(target_point),
    ));

    let result = astar(
        &LatticeNode::ORIGIN,
        |node| {
            let distance = lattice.point(*node).distance(target_point);
            if distance < closest.get().1 {
                closest.set((*node, distance));
            }
            expanded.set(expanded.get() + 1);
            if expanded.get() > budget {
                return Vec::new();
            }
            lattice.neighbors(*node, query)
        },
        |node| Lattice::heuristic(lattice.point(*node), target_point),
        |node| *node == target,
    );

    SearchOutcome {
        nodes: result.map(|(nodes, _cost)| nodes),
        expanded: expanded.get(),
        closest: closest.get(),
    }
}

/// A* from `start` toward `goal` over a lattice generated on demand.
///
/// Returns the waypoints after `start`, ending at `goal`. When the goal cannot be reached
/// (the frontier empties or the expansion budget runs out), the path instead ends at the
/// explored node closest to the goal. Returns an empty path when `start == goal`, when
/// no explored node improves on `start`, or when the route to that node also exceeds the
/// budget.
pub fn find_path(query: &PathQuery, start: Vec2, goal: Vec2) -> Vec<Vec2> {
    if start.distance_squared(goal) <= f32::EPSILON {
        return Vec::new();
    }

    let lattice = Lattice {
        start,
        goal,
        tile: query.settings.tile_size.get(),
    };
    let budget = query.settings.max_search_nodes;
    let outcome = search(&lattice, query, LatticeNode::Goal, budget);

    let nodes = match outcome.nodes {
        Some(nodes) => nodes,
        None => {
            let (fallback, distance) = outcome.closest;
            if fallback == LatticeNode::ORIGIN {
                debug!(
                    "No progress possible from ({:.1}, {:.1}) toward ({:.1}, {:.1})",
                    start.x, start.y, goal.x, goal.y
                );
                return Vec::new();
            }
            let target = lattice.point(fallback);
            debug!(
                "Goal ({:.1}, {:.1}) unreachable after {} expansions; settling {:.1} short at ({:.1}, {:.1})",
                goal.x,
                goal.y,
                outcome.expanded,
                distance,
                target.x,
                target.y
            );
            let Some(nodes) = search(&lattice, query, fallback, budget).nodes else {
                debug!("Route to ({:.1}, {:.1}) exceeded the search budget", target.x, target.y);
                return Vec::new();
            };
            nodes
        }
    };

    let path: Vec<Vec2> = nodes
        .into_iter()
        .skip(1)
        .map(|node| lattice.point(node))
        .collect();
    debug!(
        "Planned {} lattice waypoints from ({:.1}, {:.1}) after {} expansions",
        path.len(),
        start.x,
        start.y,
        outcome.expanded
    );
    path
}

/// Full planning pipeline for one request: relocate a blocked goal, search, then shorten.
///
/// The goal relocation does not honor the subject's ignored obstacle, so a click on the
/// thing being approached resolves to a spot beside it.
pub fn plan_route(query: &PathQuery, start: Vec2, goal: Vec2) -> Vec<Vec2> {
    let strict_subject = query.subject.clone().ignoring(None);
    let strict = PathQuery::new(query.world, &strict_subject, query.settings);
    let free_goal = nearest_free_position(&strict, goal, start);
    let raw = find_path(query, start, free_goal);
    simplify_path(query, start, raw)
}
