//! Geometric hit shapes and the separating-axis overlap test

use bevy::prelude::*;

/// Penetration at or below this depth counts as touching, not overlapping
pub const SEPARATION_EPSILON: f32 = 1e-3;

/// Convex hit shapes, positioned by a center point supplied at query time
#[derive(Debug, Clone, PartialEq)]
pub enum CollisionShape {
    Circle { radius: f32 },
    Rectangle { half_extents: Vec2 },
    /// Convex polygon, vertices relative to the center
    Polygon { points: Vec<Vec2> },
    None,
}

/// Minimum translation that separates one shape from another.
///
/// Moving the first shape by `axis * distance` removes this overlap. `feature` names the
/// separating axis that produced it (an edge index on the other shape, when it has edges).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Overlap {
    pub axis: Vec2,
    pub distance: f32,
    pub feature: u16,
}

/// World-space form of a shape for axis projection
enum Convex {
    Circle { center: Vec2, radius: f32 },
    Polygon { vertices: Vec<Vec2> },
}

impl Convex {
    fn project(&self, axis: Vec2) -> (f32, f32) {
        match self {
            Convex::Circle { center, radius } => {
                let c = center.dot(axis);
                (c - radius, c + radius)
            }
            Convex::Polygon { vertices } => vertices.iter().fold(
                (f32::INFINITY, f32::NEG_INFINITY),
                |(lo, hi), v| {
                    let p = v.dot(axis);
                    (lo.min(p), hi.max(p))
                },
            ),
        }
    }

    fn edge_normals(&self) -> Vec<Vec2> {
        let Convex::Polygon { vertices } = self else {
            return Vec::new();
        };
        let n = vertices.len();
        (0..n)
            .map(|i| {
                let edge = vertices[(i + 1) % n] - vertices[i];
                edge.perp().normalize_or_zero()
            })
            .collect()
    }

    /// Axis from the nearest vertex of `self` toward a circle center
    fn vertex_axis(&self, toward: Vec2) -> Option<Vec2> {
        let Convex::Polygon { vertices } = self else {
            return None;
        };
        let nearest = vertices.iter().min_by(|a, b| {
            a.distance_squared(toward)
                .total_cmp(&b.distance_squared(toward))
        })?;
        let axis = (toward - *nearest).normalize_or_zero();
        (axis != Vec2::ZERO).then_some(axis)
    }
}

impl CollisionShape {
    pub fn circle(radius: f32) -> Self {
        CollisionShape::Circle { radius }
    }

    pub fn rectangle(half_width: f32, half_height: f32) -> Self {
        CollisionShape::Rectangle {
            half_extents: Vec2::new(half_width, half_height),
        }
    }

    fn to_convex(&self, center: Vec2) -> Option<Convex> {
        match self {
            CollisionShape::Circle { radius } => Some(Convex::Circle {
                center,
                radius: *radius,
            }),
            CollisionShape::Rectangle { half_extents } => {
                let h = *half_extents;
                Some(Convex::Polygon {
                    vertices: vec![
                        center + Vec2::new(-h.x, -h.y),
                        center + Vec2::new(h.x, -h.y),
                        center + Vec2::new(h.x, h.y),
                        center + Vec2::new(-h.x, h.y),
                    ],
                })
            }
            CollisionShape::Polygon { points } if points.len() >= 3 => Some(Convex::Polygon {
                vertices: points.iter().map(|p| center + *p).collect(),
            }),
            CollisionShape::Polygon { .. } | CollisionShape::None => None,
        }
    }

    /// Axis-aligned bounds of the shape placed at `center`
    pub fn approximate_bounds(&self, center: Vec2) -> (Vec2, Vec2) {
        match self {
            CollisionShape::Circle { radius } => {
                let extent = Vec2::splat(*radius);
                (center - extent, center + extent)
            }
            CollisionShape::Rectangle { half_extents } => {
                (center - *half_extents, center + *half_extents)
            }
            CollisionShape::Polygon { points } if !points.is_empty() => {
                let (min, max) = points.iter().fold(
                    (Vec2::splat(f32::INFINITY), Vec2::splat(f32::NEG_INFINITY)),
                    |(min, max), p| (min.min(*p), max.max(*p)),
                );
                (center + min, center + max)
            }
            CollisionShape::Polygon { .. } | CollisionShape::None => (center, center),
        }
    }

    /// Horizontal half extent, used for follow distances
    pub fn half_width(&self) -> f32 {
        let (min, max) = self.approximate_bounds(Vec2::ZERO);
        (max.x - min.x) * 0.5
    }

    /// Separating-axis test of `self` at `center` against `other` at `other_center`.
    ///
    /// Returns the smallest push that moves `self` out of `other`, or `None` when the
    /// shapes are apart or merely touching.
    pub fn overlap(
        &self,
        center: Vec2,
        other: &CollisionShape,
        other_center: Vec2,
    ) -> Option<Overlap> {
        let a = self.to_convex(center)?;
        let b = other.to_convex(other_center)?;

        // Candidate axes, tagged with the feature they belong to. The other shape's edges
        // come first so that `feature` names an edge of the obstacle being pushed out of.
        let mut axes: Vec<(Vec2, u16)> = Vec::new();
        let b_normals = b.edge_normals();
        let a_normals = a.edge_normals();
        axes.extend(b_normals.iter().enumerate().map(|(i, n)| (*n, i as u16)));
        let offset = b_normals.len();
        axes.extend(
            a_normals
                .iter()
                .enumerate()
                .map(|(i, n)| (*n, (offset + i) as u16)),
        );
        let extra = (offset + a_normals.len()) as u16;
        match (&a, &b) {
            (Convex::Circle { center: ca, .. }, Convex::Circle { center: cb, .. }) => {
                let axis = (*ca - *cb).normalize_or_zero();
                axes.push((if axis == Vec2::ZERO { Vec2::X } else { axis }, extra));
            }
            (Convex::Circle { center: ca, .. }, Convex::Polygon { .. }) => {
                if let Some(axis) = b.vertex_axis(*ca) {
                    axes.push((axis, extra));
                }
            }
            (Convex::Polygon { .. }, Convex::Circle { center: cb, .. }) => {
                if let Some(axis) = a.vertex_axis(*cb) {
                    axes.push((axis, extra));
                }
            }
            (Convex::Polygon { .. }, Convex::Polygon { .. }) => {}
        }

        let mut best: Option<Overlap> = None;
        for (axis, feature) in axes {
            if axis == Vec2::ZERO {
                continue;
            }
            let (a_min, a_max) = a.project(axis);
            let (b_min, b_max) = b.project(axis);
            let push_negative = a_max - b_min;
            let push_positive = b_max - a_min;
            let depth = push_negative.min(push_positive);
            if depth <= SEPARATION_EPSILON {
                return None;
            }
            if best.is_none_or(|current| depth < current.distance) {
                let direction = if push_negative < push_positive {
                    -axis
                } else {
                    axis
                };
                best = Some(Overlap {
                    axis: direction,
                    distance: depth,
                    feature,
                });
            }
        }
        best
    }

    /// Whether the two shapes overlap by more than `SEPARATION_EPSILON`
    pub fn intersects(&self, center: Vec2, other: &CollisionShape, other_center: Vec2) -> bool {
        self.overlap(center, other, other_center).is_some()
    }
}
