//! Collision primitives shared by walls and particles
//!
//! Particles are circles; walls are line segments. Everything here is pure
//! geometry with no side effects.

use glam::DVec2;

/// Segments shorter than this (squared) are treated as degenerate
pub(crate) const DEGENERATE_LENGTH_SQ: f64 = 1e-12;

/// Result of a circle-vs-segment check
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionResult {
    /// Whether a collision occurred
    pub hit: bool,
    /// Closest point on the segment (if hit)
    pub point: DVec2,
    /// Unit normal pointing from the segment toward the circle center
    pub normal: DVec2,
    /// Penetration depth (for position correction)
    pub penetration: f64,
}

impl CollisionResult {
    pub fn miss() -> Self {
        Self {
            hit: false,
            point: DVec2::ZERO,
            normal: DVec2::ZERO,
            penetration: 0.0,
        }
    }
}

/// Closest point to `p` on segment `a`-`b`
///
/// Returns `None` for a zero-length segment.
pub fn closest_point_on_segment(p: DVec2, a: DVec2, b: DVec2) -> Option<DVec2> {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq < DEGENERATE_LENGTH_SQ {
        return None;
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    Some(a + ab * t)
}

/// Check a circle against segment `a`-`b`
///
/// `fallback_normal` is used when the circle center lies exactly on the
/// segment and no direction can be derived from the contact.
pub fn circle_segment_collision(
    center: DVec2,
    radius: f64,
    a: DVec2,
    b: DVec2,
    fallback_normal: DVec2,
) -> CollisionResult {
    let Some(closest) = closest_point_on_segment(center, a, b) else {
        return CollisionResult::miss();
    };

    let offset = center - closest;
    let dist = offset.length();
    if dist >= radius {
        return CollisionResult::miss();
    }

    let normal = if dist > 0.0 { offset / dist } else { fallback_normal };
    CollisionResult {
        hit: true,
        point: closest,
        normal,
        penetration: radius - dist,
    }
}

/// Reflect velocity off a surface
///
/// Standard reflection: v' = v - 2(v·n)n
#[inline]
pub fn reflect_velocity(velocity: DVec2, normal: DVec2) -> DVec2 {
    velocity - 2.0 * velocity.dot(normal) * normal
}

/// Check if two circles overlap
#[inline]
pub fn circles_overlap(a: DVec2, ra: f64, b: DVec2, rb: f64) -> bool {
    a.distance(b) < ra + rb
}
