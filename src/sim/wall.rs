//! Static line-segment walls that particles bounce off

use glam::DVec2;
use serde::{Deserialize, Serialize};

use super::collision::{CollisionResult, DEGENERATE_LENGTH_SQ, circle_segment_collision};

/// An immutable wall segment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wall {
    pub p1: DVec2,
    pub p2: DVec2,
}

impl Wall {
    pub fn new(p1: DVec2, p2: DVec2) -> Self {
        Self { p1, p2 }
    }

    pub fn length(&self) -> f64 {
        self.p1.distance(self.p2)
    }

    /// A wall too short to derive a direction from never collides with anything
    pub fn is_degenerate(&self) -> bool {
        (self.p2 - self.p1).length_squared() < DEGENERATE_LENGTH_SQ
    }

    /// Unit normal (left-hand perpendicular of p1→p2), zero if degenerate
    pub fn normal(&self) -> DVec2 {
        (self.p2 - self.p1).perp().normalize_or_zero()
    }

    /// Endpoints in a canonical order, so results never depend on which end
    /// was placed first
    fn ordered(&self) -> (DVec2, DVec2) {
        let (a, b) = (self.p1, self.p2);
        if (a.x, a.y) <= (b.x, b.y) { (a, b) } else { (b, a) }
    }

    /// Circle-vs-segment test (exact point-to-segment distance)
    pub fn check_collision(&self, point: DVec2, radius: f64) -> bool {
        self.contact(point, radius).hit
    }

    /// Full contact info for a circle touching this wall
    ///
    /// The normal points toward the circle center. If the center sits exactly
    /// on the segment, the wall normal facing away from `velocity` is used.
    pub fn contact_moving(&self, point: DVec2, radius: f64, velocity: DVec2) -> CollisionResult {
        let (a, b) = self.ordered();
        let n = self.normal();
        let fallback = if velocity.dot(n) > 0.0 { -n } else { n };
        circle_segment_collision(point, radius, a, b, fallback)
    }

    pub fn contact(&self, point: DVec2, radius: f64) -> CollisionResult {
        self.contact_moving(point, radius, DVec2::ZERO)
    }

    /// Contact for a circle that moved from `previous` to `point` this step
    ///
    /// The normal always faces the side `previous` was on, so a center that
    /// ended up past the wall line (or crossed the segment entirely) is
    /// pushed back rather than through. Penetration is measured from that
    /// side. Endpoint contacts with no crossing keep the radial normal.
    pub fn contact_swept(
        &self,
        previous: DVec2,
        point: DVec2,
        radius: f64,
        velocity: DVec2,
    ) -> CollisionResult {
        let n = self.normal();
        let before = (previous - self.p1).dot(n);
        let contact = self.contact_moving(point, radius, velocity);
        if n == DVec2::ZERO || before.abs() < f64::EPSILON {
            return contact;
        }

        let facing = n * before.signum();
        let after = (point - self.p1).dot(facing);

        if !contact.hit {
            // Tunnelled: the center jumped from one side to the other
            if after >= 0.0 {
                return contact;
            }
            let t = before.abs() / (before.abs() - after);
            let crossing = previous + (point - previous) * t;
            let (a, b) = self.ordered();
            let ab = b - a;
            let along = (crossing - a).dot(ab) / ab.length_squared();
            if !(0.0..=1.0).contains(&along) {
                return contact;
            }
            return CollisionResult {
                hit: true,
                point: crossing,
                normal: facing,
                penetration: radius - after,
            };
        }

        if contact.normal.dot(facing) < 0.0 {
            return CollisionResult {
                normal: facing,
                penetration: radius - after,
                ..contact
            };
        }
        contact
    }
}
