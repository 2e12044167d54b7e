//! Axis-aligned bounding boxes
//!
//! The arena is laid out on the XZ ground plane; Y is up. Bounds keep full
//! 3D extents so they can double as collider shapes.

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

/// An axis-aligned box in world space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    /// Minimum corner
    pub min: Vec3,
    /// Maximum corner
    pub max: Vec3,
}

impl Aabb {
    /// Create bounds from two corners (in any order)
    #[must_use]
    pub fn new(a: Vec3, b: Vec3) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Create bounds from a center and half extents
    #[must_use]
    pub fn from_center_half_extents(center: Vec3, half_extents: Vec3) -> Self {
        let half = half_extents.abs();
        Self {
            min: center - half,
            max: center + half,
        }
    }

    /// Degenerate bounds containing a single point
    #[must_use]
    pub fn from_point(point: Vec3) -> Self {
        Self {
            min: point,
            max: point,
        }
    }

    /// Center of the box
    #[must_use]
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Full size along each axis
    #[must_use]
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// Half size along each axis
    #[must_use]
    pub fn half_extents(&self) -> Vec3 {
        self.size() * 0.5
    }

    /// Size projected on the ground plane (x, z)
    #[must_use]
    pub fn size_xz(&self) -> Vec2 {
        let size = self.size();
        Vec2::new(size.x, size.z)
    }

    /// Smallest box covering both
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        Self {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Grow to include a point
    #[must_use]
    pub fn including(&self, point: Vec3) -> Self {
        Self {
            min: self.min.min(point),
            max: self.max.max(point),
        }
    }

    /// Expand on the ground plane by `padding` on every side
    #[must_use]
    pub fn padded_xz(&self, padding: f32) -> Self {
        let pad = Vec3::new(padding, 0.0, padding);
        Self {
            min: self.min - pad,
            max: self.max + pad,
        }
    }

    /// Check containment in 3D (inclusive)
    #[must_use]
    pub fn contains(&self, point: Vec3) -> bool {
        point.cmpge(self.min).all() && point.cmple(self.max).all()
    }

    /// Check containment on the ground plane, ignoring height (inclusive)
    #[must_use]
    pub fn contains_xz(&self, point: Vec3) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.z >= self.min.z
            && point.z <= self.max.z
    }

    /// Check overlap on the ground plane
    #[must_use]
    pub fn intersects_xz(&self, other: &Self) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.z <= other.max.z
            && self.max.z >= other.min.z
    }

    /// Closest point on or inside the box to `point`
    ///
    /// Points already inside are returned unchanged.
    #[must_use]
    pub fn closest_point(&self, point: Vec3) -> Vec3 {
        point.clamp(self.min, self.max)
    }

    /// Distance along a ray to the box, if hit within `max_distance`
    ///
    /// `direction` must be normalized. Rays starting inside report 0.
    #[must_use]
    pub fn ray_distance(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<f32> {
        let mut t_min = 0.0_f32;
        let mut t_max = max_distance;

        for axis in 0..3 {
            let o = origin[axis];
            let d = direction[axis];
            let (lo, hi) = (self.min[axis], self.max[axis]);

            if d.abs() < f32::EPSILON {
                if o < lo || o > hi {
                    return None;
                }
                continue;
            }

            let inv = 1.0 / d;
            let mut t0 = (lo - o) * inv;
            let mut t1 = (hi - o) * inv;
            if t0 > t1 {
                std::mem::swap(&mut t0, &mut t1);
            }
            t_min = t_min.max(t0);
            t_max = t_max.min(t1);
            if t_min > t_max {
                return None;
            }
        }

        Some(t_min)
    }
}

impl Default for Aabb {
    fn default() -> Self {
        Self::from_point(Vec3::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aabb_contains_xz_ignores_height() {
        let aabb = Aabb::new(Vec3::new(0.0, 0.0, 0.0), Vec3::new(2.0, 1.0, 2.0));

        assert!(aabb.contains_xz(Vec3::new(1.0, 50.0, 1.0)));
        assert!(!aabb.contains(Vec3::new(1.0, 50.0, 1.0)));
        assert!(!aabb.contains_xz(Vec3::new(3.0, 0.5, 1.0)));
    }

    #[test]
    fn test_aabb_union_and_padding() {
        let a = Aabb::from_point(Vec3::ZERO);
        let b = Aabb::new(Vec3::new(4.0, 0.0, -2.0), Vec3::new(5.0, 3.0, -1.0));

        let padded = a.union(&b).padded_xz(2.0);
        assert_eq!(padded.min, Vec3::new(-2.0, 0.0, -4.0));
        assert_eq!(padded.max, Vec3::new(7.0, 3.0, 2.0));
    }

    #[test]
    fn test_aabb_closest_point() {
        let aabb = Aabb::from_center_half_extents(Vec3::new(10.0, 1.0, 0.0), Vec3::ONE);

        let closest = aabb.closest_point(Vec3::ZERO);
        assert!((closest - Vec3::new(9.0, 0.0, 0.0)).length() < 0.001);

        let inside = Vec3::new(10.5, 1.0, 0.2);
        assert_eq!(aabb.closest_point(inside), inside);
    }

    #[test]
    fn test_aabb_ray_distance() {
        let aabb = Aabb::from_center_half_extents(Vec3::new(10.0, 0.0, 0.0), Vec3::ONE);

        let hit = aabb.ray_distance(Vec3::ZERO, Vec3::X, 100.0);
        assert!((hit.unwrap() - 9.0).abs() < 0.001);

        assert!(aabb.ray_distance(Vec3::ZERO, Vec3::Z, 100.0).is_none());
        assert!(aabb.ray_distance(Vec3::ZERO, Vec3::X, 5.0).is_none());
    }
}
