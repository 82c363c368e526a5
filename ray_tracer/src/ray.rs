use crate::{intersection::GeoPoint, Point, Result, Vector};

/// How far a secondary ray's origin is pushed off the surface it leaves,
/// so that it does not immediately hit that same surface again.
pub const DELTA: f64 = 1e-4;

/// Resolution used when a ray is turned into a hashable key.
const KEY_SCALE: f64 = 1e9;

/// A ray with a unit-length direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    origin: Point,
    direction: Vector,
}

/// Quantized origin and direction of a ray, usable as a map key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RayKey([i64; 6]);

impl Ray {
    /// The direction is normalized; a zero direction is rejected.
    pub fn new(origin: Point, direction: Vector) -> Result<Self> {
        let direction = direction.normalize()?;
        Ok(Self { origin, direction })
    }

    /// Constructs a ray whose origin is moved by DELTA along the normal,
    /// towards the side of the surface the direction points to.
    pub fn with_bias(origin: Point, direction: Vector, normal: Vector) -> Result<Self> {
        let direction = direction.normalize()?;
        let normal_dot_direction = normal.dot(&direction);
        let delta = if normal_dot_direction > 0. {
            DELTA
        } else {
            -DELTA
        };
        Ok(Self {
            origin: origin + normal * delta,
            direction,
        })
    }

    pub fn origin(&self) -> Point {
        self.origin
    }

    pub fn direction(&self) -> Vector {
        self.direction
    }

    pub fn position(&self, t: f64) -> Point {
        self.origin + self.direction * t
    }

    /// Picks the hit nearest to the ray origin.
    /// On equal distances the earlier hit in the list wins.
    pub fn closest_hit<'a, 'b>(&self, hits: &'b [GeoPoint<'a>]) -> Option<&'b GeoPoint<'a>> {
        let mut closest: Option<(&GeoPoint, f64)> = None;
        for hit in hits {
            let distance = hit.point.distance_squared(&self.origin);
            match closest {
                Some((_, best)) if best <= distance => {}
                _ => closest = Some((hit, distance)),
            }
        }
        closest.map(|(hit, _)| hit)
    }

    pub fn key(&self) -> RayKey {
        let q = |v: f64| (v * KEY_SCALE).round() as i64;
        RayKey([
            q(self.origin.x),
            q(self.origin.y),
            q(self.origin.z),
            q(self.direction.x),
            q(self.direction.y),
            q(self.direction.z),
        ])
    }
}
