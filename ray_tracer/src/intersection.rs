use std::fmt::Debug;

use crate::{shape::Shape, Point, Ray};

pub trait Intersect: Debug + Send + Sync {
    /// Computes the points where the ray hits this object.
    /// Points at or behind the ray origin are never returned;
    /// an empty Vec means no intersection.
    fn intersect(&self, ray: &Ray) -> Vec<GeoPoint<'_>>;
}

/// A hit: the surface that was struck and where.
#[derive(Debug, Clone, Copy)]
pub struct GeoPoint<'a> {
    pub geometry: &'a dyn Shape,
    pub point: Point,
}

impl<'a> GeoPoint<'a> {
    pub fn new(geometry: &'a dyn Shape, point: Point) -> Self {
        Self { geometry, point }
    }
}

impl PartialEq for GeoPoint<'_> {
    /// Same point on the same geometry instance.
    fn eq(&self, other: &Self) -> bool {
        std::ptr::addr_eq(self.geometry, other.geometry) && self.point == other.point
    }
}
