use crate::{intersection::Intersect, material::Material, Color, Point, Result, Vector};

pub mod cylinder;
pub mod plane;
pub mod polygon;
pub mod sphere;
pub mod triangle;
pub mod tube;

/// A single surface: something that can be hit and shaded.
pub trait Shape: Intersect {
    /// Computes the unit normal at a point on the surface.
    fn normal_at(&self, point: Point) -> Result<Vector>;

    /// Light the surface gives off by itself.
    fn emission(&self) -> Color;

    fn material(&self) -> Material;
}
