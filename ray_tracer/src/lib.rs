pub mod camera;
pub mod canvas;
pub mod color;
mod common;
mod error;
pub mod geometries;
pub mod intersection;
pub mod light;
pub mod material;
pub mod ray;
pub mod render;
pub mod sampling;
pub mod scene;
pub mod shape;
pub mod tracer;
mod tuple;

pub use color::{Coefficients, Color};
pub use common::{align_zero, equal, is_zero, EPSILON};
pub use error::RayTracerError;
pub use ray::Ray;
pub use tuple::{Point, Vector};

pub type Result<T> = std::result::Result<T, RayTracerError>;

/// The types needed to describe and render a scene.
pub mod prelude {
    pub use crate::camera::Camera;
    pub use crate::canvas::{print_grid, Canvas, ImageSink, PpmFile};
    pub use crate::geometries::Geometries;
    pub use crate::intersection::Intersect;
    pub use crate::light::{AmbientLight, DirectionalLight, LightSource, PointLight, SpotLight};
    pub use crate::material::Material;
    pub use crate::render::{RenderSettings, Renderer};
    pub use crate::scene::Scene;
    pub use crate::shape::{
        cylinder::Cylinder, plane::Plane, polygon::Polygon, sphere::Sphere, triangle::Triangle,
        tube::Tube, Shape,
    };
    pub use crate::tracer::RayTracer;
    pub use crate::{Coefficients, Color, Point, Ray, RayTracerError, Result, Vector};
}
