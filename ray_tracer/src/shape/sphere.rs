use crate::{
    align_zero,
    error::RayTracerError,
    intersection::{GeoPoint, Intersect},
    material::Material,
    shape::Shape,
    Color, Point, Ray, Result, Vector,
};

#[derive(Debug, PartialEq, Clone)]
pub struct Sphere {
    center: Point,
    radius: f64,
    emission: Color,
    material: Material,
}

impl Sphere {
    pub fn new(center: Point, radius: f64) -> Result<Self> {
        if radius <= 0. {
            return Err(RayTracerError::NonPositiveRadius(radius));
        }
        Ok(Self {
            center,
            radius,
            emission: Color::black(),
            material: Material::default(),
        })
    }

    pub fn with_emission(mut self, emission: Color) -> Self {
        self.emission = emission;
        self
    }

    pub fn with_material(mut self, material: Material) -> Self {
        self.material = material;
        self
    }

    pub fn center(&self) -> Point {
        self.center
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }
}

impl Default for Sphere {
    /// A unit sphere at the origin.
    fn default() -> Self {
        Self {
            center: Point::ORIGIN,
            radius: 1.,
            emission: Color::black(),
            material: Material::default(),
        }
    }
}

impl Intersect for Sphere {
    /// Solves along the ray from the projection of the center onto it.
    /// Returns up to two points in front of the origin; tangent rays miss.
    fn intersect(&self, ray: &Ray) -> Vec<GeoPoint<'_>> {
        let origin_to_center = self.center - ray.origin();

        // the only hit of a ray fired from the center is one radius away
        if origin_to_center.is_zero() {
            return vec![GeoPoint::new(self, ray.position(self.radius))];
        }

        // distance along the ray to the point closest to the center
        let tm = align_zero(ray.direction().dot(&origin_to_center));
        let distance_squared = align_zero(origin_to_center.magnitude_squared() - tm * tm);

        let half_chord_squared = align_zero(self.radius * self.radius - distance_squared);
        if half_chord_squared <= 0. {
            return vec![];
        }
        let half_chord = half_chord_squared.sqrt();

        [tm - half_chord, tm + half_chord]
            .into_iter()
            .map(align_zero)
            .filter(|t| *t > 0.)
            .map(|t| GeoPoint::new(self, ray.position(t)))
            .collect()
    }
}

impl Shape for Sphere {
    fn normal_at(&self, point: Point) -> Result<Vector> {
        (point - self.center).normalize()
    }

    fn emission(&self) -> Color {
        self.emission
    }

    fn material(&self) -> Material {
        self.material
    }
}
