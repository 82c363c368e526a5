use crate::{
    align_zero,
    error::RayTracerError,
    intersection::{GeoPoint, Intersect},
    is_zero,
    material::Material,
    shape::Shape,
    Color, Point, Ray, Result, Vector,
};

/// An infinitely long cylinder around an axis ray.
#[derive(Debug, Clone, PartialEq)]
pub struct Tube {
    axis: Ray,
    radius: f64,
    emission: Color,
    material: Material,
}

impl Tube {
    pub fn new(axis: Ray, radius: f64) -> Result<Self> {
        if radius <= 0. {
            return Err(RayTracerError::NonPositiveRadius(radius));
        }
        Ok(Self {
            axis,
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

    pub fn axis(&self) -> &Ray {
        &self.axis
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Signed distance of the point's projection along the axis from its origin.
    pub(crate) fn axial_distance(&self, point: Point) -> f64 {
        self.axis.direction().dot(&(point - self.axis.origin()))
    }

    /// Distances along the ray to the tube wall, only those in front of the origin.
    pub(crate) fn hit_distances(&self, ray: &Ray) -> Vec<f64> {
        let axis_direction = self.axis.direction();
        let direction = ray.direction();

        // only the components perpendicular to the axis matter
        let direction_perp = direction - axis_direction * direction.dot(&axis_direction);
        let a = direction_perp.magnitude_squared();
        if is_zero(a) {
            return vec![];
        }

        let offset = ray.origin() - self.axis.origin();
        let offset_perp = offset - axis_direction * offset.dot(&axis_direction);

        let b = 2. * direction_perp.dot(&offset_perp);
        let c = offset_perp.magnitude_squared() - self.radius * self.radius;

        let discriminant = align_zero(b * b - 4. * a * c);
        if discriminant <= 0. {
            return vec![];
        }
        let root = discriminant.sqrt();

        [(-b - root) / (2. * a), (-b + root) / (2. * a)]
            .into_iter()
            .map(align_zero)
            .filter(|t| *t > 0.)
            .collect()
    }
}

impl Intersect for Tube {
    fn intersect(&self, ray: &Ray) -> Vec<GeoPoint<'_>> {
        self.hit_distances(ray)
            .into_iter()
            .map(|t| GeoPoint::new(self, ray.position(t)))
            .collect()
    }
}

impl Shape for Tube {
    fn normal_at(&self, point: Point) -> Result<Vector> {
        let t = self.axial_distance(point);
        if is_zero(t) {
            // the point lies level with the axis origin
            return (point - self.axis.origin()).normalize();
        }
        let projection = self.axis.position(t);
        (point - projection).normalize()
    }

    fn emission(&self) -> Color {
        self.emission
    }

    fn material(&self) -> Material {
        self.material
    }
}
