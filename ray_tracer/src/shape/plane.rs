use crate::{
    align_zero, is_zero,
    intersection::{GeoPoint, Intersect},
    material::Material,
    shape::Shape,
    Color, Point, Ray, Result, Vector,
};

#[derive(Debug, Clone, PartialEq)]
pub struct Plane {
    point: Point,
    normal: Vector,
    emission: Color,
    material: Material,
}

impl Plane {
    /// The normal is normalized; a zero normal is rejected.
    pub fn new(point: Point, normal: Vector) -> Result<Self> {
        Ok(Self {
            point,
            normal: normal.normalize()?,
            emission: Color::black(),
            material: Material::default(),
        })
    }

    /// The plane through three points, with the normal following their
    /// counter-clockwise order. Collinear points span no plane.
    pub fn from_points(a: Point, b: Point, c: Point) -> Result<Self> {
        let normal = (b - a).cross(&(c - a));
        Self::new(a, normal)
    }

    pub fn with_emission(mut self, emission: Color) -> Self {
        self.emission = emission;
        self
    }

    pub fn with_material(mut self, material: Material) -> Self {
        self.material = material;
        self
    }

    pub fn point(&self) -> Point {
        self.point
    }

    pub fn normal(&self) -> Vector {
        self.normal
    }

    /// Distance along the ray to the plane, if the plane is in front of it.
    /// Parallel rays and rays starting on the plane never hit.
    pub(crate) fn hit_distance(&self, ray: &Ray) -> Option<f64> {
        let normal_dot_direction = align_zero(self.normal.dot(&ray.direction()));
        if normal_dot_direction == 0. {
            return None;
        }

        let numerator = self.normal.dot(&(self.point - ray.origin()));
        if is_zero(numerator) {
            return None;
        }

        let t = align_zero(numerator / normal_dot_direction);
        (t > 0.).then_some(t)
    }
}

impl Intersect for Plane {
    fn intersect(&self, ray: &Ray) -> Vec<GeoPoint<'_>> {
        self.hit_distance(ray)
            .map(|t| GeoPoint::new(self, ray.position(t)))
            .into_iter()
            .collect()
    }
}

impl Shape for Plane {
    fn normal_at(&self, _point: Point) -> Result<Vector> {
        // Every single point on the plane has the same normal
        Ok(self.normal)
    }

    fn emission(&self) -> Color {
        self.emission
    }

    fn material(&self) -> Material {
        self.material
    }
}
