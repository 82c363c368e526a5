use crate::{
    align_zero, equal,
    error::RayTracerError,
    intersection::{GeoPoint, Intersect},
    material::Material,
    shape::{plane::Plane, tube::Tube, Shape},
    Color, Point, Ray, Result, Vector,
};

/// A tube cut to `height` along its axis and closed by two discs.
#[derive(Debug, Clone, PartialEq)]
pub struct Cylinder {
    tube: Tube,
    height: f64,
    base: Plane,
    top: Plane,
}

impl Cylinder {
    pub fn new(axis: Ray, radius: f64, height: f64) -> Result<Self> {
        if height <= 0. {
            return Err(RayTracerError::NonPositiveHeight(height));
        }
        let direction = axis.direction();
        let base = Plane::new(axis.origin(), direction)?;
        let top = Plane::new(axis.position(height), direction)?;
        Ok(Self {
            tube: Tube::new(axis, radius)?,
            height,
            base,
            top,
        })
    }

    pub fn with_emission(mut self, emission: Color) -> Self {
        self.tube = self.tube.with_emission(emission);
        self
    }

    pub fn with_material(mut self, material: Material) -> Self {
        self.tube = self.tube.with_material(material);
        self
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn radius(&self) -> f64 {
        self.tube.radius()
    }

    fn cap_hit(&self, cap: &Plane, ray: &Ray) -> Option<Point> {
        let point = ray.position(cap.hit_distance(ray)?);
        let radius = self.tube.radius();
        let inside = align_zero(point.distance_squared(&cap.point()) - radius * radius) < 0.;
        inside.then_some(point)
    }
}

impl Intersect for Cylinder {
    fn intersect(&self, ray: &Ray) -> Vec<GeoPoint<'_>> {
        let side = self
            .tube
            .hit_distances(ray)
            .into_iter()
            .map(|t| ray.position(t))
            .filter(|point| {
                let axial = align_zero(self.tube.axial_distance(*point));
                axial > 0. && align_zero(axial - self.height) < 0.
            });

        let caps = [&self.base, &self.top]
            .into_iter()
            .filter_map(|cap| self.cap_hit(cap, ray));

        side.chain(caps)
            .map(|point| GeoPoint::new(self, point))
            .collect()
    }
}

impl Shape for Cylinder {
    fn normal_at(&self, point: Point) -> Result<Vector> {
        let axial = self.tube.axial_distance(point);
        let direction = self.tube.axis().direction();
        if equal(axial, 0.) {
            Ok(-direction)
        } else if equal(axial, self.height) {
            Ok(direction)
        } else {
            self.tube.normal_at(point)
        }
    }

    fn emission(&self) -> Color {
        self.tube.emission()
    }

    fn material(&self) -> Material {
        self.tube.material()
    }
}
