use crate::{
    intersection::{GeoPoint, Intersect},
    material::Material,
    shape::{polygon::Polygon, Shape},
    Color, Point, Ray, Result, Vector,
};

/// A three-vertex polygon.
#[derive(Debug, Clone, PartialEq)]
pub struct Triangle {
    polygon: Polygon,
}

impl Triangle {
    pub fn new(p1: Point, p2: Point, p3: Point) -> Result<Self> {
        Ok(Self {
            polygon: Polygon::new(vec![p1, p2, p3])?,
        })
    }

    pub fn with_emission(mut self, emission: Color) -> Self {
        self.polygon = self.polygon.with_emission(emission);
        self
    }

    pub fn with_material(mut self, material: Material) -> Self {
        self.polygon = self.polygon.with_material(material);
        self
    }

    pub fn vertices(&self) -> &[Point] {
        self.polygon.vertices()
    }
}

impl Intersect for Triangle {
    fn intersect(&self, ray: &Ray) -> Vec<GeoPoint<'_>> {
        self.polygon
            .hit_point(ray)
            .map(|point| GeoPoint::new(self, point))
            .into_iter()
            .collect()
    }
}

impl Shape for Triangle {
    fn normal_at(&self, point: Point) -> Result<Vector> {
        self.polygon.normal_at(point)
    }

    fn emission(&self) -> Color {
        self.polygon.emission()
    }

    fn material(&self) -> Material {
        self.polygon.material()
    }
}
