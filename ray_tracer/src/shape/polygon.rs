use crate::{
    align_zero,
    error::RayTracerError,
    intersection::{GeoPoint, Intersect},
    is_zero,
    material::Material,
    shape::{plane::Plane, Shape},
    Color, Point, Ray, Result, Vector,
};

/// A flat convex polygon given by its vertices in edge order.
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    vertices: Vec<Point>,
    plane: Plane,
    emission: Color,
    material: Material,
}

impl Polygon {
    /// Fails on fewer than 3 vertices, vertices off the plane of the first
    /// three, and on vertex orders that do not trace a convex outline.
    pub fn new(vertices: Vec<Point>) -> Result<Self> {
        if vertices.len() < 3 {
            return Err(RayTracerError::TooFewVertices(vertices.len()));
        }

        let plane = Plane::from_points(vertices[0], vertices[1], vertices[2])?;
        let polygon = Self {
            vertices,
            plane,
            emission: Color::black(),
            material: Material::default(),
        };

        // three distinct non-collinear points are always a valid triangle
        if polygon.vertices.len() > 3 {
            polygon.check_convex()?;
        }
        Ok(polygon)
    }

    fn check_convex(&self) -> Result<()> {
        let vertices = &self.vertices;
        let size = vertices.len();
        let normal = self.plane.normal();

        // every pair of consecutive edges must turn the same way around the normal
        let mut edge1 = vertices[size - 1] - vertices[size - 2];
        let mut edge2 = vertices[0] - vertices[size - 1];
        let positive = edge1.cross(&edge2).dot(&normal) > 0.;

        for i in 1..size {
            if !is_zero((vertices[i] - vertices[0]).dot(&normal)) {
                return Err(RayTracerError::NonCoplanarVertices);
            }

            edge1 = edge2;
            edge2 = vertices[i] - vertices[i - 1];
            if positive != (edge1.cross(&edge2).dot(&normal) > 0.) {
                return Err(RayTracerError::NonConvexPolygon);
            }
        }
        Ok(())
    }

    pub fn with_emission(mut self, emission: Color) -> Self {
        self.emission = emission;
        self
    }

    pub fn with_material(mut self, material: Material) -> Self {
        self.material = material;
        self
    }

    pub fn vertices(&self) -> &[Point] {
        &self.vertices
    }

    pub fn normal(&self) -> Vector {
        self.plane.normal()
    }

    /// Where the ray crosses the inside of the polygon.
    /// Hits exactly on an edge or a vertex count as misses.
    pub(crate) fn hit_point(&self, ray: &Ray) -> Option<Point> {
        let t = self.plane.hit_distance(ray)?;

        let origin = ray.origin();
        let direction = ray.direction();
        let size = self.vertices.len();

        // the ray must pass on the same side of every edge, seen from its origin
        let mut positive = None;
        for i in 0..size {
            let v1 = self.vertices[i] - origin;
            let v2 = self.vertices[(i + 1) % size] - origin;
            let sign = align_zero(direction.dot(&v1.cross(&v2)));
            if sign == 0. {
                return None;
            }

            match positive {
                None => positive = Some(sign > 0.),
                Some(p) if p != (sign > 0.) => return None,
                Some(_) => {}
            }
        }

        Some(ray.position(t))
    }
}

impl Intersect for Polygon {
    fn intersect(&self, ray: &Ray) -> Vec<GeoPoint<'_>> {
        self.hit_point(ray)
            .map(|point| GeoPoint::new(self, point))
            .into_iter()
            .collect()
    }
}

impl Shape for Polygon {
    fn normal_at(&self, _point: Point) -> Result<Vector> {
        Ok(self.plane.normal())
    }

    fn emission(&self) -> Color {
        self.emission
    }

    fn material(&self) -> Material {
        self.material
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> Polygon {
        Polygon::new(vec![
            Point::new(-1., -1., 0.),
            Point::new(1., -1., 0.),
            Point::new(1., 1., 0.),
            Point::new(-1., 1., 0.),
        ])
        .unwrap()
    }

    fn hexagon() -> Polygon {
        let vertices = (0..6)
            .map(|i| {
                let angle = i as f64 * std::f64::consts::PI / 3.;
                Point::new(angle.cos() + 2., 3., angle.sin() - 1.)
            })
            .collect();
        Polygon::new(vertices).unwrap()
    }

    #[test]
    fn too_few_vertices_are_rejected() {
        let result = Polygon::new(vec![Point::new(0., 0., 0.), Point::new(1., 0., 0.)]);
        assert!(matches!(result, Err(RayTracerError::TooFewVertices(2))));
    }

    #[test]
    fn vertices_must_be_coplanar() {
        let result = Polygon::new(vec![
            Point::new(0., 0., 0.),
            Point::new(1., 0., 0.),
            Point::new(1., 1., 0.),
            Point::new(0., 1., 0.5),
        ]);
        assert!(matches!(result, Err(RayTracerError::NonCoplanarVertices)));
    }

    #[test]
    fn vertices_must_be_ordered() {
        let result = Polygon::new(vec![
            Point::new(0., 0., 0.),
            Point::new(1., 1., 0.),
            Point::new(1., 0., 0.),
            Point::new(0., 1., 0.),
        ]);
        assert!(matches!(result, Err(RayTracerError::NonConvexPolygon)));
    }

    #[test]
    fn polygon_must_be_convex() {
        let result = Polygon::new(vec![
            Point::new(0., 0., 0.),
            Point::new(2., 0., 0.),
            Point::new(1., 0.5, 0.),
            Point::new(2., 2., 0.),
            Point::new(0., 2., 0.),
        ]);
        assert!(matches!(result, Err(RayTracerError::NonConvexPolygon)));
    }

    #[test]
    fn collinear_first_vertices_are_rejected() {
        let result = Polygon::new(vec![
            Point::new(0., 0., 0.),
            Point::new(1., 0., 0.),
            Point::new(2., 0., 0.),
        ]);
        assert!(matches!(result, Err(RayTracerError::ZeroVector)));
    }

    #[test]
    fn normal_is_perpendicular_to_edges() {
        let polygon = square();
        let normal = polygon.normal_at(Point::ORIGIN).unwrap();
        assert_eq!(normal, Vector::new(0., 0., 1.));
        for i in 0..4 {
            let edge = polygon.vertices()[(i + 1) % 4] - polygon.vertices()[i];
            assert!(crate::equal(edge.dot(&normal), 0.));
        }
    }

    #[test]
    fn ray_through_centroid_along_normal_hits_once() {
        for polygon in [square(), hexagon()] {
            let vertices = polygon.vertices();
            let sum = vertices
                .iter()
                .fold(Vector::new(0., 0., 0.), |acc, v| acc + (*v - Point::ORIGIN));
            let centroid = Point::ORIGIN + sum * (1. / vertices.len() as f64);
            let normal = polygon.normal();

            let ray = Ray::new(centroid - normal * 5., normal).unwrap();
            let xs = polygon.intersect(&ray);
            assert_eq!(xs.len(), 1);
            assert_eq!(xs[0].point, centroid);
        }
    }

    #[test]
    fn ray_outside_the_outline_misses() {
        let polygon = square();
        let direction = Vector::new(0., 0., 1.);
        for target in [
            Point::new(2., 0., 0.),
            Point::new(2., 2., 0.),
            Point::new(0., -1.5, 0.),
        ] {
            let ray = Ray::new(target - direction * 3., direction).unwrap();
            assert!(polygon.intersect(&ray).is_empty());
        }
    }

    #[test]
    fn ray_on_edge_or_vertex_misses() {
        let polygon = square();
        let direction = Vector::new(0., 0., 1.);
        for target in [Point::new(1., 0., 0.), Point::new(1., 1., 0.)] {
            let ray = Ray::new(target - direction * 3., direction).unwrap();
            assert!(polygon.intersect(&ray).is_empty());
        }
    }

    #[test]
    fn oblique_ray_inside_hits() {
        let polygon = square();
        let ray = Ray::new(Point::new(-3., 0.5, -3.), Vector::new(3.5, 0., 3.)).unwrap();
        let xs = polygon.intersect(&ray);
        assert_eq!(xs.len(), 1);
        assert_eq!(xs[0].point, Point::new(0.5, 0.5, 0.));
    }
}
