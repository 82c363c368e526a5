use crate::{
    align_zero,
    color::Coefficients,
    intersection::{GeoPoint, Intersect},
    light::LightSource,
    scene::Scene,
    Color, Ray, Result, Vector,
};

/// Hard limit on the depth of reflected and refracted rays.
pub const MAX_CALC_COLOR_LEVEL: usize = 10;

/// Contributions attenuated below this factor are dropped.
pub const MIN_CALC_COLOR_K: f64 = 0.001;

/// Recursive Whitted-style shading of rays against a scene.
#[derive(Debug, Clone, Copy)]
pub struct RayTracer<'a> {
    scene: &'a Scene,
    max_level: usize,
}

impl<'a> RayTracer<'a> {
    pub fn new(scene: &'a Scene) -> Self {
        Self {
            scene,
            max_level: MAX_CALC_COLOR_LEVEL,
        }
    }

    /// Number of shading levels along one ray path, the primary hit included.
    pub fn with_max_level(mut self, max_level: usize) -> Self {
        self.max_level = max_level;
        self
    }

    pub fn scene(&self) -> &'a Scene {
        self.scene
    }

    /// Color seen along the ray: the background if nothing is hit,
    /// otherwise the shaded closest hit plus the ambient light.
    pub fn trace_ray(&self, ray: &Ray) -> Result<Color> {
        let hits = self.scene.geometries.intersect(ray);
        match ray.closest_hit(&hits) {
            Some(hit) => {
                let color = self.calc_color(hit, ray, self.max_level, Coefficients::ONE)?;
                Ok(color + self.scene.ambient_light.intensity())
            }
            None => Ok(self.scene.background),
        }
    }

    /// Plain average over every ray of a beam.
    pub fn trace_beam(&self, rays: &[Ray]) -> Result<Color> {
        let colors = rays
            .iter()
            .map(|ray| self.trace_ray(ray))
            .collect::<Result<Vec<_>>>()?;
        Ok(Color::average(&colors))
    }

    fn calc_color(&self, hit: &GeoPoint, ray: &Ray, level: usize, k: Coefficients) -> Result<Color> {
        let color = hit.geometry.emission() + self.calc_local_effects(hit, ray, k)?;
        if level <= 1 {
            return Ok(color);
        }
        Ok(color + self.calc_global_effects(hit, ray, level, k)?)
    }

    /// Direct light from every source that reaches the point.
    fn calc_local_effects(&self, hit: &GeoPoint, ray: &Ray, k: Coefficients) -> Result<Color> {
        let normal = hit.geometry.normal_at(hit.point)?;
        let direction = ray.direction();

        let normal_dot_view = align_zero(normal.dot(&direction));
        if normal_dot_view == 0. {
            return Ok(Color::black());
        }

        let material = hit.geometry.material();
        let mut color = Color::black();
        for light in &self.scene.lights {
            // a light sitting exactly on the surface point lights nothing
            let Ok(light_direction) = light.direction_at(hit.point) else {
                continue;
            };

            // light and eye must be on the same side of the surface
            let normal_dot_light = align_zero(normal.dot(&light_direction));
            if normal_dot_light * normal_dot_view <= 0. {
                continue;
            }

            let ktr = self.transparency(light.as_ref(), light_direction, normal, hit)?;
            if (k * ktr).lower_than(MIN_CALC_COLOR_K) {
                continue;
            }

            let intensity = light.intensity_at(hit.point) * ktr;
            color += material.diffusive(normal_dot_light, intensity);
            color += material.specular(light_direction, normal, direction, intensity);
        }
        Ok(color)
    }

    /// How much of the light makes it through the objects between the point and the light.
    /// Fully transparent is (1, 1, 1), fully blocked is (0, 0, 0).
    fn transparency(
        &self,
        light: &dyn LightSource,
        light_direction: Vector,
        normal: Vector,
        hit: &GeoPoint,
    ) -> Result<Coefficients> {
        let shadow_ray = Ray::with_bias(hit.point, -light_direction, normal)?;
        let light_distance = light.distance_to(hit.point);

        let mut ktr = Coefficients::ONE;
        for occluder in self.scene.geometries.intersect(&shadow_ray) {
            if align_zero(occluder.point.distance(&hit.point) - light_distance) >= 0. {
                continue;
            }
            ktr = ktr * occluder.geometry.material().transparency;
            if ktr.lower_than(MIN_CALC_COLOR_K) {
                return Ok(Coefficients::ZERO);
            }
        }
        Ok(ktr)
    }

    /// Reflection and refraction, each traced one level deeper.
    fn calc_global_effects(
        &self,
        hit: &GeoPoint,
        ray: &Ray,
        level: usize,
        k: Coefficients,
    ) -> Result<Color> {
        let material = hit.geometry.material();
        let normal = hit.geometry.normal_at(hit.point)?;
        let direction = ray.direction();
        let mut color = Color::black();

        let kr = material.reflectivity * k;
        if !kr.lower_than(MIN_CALC_COLOR_K) {
            let reflected = Ray::with_bias(hit.point, direction.reflect(&normal), normal)?;
            color += self.calc_secondary(&reflected, level - 1, kr)? * material.reflectivity;
        }

        let kt = material.transparency * k;
        if !kt.lower_than(MIN_CALC_COLOR_K) {
            let refracted = Ray::with_bias(hit.point, direction, normal)?;
            color += self.calc_secondary(&refracted, level - 1, kt)? * material.transparency;
        }

        Ok(color)
    }

    fn calc_secondary(&self, ray: &Ray, level: usize, k: Coefficients) -> Result<Color> {
        let hits = self.scene.geometries.intersect(ray);
        match ray.closest_hit(&hits) {
            Some(hit) => self.calc_color(hit, ray, level, k),
            None => Ok(self.scene.background),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        camera::Camera,
        light::{AmbientLight, DirectionalLight, PointLight},
        material::Material,
        shape::{plane::Plane, sphere::Sphere},
        Point,
    };

    fn ray(origin: Point, direction: Vector) -> Ray {
        Ray::new(origin, direction).unwrap()
    }

    fn mirror(point: Point, normal: Vector, reflectivity: f64) -> Plane {
        Plane::new(point, normal).unwrap().with_material(Material {
            reflectivity: Coefficients::uniform(reflectivity),
            ..Default::default()
        })
    }

    fn lit_sphere_scene() -> Scene {
        let material = Material {
            diffuse: Coefficients::uniform(0.5),
            specular: Coefficients::uniform(0.5),
            shininess: 10.,
            ..Default::default()
        };
        Scene::new("lit sphere")
            .with_background(Color::new(0.2, 0.3, 0.4))
            .with_ambient_light(AmbientLight::new(Color::white(), 0.1))
            .with_geometry(
                Sphere::default()
                    .with_material(material)
                    .with_emission(Color::new(0.1, 0., 0.)),
            )
            .with_light(DirectionalLight::new(Color::white(), Vector::new(0., 0., 1.)).unwrap())
    }

    #[test]
    fn center_pixel_of_lit_sphere() {
        let scene = lit_sphere_scene();
        let camera =
            Camera::builder(Point::new(0., 0., -10.), Vector::new(0., 0., 1.), Vector::new(0., 1., 0.))
                .unwrap()
                .view_plane_size(3., 3.)
                .view_plane_distance(5.)
                .build()
                .unwrap();
        let center = camera.construct_ray(3, 3, 1, 1).unwrap();

        let hits = scene.geometries.intersect(&center);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].point, Point::new(0., 0., -1.));
        assert_eq!(hits[1].point, Point::new(0., 0., 1.));
        assert_eq!(center.closest_hit(&hits).unwrap().point, Point::new(0., 0., -1.));

        // ambient 0.1 + emission (0.1, 0, 0) + diffuse 0.5 + specular 0.5
        let color = RayTracer::new(&scene).trace_ray(&center).unwrap();
        assert_eq!(color, Color::new(1.2, 1.1, 1.1));
    }

    #[test]
    fn missed_ray_returns_background() {
        let scene = lit_sphere_scene();
        let tracer = RayTracer::new(&scene);
        let xs = [
            ray(Point::new(0., 0., -10.), Vector::new(0., 1., 0.)),
            ray(Point::new(0., 5., -10.), Vector::new(0., 0., 1.)),
            ray(Point::new(0., 0., -10.), Vector::new(0., 0., -1.)),
        ];
        for r in xs {
            assert_eq!(tracer.trace_ray(&r).unwrap(), Color::new(0.2, 0.3, 0.4));
        }
    }

    #[test]
    fn grazing_ray_gets_no_direct_light() {
        let scene = Scene::new("lamp")
            .with_light(PointLight::new(Point::new(0., 5., 0.), Color::white()));
        let floor = Plane::new(Point::ORIGIN, Vector::new(0., 1., 0.))
            .unwrap()
            .with_material(Material {
                diffuse: Coefficients::ONE,
                ..Default::default()
            });
        let hit = GeoPoint::new(&floor, Point::new(1., 0., 0.));
        let grazing = ray(Point::new(-1., 0., 0.), Vector::new(1., 0., 0.));

        let color = RayTracer::new(&scene)
            .calc_local_effects(&hit, &grazing, Coefficients::ONE)
            .unwrap();
        assert_eq!(color, Color::black());
    }

    #[test]
    fn light_behind_surface_is_ignored() {
        let scene = Scene::new("floor")
            .with_geometry(
                Plane::new(Point::ORIGIN, Vector::new(0., 1., 0.))
                    .unwrap()
                    .with_material(Material {
                        diffuse: Coefficients::ONE,
                        ..Default::default()
                    }),
            )
            .with_light(PointLight::new(Point::new(0., -5., 0.), Color::white()));
        let tracer = RayTracer::new(&scene);
        let color = tracer
            .trace_ray(&ray(Point::new(0., 5., 0.), Vector::new(0., -1., 0.)))
            .unwrap();
        assert_eq!(color, Color::black());
    }

    #[test]
    fn unoccluded_light_is_fully_transparent() {
        let scene = Scene::new("empty");
        let tracer = RayTracer::new(&scene);
        let plane = Plane::new(Point::ORIGIN, Vector::new(0., 0., -1.)).unwrap();
        let light = PointLight::new(Point::new(0., 0., -10.), Color::white());
        let hit = GeoPoint::new(&plane, Point::ORIGIN);

        let l = light.direction_at(Point::ORIGIN).unwrap();
        let ktr = tracer.transparency(&light, l, plane.normal(), &hit).unwrap();
        assert_eq!(ktr, Coefficients::ONE);
    }

    fn translucent_sphere(center: Point, kt: f64) -> Sphere {
        Sphere::new(center, 1.).unwrap().with_material(Material {
            transparency: Coefficients::uniform(kt),
            ..Default::default()
        })
    }

    #[test]
    fn occluder_between_point_and_light_attenuates() {
        let scene = Scene::new("occluded").with_geometry(translucent_sphere(Point::new(0., 0., -5.), 0.5));
        let tracer = RayTracer::new(&scene);
        let plane = Plane::new(Point::ORIGIN, Vector::new(0., 0., -1.)).unwrap();
        let light = PointLight::new(Point::new(0., 0., -10.), Color::white());
        let hit = GeoPoint::new(&plane, Point::ORIGIN);

        // the shadow ray crosses the sphere surface twice
        let l = light.direction_at(Point::ORIGIN).unwrap();
        let ktr = tracer.transparency(&light, l, plane.normal(), &hit).unwrap();
        assert_eq!(ktr, Coefficients::uniform(0.25));
    }

    #[test]
    fn occluder_beyond_the_light_does_not_attenuate() {
        let scene = Scene::new("behind light").with_geometry(translucent_sphere(Point::new(0., 0., -15.), 0.5));
        let tracer = RayTracer::new(&scene);
        let plane = Plane::new(Point::ORIGIN, Vector::new(0., 0., -1.)).unwrap();
        let light = PointLight::new(Point::new(0., 0., -10.), Color::white());
        let hit = GeoPoint::new(&plane, Point::ORIGIN);

        let l = light.direction_at(Point::ORIGIN).unwrap();
        let ktr = tracer.transparency(&light, l, plane.normal(), &hit).unwrap();
        assert_eq!(ktr, Coefficients::ONE);
    }

    #[test]
    fn opaque_occluder_blocks_light() {
        let scene = Scene::new("opaque").with_geometry(translucent_sphere(Point::new(0., 0., -5.), 0.));
        let tracer = RayTracer::new(&scene);
        let plane = Plane::new(Point::ORIGIN, Vector::new(0., 0., -1.)).unwrap();
        let light = DirectionalLight::new(Color::white(), Vector::new(0., 0., 1.)).unwrap();
        let hit = GeoPoint::new(&plane, Point::ORIGIN);

        let l = light.direction_at(Point::ORIGIN).unwrap();
        let ktr = tracer.transparency(&light, l, plane.normal(), &hit).unwrap();
        assert_eq!(ktr, Coefficients::ZERO);
    }

    #[test]
    fn mirror_reflects_background() {
        let scene = Scene::new("mirror")
            .with_background(Color::new(0.2, 0.4, 0.6))
            .with_ambient_light(AmbientLight::new(Color::white(), 0.1))
            .with_geometry(mirror(Point::ORIGIN, Vector::new(0., 0., -1.), 1.));
        let r = ray(Point::new(0., 0., -5.), Vector::new(0., 1., 1.));

        let color = RayTracer::new(&scene).trace_ray(&r).unwrap();
        assert_eq!(color, Color::new(0.3, 0.5, 0.7));

        // a single level leaves no room for the reflected ray
        let color = RayTracer::new(&scene).with_max_level(1).trace_ray(&r).unwrap();
        assert_eq!(color, Color::new(0.1, 0.1, 0.1));
    }

    #[test]
    fn transparent_plane_shows_what_is_behind() {
        let scene = Scene::new("glass")
            .with_background(Color::new(0.2, 0.4, 0.6))
            .with_geometry(
                Plane::new(Point::ORIGIN, Vector::new(0., 0., -1.))
                    .unwrap()
                    .with_material(Material {
                        transparency: Coefficients::ONE,
                        ..Default::default()
                    }),
            );
        let r = ray(Point::new(0., 0., -5.), Vector::new(0., 0., 1.));
        let color = RayTracer::new(&scene).trace_ray(&r).unwrap();
        assert_eq!(color, Color::new(0.2, 0.4, 0.6));
    }

    #[test]
    fn negligible_reflection_is_pruned() {
        let scene = Scene::new("dim mirror")
            .with_background(Color::white())
            .with_geometry(
                mirror(Point::ORIGIN, Vector::new(0., 0., -1.), MIN_CALC_COLOR_K / 2.)
                    .with_emission(Color::new(0.3, 0.3, 0.3)),
            );
        let r = ray(Point::new(0., 0., -5.), Vector::new(0., 0., 1.));
        let color = RayTracer::new(&scene).trace_ray(&r).unwrap();
        assert_eq!(color, Color::new(0.3, 0.3, 0.3));
    }

    #[test]
    fn mutually_reflective_surfaces_terminate() {
        // every bounce adds the emission once, for exactly max_level bounces
        let emission = Color::new(0.01, 0.02, 0.03);
        let scene = Scene::new("hall of mirrors")
            .with_geometry(mirror(Point::ORIGIN, Vector::new(0., 0., 1.), 1.).with_emission(emission))
            .with_geometry(
                mirror(Point::new(0., 0., 10.), Vector::new(0., 0., -1.), 1.).with_emission(emission),
            );
        let r = ray(Point::new(0., 0., 5.), Vector::new(0., 0., 1.));

        let color = RayTracer::new(&scene).trace_ray(&r).unwrap();
        assert_eq!(color, emission * MAX_CALC_COLOR_LEVEL as f64);

        let color = RayTracer::new(&scene).with_max_level(3).trace_ray(&r).unwrap();
        assert_eq!(color, emission * 3.);
    }

    #[test]
    fn beam_averages_its_rays() {
        let scene = lit_sphere_scene();
        let tracer = RayTracer::new(&scene);
        let rays = [
            ray(Point::new(0., 0., -10.), Vector::new(0., 0., 1.)),
            ray(Point::new(0., 0., -10.), Vector::new(0., 1., 0.)),
        ];
        let expected = (Color::new(1.2, 1.1, 1.1) + Color::new(0.2, 0.3, 0.4)) / 2.;
        assert_eq!(tracer.trace_beam(&rays).unwrap(), expected);
    }
}
