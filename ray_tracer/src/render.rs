use std::time::Instant;

use indicatif::{ParallelProgressIterator, ProgressStyle};
use log::{debug, info};
use rayon::prelude::*;

use crate::{
    camera::{Camera, MAX_SAMPLES_PER_AXIS},
    canvas::ImageSink, error::RayTracerError, sampling::adaptive_color,
    tracer::RayTracer, tracer::MAX_CALC_COLOR_LEVEL, Color, Result,
};

/// How each pixel is sampled and how the work is spread over threads.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderSettings {
    /// Each pixel is sampled by a grid of this many rays per side.
    pub samples_per_axis: usize,
    pub adaptive: bool,
    pub adaptive_max_level: usize,
    pub max_level: usize,
    /// Size of a dedicated worker pool; rayon's global pool when unset.
    pub threads: Option<usize>,
    pub show_progress: bool,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            samples_per_axis: 1,
            adaptive: false,
            adaptive_max_level: 4,
            max_level: MAX_CALC_COLOR_LEVEL,
            threads: None,
            show_progress: false,
        }
    }
}

impl RenderSettings {
    pub fn validate(&self) -> Result<()> {
        let at_least_one = [
            ("samples per axis", self.samples_per_axis),
            ("adaptive max level", self.adaptive_max_level),
            ("max level", self.max_level),
            ("threads", self.threads.unwrap_or(1)),
        ];
        for (name, value) in at_least_one {
            if value < 1 {
                return Err(RayTracerError::InvalidSetting(format!(
                    "{name} must be at least 1, got {value}"
                )));
            }
        }
        if self.samples_per_axis > MAX_SAMPLES_PER_AXIS {
            return Err(RayTracerError::InvalidSetting(format!(
                "samples per axis must be at most {MAX_SAMPLES_PER_AXIS}, got {}",
                self.samples_per_axis
            )));
        }
        Ok(())
    }
}

/// Drives a render: one ray (or beam) per pixel, rows traced in parallel.
#[derive(Debug, Default)]
pub struct Renderer<'a> {
    camera: Option<Camera>,
    tracer: Option<RayTracer<'a>>,
    settings: RenderSettings,
}

impl<'a> Renderer<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_camera(mut self, camera: Camera) -> Self {
        self.camera = Some(camera);
        self
    }

    pub fn with_tracer(mut self, tracer: RayTracer<'a>) -> Self {
        self.tracer = Some(tracer);
        self
    }

    pub fn with_settings(mut self, settings: RenderSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn settings(&self) -> &RenderSettings {
        &self.settings
    }

    /// Traces every pixel of the sink, writes the colors into it and finishes it.
    /// Blocks until the whole image is done.
    pub fn render<S: ImageSink + ?Sized>(&self, sink: &mut S) -> Result<()> {
        let camera = self
            .camera
            .as_ref()
            .ok_or(RayTracerError::MissingResource("camera"))?;
        let tracer = self
            .tracer
            .ok_or(RayTracerError::MissingResource("ray tracer"))?
            .with_max_level(self.settings.max_level);
        self.settings.validate()?;

        let (width, height) = (sink.width(), sink.height());
        if width == 0 || height == 0 {
            return Err(RayTracerError::InvalidSetting(format!(
                "image must not be empty, got {width} x {height}"
            )));
        }

        info!(
            "Rendering {} at {width}x{height}, {} rays per pixel",
            tracer.scene().name,
            self.settings.samples_per_axis * self.settings.samples_per_axis
        );
        debug!("{:?}", self.settings);

        let start = Instant::now();
        let rows = match self.settings.threads {
            Some(threads) => {
                let pool = rayon::ThreadPoolBuilder::new()
                    .num_threads(threads)
                    .build()?;
                pool.install(|| self.trace_rows(camera, &tracer, width, height))?
            }
            None => self.trace_rows(camera, &tracer, width, height)?,
        };

        for (row, colors) in rows.iter().enumerate() {
            for (column, color) in colors.iter().enumerate() {
                sink.write_pixel(column, row, *color);
            }
        }
        info!(
            "Rendered {} pixels in {:.2?}",
            width * height,
            start.elapsed()
        );

        sink.finish()
    }

    fn trace_rows(
        &self,
        camera: &Camera,
        tracer: &RayTracer,
        width: usize,
        height: usize,
    ) -> Result<Vec<Vec<Color>>> {
        let trace_row = |row: usize| -> Result<Vec<Color>> {
            (0..width)
                .map(|column| self.pixel_color(camera, tracer, width, height, column, row))
                .collect()
        };

        if !self.settings.show_progress {
            return (0..height).into_par_iter().map(trace_row).collect();
        }

        let style = ProgressStyle::with_template(
            "{msg} {elapsed:>5} -- {eta:5} {bar:40.cyan/blue} {pos:>7}/{len:7} {percent}%",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar());

        (0..height)
            .into_par_iter()
            .progress_with_style(style)
            .with_message("Rendering...")
            .map(trace_row)
            .collect()
    }

    fn pixel_color(
        &self,
        camera: &Camera,
        tracer: &RayTracer,
        width: usize,
        height: usize,
        column: usize,
        row: usize,
    ) -> Result<Color> {
        let samples = self.settings.samples_per_axis;
        if samples == 1 {
            let ray = camera.construct_ray(width, height, column, row)?;
            return tracer.trace_ray(&ray);
        }

        let rays = camera.construct_beam_rays(width, height, column, row, samples)?;
        if self.settings.adaptive && rays.len() > 4 {
            adaptive_color(&rays, samples, self.settings.adaptive_max_level, |ray| {
                tracer.trace_ray(ray)
            })
        } else {
            tracer.trace_beam(&rays)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        canvas::Canvas,
        color::Coefficients,
        light::{AmbientLight, DirectionalLight},
        material::Material,
        scene::Scene,
        shape::sphere::Sphere,
        Point, Vector,
    };

    fn camera() -> Camera {
        Camera::builder(Point::new(0., 0., -10.), Vector::new(0., 0., 1.), Vector::new(0., 1., 0.))
            .unwrap()
            .view_plane_size(3., 3.)
            .view_plane_distance(5.)
            .build()
            .unwrap()
    }

    fn scene() -> Scene {
        Scene::new("sphere")
            .with_background(Color::new(0.2, 0.3, 0.4))
            .with_ambient_light(AmbientLight::new(Color::white(), 0.1))
            .with_geometry(Sphere::default().with_material(Material {
                diffuse: Coefficients::uniform(0.5),
                specular: Coefficients::uniform(0.5),
                shininess: 10.,
                ..Default::default()
            }))
            .with_light(DirectionalLight::new(Color::white(), Vector::new(0., 0., 1.)).unwrap())
    }

    /// Counts the calls the renderer makes on its sink.
    struct CountingSink {
        canvas: Canvas,
        writes: usize,
        finishes: usize,
    }

    impl ImageSink for CountingSink {
        fn width(&self) -> usize {
            self.canvas.width()
        }

        fn height(&self) -> usize {
            self.canvas.height()
        }

        fn write_pixel(&mut self, column: usize, row: usize, color: Color) {
            self.writes += 1;
            self.canvas.write_pixel(column, row, color);
        }

        fn finish(&mut self) -> Result<()> {
            self.finishes += 1;
            Ok(())
        }
    }

    #[test]
    fn default_settings() {
        let settings = RenderSettings::default();
        assert_eq!(settings.samples_per_axis, 1);
        assert!(!settings.adaptive);
        assert_eq!(settings.max_level, MAX_CALC_COLOR_LEVEL);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn invalid_settings_are_rejected() {
        for settings in [
            RenderSettings {
                samples_per_axis: 0,
                ..Default::default()
            },
            RenderSettings {
                max_level: 0,
                ..Default::default()
            },
            RenderSettings {
                threads: Some(0),
                ..Default::default()
            },
            RenderSettings {
                samples_per_axis: usize::MAX,
                ..Default::default()
            },
        ] {
            assert!(matches!(
                settings.validate(),
                Err(RayTracerError::InvalidSetting(_))
            ));
        }
    }

    #[test]
    fn rendering_needs_camera_and_tracer() {
        let scene = scene();
        let mut canvas = Canvas::new(3, 3);

        let result = Renderer::new().with_camera(camera()).render(&mut canvas);
        assert!(matches!(result, Err(RayTracerError::MissingResource(_))));

        let result = Renderer::new()
            .with_tracer(RayTracer::new(&scene))
            .render(&mut canvas);
        assert!(matches!(result, Err(RayTracerError::MissingResource(_))));
    }

    #[test]
    fn render_writes_every_pixel_and_finishes_once() {
        let scene = scene();
        let mut sink = CountingSink {
            canvas: Canvas::new(3, 3),
            writes: 0,
            finishes: 0,
        };
        Renderer::new()
            .with_camera(camera())
            .with_tracer(RayTracer::new(&scene))
            .render(&mut sink)
            .unwrap();

        assert_eq!(sink.writes, 9);
        assert_eq!(sink.finishes, 1);
        assert_eq!(sink.canvas.pixel_at(1, 1), Color::new(1.1, 1.1, 1.1));
        assert_eq!(sink.canvas.pixel_at(0, 0), Color::new(0.2, 0.3, 0.4));
    }

    #[test]
    fn dedicated_pool_renders_the_same_image() {
        let scene = scene();
        let renderer = Renderer::new()
            .with_camera(camera())
            .with_tracer(RayTracer::new(&scene));

        let mut global = Canvas::new(5, 5);
        renderer.render(&mut global).unwrap();

        let mut pooled = Canvas::new(5, 5);
        let renderer = renderer.with_settings(RenderSettings {
            threads: Some(2),
            ..Default::default()
        });
        renderer.render(&mut pooled).unwrap();

        assert_eq!(global.to_ppm(), pooled.to_ppm());
    }

    #[test]
    fn adaptive_sampling_matches_beam_on_uniform_pixels() {
        let scene = Scene::new("empty").with_background(Color::new(0.5, 0.25, 0.125));
        let renderer = Renderer::new()
            .with_camera(camera())
            .with_tracer(RayTracer::new(&scene))
            .with_settings(RenderSettings {
                samples_per_axis: 4,
                adaptive: true,
                ..Default::default()
            });

        let mut canvas = Canvas::new(2, 2);
        renderer.render(&mut canvas).unwrap();
        for (column, row) in [(0, 0), (1, 0), (0, 1), (1, 1)] {
            assert_eq!(canvas.pixel_at(column, row), Color::new(0.5, 0.25, 0.125));
        }
    }

    #[test]
    fn supersampled_edge_pixel_blends_colors() {
        let scene = scene();
        let renderer = Renderer::new()
            .with_camera(camera())
            .with_tracer(RayTracer::new(&scene))
            .with_settings(RenderSettings {
                samples_per_axis: 3,
                ..Default::default()
            });

        let mut canvas = Canvas::new(1, 1);
        renderer.render(&mut canvas).unwrap();
        let pixel = canvas.pixel_at(0, 0);
        let background = Color::new(0.2, 0.3, 0.4);
        assert_ne!(pixel, background);
        assert_ne!(pixel, Color::new(1.1, 1.1, 1.1));
    }

    #[test]
    fn empty_image_is_rejected() {
        let scene = scene();
        let mut canvas = Canvas::new(0, 3);
        let result = Renderer::new()
            .with_camera(camera())
            .with_tracer(RayTracer::new(&scene))
            .render(&mut canvas);
        assert!(matches!(result, Err(RayTracerError::InvalidSetting(_))));
    }
}
