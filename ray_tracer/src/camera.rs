use crate::{error::RayTracerError, is_zero, Point, Ray, Result, Vector};

/// Largest supported supersampling grid side.
pub const MAX_SAMPLES_PER_AXIS: usize = 256;

/// A pinhole camera: an eye point looking through a view plane
/// that sits `distance` away along `forward`.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    eye: Point,
    forward: Vector,
    up: Vector,
    right: Vector,
    width: f64,
    height: f64,
    distance: f64,
}

#[derive(Debug, Clone)]
pub struct CameraBuilder {
    eye: Point,
    forward: Vector,
    up: Vector,
    view_plane_size: Option<(f64, f64)>,
    view_plane_distance: Option<f64>,
}

impl Camera {
    /// Starts a camera at `eye`. Both directions are normalized and
    /// must be perpendicular to each other.
    pub fn builder(eye: Point, forward: Vector, up: Vector) -> Result<CameraBuilder> {
        let forward = forward.normalize()?;
        let up = up.normalize()?;
        let dot = forward.dot(&up);
        if !is_zero(dot) {
            return Err(RayTracerError::NonOrthogonalCamera(dot));
        }
        Ok(CameraBuilder {
            eye,
            forward,
            up,
            view_plane_size: None,
            view_plane_distance: None,
        })
    }

    pub fn eye(&self) -> Point {
        self.eye
    }

    pub fn forward(&self) -> Vector {
        self.forward
    }

    pub fn up(&self) -> Vector {
        self.up
    }

    pub fn right(&self) -> Vector {
        self.right
    }

    /// Constructs the ray from the eye through the center of pixel
    /// (`column`, `row`) of an `nx` by `ny` image. Row 0 is the top row.
    pub fn construct_ray(&self, nx: usize, ny: usize, column: usize, row: usize) -> Result<Ray> {
        let center = self.eye + self.forward * self.distance;

        let ratio_x = self.width / nx as f64;
        let ratio_y = self.height / ny as f64;

        let x_offset = (column as f64 - (nx as f64 - 1.) / 2.) * ratio_x;
        let y_offset = (row as f64 - (ny as f64 - 1.) / 2.) * ratio_y;

        let mut pixel = center;
        if !is_zero(x_offset) {
            pixel = pixel + self.right * x_offset;
        }
        if !is_zero(y_offset) {
            // rows grow downwards while `up` points to the top of the image
            pixel = pixel - self.up * y_offset;
        }

        Ray::new(self.eye, pixel - self.eye)
    }

    /// Splits the pixel into a `samples` by `samples` grid and constructs
    /// one ray through the center of every cell, row by row.
    pub fn construct_beam_rays(
        &self,
        nx: usize,
        ny: usize,
        column: usize,
        row: usize,
        samples: usize,
    ) -> Result<Vec<Ray>> {
        if !(1..=MAX_SAMPLES_PER_AXIS).contains(&samples) {
            return Err(RayTracerError::InvalidSetting(format!(
                "samples per axis must be between 1 and {MAX_SAMPLES_PER_AXIS}, got {samples}"
            )));
        }

        let mut rays = Vec::with_capacity(samples * samples);
        for i in 0..samples {
            for j in 0..samples {
                rays.push(self.construct_ray(
                    nx * samples,
                    ny * samples,
                    column * samples + j,
                    row * samples + i,
                )?);
            }
        }
        Ok(rays)
    }
}

impl CameraBuilder {
    pub fn view_plane_size(mut self, width: f64, height: f64) -> Self {
        self.view_plane_size = Some((width, height));
        self
    }

    pub fn view_plane_distance(mut self, distance: f64) -> Self {
        self.view_plane_distance = Some(distance);
        self
    }

    pub fn build(self) -> Result<Camera> {
        let (width, height) = self
            .view_plane_size
            .ok_or(RayTracerError::MissingResource("view plane size"))?;
        let distance = self
            .view_plane_distance
            .ok_or(RayTracerError::MissingResource("view plane distance"))?;

        if width <= 0. || height <= 0. {
            return Err(RayTracerError::InvalidSetting(format!(
                "view plane size must be positive, got {width} x {height}"
            )));
        }
        if distance <= 0. {
            return Err(RayTracerError::InvalidSetting(format!(
                "view plane distance must be positive, got {distance}"
            )));
        }

        let right = self.forward.cross(&self.up).normalize()?;

        Ok(Camera {
            eye: self.eye,
            forward: self.forward,
            up: self.up,
            right,
            width,
            height,
            distance,
        })
    }
}
