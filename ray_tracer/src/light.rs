use std::fmt::Debug;

use crate::{color::Coefficients, error::RayTracerError, Color, Point, Result, Vector};

/// A light that illuminates surface points directly.
pub trait LightSource: Debug + Send + Sync {
    /// Light intensity arriving at the point.
    fn intensity_at(&self, point: Point) -> Color;

    /// Unit vector travelling from the light towards the point.
    fn direction_at(&self, point: Point) -> Result<Vector>;

    /// Distance from the point to the light.
    fn distance_to(&self, point: Point) -> f64;
}

/// Scene-wide constant light, added once per primary hit.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AmbientLight {
    intensity: Color,
}

impl AmbientLight {
    pub fn new(color: Color, ka: impl Into<Coefficients>) -> Self {
        Self {
            intensity: color * ka.into(),
        }
    }

    pub fn none() -> Self {
        Self::default()
    }

    pub fn intensity(&self) -> Color {
        self.intensity
    }
}

/// Light from infinitely far away, e.g. the sun.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionalLight {
    intensity: Color,
    direction: Vector,
}

impl DirectionalLight {
    pub fn new(intensity: Color, direction: Vector) -> Result<Self> {
        Ok(Self {
            intensity,
            direction: direction.normalize()?,
        })
    }

    pub fn intensity(&self) -> Color {
        self.intensity
    }

    pub fn direction(&self) -> Vector {
        self.direction
    }
}

impl LightSource for DirectionalLight {
    fn intensity_at(&self, _point: Point) -> Color {
        self.intensity
    }

    fn direction_at(&self, _point: Point) -> Result<Vector> {
        Ok(self.direction)
    }

    fn distance_to(&self, _point: Point) -> f64 {
        f64::INFINITY
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointLight {
    position: Point,
    intensity: Color,
    /// Constant, linear and quadratic attenuation factors.
    kc: f64,
    kl: f64,
    kq: f64,
}

impl PointLight {
    pub fn new(position: Point, intensity: Color) -> Self {
        Self {
            position,
            intensity,
            kc: 1.,
            kl: 0.,
            kq: 0.,
        }
    }

    /// The factors must be non-negative and not all zero, so the attenuation
    /// stays positive at every distance.
    pub fn with_attenuation(mut self, kc: f64, kl: f64, kq: f64) -> Result<Self> {
        let factors = [kc, kl, kq];
        if factors.iter().any(|k| k.is_nan() || *k < 0.) || factors.iter().all(|k| *k <= 0.) {
            return Err(RayTracerError::InvalidSetting(format!(
                "attenuation factors must be non-negative and not all zero, got kc={kc} kl={kl} kq={kq}"
            )));
        }
        self.kc = kc;
        self.kl = kl;
        self.kq = kq;
        Ok(self)
    }

    pub fn position(&self) -> Point {
        self.position
    }

    pub fn intensity(&self) -> Color {
        self.intensity
    }

    pub fn attenuation(&self) -> (f64, f64, f64) {
        (self.kc, self.kl, self.kq)
    }
}

impl Default for PointLight {
    fn default() -> Self {
        Self::new(Point::ORIGIN, Color::white())
    }
}

impl LightSource for PointLight {
    fn intensity_at(&self, point: Point) -> Color {
        let distance = self.position.distance(&point);
        let attenuation = self.kc + self.kl * distance + self.kq * distance * distance;
        self.intensity / attenuation
    }

    fn direction_at(&self, point: Point) -> Result<Vector> {
        (point - self.position).normalize()
    }

    fn distance_to(&self, point: Point) -> f64 {
        self.position.distance(&point)
    }
}

/// A point light that only shines into the half-space its beam faces,
/// strongest along the beam axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpotLight {
    light: PointLight,
    direction: Vector,
    narrow_beam: f64,
}

impl SpotLight {
    pub fn new(position: Point, intensity: Color, direction: Vector) -> Result<Self> {
        Ok(Self {
            light: PointLight::new(position, intensity),
            direction: direction.normalize()?,
            narrow_beam: 1.,
        })
    }

    pub fn with_attenuation(mut self, kc: f64, kl: f64, kq: f64) -> Result<Self> {
        self.light = self.light.with_attenuation(kc, kl, kq)?;
        Ok(self)
    }

    /// Raises the angular falloff to this power; larger values focus the beam.
    pub fn with_narrow_beam(mut self, narrow_beam: f64) -> Self {
        self.narrow_beam = narrow_beam;
        self
    }

    pub fn position(&self) -> Point {
        self.light.position
    }

    pub fn direction(&self) -> Vector {
        self.direction
    }
}

impl LightSource for SpotLight {
    fn intensity_at(&self, point: Point) -> Color {
        let projection = match self.light.direction_at(point) {
            Ok(l) => crate::align_zero(self.direction.dot(&l)),
            Err(_) => 0.,
        };
        if projection <= 0. {
            return Color::black();
        }
        self.light.intensity_at(point) * projection.powf(self.narrow_beam)
    }

    fn direction_at(&self, point: Point) -> Result<Vector> {
        self.light.direction_at(point)
    }

    fn distance_to(&self, point: Point) -> f64 {
        self.light.distance_to(point)
    }
}
