use crate::{color::Coefficients, Color, Vector};

/// Surface response to light. Coefficients are per color channel;
/// nothing forces them to sum to at most 1.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Material {
    /// kD
    pub diffuse: Coefficients,
    /// kS
    pub specular: Coefficients,
    /// kT
    pub transparency: Coefficients,
    /// kR
    pub reflectivity: Coefficients,
    pub shininess: f64,
}

impl Material {
    /// Lambertian term: `intensity * kD * |n·l|`.
    pub fn diffusive(&self, light_dot_normal: f64, intensity: Color) -> Color {
        intensity * (self.diffuse * light_dot_normal.abs())
    }

    /// Phong term. `light_direction` travels from the light to the surface,
    /// `ray_direction` from the eye to the surface.
    pub fn specular(
        &self,
        light_direction: Vector,
        normal: Vector,
        ray_direction: Vector,
        intensity: Color,
    ) -> Color {
        let reflected = light_direction.reflect(&normal);

        // how close the mirrored light comes to heading back into the eye
        let reflect_dot_eye = crate::align_zero(-reflected.dot(&ray_direction));

        if reflect_dot_eye <= 0. {
            Color::black()
        } else {
            intensity * (self.specular * reflect_dot_eye.powf(self.shininess))
        }
    }
}
