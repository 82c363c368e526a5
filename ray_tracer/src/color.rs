// Colors are kept apart from points and vectors: they are unbounded
// accumulators, and clamping only happens when an image is encoded.

use std::iter::Sum;
use std::ops::{Add, AddAssign, Div, Mul, Sub};

use crate::equal;

#[derive(Debug, Default, Clone, Copy)]
pub struct Color {
    pub red: f64,
    pub green: f64,
    pub blue: f64,
}

impl Color {
    pub fn new(red: f64, green: f64, blue: f64) -> Self {
        Self { red, green, blue }
    }

    pub fn white() -> Self {
        Self {
            red: 1.,
            green: 1.,
            blue: 1.,
        }
    }

    /// Alias for Color::default().
    pub fn black() -> Self {
        Self::default()
    }

    /// Averages the given colors. An empty slice averages to black.
    pub fn average(colors: &[Color]) -> Self {
        if colors.is_empty() {
            return Self::black();
        }
        colors.iter().copied().sum::<Color>() / colors.len() as f64
    }
}

impl PartialEq for Color {
    fn eq(&self, other: &Self) -> bool {
        equal(self.red, other.red) && equal(self.green, other.green) && equal(self.blue, other.blue)
    }
}

impl Add for Color {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            red: self.red + other.red,
            green: self.green + other.green,
            blue: self.blue + other.blue,
        }
    }
}

impl AddAssign for Color {
    fn add_assign(&mut self, other: Self) {
        *self = *self + other;
    }
}

impl Sub for Color {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self {
            red: self.red - other.red,
            green: self.green - other.green,
            blue: self.blue - other.blue,
        }
    }
}

impl Mul<f64> for Color {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self::Output {
        Self {
            red: self.red * rhs,
            green: self.green * rhs,
            blue: self.blue * rhs,
        }
    }
}

impl Mul<Self> for Color {
    type Output = Self;

    fn mul(self, other: Self) -> Self {
        Self {
            red: self.red * other.red,
            green: self.green * other.green,
            blue: self.blue * other.blue,
        }
    }
}

impl Mul<Coefficients> for Color {
    type Output = Self;

    fn mul(self, k: Coefficients) -> Self {
        Self {
            red: self.red * k.red,
            green: self.green * k.green,
            blue: self.blue * k.blue,
        }
    }
}

impl Div<f64> for Color {
    type Output = Self;

    fn div(self, rhs: f64) -> Self {
        Self {
            red: self.red / rhs,
            green: self.green / rhs,
            blue: self.blue / rhs,
        }
    }
}

impl Sum for Color {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Color::black(), |acc, color| acc + color)
    }
}

/// Per-channel factors: material coefficients (kD, kS, kT, kR)
/// and the running attenuation of a recursive ray path.
#[derive(Debug, Default, Clone, Copy)]
pub struct Coefficients {
    pub red: f64,
    pub green: f64,
    pub blue: f64,
}

impl Coefficients {
    pub const ZERO: Coefficients = Coefficients {
        red: 0.,
        green: 0.,
        blue: 0.,
    };

    pub const ONE: Coefficients = Coefficients {
        red: 1.,
        green: 1.,
        blue: 1.,
    };

    pub fn new(red: f64, green: f64, blue: f64) -> Self {
        Self { red, green, blue }
    }

    pub fn uniform(value: f64) -> Self {
        Self::new(value, value, value)
    }

    /// True when every channel is below the threshold.
    pub fn lower_than(&self, threshold: f64) -> bool {
        self.red < threshold && self.green < threshold && self.blue < threshold
    }
}

impl From<f64> for Coefficients {
    fn from(value: f64) -> Self {
        Self::uniform(value)
    }
}

impl PartialEq for Coefficients {
    fn eq(&self, other: &Self) -> bool {
        equal(self.red, other.red) && equal(self.green, other.green) && equal(self.blue, other.blue)
    }
}

impl Mul for Coefficients {
    type Output = Self;

    fn mul(self, other: Self) -> Self {
        Self::new(
            self.red * other.red,
            self.green * other.green,
            self.blue * other.blue,
        )
    }
}

impl Mul<f64> for Coefficients {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self {
        Self::new(self.red * rhs, self.green * rhs, self.blue * rhs)
    }
}
