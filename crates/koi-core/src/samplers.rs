//! Shaped samplers mapping a uniform draw in `[0, 1]` onto `[min, max]`.
//!
//! Blueprints are built entirely out of samplers, so every constructor is
//! `const` and the whole species catalog can live in a `static`.

use rand::Rng;

/// A stateless mapping from `[0, 1]` to `[min, max]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Sampler {
    /// Straight line from `min` to `max`.
    Linear { min: f32, max: f32 },
    /// `min + (max - min) * x^power`; powers above 1 favour low values.
    Power { min: f32, max: f32, power: f32 },
    /// Eased rise to `plateau`, a flat middle, and an eased rise to `max`.
    Plateau {
        min: f32,
        plateau: f32,
        max: f32,
        power: f32,
    },
    /// Asymptotic approach to `max`, steeper for larger multipliers.
    /// The multiplier must be nonzero.
    Inverse { min: f32, max: f32, multiplier: f32 },
}

impl Sampler {
    pub const fn linear(min: f32, max: f32) -> Self {
        Self::Linear { min, max }
    }

    pub const fn power(min: f32, max: f32, power: f32) -> Self {
        Self::Power { min, max, power }
    }

    pub const fn plateau(min: f32, plateau: f32, max: f32, power: f32) -> Self {
        Self::Plateau {
            min,
            plateau,
            max,
            power,
        }
    }

    pub const fn inverse(min: f32, max: f32, multiplier: f32) -> Self {
        Self::Inverse {
            min,
            max,
            multiplier,
        }
    }

    pub fn min(&self) -> f32 {
        match *self {
            Self::Linear { min, .. }
            | Self::Power { min, .. }
            | Self::Plateau { min, .. }
            | Self::Inverse { min, .. } => min,
        }
    }

    pub fn max(&self) -> f32 {
        match *self {
            Self::Linear { max, .. }
            | Self::Power { max, .. }
            | Self::Plateau { max, .. }
            | Self::Inverse { max, .. } => max,
        }
    }

    /// Sample at `x`; values outside `[0, 1]` are clamped first.
    pub fn sample(&self, x: f32) -> f32 {
        let x = x.clamp(0.0, 1.0);

        match *self {
            Self::Linear { min, max } => min + (max - min) * x,
            Self::Power { min, max, power } => min + (max - min) * x.powf(power),
            Self::Plateau {
                min,
                plateau,
                max,
                power,
            } => {
                if x < 0.5 {
                    plateau - (plateau - min) * (1.0 - 2.0 * x).powf(power)
                } else {
                    plateau + (max - plateau) * (2.0 * x - 1.0).powf(power)
                }
            }
            Self::Inverse {
                min,
                max,
                multiplier,
            } => {
                let amplitude = (max - min) * (1.0 + 1.0 / multiplier);
                let value = min + amplitude * (1.0 - 1.0 / (multiplier * x + 1.0));

                // Rounding can push x = 1 a hair past max.
                value.min(max)
            }
        }
    }

    /// Sample with a fresh uniform draw.
    pub fn draw(&self, rng: &mut impl Rng) -> f32 {
        self.sample(rng.gen::<f32>())
    }

    /// Draw and round into a byte-sized gene.
    pub fn draw_u8(&self, rng: &mut impl Rng) -> u8 {
        self.draw(rng).round().clamp(0.0, u8::MAX as f32) as u8
    }

    /// Draw and round into a 16-bit gene.
    pub fn draw_u16(&self, rng: &mut impl Rng) -> u16 {
        self.draw(rng).round().clamp(0.0, u16::MAX as f32) as u16
    }

    /// Whether `value` lies within this sampler's rounded output range.
    pub fn covers(&self, value: f32) -> bool {
        value >= self.min().round() && value <= self.max().round()
    }
}
