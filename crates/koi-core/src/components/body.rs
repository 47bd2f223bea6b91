//! Fish body: size genes, fins, tail and the skin pattern.

use crate::buffer::{BinBuffer, FormatError};
use crate::math::Vec2;

use super::pattern::{Pattern, Patterns};

/// Pond units per length gene step.
const LENGTH_SCALE: f32 = 0.01;
/// Fraction of the adult size a newborn fish has.
const NEWBORN_SCALE: f32 = 0.35;
/// Radius as a fraction of length at a radius gene of 255.
const RADIUS_RATIO: f32 = 0.3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fins {
    pub length: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tail {
    pub length: u8,
    pub skin: u8,
}

/// The physical part of a fish.
#[derive(Debug, PartialEq)]
pub struct Body {
    /// Adult length gene
    pub length: u8,
    /// Adult radius gene, relative to length
    pub radius: u8,
    pub fins: Fins,
    pub tail: Tail,
    pub pattern: Pattern,
}

impl Body {
    /// Length in pond units at the given growth in `[0, 1]`.
    pub fn size(&self, growth: f32) -> f32 {
        let scale = NEWBORN_SCALE + (1.0 - NEWBORN_SCALE) * growth.clamp(0.0, 1.0);

        self.length as f32 * LENGTH_SCALE * scale
    }

    /// Half thickness in pond units at the given growth.
    pub fn thickness(&self, growth: f32) -> f32 {
        self.size(growth) * RADIUS_RATIO * self.radius as f32 / u8::MAX as f32
    }

    /// Whether the body capsule running back from `head` against
    /// `direction` covers the point.
    pub fn at_position(&self, head: Vec2, direction: Vec2, growth: f32, x: f32, y: f32) -> bool {
        let tail = head - direction * self.size(growth);
        let point = Vec2::new(x, y);
        let spine = tail - head;
        let spine_length_sq = spine.dot(&spine);

        let t = if spine_length_sq > 0.0 {
            ((point - head).dot(&spine) / spine_length_sq).clamp(0.0, 1.0)
        } else {
            0.0
        };
        let closest = head + spine * t;
        let thickness = self.thickness(growth);

        closest.distance_squared(&point) <= thickness * thickness
    }

    pub fn serialize(&self, buffer: &mut BinBuffer) {
        buffer.write_u8(self.length);
        buffer.write_u8(self.radius);
        buffer.write_u8(self.fins.length);
        buffer.write_u8(self.tail.length);
        buffer.write_u8(self.tail.skin);
        self.pattern.serialize(buffer);
    }

    pub fn deserialize(buffer: &mut BinBuffer, patterns: &Patterns) -> Result<Self, FormatError> {
        let length = buffer.read_u8()?;

        if length == 0 {
            return Err(FormatError::OutOfRange {
                field: "body length",
                value: 0,
            });
        }

        Ok(Self {
            length,
            radius: buffer.read_u8()?,
            fins: Fins {
                length: buffer.read_u8()?,
            },
            tail: Tail {
                length: buffer.read_u8()?,
                skin: buffer.read_u8()?,
            },
            pattern: Pattern::deserialize(buffer, patterns)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::pattern::{PaletteSample, ShapeBody};

    fn body() -> Body {
        Body {
            length: 100,
            radius: 255,
            fins: Fins { length: 50 },
            tail: Tail {
                length: 130,
                skin: 110,
            },
            pattern: Pattern::new(
                PaletteSample { x: 0, y: 0 },
                ShapeBody {
                    center_power: 0,
                    radius_power: 0,
                    rear_power: 0,
                },
                0,
                Vec::new(),
            ),
        }
    }

    #[test]
    fn test_size_grows() {
        let body = body();
        assert!((body.size(1.0) - 1.0).abs() < 1e-5);
        assert!((body.size(0.0) - 0.35).abs() < 1e-5);
        assert!(body.size(0.5) > body.size(0.2));
    }

    #[test]
    fn test_at_position_covers_spine() {
        let body = body();
        let head = Vec2::new(5.0, 5.0);
        let direction = Vec2::new(1.0, 0.0);

        // Spine runs from x = 5 back to x = 4, thickness 0.3
        assert!(body.at_position(head, direction, 1.0, 4.5, 5.1));
        assert!(body.at_position(head, direction, 1.0, 5.0, 5.0));
        assert!(!body.at_position(head, direction, 1.0, 5.5, 5.0));
        assert!(!body.at_position(head, direction, 1.0, 4.5, 5.5));
    }

    #[test]
    fn test_zero_length_is_rejected() {
        let mut reader = BinBuffer::from_bytes(vec![0, 1, 2, 3, 4]);
        assert!(matches!(
            Body::deserialize(&mut reader, &Patterns::default()),
            Err(FormatError::OutOfRange {
                field: "body length",
                ..
            })
        ));
    }
}
