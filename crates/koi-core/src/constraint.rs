//! Pond shapes.
//!
//! A constraint converts absolute pond-plane positions into coordinates
//! relative to its own shape and back. Relative positions survive a change
//! of geometry (a pond being resized or reshaped); the pond uses them both
//! to remap fish and to serialize their positions.

use std::f32::consts::TAU;

use crate::buffer::{dequantize_unit, quantize_unit, BinBuffer, FormatError};
use crate::math::Vec2;

/// Slack for points sitting on a shape's edge; quantized round trips may
/// land just outside.
pub const PROJECTION_EPSILON: f32 = 1e-3;

/// A pond shape.
pub trait Constraint {
    /// Shape-specific relative position.
    type Relative: Clone + std::fmt::Debug;

    /// Whether a point lies inside the shape.
    fn contains(&self, x: f32, y: f32) -> bool;

    /// Project an absolute position, `None` if it lies outside.
    fn relative_position(&self, position: Vec2) -> Option<Self::Relative>;

    /// Project a relative position back, `None` if it does not fit.
    fn absolute_position(&self, relative: &Self::Relative) -> Option<Vec2>;

    fn serialize_relative_position(&self, relative: &Self::Relative, buffer: &mut BinBuffer);

    fn deserialize_relative_position(
        &self,
        buffer: &mut BinBuffer,
    ) -> Result<Self::Relative, FormatError>;
}

/// Circular pond.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConstraintCircle {
    pub center: Vec2,
    pub radius: f32,
}

/// Polar position inside a circle, distance as a fraction of the radius.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CirclePosition {
    pub angle: f32,
    pub distance: f32,
}

impl ConstraintCircle {
    pub fn new(center: Vec2, radius: f32) -> Self {
        Self { center, radius }
    }
}

impl Constraint for ConstraintCircle {
    type Relative = CirclePosition;

    fn contains(&self, x: f32, y: f32) -> bool {
        let reach = self.radius * (1.0 + PROJECTION_EPSILON);

        self.center.distance_squared(&Vec2::new(x, y)) <= reach * reach
    }

    fn relative_position(&self, position: Vec2) -> Option<CirclePosition> {
        let delta = position - self.center;
        let distance = delta.length() / self.radius;

        if distance > 1.0 + PROJECTION_EPSILON {
            return None;
        }

        Some(CirclePosition {
            angle: delta.angle().rem_euclid(TAU),
            distance: distance.min(1.0),
        })
    }

    fn absolute_position(&self, relative: &CirclePosition) -> Option<Vec2> {
        if !(0.0..=1.0 + PROJECTION_EPSILON).contains(&relative.distance) {
            return None;
        }

        let distance = relative.distance.min(1.0) * self.radius;

        Some(self.center + Vec2::from_angle(relative.angle) * distance)
    }

    fn serialize_relative_position(&self, relative: &CirclePosition, buffer: &mut BinBuffer) {
        buffer.write_u16(quantize_unit(relative.angle.rem_euclid(TAU) / TAU));
        buffer.write_u16(quantize_unit(relative.distance));
    }

    fn deserialize_relative_position(
        &self,
        buffer: &mut BinBuffer,
    ) -> Result<CirclePosition, FormatError> {
        let angle = dequantize_unit(buffer.read_u16()?) * TAU;
        let distance = dequantize_unit(buffer.read_u16()?);

        Ok(CirclePosition { angle, distance })
    }
}

/// Axis-aligned rectangular pond. Relative positions are offsets from the
/// origin corner in pond units, so shrinking the rectangle strands fish
/// that were beyond the new edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConstraintRectangle {
    pub origin: Vec2,
    pub width: f32,
    pub height: f32,
}

/// Offset from a rectangle's origin corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RectanglePosition {
    pub x: f32,
    pub y: f32,
}

impl ConstraintRectangle {
    pub fn new(origin: Vec2, width: f32, height: f32) -> Self {
        Self {
            origin,
            width,
            height,
        }
    }

    fn fits(&self, x: f32, y: f32) -> bool {
        // Quantized offsets are off by at most half a quantum of the side.
        let slack = |side: f32| 0.5 * side / u16::MAX as f32 + PROJECTION_EPSILON;
        let (sx, sy) = (slack(self.width), slack(self.height));

        (-sx..=self.width + sx).contains(&x) && (-sy..=self.height + sy).contains(&y)
    }
}

impl Constraint for ConstraintRectangle {
    type Relative = RectanglePosition;

    fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.origin.x
            && x <= self.origin.x + self.width
            && y >= self.origin.y
            && y <= self.origin.y + self.height
    }

    fn relative_position(&self, position: Vec2) -> Option<RectanglePosition> {
        let x = position.x - self.origin.x;
        let y = position.y - self.origin.y;

        if !self.fits(x, y) {
            return None;
        }

        Some(RectanglePosition {
            x: x.clamp(0.0, self.width),
            y: y.clamp(0.0, self.height),
        })
    }

    fn absolute_position(&self, relative: &RectanglePosition) -> Option<Vec2> {
        if !self.fits(relative.x, relative.y) {
            return None;
        }

        Some(Vec2::new(
            self.origin.x + relative.x.clamp(0.0, self.width),
            self.origin.y + relative.y.clamp(0.0, self.height),
        ))
    }

    /// Offsets are written as fractions of the sides, so any rectangle
    /// keeps the same relative precision.
    fn serialize_relative_position(&self, relative: &RectanglePosition, buffer: &mut BinBuffer) {
        let fraction = |v: f32, side: f32| if side > 0.0 { v / side } else { 0.0 };

        buffer.write_u16(quantize_unit(fraction(relative.x, self.width)));
        buffer.write_u16(quantize_unit(fraction(relative.y, self.height)));
    }

    fn deserialize_relative_position(
        &self,
        buffer: &mut BinBuffer,
    ) -> Result<RectanglePosition, FormatError> {
        let x = dequantize_unit(buffer.read_u16()?) * self.width;
        let y = dequantize_unit(buffer.read_u16()?) * self.height;

        Ok(RectanglePosition { x, y })
    }
}
