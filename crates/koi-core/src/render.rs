//! Renderer seam. The simulation hands its fish over once per frame; what
//! happens to them afterwards is up to the host.

use crate::components::Fish;
use crate::math::Vec2;

/// Consumes every fish of a pond each frame.
pub trait Bodies {
    /// `time` is the interpolation factor between the previous and the
    /// current tick, in `[0, 1]`.
    fn render(&mut self, fishes: &[Fish], time: f32);
}

/// What a renderer needs to draw one fish.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodySnapshot {
    pub position: Vec2,
    pub direction: Vec2,
    pub size: f32,
    pub slot: Option<u32>,
}

/// Headless renderer collecting one snapshot per fish per frame.
#[derive(Debug, Clone, Default)]
pub struct BodyList {
    pub bodies: Vec<BodySnapshot>,
}

impl BodyList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.bodies.clear();
    }
}

impl Bodies for BodyList {
    fn render(&mut self, fishes: &[Fish], time: f32) {
        self.bodies.extend(fishes.iter().map(|fish| BodySnapshot {
            position: fish.render_position(time),
            direction: fish.direction,
            size: fish.size(),
            slot: fish.body.pattern.slot().map(|slot| slot.index()),
        }));
    }
}
