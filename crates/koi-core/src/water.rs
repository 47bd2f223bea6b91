//! Water surface disturbances caused by swimming fish.

use std::collections::VecDeque;

use crate::math::Vec2;

/// Most ripples kept between frames. Older ones are dropped first.
pub const RIPPLE_CAPACITY: usize = 256;

/// Something fish can disturb while swimming near the surface.
pub trait Water {
    fn disturb(&mut self, position: Vec2, radius: f32, amount: f32);
}

/// A single disturbance waiting to be consumed by the water renderer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ripple {
    pub position: Vec2,
    pub radius: f32,
    pub amount: f32,
}

/// Collects ripples between frames, keeping at most [`RIPPLE_CAPACITY`].
#[derive(Debug, Clone, Default)]
pub struct Ripples {
    pending: VecDeque<Ripple>,
}

impl Ripples {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Hand every pending ripple to the caller, oldest first.
    pub fn drain(&mut self) -> std::collections::vec_deque::Drain<'_, Ripple> {
        self.pending.drain(..)
    }
}

impl Water for Ripples {
    fn disturb(&mut self, position: Vec2, radius: f32, amount: f32) {
        if self.pending.len() == RIPPLE_CAPACITY {
            self.pending.pop_front();
        }

        self.pending.push_back(Ripple {
            position,
            radius,
            amount,
        });
    }
}
