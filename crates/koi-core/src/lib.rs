//! Koi Core - Koi Pond Simulation Engine
//!
//! Procedurally generated koi swim, school, court and age inside ponds of
//! arbitrary shape. New fish arrive in schools through a river.
//!
//! # Architecture
//!
//! - **Components**: a single fish and the genes it is made of
//! - **Generation**: species blueprints built from shaped samplers
//! - **Systems**: ponds, the spawner and the constellation tying them together
//! - **Engine**: ticks everything with one seeded random stream
//!
//! Rendering stays outside the crate. Fish patterns are allocated in an
//! [`Atlas`](atlas::Atlas), water disturbances go to a [`Water`](water::Water)
//! and every frame the fish are handed to a [`Bodies`](render::Bodies)
//! renderer.
//!
//! # Example
//!
//! ```rust,no_run
//! use koi_core::prelude::*;
//!
//! let ponds = vec![Pond::new(ConstraintCircle::new(Vec2::ZERO, 6.0))];
//! let mut engine = SimulationEngine::new(
//!     SimConfig::default(),
//!     ponds,
//!     Vec2::new(-5.0, 0.0),
//!     Vec2::new(1.0, 0.0),
//! )
//! .expect("valid config");
//!
//! loop {
//!     engine.update();
//! }
//! ```

pub mod atlas;
pub mod buffer;
pub mod components;
pub mod config;
pub mod constraint;
pub mod engine;
pub mod generation;
pub mod math;
pub mod path;
pub mod persistence;
pub mod render;
pub mod samplers;
pub mod systems;
pub mod water;

#[cfg(test)]
pub(crate) mod testing;

/// Commonly used types for convenient importing
pub mod prelude {
    pub use crate::atlas::{Atlas, RandomSource, SlotAtlas};
    pub use crate::components::*;
    pub use crate::config::SimConfig;
    pub use crate::constraint::{Constraint, ConstraintCircle, ConstraintRectangle};
    pub use crate::engine::SimulationEngine;
    pub use crate::math::{Vec2, Vec3};
    pub use crate::systems::{Constellation, Pond};
}
