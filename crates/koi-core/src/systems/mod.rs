//! Systems - logic that operates on whole ponds of fish

mod constellation;
mod pond;
mod spawner;

pub use constellation::*;
pub use pond::*;
pub use spawner::*;
