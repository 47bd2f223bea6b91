//! Fish generation - blueprints and the species catalog.

mod blueprint;
mod catalog;

pub use blueprint::*;
pub use catalog::*;
