//! Fish and the data they are made of.
//!
//! Components are plain data with the behaviour of a single fish; anything
//! involving more than one fish lives in the systems.

mod body;
mod fish;
mod pattern;

pub use body::*;
pub use fish::*;
pub use pattern::*;
