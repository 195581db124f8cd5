//! Core domain types for spriterig.
//!
//! - `MaterialSet` - Named material assignment applied to every render target
//! - `AnimationSet` - Named frame range that plays together
//! - `FrameDescriptor` / `OutputUnit` - Rendered frames awaiting compositing
//! - `Colour` - RGBA swatch colour used by placeholder renders

mod animation;
mod colour;
mod frame;
mod material;

pub use animation::AnimationSet;
pub use colour::Colour;
pub use frame::{FrameDescriptor, OutputUnit};
pub use material::{MaterialAssignment, MaterialSet};
