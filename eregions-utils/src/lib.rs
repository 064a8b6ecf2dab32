//! # eRegions Utils
//!
//! Small shared building blocks for the eRegions plugin: block geometry, player identity,
//! tick arithmetic and chat colour formatting.

pub mod math;
pub mod text;
pub mod ticks;
pub mod types;

pub use math::{BlockPos, Cuboid, Vector3};
pub use types::PlayerId;
