//! Packed states and the state registry (spec §3, §4.1).

mod packed;
mod registry;

pub use packed::{PackedState, StateLayout};
pub use registry::{StateId, StateRegistry};
