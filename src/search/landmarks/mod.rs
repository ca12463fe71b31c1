//! Landmark discovery and cost partitioning (spec §4.11).

pub mod cost_partitioning;
mod heuristic;
pub mod landmark_graph;
mod simplex;
pub mod status;

pub use heuristic::{LandmarkCostPartitioningHeuristic, PartitioningMethod};
pub use landmark_graph::{Landmark, LandmarkGraph};
