//! The pruning contract (spec §4.7, §2: "computes a sound subset of
//! applicable operators per state").

use crate::task::{OperatorId, Task};

pub trait PruningMethod: std::fmt::Debug {
    /// Returns a sound subset of `applicable` that still admits at least one
    /// optimal plan (spec §8: "pruning preserves completeness").
    fn prune(&mut self, task: &Task, values: &[i32], applicable: &[OperatorId]) -> Vec<OperatorId>;
}
