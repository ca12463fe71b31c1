//! The identity pruning method: no operators are ever pruned.

use crate::search::pruning::PruningMethod;
use crate::task::{OperatorId, Task};

#[derive(Debug, Default)]
pub struct NullPruning;

impl PruningMethod for NullPruning {
    fn prune(&mut self, _task: &Task, _values: &[i32], applicable: &[OperatorId]) -> Vec<OperatorId> {
        applicable.to_vec()
    }
}
