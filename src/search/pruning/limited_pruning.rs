//! `limited_pruning`: disables an inner pruning method once it proves not
//! to be worth its overhead (spec §4.7, §9 Open Questions: "the pruning
//! ratio ... is computed only once ... reimplement exactly as specified
//! (single check)").

use crate::search::pruning::PruningMethod;
use crate::task::{OperatorId, Task};

#[derive(Debug)]
pub struct LimitedPruning<P> {
    inner: P,
    expansions_before_check: u32,
    min_required_ratio: f64,
    expansions_seen: u32,
    total_applicable: u64,
    total_pruned: u64,
    disabled: bool,
}

impl<P: PruningMethod> LimitedPruning<P> {
    pub fn new(inner: P, expansions_before_check: u32, min_required_ratio: f64) -> Self {
        LimitedPruning {
            inner,
            expansions_before_check,
            min_required_ratio,
            expansions_seen: 0,
            total_applicable: 0,
            total_pruned: 0,
            disabled: false,
        }
    }
}

impl<P: PruningMethod> PruningMethod for LimitedPruning<P> {
    fn prune(&mut self, task: &Task, values: &[i32], applicable: &[OperatorId]) -> Vec<OperatorId> {
        if self.disabled {
            return applicable.to_vec();
        }

        let pruned = self.inner.prune(task, values, applicable);
        self.expansions_seen += 1;
        self.total_applicable += applicable.len() as u64;
        self.total_pruned += (applicable.len() - pruned.len()) as u64;

        if self.expansions_seen == self.expansions_before_check {
            let ratio = if self.total_applicable == 0 {
                1.0
            } else {
                self.total_pruned as f64 / self.total_applicable as f64
            };
            if ratio < self.min_required_ratio {
                self.disabled = true;
            }
        }

        pruned
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::pruning::NullPruning;
    use crate::task::fixtures::ONE_STEP;

    #[test]
    fn disables_itself_once_the_check_fires_with_no_pruning_observed() {
        let task = Task::from_text(ONE_STEP).unwrap();
        let mut pruning = LimitedPruning::new(NullPruning, 1, 0.5);
        let applicable = vec![OperatorId(0)];
        pruning.prune(&task, &task.initial_state_values, &applicable);
        assert!(pruning.disabled);
    }
}
