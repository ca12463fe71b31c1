//! Shared precomputation for the stubborn-set family (spec §4.7). Grounded
//! on `original_source/src/search/pruning/stubborn_sets.h`: a per-task
//! `sorted_op_preconditions` / achiever index and an interference relation,
//! computed once and reused by every state's pruning call.

use crate::task::{FactPair, OperatorId, Task};

#[derive(Debug)]
pub struct StubbornSetData {
    /// `achievers[var][value]`: operators with some effect assigning that
    /// fact (spec §4.7: "operators that achieve an unsatisfied ... fact").
    achievers: Vec<Vec<Vec<OperatorId>>>,
    /// `interference[op]`: operators that conflict with, disable, or are
    /// disabled by `op` (spec §4.7 simple variant: "add all operators
    /// interfering with `o`").
    interference: Vec<Vec<OperatorId>>,
}

impl StubbornSetData {
    pub fn new(task: &Task) -> Self {
        let mut achievers: Vec<Vec<Vec<OperatorId>>> = task
            .variables
            .iter()
            .map(|v| vec![Vec::new(); v.domain_size()])
            .collect();
        for (i, op) in task.operators().iter().enumerate() {
            for effect in &op.effects {
                achievers[effect.effect.var][effect.effect.value as usize].push(OperatorId(i));
            }
        }

        let num_ops = task.num_operators();
        let mut interference: Vec<Vec<OperatorId>> = vec![Vec::new(); num_ops];
        for a in 0..num_ops {
            for b in (a + 1)..num_ops {
                if interferes(task.operator(OperatorId(a)), task.operator(OperatorId(b))) {
                    interference[a].push(OperatorId(b));
                    interference[b].push(OperatorId(a));
                }
            }
        }

        StubbornSetData {
            achievers,
            interference,
        }
    }

    pub fn achievers(&self, fact: FactPair) -> &[OperatorId] {
        &self.achievers[fact.var][fact.value as usize]
    }

    pub fn interferers(&self, op: OperatorId) -> &[OperatorId] {
        &self.interference[op.index()]
    }

    /// The first precondition of `op` not satisfied in `values`, if any.
    pub fn first_unsatisfied_precondition(&self, task: &Task, op: OperatorId, values: &[i32]) -> Option<FactPair> {
        task.operator(op)
            .preconditions
            .iter()
            .find(|f| values[f.var] != f.value)
            .copied()
    }
}

/// Two operators interfere (spec §4.7: "conflict, disabler, or
/// disabled-by") if one's effect conflicts with the other's effect on a
/// shared variable, or one's effect falsifies the other's precondition.
fn interferes(a: &crate::task::Operator, b: &crate::task::Operator) -> bool {
    for effect_a in &a.effects {
        for effect_b in &b.effects {
            if effect_a.effect.var == effect_b.effect.var && effect_a.effect.value != effect_b.effect.value {
                return true;
            }
        }
        if b
            .preconditions
            .iter()
            .any(|p| p.var == effect_a.effect.var && p.value != effect_a.effect.value)
        {
            return true;
        }
    }
    for effect_b in &b.effects {
        if a
            .preconditions
            .iter()
            .any(|p| p.var == effect_b.effect.var && p.value != effect_b.effect.value)
        {
            return true;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::fixtures::ONE_STEP;

    #[test]
    fn single_operator_achieves_the_goal_fact() {
        let task = Task::from_text(ONE_STEP).unwrap();
        let data = StubbornSetData::new(&task);
        assert_eq!(data.achievers(FactPair::new(0, 1)), &[OperatorId(0)]);
    }
}
