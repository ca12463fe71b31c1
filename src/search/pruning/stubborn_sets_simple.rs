//! Simple stubborn sets (SSS, spec §4.7). Grounded on
//! `original_source/src/search/pruning/stubborn_sets_simple.h`.

use crate::search::pruning::stubborn_sets::StubbornSetData;
use crate::search::pruning::PruningMethod;
use crate::task::{OperatorId, Task};

#[derive(Debug)]
pub struct StubbornSetsSimple {
    data: Option<StubbornSetData>,
}

impl StubbornSetsSimple {
    pub fn new() -> Self {
        StubbornSetsSimple { data: None }
    }

    fn data(&mut self, task: &Task) -> &StubbornSetData {
        self.data.get_or_insert_with(|| StubbornSetData::new(task))
    }
}

impl Default for StubbornSetsSimple {
    fn default() -> Self {
        Self::new()
    }
}

impl PruningMethod for StubbornSetsSimple {
    fn prune(&mut self, task: &Task, values: &[i32], applicable: &[OperatorId]) -> Vec<OperatorId> {
        let data = self.data(task);
        let num_ops = task.num_operators();
        let mut in_set = vec![false; num_ops];
        let mut worklist = Vec::new();

        let mut push = |op: OperatorId, in_set: &mut Vec<bool>, worklist: &mut Vec<OperatorId>| {
            if !in_set[op.index()] {
                in_set[op.index()] = true;
                worklist.push(op);
            }
        };

        for &goal in task.goal.iter() {
            if values[goal.var] != goal.value {
                for &achiever in data.achievers(goal) {
                    push(achiever, &mut in_set, &mut worklist);
                }
            }
        }

        while let Some(op) = worklist.pop() {
            if task.operator(op).is_applicable(values) {
                for &interferer in data.interferers(op) {
                    push(interferer, &mut in_set, &mut worklist);
                }
            } else if let Some(fact) = data.first_unsatisfied_precondition(task, op, values) {
                for &achiever in data.achievers(fact) {
                    push(achiever, &mut in_set, &mut worklist);
                }
            }
        }

        applicable
            .iter()
            .filter(|op| in_set[op.index()])
            .copied()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::successor_generator::SuccessorGenerator;
    use crate::task::Task;

    // Two independent variables, each with one operator that satisfies a
    // goal fact and one irrelevant operator that touches neither goal.
    const TWO_INDEPENDENT_GOALS: &str = "\
begin_version
3
end_version
begin_metric
0
end_metric
2
begin_variable
var0
-1
2
Atom v0(1)
Atom v0(2)
end_variable
begin_variable
var1
-1
2
Atom v1(1)
Atom v1(2)
end_variable
0
0
begin_state
0
0
end_state
begin_goal
2
0 1
1 1
end_goal
2
begin_operator
achieve-v0
0
0
1
0 -1 1
1
end_operator
begin_operator
achieve-v1
0
0
1
1 -1 1
1
end_operator
0
";

    #[test]
    fn pruned_set_is_a_subset_of_applicable_operators() {
        let task = Task::from_text(TWO_INDEPENDENT_GOALS).unwrap();
        let generator = SuccessorGenerator::new(&task);
        let mut pruning = StubbornSetsSimple::new();
        let applicable = generator.generate_applicable_ops(&task.initial_state_values);
        let pruned = pruning.prune(&task, &task.initial_state_values, &applicable);
        assert!(pruned.iter().all(|op| applicable.contains(op)));
        assert_eq!(pruned.len(), 2);
    }
}
