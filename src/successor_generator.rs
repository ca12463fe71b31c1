//! Successor Generator (spec §4.2): a discrimination trie over operator
//! preconditions that enumerates applicable operators without scanning every
//! operator per state.
//!
//! Grounded on the teacher's `successor_generators/` family in shape (a
//! precompiled structure built once from the task, queried per state) though
//! the teacher's tries discriminate on lifted atoms; here each trie level
//! discriminates on one SAS+ variable's value.

use crate::task::{OperatorId, Task};

#[derive(Debug)]
enum Node {
    /// No more preconditions to check for every operator reaching this node;
    /// they are all applicable once we get here.
    Leaf(Vec<OperatorId>),
    /// Switch on `var`'s value. `branches[value]` holds the subtrie for
    /// operators requiring exactly that value; operators with no
    /// precondition on `var` live in `any`.
    Switch {
        var: usize,
        branches: Vec<Option<Box<Node>>>,
        any: Box<Node>,
    },
}

/// Deterministically enumerates applicable operators in ascending
/// [`OperatorId`] order (spec §4.2).
#[derive(Debug)]
pub struct SuccessorGenerator {
    root: Node,
}

impl SuccessorGenerator {
    pub fn new(task: &Task) -> Self {
        let mut remaining: Vec<(OperatorId, Vec<(usize, i32)>)> = task
            .operators()
            .iter()
            .enumerate()
            .map(|(i, op)| {
                let mut conds: Vec<(usize, i32)> =
                    op.preconditions.iter().map(|f| (f.var, f.value)).collect();
                conds.sort_unstable_by_key(|(v, _)| *v);
                (OperatorId(i), conds)
            })
            .collect();
        remaining.sort_by(|a, b| a.0.cmp(&b.0));
        let root = build_node(task, remaining);
        SuccessorGenerator { root }
    }

    pub fn generate_applicable_ops(&self, values: &[i32]) -> Vec<OperatorId> {
        let mut out = Vec::new();
        collect(&self.root, values, &mut out);
        out.sort_unstable();
        out
    }
}

fn build_node(task: &Task, ops: Vec<(OperatorId, Vec<(usize, i32)>)>) -> Node {
    if ops.iter().all(|(_, conds)| conds.is_empty()) {
        let mut ids: Vec<OperatorId> = ops.into_iter().map(|(id, _)| id).collect();
        ids.sort_unstable();
        return Node::Leaf(ids);
    }
    // Split on the smallest variable index appearing in any remaining
    // operator's precondition list.
    let var = ops
        .iter()
        .filter_map(|(_, conds)| conds.first().map(|(v, _)| *v))
        .min()
        .expect("at least one operator has a remaining precondition");

    let domain_size = task.variables[var].domain_size();
    let mut buckets: Vec<Vec<(OperatorId, Vec<(usize, i32)>)>> =
        (0..domain_size).map(|_| Vec::new()).collect();
    let mut any: Vec<(OperatorId, Vec<(usize, i32)>)> = Vec::new();

    for (id, mut conds) in ops {
        match conds.first() {
            Some(&(v, value)) if v == var => {
                conds.remove(0);
                buckets[value as usize].push((id, conds));
            }
            _ => any.push((id, conds)),
        }
    }

    let branches = buckets
        .into_iter()
        .map(|bucket| {
            if bucket.is_empty() {
                None
            } else {
                Some(Box::new(build_node(task, bucket)))
            }
        })
        .collect();

    Node::Switch {
        var,
        branches,
        any: Box::new(build_node(task, any)),
    }
}

fn collect(node: &Node, values: &[i32], out: &mut Vec<OperatorId>) {
    match node {
        Node::Leaf(ids) => out.extend_from_slice(ids),
        Node::Switch { var, branches, any } => {
            if let Some(Some(branch)) = branches.get(values[*var] as usize) {
                collect(branch, values, out);
            }
            collect(any, values, out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::fixtures::ONE_STEP;
    use crate::task::Task;

    #[test]
    fn finds_the_single_applicable_operator() {
        let task = Task::from_text(ONE_STEP).unwrap();
        let generator = SuccessorGenerator::new(&task);
        let ops = generator.generate_applicable_ops(&task.initial_state_values);
        assert_eq!(ops, vec![OperatorId(0)]);
    }

    #[test]
    fn operators_are_returned_in_ascending_id_order() {
        let text = "\
begin_version
3
end_version
begin_metric
0
end_metric
1
begin_variable
var0
-1
2
Atom a
Atom b
end_variable
0
0
begin_state
0
end_state
begin_goal
1
0 1
end_goal
2
begin_operator
second
0
0
1
0 -1 1
1
end_operator
begin_operator
first
0
0
1
0 -1 1
1
end_operator
0
";
        let task = Task::from_text(text).unwrap();
        let generator = SuccessorGenerator::new(&task);
        let ops = generator.generate_applicable_ops(&task.initial_state_values);
        assert_eq!(ops, vec![OperatorId(0), OperatorId(1)]);
    }
}
