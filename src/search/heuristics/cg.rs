//! Causal-graph heuristic h^cg (spec §4.6). Each DTG transition is treated
//! as a "local unary operator" whose precondition propositions are
//! `(var, value)` pairs of *other* variables and whose effect is its own
//! target value; a single Dijkstra over the union of all variables' DTG
//! nodes then plays the same role the additive relaxation heuristic's
//! unsatisfied-precondition counting does in `relaxation.rs`, just at
//! variable-value rather than ground-fact granularity.
//!
//! Grounded on `original_source/src/search/heuristics/cg_heuristic.cc`: the
//! acyclic-CG restriction (`var <= cond_var`) on DTG construction is applied
//! in [`super::dtg::build_dtgs`].

use crate::search::heuristics::dtg::{build_dtgs, DomainTransitionGraph};
use crate::search::heuristics::heuristic::{EvaluationResult, Heuristic, MAX_COST_VALUE};
use crate::search::priority_queue::AdaptiveQueue;
use crate::task::proxy::TaskView;
use crate::task::OperatorId;

#[derive(Debug)]
pub struct CgHeuristic {
    graphs: Vec<DomainTransitionGraph>,
    var_offset: Vec<usize>,
    num_nodes: usize,
    preferred: Vec<OperatorId>,
}

impl CgHeuristic {
    pub fn new(task: &TaskView) -> Self {
        let graphs = build_dtgs(task, true);
        let mut var_offset = Vec::with_capacity(graphs.len());
        let mut offset = 0;
        for graph in &graphs {
            var_offset.push(offset);
            offset += graph.nodes.len();
        }
        CgHeuristic {
            graphs,
            var_offset,
            num_nodes: offset,
            preferred: Vec::new(),
        }
    }

    fn node_id(&self, var: usize, value: i32) -> usize {
        self.var_offset[var] + value as usize
    }
}

impl Heuristic for CgHeuristic {
    fn evaluate(&mut self, task: &TaskView, values: &[i32]) -> EvaluationResult {
        let mut dist = vec![-1i32; self.num_nodes];
        let mut queue: AdaptiveQueue<usize> = AdaptiveQueue::new();
        for (var, &value) in values.iter().enumerate() {
            let node = self.node_id(var, value);
            dist[node] = 0;
            queue.push(0, node);
        }

        while let Some((d, node)) = queue.pop() {
            if dist[node] != -1 && d > dist[node] {
                continue;
            }
            let (var, from_value) = self.var_value_of(node);
            for transition in &self.graphs[var].nodes[from_value as usize].transitions {
                let Some(cond_cost) = transition
                    .condition
                    .iter()
                    .map(|f| dist[self.node_id(f.var, f.value)])
                    .try_fold(0i32, |acc, c| (c != -1).then(|| acc.saturating_add(c)))
                else {
                    continue;
                };
                let edge_cost = task
                    .operator_cost(transition.operator)
                    .saturating_add(cond_cost)
                    .min(MAX_COST_VALUE);
                let total = d.saturating_add(edge_cost).min(MAX_COST_VALUE);
                let target = self.node_id(var, transition.target);
                if dist[target] == -1 || total < dist[target] {
                    dist[target] = total;
                    queue.push(total, target);
                }
            }
        }

        let mut h = 0i32;
        self.preferred.clear();
        for &fact in task.goal() {
            let node = self.node_id(fact.var, fact.value);
            if dist[node] == -1 {
                return EvaluationResult::DeadEnd;
            }
            h = h.saturating_add(dist[node]).min(MAX_COST_VALUE);
        }
        EvaluationResult::Value(h)
    }

    fn preferred_operators(&self) -> &[OperatorId] {
        &self.preferred
    }
}

impl CgHeuristic {
    fn var_value_of(&self, node: usize) -> (usize, i32) {
        // var_offset is sorted ascending; partition_point finds the owning variable.
        let var = self.var_offset.partition_point(|&o| o <= node) - 1;
        (var, (node - self.var_offset[var]) as i32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::fixtures::ONE_STEP;
    use crate::task::Task;

    #[test]
    fn single_operator_chain_has_cost_equal_to_the_operator() {
        let task = Task::from_text(ONE_STEP).unwrap();
        let view = TaskView::root(&task);
        let mut cg = CgHeuristic::new(&view);
        let h = cg.evaluate(&view, &task.initial_state_values);
        assert_eq!(h, EvaluationResult::Value(3));
    }

    #[test]
    fn dead_end_task_is_reported_as_dead_end() {
        use crate::task::fixtures::DEAD_END;
        let task = Task::from_text(DEAD_END).unwrap();
        let view = TaskView::root(&task);
        let mut cg = CgHeuristic::new(&view);
        assert_eq!(
            cg.evaluate(&view, &task.initial_state_values),
            EvaluationResult::DeadEnd
        );
    }
}
