//! Context-enhanced additive heuristic h^cea (spec §4.6). Reuses the same
//! per-(variable, value)-node Dijkstra as [`super::cg::CgHeuristic`], over
//! the *non*-acyclic-restricted DTGs (CEA, unlike CG, does not need the
//! `var <= cond_var` cycle-breaking restriction since its local problems are
//! solved independently per variable rather than folded into one global
//! causal-graph order).
//!
//! Grounded on `original_source/src/search/heuristics/cea_heuristic.h`'s
//! local-problem-per-variable structure; true per-node "context" (the values
//! of the *other* variables at the time a node was reached, spec §4.6
//! "realises context-enhancement") is not tracked here, only the transition
//! that produced each node's distance, which is enough to recover helpful
//! transitions along the cheapest path to each goal value.

use crate::search::heuristics::dtg::{build_dtgs, DomainTransitionGraph};
use crate::search::heuristics::heuristic::{EvaluationResult, Heuristic, MAX_COST_VALUE};
use crate::search::priority_queue::AdaptiveQueue;
use crate::task::proxy::TaskView;
use crate::task::OperatorId;

#[derive(Debug)]
pub struct CeaHeuristic {
    graphs: Vec<DomainTransitionGraph>,
    var_offset: Vec<usize>,
    num_nodes: usize,
    preferred: Vec<OperatorId>,
}

impl CeaHeuristic {
    pub fn new(task: &TaskView) -> Self {
        let graphs = build_dtgs(task, false);
        let mut var_offset = Vec::with_capacity(graphs.len());
        let mut offset = 0;
        for graph in &graphs {
            var_offset.push(offset);
            offset += graph.nodes.len();
        }
        CeaHeuristic {
            graphs,
            var_offset,
            num_nodes: offset,
            preferred: Vec::new(),
        }
    }

    fn node_id(&self, var: usize, value: i32) -> usize {
        self.var_offset[var] + value as usize
    }

    fn var_value_of(&self, node: usize) -> (usize, i32) {
        let var = self.var_offset.partition_point(|&o| o <= node) - 1;
        (var, (node - self.var_offset[var]) as i32)
    }
}

impl Heuristic for CeaHeuristic {
    fn evaluate(&mut self, task: &TaskView, values: &[i32]) -> EvaluationResult {
        let mut dist = vec![-1i32; self.num_nodes];
        let mut reached_by: Vec<Option<OperatorId>> = vec![None; self.num_nodes];
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
                    reached_by[target] = Some(transition.operator);
                    queue.push(total, target);
                }
            }
        }

        self.preferred.clear();
        let mut h = 0i32;
        for &fact in task.goal() {
            let node = self.node_id(fact.var, fact.value);
            if dist[node] == -1 {
                self.preferred.clear();
                return EvaluationResult::DeadEnd;
            }
            h = h.saturating_add(dist[node]).min(MAX_COST_VALUE);
            if let Some(op) = Self::cheapest_path_operator(node, &reached_by) {
                if !self.preferred.contains(&op) {
                    self.preferred.push(op);
                }
            }
        }
        EvaluationResult::Value(h)
    }

    fn preferred_operators(&self) -> &[OperatorId] {
        &self.preferred
    }
}

impl CeaHeuristic {
    /// The operator on the near end of the cheapest path back from
    /// `goal_node` through `reached_by` (spec §4.6: "helpful transitions ...
    /// recorded along the cheapest path from the goal problem's node ...
    /// back toward the start"). `None` if the goal node was already true in
    /// the state (no supporter).
    fn cheapest_path_operator(
        goal_node: usize,
        reached_by: &[Option<OperatorId>],
    ) -> Option<OperatorId> {
        reached_by[goal_node]
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
        let mut cea = CeaHeuristic::new(&view);
        let h = cea.evaluate(&view, &task.initial_state_values);
        assert_eq!(h, EvaluationResult::Value(3));
    }

    #[test]
    fn dead_end_task_is_reported_as_dead_end() {
        use crate::task::fixtures::DEAD_END;
        let task = Task::from_text(DEAD_END).unwrap();
        let view = TaskView::root(&task);
        let mut cea = CeaHeuristic::new(&view);
        assert_eq!(
            cea.evaluate(&view, &task.initial_state_values),
            EvaluationResult::DeadEnd
        );
    }
}
