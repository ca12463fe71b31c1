//! Landmark-cut heuristic (spec §4.5). Grounded on
//! `original_source/src/search/heuristics/lm_cut_landmarks.h` and
//! `lm_cut_heuristic.cc`: an h^max exploration over a relaxed task,
//! repeated goal-zone cuts, and incremental re-exploration after each cut.

use std::collections::VecDeque;

use crate::error::UnsupportedFeatureError;
use crate::search::heuristics::heuristic::{EvaluationResult, Heuristic, MAX_COST_VALUE};
use crate::search::heuristics::relaxation::{PropId, RelaxationTables};
use crate::search::priority_queue::AdaptiveQueue;
use crate::task::proxy::TaskView;
use crate::task::{FactPair, OperatorId};

/// Reachability from the first h^max exploration. The goal-zone /
/// before-goal-zone partition (spec §3) is computed separately per cut as
/// plain `bool` vectors (see [`mark_zone`] / [`find_cut`]) rather than kept
/// as extra enum states, since it is recomputed every iteration anyway.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Status {
    Unreached,
    Reached,
}

/// Landmark-cut's own relaxed-operator bookkeeping: like a
/// [`crate::search::heuristics::relaxation::UnaryOperatorTemplate`] but with
/// a mutable running cost and a chosen h^max supporter (spec §3).
#[derive(Debug, Clone)]
struct RelaxedOperator {
    effect: PropId,
    preconditions: Vec<PropId>,
    base_cost: i32,
    cost: i32,
    unsatisfied: usize,
    h_max_supporter: Option<PropId>,
    operator_no: Option<OperatorId>,
}

#[derive(Debug)]
pub struct LmCutHeuristic {
    tables: RelaxationTables,
    /// Synthetic proposition reached only once every goal fact holds; one
    /// zero-cost synthetic operator per goal fact feeds it.
    artificial_goal: PropId,
    /// The operator-id landmarks reported by the most recent [`LmCutHeuristic::evaluate`]
    /// call, one set per cut (spec §4.5 step 4c: "report the cut as a
    /// landmark ... to an optional callback").
    landmarks: Vec<Vec<OperatorId>>,
}

impl LmCutHeuristic {
    pub fn new(task: &TaskView) -> Result<Self, UnsupportedFeatureError> {
        let root = task.root_task();
        if !root.axioms().is_empty() {
            return Err(UnsupportedFeatureError {
                component: "h^LM-cut",
                feature: "axioms",
            });
        }
        if root.operators().iter().any(|op| op.has_conditional_effects()) {
            return Err(UnsupportedFeatureError {
                component: "h^LM-cut",
                feature: "conditional effects",
            });
        }
        let tables = RelaxationTables::new(task);
        let artificial_goal = tables.num_propositions();
        Ok(LmCutHeuristic {
            tables,
            artificial_goal,
            landmarks: Vec::new(),
        })
    }

    /// The landmarks (each a set of operators, at least one of which must be
    /// applied on every relaxed plan) found during the most recent evaluation.
    pub fn landmarks(&self) -> &[Vec<OperatorId>] {
        &self.landmarks
    }

    fn build_relaxed_ops(&self, _task: &TaskView) -> Vec<RelaxedOperator> {
        let mut ops: Vec<RelaxedOperator> = self
            .tables
            .unary_ops
            .iter()
            .map(|op| RelaxedOperator {
                effect: op.effect,
                preconditions: op.preconditions.clone(),
                base_cost: op.base_cost,
                cost: op.base_cost,
                unsatisfied: op.preconditions.len(),
                h_max_supporter: None,
                operator_no: op.operator_no,
            })
            .collect();
        // One zero-cost synthetic operator per goal fact, feeding the
        // artificial goal proposition (spec §4.5: "artificial_goal").
        for &goal_prop in &self.tables_goal_props() {
            ops.push(RelaxedOperator {
                effect: self.artificial_goal,
                preconditions: vec![goal_prop],
                base_cost: 0,
                cost: 0,
                unsatisfied: 1,
                h_max_supporter: None,
                operator_no: None,
            });
        }
        ops
    }

    fn tables_goal_props(&self) -> Vec<PropId> {
        self.tables.goal_props_pub()
    }
}

impl Heuristic for LmCutHeuristic {
    fn evaluate(&mut self, task: &TaskView, values: &[i32]) -> EvaluationResult {
        let num_props = self.artificial_goal + 1;
        let mut ops = self.build_relaxed_ops(task);
        let mut precondition_of: Vec<Vec<usize>> = vec![Vec::new(); num_props];
        for (i, op) in ops.iter().enumerate() {
            for &pre in &op.preconditions {
                precondition_of[pre].push(i);
            }
        }

        let mut status = vec![Status::Unreached; num_props];
        let mut h_max_cost = vec![0i32; num_props];
        let true_props: std::collections::HashSet<PropId> = values
            .iter()
            .enumerate()
            .map(|(var, &value)| self.tables.prop_id_pub(FactPair::new(var, value)))
            .collect();

        first_exploration(
            &mut ops,
            &precondition_of,
            &true_props,
            &mut status,
            &mut h_max_cost,
        );

        self.landmarks.clear();
        if status[self.artificial_goal] == Status::Unreached {
            return EvaluationResult::DeadEnd;
        }

        let mut h = 0i32;
        loop {
            if h_max_cost[self.artificial_goal] == 0 {
                break;
            }
            let mut goal_zone = vec![false; num_props];
            mark_zone(&ops, self.artificial_goal, &mut goal_zone);
            let cut = find_cut(&ops, &true_props, &goal_zone);
            debug_assert!(!cut.is_empty(), "LM-cut must always find a non-empty cut");
            let cut_cost = cut.iter().map(|&i| ops[i].cost).min().unwrap_or(0);
            self.landmarks
                .push(cut.iter().filter_map(|&i| ops[i].operator_no).collect());
            for &i in &cut {
                ops[i].cost -= cut_cost;
            }
            h = h.saturating_add(cut_cost).min(MAX_COST_VALUE);

            // Incremental re-exploration: only the cut operators' costs
            // changed, so a fresh h^max pass is safe (and simple) though
            // not as cheap as the original's queue-resumption scheme.
            for entry in status.iter_mut() {
                *entry = Status::Unreached;
            }
            for op in ops.iter_mut() {
                op.unsatisfied = op.preconditions.len();
                op.h_max_supporter = None;
            }
            first_exploration(&mut ops, &precondition_of, &true_props, &mut status, &mut h_max_cost);
            if status[self.artificial_goal] == Status::Unreached {
                break;
            }
        }

        EvaluationResult::Value(h)
    }

    fn dead_ends_are_reliable(&self) -> bool {
        true
    }
}

fn first_exploration(
    ops: &mut [RelaxedOperator],
    precondition_of: &[Vec<usize>],
    true_props: &std::collections::HashSet<PropId>,
    status: &mut [Status],
    h_max_cost: &mut [i32],
) {
    let mut queue: AdaptiveQueue<PropId> = AdaptiveQueue::new();
    for &prop in true_props {
        queue.push(0, prop);
    }
    for entry in h_max_cost.iter_mut() {
        *entry = 0;
    }
    for &prop in true_props {
        status[prop] = Status::Reached;
    }

    while let Some((d, prop)) = queue.pop() {
        if status[prop] == Status::Reached && d > h_max_cost[prop] {
            continue;
        }
        h_max_cost[prop] = d;
        status[prop] = Status::Reached;
        for &op_idx in &precondition_of[prop] {
            let op = &mut ops[op_idx];
            if op.unsatisfied == 0 {
                continue;
            }
            op.unsatisfied -= 1;
            let supporter_cost = op
                .h_max_supporter
                .map(|s| h_max_cost[s])
                .unwrap_or(-1);
            if d >= supporter_cost {
                op.h_max_supporter = Some(prop);
            }
            if op.unsatisfied == 0 {
                let supporter_cost = op.h_max_supporter.map(|s| h_max_cost[s]).unwrap_or(0);
                let cost = supporter_cost.saturating_add(op.cost);
                queue.push(cost, op.effect);
            }
        }
    }
}

fn mark_zone(ops: &[RelaxedOperator], goal: PropId, zone: &mut [bool]) {
    let mut queue = VecDeque::new();
    queue.push_back(goal);
    zone[goal] = true;
    while let Some(prop) = queue.pop_front() {
        for op in ops {
            if op.effect == prop && op.cost == 0 {
                for &pre in &op.preconditions {
                    if op.h_max_supporter == Some(pre) && !zone[pre] {
                        zone[pre] = true;
                        queue.push_back(pre);
                    }
                }
            }
        }
    }
}

fn find_cut(
    ops: &[RelaxedOperator],
    true_props: &std::collections::HashSet<PropId>,
    goal_zone: &[bool],
) -> Vec<usize> {
    // Forward BFS from the initial propositions over h_max_supporter edges,
    // staying outside the goal zone, to find which operators cross into it.
    let mut before_goal_zone = vec![false; goal_zone.len()];
    let mut queue: VecDeque<PropId> = true_props.iter().filter(|&&p| !goal_zone[p]).copied().collect();
    for &p in true_props {
        if !goal_zone[p] {
            before_goal_zone[p] = true;
        }
    }
    let mut cut = Vec::new();
    let mut visited_ops = vec![false; ops.len()];
    while let Some(prop) = queue.pop_front() {
        for (i, op) in ops.iter().enumerate() {
            if op.h_max_supporter != Some(prop) || visited_ops[i] {
                continue;
            }
            if goal_zone[op.effect] {
                cut.push(i);
                visited_ops[i] = true;
            } else if !before_goal_zone[op.effect] {
                before_goal_zone[op.effect] = true;
                visited_ops[i] = true;
                queue.push_back(op.effect);
            }
        }
    }
    cut
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::fixtures::ONE_STEP;
    use crate::task::Task;

    #[test]
    fn lmcut_matches_hadd_on_a_single_operator_chain() {
        let task = Task::from_text(ONE_STEP).unwrap();
        let view = TaskView::root(&task);
        let mut lmcut = LmCutHeuristic::new(&view).unwrap();
        let h = lmcut.evaluate(&view, &task.initial_state_values);
        assert_eq!(h, EvaluationResult::Value(3));
    }

    #[test]
    fn dead_end_task_is_reported_as_dead_end() {
        use crate::task::fixtures::DEAD_END;
        let task = Task::from_text(DEAD_END).unwrap();
        let view = TaskView::root(&task);
        let mut lmcut = LmCutHeuristic::new(&view).unwrap();
        assert_eq!(
            lmcut.evaluate(&view, &task.initial_state_values),
            EvaluationResult::DeadEnd
        );
    }
}
