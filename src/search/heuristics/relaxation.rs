//! Shared proposition / unary-operator tables driving h^max, h^add and h^FF
//! (spec §4.4). Grounded on `original_source/src/search/heuristics/
//! additive_heuristic.cc` (`setup_exploration_queue`, `relaxed_exploration`,
//! `mark_preferred_operators`), reshaped onto the arena-of-indices style the
//! Design Notes call for: propositions and unary operators live in parallel
//! `Vec`s, cross-references are plain indices (`PropId`, unary-operator
//! index), not owning pointers.

use crate::search::heuristics::heuristic::{EvaluationResult, Heuristic, MAX_COST_VALUE};
use crate::search::priority_queue::AdaptiveQueue;
use crate::task::proxy::TaskView;
use crate::task::{FactPair, OperatorId};

pub type PropId = usize;

/// A compiled ground operator effect (spec §3: "each multi-effect operator
/// yields one UnaryOperator per effect").
#[derive(Debug, Clone)]
pub struct UnaryOperatorTemplate {
    pub effect: PropId,
    pub preconditions: Vec<PropId>,
    pub base_cost: i32,
    /// `None` for axiom-derived unary operators (spec §3: "back-pointer
    /// `operator_no` (or -1 for axiom)").
    pub operator_no: Option<OperatorId>,
}

/// The static part of the relaxation model: compiled once per task, shared
/// by every evaluation.
#[derive(Debug)]
pub struct RelaxationTables {
    num_propositions: usize,
    fact_offset: Vec<usize>,
    goal_props: Vec<PropId>,
    pub unary_ops: Vec<UnaryOperatorTemplate>,
    precondition_of: Vec<Vec<usize>>,
}

impl RelaxationTables {
    pub fn new(task: &TaskView) -> Self {
        let root = task.root_task();
        let mut fact_offset = Vec::with_capacity(root.num_variables());
        let mut offset = 0;
        for variable in &root.variables {
            fact_offset.push(offset);
            offset += variable.domain_size();
        }
        let num_propositions = offset;
        let prop_id = |fact: FactPair| fact_offset[fact.var] + fact.value as usize;

        let goal_props = task.goal().iter().map(|&f| prop_id(f)).collect();

        let mut unary_ops = Vec::new();
        for (i, op) in root.operators().iter().enumerate() {
            for effect in &op.effects {
                let mut preconditions: Vec<PropId> =
                    op.preconditions.iter().map(|&f| prop_id(f)).collect();
                preconditions.extend(effect.conditions.iter().map(|&f| prop_id(f)));
                unary_ops.push(UnaryOperatorTemplate {
                    effect: prop_id(effect.effect),
                    preconditions,
                    base_cost: task.operator_cost(OperatorId(i)),
                    operator_no: Some(OperatorId(i)),
                });
            }
        }
        for axiom in root.axioms() {
            for effect in &axiom.effects {
                let mut preconditions: Vec<PropId> =
                    axiom.preconditions.iter().map(|&f| prop_id(f)).collect();
                preconditions.extend(effect.conditions.iter().map(|&f| prop_id(f)));
                unary_ops.push(UnaryOperatorTemplate {
                    effect: prop_id(effect.effect),
                    preconditions,
                    base_cost: 0,
                    operator_no: None,
                });
            }
        }

        let mut precondition_of = vec![Vec::new(); num_propositions];
        for (i, op) in unary_ops.iter().enumerate() {
            for &pre in &op.preconditions {
                precondition_of[pre].push(i);
            }
        }

        RelaxationTables {
            num_propositions,
            fact_offset,
            goal_props,
            unary_ops,
            precondition_of,
        }
    }

    fn prop_id(&self, fact: FactPair) -> PropId {
        self.fact_offset[fact.var] + fact.value as usize
    }

    /// Exposed for [`crate::search::heuristics::lmcut`], which builds its own
    /// relaxed-operator network from these tables but needs the same
    /// proposition numbering.
    pub fn prop_id_pub(&self, fact: FactPair) -> PropId {
        self.prop_id(fact)
    }

    pub fn goal_props_pub(&self) -> Vec<PropId> {
        self.goal_props.clone()
    }

    pub fn num_propositions(&self) -> usize {
        self.num_propositions
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combine {
    Max,
    Add,
}

impl Combine {
    fn apply(self, a: i32, b: i32) -> i32 {
        match self {
            Combine::Max => a.max(b),
            Combine::Add => a.saturating_add(b).min(MAX_COST_VALUE),
        }
    }
}

/// Result of one relaxed-exploration pass (spec §4.4 steps 1-4), reusable by
/// h^max, h^add and (as a first pass) h^FF.
pub struct ExplorationResult {
    pub prop_cost: Vec<i32>,
    pub reached_by: Vec<Option<usize>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum QueueItem {
    /// Proposition true in the state being evaluated; has no supporter.
    InitialFact(PropId),
    /// An operator whose preconditions just became fully satisfied.
    OperatorEffect(usize),
}

/// Runs the shared relaxed-exploration loop (spec §4.4 steps 1-3) and
/// returns per-proposition costs plus `reached_by` pointers for plan
/// extraction.
pub fn relaxed_exploration(
    tables: &RelaxationTables,
    values: &[i32],
    _task: &TaskView,
    combine: Combine,
) -> ExplorationResult {
    let mut prop_cost = vec![-1; tables.num_propositions];
    let mut reached_by: Vec<Option<usize>> = vec![None; tables.num_propositions];
    let mut op_cost: Vec<i32> = tables.unary_ops.iter().map(|op| op.base_cost).collect();
    let mut unsatisfied: Vec<usize> = tables
        .unary_ops
        .iter()
        .map(|op| op.preconditions.len())
        .collect();

    let mut queue: AdaptiveQueue<QueueItem> = AdaptiveQueue::new();

    for (i, op) in tables.unary_ops.iter().enumerate() {
        if op.preconditions.is_empty() {
            queue.push(op.base_cost, QueueItem::OperatorEffect(i));
        }
    }
    for (var, &value) in values.iter().enumerate() {
        let prop = tables.prop_id(FactPair::new(var, value));
        queue.push(0, QueueItem::InitialFact(prop));
    }

    while let Some((d, item)) = queue.pop() {
        let (prop, supporter) = match item {
            QueueItem::OperatorEffect(i) => (tables.unary_ops[i].effect, Some(i)),
            QueueItem::InitialFact(p) => (p, None),
        };
        if prop_cost[prop] != -1 {
            // Already reached (at minimal cost, by the Dijkstra property).
            continue;
        }
        prop_cost[prop] = d;
        reached_by[prop] = supporter;
        if goals_all_reached(tables, &prop_cost) {
            break;
        }
        for &op_idx in &tables.precondition_of[prop] {
            op_cost[op_idx] = combine.apply(op_cost[op_idx], d);
            unsatisfied[op_idx] -= 1;
            if unsatisfied[op_idx] == 0 {
                queue.push(op_cost[op_idx], QueueItem::OperatorEffect(op_idx));
            }
        }
    }

    ExplorationResult {
        prop_cost,
        reached_by,
    }
}

fn goals_all_reached(tables: &RelaxationTables, prop_cost: &[i32]) -> bool {
    tables.goal_props.iter().all(|&g| prop_cost[g] != -1)
}

fn goal_costs_finite(tables: &RelaxationTables, prop_cost: &[i32]) -> Option<Vec<i32>> {
    tables
        .goal_props
        .iter()
        .map(|&g| (prop_cost[g] != -1).then_some(prop_cost[g]))
        .collect()
}

/// h^max and h^add share this core; they differ only in how an operator's
/// running cost combines its preconditions' costs.
#[derive(Debug)]
pub struct RelaxationHeuristic {
    tables: RelaxationTables,
    combine: Combine,
}

impl RelaxationHeuristic {
    pub fn new_hmax(task: &TaskView) -> Self {
        RelaxationHeuristic {
            tables: RelaxationTables::new(task),
            combine: Combine::Max,
        }
    }

    pub fn new_hadd(task: &TaskView) -> Self {
        RelaxationHeuristic {
            tables: RelaxationTables::new(task),
            combine: Combine::Add,
        }
    }
}

impl Heuristic for RelaxationHeuristic {
    fn evaluate(&mut self, task: &TaskView, values: &[i32]) -> EvaluationResult {
        let result = relaxed_exploration(&self.tables, values, task, self.combine);
        match goal_costs_finite(&self.tables, &result.prop_cost) {
            None => EvaluationResult::DeadEnd,
            Some(costs) => {
                let h = match self.combine {
                    Combine::Max => costs.into_iter().max().unwrap_or(0),
                    Combine::Add => costs
                        .into_iter()
                        .fold(0i32, |acc, c| acc.saturating_add(c).min(MAX_COST_VALUE)),
                };
                EvaluationResult::Value(h)
            }
        }
    }
}

/// h^FF: builds on the h^add exploration, then extracts a relaxed plan by
/// walking `reached_by` pointers back from each goal proposition (spec §4.4
/// point 5).
#[derive(Debug)]
pub struct FfHeuristic {
    tables: RelaxationTables,
    preferred: Vec<OperatorId>,
}

impl FfHeuristic {
    pub fn new(task: &TaskView) -> Self {
        FfHeuristic {
            tables: RelaxationTables::new(task),
            preferred: Vec::new(),
        }
    }

    fn extract_relaxed_plan(&self, result: &ExplorationResult, values: &[i32]) -> (i32, Vec<OperatorId>) {
        let mut marked = vec![false; self.tables.num_propositions];
        let mut total_cost = 0;
        let mut preferred = Vec::new();
        let mut stack: Vec<PropId> = self.tables.goal_props.clone();
        // Facts already true in the state need no supporter.
        let true_props: std::collections::HashSet<PropId> = values
            .iter()
            .enumerate()
            .map(|(var, &value)| self.tables.prop_id(FactPair::new(var, value)))
            .collect();

        while let Some(prop) = stack.pop() {
            if marked[prop] || true_props.contains(&prop) {
                continue;
            }
            marked[prop] = true;
            let Some(op_idx) = result.reached_by[prop] else {
                continue;
            };
            let op = &self.tables.unary_ops[op_idx];
            total_cost = total_cost.saturating_add(op.base_cost).min(MAX_COST_VALUE);
            if let Some(id) = op.operator_no {
                preferred.push(id);
            }
            for &pre in &op.preconditions {
                if !marked[pre] {
                    stack.push(pre);
                }
            }
        }
        (total_cost, preferred)
    }
}

impl Heuristic for FfHeuristic {
    fn evaluate(&mut self, task: &TaskView, values: &[i32]) -> EvaluationResult {
        let result = relaxed_exploration(&self.tables, values, task, Combine::Add);
        if goal_costs_finite(&self.tables, &result.prop_cost).is_none() {
            self.preferred.clear();
            return EvaluationResult::DeadEnd;
        }
        let (cost, preferred) = self.extract_relaxed_plan(&result, values);
        self.preferred = preferred;
        EvaluationResult::Value(cost)
    }

    fn preferred_operators(&self) -> &[OperatorId] {
        &self.preferred
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::fixtures::ONE_STEP;
    use crate::task::Task;

    #[test]
    fn hadd_and_hmax_agree_on_a_single_operator_chain() {
        let task = Task::from_text(ONE_STEP).unwrap();
        let view = TaskView::root(&task);
        let mut hadd = RelaxationHeuristic::new_hadd(&view);
        let mut hmax = RelaxationHeuristic::new_hmax(&view);
        let h_add = hadd.evaluate(&view, &task.initial_state_values);
        let h_max = hmax.evaluate(&view, &task.initial_state_values);
        assert_eq!(h_add, EvaluationResult::Value(3));
        assert_eq!(h_max, EvaluationResult::Value(3));
    }

    #[test]
    fn hff_reports_the_single_operator_as_preferred() {
        let task = Task::from_text(ONE_STEP).unwrap();
        let view = TaskView::root(&task);
        let mut hff = FfHeuristic::new(&view);
        let result = hff.evaluate(&view, &task.initial_state_values);
        assert_eq!(result, EvaluationResult::Value(3));
        assert_eq!(hff.preferred_operators(), &[OperatorId(0)]);
    }

    #[test]
    fn goal_already_true_is_zero_cost() {
        use crate::task::fixtures::TRIVIAL_GOAL;
        let task = Task::from_text(TRIVIAL_GOAL).unwrap();
        let view = TaskView::root(&task);
        let mut hadd = RelaxationHeuristic::new_hadd(&view);
        assert_eq!(
            hadd.evaluate(&view, &task.initial_state_values),
            EvaluationResult::Value(0)
        );
    }

    #[test]
    fn dead_end_task_is_reported_as_dead_end() {
        use crate::task::fixtures::DEAD_END;
        let task = Task::from_text(DEAD_END).unwrap();
        let view = TaskView::root(&task);
        let mut hadd = RelaxationHeuristic::new_hadd(&view);
        assert_eq!(
            hadd.evaluate(&view, &task.initial_state_values),
            EvaluationResult::DeadEnd
        );
    }
}
