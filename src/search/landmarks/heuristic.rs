//! The landmark-based operator-counting heuristic (spec §4.11): discover the
//! landmark graph once, from the task's actual initial state, then at every
//! evaluated state cost-partition the landmarks and sum the partitioned
//! costs of whichever ones are still `future` for that state.

use crate::error::UnsupportedFeatureError;
use crate::search::heuristics::{EvaluationResult, Heuristic};
use crate::search::landmarks::cost_partitioning;
use crate::search::landmarks::landmark_graph::LandmarkGraph;
use crate::search::landmarks::status::LandmarkStatusTracker;
use crate::task::proxy::TaskView;
use crate::task::OperatorId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartitioningMethod {
    Uniform,
    Optimal,
}

#[derive(Debug)]
pub struct LandmarkCostPartitioningHeuristic {
    method: PartitioningMethod,
    graph: LandmarkGraph,
    status: LandmarkStatusTracker,
}

impl LandmarkCostPartitioningHeuristic {
    /// Discovers the landmark graph once, from `task`'s actual initial state
    /// (spec §4.11: landmark discovery happens up front; only `past`/`future`
    /// status varies per evaluated state). Axioms and conditional effects are
    /// rejected the same way h^m rejects them.
    pub fn try_new(task: &TaskView, method: PartitioningMethod) -> Result<Self, UnsupportedFeatureError> {
        let initial_values = task.root_task().initial_state_values.clone();
        let graph = LandmarkGraph::discover(task, &initial_values)?;
        Ok(LandmarkCostPartitioningHeuristic {
            method,
            graph,
            status: LandmarkStatusTracker::new(),
        })
    }
}

impl Heuristic for LandmarkCostPartitioningHeuristic {
    fn evaluate(&mut self, task: &TaskView, values: &[i32]) -> EvaluationResult {
        if self.graph.dead_end {
            return EvaluationResult::DeadEnd;
        }
        if self.graph.landmarks.is_empty() {
            return EvaluationResult::Value(0);
        }
        let status = self.status.status(&self.graph.landmarks, values);
        let costs = match self.method {
            PartitioningMethod::Uniform => cost_partitioning::uniform(&self.graph.landmarks, task),
            PartitioningMethod::Optimal => cost_partitioning::optimal(&self.graph.landmarks, task),
        };
        let h: f64 = costs
            .iter()
            .zip(status.future.iter())
            .filter(|(_, &future)| future)
            .map(|(&c, _)| c)
            .sum();
        EvaluationResult::Value(h.round() as i32)
    }

    fn notify_transition(&mut self, _task: &TaskView, parent_values: &[i32], _op: OperatorId, child_values: &[i32]) {
        self.status.advance(&self.graph.landmarks, parent_values, child_values);
    }

    fn dead_ends_are_reliable(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::fixtures::{DEAD_END, ONE_STEP};
    use crate::task::Task;

    #[test]
    fn reports_the_cost_of_the_single_landmark() {
        let task = Task::from_text(ONE_STEP).unwrap();
        let view = TaskView::root(&task);
        let mut heuristic = LandmarkCostPartitioningHeuristic::try_new(&view, PartitioningMethod::Uniform).unwrap();
        assert_eq!(
            heuristic.evaluate(&view, &task.initial_state_values),
            EvaluationResult::Value(3)
        );
    }

    #[test]
    fn dead_end_task_is_reported_as_dead_end() {
        let task = Task::from_text(DEAD_END).unwrap();
        let view = TaskView::root(&task);
        let mut heuristic = LandmarkCostPartitioningHeuristic::try_new(&view, PartitioningMethod::Optimal).unwrap();
        assert_eq!(
            heuristic.evaluate(&view, &task.initial_state_values),
            EvaluationResult::DeadEnd
        );
    }

    #[test]
    fn a_landmark_achieved_and_then_undone_no_longer_counts_toward_h() {
        // achieve-goal sets the goal fact; undo clears it again. Once the
        // search has passed through achieve-goal, that landmark is `past`
        // even in a state where the fact is no longer true.
        use crate::task::{Effect, FactPair, MutexGroup, Operator, Variable};

        let variables = vec![Variable {
            name: "var0".into(),
            fact_names: vec!["v0-0".into(), "v0-1".into()],
            axiom_layer: -1,
            default_axiom_value: -1,
        }];
        let operators = vec![
            Operator {
                name: "achieve-goal".into(),
                preconditions: vec![],
                effects: vec![Effect {
                    conditions: vec![],
                    effect: FactPair::new(0, 1),
                }],
                cost: 1,
                is_axiom: false,
            },
            Operator {
                name: "undo".into(),
                preconditions: vec![FactPair::new(0, 1)],
                effects: vec![Effect {
                    conditions: vec![],
                    effect: FactPair::new(0, 0),
                }],
                cost: 1,
                is_axiom: false,
            },
        ];
        let task = Task::build(
            variables,
            Vec::<MutexGroup>::new(),
            vec![0],
            vec![FactPair::new(0, 1)],
            operators,
            false,
        )
        .unwrap();
        let view = TaskView::root(&task);
        let mut heuristic = LandmarkCostPartitioningHeuristic::try_new(&view, PartitioningMethod::Uniform).unwrap();

        // Reaching [1] from the initial [0] via achieve-goal: the landmark
        // (var0, 1) becomes past.
        heuristic.notify_transition(&view, &[0], OperatorId(0), &[1]);
        // Applying undo from [1] back to [0]: the landmark stays past even
        // though (var0, 1) is no longer true in [0].
        heuristic.notify_transition(&view, &[1], OperatorId(1), &[0]);

        assert_eq!(heuristic.evaluate(&view, &[0]), EvaluationResult::Value(0));
    }
}
