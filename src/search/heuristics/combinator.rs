//! Evaluator combinators (`SPEC_FULL.md` §B, grounded on
//! `evaluators/combining_evaluator.*` and `evaluators/max_evaluator.cc` in
//! `original_source/src/search`): combine several heuristics into one
//! without inventing a new plugin mechanism.

use crate::search::heuristics::{EvaluationResult, Heuristic};
use crate::task::proxy::TaskView;
use crate::task::OperatorId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CombineKind {
    Max,
    Sum,
}

/// Combines several sub-heuristics into a single one: `Max` takes the
/// pointwise maximum (still admissible if every sub-heuristic is), `Sum`
/// adds them (admissible only if the sub-heuristics partition operator
/// costs, as landmark cost partitioning does).
#[derive(Debug)]
pub struct CombiningHeuristic {
    kind: CombineKind,
    children: Vec<Box<dyn Heuristic>>,
    preferred: Vec<OperatorId>,
}

impl CombiningHeuristic {
    pub fn max(children: Vec<Box<dyn Heuristic>>) -> Self {
        CombiningHeuristic {
            kind: CombineKind::Max,
            children,
            preferred: Vec::new(),
        }
    }

    pub fn sum(children: Vec<Box<dyn Heuristic>>) -> Self {
        CombiningHeuristic {
            kind: CombineKind::Sum,
            children,
            preferred: Vec::new(),
        }
    }
}

impl Heuristic for CombiningHeuristic {
    fn evaluate(&mut self, task: &TaskView, values: &[i32]) -> EvaluationResult {
        self.preferred.clear();
        let mut acc: i32 = match self.kind {
            CombineKind::Max => i32::MIN,
            CombineKind::Sum => 0,
        };
        for child in &mut self.children {
            match child.evaluate(task, values) {
                EvaluationResult::DeadEnd => return EvaluationResult::DeadEnd,
                EvaluationResult::Value(v) => {
                    acc = match self.kind {
                        CombineKind::Max => acc.max(v),
                        CombineKind::Sum => acc.saturating_add(v),
                    };
                    self.preferred.extend_from_slice(child.preferred_operators());
                }
            }
        }
        EvaluationResult::Value(acc)
    }

    fn preferred_operators(&self) -> &[OperatorId] {
        &self.preferred
    }

    fn dead_ends_are_reliable(&self) -> bool {
        self.children.iter().all(|c| c.dead_ends_are_reliable())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::fixtures::ONE_STEP;
    use crate::task::Task;

    #[derive(Debug)]
    struct Fixed(i32);
    impl Heuristic for Fixed {
        fn evaluate(&mut self, _task: &TaskView, _values: &[i32]) -> EvaluationResult {
            EvaluationResult::Value(self.0)
        }
    }

    #[test]
    fn max_picks_the_largest_child_value() {
        let task = Task::from_text(ONE_STEP).unwrap();
        let view = TaskView::root(&task);
        let mut h = CombiningHeuristic::max(vec![Box::new(Fixed(2)), Box::new(Fixed(5))]);
        assert_eq!(h.evaluate(&view, &task.initial_state_values), EvaluationResult::Value(5));
    }

    #[test]
    fn sum_adds_every_child_value() {
        let task = Task::from_text(ONE_STEP).unwrap();
        let view = TaskView::root(&task);
        let mut h = CombiningHeuristic::sum(vec![Box::new(Fixed(2)), Box::new(Fixed(5))]);
        assert_eq!(h.evaluate(&view, &task.initial_state_values), EvaluationResult::Value(7));
    }

    #[derive(Debug)]
    struct AlwaysDead;
    impl Heuristic for AlwaysDead {
        fn evaluate(&mut self, _task: &TaskView, _values: &[i32]) -> EvaluationResult {
            EvaluationResult::DeadEnd
        }
    }

    #[test]
    fn any_dead_end_child_makes_the_combination_a_dead_end() {
        let task = Task::from_text(ONE_STEP).unwrap();
        let view = TaskView::root(&task);
        let mut h = CombiningHeuristic::max(vec![Box::new(Fixed(2)), Box::new(AlwaysDead)]);
        assert_eq!(h.evaluate(&view, &task.initial_state_values), EvaluationResult::DeadEnd);
    }
}
