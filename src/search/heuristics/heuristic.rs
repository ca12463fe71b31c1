//! The [`Heuristic`] trait shared by every evaluator (spec §4.4-§4.6),
//! adapted from the teacher's `Heuristic` trait: same shape (one mutable
//! `evaluate` call per state, a batch default), but an integer, dead-end
//! aware result instead of an `OrderedFloat<f64>` score, since grounded
//! SAS+ costs are integers and several of these heuristics need to report
//! unsolvability rather than a number.

use crate::state::StateId;
use crate::task::proxy::TaskView;
use crate::task::OperatorId;

/// The outcome of evaluating one state. `MAX_COST_VALUE` bounds any finite
/// value (spec §4.4: "clamp to `MAX_COST_VALUE`, a large sentinel well
/// below INT_MAX").
pub const MAX_COST_VALUE: i32 = i32::MAX / 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvaluationResult {
    Value(i32),
    DeadEnd,
}

impl EvaluationResult {
    pub fn value(self) -> Option<i32> {
        match self {
            EvaluationResult::Value(v) => Some(v),
            EvaluationResult::DeadEnd => None,
        }
    }
}

/// A heuristic evaluator. Implementors own their own scratch space (spec §5:
/// "each heuristic owns its own scratch ... must reset them per evaluation;
/// no cross-heuristic sharing").
pub trait Heuristic: std::fmt::Debug {
    fn evaluate(&mut self, task: &TaskView, values: &[i32]) -> EvaluationResult;

    fn evaluate_batch(&mut self, task: &TaskView, states: &[Vec<i32>]) -> Vec<EvaluationResult> {
        states.iter().map(|s| self.evaluate(task, s)).collect()
    }

    /// Called by the search engine whenever it generates `child_values` from
    /// `parent_values` by applying `op`, before `child_values` is evaluated.
    /// Heuristics that need to accumulate state along the actual search path
    /// (spec §4.11's landmark `past`/`future` bitsets) override this; every
    /// other heuristic ignores it, since `evaluate` alone already gives them
    /// everything they need.
    fn notify_transition(&mut self, _task: &TaskView, _parent_values: &[i32], _op: OperatorId, _child_values: &[i32]) {}

    /// Operators this heuristic marked as preferred during the most recent
    /// [`Heuristic::evaluate`] call (spec glossary: "Preferred operator").
    /// Empty for heuristics that do not compute preferences.
    fn preferred_operators(&self) -> &[OperatorId] {
        &[]
    }

    /// Whether a `DeadEnd` this heuristic reports is *safe* to trust, i.e.
    /// the heuristic is admissible/safe for the task it was built for
    /// (spec §4.9 step 4d).
    fn dead_ends_are_reliable(&self) -> bool {
        true
    }
}

/// A per-[`StateId`] memoisation layer over any [`Heuristic`] (spec §4.10).
#[derive(Debug)]
pub struct EvaluatorCache<H> {
    inner: H,
    cache: std::collections::HashMap<StateId, EvaluationResult>,
}

impl<H: Heuristic> EvaluatorCache<H> {
    pub fn new(inner: H) -> Self {
        EvaluatorCache {
            inner,
            cache: std::collections::HashMap::new(),
        }
    }

    pub fn evaluate(&mut self, task: &TaskView, id: StateId, values: &[i32]) -> EvaluationResult {
        if let Some(&cached) = self.cache.get(&id) {
            return cached;
        }
        let result = self.inner.evaluate(task, values);
        self.cache.insert(id, result);
        result
    }

    pub fn preferred_operators(&self) -> &[OperatorId] {
        self.inner.preferred_operators()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct CountingHeuristic {
        calls: u32,
    }
    impl Heuristic for CountingHeuristic {
        fn evaluate(&mut self, _task: &TaskView, values: &[i32]) -> EvaluationResult {
            self.calls += 1;
            EvaluationResult::Value(values.iter().sum())
        }
    }

    #[test]
    fn cache_avoids_reevaluating_the_same_state() {
        use crate::task::fixtures::ONE_STEP;
        use crate::task::Task;
        let task = Task::from_text(ONE_STEP).unwrap();
        let view = TaskView::root(&task);
        let mut cache = EvaluatorCache::new(CountingHeuristic { calls: 0 });
        let id = StateId(0);
        cache.evaluate(&view, id, &[0]);
        cache.evaluate(&view, id, &[0]);
        assert_eq!(cache.inner.calls, 1);
    }
}
