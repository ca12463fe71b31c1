//! Hash-consed arena of packed states (spec §4.1 "State Registry").
//!
//! Grounded on the teacher's `search_space.rs` (`SegVec` arena plus a
//! `HashMap<hash, StateId>` for consing), adapted from sparse lifted states
//! to bit-packed SAS+ words. Unlike the teacher's global `AtomicUsize`
//! counter (shared across the whole process), ids here are assigned by a
//! counter local to the registry: spec §4.1 requires dense ids starting at 0
//! *for this task's registry*, and a single process only ever registers
//! states for one task at a time.

use segvec::{Linear, SegVec};
use std::collections::HashMap;

use crate::axioms::AxiomEvaluator;
use crate::state::packed::{PackedState, StateLayout};
use crate::task::{OperatorId, Task};

/// Dense id of a registered state, stable for the lifetime of the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StateId(pub usize);

impl StateId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Owns every packed state reachable so far plus the hash-cons table that
/// keeps `register` idempotent (spec §4.1: "returns an existing id if the
/// packed representation is already present, otherwise appends").
#[derive(Debug)]
pub struct StateRegistry {
    layout: StateLayout,
    states: SegVec<PackedState, Linear>,
    index: HashMap<PackedState, StateId>,
}

impl StateRegistry {
    pub fn new(task: &Task) -> Self {
        let layout = StateLayout::new(task);
        let mut registry = StateRegistry {
            layout,
            states: SegVec::new(),
            index: HashMap::new(),
        };
        registry.register(&task.initial_state_values);
        registry
    }

    /// Registers a vector of unpacked values, returning its (possibly
    /// freshly assigned) id.
    pub fn register(&mut self, values: &[i32]) -> StateId {
        let packed = self.layout.pack(values);
        if let Some(&id) = self.index.get(&packed) {
            return id;
        }
        let id = StateId(self.states.len());
        self.states.push(packed.clone());
        self.index.insert(packed, id);
        id
    }

    pub fn get_initial_state(&self) -> StateId {
        StateId(0)
    }

    pub fn lookup_values(&self, id: StateId) -> Vec<i32> {
        self.layout.unpack(self.states.get(id.index()).expect("invalid state id"))
    }

    /// Applies `op`'s effects on top of `parent`, closes the result under
    /// axioms, and registers it (spec §4.1 `get_successor_state`).
    pub fn get_successor_state(
        &mut self,
        task: &Task,
        axiom_evaluator: &AxiomEvaluator,
        parent: StateId,
        op: OperatorId,
    ) -> StateId {
        let mut values = self.lookup_values(parent);
        task.apply_effects(&mut values, task.operator(op));
        axiom_evaluator.evaluate(&mut values);
        self.register(&values)
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::axioms::AxiomEvaluator;
    use crate::task::fixtures::ONE_STEP;
    use crate::task::Task;

    #[test]
    fn registering_the_same_values_twice_returns_the_same_id() {
        let task = Task::from_text(ONE_STEP).unwrap();
        let mut registry = StateRegistry::new(&task);
        let a = registry.register(&task.initial_state_values);
        let b = registry.register(&task.initial_state_values);
        assert_eq!(a, b);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn initial_state_is_id_zero() {
        let task = Task::from_text(ONE_STEP).unwrap();
        let registry = StateRegistry::new(&task);
        assert_eq!(registry.get_initial_state(), StateId(0));
    }

    #[test]
    fn successor_state_gets_a_fresh_id() {
        let task = Task::from_text(ONE_STEP).unwrap();
        let mut registry = StateRegistry::new(&task);
        let axioms = AxiomEvaluator::new(&task);
        let initial = registry.get_initial_state();
        let successor = registry.get_successor_state(&task, &axioms, initial, OperatorId(0));
        assert_ne!(initial, successor);
        assert!(task.is_goal(&registry.lookup_values(successor)));
    }
}
