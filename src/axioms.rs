//! Axiom Evaluator (spec §4.3): closes a state under stratified axiom rules.
//!
//! Grounded on `original_source/src/search/tasks/root_task.cc`'s treatment of
//! axioms as ordinary zero-cost operators distinguished by `is_axiom`, and on
//! the original `AxiomEvaluator`'s layered fixed-point loop. Reimplemented
//! here directly over [`Task`] rather than the original's separately compiled
//! `UnaryOperator` network, since a state-closure pass over a handful of
//! derived variables does not need the relaxation heuristics' proposition
//! graph.

use crate::task::{Operator, Task};

/// One stratification layer: the derived variables it determines and the
/// axioms that may set them.
#[derive(Debug, Clone)]
struct Layer {
    vars: Vec<(usize, i32)>,
    axioms: Vec<Operator>,
}

/// Closes a state under a task's axioms, layer by layer (spec §4.3:
/// "values determined in a lower layer are frozen for higher layers").
#[derive(Debug)]
pub struct AxiomEvaluator {
    layers: Vec<Layer>,
}

impl AxiomEvaluator {
    pub fn new(task: &Task) -> Self {
        let mut layer_numbers: Vec<i32> = task
            .variables
            .iter()
            .filter_map(|v| v.is_derived().then_some(v.axiom_layer))
            .collect();
        layer_numbers.sort_unstable();
        layer_numbers.dedup();

        let layers = layer_numbers
            .into_iter()
            .map(|layer| {
                let vars: Vec<(usize, i32)> = task
                    .variables
                    .iter()
                    .enumerate()
                    .filter(|(_, v)| v.is_derived() && v.axiom_layer == layer)
                    .map(|(i, v)| (i, v.default_axiom_value))
                    .collect();
                let axioms: Vec<Operator> = task
                    .axioms()
                    .iter()
                    .filter(|ax| {
                        ax.effects
                            .iter()
                            .all(|e| vars.iter().any(|(v, _)| *v == e.effect.var))
                    })
                    .cloned()
                    .collect();
                Layer { vars, axioms }
            })
            .collect();

        AxiomEvaluator { layers }
    }

    /// Closes `values` in place. Idempotent: calling it on an already-closed
    /// state is a no-op.
    pub fn evaluate(&self, values: &mut [i32]) {
        for layer in &self.layers {
            for &(var, default) in &layer.vars {
                values[var] = default;
            }
            loop {
                let mut changed = false;
                for axiom in &layer.axioms {
                    if axiom.is_applicable(values) {
                        for effect in &axiom.effects {
                            if effect.is_satisfied(values) && values[effect.effect.var] != effect.effect.value {
                                values[effect.effect.var] = effect.effect.value;
                                changed = true;
                            }
                        }
                    }
                }
                if !changed {
                    break;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::fixtures::ONE_STEP;
    use crate::task::Task;

    #[test]
    fn task_without_axioms_is_a_no_op() {
        let task = Task::from_text(ONE_STEP).unwrap();
        let evaluator = AxiomEvaluator::new(&task);
        let mut values = task.initial_state_values.clone();
        let before = values.clone();
        evaluator.evaluate(&mut values);
        assert_eq!(values, before);
    }
}
