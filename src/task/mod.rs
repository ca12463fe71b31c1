//! The grounded task model (spec §3) and its SAS³ text-format reader (§6.1).
//!
//! This is the boundary between the core this crate implements and the
//! translator/grounder that spec.md explicitly puts out of scope: a `Task`
//! is always constructed from an already-grounded, already-mutex-annotated
//! SAS³ description, never from PDDL.

mod fact;
mod operator;
mod parser;
pub mod proxy;
mod variable;

pub use fact::FactPair;
pub use operator::{Effect, Operator, OperatorId};
pub use variable::Variable;

use crate::error::TaskParseError;
use std::path::Path;

/// A mutex group: every pair of facts within it is claimed to never hold
/// simultaneously in any reachable state (spec §3).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutexGroup(pub Vec<FactPair>);

/// The grounded, read-only SAS³ planning task (spec §3, §4.1 contract).
#[derive(Debug, Clone)]
pub struct Task {
    pub variables: Vec<Variable>,
    pub mutexes: Vec<MutexGroup>,
    pub initial_state_values: Vec<i32>,
    /// Non-empty, sorted by `var` (spec §3).
    pub goal: Vec<FactPair>,
    /// All ground actions *and* axiom rules, axioms last. Use
    /// [`Task::operators`] / [`Task::axioms`] to iterate just one kind.
    operators: Vec<Operator>,
    first_axiom: usize,
    /// `false` ⇒ every non-axiom operator is treated as unit cost
    /// (spec §6.1 point 2).
    pub use_metric: bool,
}

impl Task {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, TaskParseError> {
        let text = std::fs::read_to_string(path.as_ref()).map_err(|e| TaskParseError::Syntax {
            line: 0,
            message: format!("could not read task file: {e}"),
        })?;
        Self::from_text(&text)
    }

    pub fn from_text(text: &str) -> Result<Self, TaskParseError> {
        parser::parse_task(text)
    }

    pub(crate) fn build(
        variables: Vec<Variable>,
        mutexes: Vec<MutexGroup>,
        initial_state_values: Vec<i32>,
        mut goal: Vec<FactPair>,
        mut operators: Vec<Operator>,
        use_metric: bool,
    ) -> Result<Self, TaskParseError> {
        if goal.is_empty() {
            return Err(TaskParseError::EmptyGoal);
        }
        goal.sort_unstable();

        for group in &mutexes {
            if group.0.is_empty() {
                return Err(TaskParseError::EmptyMutexGroup);
            }
            let mut seen = std::collections::HashSet::new();
            for fact in &group.0 {
                validate_fact(&variables, fact)?;
                if !seen.insert(*fact) {
                    return Err(TaskParseError::DuplicateMutexFact {
                        var: fact.var,
                        value: fact.value,
                    });
                }
            }
        }
        for fact in &goal {
            validate_fact(&variables, fact)?;
        }

        operators.sort_by(|a, b| a.is_axiom.cmp(&b.is_axiom));
        let first_axiom = operators.iter().position(|op| op.is_axiom).unwrap_or(operators.len());

        for op in &operators {
            for fact in &op.preconditions {
                validate_fact(&variables, fact)?;
            }
            let mut touched_unconditionally = std::collections::HashSet::new();
            for effect in &op.effects {
                validate_fact(&variables, &effect.effect)?;
                for cond in &effect.conditions {
                    validate_fact(&variables, cond)?;
                }
                if effect.conditions.is_empty() && !touched_unconditionally.insert(effect.effect.var)
                {
                    return Err(TaskParseError::ConflictingEffects {
                        name: op.name.to_string(),
                        var: effect.effect.var,
                    });
                }
            }
        }

        Ok(Task {
            variables,
            mutexes,
            initial_state_values,
            goal,
            operators,
            first_axiom,
            use_metric,
        })
    }

    pub fn num_variables(&self) -> usize {
        self.variables.len()
    }

    pub fn operators(&self) -> &[Operator] {
        &self.operators[..self.first_axiom]
    }

    pub fn axioms(&self) -> &[Operator] {
        &self.operators[self.first_axiom..]
    }

    /// All operators *and* axioms, indexable by [`OperatorId`].
    pub fn all_operators(&self) -> &[Operator] {
        &self.operators
    }

    pub fn operator(&self, id: OperatorId) -> &Operator {
        &self.operators[id.index()]
    }

    pub fn operator_cost(&self, id: OperatorId) -> i32 {
        if self.use_metric {
            self.operators[id.index()].cost
        } else if self.operators[id.index()].is_axiom {
            0
        } else {
            1
        }
    }

    pub fn num_operators(&self) -> usize {
        self.first_axiom
    }

    pub fn is_goal(&self, values: &[i32]) -> bool {
        self.goal.iter().all(|fact| values[fact.var] == fact.value)
    }

    pub fn is_mutex(&self, a: FactPair, b: FactPair) -> bool {
        if a.var == b.var {
            return false;
        }
        self.mutexes
            .iter()
            .any(|group| group.0.contains(&a) && group.0.contains(&b))
    }

    /// Applies an operator's effects to `values` in place, honouring
    /// conditional-effect conditions evaluated against `values` itself
    /// (spec §4.1: "conditions evaluated against the parent's unpacked
    /// values"). Does not close under axioms; callers needing an
    /// axiom-closed successor should use the [`crate::axioms::AxiomEvaluator`].
    pub fn apply_effects(&self, values: &mut [i32], op: &Operator) {
        debug_assert!(op.is_applicable(values));
        let before = values.to_vec();
        for effect in &op.effects {
            if effect.is_satisfied(&before) {
                values[effect.effect.var] = effect.effect.value;
            }
        }
    }
}

fn validate_fact(variables: &[Variable], fact: &FactPair) -> Result<(), TaskParseError> {
    let Some(variable) = variables.get(fact.var) else {
        return Err(TaskParseError::FactOutOfRange {
            var: fact.var,
            value: fact.value,
            domain_size: 0,
        });
    };
    if fact.value < 0 || fact.value as usize >= variable.domain_size() {
        return Err(TaskParseError::FactOutOfRange {
            var: fact.var,
            value: fact.value,
            domain_size: variable.domain_size(),
        });
    }
    Ok(())
}

#[cfg(test)]
pub(crate) mod fixtures {
    /// Scenario 1 of spec §8: trivial goal, zero operators.
    pub const TRIVIAL_GOAL: &str = "\
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
Atom v(1)
Atom v(2)
end_variable
0
1
begin_state
0
end_state
begin_goal
1
0 0
end_goal
0
0
";

    /// Scenario 2 of spec §8: one operator of cost 3.
    pub const ONE_STEP: &str = "\
begin_version
3
end_version
begin_metric
1
end_metric
1
begin_variable
var0
-1
2
Atom v(1)
Atom v(2)
end_variable
0
1
begin_state
0
end_state
begin_goal
1
0 1
end_goal
1
begin_operator
o1
0
0
1
0 -1 1
3
end_operator
0
";

    /// Scenario 3 of spec §8: no operators, unreachable goal.
    pub const DEAD_END: &str = "\
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
Atom v(1)
Atom v(2)
end_variable
0
1
begin_state
0
end_state
begin_goal
1
0 1
end_goal
0
0
";
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn trivial_goal_parses_and_is_already_satisfied() {
        let task = Task::from_text(TRIVIAL_GOAL).unwrap();
        assert!(task.is_goal(&task.initial_state_values));
        assert_eq!(task.num_operators(), 0);
    }

    #[test]
    fn one_step_task_has_single_applicable_operator() {
        let task = Task::from_text(ONE_STEP).unwrap();
        assert!(!task.is_goal(&task.initial_state_values));
        assert_eq!(task.num_operators(), 1);
        let op = &task.operators()[0];
        assert!(op.is_applicable(&task.initial_state_values));
        assert_eq!(task.operator_cost(OperatorId(0)), 3);
    }

    #[test]
    fn dead_end_task_has_no_operators() {
        let task = Task::from_text(DEAD_END).unwrap();
        assert!(!task.is_goal(&task.initial_state_values));
        assert_eq!(task.num_operators(), 0);
    }

    #[test]
    fn rejects_empty_goal() {
        let text = TRIVIAL_GOAL.replacen("1\n0 0\n", "0\n", 1);
        // This also changes the variable section's operator count line, so
        // just check a hand-built empty-goal task instead.
        let _ = text;
        let err = Task::build(
            vec![Variable {
                name: "v".into(),
                fact_names: vec!["a".into(), "b".into()],
                axiom_layer: -1,
                default_axiom_value: -1,
            }],
            vec![],
            vec![0],
            vec![],
            vec![],
            false,
        )
        .unwrap_err();
        assert!(matches!(err, TaskParseError::EmptyGoal));
    }
}
