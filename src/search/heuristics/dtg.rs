//! Domain-Transition Graphs (spec §3, §4.6). Grounded on
//! `original_source/src/search/heuristics/cg_heuristic.cc` /
//! `cea_heuristic.h`'s per-variable DTG construction: one graph per SAS+
//! variable, nodes are values, arcs are operator-induced transitions whose
//! label carries preconditions on *other* variables plus any side effects
//! on other variables.

use crate::task::proxy::TaskView;
use crate::task::{FactPair, OperatorId};

#[derive(Debug, Clone)]
pub struct Transition {
    pub target: i32,
    pub operator: OperatorId,
    /// Preconditions on variables other than the DTG's own.
    pub condition: Vec<FactPair>,
    /// Effects this operator has on other variables, fired alongside the
    /// transition (spec §3: "side-effect list").
    pub side_effects: Vec<FactPair>,
}

#[derive(Debug, Clone, Default)]
pub struct DtgNode {
    pub transitions: Vec<Transition>,
}

#[derive(Debug, Clone)]
pub struct DomainTransitionGraph {
    pub var: usize,
    pub nodes: Vec<DtgNode>,
}

/// Builds one DTG per variable. `acyclic_cg` restricts transition
/// preconditions to variables with a smaller index than `var`, the
/// cycle-breaking convention h^cg uses (spec §4.6: "its pruning condition on
/// DTG construction is `var <= cond_var` to break cycles").
pub fn build_dtgs(task: &TaskView, acyclic_cg: bool) -> Vec<DomainTransitionGraph> {
    let root = task.root_task();
    let mut graphs: Vec<DomainTransitionGraph> = root
        .variables
        .iter()
        .enumerate()
        .map(|(var, variable)| DomainTransitionGraph {
            var,
            nodes: vec![DtgNode::default(); variable.domain_size()],
        })
        .collect();

    for (i, op) in root.operators().iter().enumerate() {
        let op_id = OperatorId(i);
        for effect in &op.effects {
            let var = effect.effect.var;
            let target = effect.effect.value;
            let mut condition: Vec<FactPair> = op
                .preconditions
                .iter()
                .chain(effect.conditions.iter())
                .filter(|f| f.var != var)
                .copied()
                .collect();
            if acyclic_cg {
                condition.retain(|f| f.var > var);
            }
            let side_effects: Vec<FactPair> = op
                .effects
                .iter()
                .filter(|e| e.effect.var != var)
                .map(|e| e.effect)
                .collect();

            let source = op
                .preconditions
                .iter()
                .chain(effect.conditions.iter())
                .find(|f| f.var == var)
                .map(|f| f.value);

            let transition = Transition {
                target,
                operator: op_id,
                condition,
                side_effects,
            };

            match source {
                Some(value) => graphs[var].nodes[value as usize].transitions.push(transition),
                None => {
                    // No precondition on `var`: applicable from every value,
                    // including a self-loop at the target (spec §3: "A
                    // self-loop d->d is included if an operator sets v:=d
                    // without requiring v").
                    for node in &mut graphs[var].nodes {
                        node.transitions.push(transition.clone());
                    }
                }
            }
        }
    }

    graphs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::fixtures::ONE_STEP;
    use crate::task::Task;

    #[test]
    fn one_step_task_has_a_single_transition() {
        let task = Task::from_text(ONE_STEP).unwrap();
        let view = TaskView::root(&task);
        let graphs = build_dtgs(&view, false);
        assert_eq!(graphs.len(), 1);
        assert_eq!(graphs[0].nodes[0].transitions.len(), 1);
        assert_eq!(graphs[0].nodes[0].transitions[0].target, 1);
    }
}
