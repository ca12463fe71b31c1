//! Expansion-core stubborn sets (spec §4.7: "EC ... strictly dominates
//! Expansion Core"). Grounded on
//! `original_source/src/search/pruning/stubborn_sets_ec.h`/`.cc`: per-variable
//! reachability maps from the initial value, a per-operator active flag, and
//! a `written_vars` bitmask back rules S4' ("use v-applicable successors of
//! disablers if possible, else recurse into the necessary enabling set") and
//! S5 ("choose the necessary enabling set via violated written-variable
//! preference").

use crate::search::pruning::stubborn_sets::StubbornSetData;
use crate::search::pruning::PruningMethod;
use crate::task::{FactPair, OperatorId, Task};

/// DTG-derived reachability, operator interference, and precondition lookup
/// tables shared by every `prune` call for one task (original's
/// `build_reachability_map` / `compute_operator_preconditions` /
/// `get_conflicting_and_disabling` / `get_disabled`, made eager rather than
/// lazily cached per operator, matching how [`StubbornSetData`] already
/// precomputes its tables).
#[derive(Debug)]
struct EcData {
    base: StubbornSetData,
    /// `preconditions_on_var[op][var]`: the value `op` requires of `var`, or
    /// `-1` if `op` has no precondition on `var`.
    preconditions_on_var: Vec<Vec<i32>>,
    /// `reachability_map[var][start_value][value]`: whether `value` is
    /// reachable from `start_value` along `var`'s domain transition graph.
    reachability_map: Vec<Vec<Vec<bool>>>,
    /// Operators that conflict with `op`, or that disable `op` (falsify one
    /// of its preconditions), for each `op`.
    conflicting_and_disabling: Vec<Vec<OperatorId>>,
    /// Operators disabled by `op` (`op`'s effects falsify one of their
    /// preconditions), for each `op`.
    disabled: Vec<Vec<OperatorId>>,
}

impl EcData {
    fn new(task: &Task) -> Self {
        let base = StubbornSetData::new(task);
        let num_vars = task.num_variables();
        let num_ops = task.num_operators();

        let preconditions_on_var: Vec<Vec<i32>> = task
            .operators()
            .iter()
            .map(|op| {
                let mut on_var = vec![-1; num_vars];
                for pre in &op.preconditions {
                    on_var[pre.var] = pre.value;
                }
                on_var
            })
            .collect();

        let mut dtgs: Vec<Vec<Vec<usize>>> = task
            .variables
            .iter()
            .map(|v| vec![Vec::new(); v.domain_size()])
            .collect();
        for (op_index, op) in task.operators().iter().enumerate() {
            for effect in &op.effects {
                let var = effect.effect.var;
                let eff_val = effect.effect.value as usize;
                let pre_val = preconditions_on_var[op_index][var];
                if pre_val == -1 {
                    for value in 0..dtgs[var].len() {
                        dtgs[var][value].push(eff_val);
                    }
                } else {
                    dtgs[var][pre_val as usize].push(eff_val);
                }
            }
        }

        let reachability_map: Vec<Vec<Vec<bool>>> = dtgs
            .iter()
            .map(|dtg| {
                let num_values = dtg.len();
                (0..num_values)
                    .map(|start| {
                        let mut reachable = vec![false; num_values];
                        let mut stack = vec![start];
                        while let Some(value) = stack.pop() {
                            if !reachable[value] {
                                reachable[value] = true;
                                stack.extend(dtg[value].iter().copied());
                            }
                        }
                        reachable
                    })
                    .collect()
            })
            .collect();

        let mut conflicts: Vec<Vec<OperatorId>> = vec![Vec::new(); num_ops];
        let mut disabled: Vec<Vec<OperatorId>> = vec![Vec::new(); num_ops];
        for a in 0..num_ops {
            for b in 0..num_ops {
                if a == b {
                    continue;
                }
                if can_conflict(task.operator(OperatorId(a)), task.operator(OperatorId(b))) {
                    conflicts[a].push(OperatorId(b));
                }
                if can_disable(task.operator(OperatorId(a)), task.operator(OperatorId(b))) {
                    disabled[a].push(OperatorId(b));
                }
            }
        }

        let mut disabled_by: Vec<Vec<OperatorId>> = vec![Vec::new(); num_ops];
        for (a, disables_a) in disabled.iter().enumerate() {
            for &b in disables_a {
                disabled_by[b.index()].push(OperatorId(a));
            }
        }

        let mut conflicting_and_disabling = conflicts;
        for (a, more) in conflicting_and_disabling.iter_mut().zip(disabled_by) {
            for op in more {
                if !a.contains(&op) {
                    a.push(op);
                }
            }
        }

        EcData {
            base,
            preconditions_on_var,
            reachability_map,
            conflicting_and_disabling,
            disabled,
        }
    }

    fn is_v_applicable(&self, var: usize, op: OperatorId, values: &[i32]) -> bool {
        let required = self.preconditions_on_var[op.index()][var];
        required == -1 || required == values[var]
    }

    fn disabled_vars(&self, op1: OperatorId, op2: OperatorId, task: &Task) -> Vec<usize> {
        let mut vars = Vec::new();
        for effect in &task.operator(op1).effects {
            for pre in &task.operator(op2).preconditions {
                if pre.var == effect.effect.var && pre.value != effect.effect.value {
                    vars.push(pre.var);
                }
            }
        }
        vars
    }
}

/// `true` iff `a` and `b` both set some shared variable to different values.
fn can_conflict(a: &crate::task::Operator, b: &crate::task::Operator) -> bool {
    a.effects.iter().any(|ea| {
        b.effects
            .iter()
            .any(|eb| ea.effect.var == eb.effect.var && ea.effect.value != eb.effect.value)
    })
}

/// `true` iff applying `a` falsifies one of `b`'s preconditions.
fn can_disable(a: &crate::task::Operator, b: &crate::task::Operator) -> bool {
    a.effects.iter().any(|ea| {
        b.preconditions
            .iter()
            .any(|pre| pre.var == ea.effect.var && pre.value != ea.effect.value)
    })
}

#[derive(Debug)]
pub struct StubbornSetsEc {
    data: Option<EcData>,
}

impl StubbornSetsEc {
    pub fn new() -> Self {
        StubbornSetsEc { data: None }
    }

    fn data(&mut self, task: &Task) -> &EcData {
        self.data.get_or_insert_with(|| EcData::new(task))
    }
}

impl Default for StubbornSetsEc {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-call working state for one `prune` invocation (original's per-instance
/// fields reset at the top of `initialize_stubborn_set`, plus the active-set
/// worklist `StubbornSetsActionCentric::compute_stubborn_set` drives).
struct EcRun<'a> {
    task: &'a Task,
    data: &'a EcData,
    values: &'a [i32],
    in_set: Vec<bool>,
    active_ops: Vec<bool>,
    written_vars: Vec<bool>,
    nes_computed: Vec<Vec<bool>>,
    worklist: Vec<OperatorId>,
}

impl<'a> EcRun<'a> {
    fn new(task: &'a Task, data: &'a EcData, values: &'a [i32]) -> Self {
        let num_ops = task.num_operators();
        let nes_computed = task.variables.iter().map(|v| vec![false; v.domain_size()]).collect();
        let mut run = EcRun {
            task,
            data,
            values,
            in_set: vec![false; num_ops],
            active_ops: vec![false; num_ops],
            written_vars: vec![false; task.num_variables()],
            nes_computed,
            worklist: Vec::new(),
        };
        run.compute_active_operators();
        run
    }

    fn is_applicable(&self, op: OperatorId) -> bool {
        self.task.operator(op).is_applicable(self.values)
    }

    /// Rule: an operator is active iff every precondition value is reachable
    /// from the current state's value for that variable. Inactive operators
    /// can never become applicable and are never added to the stubborn set.
    fn compute_active_operators(&mut self) {
        for (op_index, active) in self.active_ops.iter_mut().enumerate() {
            let op = self.task.operator(OperatorId(op_index));
            *active = op.preconditions.iter().all(|pre| {
                let current = self.values[pre.var];
                self.data.reachability_map[pre.var][current as usize][pre.value as usize]
            });
        }
    }

    /// Adds `op` to the stubborn set if not already present. Returns whether
    /// it was newly added.
    fn enqueue_stubborn_operator(&mut self, op: OperatorId) -> bool {
        if self.in_set[op.index()] {
            return false;
        }
        self.in_set[op.index()] = true;
        self.worklist.push(op);
        true
    }

    /// S2/S3/S4'/S5 all funnel new operators through here so `written_vars`
    /// only reflects operators that are both stubborn and applicable now
    /// (original: `enqueue_stubborn_operator_and_remember_written_vars`).
    fn enqueue_and_remember_written_vars(&mut self, op: OperatorId) {
        if self.enqueue_stubborn_operator(op) && self.is_applicable(op) {
            for effect in &self.task.operator(op).effects {
                self.written_vars[effect.effect.var] = true;
            }
        }
    }

    /// Necessary enabling set for `fact`: every active achiever (spec §4.7:
    /// a NES must contain all achievers of the unsatisfied fact to remain a
    /// sound disjunctive action landmark).
    fn add_nes_for_fact(&mut self, fact: FactPair) {
        for &achiever in self.data.base.achievers(fact) {
            if self.active_ops[achiever.index()] {
                self.enqueue_and_remember_written_vars(achiever);
            }
        }
        self.nes_computed[fact.var][fact.value as usize] = true;
    }

    fn add_nes_for_fact_once(&mut self, fact: FactPair) {
        if !self.nes_computed[fact.var][fact.value as usize] {
            self.add_nes_for_fact(fact);
        }
    }

    fn add_conflicting_and_disabling(&mut self, op: OperatorId) {
        for other in self.data.conflicting_and_disabling[op.index()].clone() {
            if self.active_ops[other.index()] {
                self.enqueue_and_remember_written_vars(other);
            }
        }
    }

    /// Rule S5: prefer a necessary enabling set for whichever of `op`'s
    /// violated preconditions is on a variable some already-stubborn
    /// operator writes to; fall back to the first violated precondition.
    fn apply_s5(&mut self, op: OperatorId) {
        let preconditions = self.task.operator(op).preconditions.clone();
        for pre in &preconditions {
            if self.values[pre.var] != pre.value && self.written_vars[pre.var] {
                self.add_nes_for_fact_once(*pre);
                return;
            }
        }
        let violated = self.data.base.first_unsatisfied_precondition(self.task, op, self.values);
        if let Some(fact) = violated {
            self.add_nes_for_fact_once(fact);
        }
    }

    /// Rule S1: the stubborn set starts from a necessary enabling set for
    /// some unsatisfied goal fact.
    fn initialize_stubborn_set(&mut self) {
        let goal = self
            .task
            .goal
            .iter()
            .find(|fact| self.values[fact.var] != fact.value)
            .copied();
        if let Some(fact) = goal {
            self.add_nes_for_fact(fact);
        }
    }

    fn handle_stubborn_operator(&mut self, op: OperatorId) {
        if self.is_applicable(op) {
            self.add_conflicting_and_disabling(op);

            for disabled_op in self.data.disabled[op.index()].clone() {
                if !self.active_ops[disabled_op.index()] {
                    continue;
                }
                let disabled_vars = self.data.disabled_vars(op, disabled_op, self.task);
                if disabled_vars.is_empty() {
                    continue;
                }
                let v_applicable = disabled_vars
                    .iter()
                    .any(|&var| self.data.is_v_applicable(var, disabled_op, self.values));
                if v_applicable {
                    self.enqueue_and_remember_written_vars(disabled_op);
                } else {
                    self.apply_s5(disabled_op);
                }
            }
        } else {
            self.apply_s5(op);
        }
    }

    fn run(mut self) -> Vec<bool> {
        self.initialize_stubborn_set();
        while let Some(op) = self.worklist.pop() {
            self.handle_stubborn_operator(op);
        }
        self.in_set
    }
}

impl PruningMethod for StubbornSetsEc {
    fn prune(&mut self, task: &Task, values: &[i32], applicable: &[OperatorId]) -> Vec<OperatorId> {
        if task.is_goal(values) {
            return applicable.to_vec();
        }
        let data = self.data(task);
        let in_set = EcRun::new(task, data, values).run();
        applicable.iter().filter(|op| in_set[op.index()]).copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::successor_generator::SuccessorGenerator;
    use crate::task::fixtures::ONE_STEP;

    #[test]
    fn single_operator_task_is_unaffected() {
        let task = Task::from_text(ONE_STEP).unwrap();
        let mut pruning = StubbornSetsEc::new();
        let pruned = pruning.prune(&task, &task.initial_state_values, &[OperatorId(0)]);
        assert_eq!(pruned, vec![OperatorId(0)]);
    }

    // A non-goal precondition with two achievers that don't conflict with
    // anything: var1=1 is the goal, reachable only via an operator whose
    // precondition var0=1 has two independent achievers. A necessary
    // enabling set that narrowed to a single "clean" achiever (the defect
    // this type previously had) would silently drop one of them; the
    // correct rule keeps every achiever active at the state being pruned.
    fn two_independent_achievers_task() -> Task {
        use crate::task::{Effect, Operator, Variable};

        let var0 = Variable {
            name: "var0".into(),
            fact_names: vec!["unset".into(), "set".into()],
            axiom_layer: -1,
            default_axiom_value: -1,
        };
        let var1 = Variable {
            name: "var1".into(),
            fact_names: vec!["unset".into(), "set".into()],
            axiom_layer: -1,
            default_axiom_value: -1,
        };

        let op_real = Operator {
            name: "op-real".into(),
            preconditions: vec![FactPair::new(0, 1)],
            effects: vec![Effect {
                conditions: vec![],
                effect: FactPair::new(1, 1),
            }],
            cost: 1,
            is_axiom: false,
        };
        let achieve_v0_x = Operator {
            name: "achieve-v0-x".into(),
            preconditions: vec![],
            effects: vec![Effect {
                conditions: vec![],
                effect: FactPair::new(0, 1),
            }],
            cost: 1,
            is_axiom: false,
        };
        let achieve_v0_y = Operator {
            name: "achieve-v0-y".into(),
            preconditions: vec![],
            effects: vec![Effect {
                conditions: vec![],
                effect: FactPair::new(0, 1),
            }],
            cost: 1,
            is_axiom: false,
        };

        Task::build(
            vec![var0, var1],
            vec![],
            vec![0, 0],
            vec![FactPair::new(1, 1)],
            vec![op_real, achieve_v0_x, achieve_v0_y],
            true,
        )
        .unwrap()
    }

    #[test]
    fn necessary_enabling_set_keeps_every_active_achiever() {
        let task = two_independent_achievers_task();
        let generator = SuccessorGenerator::new(&task);
        let mut pruning = StubbornSetsEc::new();
        let applicable = generator.generate_applicable_ops(&task.initial_state_values);
        let pruned = pruning.prune(&task, &task.initial_state_values, &applicable);
        let op_name = |id: OperatorId| task.operator(id).name.to_string();
        assert!(pruned.iter().any(|&id| op_name(id) == "achieve-v0-x"));
        assert!(pruned.iter().any(|&id| op_name(id) == "achieve-v0-y"));
    }
}
