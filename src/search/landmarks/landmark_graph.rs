//! Landmark discovery (spec §4.11; §3 "Landmark Graph"). Grounded on
//! `original_source/src/search/landmarks/landmark_factory_hm.h`/`.cc`: a
//! `P^m` compilation in which each proposition is a conjunction of up to `m`
//! original facts, a layered `reached` propagation over it, and a
//! landmark-set intersection rule (`update_proposition_landmark`) that
//! narrows each proposition's landmarks down to the facts every achiever
//! agrees on.
//!
//! Two simplifications against the original, both scoped to what this
//! crate's task model actually needs (see `DESIGN.md`):
//! - Operators with conditional effects are rejected up front (same
//!   restriction [`crate::search::heuristics::LmCutHeuristic`] already
//!   applies), so the `P^m` "conditional no-op" compilation the original uses
//!   to model PDDL conditional effects has no work to do here and is omitted.
//! - `m` is generalised only to `1` or `2`: the general algorithm enumerates
//!   subsets of an arbitrary superset recursively; since every subset this
//!   crate ever needs comes from a handful of already-mutually-consistent
//!   fact sets (an operator's own precondition/postcondition, the initial
//!   state, the goal), `m <= 2` is just "singletons" plus "unordered pairs",
//!   so no general recursive enumerator is needed. `m = 2` (the plugin's own
//!   documented default) is what [`LandmarkGraph::discover`] uses.

use std::collections::{HashMap, HashSet, VecDeque};

use crate::error::UnsupportedFeatureError;
use crate::task::proxy::TaskView;
use crate::task::{FactPair, Operator, OperatorId, Task};

pub const DEFAULT_M: usize = 2;

/// The four ordering strengths spec §3 names. `discover` only ever produces
/// [`OrderingType::Natural`] and [`OrderingType::GreedyNecessary`] edges —
/// exactly the two kinds `landmark_factory_hm.cc`'s `add_landmark_orderings`
/// derives from an h^m run. `Reasonable` and `ObedientReasonable` are
/// produced by a different factory in the original (not part of this pack);
/// they stay in the enum because the graph's edge-strength monotonicity rule
/// (`add_or_replace_ordering_if_stronger`) is defined over all four, and a
/// future factory can add those edges without touching this one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderingType {
    Natural,
    Reasonable,
    ObedientReasonable,
    GreedyNecessary,
}

impl OrderingType {
    /// Weakest to strongest, matching the relative strength the original
    /// orders these by (`greedy_necessary` implies `natural`).
    fn strength(self) -> u8 {
        match self {
            OrderingType::Natural => 0,
            OrderingType::Reasonable => 1,
            OrderingType::ObedientReasonable => 2,
            OrderingType::GreedyNecessary => 3,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LandmarkEdge {
    pub from: usize,
    pub to: usize,
    pub ordering: OrderingType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LandmarkKind {
    Atomic,
    Conjunctive,
}

/// A landmark: a set of facts that must all hold simultaneously at some
/// point in every plan (spec §3: "atomic or conjunctive").
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Landmark {
    pub facts: Vec<FactPair>,
    pub kind: LandmarkKind,
    /// Operators that can plausibly achieve this landmark, approximated the
    /// way `approximate_possible_achievers` does: any operator with an
    /// effect on one of `facts` whose pre/postcondition does not contradict
    /// the rest of `facts` (`can_achieve`, below). Cost partitioning charges
    /// each operator's cost against the landmarks it appears here for.
    pub operators: Vec<OperatorId>,
}

impl Landmark {
    pub fn is_satisfied(&self, values: &[i32]) -> bool {
        self.facts.iter().all(|fact| values[fact.var] == fact.value)
    }
}

#[derive(Debug)]
pub struct LandmarkGraph {
    pub landmarks: Vec<Landmark>,
    pub edges: Vec<LandmarkEdge>,
    /// Set when some goal-fact subset is unreached at the end of the h^m
    /// fixpoint: since h^m is a sound relaxation, an unreachable goal there
    /// means the task itself has no plan at all. `landmarks`/`edges` are
    /// left empty in this case; callers should treat the task as a dead end
    /// rather than read anything from them.
    pub dead_end: bool,
}

/// One `P^m` proposition: a specific conjunction of up to `m` original facts.
struct HmEntry {
    facts: Vec<FactPair>,
    reached: bool,
    /// Landmarks (other proposition ids) every achiever of this proposition
    /// agrees are necessary; narrowed by intersection as more achievers are
    /// found (`update_proposition_landmark`).
    landmarks: Vec<usize>,
    /// The subset of `landmarks` that are preconditions an achieving
    /// operator shares, used for greedy-necessary ordering extraction.
    precondition_landmarks: Vec<usize>,
}

/// All subsets of `facts` of size 1..=m (not just size exactly `m`), mirroring
/// `get_m_sets_of_set`. `facts` is assumed already internally consistent (an
/// operator's own precondition/postcondition, a state, or a goal), so no
/// mutex filtering is needed here.
fn subsets_upto_m(facts: &[FactPair], m: usize) -> Vec<Vec<FactPair>> {
    let mut subsets = Vec::new();
    for fact in facts {
        subsets.push(vec![*fact]);
    }
    if m >= 2 {
        for i in 0..facts.len() {
            for j in (i + 1)..facts.len() {
                let mut pair = vec![facts[i], facts[j]];
                pair.sort_unstable();
                subsets.push(pair);
            }
        }
    }
    subsets
}

fn sort_unique(v: &mut Vec<usize>) {
    v.sort_unstable();
    v.dedup();
}

fn intersect(a: &[usize], b: &[usize]) -> Vec<usize> {
    let set: HashSet<usize> = b.iter().copied().collect();
    a.iter().copied().filter(|x| set.contains(x)).collect()
}

/// Facts an operator guarantees hold after it fires: its own effects plus any
/// precondition fact on a variable none of its effects touch (a "prevail"
/// condition), matching `get_operator_postcondition`.
fn postcondition(op: &Operator) -> Vec<FactPair> {
    let mut touched = HashSet::new();
    let mut facts: Vec<FactPair> = op
        .effects
        .iter()
        .map(|effect| {
            touched.insert(effect.effect.var);
            effect.effect
        })
        .collect();
    for fact in &op.preconditions {
        if !touched.contains(&fact.var) {
            facts.push(*fact);
        }
    }
    facts
}

fn can_achieve(task: &Task, op: &Operator, op_postcondition: &[FactPair], facts: &[FactPair]) -> bool {
    for atom in facts {
        if op_postcondition.contains(atom) {
            continue;
        }
        if op_postcondition.iter().any(|other| task.is_mutex(*atom, *other)) {
            return false;
        }
        if op.preconditions.iter().any(|other| task.is_mutex(*atom, *other)) {
            return false;
        }
    }
    true
}

/// Builds the `P^m` proposition table and compiles each operator's
/// precondition/effect propositions.
struct Compilation<'a> {
    task: &'a Task,
    m: usize,
    hm_table: Vec<HmEntry>,
    index: HashMap<Vec<FactPair>, usize>,
    /// Per operator: the proposition ids of its (size <= m) precondition
    /// subsets, and of its (size <= m) postcondition subsets.
    op_preconditions: Vec<Vec<usize>>,
    op_effects: Vec<Vec<usize>>,
}

impl<'a> Compilation<'a> {
    fn new(task: &'a Task, m: usize) -> Self {
        Compilation {
            task,
            m,
            hm_table: Vec::new(),
            index: HashMap::new(),
            op_preconditions: Vec::new(),
            op_effects: Vec::new(),
        }
    }

    fn atom_id(&mut self, mut facts: Vec<FactPair>) -> usize {
        facts.sort_unstable();
        facts.dedup();
        if let Some(&id) = self.index.get(&facts) {
            return id;
        }
        let id = self.hm_table.len();
        self.index.insert(facts.clone(), id);
        self.hm_table.push(HmEntry {
            facts,
            reached: false,
            landmarks: Vec::new(),
            precondition_landmarks: Vec::new(),
        });
        id
    }

    fn ids_for(&mut self, facts: &[FactPair]) -> Vec<usize> {
        subsets_upto_m(facts, self.m)
            .into_iter()
            .map(|subset| self.atom_id(subset))
            .collect()
    }

    fn build_operators(&mut self) {
        let ops: Vec<Operator> = self.task.operators().to_vec();
        self.op_preconditions.reserve(ops.len());
        self.op_effects.reserve(ops.len());
        for op in &ops {
            let precondition_ids = self.ids_for(&op.preconditions);
            let post = postcondition(op);
            let effect_ids = self.ids_for(&post);
            self.op_preconditions.push(precondition_ids);
            self.op_effects.push(effect_ids);
        }
    }
}

/// Propagates `reached`/`landmarks` to a fixpoint: a worklist of operator
/// ids whose precondition propositions are (now) all reached, recomputing
/// each operator's landmark contribution and intersecting it into every
/// effect proposition, re-enqueuing dependants whenever a proposition's
/// `landmarks` set actually shrinks (mirrors `compute_hm_landmarks`, folded
/// into one queue instead of the original's level-by-level trigger sets
/// since there are no conditional no-ops to stage between levels here).
fn compute_hm_landmarks(compilation: &mut Compilation, initial_values: &[i32]) {
    let num_ops = compilation.op_preconditions.len();
    let mut unsatisfied: Vec<usize> = compilation.op_preconditions.iter().map(|p| p.len()).collect();
    let mut activated = vec![false; num_ops];
    let mut dependants: HashMap<usize, Vec<usize>> = HashMap::new();
    for (op_id, preconditions) in compilation.op_preconditions.iter().enumerate() {
        for &atom in preconditions {
            dependants.entry(atom).or_default().push(op_id);
        }
    }

    let mut queue: VecDeque<usize> = VecDeque::new();
    let mut queued = vec![false; num_ops];
    let mut enqueue = |op_id: usize, queue: &mut VecDeque<usize>, queued: &mut Vec<bool>| {
        if !queued[op_id] {
            queued[op_id] = true;
            queue.push_back(op_id);
        }
    };

    // Mark every proposition true in the initial state as reached with no
    // landmarks of its own.
    let initial_facts: Vec<FactPair> = initial_values
        .iter()
        .enumerate()
        .map(|(var, &value)| FactPair::new(var, value))
        .collect();
    let initial_ids = compilation.ids_for(&initial_facts);
    for id in initial_ids {
        compilation.hm_table[id].reached = true;
        for &op_id in dependants.get(&id).cloned().unwrap_or_default().iter() {
            if !activated[op_id] {
                unsatisfied[op_id] -= 1;
                if unsatisfied[op_id] == 0 {
                    activated[op_id] = true;
                    enqueue(op_id, &mut queue, &mut queued);
                }
            }
        }
    }
    // Operators with an empty precondition never get decremented above.
    for op_id in 0..num_ops {
        if unsatisfied[op_id] == 0 && !activated[op_id] {
            activated[op_id] = true;
            enqueue(op_id, &mut queue, &mut queued);
        }
    }

    while let Some(op_id) = queue.pop_front() {
        queued[op_id] = false;
        let preconditions = compilation.op_preconditions[op_id].clone();
        let mut landmarks: Vec<usize> = Vec::new();
        for &atom in &preconditions {
            landmarks.extend(compilation.hm_table[atom].landmarks.iter().copied());
        }
        landmarks.extend(preconditions.iter().copied());
        sort_unique(&mut landmarks);
        let mut precondition_landmarks = preconditions.clone();
        sort_unique(&mut precondition_landmarks);

        for &effect in &compilation.op_effects[op_id].clone() {
            let entry = &mut compilation.hm_table[effect];
            if entry.reached {
                let prev_size = entry.landmarks.len();
                entry.landmarks = intersect(&entry.landmarks, &landmarks);
                if !landmarks.contains(&effect) {
                    entry.precondition_landmarks = intersect(&entry.precondition_landmarks, &precondition_landmarks);
                }
                let changed = entry.landmarks.len() != prev_size;
                if changed {
                    if let Some(ops) = dependants.get(&effect) {
                        for &dep in ops {
                            if activated[dep] {
                                enqueue(dep, &mut queue, &mut queued);
                            }
                        }
                    }
                }
            } else {
                entry.reached = true;
                entry.landmarks = landmarks.clone();
                entry.precondition_landmarks = precondition_landmarks.clone();
                if let Some(ops) = dependants.get(&effect).cloned() {
                    for dep in ops {
                        if !activated[dep] {
                            unsatisfied[dep] -= 1;
                            if unsatisfied[dep] == 0 {
                                activated[dep] = true;
                                enqueue(dep, &mut queue, &mut queued);
                            }
                        } else {
                            enqueue(dep, &mut queue, &mut queued);
                        }
                    }
                }
            }
        }
    }
}

/// Removes, from each landmark's direct predecessor list, anything already
/// implied transitively by another direct predecessor or already carried as
/// a greedy-necessary precondition (`reduce_landmarks`): this is the
/// transitive reduction that keeps `NATURAL` edges from duplicating
/// `GREEDY_NECESSARY` ones or chaining redundantly.
fn reduce_landmarks(hm_table: &mut [HmEntry], landmark_ids: &[usize]) {
    let mut sorted = landmark_ids.to_vec();
    sorted.sort_unstable();
    for &id in &sorted {
        let mut to_remove = hm_table[id].precondition_landmarks.clone();
        for &predecessor in &hm_table[id].landmarks.clone() {
            to_remove.extend(hm_table[predecessor].landmarks.iter().copied());
        }
        sort_unique(&mut to_remove);
        let remaining: Vec<usize> = hm_table[id]
            .landmarks
            .iter()
            .copied()
            .filter(|l| !to_remove.contains(l))
            .collect();
        hm_table[id].landmarks = remaining;
    }
}

fn add_or_replace_ordering_if_stronger(edges: &mut Vec<LandmarkEdge>, from: usize, to: usize, ordering: OrderingType) {
    if let Some(edge) = edges.iter_mut().find(|e| e.from == from && e.to == to) {
        if ordering.strength() > edge.ordering.strength() {
            edge.ordering = ordering;
        }
    } else {
        edges.push(LandmarkEdge { from, to, ordering });
    }
}

impl LandmarkGraph {
    /// Discovers the landmark graph for `task` by running h^m (`m = 2` by
    /// default) from `initial_values` to the task's goal. Unlike
    /// `LmCutHeuristic`, which is re-run per evaluated state, this discovery
    /// is meant to be done once, from the actual search-start state, and the
    /// resulting graph reused for every state the search visits (spec §4.11:
    /// landmark *status* — not the landmark set itself — varies per state).
    pub fn discover(task: &TaskView, initial_values: &[i32]) -> Result<Self, UnsupportedFeatureError> {
        Self::discover_with_m(task, initial_values, DEFAULT_M)
    }

    pub fn discover_with_m(task: &TaskView, initial_values: &[i32], m: usize) -> Result<Self, UnsupportedFeatureError> {
        let root = task.root_task();
        if !root.axioms().is_empty() {
            return Err(UnsupportedFeatureError {
                component: "landmark graph (h^m)",
                feature: "axioms",
            });
        }
        if root.operators().iter().any(|op| op.has_conditional_effects()) {
            return Err(UnsupportedFeatureError {
                component: "landmark graph (h^m)",
                feature: "conditional effects",
            });
        }

        let mut compilation = Compilation::new(root, m);
        compilation.build_operators();
        compute_hm_landmarks(&mut compilation, initial_values);

        let goal_ids = compilation.ids_for(&root.goal);
        let mut accumulated: HashSet<usize> = HashSet::new();
        let mut goal_set_ids = Vec::new();
        for &goal_id in &goal_ids {
            accumulated.insert(goal_id);
            accumulated.extend(compilation.hm_table[goal_id].landmarks.iter().copied());
            goal_set_ids.push(goal_id);
        }
        let mut landmark_ids: Vec<usize> = accumulated.into_iter().collect();
        landmark_ids.sort_unstable();

        reduce_landmarks(&mut compilation.hm_table, &landmark_ids);

        // node id (hm proposition id) -> index into the returned landmarks list.
        let mut node_index: HashMap<usize, usize> = HashMap::new();
        let mut landmarks = Vec::new();
        let operators_including_effect = build_operators_including_effect(root);
        for &id in &landmark_ids {
            node_index.insert(id, landmarks.len());
            let facts = compilation.hm_table[id].facts.clone();
            let kind = if facts.len() == 1 { LandmarkKind::Atomic } else { LandmarkKind::Conjunctive };
            let operators = possible_achievers(root, &operators_including_effect, &facts);
            landmarks.push(Landmark { facts, kind, operators });
        }

        let mut edges = Vec::new();
        for &to_id in &landmark_ids {
            let to = node_index[&to_id];
            for &from_id in &compilation.hm_table[to_id].precondition_landmarks.clone() {
                if let Some(&from) = node_index.get(&from_id) {
                    add_or_replace_ordering_if_stronger(&mut edges, from, to, OrderingType::GreedyNecessary);
                }
            }
            for &from_id in &compilation.hm_table[to_id].landmarks.clone() {
                if let Some(&from) = node_index.get(&from_id) {
                    add_or_replace_ordering_if_stronger(&mut edges, from, to, OrderingType::Natural);
                }
            }
        }

        let dead_end = goal_set_ids.iter().any(|&id| !compilation.hm_table[id].reached);
        if dead_end {
            return Ok(LandmarkGraph {
                landmarks: Vec::new(),
                edges: Vec::new(),
                dead_end: true,
            });
        }

        Ok(LandmarkGraph { landmarks, edges, dead_end: false })
    }
}

fn build_operators_including_effect(task: &Task) -> HashMap<FactPair, Vec<OperatorId>> {
    let mut map: HashMap<FactPair, Vec<OperatorId>> = HashMap::new();
    for (index, op) in task.operators().iter().enumerate() {
        for effect in &op.effects {
            map.entry(effect.effect).or_default().push(OperatorId(index));
        }
    }
    map
}

fn possible_achievers(
    task: &Task,
    operators_including_effect: &HashMap<FactPair, Vec<OperatorId>>,
    facts: &[FactPair],
) -> Vec<OperatorId> {
    let mut candidates: HashSet<OperatorId> = HashSet::new();
    for fact in facts {
        if let Some(ops) = operators_including_effect.get(fact) {
            candidates.extend(ops.iter().copied());
        }
    }
    let mut achievers: Vec<OperatorId> = candidates
        .into_iter()
        .filter(|&op_id| {
            let op = task.operator(op_id);
            let post = postcondition(op);
            can_achieve(task, op, &post, facts)
        })
        .collect();
    achievers.sort_unstable();
    achievers
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::fixtures::{DEAD_END, ONE_STEP};
    use crate::task::{MutexGroup, Task, Variable};

    #[test]
    fn one_step_task_yields_a_single_atomic_landmark() {
        let task = Task::from_text(ONE_STEP).unwrap();
        let view = TaskView::root(&task);
        let graph = LandmarkGraph::discover(&view, &task.initial_state_values).unwrap();
        assert_eq!(graph.landmarks.len(), 1);
        assert_eq!(graph.landmarks[0].facts, vec![FactPair::new(0, 1)]);
        assert_eq!(graph.landmarks[0].kind, LandmarkKind::Atomic);
        assert_eq!(graph.landmarks[0].operators, vec![OperatorId(0)]);
    }

    #[test]
    fn dead_end_task_is_flagged_and_yields_no_landmarks() {
        let task = Task::from_text(DEAD_END).unwrap();
        let view = TaskView::root(&task);
        let graph = LandmarkGraph::discover(&view, &task.initial_state_values).unwrap();
        assert!(graph.dead_end);
        assert!(graph.landmarks.is_empty());
    }

    /// Two variables, a goal on both; the operator achieving `var1` requires
    /// `var0` already be set, so `(var0, 1)` must be a greedy-necessary
    /// predecessor of `(var1, 1)` in the discovered graph.
    #[test]
    fn chained_operators_yield_a_greedy_necessary_ordering() {
        let variables = vec![
            Variable {
                name: "var0".into(),
                fact_names: vec!["v0-0".into(), "v0-1".into()],
                axiom_layer: -1,
                default_axiom_value: -1,
            },
            Variable {
                name: "var1".into(),
                fact_names: vec!["v1-0".into(), "v1-1".into()],
                axiom_layer: -1,
                default_axiom_value: -1,
            },
        ];
        let operators = vec![
            Operator {
                name: "achieve-v0".into(),
                preconditions: vec![],
                effects: vec![crate::task::Effect {
                    conditions: vec![],
                    effect: FactPair::new(0, 1),
                }],
                cost: 1,
                is_axiom: false,
            },
            Operator {
                name: "achieve-v1".into(),
                preconditions: vec![FactPair::new(0, 1)],
                effects: vec![crate::task::Effect {
                    conditions: vec![],
                    effect: FactPair::new(1, 1),
                }],
                cost: 1,
                is_axiom: false,
            },
        ];
        let task = Task::build(
            variables,
            Vec::<MutexGroup>::new(),
            vec![0, 0],
            vec![FactPair::new(0, 1), FactPair::new(1, 1)],
            operators,
            false,
        )
        .unwrap();
        let view = TaskView::root(&task);
        let graph = LandmarkGraph::discover(&view, &task.initial_state_values).unwrap();

        let v0 = graph.landmarks.iter().position(|l| l.facts == vec![FactPair::new(0, 1)]).unwrap();
        let v1 = graph.landmarks.iter().position(|l| l.facts == vec![FactPair::new(1, 1)]).unwrap();
        assert!(graph
            .edges
            .iter()
            .any(|e| e.from == v0 && e.to == v1 && matches!(e.ordering, OrderingType::GreedyNecessary)));
    }
}
