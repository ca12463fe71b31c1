//! The eager best-first search loop unifying A*, weighted A*, and greedy
//! best-first search (spec §4.9). Grounded on the teacher's
//! `search_engines/gbfs.rs` expansion loop, generalised from a single
//! evaluator to the alternation-over-heuristics open list and the
//! axiom/pruning/bound machinery a grounded SAS⁺ task needs.

use crate::axioms::AxiomEvaluator;
use crate::error::UnsupportedFeatureError;
use crate::search::heuristics::{EvaluationResult, Heuristic};
use crate::search::open_lists::{AlternationOpenList, OpenList, StandardOpenList};
use crate::search::pruning::PruningMethod;
use crate::search::search_node::SearchNodeStatus;
use crate::search::search_space::SearchSpace;
use crate::search::statistics::SearchStatistics;
use crate::search::termination::{SearchOutcome, TerminationCondition};
use crate::state::{StateId, StateRegistry};
use crate::task::proxy::TaskView;
use crate::task::Task;
use crate::successor_generator::SuccessorGenerator;
use std::time::Duration;

/// How the open list's sort key is derived from `g` and each heuristic's
/// `h` (spec §4.9 "eager best-first / A* family").
#[derive(Debug, Clone, Copy)]
pub enum SearchMode {
    /// `f = g + h`, admissible heuristics required for optimality.
    AStar,
    /// `f = g + weight * h`.
    WeightedAStar(i32),
    /// `f = h`, ignores `g` entirely.
    Greedy,
}

impl SearchMode {
    fn key(&self, g: i32, h: i32) -> i32 {
        match self {
            SearchMode::AStar => g.saturating_add(h),
            SearchMode::WeightedAStar(weight) => g.saturating_add(weight.saturating_mul(h)),
            SearchMode::Greedy => h,
        }
    }
}

pub struct EagerSearchEngine<'a> {
    task: &'a Task,
    task_view: TaskView<'a>,
    generator: SuccessorGenerator,
    axioms: AxiomEvaluator,
    mode: SearchMode,
    heuristics: Vec<Box<dyn Heuristic>>,
    pruning: Box<dyn PruningMethod>,
    bound: Option<i32>,
    registry: StateRegistry,
    space: SearchSpace,
    statistics: SearchStatistics,
}

impl<'a> EagerSearchEngine<'a> {
    pub fn new(
        task: &'a Task,
        mode: SearchMode,
        heuristics: Vec<Box<dyn Heuristic>>,
        pruning: Box<dyn PruningMethod>,
        bound: Option<i32>,
    ) -> Result<Self, UnsupportedFeatureError> {
        let generator = SuccessorGenerator::new(task);
        let axioms = AxiomEvaluator::new(task);
        let task_view = TaskView::root(task);
        let registry = StateRegistry::new(task);
        Ok(EagerSearchEngine {
            task,
            task_view,
            generator,
            axioms,
            mode,
            heuristics,
            pruning,
            bound,
            registry,
            space: SearchSpace::new(),
            statistics: SearchStatistics::new(),
        })
    }

    pub fn statistics(&self) -> &SearchStatistics {
        &self.statistics
    }

    fn evaluate(&mut self, values: &[i32]) -> Option<Vec<i32>> {
        let mut h_values = Vec::with_capacity(self.heuristics.len());
        for heuristic in &mut self.heuristics {
            match heuristic.evaluate(&self.task_view, values) {
                EvaluationResult::Value(h) => h_values.push(h),
                EvaluationResult::DeadEnd => {
                    if heuristic.dead_ends_are_reliable() {
                        return None;
                    }
                    h_values.push(crate::search::heuristics::MAX_COST_VALUE);
                }
            }
        }
        Some(h_values)
    }

    pub fn search(
        &mut self,
        time_limit: Option<Duration>,
        memory_limit_mb: Option<usize>,
    ) -> SearchOutcome {
        let mut termination = TerminationCondition::new(time_limit, memory_limit_mb);
        let initial = self.registry.get_initial_state();
        self.space.node_mut(initial).open(0, None);

        let num_heuristics = self.heuristics.len().max(1);
        let mut open_list: Box<dyn OpenList<StateId>> = if self.heuristics.len() <= 1 {
            Box::new(StandardOpenList::new())
        } else {
            let children: Vec<Box<dyn OpenList<StateId>>> = (0..num_heuristics)
                .map(|_| Box::new(StandardOpenList::new()) as Box<dyn OpenList<StateId>>)
                .collect();
            Box::new(AlternationOpenList::new(children, vec![], 1))
        };

        let initial_values = self.registry.lookup_values(initial);
        if self.task_view.is_goal(&initial_values) {
            return SearchOutcome::Solved(vec![]);
        }

        match self.evaluate(&initial_values) {
            None => return SearchOutcome::Unsolvable,
            Some(h_values) => {
                let key = h_values
                    .iter()
                    .map(|&h| self.mode.key(0, h))
                    .collect::<Vec<_>>();
                open_list.insert(&key, initial);
            }
        }

        loop {
            if let Some(outcome) = termination.should_terminate() {
                termination.finalise();
                return outcome;
            }

            let Some(state_id) = open_list.pop() else {
                termination.finalise();
                return if open_list.is_dead_end_reliable() {
                    SearchOutcome::Unsolvable
                } else {
                    SearchOutcome::UnsolvedIncomplete
                };
            };

            let node = self.space.node(state_id);
            if node.status() == SearchNodeStatus::Closed || node.status() == SearchNodeStatus::DeadEnd {
                continue;
            }
            let g = node.g();
            self.space.node_mut(state_id).close();
            self.statistics.expanded += 1;

            let values = self.registry.lookup_values(state_id);
            if self.task_view.is_goal(&values) {
                termination.finalise();
                return SearchOutcome::Solved(self.space.extract_plan(state_id));
            }

            let applicable = self.generator.generate_applicable_ops(&values);
            self.statistics.generated += applicable.len() as u64;
            let surviving = self.pruning.prune(self.task, &values, &applicable);

            for op_id in surviving {
                let cost = self.task_view.operator_cost(op_id);
                let new_g = g.saturating_add(cost);
                if let Some(bound) = self.bound {
                    if new_g >= bound {
                        continue;
                    }
                }

                let successor = self.registry.get_successor_state(self.task, &self.axioms, state_id, op_id);
                let successor_node = self.space.node_mut(successor);
                let is_new = successor_node.status() == SearchNodeStatus::New;
                let is_cheaper = new_g < successor_node.g();
                if !is_new && !is_cheaper {
                    continue;
                }

                let successor_values = self.registry.lookup_values(successor);
                for heuristic in &mut self.heuristics {
                    heuristic.notify_transition(&self.task_view, &values, op_id, &successor_values);
                }
                match self.evaluate(&successor_values) {
                    None => {
                        self.space.node_mut(successor).mark_dead_end();
                        self.statistics.dead_ends += 1;
                    }
                    Some(h_values) => {
                        if is_new {
                            self.statistics.generated += 1;
                        } else {
                            self.statistics.reopened += 1;
                        }
                        self.statistics.evaluated += 1;
                        self.space.node_mut(successor).open(new_g, Some((state_id, op_id)));
                        let key = h_values
                            .iter()
                            .map(|&h| self.mode.key(new_g, h))
                            .collect::<Vec<_>>();
                        open_list.insert(&key, successor);
                    }
                }
            }

            self.statistics.report();
            termination.log_if_due();
        }
    }
}
