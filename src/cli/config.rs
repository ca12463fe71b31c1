//! Lowers a parsed [`ConfigExpr`](super::config_grammar::ConfigExpr) into a
//! runnable search configuration: a [`SearchMode`], the heuristic stack, and
//! the pruning method, ready to hand to
//! [`crate::search::EagerSearchEngine::new`].

use crate::cli::config_grammar::{self, ConfigExpr};
use crate::error::ConfigError;
use crate::search::heuristics::{CeaHeuristic, CgHeuristic, FfHeuristic, Heuristic, LmCutHeuristic, RelaxationHeuristic};
use crate::search::landmarks::{LandmarkCostPartitioningHeuristic, PartitioningMethod};
use crate::search::pruning::{LimitedPruning, NullPruning, PruningMethod, StubbornSetsEc, StubbornSetsSimple};
use crate::search::SearchMode;
use crate::task::proxy::TaskView;

pub struct SearchConfig {
    pub mode: SearchMode,
    pub heuristics: Vec<Box<dyn Heuristic>>,
    pub pruning: Box<dyn PruningMethod>,
}

/// Parses and builds a search configuration from a `--search` string, e.g.
/// `"astar(lmcut())"` or `"eager_greedy([hadd(), hff()], pruning=stubborn_sets_simple())"`.
pub fn build_search_config(text: &str, task: &TaskView) -> Result<SearchConfig, ConfigError> {
    let expr = config_grammar::parse(text).map_err(ConfigError::Syntax)?;
    let ConfigExpr::Call { name, args } = expr else {
        return Err(ConfigError::Syntax("expected a top-level search algorithm call".to_string()));
    };

    let (positional, kwargs) = split_args(&args);
    let pruning = match find_kwarg(&kwargs, "pruning") {
        Some(e) => build_pruning(e)?,
        None => Box::new(NullPruning),
    };

    match name.as_str() {
        "astar" => {
            let heuristics = build_heuristics(positional.first().ok_or_else(|| missing("astar", "heuristic"))?, task)?;
            Ok(SearchConfig {
                mode: SearchMode::AStar,
                heuristics,
                pruning,
            })
        }
        "wastar" => {
            let heuristics = build_heuristics(positional.first().ok_or_else(|| missing("wastar", "heuristic"))?, task)?;
            let weight = match find_kwarg(&kwargs, "w") {
                Some(ConfigExpr::Number(w)) => *w as i32,
                Some(_) => return Err(ConfigError::Syntax("w must be a number".to_string())),
                None => 2,
            };
            Ok(SearchConfig {
                mode: SearchMode::WeightedAStar(weight),
                heuristics,
                pruning,
            })
        }
        "eager_greedy" | "gbfs" | "greedy" => {
            let heuristics = build_heuristics(positional.first().ok_or_else(|| missing(&name, "heuristic(s)"))?, task)?;
            Ok(SearchConfig {
                mode: SearchMode::Greedy,
                heuristics,
                pruning,
            })
        }
        other => Err(ConfigError::UnknownComponent(other.to_string())),
    }
}

fn missing(component: &str, argument: &str) -> ConfigError {
    ConfigError::MissingArgument {
        component: component.to_string(),
        argument: argument.to_string(),
    }
}

fn split_args(args: &[ConfigExpr]) -> (Vec<&ConfigExpr>, Vec<(&str, &ConfigExpr)>) {
    let mut positional = Vec::new();
    let mut kwargs = Vec::new();
    for arg in args {
        match arg {
            ConfigExpr::Kwarg(name, value) => kwargs.push((name.as_str(), value.as_ref())),
            other => positional.push(other),
        }
    }
    (positional, kwargs)
}

fn find_kwarg<'a>(kwargs: &[(&str, &'a ConfigExpr)], name: &str) -> Option<&'a ConfigExpr> {
    kwargs.iter().find(|(n, _)| *n == name).map(|(_, v)| *v)
}

/// A single heuristic expr or a `[h1, h2, ...]` list both lower to a vector
/// (the engine alternates among them when there is more than one, spec §4.9).
fn build_heuristics(expr: &ConfigExpr, task: &TaskView) -> Result<Vec<Box<dyn Heuristic>>, ConfigError> {
    match expr {
        ConfigExpr::List(items) => items.iter().map(|e| build_heuristic(e, task)).collect(),
        other => Ok(vec![build_heuristic(other, task)?]),
    }
}

fn build_heuristic(expr: &ConfigExpr, task: &TaskView) -> Result<Box<dyn Heuristic>, ConfigError> {
    let ConfigExpr::Call { name, args } = expr else {
        return Err(ConfigError::Syntax("expected a heuristic call".to_string()));
    };
    match name.as_str() {
        "hmax" => Ok(Box::new(RelaxationHeuristic::new_hmax(task))),
        "hadd" => Ok(Box::new(RelaxationHeuristic::new_hadd(task))),
        "hff" => Ok(Box::new(FfHeuristic::new(task))),
        "lmcut" => Ok(Box::new(
            LmCutHeuristic::new(task).map_err(|e| ConfigError::Syntax(e.to_string()))?,
        )),
        "cea" => Ok(Box::new(CeaHeuristic::new(task))),
        "cg" => Ok(Box::new(CgHeuristic::new(task))),
        "cpf" => {
            let method = match args.first() {
                Some(ConfigExpr::Call { name, .. }) if name == "optimal" => PartitioningMethod::Optimal,
                _ => PartitioningMethod::Uniform,
            };
            Ok(Box::new(
                LandmarkCostPartitioningHeuristic::try_new(task, method).map_err(|e| ConfigError::Syntax(e.to_string()))?,
            ))
        }
        other => Err(ConfigError::UnknownComponent(other.to_string())),
    }
}

fn build_pruning(expr: &ConfigExpr) -> Result<Box<dyn PruningMethod>, ConfigError> {
    let ConfigExpr::Call { name, args } = expr else {
        return Err(ConfigError::Syntax("expected a pruning method call".to_string()));
    };
    match name.as_str() {
        "none" => Ok(Box::new(NullPruning)),
        "stubborn_sets_simple" => Ok(Box::new(StubbornSetsSimple::new())),
        "stubborn_sets_ec" => Ok(Box::new(StubbornSetsEc::new())),
        "limited_pruning" => {
            let (positional, kwargs) = split_args(args);
            let inner = match positional.first() {
                Some(e) => build_pruning(e)?,
                None => return Err(missing("limited_pruning", "inner pruning method")),
            };
            let expansions = match find_kwarg(&kwargs, "expansions") {
                Some(ConfigExpr::Number(n)) => *n as u32,
                _ => 1000,
            };
            let ratio = match find_kwarg(&kwargs, "min_required_ratio") {
                Some(ConfigExpr::Number(n)) => *n,
                _ => 0.2,
            };
            // `LimitedPruning` wraps a concrete inner method generically; since
            // the grammar only knows the inner method dynamically, box it
            // behind the same `PruningMethod` trait object it already is.
            Ok(Box::new(LimitedPruning::new(DynPruning(inner), expansions, ratio)))
        }
        other => Err(ConfigError::UnknownComponent(other.to_string())),
    }
}

/// Adapts a boxed trait object back into a concrete [`PruningMethod`] so
/// [`LimitedPruning<P>`] (generic over its inner method) can wrap one chosen
/// at runtime by the configuration grammar.
#[derive(Debug)]
struct DynPruning(Box<dyn PruningMethod>);

impl PruningMethod for DynPruning {
    fn prune(&mut self, task: &crate::task::Task, values: &[i32], applicable: &[crate::task::OperatorId]) -> Vec<crate::task::OperatorId> {
        self.0.prune(task, values, applicable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::fixtures::ONE_STEP;
    use crate::task::Task;

    #[test]
    fn builds_an_astar_lmcut_configuration() {
        let task = Task::from_text(ONE_STEP).unwrap();
        let view = TaskView::root(&task);
        let config = build_search_config("astar(lmcut())", &view).unwrap();
        assert!(matches!(config.mode, SearchMode::AStar));
        assert_eq!(config.heuristics.len(), 1);
    }

    #[test]
    fn builds_a_weighted_astar_configuration_with_custom_weight() {
        let task = Task::from_text(ONE_STEP).unwrap();
        let view = TaskView::root(&task);
        let config = build_search_config("wastar(hadd(), w=3)", &view).unwrap();
        assert!(matches!(config.mode, SearchMode::WeightedAStar(3)));
    }

    #[test]
    fn builds_an_eager_greedy_configuration_with_pruning() {
        let task = Task::from_text(ONE_STEP).unwrap();
        let view = TaskView::root(&task);
        let config = build_search_config(
            "eager_greedy([hadd(), hff()], pruning=stubborn_sets_simple())",
            &view,
        )
        .unwrap();
        assert_eq!(config.heuristics.len(), 2);
    }

    #[test]
    fn unknown_algorithm_is_reported_as_a_config_error() {
        let task = Task::from_text(ONE_STEP).unwrap();
        let view = TaskView::root(&task);
        assert!(build_search_config("bogus(hadd())", &view).is_err());
    }
}
