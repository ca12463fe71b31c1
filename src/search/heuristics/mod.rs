//! Relaxation-based heuristics (spec §4.4-§4.6).

mod cea;
mod cg;
mod combinator;
mod dtg;
pub mod heuristic;
mod lmcut;
mod relaxation;

pub use cea::CeaHeuristic;
pub use cg::CgHeuristic;
pub use combinator::CombiningHeuristic;
pub use heuristic::{EvaluationResult, EvaluatorCache, Heuristic, MAX_COST_VALUE};
pub use lmcut::LmCutHeuristic;
pub use relaxation::{FfHeuristic, RelaxationHeuristic};

use crate::error::UnsupportedFeatureError;
use crate::task::proxy::TaskView;

/// Which heuristic to construct, driving `--evaluator`-style CLI selection
/// (spec §6: the core does not prescribe a configuration grammar, but does
/// need a name-to-constructor mapping for whichever one the chosen grammar
/// resolves to).
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
#[clap(rename_all = "kebab-case")]
pub enum HeuristicName {
    Hmax,
    Hadd,
    Hff,
    LmCut,
    Cea,
    Cg,
}

impl HeuristicName {
    pub fn create(self, task: &TaskView) -> Result<Box<dyn Heuristic>, UnsupportedFeatureError> {
        Ok(match self {
            HeuristicName::Hmax => Box::new(RelaxationHeuristic::new_hmax(task)),
            HeuristicName::Hadd => Box::new(RelaxationHeuristic::new_hadd(task)),
            HeuristicName::Hff => Box::new(FfHeuristic::new(task)),
            HeuristicName::LmCut => Box::new(LmCutHeuristic::new(task)?),
            HeuristicName::Cea => Box::new(CeaHeuristic::new(task)),
            HeuristicName::Cg => Box::new(CgHeuristic::new(task)),
        })
    }
}
