//! The `downward` binary: parses a grounded SAS+ task, builds the search
//! configuration named by `--search`, runs it, and writes the plan (spec §6).
//!
//! Grounded on the teacher's `bin/planner.rs` entry point shape (parse args,
//! init `tracing_subscriber`, parse the task, run the engine, report the
//! result) with the lifted-PDDL/pyo3 plumbing replaced by the grounded SAS+
//! pipeline and the single exit-code funnel of `error::DownwardError`.

use std::process::ExitCode as ProcessExitCode;

use clap::Parser;
use downward_sas::cli::config::build_search_config;
use downward_sas::cli::PlannerArgs;
use downward_sas::error::{ConfigError, DownwardError, ExitCode};
use downward_sas::plan::Plan;
use downward_sas::search::{EagerSearchEngine, SearchOutcome};
use downward_sas::task::proxy::TaskView;
use downward_sas::task::Task;

fn main() -> ProcessExitCode {
    let args = PlannerArgs::parse();

    tracing_subscriber::fmt()
        .with_max_level(args.verbosity.level())
        .with_writer(std::io::stderr)
        .compact()
        .init();

    match run(&args) {
        Ok(code) => ProcessExitCode::from(code.code() as u8),
        Err(err) => {
            tracing::error!("{err}");
            ProcessExitCode::from(err.exit_code().code() as u8)
        }
    }
}

fn run(args: &PlannerArgs) -> Result<ExitCode, DownwardError> {
    let task = Task::from_path(&args.task_file)?;

    let config_text = args
        .select_search_config(task.use_metric)
        .ok_or_else(|| DownwardError::Config(ConfigError::Syntax("no --search configuration applies to this task".to_string())))?;

    let view = TaskView::root(&task);
    let config = build_search_config(config_text, &view)?;

    let mut engine = EagerSearchEngine::new(&task, config.mode, config.heuristics, config.pruning, args.bound)?;

    let outcome = engine.search(args.time_limit, args.memory_limit_mb);
    engine.statistics().report();

    match outcome {
        SearchOutcome::Solved(steps) => {
            let plan = Plan::new(&task, steps);
            let path = Plan::output_path(&args.plan_file, args.previous_portfolio_plans);
            std::fs::write(&path, plan.render(&task))?;
            tracing::info!(cost = plan.cost(), path = %path.display(), "plan found");
            Ok(ExitCode::Success)
        }
        SearchOutcome::Unsolvable => {
            tracing::info!("task proven unsolvable");
            Ok(ExitCode::SearchUnsolvable)
        }
        SearchOutcome::UnsolvedIncomplete => {
            tracing::warn!("search exhausted without a proof of unsolvability");
            Ok(ExitCode::SearchUnsolvedIncomplete)
        }
        SearchOutcome::MemoryLimitExceeded => {
            tracing::warn!("search stopped: memory limit exceeded");
            Ok(ExitCode::SearchOutOfMemory)
        }
        SearchOutcome::TimeLimitExceeded => {
            tracing::warn!("search stopped: time limit exceeded");
            Ok(ExitCode::SearchOutOfTime)
        }
    }
}
