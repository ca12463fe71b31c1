//! The `downward-validate` binary: replays a plan file against a grounded
//! SAS+ task and reports whether every step is applicable and the final
//! state satisfies the goal (spec §6's plan-output contract, checked from
//! the consumer side).

use std::path::PathBuf;
use std::process::ExitCode as ProcessExitCode;

use clap::Parser;
use downward_sas::axioms::AxiomEvaluator;
use downward_sas::error::{DownwardError, ExitCode};
use downward_sas::task::Task;

#[derive(Debug, Parser)]
#[command(name = "downward-validate", about = "Replay a plan against a grounded SAS+ task")]
struct Args {
    /// Path to the grounded SAS+ task file.
    task_file: PathBuf,
    /// Path to a plan file as written by `downward` (spec §6).
    plan_file: PathBuf,
}

fn main() -> ProcessExitCode {
    let args = Args::parse();
    match run(&args) {
        Ok(true) => ProcessExitCode::from(ExitCode::Success.code() as u8),
        Ok(false) => ProcessExitCode::from(ExitCode::SearchCriticalError.code() as u8),
        Err(err) => {
            eprintln!("{err}");
            ProcessExitCode::from(err.exit_code().code() as u8)
        }
    }
}

fn run(args: &Args) -> Result<bool, DownwardError> {
    let task = Task::from_path(&args.task_file)?;
    let axioms = AxiomEvaluator::new(&task);
    let plan_text = std::fs::read_to_string(&args.plan_file)?;

    let operator_names: Vec<String> = plan_text
        .lines()
        .filter_map(|line| {
            let line = line.trim();
            line.strip_prefix('(').and_then(|l| l.strip_suffix(')')).map(str::to_string)
        })
        .collect();

    let mut values = task.initial_state_values.clone();
    axioms.evaluate(&mut values);
    let mut total_cost = 0;

    for name in &operator_names {
        let Some(op) = task.operators().iter().find(|op| &*op.name == name.as_str()) else {
            println!("unknown operator in plan: {name}");
            return Ok(false);
        };
        if !op.is_applicable(&values) {
            println!("operator '{name}' is not applicable in the current state");
            return Ok(false);
        }
        task.apply_effects(&mut values, op);
        axioms.evaluate(&mut values);
        total_cost += op.cost;
    }

    if !task.is_goal(&values) {
        println!("plan does not reach the goal");
        return Ok(false);
    }

    println!("plan valid, cost = {total_cost}");
    Ok(true)
}
