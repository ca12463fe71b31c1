//! Plan output (spec §6 "Plan output"): one `(operator_name)` line per
//! step, a trailing cost comment, and the anytime-portfolio filename
//! convention.

use crate::task::{OperatorId, Task};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plan {
    steps: Vec<OperatorId>,
    cost: i32,
}

impl Plan {
    pub fn new(task: &Task, steps: Vec<OperatorId>) -> Self {
        let cost = steps.iter().map(|&id| task.operator_cost(id)).sum();
        Plan { steps, cost }
    }

    pub fn steps(&self) -> &[OperatorId] {
        &self.steps
    }

    pub fn cost(&self) -> i32 {
        self.cost
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Renders the plan exactly as spec §6 requires: one `(operator_name)`
    /// line per step followed by the `; cost = N (unit cost|general cost)`
    /// footer.
    pub fn render(&self, task: &Task) -> String {
        let mut text = String::new();
        for &id in &self.steps {
            text.push('(');
            text.push_str(&task.operator(id).name);
            text.push_str(")\n");
        }
        let cost_kind = if task.use_metric { "general cost" } else { "unit cost" };
        text.push_str(&format!("; cost = {} ({})\n", self.cost, cost_kind));
        text
    }

    /// The plan output path for the `n`th portfolio plan written during an
    /// anytime search (spec §6: "when part of an anytime portfolio, suffix
    /// `.<k>`"). `n == 0` is the default `sas_plan` with no suffix.
    pub fn output_path(base: &Path, n: u32) -> PathBuf {
        if n == 0 {
            base.to_path_buf()
        } else {
            let mut name = base.as_os_str().to_owned();
            name.push(format!(".{n}"));
            PathBuf::from(name)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::fixtures::ONE_STEP;

    #[test]
    fn renders_one_line_per_step_and_a_unit_cost_footer() {
        let task = Task::from_text(ONE_STEP).unwrap();
        let plan = Plan::new(&task, vec![OperatorId(0)]);
        assert_eq!(plan.cost(), 3);
        let text = plan.render(&task);
        assert_eq!(text, "(o1)\n; cost = 3 (general cost)\n");
    }

    #[test]
    fn empty_plan_has_zero_cost() {
        let task = Task::from_text(ONE_STEP).unwrap();
        let plan = Plan::new(&task, vec![]);
        assert!(plan.is_empty());
        assert_eq!(plan.cost(), 0);
    }

    #[test]
    fn portfolio_suffix_is_only_added_for_nonzero_index() {
        let base = PathBuf::from("sas_plan");
        assert_eq!(Plan::output_path(&base, 0), base);
        assert_eq!(Plan::output_path(&base, 2), PathBuf::from("sas_plan.2"));
    }
}
