//! Read-only views over a grounded [`Task`] (spec §4.1 component "Task
//! Proxy"). Cost adaptation and goal modification are lazy decorators
//! chained over the root task, matching the Design Notes' guidance to model
//! this as a sum type with an explicit parent pointer rather than dynamic
//! inheritance.

use crate::task::{FactPair, Operator, OperatorId, Task};

/// A lazy, read-only transformation chain rooted at a [`Task`].
///
/// Every variant except [`TaskView::Root`] carries a `parent` so that
/// `operator`/`is_applicable`/structural queries always fall through to the
/// root task, while `operator_cost`/`goal` can be overridden at any point in
/// the chain. This mirrors the "cost-adapted task" / "modified goals task"
/// wrappers in the original `tasks/` directory, minus the virtual-dispatch
/// machinery: the chain is a concrete, finite sum type.
#[derive(Debug, Clone)]
pub enum TaskView<'a> {
    Root(&'a Task),
    CostAdapted {
        parent: Box<TaskView<'a>>,
        costs: Vec<i32>,
    },
    GoalModified {
        parent: Box<TaskView<'a>>,
        goal: Vec<FactPair>,
    },
    /// Collapses groups of values of a single variable into one abstract
    /// value, the "domain abstraction" wrapper spec §4.1 names. `mapping[v]`
    /// is empty for variables left untouched.
    DomainAbstracted {
        parent: Box<TaskView<'a>>,
        mapping: Vec<Vec<i32>>,
    },
}

impl<'a> TaskView<'a> {
    pub fn root(task: &'a Task) -> Self {
        TaskView::Root(task)
    }

    pub fn with_adapted_costs(self, costs: Vec<i32>) -> Self {
        debug_assert_eq!(costs.len(), self.root_task().num_operators());
        TaskView::CostAdapted {
            parent: Box::new(self),
            costs,
        }
    }

    pub fn with_goal(self, goal: Vec<FactPair>) -> Self {
        TaskView::GoalModified {
            parent: Box::new(self),
            goal,
        }
    }

    pub fn with_domain_abstraction(self, mapping: Vec<Vec<i32>>) -> Self {
        TaskView::DomainAbstracted {
            parent: Box::new(self),
            mapping,
        }
    }

    pub fn root_task(&self) -> &'a Task {
        match self {
            TaskView::Root(task) => task,
            TaskView::CostAdapted { parent, .. }
            | TaskView::GoalModified { parent, .. }
            | TaskView::DomainAbstracted { parent, .. } => parent.root_task(),
        }
    }

    pub fn operator(&self, id: OperatorId) -> &'a Operator {
        self.root_task().operator(id)
    }

    pub fn num_operators(&self) -> usize {
        self.root_task().num_operators()
    }

    /// The cost this view assigns to an operator, threading through every
    /// [`TaskView::CostAdapted`] layer in the chain (innermost wins, as a
    /// decorator chain would dispatch).
    pub fn operator_cost(&self, id: OperatorId) -> i32 {
        match self {
            TaskView::Root(task) => task.operator_cost(id),
            TaskView::CostAdapted { costs, .. } => costs[id.index()],
            TaskView::GoalModified { parent, .. } => parent.operator_cost(id),
            TaskView::DomainAbstracted { parent, .. } => parent.operator_cost(id),
        }
    }

    /// The goal this view reports, threading through [`TaskView::GoalModified`]
    /// layers.
    pub fn goal(&self) -> &[FactPair] {
        match self {
            TaskView::Root(task) => &task.goal,
            TaskView::GoalModified { goal, .. } => goal,
            TaskView::CostAdapted { parent, .. } => parent.goal(),
            TaskView::DomainAbstracted { parent, .. } => parent.goal(),
        }
    }

    pub fn is_goal(&self, values: &[i32]) -> bool {
        self.goal()
            .iter()
            .all(|fact| self.abstract_value(fact.var, values[fact.var]) == fact.value)
    }

    fn abstract_value(&self, var: usize, value: i32) -> i32 {
        match self {
            TaskView::DomainAbstracted { mapping, parent, .. } => {
                let value = parent.abstract_value(var, value);
                match mapping.get(var).and_then(|m| m.get(value as usize)) {
                    Some(&mapped) => mapped,
                    None => value,
                }
            }
            TaskView::CostAdapted { parent, .. } | TaskView::GoalModified { parent, .. } => {
                parent.abstract_value(var, value)
            }
            TaskView::Root(_) => value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::fixtures::ONE_STEP;
    use crate::task::Task;

    #[test]
    fn cost_adaptation_overrides_root_cost() {
        let task = Task::from_text(ONE_STEP).unwrap();
        let view = TaskView::root(&task).with_adapted_costs(vec![1]);
        assert_eq!(view.operator_cost(OperatorId(0)), 1);
        assert_eq!(task.operator_cost(OperatorId(0)), 3);
    }

    #[test]
    fn goal_modification_overrides_root_goal() {
        let task = Task::from_text(ONE_STEP).unwrap();
        let view = TaskView::root(&task).with_goal(vec![FactPair::new(0, 0)]);
        assert!(view.is_goal(&task.initial_state_values));
        assert!(!task.is_goal(&task.initial_state_values));
    }
}
