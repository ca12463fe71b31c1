//! Cost partitioning over a set of landmarks (spec §4.11): split each
//! operator's cost among the landmarks it can achieve so the resulting sum
//! stays admissible.

use crate::search::landmarks::landmark_graph::Landmark;
use crate::search::landmarks::simplex;
use crate::task::proxy::TaskView;

/// Uniform cost partitioning (spec §4.11 "Uniform"): a single-operator
/// landmark charges that operator's full cost; for landmarks shared by
/// several operators, each contributes `cost / num_landmarks_it_achieves`.
pub fn uniform(landmarks: &[Landmark], task: &TaskView) -> Vec<f64> {
    let num_operators = task.num_operators();
    let mut landmark_count = vec![0u32; num_operators];
    for lm in landmarks {
        for op in &lm.operators {
            landmark_count[op.index()] += 1;
        }
    }

    landmarks
        .iter()
        .map(|lm| {
            if lm.operators.len() == 1 {
                task.operator_cost(lm.operators[0]) as f64
            } else {
                lm.operators
                    .iter()
                    .map(|op| task.operator_cost(*op) as f64 / landmark_count[op.index()].max(1) as f64)
                    .sum()
            }
        })
        .collect()
}

/// Optimal cost partitioning (spec §4.11 "Optimal"): one LP variable per
/// landmark, one `≤` constraint per operator (`Σ cost(lm) ≤ cost(op)` over
/// the landmarks `op` achieves), maximising the landmark-cost sum. Solved
/// with the in-tree primal simplex (`DESIGN.md`: no external LP backend is
/// fabricated, per `SPEC_FULL.md` §C).
pub fn optimal(landmarks: &[Landmark], task: &TaskView) -> Vec<f64> {
    if landmarks.is_empty() {
        return Vec::new();
    }
    let num_operators = task.num_operators();
    // One row (constraint) per operator that appears in some landmark.
    let mut rows: Vec<Vec<f64>> = Vec::new();
    let mut rhs: Vec<f64> = Vec::new();
    for op_index in 0..num_operators {
        let row: Vec<f64> = landmarks
            .iter()
            .map(|lm| {
                if lm.operators.iter().any(|o| o.index() == op_index) {
                    1.0
                } else {
                    0.0
                }
            })
            .collect();
        if row.iter().any(|&c| c != 0.0) {
            rows.push(row);
            rhs.push(task.operator_cost(crate::task::OperatorId(op_index)) as f64);
        }
    }
    let objective: Vec<f64> = vec![1.0; landmarks.len()];
    simplex::maximize(&objective, &rows, &rhs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::landmarks::landmark_graph::LandmarkGraph;
    use crate::task::fixtures::ONE_STEP;
    use crate::task::Task;

    #[test]
    fn single_operator_landmark_is_charged_its_full_cost() {
        let task = Task::from_text(ONE_STEP).unwrap();
        let view = TaskView::root(&task);
        let graph = LandmarkGraph::discover(&view, &task.initial_state_values).unwrap();
        let costs = uniform(&graph.landmarks, &view);
        assert_eq!(costs, vec![3.0]);
    }

    #[test]
    fn optimal_partitioning_matches_uniform_on_disjoint_landmarks() {
        let task = Task::from_text(ONE_STEP).unwrap();
        let view = TaskView::root(&task);
        let graph = LandmarkGraph::discover(&view, &task.initial_state_values).unwrap();
        let costs = optimal(&graph.landmarks, &view);
        assert_eq!(costs, vec![3.0]);
    }
}
