//! A small in-tree primal simplex solver (`SPEC_FULL.md` §C Open Question
//! decision: no external LP backend is fabricated). Solves exactly the
//! shape optimal cost partitioning always produces: maximise `c^T x` subject
//! to `A x <= b`, `x >= 0`, `b >= 0` — so the slack basis is feasible at
//! the start and no Phase 1 is needed.

const EPSILON: f64 = 1e-9;

/// Returns the optimal `x` (length `c.len()`). Assumes `b[i] >= 0` for all
/// `i`, which always holds here since `b` is a vector of operator costs.
pub fn maximize(c: &[f64], a: &[Vec<f64>], b: &[f64]) -> Vec<f64> {
    let n = c.len();
    let m = a.len();
    if m == 0 {
        return vec![0.0; n];
    }
    debug_assert!(b.iter().all(|&v| v >= -EPSILON));

    // tableau[i][0..n] = A, [n..n+m] = slack identity, [n+m] = rhs.
    let width = n + m + 1;
    let mut tableau = vec![vec![0.0; width]; m + 1];
    for (i, row) in a.iter().enumerate() {
        tableau[i][..n].copy_from_slice(row);
        tableau[i][n + i] = 1.0;
        tableau[i][n + m] = b[i].max(0.0);
    }
    for j in 0..n {
        tableau[m][j] = -c[j];
    }
    let mut basis: Vec<usize> = (0..m).map(|i| n + i).collect();

    loop {
        let Some(pivot_col) = (0..n + m)
            .filter(|&j| tableau[m][j] < -EPSILON)
            .min_by(|&a, &b| tableau[m][a].partial_cmp(&tableau[m][b]).unwrap())
        else {
            break;
        };

        let pivot_row = (0..m)
            .filter(|&i| tableau[i][pivot_col] > EPSILON)
            .min_by(|&i, &j| {
                let ratio_i = tableau[i][n + m] / tableau[i][pivot_col];
                let ratio_j = tableau[j][n + m] / tableau[j][pivot_col];
                ratio_i.partial_cmp(&ratio_j).unwrap()
            });

        let Some(pivot_row) = pivot_row else {
            // Unbounded: cannot happen with cost-bounded constraints, but
            // stop gracefully rather than loop forever.
            break;
        };

        let pivot_value = tableau[pivot_row][pivot_col];
        for value in tableau[pivot_row].iter_mut() {
            *value /= pivot_value;
        }
        for row in 0..=m {
            if row == pivot_row {
                continue;
            }
            let factor = tableau[row][pivot_col];
            if factor.abs() > EPSILON {
                let pivot_row_values = tableau[pivot_row].clone();
                for (value, pivot_value) in tableau[row].iter_mut().zip(pivot_row_values.iter()) {
                    *value -= factor * pivot_value;
                }
            }
        }
        basis[pivot_row] = pivot_col;
    }

    let mut x = vec![0.0; n];
    for (row, &col) in basis.iter().enumerate() {
        if col < n {
            x[col] = tableau[row][n + m];
        }
    }
    x
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maximizes_a_single_variable_bounded_by_one_constraint() {
        // max x0 s.t. x0 <= 5
        let x = maximize(&[1.0], &[vec![1.0]], &[5.0]);
        assert!((x[0] - 5.0).abs() < 1e-6);
    }

    #[test]
    fn splits_a_shared_constraint_between_two_variables() {
        // max x0 + x1 s.t. x0 + x1 <= 3
        let x = maximize(&[1.0, 1.0], &[vec![1.0, 1.0]], &[3.0]);
        assert!((x[0] + x[1] - 3.0).abs() < 1e-6);
    }

    #[test]
    fn two_independent_constraints_saturate_independently() {
        // max x0 + x1 s.t. x0 <= 2, x1 <= 4
        let x = maximize(&[1.0, 1.0], &[vec![1.0, 0.0], vec![0.0, 1.0]], &[2.0, 4.0]);
        assert!((x[0] - 2.0).abs() < 1e-6);
        assert!((x[1] - 4.0).abs() < 1e-6);
    }
}
