//! Exact 0/1 knapsack by dynamic programming over an (n+1) x (capacity+1) table.

use crate::domain::problem::{
    CanonicalProblem, LinearSystem, ProblemParts, Sense, SparseMatrix, VarBound,
};
use crate::error::{KnapsackError, ValidationError};
use crate::models::Integrality;

/// A knapsack instance as loaded from disk.
#[derive(Debug, Clone, PartialEq)]
pub struct KnapsackInstance {
    pub name: String,
    pub values: Vec<f64>,
    pub weights: Vec<u64>,
    pub capacity: u64,
    /// Ground-truth 0/1 flags, only used to check solver output.
    pub reference_selection: Option<Vec<u8>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct KnapsackSolution {
    pub objective: f64,
    /// Indices of the chosen items, ascending.
    pub selected: Vec<usize>,
}

impl KnapsackInstance {
    pub fn solve(&self) -> Result<KnapsackSolution, KnapsackError> {
        let weights: Vec<f64> = self.weights.iter().map(|&w| w as f64).collect();
        solve_knapsack_01(&self.values, &weights, self.capacity as f64)
    }

    pub fn reference_indices(&self) -> Option<Vec<usize>> {
        self.reference_selection.as_ref().map(|flags| {
            flags
                .iter()
                .enumerate()
                .filter(|(_, &flag)| flag == 1)
                .map(|(i, _)| i)
                .collect()
        })
    }

    /// Same instance as a binary program: maximize values subject to one weight row.
    pub fn to_problem(&self) -> Result<CanonicalProblem, ValidationError> {
        let n = self.values.len();
        let weights: Vec<Vec<f64>> = vec![self.weights.iter().map(|&w| w as f64).collect()];
        let capacity_row = LinearSystem::new(
            SparseMatrix::from_dense(&weights, n)?,
            vec![self.capacity as f64],
        )?;
        CanonicalProblem::from_parts(ProblemParts {
            sense: Some(Sense::Maximize),
            c: self.values.clone(),
            inequality: Some(capacity_row),
            bounds: Some(vec![VarBound::new(Some(0.0), Some(1.0)); n]),
            integrality: Some(vec![Integrality::Binary; n]),
            var_names: Some((0..n).map(|i| format!("i{}", i)).collect()),
            ..ProblemParts::default()
        })
    }
}

/// Largest DP table, in cells, `solve_knapsack_01` will allocate (2 GiB of f64).
pub const MAX_TABLE_CELLS: usize = 1 << 28;

fn exact_integer(x: f64) -> bool {
    x.is_finite() && x.fract() == 0.0
}

/// Solve the 0/1 knapsack problem.
///
/// Weights and capacity must be non-negative integers; integral floats such
/// as `3.0` are accepted, `3.5` is not. All inputs are checked before the
/// table is allocated. Among several optimal selections the one returned is
/// the one the backward walk `cell(i, w) != cell(i - 1, w)` produces.
pub fn solve_knapsack_01(
    values: &[f64],
    weights: &[f64],
    capacity: f64,
) -> Result<KnapsackSolution, KnapsackError> {
    if values.len() != weights.len() {
        return Err(KnapsackError::LengthMismatch {
            values: values.len(),
            weights: weights.len(),
        });
    }
    if !exact_integer(capacity) || capacity < 0.0 {
        return Err(KnapsackError::InvalidCapacity(capacity));
    }
    if let Some(index) = weights.iter().position(|&w| !exact_integer(w) || w < 0.0) {
        return Err(KnapsackError::InvalidWeight {
            index,
            value: weights[index],
        });
    }

    let n = values.len();
    if n == 0 || capacity == 0.0 {
        return Ok(KnapsackSolution {
            objective: 0.0,
            selected: Vec::new(),
        });
    }

    let too_large = KnapsackError::TableTooLarge {
        items: n,
        capacity: capacity as u64,
    };
    if capacity >= usize::MAX as f64 {
        return Err(too_large);
    }
    let cap = capacity as usize;
    let width = cap + 1;
    let cells = match (n + 1).checked_mul(width) {
        Some(cells) if cells <= MAX_TABLE_CELLS => cells,
        _ => return Err(too_large),
    };

    // Weights above capacity can never be taken; clamping keeps them out of usize overflow.
    let w_ints: Vec<usize> = weights
        .iter()
        .map(|&w| if w > capacity { width } else { w as usize })
        .collect();

    // dp[i * width + w] = best value using the first i items within capacity w
    let mut dp: Vec<f64> = Vec::new();
    dp.try_reserve_exact(cells).map_err(|_| too_large)?;
    dp.resize(cells, 0.0);
    for i in 1..=n {
        let v_i = values[i - 1];
        let w_i = w_ints[i - 1];
        let (prev, cur) = dp.split_at_mut(i * width);
        let prev = &prev[(i - 1) * width..];
        let cur = &mut cur[..width];
        for w in 0..width {
            let mut best = prev[w];
            if w_i <= w {
                let cand = prev[w - w_i] + v_i;
                if cand > best {
                    best = cand;
                }
            }
            cur[w] = best;
        }
    }

    let best_value = dp[n * width + cap];

    let mut selected = Vec::new();
    let mut w = cap;
    for i in (1..=n).rev() {
        if dp[i * width + w] != dp[(i - 1) * width + w] {
            selected.push(i - 1);
            w -= w_ints[i - 1];
        }
    }
    selected.reverse();

    Ok(KnapsackSolution {
        objective: best_value,
        selected,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_solve_given_small_instance_should_pick_first_two_items() {
        let s = solve_knapsack_01(&[3.0, 4.0, 5.0, 6.0], &[2.0, 3.0, 4.0, 5.0], 5.0).unwrap();
        assert_eq!(s.objective, 7.0);
        assert_eq!(s.selected, vec![0, 1]);
    }

    #[test]
    fn test_solve_given_zero_capacity_or_no_items_should_return_empty() {
        let s = solve_knapsack_01(&[1.0, 2.0], &[1.0, 1.0], 0.0).unwrap();
        assert_eq!(s.objective, 0.0);
        assert!(s.selected.is_empty());

        let s = solve_knapsack_01(&[], &[], 10.0).unwrap();
        assert_eq!(s.objective, 0.0);
        assert!(s.selected.is_empty());
    }

    #[test]
    fn test_solve_given_all_items_too_heavy_should_return_empty() {
        let s = solve_knapsack_01(&[10.0, 20.0], &[6.0, 7.0], 5.0).unwrap();
        assert_eq!(s.objective, 0.0);
        assert!(s.selected.is_empty());
    }

    #[test]
    fn test_solve_given_bad_input_should_return_error() {
        assert_eq!(
            solve_knapsack_01(&[1.0], &[1.0, 2.0], 3.0),
            Err(KnapsackError::LengthMismatch { values: 1, weights: 2 })
        );
        assert_eq!(
            solve_knapsack_01(&[1.0, 2.0], &[1.0, -2.0], 3.0),
            Err(KnapsackError::InvalidWeight { index: 1, value: -2.0 })
        );
        assert_eq!(
            solve_knapsack_01(&[1.0], &[1.0], 3.5),
            Err(KnapsackError::InvalidCapacity(3.5))
        );
        assert_eq!(
            solve_knapsack_01(&[1.0], &[1.0], -1.0),
            Err(KnapsackError::InvalidCapacity(-1.0))
        );
        assert!(solve_knapsack_01(&[1.0], &[0.5], 3.0).is_err());
    }

    #[test]
    fn test_solve_given_huge_capacity_should_report_table_too_large() {
        assert_eq!(
            solve_knapsack_01(&[1.0], &[1.0], 1e13),
            Err(KnapsackError::TableTooLarge {
                items: 1,
                capacity: 10_000_000_000_000,
            })
        );
        let just_over = (MAX_TABLE_CELLS / 2) as f64;
        assert!(matches!(
            solve_knapsack_01(&[1.0], &[1.0], just_over),
            Err(KnapsackError::TableTooLarge { .. })
        ));
    }

    #[test]
    fn test_solve_given_integral_float_capacity_should_accept() {
        let s = solve_knapsack_01(&[5.0, 4.0], &[2.0, 2.0], 3.0).unwrap();
        assert_eq!(s.objective, 5.0);
        assert_eq!(s.selected, vec![0]);
    }

    #[test]
    fn test_solve_given_tie_should_follow_backward_walk() {
        // Both {0} and {1} reach 5; item 1 never strictly improves cell(2, 2),
        // so the walk skips it and keeps item 0.
        let s = solve_knapsack_01(&[5.0, 5.0], &[2.0, 2.0], 2.0).unwrap();
        assert_eq!(s.objective, 5.0);
        assert_eq!(s.selected, vec![0]);
    }

    #[test]
    fn test_reference_indices_should_list_flagged_items() {
        let inst = KnapsackInstance {
            name: "t".into(),
            values: vec![1.0, 2.0, 3.0],
            weights: vec![1, 1, 1],
            capacity: 2,
            reference_selection: Some(vec![1, 0, 1]),
        };
        assert_eq!(inst.reference_indices(), Some(vec![0, 2]));
    }

    #[test]
    fn test_to_problem_should_build_binary_maximization() {
        let inst = KnapsackInstance {
            name: "t".into(),
            values: vec![1.0, 2.0],
            weights: vec![3, 4],
            capacity: 5,
            reference_selection: None,
        };
        let p = inst.to_problem().unwrap();
        assert_eq!(p.sense(), Sense::Maximize);
        assert_eq!(p.integrality(), &[Integrality::Binary; 2]);
        assert_eq!(p.var_names(), &["i0", "i1"]);
        let row = p.inequality().unwrap();
        assert_eq!(row.b(), &[5.0]);
        assert_eq!(row.a().row_entries(), vec![vec![(0, 3.0), (1, 4.0)]]);
    }

    fn brute_force(values: &[f64], weights: &[f64], capacity: f64) -> f64 {
        let n = values.len();
        let mut best = 0.0_f64;
        for mask in 0u32..(1u32 << n) {
            let (mut v, mut w) = (0.0, 0.0);
            for i in 0..n {
                if mask >> i & 1 == 1 {
                    v += values[i];
                    w += weights[i];
                }
            }
            if w <= capacity && v > best {
                best = v;
            }
        }
        best
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn prop_dp_matches_brute_force(
            items in prop::collection::vec((0u32..50, 0u32..30), 0..=12),
            capacity in 0u32..80,
        ) {
            let values: Vec<f64> = items.iter().map(|&(v, _)| v as f64).collect();
            let weights: Vec<f64> = items.iter().map(|&(_, w)| w as f64).collect();
            let s = solve_knapsack_01(&values, &weights, capacity as f64).unwrap();

            prop_assert_eq!(s.objective, brute_force(&values, &weights, capacity as f64));
            prop_assert!(s.selected.windows(2).all(|p| p[0] < p[1]));
            let total_weight: f64 = s.selected.iter().map(|&i| weights[i]).sum();
            prop_assert!(total_weight <= capacity as f64);
            let total_value: f64 = s.selected.iter().map(|&i| values[i]).sum();
            prop_assert_eq!(total_value, s.objective);
        }
    }
}
