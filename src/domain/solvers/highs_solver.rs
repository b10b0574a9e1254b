use std::ops::Bound;

use crate::config::SolveOptions;
use crate::domain::problem::Sense;
use crate::domain::solver::{BackendClass, BackendModel, BackendOutcome, Domain, Solver};
use crate::error::BackendError;
use crate::models::{Diagnostics, Status};

use ::highs::{ColProblem, HighsModelStatus, Sense as HighsSense};

/// HiGHS solver implementation; mixed integer and continuous
pub struct HighsSolver;

impl HighsSolver {
    pub fn new() -> Self {
        HighsSolver
    }

    /// Convert HiGHS status to our API status
    fn convert_status(model_status: HighsModelStatus) -> Status {
        match model_status {
            HighsModelStatus::Optimal | HighsModelStatus::ModelEmpty => Status::Optimal,
            HighsModelStatus::Infeasible => Status::Infeasible,
            HighsModelStatus::UnboundedOrInfeasible => Status::Unbounded,
            HighsModelStatus::Unbounded => Status::Unbounded,
            _ => Status::NotSolved,
        }
    }
}

impl Default for HighsSolver {
    fn default() -> Self {
        Self::new()
    }
}

fn range(lower: f64, upper: f64) -> (Bound<f64>, Bound<f64>) {
    let lo = if lower.is_finite() {
        Bound::Included(lower)
    } else {
        Bound::Unbounded
    };
    let hi = if upper.is_finite() {
        Bound::Included(upper)
    } else {
        Bound::Unbounded
    };
    (lo, hi)
}

impl Solver for HighsSolver {
    fn solve(
        &self,
        model: &BackendModel,
        options: &SolveOptions,
    ) -> Result<BackendOutcome, BackendError> {
        let sense = match model.sense {
            Sense::Maximize => HighsSense::Maximise,
            Sense::Minimize => HighsSense::Minimise,
        };

        let mut problem = ColProblem::new();

        // First, add all constraint rows: equalities, then <= rows
        let mut rows = Vec::new();
        for row in &model.equalities {
            rows.push(problem.add_row(row.rhs..=row.rhs));
        }
        for row in &model.inequalities {
            rows.push(problem.add_row(..=row.rhs));
        }

        // For each column, collect its row entries
        let mut col_data: Vec<Vec<(usize, f64)>> = vec![Vec::new(); model.decisions.len()];
        for (row_idx, row) in model
            .equalities
            .iter()
            .chain(model.inequalities.iter())
            .enumerate()
        {
            for &(col, val) in &row.terms {
                col_data[col].push((row_idx, val));
            }
        }

        for (decision, entries) in model.decisions.iter().zip(&col_data) {
            let row_factors: Vec<_> = entries
                .iter()
                .map(|&(row_idx, val)| (rows[row_idx], val))
                .collect();
            let bounds = range(decision.lower, decision.upper);
            match decision.domain {
                Domain::Continuous => {
                    problem.add_column(decision.objective, bounds, &row_factors)
                }
                Domain::Integer | Domain::Binary => {
                    problem.add_integer_column(decision.objective, bounds, &row_factors)
                }
            }
        }

        let mut highs_model = problem.optimise(sense);
        highs_model.set_option("output_flag", false);
        highs_model.set_option("threads", options.workers as i32);
        if let Some(limit) = options.time_limit {
            highs_model.set_option("time_limit", limit.as_secs_f64());
        }

        let solved = highs_model.try_solve().map_err(|status| BackendError {
            solver: self.name().to_string(),
            details: format!("solve failed: {:?}", status),
        })?;

        let status = Self::convert_status(solved.status());
        if status != Status::Optimal {
            return Ok(BackendOutcome {
                status,
                objective: None,
                values: Vec::new(),
                diagnostics: Diagnostics::default(),
            });
        }

        let values: Vec<f64> = solved.get_solution().columns().to_vec();

        Ok(BackendOutcome {
            status,
            objective: Some(solved.objective_value()),
            values,
            diagnostics: Diagnostics::default(),
        })
    }

    fn accepts(&self, _class: BackendClass) -> bool {
        true
    }

    fn name(&self) -> &str {
        "HiGHS"
    }
}
