use crate::config::SolveOptions;
use crate::convert::{to_glpk_objective, to_glpk_polyhedron};
use crate::domain::problem::Sense;
use crate::domain::solver::{BackendClass, BackendModel, BackendOutcome, Solver};
use crate::error::BackendError;
use crate::models::{Diagnostics, Status};

use glpk_rust::{solve_ilps as glpk_solve_ilps, Solution};

const NO_TERMINAL_OUTPUT: bool = false;

/// GLPK solver implementation; integer-only
pub struct GlpkSolver;

impl GlpkSolver {
    pub fn new() -> Self {
        GlpkSolver
    }
}

impl Default for GlpkSolver {
    fn default() -> Self {
        Self::new()
    }
}

impl Solver for GlpkSolver {
    fn solve(
        &self,
        model: &BackendModel,
        options: &SolveOptions,
    ) -> Result<BackendOutcome, BackendError> {
        if options.time_limit.is_some() {
            log::debug!("GLPK binding takes no time limit; running to completion");
        }

        let glpk_polyhedron = to_glpk_polyhedron(model);
        let objective = to_glpk_objective(model);
        let maximize = model.sense == Sense::Maximize;

        // Solver expects &mut
        let mut mut_polyhedron = glpk_polyhedron;

        let mut lib_solutions: Vec<Solution> = glpk_solve_ilps(
            &mut mut_polyhedron,
            vec![objective],
            maximize,
            NO_TERMINAL_OUTPUT,
        );

        let solution = lib_solutions.pop().ok_or_else(|| BackendError {
            solver: self.name().to_string(),
            details: "no solution returned for the objective".to_string(),
        })?;

        if let Some(error) = &solution.error {
            log::warn!("GLPK reported: {}", error);
        }

        let status: Status = solution.status.into();
        if status != Status::Optimal {
            return Ok(BackendOutcome {
                status,
                objective: None,
                values: Vec::new(),
                diagnostics: solution
                    .error
                    .map(Diagnostics::with_message)
                    .unwrap_or_default(),
            });
        }

        let values: Vec<f64> = model
            .decisions
            .iter()
            .map(|d| {
                solution
                    .solution
                    .get(d.name.as_str())
                    .copied()
                    .unwrap_or(0) as f64
            })
            .collect();

        Ok(BackendOutcome {
            status,
            objective: Some(solution.objective as f64),
            values,
            diagnostics: Diagnostics::default(),
        })
    }

    fn accepts(&self, class: BackendClass) -> bool {
        class == BackendClass::IntegerOnly
    }

    fn name(&self) -> &str {
        "GLPK"
    }
}
