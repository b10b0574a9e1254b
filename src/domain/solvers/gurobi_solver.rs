use crate::config::SolveOptions;
use crate::domain::problem::Sense;
use crate::domain::solver::{BackendClass, BackendModel, BackendOutcome, Domain, Solver};
use crate::error::BackendError;
use crate::models::{Diagnostics, Status};

use grb::prelude::*;

/// Gurobi solver implementation; mixed integer and continuous
pub struct GurobiSolver;

impl GurobiSolver {
    pub fn new() -> Self {
        GurobiSolver
    }

    /// Convert Gurobi status to our API status
    fn convert_status(status: grb::Status) -> Status {
        match status {
            grb::Status::Optimal => Status::Optimal,
            grb::Status::Infeasible => Status::Infeasible,
            grb::Status::InfOrUnbd | grb::Status::Unbounded => Status::Unbounded,
            _ => Status::NotSolved,
        }
    }

    fn error(&self, what: &str, e: grb::Error) -> BackendError {
        BackendError {
            solver: self.name().to_string(),
            details: format!("{}: {}", what, e),
        }
    }

    fn bound(value: f64) -> f64 {
        if value.is_finite() {
            value
        } else {
            value.signum() * grb::INFINITY
        }
    }

    /// Copy whatever run statistics Gurobi exposes.
    fn diagnostics(model: &Model) -> Diagnostics {
        Diagnostics {
            wall_time_ms: model.get_attr(attr::Runtime).ok().map(|secs| secs * 1000.0),
            nodes: model
                .get_attr(attr::NodeCount)
                .ok()
                .map(|count| count.max(0.0) as u64),
            best_bound: model.get_attr(attr::ObjBound).ok(),
            ..Diagnostics::default()
        }
    }
}

impl Default for GurobiSolver {
    fn default() -> Self {
        Self::new()
    }
}

impl Solver for GurobiSolver {
    fn solve(
        &self,
        model: &BackendModel,
        options: &SolveOptions,
    ) -> std::result::Result<BackendOutcome, BackendError> {
        let sense = match model.sense {
            Sense::Maximize => ModelSense::Maximize,
            Sense::Minimize => ModelSense::Minimize,
        };

        let mut env = Env::new("").map_err(|e| self.error("failed to create environment", e))?;

        // Console output off; set to 1 when debugging
        env.set(param::OutputFlag, 0)
            .map_err(|e| self.error("failed to set output flag", e))?;
        env.set(param::Threads, options.workers as i32)
            .map_err(|e| self.error("failed to set thread count", e))?;
        if let Some(limit) = options.time_limit {
            env.set(param::TimeLimit, limit.as_secs_f64())
                .map_err(|e| self.error("failed to set time limit", e))?;
        }

        let mut gurobi = Model::with_env("optimization", &env)
            .map_err(|e| self.error("failed to create model", e))?;

        let mut vars: Vec<Var> = Vec::with_capacity(model.decisions.len());
        for decision in &model.decisions {
            let lower = Self::bound(decision.lower);
            let upper = Self::bound(decision.upper);
            let var = match decision.domain {
                Domain::Binary if lower == 0.0 && upper == 1.0 => {
                    add_binvar!(gurobi, name: &decision.name)
                }
                Domain::Binary | Domain::Integer => {
                    add_intvar!(gurobi, name: &decision.name, bounds: lower..upper)
                }
                Domain::Continuous => {
                    add_ctsvar!(gurobi, name: &decision.name, bounds: lower..upper)
                }
            }
            .map_err(|e| self.error("failed to add variable", e))?;
            vars.push(var);
        }

        gurobi
            .update()
            .map_err(|e| self.error("failed to update model after adding variables", e))?;

        let linear = |terms: &[(usize, f64)]| {
            terms.iter().fold(Expr::Constant(0.0), |acc, &(col_idx, coeff)| {
                acc + coeff * vars[col_idx]
            })
        };

        for (row_idx, row) in model.equalities.iter().enumerate() {
            let expr = linear(&row.terms);
            let rhs = row.rhs;
            gurobi
                .add_constr(&format!("eq{}", row_idx), c!(expr == rhs))
                .map_err(|e| self.error("failed to add constraint", e))?;
        }
        for (row_idx, row) in model.inequalities.iter().enumerate() {
            let expr = linear(&row.terms);
            let rhs = row.rhs;
            gurobi
                .add_constr(&format!("le{}", row_idx), c!(expr <= rhs))
                .map_err(|e| self.error("failed to add constraint", e))?;
        }

        let obj_expr = model.decisions.iter().zip(&vars).fold(
            Expr::Constant(0.0),
            |acc, (decision, &var)| {
                if decision.objective != 0.0 {
                    acc + decision.objective * var
                } else {
                    acc
                }
            },
        );
        gurobi
            .set_objective(obj_expr, sense)
            .map_err(|e| self.error("failed to set objective", e))?;

        gurobi
            .optimize()
            .map_err(|e| self.error("failed to optimize", e))?;

        let status = gurobi
            .status()
            .map(Self::convert_status)
            .map_err(|e| self.error("failed to get model status", e))?;
        let diagnostics = Self::diagnostics(&gurobi);

        if status != Status::Optimal {
            return Ok(BackendOutcome {
                status,
                objective: None,
                values: Vec::new(),
                diagnostics,
            });
        }

        let objective = gurobi
            .get_attr(attr::ObjVal)
            .map_err(|e| self.error("failed to read objective", e))?;
        let values = vars
            .iter()
            .map(|var| gurobi.get_obj_attr(attr::X, var))
            .collect::<grb::Result<Vec<f64>>>()
            .map_err(|e| self.error("failed to read solution", e))?;

        Ok(BackendOutcome {
            status,
            objective: Some(objective),
            values,
            diagnostics,
        })
    }

    fn is_available(&self) -> std::result::Result<(), String> {
        Env::new("")
            .map(|_| ())
            .map_err(|e| format!("Gurobi environment unavailable: {}", e))
    }

    fn accepts(&self, _class: BackendClass) -> bool {
        true
    }

    fn name(&self) -> &str {
        "Gurobi"
    }
}
