use crate::domain::solver::{BackendClass, Solver};
use crate::domain::solvers::GlpkSolver;
use crate::error::BackendUnavailable;

#[cfg(feature = "highs-solver")]
use crate::domain::solvers::HighsSolver;

#[cfg(feature = "gurobi-solver")]
use crate::domain::solvers::GurobiSolver;

/// Available solver backends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolverType {
    Glpk,
    #[cfg(feature = "highs-solver")]
    Highs,
    #[cfg(feature = "gurobi-solver")]
    Gurobi,
}

impl SolverType {
    /// Parse solver type from string (case-insensitive)
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "glpk" => Some(SolverType::Glpk),
            #[cfg(feature = "highs-solver")]
            "highs" => Some(SolverType::Highs),
            #[cfg(feature = "gurobi-solver")]
            "gurobi" => Some(SolverType::Gurobi),
            _ => None,
        }
    }
}

/// Create a solver instance based on the specified type
pub fn create_solver(solver_type: SolverType) -> Box<dyn Solver> {
    match solver_type {
        SolverType::Glpk => Box::new(GlpkSolver::new()),
        #[cfg(feature = "highs-solver")]
        SolverType::Highs => Box::new(HighsSolver::new()),
        #[cfg(feature = "gurobi-solver")]
        SolverType::Gurobi => Box::new(GurobiSolver::new()),
    }
}

/// Compiled-in backends that natively serve `class`, in preference order.
fn native_candidates(class: BackendClass) -> Vec<SolverType> {
    match class {
        BackendClass::IntegerOnly => vec![SolverType::Glpk],
        BackendClass::ContinuousCapable => {
            #[allow(unused_mut)]
            let mut list = Vec::new();
            #[cfg(feature = "highs-solver")]
            list.push(SolverType::Highs);
            #[cfg(feature = "gurobi-solver")]
            list.push(SolverType::Gurobi);
            list
        }
    }
}

/// Every backend that may take a problem of `class`, in the order they are tried.
///
/// Continuous-capable engines also take pure integer models, so they follow
/// the integer-only ones. A `preferred` type goes first when it fits.
pub fn candidates(class: BackendClass, preferred: Option<SolverType>) -> Vec<SolverType> {
    let mut list = native_candidates(class);
    if class == BackendClass::IntegerOnly {
        list.extend(native_candidates(BackendClass::ContinuousCapable));
    }
    if let Some(p) = preferred {
        if let Some(pos) = list.iter().position(|&t| t == p) {
            list.remove(pos);
            list.insert(0, p);
        }
    }
    list
}

/// Find a backend for `class` that can run right now.
pub fn first_available(
    class: BackendClass,
    preferred: Option<SolverType>,
) -> Result<Box<dyn Solver>, BackendUnavailable> {
    let mut reasons: Vec<String> = Vec::new();
    for solver_type in candidates(class, preferred) {
        let solver = create_solver(solver_type);
        if !solver.accepts(class) {
            continue;
        }
        match solver.is_available() {
            Ok(()) => return Ok(solver),
            Err(reason) => {
                log::warn!("{} unavailable: {}", solver.name(), reason);
                reasons.push(format!("{}: {}", solver.name(), reason));
            }
        }
    }

    let reason = if reasons.is_empty() {
        format!(
            "{} solver not compiled in (enable the highs-solver or gurobi-solver feature)",
            class
        )
    } else {
        reasons.join("; ")
    };
    Err(BackendUnavailable {
        class: class.to_string(),
        reason,
    })
}
