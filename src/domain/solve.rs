use std::collections::BTreeMap;

use crate::config::{SolveOptions, Tolerances};
use crate::convert::translate;
use crate::domain::problem::{normalize, CanonicalProblem, LinearSystem};
use crate::domain::solver::{BackendClass, BackendOutcome};
use crate::domain::solver_factory::first_available;
use crate::error::ValidationError;
use crate::models::{Diagnostics, Integrality, MilpResult, RawProblem, Status};

/// Decide which class of backend the problem needs.
///
/// Anything continuous or fractional goes to a continuous-capable engine;
/// the objective offset is added after solving and does not count.
pub fn select_backend(problem: &CanonicalProblem, tol: &Tolerances) -> BackendClass {
    let int_like = |x: &f64| tol.is_int_like(*x);
    let system_int_like = |system: Option<&LinearSystem>| {
        system.map_or(true, |s| {
            s.a().values().iter().all(int_like) && s.b().iter().all(int_like)
        })
    };

    let any_continuous = problem
        .integrality()
        .iter()
        .any(|&kind| kind == Integrality::Continuous);
    let bounds_int_like = problem
        .bounds()
        .iter()
        .flat_map(|bound| [bound.lower, bound.upper])
        .flatten()
        .all(|x| int_like(&x));

    if any_continuous
        || !problem.c().iter().all(int_like)
        || !bounds_int_like
        || !system_int_like(problem.equality())
        || !system_int_like(problem.inequality())
    {
        BackendClass::ContinuousCapable
    } else {
        BackendClass::IntegerOnly
    }
}

/// Route, translate and solve a canonical problem.
///
/// Validation failures are returned as `Err` before any backend is built.
/// A missing or failing backend yields a `NotSolved` result instead.
pub fn solve_milp(
    problem: &CanonicalProblem,
    options: &SolveOptions,
) -> Result<MilpResult, ValidationError> {
    let tol = &options.tolerances;
    let class = select_backend(problem, tol);
    let model = translate(problem, class, tol)?;

    let solver = match first_available(class, options.preferred_solver) {
        Ok(solver) => solver,
        Err(unavailable) => {
            log::warn!("{}", unavailable);
            return Ok(MilpResult::not_solved(Diagnostics::with_message(
                unavailable.to_string(),
            )));
        }
    };
    log::info!(
        "Solving {} variables with {} ({} backend)",
        problem.n(),
        solver.name(),
        class
    );

    let outcome = match solver.solve(&model, options) {
        Ok(outcome) => outcome,
        Err(e) => {
            log::warn!("Backend failed: {}", e);
            let mut result = MilpResult::not_solved(Diagnostics::with_message(e.to_string()));
            result.backend = Some(solver.name().to_string());
            return Ok(result);
        }
    };

    let mut result = package(problem, outcome);
    result.backend = Some(solver.name().to_string());
    log::info!("{} finished with status {:?}", solver.name(), result.status);
    Ok(result)
}

/// Normalize a raw mapping and solve it.
pub fn solve_raw(raw: RawProblem, options: &SolveOptions) -> crate::error::Result<MilpResult> {
    let problem = normalize(raw)?;
    Ok(solve_milp(&problem, options)?)
}

fn package(problem: &CanonicalProblem, outcome: BackendOutcome) -> MilpResult {
    let BackendOutcome {
        status,
        objective,
        values,
        diagnostics,
    } = outcome;

    if status != Status::Optimal {
        return MilpResult {
            status,
            objective: None,
            assignment: BTreeMap::new(),
            diagnostics,
            backend: None,
        };
    }

    let assignment: BTreeMap<String, f64> = problem
        .var_names()
        .iter()
        .cloned()
        .zip(values)
        .collect();

    MilpResult {
        status,
        objective: objective.map(|value| value + problem.obj_offset()),
        assignment,
        diagnostics,
        backend: None,
    }
}
