use std::collections::HashMap;

use crate::config::Tolerances;
use crate::domain::problem::{CanonicalProblem, LinearSystem};
use crate::domain::solver::{BackendClass, BackendModel, Decision, Domain, Row};
use crate::error::ValidationError;
use crate::models::{Integrality, Status};

use glpk_rust::{
    Bound, IntegerSparseMatrix as GlpkMatrix, SparseLEIntegerPolyhedron as GlpkPoly,
    Status as GlpkStatus, Variable as GlpkVar,
};

/// Upper bound given to integer variables that have none.
pub const DEFAULT_INTEGER_UPPER: f64 = 1_000_000_000.0;

/// Round `x` to an integer the integer-only backend can hold, or fail.
pub fn as_int(x: f64, what: &str, tol: &Tolerances) -> Result<f64, ValidationError> {
    if !tol.is_int_like(x) {
        return Err(ValidationError::new(format!(
            "{} must be integer-like for the integer-only backend, got {}",
            what, x
        )));
    }
    let r = x.round();
    // symmetric so a negated row still fits
    if r.abs() > i32::MAX as f64 {
        return Err(ValidationError::new(format!(
            "{} = {} exceeds the integer-only backend's 32-bit range",
            what, r
        )));
    }
    Ok(r)
}

/// Translate a canonical problem into backend primitives for the given class.
pub fn translate(
    problem: &CanonicalProblem,
    class: BackendClass,
    tol: &Tolerances,
) -> Result<BackendModel, ValidationError> {
    let cast = |x: f64, what: &dyn Fn() -> String| -> Result<f64, ValidationError> {
        match class {
            BackendClass::IntegerOnly => as_int(x, &what(), tol),
            BackendClass::ContinuousCapable => Ok(x),
        }
    };

    let mut decisions = Vec::with_capacity(problem.n());
    for (i, name) in problem.var_names().iter().enumerate() {
        let bound = problem.bounds()[i];
        let objective = cast(problem.c()[i], &|| format!("c[{}]", i))?;
        let decision = match (class, problem.integrality()[i]) {
            (BackendClass::IntegerOnly, Integrality::Binary) => Decision {
                name: name.clone(),
                domain: Domain::Binary,
                lower: 0.0,
                upper: 1.0,
                objective,
            },
            (BackendClass::IntegerOnly, Integrality::Integer) => {
                let lower = cast(bound.lower.unwrap_or(0.0), &|| format!("lb[{}]", i))?;
                let upper = match bound.upper {
                    Some(ub) => cast(ub, &|| format!("ub[{}]", i))?,
                    None => DEFAULT_INTEGER_UPPER,
                };
                if lower > upper {
                    return Err(ValidationError::new(format!(
                        "Invalid bounds for {}: [{}, {}]",
                        name, lower, upper
                    )));
                }
                Decision {
                    name: name.clone(),
                    domain: Domain::Integer,
                    lower,
                    upper,
                    objective,
                }
            }
            (BackendClass::IntegerOnly, Integrality::Continuous) => {
                return Err(ValidationError::new(format!(
                    "continuous variable {} cannot be sent to the integer-only backend",
                    name
                )));
            }
            (BackendClass::ContinuousCapable, Integrality::Binary) => Decision {
                name: name.clone(),
                domain: Domain::Binary,
                lower: bound.lower.unwrap_or(0.0).max(0.0),
                upper: bound.upper.unwrap_or(1.0).min(1.0),
                objective,
            },
            (BackendClass::ContinuousCapable, kind) => Decision {
                name: name.clone(),
                domain: if kind == Integrality::Integer {
                    Domain::Integer
                } else {
                    Domain::Continuous
                },
                lower: bound.lower.unwrap_or(f64::NEG_INFINITY),
                upper: bound.upper.unwrap_or(f64::INFINITY),
                objective,
            },
        };
        decisions.push(decision);
    }

    let to_rows = |label: &str, system: Option<&LinearSystem>| -> Result<Vec<Row>, ValidationError> {
        let Some(system) = system else {
            return Ok(Vec::new());
        };
        system
            .a()
            .row_entries()
            .into_iter()
            .zip(system.b())
            .enumerate()
            .map(|(r, (entries, &rhs))| -> Result<Row, ValidationError> {
                let terms = entries
                    .into_iter()
                    .map(|(j, a)| cast(a, &|| format!("{}[{},{}]", label, r, j)).map(|a| (j, a)))
                    .collect::<Result<Vec<_>, ValidationError>>()?;
                let rhs = cast(rhs, &|| format!("rhs of {}[{}]", label, r))?;
                Ok(Row { terms, rhs })
            })
            .collect()
    };

    Ok(BackendModel {
        sense: problem.sense(),
        decisions,
        equalities: to_rows("A_eq", problem.equality())?,
        inequalities: to_rows("A_ub", problem.inequality())?,
    })
}

/// Build GLPK's `<=`-only polyhedron; each equality row becomes the pair
/// `a x <= b` and `-a x <= -b`. The model must come from an integer-only translation.
pub fn to_glpk_polyhedron(model: &BackendModel) -> GlpkPoly<'_> {
    let mut rows: Vec<i32> = Vec::new();
    let mut cols: Vec<i32> = Vec::new();
    let mut vals: Vec<i32> = Vec::new();
    let mut b: Vec<Bound> = Vec::new();

    let mut push_row = |row: &Row, sign: f64| {
        let row_idx = b.len() as i32;
        for &(col, val) in &row.terms {
            rows.push(row_idx);
            cols.push(col as i32);
            vals.push((sign * val).round() as i32);
        }
        b.push((0, (sign * row.rhs).round() as i32));
    };

    for row in &model.equalities {
        push_row(row, 1.0);
        push_row(row, -1.0);
    }
    for row in &model.inequalities {
        push_row(row, 1.0);
    }

    let variables: Vec<GlpkVar<'_>> = model
        .decisions
        .iter()
        .map(|d| GlpkVar {
            id: d.name.as_str(),
            bound: (d.lower.round() as i32, d.upper.round() as i32),
        })
        .collect();

    GlpkPoly {
        a: GlpkMatrix { rows, cols, vals },
        b,
        variables,
        double_bound: false,
    }
}

pub fn to_glpk_objective(model: &BackendModel) -> HashMap<&str, f64> {
    model
        .decisions
        .iter()
        .map(|d| (d.name.as_str(), d.objective))
        .collect()
}

impl From<GlpkStatus> for Status {
    fn from(s: GlpkStatus) -> Self {
        match s {
            GlpkStatus::Optimal => Status::Optimal,
            GlpkStatus::Infeasible | GlpkStatus::NoFeasible | GlpkStatus::EmptySpace => {
                Status::Infeasible
            }
            GlpkStatus::Unbounded => Status::Unbounded,
            GlpkStatus::Undefined
            | GlpkStatus::Feasible
            | GlpkStatus::SimplexFailed
            | GlpkStatus::MIPFailed => Status::NotSolved,
        }
    }
}
