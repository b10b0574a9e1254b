use std::fmt;

use crate::config::SolveOptions;
use crate::domain::problem::Sense;
use crate::error::BackendError;
use crate::models::{Diagnostics, Status};

/// Which family of engine a problem needs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendClass {
    /// Integral coefficients and integer/binary variables only
    IntegerOnly,
    /// Mixed integer and continuous variables with real coefficients
    ContinuousCapable,
}

impl fmt::Display for BackendClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendClass::IntegerOnly => write!(f, "integer-only"),
            BackendClass::ContinuousCapable => write!(f, "continuous-capable"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Domain {
    Binary,
    Integer,
    Continuous,
}

/// A decision variable with its resolved domain; infinite bounds are `±inf`.
#[derive(Debug, Clone, PartialEq)]
pub struct Decision {
    pub name: String,
    pub domain: Domain,
    pub lower: f64,
    pub upper: f64,
    pub objective: f64,
}

/// One linear row `sum(coeff * x[col]) (= | <=) rhs`
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub terms: Vec<(usize, f64)>,
    pub rhs: f64,
}

/// Problem in the primitives every backend understands
#[derive(Debug, Clone, PartialEq)]
pub struct BackendModel {
    pub sense: Sense,
    pub decisions: Vec<Decision>,
    pub equalities: Vec<Row>,
    pub inequalities: Vec<Row>,
}

/// What a backend hands back; `objective` and `values` only mean something when optimal.
#[derive(Debug, Clone, PartialEq)]
pub struct BackendOutcome {
    pub status: Status,
    pub objective: Option<f64>,
    /// One value per decision, in decision order.
    pub values: Vec<f64>,
    pub diagnostics: Diagnostics,
}

/// Common interface for the MILP backends
pub trait Solver: Send + Sync {
    /// Solve a translated model
    ///
    /// # Arguments
    /// * `model` - Decisions, equality rows and `<=` rows with the objective direction
    /// * `options` - Soft time limit and worker count to forward
    fn solve(&self, model: &BackendModel, options: &SolveOptions)
        -> Result<BackendOutcome, BackendError>;

    /// Whether the engine can be used right now
    fn is_available(&self) -> Result<(), String> {
        Ok(())
    }

    /// Classes of problem this engine accepts
    fn accepts(&self, class: BackendClass) -> bool;

    /// Get the solver name for logging/debugging
    fn name(&self) -> &str;
}
