pub mod adapters;
pub mod config;
pub mod convert;
pub mod domain;
pub mod error;
pub mod models;
pub mod solve;

pub use config::{Settings, SolveOptions, Tolerances};
pub use domain::knapsack::{solve_knapsack_01, KnapsackInstance, KnapsackSolution};
pub use domain::problem::{normalize, CanonicalProblem};
pub use domain::solve::{select_backend, solve_milp, solve_raw};
pub use error::{Error, Result};
pub use models::{MilpResult, RawProblem, Status};
