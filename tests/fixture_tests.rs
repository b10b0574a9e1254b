use std::path::PathBuf;

use optees::adapters::{
    discover_instances, load_knapsack, load_solution_archive, load_sparse_problem,
    ReferenceStatus,
};
use optees::config::{SolveOptions, Tolerances};
use optees::domain::solve::{select_backend, solve_milp};
use optees::domain::solver::BackendClass;
use optees::models::Status;

fn data_dir(sub: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("data")
        .join(sub)
}

#[test]
fn test_p01_dynamic_programming_matches_reference() {
    let inst = load_knapsack(&data_dir("knapsack/p01"), "P01", &Tolerances::default()).unwrap();
    assert_eq!(inst.capacity, 165);
    assert_eq!(inst.weights.len(), 10);

    let solution = inst.solve().unwrap();
    assert_eq!(solution.objective, 309.0);
    assert_eq!(Some(solution.selected), inst.reference_indices());
}

#[test]
fn test_p01_router_matches_reference() {
    let inst = load_knapsack(&data_dir("knapsack/p01"), "p01", &Tolerances::default()).unwrap();
    let problem = inst.to_problem().unwrap();
    assert_eq!(
        select_backend(&problem, &Tolerances::default()),
        BackendClass::IntegerOnly
    );

    let result = solve_milp(&problem, &SolveOptions::default()).unwrap();
    assert_eq!(result.status, Status::Optimal);
    assert_eq!(result.objective, Some(309.0));

    let chosen: Vec<usize> = (0..inst.values.len())
        .filter(|i| result.assignment[&format!("i{}", i)] > 0.5)
        .collect();
    assert_eq!(Some(chosen), inst.reference_indices());
}

#[test]
fn test_discover_instances_finds_p01() {
    let found = discover_instances(&data_dir("knapsack"));
    assert_eq!(found, vec![(data_dir("knapsack/p01"), "p01".to_string())]);
}

#[test]
fn test_solution_archive_fixture() {
    let archive = load_solution_archive(&data_dir("archives/sample.solu")).unwrap();
    assert_eq!(archive.len(), 6);
    assert_eq!(archive["air03"].objective, Some(340160.0));
    assert_eq!(archive["stein27x"].status, ReferenceStatus::Infeasible);
    assert_eq!(archive["dano3mip"].status, ReferenceStatus::Best);
    assert_eq!(archive["timtab2"].status, ReferenceStatus::Unknown);
    assert_eq!(archive["misc07"].objective, Some(2810.0));
}

#[test]
fn test_sparse_fixture_folds_ranged_rows() {
    let problem = load_sparse_problem(&data_dir("sparse/ranged.json"), &Tolerances::default()).unwrap();

    assert!(problem.equality().is_none());
    let ub = problem.inequality().unwrap();
    assert_eq!(ub.b(), &[4.0, 1.0, 1.0, -0.5]);
    assert_eq!(problem.obj_offset(), 10.0);
    assert_eq!(
        select_backend(&problem, &Tolerances::default()),
        BackendClass::ContinuousCapable
    );
}

#[cfg(not(any(feature = "highs-solver", feature = "gurobi-solver")))]
#[test]
fn test_sparse_fixture_without_continuous_backend_is_not_solved() {
    let problem = load_sparse_problem(&data_dir("sparse/ranged.json"), &Tolerances::default()).unwrap();
    let result = solve_milp(&problem, &SolveOptions::default()).unwrap();
    assert_eq!(result.status, Status::NotSolved);
    assert!(result.diagnostics.message.unwrap().contains("continuous-capable"));
}

#[cfg(feature = "highs-solver")]
#[test]
fn test_sparse_fixture_solves_with_offset() {
    // max x0 + 2 x1 peaks at (1.5, 2.5); the offset lifts -6.5 to 3.5
    let problem = load_sparse_problem(&data_dir("sparse/ranged.json"), &Tolerances::default()).unwrap();
    let result = solve_milp(&problem, &SolveOptions::default()).unwrap();
    assert_eq!(result.status, Status::Optimal);
    assert!((result.objective.unwrap() - 3.5).abs() < 1e-6);
    assert!((result.assignment["x1"] - 2.5).abs() < 1e-6);
}
