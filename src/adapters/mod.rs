pub mod knapsack_text;
pub mod solution_archive;
pub mod sparse_problem;

pub use knapsack_text::{discover_instances, load_knapsack, solve_knapsack_files};
pub use solution_archive::{
    load_solution_archive, parse_solution_archive, ArchiveEntry, ReferenceStatus,
    SolutionArchive,
};
pub use sparse_problem::{
    load_sparse_problem, partition_rows, sparse_problem_from_value, RowPartition,
};
