use std::collections::HashSet;

use crate::domain::problem::{LinearSystem, SparseMatrix};
use crate::error::ValidationError;
use crate::models::ApiMatrix;

pub fn check_len(what: &str, found: usize, expected: usize) -> Result<(), ValidationError> {
    if found != expected {
        return Err(ValidationError::new(format!(
            "len({}) must match len(c): {} != {}",
            what, found, expected
        )));
    }
    Ok(())
}

pub fn check_finite(what: &str, values: &[f64]) -> Result<(), ValidationError> {
    match values.iter().position(|v| !v.is_finite()) {
        Some(idx) => Err(ValidationError::new(format!(
            "{}[{}] must be finite, got {}",
            what, idx, values[idx]
        ))),
        None => Ok(()),
    }
}

pub fn check_unique_names(names: &[String]) -> Result<(), ValidationError> {
    let mut seen: HashSet<&str> = HashSet::with_capacity(names.len());
    for name in names {
        if !seen.insert(name.as_str()) {
            return Err(ValidationError::new(format!(
                "variable name {} appears more than once",
                name
            )));
        }
    }
    Ok(())
}

/// Convert a wire matrix into a `SparseMatrix` with exactly `ncols` columns.
pub fn matrix_from_api(
    label: &str,
    matrix: ApiMatrix,
    ncols: usize,
) -> Result<SparseMatrix, ValidationError> {
    let matrix = match matrix {
        ApiMatrix::Dense(rows) => SparseMatrix::from_dense(&rows, ncols),
        ApiMatrix::Sparse(m) => {
            check_len(&format!("{} columns", label), m.shape.ncols, ncols)?;
            SparseMatrix::from_triplets(m.shape.nrows, m.shape.ncols, m.rows, m.cols, m.vals)
        }
    };
    matrix.map_err(|e| ValidationError::new(format!("{}: {}", label, e.details)))
}

/// Bundle a matrix and its right-hand side; both present or both absent.
pub fn system_from_parts(
    a_label: &str,
    b_label: &str,
    a: Option<ApiMatrix>,
    b: Option<Vec<f64>>,
    ncols: usize,
) -> Result<Option<LinearSystem>, ValidationError> {
    match (a, b) {
        (None, None) => Ok(None),
        (Some(a), Some(b)) => {
            let a = matrix_from_api(a_label, a, ncols)?;
            LinearSystem::new(a, b)
                .map(Some)
                .map_err(|e| ValidationError::new(format!("{}/{}: {}", a_label, b_label, e.details)))
        }
        _ => Err(ValidationError::new(format!(
            "{} and {} must be both present or both absent",
            a_label, b_label
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ApiShape, ApiSparseMatrix};

    #[test]
    fn test_check_unique_names_given_duplicates_should_return_error() {
        let names = vec!["x1".to_string(), "x2".to_string(), "x1".to_string()];
        assert!(check_unique_names(&names).is_err());
    }

    #[test]
    fn test_check_unique_names_given_distinct_names_should_return_ok() {
        let names = vec!["x1".to_string(), "x2".to_string()];
        assert!(check_unique_names(&names).is_ok());
    }

    #[test]
    fn test_check_finite_given_nan_should_name_position() {
        let err = check_finite("c", &[1.0, f64::NAN]).unwrap_err();
        assert!(err.details.contains("c[1]"));
    }

    #[test]
    fn test_system_from_parts_given_only_rhs_should_return_error() {
        assert!(system_from_parts("A_eq", "b_eq", None, Some(vec![1.0]), 2).is_err());
    }

    #[test]
    fn test_matrix_from_api_given_sparse_with_wrong_width_should_return_error() {
        let m = ApiMatrix::Sparse(ApiSparseMatrix {
            rows: vec![0],
            cols: vec![0],
            vals: vec![1.0],
            shape: ApiShape { nrows: 1, ncols: 3 },
        });
        assert!(matrix_from_api("A_ub", m, 2).is_err());
    }
}
