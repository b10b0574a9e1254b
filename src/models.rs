use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ---------- API (wire) types: owned & serde-friendly ----------

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ApiShape {
    pub nrows: usize,
    pub ncols: usize,
}

/// Coordinate-format sparse matrix, one (row, col, val) triplet per entry
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ApiSparseMatrix {
    pub rows: Vec<usize>,
    pub cols: Vec<usize>,
    pub vals: Vec<f64>,
    pub shape: ApiShape,
}

/// A constraint matrix as it arrives: sparse triplets or dense rows
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(untagged)]
pub enum ApiMatrix {
    Sparse(ApiSparseMatrix),
    Dense(Vec<Vec<f64>>),
}

/// Per-variable domain marker
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Integrality {
    #[serde(rename = "B", alias = "binary")]
    Binary,
    #[serde(rename = "I", alias = "integer")]
    Integer,
    #[serde(rename = "C", alias = "continuous")]
    Continuous,
}

/// Raw problem mapping; every field but `c` may be omitted.
///
/// `bounds` entries are `[lower, upper]` with `null` standing for an
/// infinite side, `integrality` entries may be `null` for continuous.
#[allow(non_snake_case)]
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct RawProblem {
    #[serde(default)]
    pub sense: Option<String>,
    pub c: Vec<f64>,
    #[serde(default)]
    pub A_eq: Option<ApiMatrix>,
    #[serde(default)]
    pub b_eq: Option<Vec<f64>>,
    #[serde(default)]
    pub A_ub: Option<ApiMatrix>,
    #[serde(default)]
    pub b_ub: Option<Vec<f64>>,
    #[serde(default)]
    pub bounds: Option<Vec<(Option<f64>, Option<f64>)>>,
    #[serde(default)]
    pub integrality: Option<Vec<Option<Integrality>>>,
    #[serde(default)]
    pub var_names: Option<Vec<String>>,
    #[serde(default)]
    pub obj_offset: Option<f64>,
}

#[derive(Deserialize)]
pub struct MilpRequest {
    pub problem: RawProblem,
    /// Seconds; overrides the configured limit for this request.
    #[serde(default)]
    pub time_limit: Option<f64>,
}

#[derive(Deserialize)]
pub struct KnapsackRequest {
    pub values: Vec<f64>,
    pub weights: Vec<f64>,
    pub capacity: f64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct KnapsackResponse {
    pub objective: f64,
    pub selected: Vec<usize>,
}

// ---------- API response types ----------

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Optimal,
    Infeasible,
    Unbounded,
    NotSolved,
}

/// Backend-reported figures; absent when the backend does not expose them.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Diagnostics {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wall_time_ms: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nodes: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conflicts: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branches: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub best_bound: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl Diagnostics {
    pub fn with_message(message: impl Into<String>) -> Self {
        Diagnostics {
            message: Some(message.into()),
            ..Diagnostics::default()
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct MilpResult {
    pub status: Status,
    pub objective: Option<f64>,
    pub assignment: BTreeMap<String, f64>,
    pub diagnostics: Diagnostics,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backend: Option<String>,
}

impl MilpResult {
    pub fn not_solved(diagnostics: Diagnostics) -> Self {
        MilpResult {
            status: Status::NotSolved,
            objective: None,
            assignment: BTreeMap::new(),
            diagnostics,
            backend: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_raw_problem_given_minimal_json_should_default_everything_but_c() {
        let raw: RawProblem = serde_json::from_value(json!({ "c": [1.0, 2.0] })).unwrap();
        assert_eq!(raw.c, vec![1.0, 2.0]);
        assert!(raw.sense.is_none());
        assert!(raw.A_eq.is_none());
        assert!(raw.bounds.is_none());
    }

    #[test]
    fn test_raw_problem_given_mixed_shapes_should_parse() {
        let raw: RawProblem = serde_json::from_value(json!({
            "sense": "max",
            "c": [1, 1],
            "A_eq": [[1, 1]],
            "b_eq": [1],
            "A_ub": {"rows": [0], "cols": [1], "vals": [2.5], "shape": {"nrows": 1, "ncols": 2}},
            "b_ub": [4],
            "bounds": [[0, 1], [null, null]],
            "integrality": ["B", null]
        }))
        .unwrap();
        assert_eq!(raw.A_eq, Some(ApiMatrix::Dense(vec![vec![1.0, 1.0]])));
        assert!(matches!(raw.A_ub, Some(ApiMatrix::Sparse(_))));
        assert_eq!(raw.bounds.unwrap()[1], (None, None));
        assert_eq!(raw.integrality.unwrap(), vec![Some(Integrality::Binary), None]);
    }

    #[test]
    fn test_diagnostics_should_omit_absent_fields() {
        let value = serde_json::to_value(Diagnostics::with_message("no backend")).unwrap();
        assert_eq!(value, json!({ "message": "no backend" }));
    }
}
