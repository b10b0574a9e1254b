//! Canonical problem model shared by the adapters and the router.

use crate::domain::validate::{
    check_finite, check_len, check_unique_names, system_from_parts,
};
use crate::error::ValidationError;
use crate::models::{Integrality, RawProblem};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sense {
    Minimize,
    Maximize,
}

impl Sense {
    pub fn parse(token: &str) -> Option<Self> {
        match token.trim().to_lowercase().as_str() {
            "min" | "minimize" => Some(Sense::Minimize),
            "max" | "maximize" => Some(Sense::Maximize),
            _ => None,
        }
    }
}

/// Coordinate-format matrix with a declared shape.
///
/// Entries are kept in insertion order; duplicates are not merged.
#[derive(Debug, Clone, PartialEq)]
pub struct SparseMatrix {
    nrows: usize,
    ncols: usize,
    rows: Vec<usize>,
    cols: Vec<usize>,
    vals: Vec<f64>,
}

impl SparseMatrix {
    /// Build from triplets, rejecting ragged triplet lists and out-of-shape entries.
    pub fn from_triplets(
        nrows: usize,
        ncols: usize,
        rows: Vec<usize>,
        cols: Vec<usize>,
        vals: Vec<f64>,
    ) -> Result<Self, ValidationError> {
        if rows.len() != cols.len() || rows.len() != vals.len() {
            return Err(ValidationError::new(format!(
                "sparse matrix triplets differ in length: rows={}, cols={}, vals={}",
                rows.len(),
                cols.len(),
                vals.len()
            )));
        }
        if let Some(k) = (0..rows.len()).find(|&k| rows[k] >= nrows || cols[k] >= ncols) {
            return Err(ValidationError::new(format!(
                "sparse entry ({}, {}) outside shape {}x{}",
                rows[k], cols[k], nrows, ncols
            )));
        }
        Ok(SparseMatrix {
            nrows,
            ncols,
            rows,
            cols,
            vals,
        })
    }

    /// Build from dense rows; every row must have `ncols` entries. Zeros are not stored.
    pub fn from_dense(dense: &[Vec<f64>], ncols: usize) -> Result<Self, ValidationError> {
        let mut matrix = SparseMatrix::empty(dense.len(), ncols);
        for (i, row) in dense.iter().enumerate() {
            if row.len() != ncols {
                return Err(ValidationError::new(format!(
                    "dense row {} has {} entries, expected {}",
                    i,
                    row.len(),
                    ncols
                )));
            }
            for (j, &v) in row.iter().enumerate() {
                if v != 0.0 {
                    matrix.push(i, j, v);
                }
            }
        }
        Ok(matrix)
    }

    pub fn empty(nrows: usize, ncols: usize) -> Self {
        SparseMatrix {
            nrows,
            ncols,
            rows: Vec::new(),
            cols: Vec::new(),
            vals: Vec::new(),
        }
    }

    fn push(&mut self, row: usize, col: usize, val: f64) {
        self.rows.push(row);
        self.cols.push(col);
        self.vals.push(val);
    }

    pub fn nrows(&self) -> usize {
        self.nrows
    }

    pub fn ncols(&self) -> usize {
        self.ncols
    }

    pub fn nnz(&self) -> usize {
        self.vals.len()
    }

    pub fn values(&self) -> &[f64] {
        &self.vals
    }

    /// Iterate `(row, col, val)` triplets.
    pub fn entries(&self) -> impl Iterator<Item = (usize, usize, f64)> + '_ {
        self.rows
            .iter()
            .zip(&self.cols)
            .zip(&self.vals)
            .map(|((&r, &c), &v)| (r, c, v))
    }

    /// For each row, collect its `(col, val)` entries.
    pub fn row_entries(&self) -> Vec<Vec<(usize, f64)>> {
        let mut row_data: Vec<Vec<(usize, f64)>> = vec![Vec::new(); self.nrows];
        for (r, c, v) in self.entries() {
            row_data[r].push((c, v));
        }
        row_data
    }

    /// New matrix made of the given rows, in the given order, optionally negated.
    pub fn select_rows(&self, picks: &[usize], negate: bool) -> SparseMatrix {
        let sign = if negate { -1.0 } else { 1.0 };
        let mut out = SparseMatrix::empty(picks.len(), self.ncols);
        let by_row = self.row_entries();
        for (new_idx, &old_idx) in picks.iter().enumerate() {
            for &(c, v) in &by_row[old_idx] {
                out.push(new_idx, c, sign * v);
            }
        }
        out
    }

    /// Stack `self` on top of `other`; both must have the same column count.
    pub fn vstack(mut self, other: &SparseMatrix) -> Result<SparseMatrix, ValidationError> {
        if self.ncols != other.ncols {
            return Err(ValidationError::new(format!(
                "cannot stack matrices with {} and {} columns",
                self.ncols, other.ncols
            )));
        }
        let offset = self.nrows;
        for (r, c, v) in other.entries() {
            self.push(r + offset, c, v);
        }
        self.nrows += other.nrows;
        Ok(self)
    }
}

/// A matrix together with its right-hand side; one exists only with the other.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearSystem {
    a: SparseMatrix,
    b: Vec<f64>,
}

impl LinearSystem {
    pub fn new(a: SparseMatrix, b: Vec<f64>) -> Result<Self, ValidationError> {
        if a.nrows() != b.len() {
            return Err(ValidationError::new(format!(
                "matrix has {} rows but right-hand side has {} entries",
                a.nrows(),
                b.len()
            )));
        }
        Ok(LinearSystem { a, b })
    }

    pub fn a(&self) -> &SparseMatrix {
        &self.a
    }

    pub fn b(&self) -> &[f64] {
        &self.b
    }
}

/// Variable bound; `None` is the infinite side.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VarBound {
    pub lower: Option<f64>,
    pub upper: Option<f64>,
}

impl VarBound {
    pub const NON_NEGATIVE: VarBound = VarBound {
        lower: Some(0.0),
        upper: None,
    };

    /// Infinite values collapse to `None`.
    pub fn new(lower: Option<f64>, upper: Option<f64>) -> Self {
        VarBound {
            lower: lower.filter(|v| v.is_finite()),
            upper: upper.filter(|v| v.is_finite()),
        }
    }
}

impl Default for VarBound {
    fn default() -> Self {
        VarBound::NON_NEGATIVE
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CanonicalProblem {
    sense: Sense,
    c: Vec<f64>,
    equality: Option<LinearSystem>,
    inequality: Option<LinearSystem>,
    bounds: Vec<VarBound>,
    integrality: Vec<Integrality>,
    var_names: Vec<String>,
    obj_offset: f64,
}

/// Parts of a problem before the per-variable invariants are checked.
/// `None` fields take their defaults.
#[derive(Debug, Clone, Default)]
pub struct ProblemParts {
    pub sense: Option<Sense>,
    pub c: Vec<f64>,
    pub equality: Option<LinearSystem>,
    pub inequality: Option<LinearSystem>,
    pub bounds: Option<Vec<VarBound>>,
    pub integrality: Option<Vec<Integrality>>,
    pub var_names: Option<Vec<String>>,
    pub obj_offset: f64,
}

impl CanonicalProblem {
    pub fn from_parts(parts: ProblemParts) -> Result<Self, ValidationError> {
        let n = parts.c.len();
        check_finite("c", &parts.c)?;

        let bounds = parts.bounds.unwrap_or_else(|| vec![VarBound::default(); n]);
        check_len("bounds", bounds.len(), n)?;

        let integrality = parts
            .integrality
            .unwrap_or_else(|| vec![Integrality::Continuous; n]);
        check_len("integrality", integrality.len(), n)?;

        let var_names = match parts.var_names {
            Some(names) if !names.is_empty() => names,
            _ => (0..n).map(|i| format!("x{}", i)).collect(),
        };
        check_len("var_names", var_names.len(), n)?;
        check_unique_names(&var_names)?;

        for (label, system) in [("A_eq", &parts.equality), ("A_ub", &parts.inequality)] {
            if let Some(system) = system {
                check_len(&format!("{} columns", label), system.a().ncols(), n)?;
                check_finite(label, system.a().values())?;
                check_finite(&format!("rhs of {}", label), system.b())?;
            }
        }

        if !parts.obj_offset.is_finite() {
            return Err(ValidationError::new("obj_offset must be finite"));
        }

        Ok(CanonicalProblem {
            sense: parts.sense.unwrap_or(Sense::Minimize),
            c: parts.c,
            equality: parts.equality,
            inequality: parts.inequality,
            bounds,
            integrality,
            var_names,
            obj_offset: parts.obj_offset,
        })
    }

    pub fn n(&self) -> usize {
        self.c.len()
    }

    pub fn sense(&self) -> Sense {
        self.sense
    }

    pub fn c(&self) -> &[f64] {
        &self.c
    }

    pub fn equality(&self) -> Option<&LinearSystem> {
        self.equality.as_ref()
    }

    pub fn inequality(&self) -> Option<&LinearSystem> {
        self.inequality.as_ref()
    }

    pub fn bounds(&self) -> &[VarBound] {
        &self.bounds
    }

    pub fn integrality(&self) -> &[Integrality] {
        &self.integrality
    }

    pub fn var_names(&self) -> &[String] {
        &self.var_names
    }

    pub fn obj_offset(&self) -> f64 {
        self.obj_offset
    }
}

/// Turn a raw mapping into a `CanonicalProblem`, applying defaults and
/// rejecting anything that breaks the model's invariants.
pub fn normalize(raw: RawProblem) -> Result<CanonicalProblem, ValidationError> {
    let sense = match raw.sense.as_deref() {
        None => Sense::Minimize,
        Some(token) => Sense::parse(token).ok_or_else(|| {
            ValidationError::new(format!("sense must be 'min' or 'max', got {:?}", token))
        })?,
    };

    let n = raw.c.len();
    let equality = system_from_parts("A_eq", "b_eq", raw.A_eq, raw.b_eq, n)?;
    let inequality = system_from_parts("A_ub", "b_ub", raw.A_ub, raw.b_ub, n)?;

    let bounds = raw.bounds.map(|list| {
        list.into_iter()
            .map(|(lo, hi)| VarBound::new(lo, hi))
            .collect::<Vec<_>>()
    });
    let integrality = raw.integrality.map(|list| {
        list.into_iter()
            .map(|t| t.unwrap_or(Integrality::Continuous))
            .collect::<Vec<_>>()
    });

    CanonicalProblem::from_parts(ProblemParts {
        sense: Some(sense),
        c: raw.c,
        equality,
        inequality,
        bounds,
        integrality,
        var_names: raw.var_names,
        obj_offset: raw.obj_offset.unwrap_or(0.0),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ApiMatrix;

    fn raw(c: Vec<f64>) -> RawProblem {
        RawProblem {
            c,
            ..RawProblem::default()
        }
    }

    #[test]
    fn test_normalize_given_bare_objective_should_apply_defaults() {
        let p = normalize(raw(vec![1.0, 2.0, 3.0])).unwrap();
        assert_eq!(p.sense(), Sense::Minimize);
        assert_eq!(p.var_names(), &["x0", "x1", "x2"]);
        assert_eq!(p.bounds(), &[VarBound::NON_NEGATIVE; 3]);
        assert_eq!(p.integrality(), &[Integrality::Continuous; 3]);
        assert!(p.equality().is_none());
        assert_eq!(p.obj_offset(), 0.0);
    }

    #[test]
    fn test_normalize_given_unknown_sense_should_fail() {
        let mut r = raw(vec![1.0]);
        r.sense = Some("sideways".into());
        assert!(normalize(r).is_err());
    }

    #[test]
    fn test_normalize_given_sense_in_capitals_should_accept() {
        let mut r = raw(vec![1.0]);
        r.sense = Some("MAX".into());
        let p = normalize(r).unwrap();
        assert_eq!(p.sense(), Sense::Maximize);
    }

    #[test]
    fn test_normalize_given_half_present_pair_should_fail() {
        let mut r = raw(vec![1.0, 1.0]);
        r.A_eq = Some(ApiMatrix::Dense(vec![vec![1.0, 1.0]]));
        assert!(normalize(r.clone()).is_err());

        r.A_eq = None;
        r.b_ub = Some(vec![1.0]);
        assert!(normalize(r).is_err());
    }

    #[test]
    fn test_normalize_given_length_mismatch_should_fail() {
        let mut r = raw(vec![1.0, 1.0]);
        r.bounds = Some(vec![(Some(0.0), Some(1.0))]);
        assert!(normalize(r).is_err());

        let mut r = raw(vec![1.0, 1.0]);
        r.integrality = Some(vec![None, None, None]);
        assert!(normalize(r).is_err());

        let mut r = raw(vec![1.0, 1.0]);
        r.var_names = Some(vec!["a".into()]);
        assert!(normalize(r).is_err());
    }

    #[test]
    fn test_normalize_given_wrong_column_count_should_fail() {
        let mut r = raw(vec![1.0, 1.0]);
        r.A_ub = Some(ApiMatrix::Dense(vec![vec![1.0, 1.0, 1.0]]));
        r.b_ub = Some(vec![1.0]);
        assert!(normalize(r).is_err());
    }

    #[test]
    fn test_normalize_given_rhs_row_mismatch_should_fail() {
        let mut r = raw(vec![1.0, 1.0]);
        r.A_eq = Some(ApiMatrix::Dense(vec![vec![1.0, 1.0]]));
        r.b_eq = Some(vec![1.0, 2.0]);
        assert!(normalize(r).is_err());
    }

    #[test]
    fn test_normalize_given_duplicate_names_should_fail() {
        let mut r = raw(vec![1.0, 1.0]);
        r.var_names = Some(vec!["x".into(), "x".into()]);
        assert!(normalize(r).is_err());
    }

    #[test]
    fn test_normalize_given_empty_names_should_use_defaults() {
        let mut r = raw(vec![1.0]);
        r.var_names = Some(vec![]);
        let p = normalize(r).unwrap();
        assert_eq!(p.var_names(), &["x0"]);
    }

    #[test]
    fn test_var_bound_given_infinite_values_should_store_none() {
        let b = VarBound::new(Some(f64::NEG_INFINITY), Some(f64::INFINITY));
        assert_eq!(b, VarBound { lower: None, upper: None });
    }

    #[test]
    fn test_sparse_matrix_given_entry_outside_shape_should_fail() {
        assert!(SparseMatrix::from_triplets(1, 2, vec![0], vec![2], vec![1.0]).is_err());
        assert!(SparseMatrix::from_triplets(1, 2, vec![0, 0], vec![1], vec![1.0]).is_err());
    }

    #[test]
    fn test_select_rows_should_reorder_and_negate() {
        let m = SparseMatrix::from_dense(&[vec![1.0, 0.0], vec![0.0, 2.0], vec![3.0, 4.0]], 2)
            .unwrap();
        let picked = m.select_rows(&[2, 0], true);
        assert_eq!(picked.nrows(), 2);
        assert_eq!(
            picked.row_entries(),
            vec![vec![(0, -3.0), (1, -4.0)], vec![(0, -1.0)]]
        );
    }

    #[test]
    fn test_vstack_should_offset_rows() {
        let top = SparseMatrix::from_dense(&[vec![1.0, 0.0]], 2).unwrap();
        let bottom = SparseMatrix::from_dense(&[vec![0.0, 5.0]], 2).unwrap();
        let stacked = top.vstack(&bottom).unwrap();
        assert_eq!(stacked.nrows(), 2);
        assert_eq!(stacked.row_entries(), vec![vec![(0, 1.0)], vec![(1, 5.0)]]);
    }
}
