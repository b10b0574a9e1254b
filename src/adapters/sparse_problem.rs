//! Sparse linear problems stored as JSON containers with loosely named fields.
//!
//! A container holds the constraint matrix, the objective and some mix of row
//! bounds, a right-hand side and variable bounds. Field names vary between
//! producers, so every field is looked up through one alias table.

use std::fs;
use std::path::Path;

use serde_json::{Map, Value};

use crate::config::Tolerances;
use crate::domain::problem::{
    CanonicalProblem, LinearSystem, ProblemParts, Sense, SparseMatrix, VarBound,
};
use crate::error::{Error, FormatError};
use crate::models::ApiSparseMatrix;

const PRIMARY_KEYS: &[&str] = &["Problem", "problem", "PROBLEM"];
const AUX_KEYS: &[&str] = &["aux", "Aux", "AUX"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Matrix,
    Objective,
    Rhs,
    RowLower,
    RowUpper,
    VarLower,
    VarUpper,
    Offset,
}

const ALIASES: &[(Field, &[&str])] = &[
    (Field::Matrix, &["A", "a", "M", "mat"]),
    (Field::Objective, &["c", "f", "cost", "obj", "objective"]),
    (Field::Rhs, &["b", "rhs", "beq"]),
    (
        Field::RowLower,
        &["rl", "r_l", "rowl", "bl", "lower_row", "row_lower"],
    ),
    (
        Field::RowUpper,
        &["ru", "r_u", "rowu", "bu", "upper_row", "row_upper"],
    ),
    (Field::VarLower, &["lo", "l", "lb", "lower", "xl", "xlow"]),
    (Field::VarUpper, &["hi", "u", "ub", "upper", "xu", "xupp"]),
    (Field::Offset, &["z0", "objconst", "offset"]),
];

fn aliases(field: Field) -> &'static [&'static str] {
    ALIASES
        .iter()
        .find(|(f, _)| *f == field)
        .map(|(_, names)| *names)
        .unwrap_or(&[])
}

/// First non-null value stored under any of `names`, trying each container in turn.
pub fn first_match<'a>(containers: &[&'a Map<String, Value>], names: &[&str]) -> Option<&'a Value> {
    containers.iter().find_map(|container| {
        names
            .iter()
            .find_map(|name| container.get(*name).filter(|v| !v.is_null()))
    })
}

/// Row indices split by how their bounds constrain them, each list ascending.
///
/// `upper` holds every non-equality row with a finite upper bound, ranged rows
/// included. `lower` holds rows with only a finite lower bound.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowPartition {
    pub equality: Vec<usize>,
    pub upper: Vec<usize>,
    pub lower: Vec<usize>,
}

pub fn partition_rows(rl: &[f64], ru: &[f64], eq_tol: f64) -> RowPartition {
    let mut partition = RowPartition::default();
    for (i, (&lo, &hi)) in rl.iter().zip(ru).enumerate() {
        if lo.is_finite() && hi.is_finite() && (hi - lo).abs() <= eq_tol {
            partition.equality.push(i);
        } else if hi.is_finite() {
            partition.upper.push(i);
        } else if lo.is_finite() {
            partition.lower.push(i);
        }
    }
    partition
}

/// Read and convert a JSON container from disk.
pub fn load_sparse_problem(
    path: &Path,
    tol: &Tolerances,
) -> crate::error::Result<CanonicalProblem> {
    let origin = path.display().to_string();
    let text = fs::read_to_string(path).map_err(|source| FormatError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let value: Value = serde_json::from_str(&text).map_err(|source| FormatError::Json {
        origin: origin.clone(),
        source,
    })?;
    sparse_problem_from_value(&value, &origin, tol)
}

/// Convert an already parsed container. `label` names the source in errors.
pub fn sparse_problem_from_value(
    value: &Value,
    label: &str,
    tol: &Tolerances,
) -> crate::error::Result<CanonicalProblem> {
    let malformed = |details: &str| FormatError::Malformed {
        origin: label.to_string(),
        details: details.to_string(),
    };
    let missing = |what: &str| FormatError::Missing {
        origin: label.to_string(),
        what: what.to_string(),
    };

    let top = value
        .as_object()
        .ok_or_else(|| malformed("container must be a JSON object"))?;
    let primary = PRIMARY_KEYS
        .iter()
        .find_map(|key| top.get(*key).and_then(Value::as_object))
        .unwrap_or(top);
    let aux = AUX_KEYS
        .iter()
        .find_map(|key| primary.get(*key).and_then(Value::as_object));

    let mut containers = vec![primary];
    containers.extend(aux);
    let lookup = |field: Field| first_match(&containers, aliases(field));

    let a = match lookup(Field::Matrix) {
        Some(raw) => parse_matrix(raw, label)?.ok_or_else(|| missing("matrix A"))?,
        None => scan_for_sparse(top, label)?.ok_or_else(|| missing("matrix A"))?,
    };
    let c_raw = lookup(Field::Objective).ok_or_else(|| missing("objective c"))?;
    let c = parse_vector(c_raw, label, "c", None)?;

    let (m, n) = (a.nrows(), a.ncols());
    check_len(label, "c", c.len(), n)?;
    log::debug!("{}: resolved {}x{} matrix with {} entries", label, m, n, a.nnz());

    let lo = match lookup(Field::VarLower) {
        Some(raw) => parse_vector(raw, label, "lo", Some(f64::NEG_INFINITY))?,
        None => vec![0.0; n],
    };
    let hi = match lookup(Field::VarUpper) {
        Some(raw) => parse_vector(raw, label, "hi", Some(f64::INFINITY))?,
        None => vec![f64::INFINITY; n],
    };
    check_len(label, "lo", lo.len(), n)?;
    check_len(label, "hi", hi.len(), n)?;
    let bounds: Vec<VarBound> = lo
        .iter()
        .zip(&hi)
        .map(|(&l, &h)| VarBound::new(Some(l), Some(h)))
        .collect();

    let rl = lookup(Field::RowLower);
    let ru = lookup(Field::RowUpper);
    let (equality, inequality) = if rl.is_some() || ru.is_some() {
        let rl = match rl {
            Some(raw) => parse_vector(raw, label, "rl", Some(f64::NEG_INFINITY))?,
            None => vec![f64::NEG_INFINITY; m],
        };
        let ru = match ru {
            Some(raw) => parse_vector(raw, label, "ru", Some(f64::INFINITY))?,
            None => vec![f64::INFINITY; m],
        };
        check_len(label, "rl", rl.len(), m)?;
        check_len(label, "ru", ru.len(), m)?;
        assemble_row_bounds(&a, &rl, &ru, tol.eq_tol)?
    } else if let Some(raw) = lookup(Field::Rhs) {
        let b = parse_vector(raw, label, "b", None)?;
        check_len(label, "b", b.len(), m)?;
        (Some(LinearSystem::new(a, b)?), None)
    } else {
        (None, None)
    };

    let obj_offset = lookup(Field::Offset)
        .and_then(|raw| parse_offset(raw, label))
        .unwrap_or(0.0);

    let problem = CanonicalProblem::from_parts(ProblemParts {
        sense: Some(Sense::Minimize),
        c,
        equality,
        inequality,
        bounds: Some(bounds),
        integrality: None,
        var_names: None,
        obj_offset,
    })?;
    Ok(problem)
}

fn assemble_row_bounds(
    a: &SparseMatrix,
    rl: &[f64],
    ru: &[f64],
    eq_tol: f64,
) -> Result<(Option<LinearSystem>, Option<LinearSystem>), Error> {
    let partition = partition_rows(rl, ru, eq_tol);

    let equality = if partition.equality.is_empty() {
        None
    } else {
        let b = partition.equality.iter().map(|&i| ru[i]).collect();
        Some(LinearSystem::new(a.select_rows(&partition.equality, false), b)?)
    };

    // Lower sides of ranged rows fold in with the >= rows, in row order.
    let folded: Vec<usize> = (0..rl.len())
        .filter(|i| rl[*i].is_finite() && partition.equality.binary_search(i).is_err())
        .collect();

    let inequality = if partition.upper.is_empty() && folded.is_empty() {
        None
    } else {
        let stacked = a
            .select_rows(&partition.upper, false)
            .vstack(&a.select_rows(&folded, true))?;
        let b = partition
            .upper
            .iter()
            .map(|&i| ru[i])
            .chain(folded.iter().map(|&i| -rl[i]))
            .collect();
        Some(LinearSystem::new(stacked, b)?)
    };

    Ok((equality, inequality))
}

fn check_len(label: &str, what: &str, found: usize, expected: usize) -> Result<(), FormatError> {
    if found != expected {
        return Err(FormatError::LengthMismatch {
            origin: label.to_string(),
            what: what.to_string(),
            found,
            expected,
        });
    }
    Ok(())
}

/// A sparse object, a dense array of rows, or `None` for anything else.
fn parse_matrix(value: &Value, label: &str) -> Result<Option<SparseMatrix>, FormatError> {
    let invalid = |details: String| FormatError::Malformed {
        origin: label.to_string(),
        details,
    };

    if let Some(sparse) = as_sparse(value) {
        return SparseMatrix::from_triplets(
            sparse.shape.nrows,
            sparse.shape.ncols,
            sparse.rows,
            sparse.cols,
            sparse.vals,
        )
        .map(Some)
        .map_err(|e| invalid(e.details));
    }

    let Some(rows) = value.as_array() else {
        return Ok(None);
    };
    let dense = rows
        .iter()
        .map(|row| match row.as_array() {
            Some(cells) => cells
                .iter()
                .map(|cell| element(cell, label, "A", None))
                .collect::<Result<Vec<f64>, FormatError>>(),
            None => Err(invalid("dense matrix rows must be arrays".to_string())),
        })
        .collect::<Result<Vec<Vec<f64>>, FormatError>>()?;
    let ncols = dense.first().map_or(0, Vec::len);
    SparseMatrix::from_dense(&dense, ncols)
        .map(Some)
        .map_err(|e| invalid(e.details))
}

fn as_sparse(value: &Value) -> Option<ApiSparseMatrix> {
    if !value.is_object() {
        return None;
    }
    serde_json::from_value(value.clone()).ok()
}

fn scan_for_sparse(
    top: &Map<String, Value>,
    label: &str,
) -> Result<Option<SparseMatrix>, FormatError> {
    match top.iter().find(|(_, v)| as_sparse(v).is_some()) {
        Some((key, v)) => {
            log::debug!("{}: using top-level {:?} as the constraint matrix", label, key);
            parse_matrix(v, label)
        }
        None => Ok(None),
    }
}

/// Array or bare scalar; `infinite` is what `null` stands for in this field.
fn parse_vector(
    value: &Value,
    label: &str,
    what: &str,
    infinite: Option<f64>,
) -> Result<Vec<f64>, FormatError> {
    match value {
        Value::Array(items) => items
            .iter()
            .map(|item| element(item, label, what, infinite))
            .collect(),
        scalar => Ok(vec![element(scalar, label, what, infinite)?]),
    }
}

fn element(value: &Value, label: &str, what: &str, infinite: Option<f64>) -> Result<f64, FormatError> {
    let not_a_number = || FormatError::NotANumber {
        origin: format!("{} ({})", label, what),
        value: value.to_string(),
    };
    match value {
        Value::Number(num) => num.as_f64().ok_or_else(not_a_number),
        Value::Null => infinite.ok_or_else(not_a_number),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "inf" | "+inf" | "infinity" | "+infinity" => Ok(f64::INFINITY),
            "-inf" | "-infinity" => Ok(f64::NEG_INFINITY),
            _ => Err(not_a_number()),
        },
        _ => Err(not_a_number()),
    }
}

fn parse_offset(value: &Value, label: &str) -> Option<f64> {
    let first = match value {
        Value::Array(items) => items.first(),
        other => Some(other),
    };
    let parsed = first.and_then(|v| match v {
        Value::String(text) => text.trim().parse::<f64>().ok(),
        other => other.as_f64(),
    });
    match parsed.filter(|x| x.is_finite()) {
        Some(offset) => Some(offset),
        None => {
            log::debug!("{}: ignoring unusable objective offset {}", label, value);
            None
        }
    }
}
