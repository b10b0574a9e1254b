//! Knapsack instances stored as four plain-text files per instance:
//! `<inst>_c.txt` capacity, `<inst>_w.txt` weights, `<inst>_p.txt` profits
//! and an optional `<inst>_s.txt` reference selection.

use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::config::Tolerances;
use crate::domain::knapsack::{KnapsackInstance, KnapsackSolution};
use crate::error::FormatError;

fn instance_file(dir: &Path, instance: &str, suffix: &str) -> PathBuf {
    dir.join(format!("{}_{}.txt", instance, suffix))
}

/// One number per non-blank line.
fn read_numbers(path: &Path) -> Result<Vec<f64>, FormatError> {
    let text = fs::read_to_string(path).map_err(|source| FormatError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| {
            line.parse::<f64>().map_err(|_| FormatError::NotANumber {
                origin: path.display().to_string(),
                value: line.to_string(),
            })
        })
        .collect()
}

fn non_negative_integer(
    path: &Path,
    what: &str,
    value: f64,
    tol: &Tolerances,
) -> Result<u64, FormatError> {
    if value < 0.0 || !tol.is_int_like(value) {
        return Err(FormatError::NotInteger {
            origin: path.display().to_string(),
            what: what.to_string(),
            value,
        });
    }
    Ok(value.round() as u64)
}

/// Load instance `instance` (case-insensitive) from `dir`.
pub fn load_knapsack(
    dir: &Path,
    instance: &str,
    tol: &Tolerances,
) -> Result<KnapsackInstance, FormatError> {
    let name = instance.to_lowercase();

    let c_file = instance_file(dir, &name, "c");
    let capacity = match read_numbers(&c_file)?.as_slice() {
        [value] => non_negative_integer(&c_file, "capacity", *value, tol)?,
        other => {
            return Err(FormatError::Malformed {
                origin: c_file.display().to_string(),
                details: format!("expected a single capacity value, found {}", other.len()),
            })
        }
    };

    let w_file = instance_file(dir, &name, "w");
    let raw_weights = read_numbers(&w_file)?;
    let values = read_numbers(&instance_file(dir, &name, "p"))?;
    if raw_weights.len() != values.len() {
        return Err(FormatError::LengthMismatch {
            origin: dir.display().to_string(),
            what: "weights vs values".to_string(),
            found: raw_weights.len(),
            expected: values.len(),
        });
    }
    let weights = raw_weights
        .iter()
        .map(|&w| non_negative_integer(&w_file, "weight", w, tol))
        .collect::<Result<Vec<u64>, FormatError>>()?;

    let s_file = instance_file(dir, &name, "s");
    let reference_selection = if s_file.exists() {
        let flags = read_numbers(&s_file)?;
        if flags.len() != values.len() {
            return Err(FormatError::LengthMismatch {
                origin: s_file.display().to_string(),
                what: "selection".to_string(),
                found: flags.len(),
                expected: values.len(),
            });
        }
        Some(flags.iter().map(|f| f.round().clamp(0.0, 1.0) as u8).collect())
    } else {
        None
    };

    log::debug!(
        "Loaded knapsack {}: {} items, capacity {}",
        name,
        values.len(),
        capacity
    );

    Ok(KnapsackInstance {
        name,
        values,
        weights,
        capacity,
        reference_selection,
    })
}

/// Load an instance and solve it with the dynamic program.
pub fn solve_knapsack_files(
    dir: &Path,
    instance: &str,
    tol: &Tolerances,
) -> crate::error::Result<(KnapsackInstance, KnapsackSolution)> {
    let inst = load_knapsack(dir, instance, tol)?;
    let solution = inst.solve()?;
    Ok((inst, solution))
}

/// Every `(dir, instance)` under `root` that has capacity, weight and profit files.
pub fn discover_instances(root: &Path) -> Vec<(PathBuf, String)> {
    let mut found: Vec<(PathBuf, String)> = WalkDir::new(root)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .filter_map(|entry| {
            let file_name = entry.file_name().to_str()?;
            let instance = file_name.strip_suffix("_c.txt")?.to_string();
            let dir = entry.path().parent()?.to_path_buf();
            let complete = ["w", "p"]
                .iter()
                .all(|suffix| instance_file(&dir, &instance, suffix).is_file());
            complete.then_some((dir, instance))
        })
        .collect();
    found.sort();
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, KnapsackError};

    fn write_instance(dir: &Path, name: &str, c: &str, w: &str, p: &str, s: Option<&str>) {
        fs::write(instance_file(dir, name, "c"), c).unwrap();
        fs::write(instance_file(dir, name, "w"), w).unwrap();
        fs::write(instance_file(dir, name, "p"), p).unwrap();
        if let Some(s) = s {
            fs::write(instance_file(dir, name, "s"), s).unwrap();
        }
    }

    #[test]
    fn test_load_knapsack_given_valid_files_should_build_instance() {
        let dir = tempfile::tempdir().unwrap();
        write_instance(dir.path(), "t1", "5\n", "2\n3\n\n4\n", "3\n4\n5\n", Some("1\n1\n0\n"));

        let inst = load_knapsack(dir.path(), "T1", &Tolerances::default()).unwrap();
        assert_eq!(inst.name, "t1");
        assert_eq!(inst.capacity, 5);
        assert_eq!(inst.weights, vec![2, 3, 4]);
        assert_eq!(inst.values, vec![3.0, 4.0, 5.0]);
        assert_eq!(inst.reference_indices(), Some(vec![0, 1]));
    }

    #[test]
    fn test_load_knapsack_given_no_selection_file_should_leave_none() {
        let dir = tempfile::tempdir().unwrap();
        write_instance(dir.path(), "t2", "10", "1.0000000001", "7", None);
        let inst = load_knapsack(dir.path(), "t2", &Tolerances::default()).unwrap();
        assert_eq!(inst.weights, vec![1]);
        assert!(inst.reference_selection.is_none());
    }

    #[test]
    fn test_load_knapsack_given_fractional_capacity_should_fail() {
        let dir = tempfile::tempdir().unwrap();
        write_instance(dir.path(), "t3", "3.5", "1", "1", None);
        let err = load_knapsack(dir.path(), "t3", &Tolerances::default()).unwrap_err();
        assert!(matches!(err, FormatError::NotInteger { .. }));
    }

    #[test]
    fn test_load_knapsack_given_two_capacities_should_fail() {
        let dir = tempfile::tempdir().unwrap();
        write_instance(dir.path(), "t4", "3\n4\n", "1", "1", None);
        let err = load_knapsack(dir.path(), "t4", &Tolerances::default()).unwrap_err();
        assert!(matches!(err, FormatError::Malformed { .. }));
    }

    #[test]
    fn test_load_knapsack_given_bad_inputs_should_fail() {
        let dir = tempfile::tempdir().unwrap();
        write_instance(dir.path(), "neg", "3", "-1", "1", None);
        write_instance(dir.path(), "len", "3", "1\n2", "1", None);
        write_instance(dir.path(), "sel", "3", "1", "1", Some("1\n0"));
        write_instance(dir.path(), "nan", "3", "one", "1", None);
        let tol = Tolerances::default();

        assert!(matches!(
            load_knapsack(dir.path(), "neg", &tol),
            Err(FormatError::NotInteger { .. })
        ));
        assert!(matches!(
            load_knapsack(dir.path(), "len", &tol),
            Err(FormatError::LengthMismatch { .. })
        ));
        assert!(matches!(
            load_knapsack(dir.path(), "sel", &tol),
            Err(FormatError::LengthMismatch { .. })
        ));
        match load_knapsack(dir.path(), "nan", &tol) {
            Err(FormatError::NotANumber { origin, value }) => {
                assert!(origin.ends_with("nan_w.txt"));
                assert_eq!(value, "one");
            }
            other => panic!("expected NotANumber, got {:?}", other),
        }
    }

    #[test]
    fn test_solve_knapsack_files_given_valid_instance_should_solve() {
        let dir = tempfile::tempdir().unwrap();
        write_instance(dir.path(), "t5", "5", "2\n3\n4\n5", "3\n4\n5\n6", None);
        let (inst, solution) =
            solve_knapsack_files(dir.path(), "T5", &Tolerances::default()).unwrap();
        assert_eq!(inst.name, "t5");
        assert_eq!(solution.objective, 7.0);
        assert_eq!(solution.selected, vec![0, 1]);
    }

    #[test]
    fn test_solve_knapsack_files_given_huge_capacity_should_surface_knapsack_error() {
        let dir = tempfile::tempdir().unwrap();
        write_instance(dir.path(), "big", "10000000000000", "1", "1", None);
        let err = solve_knapsack_files(dir.path(), "big", &Tolerances::default()).unwrap_err();
        assert!(matches!(
            err,
            Error::Knapsack(KnapsackError::TableTooLarge { items: 1, .. })
        ));

        let err = solve_knapsack_files(dir.path(), "ghost", &Tolerances::default()).unwrap_err();
        assert!(matches!(err, Error::Format(FormatError::Io { .. })));
    }

    #[test]
    fn test_load_knapsack_given_missing_file_should_name_it() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_knapsack(dir.path(), "ghost", &Tolerances::default()).unwrap_err();
        assert!(err.to_string().contains("ghost_c.txt"));
    }

    #[test]
    fn test_discover_instances_should_find_complete_sets_sorted() {
        let root = tempfile::tempdir().unwrap();
        let b = root.path().join("b");
        let a = root.path().join("a");
        fs::create_dir_all(&b).unwrap();
        fs::create_dir_all(&a).unwrap();
        write_instance(&b, "p02", "1", "1", "1", None);
        write_instance(&a, "p01", "1", "1", "1", None);
        fs::write(instance_file(&a, "half", "c"), "1").unwrap();

        let found = discover_instances(root.path());
        assert_eq!(
            found,
            vec![(a, "p01".to_string()), (b, "p02".to_string())]
        );
    }
}
