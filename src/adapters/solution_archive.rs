//! Reference solution archives: one instance per line with its known status
//! and, when there is one, its objective value.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;

use crate::error::FormatError;

/// Status recorded for an archived instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReferenceStatus {
    Optimal,
    Best,
    Feasible,
    Infeasible,
    Unbounded,
    Limit,
    Unknown,
    /// A tagged key outside the known set, lower-cased.
    Other(String),
}

impl ReferenceStatus {
    fn from_tag(key: &str) -> Self {
        let key = key.to_ascii_lowercase();
        match key.as_str() {
            "opt" => ReferenceStatus::Optimal,
            "best" => ReferenceStatus::Best,
            "inf" => ReferenceStatus::Infeasible,
            "unbd" => ReferenceStatus::Unbounded,
            "unkn" => ReferenceStatus::Unknown,
            other => Self::from_word(other)
                .unwrap_or_else(|| ReferenceStatus::Other(other.to_string())),
        }
    }

    fn from_word(word: &str) -> Option<Self> {
        match word.to_ascii_lowercase().as_str() {
            "optimal" => Some(ReferenceStatus::Optimal),
            "best" => Some(ReferenceStatus::Best),
            "feasible" => Some(ReferenceStatus::Feasible),
            "infeasible" => Some(ReferenceStatus::Infeasible),
            "unbounded" => Some(ReferenceStatus::Unbounded),
            "limit" => Some(ReferenceStatus::Limit),
            "unknown" => Some(ReferenceStatus::Unknown),
            _ => None,
        }
    }
}

impl fmt::Display for ReferenceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let word = match self {
            ReferenceStatus::Optimal => "optimal",
            ReferenceStatus::Best => "best",
            ReferenceStatus::Feasible => "feasible",
            ReferenceStatus::Infeasible => "infeasible",
            ReferenceStatus::Unbounded => "unbounded",
            ReferenceStatus::Limit => "limit",
            ReferenceStatus::Unknown => "unknown",
            ReferenceStatus::Other(key) => key,
        };
        f.write_str(word)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArchiveEntry {
    pub status: ReferenceStatus,
    pub objective: Option<f64>,
}

/// Instance name to entry, ordered by name.
pub type SolutionArchive = BTreeMap<String, ArchiveEntry>;

pub fn load_solution_archive(path: &Path) -> Result<SolutionArchive, FormatError> {
    let bytes = fs::read(path).map_err(|source| FormatError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(parse_solution_archive(&String::from_utf8_lossy(&bytes)))
}

/// Parse archive text; lines that fit neither grammar are skipped.
pub fn parse_solution_archive(text: &str) -> SolutionArchive {
    let mut archive = SolutionArchive::new();
    for line in text.lines().map(str::trim) {
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        match parse_tagged(line).or_else(|| parse_loose(line)) {
            Some((name, entry)) => {
                archive.insert(name.to_string(), entry);
            }
            None => log::debug!("skipping archive line {:?}", line),
        }
    }
    archive
}

/// `=<key>= <name> [<number>]`
fn parse_tagged(line: &str) -> Option<(&str, ArchiveEntry)> {
    let rest = line.strip_prefix('=')?;
    let close = rest.find('=')?;
    let key = &rest[..close];
    if key.is_empty() || !key.chars().all(|ch| ch.is_ascii_alphabetic()) {
        return None;
    }
    let after = &rest[close + 1..];
    if !after.starts_with(char::is_whitespace) {
        return None;
    }

    let mut tokens = after.split_whitespace();
    let name = tokens.next()?;
    let objective = tokens
        .next()
        .and_then(numeric_prefix)
        .and_then(|num| num.parse::<f64>().ok());

    Some((
        name,
        ArchiveEntry {
            status: ReferenceStatus::from_tag(key),
            objective,
        },
    ))
}

/// Status word anywhere, name beside it, objective as the last numeric token.
fn parse_loose(line: &str) -> Option<(&str, ArchiveEntry)> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let (idx, status) = tokens
        .iter()
        .enumerate()
        .find_map(|(i, tok)| ReferenceStatus::from_word(tok).map(|status| (i, status)))?;
    let name = if idx > 0 {
        tokens[idx - 1]
    } else {
        tokens.get(idx + 1).copied()?
    };
    let objective = tokens.iter().rev().find_map(|tok| tok.parse::<f64>().ok());
    Some((name, ArchiveEntry { status, objective }))
}

/// Longest leading `[+-]digits[.digits][e[+-]digits]`. A fraction or
/// exponent without digits is left out of the prefix.
fn numeric_prefix(token: &str) -> Option<&str> {
    let bytes = token.as_bytes();
    let digits_from = |start: usize| {
        let mut end = start;
        while end < bytes.len() && bytes[end].is_ascii_digit() {
            end += 1;
        }
        end
    };
    let sign_at = |i: usize| i < bytes.len() && (bytes[i] == b'+' || bytes[i] == b'-');

    let mut end = if sign_at(0) { 1 } else { 0 };
    let int_end = digits_from(end);
    if int_end == end {
        return None;
    }
    end = int_end;

    if end < bytes.len() && bytes[end] == b'.' {
        let frac_end = digits_from(end + 1);
        if frac_end > end + 1 {
            end = frac_end;
        }
    }
    if end < bytes.len() && (bytes[end] == b'e' || bytes[end] == b'E') {
        let exp_start = if sign_at(end + 1) { end + 2 } else { end + 1 };
        let exp_end = digits_from(exp_start);
        if exp_end > exp_start {
            end = exp_end;
        }
    }
    Some(&token[..end])
}
