use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::domain::solver_factory::SolverType;

/// Numeric tolerances shared by adapters, validation and routing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerances {
    /// Row bounds closer than this are treated as an equality row.
    pub eq_tol: f64,
    /// Maximum distance from the nearest integer for a value to count as integral.
    pub int_tol: f64,
}

impl Default for Tolerances {
    fn default() -> Self {
        Tolerances {
            eq_tol: 1e-12,
            int_tol: 1e-9,
        }
    }
}

impl Tolerances {
    pub fn is_int_like(&self, x: f64) -> bool {
        x.is_finite() && (x - x.round()).abs() <= self.int_tol
    }
}

/// Options forwarded to the backend for a single solve.
#[derive(Debug, Clone)]
pub struct SolveOptions {
    pub tolerances: Tolerances,
    /// Soft limit; the backend decides whether to honour it.
    pub time_limit: Option<Duration>,
    pub workers: u32,
    pub preferred_solver: Option<SolverType>,
}

impl Default for SolveOptions {
    fn default() -> Self {
        SolveOptions {
            tolerances: Tolerances::default(),
            time_limit: None,
            workers: DEFAULT_WORKERS,
            preferred_solver: None,
        }
    }
}

const DEFAULT_PORT: u16 = 9000;
const DEFAULT_JSON_LIMIT: usize = 2 * 1024 * 1024;
const DEFAULT_WORKERS: u32 = 8;

/// Service settings, read from the environment (and `.env` via dotenv).
#[derive(Debug, Clone)]
pub struct Settings {
    pub port: u16,
    pub json_limit: usize,
    pub tolerances: Tolerances,
    pub workers: u32,
    pub time_limit: Option<Duration>,
    pub continuous_solver: Option<SolverType>,
    pub sentry_dsn: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            port: DEFAULT_PORT,
            json_limit: DEFAULT_JSON_LIMIT,
            tolerances: Tolerances::default(),
            workers: DEFAULT_WORKERS,
            time_limit: None,
            continuous_solver: None,
            sentry_dsn: None,
        }
    }
}

fn parse_var<T: FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|s| s.trim().parse::<T>().ok())
}

/// Seconds to a solver time limit. Non-positive, NaN and values too large
/// for a `Duration` give `None`.
pub fn parse_time_limit(secs: f64) -> Option<Duration> {
    if secs > 0.0 {
        Duration::try_from_secs_f64(secs).ok()
    } else {
        None
    }
}

impl Settings {
    pub fn from_env() -> Self {
        let defaults = Settings::default();

        let tolerances = Tolerances {
            eq_tol: parse_var("EQ_TOLERANCE")
                .filter(|t: &f64| *t >= 0.0)
                .unwrap_or(defaults.tolerances.eq_tol),
            int_tol: parse_var("INT_TOLERANCE")
                .filter(|t: &f64| *t >= 0.0)
                .unwrap_or(defaults.tolerances.int_tol),
        };

        let time_limit = parse_var::<f64>("SOLVER_TIME_LIMIT").and_then(parse_time_limit);

        let continuous_solver = env::var("CONTINUOUS_SOLVER")
            .ok()
            .and_then(|s| SolverType::from_str(&s));

        Settings {
            port: parse_var("PORT").unwrap_or(defaults.port),
            json_limit: parse_var("JSON_PAYLOAD_LIMIT").unwrap_or(defaults.json_limit),
            tolerances,
            workers: parse_var("SOLVER_WORKERS")
                .filter(|w: &u32| *w > 0)
                .unwrap_or(defaults.workers),
            time_limit,
            continuous_solver,
            sentry_dsn: env::var("SENTRY_DSN").ok().filter(|s| !s.is_empty()),
        }
    }

    pub fn solve_options(&self) -> SolveOptions {
        SolveOptions {
            tolerances: self.tolerances,
            time_limit: self.time_limit,
            workers: self.workers,
            preferred_solver: self.continuous_solver,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_int_like_given_tolerance_should_accept_near_integers() {
        let tol = Tolerances::default();
        assert!(tol.is_int_like(3.0));
        assert!(tol.is_int_like(-2.0 + 1e-12));
        assert!(!tol.is_int_like(0.5));
        assert!(!tol.is_int_like(f64::INFINITY));
        assert!(!tol.is_int_like(f64::NAN));
    }

    #[test]
    fn test_parse_time_limit_given_out_of_range_should_reject() {
        assert_eq!(parse_time_limit(2.5), Some(Duration::from_millis(2500)));
        assert_eq!(parse_time_limit(1e30), None);
        assert_eq!(parse_time_limit(f64::INFINITY), None);
        assert_eq!(parse_time_limit(f64::NAN), None);
        assert_eq!(parse_time_limit(0.0), None);
        assert_eq!(parse_time_limit(-1.0), None);
    }

    #[test]
    fn test_solve_options_should_carry_settings() {
        let settings = Settings {
            workers: 3,
            time_limit: Some(Duration::from_secs(2)),
            ..Settings::default()
        };
        let options = settings.solve_options();
        assert_eq!(options.workers, 3);
        assert_eq!(options.time_limit, Some(Duration::from_secs(2)));
        assert_eq!(options.tolerances, Tolerances::default());
    }
}
