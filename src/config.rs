//! Run configuration: effort bounds of the solver, tolerances and logging.
//!
//! Defaults come from [`crate::global`]; a TOML document may override any of them:
//! ```toml
//! [solver]
//! max_degree = 64
//! max_root_iterations = 500
//! residual_tolerance = 1e-8
//! [classifier]
//! zero_tolerance = 1e-10
//! [logging]
//! loglevel = "info"
//! log_file = "hessian.log"
//! ```
use crate::errors::HessianError;
use crate::global::{MAX_DEGREE, MAX_ROOT_ITERATIONS, RESIDUAL_TOLERANCE, THRESHOLD};
use log::info;
use std::path::Path;
use toml::{Table, Value};

#[derive(Clone, Debug, PartialEq)]
pub struct HessianConfig {
    /// largest degree of an eliminant the solver is allowed to build
    pub max_degree: usize,
    pub max_root_iterations: usize,
    /// relative residual under which approximate coordinates are paired
    pub residual_tolerance: f64,
    /// approximate Hessian entries smaller than this count as zero
    pub zero_tolerance: f64,
    pub loglevel: String,
    pub log_file: Option<String>,
}

impl Default for HessianConfig {
    fn default() -> Self {
        HessianConfig {
            max_degree: MAX_DEGREE,
            max_root_iterations: MAX_ROOT_ITERATIONS,
            residual_tolerance: RESIDUAL_TOLERANCE,
            zero_tolerance: THRESHOLD,
            loglevel: "info".to_string(),
            log_file: None,
        }
    }
}

fn section<'a>(root: &'a Table, name: &str) -> Result<Option<&'a Table>, HessianError> {
    match root.get(name) {
        None => Ok(None),
        Some(Value::Table(t)) => Ok(Some(t)),
        Some(other) => Err(HessianError::Config(format!(
            "[{}] must be a table, found {}",
            name,
            other.type_str()
        ))),
    }
}

fn get_usize(table: &Table, key: &str) -> Result<Option<usize>, HessianError> {
    match table.get(key) {
        None => Ok(None),
        Some(Value::Integer(n)) => usize::try_from(*n)
            .map(Some)
            .map_err(|_| HessianError::Config(format!("{} must be non-negative, found {}", key, n))),
        Some(other) => Err(HessianError::Config(format!(
            "{} must be an integer, found {}",
            key,
            other.type_str()
        ))),
    }
}

fn get_f64(table: &Table, key: &str) -> Result<Option<f64>, HessianError> {
    let value = match table.get(key) {
        None => return Ok(None),
        Some(Value::Float(x)) => *x,
        Some(Value::Integer(n)) => *n as f64,
        Some(other) => {
            return Err(HessianError::Config(format!(
                "{} must be a number, found {}",
                key,
                other.type_str()
            )));
        }
    };
    if !(value.is_finite() && value > 0.0) {
        return Err(HessianError::Config(format!("{} must be positive, found {}", key, value)));
    }
    Ok(Some(value))
}

fn get_string(table: &Table, key: &str) -> Result<Option<String>, HessianError> {
    match table.get(key) {
        None => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(HessianError::Config(format!(
            "{} must be a string, found {}",
            key,
            other.type_str()
        ))),
    }
}

impl HessianConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_degree(mut self, max_degree: usize) -> Self {
        self.max_degree = max_degree;
        self
    }

    pub fn with_max_root_iterations(mut self, iterations: usize) -> Self {
        self.max_root_iterations = iterations;
        self
    }

    pub fn with_residual_tolerance(mut self, tolerance: f64) -> Self {
        self.residual_tolerance = tolerance;
        self
    }

    pub fn with_zero_tolerance(mut self, tolerance: f64) -> Self {
        self.zero_tolerance = tolerance;
        self
    }

    pub fn with_loglevel(mut self, loglevel: &str) -> Self {
        self.loglevel = loglevel.to_string();
        self
    }

    pub fn with_log_file(mut self, log_file: Option<&str>) -> Self {
        self.log_file = log_file.map(str::to_string);
        self
    }

    /// Reads overrides from a TOML document; keys that are absent keep their defaults,
    /// unknown keys are ignored.
    pub fn from_toml_str(text: &str) -> Result<Self, HessianError> {
        let root: Table = text
            .parse()
            .map_err(|e: toml::de::Error| HessianError::Config(e.message().to_string()))?;
        let mut config = HessianConfig::default();
        if let Some(solver) = section(&root, "solver")? {
            if let Some(v) = get_usize(solver, "max_degree")? {
                config.max_degree = v;
            }
            if let Some(v) = get_usize(solver, "max_root_iterations")? {
                config.max_root_iterations = v;
            }
            if let Some(v) = get_f64(solver, "residual_tolerance")? {
                config.residual_tolerance = v;
            }
        }
        if let Some(classifier) = section(&root, "classifier")? {
            if let Some(v) = get_f64(classifier, "zero_tolerance")? {
                config.zero_tolerance = v;
            }
        }
        if let Some(logging) = section(&root, "logging")? {
            if let Some(v) = get_string(logging, "loglevel")? {
                config.loglevel = v;
            }
            if let Some(v) = get_string(logging, "log_file")? {
                config.log_file = Some(v);
            }
        }
        Ok(config)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, HessianError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| HessianError::Config(format!("cannot read {}: {}", path.display(), e)))?;
        let config = Self::from_toml_str(&text)?;
        info!("configuration loaded from {}", path.display());
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = HessianConfig::default();
        assert_eq!(config.max_degree, MAX_DEGREE);
        assert_eq!(config.zero_tolerance, THRESHOLD);
        assert_eq!(config.loglevel, "info");
        assert_eq!(HessianConfig::from_toml_str("").unwrap(), config);
        assert_eq!(HessianConfig::from_toml_str("[plots]\nwidth = 3\n").unwrap(), config);
    }

    #[test]
    fn test_partial_override() {
        let config = HessianConfig::from_toml_str(
            "[solver]\nmax_degree = 12\n[classifier]\nzero_tolerance = 1e-6\n",
        )
        .unwrap();
        assert_eq!(config.max_degree, 12);
        assert_eq!(config.max_root_iterations, MAX_ROOT_ITERATIONS);
        assert_eq!(config.zero_tolerance, 1e-6);
    }

    #[test]
    fn test_wrong_types_are_rejected() {
        for text in [
            "[solver]\nmax_degree = \"many\"\n",
            "[solver]\nmax_degree = -1\n",
            "[classifier]\nzero_tolerance = 0.0\n",
            "[logging]\nloglevel = 3\n",
            "solver = 5\n",
            "[solver\n",
        ] {
            assert!(
                matches!(HessianConfig::from_toml_str(text), Err(HessianError::Config(_))),
                "{}",
                text
            );
        }
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[logging]\nloglevel = \"debug\"\nlog_file = \"run.log\"").unwrap();
        let config = HessianConfig::from_file(file.path()).unwrap();
        assert_eq!(config.loglevel, "debug");
        assert_eq!(config.log_file.as_deref(), Some("run.log"));
        assert!(HessianConfig::from_file("/nonexistent/hessian.toml").is_err());
    }

    #[test]
    fn test_builder() {
        let config = HessianConfig::new()
            .with_max_degree(8)
            .with_max_root_iterations(10)
            .with_residual_tolerance(1e-6)
            .with_zero_tolerance(1e-12)
            .with_loglevel("warn")
            .with_log_file(Some("a.log"));
        assert_eq!(config.max_degree, 8);
        assert_eq!(config.max_root_iterations, 10);
        assert_eq!(config.log_file.as_deref(), Some("a.log"));
    }
}
