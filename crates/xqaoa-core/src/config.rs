//! Run configuration.
//!
//! Settings are layered, later sources overriding earlier ones:
//! 1. Built-in defaults
//! 2. A YAML file
//! 3. Environment variables with the `XQAOA_` prefix
//!
//! Explicit command-line flags are applied on top by the CLI.

use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ansatz::Variant;
use crate::error::{XqaoaError, XqaoaResult};
use crate::optimizers::{Adam, NelderMead, OptimizerKind};

/// Settings for one optimization run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    /// Ansatz variant to optimize.
    pub variant: Variant,
    /// Classical optimizer.
    pub optimizer: OptimizerKind,
    /// Iteration cap per restart.
    pub max_iterations: usize,
    /// Number of random starting points.
    pub restarts: usize,
    /// Base seed; restart `k` uses `seed + k`.
    pub seed: u64,
    /// Convergence tolerance (simplex spread or gradient norm).
    pub tolerance: f64,
    /// Adam step size. Ignored by Nelder-Mead.
    pub learning_rate: f64,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            variant: Variant::Xqaoa,
            optimizer: OptimizerKind::NelderMead,
            max_iterations: 1000,
            restarts: 10,
            seed: 42,
            tolerance: 1e-8,
            learning_rate: 0.05,
        }
    }
}

impl RunConfig {
    /// Load configuration from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> XqaoaResult<Self> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        Self::from_yaml(&contents)
    }

    /// Parse configuration from YAML text. Missing fields keep their defaults.
    pub fn from_yaml(contents: &str) -> XqaoaResult<Self> {
        let config: RunConfig =
            serde_yaml_ng::from_str(contents).map_err(|e| XqaoaError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load the file (if any), apply environment overrides and validate.
    pub fn load(config_file: Option<&Path>) -> XqaoaResult<Self> {
        let config = match config_file {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        let config = config.merge_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Override fields from `XQAOA_*` environment variables.
    pub fn merge_env(self) -> XqaoaResult<Self> {
        self.merge_vars(|key| std::env::var(key).ok())
    }

    /// Override fields from any variable source.
    ///
    /// Only variables present in `lookup` change the configuration; a
    /// present but unparsable value is an error.
    pub fn merge_vars<L>(mut self, lookup: L) -> XqaoaResult<Self>
    where
        L: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("XQAOA_VARIANT") {
            self.variant = v.parse()?;
        }
        if let Some(v) = lookup("XQAOA_OPTIMIZER") {
            self.optimizer = v.parse()?;
        }
        if let Some(v) = lookup("XQAOA_MAX_ITERATIONS") {
            self.max_iterations = parse_var("XQAOA_MAX_ITERATIONS", &v)?;
        }
        if let Some(v) = lookup("XQAOA_RESTARTS") {
            self.restarts = parse_var("XQAOA_RESTARTS", &v)?;
        }
        if let Some(v) = lookup("XQAOA_SEED") {
            self.seed = parse_var("XQAOA_SEED", &v)?;
        }
        if let Some(v) = lookup("XQAOA_TOLERANCE") {
            self.tolerance = parse_var("XQAOA_TOLERANCE", &v)?;
        }
        if let Some(v) = lookup("XQAOA_LEARNING_RATE") {
            self.learning_rate = parse_var("XQAOA_LEARNING_RATE", &v)?;
        }
        Ok(self)
    }

    /// Validate configuration values.
    pub fn validate(&self) -> XqaoaResult<()> {
        if self.max_iterations == 0 {
            return Err(XqaoaError::Config(
                "max_iterations must be greater than 0".to_string(),
            ));
        }
        if self.restarts == 0 {
            return Err(XqaoaError::Config(
                "restarts must be greater than 0".to_string(),
            ));
        }
        if !(self.tolerance.is_finite() && self.tolerance > 0.0) {
            return Err(XqaoaError::Config(format!(
                "tolerance must be positive, got {}",
                self.tolerance
            )));
        }
        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            return Err(XqaoaError::Config(format!(
                "learning_rate must be positive, got {}",
                self.learning_rate
            )));
        }
        Ok(())
    }

    /// Nelder-Mead optimizer with these limits.
    pub fn nelder_mead(&self) -> NelderMead {
        NelderMead::new()
            .with_maxiter(self.max_iterations)
            .with_tol(self.tolerance)
    }

    /// Adam optimizer with these limits.
    pub fn adam(&self) -> Adam {
        Adam::new()
            .with_maxiter(self.max_iterations)
            .with_learning_rate(self.learning_rate)
            .with_tol(self.tolerance)
    }
}

fn parse_var<T: FromStr>(key: &str, value: &str) -> XqaoaResult<T> {
    value
        .trim()
        .parse()
        .map_err(|_| XqaoaError::Config(format!("{key}: cannot parse '{value}'")))
}
