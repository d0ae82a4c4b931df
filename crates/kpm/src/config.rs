//! Strategy configuration.
//!
//! [`Config`] is fixed for the lifetime of a strategy. It is serializable via
//! [`serde`] so callers can keep it next to their results; every field has a
//! default, so partial JSON documents are accepted.

use serde::{Deserialize, Serialize};

use crate::error::{KpmError, Result};
use crate::kernel::Kernel;

/// Sparse layout used by the recurrence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatrixFormat {
    /// Compressed rows; compact, vectorized along each row.
    Csr,
    /// Padded fixed-width rows; vectorized across rows.
    #[default]
    Ell,
}

/// What reconstruction does with an energy outside the expansion domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DomainPolicy {
    /// Fail the query with [`KpmError::EnergyOutOfDomain`].
    #[default]
    Reject,
    /// Evaluate at the nearest point inside the domain.
    Clamp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Algorithm {
    /// Reorder sites by hop distance from the target index.
    pub reorder: bool,
    /// Only touch the part of the matrix that can still affect the moments.
    /// Needs `reorder`; ignored for the stochastic DOS.
    pub optimal_size: bool,
}

impl Default for Algorithm {
    fn default() -> Self {
        Self {
            reorder: true,
            optimal_size: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Lower spectrum bound. Equal bounds (the default 0/0) mean "estimate".
    pub min_energy: f64,
    pub max_energy: f64,

    /// Relative change of both extremal eigenvalues at which Lanczos stops.
    pub lanczos_precision: f64,
    /// Hard cap on Lanczos iterations.
    pub lanczos_max_iterations: usize,

    pub kernel: Kernel,
    pub algorithm: Algorithm,
    pub matrix_format: MatrixFormat,

    /// Random starter vectors averaged by the DOS.
    pub num_random: usize,
    /// Seed for the random starters and the Lanczos start vector.
    pub seed: String,

    pub domain: DomainPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            min_energy: 0.0,
            max_energy: 0.0,
            lanczos_precision: 0.002,
            lanczos_max_iterations: 100,
            kernel: Kernel::default(),
            algorithm: Algorithm::default(),
            matrix_format: MatrixFormat::default(),
            num_random: 1,
            seed: "kpm".to_string(),
            domain: DomainPolicy::default(),
        }
    }
}

impl Config {
    pub fn with_energy_range(min_energy: f64, max_energy: f64) -> Self {
        Self {
            min_energy,
            max_energy,
            ..Self::default()
        }
    }

    /// Explicit bounds, or `None` when they should be estimated.
    pub fn user_bounds(&self) -> Option<(f64, f64)> {
        if self.min_energy == self.max_energy {
            None
        } else {
            Some((self.min_energy, self.max_energy))
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !self.min_energy.is_finite() || !self.max_energy.is_finite() {
            return Err(KpmError::InvalidConfig(format!(
                "energy bounds must be finite, got ({}, {})",
                self.min_energy, self.max_energy
            )));
        }
        if self.min_energy > self.max_energy {
            return Err(KpmError::InvalidEnergyRange {
                min: self.min_energy,
                max: self.max_energy,
            });
        }
        if !(self.lanczos_precision > 0.0 && self.lanczos_precision.is_finite()) {
            return Err(KpmError::InvalidConfig(format!(
                "lanczos_precision must be positive, got {}",
                self.lanczos_precision
            )));
        }
        if self.lanczos_max_iterations == 0 {
            return Err(KpmError::InvalidConfig(
                "lanczos_max_iterations must be >= 1".into(),
            ));
        }
        if self.num_random == 0 {
            return Err(KpmError::InvalidConfig("num_random must be >= 1".into()));
        }
        self.kernel.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid_and_estimates_bounds() {
        let cfg = Config::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.user_bounds(), None);
        assert_eq!(cfg.matrix_format, MatrixFormat::Ell);
    }

    #[test]
    fn inverted_range_is_rejected() {
        let cfg = Config::with_energy_range(1.0, -1.0);
        assert_eq!(
            cfg.validate(),
            Err(KpmError::InvalidEnergyRange { min: 1.0, max: -1.0 })
        );
    }

    #[test]
    fn partial_json_uses_defaults() {
        let cfg: Config =
            serde_json::from_str(r#"{ "num_random": 8, "matrix_format": "csr" }"#).unwrap();
        assert_eq!(cfg.num_random, 8);
        assert_eq!(cfg.matrix_format, MatrixFormat::Csr);
        assert_eq!(cfg.lanczos_max_iterations, 100);
        assert!(cfg.algorithm.reorder);
    }

    #[test]
    fn zero_samples_is_rejected() {
        let cfg = Config {
            num_random: 0,
            ..Config::default()
        };
        assert!(matches!(cfg.validate(), Err(KpmError::InvalidConfig(_))));
    }
}
