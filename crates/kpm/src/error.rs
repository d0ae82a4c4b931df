//! Error types for the KPM engine

use sparse::ScalarKind;
use thiserror::Error;

/// Errors raised while building a strategy or running a query
#[derive(Error, Debug, Clone, PartialEq)]
pub enum KpmError {
    #[error("invalid energy range specified (min {min} > max {max})")]
    InvalidEnergyRange { min: f64, max: f64 },

    #[error("the Hamiltonian has no sites")]
    EmptyHamiltonian,

    #[error("the Hamiltonian must be square, got {rows}x{cols}")]
    NonSquareHamiltonian { rows: usize, cols: usize },

    #[error("index {index} is out of range for a Hamiltonian of size {size}")]
    IndexOutOfRange { index: usize, size: usize },

    #[error("broadening {0} must be positive, finite and resolvable within 2^20 moments")]
    InvalidBroadening(f64),

    #[error("energy {energy} lies outside the expansion domain ({min}, {max})")]
    EnergyOutOfDomain { energy: f64, min: f64, max: f64 },

    #[error("expected a {expected} Hamiltonian, got {found}")]
    ScalarMismatch { expected: ScalarKind, found: ScalarKind },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Convenience alias used throughout the crate
pub type Result<T> = std::result::Result<T, KpmError>;
