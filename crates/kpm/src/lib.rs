//! Kernel Polynomial Method for sparse Hermitian matrices.
//!
//! A [`Strategy`] owns one Hamiltonian and answers spectral queries on it:
//! local density of states, Green's function elements and the stochastic
//! total density of states. Each query expands the target function in
//! Chebyshev moments computed by a sparse recurrence on a reordered copy of
//! the matrix, damps them with a [`Kernel`] and evaluates the series on the
//! requested energy grid.
//!
//! ```no_run
//! use kpm::{kpm, Config, Kpm};
//! use sparse::{Hamiltonian, SparseMatrix};
//!
//! let n = 1000;
//! let hoppings = (0..n - 1).flat_map(|i| [(i, i + 1, -1.0), (i + 1, i, -1.0)]);
//! let h: Hamiltonian = SparseMatrix::from_triplets(n, n, hoppings).into();
//!
//! let mut strategy = kpm(&h, Config::default())?;
//! let energy: Vec<f64> = (0..100).map(|i| -1.9 + 0.038 * i as f64).collect();
//! let ldos = strategy.ldos(n / 2, &energy, 0.05)?;
//! println!("{}", strategy.report(true));
//! # Ok::<(), kpm::KpmError>(())
//! ```

pub mod bounds;
pub mod compute;
pub mod config;
pub mod error;
pub mod kernel;
pub mod moments;
pub mod optimized;
pub mod reconstruct;
pub mod starters;
pub mod stats;
pub mod strategy;

pub use bounds::{Bounds, LanczosReport, Scale};
pub use compute::{Cpu, MomentsBackend, Reference};
pub use config::{Algorithm, Config, DomainPolicy, MatrixFormat};
pub use error::{KpmError, Result};
pub use kernel::Kernel;
pub use stats::Stats;
pub use strategy::{Kpm, Strategy};

use num_complex::{Complex32, Complex64};
use sparse::Hamiltonian;
use std::sync::Arc;

/// Strategy for whichever scalar kind `h` holds, on the [`Cpu`] backend.
pub fn kpm(h: &Hamiltonian, config: Config) -> Result<Box<dyn Kpm>> {
    kpm_with::<Cpu>(h, config)
}

/// Like [`kpm`], with an explicit moments backend.
pub fn kpm_with<B: MomentsBackend>(h: &Hamiltonian, config: Config) -> Result<Box<dyn Kpm>> {
    let strategy: Box<dyn Kpm> = match h {
        Hamiltonian::Float(m) => Box::new(Strategy::<f32, B>::new(Arc::clone(m), config)?),
        Hamiltonian::Double(m) => Box::new(Strategy::<f64, B>::new(Arc::clone(m), config)?),
        Hamiltonian::ComplexFloat(m) => Box::new(Strategy::<Complex32, B>::new(Arc::clone(m), config)?),
        Hamiltonian::ComplexDouble(m) => Box::new(Strategy::<Complex64, B>::new(Arc::clone(m), config)?),
    };
    Ok(strategy)
}
