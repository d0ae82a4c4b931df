pub mod csr;
pub mod ell;
pub mod hamiltonian;
pub mod permutation;

pub use csr::SparseMatrix;
pub use ell::EllMatrix;
pub use hamiltonian::{Hamiltonian, MatrixScalar, ScalarKind};
pub use permutation::Permutation;
pub use simd::Scalar;
