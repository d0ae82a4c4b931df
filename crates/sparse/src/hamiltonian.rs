use crate::csr::SparseMatrix;
use num_complex::{Complex32, Complex64};
use simd::Scalar;
use std::fmt;
use std::sync::Arc;

/// Scalar type carried by a [`Hamiltonian`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    Float,
    Double,
    ComplexFloat,
    ComplexDouble,
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ScalarKind::Float => "f32",
            ScalarKind::Double => "f64",
            ScalarKind::ComplexFloat => "complex<f32>",
            ScalarKind::ComplexDouble => "complex<f64>",
        };
        f.write_str(name)
    }
}

/// Shared handle to an immutable Hamiltonian of one scalar kind.
#[derive(Clone, Debug)]
pub enum Hamiltonian {
    Float(Arc<SparseMatrix<f32>>),
    Double(Arc<SparseMatrix<f64>>),
    ComplexFloat(Arc<SparseMatrix<Complex32>>),
    ComplexDouble(Arc<SparseMatrix<Complex64>>),
}

impl Hamiltonian {
    pub fn kind(&self) -> ScalarKind {
        match self {
            Hamiltonian::Float(_) => ScalarKind::Float,
            Hamiltonian::Double(_) => ScalarKind::Double,
            Hamiltonian::ComplexFloat(_) => ScalarKind::ComplexFloat,
            Hamiltonian::ComplexDouble(_) => ScalarKind::ComplexDouble,
        }
    }

    pub fn rows(&self) -> usize {
        match self {
            Hamiltonian::Float(h) => h.rows(),
            Hamiltonian::Double(h) => h.rows(),
            Hamiltonian::ComplexFloat(h) => h.rows(),
            Hamiltonian::ComplexDouble(h) => h.rows(),
        }
    }

    pub fn nnz(&self) -> usize {
        match self {
            Hamiltonian::Float(h) => h.nnz(),
            Hamiltonian::Double(h) => h.nnz(),
            Hamiltonian::ComplexFloat(h) => h.nnz(),
            Hamiltonian::ComplexDouble(h) => h.nnz(),
        }
    }

    /// Typed handle if this Hamiltonian holds `S`.
    pub fn get<S: MatrixScalar>(&self) -> Option<Arc<SparseMatrix<S>>> {
        S::share(self)
    }
}

/// Scalar that can live inside a [`Hamiltonian`].
pub trait MatrixScalar: Scalar {
    const KIND: ScalarKind;

    fn share(h: &Hamiltonian) -> Option<Arc<SparseMatrix<Self>>>;
    fn wrap(matrix: Arc<SparseMatrix<Self>>) -> Hamiltonian;
}

macro_rules! impl_matrix_scalar {
    ($t:ty, $variant:ident) => {
        impl MatrixScalar for $t {
            const KIND: ScalarKind = ScalarKind::$variant;

            fn share(h: &Hamiltonian) -> Option<Arc<SparseMatrix<Self>>> {
                match h {
                    Hamiltonian::$variant(m) => Some(Arc::clone(m)),
                    _ => None,
                }
            }

            fn wrap(matrix: Arc<SparseMatrix<Self>>) -> Hamiltonian {
                Hamiltonian::$variant(matrix)
            }
        }

        impl From<SparseMatrix<$t>> for Hamiltonian {
            fn from(matrix: SparseMatrix<$t>) -> Self {
                Hamiltonian::$variant(Arc::new(matrix))
            }
        }
    };
}

impl_matrix_scalar!(f32, Float);
impl_matrix_scalar!(f64, Double);
impl_matrix_scalar!(Complex32, ComplexFloat);
impl_matrix_scalar!(Complex64, ComplexDouble);
