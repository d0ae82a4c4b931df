//! The Chebyshev recurrence.
//!
//! With the stored matrix `H2 = 2 H̃` the recurrence reads
//!
//! ```text
//! r_1   = H2 r_0 / 2
//! r_n+1 = H2 r_n - r_n-1
//! ```
//!
//! Backends implement [`MomentsBackend`]. [`Cpu`] runs the windowed,
//! vectorized products and computes two diagonal moments per step;
//! [`Reference`] runs the plain full-size recurrence and serves as a check.

mod csr;
mod ell;
mod reference;

pub use reference::Reference;

use simd::Scalar;
use std::fmt::Debug;

use crate::moments::{DiagonalMoments, OffDiagonalMoments};
use crate::optimized::{Optimized, OptimizedMatrix};

/// How one product `H2 x` is folded into the output vector.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
    /// `y = H2 x / 2`
    First,
    /// `y = H2 x - y`
    Next,
}

impl Step {
    #[inline]
    pub(crate) fn combine<S: Scalar>(self, hx: S, y: S) -> S {
        match self {
            Step::First => hx.scale(0.5),
            Step::Next => hx - y,
        }
    }
}

/// A way of producing raw moments for an optimized Hamiltonian.
///
/// `starter` is indexed in the reordered basis of `oh` and has `oh.size()`
/// elements. Implementations must agree up to rounding.
pub trait MomentsBackend: Clone + Debug + Default + Send + Sync + 'static {
    const NAME: &'static str;

    fn diagonal<S: Scalar>(
        oh: &Optimized<S>,
        starter: &[S],
        num_moments: usize,
        optimal_size: bool,
    ) -> DiagonalMoments<S>;

    fn off_diagonal<S: Scalar>(
        oh: &Optimized<S>,
        starter: &[S],
        num_moments: usize,
        optimal_size: bool,
    ) -> OffDiagonalMoments<S>;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct Cpu;

impl MomentsBackend for Cpu {
    const NAME: &'static str = "cpu";

    fn diagonal<S: Scalar>(
        oh: &Optimized<S>,
        starter: &[S],
        num_moments: usize,
        optimal_size: bool,
    ) -> DiagonalMoments<S> {
        let matrix = oh.matrix();
        let size = oh.size();
        let mut moments = DiagonalMoments::new(num_moments);

        let mut r0 = starter.to_vec();
        let mut r1 = vec![S::zero(); size];
        let active = oh.diagonal_size(1, optimal_size);
        step(matrix, active, &r0, &mut r1, Step::First);
        moments.collect_initial(dot(&r0, &r0, size), dot(&r0, &r1, active));

        // r_last is the deepest vector the doubling identities need
        let last = num_moments / 2;
        for n in 1..last {
            let active = oh.diagonal_size(n + 1, optimal_size);
            step(matrix, active, &r1, &mut r0, Step::Next);
            std::mem::swap(&mut r0, &mut r1);

            moments.collect_even(n, dot(&r0, &r0, active));
            moments.collect_odd(n, dot(&r1, &r0, active));
        }
        if num_moments % 2 == 1 {
            let active = oh.diagonal_size(last, optimal_size);
            moments.collect_even(last, dot(&r1, &r1, active));
        }
        moments
    }

    fn off_diagonal<S: Scalar>(
        oh: &Optimized<S>,
        starter: &[S],
        num_moments: usize,
        optimal_size: bool,
    ) -> OffDiagonalMoments<S> {
        let matrix = oh.matrix();
        let mut moments = OffDiagonalMoments::new(num_moments, &oh.idx().cols);

        let mut r0 = starter.to_vec();
        let mut r1 = vec![S::zero(); oh.size()];
        moments.collect(0, &r0);
        if num_moments < 2 {
            return moments;
        }

        let active = oh.off_diagonal_size(1, num_moments, optimal_size);
        step(matrix, active, &r0, &mut r1, Step::First);
        moments.collect(1, &r1);

        for n in 2..num_moments {
            let active = oh.off_diagonal_size(n, num_moments, optimal_size);
            step(matrix, active, &r1, &mut r0, Step::Next);
            std::mem::swap(&mut r0, &mut r1);
            moments.collect(n, &r1);
        }
        moments
    }
}

/// One product over the first `rows` rows: `y[..rows] <- step(H2 x, y)`.
pub fn step<S: Scalar>(matrix: &OptimizedMatrix<S>, rows: usize, x: &[S], y: &mut [S], kind: Step) {
    match matrix {
        OptimizedMatrix::Csr(m) => csr::step(m, rows, x, y, kind),
        OptimizedMatrix::Ell(m) => ell::step(m, rows, x, y, kind),
    }
}

/// `<u|v>` over the first `len` elements.
pub fn dot<S: Scalar>(u: &[S], v: &[S], len: usize) -> S {
    u[..len]
        .iter()
        .zip(&v[..len])
        .fold(S::zero(), |acc, (&a, &b)| acc + a.conj() * b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bounds::Scale;
    use crate::config::MatrixFormat;
    use crate::optimized::{Indices, OptimizedHamiltonian};
    use num_complex::Complex64;
    use sparse::SparseMatrix;
    use std::sync::Arc;

    fn ring(n: usize) -> Arc<SparseMatrix<Complex64>> {
        let t = Complex64::new(0.0, -1.0);
        let mut triplets = Vec::new();
        for i in 0..n {
            let j = (i + 1) % n;
            triplets.push((i, j, t));
            triplets.push((j, i, t.conj()));
            triplets.push((i, i, Complex64::new(0.1 * i as f64, 0.0)));
        }
        Arc::new(SparseMatrix::from_triplets(n, n, triplets))
    }

    #[test]
    fn csr_and_ell_steps_agree() {
        let scale = Scale { a: 3.0, b: 0.5 };
        let idx = Indices::diagonal(0);
        let mut csr = OptimizedHamiltonian::new(ring(13), MatrixFormat::Csr, false);
        let mut ell = OptimizedHamiltonian::new(ring(13), MatrixFormat::Ell, false);
        let x: Vec<Complex64> = (0..13).map(|i| Complex64::new(i as f64, 1.0 - i as f64)).collect();

        let mut y_csr: Vec<Complex64> = x.iter().map(|v| v * 0.5).collect();
        let mut y_ell = y_csr.clone();
        step(csr.optimize_for(&idx, scale).matrix(), 13, &x, &mut y_csr, Step::Next);
        step(ell.optimize_for(&idx, scale).matrix(), 13, &x, &mut y_ell, Step::Next);

        for (a, b) in y_csr.iter().zip(&y_ell) {
            assert!((a - b).norm() < 1e-12, "{} vs {}", a, b);
        }
    }

    #[test]
    fn step_leaves_rows_past_the_window() {
        let scale = Scale { a: 3.0, b: 0.0 };
        let mut oh = OptimizedHamiltonian::new(ring(9), MatrixFormat::Ell, false);
        let matrix = oh.optimize_for(&Indices::diagonal(0), scale).matrix().clone();
        let x = vec![Complex64::new(1.0, 0.0); 9];
        let mut y = vec![Complex64::new(7.0, 0.0); 9];
        step(&matrix, 5, &x, &mut y, Step::First);
        assert!(y[5..].iter().all(|&v| v == Complex64::new(7.0, 0.0)));
        assert!(y[..5].iter().all(|&v| v != Complex64::new(7.0, 0.0)));
    }

    #[test]
    fn dot_conjugates_the_left_side() {
        let u = [Complex64::new(0.0, 1.0)];
        let v = [Complex64::new(0.0, 1.0)];
        assert_eq!(dot(&u, &v, 1), Complex64::new(1.0, 0.0));
    }
}
