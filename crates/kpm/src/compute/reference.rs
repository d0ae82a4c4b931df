use simd::Scalar;

use super::{dot, MomentsBackend, Step};
use crate::moments::{DiagonalMoments, OffDiagonalMoments};
use crate::optimized::{Optimized, OptimizedMatrix};

/// Plain scalar recurrence over the whole matrix, one moment per step.
///
/// No windows, no doubling, no vector kernels: slow, but easy to trust.
#[derive(Clone, Copy, Debug, Default)]
pub struct Reference;

impl MomentsBackend for Reference {
    const NAME: &'static str = "reference";

    fn diagonal<S: Scalar>(
        oh: &Optimized<S>,
        starter: &[S],
        num_moments: usize,
        _optimal_size: bool,
    ) -> DiagonalMoments<S> {
        let size = oh.size();
        let mut moments = vec![S::zero(); num_moments];
        recurrence(oh.matrix(), starter, num_moments, |n, r| {
            moments[n] = dot(starter, r, size)
        });
        DiagonalMoments::from_vec(moments)
    }

    fn off_diagonal<S: Scalar>(
        oh: &Optimized<S>,
        starter: &[S],
        num_moments: usize,
        _optimal_size: bool,
    ) -> OffDiagonalMoments<S> {
        let mut moments = OffDiagonalMoments::new(num_moments, &oh.idx().cols);
        recurrence(oh.matrix(), starter, num_moments, |n, r| moments.collect(n, r));
        moments
    }
}

fn recurrence<S: Scalar>(
    matrix: &OptimizedMatrix<S>,
    starter: &[S],
    num_moments: usize,
    mut visit: impl FnMut(usize, &[S]),
) {
    let size = matrix.rows();
    let mut r0 = starter.to_vec();
    let mut r1 = vec![S::zero(); size];
    let mut hx = vec![S::zero(); size];

    if num_moments == 0 {
        return;
    }
    visit(0, &r0);
    if num_moments == 1 {
        return;
    }

    matvec(matrix, &r0, &mut hx);
    for (r, &h) in r1.iter_mut().zip(&hx) {
        *r = Step::First.combine(h, *r);
    }
    visit(1, &r1);

    for n in 2..num_moments {
        matvec(matrix, &r1, &mut hx);
        for (r, &h) in r0.iter_mut().zip(&hx) {
            *r = Step::Next.combine(h, *r);
        }
        std::mem::swap(&mut r0, &mut r1);
        visit(n, &r1);
    }
}

fn matvec<S: Scalar>(matrix: &OptimizedMatrix<S>, x: &[S], y: &mut [S]) {
    match matrix {
        OptimizedMatrix::Csr(m) => m.matvec(x, y),
        OptimizedMatrix::Ell(m) => {
            for (row, out) in y.iter_mut().enumerate() {
                *out = (0..m.width()).fold(S::zero(), |acc, slot| {
                    let o = m.offset(row, slot);
                    acc + m.values()[o] * x[m.indices()[o]]
                });
            }
        }
    }
}
