use simd::{gather, madd_rc, split_loop, Scalar, Vector, LANES};
use sparse::SparseMatrix;

use super::Step;

/// Row-by-row product, vectorized along the nonzeros of each row.
pub(super) fn step<S: Scalar>(
    m: &SparseMatrix<S>,
    rows: usize,
    x: &[S],
    y: &mut [S],
    kind: Step,
) {
    let per_vector = LANES / S::WIDTH;
    let indptr = m.indptr();
    let indices = m.indices();
    let values = m.values();

    for (i, out) in y[..rows].iter_mut().enumerate() {
        let split = split_loop(values, indptr[i], indptr[i + 1], per_vector);

        let mut acc = S::zero();
        for k in split.peel() {
            acc += values[k] * x[indices[k]];
        }

        let mut lanes = Vector::<S::Real, LANES>::zero();
        for k in split.vectorized() {
            let a = Vector::load(S::as_reals(&values[k..k + per_vector]));
            let b = gather::<S, LANES>(x, &indices[k..k + per_vector]);
            lanes = madd_rc::<S, LANES>(a, b, lanes);
        }
        acc += S::reduce(lanes);

        for k in split.remainder() {
            acc += values[k] * x[indices[k]];
        }

        *out = kind.combine(acc, *out);
    }
}
