use simd::{gather, madd_rc, split_loop, Real, Scalar, Vector, LANES};
use sparse::EllMatrix;

use super::Step;

/// Product vectorized across rows: one vector holds `LANES / WIDTH`
/// consecutive rows and walks the slots together.
pub(super) fn step<S: Scalar>(m: &EllMatrix<S>, rows: usize, x: &[S], y: &mut [S], kind: Step) {
    let per_vector = LANES / S::WIDTH;
    let split = split_loop(y, 0, rows, per_vector);

    for i in split.peel().chain(split.remainder()) {
        y[i] = kind.combine(row_product(m, i, x), y[i]);
    }

    let half = Vector::<S::Real, LANES>::splat(<S::Real as Real>::from_f64(0.5));
    for i in split.vectorized() {
        let mut acc = Vector::<S::Real, LANES>::zero();
        for slot in 0..m.width() {
            let o = m.offset(i, slot);
            let a = Vector::load(S::as_reals(&m.values()[o..o + per_vector]));
            let b = gather::<S, LANES>(x, &m.indices()[o..o + per_vector]);
            acc = madd_rc::<S, LANES>(a, b, acc);
        }

        let out = S::as_reals_mut(&mut y[i..i + per_vector]);
        let result = match kind {
            Step::First => acc * half,
            Step::Next => acc - Vector::load(out),
        };
        result.store(out);
    }
}

fn row_product<S: Scalar>(m: &EllMatrix<S>, row: usize, x: &[S]) -> S {
    (0..m.width()).fold(S::zero(), |acc, slot| {
        let o = m.offset(row, slot);
        acc + m.values()[o] * x[m.indices()[o]]
    })
}
