use crate::dispatch::Real;
use crate::scalar::Scalar;
use crate::vector::Vector;

/// Natural alignment and size of one base register.
pub const ALIGN_BYTES: usize = 16;

/// Lanes of `T` in one base register.
pub const fn base_lanes<T>() -> usize {
    ALIGN_BYTES / std::mem::size_of::<T>()
}

/// Build a vector from `N / S::WIDTH` scattered elements of `data`.
///
/// Equivalent to `out[k] = data[indices[k]]` element-wise. Vectors wider than
/// one base register are assembled base register by base register; each one
/// consumes `base_lanes / S::WIDTH` indices.
#[inline]
pub fn gather<S: Scalar, const N: usize>(data: &[S], indices: &[usize]) -> Vector<S::Real, N> {
    let kernels = <S::Real as Real>::kernels();
    let kernel = if S::IS_COMPLEX {
        kernels.gather_pairs
    } else {
        kernels.gather
    };

    let reals = S::as_reals(data);
    let base = base_lanes::<S::Real>().min(N);
    let index_step = base / S::WIDTH;

    let mut out = Vector::<S::Real, N>::zero();
    for (lane, chunk) in out.0.chunks_mut(base).enumerate() {
        kernel(reals, &indices[lane * index_step..], chunk);
    }
    out
}

/// Even lanes `a - b`, odd lanes `a + b`.
#[inline]
pub fn addsub<T: Real, const N: usize>(a: Vector<T, N>, b: Vector<T, N>) -> Vector<T, N> {
    a.addsub(b)
}

/// Lane-pair complex product: (a + ib)(x + iy) = (ax - by) + i(ay + bx).
#[inline]
pub fn complex_mul<T: Real, const N: usize>(ab: Vector<T, N>, xy: Vector<T, N>) -> Vector<T, N> {
    let axay = ab.permute2::<0, 0>() * xy;
    let bybx = ab.permute2::<1, 1>() * xy.permute2::<1, 0>();
    axay.addsub(bybx)
}

/// `a * b + c` for real or complex `S`, picked at compile time.
#[inline]
pub fn madd_rc<S: Scalar, const N: usize>(
    a: Vector<S::Real, N>,
    b: Vector<S::Real, N>,
    c: Vector<S::Real, N>,
) -> Vector<S::Real, N> {
    S::madd_rc(a, b, c)
}
