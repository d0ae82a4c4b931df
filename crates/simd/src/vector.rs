use crate::dispatch::Real;
use std::ops::{Add, Mul, Neg, Sub};

/// `N` lanes of `T`, laid out like a hardware register.
///
/// Complex data is stored interleaved: lane `2k` is the real part and lane
/// `2k + 1` the imaginary part of element `k`.
#[derive(Clone, Copy, Debug, PartialEq)]
#[repr(C, align(16))]
pub struct Vector<T, const N: usize>(pub [T; N]);

impl<T: Real, const N: usize> Vector<T, N> {
    pub const LANES: usize = N;

    pub fn splat(v: T) -> Self {
        Self([v; N])
    }

    pub fn zero() -> Self {
        Self::splat(T::ZERO)
    }

    /// Unaligned load of the first `N` values of `src`.
    #[inline]
    pub fn load(src: &[T]) -> Self {
        let mut out = [T::ZERO; N];
        out.copy_from_slice(&src[..N]);
        Self(out)
    }

    #[inline]
    pub fn store(&self, dst: &mut [T]) {
        dst[..N].copy_from_slice(&self.0);
    }

    pub fn sum(&self) -> T {
        self.0.iter().fold(T::ZERO, |acc, &x| acc + x)
    }

    /// Within every lane pair, pick lane `I0` then lane `I1` of that pair.
    #[inline]
    pub fn permute2<const I0: usize, const I1: usize>(self) -> Self {
        let mut out = self.0;
        for p in (0..N).step_by(2) {
            out[p] = self.0[p + I0];
            out[p + 1] = self.0[p + I1];
        }
        Self(out)
    }

    /// Even lanes `self - other`, odd lanes `self + other`.
    #[inline]
    pub fn addsub(self, other: Self) -> Self {
        let mut out = Self::zero();
        (T::kernels().addsub)(&self.0, &other.0, &mut out.0);
        out
    }
}

impl<T: Real, const N: usize> Add for Vector<T, N> {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self(std::array::from_fn(|i| self.0[i] + rhs.0[i]))
    }
}

impl<T: Real, const N: usize> Sub for Vector<T, N> {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self(std::array::from_fn(|i| self.0[i] - rhs.0[i]))
    }
}

impl<T: Real, const N: usize> Mul for Vector<T, N> {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: Self) -> Self {
        Self(std::array::from_fn(|i| self.0[i] * rhs.0[i]))
    }
}

impl<T: Real, const N: usize> Neg for Vector<T, N> {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Self(std::array::from_fn(|i| -self.0[i]))
    }
}
