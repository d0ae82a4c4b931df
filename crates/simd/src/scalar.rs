use crate::dispatch::Real;
use crate::ops::complex_mul;
use crate::vector::Vector;
use num_complex::{Complex, Complex64};
use std::fmt::Debug;
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};

/// Matrix and vector element: a real number or a complex pair of them.
///
/// The vector primitives are written once against this trait; each scalar
/// kind gets its own monomorphized copy, so hot loops never branch on the
/// element type at run time.
pub trait Scalar:
    Copy
    + Default
    + PartialEq
    + Debug
    + Send
    + Sync
    + 'static
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Neg<Output = Self>
    + AddAssign
    + SubAssign
{
    type Real: Real;

    /// Lanes one element occupies in a vector.
    const WIDTH: usize;
    const IS_COMPLEX: bool;

    fn zero() -> Self;
    fn one() -> Self;
    fn from_real(v: f64) -> Self;
    fn conj(self) -> Self;
    fn re(self) -> f64;
    fn im(self) -> f64;
    fn to_c64(self) -> Complex64;
    fn scale(self, factor: f64) -> Self;

    /// Interleaved lane view of a slice.
    fn as_reals(values: &[Self]) -> &[Self::Real];
    fn as_reals_mut(values: &mut [Self]) -> &mut [Self::Real];

    /// `a * b + c`, element-wise in this scalar's arithmetic.
    fn madd_rc<const N: usize>(
        a: Vector<Self::Real, N>,
        b: Vector<Self::Real, N>,
        c: Vector<Self::Real, N>,
    ) -> Vector<Self::Real, N>;

    /// Sum of all elements held in `v`.
    fn reduce<const N: usize>(v: Vector<Self::Real, N>) -> Self;
}

macro_rules! impl_real_scalar {
    ($t:ty) => {
        impl Scalar for $t {
            type Real = $t;

            const WIDTH: usize = 1;
            const IS_COMPLEX: bool = false;

            fn zero() -> Self {
                0.0
            }

            fn one() -> Self {
                1.0
            }

            #[inline]
            fn from_real(v: f64) -> Self {
                v as $t
            }

            #[inline]
            fn conj(self) -> Self {
                self
            }

            #[inline]
            fn re(self) -> f64 {
                self as f64
            }

            #[inline]
            fn im(self) -> f64 {
                0.0
            }

            fn to_c64(self) -> Complex64 {
                Complex64::new(self as f64, 0.0)
            }

            #[inline]
            fn scale(self, factor: f64) -> Self {
                self * factor as $t
            }

            fn as_reals(values: &[Self]) -> &[Self::Real] {
                values
            }

            fn as_reals_mut(values: &mut [Self]) -> &mut [Self::Real] {
                values
            }

            #[inline]
            fn madd_rc<const N: usize>(
                a: Vector<$t, N>,
                b: Vector<$t, N>,
                c: Vector<$t, N>,
            ) -> Vector<$t, N> {
                a * b + c
            }

            #[inline]
            fn reduce<const N: usize>(v: Vector<$t, N>) -> Self {
                v.sum()
            }
        }
    };
}

macro_rules! impl_complex_scalar {
    ($t:ty) => {
        impl Scalar for Complex<$t> {
            type Real = $t;

            const WIDTH: usize = 2;
            const IS_COMPLEX: bool = true;

            fn zero() -> Self {
                Complex::new(0.0, 0.0)
            }

            fn one() -> Self {
                Complex::new(1.0, 0.0)
            }

            #[inline]
            fn from_real(v: f64) -> Self {
                Complex::new(v as $t, 0.0)
            }

            #[inline]
            fn conj(self) -> Self {
                Complex::conj(&self)
            }

            #[inline]
            fn re(self) -> f64 {
                self.re as f64
            }

            #[inline]
            fn im(self) -> f64 {
                self.im as f64
            }

            fn to_c64(self) -> Complex64 {
                Complex64::new(self.re as f64, self.im as f64)
            }

            #[inline]
            fn scale(self, factor: f64) -> Self {
                self * factor as $t
            }

            fn as_reals(values: &[Self]) -> &[Self::Real] {
                bytemuck::cast_slice(values)
            }

            fn as_reals_mut(values: &mut [Self]) -> &mut [Self::Real] {
                bytemuck::cast_slice_mut(values)
            }

            #[inline]
            fn madd_rc<const N: usize>(
                a: Vector<$t, N>,
                b: Vector<$t, N>,
                c: Vector<$t, N>,
            ) -> Vector<$t, N> {
                complex_mul(a, b) + c
            }

            #[inline]
            fn reduce<const N: usize>(v: Vector<$t, N>) -> Self {
                let mut acc = Complex::new(0.0, 0.0);
                for pair in v.0.chunks_exact(2) {
                    acc.re += pair[0];
                    acc.im += pair[1];
                }
                acc
            }
        }
    };
}

impl_real_scalar!(f32);
impl_real_scalar!(f64);
impl_complex_scalar!(f32);
impl_complex_scalar!(f64);
