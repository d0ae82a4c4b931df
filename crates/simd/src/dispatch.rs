use crate::isa::IsaLevel;
use std::fmt::Debug;
use std::ops::{Add, AddAssign, Mul, Neg, Sub};
use std::sync::OnceLock;

/// `out[i] = a[i] - b[i]` for even `i`, `a[i] + b[i]` for odd `i`.
pub type AddSubFn<T> = fn(a: &[T], b: &[T], out: &mut [T]);

/// Fill `out` from scattered positions of `data`.
///
/// For the plain form `out[k] = data[indices[k]]`. For the pair form `data`
/// is the interleaved view of a complex array and every index moves two
/// lanes: `out[2k..2k + 2] = data[2 * indices[k]..2 * indices[k] + 2]`.
pub type GatherFn<T> = fn(data: &[T], indices: &[usize], out: &mut [T]);

/// Kernel table for one element type, resolved for one ISA level.
#[derive(Clone, Copy, Debug)]
pub struct Kernels<T: 'static> {
    pub isa: IsaLevel,
    pub addsub: AddSubFn<T>,
    pub gather: GatherFn<T>,
    pub gather_pairs: GatherFn<T>,
}

impl<T: Real> Kernels<T> {
    pub fn portable() -> Self {
        Self {
            isa: IsaLevel::Portable,
            addsub: portable::addsub::<T>,
            gather: portable::gather::<T>,
            gather_pairs: portable::gather_pairs::<T>,
        }
    }
}

/// Lane element type: `f32` or `f64`.
pub trait Real:
    Copy
    + Default
    + PartialEq
    + PartialOrd
    + Debug
    + Send
    + Sync
    + 'static
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Neg<Output = Self>
    + AddAssign
    + bytemuck::Pod
{
    const ZERO: Self;
    const ONE: Self;

    fn from_f64(v: f64) -> Self;
    fn to_f64(self) -> f64;

    /// Kernel table for `level`, capped at what the CPU supports.
    fn resolve(level: IsaLevel) -> Kernels<Self>;

    /// Process-wide table for [`IsaLevel::detect`].
    fn kernels() -> &'static Kernels<Self>;
}

impl Real for f32 {
    const ZERO: Self = 0.0;
    const ONE: Self = 1.0;

    #[inline]
    fn from_f64(v: f64) -> Self {
        v as f32
    }

    #[inline]
    fn to_f64(self) -> f64 {
        self as f64
    }

    fn resolve(level: IsaLevel) -> Kernels<Self> {
        let level = level.min(IsaLevel::detect());
        #[allow(unused_mut)]
        let mut table = Kernels {
            isa: level,
            ..Kernels::portable()
        };

        #[cfg(target_arch = "x86_64")]
        {
            use crate::x86;
            if level >= IsaLevel::Sse2 {
                table.gather = x86::gather_ps_sse2;
                table.gather_pairs = x86::gather_pairs_ps_sse2;
            }
            if level >= IsaLevel::Sse3 {
                table.addsub = x86::addsub_ps_sse3;
            }
            if level >= IsaLevel::Avx {
                table.addsub = x86::addsub_ps_avx;
            }
        }

        table
    }

    fn kernels() -> &'static Kernels<Self> {
        static TABLE: OnceLock<Kernels<f32>> = OnceLock::new();
        TABLE.get_or_init(|| Self::resolve(IsaLevel::detect()))
    }
}

impl Real for f64 {
    const ZERO: Self = 0.0;
    const ONE: Self = 1.0;

    #[inline]
    fn from_f64(v: f64) -> Self {
        v
    }

    #[inline]
    fn to_f64(self) -> f64 {
        self
    }

    fn resolve(level: IsaLevel) -> Kernels<Self> {
        let level = level.min(IsaLevel::detect());
        #[allow(unused_mut)]
        let mut table = Kernels {
            isa: level,
            ..Kernels::portable()
        };

        #[cfg(target_arch = "x86_64")]
        {
            use crate::x86;
            if level >= IsaLevel::Sse2 {
                table.gather = x86::gather_pd_sse2;
                table.gather_pairs = x86::gather_pairs_pd_sse2;
            }
            if level >= IsaLevel::Sse3 {
                table.addsub = x86::addsub_pd_sse3;
            }
            if level >= IsaLevel::Avx {
                table.addsub = x86::addsub_pd_avx;
            }
        }

        table
    }

    fn kernels() -> &'static Kernels<Self> {
        static TABLE: OnceLock<Kernels<f64>> = OnceLock::new();
        TABLE.get_or_init(|| Self::resolve(IsaLevel::detect()))
    }
}

/// Fallbacks used when no specialized kernel exists. They also handle the
/// tails the specialized kernels leave behind.
pub(crate) mod portable {
    use super::Real;

    /// Negate `b`, shuffle even lanes from `-b` and odd lanes from `b`, add.
    pub fn addsub<T: Real>(a: &[T], b: &[T], out: &mut [T]) {
        for (i, o) in out.iter_mut().enumerate() {
            let shuffled = if i % 2 == 0 { -b[i] } else { b[i] };
            *o = a[i] + shuffled;
        }
    }

    pub fn gather<T: Real>(data: &[T], indices: &[usize], out: &mut [T]) {
        for (o, &i) in out.iter_mut().zip(indices) {
            *o = data[i];
        }
    }

    pub fn gather_pairs<T: Real>(data: &[T], indices: &[usize], out: &mut [T]) {
        for (pair, &i) in out.chunks_exact_mut(2).zip(indices) {
            pair[0] = data[2 * i];
            pair[1] = data[2 * i + 1];
        }
    }
}
