//! Short-vector arithmetic used by the Chebyshev recurrence.
//!
//! [`Vector`] models one register of lanes. The primitives that need lane
//! shuffles or scattered loads ([`gather`], [`addsub`]) go through a
//! [`Kernels`] table which is resolved once per process for the detected
//! [`IsaLevel`], with portable loops as the fallback. [`complex_mul`] and
//! [`madd_rc`] are built on top of them, so real and complex recurrences share
//! one code shape.

mod dispatch;
mod isa;
mod ops;
mod scalar;
mod split;
mod vector;
#[cfg(target_arch = "x86_64")]
mod x86;

pub use dispatch::{AddSubFn, GatherFn, Kernels, Real};
pub use isa::IsaLevel;
pub use ops::{addsub, base_lanes, complex_mul, gather, madd_rc, ALIGN_BYTES};
pub use scalar::Scalar;
pub use split::{split_loop, SplitLoop};
pub use vector::Vector;

/// Lanes per vector in the recurrence kernels: one 16-byte register for
/// `f32`, two for `f64`.
pub const LANES: usize = 4;
