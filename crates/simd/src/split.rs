use crate::ops::ALIGN_BYTES;
use std::iter::StepBy;
use std::ops::Range;

/// A loop over `[start, end)` cut into three parts:
///
///   1. peel `[start, peel_end)`: scalar, until the data is aligned
///   2. vector `[peel_end, vec_end)`: whole vectors of `step` elements
///   3. remainder `[vec_end, end)`: scalar, fewer than `step` elements
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SplitLoop {
    pub start: usize,
    pub peel_end: usize,
    pub vec_end: usize,
    pub end: usize,
    pub step: usize,
}

impl SplitLoop {
    pub fn peel(&self) -> Range<usize> {
        self.start..self.peel_end
    }

    /// Start index of every vector iteration.
    pub fn vectorized(&self) -> StepBy<Range<usize>> {
        (self.peel_end..self.vec_end).step_by(self.step)
    }

    pub fn remainder(&self) -> Range<usize> {
        self.vec_end..self.end
    }
}

/// Split `[start, end)` of `data` so the vector part starts on an
/// [`ALIGN_BYTES`] boundary.
///
/// When no element of the first `step` is aligned (e.g. 16-byte elements in an
/// 8-byte aligned allocation) alignment cannot be reached at all; the peel is
/// then empty and the vector part relies on unaligned loads.
pub fn split_loop<S>(data: &[S], start: usize, end: usize, step: usize) -> SplitLoop {
    assert!(step > 0, "split_loop step must be > 0");
    assert!(start <= end && end <= data.len(), "split_loop range out of bounds");

    let base = data.as_ptr() as usize;
    let size = std::mem::size_of::<S>();
    let is_aligned = |i: usize| (base + i * size) % ALIGN_BYTES == 0;

    let peel_end = match (start..start + step).find(|&i| is_aligned(i)) {
        Some(i) => i.min(end),
        None => start,
    };
    let vec_end = peel_end + (end - peel_end) / step * step;

    SplitLoop {
        start,
        peel_end,
        vec_end,
        end,
        step,
    }
}
