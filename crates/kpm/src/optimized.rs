//! The Hamiltonian as the recurrence sees it.
//!
//! For a query targeting `row`, the sites are reordered breadth first from
//! `row`, so that after `n` recurrence steps only the first `offsets[n]` rows
//! can hold nonzero values. The recurrence then runs on a growing window
//! instead of the whole matrix and, for off-diagonal queries, on a shrinking
//! one near the end, where rows far from every target column can no longer
//! influence the remaining moments.
//!
//! The reordered matrix is also shifted and scaled: the stored matrix is
//! `2 (H - b) / a`, i.e. twice the Chebyshev argument, which turns the
//! three-term recurrence into a single multiply-subtract per step.

use simd::{Scalar, LANES};
use sparse::{EllMatrix, Permutation, SparseMatrix};
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

use crate::bounds::Scale;
use crate::config::MatrixFormat;

/// Target of a query: the starter row and the columns to project onto.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Indices {
    pub row: usize,
    pub cols: Vec<usize>,
}

impl Indices {
    pub fn new(row: usize, cols: Vec<usize>) -> Self {
        Self { row, cols }
    }

    pub fn diagonal(index: usize) -> Self {
        Self {
            row: index,
            cols: vec![index],
        }
    }

    pub fn is_diagonal(&self) -> bool {
        self.cols.len() == 1 && self.cols[0] == self.row
    }
}

/// Hop-distance layering of the reordered sites.
///
/// `offsets[d]` is the number of sites at most `d` hops from the target row.
/// Sites the row cannot reach are ordered after `offsets.last()`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SliceMap {
    offsets: Vec<usize>,
    /// Deepest layer holding a target column.
    col_depth: usize,
}

impl SliceMap {
    /// Single layer covering every site; no windowing.
    pub fn full(size: usize) -> Self {
        Self {
            offsets: vec![size],
            col_depth: 0,
        }
    }

    pub fn offsets(&self) -> &[usize] {
        &self.offsets
    }

    pub fn col_depth(&self) -> usize {
        self.col_depth
    }

    fn last(&self) -> usize {
        self.offsets.len() - 1
    }

    /// Rows that can be nonzero in the `n`-th Chebyshev vector.
    pub fn growing(&self, n: usize) -> usize {
        self.offsets[n.min(self.last())]
    }

    /// Rows of the `n`-th vector that still matter when only the projections
    /// onto the target columns of the first `num_moments` vectors are kept.
    pub fn growing_then_shrinking(&self, n: usize, num_moments: usize) -> usize {
        let remaining = num_moments.saturating_sub(n + 1) + self.col_depth;
        self.offsets[n.min(remaining).min(self.last())]
    }
}

/// Storage used by the recurrence kernels.
#[derive(Clone, Debug, PartialEq)]
pub enum OptimizedMatrix<S> {
    Csr(SparseMatrix<S>),
    Ell(EllMatrix<S>),
}

impl<S: Scalar> OptimizedMatrix<S> {
    pub fn rows(&self) -> usize {
        match self {
            OptimizedMatrix::Csr(m) => m.rows(),
            OptimizedMatrix::Ell(m) => m.rows(),
        }
    }

    pub fn nnz(&self) -> usize {
        match self {
            OptimizedMatrix::Csr(m) => m.nnz(),
            OptimizedMatrix::Ell(m) => m.nnz(),
        }
    }

    /// Elements a product restricted to the first `rows` rows touches.
    pub fn nnz_upto(&self, rows: usize) -> usize {
        match self {
            OptimizedMatrix::Csr(m) => m.nnz_upto(rows),
            OptimizedMatrix::Ell(m) => rows.min(m.rows()) * m.width(),
        }
    }

    pub fn memory_bytes(&self) -> usize {
        match self {
            OptimizedMatrix::Csr(m) => m.memory_bytes(),
            OptimizedMatrix::Ell(m) => m.memory_bytes(),
        }
    }
}

/// One query's view of the Hamiltonian.
#[derive(Clone, Debug)]
pub struct Optimized<S> {
    matrix: OptimizedMatrix<S>,
    requested: Indices,
    idx: Indices,
    scale: Scale,
    map: SliceMap,
    windowed: bool,
    build_time: Duration,
}

impl<S: Scalar> Optimized<S> {
    pub fn matrix(&self) -> &OptimizedMatrix<S> {
        &self.matrix
    }

    /// Target indices in the reordered basis.
    pub fn idx(&self) -> &Indices {
        &self.idx
    }

    pub fn scale(&self) -> Scale {
        self.scale
    }

    pub fn map(&self) -> &SliceMap {
        &self.map
    }

    pub fn size(&self) -> usize {
        self.matrix.rows()
    }

    pub fn build_time(&self) -> Duration {
        self.build_time
    }

    /// Whether the reordering supports windowed products.
    pub fn is_windowed(&self) -> bool {
        self.windowed
    }

    /// Active rows while computing the `n`-th Chebyshev vector of a diagonal
    /// query.
    pub fn diagonal_size(&self, n: usize, optimal_size: bool) -> usize {
        if optimal_size && self.windowed {
            self.map.growing(n)
        } else {
            self.size()
        }
    }

    /// Active rows while computing the `n`-th vector of an off-diagonal
    /// query expanded to `num_moments`.
    pub fn off_diagonal_size(&self, n: usize, num_moments: usize, optimal_size: bool) -> usize {
        if optimal_size && self.windowed {
            self.map.growing_then_shrinking(n, num_moments)
        } else {
            self.size()
        }
    }

    /// Matrix elements the windowed recurrence touches for `num_moments`.
    pub fn operations(&self, num_moments: usize, optimal_size: bool) -> u64 {
        let steps: Box<dyn Iterator<Item = usize>> = if self.idx.is_diagonal() {
            Box::new((1..=num_moments / 2).map(|n| self.diagonal_size(n, optimal_size)))
        } else {
            Box::new(
                (1..num_moments).map(|n| self.off_diagonal_size(n, num_moments, optimal_size)),
            )
        };
        steps.map(|rows| self.matrix.nnz_upto(rows) as u64).sum()
    }
}

/// Owner of the per-query reordered matrix, rebuilt only when the target
/// indices or the scale change.
#[derive(Clone, Debug)]
pub struct OptimizedHamiltonian<S> {
    original: Arc<SparseMatrix<S>>,
    format: MatrixFormat,
    reorder: bool,
    cache: Option<Optimized<S>>,
}

impl<S: Scalar> OptimizedHamiltonian<S> {
    pub fn new(original: Arc<SparseMatrix<S>>, format: MatrixFormat, reorder: bool) -> Self {
        Self {
            original,
            format,
            reorder,
            cache: None,
        }
    }

    pub fn format(&self) -> MatrixFormat {
        self.format
    }

    /// The last optimized view, if any query ran.
    pub fn current(&self) -> Option<&Optimized<S>> {
        self.cache.as_ref()
    }

    /// Rows a vector of the recurrence holds: one per site, padded for ELL.
    pub fn row_multiple() -> usize {
        (LANES / S::WIDTH).max(1)
    }

    /// Prepare the matrix for `idx` under `scale`.
    ///
    /// Indices must be in range; the strategy checks them.
    pub fn optimize_for(&mut self, idx: &Indices, scale: Scale) -> &Optimized<S> {
        let reusable = match &self.cache {
            Some(c) if c.scale == scale => c.requested == *idx || !self.reorder,
            _ => false,
        };

        if reusable {
            if let Some(c) = self.cache.as_mut() {
                if c.requested != *idx {
                    c.requested = idx.clone();
                    c.idx = idx.clone();
                }
            }
        } else {
            self.cache = Some(self.build(idx, scale));
        }

        match &self.cache {
            Some(c) => c,
            None => unreachable!("optimized matrix was just built"),
        }
    }

    fn build(&self, idx: &Indices, scale: Scale) -> Optimized<S> {
        let timer = Instant::now();
        let size = self.original.rows();

        let (perm, map) = if self.reorder {
            bfs_reorder(&self.original, idx)
        } else {
            (Permutation::identity(size), SliceMap::full(size))
        };

        let reordered = if self.reorder {
            self.original.permuted(&perm)
        } else {
            (*self.original).clone()
        };
        let scaled = reordered.shifted_scaled(scale.b, 2.0 / scale.a);

        let matrix = match self.format {
            MatrixFormat::Csr => OptimizedMatrix::Csr(scaled),
            MatrixFormat::Ell => OptimizedMatrix::Ell(EllMatrix::from_csr(&scaled, Self::row_multiple())),
        };

        let optimized_idx = Indices {
            row: perm.new_index(idx.row),
            cols: idx.cols.iter().map(|&c| perm.new_index(c)).collect(),
        };

        let build_time = timer.elapsed();
        debug!(
            row = idx.row,
            cols = idx.cols.len(),
            size,
            nnz = matrix.nnz(),
            layers = map.offsets().len(),
            format = ?self.format,
            "optimized hamiltonian rebuilt"
        );

        Optimized {
            matrix,
            requested: idx.clone(),
            idx: optimized_idx,
            scale,
            map,
            windowed: self.reorder,
            build_time,
        }
    }
}

/// Breadth-first ordering from `idx.row`; unreachable sites go last in their
/// original order.
fn bfs_reorder<S: Scalar>(h: &SparseMatrix<S>, idx: &Indices) -> (Permutation, SliceMap) {
    let size = h.rows();
    let mut depth = vec![usize::MAX; size];
    let mut order = Vec::with_capacity(size);
    let mut offsets = Vec::new();
    let mut queue = VecDeque::new();

    depth[idx.row] = 0;
    queue.push_back(idx.row);
    let mut current = 0;
    while let Some(site) = queue.pop_front() {
        if depth[site] != current {
            offsets.push(order.len());
            current = depth[site];
        }
        order.push(site);
        let (neighbors, _) = h.row(site);
        for &n in neighbors {
            if depth[n] == usize::MAX {
                depth[n] = depth[site] + 1;
                queue.push_back(n);
            }
        }
    }
    offsets.push(order.len());
    order.extend((0..size).filter(|&i| depth[i] == usize::MAX));

    let col_depth = idx
        .cols
        .iter()
        .map(|&c| depth[c])
        .filter(|&d| d != usize::MAX)
        .max()
        .unwrap_or(0);

    (
        Permutation::from_order(order),
        SliceMap { offsets, col_depth },
    )
}
