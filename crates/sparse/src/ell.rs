use crate::csr::SparseMatrix;
use simd::Scalar;

/// ELLPACK storage: every row padded to the same number of slots.
///
/// Slots are stored slot-major (`slot * stride + row`) so consecutive rows of
/// one slot are contiguous and load straight into vector lanes. `stride` is
/// the row count rounded up to a multiple of the lane group, which keeps every
/// slot column at the same alignment. Padding slots hold a zero value and
/// point at their own row.
#[derive(Clone, Debug, PartialEq)]
pub struct EllMatrix<S> {
    rows: usize,
    width: usize,
    stride: usize,
    indices: Vec<usize>,
    values: Vec<S>,
    nnz: usize,
}

impl<S: Scalar> EllMatrix<S> {
    pub fn from_csr(csr: &SparseMatrix<S>, row_multiple: usize) -> Self {
        let rows = csr.rows();
        let width = csr.max_row_nnz();
        let multiple = row_multiple.max(1);
        let stride = rows.div_ceil(multiple) * multiple;

        let mut indices = vec![0usize; width * stride];
        let mut values = vec![S::zero(); width * stride];
        for row in 0..stride {
            for slot in 0..width {
                indices[slot * stride + row] = row.min(rows.saturating_sub(1));
            }
        }
        for row in 0..rows {
            let (cols, vals) = csr.row(row);
            for (slot, (&c, &v)) in cols.iter().zip(vals).enumerate() {
                indices[slot * stride + row] = c;
                values[slot * stride + row] = v;
            }
        }

        Self {
            rows,
            width,
            stride,
            indices,
            values,
            nnz: csr.nnz(),
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Slots per row.
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Stored nonzeros, excluding padding.
    pub fn nnz(&self) -> usize {
        self.nnz
    }

    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn values(&self) -> &[S] {
        &self.values
    }

    /// Slot-major index of `(row, slot)`.
    #[inline]
    pub fn offset(&self, row: usize, slot: usize) -> usize {
        slot * self.stride + row
    }

    pub fn memory_bytes(&self) -> usize {
        self.values.len() * std::mem::size_of::<S>()
            + self.indices.len() * std::mem::size_of::<usize>()
    }
}
