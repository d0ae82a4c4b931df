use crate::permutation::Permutation;
use simd::Scalar;

/// Compressed sparse row matrix.
///
/// Column indices are sorted within each row and duplicates are summed on
/// construction.
#[derive(Clone, Debug, PartialEq)]
pub struct SparseMatrix<S> {
    rows: usize,
    cols: usize,
    indptr: Vec<usize>,
    indices: Vec<usize>,
    values: Vec<S>,
}

impl<S: Scalar> SparseMatrix<S> {
    pub fn from_triplets<I>(rows: usize, cols: usize, triplets: I) -> Self
    where
        I: IntoIterator<Item = (usize, usize, S)>,
    {
        let mut entries: Vec<(usize, usize, S)> = triplets.into_iter().collect();
        for &(r, c, _) in &entries {
            assert!(r < rows && c < cols, "entry ({}, {}) outside {}x{}", r, c, rows, cols);
        }
        entries.sort_by(|a, b| (a.0, a.1).cmp(&(b.0, b.1)));

        let mut indptr = vec![0usize; rows + 1];
        let mut indices = Vec::with_capacity(entries.len());
        let mut values: Vec<S> = Vec::with_capacity(entries.len());
        let mut last: Option<(usize, usize)> = None;

        for (r, c, v) in entries {
            if last == Some((r, c)) {
                if let Some(prev) = values.last_mut() {
                    *prev += v;
                }
                continue;
            }
            indices.push(c);
            values.push(v);
            indptr[r + 1] += 1;
            last = Some((r, c));
        }
        for r in 0..rows {
            indptr[r + 1] += indptr[r];
        }

        Self {
            rows,
            cols,
            indptr,
            indices,
            values,
        }
    }

    pub fn from_diagonal(diagonal: &[S]) -> Self {
        let n = diagonal.len();
        Self::from_triplets(n, n, diagonal.iter().enumerate().map(|(i, &v)| (i, i, v)))
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn is_square(&self) -> bool {
        self.rows == self.cols
    }

    pub fn nnz(&self) -> usize {
        self.values.len()
    }

    pub fn indptr(&self) -> &[usize] {
        &self.indptr
    }

    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn values(&self) -> &[S] {
        &self.values
    }

    /// Column indices and values of row `i`.
    #[inline]
    pub fn row(&self, i: usize) -> (&[usize], &[S]) {
        let range = self.indptr[i]..self.indptr[i + 1];
        (&self.indices[range.clone()], &self.values[range])
    }

    /// Number of stored elements in rows `0..n`.
    pub fn nnz_upto(&self, n: usize) -> usize {
        self.indptr[n.min(self.rows)]
    }

    pub fn max_row_nnz(&self) -> usize {
        self.indptr.windows(2).map(|w| w[1] - w[0]).max().unwrap_or(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, S)> + '_ {
        (0..self.rows).flat_map(move |r| {
            let (cols, vals) = self.row(r);
            cols.iter().zip(vals).map(move |(&c, &v)| (r, c, v))
        })
    }

    /// `y = A x`
    pub fn matvec(&self, x: &[S], y: &mut [S]) {
        assert_eq!(x.len(), self.cols, "matvec: x has wrong length");
        assert_eq!(y.len(), self.rows, "matvec: y has wrong length");
        for (i, out) in y.iter_mut().enumerate() {
            let (cols, vals) = self.row(i);
            let mut acc = S::zero();
            for (&c, &v) in cols.iter().zip(vals) {
                acc += v * x[c];
            }
            *out = acc;
        }
    }

    /// Symmetric reordering `P A Pᵀ`: entry `(i, j)` moves to
    /// `(perm.new_index(i), perm.new_index(j))`.
    pub fn permuted(&self, perm: &Permutation) -> Self {
        assert!(self.is_square(), "only square matrices can be permuted");
        assert_eq!(perm.len(), self.rows, "permutation size mismatch");
        Self::from_triplets(
            self.rows,
            self.cols,
            self.iter()
                .map(|(r, c, v)| (perm.new_index(r), perm.new_index(c), v)),
        )
    }

    /// `(A - shift·I) · factor`, adding diagonal entries where missing.
    pub fn shifted_scaled(&self, shift: f64, factor: f64) -> Self {
        assert!(self.is_square(), "only square matrices can be shifted");
        let diagonal = (0..self.rows)
            .filter(|_| shift != 0.0)
            .map(|i| (i, i, S::from_real(-shift)));
        Self::from_triplets(
            self.rows,
            self.cols,
            self.iter()
                .chain(diagonal)
                .map(|(r, c, v)| (r, c, v.scale(factor))),
        )
    }

    /// Largest deviation from `A = Aᴴ`.
    pub fn hermiticity_error(&self) -> f64 {
        let mut worst = 0.0f64;
        for (r, c, v) in self.iter() {
            let (cols, vals) = self.row(c);
            let mirror = match cols.binary_search(&r) {
                Ok(k) => vals[k].conj(),
                Err(_) => S::zero(),
            };
            worst = worst.max((v - mirror).to_c64().norm());
        }
        worst
    }

    pub fn memory_bytes(&self) -> usize {
        self.values.len() * std::mem::size_of::<S>()
            + (self.indices.len() + self.indptr.len()) * std::mem::size_of::<usize>()
    }
}
