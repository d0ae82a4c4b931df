//! Raw Chebyshev moments as the recurrence produces them.

use simd::Scalar;

/// `μ_n = <r_0| T_n(H̃) |r_0>` for one starter.
///
/// Filled two moments per recurrence step from
/// `μ_2n = 2 <r_n|r_n> - μ_0` and `μ_2n+1 = 2 <r_n+1|r_n> - μ_1`.
#[derive(Clone, Debug, PartialEq)]
pub struct DiagonalMoments<S> {
    data: Vec<S>,
}

impl<S: Scalar> DiagonalMoments<S> {
    pub fn new(num_moments: usize) -> Self {
        Self {
            data: vec![S::zero(); num_moments],
        }
    }

    pub fn from_vec(data: Vec<S>) -> Self {
        Self { data }
    }

    pub fn num_moments(&self) -> usize {
        self.data.len()
    }

    pub fn get(&self) -> &[S] {
        &self.data
    }

    pub fn get_mut(&mut self) -> &mut [S] {
        &mut self.data
    }

    pub fn into_vec(self) -> Vec<S> {
        self.data
    }

    /// `μ_0 = <r_0|r_0>`, `μ_1 = <r_0|r_1>`.
    pub fn collect_initial(&mut self, m0: S, m1: S) {
        self.set(0, m0);
        self.set(1, m1);
    }

    /// `μ_2n` from `<r_n|r_n>`.
    pub fn collect_even(&mut self, n: usize, rn_rn: S) {
        let m0 = self.data[0];
        self.set(2 * n, rn_rn + rn_rn - m0);
    }

    /// `μ_2n+1` from `<r_n+1|r_n>`.
    pub fn collect_odd(&mut self, n: usize, rn1_rn: S) {
        let m1 = self.data[1];
        self.set(2 * n + 1, rn1_rn + rn1_rn - m1);
    }

    fn set(&mut self, i: usize, value: S) {
        if let Some(slot) = self.data.get_mut(i) {
            *slot = value;
        }
    }
}

/// `μ_n^(k) = <col_k| T_n(H̃) |r_0>`: one sequence per target column.
#[derive(Clone, Debug, PartialEq)]
pub struct OffDiagonalMoments<S> {
    cols: Vec<usize>,
    data: Vec<Vec<S>>,
}

impl<S: Scalar> OffDiagonalMoments<S> {
    /// `cols` are positions in the vectors the recurrence produces.
    pub fn new(num_moments: usize, cols: &[usize]) -> Self {
        Self {
            cols: cols.to_vec(),
            data: vec![vec![S::zero(); num_moments]; cols.len()],
        }
    }

    pub fn num_moments(&self) -> usize {
        self.data.first().map_or(0, Vec::len)
    }

    pub fn get(&self) -> &[Vec<S>] {
        &self.data
    }

    pub fn get_mut(&mut self) -> &mut [Vec<S>] {
        &mut self.data
    }

    pub fn into_vec(self) -> Vec<Vec<S>> {
        self.data
    }

    /// Record moment `n` from the `n`-th Chebyshev vector.
    pub fn collect(&mut self, n: usize, r: &[S]) {
        for (&col, moments) in self.cols.iter().zip(self.data.iter_mut()) {
            moments[n] = r[col];
        }
    }
}
