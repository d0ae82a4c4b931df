//! Query orchestration: bounds, optimization, recurrence, damping and
//! reconstruction for one Hamiltonian.

use num_complex::Complex64;
use rayon::prelude::*;
use rng::SeedRng;
use simd::Scalar;
use sparse::{Hamiltonian, MatrixScalar, ScalarKind, SparseMatrix};
use std::fmt::Debug;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::bounds::{Bounds, Scale};
use crate::compute::{Cpu, MomentsBackend};
use crate::config::Config;
use crate::error::{KpmError, Result};
use crate::optimized::{Indices, Optimized, OptimizedHamiltonian};
use crate::reconstruct::{reconstruct, reconstruct_greens, scaled_energy};
use crate::starters::{exval_starter, random_starter};
use crate::stats::{pretty_duration, Stats};

/// Largest `|H - Hᴴ|` entry tolerated without a warning.
const HERMITICITY_TOLERANCE: f64 = 1e-6;

/// Scalar-independent face of a [`Strategy`].
pub trait Kpm: Debug + Send {
    fn kind(&self) -> ScalarKind;

    /// Local density of states at site `index`.
    fn ldos(&mut self, index: usize, energy: &[f64], broadening: f64) -> Result<Vec<f64>>;

    /// Green's function element `G(row, col)`.
    fn greens(
        &mut self,
        row: usize,
        col: usize,
        energy: &[f64],
        broadening: f64,
    ) -> Result<Vec<Complex64>>;

    /// `G(row, col)` for every entry of `cols`, in order. `cols` must not be
    /// empty.
    fn greens_vector(
        &mut self,
        row: usize,
        cols: &[usize],
        energy: &[f64],
        broadening: f64,
    ) -> Result<Vec<Vec<Complex64>>>;

    /// Total density of states from `num_random` random starters.
    fn dos(&mut self, energy: &[f64], broadening: f64) -> Result<Vec<f64>>;

    /// Swap in a Hamiltonian of the same scalar kind. Returns `false` and
    /// keeps the current state otherwise.
    fn change_hamiltonian(&mut self, h: &Hamiltonian) -> bool;

    fn report(&self, shortform: bool) -> String;

    fn bounds(&self) -> &Bounds;
    fn stats(&self) -> &Stats;
    fn config(&self) -> &Config;
}

/// KPM calculations on one Hamiltonian with scalar `S`, producing moments
/// with backend `B`.
#[derive(Debug)]
pub struct Strategy<S, B = Cpu> {
    hamiltonian: Arc<SparseMatrix<S>>,
    config: Config,
    bounds: Bounds,
    optimized: OptimizedHamiltonian<S>,
    stats: Stats,
    backend: PhantomData<B>,
}

impl<S: MatrixScalar, B: MomentsBackend> Strategy<S, B> {
    pub fn new(hamiltonian: impl Into<Arc<SparseMatrix<S>>>, config: Config) -> Result<Self> {
        let hamiltonian = hamiltonian.into();
        config.validate()?;
        check_hamiltonian(&hamiltonian)?;

        let bounds = Bounds::from_config(&hamiltonian, &config)?;
        let optimized = OptimizedHamiltonian::new(
            Arc::clone(&hamiltonian),
            config.matrix_format,
            config.algorithm.reorder,
        );
        debug!(
            kind = %S::KIND,
            size = hamiltonian.rows(),
            nnz = hamiltonian.nnz(),
            backend = B::NAME,
            min = bounds.min(),
            max = bounds.max(),
            "kpm strategy ready"
        );

        Ok(Self {
            hamiltonian,
            config,
            bounds,
            optimized,
            stats: Stats::default(),
            backend: PhantomData,
        })
    }

    /// Build from a shared handle, which must hold `S`.
    pub fn from_hamiltonian(h: &Hamiltonian, config: Config) -> Result<Self> {
        let matrix = h.get::<S>().ok_or(KpmError::ScalarMismatch {
            expected: S::KIND,
            found: h.kind(),
        })?;
        Self::new(matrix, config)
    }

    pub fn hamiltonian(&self) -> &Arc<SparseMatrix<S>> {
        &self.hamiltonian
    }

    /// Scale and moment count for a query at `broadening`.
    fn prepare(&self, energy: &[f64], broadening: f64) -> Result<(Scale, usize)> {
        if !(broadening > 0.0 && broadening.is_finite()) {
            return Err(KpmError::InvalidBroadening(broadening));
        }
        let scale = self.bounds.scaling_factors();
        for &e in energy {
            scaled_energy(e, scale, self.config.domain)?;
        }
        let num_moments = self
            .config
            .kernel
            .required_num_moments(broadening / scale.a)
            .map_err(|_| KpmError::InvalidBroadening(broadening))?;
        Ok((scale, num_moments))
    }

    fn check_index(&self, index: usize) -> Result<()> {
        let size = self.hamiltonian.rows();
        if index < size {
            Ok(())
        } else {
            Err(KpmError::IndexOutOfRange { index, size })
        }
    }
}

impl<S: MatrixScalar, B: MomentsBackend> Kpm for Strategy<S, B> {
    fn kind(&self) -> ScalarKind {
        S::KIND
    }

    fn ldos(&mut self, index: usize, energy: &[f64], broadening: f64) -> Result<Vec<f64>> {
        self.check_index(index)?;
        let (scale, num_moments) = self.prepare(energy, broadening)?;
        let optimal_size = self.config.algorithm.optimal_size;

        let oh = self.optimized.optimize_for(&Indices::diagonal(index), scale);
        self.stats = query_stats(oh, num_moments, optimal_size, 1);

        let timer = Instant::now();
        let starter = exval_starter::<S>(oh.size(), oh.idx().row);
        let mut moments = B::diagonal(oh, &starter, num_moments, optimal_size);
        self.stats.moments_time = timer.elapsed();

        let timer = Instant::now();
        self.config.kernel.apply(moments.get_mut());
        let real: Vec<f64> = moments.get().iter().map(|m| m.re()).collect();
        let result = reconstruct(&real, energy, scale, self.config.domain);
        self.stats.reconstruct_time = timer.elapsed();

        info!(index, num_moments, ops = self.stats.ops, "ldos");
        result
    }

    fn greens(
        &mut self,
        row: usize,
        col: usize,
        energy: &[f64],
        broadening: f64,
    ) -> Result<Vec<Complex64>> {
        let mut all = self.greens_vector(row, &[col], energy, broadening)?;
        Ok(all.swap_remove(0))
    }

    fn greens_vector(
        &mut self,
        row: usize,
        cols: &[usize],
        energy: &[f64],
        broadening: f64,
    ) -> Result<Vec<Vec<Complex64>>> {
        assert!(!cols.is_empty(), "greens_vector needs at least one column");
        self.check_index(row)?;
        for &col in cols {
            self.check_index(col)?;
        }
        let (scale, num_moments) = self.prepare(energy, broadening)?;
        let optimal_size = self.config.algorithm.optimal_size;
        let domain = self.config.domain;
        let kernel = self.config.kernel;

        let oh = self
            .optimized
            .optimize_for(&Indices::new(row, cols.to_vec()), scale);
        self.stats = query_stats(oh, num_moments, optimal_size, 1);
        let starter = exval_starter::<S>(oh.size(), oh.idx().row);

        let result = if oh.idx().is_diagonal() {
            let timer = Instant::now();
            let mut moments = B::diagonal(oh, &starter, num_moments, optimal_size);
            self.stats.moments_time = timer.elapsed();

            let timer = Instant::now();
            kernel.apply(moments.get_mut());
            let g = reconstruct_greens(moments.get(), energy, scale, domain);
            self.stats.reconstruct_time = timer.elapsed();
            g.map(|g| vec![g])
        } else {
            let timer = Instant::now();
            let mut moments = B::off_diagonal(oh, &starter, num_moments, optimal_size);
            self.stats.moments_time = timer.elapsed();

            let timer = Instant::now();
            for m in moments.get_mut() {
                kernel.apply(m);
            }
            let g = moments
                .get()
                .iter()
                .map(|m| reconstruct_greens(m, energy, scale, domain))
                .collect::<Result<Vec<_>>>();
            self.stats.reconstruct_time = timer.elapsed();
            g
        };

        info!(row, cols = cols.len(), num_moments, ops = self.stats.ops, "greens");
        result
    }

    fn dos(&mut self, energy: &[f64], broadening: f64) -> Result<Vec<f64>> {
        let (scale, num_moments) = self.prepare(energy, broadening)?;
        let num_random = self.config.num_random;
        let root = SeedRng::new(format!("{}-dos", self.config.seed).as_bytes());

        // every site matters for the trace: no windowing
        let oh = self.optimized.optimize_for(&Indices::diagonal(0), scale);
        self.stats = query_stats(oh, num_moments, false, num_random);

        let timer = Instant::now();
        let samples: Vec<Vec<S>> = (0..num_random)
            .into_par_iter()
            .map(|j| {
                let mut rng = root.fork(&j.to_string());
                let starter = random_starter::<S>(oh.size(), &mut rng);
                B::diagonal(oh, &starter, num_moments, false).into_vec()
            })
            .collect();

        let mut total = vec![S::zero(); num_moments];
        for sample in samples {
            for (t, m) in total.iter_mut().zip(sample) {
                *t += m;
            }
        }
        let inv = 1.0 / num_random as f64;
        self.stats.moments_time = timer.elapsed();

        let timer = Instant::now();
        self.config.kernel.apply(&mut total);
        let real: Vec<f64> = total.iter().map(|m| m.re() * inv).collect();
        let result = reconstruct(&real, energy, scale, self.config.domain);
        self.stats.reconstruct_time = timer.elapsed();

        info!(num_random, num_moments, ops = self.stats.ops, "dos");
        result
    }

    fn change_hamiltonian(&mut self, h: &Hamiltonian) -> bool {
        let Some(matrix) = h.get::<S>() else {
            return false;
        };
        if check_hamiltonian(&matrix).is_err() {
            return false;
        }
        let Ok(bounds) = Bounds::from_config(&matrix, &self.config) else {
            return false;
        };

        self.optimized = OptimizedHamiltonian::new(
            Arc::clone(&matrix),
            self.config.matrix_format,
            self.config.algorithm.reorder,
        );
        self.hamiltonian = matrix;
        self.bounds = bounds;
        self.stats = Stats::default();
        debug!(size = self.hamiltonian.rows(), "hamiltonian replaced");
        true
    }

    fn report(&self, shortform: bool) -> String {
        let tail = if shortform {
            "|".to_string()
        } else {
            format!(
                "Total time: {}\n",
                pretty_duration(self.bounds.elapsed() + self.stats.total_time())
            )
        };
        format!(
            "{}{}{}",
            self.bounds.report(shortform),
            self.stats.report(shortform),
            tail
        )
    }

    fn bounds(&self) -> &Bounds {
        &self.bounds
    }

    fn stats(&self) -> &Stats {
        &self.stats
    }

    fn config(&self) -> &Config {
        &self.config
    }
}

fn check_hamiltonian<S: Scalar>(h: &SparseMatrix<S>) -> Result<()> {
    if !h.is_square() {
        return Err(KpmError::NonSquareHamiltonian {
            rows: h.rows(),
            cols: h.cols(),
        });
    }
    if h.rows() == 0 {
        return Err(KpmError::EmptyHamiltonian);
    }
    let error = h.hermiticity_error();
    if error > HERMITICITY_TOLERANCE {
        warn!(error, "hamiltonian is not hermitian, moments will be unreliable");
    }
    Ok(())
}

fn query_stats<S: Scalar>(
    oh: &Optimized<S>,
    num_moments: usize,
    optimal_size: bool,
    multiplier: usize,
) -> Stats {
    Stats {
        num_moments,
        multiplier,
        ops: oh.operations(num_moments, optimal_size),
        matrix_memory: oh.matrix().memory_bytes(),
        vector_memory: 2 * oh.size() * std::mem::size_of::<S>(),
        ..Stats::default()
    }
}
