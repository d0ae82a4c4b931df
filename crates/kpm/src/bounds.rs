//! Spectrum bounds and the scaling that maps them into (-1, 1).

use faer::{Mat, Side};
use rng::SeedRng;
use simd::Scalar;
use sparse::SparseMatrix;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{KpmError, Result};
use crate::stats::pretty_duration;

/// Relative headroom left between the scaled spectrum and ±1.
pub const SCALE_TOLERANCE: f64 = 0.01;

/// Smallest half-width used for a spectrum that collapsed to a point.
const MIN_HALF_WIDTH: f64 = 1e-6;

/// Linear map `E -> (E - b) / a` onto the Chebyshev domain.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Scale {
    pub a: f64,
    pub b: f64,
}

impl Scale {
    pub fn from_range(min: f64, max: f64) -> Self {
        let a = ((max - min) / (2.0 - SCALE_TOLERANCE)).max(MIN_HALF_WIDTH);
        let b = 0.5 * (max + min);
        Self { a, b }
    }

    #[inline]
    pub fn to_scaled(&self, energy: f64) -> f64 {
        (energy - self.b) / self.a
    }

    #[inline]
    pub fn to_energy(&self, scaled: f64) -> f64 {
        scaled * self.a + self.b
    }
}

/// How the Lanczos estimate ended.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LanczosReport {
    pub iterations: usize,
    /// Largest relative change of the extremal eigenvalues in the last step.
    pub precision: f64,
    pub converged: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Bounds {
    min: f64,
    max: f64,
    lanczos: Option<LanczosReport>,
    elapsed: Duration,
}

impl Bounds {
    pub fn user_defined(min: f64, max: f64) -> Result<Self> {
        if min > max {
            return Err(KpmError::InvalidEnergyRange { min, max });
        }
        Ok(Self {
            min,
            max,
            lanczos: None,
            elapsed: Duration::ZERO,
        })
    }

    /// User range from `config`, or a Lanczos estimate when its bounds are equal.
    pub fn from_config<S: Scalar>(h: &SparseMatrix<S>, config: &Config) -> Result<Self> {
        match config.user_bounds() {
            Some((min, max)) => Self::user_defined(min, max),
            None => Ok(Self::estimate(
                h,
                config.lanczos_precision,
                config.lanczos_max_iterations,
                &config.seed,
            )),
        }
    }

    /// Extremal eigenvalues of `h` by Lanczos iteration.
    ///
    /// Stops once both extremes change by less than `precision` (relative),
    /// when the Krylov space is exhausted, or after `max_iterations`. A run that
    /// hits the cap keeps its last estimate; the report says so.
    ///
    /// Ritz values lie inside the spectrum, so the result is widened by the
    /// residual `|β s_last|` of each extremal Ritz pair plus `precision` times
    /// the width, then intersected with the Gershgorin bounds of `h`.
    pub fn estimate<S: Scalar>(
        h: &SparseMatrix<S>,
        precision: f64,
        max_iterations: usize,
        seed: &str,
    ) -> Self {
        let timer = Instant::now();
        let size = h.rows();
        let cap = max_iterations.max(1).min(size.max(1));

        let mut rng = SeedRng::new(format!("{}-lanczos", seed).as_bytes());
        let mut v1: Vec<S> = (0..size)
            .map(|_| S::from_real(rng.next_f64(b"lanczos-start") - 0.5))
            .collect();
        normalize(&mut v1);
        let mut v0 = vec![S::zero(); size];
        let mut w = vec![S::zero(); size];

        let mut alpha = Vec::with_capacity(cap);
        let mut beta: Vec<f64> = Vec::with_capacity(cap);
        let mut ritz = RitzExtremes::default();
        let mut report = LanczosReport {
            iterations: 0,
            precision: f64::INFINITY,
            converged: false,
        };

        for i in 0..cap {
            h.matvec(&v1, &mut w);
            let b_prev = beta.last().copied().unwrap_or(0.0);
            for (w, &v) in w.iter_mut().zip(&v0) {
                *w -= v.scale(b_prev);
            }
            let a = inner(&v1, &w).re();
            for (w, &v) in w.iter_mut().zip(&v1) {
                *w -= v.scale(a);
            }
            let b = norm(&w);
            alpha.push(a);
            beta.push(b);

            let next = ritz_extremes(&alpha, &beta);
            report.iterations = i + 1;
            if i > 0 {
                report.precision = relative_change(ritz.min, next.min)
                    .max(relative_change(ritz.max, next.max));
            }
            ritz = next;

            let exhausted = b <= 1e-10 * (1.0 + a.abs()) || i + 1 == size;
            if exhausted || report.precision < precision {
                report.converged = true;
                if exhausted {
                    report.precision = 0.0;
                }
                break;
            }

            std::mem::swap(&mut v0, &mut v1);
            for (v, &w) in v1.iter_mut().zip(&w) {
                *v = w.scale(1.0 / b);
            }
        }

        let pad = precision * (ritz.max - ritz.min);
        let (g_min, g_max) = gershgorin(h);
        let min = (ritz.min - ritz.min_residual - pad).max(g_min);
        let max = (ritz.max + ritz.max_residual + pad).min(g_max);

        if report.converged {
            debug!(
                iterations = report.iterations,
                ritz_min = ritz.min,
                ritz_max = ritz.max,
                min,
                max,
                "lanczos converged"
            );
        } else {
            warn!(
                iterations = report.iterations,
                precision = report.precision,
                "lanczos stopped at the iteration cap, using the last estimate"
            );
        }

        Self {
            min,
            max,
            lanczos: Some(report),
            elapsed: timer.elapsed(),
        }
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    /// `None` for user-defined bounds.
    pub fn lanczos(&self) -> Option<&LanczosReport> {
        self.lanczos.as_ref()
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn scaling_factors(&self) -> Scale {
        Scale::from_range(self.min, self.max)
    }

    pub fn report(&self, shortform: bool) -> String {
        match (&self.lanczos, shortform) {
            (None, true) => format!("{:.2}, {:.2} [user-defined] ", self.min, self.max),
            (None, false) => format!(
                "Spectrum bounds are user-defined: ({:.2}, {:.2})\n",
                self.min, self.max
            ),
            (Some(_), true) => format!(
                "{:.2}, {:.2} [{}] ",
                self.min,
                self.max,
                pretty_duration(self.elapsed)
            ),
            (Some(l), false) => format!(
                "Spectrum bounds found ({:.2}, {:.2}) using Lanczos procedure with {} iterations \
                 (precision {:.1e}{})\nBounds time: {}\n",
                self.min,
                self.max,
                l.iterations,
                l.precision,
                if l.converged { "" } else { ", not converged" },
                pretty_duration(self.elapsed)
            ),
        }
    }
}

fn inner<S: Scalar>(u: &[S], v: &[S]) -> S {
    u.iter()
        .zip(v)
        .fold(S::zero(), |acc, (&x, &y)| acc + x.conj() * y)
}

fn norm<S: Scalar>(v: &[S]) -> f64 {
    inner(v, v).re().max(0.0).sqrt()
}

fn normalize<S: Scalar>(v: &mut [S]) {
    let n = norm(v);
    if n > 0.0 {
        for x in v.iter_mut() {
            *x = x.scale(1.0 / n);
        }
    }
}

fn relative_change(old: f64, new: f64) -> f64 {
    let denom = new.abs().max(old.abs()).max(f64::MIN_POSITIVE);
    (new - old).abs() / denom
}

/// Extremal Ritz values and the residual norms of their Ritz vectors.
#[derive(Clone, Copy, Debug, Default)]
struct RitzExtremes {
    min: f64,
    max: f64,
    min_residual: f64,
    max_residual: f64,
}

/// Extremal eigenpairs of the Lanczos matrix with diagonal `alpha` and
/// off-diagonal `beta[..k - 1]`; `beta[k - 1]` couples to the next vector.
fn ritz_extremes(alpha: &[f64], beta: &[f64]) -> RitzExtremes {
    let k = alpha.len();
    let mut t = Mat::<f64>::zeros(k, k);
    for (i, &a) in alpha.iter().enumerate() {
        t.write(i, i, a);
    }
    for (i, &b) in beta.iter().take(k - 1).enumerate() {
        t.write(i + 1, i, b);
        t.write(i, i + 1, b);
    }
    let eigen = t.selfadjoint_eigendecomposition(Side::Lower);
    let values = eigen.s().column_vector();
    let vectors = eigen.u();

    let (mut lo, mut hi) = (0, 0);
    for j in 1..k {
        if values.read(j) < values.read(lo) {
            lo = j;
        }
        if values.read(j) > values.read(hi) {
            hi = j;
        }
    }
    let coupling = beta.get(k - 1).copied().unwrap_or(0.0);
    RitzExtremes {
        min: values.read(lo),
        max: values.read(hi),
        min_residual: (coupling * vectors.read(k - 1, lo)).abs(),
        max_residual: (coupling * vectors.read(k - 1, hi)).abs(),
    }
}

/// Interval containing every eigenvalue of the Hermitian `h`.
fn gershgorin<S: Scalar>(h: &SparseMatrix<S>) -> (f64, f64) {
    (0..h.rows())
        .map(|i| {
            let (cols, values) = h.row(i);
            let (center, radius) = cols.iter().zip(values).fold(
                (0.0, 0.0),
                |(center, radius), (&j, &v)| {
                    if j == i {
                        (center + v.re(), radius)
                    } else {
                        (center, radius + v.to_c64().norm())
                    }
                },
            );
            (center - radius, center + radius)
        })
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), (l, u)| {
            (lo.min(l), hi.max(u))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain(n: usize) -> SparseMatrix<f64> {
        let mut triplets = Vec::new();
        for i in 0..n - 1 {
            triplets.push((i, i + 1, -1.0));
            triplets.push((i + 1, i, -1.0));
        }
        SparseMatrix::from_triplets(n, n, triplets)
    }

    #[test]
    fn ritz_extremes_of_a_2x2() {
        let ritz = ritz_extremes(&[0.0, 0.0], &[1.0, 0.5]);
        assert!((ritz.min + 1.0).abs() < 1e-12 && (ritz.max - 1.0).abs() < 1e-12);
        // both eigenvectors are (1, ±1) / √2
        let expected = 0.5 / 2f64.sqrt();
        assert!((ritz.min_residual - expected).abs() < 1e-12, "{}", ritz.min_residual);
        assert!((ritz.max_residual - expected).abs() < 1e-12, "{}", ritz.max_residual);
    }

    #[test]
    fn gershgorin_of_a_chain_and_a_shifted_diagonal() {
        assert_eq!(gershgorin(&chain(10)), (-2.0, 2.0));
        let h = SparseMatrix::from_triplets(
            2,
            2,
            vec![(0, 0, 1.0), (0, 1, -0.5), (1, 0, -0.5), (1, 1, 3.0)],
        );
        assert_eq!(gershgorin(&h), (0.5, 3.5));
    }

    #[test]
    fn lanczos_bounds_enclose_the_chain_band() {
        let n = 200;
        let bounds = Bounds::estimate(&chain(n), 1e-4, 100, "test");
        let exact = 2.0 * (std::f64::consts::PI / (n as f64 + 1.0)).cos();
        assert!(bounds.max() >= exact, "max {} < {}", bounds.max(), exact);
        assert!(bounds.min() <= -exact, "min {} > {}", bounds.min(), -exact);
        assert!(bounds.max() <= 2.0 && bounds.min() >= -2.0);
    }

    #[test]
    fn loose_precision_still_encloses_a_long_chain() {
        let n = 1000;
        let bounds = Bounds::estimate(&chain(n), 0.002, 100, "kpm");
        let exact = 2.0 * (std::f64::consts::PI / (n as f64 + 1.0)).cos();
        let scale = bounds.scaling_factors();
        for e in [-exact, exact] {
            let x = scale.to_scaled(e);
            assert!(x.abs() < 1.0, "band edge {} maps to {}", e, x);
        }
    }

    #[test]
    fn exhausted_krylov_space_converges_exactly() {
        let h = SparseMatrix::from_diagonal(&[-1.0, 3.0]);
        let bounds = Bounds::estimate(&h, 1e-3, 100, "diag");
        let report = bounds.lanczos().unwrap();
        assert!(report.converged);
        assert!(report.iterations <= 2);
        assert!((bounds.min() + 1.0).abs() < 1e-9 && (bounds.max() - 3.0).abs() < 1e-9);
    }

    #[test]
    fn iteration_cap_is_reported() {
        let bounds = Bounds::estimate(&chain(500), 1e-14, 3, "cap");
        let report = bounds.lanczos().unwrap();
        assert_eq!(report.iterations, 3);
        assert!(!report.converged);
        assert!(bounds.report(false).contains("not converged"));
    }

    #[test]
    fn scaling_leaves_headroom() {
        let scale = Bounds::user_defined(-3.0, 1.0).unwrap().scaling_factors();
        assert!((scale.b + 1.0).abs() < 1e-15);
        for e in [-3.0, 1.0] {
            let x = scale.to_scaled(e);
            assert!(x.abs() < 1.0 && x.abs() > 0.98, "scaled {}", x);
            assert!((scale.to_energy(x) - e).abs() < 1e-12);
        }
    }

    #[test]
    fn degenerate_spectrum_gets_a_finite_scale() {
        let scale = Scale::from_range(2.0, 2.0);
        assert!(scale.a > 0.0);
        assert_eq!(scale.to_scaled(2.0), 0.0);
    }

    #[test]
    fn user_defined_report() {
        let bounds = Bounds::user_defined(-1.0, 1.0).unwrap();
        assert_eq!(bounds.report(true), "-1.00, 1.00 [user-defined] ");
        assert!(matches!(
            Bounds::user_defined(1.0, -1.0),
            Err(KpmError::InvalidEnergyRange { .. })
        ));
    }
}
