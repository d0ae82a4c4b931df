//! Damping kernels.
//!
//! A truncated Chebyshev series rings (Gibbs oscillations). Multiplying moment
//! `n` by a kernel coefficient `g_n` trades that ringing for a controlled
//! broadening. The coefficients only depend on `n` and the moment count.

use serde::{Deserialize, Serialize};
use simd::Scalar;
use std::f64::consts::PI;

use crate::error::{KpmError, Result};

/// Smallest expansion the reconstruction accepts.
pub const MIN_MOMENTS: usize = 2;

/// Largest expansion a query may ask for.
pub const MAX_MOMENTS: usize = 1 << 20;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Kernel {
    /// Gaussian-like broadening of width `π / N`. General purpose, positive.
    Jackson,
    /// Lorentzian broadening `λ / N`. Preferred for Green's functions.
    Lorentz { lambda: f64 },
    /// No damping at all.
    Dirichlet,
}

impl Default for Kernel {
    fn default() -> Self {
        Kernel::Lorentz { lambda: 4.0 }
    }
}

impl Kernel {
    pub fn lorentz(lambda: f64) -> Self {
        Kernel::Lorentz { lambda }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Kernel::Jackson => "jackson",
            Kernel::Lorentz { .. } => "lorentz",
            Kernel::Dirichlet => "dirichlet",
        }
    }

    pub fn validate(&self) -> Result<()> {
        match *self {
            Kernel::Lorentz { lambda } if !(lambda > 0.0 && lambda.is_finite()) => Err(
                KpmError::InvalidConfig(format!("lorentz lambda must be positive, got {}", lambda)),
            ),
            _ => Ok(()),
        }
    }

    /// Moments needed for the requested broadening, given in the scaled
    /// energy units of the expansion (`broadening / a`).
    pub fn required_num_moments(&self, scaled_broadening: f64) -> Result<usize> {
        if !(scaled_broadening > 0.0 && scaled_broadening.is_finite()) {
            return Err(KpmError::InvalidBroadening(scaled_broadening));
        }
        let width = match *self {
            Kernel::Jackson | Kernel::Dirichlet => PI,
            Kernel::Lorentz { lambda } => lambda,
        };
        let n = (width / scaled_broadening).ceil();
        if n > MAX_MOMENTS as f64 {
            return Err(KpmError::InvalidBroadening(scaled_broadening));
        }
        Ok((n as usize).max(MIN_MOMENTS))
    }

    pub fn damping_coefficients(&self, num_moments: usize) -> Vec<f64> {
        let n_total = num_moments as f64;
        (0..num_moments)
            .map(|n| {
                let n = n as f64;
                match *self {
                    Kernel::Jackson => {
                        let q = PI / (n_total + 1.0);
                        ((n_total - n + 1.0) * (q * n).cos() + (q * n).sin() / q.tan())
                            / (n_total + 1.0)
                    }
                    Kernel::Lorentz { lambda } => {
                        (lambda * (1.0 - n / n_total)).sinh() / lambda.sinh()
                    }
                    Kernel::Dirichlet => 1.0,
                }
            })
            .collect()
    }

    /// Damp `moments` in place.
    pub fn apply<S: Scalar>(&self, moments: &mut [S]) {
        let g = self.damping_coefficients(moments.len());
        for (m, g) in moments.iter_mut().zip(g) {
            *m = m.scale(g);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_complex::Complex64;

    #[test]
    fn coefficients_start_at_one() {
        for kernel in [Kernel::Jackson, Kernel::lorentz(4.0), Kernel::Dirichlet] {
            let g = kernel.damping_coefficients(64);
            assert!((g[0] - 1.0).abs() < 1e-12, "{}: g0 = {}", kernel.name(), g[0]);
            assert!(g.iter().all(|&x| x <= 1.0 + 1e-12), "{} not damping", kernel.name());
        }
    }

    #[test]
    fn damping_decays_towards_the_tail() {
        let g = Kernel::Jackson.damping_coefficients(100);
        assert!(g[99].abs() < 1e-3, "jackson tail {}", g[99]);
        let g = Kernel::lorentz(4.0).damping_coefficients(100);
        assert!(g[99] < 0.01 && g[99] > 0.0, "lorentz tail {}", g[99]);
        assert!(g.windows(2).all(|w| w[1] < w[0]));
    }

    #[test]
    fn moment_count_follows_broadening() {
        assert_eq!(Kernel::lorentz(4.0).required_num_moments(0.125).unwrap(), 32);
        assert_eq!(Kernel::Jackson.required_num_moments(0.25).unwrap(), 13);
        assert_eq!(Kernel::Dirichlet.required_num_moments(100.0).unwrap(), MIN_MOMENTS);
        // 4 / 2^-18 = 2^20
        assert_eq!(
            Kernel::lorentz(4.0).required_num_moments(1.0 / 262144.0).unwrap(),
            MAX_MOMENTS
        );
        assert!(Kernel::lorentz(4.0).required_num_moments(1.0 / 524288.0).is_err());
    }

    #[test]
    fn bad_broadening_is_rejected() {
        for b in [0.0, -0.1, f64::NAN, f64::INFINITY, 1e-12] {
            assert!(matches!(
                Kernel::Jackson.required_num_moments(b),
                Err(KpmError::InvalidBroadening(_))
            ));
        }
    }

    #[test]
    fn apply_scales_complex_moments() {
        let mut m = vec![Complex64::new(1.0, 1.0); 8];
        let kernel = Kernel::lorentz(2.0);
        kernel.apply(&mut m);
        let g = kernel.damping_coefficients(8);
        for (m, g) in m.iter().zip(g) {
            assert!((m.re - g).abs() < 1e-15 && (m.im - g).abs() < 1e-15);
        }
    }

    #[test]
    fn kernel_serializes_with_a_tag() {
        let json = serde_json::to_string(&Kernel::lorentz(4.0)).unwrap();
        assert_eq!(json, r#"{"type":"lorentz","lambda":4.0}"#);
        let back: Kernel = serde_json::from_str(r#"{"type":"jackson"}"#).unwrap();
        assert_eq!(back, Kernel::Jackson);
    }
}
