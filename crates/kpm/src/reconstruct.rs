//! Evaluate a damped Chebyshev series on an energy grid.

use num_complex::Complex64;
use simd::Scalar;
use std::f64::consts::PI;

use crate::bounds::{Scale, SCALE_TOLERANCE};
use crate::config::DomainPolicy;
use crate::error::{KpmError, Result};

/// Largest `|x|` a clamped energy is mapped to.
const CLAMP_LIMIT: f64 = 1.0 - SCALE_TOLERANCE / 2.0;

/// Map `energy` into the open interval (-1, 1) following `policy`.
pub fn scaled_energy(energy: f64, scale: Scale, policy: DomainPolicy) -> Result<f64> {
    let x = scale.to_scaled(energy);
    if x.abs() < 1.0 {
        return Ok(x);
    }
    match policy {
        DomainPolicy::Clamp if !x.is_nan() => Ok(x.clamp(-CLAMP_LIMIT, CLAMP_LIMIT)),
        _ => Err(KpmError::EnergyOutOfDomain {
            energy,
            min: scale.to_energy(-1.0),
            max: scale.to_energy(1.0),
        }),
    }
}

/// Spectral density `ρ(E)` from real moments.
pub fn reconstruct(
    moments: &[f64],
    energy: &[f64],
    scale: Scale,
    policy: DomainPolicy,
) -> Result<Vec<f64>> {
    energy
        .iter()
        .map(|&e| {
            let x = scaled_energy(e, scale, policy)?;
            let theta = x.acos();
            let series = moments
                .iter()
                .enumerate()
                .skip(1)
                .fold(moments.first().copied().unwrap_or(0.0), |acc, (n, &m)| {
                    acc + 2.0 * m * (n as f64 * theta).cos()
                });
            Ok(series / (PI * scale.a * (1.0 - x * x).sqrt()))
        })
        .collect()
}

/// Retarded Green's function `G(E)`; `-Im G / π` is the density.
pub fn reconstruct_greens<S: Scalar>(
    moments: &[S],
    energy: &[f64],
    scale: Scale,
    policy: DomainPolicy,
) -> Result<Vec<Complex64>> {
    let moments: Vec<Complex64> = moments.iter().map(|m| m.to_c64()).collect();
    energy
        .iter()
        .map(|&e| {
            let x = scaled_energy(e, scale, policy)?;
            let theta = x.acos();
            let series = moments.iter().enumerate().skip(1).fold(
                moments.first().copied().unwrap_or_default(),
                |acc, (n, &m)| acc + 2.0 * m * Complex64::from_polar(1.0, -(n as f64) * theta),
            );
            Ok(-Complex64::i() * series / (scale.a * (1.0 - x * x).sqrt()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit() -> Scale {
        Scale { a: 1.0, b: 0.0 }
    }

    #[test]
    fn single_moment_gives_the_chebyshev_weight() {
        let rho = reconstruct(&[1.0], &[0.0, 0.5], unit(), DomainPolicy::Reject).unwrap();
        assert!((rho[0] - 1.0 / PI).abs() < 1e-15);
        assert!((rho[1] - 1.0 / (PI * 0.75f64.sqrt())).abs() < 1e-15);
    }

    #[test]
    fn greens_imaginary_part_matches_density() {
        let moments = [1.0, 0.3, -0.2, 0.05];
        let energy = [-0.7, -0.1, 0.4];
        let scale = Scale { a: 2.0, b: 0.3 };
        let rho = reconstruct(&moments, &energy, scale, DomainPolicy::Reject).unwrap();
        let g = reconstruct_greens(&moments, &energy, scale, DomainPolicy::Reject).unwrap();
        for (r, g) in rho.iter().zip(&g) {
            assert!((r + g.im / PI).abs() < 1e-12, "rho {} vs -Im G / pi {}", r, -g.im / PI);
        }
    }

    #[test]
    fn out_of_domain_energy() {
        let err = reconstruct(&[1.0], &[1.5], unit(), DomainPolicy::Reject).unwrap_err();
        assert_eq!(
            err,
            KpmError::EnergyOutOfDomain {
                energy: 1.5,
                min: -1.0,
                max: 1.0
            }
        );

        let clamped = reconstruct(&[1.0], &[1.5, -9.0], unit(), DomainPolicy::Clamp).unwrap();
        assert!(clamped.iter().all(|v| v.is_finite() && *v > 0.0));
        assert_eq!(clamped[0], clamped[1]);
    }

    #[test]
    fn nan_energy_is_never_clamped() {
        assert!(scaled_energy(f64::NAN, unit(), DomainPolicy::Clamp).is_err());
    }
}
