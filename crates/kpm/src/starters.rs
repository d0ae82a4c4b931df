//! Initial vectors `r_0` of the recurrence.

use rng::SeedRng;
use simd::Scalar;

/// Unit vector at `row`: the moments become expectation values on that site.
pub fn exval_starter<S: Scalar>(size: usize, row: usize) -> Vec<S> {
    let mut r0 = vec![S::zero(); size];
    r0[row] = S::one();
    r0
}

/// Random ±1 vector. Averaged over draws, `<r|A|r>` estimates the trace of `A`.
pub fn random_starter<S: Scalar>(size: usize, rng: &mut SeedRng) -> Vec<S> {
    let mut signs = vec![0.0; size];
    rng.fill_signs(&mut signs, b"random-starter");
    signs.into_iter().map(S::from_real).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_complex::Complex32;

    #[test]
    fn exval_is_a_unit_vector() {
        let r: Vec<Complex32> = exval_starter(5, 3);
        assert_eq!(r[3], Complex32::new(1.0, 0.0));
        assert_eq!(r.iter().filter(|z| z.norm() != 0.0).count(), 1);
    }

    #[test]
    fn random_starter_is_reproducible() {
        let a: Vec<f64> = random_starter(64, &mut SeedRng::new(b"s"));
        let b: Vec<f64> = random_starter(64, &mut SeedRng::new(b"s"));
        assert_eq!(a, b);
        assert!(a.iter().all(|&x| x == 1.0 || x == -1.0));
    }
}
