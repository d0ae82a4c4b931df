use kpm::compute::{Cpu, MomentsBackend, Reference};
use kpm::optimized::{Indices, OptimizedHamiltonian};
use kpm::starters::{exval_starter, random_starter};
use kpm::{kpm_with, Config, Kpm, MatrixFormat, Scale};
use num_complex::{Complex32, Complex64};
use rng::SeedRng;
use simd::Scalar;
use sparse::{Hamiltonian, SparseMatrix};
use std::sync::Arc;

/// Square lattice with a flux-like complex hopping along y and random onsite
/// energies, so that rows have uneven lengths.
fn lattice<S: Scalar>(width: usize, height: usize, complex_hopping: bool) -> SparseMatrix<S> {
    let mut rng = SeedRng::new(b"lattice");
    let site = |x: usize, y: usize| y * width + x;
    let mut triplets = Vec::new();
    for y in 0..height {
        for x in 0..width {
            let i = site(x, y);
            triplets.push((i, i, S::from_real(rng.next_f64(b"onsite") - 0.5)));
            if x + 1 < width {
                let j = site(x + 1, y);
                triplets.push((i, j, S::from_real(-1.0)));
                triplets.push((j, i, S::from_real(-1.0)));
            }
            if y + 1 < height {
                let j = site(x, y + 1);
                let t = hopping::<S>(x, complex_hopping);
                triplets.push((i, j, t));
                triplets.push((j, i, t.conj()));
            }
        }
    }
    SparseMatrix::from_triplets(width * height, width * height, triplets)
}

fn hopping<S: Scalar>(x: usize, complex_hopping: bool) -> S {
    if !(complex_hopping && S::IS_COMPLEX) {
        return S::from_real(-1.0);
    }
    // -exp(i φ x) with φ = 0.3, built from real parts only
    let phase = 0.3 * x as f64;
    let mut pair = [S::zero(); 1];
    let reals = S::as_reals_mut(&mut pair);
    reals[0] = <S::Real as simd::Real>::from_f64(-phase.cos());
    reals[1] = <S::Real as simd::Real>::from_f64(-phase.sin());
    pair[0]
}

fn scale() -> Scale {
    Scale { a: 4.5, b: 0.0 }
}

fn assert_close<S: Scalar>(a: &[S], b: &[S], tolerance: f64, what: &str) {
    assert_eq!(a.len(), b.len(), "{}: length", what);
    for (n, (x, y)) in a.iter().zip(b).enumerate() {
        let diff = (x.to_c64() - y.to_c64()).norm();
        let size = x.to_c64().norm().max(1.0);
        assert!(diff <= tolerance * size, "{}: moment {}: {:?} vs {:?}", what, n, x, y);
    }
}

fn compare_diagonal<S: Scalar>(h: SparseMatrix<S>, tolerance: f64) {
    let h = Arc::new(h);
    for format in [MatrixFormat::Csr, MatrixFormat::Ell] {
        for num_moments in [2, 3, 40, 41] {
            let mut oh = OptimizedHamiltonian::new(Arc::clone(&h), format, true);
            let opt = oh.optimize_for(&Indices::diagonal(37), scale());
            let starter = exval_starter::<S>(opt.size(), opt.idx().row);

            let cpu = Cpu::diagonal(opt, &starter, num_moments, true);
            let reference = Reference::diagonal(opt, &starter, num_moments, true);
            let what = format!("{:?} diagonal, {} moments", format, num_moments);
            assert_close(cpu.get(), reference.get(), tolerance, &what);

            let random = random_starter::<S>(opt.size(), &mut SeedRng::new(b"random"));
            let cpu = Cpu::diagonal(opt, &random, num_moments, false);
            let reference = Reference::diagonal(opt, &random, num_moments, false);
            assert_close(cpu.get(), reference.get(), tolerance, &format!("{} random", what));
        }
    }
}

fn compare_off_diagonal<S: Scalar>(h: SparseMatrix<S>, tolerance: f64) {
    let h = Arc::new(h);
    let idx = Indices::new(37, vec![37, 12, 80, 38]);
    for format in [MatrixFormat::Csr, MatrixFormat::Ell] {
        let mut oh = OptimizedHamiltonian::new(Arc::clone(&h), format, true);
        let opt = oh.optimize_for(&idx, scale());
        let starter = exval_starter::<S>(opt.size(), opt.idx().row);

        let cpu = Cpu::off_diagonal(opt, &starter, 50, true);
        let reference = Reference::off_diagonal(opt, &starter, 50, true);
        for (k, (a, b)) in cpu.get().iter().zip(reference.get()).enumerate() {
            let what = format!("{:?} column {}", format, idx.cols[k]);
            assert_close(a, b, tolerance, &what);
        }
    }
}

#[test]
fn real_double_backends_agree() {
    compare_diagonal(lattice::<f64>(9, 11, false), 1e-10);
    compare_off_diagonal(lattice::<f64>(9, 11, false), 1e-10);
}

#[test]
fn complex_double_backends_agree() {
    compare_diagonal(lattice::<Complex64>(9, 11, true), 1e-10);
    compare_off_diagonal(lattice::<Complex64>(9, 11, true), 1e-10);
}

#[test]
fn single_precision_backends_agree() {
    compare_diagonal(lattice::<f32>(9, 11, false), 1e-3);
    compare_off_diagonal(lattice::<Complex32>(9, 11, true), 1e-3);
}

#[test]
fn query_results_agree_across_backends() {
    let h: Hamiltonian = lattice::<Complex64>(12, 12, true).into();
    let energy: Vec<f64> = (0..31).map(|i| -3.0 + 0.2 * i as f64).collect();
    let config = Config::with_energy_range(-4.4, 4.4);

    let mut cpu = kpm_with::<Cpu>(&h, config.clone()).unwrap();
    let mut reference = kpm_with::<Reference>(&h, config).unwrap();

    let a = cpu.ldos(70, &energy, 0.15).unwrap();
    let b = reference.ldos(70, &energy, 0.15).unwrap();
    assert_close(&a, &b, 1e-9, "ldos");

    let a = cpu.greens_vector(70, &[71, 90], &energy, 0.15).unwrap();
    let b = reference.greens_vector(70, &[71, 90], &energy, 0.15).unwrap();
    for (a, b) in a.iter().zip(&b) {
        assert_close(a, b, 1e-9, "greens");
    }
}
