use num_complex::{Complex32, Complex64};
use simd::{
    addsub, complex_mul, gather, madd_rc, split_loop, IsaLevel, Real, Scalar, Vector,
};

const INDICES: [usize; 8] = [3, 36, 0, 17, 9, 9, 22, 5];

fn real_data<T: Real>() -> Vec<T> {
    (0..37).map(|i| T::from_f64(i as f64 * 1.5 - 7.0)).collect()
}

fn complex_data() -> Vec<Complex64> {
    (0..37)
        .map(|i| Complex64::new(i as f64 * 0.5 - 3.0, 2.0 - i as f64 * 0.25))
        .collect()
}

fn scalar_gather<S: Scalar>(data: &[S], indices: &[usize], count: usize) -> Vec<S::Real> {
    let picked: Vec<S> = indices[..count].iter().map(|&i| data[i]).collect();
    S::as_reals(&picked).to_vec()
}

#[test]
fn addsub_alternates_lanes() {
    let a = Vector::<f32, 4>([1.0, 2.0, 3.0, 4.0]);
    let b = Vector::<f32, 4>([10.0, 20.0, 30.0, 40.0]);
    assert_eq!(addsub(a, b).0, [-9.0, 22.0, -27.0, 44.0]);

    let a = Vector::<f64, 4>([1.0, 2.0, 3.0, 4.0]);
    let b = Vector::<f64, 4>([10.0, 20.0, 30.0, 40.0]);
    assert_eq!(addsub(a, b).0, [-9.0, 22.0, -27.0, 44.0]);
}

#[test]
fn addsub_kernels_agree_with_portable() {
    let a: Vec<f64> = (0..11).map(|i| i as f64 + 0.25).collect();
    let b: Vec<f64> = (0..11).map(|i| 3.0 * i as f64 - 1.0).collect();

    let mut expected = vec![0.0; 11];
    (simd::Kernels::<f64>::portable().addsub)(&a, &b, &mut expected);

    for level in IsaLevel::ALL.into_iter().filter(|l| l.is_available()) {
        let mut out = vec![0.0; 11];
        (f64::resolve(level).addsub)(&a, &b, &mut out);
        assert_eq!(out, expected, "isa = {}", level.name());

        let af: Vec<f32> = a.iter().map(|&x| x as f32).collect();
        let bf: Vec<f32> = b.iter().map(|&x| x as f32).collect();
        let mut outf = vec![0.0f32; 11];
        (f32::resolve(level).addsub)(&af, &bf, &mut outf);
        for (i, (&o, &e)) in outf.iter().zip(&expected).enumerate() {
            assert_eq!(o, e as f32, "isa = {}, lane {}", level.name(), i);
        }
    }
}

#[test]
fn complex_multiply() {
    let ab = Vector::<f64, 2>([2.0, 3.0]);
    let xy = Vector::<f64, 2>([5.0, 7.0]);
    assert_eq!(complex_mul(ab, xy).0, [-11.0, 29.0]);

    let ab = Vector::<f32, 4>([2.0, 3.0, -1.0, 0.5]);
    let xy = Vector::<f32, 4>([5.0, 7.0, 4.0, 2.0]);
    assert_eq!(complex_mul(ab, xy).0, [-11.0, 29.0, -5.0, 0.0]);
}

#[test]
fn gather_matches_scalar_loop_real() {
    let d64 = real_data::<f64>();
    let v = gather::<f64, 2>(&d64, &INDICES);
    assert_eq!(v.0.to_vec(), scalar_gather(&d64, &INDICES, 2));
    let v = gather::<f64, 8>(&d64, &INDICES);
    assert_eq!(v.0.to_vec(), scalar_gather(&d64, &INDICES, 8));

    let d32 = real_data::<f32>();
    let v = gather::<f32, 4>(&d32, &INDICES);
    assert_eq!(v.0.to_vec(), scalar_gather(&d32, &INDICES, 4));
    let v = gather::<f32, 8>(&d32, &INDICES);
    assert_eq!(v.0.to_vec(), scalar_gather(&d32, &INDICES, 8));
}

#[test]
fn gather_matches_scalar_loop_complex() {
    let c64 = complex_data();
    let v = gather::<Complex64, 2>(&c64, &INDICES);
    assert_eq!(v.0.to_vec(), scalar_gather(&c64, &INDICES, 1));
    let v = gather::<Complex64, 8>(&c64, &INDICES);
    assert_eq!(v.0.to_vec(), scalar_gather(&c64, &INDICES, 4));

    let c32: Vec<Complex32> = c64
        .iter()
        .map(|c| Complex32::new(c.re as f32, c.im as f32))
        .collect();
    let v = gather::<Complex32, 4>(&c32, &INDICES);
    assert_eq!(v.0.to_vec(), scalar_gather(&c32, &INDICES, 2));
    let v = gather::<Complex32, 8>(&c32, &INDICES);
    assert_eq!(v.0.to_vec(), scalar_gather(&c32, &INDICES, 4));
}

#[test]
fn gather_kernels_agree_for_every_level() {
    let d64 = real_data::<f64>();
    let c64 = complex_data();
    let reals = Complex64::as_reals(&c64);

    for level in IsaLevel::ALL.into_iter().filter(|l| l.is_available()) {
        let table = f64::resolve(level);

        let mut out = vec![0.0; 7];
        (table.gather)(&d64, &INDICES, &mut out);
        assert_eq!(out, scalar_gather(&d64, &INDICES, 7), "isa = {}", level.name());

        let mut out = vec![0.0; 6];
        (table.gather_pairs)(reals, &INDICES, &mut out);
        assert_eq!(out, scalar_gather(&c64, &INDICES, 3), "isa = {}", level.name());
    }
}

#[test]
fn madd_rc_real_and_complex() {
    let a = Vector::<f64, 4>([1.0, 2.0, 3.0, 4.0]);
    let b = Vector::<f64, 4>([0.5, -1.0, 2.0, 1.0]);
    let c = Vector::<f64, 4>([1.0, 1.0, 1.0, 1.0]);

    assert_eq!(madd_rc::<f64, 4>(a, b, c).0, [1.5, -1.0, 7.0, 5.0]);

    // (1 + 2i)(0.5 - i) + (1 + i) = 3.5 + 1i, (3 + 4i)(2 + i) + (1 + i) = 3 + 12i
    assert_eq!(madd_rc::<Complex64, 4>(a, b, c).0, [3.5, 1.0, 3.0, 12.0]);
}

#[test]
fn reduce_sums_elements() {
    let v = Vector::<f64, 4>([1.0, 2.0, 3.0, 4.0]);
    assert_eq!(f64::reduce(v), 10.0);
    assert_eq!(Complex64::reduce(v), Complex64::new(4.0, 6.0));
}

#[test]
fn split_loop_covers_range_exactly() {
    let buffer = [Vector::<f32, 4>::zero(); 16];
    // SAFETY: `buffer` is 64 contiguous, 16-byte aligned f32 values.
    let data: &[f32] = unsafe { std::slice::from_raw_parts(buffer.as_ptr() as *const f32, 64) };

    for (start, end) in [(0, 64), (3, 61), (1, 3), (5, 5), (6, 40)] {
        let s = split_loop(data, start, end, 4);

        assert_eq!(s.start, start);
        assert_eq!(s.end, end);
        assert!(s.start <= s.peel_end && s.peel_end <= s.vec_end && s.vec_end <= s.end);
        assert_eq!((s.vec_end - s.peel_end) % 4, 0);
        assert!(s.end - s.vec_end < 4, "remainder too long: {:?}", s);
        if s.peel_end < s.vec_end {
            assert_eq!(s.peel_end % 4, 0, "vector part is not aligned: {:?}", s);
        }

        let visited: Vec<usize> = s
            .peel()
            .chain(s.vectorized().flat_map(|i| i..i + 4))
            .chain(s.remainder())
            .collect();
        assert_eq!(visited, (start..end).collect::<Vec<_>>());
    }
}

#[test]
fn split_loop_without_reachable_alignment() {
    let buffer = [Vector::<f64, 2>::zero(); 9];
    // SAFETY: skipping one f64 leaves 8 complex values that are 8-byte aligned
    // but never 16-byte aligned.
    let data: &[Complex64] = unsafe {
        std::slice::from_raw_parts((buffer.as_ptr() as *const f64).add(1) as *const Complex64, 8)
    };

    let s = split_loop(data, 0, 7, 2);
    assert_eq!(s.peel_end, 0);
    assert_eq!(s.vec_end, 6);
}
