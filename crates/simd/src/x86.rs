//! x86_64 kernels installed by `Real::resolve`.
//!
//! Each kernel works on whole registers and hands the tail to the portable
//! form, so any output length is accepted. SSE2 is part of the x86_64
//! baseline; the SSE3 and AVX forms are only installed after
//! `is_x86_feature_detected!` confirmed the feature.

use crate::dispatch::portable;
use std::arch::x86_64::*;

pub(crate) fn addsub_ps_sse3(a: &[f32], b: &[f32], out: &mut [f32]) {
    // SAFETY: installed only when SSE3 was detected.
    unsafe { addsub_ps_sse3_impl(a, b, out) }
}

#[target_feature(enable = "sse3")]
unsafe fn addsub_ps_sse3_impl(a: &[f32], b: &[f32], out: &mut [f32]) {
    let n = out.len().min(a.len()).min(b.len());
    let body = n - n % 4;
    let mut i = 0;
    while i < body {
        let r = _mm_addsub_ps(_mm_loadu_ps(a.as_ptr().add(i)), _mm_loadu_ps(b.as_ptr().add(i)));
        _mm_storeu_ps(out.as_mut_ptr().add(i), r);
        i += 4;
    }
    portable::addsub(&a[body..], &b[body..], &mut out[body..n]);
}

pub(crate) fn addsub_pd_sse3(a: &[f64], b: &[f64], out: &mut [f64]) {
    // SAFETY: installed only when SSE3 was detected.
    unsafe { addsub_pd_sse3_impl(a, b, out) }
}

#[target_feature(enable = "sse3")]
unsafe fn addsub_pd_sse3_impl(a: &[f64], b: &[f64], out: &mut [f64]) {
    let n = out.len().min(a.len()).min(b.len());
    let body = n - n % 2;
    let mut i = 0;
    while i < body {
        let r = _mm_addsub_pd(_mm_loadu_pd(a.as_ptr().add(i)), _mm_loadu_pd(b.as_ptr().add(i)));
        _mm_storeu_pd(out.as_mut_ptr().add(i), r);
        i += 2;
    }
    portable::addsub(&a[body..], &b[body..], &mut out[body..n]);
}

pub(crate) fn addsub_ps_avx(a: &[f32], b: &[f32], out: &mut [f32]) {
    // SAFETY: installed only when AVX was detected.
    unsafe { addsub_ps_avx_impl(a, b, out) }
}

#[target_feature(enable = "avx")]
unsafe fn addsub_ps_avx_impl(a: &[f32], b: &[f32], out: &mut [f32]) {
    let n = out.len().min(a.len()).min(b.len());
    let body = n - n % 8;
    let mut i = 0;
    while i < body {
        let r = _mm256_addsub_ps(
            _mm256_loadu_ps(a.as_ptr().add(i)),
            _mm256_loadu_ps(b.as_ptr().add(i)),
        );
        _mm256_storeu_ps(out.as_mut_ptr().add(i), r);
        i += 8;
    }
    addsub_ps_sse3_impl(&a[body..], &b[body..], &mut out[body..n]);
}

pub(crate) fn addsub_pd_avx(a: &[f64], b: &[f64], out: &mut [f64]) {
    // SAFETY: installed only when AVX was detected.
    unsafe { addsub_pd_avx_impl(a, b, out) }
}

#[target_feature(enable = "avx")]
unsafe fn addsub_pd_avx_impl(a: &[f64], b: &[f64], out: &mut [f64]) {
    let n = out.len().min(a.len()).min(b.len());
    let body = n - n % 4;
    let mut i = 0;
    while i < body {
        let r = _mm256_addsub_pd(
            _mm256_loadu_pd(a.as_ptr().add(i)),
            _mm256_loadu_pd(b.as_ptr().add(i)),
        );
        _mm256_storeu_pd(out.as_mut_ptr().add(i), r);
        i += 4;
    }
    addsub_pd_sse3_impl(&a[body..], &b[body..], &mut out[body..n]);
}

/// Four scalar loads recombined with two rounds of unpacking.
pub(crate) fn gather_ps_sse2(data: &[f32], indices: &[usize], out: &mut [f32]) {
    let n = out.len().min(indices.len());
    let body = n - n % 4;
    let mut k = 0;
    while k < body {
        let idx = &indices[k..k + 4];
        // SAFETY: every pointer comes from a bounds-checked element reference.
        unsafe {
            let a = _mm_load_ss(&data[idx[0]]);
            let b = _mm_load_ss(&data[idx[1]]);
            let c = _mm_load_ss(&data[idx[2]]);
            let d = _mm_load_ss(&data[idx[3]]);
            let ac = _mm_unpacklo_ps(a, c);
            let bd = _mm_unpacklo_ps(b, d);
            _mm_storeu_ps(out.as_mut_ptr().add(k), _mm_unpacklo_ps(ac, bd));
        }
        k += 4;
    }
    portable::gather(data, &indices[body..], &mut out[body..n]);
}

pub(crate) fn gather_pd_sse2(data: &[f64], indices: &[usize], out: &mut [f64]) {
    let n = out.len().min(indices.len());
    let body = n - n % 2;
    let mut k = 0;
    while k < body {
        // SAFETY: every pointer comes from a bounds-checked element reference.
        unsafe {
            let low = _mm_load_sd(&data[indices[k]]);
            let vec = _mm_loadh_pd(low, &data[indices[k + 1]]);
            _mm_storeu_pd(out.as_mut_ptr().add(k), vec);
        }
        k += 2;
    }
    portable::gather(data, &indices[body..], &mut out[body..n]);
}

/// Two complex<f32> per register, each moved as one 64-bit load.
pub(crate) fn gather_pairs_ps_sse2(data: &[f32], indices: &[usize], out: &mut [f32]) {
    let pairs = (out.len() / 2).min(indices.len());
    let body = pairs - pairs % 2;
    let mut k = 0;
    while k < body {
        let p0 = &data[2 * indices[k]..2 * indices[k] + 2];
        let p1 = &data[2 * indices[k + 1]..2 * indices[k + 1] + 2];
        // SAFETY: both slices hold exactly the 8 bytes being loaded.
        unsafe {
            let low = _mm_load_sd(p0.as_ptr() as *const f64);
            let vec = _mm_loadh_pd(low, p1.as_ptr() as *const f64);
            _mm_storeu_ps(out.as_mut_ptr().add(2 * k), _mm_castpd_ps(vec));
        }
        k += 2;
    }
    portable::gather_pairs(data, &indices[body..], &mut out[2 * body..2 * pairs]);
}

/// One complex<f64> fills a whole register.
pub(crate) fn gather_pairs_pd_sse2(data: &[f64], indices: &[usize], out: &mut [f64]) {
    let pairs = (out.len() / 2).min(indices.len());
    for k in 0..pairs {
        let p = &data[2 * indices[k]..2 * indices[k] + 2];
        // SAFETY: `p` holds exactly the two lanes being loaded.
        unsafe {
            _mm_storeu_pd(out.as_mut_ptr().add(2 * k), _mm_loadu_pd(p.as_ptr()));
        }
    }
}
