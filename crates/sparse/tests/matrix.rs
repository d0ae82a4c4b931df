use num_complex::Complex64;
use sparse::{EllMatrix, Hamiltonian, Permutation, ScalarKind, SparseMatrix};

fn chain(n: usize, t: f64) -> SparseMatrix<f64> {
    let mut triplets = Vec::new();
    for i in 0..n - 1 {
        triplets.push((i, i + 1, t));
        triplets.push((i + 1, i, t));
    }
    SparseMatrix::from_triplets(n, n, triplets)
}

#[test]
fn duplicates_are_summed_and_sorted() {
    let m = SparseMatrix::from_triplets(
        2,
        3,
        vec![(1, 2, 1.0), (0, 1, 2.0), (1, 0, 3.0), (0, 1, 0.5)],
    );
    assert_eq!(m.nnz(), 3);
    assert_eq!(m.row(0), (&[1usize][..], &[2.5][..]));
    assert_eq!(m.row(1), (&[0usize, 2][..], &[3.0, 1.0][..]));
    assert_eq!(m.max_row_nnz(), 2);
}

#[test]
fn permutation_preserves_matvec() {
    let h = chain(6, -1.0);
    let perm = Permutation::from_order(vec![3, 0, 5, 1, 4, 2]);
    let p = h.permuted(&perm);

    let x: Vec<f64> = (0..6).map(|i| i as f64 + 1.0).collect();
    let mut y = vec![0.0; 6];
    h.matvec(&x, &mut y);

    let mut px = vec![0.0; 6];
    for i in 0..6 {
        px[perm.new_index(i)] = x[i];
    }
    let mut py = vec![0.0; 6];
    p.matvec(&px, &mut py);

    for i in 0..6 {
        assert!((py[perm.new_index(i)] - y[i]).abs() < 1e-14, "row {}", i);
        assert_eq!(perm.old_index(perm.new_index(i)), i);
    }
}

#[test]
fn shift_and_scale_adds_diagonal() {
    let h = chain(3, 1.0).shifted_scaled(0.5, 2.0);
    assert_eq!(h.row(1), (&[0usize, 1, 2][..], &[2.0, -1.0, 2.0][..]));
    assert_eq!(chain(3, 1.0).shifted_scaled(0.0, 2.0).nnz(), 4);
}

#[test]
fn ell_layout_is_slot_major_and_padded() {
    let h = chain(5, 1.0);
    let ell = EllMatrix::from_csr(&h, 4);

    assert_eq!(ell.width(), 2);
    assert_eq!(ell.stride(), 8);
    assert_eq!(ell.nnz(), 8);

    // row 0 has a single neighbour; its second slot is padding
    assert_eq!(ell.indices()[ell.offset(0, 0)], 1);
    assert_eq!(ell.values()[ell.offset(0, 1)], 0.0);
    assert_eq!(ell.indices()[ell.offset(2, 0)], 1);
    assert_eq!(ell.indices()[ell.offset(2, 1)], 3);
    assert!(ell.indices().iter().all(|&c| c < 5));
}

#[test]
fn hermiticity() {
    let mut triplets = vec![(0, 1, Complex64::new(0.0, 1.0)), (1, 0, Complex64::new(0.0, -1.0))];
    let h = SparseMatrix::from_triplets(2, 2, triplets.clone());
    assert_eq!(h.hermiticity_error(), 0.0);

    triplets[1].2 = Complex64::new(0.0, 1.0);
    let h = SparseMatrix::from_triplets(2, 2, triplets);
    assert!((h.hermiticity_error() - 2.0).abs() < 1e-14);
}

#[test]
fn hamiltonian_handle_keeps_kind() {
    let h: Hamiltonian = chain(4, 1.0).into();
    assert_eq!(h.kind(), ScalarKind::Double);
    assert_eq!(h.rows(), 4);
    assert!(h.get::<f64>().is_some());
    assert!(h.get::<f32>().is_none());
    assert!(h.get::<Complex64>().is_none());
}
