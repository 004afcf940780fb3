//! Copy-on-write behavior and storage conversions across the three
//! container kinds.

use pretty_assertions::assert_eq;
use subset_octave_array::{Array, Complex64, DiagArray2, Dims, SparseArray};

#[test]
fn test_clone_shares_until_write() {
    let a = Array::from_vec(Dims::matrix(2, 2), vec![1.0, 2.0, 3.0, 4.0]).unwrap();
    let mut b = a.clone();
    assert!(b.shares_buffer_with(&a));
    assert_eq!(a.ref_count(), 2);

    b.set_linear(3, 40.0).unwrap();
    assert!(!b.shares_buffer_with(&a));
    assert!(!a.is_shared());
    assert_eq!(a.to_vec(), vec![1.0, 2.0, 3.0, 4.0]);
    assert_eq!(b.to_vec(), vec![1.0, 2.0, 3.0, 40.0]);
}

#[test]
fn test_unique_handle_writes_in_place() {
    let mut a = Array::row_vector(vec![1, 2, 3]);
    let before = a.as_slice().as_ptr();
    a.set_linear(0, 9).unwrap();
    assert_eq!(a.as_slice().as_ptr(), before);
}

#[test]
fn test_index_past_end_is_an_error() {
    let mut a = Array::row_vector(vec![1.0, 2.0]);
    assert!(a.set_linear(2, 3.0).is_err());
    assert!(a.linear(5).is_err());
    assert!(a.element(&[0, 2]).is_err());
}

#[test]
fn test_invalid_dimensions_rejected() {
    assert!(Array::construct(&[2, -1], 0.0).is_err());
    assert!(Array::construct(&[1 << 40, 1 << 40], 0.0).is_err());
    let a = Array::construct(&[0, 3], 0.0).unwrap();
    assert_eq!(a.numel(), 0);
    assert_eq!(a.dims().as_slice(), &[0, 3]);
}

#[test]
fn test_diag_round_trip_through_full() {
    let d = DiagArray2::from_diagonal(vec![1.0, 2.0, 3.0]);
    let full = d.to_full();
    assert_eq!(full.dims().as_slice(), &[3, 3]);
    assert_eq!(full.linear(4).unwrap(), &2.0);
    assert_eq!(full.linear(1).unwrap(), &0.0);
    let back = DiagArray2::from_full(&full).unwrap();
    assert_eq!(back.diagonal(), d.diagonal());

    let not_diag = Array::from_vec(Dims::matrix(2, 2), vec![1.0, 1.0, 0.0, 1.0]).unwrap();
    assert!(DiagArray2::from_full(&not_diag).is_none());
}

#[test]
fn test_diag_clone_is_independent() {
    let d = DiagArray2::from_diagonal(vec![1.0, 2.0]);
    let e = d.clone().scale(10.0);
    assert_eq!(d.diagonal(), &[1.0, 2.0]);
    assert_eq!(e.diagonal(), &[10.0, 20.0]);
}

#[test]
fn test_sparse_matches_dense() {
    let dense = Array::from_vec(Dims::matrix(2, 3), vec![0.0, 1.0, 0.0, 0.0, 2.0, 0.0]).unwrap();
    let s = SparseArray::from_dense(&dense).unwrap();
    assert_eq!(s.nnz(), 2);
    assert_eq!(s.to_dense(), dense);
    assert_eq!(s.transpose().to_dense(), dense.transpose().unwrap());
}

#[test]
fn test_sparse_duplicates_sum_and_cancel() {
    let s = SparseArray::from_triplets(2, 2, vec![(0, 0, 1.0), (0, 0, 2.0), (1, 0, 5.0)]).unwrap();
    assert_eq!(s.element(0, 0).unwrap(), 3.0);
    let zeroed = s.sub(&s).unwrap();
    assert_eq!(zeroed.nnz(), 0);
}

#[test]
fn test_sparse_clone_is_independent() {
    let s = SparseArray::from_triplets(2, 2, vec![(0, 0, Complex64::new(1.0, 1.0))]).unwrap();
    let mut t = s.clone();
    t.set_element(1, 1, Complex64::new(2.0, 0.0)).unwrap();
    assert_eq!(s.nnz(), 1);
    assert_eq!(t.nnz(), 2);
    assert_eq!(s.conjugate().element(0, 0).unwrap(), Complex64::new(1.0, -1.0));
}
