//! Property tests for connectome normalization.

use proptest::prelude::*;
use qc_core::{ConnectomeProfile, degree, map_to_labels, symmetrize};
use qc_model::Matrix;

fn symmetric_matrix(max_size: usize) -> impl Strategy<Value = Matrix> {
    (1..=max_size).prop_flat_map(|n| {
        prop::collection::vec(-1.0e6..1.0e6_f64, n * n).prop_map(move |values| {
            let mut m = Matrix::zeros(n, n);
            for row in 0..n {
                for col in row..n {
                    let value = values[row * n + col];
                    m.set(row, col, value);
                    m.set(col, row, value);
                }
            }
            m
        })
    })
}

fn square_matrix(max_size: usize) -> impl Strategy<Value = Matrix> {
    (2..=max_size).prop_flat_map(|n| {
        prop::collection::vec(0.0..100.0_f64, n * n).prop_map(move |values| {
            Matrix::from_rows(values.chunks(n).map(<[f64]>::to_vec).collect()).unwrap()
        })
    })
}

proptest! {
    #[test]
    fn symmetrize_keeps_symmetric_matrices(m in symmetric_matrix(12)) {
        let out = symmetrize(&m).unwrap();
        prop_assert_eq!(out, m);
    }

    #[test]
    fn symmetrize_is_idempotent(m in square_matrix(12)) {
        let once = symmetrize(&m).unwrap();
        let twice = symmetrize(&once).unwrap();
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn degree_is_independent_of_processing_order(a in square_matrix(8), b in square_matrix(8)) {
        let first_a = ConnectomeProfile::Geodesic.process(&a).unwrap().degree;
        let first_b = ConnectomeProfile::Geodesic.process(&b).unwrap().degree;
        let second_b = ConnectomeProfile::Geodesic.process(&b).unwrap().degree;
        let second_a = ConnectomeProfile::Geodesic.process(&a).unwrap().degree;
        prop_assert_eq!(first_a, second_a);
        prop_assert_eq!(first_b, second_b);
    }

    #[test]
    fn degree_has_one_value_per_region(m in square_matrix(10)) {
        prop_assert_eq!(degree(&m, false).unwrap().len(), m.rows());
    }

    #[test]
    fn mapped_surface_has_one_value_per_vertex(labels in prop::collection::vec(0i64..6, 1..200)) {
        let regions = {
            let mut distinct: Vec<i64> = labels.iter().copied().filter(|&l| l != 0).collect();
            distinct.sort_unstable();
            distinct.dedup();
            distinct.len()
        };
        let values: Vec<f64> = (0..regions).map(|i| i as f64).collect();
        let mapped = map_to_labels(&values, &labels).unwrap();
        prop_assert_eq!(mapped.len(), labels.len());
        for (label, value) in labels.iter().zip(&mapped) {
            prop_assert_eq!(*label == 0, value.is_nan());
        }
    }
}
