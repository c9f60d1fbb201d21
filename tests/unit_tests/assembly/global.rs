use crate::unit_tests::unit_square_bases;
use matrixcompare::assert_matrix_eq;
use mixfem::assembly::global::{assemble_block_triplets, triplets_to_dense, BlockOffset, Triplet};
use mixfem::assembly::local::{ElementAssemblyValues, LaplaceOperator};
use mixfem::nalgebra::{matrix, U2};
use mixfem::{quadrature, Error};

fn unit_square_values() -> Vec<ElementAssemblyValues<f64, U2>> {
    let (weights, points) = quadrature::simplex::<f64, U2>(2).unwrap();
    unit_square_bases()
        .iter()
        .enumerate()
        .map(|(e, bases)| ElementAssemblyValues::compute(e, bases, bases, &weights, &points).unwrap())
        .collect()
}

#[test]
fn laplace_stiffness_of_unit_square() {
    let values = unit_square_values();
    let triplets = assemble_block_triplets(&LaplaceOperator, &values, &values, BlockOffset::default()).unwrap();
    // Shared nodes appear once per incident element
    assert_eq!(triplets.len(), 2 * 9);

    let k = triplets_to_dense(4, 4, &triplets).unwrap();
    #[rustfmt::skip]
    let expected = matrix![ 1.0, -0.5,  0.0, -0.5;
                           -0.5,  1.0, -0.5,  0.0;
                            0.0, -0.5,  1.0, -0.5;
                           -0.5,  0.0, -0.5,  1.0];
    assert_matrix_eq!(k, expected, comp = abs, tol = 1e-14);
}

#[test]
fn block_offset_shifts_rows_and_columns() {
    let values = unit_square_values();
    let offset = BlockOffset::new(3, 5);
    let plain = assemble_block_triplets(&LaplaceOperator, &values, &values, BlockOffset::default()).unwrap();
    let shifted = assemble_block_triplets(&LaplaceOperator, &values, &values, offset).unwrap();

    assert_eq!(plain.len(), shifted.len());
    for (a, b) in plain.iter().zip(&shifted) {
        assert_eq!(a.row + 3, b.row);
        assert_eq!(a.col + 5, b.col);
        assert_eq!(a.value, b.value);
    }
}

#[test]
fn mismatched_element_lists_are_rejected() {
    let values = unit_square_values();
    let report = assemble_block_triplets(&LaplaceOperator, &values, &values[..1], BlockOffset::default()).unwrap_err();
    let err = report.downcast_ref::<Error>().unwrap();
    assert!(err.is_domain());

    let swapped = vec![values[1].clone(), values[0].clone()];
    let report = assemble_block_triplets(&LaplaceOperator, &values, &swapped, BlockOffset::default()).unwrap_err();
    assert!(report.downcast_ref::<Error>().unwrap().is_domain());
}

#[test]
fn triplets_to_dense_sums_duplicates_and_checks_bounds() {
    let triplets = vec![
        Triplet { row: 0, col: 1, value: 1.5 },
        Triplet { row: 0, col: 1, value: 2.0 },
        Triplet { row: 1, col: 0, value: -1.0 },
    ];
    let m = triplets_to_dense(2, 2, &triplets).unwrap();
    assert_matrix_eq!(m, matrix![0.0, 3.5; -1.0, 0.0]);

    let out_of_bounds = [Triplet { row: 2, col: 0, value: 1.0 }];
    let report = triplets_to_dense(2, 2, &out_of_bounds).unwrap_err();
    assert!(report.downcast_ref::<Error>().unwrap().is_domain());
}
