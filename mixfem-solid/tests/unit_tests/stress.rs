use crate::unit_tests::{steel, unit_lame_parameters, unit_material, unit_square_bases};
use matrixcompare::{assert_matrix_eq, assert_scalar_eq};
use mixfem::basis::{ElementBases, SimplexP1Bases};
use mixfem::nalgebra::{matrix, DMatrix, DVector, Matrix2, Matrix3, Point2, Point3, U2};
use mixfem::proptest::{p1_tetrahedron, p1_triangle};
use mixfem_solid::assemblers::Formulation;
use mixfem_solid::materials::MaterialParameters;
use mixfem_solid::stress::{
    compute_stress_tensor, compute_stress_tensor_flat, compute_von_mises_stresses, stress_from_gradient,
    von_mises_stress,
};
use proptest::prelude::*;

/// Nodal displacements of the affine field `u = G x` on the unit square.
fn affine_displacement(gradient: &Matrix2<f64>) -> DVector<f64> {
    let vertices = [
        Point2::new(0.0, 0.0),
        Point2::new(1.0, 0.0),
        Point2::new(1.0, 1.0),
        Point2::new(0.0, 1.0),
    ];
    DVector::from_iterator(8, vertices.iter().flat_map(|x| (gradient * x.coords).iter().copied().collect::<Vec<_>>()))
}

fn gradient_2d() -> Matrix2<f64> {
    matrix![1.0, 2.0;
            3.0, 4.0]
}

#[test]
fn stress_of_affine_displacement() {
    let bases = unit_square_bases();
    let displacement = affine_displacement(&gradient_2d());
    let points = [Point2::new(1.0 / 3.0, 1.0 / 3.0), Point2::new(0.1, 0.7)];

    let stresses = compute_stress_tensor(
        &unit_material(),
        Formulation::Linear,
        1,
        &bases[1],
        &bases[1],
        &points,
        &displacement,
    )
    .unwrap();
    assert_eq!(stresses.len(), 2);
    for sigma in stresses {
        // ε = [[1, 2.5], [2.5, 4]], σ = tr(ε) I + 2 ε
        assert_matrix_eq!(sigma, matrix![7.0, 5.0; 5.0, 13.0], comp = abs, tol = 1e-12);
    }

    // A compressible material keeps its volumetric stress under the mixed formulation
    let mixed = compute_stress_tensor(
        &unit_material(),
        Formulation::Incompressible,
        0,
        &bases[0],
        &bases[0],
        &points,
        &displacement,
    )
    .unwrap();
    assert_matrix_eq!(mixed[0], matrix![7.0, 5.0; 5.0, 13.0], comp = abs, tol = 1e-12);
}

#[test]
fn stress_in_incompressible_limit_is_deviatoric() {
    let bases = unit_square_bases();
    let displacement = affine_displacement(&gradient_2d());
    let points = [Point2::new(0.2, 0.3)];
    let mut material = MaterialParameters::new();
    material.init_multimaterial(true, &[3.0, 3.0], &[0.5, 0.5], true).unwrap();

    let stresses = compute_stress_tensor(
        &material,
        Formulation::Incompressible,
        0,
        &bases[0],
        &bases[0],
        &points,
        &displacement,
    )
    .unwrap();
    // mu = 1 and lambda vanishes in the limit, so sigma = 2 eps
    assert_matrix_eq!(stresses[0], matrix![2.0, 5.0; 5.0, 8.0], comp = abs, tol = 1e-12);

    let err = compute_stress_tensor(
        &material,
        Formulation::Linear,
        0,
        &bases[0],
        &bases[0],
        &points,
        &displacement,
    )
    .unwrap_err();
    assert!(err.is_configuration());
}

#[test]
fn flat_stress_is_row_major() {
    let bases = unit_square_bases();
    let displacement = affine_displacement(&gradient_2d());
    let points = [Point2::new(0.25, 0.25)];
    let mut material = MaterialParameters::uniform(unit_lame_parameters());
    material.set_size(2);

    let flat = compute_stress_tensor_flat(&material, Formulation::Linear, 0, &bases[0], &bases[0], &points, &displacement)
        .unwrap();
    assert_matrix_eq!(flat, DMatrix::from_row_slice(1, 4, &[7.0, 5.0, 5.0, 13.0]), comp = abs, tol = 1e-12);

    let skewed = affine_displacement(&matrix![0.0, 1.0; 0.0, 0.0]);
    let flat = compute_stress_tensor_flat(&material, Formulation::Linear, 0, &bases[0], &bases[0], &points, &skewed)
        .unwrap();
    // σ_xy = σ_yx = µ
    assert_matrix_eq!(flat, DMatrix::from_row_slice(1, 4, &[0.0, 1.0, 1.0, 0.0]), comp = abs, tol = 1e-12);
}

#[test]
fn von_mises_of_uniaxial_and_shear_stress() {
    assert_scalar_eq!(von_mises_stress(&matrix![3.0, 0.0; 0.0, 0.0]), 3.0, comp = abs, tol = 1e-12);
    assert_scalar_eq!(von_mises_stress(&matrix![-3.0, 0.0, 0.0; 0.0, 0.0, 0.0; 0.0, 0.0, 0.0]), 3.0, comp = abs, tol = 1e-12);

    let tau: f64 = 2.0;
    assert_scalar_eq!(von_mises_stress(&matrix![0.0, tau; tau, 0.0]), 3f64.sqrt() * tau, comp = abs, tol = 1e-12);
    let shear_3d = matrix![0.0, 0.0, 0.0;
                           0.0, 0.0, tau;
                           0.0, tau, 0.0];
    assert_scalar_eq!(von_mises_stress(&shear_3d), 3f64.sqrt() * tau, comp = abs, tol = 1e-12);

    // Hydrostatic stress has no deviatoric part
    assert_scalar_eq!(von_mises_stress(&(Matrix3::identity() * 5.0)), 0.0, comp = abs, tol = 1e-12);
}

#[test]
fn von_mises_stresses_of_element() {
    let bases = unit_square_bases();
    let displacement = affine_displacement(&gradient_2d());
    let points = [Point2::new(0.2, 0.2), Point2::new(0.6, 0.3)];
    let stresses = compute_von_mises_stresses(
        &unit_material(),
        Formulation::Linear,
        0,
        &bases[0],
        &bases[0],
        &points,
        &displacement,
    )
    .unwrap();
    // sqrt(7² - 7 * 13 + 13² + 3 * 5²)
    let expected = 202f64.sqrt();
    assert_eq!(stresses.len(), 2);
    for vm in stresses {
        assert_scalar_eq!(vm, expected, comp = abs, tol = 1e-10);
    }
}

#[test]
fn stress_rejects_inconsistent_input() {
    let bases = unit_square_bases();
    let points = [Point2::new(0.2, 0.2)];
    let compute = |material: &MaterialParameters<f64>, bases: &SimplexP1Bases<f64, U2>, displacement: &DVector<f64>| {
        compute_stress_tensor(material, Formulation::Linear, 0, bases, bases, &points, displacement)
    };

    // Not a 2D field
    let err = compute(&unit_material(), &bases[0], &DVector::zeros(7)).unwrap_err();
    assert!(err.is_domain());

    // Node 2 of the element has no displacement
    let err = compute(&unit_material(), &bases[0], &DVector::zeros(4)).unwrap_err();
    assert!(err.is_domain());

    let mut bounded = unit_material();
    bounded.set_size(0);
    let err = compute(&bounded, &bases[0], &DVector::zeros(8)).unwrap_err();
    assert!(err.is_domain());

    let err = compute(&MaterialParameters::new(), &bases[0], &DVector::zeros(8)).unwrap_err();
    assert!(err.is_configuration());

    let degenerate = SimplexP1Bases::from_vertices(
        vec![0, 1, 2],
        vec![Point2::new(0.0, 0.0), Point2::new(1.0, 1.0), Point2::new(2.0, 2.0)],
    )
    .unwrap();
    let err = compute(&unit_material(), &degenerate, &DVector::zeros(8)).unwrap_err();
    assert!(err.is_domain());
}

fn gradient2() -> impl Strategy<Value = Matrix2<f64>> {
    proptest::array::uniform4(-1.0..1.0).prop_map(|g: [f64; 4]| Matrix2::from_row_slice(&g))
}

fn gradient3() -> impl Strategy<Value = Matrix3<f64>> {
    proptest::array::uniform9(-1.0..1.0).prop_map(|g: [f64; 9]| Matrix3::from_row_slice(&g))
}

proptest! {
    #[test]
    fn uniform_strain_gives_uniform_stress_2d(bases in p1_triangle(), gradient in gradient2()) {
        let displacement = DVector::from_iterator(
            6,
            (0..3).flat_map(|k| {
                let x = bases.node_coordinates(k).unwrap();
                (gradient * x.coords).iter().copied().collect::<Vec<_>>()
            }),
        );
        let points = [Point2::new(1.0 / 3.0, 1.0 / 3.0), Point2::new(0.6, 0.1)];
        let material = MaterialParameters::uniform(steel());

        let stresses = compute_stress_tensor(&material, Formulation::Linear, 0, &bases, &bases, &points, &displacement)
            .unwrap();
        let expected = stress_from_gradient(&gradient, &steel());
        for sigma in stresses {
            assert_matrix_eq!(sigma, expected, comp = abs, tol = 1e-6 * expected.amax().max(1.0));
        }
    }

    #[test]
    fn uniform_strain_gives_uniform_stress_3d(bases in p1_tetrahedron(), gradient in gradient3()) {
        let displacement = DVector::from_iterator(
            12,
            (0..4).flat_map(|k| {
                let x = bases.node_coordinates(k).unwrap();
                (gradient * x.coords).iter().copied().collect::<Vec<_>>()
            }),
        );
        let points = [Point3::new(0.25, 0.25, 0.25)];
        let material = MaterialParameters::uniform(steel());

        for formulation in [Formulation::Linear, Formulation::Incompressible] {
            let stresses = compute_stress_tensor(&material, formulation, 0, &bases, &bases, &points, &displacement)
                .unwrap();
            let expected = stress_from_gradient(&gradient, &steel());
            assert_matrix_eq!(stresses[0], expected, comp = abs, tol = 1e-6 * expected.amax().max(1.0));
        }
    }

    #[test]
    fn rigid_rotation_is_stress_free(bases in p1_triangle(), angle in -0.1..0.1f64) {
        // Infinitesimal rotation u = (-θ y, θ x)
        let gradient = matrix![0.0, -angle; angle, 0.0];
        let displacement = DVector::from_iterator(
            6,
            (0..3).flat_map(|k| {
                let x = bases.node_coordinates(k).unwrap();
                (gradient * x.coords).iter().copied().collect::<Vec<_>>()
            }),
        );
        let points = [Point2::new(0.2, 0.3)];
        let material = MaterialParameters::uniform(steel());
        let vm = compute_von_mises_stresses(&material, Formulation::Linear, 0, &bases, &bases, &points, &displacement)
            .unwrap();
        prop_assert!(vm[0].abs() <= 1e-5 * steel().mu * angle.abs().max(1e-3));
    }
}
