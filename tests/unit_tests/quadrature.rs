use matrixcompare::assert_scalar_eq;
use mixfem::nalgebra::{U2, U3};
use mixfem::quadrature;

#[test]
fn simplex_weights_sum_to_reference_volume() {
    for strength in 0..=2 {
        let (weights, _) = quadrature::simplex::<f64, U2>(strength).unwrap();
        assert_scalar_eq!(weights.iter().sum::<f64>(), 0.5, comp = abs, tol = 1e-14);
        let (weights, _) = quadrature::simplex::<f64, U3>(strength).unwrap();
        assert_scalar_eq!(weights.iter().sum::<f64>(), 1.0 / 6.0, comp = abs, tol = 1e-14);
    }
}

#[test]
fn simplex_rules_integrate_quadratics_exactly() {
    // ∫ x^2 over the reference triangle is 1/12, ∫ xy is 1/24
    let (weights, points) = quadrature::simplex::<f64, U2>(2).unwrap();
    let xx: f64 = weights.iter().zip(&points).map(|(w, p)| w * p.x * p.x).sum();
    let xy: f64 = weights.iter().zip(&points).map(|(w, p)| w * p.x * p.y).sum();
    assert_scalar_eq!(xx, 1.0 / 12.0, comp = abs, tol = 1e-14);
    assert_scalar_eq!(xy, 1.0 / 24.0, comp = abs, tol = 1e-14);

    // ∫ x^2 over the reference tetrahedron is 1/60, ∫ yz is 1/120
    let (weights, points) = quadrature::simplex::<f64, U3>(2).unwrap();
    let xx: f64 = weights.iter().zip(&points).map(|(w, p)| w * p.x * p.x).sum();
    let yz: f64 = weights.iter().zip(&points).map(|(w, p)| w * p.y * p.z).sum();
    assert_scalar_eq!(xx, 1.0 / 60.0, comp = abs, tol = 1e-14);
    assert_scalar_eq!(yz, 1.0 / 120.0, comp = abs, tol = 1e-14);
}

#[test]
fn unsupported_strength_is_a_domain_error() {
    assert!(quadrature::simplex::<f64, U2>(3).unwrap_err().is_domain());
}
