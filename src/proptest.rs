//! Proptest strategies for property-based tests of assemblers and post-processing.
use crate::assembly::local::ElementAssemblyValues;
use crate::basis::SimplexP1Bases;
use crate::quadrature;
use ::proptest::prelude::*;
use nalgebra::{Matrix2, Matrix3, Point2, Point3, U2, U3};

pub fn point2() -> impl Strategy<Value = Point2<f64>> {
    // Small coordinates keep the elements well away from overflow
    let range = -10.0..10.0;
    [range.clone(), range.clone()].prop_map(|[x, y]| Point2::new(x, y))
}

pub fn point3() -> impl Strategy<Value = Point3<f64>> {
    let range = -10.0..10.0;
    [range.clone(), range.clone(), range.clone()].prop_map(|[x, y, z]| Point3::new(x, y, z))
}

/// P1 bases on a triangle with area at least `1e-2`, on nodes `0, 1, 2`.
pub fn p1_triangle() -> impl Strategy<Value = SimplexP1Bases<f64, U2>> {
    [point2(), point2(), point2()]
        .prop_filter("triangle is degenerate", |[a, b, c]| {
            Matrix2::from_columns(&[b - a, c - a]).determinant().abs() >= 2e-2
        })
        .prop_filter_map("vertices are valid", |vertices| {
            SimplexP1Bases::from_vertices(vec![0, 1, 2], vertices.to_vec()).ok()
        })
}

/// P1 bases on a tetrahedron with volume at least `1e-2`, on nodes `0, 1, 2, 3`.
pub fn p1_tetrahedron() -> impl Strategy<Value = SimplexP1Bases<f64, U3>> {
    [point3(), point3(), point3(), point3()]
        .prop_filter("tetrahedron is degenerate", |[a, b, c, d]| {
            Matrix3::from_columns(&[b - a, c - a, d - a]).determinant().abs() >= 6e-2
        })
        .prop_filter_map("vertices are valid", |vertices| {
            SimplexP1Bases::from_vertices(vec![0, 1, 2, 3], vertices.to_vec()).ok()
        })
}

/// Isoparametric P1 assembly values on an arbitrary triangle with a degree 2 quadrature.
pub fn p1_triangle_values() -> impl Strategy<Value = ElementAssemblyValues<f64, U2>> {
    p1_triangle().prop_filter_map("assembly values can be computed", |bases| {
        let (weights, points) = quadrature::simplex::<f64, U2>(2).ok()?;
        ElementAssemblyValues::compute(0, &bases, &bases, &weights, &points).ok()
    })
}

/// Isoparametric P1 assembly values on an arbitrary tetrahedron with a degree 2 quadrature.
pub fn p1_tetrahedron_values() -> impl Strategy<Value = ElementAssemblyValues<f64, U3>> {
    p1_tetrahedron().prop_filter_map("assembly values can be computed", |bases| {
        let (weights, points) = quadrature::simplex::<f64, U3>(2).ok()?;
        ElementAssemblyValues::compute(0, &bases, &bases, &weights, &points).ok()
    })
}
