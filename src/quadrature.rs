//! Tabulated quadrature rules on the unit reference simplex.
//!
//! Rule generation is not the business of this crate; the few tables here exist so that
//! element assembly values can be computed for simplicial elements. The reference simplex has
//! vertices $\vec 0, \vec e_1, \dots, \vec e_d$.
use crate::allocators::DimAllocator;
use crate::error::{Error, Result};
use crate::{Real, SmallDim};
use nalgebra::{DefaultAllocator, OPoint, OVector, U2, U3};
use numeric_literals::replace_float_literals;

pub type QuadraturePair<T, D> = (Vec<T>, Vec<OPoint<T, D>>);
pub type QuadraturePair2d<T> = QuadraturePair<T, U2>;
pub type QuadraturePair3d<T> = QuadraturePair<T, U3>;

fn point_from_coords<T, D>(coords: &[T]) -> OPoint<T, D>
where
    T: Real,
    D: SmallDim,
    DefaultAllocator: DimAllocator<T, D>,
{
    OPoint::from(OVector::<T, D>::from_column_slice(coords))
}

/// Returns a quadrature rule on the reference triangle (2D) or tetrahedron (3D) that integrates
/// polynomials up to the given total degree exactly.
///
/// Degrees 1 and 2 are tabulated.
#[replace_float_literals(T::from_f64(literal).expect("literal must fit in T"))]
pub fn simplex<T, D>(strength: usize) -> Result<QuadraturePair<T, D>>
where
    T: Real,
    D: SmallDim,
    DefaultAllocator: DimAllocator<T, D>,
{
    let (weights, coords): (Vec<T>, Vec<Vec<T>>) = match (D::dim(), strength) {
        (2, 0) | (2, 1) => (vec![0.5], vec![vec![1.0 / 3.0, 1.0 / 3.0]]),
        (2, 2) => (
            vec![1.0 / 6.0; 3],
            vec![
                vec![1.0 / 6.0, 1.0 / 6.0],
                vec![2.0 / 3.0, 1.0 / 6.0],
                vec![1.0 / 6.0, 2.0 / 3.0],
            ],
        ),
        (3, 0) | (3, 1) => (vec![1.0 / 6.0], vec![vec![0.25, 0.25, 0.25]]),
        (3, 2) => {
            let a = 0.5854101966249685;
            let b = 0.1381966011250105;
            (
                vec![1.0 / 24.0; 4],
                vec![vec![a, b, b], vec![b, a, b], vec![b, b, a], vec![b, b, b]],
            )
        }
        (d, s) => {
            return Err(Error::domain(format!(
                "no tabulated simplex quadrature of strength {} in {} dimensions",
                s, d
            )))
        }
    };

    let points = coords.iter().map(|c| point_from_coords(c)).collect();
    Ok((weights, points))
}
