//! Vector-valued problems: elasticity and Stokes-like flow.
use crate::assembly::local::RhsAssembler;
use crate::autodiff::{HessianPoint, HessianScalar};
use crate::error::Result;
use crate::mesh::BoundaryTag;
use crate::problem::{
    check_points, check_tagged_points, evaluate_rows, gradients_from_solution, rhs_from_solution,
    values_from_solution, zero_values, BoundaryTags, Problem,
};
use nalgebra::{DMatrix, DVector};

/// Linear elasticity benchmark with a clamped side, a displaced side and a loaded side.
///
/// Facets tagged 1 are clamped, facets tagged 2 are displaced by `0.1` in `x` and facets
/// tagged 3 carry the traction `(0, -0.1)`. The body force vanishes.
#[derive(Debug, Clone)]
pub struct ElasticProblem {
    tags: BoundaryTags,
}

impl ElasticProblem {
    pub const CLAMPED: BoundaryTag = 1;
    pub const DISPLACED: BoundaryTag = 2;
    pub const LOADED: BoundaryTag = 3;

    pub fn new() -> Self {
        Self {
            tags: BoundaryTags::new()
                .with_dirichlet([Self::CLAMPED, Self::DISPLACED])
                .with_neumann([Self::LOADED]),
        }
    }
}

impl Default for ElasticProblem {
    fn default() -> Self {
        Self::new()
    }
}

impl Problem for ElasticProblem {
    fn name(&self) -> &str {
        "Elastic"
    }

    fn boundary_tags(&self) -> &BoundaryTags {
        &self.tags
    }

    fn is_scalar(&self) -> bool {
        false
    }

    fn has_exact_sol(&self) -> bool {
        false
    }

    fn is_rhs_zero(&self) -> bool {
        true
    }

    fn rhs(&self, _assembler: &dyn RhsAssembler<f64>, pts: &DMatrix<f64>, _t: f64) -> Result<DMatrix<f64>> {
        let dim = check_points(pts)?;
        Ok(zero_values(pts, dim))
    }

    fn bc(&self, tags: &[BoundaryTag], pts: &DMatrix<f64>, _t: f64) -> Result<DMatrix<f64>> {
        let dim = check_tagged_points(tags, pts)?;
        let mut values = zero_values(pts, dim);
        for (i, &tag) in tags.iter().enumerate() {
            if tag == Self::DISPLACED {
                values[(i, 0)] = 0.1;
            }
        }
        Ok(values)
    }

    fn neumann_bc(
        &self,
        tags: &[BoundaryTag],
        pts: &DMatrix<f64>,
        _normals: &DMatrix<f64>,
        _t: f64,
    ) -> Result<DMatrix<f64>> {
        let dim = check_tagged_points(tags, pts)?;
        let mut values = zero_values(pts, dim);
        for (i, &tag) in tags.iter().enumerate() {
            if tag == Self::LOADED {
                values[(i, 1)] = -0.1;
            }
        }
        Ok(values)
    }

    fn initial_solution(&self, pts: &DMatrix<f64>) -> Result<DMatrix<f64>> {
        let dim = check_points(pts)?;
        Ok(zero_values(pts, dim))
    }
}

/// Elasticity with a polynomial exact displacement.
///
/// In 2D
/// $$ u_x = (y^3 + x^2 + xy) / 20, \qquad u_y = (3x^4 + xy^2 + x) / 20, $$
/// and in 3D the same fields extended by terms in $z$ together with
/// $u_z = (xz + y^2 + z^2) / 20$.
#[derive(Debug, Clone, Default)]
pub struct ElasticExactProblem {
    tags: BoundaryTags,
}

impl ElasticExactProblem {
    pub fn new() -> Self {
        Self::default()
    }

    fn solution(p: &[f64]) -> Result<HessianPoint<f64>> {
        let s = 1.0 / 20.0;
        let (x, y) = (p[0], p[1]);
        let components = if p.len() == 2 {
            vec![
                HessianScalar::new(
                    s * (y * y * y + x * x + x * y),
                    DVector::from_column_slice(&[2.0 * x + y, 3.0 * y * y + x]) * s,
                    DMatrix::from_row_slice(2, 2, &[2.0, 1.0, 1.0, 6.0 * y]) * s,
                ),
                HessianScalar::new(
                    s * (3.0 * x.powi(4) + x * y * y + x),
                    DVector::from_column_slice(&[12.0 * x.powi(3) + y * y + 1.0, 2.0 * x * y]) * s,
                    DMatrix::from_row_slice(2, 2, &[36.0 * x * x, 2.0 * y, 2.0 * y, 2.0 * x]) * s,
                ),
            ]
        } else {
            let z = p[2];
            vec![
                HessianScalar::new(
                    s * (y * y * y + x * x + x * y + 6.0 * z),
                    DVector::from_column_slice(&[2.0 * x + y, 3.0 * y * y + x, 6.0]) * s,
                    DMatrix::from_row_slice(3, 3, &[2.0, 1.0, 0.0, 1.0, 6.0 * y, 0.0, 0.0, 0.0, 0.0]) * s,
                ),
                HessianScalar::new(
                    s * (3.0 * x.powi(4) + x * y * y + x + z * z * z),
                    DVector::from_column_slice(&[12.0 * x.powi(3) + y * y + 1.0, 2.0 * x * y, 3.0 * z * z]) * s,
                    DMatrix::from_row_slice(
                        3,
                        3,
                        &[36.0 * x * x, 2.0 * y, 0.0, 2.0 * y, 2.0 * x, 0.0, 0.0, 0.0, 6.0 * z],
                    ) * s,
                ),
                HessianScalar::new(
                    s * (x * z + y * y + z * z),
                    DVector::from_column_slice(&[z, 2.0 * y, x + 2.0 * z]) * s,
                    DMatrix::from_row_slice(3, 3, &[0.0, 0.0, 1.0, 0.0, 2.0, 0.0, 1.0, 0.0, 2.0]) * s,
                ),
            ]
        };
        HessianPoint::from_components(components)
    }
}

impl Problem for ElasticExactProblem {
    fn name(&self) -> &str {
        "ElasticExact"
    }

    fn boundary_tags(&self) -> &BoundaryTags {
        &self.tags
    }

    fn is_scalar(&self) -> bool {
        false
    }

    fn has_exact_sol(&self) -> bool {
        true
    }

    fn is_rhs_zero(&self) -> bool {
        false
    }

    fn rhs(&self, assembler: &dyn RhsAssembler<f64>, pts: &DMatrix<f64>, _t: f64) -> Result<DMatrix<f64>> {
        rhs_from_solution(assembler, pts, Self::solution)
    }

    fn bc(&self, tags: &[BoundaryTag], pts: &DMatrix<f64>, t: f64) -> Result<DMatrix<f64>> {
        check_tagged_points(tags, pts)?;
        self.exact(pts, t)
    }

    fn neumann_bc(
        &self,
        tags: &[BoundaryTag],
        pts: &DMatrix<f64>,
        _normals: &DMatrix<f64>,
        _t: f64,
    ) -> Result<DMatrix<f64>> {
        let dim = check_tagged_points(tags, pts)?;
        Ok(zero_values(pts, dim))
    }

    fn initial_solution(&self, pts: &DMatrix<f64>) -> Result<DMatrix<f64>> {
        self.exact(pts, 0.0)
    }

    fn exact(&self, pts: &DMatrix<f64>, _t: f64) -> Result<DMatrix<f64>> {
        let dim = check_points(pts)?;
        values_from_solution(pts, dim, Self::solution)
    }

    fn exact_grad(&self, pts: &DMatrix<f64>, _t: f64) -> Result<DMatrix<f64>> {
        let dim = check_points(pts)?;
        gradients_from_solution(pts, dim * dim, Self::solution)
    }
}

/// Lid-driven cavity flow.
///
/// The whole boundary is Dirichlet. Facets tagged [`LID`](Self::LID) move tangentially with
/// unit velocity in `x`, all other walls are at rest.
#[derive(Debug, Clone, Default)]
pub struct DrivenCavityProblem {
    tags: BoundaryTags,
}

impl DrivenCavityProblem {
    pub const LID: BoundaryTag = 4;

    pub fn new() -> Self {
        Self::default()
    }
}

impl Problem for DrivenCavityProblem {
    fn name(&self) -> &str {
        "DrivenCavity"
    }

    fn boundary_tags(&self) -> &BoundaryTags {
        &self.tags
    }

    fn is_scalar(&self) -> bool {
        false
    }

    fn has_exact_sol(&self) -> bool {
        false
    }

    fn is_rhs_zero(&self) -> bool {
        true
    }

    fn rhs(&self, _assembler: &dyn RhsAssembler<f64>, pts: &DMatrix<f64>, _t: f64) -> Result<DMatrix<f64>> {
        let dim = check_points(pts)?;
        Ok(zero_values(pts, dim))
    }

    fn bc(&self, tags: &[BoundaryTag], pts: &DMatrix<f64>, _t: f64) -> Result<DMatrix<f64>> {
        let dim = check_tagged_points(tags, pts)?;
        evaluate_rows(pts, dim, |i, _| {
            let mut velocity = vec![0.0; dim];
            if tags[i] == Self::LID {
                velocity[0] = 1.0;
            }
            Ok(velocity)
        })
    }

    fn neumann_bc(
        &self,
        tags: &[BoundaryTag],
        pts: &DMatrix<f64>,
        _normals: &DMatrix<f64>,
        _t: f64,
    ) -> Result<DMatrix<f64>> {
        let dim = check_tagged_points(tags, pts)?;
        Ok(zero_values(pts, dim))
    }

    fn initial_solution(&self, pts: &DMatrix<f64>) -> Result<DMatrix<f64>> {
        let dim = check_points(pts)?;
        Ok(zero_values(pts, dim))
    }
}
