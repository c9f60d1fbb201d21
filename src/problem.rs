//! PDE problem definitions.
//!
//! A [`Problem`] is a strategy object that provides the data of a boundary value problem:
//! the right-hand side, Dirichlet and Neumann boundary values, initial conditions and, where
//! available, the exact solution. Problems are selected by name from a [`ProblemRegistry`].
//!
//! All evaluators take points as an `n x dim` matrix (one point per row) and return an
//! `n x s` matrix, where `s` is the size of the field (1 for scalar problems, `dim` otherwise).
//! Boundary evaluators additionally receive the boundary tag of each point.
use crate::assembly::local::RhsAssembler;
use crate::autodiff::HessianPoint;
use crate::error::{Error, Result};
use crate::mesh::{BoundaryMesh, BoundaryTag};
use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt::Debug;

mod elastic;
mod generic;
mod registry;
mod scalar;

pub use elastic::*;
pub use generic::*;
pub use registry::*;
pub use scalar::*;

/// The boundary tag sets of a problem.
///
/// An empty Dirichlet set means that the whole boundary is Dirichlet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoundaryTags {
    pub dirichlet: BTreeSet<BoundaryTag>,
    pub neumann: BTreeSet<BoundaryTag>,
    pub pressure: BTreeSet<BoundaryTag>,
}

impl BoundaryTags {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_dirichlet(mut self, tags: impl IntoIterator<Item = BoundaryTag>) -> Self {
        self.dirichlet.extend(tags);
        self
    }

    pub fn with_neumann(mut self, tags: impl IntoIterator<Item = BoundaryTag>) -> Self {
        self.neumann.extend(tags);
        self
    }

    pub fn with_pressure(mut self, tags: impl IntoIterator<Item = BoundaryTag>) -> Self {
        self.pressure.extend(tags);
        self
    }

    pub fn clear(&mut self) {
        self.dirichlet.clear();
        self.neumann.clear();
        self.pressure.clear();
    }
}

/// A boundary value problem.
///
/// The capabilities `rhs`, `bc`, `neumann_bc` and `initial_solution` have no defaults and must be
/// provided by every problem. Errors are returned for inputs of the wrong shape and for
/// capabilities a problem does not have (e.g. `exact` without an exact solution).
pub trait Problem: Debug + Send + Sync {
    fn name(&self) -> &str;

    fn boundary_tags(&self) -> &BoundaryTags;

    fn is_scalar(&self) -> bool;

    fn has_exact_sol(&self) -> bool;

    fn is_rhs_zero(&self) -> bool;

    fn is_time_dependent(&self) -> bool {
        false
    }

    fn is_constant_in_time(&self) -> bool {
        true
    }

    /// The number of components of the solution field for points in `dim` dimensions.
    fn field_size(&self, dim: usize) -> usize {
        if self.is_scalar() {
            1
        } else {
            dim
        }
    }

    /// Evaluates the right-hand side at time `t`.
    ///
    /// Problems with an exact solution delegate to `assembler`, which applies the differential
    /// operator of the chosen formulation.
    fn rhs(&self, assembler: &dyn RhsAssembler<f64>, pts: &DMatrix<f64>, t: f64) -> Result<DMatrix<f64>>;

    /// Evaluates Dirichlet values at boundary points with the given tags.
    fn bc(&self, tags: &[BoundaryTag], pts: &DMatrix<f64>, t: f64) -> Result<DMatrix<f64>>;

    /// Evaluates Neumann (traction) values at boundary points with the given tags and outward normals.
    fn neumann_bc(
        &self,
        tags: &[BoundaryTag],
        pts: &DMatrix<f64>,
        normals: &DMatrix<f64>,
        t: f64,
    ) -> Result<DMatrix<f64>>;

    fn initial_solution(&self, pts: &DMatrix<f64>) -> Result<DMatrix<f64>>;

    /// Prepares mesh-dependent state before boundary values are evaluated.
    fn init(&mut self, _mesh: &dyn BoundaryMesh) -> Result<()> {
        Ok(())
    }

    /// Dirichlet values of the velocity for time-dependent problems. Zero by default.
    fn velocity_bc(&self, tags: &[BoundaryTag], pts: &DMatrix<f64>, _t: f64) -> Result<DMatrix<f64>> {
        let dim = check_tagged_points(tags, pts)?;
        Ok(zero_values(pts, self.field_size(dim)))
    }

    /// Dirichlet values of the acceleration for time-dependent problems. Zero by default.
    fn acceleration_bc(&self, tags: &[BoundaryTag], pts: &DMatrix<f64>, _t: f64) -> Result<DMatrix<f64>> {
        let dim = check_tagged_points(tags, pts)?;
        Ok(zero_values(pts, self.field_size(dim)))
    }

    fn neumann_velocity_bc(
        &self,
        tags: &[BoundaryTag],
        pts: &DMatrix<f64>,
        _normals: &DMatrix<f64>,
        _t: f64,
    ) -> Result<DMatrix<f64>> {
        let dim = check_tagged_points(tags, pts)?;
        Ok(zero_values(pts, self.field_size(dim)))
    }

    fn neumann_acceleration_bc(
        &self,
        tags: &[BoundaryTag],
        pts: &DMatrix<f64>,
        _normals: &DMatrix<f64>,
        _t: f64,
    ) -> Result<DMatrix<f64>> {
        let dim = check_tagged_points(tags, pts)?;
        Ok(zero_values(pts, self.field_size(dim)))
    }

    fn exact(&self, _pts: &DMatrix<f64>, _t: f64) -> Result<DMatrix<f64>> {
        Err(Error::unsupported(format!("problem {} has no exact solution", self.name())))
    }

    /// The gradient of the exact solution, `n x (s * dim)` with `∂u_k/∂x_l` at column `k * dim + l`.
    fn exact_grad(&self, _pts: &DMatrix<f64>, _t: f64) -> Result<DMatrix<f64>> {
        Err(Error::unsupported(format!("problem {} has no exact solution", self.name())))
    }

    fn initial_velocity(&self, pts: &DMatrix<f64>) -> Result<DMatrix<f64>> {
        let dim = check_points(pts)?;
        Ok(DMatrix::zeros(pts.nrows(), self.field_size(dim)))
    }

    fn initial_acceleration(&self, pts: &DMatrix<f64>) -> Result<DMatrix<f64>> {
        let dim = check_points(pts)?;
        Ok(DMatrix::zeros(pts.nrows(), self.field_size(dim)))
    }

    /// The initial density, one value per point. Zero by default.
    fn initial_density(&self, pts: &DMatrix<f64>) -> Result<DMatrix<f64>> {
        check_points(pts)?;
        Ok(zero_values(pts, 1))
    }

    /// Updates the problem from a JSON document. Calling it twice with the same document
    /// leaves the problem in the same state as calling it once.
    fn set_parameters(&mut self, _params: &serde_json::Value) -> Result<()> {
        Ok(())
    }

    /// Resets configuration and cached state.
    fn clear(&mut self) {}

    /// Whether dimension `dim` of Dirichlet boundaries with the given tag is constrained.
    fn is_dimension_dirichlet(&self, _tag: BoundaryTag, _dim: usize) -> bool {
        true
    }

    /// Shortcut for callers: `true` if `is_dimension_dirichlet` holds for every tag and dimension.
    fn all_dimensions_dirichlet(&self) -> bool {
        true
    }

    fn might_have_no_dirichlet(&self) -> bool {
        false
    }

    /// The number of load steps a nonlinear solve should use, given the diagonal of the bounding box.
    fn n_incremental_load_steps(&self, _diag: f64) -> usize {
        1
    }
}

/// Checks that points are given as rows of a 2D or 3D matrix and returns the dimension.
pub fn check_points(pts: &DMatrix<f64>) -> Result<usize> {
    match pts.ncols() {
        2 | 3 => Ok(pts.ncols()),
        d => Err(Error::domain(format!(
            "points must have 2 or 3 coordinates, got {}",
            d
        ))),
    }
}

/// Checks that there is one boundary tag per point and returns the dimension.
pub fn check_tagged_points(tags: &[BoundaryTag], pts: &DMatrix<f64>) -> Result<usize> {
    if tags.len() != pts.nrows() {
        return Err(Error::domain(format!(
            "got {} boundary tags for {} points",
            tags.len(),
            pts.nrows()
        )));
    }
    check_points(pts)
}

/// Fills an `n x ncols` matrix row by row from a function of the point coordinates.
pub fn evaluate_rows<F>(pts: &DMatrix<f64>, ncols: usize, mut f: F) -> Result<DMatrix<f64>>
where
    F: FnMut(usize, &[f64]) -> Result<Vec<f64>>,
{
    let mut result = DMatrix::zeros(pts.nrows(), ncols);
    let mut x = vec![0.0; pts.ncols()];
    for i in 0..pts.nrows() {
        for (x_k, p_k) in x.iter_mut().zip(pts.row(i).iter()) {
            *x_k = *p_k;
        }
        let row = f(i, &x)?;
        if row.len() != ncols {
            return Err(Error::domain(format!(
                "expected {} values at point {}, got {}",
                ncols,
                i,
                row.len()
            )));
        }
        for (j, v) in row.into_iter().enumerate() {
            result[(i, j)] = v;
        }
    }
    Ok(result)
}

/// Evaluates the right-hand side induced by a manufactured solution.
///
/// `solution` returns the value, gradient and Hessian of every solution component at a point.
pub fn rhs_from_solution<F>(assembler: &dyn RhsAssembler<f64>, pts: &DMatrix<f64>, solution: F) -> Result<DMatrix<f64>>
where
    F: Fn(&[f64]) -> Result<HessianPoint<f64>>,
{
    check_points(pts)?;
    let rows = (0..pts.nrows())
        .map(|i| {
            let x: Vec<f64> = pts.row(i).iter().copied().collect();
            assembler.compute_rhs(&solution(&x)?)
        })
        .collect::<Result<Vec<_>>>()?;
    let ncols = rows.first().map(|r| r.len()).unwrap_or(0);
    evaluate_rows(pts, ncols, |i, _| Ok(rows[i].iter().copied().collect()))
}

/// Evaluates the values of a manufactured solution.
pub fn values_from_solution<F>(pts: &DMatrix<f64>, ncols: usize, solution: F) -> Result<DMatrix<f64>>
where
    F: Fn(&[f64]) -> Result<HessianPoint<f64>>,
{
    evaluate_rows(pts, ncols, |_, x| Ok(solution(x)?.values().iter().copied().collect()))
}

/// Evaluates the row-major Jacobian of a manufactured solution.
pub fn gradients_from_solution<F>(pts: &DMatrix<f64>, ncols: usize, solution: F) -> Result<DMatrix<f64>>
where
    F: Fn(&[f64]) -> Result<HessianPoint<f64>>,
{
    evaluate_rows(pts, ncols, |_, x| {
        let jacobian = solution(x)?.jacobian();
        // nalgebra is column-major, so transpose to read the rows contiguously
        Ok(jacobian.transpose().iter().copied().collect())
    })
}

/// A matrix of zeros with one row per point and one column per field component.
pub fn zero_values(pts: &DMatrix<f64>, field_size: usize) -> DMatrix<f64> {
    DMatrix::zeros(pts.nrows(), field_size)
}
