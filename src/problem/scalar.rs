//! Scalar (Laplace/Poisson type) problems.
use crate::assembly::local::RhsAssembler;
use crate::autodiff::{HessianPoint, HessianScalar};
use crate::error::{Error, Result};
use crate::mesh::BoundaryTag;
use crate::problem::{
    check_points, check_tagged_points, evaluate_rows, gradients_from_solution, rhs_from_solution,
    values_from_solution, zero_values, BoundaryTags, Problem,
};
use nalgebra::{DMatrix, DVector};

fn scalar_point(u: HessianScalar<f64>) -> Result<HessianPoint<f64>> {
    HessianPoint::from_components(vec![u])
}

/// The linear function $u = x$. Its Laplacian vanishes.
#[derive(Debug, Clone, Default)]
pub struct LinearProblem {
    tags: BoundaryTags,
}

impl LinearProblem {
    pub fn new() -> Self {
        Self::default()
    }

    fn solution(x: &[f64]) -> Result<HessianPoint<f64>> {
        let dim = x.len();
        let mut gradient = DVector::zeros(dim);
        gradient[0] = 1.0;
        scalar_point(HessianScalar::new(x[0], gradient, DMatrix::zeros(dim, dim)))
    }
}

impl Problem for LinearProblem {
    fn name(&self) -> &str {
        "Linear"
    }

    fn boundary_tags(&self) -> &BoundaryTags {
        &self.tags
    }

    fn is_scalar(&self) -> bool {
        true
    }

    fn has_exact_sol(&self) -> bool {
        true
    }

    fn is_rhs_zero(&self) -> bool {
        true
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
        check_tagged_points(tags, pts)?;
        Ok(zero_values(pts, 1))
    }

    fn initial_solution(&self, pts: &DMatrix<f64>) -> Result<DMatrix<f64>> {
        self.exact(pts, 0.0)
    }

    fn exact(&self, pts: &DMatrix<f64>, _t: f64) -> Result<DMatrix<f64>> {
        check_points(pts)?;
        values_from_solution(pts, 1, Self::solution)
    }

    fn exact_grad(&self, pts: &DMatrix<f64>, _t: f64) -> Result<DMatrix<f64>> {
        let dim = check_points(pts)?;
        gradients_from_solution(pts, dim, Self::solution)
    }
}

/// The quadratic function $u = 5 x^2$.
#[derive(Debug, Clone, Default)]
pub struct QuadraticProblem {
    tags: BoundaryTags,
}

impl QuadraticProblem {
    pub fn new() -> Self {
        Self::default()
    }

    fn solution(x: &[f64]) -> Result<HessianPoint<f64>> {
        let dim = x.len();
        let mut gradient = DVector::zeros(dim);
        gradient[0] = 10.0 * x[0];
        let mut hessian = DMatrix::zeros(dim, dim);
        hessian[(0, 0)] = 10.0;
        scalar_point(HessianScalar::new(5.0 * x[0] * x[0], gradient, hessian))
    }
}

impl Problem for QuadraticProblem {
    fn name(&self) -> &str {
        "Quadratic"
    }

    fn boundary_tags(&self) -> &BoundaryTags {
        &self.tags
    }

    fn is_scalar(&self) -> bool {
        true
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
        check_tagged_points(tags, pts)?;
        Ok(zero_values(pts, 1))
    }

    fn initial_solution(&self, pts: &DMatrix<f64>) -> Result<DMatrix<f64>> {
        self.exact(pts, 0.0)
    }

    fn exact(&self, pts: &DMatrix<f64>, _t: f64) -> Result<DMatrix<f64>> {
        check_points(pts)?;
        values_from_solution(pts, 1, Self::solution)
    }

    fn exact_grad(&self, pts: &DMatrix<f64>, _t: f64) -> Result<DMatrix<f64>> {
        let dim = check_points(pts)?;
        gradients_from_solution(pts, dim, Self::solution)
    }
}

/// A univariate quadratic $a x^2 + b x + c$.
#[derive(Debug, Copy, Clone)]
struct Quadratic1d {
    a: f64,
    b: f64,
    c: f64,
}

impl Quadratic1d {
    /// $s (9x - h)^2$
    fn squared(s: f64, h: f64) -> Self {
        Self {
            a: 81.0 * s,
            b: -18.0 * s * h,
            c: s * h * h,
        }
    }

    /// $s (9x + h)$
    fn linear(s: f64, h: f64) -> Self {
        Self {
            a: 0.0,
            b: 9.0 * s,
            c: s * h,
        }
    }
}

/// A term $s \exp(\sum_k q_k(x_k))$.
#[derive(Debug, Clone)]
struct ExpTerm {
    scale: f64,
    exponent: [Quadratic1d; 3],
}

impl ExpTerm {
    fn evaluate(&self, x: &[f64]) -> HessianScalar<f64> {
        let dim = x.len();
        let q: f64 = x
            .iter()
            .zip(&self.exponent)
            .map(|(&x_k, q_k)| q_k.a * x_k * x_k + q_k.b * x_k + q_k.c)
            .sum();
        let dq = DVector::from_iterator(dim, x.iter().zip(&self.exponent).map(|(&x_k, q_k)| 2.0 * q_k.a * x_k + q_k.b));
        let g = self.scale * q.exp();

        // H = g (∇q ∇qᵀ + diag(2a))
        let mut hessian = &dq * dq.transpose();
        for k in 0..dim {
            hessian[(k, k)] += 2.0 * self.exponent[k].a;
        }
        HessianScalar::new(g, dq * g, hessian * g)
    }
}

fn franke_terms() -> [ExpTerm; 4] {
    use Quadratic1d as Q;
    [
        ExpTerm {
            scale: 0.75,
            exponent: [Q::squared(-0.25, 2.0), Q::squared(-0.25, 2.0), Q::squared(-0.25, 2.0)],
        },
        ExpTerm {
            scale: 0.75,
            exponent: [Q::squared(-1.0 / 49.0, -1.0), Q::linear(-0.1, 1.0), Q::linear(-0.1, 1.0)],
        },
        ExpTerm {
            scale: 0.5,
            exponent: [Q::squared(-0.25, 7.0), Q::squared(-0.25, 3.0), Q::squared(-0.25, 5.0)],
        },
        ExpTerm {
            scale: -0.2,
            exponent: [Q::squared(-1.0, 4.0), Q::squared(-1.0, 7.0), Q::squared(-1.0, 5.0)],
        },
    ]
}

/// Franke's test function in 2D or 3D, evaluated with its first and second derivatives.
pub fn franke(x: &[f64]) -> HessianScalar<f64> {
    let dim = x.len();
    franke_terms()
        .iter()
        .map(|term| term.evaluate(x))
        .fold(HessianScalar::constant(0.0, dim), |acc, term| {
            HessianScalar::new(
                acc.value + term.value,
                acc.gradient + term.gradient,
                acc.hessian + term.hessian,
            )
        })
}

/// Poisson problem with Franke's function as exact solution.
///
/// `Franke` accepts 2D and 3D points, `Franke3D` only 3D points.
#[derive(Debug, Clone)]
pub struct FrankeProblem {
    name: &'static str,
    volume_only: bool,
    tags: BoundaryTags,
}

impl FrankeProblem {
    pub fn new() -> Self {
        Self {
            name: "Franke",
            volume_only: false,
            tags: BoundaryTags::default(),
        }
    }

    pub fn new_3d() -> Self {
        Self {
            name: "Franke3D",
            volume_only: true,
            tags: BoundaryTags::default(),
        }
    }

    fn check_dim(&self, pts: &DMatrix<f64>) -> Result<usize> {
        let dim = check_points(pts)?;
        if self.volume_only && dim != 3 {
            return Err(Error::domain(format!("{} is only defined for 3D points", self.name)));
        }
        Ok(dim)
    }

    fn solution(x: &[f64]) -> Result<HessianPoint<f64>> {
        scalar_point(franke(x))
    }
}

impl Default for FrankeProblem {
    fn default() -> Self {
        Self::new()
    }
}

impl Problem for FrankeProblem {
    fn name(&self) -> &str {
        self.name
    }

    fn boundary_tags(&self) -> &BoundaryTags {
        &self.tags
    }

    fn is_scalar(&self) -> bool {
        true
    }

    fn has_exact_sol(&self) -> bool {
        true
    }

    fn is_rhs_zero(&self) -> bool {
        false
    }

    fn rhs(&self, assembler: &dyn RhsAssembler<f64>, pts: &DMatrix<f64>, _t: f64) -> Result<DMatrix<f64>> {
        self.check_dim(pts)?;
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
        check_tagged_points(tags, pts)?;
        self.check_dim(pts)?;
        Ok(zero_values(pts, 1))
    }

    fn initial_solution(&self, pts: &DMatrix<f64>) -> Result<DMatrix<f64>> {
        self.exact(pts, 0.0)
    }

    fn exact(&self, pts: &DMatrix<f64>, _t: f64) -> Result<DMatrix<f64>> {
        self.check_dim(pts)?;
        values_from_solution(pts, 1, Self::solution)
    }

    fn exact_grad(&self, pts: &DMatrix<f64>, _t: f64) -> Result<DMatrix<f64>> {
        let dim = self.check_dim(pts)?;
        gradients_from_solution(pts, dim, Self::solution)
    }
}

/// Poisson problem $-\Delta u = 10$ with homogeneous Dirichlet boundary conditions.
#[derive(Debug, Clone, Default)]
pub struct ZeroBCProblem {
    tags: BoundaryTags,
}

impl ZeroBCProblem {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Problem for ZeroBCProblem {
    fn name(&self) -> &str {
        "ZeroBC"
    }

    fn boundary_tags(&self) -> &BoundaryTags {
        &self.tags
    }

    fn is_scalar(&self) -> bool {
        true
    }

    fn has_exact_sol(&self) -> bool {
        false
    }

    fn is_rhs_zero(&self) -> bool {
        false
    }

    fn rhs(&self, _assembler: &dyn RhsAssembler<f64>, pts: &DMatrix<f64>, _t: f64) -> Result<DMatrix<f64>> {
        check_points(pts)?;
        Ok(DMatrix::from_element(pts.nrows(), 1, 10.0))
    }

    fn bc(&self, tags: &[BoundaryTag], pts: &DMatrix<f64>, _t: f64) -> Result<DMatrix<f64>> {
        check_tagged_points(tags, pts)?;
        Ok(zero_values(pts, 1))
    }

    fn neumann_bc(
        &self,
        tags: &[BoundaryTag],
        pts: &DMatrix<f64>,
        _normals: &DMatrix<f64>,
        _t: f64,
    ) -> Result<DMatrix<f64>> {
        check_tagged_points(tags, pts)?;
        Ok(zero_values(pts, 1))
    }

    fn initial_solution(&self, pts: &DMatrix<f64>) -> Result<DMatrix<f64>> {
        check_points(pts)?;
        Ok(zero_values(pts, 1))
    }
}

/// Heat equation $u_t - \Delta u = f$ with exact solution $u = (1 + t) |x|^2$.
#[derive(Debug, Clone, Default)]
pub struct TimeDependentScalarProblem {
    tags: BoundaryTags,
}

impl TimeDependentScalarProblem {
    pub fn new() -> Self {
        Self::default()
    }

    fn solution(x: &[f64], t: f64) -> Result<HessianPoint<f64>> {
        let dim = x.len();
        let r2: f64 = x.iter().map(|x_k| x_k * x_k).sum();
        let gradient = DVector::from_iterator(dim, x.iter().map(|x_k| 2.0 * (1.0 + t) * x_k));
        let hessian = DMatrix::identity(dim, dim) * (2.0 * (1.0 + t));
        scalar_point(HessianScalar::new((1.0 + t) * r2, gradient, hessian))
    }

    fn time_derivative(pts: &DMatrix<f64>) -> Result<DMatrix<f64>> {
        evaluate_rows(pts, 1, |_, x| Ok(vec![x.iter().map(|x_k| x_k * x_k).sum()]))
    }
}

impl Problem for TimeDependentScalarProblem {
    fn name(&self) -> &str {
        "TimeDependentScalar"
    }

    fn boundary_tags(&self) -> &BoundaryTags {
        &self.tags
    }

    fn is_scalar(&self) -> bool {
        true
    }

    fn has_exact_sol(&self) -> bool {
        true
    }

    fn is_rhs_zero(&self) -> bool {
        false
    }

    fn is_time_dependent(&self) -> bool {
        true
    }

    fn is_constant_in_time(&self) -> bool {
        false
    }

    fn rhs(&self, assembler: &dyn RhsAssembler<f64>, pts: &DMatrix<f64>, t: f64) -> Result<DMatrix<f64>> {
        let spatial = rhs_from_solution(assembler, pts, |x| Self::solution(x, t))?;
        Ok(spatial + Self::time_derivative(pts)?)
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
        check_tagged_points(tags, pts)?;
        Ok(zero_values(pts, 1))
    }

    fn initial_solution(&self, pts: &DMatrix<f64>) -> Result<DMatrix<f64>> {
        self.exact(pts, 0.0)
    }

    fn initial_velocity(&self, pts: &DMatrix<f64>) -> Result<DMatrix<f64>> {
        check_points(pts)?;
        Self::time_derivative(pts)
    }

    /// The velocity $u_t = |x|^2$ on the boundary.
    fn velocity_bc(&self, tags: &[BoundaryTag], pts: &DMatrix<f64>, _t: f64) -> Result<DMatrix<f64>> {
        check_tagged_points(tags, pts)?;
        Self::time_derivative(pts)
    }

    fn exact(&self, pts: &DMatrix<f64>, t: f64) -> Result<DMatrix<f64>> {
        check_points(pts)?;
        values_from_solution(pts, 1, |x| Self::solution(x, t))
    }

    fn exact_grad(&self, pts: &DMatrix<f64>, t: f64) -> Result<DMatrix<f64>> {
        let dim = check_points(pts)?;
        gradients_from_solution(pts, dim, |x| Self::solution(x, t))
    }
}
