//! Second-order derivative information of manufactured solutions.
//!
//! A [`HessianPoint`] is the value a forward-mode autodiff evaluation of a (scalar or vector)
//! field produces at a single point: for every component its value, gradient and Hessian.
//! Assemblers use it to turn an exact solution into the corresponding right-hand side.
use crate::error::{Error, Result};
use crate::Real;
use nalgebra::{DMatrix, DVector};

/// Value, gradient and Hessian of a single scalar field at a point.
#[derive(Debug, Clone, PartialEq)]
pub struct HessianScalar<T: Real> {
    pub value: T,
    pub gradient: DVector<T>,
    pub hessian: DMatrix<T>,
}

impl<T: Real> HessianScalar<T> {
    pub fn new(value: T, gradient: DVector<T>, hessian: DMatrix<T>) -> Self {
        Self {
            value,
            gradient,
            hessian,
        }
    }

    /// A constant field in `dim` variables.
    pub fn constant(value: T, dim: usize) -> Self {
        Self::new(value, DVector::zeros(dim), DMatrix::zeros(dim, dim))
    }

    pub fn laplacian(&self) -> T {
        self.hessian.trace()
    }
}

/// A field with `size` components over `dim` spatial variables, with derivatives up to second order.
#[derive(Debug, Clone, PartialEq)]
pub struct HessianPoint<T: Real> {
    dim: usize,
    components: Vec<HessianScalar<T>>,
}

impl<T: Real> HessianPoint<T> {
    /// Creates a new point from its components.
    ///
    /// Fails with a domain error if the components do not agree on the spatial dimension.
    pub fn from_components(components: Vec<HessianScalar<T>>) -> Result<Self> {
        let dim = components
            .first()
            .map(|c| c.gradient.len())
            .ok_or_else(|| Error::domain("a Hessian point needs at least one component"))?;
        for (k, c) in components.iter().enumerate() {
            if c.gradient.len() != dim || c.hessian.nrows() != dim || c.hessian.ncols() != dim {
                return Err(Error::domain(format!(
                    "component {} of Hessian point does not have spatial dimension {}",
                    k, dim
                )));
            }
        }
        Ok(Self { dim, components })
    }

    /// The number of spatial variables.
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// The number of field components.
    pub fn size(&self) -> usize {
        self.components.len()
    }

    pub fn component(&self, k: usize) -> &HessianScalar<T> {
        &self.components[k]
    }

    pub fn components(&self) -> &[HessianScalar<T>] {
        &self.components
    }

    /// Component-wise values.
    pub fn values(&self) -> DVector<T> {
        DVector::from_iterator(self.size(), self.components.iter().map(|c| c.value))
    }

    /// The Jacobian `∂u_k / ∂x_l` with one row per component.
    pub fn jacobian(&self) -> DMatrix<T> {
        DMatrix::from_fn(self.size(), self.dim, |k, l| self.components[k].gradient[l])
    }

    /// The divergence `∇ · u`. Requires `size == dim`.
    pub fn divergence(&self) -> Result<T> {
        self.require_vector_field("divergence")?;
        Ok(self
            .components
            .iter()
            .enumerate()
            .fold(T::zero(), |acc, (k, c)| acc + c.gradient[k]))
    }

    /// The component-wise vector Laplacian `Δu`.
    pub fn vector_laplacian(&self) -> DVector<T> {
        DVector::from_iterator(self.size(), self.components.iter().map(HessianScalar::laplacian))
    }

    /// The gradient of the divergence, `∇(∇ · u)`. Requires `size == dim`.
    pub fn grad_div(&self) -> Result<DVector<T>> {
        self.require_vector_field("gradient of divergence")?;
        let mut result = DVector::zeros(self.dim);
        for (k, c) in self.components.iter().enumerate() {
            // ∂_l (∂_k u_k) = H_k[(k, l)]
            for l in 0..self.dim {
                result[l] += c.hessian[(k, l)];
            }
        }
        Ok(result)
    }

    fn require_vector_field(&self, what: &str) -> Result<()> {
        if self.size() == self.dim {
            Ok(())
        } else {
            Err(Error::domain(format!(
                "{} requires a vector field with as many components as dimensions (got {} components in {}D)",
                what,
                self.size(),
                self.dim
            )))
        }
    }
}
