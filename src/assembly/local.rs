use crate::allocators::DimAllocator;
use crate::autodiff::HessianPoint;
use crate::error::Result;
use crate::{Real, SmallDim};
use nalgebra::allocator::Allocator;
use nalgebra::{DVector, DefaultAllocator, DimName, OMatrix};

mod laplace;
mod values;

pub use laplace::*;
pub use values::*;

/// Quadrature weights premultiplied with the absolute Jacobian determinant, $|J| w$, one entry
/// per quadrature point.
pub type QuadratureVector<T> = DVector<T>;

/// A local assembler for one block of a (possibly mixed) bilinear form.
///
/// Given the assembly values of the test space and of the trial space on the same element,
/// the assembler produces the contribution of the basis pair `(i, j)`, where `i` indexes the
/// test bases and `j` the trial bases. The block has dimensions
/// `BlockRows x BlockCols`, i.e. the number of field components of the test and trial spaces.
///
/// Local assemblers know nothing about the global sparsity layout; see
/// [`assemble_block_triplets`](crate::assembly::global::assemble_block_triplets) for the
/// driver that places blocks into the global system.
pub trait LocalBlockAssembler<T, D>: Sync
where
    T: Real,
    D: SmallDim,
    DefaultAllocator: DimAllocator<T, D> + Allocator<T, Self::BlockRows, Self::BlockCols>,
{
    type BlockRows: DimName;
    type BlockCols: DimName;

    /// Computes the block for test basis `i` and trial basis `j`.
    ///
    /// `da` is the quadrature vector of the element and must have one entry per quadrature point.
    fn assemble_block(
        &self,
        test: &ElementAssemblyValues<T, D>,
        trial: &ElementAssemblyValues<T, D>,
        i: usize,
        j: usize,
        da: &[T],
    ) -> Result<OMatrix<T, Self::BlockRows, Self::BlockCols>>;
}

/// Evaluates the right-hand side that a manufactured solution induces for a formulation.
///
/// This is used for exact-solution testing: given the value, gradient and Hessian of the exact
/// solution at a point, the assembler applies its differential operator and returns the forcing
/// term with the same shape as the block it assembles.
pub trait RhsAssembler<T: Real>: Sync {
    fn compute_rhs(&self, point: &HessianPoint<T>) -> Result<DVector<T>>;
}
