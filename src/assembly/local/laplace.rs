use crate::allocators::DimAllocator;
use crate::assembly::local::{ElementAssemblyValues, LocalBlockAssembler, RhsAssembler};
use crate::autodiff::HessianPoint;
use crate::error::Result;
use crate::{Real, SmallDim};
use itertools::izip;
use nalgebra::{DVector, DefaultAllocator, OMatrix, U1};

/// The negative Laplace operator $-\Delta$ acting on scalar fields.
///
/// The local block is the stiffness entry $\int \nabla \phi_i \cdot \nabla \phi_j \, dx$ and the
/// right-hand side induced by a solution $u$ is $-\Delta u$, applied component-wise.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct LaplaceOperator;

impl<T, D> LocalBlockAssembler<T, D> for LaplaceOperator
where
    T: Real,
    D: SmallDim,
    DefaultAllocator: DimAllocator<T, D>,
{
    type BlockRows = U1;
    type BlockCols = U1;

    fn assemble_block(
        &self,
        test: &ElementAssemblyValues<T, D>,
        trial: &ElementAssemblyValues<T, D>,
        i: usize,
        j: usize,
        da: &[T],
    ) -> Result<OMatrix<T, U1, U1>> {
        test.check_access(i, da)?;
        trial.check_access(j, da)?;
        let grad_i = test.basis(i).gradients();
        let grad_j = trial.basis(j).gradients();
        let value = izip!(grad_i.column_iter(), grad_j.column_iter(), da)
            .fold(T::zero(), |acc, (a, b, &w)| acc + a.dot(&b) * w);
        Ok(OMatrix::<T, U1, U1>::from_element(value))
    }
}

impl<T: Real> RhsAssembler<T> for LaplaceOperator {
    fn compute_rhs(&self, point: &HessianPoint<T>) -> Result<DVector<T>> {
        Ok(-point.vector_laplacian())
    }
}
