//! Local assemblers of linear and incompressible linear elasticity.
//!
//! The saddle point system of the mixed formulation reads
//! $$
//! \begin{pmatrix} A & B^T \\\\ B & C \end{pmatrix}
//! \begin{pmatrix} u \\\\ p \end{pmatrix}
//! = \begin{pmatrix} f \\\\ g \end{pmatrix},
//! $$
//! where $A$ is assembled by [`DisplacementAssembler`], $B$ (and $B^T$) by [`MixedAssembler`]
//! ([`MixedTransposeAssembler`]) and $C$ by [`PressureAssembler`].
use crate::materials::{LameParameters, MaterialParameters};
use mixfem::allocators::DimAllocator;
use mixfem::assembly::local::{ElementAssemblyValues, LocalBlockAssembler, RhsAssembler};
use mixfem::autodiff::HessianPoint;
use mixfem::error::{Error, Result};
use mixfem::nalgebra::{DVector, DefaultAllocator, OMatrix, OVector, U1};
use mixfem::{Real, SmallDim};
use serde::{Deserialize, Serialize};

/// Selects the displacement operator.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Formulation {
    /// Linear elasticity, $-\mu \Delta u - (\lambda + \mu) \nabla (\nabla \cdot u)$.
    #[default]
    Linear,
    /// The displacement part of incompressible elasticity, $-\mu (\Delta u + \nabla (\nabla \cdot u))$.
    /// The volumetric term is carried by the pressure.
    Incompressible,
}

fn check_same_element<T, D>(test: &ElementAssemblyValues<T, D>, trial: &ElementAssemblyValues<T, D>) -> Result<()>
where
    T: Real,
    D: SmallDim,
    DefaultAllocator: DimAllocator<T, D>,
{
    if test.element_id() == trial.element_id() {
        Ok(())
    } else {
        Err(Error::domain(format!(
            "test values of element {} paired with trial values of element {}",
            test.element_id(),
            trial.element_id()
        )))
    }
}

/// Assembles the displacement-displacement block.
///
/// For test basis $i$ and trial basis $j$ the block is
/// $$
/// K_{ij} = \sum_q \mathrm{d}a_q \left[ \mu \left( (\nabla \phi_i \cdot \nabla \phi_j) I
///     + \nabla \phi_j \nabla \phi_i^T \right) + \lambda \nabla \phi_i \nabla \phi_j^T \right],
/// $$
/// where the $\lambda$ term is dropped for [`Formulation::Incompressible`]. The Lamé parameters are
/// those of the element the assembly values belong to.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplacementAssembler<T> {
    material: MaterialParameters<T>,
    formulation: Formulation,
}

impl<T: Real> DisplacementAssembler<T> {
    pub fn new(material: MaterialParameters<T>, formulation: Formulation) -> Self {
        Self { material, formulation }
    }

    pub fn material(&self) -> &MaterialParameters<T> {
        &self.material
    }

    pub fn material_mut(&mut self) -> &mut MaterialParameters<T> {
        &mut self.material
    }

    pub fn formulation(&self) -> Formulation {
        self.formulation
    }

    /// Updates the material from a JSON document, see [`MaterialParameters::set_parameters`].
    pub fn set_parameters(&mut self, params: &serde_json::Value) -> Result<()> {
        self.material.set_parameters(params)
    }

    /// Elements in the incompressible limit have no usable $\lambda$ and need the mixed formulation.
    fn check_formulation(&self, el: usize) -> Result<()> {
        if self.formulation == Formulation::Linear && self.material.is_incompressible_limit(el)? {
            return Err(Error::configuration(format!(
                "element {} is in the incompressible limit and requires the incompressible formulation",
                el
            )));
        }
        Ok(())
    }

    /// The block for bases `i` and `j` of the same element.
    pub fn assemble<D>(&self, vals: &ElementAssemblyValues<T, D>, i: usize, j: usize, da: &[T]) -> Result<OMatrix<T, D, D>>
    where
        D: SmallDim,
        DefaultAllocator: DimAllocator<T, D>,
    {
        self.assemble_pair(vals, vals, i, j, da)
    }

    #[allow(non_snake_case)]
    fn assemble_pair<D>(
        &self,
        test: &ElementAssemblyValues<T, D>,
        trial: &ElementAssemblyValues<T, D>,
        i: usize,
        j: usize,
        da: &[T],
    ) -> Result<OMatrix<T, D, D>>
    where
        D: SmallDim,
        DefaultAllocator: DimAllocator<T, D>,
    {
        check_same_element(test, trial)?;
        test.check_access(i, da)?;
        trial.check_access(j, da)?;
        let LameParameters { mu, lambda } = self.material.lambda_mu(test.element_id())?;
        self.check_formulation(test.element_id())?;
        let with_lambda = self.formulation == Formulation::Linear;

        let I = OMatrix::<T, D, D>::identity();
        let mut block = OMatrix::<T, D, D>::zeros();
        for (q, &w) in da.iter().enumerate() {
            let a = test.basis(i).gradient(q);
            let b = trial.basis(j).gradient(q);
            let mut contraction = (&I * a.dot(&b) + &b * a.transpose()) * mu;
            if with_lambda {
                contraction += &a * b.transpose() * lambda;
            }
            block += contraction * w;
        }
        Ok(block)
    }
}

impl<T, D> LocalBlockAssembler<T, D> for DisplacementAssembler<T>
where
    T: Real,
    D: SmallDim,
    DefaultAllocator: DimAllocator<T, D>,
{
    type BlockRows = D;
    type BlockCols = D;

    fn assemble_block(
        &self,
        test: &ElementAssemblyValues<T, D>,
        trial: &ElementAssemblyValues<T, D>,
        i: usize,
        j: usize,
        da: &[T],
    ) -> Result<OMatrix<T, D, D>> {
        self.assemble_pair(test, trial, i, j, da)
    }
}

impl<T: Real> RhsAssembler<T> for DisplacementAssembler<T> {
    /// The body force that makes the given field a solution, using the parameters of element 0.
    fn compute_rhs(&self, point: &HessianPoint<T>) -> Result<DVector<T>> {
        let LameParameters { mu, lambda } = self.material.lambda_mu(0)?;
        self.check_formulation(0)?;
        let laplacian = point.vector_laplacian();
        let grad_div = point.grad_div()?;
        let rhs = match self.formulation {
            Formulation::Linear => laplacian * mu + grad_div * (lambda + mu),
            Formulation::Incompressible => (laplacian + grad_div) * mu,
        };
        Ok(-rhs)
    }
}

/// Assembles the pressure-displacement coupling block $B$.
///
/// For pressure basis $i$ and displacement basis $j$, $B_{ij} = \sum_q \mathrm{d}a_q \psi_i \nabla \phi_j$,
/// a row of length `D`.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct MixedAssembler;

impl MixedAssembler {
    pub fn new() -> Self {
        Self
    }

    /// The coupling of pressure basis `i` in `psi_vals` with displacement basis `j` in `phi_vals`.
    pub fn assemble<T, D>(
        &self,
        psi_vals: &ElementAssemblyValues<T, D>,
        phi_vals: &ElementAssemblyValues<T, D>,
        i: usize,
        j: usize,
        da: &[T],
    ) -> Result<OVector<T, D>>
    where
        T: Real,
        D: SmallDim,
        DefaultAllocator: DimAllocator<T, D>,
    {
        check_same_element(psi_vals, phi_vals)?;
        psi_vals.check_access(i, da)?;
        phi_vals.check_access(j, da)?;
        let psi = psi_vals.basis(i).values();
        let grad_phi = phi_vals.basis(j).gradients();

        let mut result = OVector::<T, D>::zeros();
        for (q, &w) in da.iter().enumerate() {
            result += grad_phi.column(q) * (psi[q] * w);
        }
        Ok(result)
    }

    /// The coupling of displacement basis `i` in `phi_vals` with pressure basis `j` in `psi_vals`,
    /// i.e. the corresponding block of $B^T$. Equal to `assemble(psi_vals, phi_vals, j, i, da)`.
    pub fn assemble_transposed<T, D>(
        &self,
        phi_vals: &ElementAssemblyValues<T, D>,
        psi_vals: &ElementAssemblyValues<T, D>,
        i: usize,
        j: usize,
        da: &[T],
    ) -> Result<OVector<T, D>>
    where
        T: Real,
        D: SmallDim,
        DefaultAllocator: DimAllocator<T, D>,
    {
        self.assemble(psi_vals, phi_vals, j, i, da)
    }
}

impl<T, D> LocalBlockAssembler<T, D> for MixedAssembler
where
    T: Real,
    D: SmallDim,
    DefaultAllocator: DimAllocator<T, D>,
{
    type BlockRows = U1;
    type BlockCols = D;

    fn assemble_block(
        &self,
        test: &ElementAssemblyValues<T, D>,
        trial: &ElementAssemblyValues<T, D>,
        i: usize,
        j: usize,
        da: &[T],
    ) -> Result<OMatrix<T, U1, D>> {
        Ok(self.assemble(test, trial, i, j, da)?.transpose())
    }
}

impl<T: Real> RhsAssembler<T> for MixedAssembler {
    /// The divergence $\nabla \cdot u$ of the field.
    fn compute_rhs(&self, point: &HessianPoint<T>) -> Result<DVector<T>> {
        Ok(DVector::from_element(1, point.divergence()?))
    }
}

/// Assembles the displacement-pressure block $B^T$ with displacement test and pressure trial spaces.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct MixedTransposeAssembler;

impl<T, D> LocalBlockAssembler<T, D> for MixedTransposeAssembler
where
    T: Real,
    D: SmallDim,
    DefaultAllocator: DimAllocator<T, D>,
{
    type BlockRows = D;
    type BlockCols = U1;

    fn assemble_block(
        &self,
        test: &ElementAssemblyValues<T, D>,
        trial: &ElementAssemblyValues<T, D>,
        i: usize,
        j: usize,
        da: &[T],
    ) -> Result<OMatrix<T, D, U1>> {
        MixedAssembler.assemble_transposed(test, trial, i, j, da)
    }
}

/// Assembles the pressure-pressure block $C$.
///
/// $C_{ij} = -\frac{1}{\lambda} \sum_q \mathrm{d}a_q \psi_i \psi_j$, which vanishes for elements in the
/// incompressible limit. With it, the mixed system is equivalent to linear elasticity for compressible
/// materials.
#[derive(Debug, Clone, PartialEq)]
pub struct PressureAssembler<T> {
    material: MaterialParameters<T>,
}

impl<T: Real> PressureAssembler<T> {
    pub fn new(material: MaterialParameters<T>) -> Self {
        Self { material }
    }

    pub fn material(&self) -> &MaterialParameters<T> {
        &self.material
    }

    pub fn set_parameters(&mut self, params: &serde_json::Value) -> Result<()> {
        self.material.set_parameters(params)
    }

    pub fn assemble<D>(&self, vals: &ElementAssemblyValues<T, D>, i: usize, j: usize, da: &[T]) -> Result<T>
    where
        D: SmallDim,
        DefaultAllocator: DimAllocator<T, D>,
    {
        self.assemble_pair(vals, vals, i, j, da)
    }

    fn assemble_pair<D>(
        &self,
        test: &ElementAssemblyValues<T, D>,
        trial: &ElementAssemblyValues<T, D>,
        i: usize,
        j: usize,
        da: &[T],
    ) -> Result<T>
    where
        D: SmallDim,
        DefaultAllocator: DimAllocator<T, D>,
    {
        check_same_element(test, trial)?;
        test.check_access(i, da)?;
        trial.check_access(j, da)?;
        let compliance = self.material.volumetric_compliance(test.element_id())?;
        if compliance == T::zero() {
            return Ok(T::zero());
        }

        let psi_i = test.basis(i).values();
        let psi_j = trial.basis(j).values();
        let mass = da
            .iter()
            .enumerate()
            .fold(T::zero(), |acc, (q, &w)| acc + psi_i[q] * psi_j[q] * w);
        Ok(-compliance * mass)
    }
}

impl<T, D> LocalBlockAssembler<T, D> for PressureAssembler<T>
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
        let value = self.assemble_pair(test, trial, i, j, da)?;
        Ok(OMatrix::<T, U1, U1>::from_element(value))
    }
}

impl<T: Real> RhsAssembler<T> for PressureAssembler<T> {
    fn compute_rhs(&self, _point: &HessianPoint<T>) -> Result<DVector<T>> {
        Err(Error::unsupported("the pressure block has no right-hand side"))
    }
}
