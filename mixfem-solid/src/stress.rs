//! Stress post-processing for linear elastic displacement fields.
use crate::assemblers::Formulation;
use crate::materials::{LameParameters, MaterialParameters};
use itertools::izip;
use mixfem::allocators::DimAllocator;
use mixfem::assembly::local::ElementAssemblyValues;
use mixfem::basis::ElementBases;
use mixfem::error::{Error, Result};
use mixfem::nalgebra::{DMatrix, DVector, DefaultAllocator, OMatrix, OPoint, OVector};
use mixfem::{Real, SmallDim};
use numeric_literals::replace_float_literals;

/// The displacement gradient $\nabla u$ with entries $\partial u_a / \partial x_l$ at every point.
fn compute_displacement_gradients<T, D>(
    vals: &ElementAssemblyValues<T, D>,
    displacement: &DVector<T>,
) -> Result<Vec<OMatrix<T, D, D>>>
where
    T: Real,
    D: SmallDim,
    DefaultAllocator: DimAllocator<T, D>,
{
    let d = D::dim();
    if displacement.len() % d != 0 {
        return Err(Error::domain(format!(
            "displacement of length {} is not a {}D vector field",
            displacement.len(),
            d
        )));
    }

    let nodal_displacements = vals
        .basis_values()
        .iter()
        .map(|basis| {
            let offset = basis.global_index() * d;
            if offset + d > displacement.len() {
                return Err(Error::domain(format!(
                    "basis {} of element {} is out of range for a displacement of {} nodes",
                    basis.global_index(),
                    vals.element_id(),
                    displacement.len() / d
                )));
            }
            Ok(OVector::<T, D>::from_iterator(
                displacement.rows(offset, d).iter().copied(),
            ))
        })
        .collect::<Result<Vec<_>>>()?;

    let gradients = (0..vals.num_quadrature_points())
        .map(|q| {
            let mut grad_u = OMatrix::<T, D, D>::zeros();
            for (u_b, basis) in izip!(&nodal_displacements, vals.basis_values()) {
                grad_u.ger(T::one(), u_b, &basis.gradient(q), T::one());
            }
            grad_u
        })
        .collect();
    Ok(gradients)
}

/// The linear elastic stress $\sigma = \lambda \operatorname{tr}(\epsilon) I + 2 \mu \epsilon$ for a
/// displacement gradient, with $\epsilon$ the symmetric part of the gradient.
///
/// Materials in the incompressible limit store $\lambda = 0$, so only the deviatoric response
/// $2 \mu \epsilon$ remains for them; their pressure is a separate field.
#[replace_float_literals(T::from_f64(literal).expect("literal must fit in T"))]
pub fn stress_from_gradient<T, D>(grad_u: &OMatrix<T, D, D>, params: &LameParameters<T>) -> OMatrix<T, D, D>
where
    T: Real,
    D: SmallDim,
    DefaultAllocator: DimAllocator<T, D>,
{
    let &LameParameters { mu, lambda } = params;
    let eps = (grad_u + grad_u.transpose()) * 0.5;
    let mut sigma = &eps * (2.0 * mu);
    let volumetric = lambda * eps.trace();
    for k in 0..D::dim() {
        sigma[(k, k)] += volumetric;
    }
    sigma
}

/// The von Mises equivalent stress of a stress tensor.
///
/// In 3D this is $\sqrt{\tfrac{3}{2} \lVert \operatorname{dev} \sigma \rVert^2}$, in 2D
/// $\sqrt{\sigma_{xx}^2 - \sigma_{xx} \sigma_{yy} + \sigma_{yy}^2 + 3 \sigma_{xy}^2}$.
#[replace_float_literals(T::from_f64(literal).expect("literal must fit in T"))]
pub fn von_mises_stress<T, D>(sigma: &OMatrix<T, D, D>) -> T
where
    T: Real,
    D: SmallDim,
    DefaultAllocator: DimAllocator<T, D>,
{
    let s = |a: usize, b: usize| sigma[(a, b)];
    if D::dim() == 3 {
        let normal = (s(0, 0) - s(1, 1)).powi(2) + (s(1, 1) - s(2, 2)).powi(2) + (s(2, 2) - s(0, 0)).powi(2);
        let shear = s(0, 1).powi(2) + s(1, 2).powi(2) + s(2, 0).powi(2);
        (0.5 * normal + 3.0 * shear).sqrt()
    } else {
        (s(0, 0).powi(2) - s(0, 0) * s(1, 1) + s(1, 1).powi(2) + 3.0 * s(0, 1).powi(2)).sqrt()
    }
}

/// Evaluates the Cauchy stress of element `el_id` at the reference points `local_points`.
///
/// Elements in the incompressible limit are only accepted with [`Formulation::Incompressible`].
///
/// `bases` are the displacement bases of the element and `geometry_bases` the bases of its
/// geometric mapping. `displacement` is the global displacement vector with the `D` components of
/// node `n` at `n * D..(n + 1) * D`.
pub fn compute_stress_tensor<T, D, B, G>(
    material: &MaterialParameters<T>,
    formulation: Formulation,
    el_id: usize,
    bases: &B,
    geometry_bases: &G,
    local_points: &[OPoint<T, D>],
    displacement: &DVector<T>,
) -> Result<Vec<OMatrix<T, D, D>>>
where
    T: Real,
    D: SmallDim,
    B: ElementBases<T, D> + ?Sized,
    G: ElementBases<T, D> + ?Sized,
    DefaultAllocator: DimAllocator<T, D>,
{
    let params = material.lambda_mu(el_id)?;
    if formulation == Formulation::Linear && material.is_incompressible_limit(el_id)? {
        return Err(Error::configuration(format!(
            "element {} is in the incompressible limit and requires the incompressible formulation",
            el_id
        )));
    }
    let vals = ElementAssemblyValues::evaluate(el_id, bases, geometry_bases, local_points)?;
    let gradients = compute_displacement_gradients(&vals, displacement)?;
    Ok(gradients
        .iter()
        .map(|grad_u| stress_from_gradient(grad_u, &params))
        .collect())
}

/// Like [`compute_stress_tensor`], but with the tensors flattened row-major into the rows of an
/// `n x D²` matrix.
pub fn compute_stress_tensor_flat<T, D, B, G>(
    material: &MaterialParameters<T>,
    formulation: Formulation,
    el_id: usize,
    bases: &B,
    geometry_bases: &G,
    local_points: &[OPoint<T, D>],
    displacement: &DVector<T>,
) -> Result<DMatrix<T>>
where
    T: Real,
    D: SmallDim,
    B: ElementBases<T, D> + ?Sized,
    G: ElementBases<T, D> + ?Sized,
    DefaultAllocator: DimAllocator<T, D>,
{
    let d = D::dim();
    let tensors = compute_stress_tensor(
        material,
        formulation,
        el_id,
        bases,
        geometry_bases,
        local_points,
        displacement,
    )?;
    Ok(DMatrix::from_fn(tensors.len(), d * d, |row, col| {
        tensors[row][(col / d, col % d)]
    }))
}

/// Evaluates the von Mises stress of element `el_id` at the reference points `local_points`.
///
/// See [`compute_stress_tensor`] for the arguments.
pub fn compute_von_mises_stresses<T, D, B, G>(
    material: &MaterialParameters<T>,
    formulation: Formulation,
    el_id: usize,
    bases: &B,
    geometry_bases: &G,
    local_points: &[OPoint<T, D>],
    displacement: &DVector<T>,
) -> Result<Vec<T>>
where
    T: Real,
    D: SmallDim,
    B: ElementBases<T, D> + ?Sized,
    G: ElementBases<T, D> + ?Sized,
    DefaultAllocator: DimAllocator<T, D>,
{
    let tensors = compute_stress_tensor(
        material,
        formulation,
        el_id,
        bases,
        geometry_bases,
        local_points,
        displacement,
    )?;
    Ok(tensors.iter().map(von_mises_stress).collect())
}
