use crate::allocators::DimAllocator;
use crate::basis::ElementBases;
use crate::error::{Error, Result};
use crate::{Real, SmallDim};
use itertools::izip;
use nalgebra::{DVector, DefaultAllocator, Dyn, OMatrix, OPoint, OVector};

/// Values and physical gradients of a single basis function at the quadrature points of an element.
#[derive(Debug, Clone, PartialEq)]
pub struct AssemblyValues<T, D>
where
    T: Real,
    D: SmallDim,
    DefaultAllocator: DimAllocator<T, D>,
{
    global_index: usize,
    values: DVector<T>,
    gradients: OMatrix<T, D, Dyn>,
}

impl<T, D> AssemblyValues<T, D>
where
    T: Real,
    D: SmallDim,
    DefaultAllocator: DimAllocator<T, D>,
{
    /// Creates assembly values from basis values (one per quadrature point) and gradients
    /// (one column per quadrature point).
    pub fn new(global_index: usize, values: DVector<T>, gradients: OMatrix<T, D, Dyn>) -> Result<Self> {
        if values.len() != gradients.ncols() {
            return Err(Error::domain(format!(
                "basis {} has {} values but {} gradients",
                global_index,
                values.len(),
                gradients.ncols()
            )));
        }
        Ok(Self {
            global_index,
            values,
            gradients,
        })
    }

    pub fn global_index(&self) -> usize {
        self.global_index
    }

    pub fn values(&self) -> &DVector<T> {
        &self.values
    }

    /// Gradients with respect to physical coordinates, one column per quadrature point.
    pub fn gradients(&self) -> &OMatrix<T, D, Dyn> {
        &self.gradients
    }

    pub fn gradient(&self, q: usize) -> OVector<T, D> {
        self.gradients.column(q).clone_owned()
    }
}

/// Precomputed per-element quadrature data consumed by local assemblers.
///
/// For each basis function supported on the element, this stores its values and physical
/// gradients at every quadrature point, together with the physical quadrature points and the
/// quadrature vector $|J| w$.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementAssemblyValues<T, D>
where
    T: Real,
    D: SmallDim,
    DefaultAllocator: DimAllocator<T, D>,
{
    element_id: usize,
    basis_values: Vec<AssemblyValues<T, D>>,
    quadrature_points: Vec<OPoint<T, D>>,
    quadrature_vector: DVector<T>,
}

impl<T, D> ElementAssemblyValues<T, D>
where
    T: Real,
    D: SmallDim,
    DefaultAllocator: DimAllocator<T, D>,
{
    /// Assembles the context from precomputed parts.
    ///
    /// Fails with a domain error if the basis values do not all have one entry per quadrature
    /// point.
    pub fn from_parts(
        element_id: usize,
        basis_values: Vec<AssemblyValues<T, D>>,
        quadrature_points: Vec<OPoint<T, D>>,
        quadrature_vector: DVector<T>,
    ) -> Result<Self> {
        let n_q = quadrature_vector.len();
        if quadrature_points.len() != n_q {
            return Err(Error::domain(format!(
                "element {} has {} quadrature points but a quadrature vector of length {}",
                element_id,
                quadrature_points.len(),
                n_q
            )));
        }
        if let Some(b) = basis_values.iter().find(|b| b.values.len() != n_q) {
            return Err(Error::domain(format!(
                "basis {} on element {} is evaluated at {} points, expected {}",
                b.global_index,
                element_id,
                b.values.len(),
                n_q
            )));
        }
        Ok(Self {
            element_id,
            basis_values,
            quadrature_points,
            quadrature_vector,
        })
    }

    /// Evaluates `bases` at the given reference quadrature rule, using `geometry` for the
    /// mapping from reference to physical coordinates.
    ///
    /// The Jacobian of the mapping is $J = \sum_k \vec x_k \otimes \nabla_\xi \phi^g_k$, where
    /// $\phi^g_k$ are the geometry bases and $\vec x_k$ their nodes. Physical gradients are
    /// obtained as $\nabla \phi = J^{-T} \nabla_\xi \phi$.
    pub fn compute<B, G>(
        element_id: usize,
        bases: &B,
        geometry: &G,
        weights: &[T],
        points: &[OPoint<T, D>],
    ) -> Result<Self>
    where
        B: ElementBases<T, D> + ?Sized,
        G: ElementBases<T, D> + ?Sized,
    {
        if weights.len() != points.len() {
            return Err(Error::domain(format!(
                "quadrature has {} weights but {} points",
                weights.len(),
                points.len()
            )));
        }

        let n = bases.num_bases();
        let n_g = geometry.num_bases();
        let n_q = points.len();
        let nodes = (0..n_g)
            .map(|k| {
                geometry.node_coordinates(k).ok_or_else(|| {
                    Error::domain(format!("geometry basis {} on element {} has no node", k, element_id))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let mut phi = vec![T::zero(); n];
        let mut phi_grad_ref = vec![OVector::<T, D>::zeros(); n];
        let mut phi_g = vec![T::zero(); n_g];
        let mut phi_g_grad_ref = vec![OVector::<T, D>::zeros(); n_g];

        let mut values = vec![DVector::zeros(n_q); n];
        let mut gradients = vec![OMatrix::<T, D, Dyn>::zeros_generic(D::name(), Dyn(n_q)); n];
        let mut quadrature_points = Vec::with_capacity(n_q);
        let mut quadrature_vector = DVector::zeros(n_q);

        for (q, (&w, xi)) in izip!(weights, points).enumerate() {
            geometry.populate_basis(&mut phi_g, xi);
            geometry.populate_basis_gradients(&mut phi_g_grad_ref, xi);

            let mut x = OVector::<T, D>::zeros();
            let mut j = OMatrix::<T, D, D>::zeros();
            for (x_k, &phi_k, grad_k) in izip!(&nodes, &phi_g, &phi_g_grad_ref) {
                x += &x_k.coords * phi_k;
                j.ger(T::one(), &x_k.coords, grad_k, T::one());
            }

            let j_det = j.determinant();
            let j_inv_t = j
                .try_inverse()
                .ok_or_else(|| Error::domain(format!("singular Jacobian on element {}", element_id)))?
                .transpose();

            bases.populate_basis(&mut phi, xi);
            bases.populate_basis_gradients(&mut phi_grad_ref, xi);
            for (b, (&phi_b, grad_ref)) in izip!(&phi, &phi_grad_ref).enumerate() {
                values[b][q] = phi_b;
                gradients[b].set_column(q, &(&j_inv_t * grad_ref));
            }

            quadrature_points.push(OPoint::from(x));
            quadrature_vector[q] = w * j_det.abs();
        }

        let basis_values = izip!(values, gradients)
            .enumerate()
            .map(|(b, (values, gradients))| AssemblyValues {
                global_index: bases.global_index(b),
                values,
                gradients,
            })
            .collect();

        Ok(Self {
            element_id,
            basis_values,
            quadrature_points,
            quadrature_vector,
        })
    }

    /// Evaluates `bases` at arbitrary reference points, e.g. for post-processing.
    ///
    /// The quadrature vector of the result holds $|J|$ at each point.
    pub fn evaluate<B, G>(element_id: usize, bases: &B, geometry: &G, points: &[OPoint<T, D>]) -> Result<Self>
    where
        B: ElementBases<T, D> + ?Sized,
        G: ElementBases<T, D> + ?Sized,
    {
        let unit_weights = vec![T::one(); points.len()];
        Self::compute(element_id, bases, geometry, &unit_weights, points)
    }

    pub fn element_id(&self) -> usize {
        self.element_id
    }

    pub fn num_bases(&self) -> usize {
        self.basis_values.len()
    }

    pub fn num_quadrature_points(&self) -> usize {
        self.quadrature_vector.len()
    }

    pub fn basis(&self, i: usize) -> &AssemblyValues<T, D> {
        &self.basis_values[i]
    }

    pub fn basis_values(&self) -> &[AssemblyValues<T, D>] {
        &self.basis_values
    }

    /// Physical coordinates of the quadrature points.
    pub fn quadrature_points(&self) -> &[OPoint<T, D>] {
        &self.quadrature_points
    }

    pub fn quadrature_vector(&self) -> &DVector<T> {
        &self.quadrature_vector
    }

    /// Checks that basis index `i` exists and `da` has one entry per quadrature point.
    pub fn check_access(&self, i: usize, da: &[T]) -> Result<()> {
        if i >= self.num_bases() {
            return Err(Error::domain(format!(
                "basis index {} out of range for element {} with {} bases",
                i,
                self.element_id,
                self.num_bases()
            )));
        }
        if da.len() != self.num_quadrature_points() {
            return Err(Error::domain(format!(
                "quadrature vector of length {} does not match the {} quadrature points of element {}",
                da.len(),
                self.num_quadrature_points(),
                self.element_id
            )));
        }
        Ok(())
    }
}
