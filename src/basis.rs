//! Element bases: the interface to the basis layer, plus affine P1 simplex bases.
//!
//! Assembly only needs two things from a basis: the mapping from local basis functions to global
//! nodes ([`ElementDofs`]) and basis values/gradients at reference points ([`ElementBases`]).
//! Geometric mappings are described by a second set of bases, the *geometry bases*, whose nodes
//! carry coordinates.
use crate::allocators::DimAllocator;
use crate::error::{Error, Result};
use crate::{Real, SmallDim};
use nalgebra::{DefaultAllocator, OPoint, OVector};

/// Local-to-global information of the basis functions supported on a single element.
pub trait ElementDofs {
    /// The number of basis functions supported on the element.
    fn num_bases(&self) -> usize;

    /// The global node index of local basis function `local`.
    fn global_index(&self, local: usize) -> usize;

    /// Local indices of the basis functions that do not vanish on the given local facet.
    fn facet_bases(&self, local_facet: usize) -> Result<Vec<usize>>;
}

/// Basis functions of a single element, evaluated in reference coordinates.
pub trait ElementBases<T, D>: ElementDofs
where
    T: Real,
    D: SmallDim,
    DefaultAllocator: DimAllocator<T, D>,
{
    /// Evaluates all basis functions at the reference point `xi`, storing `num_bases` values.
    fn populate_basis(&self, values: &mut [T], xi: &OPoint<T, D>);

    /// Evaluates the reference gradients of all basis functions at `xi`.
    fn populate_basis_gradients(&self, gradients: &mut [OVector<T, D>], xi: &OPoint<T, D>);

    /// Physical coordinates of the node associated with local basis function `local`.
    ///
    /// Only needed for bases used as geometry bases.
    fn node_coordinates(&self, local: usize) -> Option<OPoint<T, D>>;
}

/// Linear Lagrange basis on a simplex (triangle in 2D, tetrahedron in 3D).
///
/// The reference simplex has vertices $\vec 0, \vec e_1, \dots, \vec e_d$ and the basis functions
/// are the barycentric coordinates
/// $$ \phi_0 = 1 - \sum_k \xi_k, \qquad \phi_k = \xi_k. $$
/// Facet `k` is the facet opposite to vertex `k`.
#[derive(Debug, Clone, PartialEq)]
pub struct SimplexP1Bases<T, D>
where
    T: Real,
    D: SmallDim,
    DefaultAllocator: DimAllocator<T, D>,
{
    nodes: Vec<usize>,
    vertices: Vec<OPoint<T, D>>,
}

impl<T, D> SimplexP1Bases<T, D>
where
    T: Real,
    D: SmallDim,
    DefaultAllocator: DimAllocator<T, D>,
{
    /// Creates bases for a simplex with the given global vertex indices and coordinates.
    pub fn from_vertices(nodes: Vec<usize>, vertices: Vec<OPoint<T, D>>) -> Result<Self> {
        let expected = D::dim() + 1;
        if nodes.len() != expected || vertices.len() != expected {
            return Err(Error::domain(format!(
                "a {}D simplex needs {} vertices, got {} nodes and {} coordinates",
                D::dim(),
                expected,
                nodes.len(),
                vertices.len()
            )));
        }
        Ok(Self { nodes, vertices })
    }

    pub fn nodes(&self) -> &[usize] {
        &self.nodes
    }

    pub fn vertices(&self) -> &[OPoint<T, D>] {
        &self.vertices
    }
}

impl<T, D> ElementDofs for SimplexP1Bases<T, D>
where
    T: Real,
    D: SmallDim,
    DefaultAllocator: DimAllocator<T, D>,
{
    fn num_bases(&self) -> usize {
        self.nodes.len()
    }

    fn global_index(&self, local: usize) -> usize {
        self.nodes[local]
    }

    fn facet_bases(&self, local_facet: usize) -> Result<Vec<usize>> {
        if local_facet >= self.nodes.len() {
            return Err(Error::domain(format!(
                "simplex has {} facets, but facet {} was requested",
                self.nodes.len(),
                local_facet
            )));
        }
        Ok((0..self.nodes.len()).filter(|&k| k != local_facet).collect())
    }
}

impl<T, D> ElementBases<T, D> for SimplexP1Bases<T, D>
where
    T: Real,
    D: SmallDim,
    DefaultAllocator: DimAllocator<T, D>,
{
    fn populate_basis(&self, values: &mut [T], xi: &OPoint<T, D>) {
        assert_eq!(values.len(), self.num_bases(), "Basis value buffer has wrong length");
        values[0] = T::one() - xi.coords.sum();
        for k in 0..D::dim() {
            values[k + 1] = xi[k];
        }
    }

    fn populate_basis_gradients(&self, gradients: &mut [OVector<T, D>], _xi: &OPoint<T, D>) {
        assert_eq!(gradients.len(), self.num_bases(), "Basis gradient buffer has wrong length");
        gradients[0] = OVector::<T, D>::repeat(-T::one());
        for k in 0..D::dim() {
            let mut e_k = OVector::<T, D>::zeros();
            e_k[k] = T::one();
            gradients[k + 1] = e_k;
        }
    }

    fn node_coordinates(&self, local: usize) -> Option<OPoint<T, D>> {
        self.vertices.get(local).cloned()
    }
}
