//! Boundary metadata of a mesh.
//!
//! The mesh itself is owned by the surrounding application. Boundary resolution only needs to
//! know whether the mesh is a volume mesh and which element facets lie on the boundary, together
//! with their integer tags.
use serde::{Deserialize, Serialize};

/// Integer tag attached to a boundary facet, e.g. a side set id from the mesh file.
pub type BoundaryTag = i32;

/// A boundary facet, identified by its element and the element-local facet index.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BoundaryFacet {
    pub element_id: usize,
    pub local_facet: usize,
    pub tag: BoundaryTag,
}

impl BoundaryFacet {
    pub fn new(element_id: usize, local_facet: usize, tag: BoundaryTag) -> Self {
        Self {
            element_id,
            local_facet,
            tag,
        }
    }
}

/// The boundary-related part of the mesh interface.
pub trait BoundaryMesh {
    /// Whether the mesh is three-dimensional.
    fn is_volume(&self) -> bool;

    fn num_elements(&self) -> usize;

    fn boundary_facets(&self) -> &[BoundaryFacet];

    /// The spatial dimension implied by [`is_volume`](Self::is_volume).
    fn dimension(&self) -> usize {
        if self.is_volume() {
            3
        } else {
            2
        }
    }
}

/// A plain list of tagged boundary facets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaggedBoundary {
    is_volume: bool,
    num_elements: usize,
    facets: Vec<BoundaryFacet>,
}

impl TaggedBoundary {
    pub fn new(is_volume: bool, num_elements: usize, facets: Vec<BoundaryFacet>) -> Self {
        Self {
            is_volume,
            num_elements,
            facets,
        }
    }

    /// Replaces the tag of every facet by the result of `f`.
    pub fn retag(&mut self, mut f: impl FnMut(&BoundaryFacet) -> BoundaryTag) {
        for facet in &mut self.facets {
            facet.tag = f(facet);
        }
    }
}

impl BoundaryMesh for TaggedBoundary {
    fn is_volume(&self) -> bool {
        self.is_volume
    }

    fn num_elements(&self) -> usize {
        self.num_elements
    }

    fn boundary_facets(&self) -> &[BoundaryFacet] {
        &self.facets
    }
}
