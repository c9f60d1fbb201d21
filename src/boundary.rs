//! Resolution of symbolic boundary tags into constrained degrees of freedom.
use crate::basis::ElementDofs;
use crate::error::{Error, Result};
use crate::mesh::{BoundaryFacet, BoundaryMesh};
use crate::problem::Problem;
use log::{debug, warn};
use rayon::iter::{IntoParallelRefIterator, ParallelIterator};
use std::collections::BTreeSet;

/// The constrained degrees of freedom of a single run.
///
/// Displacement DOFs are numbered `node * field_dim + d`; the set for dimension `d` therefore only
/// contains indices congruent to `d` modulo `field_dim`. Pressure DOFs are the global indices of the
/// pressure bases.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundaryConstraintSet {
    field_dim: usize,
    displacement: Vec<BTreeSet<usize>>,
    pressure: BTreeSet<usize>,
    dirichlet_facets: Vec<BoundaryFacet>,
    neumann_facets: Vec<BoundaryFacet>,
}

impl BoundaryConstraintSet {
    /// The number of solution components per node.
    pub fn field_dim(&self) -> usize {
        self.field_dim
    }

    /// Constrained displacement DOFs in dimension `d`, or `None` if `d` is not a field component.
    pub fn displacement(&self, d: usize) -> Option<&BTreeSet<usize>> {
        self.displacement.get(d)
    }

    /// All constrained displacement DOFs, sorted.
    pub fn displacement_dofs(&self) -> BTreeSet<usize> {
        self.displacement.iter().flatten().copied().collect()
    }

    pub fn pressure_dofs(&self) -> &BTreeSet<usize> {
        &self.pressure
    }

    pub fn is_constrained(&self, dof: usize) -> bool {
        self.displacement
            .get(dof % self.field_dim)
            .map_or(false, |dofs| dofs.contains(&dof))
    }

    /// Facets on which Dirichlet values must be imposed, in mesh order.
    pub fn dirichlet_facets(&self) -> &[BoundaryFacet] {
        &self.dirichlet_facets
    }

    /// Facets that contribute a Neumann boundary integral, in mesh order.
    pub fn neumann_facets(&self) -> &[BoundaryFacet] {
        &self.neumann_facets
    }
}

#[derive(Debug, Default)]
struct FacetConstraints {
    dirichlet: bool,
    neumann: bool,
    displacement: Vec<(usize, usize)>,
    pressure: Vec<usize>,
}

fn check_inputs<M, B, P>(mesh: &M, problem: &dyn Problem, bases: &[B], pressure_bases: &[P], field_dim: usize) -> Result<()>
where
    M: BoundaryMesh + ?Sized,
{
    let tags = problem.boundary_tags();
    if let Some(tag) = tags
        .dirichlet
        .intersection(&tags.neumann)
        .find(|&&tag| (0..field_dim).any(|d| problem.is_dimension_dirichlet(tag, d)))
    {
        return Err(Error::configuration(format!(
            "boundary tag {} of problem {} is both Dirichlet and Neumann",
            tag,
            problem.name()
        )));
    }
    if tags.dirichlet.is_empty() && !tags.neumann.is_empty() {
        return Err(Error::configuration(format!(
            "problem {} has Neumann tags but no Dirichlet tags, so its whole boundary would be Dirichlet",
            problem.name()
        )));
    }
    if bases.len() != mesh.num_elements() {
        return Err(Error::domain(format!(
            "got bases for {} elements, but the mesh has {} elements",
            bases.len(),
            mesh.num_elements()
        )));
    }
    if !pressure_bases.is_empty() && pressure_bases.len() != mesh.num_elements() {
        return Err(Error::domain(format!(
            "got pressure bases for {} elements, but the mesh has {} elements",
            pressure_bases.len(),
            mesh.num_elements()
        )));
    }
    if pressure_bases.is_empty() && !tags.pressure.is_empty() {
        warn!(
            "Problem {} has pressure boundary tags, but there are no pressure bases",
            problem.name()
        );
    }
    Ok(())
}

/// Resolves the boundary tags of `problem` into constrained degrees of freedom.
///
/// `bases` holds the displacement bases of every element, `pressure_bases` the pressure bases of
/// every element or nothing at all for formulations without a pressure field.
///
/// - If the problem has no Dirichlet tags, every boundary facet is Dirichlet in every dimension.
/// - Otherwise, on facets with a Dirichlet tag, dimension `d` of every node on the facet is
///   constrained if [`Problem::is_dimension_dirichlet`] holds for the tag and `d`.
/// - Facets with a Neumann tag are recorded but not constrained.
/// - Facets with a pressure tag constrain the pressure DOFs of their nodes, independently of the
///   displacement.
///
/// Facets whose tag matches none of the sets are free.
///
/// A tag that is both Dirichlet (in some dimension) and Neumann is a configuration error, as is a
/// problem with Neumann tags but no Dirichlet tags. Element ids or facet indices out of range are
/// domain errors.
pub fn setup_bc<M, B, P>(
    mesh: &M,
    problem: &dyn Problem,
    bases: &[B],
    pressure_bases: &[P],
) -> Result<BoundaryConstraintSet>
where
    M: BoundaryMesh + ?Sized,
    B: ElementDofs + Sync,
    P: ElementDofs + Sync,
{
    let field_dim = if problem.is_scalar() { 1 } else { mesh.dimension() };
    check_inputs(mesh, problem, bases, pressure_bases, field_dim)?;

    let tags = problem.boundary_tags();
    let all_dirichlet = tags.dirichlet.is_empty();

    let resolve_facet = |facet: &BoundaryFacet| -> Result<FacetConstraints> {
        let element_bases = bases.get(facet.element_id).ok_or_else(|| {
            Error::domain(format!(
                "boundary facet refers to element {}, but the mesh has {} elements",
                facet.element_id,
                bases.len()
            ))
        })?;

        let mut constraints = FacetConstraints::default();
        if all_dirichlet || tags.dirichlet.contains(&facet.tag) {
            constraints.dirichlet = true;
            let local_bases = element_bases.facet_bases(facet.local_facet)?;
            for d in 0..field_dim {
                if all_dirichlet || problem.is_dimension_dirichlet(facet.tag, d) {
                    constraints.displacement.extend(
                        local_bases
                            .iter()
                            .map(|&l| (d, element_bases.global_index(l) * field_dim + d)),
                    );
                }
            }
        }
        constraints.neumann = tags.neumann.contains(&facet.tag);

        if tags.pressure.contains(&facet.tag) {
            if let Some(p_bases) = pressure_bases.get(facet.element_id) {
                let local_bases = p_bases.facet_bases(facet.local_facet)?;
                constraints
                    .pressure
                    .extend(local_bases.iter().map(|&l| p_bases.global_index(l)));
            }
        }
        Ok(constraints)
    };

    let facets = mesh.boundary_facets();
    let per_facet = facets
        .par_iter()
        .map(resolve_facet)
        .collect::<Result<Vec<_>>>()?;

    let mut result = BoundaryConstraintSet {
        field_dim,
        displacement: vec![BTreeSet::new(); field_dim],
        pressure: BTreeSet::new(),
        dirichlet_facets: Vec::new(),
        neumann_facets: Vec::new(),
    };
    for (facet, constraints) in facets.iter().zip(per_facet) {
        if constraints.dirichlet {
            result.dirichlet_facets.push(*facet);
        }
        if constraints.neumann {
            result.neumann_facets.push(*facet);
        }
        for (d, dof) in constraints.displacement {
            result.displacement[d].insert(dof);
        }
        result.pressure.extend(constraints.pressure);
    }

    debug!(
        "Resolved boundary of problem {}: {} constrained displacement DOFs, {} constrained pressure DOFs, \
         {} Dirichlet and {} Neumann facets",
        problem.name(),
        result.displacement.iter().map(BTreeSet::len).sum::<usize>(),
        result.pressure.len(),
        result.dirichlet_facets.len(),
        result.neumann_facets.len()
    );
    Ok(result)
}
